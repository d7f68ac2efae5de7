use super::types::MediaIdentifier;
use regex::Regex;
use std::sync::LazyLock;

static POST_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/p/([^/?#]+)").expect("post path regex is valid"));

/// Pulls the post short code out of a link, e.g. `ABC123` from
/// `https://instagram.com/p/ABC123/`.
pub fn extract_media_id(link: &str) -> Option<MediaIdentifier> {
    POST_PATH
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map(|m| MediaIdentifier(m.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(link: &str) -> Option<String> {
        extract_media_id(link).map(|id| id.to_string())
    }

    #[test]
    fn test_extract_post_code() {
        assert_eq!(id("https://instagram.com/p/ABC123/"), Some("ABC123".into()));
        assert_eq!(
            id("https://www.instagram.com/p/Cx-9_zY/?igsh=abc"),
            Some("Cx-9_zY".into())
        );
        assert_eq!(id("https://instagram.com/p/XYZ"), Some("XYZ".into()));
        assert_eq!(id("https://instagram.com/p/XYZ#frag"), Some("XYZ".into()));
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(
            id("https://instagram.com/p/FIRST/p/SECOND/"),
            Some("FIRST".into())
        );
    }

    #[test]
    fn test_no_post_segment() {
        assert_eq!(id("https://instagram.com/reel/ABC123/"), None);
        assert_eq!(id("https://instagram.com/someuser/"), None);
        assert_eq!(id("https://instagram.com/p/"), None);
    }

    #[test]
    fn test_extraction_is_repeatable() {
        for link in [
            "https://instagram.com/p/ABC123/",
            "https://instagram.com/stories/x/",
        ] {
            assert_eq!(extract_media_id(link), extract_media_id(link));
        }
    }
}
