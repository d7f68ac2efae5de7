use crate::app::{Alert, Session};
use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};

const HELP: &str = "\
Commands:
  add <link>     add an Instagram post link (up to 20)
  remove <n>     remove link number n
  list           show the current links
  download       download every link to the library
  help           show this message
  quit           exit";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Remove(usize),
    List,
    Download,
    Help,
    Quit,
}

impl Command {
    /// Parses one input line. `remove` takes the 1-based number shown by
    /// `list`. A bare link is shorthand for `add`.
    pub fn parse(line: &str) -> Option<Result<Self, String>> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "add" | "a" => Ok(Command::Add(rest.to_string())),
            "remove" | "rm" => match rest.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(Command::Remove(n - 1)),
                _ => Err(format!("expected a link number, got '{}'", rest)),
            },
            "list" | "ls" => Ok(Command::List),
            "download" | "dl" => Ok(Command::Download),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ if word.contains("://") => Ok(Command::Add(line.to_string())),
            _ => Err(format!("unknown command '{}', try 'help'", word)),
        };
        Some(command)
    }
}

/// Drives a session from line-oriented input, writing alerts and listings to
/// `output`.
pub struct Terminal<W> {
    output: W,
}

impl<W: AsyncWrite + Unpin> Terminal<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.output
    }

    pub async fn alert(&mut self, alert: &Alert) -> Result<()> {
        info!(title = alert.title, "{}", alert.message);
        self.line(&alert.to_string()).await
    }

    async fn line(&mut self, text: &str) -> Result<()> {
        self.output
            .write_all(format!("{}\n", text).as_bytes())
            .await
            .context("Failed to write output")?;
        self.output.flush().await?;
        Ok(())
    }

    pub async fn list(&mut self, session: &Session) -> Result<()> {
        if session.links().is_empty() {
            return self.line("(no links)").await;
        }
        let lines: Vec<String> = session
            .links()
            .iter()
            .enumerate()
            .map(|(i, link)| format!("{:>2}. {}", i + 1, link))
            .collect();
        for line in lines {
            self.line(&line).await?;
        }
        Ok(())
    }

    pub async fn add(&mut self, session: &mut Session, raw: &str) -> Result<()> {
        let alert = match session.add(raw) {
            Ok(link) => Alert::added(link),
            Err(e) => Alert::from(&e),
        };
        self.alert(&alert).await
    }

    /// Adds each link in turn, alerting on every one.
    pub async fn add_all(&mut self, session: &mut Session, links: &[String]) -> Result<()> {
        for raw in links {
            self.add(session, raw).await?;
        }
        Ok(())
    }

    /// Runs one cycle and reports it. Returns whether it succeeded.
    pub async fn download(&mut self, session: &Session) -> Result<bool> {
        if !session.links().is_empty() {
            self.line(&format!("Downloading {} links...", session.links().len()))
                .await?;
        }
        let result = session.download_all().await;
        debug!("Cycle ended in state {:?}", session.state());
        match result {
            Ok(report) => {
                for alert in Alert::for_report(&report) {
                    self.alert(&alert).await?;
                }
                Ok(true)
            }
            Err(e) => {
                self.alert(&Alert::from(&e)).await?;
                Ok(false)
            }
        }
    }

    /// Reads commands until `quit` or end of input.
    pub async fn run<R: AsyncRead + Unpin>(
        &mut self,
        session: &mut Session,
        input: R,
    ) -> Result<()> {
        self.line("InstaManager - download up to 20 Instagram posts. Type 'help' for commands.")
            .await?;

        let mut lines = BufReader::new(input).lines();
        while let Some(line) = lines.next_line().await.context("Failed to read input")? {
            let command = match Command::parse(&line) {
                None => continue,
                Some(Ok(command)) => command,
                Some(Err(message)) => {
                    self.line(&message).await?;
                    continue;
                }
            };
            debug!("Command: {:?}", command);

            match command {
                Command::Add(raw) => self.add(session, &raw).await?,
                Command::Remove(index) => {
                    let alert = match session.remove(index) {
                        Ok(link) => Alert::removed(&link),
                        Err(e) => Alert::from(&e),
                    };
                    self.alert(&alert).await?;
                }
                Command::List => self.list(session).await?,
                Command::Download => {
                    self.download(session).await?;
                }
                Command::Help => self.line(HELP).await?,
                Command::Quit => break,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::tests::{image_doc, FakeLibrary, FakeMetadata};
    use crate::media::MediaDownloader;
    use crate::permission::FixedPermission;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("   "), None);
        assert_eq!(
            Command::parse("add  https://instagram.com/p/A/ "),
            Some(Ok(Command::Add("https://instagram.com/p/A/".into())))
        );
        assert_eq!(Command::parse("remove 3"), Some(Ok(Command::Remove(2))));
        assert!(matches!(Command::parse("remove 0"), Some(Err(_))));
        assert!(matches!(Command::parse("rm x"), Some(Err(_))));
        assert_eq!(Command::parse("LIST"), Some(Ok(Command::List)));
        assert_eq!(Command::parse("dl"), Some(Ok(Command::Download)));
        assert_eq!(
            Command::parse("https://instagram.com/p/B/"),
            Some(Ok(Command::Add("https://instagram.com/p/B/".into())))
        );
        assert!(matches!(Command::parse("frobnicate"), Some(Err(_))));
    }

    #[tokio::test]
    async fn test_interactive_session() {
        let metadata = FakeMetadata::default().with("A", &image_doc("https://cdn/a.jpg"));
        let mut session = Session::new(MediaDownloader::new(
            Box::new(metadata),
            Box::new(FakeLibrary::default()),
            Box::new(FixedPermission(true)),
        ));

        let input = b"add https://instagram.com/p/A/\nadd https://example.com/x\nadd https://instagram.com/p/B/\nremove 2\nlist\ndownload\nquit\nlist\n";
        let mut terminal = Terminal::new(Vec::new());
        terminal.run(&mut session, &input[..]).await.unwrap();

        let output = String::from_utf8(terminal.into_inner()).unwrap();
        assert!(output.contains("Link Added: https://instagram.com/p/A/"));
        assert!(output.contains("Invalid Link: Please enter a valid Instagram link."));
        assert!(output.contains("Link Removed: https://instagram.com/p/B/"));
        assert!(output.contains(" 1. https://instagram.com/p/A/"));
        assert!(output.contains("Success: "));
        // nothing after quit is processed
        assert_eq!(output.matches(" 1. https://instagram.com/p/A/").count(), 1);
    }

    #[tokio::test]
    async fn test_add_all_alerts_on_rejected_links() {
        let mut session = Session::new(MediaDownloader::new(
            Box::new(FakeMetadata::default()),
            Box::new(FakeLibrary::default()),
            Box::new(FixedPermission(true)),
        ));
        let links = vec![
            "https://instagram.com/p/A/".to_string(),
            "https://example.com/p/B/".to_string(),
            "   ".to_string(),
        ];

        let mut terminal = Terminal::new(Vec::new());
        terminal.add_all(&mut session, &links).await.unwrap();

        let output = String::from_utf8(terminal.into_inner()).unwrap();
        assert_eq!(
            output,
            "Link Added: https://instagram.com/p/A/\n\
             Invalid Link: Please enter a valid Instagram link.\n\
             Invalid Link: Please enter a link.\n"
        );
        assert_eq!(session.links().len(), 1);
    }

    #[tokio::test]
    async fn test_download_without_links() {
        let session = Session::new(MediaDownloader::new(
            Box::new(FakeMetadata::default()),
            Box::new(FakeLibrary::default()),
            Box::new(FixedPermission(true)),
        ));
        let mut terminal = Terminal::new(Vec::new());
        assert!(!terminal.download(&session).await.unwrap());

        let output = String::from_utf8(terminal.into_inner()).unwrap();
        assert_eq!(output, "No Links: Please add some Instagram links first.\n");
    }
}
