pub mod terminal;

use crate::app::{Alert, Session};
use anyhow::{Context, Result};
use terminal::Terminal;
use tracing::{info, warn};

/// Adds `links` (and every line of `links_file`) to the session, then runs a
/// single download cycle. Returns whether the cycle succeeded.
pub async fn run_batch(
    session: &mut Session,
    links: &[String],
    links_file: Option<&str>,
) -> Result<bool> {
    let mut terminal = Terminal::new(tokio::io::stdout());

    if let Some(path) = links_file {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read links file {}", path))?;
        info!("Loading links from {}", path);
        for (line, result) in session.links_mut().extend_from_lines(&text) {
            if let Err(e) = result {
                warn!("Skipping {}: {}", line, e);
                terminal.alert(&Alert::from(&e)).await?;
            }
        }
    }

    terminal.add_all(session, links).await?;

    terminal.download(session).await
}

/// Adds `links` with the usual alerts, then hands over to the command loop.
pub async fn run_interactive(session: &mut Session, links: &[String]) -> Result<()> {
    let mut terminal = Terminal::new(tokio::io::stdout());
    terminal.add_all(session, links).await?;
    terminal.run(session, tokio::io::stdin()).await
}
