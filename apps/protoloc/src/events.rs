//! Event handling and user feedback

use console::{Style, Term};
use protoloc_events::{AppEvent, EventMessage, FetchEvent, ResolutionEvent};

use crate::logging::log_event_with_tracing;

/// Logs every event and mirrors the noteworthy ones on stderr
pub struct EventHandler {
    term: Term,
    colors_enabled: bool,
    /// Status lines are suppressed when stdout carries JSON
    quiet: bool,
}

impl EventHandler {
    pub fn new(quiet: bool) -> Self {
        let term = Term::stderr();
        let colors_enabled = term.features().colors_supported();
        Self {
            term,
            colors_enabled,
            quiet,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        log_event_with_tracing(&message);
        if self.quiet {
            return;
        }

        match message.event {
            AppEvent::Fetch(FetchEvent::DownloadStarted { artifact, url, .. }) => {
                self.show_status(&format!("Downloading {artifact} from {url}"));
            }
            AppEvent::Fetch(FetchEvent::DownloadRetrying {
                url,
                attempt,
                max_attempts,
                ..
            }) => {
                self.show_warning(&format!("Retrying {url} ({attempt}/{max_attempts})"));
            }
            AppEvent::Fetch(FetchEvent::ChecksumUnavailable { artifact, .. }) => {
                self.show_warning(&format!("No checksum published for {artifact}"));
            }
            AppEvent::Resolution(ResolutionEvent::PermissionsNormalized { path, .. }) => {
                self.show_status(&format!("Marked {} as executable", path.display()));
            }
            AppEvent::Fetch(FetchEvent::RemoteSkipped { url, failure, .. }) => {
                self.show_warning(&format!("Skipping {url}: {}", failure.message));
            }
            _ => {}
        }
    }

    fn show_status(&self, message: &str) {
        let _ = self.term.write_line(message);
    }

    fn show_warning(&self, message: &str) {
        let line = if self.colors_enabled {
            Style::new().yellow().apply_to(message).to_string()
        } else {
            message.to_string()
        };
        let _ = self.term.write_line(&line);
    }
}
