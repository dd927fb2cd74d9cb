//! Console rendering of update events.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use planet_core::events::UpdateEvent;
use tracing::info;

/// Turns session events into log lines and a packet progress bar.
pub struct ConsoleRenderer {
    destination: String,
    bar: Option<ProgressBar>,
}

impl ConsoleRenderer {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            bar: None,
        }
    }

    pub fn render(&mut self, event: &UpdateEvent) {
        match event {
            UpdateEvent::Resolving => info!(dest = %self.destination, "Resolving"),
            UpdateEvent::Connecting { address } => info!(dest = %address, "Connecting to lamp"),
            UpdateEvent::Handshaking => info!("Handshaking in progress"),
            UpdateEvent::RequestingDownloadMode => info!("Putting lamp in download mode"),
            UpdateEvent::SendingHeader => info!("Awaiting sync"),
            UpdateEvent::UploadingPackets { total } => {
                info!("Uploading firmware");
                self.bar = Some(packet_bar(*total as u64));
            }
            UpdateEvent::PacketAcknowledged { .. } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
            }
            UpdateEvent::SendingCompletionSignature => self.finish_bar(),
            UpdateEvent::AwaitingFeedback => info!("Awaiting feedback from lamp"),
            UpdateEvent::Completed { elapsed } => {
                info!(time = %format_elapsed(*elapsed), "Update completed")
            }
        }
    }

    fn finish_bar(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }
}

impl Drop for ConsoleRenderer {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.abandon();
        }
    }
}

fn packet_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{elapsed_precise} [{bar:40}] {pos}/{len} {percent}%")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}
