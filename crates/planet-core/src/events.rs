//! Event system for UI decoupling.
//!
//! The session reports every protocol state it enters through an
//! [`UpdateObserver`]. A CLI progress bar, a log, or a test harness can
//! consume them without the core knowing how they are rendered.

use std::fmt;
#[cfg(test)]
use std::sync::Mutex;
use std::sync::mpsc::Sender;
use std::time::Duration;

/// Protocol phases, in the order a session walks through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UpdatePhase {
    Resolving,
    Connecting,
    Handshaking,
    RequestingDownloadMode,
    SendingHeader,
    UploadingPackets,
    SendingCompletionSignature,
    AwaitingFeedback,
    Completed,
}

impl fmt::Display for UpdatePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdatePhase::Resolving => write!(f, "Resolving"),
            UpdatePhase::Connecting => write!(f, "Connecting"),
            UpdatePhase::Handshaking => write!(f, "Handshaking"),
            UpdatePhase::RequestingDownloadMode => write!(f, "Requesting Download Mode"),
            UpdatePhase::SendingHeader => write!(f, "Sending Header"),
            UpdatePhase::UploadingPackets => write!(f, "Uploading Packets"),
            UpdatePhase::SendingCompletionSignature => write!(f, "Sending Completion Signature"),
            UpdatePhase::AwaitingFeedback => write!(f, "Awaiting Feedback"),
            UpdatePhase::Completed => write!(f, "Completed"),
        }
    }
}

/// Events emitted by an update session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateEvent {
    /// Resolving the destination address.
    Resolving,
    /// Opening the TCP connection to the resolved `ip:port`.
    Connecting { address: String },
    /// Waiting for the bridge greeting.
    Handshaking,
    /// Asking the lamp to enter download mode.
    RequestingDownloadMode,
    /// Announcing the upload header.
    SendingHeader,
    /// Upload started; `total` firmware packets will follow.
    UploadingPackets { total: usize },
    /// Packet `seq` (1-based) was acknowledged.
    PacketAcknowledged { seq: usize, total: usize },
    /// Sending the terminator packet.
    SendingCompletionSignature,
    /// Terminator sent, waiting for the lamp to confirm.
    AwaitingFeedback,
    /// Update finished, connection closed.
    Completed { elapsed: Duration },
}

impl UpdateEvent {
    /// Phase this event belongs to. Packet ticks belong to the upload phase.
    pub fn phase(&self) -> UpdatePhase {
        match self {
            UpdateEvent::Resolving => UpdatePhase::Resolving,
            UpdateEvent::Connecting { .. } => UpdatePhase::Connecting,
            UpdateEvent::Handshaking => UpdatePhase::Handshaking,
            UpdateEvent::RequestingDownloadMode => UpdatePhase::RequestingDownloadMode,
            UpdateEvent::SendingHeader => UpdatePhase::SendingHeader,
            UpdateEvent::UploadingPackets { .. } | UpdateEvent::PacketAcknowledged { .. } => {
                UpdatePhase::UploadingPackets
            }
            UpdateEvent::SendingCompletionSignature => UpdatePhase::SendingCompletionSignature,
            UpdateEvent::AwaitingFeedback => UpdatePhase::AwaitingFeedback,
            UpdateEvent::Completed { .. } => UpdatePhase::Completed,
        }
    }

    /// Whether this is a per-packet progress tick rather than a state change.
    pub fn is_tick(&self) -> bool {
        matches!(self, UpdateEvent::PacketAcknowledged { .. })
    }
}

/// Observer trait for receiving update events.
///
/// Implement this trait in your UI layer to receive updates.
pub trait UpdateObserver: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: &UpdateEvent);
}

/// Observer that logs events using tracing.
pub struct TracingObserver;

impl UpdateObserver for TracingObserver {
    fn on_event(&self, event: &UpdateEvent) {
        match event {
            UpdateEvent::Connecting { address } => {
                tracing::info!(dest = %address, "Connecting to lamp");
            }
            UpdateEvent::UploadingPackets { total } => {
                tracing::info!(packets = total, "Uploading firmware");
            }
            UpdateEvent::PacketAcknowledged { seq, total } => {
                let pct = if *total > 0 { (*seq * 100) / *total } else { 0 };
                tracing::debug!(seq = seq, progress = %format!("{}%", pct), "Packet acknowledged");
            }
            UpdateEvent::Completed { elapsed } => {
                tracing::info!(time = ?elapsed, "Update completed");
            }
            other => {
                tracing::info!(phase = %other.phase(), "Phase changed");
            }
        }
    }
}

/// Observer that forwards events into a channel.
///
/// The receiving side sees the stream end when the session drops the
/// observer.
pub struct ChannelObserver {
    sender: Sender<UpdateEvent>,
}

impl ChannelObserver {
    pub fn new(sender: Sender<UpdateEvent>) -> Self {
        Self { sender }
    }
}

impl UpdateObserver for ChannelObserver {
    fn on_event(&self, event: &UpdateEvent) {
        // Consumer gone; the session keeps going.
        let _ = self.sender.send(event.clone());
    }
}

/// Observer that records every event.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingObserver {
    events: Mutex<Vec<UpdateEvent>>,
}

#[cfg(test)]
impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<UpdateEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl UpdateObserver for RecordingObserver {
    fn on_event(&self, event: &UpdateEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
