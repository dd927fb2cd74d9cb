//! Update error taxonomy.

use thiserror::Error;

use crate::events::UpdatePhase;
use crate::transport::TransportError;

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("Failed to resolve {destination}: {source}")]
    AddressResolution {
        destination: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to connect to {address}: {source}")]
    Connection {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stream closed unexpectedly while {phase}")]
    StreamClosed { phase: UpdatePhase },

    #[error("Invalid response from WiFish while {phase}: expected '{expected}', got '{received}'")]
    InvalidResponse {
        phase: UpdatePhase,
        expected: String,
        received: String,
    },

    #[error("Timed out after {timeout_ms}ms while {phase}")]
    Timeout { phase: UpdatePhase, timeout_ms: u64 },

    #[error("Firmware too large: {packets} packets do not fit the 4-digit sequence field")]
    FirmwareTooLarge { packets: usize },

    #[error("IO error while {phase}: {source}")]
    Io {
        phase: UpdatePhase,
        #[source]
        source: std::io::Error,
    },
}

impl UpdateError {
    /// Attach the phase a transport failure happened in.
    pub fn from_transport(phase: UpdatePhase, err: TransportError) -> Self {
        match err {
            TransportError::Closed => UpdateError::StreamClosed { phase },
            TransportError::Timeout { timeout_ms } => UpdateError::Timeout { phase, timeout_ms },
            TransportError::Io(source) => UpdateError::Io { phase, source },
        }
    }

    /// Phase the session was in when it failed, if it got that far.
    pub fn phase(&self) -> Option<UpdatePhase> {
        match self {
            UpdateError::AddressResolution { .. } => Some(UpdatePhase::Resolving),
            UpdateError::Connection { .. } => Some(UpdatePhase::Connecting),
            UpdateError::StreamClosed { phase }
            | UpdateError::InvalidResponse { phase, .. }
            | UpdateError::Timeout { phase, .. }
            | UpdateError::Io { phase, .. } => Some(*phase),
            UpdateError::FirmwareTooLarge { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_mapping() {
        let err = UpdateError::from_transport(UpdatePhase::Handshaking, TransportError::Closed);
        assert!(matches!(
            err,
            UpdateError::StreamClosed {
                phase: UpdatePhase::Handshaking
            }
        ));

        let err = UpdateError::from_transport(
            UpdatePhase::UploadingPackets,
            TransportError::Timeout { timeout_ms: 100 },
        );
        assert_eq!(err.phase(), Some(UpdatePhase::UploadingPackets));
        assert_eq!(
            err.to_string(),
            "Timed out after 100ms while Uploading Packets"
        );
    }
}
