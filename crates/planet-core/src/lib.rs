//! Planet-Core: firmware updater for Elos Planet lamps.
//!
//! Flashes firmware onto a lamp through its WiFish bridge, speaking the
//! bridge's ASCII download protocol over a raw TCP socket.
//!
//! # Architecture
//!
//! The crate is organized into layers:
//!
//! - **Protocol**: Constants, command frames, reply matching
//! - **Payload**: Firmware images, lamp models, packet encoding
//! - **Transport**: Byte-stream abstraction (TCP, mock)
//! - **Events**: Observer pattern for UI decoupling
//! - **Session**: Protocol state machine and background runner
//! - **Config**: Serializable session configuration
//!
//! # Example
//!
//! ```no_run
//! use planet_core::config::UpdateConfig;
//! use planet_core::payload::{FirmwareImage, LampType};
//! use planet_core::session::UpdateSession;
//!
//! let config = UpdateConfig {
//!     destination: "192.168.1.50".to_string(),
//!     port: 5000,
//!     ..Default::default()
//! };
//!
//! let image = FirmwareImage::load_asset(LampType::Pro, "firmwares").expect("missing firmware");
//! let session = UpdateSession::new(config);
//! session.run(image.raw_data()).expect("update failed");
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod payload;
pub mod protocol;
pub mod session;
pub mod transport;

// Re-exports for convenience
pub use config::UpdateConfig;
pub use error::UpdateError;
pub use events::{ChannelObserver, TracingObserver, UpdateEvent, UpdateObserver, UpdatePhase};
pub use payload::{FirmwareImage, LampType, packetize};
pub use protocol::{Frame, Reply};
pub use session::{UpdateHandle, UpdateSession, spawn_update};
pub use transport::{LampTransport, MockTransport, TcpTransport, TransportError};
