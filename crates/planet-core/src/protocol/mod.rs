//! Protocol module - wire format of the Planet download protocol.

pub mod constants;
pub mod frame;
pub mod reply;

pub use constants::*;
pub use frame::Frame;
pub use reply::Reply;
