//! WebSocket JSON protocol spoken with the game server.

pub use codec::*;
pub use error::*;
pub use message::*;
pub use wire::*;

mod codec;
mod error;
mod message;
mod wire;
