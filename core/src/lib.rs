#![no_std]

extern crate alloc;

pub use annotations::*;
pub use authority::*;
pub use board::*;
pub use engine::*;
pub use error::*;
pub use reconcile::*;
pub use round::*;
pub use scoring::*;
pub use session::*;
pub use snapshot::*;
pub use targets::*;
pub use types::*;

mod annotations;
mod authority;
mod board;
mod engine;
mod error;
mod reconcile;
mod round;
mod scoring;
mod session;
mod snapshot;
mod targets;
mod types;
