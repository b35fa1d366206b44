//! CAN frame encoding.
//!
//! Frames carry one converted scalar each, packed big-endian into 1, 2, 4 or
//! 8 bytes. Identifier ranges and payload widths live in `layout`.

pub mod encoder;
pub mod error;
pub mod layout;

pub use encoder::{OutputFrame, encode_frame};
pub use error::FrameError;
