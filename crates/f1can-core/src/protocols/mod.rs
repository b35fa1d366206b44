//! Protocol codecs.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets, sizes and ranges (source of truth)
//! - `reader`: bounded byte access and wire conventions
//! - parsers / encoders: domain-level decoding and encoding
//! - `error`: explicit, actionable errors
//!
//! `f1` is the inbound little-endian side, `can` the outbound big-endian
//! side; the two byte orders never meet. Codecs are pure and contain no I/O.

pub mod can;
pub mod f1;
