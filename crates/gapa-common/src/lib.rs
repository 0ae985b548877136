//! Common utilities for gapa.
//!
//! This crate provides foundational types and utilities used across all gapa crates:
//!
//! - [`BinaryReader`] - Zero-copy big-endian reading from byte slices
//! - [`BinaryWriter`] - Big-endian buffer builder with alignment and back-patching
//! - [`sjis`] - Shift-JIS string decoding/encoding used by the game's tables
//! - [`ErrorKind`] - The error taxonomy shared by every codec crate

mod error;
mod reader;
mod writer;

pub mod sjis;

pub use error::{Error, ErrorKind, Result};
pub use reader::BinaryReader;
pub use writer::{align_up, BinaryWriter};

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Re-export zerocopy's big-endian integer types used in on-disk headers.
pub mod be {
    pub use zerocopy::byteorder::big_endian::{I16, U16, U32};
}
