// Copyright 2016 Martin Grabmueller. See the LICENSE file at the
// top-level directory of this distribution for license information.

//! A streaming codec for Gordon Key, a byte-oriented LZ77-style
//! sliding-window compression format.
//!
//! Both halves of the codec are resumable state machines: a single call to
//! [`Compressor::compress`] or [`Decompressor::decompress`] consumes as
//! much of a supplied input chunk as it can and writes as much output as
//! there's room for, then returns a [`Status`] describing why it stopped.
//! Feeding it another chunk (or more output room) picks up exactly where
//! the last call left off, so a whole stream can be pushed through in
//! pieces of whatever size is convenient to the caller.

pub mod bitio;
pub mod compress;
pub mod decompress;
pub mod error;
pub mod format;
pub mod history;
pub mod params;

pub use compress::Compressor;
pub use decompress::Decompressor;
pub use error::Status;
pub use params::{Params, Sink};

/// The base-2 logarithm of a history window's size, from 0 up to
/// [`HistoryLog2::MAX`].
///
/// A bare `u8` would let a caller hand the engines an out-of-range
/// exponent; this newtype pushes that check to construction time instead
/// of leaving it as an internal assumption the state machines must trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLog2(u8);

impl HistoryLog2 {
    /// The largest history size the wire format and bit accumulator
    /// support: `2^24` bytes.
    pub const MAX: u8 = format::MAX_HISTORY_LOG2;

    pub fn new(history_log2: u8) -> Option<HistoryLog2> {
        if history_log2 <= Self::MAX {
            Some(HistoryLog2(history_log2))
        } else {
            None
        }
    }

    pub fn get(self) -> u32 {
        self.0 as u32
    }
}
