use std::error;
use std::fmt;

/// Outcome of a single `compress`/`decompress` call.
///
/// `Ok` is a steady-state result, not an absence of error: a streaming
/// engine returns `Ok` every time it runs out of input and needs more,
/// which is the common case in the middle of a stream, so this is a
/// plain enum rather than `Result<(), Status>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Consumed all available input (or filled all available output) and
    /// is ready to continue given more of either.
    Ok,
    /// Compressed input includes a directive that the format doesn't
    /// allow (bad offset/size combination).
    BadInput,
    /// Compressed input ends mid-directive, with no further input
    /// supplied. Output produced so far may be incomplete.
    TruncatedInput,
    /// The output buffer was too small to hold everything produced so
    /// far; remaining output wasn't written.
    BufferOverflow,
    /// The progress callback returned `false`.
    Aborted,
    /// No further input will be accepted: a flush completed. Only ever
    /// produced by `Compressor::compress` — the decompressed side has no
    /// flush directive of its own.
    Finished,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match *self {
            Status::Ok => "operation completed successfully",
            Status::BadInput => "input includes invalid compressed data",
            Status::TruncatedInput => "compressed input data is awkwardly truncated",
            Status::BufferOverflow => "output buffer was too small",
            Status::Aborted => "operation aborted by a callback",
            Status::Finished => "no further input will be accepted",
        };
        f.write_str(s)
    }
}

impl error::Error for Status {}
