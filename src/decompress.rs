//! The decompressing half of the codec: a resumable state machine reading
//! directives from the bit stream and replaying them against the history
//! window.

use crate::bitio::BitAccumulator;
use crate::format::read_size_bits;
use crate::history::HistoryWindow;
use crate::params::{Params, Sink};
use crate::Status;

/// All states a decompressor can be in between calls to
/// [`Decompressor::decompress`]. The initial (and reset) state is
/// `Progress`, matching zero-initialized fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecompState {
    Progress,
    GetType,
    GetOffset,
    GetSize,
    CopyData,
    GetByte,
    PutByte,
}

/// Decompresses a Gordon Key sliding-window compressed stream.
pub struct Decompressor {
    state: DecompState,
    in_total: usize,
    out_total: usize,
    read_offset: usize,
    read_size: usize,
    acc: BitAccumulator,
    literal: u8,
    history_log2: u32,
    history: HistoryWindow,
}

impl Decompressor {
    pub fn new(history_log2: crate::HistoryLog2) -> Decompressor {
        let history_log2 = history_log2.get();
        Decompressor {
            state: DecompState::Progress,
            in_total: 0,
            out_total: 0,
            read_offset: 0,
            read_size: 0,
            acc: BitAccumulator::new(),
            literal: 0,
            history_log2,
            history: HistoryWindow::new(history_log2),
        }
    }

    /// Forget everything decompressed so far, as if freshly constructed.
    pub fn reset(&mut self) {
        self.state = DecompState::Progress;
        self.in_total = 0;
        self.out_total = 0;
        self.read_offset = 0;
        self.read_size = 0;
        self.acc.reset();
        self.literal = 0;
        self.history.reset();
    }

    /// Consume as much of `params.in_buf` as possible, writing decompressed
    /// output to `params.out`.
    ///
    /// Unlike the compressor, there's no flush request: the decompressor
    /// simply stops with `Ok` whenever it needs more input than is
    /// available, as long as that happens at a directive boundary (any
    /// other truncation is reported as `TruncatedInput`).
    pub fn decompress(&mut self, params: &mut Params) -> Status {
        loop {
            match self.state {
                DecompState::Progress => {
                    log::trace!(
                        "decompress: reporting progress ({} in, {} out)",
                        self.in_total,
                        self.out_total
                    );
                    if !params.report_progress(self.in_total, self.out_total) {
                        return Status::Aborted;
                    }
                    self.state = DecompState::GetType;
                }
                DecompState::GetType => {
                    log::trace!("decompress: getting type of command");
                    match self.read_bits(params, 1) {
                        Some(bits) => {
                            self.state = if bits != 0 {
                                DecompState::GetOffset
                            } else {
                                DecompState::GetByte
                            };
                        }
                        None => {
                            // Valid end of stream: happens to coincide with
                            // the end of the previous command.
                            debug_assert!(self.acc.residual_is_zero());
                            return Status::Ok;
                        }
                    }
                }
                DecompState::GetOffset => {
                    log::trace!("decompress: getting copy offset");
                    match self.read_bits(params, self.history_log2) {
                        Some(bits) => {
                            // This is really an offset from 2^history_log2
                            // bytes behind the write position, but the
                            // window is circular so that's irrelevant.
                            self.read_offset = bits as usize;
                            self.state = DecompState::GetSize;
                        }
                        None => return Status::TruncatedInput,
                    }
                }
                DecompState::GetSize => {
                    log::trace!("decompress: getting copy size");
                    let nbits = read_size_bits(self.history_log2, self.read_offset);
                    match self.read_bits(params, nbits) {
                        Some(bits) => {
                            let window_size = 1usize << self.history_log2;
                            if bits == 0 || self.read_offset + bits as usize > window_size {
                                return Status::BadInput;
                            }
                            self.read_size = bits as usize;
                            self.state = DecompState::CopyData;
                        }
                        None => return Status::TruncatedInput,
                    }
                }
                DecompState::CopyData => {
                    log::trace!("decompress: copying matched data");
                    let mut out = std::mem::replace(&mut params.out, Sink::Sizing(0));
                    let copied =
                        self.history
                            .copy_within(Some(&mut out), self.read_offset, self.read_size);
                    params.out = out;
                    self.out_total += copied;
                    debug_assert!(copied <= self.read_size);
                    if copied >= self.read_size {
                        self.state = DecompState::Progress;
                    } else {
                        self.read_size -= copied;
                        return Status::BufferOverflow;
                    }
                }
                DecompState::GetByte => {
                    log::trace!("decompress: getting literal value");
                    match self.read_bits(params, 8) {
                        Some(bits) => {
                            self.literal = bits as u8;
                            self.state = DecompState::PutByte;
                        }
                        None => {
                            // May be a valid end of stream: trailing bits
                            // after the final command must be zero.
                            if self.acc.residual_is_zero() {
                                return Status::Ok;
                            } else {
                                return Status::TruncatedInput;
                            }
                        }
                    }
                }
                DecompState::PutByte => {
                    log::trace!("decompress: putting literal value");
                    if params.out.write_final(std::slice::from_ref(&self.literal)) == 1 {
                        self.history.write(std::slice::from_ref(&self.literal));
                        self.out_total += 1;
                        self.state = DecompState::Progress;
                    } else {
                        return Status::BufferOverflow;
                    }
                }
            }
        }
    }

    /// Read `nbits` bits and keep `in_total` in sync with however many
    /// input bytes that consumed.
    fn read_bits(&mut self, params: &mut Params, nbits: u32) -> Option<u32> {
        let before = params.in_buf.len();
        let value = self.acc.read_bits(&mut params.in_buf, nbits);
        self.in_total += before - params.in_buf.len();
        value
    }
}
