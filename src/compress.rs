//! The compressing half of the codec: a resumable state machine that
//! searches the history window for the longest sequence matching the
//! upcoming input and emits either a copy directive or one or more
//! literal-byte directives.

use std::cmp::Ordering;

use crate::bitio::BitAccumulator;
use crate::format::{read_size_bits, LITERAL_NBITS};
use crate::history::HistoryWindow;
use crate::params::{Params, Sink};
use crate::Status;

/// All states a compressor can be in between calls to [`Compressor::compress`].
/// The initial (and reset) state is `Progress`: `NextSequence`'s only job is
/// to zero the sequence-search fields, which are already zero on a freshly
/// built or reset compressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompState {
    NextSequence,
    Progress,
    FindSequence,
    PutOffset,
    PutSize,
    PutByte,
    PutBytes,
    Flush,
}

/// Compresses a byte stream into Gordon Key's sliding-window format.
///
/// Holds its own history window and is driven by repeated calls to
/// [`compress`](Compressor::compress), each handed a fresh or continued
/// [`Params`] describing the next chunk of input and however much output
/// room is available.
pub struct Compressor {
    state: CompState,
    in_total: usize,
    out_total: usize,
    max_read_size: usize,
    best_read_offset: usize,
    best_read_size: usize,
    read_offset: usize,
    read_size: usize,
    acc: BitAccumulator,
    history_log2: u32,
    history: HistoryWindow,
}

impl Compressor {
    /// Build a compressor with a history window of `2^history_log2` bytes.
    pub fn new(history_log2: crate::HistoryLog2) -> Compressor {
        let history_log2 = history_log2.get();
        Compressor {
            state: CompState::Progress,
            in_total: 0,
            out_total: 0,
            max_read_size: 0,
            best_read_offset: 0,
            best_read_size: 0,
            read_offset: 0,
            read_size: 0,
            acc: BitAccumulator::new(),
            history_log2,
            history: HistoryWindow::new(history_log2),
        }
    }

    /// Forget everything compressed so far, as if freshly constructed.
    pub fn reset(&mut self) {
        self.state = CompState::Progress;
        self.in_total = 0;
        self.out_total = 0;
        self.max_read_size = 0;
        self.best_read_offset = 0;
        self.best_read_size = 0;
        self.read_offset = 0;
        self.read_size = 0;
        self.acc.reset();
        self.history.reset();
    }

    /// Consume as much of `params.in_buf` as possible, writing compressed
    /// output to `params.out`.
    ///
    /// No input (`params.in_buf` is empty) is a request to flush: finish
    /// whatever sequence search is in progress and pad/drain the bit
    /// accumulator, after which the only possible outcomes are `Finished`
    /// or `BufferOverflow` (calling again after `Finished` would corrupt
    /// the stream with more data after the padding).
    pub fn compress(&mut self, params: &mut Params) -> Status {
        let flush = params.in_buf.is_empty();
        log::debug!("compress: will {}flush", if flush { "" } else { "not " });

        loop {
            match self.state {
                CompState::NextSequence => {
                    self.best_read_size = 0;
                    self.best_read_offset = 0;
                    self.read_size = 0;
                    self.read_offset = 0;
                    self.state = CompState::Progress;
                }
                CompState::Progress => {
                    log::trace!(
                        "compress: reporting progress ({} in, {} out)",
                        self.in_total,
                        self.out_total
                    );
                    if !params.report_progress(self.in_total, self.out_total) {
                        return Status::Aborted;
                    }
                    self.state = CompState::FindSequence;
                }
                CompState::FindSequence => {
                    let found = flush || self.find_sequence(params);
                    if !found {
                        // Stalled: need more input to extend the current
                        // search before a verdict can be reached.
                        return Status::Ok;
                    }
                    if self.read_size == 0 {
                        if !params.in_buf.is_empty() {
                            self.state = CompState::PutByte;
                        } else if flush {
                            self.state = CompState::Flush;
                        } else {
                            // Only possible with a zero-byte history: no
                            // match is ever findable and there's nothing
                            // left to do until more input arrives.
                            debug_assert_eq!(self.history_log2, 0);
                            return Status::Ok;
                        }
                    } else {
                        let nbits = read_size_bits(self.history_log2, self.read_offset);
                        let literal_bits = self.read_size * LITERAL_NBITS as usize;
                        let copy_bits = self.history_log2 as usize + nbits as usize + 1;
                        self.state = if literal_bits <= copy_bits {
                            CompState::PutBytes
                        } else {
                            CompState::PutOffset
                        };
                    }
                }
                CompState::PutOffset => {
                    log::trace!("compress: putting copy offset");
                    let value = ((self.read_offset as u32) << 1) | 1;
                    let ok = self
                        .acc
                        .write_bits(&mut params.out, self.history_log2 + 1, value);
                    self.out_total += self.acc.take_emitted();
                    if ok {
                        self.state = CompState::PutSize;
                    } else {
                        return Status::BufferOverflow;
                    }
                }
                CompState::PutSize => {
                    log::trace!("compress: putting copy size");
                    let nbits = read_size_bits(self.history_log2, self.read_offset);
                    let ok = self
                        .acc
                        .write_bits(&mut params.out, nbits, self.read_size as u32);
                    self.out_total += self.acc.take_emitted();
                    if ok {
                        let copied = self.history.copy_within(None, self.read_offset, self.read_size);
                        debug_assert!(copied <= self.read_size);
                        self.state = CompState::NextSequence;
                    } else {
                        return Status::BufferOverflow;
                    }
                }
                CompState::PutByte => {
                    log::trace!("compress: putting unmatched byte");
                    let byte = params.in_buf[0];
                    let ok = self
                        .acc
                        .write_bits(&mut params.out, LITERAL_NBITS, (byte as u32) << 1);
                    self.out_total += self.acc.take_emitted();
                    if ok {
                        self.history.write(&[byte]);
                        params.in_buf = &params.in_buf[1..];
                        self.in_total += 1;
                        self.state = CompState::NextSequence;
                    } else {
                        return Status::BufferOverflow;
                    }
                }
                CompState::PutBytes => {
                    log::trace!("compress: putting sequence as literal values");
                    let out = std::mem::replace(&mut params.out, Sink::Sizing(0));
                    let mut literal_sink = out.into_literals(&mut self.acc);
                    let copied = self.history.copy_within(
                        Some(&mut literal_sink),
                        self.read_offset,
                        self.read_size,
                    );
                    params.out = literal_sink.into_inner();
                    self.out_total += self.acc.take_emitted();
                    debug_assert!(copied <= self.read_size);
                    if copied >= self.read_size {
                        self.state = CompState::NextSequence;
                    } else {
                        // Read offset is relative to the write position, so
                        // it doesn't need adjusting; only the remaining
                        // count does.
                        self.read_size -= copied;
                        return Status::BufferOverflow;
                    }
                }
                CompState::Flush => {
                    log::trace!("compress: flushing bit accumulator");
                    // Never leaves this state: writing more data after a
                    // flush would corrupt the output.
                    let ok = self.acc.flush(&mut params.out);
                    self.out_total += self.acc.take_emitted();
                    return if ok {
                        Status::Finished
                    } else {
                        Status::BufferOverflow
                    };
                }
            }
        }
    }

    /// Search the history window and upcoming input for the longest
    /// sequence the window can supply, consuming input bytes as it goes.
    ///
    /// Returns `true` once the longest possible match at the current
    /// starting position has been found (`self.read_offset`/`read_size`
    /// describe it); `false` if more input is needed before a verdict can
    /// be reached (the partial search state is preserved for the next
    /// call).
    fn find_sequence(&mut self, params: &mut Params) -> bool {
        let history_log2 = self.history_log2;
        let mut read_offset = self.read_offset;
        let mut read_size = self.read_size;
        let mut max_read_size = self.max_read_size;
        let mut best_read_size = self.best_read_size;
        let mut best_read_offset = self.best_read_offset;
        let mut consumed = 0usize;

        'search: loop {
            if read_size == 0 {
                max_read_size = (1usize << history_log2) - read_offset;
                // The compressor never writes a directive to copy the most
                // recently compressed byte.
                if max_read_size > 0 {
                    max_read_size -= 1;
                }

                if best_read_size >= max_read_size {
                    break 'search;
                }

                let new_byte = if best_read_size == 0 {
                    match params.in_buf.get(consumed) {
                        Some(&b) => b,
                        None => break 'search,
                    }
                } else {
                    self.history.read_char(best_read_offset)
                };

                let old_read_offset = read_offset;
                read_offset = match self.history.find_char(
                    read_offset,
                    max_read_size - best_read_size,
                    new_byte,
                ) {
                    Some(k) => k,
                    None => {
                        max_read_size = 0;
                        break 'search;
                    }
                };
                debug_assert!(read_offset >= old_read_offset);

                if read_size >= best_read_size {
                    consumed += 1;
                }
                read_size += 1;

                max_read_size -= read_offset - old_read_offset;
                debug_assert!(max_read_size > best_read_size);

                if read_size < best_read_size {
                    if self.history.compare(
                        read_offset + read_size,
                        best_read_offset + read_size,
                        best_read_size - read_size,
                    ) != Ordering::Equal
                    {
                        // Look for the next occurrence of the first
                        // character, starting just past this one.
                        read_offset += 1;
                        read_size = 0;
                        continue 'search;
                    }
                    read_size = best_read_size;
                }
            }

            while read_size < max_read_size {
                let new_byte = match params.in_buf.get(consumed) {
                    Some(&b) => b,
                    None => break 'search,
                };
                let old_byte = self.history.read_char(read_offset + read_size);
                if new_byte != old_byte {
                    break;
                }
                consumed += 1;
                read_size += 1;
            }

            if read_size > best_read_size {
                best_read_offset = read_offset;
                best_read_size = read_size;
            }

            read_offset += 1;
            read_size = 0;
        }

        self.in_total += consumed;
        params.in_buf = &params.in_buf[consumed..];

        let success = best_read_size >= max_read_size;
        if success {
            self.read_size = best_read_size;
            self.read_offset = best_read_offset;
        } else {
            self.read_size = read_size;
            self.read_offset = read_offset;
        }
        self.max_read_size = max_read_size;
        self.best_read_size = best_read_size;
        self.best_read_offset = best_read_offset;

        success
    }
}
