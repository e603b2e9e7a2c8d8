//! Shared driving helpers for the integration tests: feed a compressor or
//! decompressor through arbitrary input/output chunk boundaries and collect
//! whatever it produces, the way a real caller streaming through a pipe
//! would.

use gkey::{Compressor, Decompressor, HistoryLog2, Params, Sink, Status};

/// Feed one chunk of input through `comp` to exhaustion, growing `produced`
/// with whatever gets drained through `scratch` along the way.
fn feed_one(comp: &mut Compressor, mut feed: &[u8], produced: &mut Vec<u8>, scratch: &mut [u8]) {
    loop {
        let mut params = Params::new(feed, Sink::Buffer(scratch));
        let status = comp.compress(&mut params);
        let used = scratch.len() - params.out.buffer_remaining();
        produced.extend_from_slice(&scratch[..used]);
        feed = params.in_buf;
        match status {
            Status::Ok if feed.is_empty() => break,
            Status::Ok | Status::BufferOverflow => continue,
            other => panic!("unexpected compress status {other:?}"),
        }
    }
}

/// Compress `input` in one logical stream, split across `in_chunks` input
/// slices (an empty trailing slice is appended automatically as the flush
/// signal) and metered through `out_chunk` bytes of output space at a time.
pub fn compress_chunked(history_log2: u8, input: &[u8], in_chunks: &[usize], out_chunk: usize) -> Vec<u8> {
    let mut comp = Compressor::new(HistoryLog2::new(history_log2).unwrap());
    let mut produced = Vec::new();
    let mut scratch = vec![0u8; out_chunk.max(1)];

    let mut remaining = input;

    for &size in in_chunks {
        let take = size.min(remaining.len());
        let (chunk, rest) = remaining.split_at(take);
        remaining = rest;
        feed_one(&mut comp, chunk, &mut produced, &mut scratch);
    }
    if !remaining.is_empty() {
        feed_one(&mut comp, remaining, &mut produced, &mut scratch);
    }

    // Flush.
    loop {
        let mut params = Params::new(&[], Sink::Buffer(&mut scratch));
        let status = comp.compress(&mut params);
        let used = scratch.len() - params.out.buffer_remaining();
        produced.extend_from_slice(&scratch[..used]);
        match status {
            Status::Finished => break,
            Status::Ok | Status::BufferOverflow => continue,
            other => panic!("unexpected compress status {other:?} during flush"),
        }
    }

    produced
}

pub fn compress_all(history_log2: u8, input: &[u8]) -> Vec<u8> {
    compress_chunked(history_log2, input, &[], input.len().max(1) * 2 + 16)
}

/// Run `compress_all` in sizing mode (no output buffer) and return the byte
/// count it reports.
pub fn compress_sizing(history_log2: u8, input: &[u8]) -> usize {
    let mut comp = Compressor::new(HistoryLog2::new(history_log2).unwrap());
    let mut remaining = input;
    let mut required = 0usize;
    loop {
        let mut params = Params::new(remaining, Sink::Sizing(0));
        let status = comp.compress(&mut params);
        required += params.out.required();
        remaining = params.in_buf;
        match status {
            Status::Ok => {
                if remaining.is_empty() {
                    break;
                }
            }
            other => panic!("unexpected status {other:?} during sizing compress"),
        }
    }
    loop {
        let mut params = Params::new(&[], Sink::Sizing(0));
        let status = comp.compress(&mut params);
        required += params.out.required();
        match status {
            Status::Finished => break,
            Status::Ok => continue,
            other => panic!("unexpected status {other:?} during sizing flush"),
        }
    }
    required
}

/// Decompress `input` metered through `out_chunk` bytes of output space at
/// a time. Panics on anything but a clean `Ok` end of stream.
pub fn decompress_all(history_log2: u8, input: &[u8], out_chunk: usize) -> Vec<u8> {
    let mut decomp = Decompressor::new(HistoryLog2::new(history_log2).unwrap());
    let mut produced = Vec::new();
    let mut scratch = vec![0u8; out_chunk.max(1)];
    let mut remaining = input;
    loop {
        let mut params = Params::new(remaining, Sink::Buffer(&mut scratch));
        let status = decomp.decompress(&mut params);
        let used = scratch.len() - params.out.buffer_remaining();
        produced.extend_from_slice(&scratch[..used]);
        remaining = params.in_buf;
        match status {
            Status::Ok if remaining.is_empty() => break,
            Status::Ok | Status::BufferOverflow => continue,
            other => panic!("unexpected decompress status {other:?}"),
        }
    }
    produced
}

/// Like [`decompress_all`], but surfaces the terminal status instead of
/// panicking, for tests that expect `BadInput`/`TruncatedInput`.
pub fn decompress_expect(history_log2: u8, input: &[u8], out_chunk: usize) -> Status {
    let mut decomp = Decompressor::new(HistoryLog2::new(history_log2).unwrap());
    let mut scratch = vec![0u8; out_chunk.max(1)];
    let mut remaining = input;
    loop {
        let mut params = Params::new(remaining, Sink::Buffer(&mut scratch));
        let status = decomp.decompress(&mut params);
        remaining = params.in_buf;
        match status {
            Status::Ok if remaining.is_empty() => return Status::Ok,
            Status::Ok => continue,
            other => return other,
        }
    }
}

pub fn decompress_sizing(history_log2: u8, input: &[u8]) -> usize {
    let mut decomp = Decompressor::new(HistoryLog2::new(history_log2).unwrap());
    let mut remaining = input;
    let mut required = 0usize;
    loop {
        let mut params = Params::new(remaining, Sink::Sizing(0));
        let status = decomp.decompress(&mut params);
        required += params.out.required();
        remaining = params.in_buf;
        match status {
            Status::Ok if remaining.is_empty() => break,
            Status::Ok => continue,
            other => panic!("unexpected status {other:?} during sizing decompress"),
        }
    }
    required
}
