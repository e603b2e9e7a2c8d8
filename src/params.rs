//! The streaming contract shared by the compressor and the decompressor:
//! an input cursor, an output destination, and an optional progress
//! callback.

use crate::bitio::BitAccumulator;

/// Where output bytes go.
///
/// `Buffer` and `Sizing` hold already-final bytes (the compressor's
/// bit-packed stream, or the decompressor's decoded bytes). `Literals`
/// additionally bit-packs each byte it's given as a 9-bit literal
/// directive before handing it to the wrapped sink underneath, through
/// whatever accumulator its caller supplies — it only ever appears
/// transiently, built by the compressor's `PutBytes` state around its own
/// bit accumulator and whatever the real output destination is, then
/// unwrapped again so later directives keep sharing that same
/// accumulator.
pub enum Sink<'a> {
    Buffer(&'a mut [u8]),
    Sizing(usize),
    Literals(LiteralSink<'a>),
}

pub struct LiteralSink<'a> {
    acc: &'a mut BitAccumulator,
    inner: Box<Sink<'a>>,
}

impl<'a> Sink<'a> {
    /// Wrap `self` so that bytes offered via `accept_literal_byte` get
    /// packed as literal directives through `acc` before reaching it.
    pub fn into_literals(self, acc: &'a mut BitAccumulator) -> Sink<'a> {
        Sink::Literals(LiteralSink {
            acc,
            inner: Box::new(self),
        })
    }

    /// Unwrap a `Literals` sink back to whatever it wrapped. Returns
    /// `self` unchanged if it wasn't `Literals`.
    pub fn into_inner(self) -> Sink<'a> {
        match self {
            Sink::Literals(ls) => *ls.inner,
            other => other,
        }
    }

    /// Accept already-final bytes (bit-packed stream bytes, or decoded
    /// output bytes). Returns the number accepted; less than `data.len()`
    /// means the underlying buffer is full.
    ///
    /// Panics on `Literals`: packed directive bytes never flow through
    /// this path, only through `accept_literal_byte`.
    pub fn write_final(&mut self, data: &[u8]) -> usize {
        match self {
            Sink::Buffer(buf) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                let taken = std::mem::take(buf);
                *buf = &mut taken[n..];
                n
            }
            Sink::Sizing(required) => {
                *required += data.len();
                data.len()
            }
            Sink::Literals(_) => panic!("write_final called on a Literals sink"),
        }
    }

    /// Pack one source byte as a literal directive (type bit `0` followed
    /// by the byte's 8 bits, LSB-first) and drain it toward the wrapped
    /// sink. Returns `true` if accepted, `false` on buffer overflow.
    ///
    /// Panics on anything but `Literals`.
    pub fn accept_literal_byte(&mut self, byte: u8) -> bool {
        match self {
            Sink::Literals(ls) => ls.acc.write_bits(ls.inner.as_mut(), 9, (byte as u32) << 1),
            _ => panic!("accept_literal_byte called on a non-Literals sink"),
        }
    }

    /// Bytes required so far in sizing mode. Meaningless for `Buffer`.
    pub fn required(&self) -> usize {
        match self {
            Sink::Buffer(_) => 0,
            Sink::Sizing(required) => *required,
            Sink::Literals(ls) => ls.inner.required(),
        }
    }

    /// Unused capacity of the wrapped buffer, for callers tracking how
    /// many bytes a call actually produced. Meaningless for `Sizing`.
    pub fn buffer_remaining(&self) -> usize {
        match self {
            Sink::Buffer(buf) => buf.len(),
            Sink::Sizing(_) => 0,
            Sink::Literals(ls) => ls.inner.buffer_remaining(),
        }
    }
}

/// Parameters shared by a single `compress`/`decompress` call.
///
/// `in_buf` and `out` are advanced in place as bytes are consumed or
/// produced, so the same values can be fed into the next call with
/// whatever was left over from this one.
pub struct Params<'a> {
    pub in_buf: &'a [u8],
    pub out: Sink<'a>,
    pub progress: Option<&'a mut dyn FnMut(usize, usize) -> bool>,
}

impl<'a> Params<'a> {
    pub fn new(in_buf: &'a [u8], out: Sink<'a>) -> Params<'a> {
        Params {
            in_buf,
            out,
            progress: None,
        }
    }

    pub fn with_progress(mut self, cb: &'a mut dyn FnMut(usize, usize) -> bool) -> Self {
        self.progress = Some(cb);
        self
    }

    /// Report progress, if a callback was supplied. Returns `false` if the
    /// callback requested cancellation.
    pub(crate) fn report_progress(&mut self, in_total: usize, out_total: usize) -> bool {
        match &mut self.progress {
            Some(cb) => cb(in_total, out_total),
            None => true,
        }
    }
}
