use super::codec::{decode_int, decode_timestamp};
use super::scanner::scan_cstring;
use crate::diagnostics::DiagnosticSink;
use crate::lsn::Lsn;
use crate::{Error, Result};
use chrono::{DateTime, Utc};

/// Read position inside one message buffer.
///
/// A cursor is owned by a single decode call. It only ever moves forward and
/// refuses any read that would go past the end of the buffer.
#[derive(Debug, Clone)]
pub struct MessageCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> MessageCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::UnexpectedEof {
                position: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(decode_int(self.take(2)?)? as i16)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(decode_int(self.take(4)?)? as i32)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        decode_int(self.take(8)?)
    }

    /// Reads a 4-byte OID-like field. The wire encoding is signed, the
    /// identifiers themselves are unsigned.
    pub fn read_oid(&mut self) -> Result<u32> {
        Ok(self.read_i32()? as u32)
    }

    pub fn read_lsn(&mut self) -> Result<Lsn> {
        Ok(Lsn::from(self.read_i64()?))
    }

    pub fn read_timestamp(&mut self) -> Result<DateTime<Utc>> {
        decode_timestamp(self.read_i64()?)
    }

    /// Reads a 16-bit count, rejecting negative values.
    pub fn read_count16(&mut self, what: &str) -> Result<usize> {
        let raw = self.read_i16()?;
        usize::try_from(raw)
            .map_err(|_| Error::structural(format!("negative {} count: {}", what, raw)))
    }

    pub fn read_cstring<S>(&mut self, limit: usize, sink: &S) -> Result<String>
    where
        S: DiagnosticSink + ?Sized,
    {
        let (end, text) = scan_cstring(self.buf, self.pos, limit, sink)?;
        self.pos = end;
        Ok(text)
    }

    /// Consumes the leading tag byte and checks it against `expected`.
    pub fn expect_tag(&mut self, expected: u8) -> Result<()> {
        let found = self.read_u8()?;
        if found != expected {
            return Err(Error::TagMismatch {
                expected: expected as char,
                found,
            });
        }
        Ok(())
    }
}
