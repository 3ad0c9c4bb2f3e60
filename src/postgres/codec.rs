//! Fixed-width primitives used by every pgoutput message.

use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// Microseconds between the Unix epoch and 2000-01-01T00:00:00Z.
pub const PG_EPOCH_OFFSET_MICROS: i64 = 946_684_800_000_000;

/// Decodes a big-endian two's-complement integer of 1, 2, 4 or 8 bytes.
pub fn decode_int(bytes: &[u8]) -> Result<i64> {
    match *bytes {
        [b0] => Ok(i64::from(i8::from_be_bytes([b0]))),
        [b0, b1] => Ok(i64::from(i16::from_be_bytes([b0, b1]))),
        [b0, b1, b2, b3] => Ok(i64::from(i32::from_be_bytes([b0, b1, b2, b3]))),
        [b0, b1, b2, b3, b4, b5, b6, b7] => {
            Ok(i64::from_be_bytes([b0, b1, b2, b3, b4, b5, b6, b7]))
        }
        _ => Err(Error::InvalidIntegerWidth(bytes.len())),
    }
}

/// Converts microseconds since the PostgreSQL epoch (2000-01-01 UTC)
/// into a calendar time.
pub fn decode_timestamp(micros: i64) -> Result<DateTime<Utc>> {
    micros
        .checked_add(PG_EPOCH_OFFSET_MICROS)
        .and_then(DateTime::<Utc>::from_timestamp_micros)
        .ok_or(Error::TimestampOutOfRange(micros))
}

/// Inverse of [`decode_timestamp`].
pub fn encode_timestamp(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_micros() - PG_EPOCH_OFFSET_MICROS
}

pub fn decode_utf8(bytes: &[u8]) -> Result<String> {
    Ok(std::str::from_utf8(bytes)?.to_owned())
}
