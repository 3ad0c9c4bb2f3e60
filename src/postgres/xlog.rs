use bytes::{Buf, BufMut, Bytes, BytesMut};
use chrono::{DateTime, Utc};

use super::codec::{decode_timestamp, encode_timestamp};
use crate::lsn::Lsn;
use crate::{Error, Result};

const XLOGDATA_HEADER_LEN: usize = 24;

/// Replication CopyData frame (`w`) carrying one pgoutput message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XLogData {
    pub wal_start: Lsn,
    pub wal_end: Lsn,
    pub server_time: DateTime<Utc>,
    /// The pgoutput message, tag byte included.
    pub payload: Bytes,
}

impl XLogData {
    pub fn parse(frame: Bytes) -> Result<Self> {
        let mut cursor = frame;

        if cursor.is_empty() {
            return Err(Error::InvalidFrame {
                message: "empty CopyData payload".to_string(),
            });
        }

        let kind = cursor.get_u8();
        if kind != b'w' {
            return Err(Error::InvalidFrame {
                message: format!("expected XLogData ('w'), found {:#04x}", kind),
            });
        }

        if cursor.remaining() < XLOGDATA_HEADER_LEN {
            return Err(Error::InvalidFrame {
                message: format!(
                    "XLogData header too short: {} bytes (need {})",
                    cursor.remaining(),
                    XLOGDATA_HEADER_LEN
                ),
            });
        }

        let wal_start = Lsn::from(cursor.get_i64());
        let wal_end = Lsn::from(cursor.get_i64());
        let server_time = decode_timestamp(cursor.get_i64())?;

        Ok(Self {
            wal_start,
            wal_end,
            server_time,
            payload: cursor,
        })
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(1 + XLOGDATA_HEADER_LEN + self.payload.len());
        buf.put_u8(b'w');
        buf.put_u64(self.wal_start.value());
        buf.put_u64(self.wal_end.value());
        buf.put_i64(encode_timestamp(self.server_time));
        buf.put(self.payload.clone());
        buf.freeze()
    }
}
