//! TupleData sub-message decoding.
//!
//! ```text
//! Int16      number of columns
//! per column one of:
//!   Byte1('n')                       NULL
//!   Byte1('u')                       unchanged TOASTed value, not sent
//!   Byte1('t') Int32 len, Byte(len)  text-format value
//! ```

use tracing::trace;

use super::codec::decode_utf8;
use super::cursor::MessageCursor;
use super::types::{ColumnValue, TupleData};
use crate::{Error, Result};

impl TupleData {
    /// Decodes tuple data at the cursor, leaving the cursor just past it.
    pub fn decode(cursor: &mut MessageCursor<'_>) -> Result<Self> {
        let num_columns = cursor.read_count16("tuple column")?;
        let mut columns = Vec::with_capacity(num_columns);

        for index in 0..num_columns {
            let kind = cursor.read_u8()?;

            let value = match kind {
                b'n' => ColumnValue::Null,
                b'u' => ColumnValue::Unchanged,
                b't' => {
                    let raw_len = cursor.read_i32()?;
                    let length = u32::try_from(raw_len).map_err(|_| {
                        Error::structural(format!(
                            "negative text length {} for column {}",
                            raw_len, index
                        ))
                    })?;
                    let value = decode_utf8(cursor.take(length as usize)?)?;
                    ColumnValue::Text { length, value }
                }
                other => {
                    return Err(Error::structural(format!(
                        "unknown column value kind {:?} for column {}",
                        other as char, index
                    )));
                }
            };

            columns.push(value);
        }

        trace!("TUPLE: {} columns, ends at {}", num_columns, cursor.position());
        Ok(TupleData { columns })
    }
}

/// Decodes tuple data starting at `start` and returns the position right
/// after it together with the values.
pub fn decode_tuple_data(buffer: &[u8], start: usize) -> Result<(usize, TupleData)> {
    let mut cursor = MessageCursor::at(buffer, start);
    let tuple = TupleData::decode(&mut cursor)?;
    Ok((cursor.position(), tuple))
}
