pub mod codec;
pub mod cursor;
pub mod decoder;
pub mod scanner;
pub mod tuple;
pub mod types;
pub mod xlog;

#[cfg(test)]
mod test_utils;

pub use codec::{decode_int, decode_timestamp, decode_utf8, encode_timestamp, PG_EPOCH_OFFSET_MICROS};
pub use cursor::MessageCursor;
pub use decoder::{decode_message, PgOutputDecoder};
pub use scanner::{scan_cstring, DEFAULT_CSTRING_SCAN_LIMIT};
pub use tuple::decode_tuple_data;
pub use types::*;
pub use xlog::XLogData;
