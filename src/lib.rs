//! Decoder for the binary message stream of PostgreSQL's `pgoutput`
//! logical replication plugin.
//!
//! Each call decodes one complete message buffer into a [`ChangeEvent`].
//! Connection handling, acknowledgements and type coercion are left to the
//! caller.
//!
//! ```rust
//! use pgoutput_decoder::{decode_message, ChangeEvent};
//!
//! let mut truncate = vec![b'T'];
//! truncate.extend_from_slice(&1i32.to_be_bytes()); // relation count
//! truncate.push(1); // CASCADE
//! truncate.extend_from_slice(&16384i32.to_be_bytes());
//!
//! match decode_message(&truncate).unwrap() {
//!     Some(ChangeEvent::Truncate(t)) => assert!(t.cascade),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod lsn;
pub mod postgres;
pub mod serializer;

pub use self::config::{Config, DecoderConfig};
pub use diagnostics::{DiagnosticSink, RecordingSink, TracingSink};
pub use error::{Error, Result};
pub use lsn::Lsn;
pub use postgres::{
    decode_message, ChangeEvent, ColumnValue, MessageKind, PgOutputDecoder, TupleData, XLogData,
};
pub use serializer::{JsonSerializer, SerializationFormat};
