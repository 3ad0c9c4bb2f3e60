use tracing::{debug, trace};

use super::cursor::MessageCursor;
use super::types::{
    Begin, ChangeEvent, ColumnDescriptor, Commit, Delete, Insert, MessageKind, Relation,
    ReplicaIdentity, Truncate, TupleData, TupleRole, Update,
};
use crate::config::DecoderConfig;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::{Error, Result};

const TRUNCATE_CASCADE: u8 = 1;
const TRUNCATE_RESTART_IDENTITY: u8 = 2;

/// Decoder for pgoutput messages.
///
/// Holds no per-stream state: every call works only on the buffer it is
/// given, so a single decoder can be shared between threads as long as its
/// diagnostic sink can.
#[derive(Debug, Clone)]
pub struct PgOutputDecoder<S = TracingSink> {
    config: DecoderConfig,
    sink: S,
}

impl PgOutputDecoder<TracingSink> {
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self::with_sink(config, TracingSink)
    }
}

impl Default for PgOutputDecoder<TracingSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DiagnosticSink> PgOutputDecoder<S> {
    pub fn with_sink(config: DecoderConfig, sink: S) -> Self {
        Self { config, sink }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Routes a message to the decoder matching its first byte.
    ///
    /// Unknown message kinds (Origin, Type, Message, ...) produce `Ok(None)`
    /// and one warning on the diagnostic sink.
    pub fn decode(&self, data: &[u8]) -> Result<Option<ChangeEvent>> {
        let Some(kind) = data.first().copied().and_then(MessageKind::from_tag) else {
            self.sink.warn(&describe_unrecognized(data));
            return Ok(None);
        };

        let event = match kind {
            MessageKind::Begin => ChangeEvent::Begin(self.decode_begin(data)?),
            MessageKind::Commit => ChangeEvent::Commit(self.decode_commit(data)?),
            MessageKind::Relation => ChangeEvent::Relation(self.decode_relation(data)?),
            MessageKind::Insert => ChangeEvent::Insert(self.decode_insert(data)?),
            MessageKind::Update => ChangeEvent::Update(self.decode_update(data)?),
            MessageKind::Delete => ChangeEvent::Delete(self.decode_delete(data)?),
            MessageKind::Truncate => ChangeEvent::Truncate(self.decode_truncate(data)?),
        };

        Ok(Some(event))
    }

    pub fn decode_begin(&self, data: &[u8]) -> Result<Begin> {
        let mut cursor = MessageCursor::new(data);
        cursor.expect_tag(b'B')?;

        let begin = Begin {
            final_lsn: cursor.read_lsn()?,
            commit_timestamp: cursor.read_timestamp()?,
            xid: cursor.read_oid()?,
        };

        trace!("BEGIN: lsn={}, xid={}", begin.final_lsn, begin.xid);
        Ok(begin)
    }

    pub fn decode_commit(&self, data: &[u8]) -> Result<Commit> {
        let mut cursor = MessageCursor::new(data);
        cursor.expect_tag(b'C')?;

        let commit = Commit {
            flags: cursor.read_u8()?,
            commit_lsn: cursor.read_lsn()?,
            end_lsn: cursor.read_lsn()?,
            commit_timestamp: cursor.read_timestamp()?,
        };

        trace!("COMMIT: lsn={}", commit.end_lsn);
        Ok(commit)
    }

    pub fn decode_relation(&self, data: &[u8]) -> Result<Relation> {
        let limit = self.config.cstring_scan_limit;
        let mut cursor = MessageCursor::new(data);
        cursor.expect_tag(b'R')?;

        let relation_id = cursor.read_oid()?;
        let namespace = cursor.read_cstring(limit, &self.sink)?;
        let relation_name = cursor.read_cstring(limit, &self.sink)?;
        let replica_identity = ReplicaIdentity::from_code(cursor.read_u8()?);
        let num_columns = cursor.read_count16("relation column")?;

        let mut columns = Vec::with_capacity(num_columns);
        for _ in 0..num_columns {
            let flags = cursor.read_u8()?;
            let name = cursor.read_cstring(limit, &self.sink)?;
            let type_oid = cursor.read_oid()?;
            let type_modifier = cursor.read_i32()?;

            columns.push(ColumnDescriptor {
                flags,
                is_key: flags & 1 != 0,
                name,
                type_oid,
                type_modifier,
            });
        }

        let relation = Relation {
            relation_id,
            namespace,
            relation_name,
            replica_identity,
            columns,
        };

        debug!(
            "RELATION: {}={} ({} columns)",
            relation_id,
            relation.qualified_name(),
            relation.columns.len()
        );
        Ok(relation)
    }

    pub fn decode_insert(&self, data: &[u8]) -> Result<Insert> {
        let mut cursor = MessageCursor::new(data);
        cursor.expect_tag(b'I')?;

        let relation_id = cursor.read_oid()?;
        let tuple_type = read_marker(&mut cursor, "INSERT tuple type")?;
        // Insert only ever carries a new tuple; any other marker is rejected.
        if tuple_type != b'N' {
            return Err(Error::structural(format!(
                "unexpected tuple type in INSERT: {:?}",
                tuple_type as char
            )));
        }

        let new_tuple = TupleData::decode(&mut cursor)?;

        trace!("INSERT: relation={}, columns={}", relation_id, new_tuple.len());
        Ok(Insert {
            relation_id,
            new_tuple,
        })
    }

    /// Decodes an Update: an optional `K` or `O` tuple, then the mandatory
    /// `N` tuple.
    pub fn decode_update(&self, data: &[u8]) -> Result<Update> {
        let mut cursor = MessageCursor::new(data);
        cursor.expect_tag(b'U')?;

        let relation_id = cursor.read_oid()?;
        let tuple_type = read_marker(&mut cursor, "UPDATE tuple type")?;

        let (optional_tuple_identifier, old_tuple) = if tuple_type == b'N' {
            (None, None)
        } else {
            let role = TupleRole::from_tag(tuple_type).ok_or_else(|| {
                Error::structural(format!(
                    "unexpected tuple type in UPDATE: {:?}",
                    tuple_type as char
                ))
            })?;
            let old_tuple = TupleData::decode(&mut cursor)?;

            let position = cursor.position();
            let next_type = read_marker(&mut cursor, "UPDATE new tuple marker")?;
            if next_type != b'N' {
                return Err(Error::structural(format!(
                    "did not find new tuple marker 'N' at offset {}, found {:?}",
                    position, next_type as char
                )));
            }

            (Some(role), Some(old_tuple))
        };

        let new_tuple = TupleData::decode(&mut cursor)?;

        trace!(
            "UPDATE: relation={}, old={:?}",
            relation_id,
            optional_tuple_identifier
        );
        Ok(Update {
            relation_id,
            optional_tuple_identifier,
            old_tuple,
            new_tuple,
        })
    }

    pub fn decode_delete(&self, data: &[u8]) -> Result<Delete> {
        let mut cursor = MessageCursor::new(data);
        cursor.expect_tag(b'D')?;

        let relation_id = cursor.read_oid()?;
        let tuple_type = read_marker(&mut cursor, "DELETE tuple type")?;
        let tuple_role = TupleRole::from_tag(tuple_type).ok_or_else(|| {
            Error::structural(format!(
                "unexpected tuple type in DELETE: {:?}",
                tuple_type as char
            ))
        })?;

        let old_tuple = TupleData::decode(&mut cursor)?;

        trace!("DELETE: relation={}, role={:?}", relation_id, tuple_role);
        Ok(Delete {
            relation_id,
            tuple_role,
            old_tuple,
        })
    }

    pub fn decode_truncate(&self, data: &[u8]) -> Result<Truncate> {
        let mut cursor = MessageCursor::new(data);
        cursor.expect_tag(b'T')?;

        let raw_count = cursor.read_i32()?;
        // A negative count cannot describe a relation list; reject it.
        let num_relations = usize::try_from(raw_count).map_err(|_| {
            Error::structural(format!("negative relation count in TRUNCATE: {}", raw_count))
        })?;
        let options = cursor.read_u8()?;

        let mut relation_ids = Vec::with_capacity(num_relations.min(cursor.remaining() / 4));
        for _ in 0..num_relations {
            relation_ids.push(cursor.read_oid()?);
        }

        trace!("TRUNCATE: relations={:?}, options={}", relation_ids, options);
        Ok(Truncate {
            options,
            cascade: options & TRUNCATE_CASCADE != 0,
            restart_identity: options & TRUNCATE_RESTART_IDENTITY != 0,
            relation_ids,
        })
    }
}

/// Decodes one message with the default decoder, logging diagnostics
/// through `tracing`.
pub fn decode_message(data: &[u8]) -> Result<Option<ChangeEvent>> {
    PgOutputDecoder::new().decode(data)
}

// A missing sub-tag is a structural problem, not a plain short read.
fn read_marker(cursor: &mut MessageCursor<'_>, what: &str) -> Result<u8> {
    let position = cursor.position();
    cursor.read_u8().map_err(|_| {
        Error::structural(format!("missing {} at offset {}", what, position))
    })
}

fn describe_unrecognized(data: &[u8]) -> String {
    match data.first() {
        None => "unrecognized message: empty buffer".to_string(),
        Some(&tag) => format!(
            "unrecognized message kind {:?} ({:#04x}), {} bytes skipped",
            tag as char,
            tag,
            data.len()
        ),
    }
}
