use bytes::{BufMut, Bytes, BytesMut};
use std::collections::HashMap;

/// Mock message builder for testing the pgoutput decoder
pub struct MockMessageBuilder {
    lsn: u64,
    timestamp: i64,
    relations: HashMap<u32, MockRelation>,
}

#[derive(Debug, Clone)]
pub struct MockRelation {
    pub id: u32,
    pub schema: String,
    pub table: String,
    pub replica_identity: u8,
    pub columns: Vec<MockColumn>,
}

#[derive(Debug, Clone)]
pub struct MockColumn {
    pub name: String,
    pub type_id: u32,
    pub is_key: bool,
}

/// One column value inside a TupleData part
#[derive(Debug, Clone, Copy)]
pub enum MockValue<'a> {
    Null,
    Unchanged,
    Text(&'a str),
}

impl MockMessageBuilder {
    pub fn new() -> Self {
        Self {
            lsn: 1000,
            timestamp: 750_681_000_000_000, // 2023-10-15 10:30:00 UTC in microseconds since 2000
            relations: HashMap::new(),
        }
    }

    pub fn with_lsn(mut self, lsn: u64) -> Self {
        self.lsn = lsn;
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn add_relation(
        mut self,
        id: u32,
        schema: &str,
        table: &str,
        columns: Vec<(&str, u32, bool)>,
    ) -> Self {
        let mock_columns = columns
            .into_iter()
            .map(|(name, type_id, is_key)| MockColumn {
                name: name.to_string(),
                type_id,
                is_key,
            })
            .collect();

        self.relations.insert(
            id,
            MockRelation {
                id,
                schema: schema.to_string(),
                table: table.to_string(),
                replica_identity: b'd',
                columns: mock_columns,
            },
        );
        self
    }

    pub fn with_replica_identity(mut self, id: u32, code: u8) -> Self {
        if let Some(relation) = self.relations.get_mut(&id) {
            relation.replica_identity = code;
        }
        self
    }

    /// Build a BEGIN message
    pub fn begin_message(&self, xid: u32) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'B');
        buf.put_u64(self.lsn); // Final LSN
        buf.put_i64(self.timestamp);
        buf.put_u32(xid);
        buf.freeze()
    }

    /// Build a COMMIT message
    pub fn commit_message(&self) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'C');
        buf.put_u8(0); // Flags
        buf.put_u64(self.lsn); // Commit LSN
        buf.put_u64(self.lsn + 100); // End LSN
        buf.put_i64(self.timestamp);
        buf.freeze()
    }

    /// Build a RELATION message
    pub fn relation_message(&self, rel_id: u32) -> Bytes {
        let relation = self
            .relations
            .get(&rel_id)
            .expect("Relation not found. Use add_relation() first.");

        let mut buf = BytesMut::new();
        buf.put_u8(b'R');
        buf.put_u32(relation.id);
        put_cstring(&mut buf, &relation.schema);
        put_cstring(&mut buf, &relation.table);
        buf.put_u8(relation.replica_identity);
        buf.put_u16(relation.columns.len() as u16);

        for column in &relation.columns {
            buf.put_u8(u8::from(column.is_key));
            put_cstring(&mut buf, &column.name);
            buf.put_u32(column.type_id);
            buf.put_i32(-1); // type modifier
        }

        buf.freeze()
    }

    /// Build an INSERT message
    pub fn insert_message(&self, rel_id: u32, values: &[MockValue<'_>]) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'I');
        buf.put_u32(rel_id);
        buf.put_u8(b'N');
        put_tuple(&mut buf, values);
        buf.freeze()
    }

    /// Build an UPDATE message; `old` carries the role byte ('K' or 'O')
    pub fn update_message(
        &self,
        rel_id: u32,
        old: Option<(u8, &[MockValue<'_>])>,
        new_values: &[MockValue<'_>],
    ) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'U');
        buf.put_u32(rel_id);

        if let Some((role, old_values)) = old {
            buf.put_u8(role);
            put_tuple(&mut buf, old_values);
        }

        buf.put_u8(b'N');
        put_tuple(&mut buf, new_values);
        buf.freeze()
    }

    /// Build a DELETE message
    pub fn delete_message(&self, rel_id: u32, role: u8, values: &[MockValue<'_>]) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'D');
        buf.put_u32(rel_id);
        buf.put_u8(role);
        put_tuple(&mut buf, values);
        buf.freeze()
    }

    /// Build a TRUNCATE message
    pub fn truncate_message(&self, options: u8, rel_ids: &[u32]) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'T');
        buf.put_u32(rel_ids.len() as u32);
        buf.put_u8(options);
        for id in rel_ids {
            buf.put_u32(*id);
        }
        buf.freeze()
    }

    /// Build a complete transaction: BEGIN, RELATION, one INSERT, COMMIT
    pub fn insert_transaction(&self, xid: u32, rel_id: u32, values: &[MockValue<'_>]) -> Vec<Bytes> {
        vec![
            self.begin_message(xid),
            self.relation_message(rel_id),
            self.insert_message(rel_id, values),
            self.commit_message(),
        ]
    }
}

pub fn put_cstring(buf: &mut BytesMut, s: &str) {
    buf.put(s.as_bytes());
    buf.put_u8(0);
}

pub fn put_tuple(buf: &mut BytesMut, values: &[MockValue<'_>]) {
    buf.put_u16(values.len() as u16);

    for value in values {
        match value {
            MockValue::Null => buf.put_u8(b'n'),
            MockValue::Unchanged => buf.put_u8(b'u'),
            MockValue::Text(v) => {
                buf.put_u8(b't');
                buf.put_i32(v.len() as i32);
                buf.put(v.as_bytes());
            }
        }
    }
}
