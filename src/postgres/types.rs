use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::lsn::Lsn;

/// Top-level pgoutput message kinds this crate decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Begin,
    Commit,
    Relation,
    Insert,
    Update,
    Delete,
    Truncate,
}

impl MessageKind {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'B' => Some(MessageKind::Begin),
            b'C' => Some(MessageKind::Commit),
            b'R' => Some(MessageKind::Relation),
            b'I' => Some(MessageKind::Insert),
            b'U' => Some(MessageKind::Update),
            b'D' => Some(MessageKind::Delete),
            b'T' => Some(MessageKind::Truncate),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            MessageKind::Begin => b'B',
            MessageKind::Commit => b'C',
            MessageKind::Relation => b'R',
            MessageKind::Insert => b'I',
            MessageKind::Update => b'U',
            MessageKind::Delete => b'D',
            MessageKind::Truncate => b'T',
        }
    }
}

/// One decoded pgoutput message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChangeEvent {
    Begin(Begin),
    Commit(Commit),
    Relation(Relation),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    Truncate(Truncate),
}

impl ChangeEvent {
    pub fn kind(&self) -> MessageKind {
        match self {
            ChangeEvent::Begin(_) => MessageKind::Begin,
            ChangeEvent::Commit(_) => MessageKind::Commit,
            ChangeEvent::Relation(_) => MessageKind::Relation,
            ChangeEvent::Insert(_) => MessageKind::Insert,
            ChangeEvent::Update(_) => MessageKind::Update,
            ChangeEvent::Delete(_) => MessageKind::Delete,
            ChangeEvent::Truncate(_) => MessageKind::Truncate,
        }
    }

    /// Relation the event refers to, for row-level events.
    pub fn relation_id(&self) -> Option<u32> {
        match self {
            ChangeEvent::Relation(r) => Some(r.relation_id),
            ChangeEvent::Insert(i) => Some(i.relation_id),
            ChangeEvent::Update(u) => Some(u.relation_id),
            ChangeEvent::Delete(d) => Some(d.relation_id),
            ChangeEvent::Begin(_) | ChangeEvent::Commit(_) | ChangeEvent::Truncate(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Begin {
    pub final_lsn: Lsn,
    pub commit_timestamp: DateTime<Utc>,
    pub xid: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    /// Currently unused by the server, always 0.
    pub flags: u8,
    pub commit_lsn: Lsn,
    pub end_lsn: Lsn,
    pub commit_timestamp: DateTime<Utc>,
}

/// Table schema as announced before the first row event that uses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relation {
    pub relation_id: u32,
    /// Empty for `pg_catalog`.
    pub namespace: String,
    pub relation_name: String,
    pub replica_identity: ReplicaIdentity,
    pub columns: Vec<ColumnDescriptor>,
}

impl Relation {
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.relation_name.clone()
        } else {
            format!("{}.{}", self.namespace, self.relation_name)
        }
    }

    pub fn key_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.is_key)
    }
}

/// `relreplident` of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplicaIdentity {
    Default,
    Nothing,
    Full,
    Index,
    Unknown(u8),
}

impl ReplicaIdentity {
    pub fn from_code(code: u8) -> Self {
        match code {
            b'd' => ReplicaIdentity::Default,
            b'n' => ReplicaIdentity::Nothing,
            b'f' => ReplicaIdentity::Full,
            b'i' => ReplicaIdentity::Index,
            other => ReplicaIdentity::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    /// Raw flags byte; bit 0 marks a key column.
    pub flags: u8,
    pub is_key: bool,
    pub name: String,
    pub type_oid: u32,
    /// `atttypmod`, -1 when the type has none.
    pub type_modifier: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insert {
    pub relation_id: u32,
    pub new_tuple: TupleData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Update {
    pub relation_id: u32,
    /// `K` or `O` when prior-row information was sent.
    pub optional_tuple_identifier: Option<TupleRole>,
    pub old_tuple: Option<TupleData>,
    pub new_tuple: TupleData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delete {
    pub relation_id: u32,
    pub tuple_role: TupleRole,
    /// Key columns or the full old row, depending on `tuple_role`.
    pub old_tuple: TupleData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Truncate {
    /// Raw option bits as sent on the wire.
    pub options: u8,
    pub cascade: bool,
    pub restart_identity: bool,
    pub relation_ids: Vec<u32>,
}

/// Meaning of the tuple that precedes the new row in Update and Delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TupleRole {
    /// Replica identity key columns only.
    #[serde(rename = "K")]
    Key,
    /// Full old row (`REPLICA IDENTITY FULL`).
    #[serde(rename = "O")]
    Old,
}

impl TupleRole {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'K' => Some(TupleRole::Key),
            b'O' => Some(TupleRole::Old),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            TupleRole::Key => b'K',
            TupleRole::Old => b'O',
        }
    }
}

/// Column values of one row, in relation column order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct TupleData {
    pub columns: Vec<ColumnValue>,
}

impl TupleData {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ColumnValue> {
        self.columns.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnValue> {
        self.columns.iter()
    }
}

impl From<Vec<ColumnValue>> for TupleData {
    fn from(columns: Vec<ColumnValue>) -> Self {
        Self { columns }
    }
}

impl<'a> IntoIterator for &'a TupleData {
    type Item = &'a ColumnValue;
    type IntoIter = std::slice::Iter<'a, ColumnValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnValue {
    Null,
    /// Unchanged TOASTed value; the server did not send it.
    Unchanged,
    Text { length: u32, value: String },
}

impl ColumnValue {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        ColumnValue::Text {
            length: value.len() as u32,
            value,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ColumnValue::Text { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }
}
