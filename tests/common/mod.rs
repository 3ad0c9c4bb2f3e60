#![allow(dead_code)]

use bytes::{BufMut, Bytes, BytesMut};

/// Builders for raw pgoutput messages used across integration tests

pub fn begin(final_lsn: u64, timestamp: i64, xid: u32) -> Bytes {
    let mut buf = BytesMut::new();
    buf.put_u8(b'B');
    buf.put_u64(final_lsn);
    buf.put_i64(timestamp);
    buf.put_u32(xid);
    buf.freeze()
}

pub fn commit(commit_lsn: u64, end_lsn: u64, timestamp: i64) -> Bytes {
    let mut buf = BytesMut::new();
    buf.put_u8(b'C');
    buf.put_u8(0);
    buf.put_u64(commit_lsn);
    buf.put_u64(end_lsn);
    buf.put_i64(timestamp);
    buf.freeze()
}

pub fn relation(rel_id: u32, schema: &str, table: &str, columns: &[(&str, u32, bool)]) -> Bytes {
    let mut buf = BytesMut::new();
    buf.put_u8(b'R');
    buf.put_u32(rel_id);
    put_cstring(&mut buf, schema);
    put_cstring(&mut buf, table);
    buf.put_u8(b'd');
    buf.put_u16(columns.len() as u16);

    for (name, type_id, is_key) in columns {
        buf.put_u8(u8::from(*is_key));
        put_cstring(&mut buf, name);
        buf.put_u32(*type_id);
        buf.put_i32(-1);
    }

    buf.freeze()
}

pub fn insert(rel_id: u32, values: &[Option<&str>]) -> Bytes {
    let mut buf = BytesMut::new();
    buf.put_u8(b'I');
    buf.put_u32(rel_id);
    buf.put_u8(b'N');
    put_tuple(&mut buf, values);
    buf.freeze()
}

pub fn update(rel_id: u32, old: Option<(u8, &[Option<&str>])>, new: &[Option<&str>]) -> Bytes {
    let mut buf = BytesMut::new();
    buf.put_u8(b'U');
    buf.put_u32(rel_id);
    if let Some((role, values)) = old {
        buf.put_u8(role);
        put_tuple(&mut buf, values);
    }
    buf.put_u8(b'N');
    put_tuple(&mut buf, new);
    buf.freeze()
}

pub fn delete(rel_id: u32, role: u8, values: &[Option<&str>]) -> Bytes {
    let mut buf = BytesMut::new();
    buf.put_u8(b'D');
    buf.put_u32(rel_id);
    buf.put_u8(role);
    put_tuple(&mut buf, values);
    buf.freeze()
}

pub fn truncate(options: u8, rel_ids: &[u32]) -> Bytes {
    let mut buf = BytesMut::new();
    buf.put_u8(b'T');
    buf.put_u32(rel_ids.len() as u32);
    buf.put_u8(options);
    for id in rel_ids {
        buf.put_u32(*id);
    }
    buf.freeze()
}

pub fn put_cstring(buf: &mut BytesMut, s: &str) {
    buf.put(s.as_bytes());
    buf.put_u8(0);
}

pub fn put_tuple(buf: &mut BytesMut, values: &[Option<&str>]) {
    buf.put_u16(values.len() as u16);
    for value in values {
        match value {
            Some(v) => {
                buf.put_u8(b't');
                buf.put_i32(v.len() as i32);
                buf.put(v.as_bytes());
            }
            None => buf.put_u8(b'n'),
        }
    }
}
