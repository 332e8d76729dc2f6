//! JSON-lines framing for packet dumps and replays.
//!
//! One message per line, newline-terminated. Keeps serialization explicit
//! so recorded sessions stay readable and diffable.

use anyhow::Context;
use bytes::{BufMut, Bytes, BytesMut};
use serde::{de::DeserializeOwned, Serialize};

/// Encodes one message as a newline-terminated JSON line.
pub fn encode_line<T: Serialize>(msg: &T) -> anyhow::Result<Bytes> {
    let payload = serde_json::to_vec(msg).context("serialize msg")?;
    let mut buf = BytesMut::with_capacity(payload.len() + 1);
    buf.extend_from_slice(&payload);
    buf.put_u8(b'\n');
    Ok(buf.freeze())
}

/// Decodes one line; surrounding whitespace is ignored.
pub fn decode_line<T: DeserializeOwned>(line: &[u8]) -> anyhow::Result<T> {
    serde_json::from_slice(line).context("deserialize msg")
}
