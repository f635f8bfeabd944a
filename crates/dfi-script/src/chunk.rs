//! Script chunk parsing and push encoding.
//!
//! A script chunk is either an opcode or a data push with its associated
//! bytes. Decoding follows the consensus `GetOp` rules: OP_RETURN carries
//! no implicit payload and every push length is bounds-checked.

use crate::opcodes::*;
use crate::ScriptError;

/// A single parsed element of a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptChunk {
    /// The opcode byte. For direct pushes (1-75 bytes), this is the length.
    pub op: u8,
    /// The pushed bytes, for OP_0 and every push opcode.
    pub data: Option<Vec<u8>>,
}

impl ScriptChunk {
    /// True when the opcode pushes data (OP_0 through OP_PUSHDATA4).
    pub fn is_push(&self) -> bool {
        self.op <= OP_PUSHDATA4
    }
}

/// Read one chunk starting at `*pos`, advancing the cursor past it.
pub fn read_chunk(bytes: &[u8], pos: &mut usize) -> Result<ScriptChunk, ScriptError> {
    let offset = *pos;
    let op = bytes[offset];
    let (header, len) = match op {
        OP_0 => (1, 0),
        0x01..=0x4b => (1, op as usize),
        OP_PUSHDATA1 => (2, read_len(bytes, offset + 1, 1)?),
        OP_PUSHDATA2 => (3, read_len(bytes, offset + 1, 2)?),
        OP_PUSHDATA4 => (5, read_len(bytes, offset + 1, 4)?),
        _ => {
            *pos += 1;
            return Ok(ScriptChunk { op, data: None });
        }
    };
    let start = offset + header;
    let end = start
        .checked_add(len)
        .filter(|&end| end <= bytes.len())
        .ok_or(ScriptError::TruncatedPush { offset })?;
    *pos = end;
    Ok(ScriptChunk {
        op,
        data: Some(bytes[start..end].to_vec()),
    })
}

/// Little-endian length field of `width` bytes at `at`.
fn read_len(bytes: &[u8], at: usize, width: usize) -> Result<usize, ScriptError> {
    let field = bytes
        .get(at..at + width)
        .ok_or(ScriptError::TruncatedPush { offset: at - 1 })?;
    Ok(field
        .iter()
        .rev()
        .fold(0usize, |acc, &b| (acc << 8) | b as usize))
}

/// Decode raw script bytes into a vector of `ScriptChunk` values.
pub fn decode_script(bytes: &[u8]) -> Result<Vec<ScriptChunk>, ScriptError> {
    let mut chunks = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        chunks.push(read_chunk(bytes, &mut pos)?);
    }
    Ok(chunks)
}

/// Encode `data` as a minimal push: direct for up to 75 bytes, then
/// OP_PUSHDATA1/2/4 as the length requires.
pub fn encode_push(data: &[u8]) -> Vec<u8> {
    let len = data.len();
    let mut out = Vec::with_capacity(len + 5);
    if len <= 0x4b {
        out.push(len as u8);
    } else if len <= 0xff {
        out.push(OP_PUSHDATA1);
        out.push(len as u8);
    } else if len <= 0xffff {
        out.push(OP_PUSHDATA2);
        out.extend_from_slice(&(len as u16).to_le_bytes());
    } else {
        out.push(OP_PUSHDATA4);
        out.extend_from_slice(&(len as u32).to_le_bytes());
    }
    out.extend_from_slice(data);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_p2wpkh() {
        let script = hex::decode("0014aed288d81bae3c93cbcb211ea3a7b5e75de13444").unwrap();
        let chunks = decode_script(&script).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].op, OP_0);
        assert_eq!(chunks[0].data.as_deref(), Some(&[][..]));
        assert_eq!(chunks[1].data.as_ref().map(|d| d.len()), Some(20));
    }

    #[test]
    fn test_decode_pushdata_variants() {
        let mut script = vec![OP_PUSHDATA1, 2, 0xaa, 0xbb];
        script.extend_from_slice(&[OP_PUSHDATA2, 1, 0, 0xcc]);
        script.extend_from_slice(&[OP_PUSHDATA4, 1, 0, 0, 0, 0xdd]);
        script.push(OP_CHECKSIG);
        let chunks = decode_script(&script).unwrap();
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].data, Some(vec![0xaa, 0xbb]));
        assert_eq!(chunks[1].data, Some(vec![0xcc]));
        assert_eq!(chunks[2].data, Some(vec![0xdd]));
        assert_eq!(chunks[3], ScriptChunk { op: OP_CHECKSIG, data: None });
    }

    #[test]
    fn test_truncated_pushes() {
        assert!(decode_script(&[0x05, 0x01]).is_err());
        assert!(decode_script(&[OP_PUSHDATA1]).is_err());
        assert!(decode_script(&[OP_PUSHDATA2, 0x01]).is_err());
        assert!(decode_script(&[OP_PUSHDATA4, 0xff, 0xff, 0xff, 0xff]).is_err());
    }

    #[test]
    fn test_encode_push_sizes() {
        assert_eq!(encode_push(&[1, 2])[0], 2);
        assert_eq!(&encode_push(&[0u8; 76])[..2], &[OP_PUSHDATA1, 76]);
        assert_eq!(&encode_push(&[0u8; 256])[..3], &[OP_PUSHDATA2, 0, 1]);
        let data = vec![7u8; 300];
        let decoded = decode_script(&encode_push(&data)).unwrap();
        assert_eq!(decoded[0].data.as_deref(), Some(&data[..]));
    }
}
