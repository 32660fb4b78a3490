//! Cursor-based byte codec helpers shared by the versioned encodings

use crate::error::{Error, Result};

pub(crate) fn encode_i64(output: &mut Vec<u8>, value: i64) {
    output.extend_from_slice(&value.to_be_bytes());
}

pub(crate) fn decode_u8(bytes: &[u8], cursor: &mut usize) -> Result<u8> {
    if *cursor >= bytes.len() {
        return Err(Error::Encoding("insufficient bytes for u8".to_string()));
    }
    let value = bytes[*cursor];
    *cursor += 1;
    Ok(value)
}

pub(crate) fn decode_i64(bytes: &[u8], cursor: &mut usize) -> Result<i64> {
    if *cursor + 8 > bytes.len() {
        return Err(Error::Encoding("insufficient bytes for i64".to_string()));
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[*cursor..*cursor + 8]);
    *cursor += 8;
    Ok(i64::from_be_bytes(buf))
}

pub(crate) fn encode_bytes(output: &mut Vec<u8>, bytes: &[u8]) {
    output.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    output.extend_from_slice(bytes);
}

pub(crate) fn decode_bytes(bytes: &[u8], cursor: &mut usize) -> Result<Vec<u8>> {
    if *cursor + 4 > bytes.len() {
        return Err(Error::Encoding(
            "insufficient bytes for length prefix".to_string(),
        ));
    }
    let mut len_buf = [0u8; 4];
    len_buf.copy_from_slice(&bytes[*cursor..*cursor + 4]);
    let len = u32::from_be_bytes(len_buf) as usize;
    *cursor += 4;

    if *cursor + len > bytes.len() {
        return Err(Error::Encoding("insufficient bytes for value".to_string()));
    }
    let value = bytes[*cursor..*cursor + len].to_vec();
    *cursor += len;
    Ok(value)
}

pub(crate) fn encode_option_bytes(output: &mut Vec<u8>, bytes: &Option<Vec<u8>>) {
    match bytes {
        Some(bytes) => {
            output.push(1);
            encode_bytes(output, bytes);
        }
        None => output.push(0),
    }
}

pub(crate) fn decode_option_bytes(bytes: &[u8], cursor: &mut usize) -> Result<Option<Vec<u8>>> {
    match decode_u8(bytes, cursor)? {
        0 => Ok(None),
        1 => Ok(Some(decode_bytes(bytes, cursor)?)),
        tag => Err(Error::Encoding(format!("invalid option tag: {}", tag))),
    }
}
