//! Shared codec for the encoding-tagged, null-terminated text fields that
//! most frame payloads carry.

use crate::error::{Id3Error, Result};

/// Text encoding marker carried as the first payload byte of text-bearing
/// frames. ID3v2.3 defines exactly these two values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Encoding {
    Latin1 = 0,
    Utf16 = 1,
}

impl Encoding {
    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            0 => Ok(Encoding::Latin1),
            1 => Ok(Encoding::Utf16),
            _ => Err(Id3Error::Payload(format!("invalid text encoding byte: {}", b))),
        }
    }

    /// Width of the null terminator for this encoding.
    pub fn terminator_len(self) -> usize {
        match self {
            Encoding::Latin1 => 1,
            Encoding::Utf16 => 2,
        }
    }
}

/// Decode raw field bytes per the given encoding. Latin-1 maps bytes to the
/// first 256 Unicode code points; UTF-16 honors a leading BOM and defaults
/// to little-endian without one.
pub fn decode_text(data: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Latin1 => {
            if data.is_ascii() {
                // ASCII is valid UTF-8 as-is.
                String::from_utf8_lossy(data).into_owned()
            } else {
                data.iter().map(|&b| b as char).collect()
            }
        }
        Encoding::Utf16 => {
            if data.len() < 2 {
                return String::new();
            }
            let (decoder, start) = if data[0] == 0xFF && data[1] == 0xFE {
                (encoding_rs::UTF_16LE, 2)
            } else if data[0] == 0xFE && data[1] == 0xFF {
                (encoding_rs::UTF_16BE, 2)
            } else {
                (encoding_rs::UTF_16LE, 0)
            };
            let (result, _, _) = decoder.decode(&data[start..]);
            result.into_owned()
        }
    }
}

/// Encode text per the given encoding. UTF-16 output carries a
/// little-endian BOM; Latin-1 substitutes `?` for unrepresentable chars.
pub fn encode_text(text: &str, encoding: Encoding) -> Vec<u8> {
    match encoding {
        Encoding::Latin1 => text
            .chars()
            .map(|c| if (c as u32) <= 0xFF { c as u8 } else { b'?' })
            .collect(),
        Encoding::Utf16 => {
            let mut out = vec![0xFF, 0xFE];
            for unit in text.encode_utf16() {
                out.extend_from_slice(&unit.to_le_bytes());
            }
            out
        }
    }
}

/// Find the terminator for the active encoding: a single null for Latin-1, a
/// double null on a 2-byte boundary for UTF-16. The alignment requirement
/// keeps UTF-16 content containing lone zero bytes (any ASCII char) from
/// being mis-split.
pub fn find_terminator(data: &[u8], encoding: Encoding) -> Option<usize> {
    match encoding {
        Encoding::Latin1 => memchr::memchr(0, data),
        Encoding::Utf16 => {
            let mut i = 0;
            while i + 1 < data.len() {
                if data[i] == 0 && data[i + 1] == 0 {
                    return Some(i);
                }
                i += 2;
            }
            None
        }
    }
}

/// Split off one terminated text field, returning the decoded field and the
/// bytes following its terminator. A missing terminator is fatal.
pub fn split_terminated(data: &[u8], encoding: Encoding) -> Result<(String, &[u8])> {
    match find_terminator(data, encoding) {
        Some(pos) => {
            let text = decode_text(&data[..pos], encoding);
            Ok((text, &data[pos + encoding.terminator_len()..]))
        }
        None => Err(Id3Error::Payload(
            "missing null terminator in text field".into(),
        )),
    }
}

/// Split off a single-null-terminated Latin-1 field, used for sub-fields the
/// format keeps single-byte regardless of the frame's encoding marker.
pub fn split_latin1(data: &[u8]) -> Result<(String, &[u8])> {
    split_terminated(data, Encoding::Latin1)
}
