//! Frame headers, the id → variant dispatch table, and the per-variant
//! payload codecs.

use std::fmt;

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Id3Error, Result};
use crate::text::{self, Encoding};

/// Size of each frame header in bytes.
pub const FRAME_HEADER_SIZE: usize = 10;

/// Four-byte frame identifier, kept raw: unknown ids still round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub [u8; 4]);

impl FrameId {
    pub fn new(bytes: [u8; 4]) -> Self {
        FrameId(bytes)
    }

    pub fn is_padding(&self) -> bool {
        self.0 == [0, 0, 0, 0]
    }
}

impl TryFrom<&str> for FrameId {
    type Error = Id3Error;

    fn try_from(s: &str) -> Result<Self> {
        let bytes: [u8; 4] = s
            .as_bytes()
            .try_into()
            .map_err(|_| Id3Error::Format(format!("frame id must be 4 bytes, not {:?}", s)))?;
        Ok(FrameId(bytes))
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() { b as char } else { '.' };
            fmt::Write::write_char(f, c)?;
        }
        Ok(())
    }
}

/// Parsed 10-byte frame header. The size field is a plain big-endian u32,
/// unlike the synchsafe size in the tag header. Flags are carried opaquely;
/// preservation/compression/encryption/grouping bits are meaningful
/// positions but not acted upon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub id: FrameId,
    pub size: u32,
    pub flags: u16,
}

impl FrameHeader {
    /// Parse a frame header. Returns `Ok(None)` for the all-zero id, which
    /// marks the start of tag padding rather than a frame.
    pub fn parse(data: &[u8]) -> Result<Option<Self>> {
        if data.len() != FRAME_HEADER_SIZE {
            return Err(Id3Error::Format(format!(
                "frame header must be {} bytes, not {}",
                FRAME_HEADER_SIZE,
                data.len()
            )));
        }

        let id = FrameId([data[0], data[1], data[2], data[3]]);
        if id.is_padding() {
            return Ok(None);
        }

        let size = BigEndian::read_u32(&data[4..8]);
        let flags = BigEndian::read_u16(&data[8..10]);

        Ok(Some(FrameHeader { id, size, flags }))
    }

    /// Serialize with the current payload length, which may differ from the
    /// size this header was parsed with if the payload has been edited.
    pub fn render(&self, payload_len: u32) -> [u8; 10] {
        let mut out = [0u8; FRAME_HEADER_SIZE];
        out[0..4].copy_from_slice(&self.id.0);
        BigEndian::write_u32(&mut out[4..8], payload_len);
        BigEndian::write_u16(&mut out[8..10], self.flags);
        out
    }
}

/// The fixed set of text-information frame ids, sorted for binary search.
static TEXT_INFORMATION_IDS: [[u8; 4]; 38] = [
    *b"TALB", *b"TBPM", *b"TCOM", *b"TCON", *b"TCOP", *b"TDAT", *b"TDLY", *b"TENC",
    *b"TEXT", *b"TFLT", *b"TIME", *b"TIT1", *b"TIT2", *b"TIT3", *b"TKEY", *b"TLAN",
    *b"TLEN", *b"TMED", *b"TOAL", *b"TOFN", *b"TOLY", *b"TOPE", *b"TORY", *b"TOWN",
    *b"TPE1", *b"TPE2", *b"TPE3", *b"TPE4", *b"TPOS", *b"TPUB", *b"TRCK", *b"TRDA",
    *b"TRSN", *b"TRSO", *b"TSIZ", *b"TSRC", *b"TSSE", *b"TYER",
];

/// The payload family a frame id maps to. Unrecognized ids fall through to
/// `Binary` and are never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Text,
    UserText,
    Comment,
    Private,
    Picture,
    Object,
    CdToc,
    Binary,
}

impl FrameKind {
    pub fn of(id: FrameId) -> FrameKind {
        if TEXT_INFORMATION_IDS.binary_search(&id.0).is_ok() {
            return FrameKind::Text;
        }
        match &id.0 {
            b"TXXX" => FrameKind::UserText,
            b"COMM" => FrameKind::Comment,
            b"PRIV" => FrameKind::Private,
            b"APIC" => FrameKind::Picture,
            b"GEOB" => FrameKind::Object,
            b"MCDI" => FrameKind::CdToc,
            _ => FrameKind::Binary,
        }
    }
}

/// Text-information frame payload (TIT2, TPE1, TALB, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPayload {
    pub encoding: Encoding,
    pub information: String,
}

/// User-defined text payload (TXXX).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTextPayload {
    pub encoding: Encoding,
    pub description: String,
    pub value: String,
}

/// Comment payload (COMM).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentPayload {
    pub encoding: Encoding,
    pub language: [u8; 3],
    pub description: String,
    pub text: String,
}

/// Private payload (PRIV). Carries no encoding marker: the owner identifier
/// is always single-null-terminated Latin-1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivatePayload {
    pub owner: String,
    pub data: Vec<u8>,
}

/// Attached picture payload (APIC).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PicturePayload {
    pub encoding: Encoding,
    pub mime: String,
    pub picture_type: u8,
    pub description: String,
    pub data: Vec<u8>,
}

/// General encapsulated object payload (GEOB).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectPayload {
    pub encoding: Encoding,
    pub mime: String,
    pub filename: String,
    pub description: String,
    pub data: Vec<u8>,
}

/// Closed union of recognized frame payloads plus the opaque fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramePayload {
    Text(TextPayload),
    UserText(UserTextPayload),
    Comment(CommentPayload),
    Private(PrivatePayload),
    Picture(PicturePayload),
    Object(ObjectPayload),
    CdToc(Vec<u8>),
    Binary(Vec<u8>),
}

impl FramePayload {
    /// Decode a payload, dispatching on the frame id.
    pub fn parse(id: FrameId, data: &[u8]) -> Result<Self> {
        match FrameKind::of(id) {
            FrameKind::Text => parse_text(data),
            FrameKind::UserText => parse_user_text(data),
            FrameKind::Comment => parse_comment(data),
            FrameKind::Private => parse_private(data),
            FrameKind::Picture => parse_picture(data),
            FrameKind::Object => parse_object(data),
            FrameKind::CdToc => Ok(FramePayload::CdToc(data.to_vec())),
            FrameKind::Binary => Ok(FramePayload::Binary(data.to_vec())),
        }
    }

    /// Re-emit the payload's wire form. A fresh parse of the result
    /// reproduces this payload field-for-field; Latin-1 and raw payloads
    /// are byte-identical.
    pub fn render(&self) -> Vec<u8> {
        match self {
            FramePayload::Text(p) => {
                let mut out = vec![p.encoding as u8];
                out.extend_from_slice(&text::encode_text(&p.information, p.encoding));
                out
            }
            FramePayload::UserText(p) => {
                let mut out = vec![p.encoding as u8];
                out.extend_from_slice(&text::encode_text(&p.description, p.encoding));
                out.extend_from_slice(&[0u8; 2][..p.encoding.terminator_len()]);
                out.extend_from_slice(&text::encode_text(&p.value, p.encoding));
                out
            }
            FramePayload::Comment(p) => {
                let mut out = vec![p.encoding as u8];
                out.extend_from_slice(&p.language);
                out.extend_from_slice(&text::encode_text(&p.description, p.encoding));
                out.extend_from_slice(&[0u8; 2][..p.encoding.terminator_len()]);
                out.extend_from_slice(&text::encode_text(&p.text, p.encoding));
                out
            }
            FramePayload::Private(p) => {
                let mut out = text::encode_text(&p.owner, Encoding::Latin1);
                out.push(0);
                out.extend_from_slice(&p.data);
                out
            }
            FramePayload::Picture(p) => {
                let mut out = vec![p.encoding as u8];
                out.extend_from_slice(&text::encode_text(&p.mime, Encoding::Latin1));
                out.push(0);
                out.push(p.picture_type);
                out.extend_from_slice(&text::encode_text(&p.description, p.encoding));
                out.extend_from_slice(&[0u8; 2][..p.encoding.terminator_len()]);
                out.extend_from_slice(&p.data);
                out
            }
            FramePayload::Object(p) => {
                let mut out = vec![p.encoding as u8];
                out.extend_from_slice(&text::encode_text(&p.mime, Encoding::Latin1));
                out.push(0);
                out.extend_from_slice(&text::encode_text(&p.filename, p.encoding));
                out.extend_from_slice(&[0u8; 2][..p.encoding.terminator_len()]);
                out.extend_from_slice(&text::encode_text(&p.description, p.encoding));
                out.extend_from_slice(&[0u8; 2][..p.encoding.terminator_len()]);
                out.extend_from_slice(&p.data);
                out
            }
            FramePayload::CdToc(data) | FramePayload::Binary(data) => data.clone(),
        }
    }

    /// Human-readable one-line summary; long binary fields are abbreviated
    /// to a byte count.
    pub fn describe(&self) -> String {
        match self {
            FramePayload::Text(p) => p.information.clone(),
            FramePayload::UserText(p) => format!("{}={}", p.description, p.value),
            FramePayload::Comment(p) => format!(
                "[{}] {}: {}",
                String::from_utf8_lossy(&p.language),
                p.description,
                p.text
            ),
            FramePayload::Private(p) => format!("{} [{} bytes]", p.owner, p.data.len()),
            FramePayload::Picture(p) => format!(
                "{} ({}, type {}, {} bytes)",
                p.description,
                p.mime,
                p.picture_type,
                p.data.len()
            ),
            FramePayload::Object(p) => format!(
                "{} ({}, {}, {} bytes)",
                p.description,
                p.mime,
                p.filename,
                p.data.len()
            ),
            FramePayload::CdToc(data) => format!("CD TOC [{} bytes]", data.len()),
            FramePayload::Binary(data) => format!("[{} bytes]", data.len()),
        }
    }
}

fn take_encoding(data: &[u8]) -> Result<(Encoding, &[u8])> {
    let (&first, rest) = data
        .split_first()
        .ok_or_else(|| Id3Error::Payload("payload too short for encoding byte".into()))?;
    Ok((Encoding::from_byte(first)?, rest))
}

fn parse_text(data: &[u8]) -> Result<FramePayload> {
    let (encoding, rest) = take_encoding(data)?;
    Ok(FramePayload::Text(TextPayload {
        encoding,
        information: text::decode_text(rest, encoding),
    }))
}

fn parse_user_text(data: &[u8]) -> Result<FramePayload> {
    let (encoding, rest) = take_encoding(data)?;
    let (description, rest) = text::split_terminated(rest, encoding)?;
    Ok(FramePayload::UserText(UserTextPayload {
        encoding,
        description,
        value: text::decode_text(rest, encoding),
    }))
}

fn parse_comment(data: &[u8]) -> Result<FramePayload> {
    let (encoding, rest) = take_encoding(data)?;
    if rest.len() < 3 {
        return Err(Id3Error::Payload("comment payload too short for language".into()));
    }
    let language = [rest[0], rest[1], rest[2]];
    let (description, rest) = text::split_terminated(&rest[3..], encoding)?;
    Ok(FramePayload::Comment(CommentPayload {
        encoding,
        language,
        description,
        text: text::decode_text(rest, encoding),
    }))
}

fn parse_private(data: &[u8]) -> Result<FramePayload> {
    let (owner, rest) = text::split_latin1(data)?;
    Ok(FramePayload::Private(PrivatePayload {
        owner,
        data: rest.to_vec(),
    }))
}

fn parse_picture(data: &[u8]) -> Result<FramePayload> {
    let (encoding, rest) = take_encoding(data)?;
    let (mime, rest) = text::split_latin1(rest)?;
    let (&picture_type, rest) = rest
        .split_first()
        .ok_or_else(|| Id3Error::Payload("picture payload too short for picture type".into()))?;
    let (description, rest) = text::split_terminated(rest, encoding)?;
    Ok(FramePayload::Picture(PicturePayload {
        encoding,
        mime,
        picture_type,
        description,
        data: rest.to_vec(),
    }))
}

fn parse_object(data: &[u8]) -> Result<FramePayload> {
    let (encoding, rest) = take_encoding(data)?;
    let (mime, rest) = text::split_latin1(rest)?;
    let (filename, rest) = text::split_terminated(rest, encoding)?;
    let (description, rest) = text::split_terminated(rest, encoding)?;
    Ok(FramePayload::Object(ObjectPayload {
        encoding,
        mime,
        filename,
        description,
        data: rest.to_vec(),
    }))
}

/// One frame: its header plus the decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub header: FrameHeader,
    pub payload: FramePayload,
}

impl Frame {
    pub fn parse(header: FrameHeader, data: &[u8]) -> Result<Frame> {
        let payload = FramePayload::parse(header.id, data)?;
        Ok(Frame { header, payload })
    }

    pub fn id(&self) -> FrameId {
        self.header.id
    }

    /// The text of a text-information frame, if this is one.
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            FramePayload::Text(p) => Some(&p.information),
            _ => None,
        }
    }
}
