//! The parsed tag container and the bounded frame-scan loop.

use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::error::{Id3Error, Result};
use crate::frames::{Frame, FrameHeader, FrameId, FramePayload, TextPayload, FRAME_HEADER_SIZE};
use crate::header::{TagHeader, HEADER_SIZE};

/// Where the content following the tag comes from at write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tail {
    /// Tail bytes held in memory.
    Buffer(Vec<u8>),
    /// Copy from the original source file starting at the declared tag
    /// boundary. The file must remain unmodified between parse and write.
    Source { path: PathBuf, offset: u64 },
    /// No trailing content.
    None,
}

/// A fully parsed tag: header, frames in on-disk order, and the tail
/// reference. Frame order is insignificant for lookup but preserved on
/// write; duplicate ids are allowed.
#[derive(Debug, Clone)]
pub struct Tag {
    pub header: TagHeader,
    pub frames: Vec<Frame>,
    tail: Tail,
}

impl Tag {
    /// Build a container programmatically, with no trailing content.
    pub fn new(header: TagHeader, frames: Vec<Frame>) -> Tag {
        Tag {
            header,
            frames,
            tail: Tail::None,
        }
    }

    /// Parse a complete tag from an in-memory byte source. Bytes past the
    /// declared tag boundary are buffered as the tail.
    pub fn parse(data: &[u8]) -> Result<Tag> {
        let head = data.get(..HEADER_SIZE).ok_or_else(|| {
            Id3Error::Format(format!("input too short for tag header: {} bytes", data.len()))
        })?;
        let header = TagHeader::parse(head)?;
        let frames = read_frames(data, &header)?;

        let tail_start = (header.boundary() as usize).min(data.len());
        Ok(Tag {
            header,
            frames,
            tail: Tail::Buffer(data[tail_start..].to_vec()),
        })
    }

    /// Parse a tag from a file. The trailing audio is not loaded; the tail
    /// is recorded as a path + offset reference for streamed copy at write
    /// time.
    pub fn read_from_path(path: impl AsRef<Path>) -> Result<Tag> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let map = unsafe { Mmap::map(&file)? };

        let head = map.get(..HEADER_SIZE).ok_or_else(|| {
            Id3Error::Format(format!("file too short for tag header: {} bytes", map.len()))
        })?;
        let header = TagHeader::parse(head)?;
        let frames = read_frames(&map, &header)?;

        let offset = header.boundary();
        Ok(Tag {
            header,
            frames,
            tail: Tail::Source {
                path: path.to_path_buf(),
                offset,
            },
        })
    }

    pub fn tail(&self) -> &Tail {
        &self.tail
    }

    pub fn set_tail(&mut self, tail: Tail) {
        self.tail = tail;
    }

    /// All frames carrying the given id, in on-disk order.
    pub fn frames_with_id(&self, id: FrameId) -> impl Iterator<Item = &Frame> {
        self.frames.iter().filter(move |f| f.header.id == id)
    }

    /// Rebuild the container with every text-information frame matching
    /// `id` carrying `information` instead, keeping each frame's original
    /// encoding. Parse results are never mutated in place.
    pub fn replace_text(&self, id: FrameId, information: &str) -> Tag {
        let frames = self
            .frames
            .iter()
            .map(|frame| match &frame.payload {
                FramePayload::Text(p) if frame.header.id == id => Frame {
                    header: frame.header.clone(),
                    payload: FramePayload::Text(TextPayload {
                        encoding: p.encoding,
                        information: information.to_owned(),
                    }),
                },
                _ => frame.clone(),
            })
            .collect();

        Tag {
            header: self.header.clone(),
            frames,
            tail: self.tail.clone(),
        }
    }
}

/// Scan frames from the tag body up to the declared boundary. Stops at the
/// all-zero padding sentinel or when less than a frame header remains.
fn read_frames(data: &[u8], header: &TagHeader) -> Result<Vec<Frame>> {
    let boundary = header.boundary() as usize;
    tracing::debug!(size = header.size, boundary, "parsing tag body");

    let mut frames = Vec::new();
    let mut pos = HEADER_SIZE;

    while pos + FRAME_HEADER_SIZE < boundary {
        let raw = data.get(pos..pos + FRAME_HEADER_SIZE).ok_or_else(|| {
            Id3Error::Format("frame header runs past end of input".into())
        })?;
        let Some(frame_header) = FrameHeader::parse(raw)? else {
            tracing::debug!(pos, "padding sentinel, stopping frame scan");
            break;
        };
        pos += FRAME_HEADER_SIZE;

        let end = pos + frame_header.size as usize;
        let payload = data.get(pos..end).ok_or_else(|| {
            Id3Error::Payload(format!(
                "frame {} payload of {} bytes runs past end of input",
                frame_header.id, frame_header.size
            ))
        })?;
        tracing::debug!(id = %frame_header.id, size = frame_header.size, "parsed frame");

        frames.push(Frame::parse(frame_header, payload)?);
        pos = end;
    }

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::FrameId;

    fn text_frame_bytes(id: &[u8; 4], text: &str) -> Vec<u8> {
        let mut payload = vec![0u8];
        payload.extend_from_slice(text.as_bytes());
        let mut out = Vec::new();
        out.extend_from_slice(id);
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(&payload);
        out
    }

    fn tag_bytes(frames: &[Vec<u8>], body_size: u32, audio: &[u8]) -> Vec<u8> {
        let mut data = TagHeader::new(body_size).render().unwrap().to_vec();
        for f in frames {
            data.extend_from_slice(f);
        }
        data.resize(body_size as usize + HEADER_SIZE, 0);
        data.extend_from_slice(audio);
        data
    }

    #[test]
    fn parses_frames_in_order_and_buffers_tail() {
        let frames = [
            text_frame_bytes(b"TIT2", "Come Together"),
            text_frame_bytes(b"TALB", "Abbey Road"),
        ];
        let data = tag_bytes(&frames, 256, b"AUDIO");

        let tag = Tag::parse(&data).unwrap();
        assert_eq!(tag.header.size, 256);
        assert_eq!(tag.frames.len(), 2);
        assert_eq!(tag.frames[0].text(), Some("Come Together"));
        assert_eq!(tag.frames[1].text(), Some("Abbey Road"));
        assert_eq!(tag.tail(), &Tail::Buffer(b"AUDIO".to_vec()));
    }

    #[test]
    fn padding_sentinel_stops_scan() {
        // One real frame followed by zero padding; the padding bytes after
        // the sentinel must not be consumed as a frame payload.
        let frames = [text_frame_bytes(b"TIT2", "Something")];
        let data = tag_bytes(&frames, 128, b"");

        let tag = Tag::parse(&data).unwrap();
        assert_eq!(tag.frames.len(), 1);
    }

    #[test]
    fn duplicate_ids_are_kept() {
        let frames = [
            text_frame_bytes(b"TPE1", "Lennon"),
            text_frame_bytes(b"TPE1", "McCartney"),
        ];
        let data = tag_bytes(&frames, 128, b"");

        let tag = Tag::parse(&data).unwrap();
        let got: Vec<_> = tag
            .frames_with_id(FrameId(*b"TPE1"))
            .filter_map(|f| f.text())
            .collect();
        assert_eq!(got, ["Lennon", "McCartney"]);
    }

    #[test]
    fn replace_text_rebuilds_without_mutating() {
        let frames = [text_frame_bytes(b"TIT2", "Old Title")];
        let data = tag_bytes(&frames, 128, b"tail");

        let tag = Tag::parse(&data).unwrap();
        let edited = tag.replace_text(FrameId(*b"TIT2"), "New Title");

        assert_eq!(tag.frames[0].text(), Some("Old Title"));
        assert_eq!(edited.frames[0].text(), Some("New Title"));
        assert_eq!(edited.tail(), tag.tail());
    }

    #[test]
    fn replace_text_with_no_match_is_identity() {
        let frames = [text_frame_bytes(b"TIT2", "Title")];
        let data = tag_bytes(&frames, 128, b"tail");

        let tag = Tag::parse(&data).unwrap();
        let edited = tag.replace_text(FrameId(*b"TALB"), "Album");

        assert_eq!(edited.frames, tag.frames);
        assert_eq!(edited.tail(), tag.tail());
    }

    #[test]
    fn overrunning_payload_is_fatal() {
        let mut frame = Vec::new();
        frame.extend_from_slice(b"TIT2");
        frame.extend_from_slice(&5000u32.to_be_bytes());
        frame.extend_from_slice(&[0, 0]);
        frame.extend_from_slice(&[0, b'x']);

        let mut data = TagHeader::new(64).render().unwrap().to_vec();
        data.extend_from_slice(&frame);

        assert!(matches!(Tag::parse(&data), Err(Id3Error::Payload(_))));
    }

    #[test]
    fn short_input_is_a_format_error() {
        assert!(matches!(Tag::parse(b"ID3"), Err(Id3Error::Format(_))));
    }
}
