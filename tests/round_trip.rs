//! End-to-end tests against real files: parse, rewrite, and edit a tagged
//! MP3-shaped file and check the bytes that land on disk.

use std::fs;
use std::path::Path;

use id3edit::{write_to_path, Encoding, FrameId, Tag, TagHeader, Tail};

const AUDIO: &[u8] = b"\xFF\xFBFAKE-MPEG-AUDIO-DATA";

fn latin1_text_frame(id: &[u8; 4], text: &str) -> Vec<u8> {
    let mut payload = vec![0u8];
    payload.extend_from_slice(text.as_bytes());
    let mut out = Vec::new();
    out.extend_from_slice(id);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(&[0, 0]);
    out.extend_from_slice(&payload);
    out
}

/// Build a file: header with `body_size`, the given frames, zero padding up
/// to the declared boundary, then the fake audio.
fn build_file(path: &Path, frames: &[Vec<u8>], body_size: u32) {
    let mut data = TagHeader::new(body_size).render().unwrap().to_vec();
    for frame in frames {
        data.extend_from_slice(frame);
    }
    assert!(data.len() <= body_size as usize + 10, "frames exceed declared body");
    data.resize(body_size as usize + 10, 0);
    data.extend_from_slice(AUDIO);
    fs::write(path, data).unwrap();
}

#[test]
fn unchanged_rewrite_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src.mp3");
    let dst = dir.path().join("dst.mp3");

    let frames = [
        latin1_text_frame(b"TIT2", "Come Together"),
        latin1_text_frame(b"TPE1", "The Beatles"),
        latin1_text_frame(b"TALB", "Abbey Road"),
    ];
    build_file(&src, &frames, 512);

    let tag = Tag::read_from_path(&src).unwrap();
    write_to_path(&tag, &dst).unwrap();

    assert_eq!(fs::read(&src).unwrap(), fs::read(&dst).unwrap());
}

#[test]
fn shrinking_edit_keeps_audio_offset() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src.mp3");
    let dst = dir.path().join("dst.mp3");

    build_file(&src, &[latin1_text_frame(b"TIT2", "A Rather Long Title")], 256);

    let tag = Tag::read_from_path(&src).unwrap();
    let edited = tag.replace_text(FrameId(*b"TIT2"), "Hi");
    write_to_path(&edited, &dst).unwrap();

    let out = fs::read(&dst).unwrap();
    // Declared size unchanged, audio still at the original boundary.
    assert_eq!(out.len(), 10 + 256 + AUDIO.len());
    assert_eq!(&out[10 + 256..], AUDIO);

    let reread = Tag::read_from_path(&dst).unwrap();
    assert_eq!(reread.header.size, 256);
    assert_eq!(reread.frames[0].text(), Some("Hi"));
}

#[test]
fn growing_edit_updates_declared_size() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src.mp3");
    let dst = dir.path().join("dst.mp3");

    // Tight tag: one frame filling the whole declared body.
    let frame = latin1_text_frame(b"TIT2", "Hi");
    let body = (frame.len()) as u32;
    build_file(&src, &[frame], body);

    let tag = Tag::read_from_path(&src).unwrap();
    let long_title = "An Extremely Long Replacement Title That Will Not Fit";
    let edited = tag.replace_text(FrameId(*b"TIT2"), long_title);
    write_to_path(&edited, &dst).unwrap();

    let reread = Tag::read_from_path(&dst).unwrap();
    assert_eq!(reread.frames[0].text(), Some(long_title));
    assert_eq!(
        u64::from(reread.header.size),
        10 + long_title.len() as u64 + 1
    );

    // Audio follows immediately after the grown tag.
    let out = fs::read(&dst).unwrap();
    assert_eq!(&out[out.len() - AUDIO.len()..], AUDIO);
}

#[test]
fn utf16_frames_survive_an_edit_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src.mp3");
    let dst = dir.path().join("dst.mp3");

    // UTF-16 title with an LE BOM, plus a comment frame left untouched.
    let mut title_payload = vec![1u8, 0xFF, 0xFE];
    for unit in "Søster".encode_utf16() {
        title_payload.extend_from_slice(&unit.to_le_bytes());
    }
    let mut title = Vec::new();
    title.extend_from_slice(b"TIT2");
    title.extend_from_slice(&(title_payload.len() as u32).to_be_bytes());
    title.extend_from_slice(&[0, 0]);
    title.extend_from_slice(&title_payload);

    let mut comment_payload = vec![0u8];
    comment_payload.extend_from_slice(b"eng");
    comment_payload.extend_from_slice(b"note\x00a comment");
    let mut comment = Vec::new();
    comment.extend_from_slice(b"COMM");
    comment.extend_from_slice(&(comment_payload.len() as u32).to_be_bytes());
    comment.extend_from_slice(&[0, 0]);
    comment.extend_from_slice(&comment_payload);

    build_file(&src, &[title, comment], 512);

    let tag = Tag::read_from_path(&src).unwrap();
    assert_eq!(tag.frames[0].text(), Some("Søster"));

    let edited = tag.replace_text(FrameId(*b"TIT2"), "Bróðir");
    write_to_path(&edited, &dst).unwrap();

    let reread = Tag::read_from_path(&dst).unwrap();
    assert_eq!(reread.frames[0].text(), Some("Bróðir"));
    match &reread.frames[0].payload {
        id3edit::FramePayload::Text(p) => assert_eq!(p.encoding, Encoding::Utf16),
        other => panic!("expected text payload, got {:?}", other),
    }
    match &reread.frames[1].payload {
        id3edit::FramePayload::Comment(p) => {
            assert_eq!(&p.language, b"eng");
            assert_eq!(p.description, "note");
            assert_eq!(p.text, "a comment");
        }
        other => panic!("expected comment payload, got {:?}", other),
    }
}

#[test]
fn in_memory_parse_buffers_the_tail() {
    let frames = [latin1_text_frame(b"TRCK", "7")];
    let mut data = TagHeader::new(64).render().unwrap().to_vec();
    for frame in &frames {
        data.extend_from_slice(frame);
    }
    data.resize(64 + 10, 0);
    data.extend_from_slice(AUDIO);

    let tag = Tag::parse(&data).unwrap();
    assert_eq!(tag.tail(), &Tail::Buffer(AUDIO.to_vec()));

    let mut sink = std::io::Cursor::new(Vec::new());
    id3edit::write_tag(&tag, &mut sink).unwrap();
    assert_eq!(sink.into_inner(), data);
}
