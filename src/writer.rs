//! Serializes a [`Tag`] back to bytes: header first, frames re-encoded with
//! their current lengths, then the grow/pad size correction and the tail
//! passthrough.

use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::Result;
use crate::header::{SynchsafeInt, HEADER_SIZE, SIZE_OFFSET};
use crate::tag::{Tag, Tail};

/// Write the tag and its tail to the sink, starting at the sink's current
/// position. Performs at most one seek-back, to correct the header's size
/// field when the re-encoded frames outgrow the declared tag region.
pub fn write_tag<W: Write + Seek>(tag: &Tag, sink: &mut W) -> Result<()> {
    let base = sink.stream_position()?;

    sink.write_all(&tag.header.render()?)?;

    for frame in &tag.frames {
        let payload = frame.payload.render();
        sink.write_all(&frame.header.render(payload.len() as u32))?;
        sink.write_all(&payload)?;
    }

    let declared = tag.header.boundary();
    let written = sink.stream_position()? - base;

    if written > declared {
        // The tag grew: fix up the stored body size, then resume past the
        // frames already written.
        let body_size = (written - HEADER_SIZE as u64) as u32;
        tracing::debug!(written, declared, body_size, "tag grew, rewriting size field");
        sink.seek(SeekFrom::Start(base + SIZE_OFFSET))?;
        sink.write_all(&SynchsafeInt::encode(body_size))?;
        sink.seek(SeekFrom::Start(base + written))?;
    } else if written < declared {
        // The tag shrank: zero-pad to the declared size so the trailing
        // content keeps its absolute offset.
        tracing::debug!(written, declared, "tag shrank, padding to declared size");
        write_zeros(sink, declared - written)?;
    }

    match tag.tail() {
        Tail::Buffer(bytes) => sink.write_all(bytes)?,
        Tail::Source { path, offset } => {
            let mut source = File::open(path)?;
            source.seek(SeekFrom::Start(*offset))?;
            io::copy(&mut source, sink)?;
        }
        Tail::None => {}
    }

    Ok(())
}

/// Write the tag and tail to a new file at `path`.
pub fn write_to_path(tag: &Tag, path: impl AsRef<Path>) -> Result<()> {
    let mut sink = BufWriter::new(File::create(path)?);
    write_tag(tag, &mut sink)?;
    sink.flush()?;
    Ok(())
}

fn write_zeros<W: Write>(sink: &mut W, count: u64) -> io::Result<()> {
    let zeros = [0u8; 4096];
    let mut remaining = count;
    while remaining > 0 {
        let take = remaining.min(zeros.len() as u64) as usize;
        sink.write_all(&zeros[..take])?;
        remaining -= take as u64;
    }
    Ok(())
}
