//! Reader and byte-exact writer for the ID3v2.3 metadata container
//! prefixed to MP3 files.
//!
//! Parsing builds an ordered, in-memory [`Tag`] (header + typed frames +
//! a reference to the trailing audio); [`write_tag`] serializes it back,
//! recomputing frame sizes, growing or padding the tag region, and passing
//! the audio through untouched.
//!
//! Unsynchronization and extended headers are rejected outright, and a
//! malformed frame payload aborts the parse; there is no partial-recovery
//! path.

pub mod error;
pub mod frames;
pub mod header;
pub mod tag;
pub mod text;
pub mod writer;

pub use error::{Id3Error, Result};
pub use frames::{Frame, FrameHeader, FrameId, FrameKind, FramePayload, FRAME_HEADER_SIZE};
pub use header::{SynchsafeInt, TagHeader, HEADER_SIZE};
pub use tag::{Tag, Tail};
pub use text::Encoding;
pub use writer::{write_tag, write_to_path};
