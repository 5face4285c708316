use crate::error::{Id3Error, Result};

/// Size of the fixed ID3v2 tag header in bytes.
pub const HEADER_SIZE: usize = 10;

/// Byte offset of the synchsafe size field within the tag header.
pub const SIZE_OFFSET: u64 = 6;

pub(crate) const MAGIC: &[u8; 3] = b"ID3";
pub(crate) const VERSION: [u8; 2] = [3, 0];

/// Synchsafe integer codec used for the tag header's size field.
/// Each byte carries only its low 7 bits (MSB always clear), so the
/// encoded size can never look like an MPEG sync pattern.
pub struct SynchsafeInt;

impl SynchsafeInt {
    /// Decode four synchsafe bytes, most-significant byte first.
    pub fn decode(bytes: [u8; 4]) -> u32 {
        (u32::from(bytes[0]) << 21)
            | (u32::from(bytes[1]) << 14)
            | (u32::from(bytes[2]) << 7)
            | u32::from(bytes[3])
    }

    /// Encode a value into four synchsafe bytes. Values must fit in 28 bits;
    /// anything larger is a contract violation of the caller and the high
    /// bits are silently masked off.
    pub fn encode(value: u32) -> [u8; 4] {
        [
            ((value & 0x0FE0_0000) >> 21) as u8,
            ((value & 0x001F_C000) >> 14) as u8,
            ((value & 0x0000_3F80) >> 7) as u8,
            (value & 0x0000_007F) as u8,
        ]
    }
}

/// Parsed ID3v2.3 tag header (10 bytes).
///
/// Both flag bits are carried so a programmatic caller can see what was
/// requested, but neither may be set for this codec to operate: parsing and
/// rendering both reject them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagHeader {
    pub unsynchronization: bool,
    pub extended_header: bool,
    /// Declared tag body size in bytes, excluding the 10-byte header.
    pub size: u32,
}

impl TagHeader {
    pub fn new(size: u32) -> Self {
        TagHeader {
            unsynchronization: false,
            extended_header: false,
            size,
        }
    }

    /// Parse the fixed 10-byte tag header.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() != HEADER_SIZE {
            return Err(Id3Error::Format(format!(
                "tag header must be {} bytes, not {}",
                HEADER_SIZE,
                data.len()
            )));
        }

        if &data[0..3] != MAGIC {
            return Err(Id3Error::Format(format!(
                "tag header identifier must be ID3, not {:?}",
                &data[0..3]
            )));
        }

        if data[3..5] != VERSION {
            return Err(Id3Error::Format(format!(
                "tag version must be 2.3.0, not 2.{}.{}",
                data[3], data[4]
            )));
        }

        let flags = data[5];
        let unsynchronization = flags & 0x80 != 0;
        if unsynchronization {
            return Err(Id3Error::Unsupported("unsynchronization"));
        }

        let extended_header = flags & 0x40 != 0;
        if extended_header {
            return Err(Id3Error::Unsupported("extended header"));
        }

        let size = SynchsafeInt::decode([data[6], data[7], data[8], data[9]]);

        Ok(TagHeader {
            unsynchronization,
            extended_header,
            size,
        })
    }

    /// Serialize the header back to its 10-byte wire form.
    pub fn render(&self) -> Result<[u8; 10]> {
        if self.unsynchronization {
            return Err(Id3Error::Unsupported("unsynchronization"));
        }
        if self.extended_header {
            return Err(Id3Error::Unsupported("extended header"));
        }

        let flags = (u8::from(self.unsynchronization) << 7) | (u8::from(self.extended_header) << 6);
        let size = SynchsafeInt::encode(self.size);

        let mut out = [0u8; HEADER_SIZE];
        out[0..3].copy_from_slice(MAGIC);
        out[3..5].copy_from_slice(&VERSION);
        out[5] = flags;
        out[6..10].copy_from_slice(&size);
        Ok(out)
    }

    /// Offset of the first byte past the declared tag region.
    pub fn boundary(&self) -> u64 {
        u64::from(self.size) + HEADER_SIZE as u64
    }
}
