use std::io::{self, Cursor};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

/// Serialized length of a [`ChromatogramIndex`] in bytes
pub const CHROMATOGRAM_INDEX_LEN: usize = 26;

/// Location of one precursor's chromatograms inside the external binary
/// chromatogram store (the `.skyd` file).
///
/// Stored on precursor results when per-transition results are not kept, so
/// the raw traces can still be fetched later.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromatogramIndex {
    /// Byte offset of the compressed block
    pub offset: i64,
    /// Compressed block size in bytes
    pub compressed_size: i32,
    /// Uncompressed block size in bytes
    pub uncompressed_size: i32,
    /// Number of time points
    pub num_points: i32,
    /// Number of transitions in the block
    pub num_transitions: i32,
    /// Block encoding version
    pub format: i16,
}

impl ChromatogramIndex {
    /// Encode as a fixed-width little-endian record.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(CHROMATOGRAM_INDEX_LEN);
        buf.write_i64::<LittleEndian>(self.offset)?;
        buf.write_i32::<LittleEndian>(self.compressed_size)?;
        buf.write_i32::<LittleEndian>(self.uncompressed_size)?;
        buf.write_i32::<LittleEndian>(self.num_points)?;
        buf.write_i32::<LittleEndian>(self.num_transitions)?;
        buf.write_i16::<LittleEndian>(self.format)?;
        Ok(buf)
    }

    /// Decode a record written by [`ChromatogramIndex::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> io::Result<Self> {
        if bytes.len() != CHROMATOGRAM_INDEX_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "chromatogram index must be {CHROMATOGRAM_INDEX_LEN} bytes, got {}",
                    bytes.len()
                ),
            ));
        }
        let mut cursor = Cursor::new(bytes);
        Ok(Self {
            offset: cursor.read_i64::<LittleEndian>()?,
            compressed_size: cursor.read_i32::<LittleEndian>()?,
            uncompressed_size: cursor.read_i32::<LittleEndian>()?,
            num_points: cursor.read_i32::<LittleEndian>()?,
            num_transitions: cursor.read_i32::<LittleEndian>()?,
            format: cursor.read_i16::<LittleEndian>()?,
        })
    }
}
