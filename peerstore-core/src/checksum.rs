//! CRC-32 block checksums

/// CRC-32 (IEEE) of an in-memory buffer
pub fn checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}
