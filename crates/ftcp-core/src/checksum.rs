//! CRC-32 primitive for the FTCP wire format.
//!
//! Every frame header protects its first 24 bytes with a CRC-32, and every
//! chunk payload is covered by one. The polynomial is IEEE 802.3 (the same
//! one used by Ethernet, gzip, and PNG), computed here via `crc32fast`
//! which picks a hardware implementation when available.

/// Compute the CRC-32 (IEEE 802.3) of a byte slice.
#[must_use]
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        // Standard CRC-32/ISO-HDLC check value
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(crc32(b""), 0);
    }

    #[test]
    fn single_bit_flip_changes_crc() {
        let data = vec![0xAB; 4096];
        let mut flipped = data.clone();
        flipped[1234] ^= 0x01;
        assert_ne!(crc32(&data), crc32(&flipped));
    }
}
