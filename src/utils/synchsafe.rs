// Integer codecs for tag and frame headers
//
// ID3v2 stores the tag size (and, from v2.4 on, frame sizes) as synchsafe
// integers: 28 bits spread over 4 bytes with the high bit of every byte
// cleared, so a size can never look like an MPEG frame sync. ID3v2.3 frame
// sizes are plain big-endian 32-bit integers.

use crate::error::{Id3Error, Result};

/// Largest value a synchsafe integer can hold
pub const SYNCHSAFE_MAX: u32 = 0x0FFF_FFFF;

/// Read a synchsafe 32-bit integer (7 bits per byte) at `offset`.
///
/// High bits are masked away rather than rejected. Panics if fewer than
/// 4 bytes are available, callers check the length first.
pub fn decode_synchsafe(bytes: &[u8], offset: usize) -> u32 {
    let b = &bytes[offset..offset + 4];
    (u32::from(b[0] & 0x7F) << 21)
        | (u32::from(b[1] & 0x7F) << 14)
        | (u32::from(b[2] & 0x7F) << 7)
        | u32::from(b[3] & 0x7F)
}

/// Encode `value` as a synchsafe integer
pub fn encode_synchsafe(value: u32) -> Result<[u8; 4]> {
    if value > SYNCHSAFE_MAX {
        return Err(Id3Error::ValueTooLarge(u64::from(value)));
    }

    Ok([
        ((value >> 21) & 0x7F) as u8,
        ((value >> 14) & 0x7F) as u8,
        ((value >> 7) & 0x7F) as u8,
        (value & 0x7F) as u8,
    ])
}

/// Read big-endian 32-bit integer at `offset`
pub fn read_be_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut buffer = [0u8; 4];
    buffer.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_be_bytes(buffer)
}

/// Read big-endian 16-bit integer at `offset`
pub fn read_be_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([bytes[offset], bytes[offset + 1]])
}

/// Convert a buffer length into a frame or tag size field
pub fn length_to_u32(length: usize) -> Result<u32> {
    u32::try_from(length).map_err(|_| Id3Error::ValueTooLarge(length as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synchsafe_known_values() {
        assert_eq!(encode_synchsafe(0).unwrap(), [0, 0, 0, 0]);
        assert_eq!(encode_synchsafe(0x7F).unwrap(), [0, 0, 0, 0x7F]);
        assert_eq!(encode_synchsafe(0x80).unwrap(), [0, 0, 1, 0]);
        assert_eq!(encode_synchsafe(257).unwrap(), [0, 0, 2, 1]);
        assert_eq!(encode_synchsafe(SYNCHSAFE_MAX).unwrap(), [0x7F; 4]);
        assert_eq!(decode_synchsafe(&[0, 0, 2, 1], 0), 257);
    }

    #[test]
    fn test_synchsafe_round_trip() {
        let mut value = 0u32;
        while value <= SYNCHSAFE_MAX {
            let encoded = encode_synchsafe(value).unwrap();
            assert!(encoded.iter().all(|b| b & 0x80 == 0));
            assert_eq!(decode_synchsafe(&encoded, 0), value);
            value = value * 3 + 1;
        }
        let encoded = encode_synchsafe(SYNCHSAFE_MAX).unwrap();
        assert_eq!(decode_synchsafe(&encoded, 0), SYNCHSAFE_MAX);
    }

    #[test]
    fn test_synchsafe_too_large() {
        assert_eq!(
            encode_synchsafe(SYNCHSAFE_MAX + 1),
            Err(Id3Error::ValueTooLarge(0x1000_0000))
        );
    }

    #[test]
    fn test_decode_masks_high_bits() {
        assert_eq!(decode_synchsafe(&[0xFF, 0x80, 0x80, 0x81], 0), 0x0FE0_0001);
        assert_eq!(decode_synchsafe(&[9, 9, 0, 0, 0, 5], 2), 5);
    }

    #[test]
    fn test_big_endian_reads() {
        let bytes = [0x00, 0x00, 0x01, 0x02, 0xAB, 0xCD];
        assert_eq!(read_be_u32(&bytes, 0), 0x0102);
        assert_eq!(read_be_u16(&bytes, 4), 0xABCD);
    }
}
