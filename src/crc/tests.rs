//! Tests for CRC module

use super::*;

#[test]
fn test_crc16_check_value() {
    // Standard CRC-16/XMODEM check input
    assert_eq!(CRC16.checksum(b"123456789"), 0x31C3);
}

#[test]
fn test_crc32_check_value() {
    // Standard CRC-32/ISO-HDLC check input
    assert_eq!(CRC32.checksum(b"123456789"), 0xCBF43926);
}

#[test]
fn test_crc16_deterministic() {
    let data = b"test data";
    assert_eq!(CRC16.checksum(data), CRC16.checksum(data));
}

#[test]
fn test_crc16_digest_update() {
    let mut digest = CRC16.digest();
    digest.update(b"hello");
    digest.update(b" world");

    // Incremental update should match one-shot checksum
    assert_eq!(digest.finalize(), CRC16.checksum(b"hello world"));
}

#[test]
fn test_crc32_empty_data() {
    assert_eq!(CRC32.checksum(b""), 0);
}
