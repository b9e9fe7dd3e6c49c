//! CRC-16/CCITT-FALSE: poly 0x1021, init 0xFFFF, no reflection, no final xor.

const POLY: u16 = 0x1021;
const INIT: u16 = 0xFFFF;

pub fn crc16(bytes: &[u8]) -> u16 {
    let mut crc = INIT;
    for &byte in bytes {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ POLY
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Checksum rendered as four uppercase hex digits.
pub fn crc16_hex(bytes: &[u8]) -> String {
    format!("{:04X}", crc16(bytes))
}
