use ::crc::{Crc, CRC_16_XMODEM, CRC_32_ISO_HDLC};

/// CRC16 (XMODEM) used by the user-friendly address checksum
pub const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// CRC32 used by the optional BoC trailer
pub const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

#[cfg(test)]
mod tests;
