//! TON address handling.
//!
//! An address is a workchain id plus a 256-bit account hash. The cell layout
//! (written by [`Builder::store_address`](crate::tvm::Builder::store_address))
//! carries only those two components; the bounceable/testnet flags exist only
//! in the user-friendly base64 string form.

use crate::crc::CRC16;
use crate::tvm::error::{CellError, CellResult};
use base64::Engine;
use std::fmt;

/// A TON account address.
#[derive(Debug, Clone, Eq)]
pub struct Address {
    /// Workchain ID (-1 for masterchain, 0 for basechain)
    pub workchain: i8,
    /// 32-byte hash part of the address
    pub hash_part: [u8; 32],
    /// Whether the user-friendly form marks the address bounceable
    pub is_bounceable: bool,
    /// Whether the user-friendly form carries the testnet flag
    pub is_test_only: bool,
}

// Equality covers the on-chain identity only; the string-format flags are
// presentation state and never reach the wire.
impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.workchain == other.workchain && self.hash_part == other.hash_part
    }
}

impl std::hash::Hash for Address {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.workchain.hash(state);
        self.hash_part.hash(state);
    }
}

impl Address {
    /// Creates a new address from workchain and hash part
    pub fn new(workchain: i8, hash_part: [u8; 32]) -> Self {
        Self {
            workchain,
            hash_part,
            is_bounceable: true,
            is_test_only: false,
        }
    }

    /// Parses an address from either the raw hex or the base64 form
    pub fn parse(address: &str) -> CellResult<Self> {
        if let Ok(addr) = Self::from_hex(address) {
            return Ok(addr);
        }
        Self::from_base64(address)
    }

    /// Parses the raw format `workchain:hash64`
    pub fn from_hex(address: &str) -> CellResult<Self> {
        let (workchain, hash_hex) = address.split_once(':').ok_or_else(|| {
            CellError::InvalidAddress("expected workchain:hash format".into())
        })?;

        let workchain = workchain
            .parse::<i8>()
            .map_err(|e| CellError::InvalidAddress(format!("bad workchain: {e}")))?;

        if hash_hex.len() != 64 {
            return Err(CellError::InvalidAddress(
                "hash part must be 64 hex characters".into(),
            ));
        }
        let hash_bytes = hex::decode(hash_hex)
            .map_err(|e| CellError::InvalidAddress(format!("bad hash hex: {e}")))?;
        let mut hash_part = [0u8; 32];
        hash_part.copy_from_slice(&hash_bytes);

        Ok(Self::new(workchain, hash_part))
    }

    /// Parses the user-friendly base64 format: tag, workchain, hash, CRC16
    pub fn from_base64(address: &str) -> CellResult<Self> {
        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(address)
            .or_else(|_| base64::engine::general_purpose::STANDARD.decode(address))
            .map_err(|e| CellError::InvalidAddress(format!("bad base64: {e}")))?;

        if decoded.len() != 36 {
            return Err(CellError::InvalidAddress(format!(
                "expected 36 bytes, got {}",
                decoded.len()
            )));
        }

        let mut tag = decoded[0];
        let mut is_test_only = false;
        if tag & 0x80 != 0 {
            is_test_only = true;
            tag ^= 0x80;
        }
        let is_bounceable = match tag {
            0x11 => true,
            0x51 => false,
            other => {
                return Err(CellError::InvalidAddress(format!(
                    "unknown address tag {other:#04x}"
                )));
            }
        };

        let expected_crc = &decoded[34..36];
        let actual_crc = CRC16.checksum(&decoded[0..34]).to_be_bytes();
        if expected_crc != actual_crc {
            return Err(CellError::InvalidAddress("checksum mismatch".into()));
        }

        let workchain = decoded[1] as i8;
        let mut hash_part = [0u8; 32];
        hash_part.copy_from_slice(&decoded[2..34]);

        Ok(Self {
            workchain,
            hash_part,
            is_bounceable,
            is_test_only,
        })
    }

    /// Formats as raw `workchain:hash`
    pub fn to_hex(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash_part))
    }

    /// Formats as the user-friendly base64 form
    pub fn to_base64(&self, url_safe: bool) -> String {
        let mut tag = if self.is_bounceable { 0x11u8 } else { 0x51u8 };
        if self.is_test_only {
            tag |= 0x80;
        }

        let mut data = Vec::with_capacity(36);
        data.push(tag);
        data.push(self.workchain as u8);
        data.extend_from_slice(&self.hash_part);
        let crc = CRC16.checksum(&data).to_be_bytes();
        data.extend_from_slice(&crc);

        if url_safe {
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&data)
        } else {
            base64::engine::general_purpose::STANDARD.encode(&data)
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base64(true))
    }
}

impl std::str::FromStr for Address {
    type Err = CellError;

    fn from_str(s: &str) -> CellResult<Self> {
        Address::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_hex_roundtrip() {
        let addr =
            Address::from_hex("0:83dfd552e63729b472fcbcc8c45ebcc6691702558b68ec7527e1ba403a0f31a8")
                .unwrap();
        assert_eq!(addr.workchain, 0);
        assert_eq!(
            addr.to_hex(),
            "0:83dfd552e63729b472fcbcc8c45ebcc6691702558b68ec7527e1ba403a0f31a8"
        );
    }

    #[test]
    fn test_address_base64() {
        let addr = Address::from_base64("EQCD39VS5jcptHL8vMjEXrzGaRcCVYto7HUn4bpAOg8xqB2N").unwrap();
        assert_eq!(addr.workchain, 0);
        assert!(addr.is_bounceable);
        assert_eq!(
            addr.to_hex(),
            "0:83dfd552e63729b472fcbcc8c45ebcc6691702558b68ec7527e1ba403a0f31a8"
        );
    }

    #[test]
    fn test_zero_address_formats() {
        let zero = Address::new(0, [0u8; 32]);
        assert_eq!(
            zero.to_base64(true),
            "EQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAM9c"
        );

        let mut non_bounceable = zero.clone();
        non_bounceable.is_bounceable = false;
        assert_eq!(
            non_bounceable.to_base64(true),
            "UQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAJKZ"
        );
    }

    #[test]
    fn test_address_bad_checksum() {
        // Last base64 character altered, checksum no longer matches
        let err =
            Address::from_base64("EQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAM9d").unwrap_err();
        assert!(matches!(err, CellError::InvalidAddress(_)));
    }

    #[test]
    fn test_address_equality_ignores_display_flags() {
        let mut a = Address::new(0, [7u8; 32]);
        let b = Address::new(0, [7u8; 32]);
        a.is_bounceable = false;
        a.is_test_only = true;
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_either_format() {
        let from_hex =
            Address::parse("0:83dfd552e63729b472fcbcc8c45ebcc6691702558b68ec7527e1ba403a0f31a8")
                .unwrap();
        let from_b64 = Address::parse("EQCD39VS5jcptHL8vMjEXrzGaRcCVYto7HUn4bpAOg8xqB2N").unwrap();
        assert_eq!(from_hex, from_b64);
    }
}
