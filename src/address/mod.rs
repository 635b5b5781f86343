//! TON address parsing and friendly-form rendering.
//!
//! tonapi returns account addresses in raw form (`workchain:hex`); user
//! facing tools show the friendly form: a tagged 36-byte payload
//! (tag, workchain, 32-byte account id, CRC16-XMODEM) in base64. The
//! tag byte is 0x11 for bounceable, 0x51 for non-bounceable, with 0x80
//! OR'd in for testnet-only addresses.

use crate::config::AddressConfig;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use thiserror::Error;
use tracing::warn;

const TAG_BOUNCEABLE: u8 = 0x11;
const TAG_NON_BOUNCEABLE: u8 = 0x51;
const TAG_TEST_ONLY: u8 = 0x80;

#[derive(Error, Debug)]
pub enum AddressError {
    #[error("empty address")]
    Empty,
    #[error("invalid workchain: {0}")]
    BadWorkchain(String),
    #[error("invalid account id hex: {0}")]
    BadHex(String),
    #[error("account id must be 32 bytes, got {0}")]
    BadAccountLength(usize),
    #[error("invalid base64: {0}")]
    BadBase64(String),
    #[error("friendly address must decode to 36 bytes, got {0}")]
    BadFriendlyLength(usize),
    #[error("checksum mismatch")]
    BadChecksum,
    #[error("unknown address tag: {0:#04x}")]
    UnknownTag(u8),
}

/// A parsed TON account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TonAddress {
    pub workchain: i8,
    pub account: [u8; 32],
}

impl TonAddress {
    /// Parse either form: raw `workchain:hex` or friendly base64
    /// (standard or url-safe alphabet).
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        if s.contains(':') {
            Self::parse_raw(s)
        } else {
            Self::parse_friendly(s)
        }
    }

    fn parse_raw(s: &str) -> Result<Self, AddressError> {
        let (wc, hex) = s
            .split_once(':')
            .ok_or_else(|| AddressError::BadWorkchain(s.to_string()))?;
        let workchain: i8 = wc
            .parse::<i32>()
            .ok()
            .and_then(|w| i8::try_from(w).ok())
            .ok_or_else(|| AddressError::BadWorkchain(wc.to_string()))?;

        if !hex.is_ascii() {
            return Err(AddressError::BadHex(hex.to_string()));
        }
        if hex.len() != 64 {
            return Err(AddressError::BadAccountLength(hex.len() / 2));
        }
        let mut account = [0u8; 32];
        for (i, byte) in account.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|_| AddressError::BadHex(hex.to_string()))?;
        }
        Ok(TonAddress { workchain, account })
    }

    fn parse_friendly(s: &str) -> Result<Self, AddressError> {
        let engine = if s.contains('-') || s.contains('_') {
            &URL_SAFE
        } else {
            &STANDARD
        };
        let bytes = engine
            .decode(s)
            .map_err(|e| AddressError::BadBase64(e.to_string()))?;
        if bytes.len() != 36 {
            return Err(AddressError::BadFriendlyLength(bytes.len()));
        }

        let expected = u16::from_be_bytes([bytes[34], bytes[35]]);
        if crc16_xmodem(&bytes[..34]) != expected {
            return Err(AddressError::BadChecksum);
        }

        let tag = bytes[0] & !TAG_TEST_ONLY;
        if tag != TAG_BOUNCEABLE && tag != TAG_NON_BOUNCEABLE {
            return Err(AddressError::UnknownTag(bytes[0]));
        }

        let mut account = [0u8; 32];
        account.copy_from_slice(&bytes[2..34]);
        Ok(TonAddress {
            workchain: bytes[1] as i8,
            account,
        })
    }

    /// Render in friendly form with the given display flags.
    pub fn to_friendly(&self, flags: &AddressConfig) -> String {
        let mut tag = if flags.bounceable {
            TAG_BOUNCEABLE
        } else {
            TAG_NON_BOUNCEABLE
        };
        if flags.testnet {
            tag |= TAG_TEST_ONLY;
        }

        let mut bytes = Vec::with_capacity(36);
        bytes.push(tag);
        bytes.push(self.workchain as u8);
        bytes.extend_from_slice(&self.account);
        bytes.extend_from_slice(&crc16_xmodem(&bytes).to_be_bytes());

        if flags.url_safe {
            URL_SAFE.encode(&bytes)
        } else {
            STANDARD.encode(&bytes)
        }
    }
}

/// Canonicalize an address for display. Any string tonapi hands back
/// should parse, but on failure we log and fall through to the input
/// unchanged rather than dropping the row from the report.
pub fn normalize(addr: &str, flags: &AddressConfig) -> String {
    match TonAddress::parse(addr) {
        Ok(parsed) => parsed.to_friendly(flags),
        Err(e) => {
            warn!(address = %addr, error = %e, "address did not parse, keeping as-is");
            addr.to_string()
        }
    }
}

/// CRC16-XMODEM (poly 0x1021, init 0), the checksum TON uses for
/// friendly addresses.
fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}
