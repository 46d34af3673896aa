//! # Time-Ordered Identifiers
//!
//! 80-bit identifiers used as primary keys and correlation tokens throughout
//! the protocol: rooms, users, messages, and in-flight exchanges all key on
//! the same value type.
//!
//! ## Layout
//! ```text
//! [Timestamp(48, ms since epoch)] [Sequence(16)] [Machine(16)]
//! ```
//!
//! The wire encoding is always 10 bytes, big-endian, regardless of host byte
//! order, so two identifiers compare identically as values and as raw byte
//! arrays. Ordering is lexicographic on `(timestamp, sequence, machine)`.
//!
//! Two textual forms round-trip losslessly: a 20-character hexadecimal form
//! and a 25-character zero-padded decimal form. Any other length is rejected.
//!
//! This module also defines the 16-byte [`Guid`] used by the legacy header
//! generation for principals and sessions, and the 16-byte opaque [`Token`]
//! carried by the newer header generation.

use crate::error::{constants, ProtocolError, Result};
use crate::utils::time::unix_millis;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

/// Number of bits in the timestamp component.
const TIMESTAMP_BITS: u32 = 48;

/// Mask for the 48-bit millisecond timestamp.
const TIMESTAMP_MASK: u64 = (1 << TIMESTAMP_BITS) - 1;

/// Upper bound (exclusive) of the 80-bit value space.
const VALUE_BOUND: u128 = 1 << 80;

/// An 80-bit time-ordered identifier: 48-bit millisecond timestamp, 16-bit
/// sequence, 16-bit machine tag.
///
/// Field order matters: the derived `Ord` is lexicographic on
/// `(timestamp, sequence, machine)`, which matches byte-wise comparison of
/// the big-endian encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier {
    timestamp: u64,
    sequence: u16,
    machine: u16,
}

impl Identifier {
    /// Encoded size in bytes.
    pub const SIZE: usize = 10;

    /// The smallest identifier (all components zero).
    pub const MIN: Identifier = Identifier {
        timestamp: 0,
        sequence: 0,
        machine: 0,
    };

    /// The largest identifier (all components saturated).
    pub const MAX: Identifier = Identifier {
        timestamp: TIMESTAMP_MASK,
        sequence: u16::MAX,
        machine: u16::MAX,
    };

    /// Assemble an identifier from its components.
    ///
    /// The timestamp is truncated to 48 bits; the upper 16 bits of
    /// a 64-bit millisecond clock stay zero until roughly the year 10889.
    pub fn from_parts(timestamp_ms: u64, sequence: u16, machine: u16) -> Self {
        Self {
            timestamp: timestamp_ms & TIMESTAMP_MASK,
            sequence,
            machine,
        }
    }

    /// Millisecond timestamp component.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Sequence component.
    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    /// Machine tag component.
    pub fn machine(&self) -> u16 {
        self.machine
    }

    /// Write the 10-byte big-endian encoding into `dst`.
    pub fn write_bytes(&self, dst: &mut [u8; Self::SIZE]) {
        dst[..6].copy_from_slice(&self.timestamp.to_be_bytes()[2..]);
        dst[6..8].copy_from_slice(&self.sequence.to_be_bytes());
        dst[8..10].copy_from_slice(&self.machine.to_be_bytes());
    }

    /// The 10-byte big-endian encoding.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        self.write_bytes(&mut out);
        out
    }

    /// Reconstruct an identifier from its 10-byte big-endian encoding.
    pub fn from_bytes(src: &[u8; Self::SIZE]) -> Self {
        let mut ts = [0u8; 8];
        ts[2..].copy_from_slice(&src[..6]);
        Self {
            timestamp: u64::from_be_bytes(ts),
            sequence: u16::from_be_bytes([src[6], src[7]]),
            machine: u16::from_be_bytes([src[8], src[9]]),
        }
    }

    /// Parse either textual form, dispatching on length alone: 20 characters
    /// means hexadecimal, 25 means decimal. Everything else is an error.
    pub fn parse(text: &str) -> Result<Self> {
        match text.len() {
            20 => {
                if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(ProtocolError::InvalidIdentifier(text.to_string()));
                }
                let value = u128::from_str_radix(text, 16)
                    .map_err(|_| ProtocolError::InvalidIdentifier(text.to_string()))?;
                Ok(Self::from_u128(value))
            }
            25 => {
                if !text.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(ProtocolError::InvalidIdentifier(text.to_string()));
                }
                let value: u128 = text
                    .parse()
                    .map_err(|_| ProtocolError::InvalidIdentifier(text.to_string()))?;
                if value >= VALUE_BOUND {
                    return Err(ProtocolError::InvalidIdentifier(
                        constants::ERR_IDENTIFIER_RANGE.to_string(),
                    ));
                }
                Ok(Self::from_u128(value))
            }
            _ => Err(ProtocolError::InvalidIdentifier(
                constants::ERR_IDENTIFIER_LENGTH.to_string(),
            )),
        }
    }

    /// Render in the requested textual style.
    pub fn format(&self, style: TextStyle) -> String {
        match style {
            TextStyle::Hex => format!("{:020x}", self.to_u128()),
            TextStyle::Decimal => format!("{:025}", self.to_u128()),
        }
    }

    fn to_u128(self) -> u128 {
        ((self.timestamp as u128) << 32) | ((self.sequence as u128) << 16) | self.machine as u128
    }

    fn from_u128(value: u128) -> Self {
        Self {
            timestamp: ((value >> 32) as u64) & TIMESTAMP_MASK,
            sequence: (value >> 16) as u16,
            machine: value as u16,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:020x}", self.to_u128())
    }
}

impl FromStr for Identifier {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Textual rendering styles for [`Identifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    /// 20-character lowercase hexadecimal.
    Hex,
    /// 25-character zero-padded decimal.
    Decimal,
}

/// Allocates fresh identifiers: current wall clock plus a per-millisecond
/// sequence counter and a fixed machine tag.
///
/// The clock never runs backwards from the generator's point of view; if the
/// sequence wraps within one millisecond the generator advances its logical
/// clock instead of reusing a value.
#[derive(Debug)]
pub struct IdGenerator {
    machine: u16,
    state: Mutex<GenState>,
}

#[derive(Debug)]
struct GenState {
    last_ms: u64,
    sequence: u16,
}

impl IdGenerator {
    /// Create a generator with a fixed machine tag.
    pub fn new(machine: u16) -> Self {
        Self {
            machine,
            state: Mutex::new(GenState {
                last_ms: 0,
                sequence: 0,
            }),
        }
    }

    /// Create a generator with a random machine tag.
    ///
    /// Suitable for clients; services that persist identifiers should assign
    /// machine tags through configuration instead.
    pub fn from_entropy() -> Self {
        Self::new(rand::random::<u16>())
    }

    /// The machine tag stamped into every allocated identifier.
    pub fn machine(&self) -> u16 {
        self.machine
    }

    /// Allocate the next identifier.
    pub fn next(&self) -> Identifier {
        let now = unix_millis();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if now > state.last_ms {
            state.last_ms = now;
            state.sequence = 0;
        } else {
            state.sequence = state.sequence.wrapping_add(1);
            if state.sequence == 0 {
                // 65k allocations inside one millisecond: borrow from the future.
                state.last_ms += 1;
            }
        }

        Identifier::from_parts(state.last_ms, state.sequence, self.machine)
    }
}

/// A 16-byte globally unique value, used by the legacy header generation to
/// identify principals and sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guid([u8; 16]);

impl Guid {
    /// Encoded size in bytes.
    pub const SIZE: usize = 16;

    /// The all-zero guid.
    pub const NIL: Guid = Guid([0u8; 16]);

    /// Generate a random guid.
    pub fn new_random() -> Self {
        Self(rand::random::<[u8; 16]>())
    }

    /// Wrap raw bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Parse the hyphenated `8-4-4-4-12` hexadecimal form.
    pub fn parse(text: &str) -> Result<Self> {
        let hex: String = text.chars().filter(|c| *c != '-').collect();
        if text.len() != 36 || hex.len() != 32 {
            return Err(ProtocolError::InvalidIdentifier(text.to_string()));
        }
        let mut bytes = [0u8; 16];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|_| ProtocolError::InvalidIdentifier(text.to_string()))?;
            bytes[i] = u8::from_str_radix(pair, 16)
                .map_err(|_| ProtocolError::InvalidIdentifier(text.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7], b[8], b[9], b[10], b[11], b[12],
            b[13], b[14], b[15]
        )
    }
}

/// A 16-byte opaque access or refresh token carried by the newer header
/// generation. The transport never interprets its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token([u8; 16]);

impl Token {
    /// Encoded size in bytes.
    pub const SIZE: usize = 16;

    /// The all-zero token, used where a refresh token is not being presented.
    pub const NIL: Token = Token([0u8; 16]);

    /// Generate a random token.
    pub fn new_random() -> Self {
        Self(rand::random::<[u8; 16]>())
    }

    /// Wrap raw bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
