//! Core types for the KNX telegram decoder library
//!
//! This module defines the raw telegram delivered by a bus gateway, the decoded
//! telegram emitted by the decoder, and the library error type. A decoded
//! telegram renders itself as one log line through its `Display` impl.

use crate::address::{DeviceAddress, GroupAddress};
use crate::apdu::ApduKind;
use chrono::{DateTime, Local};
use std::fmt;

/// Timestamp type used throughout the decoder (local wall-clock time)
pub type Timestamp = DateTime<Local>;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Format of the timestamp prefix of every log line
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Raw group telegram as received from the bus gateway
///
/// This is a single group message as delivered by knxd, before any APDU
/// classification or payload interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct Telegram {
    /// Physical address of the sending device
    pub source: DeviceAddress,
    /// Group address the telegram was sent to
    pub destination: GroupAddress,
    /// APDU bytes (TPCI/APCI bytes followed by the value, if any)
    pub payload: Vec<u8>,
    /// Local time at which the telegram was received
    pub received_at: Timestamp,
}

impl Telegram {
    /// Create a telegram stamped with the current local time
    pub fn new(source: DeviceAddress, destination: GroupAddress, payload: Vec<u8>) -> Self {
        Self::with_timestamp(source, destination, payload, Local::now())
    }

    /// Create a telegram with an explicit reception time
    pub fn with_timestamp(
        source: DeviceAddress,
        destination: GroupAddress,
        payload: Vec<u8>,
        received_at: Timestamp,
    ) -> Self {
        Self {
            source,
            destination,
            payload,
            received_at,
        }
    }

    /// Number of APDU bytes in the telegram
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True if the telegram carries no APDU bytes at all
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Errors that can occur while connecting, receiving or decoding
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Invalid gateway URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to connect to {target}")]
    ConnectFailed {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open group socket: {0}")]
    GroupSocket(String),

    #[error("Failed to read from gateway")]
    ReadFailed(#[source] std::io::Error),

    #[error("Invalid packet: {0} APDU byte(s), at least 2 required")]
    InvalidPacket(usize),

    #[error("Unexpected gateway message: {0}")]
    Protocol(String),

    #[error("Failed to read group address file: {0}")]
    Directory(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A decoded telegram - the primary output of the decoder
///
/// `Display` renders the complete log line without the trailing newline:
///
/// ```text
/// 2024-01-01 12:00:00 Write FROM 1.1.5 TO 1/1/1 (Kitchen light) VALUE ON
/// 2024-01-01 12:00:01 Unknown APDU FROM 1.1.5 TO 1/1/1
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTelegram {
    /// Reception time of the underlying telegram
    pub received_at: Timestamp,
    /// APDU command kind
    pub kind: ApduKind,
    /// Sending device
    pub source: DeviceAddress,
    /// Destination group
    pub destination: GroupAddress,
    /// Group name from the group address file (if available)
    pub group_name: Option<String>,
    /// Rendered value (only for Response and Write)
    pub value: Option<String>,
}

impl fmt::Display for DecodedTelegram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.received_at.format(TIMESTAMP_FORMAT))?;

        if self.kind == ApduKind::Unknown {
            return write!(f, "Unknown APDU FROM {} TO {}", self.source, self.destination);
        }

        write!(f, "{} FROM {} TO {}", self.kind, self.source, self.destination)?;

        if let Some(name) = &self.group_name {
            write!(f, " ({})", name)?;
        }

        if let Some(value) = &self.value {
            write!(f, " VALUE {}", value)?;
        }

        Ok(())
    }
}
