//! KNX bus addresses
//!
//! Both address kinds travel as a 16-bit value in the same wire slot but use
//! different field layouts:
//!
//! ```text
//! Device address:  AAAA LLLL DDDD DDDD   area.line.device   (4/4/8 bits)
//! Group address:   MMMM MIII SSSS SSSS   main/middle/sub    (5/3/8 bits)
//! ```

use crate::types::{DecoderError, Result};
use std::fmt;
use std::str::FromStr;

/// Format a raw device address as `area.line.device`
pub fn format_device_address(raw: u16) -> String {
    DeviceAddress::from(raw).to_string()
}

/// Format a raw group address as `main/middle/sub`
pub fn format_group_address(raw: u16) -> String {
    GroupAddress::from(raw).to_string()
}

/// Physical address of a device on the bus (Area.Line.Device)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceAddress {
    raw: u16,
}

impl DeviceAddress {
    /// Maximum area value (4 bits)
    pub const MAX_AREA: u8 = 15;
    /// Maximum line value (4 bits)
    pub const MAX_LINE: u8 = 15;

    /// Create a device address from its components
    pub fn new(area: u8, line: u8, device: u8) -> Result<Self> {
        if area > Self::MAX_AREA || line > Self::MAX_LINE {
            return Err(DecoderError::InvalidAddress(format!(
                "{}.{}.{} is out of range",
                area, line, device
            )));
        }

        let raw = (u16::from(area) << 12) | (u16::from(line) << 8) | u16::from(device);
        Ok(Self { raw })
    }

    /// Raw 16-bit representation
    pub const fn raw(self) -> u16 {
        self.raw
    }

    /// Area component (0-15)
    pub const fn area(self) -> u8 {
        ((self.raw >> 12) & 0x0F) as u8
    }

    /// Line component (0-15)
    pub const fn line(self) -> u8 {
        ((self.raw >> 8) & 0x0F) as u8
    }

    /// Device component (0-255)
    pub const fn device(self) -> u8 {
        (self.raw & 0xFF) as u8
    }
}

impl From<u16> for DeviceAddress {
    fn from(raw: u16) -> Self {
        Self { raw }
    }
}

impl From<DeviceAddress> for u16 {
    fn from(addr: DeviceAddress) -> u16 {
        addr.raw
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.area(), self.line(), self.device())
    }
}

impl FromStr for DeviceAddress {
    type Err = DecoderError;

    fn from_str(s: &str) -> Result<Self> {
        let parts = parse_components(s, '.')?;
        Self::new(parts[0], parts[1], parts[2])
    }
}

/// Logical destination of a group telegram (Main/Middle/Sub)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupAddress {
    raw: u16,
}

impl GroupAddress {
    /// Maximum main group value (5 bits)
    pub const MAX_MAIN: u8 = 31;
    /// Maximum middle group value (3 bits)
    pub const MAX_MIDDLE: u8 = 7;

    /// Create a 3-level group address from its components
    pub fn new(main: u8, middle: u8, sub: u8) -> Result<Self> {
        if main > Self::MAX_MAIN || middle > Self::MAX_MIDDLE {
            return Err(DecoderError::InvalidAddress(format!(
                "{}/{}/{} is out of range",
                main, middle, sub
            )));
        }

        let raw = (u16::from(main) << 11) | (u16::from(middle) << 8) | u16::from(sub);
        Ok(Self { raw })
    }

    /// Raw 16-bit representation
    pub const fn raw(self) -> u16 {
        self.raw
    }

    /// Main group component (0-31)
    pub const fn main(self) -> u8 {
        ((self.raw >> 11) & 0x1F) as u8
    }

    /// Middle group component (0-7)
    pub const fn middle(self) -> u8 {
        ((self.raw >> 8) & 0x07) as u8
    }

    /// Sub group component (0-255)
    pub const fn sub(self) -> u8 {
        (self.raw & 0xFF) as u8
    }
}

impl From<u16> for GroupAddress {
    fn from(raw: u16) -> Self {
        Self { raw }
    }
}

impl From<GroupAddress> for u16 {
    fn from(addr: GroupAddress) -> u16 {
        addr.raw
    }
}

impl fmt::Display for GroupAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.main(), self.middle(), self.sub())
    }
}

impl FromStr for GroupAddress {
    type Err = DecoderError;

    fn from_str(s: &str) -> Result<Self> {
        let parts = parse_components(s, '/')?;
        Self::new(parts[0], parts[1], parts[2])
    }
}

/// Split `s` into exactly three decimal `u8` components
fn parse_components(s: &str, separator: char) -> Result<[u8; 3]> {
    let invalid = || DecoderError::InvalidAddress(format!("'{}'", s));

    let mut parts = [0u8; 3];
    let mut fields = s.split(separator);
    for part in parts.iter_mut() {
        *part = fields
            .next()
            .and_then(|field| field.parse::<u8>().ok())
            .ok_or_else(invalid)?;
    }

    if fields.next().is_some() {
        return Err(invalid());
    }

    Ok(parts)
}
