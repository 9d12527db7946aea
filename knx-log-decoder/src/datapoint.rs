//! Datapoint type dispatch and value rendering
//!
//! The group address file tags each group with an ETS datapoint subtype
//! (`DPST-<main>-<sub>`). Only three subtypes get a readable rendering; every
//! other value is shown as hex.

/// ETS tag of DPT 1.001 (switch)
pub const SWITCH_TAG: &str = "DPST-1-1";
/// ETS tag of DPT 9.001 (temperature, °C)
pub const TEMPERATURE_TAG: &str = "DPST-9-1";
/// ETS tag of DPT 5.001 (scaling, %)
pub const DIMMER_LEVEL_TAG: &str = "DPST-5-1";

/// Datapoint type of a group, as far as the decoder understands it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatapointType {
    /// DPT 1.001 - value in the low 6 bits of the APCI byte
    Switch,
    /// DPT 9.001 - 2-byte float after the APCI byte
    Temperature,
    /// DPT 5.001 - 1 byte after the APCI byte
    DimmerLevel,
    /// Anything else, with the raw tag (may be empty)
    Unknown(String),
}

impl DatapointType {
    /// Classify an ETS datapoint tag (exact, case-sensitive match)
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            SWITCH_TAG => DatapointType::Switch,
            TEMPERATURE_TAG => DatapointType::Temperature,
            DIMMER_LEVEL_TAG => DatapointType::DimmerLevel,
            other => DatapointType::Unknown(other.to_string()),
        }
    }

    /// The ETS tag this type was classified from
    pub fn tag(&self) -> &str {
        match self {
            DatapointType::Switch => SWITCH_TAG,
            DatapointType::Temperature => TEMPERATURE_TAG,
            DatapointType::DimmerLevel => DIMMER_LEVEL_TAG,
            DatapointType::Unknown(tag) => tag,
        }
    }

    /// Minimum APDU length this type needs to be rendered
    pub fn min_payload_len(&self) -> usize {
        match self {
            DatapointType::Switch => 2,
            DatapointType::DimmerLevel => 3,
            DatapointType::Temperature => 4,
            DatapointType::Unknown(_) => 2,
        }
    }
}

/// Render the value carried by an APDU
///
/// `payload` is the whole APDU, including the two TPCI/APCI bytes.
/// A recognized type whose payload is too short falls back to the hex
/// rendering, tagged with its type.
pub fn decode_value(payload: &[u8], dpt: &DatapointType) -> String {
    if payload.len() < dpt.min_payload_len() {
        log::debug!(
            "Payload of {} byte(s) too short for {}, rendering as hex",
            payload.len(),
            dpt.tag()
        );
        return decode_raw(payload, dpt.tag());
    }

    match dpt {
        DatapointType::Switch => decode_switch(payload[1]).to_string(),
        DatapointType::Temperature => decode_temperature(payload[2], payload[3]),
        DatapointType::DimmerLevel => decode_dimmer_level(payload[2]),
        DatapointType::Unknown(tag) => decode_raw(payload, tag),
    }
}

/// Switch state from the inline 6-bit value
fn decode_switch(apci: u8) -> &'static str {
    if apci & 0x3F != 0 {
        "ON"
    } else {
        "OFF"
    }
}

/// 2-byte float, `0.01 * M * 2^E`
///
/// The mantissa is taken as an unsigned 11-bit value and the sign bit is
/// ignored, so negative temperatures decode as large positive values.
fn decode_temperature(high: u8, low: u8) -> String {
    let raw = u16::from_be_bytes([high, low]);
    let mantissa = raw & 0x07FF;
    let exponent = (raw & 0x7800) >> 11;

    let temp = f32::from(mantissa) * (1u32 << exponent) as f32 / 100.0;
    format!("{:.1}°C", temp)
}

/// 8-bit scaling value, read as signed and clamped at zero
fn decode_dimmer_level(value: u8) -> String {
    let mut level = (0.392 * f64::from(value as i8)) as f32;
    if level < 0.0 {
        level = 0.0;
    }
    format!("{:2.0}%", level)
}

/// Hex dump of the bytes after the APCI byte, `(tag)` appended if non-empty
fn decode_raw(payload: &[u8], tag: &str) -> String {
    let mut out: String = payload.iter().skip(2).map(|byte| format!("{:02X} ", byte)).collect();

    if !tag.is_empty() {
        out.push_str(&format!("({})", tag));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag() {
        assert_eq!(DatapointType::from_tag("DPST-1-1"), DatapointType::Switch);
        assert_eq!(DatapointType::from_tag("DPST-9-1"), DatapointType::Temperature);
        assert_eq!(DatapointType::from_tag("DPST-5-1"), DatapointType::DimmerLevel);
        assert_eq!(
            DatapointType::from_tag("dpst-1-1"),
            DatapointType::Unknown("dpst-1-1".to_string())
        );
        assert_eq!(DatapointType::from_tag(""), DatapointType::Unknown(String::new()));
    }

    #[test]
    fn test_switch() {
        let switch = DatapointType::Switch;
        assert_eq!(decode_value(&[0x00, 0x81], &switch), "ON");
        assert_eq!(decode_value(&[0x00, 0x01], &switch), "ON");
        assert_eq!(decode_value(&[0x00, 0x80], &switch), "OFF");
        assert_eq!(decode_value(&[0x00, 0x00], &switch), "OFF");
    }

    #[test]
    fn test_temperature() {
        // 0x0C1A: exponent 1, mantissa 1050 -> 21.0
        let temp = DatapointType::Temperature;
        assert_eq!(decode_value(&[0x00, 0x80, 0x0C, 0x1A], &temp), "21.0°C");
        assert_eq!(decode_value(&[0x00, 0x80, 0x00, 0x00], &temp), "0.0°C");
        // 0x0866: exponent 1, mantissa 102 -> 2.04
        assert_eq!(decode_value(&[0x00, 0x80, 0x08, 0x66], &temp), "2.0°C");
    }

    #[test]
    fn test_temperature_ignores_sign_bit() {
        // 0x8000 would be -20.48 with sign extension; only exponent and
        // mantissa bits are used here
        let temp = DatapointType::Temperature;
        assert_eq!(decode_value(&[0x00, 0x80, 0x80, 0x00], &temp), "0.0°C");
        assert_eq!(decode_value(&[0x00, 0x80, 0x87, 0xFF], &temp), "20.5°C");
    }

    #[test]
    fn test_dimmer_level() {
        let dim = DatapointType::DimmerLevel;
        assert_eq!(decode_value(&[0x00, 0x80, 100], &dim), "39%");
        assert_eq!(decode_value(&[0x00, 0x80, 0x7F], &dim), "50%");
        assert_eq!(decode_value(&[0x00, 0x80, 0x00], &dim), " 0%");
        // Values above 0x7F are negative as signed bytes
        assert_eq!(decode_value(&[0x00, 0x80, 0xFF], &dim), " 0%");
    }

    #[test]
    fn test_unknown_type_hex() {
        let empty = DatapointType::from_tag("");
        assert_eq!(decode_value(&[0x00, 0x80, 0x0C, 0xFA], &empty), "0C FA ");
        assert_eq!(decode_value(&[0x00, 0x81], &empty), "");

        let scene = DatapointType::from_tag("DPST-17-1");
        assert_eq!(decode_value(&[0x00, 0x80, 0x05], &scene), "05 (DPST-17-1)");
        assert_eq!(decode_value(&[0x00, 0x81], &scene), "(DPST-17-1)");
    }

    #[test]
    fn test_short_payload_falls_back_to_hex() {
        let temp = DatapointType::Temperature;
        assert_eq!(decode_value(&[0x00, 0x80, 0x0C], &temp), "0C (DPST-9-1)");

        let dim = DatapointType::DimmerLevel;
        assert_eq!(decode_value(&[0x00, 0x80], &dim), "(DPST-5-1)");
    }
}
