//! Main decoder API
//!
//! The `Decoder` turns raw telegrams into decoded telegrams: it classifies the
//! APDU, resolves the destination group in the optional group directory and
//! renders the value according to the group's datapoint type.

use crate::apdu::ApduKind;
use crate::config::MonitorConfig;
use crate::datapoint::{self, DatapointType};
use crate::directory::{GroupDirectory, GroupInfo};
use crate::types::{DecodedTelegram, DecoderError, Result, Telegram};

/// Minimum number of APDU bytes (TPCI + APCI) in a group telegram
pub const MIN_PAYLOAD_LEN: usize = 2;

/// The main decoder struct - entry point for all decoding operations
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    /// Group address file, if name/type enrichment is enabled
    directory: Option<GroupDirectory>,
}

impl Decoder {
    /// Create a decoder without a group directory
    pub fn new() -> Self {
        Self { directory: None }
    }

    /// Create a decoder as described by `config`
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            directory: config.group_file.as_ref().map(GroupDirectory::new),
        }
    }

    /// Create a decoder that resolves groups in `directory`
    pub fn with_directory(directory: GroupDirectory) -> Self {
        Self {
            directory: Some(directory),
        }
    }

    /// The configured group directory, if any
    pub fn directory(&self) -> Option<&GroupDirectory> {
        self.directory.as_ref()
    }

    /// Decode a single telegram
    ///
    /// # Errors
    /// * `DecoderError::InvalidPacket` if the APDU is shorter than two bytes
    /// * `DecoderError::Directory` if the group address file cannot be read
    ///
    /// Unknown commands, unknown datapoint types and unlisted groups are not
    /// errors; they are reflected in the decoded telegram.
    pub fn decode(&self, telegram: &Telegram) -> Result<DecodedTelegram> {
        if telegram.len() < MIN_PAYLOAD_LEN {
            return Err(DecoderError::InvalidPacket(telegram.len()));
        }

        let kind = ApduKind::classify(&telegram.payload);
        let mut decoded = DecodedTelegram {
            received_at: telegram.received_at,
            kind,
            source: telegram.source,
            destination: telegram.destination,
            group_name: None,
            value: None,
        };

        if kind == ApduKind::Unknown {
            log::debug!(
                "Unknown APDU {:02X?} from {} to {}",
                &telegram.payload[..MIN_PAYLOAD_LEN],
                telegram.source,
                telegram.destination
            );
            return Ok(decoded);
        }

        let group = self.resolve_group(telegram)?;

        if !group.name.is_empty() {
            decoded.group_name = Some(group.name);
        }

        if kind.carries_value() {
            let dpt = DatapointType::from_tag(&group.datapoint_type);
            decoded.value = Some(datapoint::decode_value(&telegram.payload, &dpt));
        }

        Ok(decoded)
    }

    /// Look up the destination group, or an empty entry without a directory
    fn resolve_group(&self, telegram: &Telegram) -> Result<GroupInfo> {
        match &self.directory {
            Some(directory) => directory.lookup(&telegram.destination.to_string()),
            None => Ok(GroupInfo::default()),
        }
    }
}
