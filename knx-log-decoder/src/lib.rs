//! KNX Telegram Decoder Library
//!
//! Decodes KNX group telegrams into human-readable log lines, optionally
//! enriched with group names and datapoint types from an ETS group address
//! export.
//!
//! # Architecture
//!
//! - Receives group telegrams from a knxd daemon as a lazy, blocking stream
//! - Classifies the APDU command (Read / Response / Write / Unknown)
//! - Resolves the destination group in a CSV group address file
//! - Renders switch, temperature and dimmer values; everything else as hex
//!
//! The library does NOT:
//! - Send anything to the bus (read-only monitor)
//! - Parse command-line arguments or configure logging
//!
//! Those live in the application layer (knx-log-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use knx_log_decoder::{monitor, BusUrl, Decoder, KnxdConnection, MonitorConfig, TelegramSource};
//!
//! let url = BusUrl::parse("ip:localhost").unwrap();
//! let connection = KnxdConnection::connect(&url).unwrap();
//!
//! let config = MonitorConfig::new().with_group_file("groups.csv");
//! let decoder = Decoder::from_config(&config);
//!
//! let stdout = std::io::stdout();
//! monitor::run(&decoder, connection.telegrams(), &mut stdout.lock(), &config).unwrap();
//! ```

// Public modules
pub mod address;
pub mod apdu;
pub mod config;
pub mod datapoint;
pub mod decoder;
pub mod directory;
pub mod gateway;
pub mod monitor;
pub mod types;

// Re-export main types for convenience
pub use address::{format_device_address, format_group_address, DeviceAddress, GroupAddress};
pub use apdu::ApduKind;
pub use config::MonitorConfig;
pub use datapoint::{decode_value, DatapointType};
pub use decoder::Decoder;
pub use directory::{lookup_group, GroupDirectory, GroupInfo};
pub use gateway::{BusUrl, KnxdConnection, TelegramSource, Telegrams};
pub use types::{DecodedTelegram, DecoderError, Result, Telegram, Timestamp};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
