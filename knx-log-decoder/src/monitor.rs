//! Telegram monitor loop
//!
//! Pulls telegrams from a source, decodes them and writes one line per
//! telegram. Every line is flushed immediately so a live monitor shows
//! traffic as it happens.

use crate::config::MonitorConfig;
use crate::decoder::Decoder;
use crate::types::{Result, Telegram};
use std::io::Write;

/// Decode telegrams from `telegrams` and write them to `out`
///
/// Runs until the source fails or `config.max_telegrams` telegrams have been
/// written. The first error (reception, short packet, unreadable group
/// address file, output) stops the loop and is returned.
///
/// # Returns
/// * `Ok(count)` - number of lines written when the telegram limit is reached
///   or the source ends
pub fn run<I, W>(decoder: &Decoder, telegrams: I, out: &mut W, config: &MonitorConfig) -> Result<usize>
where
    I: IntoIterator<Item = Result<Telegram>>,
    W: Write,
{
    let mut count = 0;
    let mut telegrams = telegrams.into_iter();

    // Check the limit before pulling: the next pull may block forever
    while config.should_continue(count) {
        let Some(telegram) = telegrams.next() else {
            break;
        };

        let telegram = telegram?;
        let decoded = decoder.decode(&telegram)?;

        writeln!(out, "{}", decoded)?;
        out.flush()?;

        count += 1;
    }

    log::debug!("Monitor stopped after {} telegram(s)", count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{DeviceAddress, GroupAddress};
    use crate::types::DecoderError;
    use chrono::{Local, TimeZone};

    fn telegram(payload: Vec<u8>) -> Result<Telegram> {
        Ok(Telegram::with_timestamp(
            DeviceAddress::from(0x1105),
            GroupAddress::from(0x0901),
            payload,
            Local.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_writes_one_line_per_telegram() {
        let mut out = Vec::new();
        let source = vec![telegram(vec![0x00, 0x00]), telegram(vec![0x00, 0xC0])];

        let count = run(&Decoder::new(), source, &mut out, &MonitorConfig::new()).unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "2024-03-09 12:00:00 Read FROM 1.1.5 TO 1/1/1\n\
             2024-03-09 12:00:00 Unknown APDU FROM 1.1.5 TO 1/1/1\n"
        );
    }

    /// Writer that records how much output had been written at each flush
    #[derive(Default)]
    struct FlushRecorder {
        written: Vec<u8>,
        flushed_at: Vec<usize>,
    }

    impl Write for FlushRecorder {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed_at.push(self.written.len());
            Ok(())
        }
    }

    #[test]
    fn test_flushes_after_every_line() {
        let mut out = FlushRecorder::default();
        let source = vec![telegram(vec![0x00, 0x00]), telegram(vec![0x00, 0x40])];

        let count = run(&Decoder::new(), source, &mut out, &MonitorConfig::new()).unwrap();
        assert_eq!(count, 2);

        let line_ends: Vec<usize> = out
            .written
            .iter()
            .enumerate()
            .filter(|(_, &b)| b == b'\n')
            .map(|(i, _)| i + 1)
            .collect();
        assert_eq!(line_ends.len(), 2);
        assert_eq!(out.flushed_at, line_ends);
    }

    #[test]
    fn test_stops_at_limit() {
        let mut out = Vec::new();
        let source = (0..10).map(|_| telegram(vec![0x00, 0x00]));
        let config = MonitorConfig::new().with_max_telegrams(3);

        let count = run(&Decoder::new(), source, &mut out, &config).unwrap();

        assert_eq!(count, 3);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 3);
    }

    #[test]
    fn test_short_packet_is_fatal() {
        let mut out = Vec::new();
        let source = vec![telegram(vec![0x00, 0x00]), telegram(vec![0x00]), telegram(vec![0x00, 0x00])];

        let result = run(&Decoder::new(), source, &mut out, &MonitorConfig::new());

        assert!(matches!(result, Err(DecoderError::InvalidPacket(1))));
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_read_failure_is_fatal() {
        let mut out = Vec::new();
        let failure = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let source = vec![Err(DecoderError::ReadFailed(failure)), telegram(vec![0x00, 0x00])];

        let result = run(&Decoder::new(), source, &mut out, &MonitorConfig::new());

        assert!(matches!(result, Err(DecoderError::ReadFailed(_))));
        assert!(out.is_empty());
    }
}
