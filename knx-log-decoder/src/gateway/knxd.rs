//! knxd client socket protocol
//!
//! Every message on the socket is a 2-byte big-endian length followed by that
//! many bytes. The first two bytes of a message are its big-endian type code.
//!
//! ```text
//! open group socket:  00 05 | 00 26 | 00 00 00
//! reply:              00 02 | 00 26
//! group packet:       LL LL | 00 27 | SS SS | DD DD | APDU...
//! ```

use super::{BusUrl, TelegramSource};
use crate::address::{DeviceAddress, GroupAddress};
use crate::types::{DecoderError, Result, Telegram};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};
use std::net::TcpStream;

#[cfg(unix)]
use std::os::unix::net::UnixStream;

/// `EIB_OPEN_GROUPCON` - open a group socket
pub const EIB_OPEN_GROUPCON: u16 = 0x0026;
/// `EIB_GROUP_PACKET` - a group telegram on an open group socket
pub const EIB_GROUP_PACKET: u16 = 0x0027;

/// Type code + source + destination
const GROUP_PACKET_HEADER_LEN: usize = 6;

/// Socket connected to a knxd daemon
#[derive(Debug)]
pub enum BusStream {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl BusStream {
    /// Open the socket named by `url`
    pub fn connect(url: &BusUrl) -> Result<Self> {
        let connect_failed = |source: io::Error| DecoderError::ConnectFailed {
            target: url.to_string(),
            source,
        };

        match url {
            BusUrl::Ip { host, port } => {
                let stream = TcpStream::connect((host.as_str(), *port)).map_err(connect_failed)?;
                // Group packets are tiny; don't let Nagle delay the open request
                stream.set_nodelay(true).map_err(connect_failed)?;
                Ok(BusStream::Tcp(stream))
            }
            #[cfg(unix)]
            BusUrl::Local(path) => {
                let stream = UnixStream::connect(path).map_err(connect_failed)?;
                Ok(BusStream::Unix(stream))
            }
            #[cfg(not(unix))]
            BusUrl::Local(_) => Err(DecoderError::InvalidUrl(format!(
                "'{}': local sockets are not supported on this platform",
                url
            ))),
        }
    }
}

impl Read for BusStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            BusStream::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            BusStream::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for BusStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            BusStream::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            BusStream::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            BusStream::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            BusStream::Unix(stream) => stream.flush(),
        }
    }
}

/// Connection to a knxd daemon
///
/// Generic over the underlying stream so the protocol can be exercised
/// against in-memory buffers.
#[derive(Debug)]
pub struct KnxdConnection<S = BusStream> {
    stream: S,
}

impl KnxdConnection<BusStream> {
    /// Connect to the daemon at `url` and open a group socket
    pub fn connect(url: &BusUrl) -> Result<Self> {
        log::info!("Connecting to knxd at {}", url);
        let mut connection = Self::from_stream(BusStream::connect(url)?);
        connection.open_group_socket()?;
        log::info!("Group socket open on {}", url);
        Ok(connection)
    }
}

impl<S: Read + Write> KnxdConnection<S> {
    /// Wrap an already connected stream
    pub fn from_stream(stream: S) -> Self {
        Self { stream }
    }

    /// Give back the underlying stream
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Switch the connection into group socket mode (receive all groups)
    pub fn open_group_socket(&mut self) -> Result<()> {
        let mut request = Vec::with_capacity(5);
        request.extend_from_slice(&EIB_OPEN_GROUPCON.to_be_bytes());
        request.extend_from_slice(&[0x00, 0x00, 0x00]);

        self.send_message(&request)
            .map_err(|e| DecoderError::GroupSocket(e.to_string()))?;

        let reply = self.receive_message().map_err(|e| match e {
            DecoderError::ReadFailed(io) => DecoderError::GroupSocket(io.to_string()),
            other => other,
        })?;

        match message_type(&reply) {
            Some(EIB_OPEN_GROUPCON) => Ok(()),
            Some(other) => Err(DecoderError::GroupSocket(format!(
                "gateway answered with message type 0x{:04X}",
                other
            ))),
            None => Err(DecoderError::GroupSocket("empty reply from gateway".to_string())),
        }
    }

    /// Write one length-prefixed message
    fn send_message(&mut self, message: &[u8]) -> io::Result<()> {
        let len = u16::try_from(message.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "message too long"))?;
        self.stream.write_u16::<BigEndian>(len)?;
        self.stream.write_all(message)?;
        self.stream.flush()
    }

    /// Block until one complete message has been read
    fn receive_message(&mut self) -> Result<Vec<u8>> {
        let len = self
            .stream
            .read_u16::<BigEndian>()
            .map_err(DecoderError::ReadFailed)?;

        let mut message = vec![0u8; usize::from(len)];
        self.stream
            .read_exact(&mut message)
            .map_err(DecoderError::ReadFailed)?;

        log::trace!("Received knxd message: {:02X?}", message);
        Ok(message)
    }
}

impl<S: Read + Write> TelegramSource for KnxdConnection<S> {
    fn next_telegram(&mut self) -> Result<Telegram> {
        let message = self.receive_message()?;
        parse_group_packet(&message)
    }
}

/// Type code of a knxd message
fn message_type(message: &[u8]) -> Option<u16> {
    match message {
        [high, low, ..] => Some(u16::from_be_bytes([*high, *low])),
        _ => None,
    }
}

/// Parse an `EIB_GROUP_PACKET` message into a telegram stamped now
pub fn parse_group_packet(message: &[u8]) -> Result<Telegram> {
    match message_type(message) {
        Some(EIB_GROUP_PACKET) => {}
        Some(other) => {
            return Err(DecoderError::Protocol(format!(
                "expected group packet, got message type 0x{:04X}",
                other
            )))
        }
        None => return Err(DecoderError::Protocol("empty message".to_string())),
    }

    if message.len() < GROUP_PACKET_HEADER_LEN {
        return Err(DecoderError::Protocol(format!(
            "group packet of {} byte(s) is truncated",
            message.len()
        )));
    }

    let source = u16::from_be_bytes([message[2], message[3]]);
    let destination = u16::from_be_bytes([message[4], message[5]]);

    Ok(Telegram::new(
        DeviceAddress::from(source),
        GroupAddress::from(destination),
        message[GROUP_PACKET_HEADER_LEN..].to_vec(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// In-memory duplex stream: reads from `input`, records writes
    struct MockStream {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl MockStream {
        fn new(input: Vec<u8>) -> Self {
            Self {
                input: Cursor::new(input),
                output: Vec::new(),
            }
        }
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_open_group_socket() {
        let mut connection = KnxdConnection::from_stream(MockStream::new(vec![0x00, 0x02, 0x00, 0x26]));
        connection.open_group_socket().unwrap();

        let stream = connection.into_inner();
        assert_eq!(stream.output, vec![0x00, 0x05, 0x00, 0x26, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_open_group_socket_rejected() {
        // EIB_INVALID_REQUEST
        let mut connection = KnxdConnection::from_stream(MockStream::new(vec![0x00, 0x02, 0x00, 0x06]));
        let result = connection.open_group_socket();
        assert!(matches!(result, Err(DecoderError::GroupSocket(_))));
    }

    #[test]
    fn test_open_group_socket_closed() {
        let mut connection = KnxdConnection::from_stream(MockStream::new(Vec::new()));
        let result = connection.open_group_socket();
        assert!(matches!(result, Err(DecoderError::GroupSocket(_))));
    }

    #[test]
    fn test_receive_group_packet() {
        let input = vec![
            0x00, 0x08, // length
            0x00, 0x27, // EIB_GROUP_PACKET
            0x11, 0x05, // 1.1.5
            0x09, 0x01, // 1/1/1
            0x00, 0x81, // Write, ON
        ];
        let mut connection = KnxdConnection::from_stream(MockStream::new(input));

        let telegram = connection.next_telegram().unwrap();
        assert_eq!(telegram.source.to_string(), "1.1.5");
        assert_eq!(telegram.destination.to_string(), "1/1/1");
        assert_eq!(telegram.payload, vec![0x00, 0x81]);
    }

    #[test]
    fn test_telegram_iterator() {
        let mut input = Vec::new();
        for value in [0x80u8, 0x81] {
            input.extend_from_slice(&[0x00, 0x08, 0x00, 0x27, 0x11, 0x05, 0x09, 0x01, 0x00, value]);
        }
        let mut telegrams = KnxdConnection::from_stream(MockStream::new(input)).telegrams();

        assert_eq!(telegrams.next().unwrap().unwrap().payload, vec![0x00, 0x80]);
        assert_eq!(telegrams.next().unwrap().unwrap().payload, vec![0x00, 0x81]);
        assert!(matches!(telegrams.next(), Some(Err(DecoderError::ReadFailed(_)))));
    }

    #[test]
    fn test_truncated_message_is_read_failure() {
        let mut connection = KnxdConnection::from_stream(MockStream::new(vec![0x00, 0x08, 0x00, 0x27]));
        assert!(matches!(connection.next_telegram(), Err(DecoderError::ReadFailed(_))));
    }

    #[test]
    fn test_parse_group_packet_errors() {
        assert!(matches!(parse_group_packet(&[]), Err(DecoderError::Protocol(_))));
        assert!(matches!(
            parse_group_packet(&[0x00, 0x26]),
            Err(DecoderError::Protocol(_))
        ));
        assert!(matches!(
            parse_group_packet(&[0x00, 0x27, 0x11, 0x05]),
            Err(DecoderError::Protocol(_))
        ));
    }

    #[test]
    fn test_parse_group_packet_without_apdu() {
        let telegram = parse_group_packet(&[0x00, 0x27, 0x11, 0x05, 0x09, 0x01]).unwrap();
        assert!(telegram.is_empty());
    }
}
