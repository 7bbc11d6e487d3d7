//! Test helpers for fixture-based integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::net::SocketAddrV4;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ssdp_discovery::{Received, Transport};

/// Load the raw datagrams stored in a fixture file.
///
/// Fixture files hold one datagram per `%%`-separated block with plain
/// newlines; each block is converted to CRLF line endings and terminated by
/// an empty line, as it would arrive on the wire.
pub fn load_datagrams(filename: &str) -> Vec<Vec<u8>> {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures");
    path.push(filename);

    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", filename, e));

    content
        .split("\n%%\n")
        .map(|block| {
            let lines: Vec<&str> = block.trim_matches('\n').lines().collect();
            format!("{}\r\n\r\n", lines.join("\r\n")).into_bytes()
        })
        .collect()
}

/// The captured search responses and advertisements, including one exact
/// duplicate.
pub fn fixture_datagrams() -> Vec<Vec<u8>> {
    load_datagrams("ssdp_datagrams.txt")
}

/// `(location, type)` pairs the fixture datagrams resolve to, sorted.
pub fn expected_fixture_discoveries() -> Vec<(&'static str, &'static str)> {
    vec![
        ("http://10.11.12.21:8008/ssdp/device-desc.xml", "upnp:rootdevice"),
        ("http://10.11.12.23:7676/smp_2_", "upnp:rootdevice"),
        ("http://10.11.12.23:7676/smp_7_", "upnp:rootdevice"),
        ("http://10.11.12.24:49153/description7.xml", "upnp:rootdevice"),
        ("http://10.11.12.24:49153/description8.xml", "upnp:rootdevice"),
        ("http://10.11.12.24:49153/description9.xml", "upnp:rootdevice"),
        (
            "http://10.11.12.32:41870/rootDesc.xml",
            "urn:schemas-upnp-org:service:Layer3Forwarding:1",
        ),
        (
            "http://10.11.12.32:41870/rootDesc.xml",
            "urn:schemas-upnp-org:service:WANPPPConnection:1",
        ),
    ]
}

/// What a [`MockTransport`] observed, shared with the test after the
/// transport has been moved into a search.
#[derive(Debug, Default)]
pub struct TransportLog {
    pub sent: Vec<(String, SocketAddrV4)>,
    pub receives: usize,
    pub closes: usize,
}

/// In-memory transport that hands out queued datagrams and then behaves like
/// an idle socket: each receive sleeps for the receive timeout and reports
/// `WouldBlock`.
pub struct MockTransport {
    datagrams: VecDeque<Vec<u8>>,
    receive_timeout: Duration,
    repeat: bool,
    closed: bool,
    log: Arc<Mutex<TransportLog>>,
}

impl MockTransport {
    pub fn new(datagrams: Vec<Vec<u8>>) -> (Self, Arc<Mutex<TransportLog>>) {
        let log = Arc::new(Mutex::new(TransportLog::default()));
        let transport = Self {
            datagrams: datagrams.into(),
            receive_timeout: Duration::from_millis(20),
            repeat: false,
            closed: false,
            log: Arc::clone(&log),
        };
        (transport, log)
    }

    /// A transport that never runs dry: the datagrams are replayed forever
    /// without any delay.
    pub fn flood(datagrams: Vec<Vec<u8>>) -> (Self, Arc<Mutex<TransportLog>>) {
        let (mut transport, log) = Self::new(datagrams);
        transport.repeat = true;
        (transport, log)
    }
}

impl Transport for MockTransport {
    fn send_to(&mut self, datagram: &[u8], target: SocketAddrV4) -> io::Result<()> {
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "transport is closed"));
        }
        let request = String::from_utf8_lossy(datagram).into_owned();
        self.log.lock().unwrap().sent.push((request, target));
        Ok(())
    }

    fn receive(&mut self, buffer: &mut [u8]) -> io::Result<Received> {
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "transport is closed"));
        }
        self.log.lock().unwrap().receives += 1;

        match self.datagrams.pop_front() {
            Some(datagram) => {
                let size = datagram.len().min(buffer.len());
                buffer[..size].copy_from_slice(&datagram[..size]);
                if self.repeat {
                    self.datagrams.push_back(datagram);
                }
                Ok(Received::Datagram(size))
            }
            None => {
                std::thread::sleep(self.receive_timeout);
                Ok(Received::WouldBlock)
            }
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.log.lock().unwrap().closes += 1;
        }
    }
}
