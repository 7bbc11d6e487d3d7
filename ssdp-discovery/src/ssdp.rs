//! SSDP (Simple Service Discovery Protocol) message codec
//!
//! Encodes M-SEARCH requests into wire bytes and decodes search responses and
//! NOTIFY advertisements into header maps. Also holds the protocol constants
//! shared by the transport and the search loop.

use std::net::{Ipv4Addr, SocketAddrV4};

use crate::error::Result;
use crate::headers::HeaderMap;

/// The multicast group SSDP traffic is sent to.
pub const SSDP_MULTICAST_ADDR: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);

/// The port SSDP traffic is sent to.
pub const SSDP_PORT: u16 = 1900;

/// The multicast group and port as a socket address.
pub const SSDP_TARGET: SocketAddrV4 = SocketAddrV4::new(SSDP_MULTICAST_ADDR, SSDP_PORT);

/// Request line of a search request.
pub const SEARCH_REQUEST_LINE: &str = "M-SEARCH * HTTP/1.1";

/// Value of the MAN header marking a request as a discovery search.
pub const SSDP_DISCOVER: &str = "\"ssdp:discover\"";

const SEARCH_RESPONSE_PREFIX: &[u8] = b"HTTP/1.1 200 OK";
const ADVERTISEMENT_PREFIX: &[u8] = b"NOTIFY * HTTP/1.1";

/// Kind of an inbound datagram recognized by its leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// A unicast reply to an M-SEARCH request
    SearchResponse,
    /// An unsolicited NOTIFY announcement
    Advertisement,
}

impl MessageKind {
    /// Recognize a datagram by its prefix. Anything else on the multicast
    /// group (other control points' M-SEARCH requests, garbage) yields `None`.
    pub fn classify(datagram: &[u8]) -> Option<Self> {
        if datagram.starts_with(SEARCH_RESPONSE_PREFIX) {
            Some(MessageKind::SearchResponse)
        } else if datagram.starts_with(ADVERTISEMENT_PREFIX) {
            Some(MessageKind::Advertisement)
        } else {
            None
        }
    }
}

/// Build the headers of a search request for one resource type.
pub fn search_headers(search_target: &str, mx: u32) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("HOST", SSDP_TARGET.to_string());
    headers.insert("MAN", SSDP_DISCOVER);
    headers.insert("MX", mx.to_string());
    headers.insert("ST", search_target);
    headers
}

/// Encode a request line and headers into the bytes of an SSDP request.
///
/// Lines are joined with CRLF and the message ends with an empty line.
/// Headers are written in the map's iteration order.
pub fn encode_request(request_line: &str, headers: &HeaderMap) -> Vec<u8> {
    let mut message = String::from(request_line);
    for (name, value) in headers.iter() {
        message.push_str("\r\n");
        message.push_str(name);
        message.push_str(": ");
        message.push_str(value);
    }
    message.push_str("\r\n\r\n");
    message.into_bytes()
}

/// Decode the headers of an SSDP response or advertisement.
///
/// The first line (status or request line) is discarded. Each remaining
/// non-blank line is split on its first colon; a line without a colon becomes
/// a header with an empty value.
///
/// # Errors
///
/// Returns `DiscoveryError::Decode` if the bytes are not valid UTF-8.
pub fn decode_response(datagram: &[u8]) -> Result<HeaderMap> {
    let text = std::str::from_utf8(datagram)?;
    let mut headers = HeaderMap::new();

    for line in text.split(|c| c == '\r' || c == '\n').skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(':') {
            Some((name, value)) => headers.insert(name.trim(), value.trim()),
            None => headers.insert(line, ""),
        };
    }

    Ok(headers)
}
