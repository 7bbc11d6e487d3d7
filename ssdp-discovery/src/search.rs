//! Core search loop and iterator implementation.
//!
//! Each request round:
//! 1. Sends one M-SEARCH request per requested resource type
//! 2. Listens until the round's share of the timeout has elapsed
//! 3. Drops datagrams that are neither search responses nor advertisements
//! 4. Parses the rest into discoveries, deduplicated by location and type
//! 5. Yields those whose type was asked for (or all, when listening passively)

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::config::{MalformedPolicy, SearchOptions};
use crate::discovery::Discovery;
use crate::error::{DiscoveryError, Result};
use crate::ssdp::{self, MessageKind, SEARCH_REQUEST_LINE, SSDP_TARGET};
use crate::transport::{MulticastTransport, Received, Transport};

/// Receive window of the current request round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Window {
    /// No round is listening; the next one starts on the following `next`.
    Closed,
    Until(Instant),
    /// The round's timeout does not fit in an `Instant`, so it never closes.
    Unbounded,
}

/// Iterator over the resources found by one search.
///
/// Every call to `next` may block until a datagram arrives or the current
/// round's window closes. The iterator ends once every round has run; an
/// error is yielded at most once and also ends it. The transport is closed
/// when the iterator ends or is dropped, whichever comes first.
///
/// # Examples
///
/// ```no_run
/// use ssdp_discovery::search_for;
/// use std::time::Duration;
///
/// for result in search_for("upnp:rootdevice", Duration::from_secs(3), 1)? {
///     let discovery = result?;
///     println!("{} at {}", discovery.resource_type(), discovery.location());
/// }
/// # Ok::<(), ssdp_discovery::DiscoveryError>(())
/// ```
pub struct Search<T: Transport = MulticastTransport> {
    transport: T,
    options: SearchOptions,
    per_try_timeout: Duration,
    type_filter: Option<HashSet<String>>,
    seen: HashSet<(String, String)>,
    buffer: Vec<u8>,
    tries_started: u32,
    window: Window,
    finished: bool,
}

impl<T: Transport> Search<T> {
    /// Start a search over an open transport. Nothing is sent until the first
    /// call to `next`.
    pub(crate) fn new(mut transport: T, options: SearchOptions) -> Result<Self> {
        if let Err(e) = options.validate() {
            transport.close();
            return Err(e);
        }

        let type_filter = if options.target_types.is_empty() {
            None
        } else {
            Some(options.target_types.iter().cloned().collect())
        };

        Ok(Self {
            per_try_timeout: options.per_try_timeout(),
            buffer: vec![0; options.max_datagram_size],
            transport,
            options,
            type_filter,
            seen: HashSet::new(),
            tries_started: 0,
            window: Window::Closed,
            finished: false,
        })
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Send this round's requests and open its receive window.
    fn start_try(&mut self) -> Window {
        self.tries_started += 1;
        debug!(
            "Starting search round {}/{} ({} target types)",
            self.tries_started,
            self.options.tries,
            self.options.target_types.len()
        );

        for target_type in &self.options.target_types {
            let request = ssdp::encode_request(
                SEARCH_REQUEST_LINE,
                &ssdp::search_headers(target_type, self.options.mx),
            );
            match self.transport.send_to(&request, SSDP_TARGET) {
                Ok(()) => debug!("M-SEARCH sent (ST={}, MX={})", target_type, self.options.mx),
                Err(e) => warn!("Failed to send M-SEARCH for {}: {}", target_type, e),
            }
        }

        self.window = match Instant::now().checked_add(self.per_try_timeout) {
            Some(deadline) => Window::Until(deadline),
            None => Window::Unbounded,
        };
        self.window
    }

    /// Turn a received datagram into a discovery worth yielding.
    ///
    /// `Ok(None)` means the datagram was dropped: unrecognized, already seen
    /// or of a type nobody asked for.
    fn accept(&mut self, size: usize) -> Result<Option<Discovery>> {
        let size = size.min(self.buffer.len());
        let datagram = &self.buffer[..size];
        let Some(kind) = MessageKind::classify(datagram) else {
            trace!("Ignoring unrecognized {} byte datagram", size);
            return Ok(None);
        };

        let headers = ssdp::decode_response(datagram)?;
        let discovery = Discovery::from_headers(headers)?;

        let identity = (
            discovery.location().to_string(),
            discovery.resource_type().to_string(),
        );
        if !self.seen.insert(identity) {
            trace!("Skipping duplicate {}", discovery);
            return Ok(None);
        }

        if let Some(filter) = &self.type_filter {
            if !filter.contains(discovery.resource_type()) {
                trace!("Skipping {} (type not requested)", discovery);
                return Ok(None);
            }
        }

        debug!("Found {} via {:?}", discovery, kind);
        Ok(Some(discovery))
    }

    fn finish(&mut self) {
        self.finished = true;
        self.window = Window::Closed;
        self.transport.close();
    }
}

impl<T: Transport> Iterator for Search<T> {
    type Item = Result<Discovery>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }

            let window = match self.window {
                Window::Closed if self.tries_started < self.options.tries => self.start_try(),
                Window::Closed => {
                    debug!("Search finished after {} rounds", self.tries_started);
                    self.finish();
                    return None;
                }
                open => open,
            };

            // The window closes on wall-clock time, however many receives it took
            if let Window::Until(deadline) = window {
                if Instant::now() >= deadline {
                    self.window = Window::Closed;
                    continue;
                }
            }

            let size = match self.transport.receive(&mut self.buffer) {
                Ok(Received::Datagram(size)) => size,
                Ok(Received::WouldBlock) => continue,
                Err(e) => {
                    self.finish();
                    return Some(Err(DiscoveryError::transport("receive", e)));
                }
            };

            match self.accept(size) {
                Ok(Some(discovery)) => return Some(Ok(discovery)),
                Ok(None) => continue,
                Err(e) if self.options.malformed == MalformedPolicy::Skip => {
                    warn!("Skipping malformed datagram: {}", e);
                    continue;
                }
                Err(e) => {
                    self.finish();
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<T: Transport> Drop for Search<T> {
    fn drop(&mut self) {
        // Covers iterators abandoned before their last round
        self.transport.close();
    }
}
