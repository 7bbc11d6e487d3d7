//! SSDP resource discovery library
//!
//! This crate finds devices and services that announce themselves with SSDP
//! (Simple Service Discovery Protocol), the discovery layer of UPnP. A search
//! multicasts M-SEARCH requests, listens for search responses and NOTIFY
//! advertisements for a bounded time, and yields each distinct resource once.
//!
//! # Quick Start
//!
//! ```no_run
//! use ssdp_discovery::search;
//! use std::time::Duration;
//!
//! // Three request rounds over twelve seconds
//! for result in search(["upnp:rootdevice"], Duration::from_secs(12), 3)? {
//!     let discovery = result?;
//!     println!("{}", discovery);
//! }
//! # Ok::<(), ssdp_discovery::DiscoveryError>(())
//! ```
//!
//! # Listening Without Searching
//!
//! With no target types nothing is sent; the search only collects
//! advertisements that devices multicast on their own.
//!
//! ```no_run
//! use ssdp_discovery::{discover, SearchOptions};
//! use std::time::Duration;
//!
//! let options = SearchOptions::new().with_timeout(Duration::from_secs(5)).with_tries(1);
//! for discovery in discover(options)? {
//!     if discovery.has_host("192.168.1.1") {
//!         println!("router advertises {}", discovery.resource_type());
//!     }
//! }
//! # Ok::<(), ssdp_discovery::DiscoveryError>(())
//! ```

mod config;
mod discovery;
mod error;
mod headers;
pub mod logging;
mod search;
pub mod ssdp;
pub mod transport;

pub use config::{MalformedPolicy, SearchOptions};
pub use discovery::Discovery;
pub use error::{DiscoveryError, Result};
pub use headers::HeaderMap;
pub use search::Search;
pub use transport::{MulticastTransport, Received, Transport};

use std::time::Duration;

/// Search for resources of the given types.
///
/// `timeout` is the total listening time, split evenly across `tries` request
/// rounds. An empty `target_types` only listens for advertisements.
///
/// # Errors
///
/// Returns `DiscoveryError::Transport` if the multicast socket cannot be set
/// up, before any request is sent, and `DiscoveryError::Configuration` if
/// `tries` is zero. Errors met while searching are yielded by the iterator.
pub fn search<I, S>(target_types: I, timeout: Duration, tries: u32) -> Result<Search>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    search_with(
        SearchOptions::for_types(target_types)
            .with_timeout(timeout)
            .with_tries(tries),
    )
}

/// Search for resources of a single type.
pub fn search_for(target_type: &str, timeout: Duration, tries: u32) -> Result<Search> {
    search([target_type], timeout, tries)
}

/// Search with full control over the options.
pub fn search_with(options: SearchOptions) -> Result<Search> {
    options.validate()?;
    let transport = MulticastTransport::open_with_timeout(options.receive_timeout)?;
    Search::new(transport, options)
}

/// Search over a caller-supplied transport.
///
/// The transport keeps its own receive timeout; `options.receive_timeout` only
/// applies to the multicast socket that [`search_with`] opens.
///
/// # Errors
///
/// Returns `DiscoveryError::Configuration` if the options are invalid, after
/// closing the transport.
pub fn search_with_transport<T: Transport>(transport: T, options: SearchOptions) -> Result<Search<T>> {
    Search::new(transport, options)
}

/// Run a search to completion and collect every discovery.
///
/// Stops at the first error the search yields.
pub fn discover(options: SearchOptions) -> Result<Vec<Discovery>> {
    search_with(options)?.collect()
}
