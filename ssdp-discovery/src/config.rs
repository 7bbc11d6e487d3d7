//! Search configuration
//!
//! [`SearchOptions`] controls what a search asks for, how long it listens and
//! how it treats datagrams that cannot be turned into a discovery.

use std::time::Duration;

use crate::error::{DiscoveryError, Result};
use crate::transport::DEFAULT_RECEIVE_TIMEOUT;

/// What a search does with a recognized datagram that fails to decode or
/// lacks a location or resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Yield the error and end the search
    #[default]
    Abort,
    /// Log the datagram and keep listening
    Skip,
}

/// Options for a single search invocation.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Resource types to send search requests for. When empty no request is
    /// sent and the search only listens for advertisements.
    /// Default: empty
    pub target_types: Vec<String>,

    /// Total time the search listens for, spread evenly across `tries`
    /// Default: 12 seconds
    pub timeout: Duration,

    /// Number of request rounds
    /// Default: 3
    pub tries: u32,

    /// Value of the MX header, the maximum seconds a device may delay its reply
    /// Default: 3
    pub mx: u32,

    /// Bound on a single blocking receive
    /// Default: 200 milliseconds
    pub receive_timeout: Duration,

    /// Size of the receive buffer; longer datagrams are truncated
    /// Default: 1024 bytes
    pub max_datagram_size: usize,

    /// Handling of datagrams that fail decoding or validation
    /// Default: `MalformedPolicy::Abort`
    pub malformed: MalformedPolicy,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            target_types: Vec::new(),
            timeout: Duration::from_secs(12),
            tries: 3,
            mx: 3,
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
            max_datagram_size: 1024,
            malformed: MalformedPolicy::Abort,
        }
    }
}

impl SearchOptions {
    /// Create SearchOptions with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Search for the given resource types with otherwise default options
    pub fn for_types<I, S>(target_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::default().with_target_types(target_types)
    }

    /// A single short round, for interactive use
    pub fn quick() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            tries: 1,
            mx: 2,
            ..Default::default()
        }
    }

    /// Time each request round listens for
    pub fn per_try_timeout(&self) -> Duration {
        self.timeout / self.tries.max(1)
    }

    /// Validate the configuration
    ///
    /// Zero `tries`, `mx`, `receive_timeout` or `max_datagram_size` is rejected
    /// with `DiscoveryError::Configuration`.
    pub fn validate(&self) -> Result<()> {
        if self.tries == 0 {
            return Err(DiscoveryError::Configuration(
                "Tries must be greater than 0".to_string(),
            ));
        }

        if self.mx == 0 {
            return Err(DiscoveryError::Configuration(
                "MX must be greater than 0".to_string(),
            ));
        }

        if self.receive_timeout == Duration::ZERO {
            return Err(DiscoveryError::Configuration(
                "Receive timeout must be greater than 0".to_string(),
            ));
        }

        if self.max_datagram_size == 0 {
            return Err(DiscoveryError::Configuration(
                "Max datagram size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Set the resource types to search for, replacing any already set
    pub fn with_target_types<I, S>(mut self, target_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_types = target_types.into_iter().map(Into::into).collect();
        self
    }

    /// Add one resource type to search for
    pub fn with_target_type(mut self, target_type: impl Into<String>) -> Self {
        self.target_types.push(target_type.into());
        self
    }

    /// Set the total listening time across all rounds
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the number of request rounds
    pub fn with_tries(mut self, tries: u32) -> Self {
        self.tries = tries;
        self
    }

    /// Set the MX value, in seconds, devices may wait before responding
    pub fn with_mx(mut self, mx: u32) -> Self {
        self.mx = mx;
        self
    }

    /// Set how long a single socket read blocks
    pub fn with_receive_timeout(mut self, receive_timeout: Duration) -> Self {
        self.receive_timeout = receive_timeout;
        self
    }

    /// Set the receive buffer size; longer datagrams are truncated
    pub fn with_max_datagram_size(mut self, size: usize) -> Self {
        self.max_datagram_size = size;
        self
    }

    /// Set how malformed datagrams are handled
    pub fn with_malformed_policy(mut self, policy: MalformedPolicy) -> Self {
        self.malformed = policy;
        self
    }

    /// Skip malformed datagrams instead of ending the search
    pub fn lenient(self) -> Self {
        self.with_malformed_policy(MalformedPolicy::Skip)
    }
}
