//! Discovered resource records.
//!
//! A [`Discovery`] is built from the headers of one search response or
//! advertisement. Construction validates that the two headers every result
//! needs, the location and the resource type, can be resolved.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;
use url::Url;

use crate::error::{DiscoveryError, Result};
use crate::headers::HeaderMap;

/// A resource found through an SSDP search response or advertisement.
///
/// Two discoveries are equal when they share a location and resource type,
/// regardless of their other headers. Ordering follows the same pair.
#[derive(Debug, Clone, Serialize)]
pub struct Discovery {
    location: String,
    #[serde(rename = "type")]
    resource_type: String,
    headers: HeaderMap,
}

impl Discovery {
    /// Create a discovery from response headers.
    ///
    /// The resource type is the `ST` header when it is present and non-empty,
    /// otherwise the `NT` header.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::Validation` if there is no `LOCATION` header,
    /// or neither an `ST` nor an `NT` header to take the type from.
    pub fn from_headers(headers: HeaderMap) -> Result<Self> {
        let location = headers.get("location").map(str::to_string);
        let Some(location) = location else {
            return Err(DiscoveryError::Validation {
                field: "location",
                headers,
            });
        };

        let resource_type = headers
            .get("st")
            .filter(|st| !st.is_empty())
            .or_else(|| headers.get("nt"))
            .map(str::to_string);
        let Some(resource_type) = resource_type else {
            return Err(DiscoveryError::Validation {
                field: "type",
                headers,
            });
        };

        Ok(Self {
            location,
            resource_type,
            headers,
        })
    }

    /// URL of the resource's description document.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// The resource type, describing either a service or a device.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// All headers as received.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Look up any received header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn parsed_location(&self) -> std::result::Result<Url, url::ParseError> {
        Url::parse(&self.location)
    }

    /// Whether the resource lives on `host`, given either as a hostname
    /// (`"localhost"`) or a host and port (`"localhost:80"`).
    ///
    /// Both forms compare ignoring ASCII case. The `host:port` form also
    /// matches the scheme's default port when the location names none, so
    /// `http://router/` is on `"router:80"`. A location that is not a valid
    /// URL is on no host.
    pub fn has_host(&self, host: &str) -> bool {
        let Ok(url) = self.parsed_location() else {
            return false;
        };
        let Some(url_host) = url.host_str() else {
            return false;
        };

        let hostname = url_host.trim_start_matches('[').trim_end_matches(']');
        if hostname.eq_ignore_ascii_case(host) {
            return true;
        }

        match url.port_or_known_default() {
            Some(port) => format!("{}:{}", url_host, port).eq_ignore_ascii_case(host),
            None => false,
        }
    }

    fn identity(&self) -> (&str, &str) {
        (&self.location, &self.resource_type)
    }
}

impl TryFrom<HeaderMap> for Discovery {
    type Error = DiscoveryError;

    fn try_from(headers: HeaderMap) -> Result<Self> {
        Discovery::from_headers(headers)
    }
}

impl PartialEq for Discovery {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Discovery {}

impl Hash for Discovery {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl PartialOrd for Discovery {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Discovery {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}

impl fmt::Display for Discovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at {}", self.resource_type, self.location)
    }
}
