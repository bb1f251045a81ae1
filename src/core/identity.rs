use std::fmt;
use std::net::IpAddr;

/// Normalized client IP, the sole key for traffic state.
///
/// Equivalent spellings of one address (surrounding whitespace, IPv4-mapped
/// IPv6, upper-case hex) collapse to the same key. Input that is not an IP
/// address is kept verbatim after trimming, so the mapping is deterministic
/// for every raw string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<IpAddr>() {
            Ok(addr) => Self(addr.to_canonical().to_string()),
            Err(_) => Self(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The parsed address, if the identity is one.
    pub fn ip(&self) -> Option<IpAddr> {
        self.0.parse().ok()
    }
}

impl From<&str> for ClientIdentity {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
