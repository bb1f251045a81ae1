//! Signal sources for the classifier.
//! Each source maps an IP address to one auxiliary fact and may fail;
//! failures are folded into "signal unavailable" by the caller.

mod country;
mod network_owner;

use async_trait::async_trait;
use std::net::IpAddr;

use crate::utils::{SignalError, SignalResult};

pub use country::MaxMindCountryLookup;
pub use network_owner::RdapNetworkOwnerLookup;

/// Resolves the registered network/organization name for an address.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NetworkOwnerLookup: Send + Sync {
    async fn resolve(&self, ip: IpAddr) -> SignalResult<String>;
}

/// Resolves the country name for an address.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CountryLookup: Send + Sync {
    async fn resolve(&self, ip: IpAddr) -> SignalResult<String>;
}

/// Stand-in for a source that is not configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledLookup;

#[async_trait]
impl NetworkOwnerLookup for DisabledLookup {
    async fn resolve(&self, _ip: IpAddr) -> SignalResult<String> {
        Err(SignalError::Disabled)
    }
}

#[async_trait]
impl CountryLookup for DisabledLookup {
    async fn resolve(&self, _ip: IpAddr) -> SignalResult<String> {
        Err(SignalError::Disabled)
    }
}
