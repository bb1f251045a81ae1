use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;

use super::NetworkOwnerLookup;
use crate::utils::{BotResult, SignalError, SignalResult};

/// The part of an RDAP IP network object we use
#[derive(Debug, Deserialize)]
struct RdapNetwork {
    name: Option<String>,
}

/// Network owner lookup over RDAP.
///
/// Queries `{base_url}/ip/{address}`; a bootstrap service such as
/// `https://rdap.org` redirects to the registry that owns the allocation.
/// The owner is the network object's `name`.
pub struct RdapNetworkOwnerLookup {
    client: Client,
    base_url: String,
}

impl RdapNetworkOwnerLookup {
    /// Creates a new RDAP client bounded by `timeout` per request
    pub fn new(base_url: &str, timeout: Duration) -> BotResult<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(timeout)
                .user_agent(concat!("bot_detection_service/", env!("CARGO_PKG_VERSION")))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, ip: IpAddr) -> String {
        format!("{}/ip/{}", self.base_url, ip)
    }
}

#[async_trait]
impl NetworkOwnerLookup for RdapNetworkOwnerLookup {
    async fn resolve(&self, ip: IpAddr) -> SignalResult<String> {
        let response = self
            .client
            .get(self.url_for(ip))
            .header(header::ACCEPT, "application/rdap+json, application/json")
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Err(SignalError::NotFound(ip.to_string())),
            status => return Err(SignalError::Lookup(format!("registry returned {}", status))),
        }

        let network: RdapNetwork = response.json().await?;
        network
            .name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| SignalError::MalformedResponse("network object has no name".to_string()))
    }
}
