use async_trait::async_trait;
use maxminddb::{MaxMindDBError, Reader};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use super::CountryLookup;
use crate::utils::{BotResult, SignalError, SignalResult};

// Country-level record of a GeoLite2/GeoIP2 country database
#[derive(Debug, Deserialize)]
struct CountryRecord {
    country: Option<CountryNames>,
}

#[derive(Debug, Deserialize)]
struct CountryNames {
    names: Option<BTreeMap<String, String>>,
}

/// Country lookup against an offline MaxMind database.
///
/// The database is read into memory once; an unreadable file is a startup
/// error rather than a per-request failure.
#[derive(Clone)]
pub struct MaxMindCountryLookup {
    reader: Arc<Reader<Vec<u8>>>,
}

impl MaxMindCountryLookup {
    /// Open a `.mmdb` country database
    pub fn open(path: impl AsRef<Path>) -> BotResult<Self> {
        let reader = Reader::open_readfile(path)?;
        tracing::info!(
            database_type = %reader.metadata.database_type,
            build_epoch = reader.metadata.build_epoch,
            "GeoIP database loaded"
        );
        Ok(Self {
            reader: Arc::new(reader),
        })
    }
}

#[async_trait]
impl CountryLookup for MaxMindCountryLookup {
    async fn resolve(&self, ip: IpAddr) -> SignalResult<String> {
        let reader = Arc::clone(&self.reader);
        let record = tokio::task::spawn_blocking(move || reader.lookup::<CountryRecord>(ip))
            .await
            .map_err(|e| SignalError::Lookup(e.to_string()))?
            .map_err(|e| match e {
                MaxMindDBError::AddressNotFoundError(_) => SignalError::NotFound(ip.to_string()),
                other => SignalError::Lookup(other.to_string()),
            })?;

        english_name(record).ok_or_else(|| SignalError::NotFound(ip.to_string()))
    }
}

fn english_name(record: CountryRecord) -> Option<String> {
    record
        .country
        .and_then(|country| country.names)
        .and_then(|mut names| names.remove("en"))
}
