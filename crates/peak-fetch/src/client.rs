//! Blocking HTTP client for GeoNorge, Kartverket downloads and Overpass.

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client, Response};
use reqwest::header::USER_AGENT;
use tracing::{debug, info};

use crate::error::{FetchError, Result};
use crate::municipality::{
    Municipality, MunicipalityQuery, MunicipalityRecord, SearchResponse, resolve_search,
};
use crate::overpass::{OVERPASS_API_URL, overpass_query};

/// GeoNorge municipality register.
pub const GEONORGE_API_URL: &str = "https://ws.geonorge.no/kommuneinfo/v1/";

/// Kartverket N50 map data, one GML zip per municipality.
pub const N50_DOWNLOAD_URL: &str =
    "https://nedlasting.geonorge.no/geonorge/Basisdata/N50Kartdata/GML/";

/// Overpass may take minutes for large municipalities.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(240);

/// Client for the municipality register, the N50 download and the Overpass
/// interpreter.
pub struct FetchClient {
    client: Client,
    geonorge_url: String,
    n50_url: String,
    overpass_url: String,
}

impl FetchClient {
    /// Create a client for the public endpoints.
    pub fn new() -> Result<Self> {
        Self::with_endpoints(GEONORGE_API_URL, OVERPASS_API_URL)
    }

    /// Create a client for other endpoints, e.g. a private Overpass instance.
    pub fn with_endpoints(geonorge_url: &str, overpass_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(FetchError::Network)?;

        Ok(Self {
            client,
            geonorge_url: with_trailing_slash(geonorge_url),
            n50_url: N50_DOWNLOAD_URL.to_string(),
            overpass_url: overpass_url.to_string(),
        })
    }

    /// Download N50 archives from another folder, e.g. a local mirror.
    #[must_use]
    pub fn with_n50_url(mut self, n50_url: &str) -> Self {
        self.n50_url = with_trailing_slash(n50_url);
        self
    }

    /// Register URL for a number or name query.
    pub fn municipality_url(&self, query: &MunicipalityQuery) -> Result<Url> {
        let base = parse_url(&self.geonorge_url)?;
        let url = match query {
            MunicipalityQuery::Number(id) => join_url(&base, &format!("kommuner/{id}"))?,
            MunicipalityQuery::Name(name) => {
                let mut url = join_url(&base, "sok")?;
                url.query_pairs_mut().append_pair("knavn", name);
                url
            }
        };
        Ok(url)
    }

    /// Kartverket URL of the N50 archive for a municipality.
    pub fn n50_url(&self, municipality: &Municipality) -> Result<Url> {
        let base = parse_url(&self.n50_url)?;
        join_url(&base, &format!("{}.zip", municipality.n50_archive_stem()))
    }

    /// Overpass URL carrying the peak query for a municipality.
    pub fn overpass_url(&self, municipality_id: &str) -> Result<Url> {
        let mut url = parse_url(&self.overpass_url)?;
        url.query_pairs_mut()
            .append_pair("data", &overpass_query(municipality_id));
        Ok(url)
    }

    /// Resolve a municipality number or name to id and name.
    pub fn municipality(&self, query: &MunicipalityQuery) -> Result<Municipality> {
        let url = self.municipality_url(query)?;
        debug!(%url, "looking up municipality");

        let response = self.get(url)?;
        if response.status().as_u16() == 404 {
            return Err(FetchError::MunicipalityNotFound {
                query: query.as_str().to_string(),
            });
        }
        let response = ensure_success("GeoNorge", response)?;
        let body = response.text().map_err(FetchError::Network)?;

        let municipality = match query {
            MunicipalityQuery::Number(id) => {
                let record: MunicipalityRecord = serde_json::from_str(&body)?;
                Municipality::new(id.as_str(), record.name)
            }
            MunicipalityQuery::Name(name) => {
                let search: SearchResponse = serde_json::from_str(&body)?;
                resolve_search(name, search)?
            }
        };
        info!(id = %municipality.id, name = %municipality.name, "resolved municipality");
        Ok(municipality)
    }

    /// Download the elevation features of a municipality as OSM XML.
    pub fn download_peaks(&self, municipality_id: &str) -> Result<String> {
        let url = self.overpass_url(municipality_id)?;
        info!(municipality = municipality_id, "loading existing OSM peaks from Overpass");

        let response = ensure_success("Overpass", self.get(url)?)?;
        let xml = response.text().map_err(FetchError::Network)?;
        debug!(bytes = xml.len(), "Overpass response received");
        Ok(xml)
    }

    /// Download the N50 map data archive of a municipality.
    pub fn download_n50(&self, municipality: &Municipality) -> Result<Vec<u8>> {
        let url = self.n50_url(municipality)?;
        info!(%municipality, %url, "loading N50 peaks from Kartverket");

        let response = ensure_success("Kartverket", self.get(url)?)?;
        let archive = response.bytes().map_err(FetchError::Network)?;
        debug!(bytes = archive.len(), "N50 archive received");
        Ok(archive.to_vec())
    }

    fn get(&self, url: Url) -> Result<Response> {
        self.client
            .get(url)
            .header(USER_AGENT, format!("peakmerge/{}", env!("CARGO_PKG_VERSION")))
            .send()
            .map_err(FetchError::Network)
    }
}

fn ensure_success(service: &'static str, response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let message = response.text().unwrap_or_else(|_| "Unknown error".to_string());
    Err(FetchError::Http {
        service,
        status,
        message,
    })
}

fn with_trailing_slash(url: &str) -> String {
    let mut url = url.to_string();
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|err| FetchError::InvalidUrl {
        url: url.to_string(),
        message: err.to_string(),
    })
}

fn join_url(base: &Url, path: &str) -> Result<Url> {
    base.join(path).map_err(|err| FetchError::InvalidUrl {
        url: format!("{base}{path}"),
        message: err.to_string(),
    })
}
