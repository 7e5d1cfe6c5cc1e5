//! Client for a seqrepo REST service.
//!
//! Speaks the seqrepo-rest-services API: `GET <base>/1/sequence/<id>` with
//! optional `start`/`end` query parameters, and `GET <base>/1/metadata/<id>`.
//! A 404 maps to `UnknownReference`; transport failures map to
//! `BackendUnavailable` and are propagated unchanged (retries are the
//! caller's responsibility).

use serde::Deserialize;

use vrs_core::{Result, SequenceMetadata, SequenceRepository, VrsError};

const REST_VERSION: &str = "1";

/// [`SequenceRepository`] over a remote seqrepo REST endpoint.
#[derive(Debug, Clone)]
pub struct RestRepository {
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct MetadataResponse {
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    alphabet: String,
    length: u64,
    #[serde(default)]
    circular: bool,
}

impl RestRepository {
    /// `base_url` is the service root, e.g. `http://localhost:5000/seqrepo`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        RestRepository { base_url }
    }

    fn fetch(&self, url: &str, query: &[(&str, String)]) -> Result<String> {
        log::debug!("fetching {url}");
        let mut request = ureq::get(url);
        for (key, value) in query {
            request = request.query(key, value);
        }
        match request.call() {
            Ok(response) => response.into_string().map_err(|e| {
                VrsError::BackendUnavailable(format!("error reading response from {url}: {e}"))
            }),
            Err(ureq::Error::Status(404, _)) => Err(VrsError::UnknownReference(url.to_string())),
            Err(ureq::Error::Status(code, _)) => Err(VrsError::BackendUnavailable(format!(
                "{url} returned HTTP {code}"
            ))),
            Err(e) => Err(VrsError::BackendUnavailable(format!("{url}: {e}"))),
        }
    }
}

impl SequenceRepository for RestRepository {
    fn get_sequence(
        &self,
        identifier: &str,
        start: Option<u64>,
        end: Option<u64>,
    ) -> Result<String> {
        let url = format!("{}/{REST_VERSION}/sequence/{identifier}", self.base_url);
        let mut query = Vec::new();
        if let Some(start) = start {
            query.push(("start", start.to_string()));
        }
        if let Some(end) = end {
            query.push(("end", end.to_string()));
        }
        self.fetch(&url, &query)
    }

    fn get_metadata(&self, identifier: &str) -> Result<SequenceMetadata> {
        let url = format!("{}/{REST_VERSION}/metadata/{identifier}", self.base_url);
        let body = self.fetch(&url, &[])?;
        let md: MetadataResponse = serde_json::from_str(&body).map_err(|e| {
            VrsError::BackendUnavailable(format!("unparseable metadata from {url}: {e}"))
        })?;
        Ok(SequenceMetadata {
            aliases: md.aliases,
            alphabet: md.alphabet,
            length: md.length,
            circular: md.circular,
        })
    }
}
