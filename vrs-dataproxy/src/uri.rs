//! URI scheme selection for sequence repository backends.
//!
//! Accepted URIs:
//!
//! - `seqrepo+file:///path/to/repository`
//! - `seqrepo+http://host:port/seqrepo`
//! - `seqrepo+https://host:port/seqrepo`
//!
//! When no URI is given, the `GA4GH_VRS_DATAPROXY_URI` environment
//! variable is consulted.

use vrs_core::{Result, SequenceRepository, VrsError};

use crate::dir::DirRepository;
use crate::rest::RestRepository;

/// Environment variable naming the default repository URI.
pub const DATAPROXY_URI_ENV: &str = "GA4GH_VRS_DATAPROXY_URI";

/// Build a repository from a `provider+proto` URI, falling back to
/// [`DATAPROXY_URI_ENV`] when `uri` is `None`.
pub fn create_repository(uri: Option<&str>) -> Result<Box<dyn SequenceRepository>> {
    let uri = match uri {
        Some(uri) => uri.to_string(),
        None => std::env::var(DATAPROXY_URI_ENV).map_err(|_| {
            VrsError::InvalidInput(format!(
                "no repository URI provided and {DATAPROXY_URI_ENV} is not set"
            ))
        })?,
    };

    let (scheme, rest) = uri.split_once("://").ok_or_else(|| {
        VrsError::InvalidInput(format!("repository URI {uri:?} has no scheme"))
    })?;
    let (provider, proto) = scheme.split_once('+').ok_or_else(|| {
        VrsError::InvalidInput(format!(
            "repository URI scheme must include a provider (e.g. seqrepo+http:...), got {scheme:?}"
        ))
    })?;

    if provider != "seqrepo" {
        return Err(VrsError::InvalidInput(format!(
            "unsupported repository provider {provider:?}"
        )));
    }

    match proto {
        "file" => {
            let repo = DirRepository::open(rest)
                .map_err(|e| VrsError::BackendUnavailable(format!("{e:#}")))?;
            Ok(Box::new(repo))
        }
        "http" | "https" => Ok(Box::new(RestRepository::new(format!("{proto}://{rest}")))),
        other => Err(VrsError::InvalidInput(format!(
            "unsupported seqrepo protocol {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRepository;
    use tempfile::tempdir;

    #[test]
    fn file_scheme_opens_a_directory_repository() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("repo");
        let mut mem = MemoryRepository::new();
        mem.add_named_sequence("test", "chr1", b"ACGT");
        DirRepository::save(&root, &mem).unwrap();

        let uri = format!("seqrepo+file://{}", root.display());
        let repo = create_repository(Some(&uri)).unwrap();
        assert_eq!(repo.get_sequence("test:chr1", None, None).unwrap(), "ACGT");
    }

    #[test]
    fn http_scheme_builds_a_rest_client() {
        // Construction is offline; only calls touch the network.
        assert!(create_repository(Some("seqrepo+http://localhost:5000/seqrepo")).is_ok());
        assert!(create_repository(Some("seqrepo+https://example.org/seqrepo")).is_ok());
    }

    #[test]
    fn malformed_uris_are_rejected() {
        assert!(matches!(
            create_repository(Some("seqrepo:/no-provider")),
            Err(VrsError::InvalidInput(_))
        ));
        assert!(matches!(
            create_repository(Some("http://no-provider")),
            Err(VrsError::InvalidInput(_))
        ));
        assert!(matches!(
            create_repository(Some("other+file:///x")),
            Err(VrsError::InvalidInput(_))
        ));
        assert!(matches!(
            create_repository(Some("seqrepo+ftp://x")),
            Err(VrsError::InvalidInput(_))
        ));
    }
}
