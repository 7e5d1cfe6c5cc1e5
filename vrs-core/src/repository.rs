//! The sequence repository collaborator interface.
//!
//! The core performs no sequence I/O of its own; everything flows through
//! [`SequenceRepository`]. Concrete backends (in-memory, directory, REST)
//! live in the `vrs-dataproxy` crate.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::errors::{Result, VrsError};

/// Metadata for a stored sequence, immutable once a refget accession is
/// fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceMetadata {
    /// Namespaced aliases, e.g. `refseq:NC_000005.10`, `ga4gh:SQ....`.
    pub aliases: Vec<String>,
    /// The observed character set of the sequence, e.g. `ACGT`.
    pub alphabet: String,
    pub length: u64,
    pub circular: bool,
}

/// Read access to biological sequences and their alias graph.
///
/// Identifiers may be namespaced (`refseq:NC_000005.10`, `GRCh38:5`,
/// `ga4gh:SQ....`) or bare; backends should accept anything
/// [`coerce_namespace`] can resolve. Implementations must include the
/// `ga4gh:SQ....` form among every sequence's aliases.
pub trait SequenceRepository {
    /// Residues over a half-open interbase interval; the full sequence when
    /// no bounds are given.
    fn get_sequence(&self, identifier: &str, start: Option<u64>, end: Option<u64>)
        -> Result<String>;

    fn get_metadata(&self, identifier: &str) -> Result<SequenceMetadata>;

    /// Map an identifier to its aliases, optionally filtered to one
    /// namespace. Results are sorted for determinism.
    fn translate_identifier(
        &self,
        identifier: &str,
        target_namespace: Option<&str>,
    ) -> Result<Vec<String>> {
        let md = self.get_metadata(identifier)?;
        let mut aliases = md.aliases;
        if let Some(ns) = target_namespace {
            let prefix = format!("{ns}:");
            aliases.retain(|a| a.starts_with(&prefix));
        }
        aliases.sort();
        aliases.dedup();
        Ok(aliases)
    }

    /// Shortcut to the `SQ....` refget accession for any known alias.
    fn derive_refget_accession(&self, identifier: &str) -> Result<String> {
        let coerced = coerce_namespace(identifier);
        if let Some(accession) = coerced.strip_prefix("ga4gh:") {
            if accession.starts_with("SQ.") {
                return Ok(accession.to_string());
            }
        }
        self.translate_identifier(&coerced, Some("ga4gh"))?
            .into_iter()
            .next()
            .map(|a| a["ga4gh:".len()..].to_string())
            .ok_or_else(|| VrsError::UnknownReference(identifier.to_string()))
    }
}

/// Attach the conventional namespace to a bare accession: RefSeq-style
/// accessions get `refseq:`, refget digests get `ga4gh:`; identifiers that
/// already carry a namespace pass through.
pub fn coerce_namespace(identifier: &str) -> String {
    if identifier.contains(':') {
        return identifier.to_string();
    }
    if identifier.starts_with("SQ.") {
        return format!("ga4gh:{identifier}");
    }
    const REFSEQ_PREFIXES: [&str; 10] = [
        "NC_", "NM_", "NG_", "NR_", "NP_", "NW_", "NT_", "XM_", "XR_", "XP_",
    ];
    if REFSEQ_PREFIXES.iter().any(|p| identifier.starts_with(p)) {
        return format!("refseq:{identifier}");
    }
    identifier.to_string()
}

const PROXY_PAGE: u64 = 1024;

/// Random-access view of one sequence, fetching pages on demand.
///
/// The page cache lives inside the proxy (one normalization run), never in
/// process-wide state, so repository contents can change between runs
/// without invalidation concerns.
pub struct SequenceProxy<'a> {
    repo: &'a dyn SequenceRepository,
    accession: String,
    length: u64,
    circular: bool,
    pages: RefCell<HashMap<u64, Vec<u8>>>,
}

impl<'a> SequenceProxy<'a> {
    pub fn new(repo: &'a dyn SequenceRepository, accession: &str) -> Result<Self> {
        let md = repo.get_metadata(accession)?;
        Ok(SequenceProxy {
            repo,
            accession: accession.to_string(),
            length: md.length,
            circular: md.circular,
            pages: RefCell::new(HashMap::new()),
        })
    }

    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn is_circular(&self) -> bool {
        self.circular
    }

    /// Residues over `[start, end)`, without wraparound.
    pub fn slice(&self, start: u64, end: u64) -> Result<String> {
        if start > end || end > self.length {
            return Err(VrsError::InvalidInput(format!(
                "interval [{start}, {end}) is not within {} (length {})",
                self.accession, self.length
            )));
        }
        self.repo
            .get_sequence(&self.accession, Some(start), Some(end))
    }

    /// One residue at `pos`, served from the page cache.
    pub fn residue(&self, pos: u64) -> Result<u8> {
        if pos >= self.length {
            return Err(VrsError::InvalidInput(format!(
                "position {pos} is not within {} (length {})",
                self.accession, self.length
            )));
        }
        let page = pos / PROXY_PAGE;
        {
            let mut pages = self.pages.borrow_mut();
            if !pages.contains_key(&page) {
                let start = page * PROXY_PAGE;
                let end = (start + PROXY_PAGE).min(self.length);
                let bytes = self
                    .repo
                    .get_sequence(&self.accession, Some(start), Some(end))?
                    .into_bytes();
                pages.insert(page, bytes);
            }
        }
        let pages = self.pages.borrow();
        let offset = (pos % PROXY_PAGE) as usize;
        pages[&page].get(offset).copied().ok_or_else(|| {
            VrsError::BackendUnavailable(format!("{} returned a short slice", self.accession))
        })
    }

    /// One residue at a signed position taken modulo the sequence length.
    /// Only meaningful on circular references.
    pub fn residue_wrapped(&self, pos: i128) -> Result<u8> {
        let wrapped = pos.rem_euclid(self.length as i128) as u64;
        self.residue(wrapped)
    }

    /// Residues over a signed interval with wraparound, assembled from the
    /// page cache.
    pub fn slice_wrapped(&self, start: i128, end: i128) -> Result<String> {
        let mut out = Vec::with_capacity((end - start).max(0) as usize);
        let mut pos = start;
        while pos < end {
            out.push(self.residue_wrapped(pos)?);
            pos += 1;
        }
        String::from_utf8(out)
            .map_err(|_| VrsError::BackendUnavailable(format!("{} is not UTF-8", self.accession)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A repository over one fixed in-line sequence, enough to exercise the
    /// proxy and the trait's default methods.
    struct OneSequence {
        residues: &'static str,
        fetches: RefCell<usize>,
    }

    impl SequenceRepository for OneSequence {
        fn get_sequence(
            &self,
            _identifier: &str,
            start: Option<u64>,
            end: Option<u64>,
        ) -> Result<String> {
            *self.fetches.borrow_mut() += 1;
            let s = start.unwrap_or(0) as usize;
            let e = end.unwrap_or(self.residues.len() as u64) as usize;
            Ok(self.residues[s..e].to_string())
        }

        fn get_metadata(&self, _identifier: &str) -> Result<SequenceMetadata> {
            Ok(SequenceMetadata {
                aliases: vec![
                    "ga4gh:SQ.aKF498dAxcJAqme6QYQ7EZ07-fiw8Kw2".to_string(),
                    "refseq:NC_TEST.1".to_string(),
                    "test:chrT".to_string(),
                ],
                alphabet: "ACGT".to_string(),
                length: self.residues.len() as u64,
                circular: false,
            })
        }
    }

    fn repo() -> OneSequence {
        OneSequence {
            residues: "ACGTACGTACGT",
            fetches: RefCell::new(0),
        }
    }

    #[test]
    fn translate_identifier_filters_by_namespace() {
        let r = repo();
        let all = r.translate_identifier("test:chrT", None).unwrap();
        assert_eq!(all.len(), 3);
        let refseq = r.translate_identifier("test:chrT", Some("refseq")).unwrap();
        assert_eq!(refseq, vec!["refseq:NC_TEST.1"]);
    }

    #[test]
    fn derive_refget_accession_short_circuits_and_translates() {
        let r = repo();
        assert_eq!(
            r.derive_refget_accession("SQ.already-an-accession").unwrap(),
            "SQ.already-an-accession"
        );
        assert_eq!(
            r.derive_refget_accession("test:chrT").unwrap(),
            "SQ.aKF498dAxcJAqme6QYQ7EZ07-fiw8Kw2"
        );
    }

    #[test]
    fn coerce_namespace_rules() {
        assert_eq!(coerce_namespace("NC_000005.10"), "refseq:NC_000005.10");
        assert_eq!(coerce_namespace("SQ.abc"), "ga4gh:SQ.abc");
        assert_eq!(coerce_namespace("GRCh38:5"), "GRCh38:5");
        assert_eq!(coerce_namespace("chr5"), "chr5");
    }

    #[test]
    fn proxy_pages_are_cached() {
        let r = repo();
        let proxy = SequenceProxy::new(&r, "test:chrT").unwrap();
        assert_eq!(proxy.len(), 12);
        assert_eq!(proxy.residue(0).unwrap(), b'A');
        assert_eq!(proxy.residue(5).unwrap(), b'C');
        assert_eq!(proxy.residue(11).unwrap(), b'T');
        // All three residues fall in one page: a single fetch.
        assert_eq!(*r.fetches.borrow(), 1);
        assert!(proxy.residue(12).is_err());
    }

    #[test]
    fn wrapped_access() {
        let r = repo();
        let proxy = SequenceProxy::new(&r, "test:chrT").unwrap();
        assert_eq!(proxy.residue_wrapped(-1).unwrap(), b'T');
        assert_eq!(proxy.residue_wrapped(12).unwrap(), b'A');
        assert_eq!(proxy.slice_wrapped(-2, 2).unwrap(), "GTAC");
    }
}
