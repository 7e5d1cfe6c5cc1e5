//! In-memory sequence repository.
//!
//! Sequences are keyed by their sha512t24u refget digest; human-facing
//! names live in a namespaced [`AliasTable`]. A record may hold the full
//! sequence or just a window of it, which lets tests carry fixture slices
//! of real reference sequences under their real accessions.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use seq_io::fasta::{Reader, Record};

use vrs_core::{sha512t24u, Result, SequenceMetadata, SequenceRepository, VrsError};

use crate::alias::AliasTable;

#[derive(Debug, Clone)]
pub(crate) struct SequenceRecord {
    pub(crate) residues: Vec<u8>,
    /// Offset of `residues` within the full sequence; non-zero only for
    /// windowed records.
    pub(crate) window_offset: u64,
    /// Full sequence length, which may exceed `residues.len()`.
    pub(crate) length: u64,
    pub(crate) alphabet: String,
    pub(crate) circular: bool,
}

/// HashMap-backed [`SequenceRepository`].
#[derive(Debug, Default)]
pub struct MemoryRepository {
    pub(crate) records: HashMap<String, SequenceRecord>,
    pub(crate) aliases: AliasTable,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a full sequence; returns its `SQ....` refget accession.
    pub fn add_sequence(&mut self, residues: &[u8]) -> String {
        let mut residues = residues.to_vec();
        residues.make_ascii_uppercase();
        let digest = sha512t24u(&residues);
        let record = SequenceRecord {
            window_offset: 0,
            length: residues.len() as u64,
            alphabet: observed_alphabet(&residues),
            circular: false,
            residues,
        };
        self.records.insert(digest.clone(), record);
        format!("SQ.{digest}")
    }

    /// Store a full sequence and register `namespace:alias` for it.
    pub fn add_named_sequence(&mut self, namespace: &str, alias: &str, residues: &[u8]) -> String {
        let accession = self.add_sequence(residues);
        self.add_alias(namespace, alias, &accession);
        accession
    }

    /// Store a window `[offset, offset + residues.len())` of a sequence
    /// whose accession and full length are known.
    pub fn add_sequence_window(
        &mut self,
        accession: &str,
        length: u64,
        offset: u64,
        residues: &[u8],
    ) {
        let mut residues = residues.to_vec();
        residues.make_ascii_uppercase();
        self.records.insert(
            bare_digest(accession).to_string(),
            SequenceRecord {
                window_offset: offset,
                length,
                alphabet: observed_alphabet(&residues),
                circular: false,
                residues,
            },
        );
    }

    /// Register `namespace:alias` for an existing accession or bare digest.
    pub fn add_alias(&mut self, namespace: &str, alias: &str, accession: &str) {
        self.aliases.add(namespace, alias, bare_digest(accession));
    }

    /// Flag a sequence as circular.
    pub fn mark_circular(&mut self, accession: &str) -> Result<()> {
        let digest = bare_digest(accession);
        let record = self
            .records
            .get_mut(digest)
            .ok_or_else(|| VrsError::UnknownReference(accession.to_string()))?;
        record.circular = true;
        Ok(())
    }

    /// Import every record of a FASTA file (plain or gzipped), registering
    /// each record name in `namespace`. Returns `(name, accession)` pairs.
    pub fn import_fasta(
        &mut self,
        path: impl AsRef<Path>,
        namespace: &str,
    ) -> anyhow::Result<Vec<(String, String)>> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader: Box<dyn Read> = if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == "gz" || e == "bgz")
        {
            Box::new(MultiGzDecoder::new(file))
        } else {
            Box::new(file)
        };
        let mut fasta_reader = Reader::new(BufReader::new(reader));

        let mut imported = Vec::new();
        while let Some(record) = fasta_reader.next() {
            let record = record?;
            let name = std::str::from_utf8(record.head())?
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string();
            let mut residues = Vec::new();
            for line in record.seq_lines() {
                residues.extend_from_slice(line);
            }
            let accession = self.add_named_sequence(namespace, &name, &residues);
            log::debug!("imported {name} ({} bp) as {accession}", residues.len());
            imported.push((name, accession));
        }
        Ok(imported)
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    fn resolve(&self, identifier: &str) -> Result<&SequenceRecord> {
        let digest = self.resolve_digest(identifier)?;
        self.records
            .get(&digest)
            .ok_or_else(|| VrsError::UnknownReference(identifier.to_string()))
    }

    fn resolve_digest(&self, identifier: &str) -> Result<String> {
        crate::alias::resolve_identifier(&self.aliases, identifier)
            .ok_or_else(|| VrsError::UnknownReference(identifier.to_string()))
    }
}

impl SequenceRepository for MemoryRepository {
    fn get_sequence(
        &self,
        identifier: &str,
        start: Option<u64>,
        end: Option<u64>,
    ) -> Result<String> {
        let record = self.resolve(identifier)?;
        let start = start.unwrap_or(0);
        let end = end.unwrap_or(record.length);
        if start > end || end > record.length {
            return Err(VrsError::InvalidInput(format!(
                "interval [{start}, {end}) is not within {identifier} (length {})",
                record.length
            )));
        }
        let window_end = record.window_offset + record.residues.len() as u64;
        if start < record.window_offset || end > window_end {
            return Err(VrsError::InvalidInput(format!(
                "interval [{start}, {end}) is outside the stored window [{}, {window_end}) of {identifier}",
                record.window_offset
            )));
        }
        let lo = (start - record.window_offset) as usize;
        let hi = (end - record.window_offset) as usize;
        Ok(String::from_utf8_lossy(&record.residues[lo..hi]).into_owned())
    }

    fn get_metadata(&self, identifier: &str) -> Result<SequenceMetadata> {
        let digest = self.resolve_digest(identifier)?;
        let record = self
            .records
            .get(&digest)
            .ok_or_else(|| VrsError::UnknownReference(identifier.to_string()))?;
        let mut aliases = vec![format!("ga4gh:SQ.{digest}"), format!("refget:SQ.{digest}")];
        for (namespace, alias) in self.aliases.reverse_lookup(&digest) {
            aliases.push(format!("{namespace}:{alias}"));
        }
        aliases.sort();
        Ok(SequenceMetadata {
            aliases,
            alphabet: record.alphabet.clone(),
            length: record.length,
            circular: record.circular,
        })
    }
}

/// Strip an optional `SQ.` prefix, leaving the bare digest.
fn bare_digest(accession: &str) -> &str {
    accession.strip_prefix("SQ.").unwrap_or(accession)
}

fn observed_alphabet(residues: &[u8]) -> String {
    let mut seen = [false; 256];
    for &b in residues {
        seen[b as usize] = true;
    }
    (0u8..=255)
        .filter(|&b| seen[b as usize])
        .map(|b| b as char)
        .collect()
}
