//! Disk-backed sequence repository.
//!
//! Layout under the root directory:
//!
//! ```text
//! sequences.tsv            digest <TAB> length <TAB> alphabet <TAB> circular
//! sequences/<digest>.seq   raw residues
//! aliases/<namespace>.tsv  alias <TAB> digest
//! ```
//!
//! Metadata is held in memory after `open`; residue bytes are read from
//! disk per request (seek + bounded read), never cached process-wide.

use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

use vrs_core::{Result, SequenceMetadata, SequenceRepository, VrsError};

use crate::alias::{resolve_identifier, AliasTable};
use crate::memory::MemoryRepository;

const INDEX_FILE: &str = "sequences.tsv";
const SEQUENCES_DIR: &str = "sequences";
const ALIASES_DIR: &str = "aliases";

#[derive(Debug, Clone)]
struct IndexEntry {
    length: u64,
    alphabet: String,
    circular: bool,
}

/// Lazy directory-backed [`SequenceRepository`].
#[derive(Debug)]
pub struct DirRepository {
    root: PathBuf,
    index: HashMap<String, IndexEntry>,
    aliases: AliasTable,
}

impl DirRepository {
    /// Load the metadata index and alias tables from `root`.
    pub fn open(root: impl AsRef<Path>) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let index_path = root.join(INDEX_FILE);
        let file = File::open(&index_path)
            .with_context(|| format!("failed to open {}", index_path.display()))?;

        let mut index = HashMap::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 4 {
                bail!("malformed index line in {}: {line:?}", index_path.display());
            }
            index.insert(
                fields[0].to_string(),
                IndexEntry {
                    length: fields[1].parse().context("bad length field")?,
                    alphabet: fields[2].to_string(),
                    circular: fields[3] == "1",
                },
            );
        }

        let mut aliases = AliasTable::new();
        aliases.load_dir(&root.join(ALIASES_DIR))?;
        log::info!(
            "opened sequence repository at {} ({} sequences)",
            root.display(),
            index.len()
        );
        Ok(DirRepository { root, index, aliases })
    }

    /// Write a [`MemoryRepository`]'s full records into the on-disk layout.
    /// Windowed records cannot be persisted and are rejected.
    pub fn save(root: impl AsRef<Path>, repo: &MemoryRepository) -> anyhow::Result<()> {
        let root = root.as_ref();
        let seq_dir = root.join(SEQUENCES_DIR);
        create_dir_all(&seq_dir)?;

        let mut digests: Vec<&String> = repo.records.keys().collect();
        digests.sort();

        let mut index = File::create(root.join(INDEX_FILE))?;
        for digest in digests {
            let record = &repo.records[digest];
            if record.window_offset != 0 || record.residues.len() as u64 != record.length {
                bail!("sequence {digest} is a window; only full sequences can be persisted");
            }
            std::fs::write(seq_dir.join(format!("{digest}.seq")), &record.residues)?;
            writeln!(
                index,
                "{digest}\t{}\t{}\t{}",
                record.length,
                record.alphabet,
                if record.circular { "1" } else { "0" }
            )?;
        }
        repo.aliases.save_dir(&root.join(ALIASES_DIR))?;
        Ok(())
    }

    fn entry(&self, identifier: &str) -> Result<(String, &IndexEntry)> {
        let digest = resolve_identifier(&self.aliases, identifier)
            .ok_or_else(|| VrsError::UnknownReference(identifier.to_string()))?;
        let entry = self
            .index
            .get(&digest)
            .ok_or_else(|| VrsError::UnknownReference(identifier.to_string()))?;
        Ok((digest, entry))
    }
}

impl SequenceRepository for DirRepository {
    fn get_sequence(
        &self,
        identifier: &str,
        start: Option<u64>,
        end: Option<u64>,
    ) -> Result<String> {
        let (digest, entry) = self.entry(identifier)?;
        let start = start.unwrap_or(0);
        let end = end.unwrap_or(entry.length);
        if start > end || end > entry.length {
            return Err(VrsError::InvalidInput(format!(
                "interval [{start}, {end}) is not within {identifier} (length {})",
                entry.length
            )));
        }

        let path = self.root.join(SEQUENCES_DIR).join(format!("{digest}.seq"));
        let mut file = File::open(&path).map_err(|e| {
            VrsError::BackendUnavailable(format!("cannot open {}: {e}", path.display()))
        })?;
        file.seek(SeekFrom::Start(start))?;
        let mut buf = vec![0u8; (end - start) as usize];
        file.read_exact(&mut buf).map_err(|e| {
            VrsError::BackendUnavailable(format!("short read from {}: {e}", path.display()))
        })?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn get_metadata(&self, identifier: &str) -> Result<SequenceMetadata> {
        let (digest, entry) = self.entry(identifier)?;
        let mut aliases = vec![format!("ga4gh:SQ.{digest}"), format!("refget:SQ.{digest}")];
        for (namespace, alias) in self.aliases.reverse_lookup(&digest) {
            aliases.push(format!("{namespace}:{alias}"));
        }
        aliases.sort();
        Ok(SequenceMetadata {
            aliases,
            alphabet: entry.alphabet.clone(),
            length: entry.length,
            circular: entry.circular,
        })
    }
}
