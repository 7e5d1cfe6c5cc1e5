//! Namespaced alias table for sequence accessions.
//!
//! Maps `namespace/alias` pairs to bare refget digests, with forward and
//! reverse lookup and TSV persistence (`alias\tdigest` per line, `#`
//! comments allowed).

use std::collections::HashMap;
use std::fs::{self, create_dir_all, File};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// namespace -> { alias -> digest }
#[derive(Debug, Default, Clone)]
pub struct AliasTable {
    namespaces: HashMap<String, HashMap<String, String>>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Register `namespace:alias` for a bare digest.
    pub fn add(&mut self, namespace: &str, alias: &str, digest: &str) {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(alias.to_string(), digest.to_string());
    }

    /// Forward lookup within one namespace.
    pub fn resolve(&self, namespace: &str, alias: &str) -> Option<&str> {
        self.namespaces
            .get(namespace)?
            .get(alias)
            .map(String::as_str)
    }

    /// Forward lookup across every namespace; first match wins in
    /// namespace-sorted order.
    pub fn resolve_any(&self, alias: &str) -> Option<&str> {
        let mut namespaces: Vec<&String> = self.namespaces.keys().collect();
        namespaces.sort();
        namespaces
            .into_iter()
            .find_map(|ns| self.namespaces[ns].get(alias).map(String::as_str))
    }

    /// All `(namespace, alias)` pairs pointing at a digest.
    pub fn reverse_lookup(&self, digest: &str) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for (namespace, aliases) in &self.namespaces {
            for (alias, d) in aliases {
                if d == digest {
                    out.push((namespace.clone(), alias.clone()));
                }
            }
        }
        out.sort();
        out
    }

    pub fn namespaces(&self) -> Vec<String> {
        let mut out: Vec<String> = self.namespaces.keys().cloned().collect();
        out.sort();
        out
    }

    /// Load one namespace's aliases from a TSV file; returns the number of
    /// entries read.
    pub fn load_tsv(&mut self, namespace: &str, path: &Path) -> Result<usize> {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let mut count = 0;
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            if let Some((alias, digest)) = line.split_once('\t') {
                self.add(namespace, alias, digest.trim_end());
                count += 1;
            }
        }
        Ok(count)
    }

    /// Load every `<namespace>.tsv` in a directory. Missing directories are
    /// fine (an empty table).
    pub fn load_dir(&mut self, dir: &Path) -> Result<()> {
        if !dir.exists() {
            return Ok(());
        }
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("tsv") {
                let namespace = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .context("alias file has a non-UTF-8 name")?
                    .to_string();
                self.load_tsv(&namespace, &path)?;
            }
        }
        Ok(())
    }

    /// Write every namespace to `<dir>/<namespace>.tsv`.
    pub fn save_dir(&self, dir: &Path) -> Result<()> {
        if self.namespaces.is_empty() {
            return Ok(());
        }
        create_dir_all(dir)?;
        for (namespace, aliases) in &self.namespaces {
            let mut file = File::create(dir.join(format!("{namespace}.tsv")))?;
            let mut entries: Vec<(&String, &String)> = aliases.iter().collect();
            entries.sort();
            for (alias, digest) in entries {
                writeln!(file, "{alias}\t{digest}")?;
            }
        }
        Ok(())
    }
}

/// Resolve any accepted identifier shape to a bare digest: `ga4gh:SQ....`
/// and `refget:SQ....` carry the digest directly, `namespace:alias` goes
/// through the table, and bare names are searched across namespaces.
pub fn resolve_identifier(table: &AliasTable, identifier: &str) -> Option<String> {
    let coerced = vrs_core::coerce_namespace(identifier);
    if let Some((namespace, alias)) = coerced.split_once(':') {
        if matches!(namespace, "ga4gh" | "refget") {
            return alias.strip_prefix("SQ.").map(str::to_string);
        }
        return table.resolve(namespace, alias).map(str::to_string);
    }
    table.resolve_any(&coerced).map(str::to_string)
}
