//! Allele translation between VRS and the external grammars.
//!
//! Every `from_*` path runs the same pipeline: parse, resolve the
//! reference accession through the repository, move to interbase
//! coordinates, optionally validate the stated reference, build a raw
//! allele, normalize, and assign identifiers bottom-up.

use vrs_core::{
    identify, normalize_allele_with, Allele, LocationRef, NormalizeOptions, SequenceExpression,
    SequenceLocation, SequenceReference, SequenceRepository, Result, Variation, VrsError,
};

use crate::beacon::BeaconExpression;
use crate::gnomad::GnomadExpression;
use crate::hgvs::{
    format_hgvs, parse_hgvs, CoordinateKind, HgvsEdit, HgvsInterval, HgvsVariant, TranscriptMapper,
};
use crate::spdi::SpdiExpression;

/// The supported external grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionFormat {
    Hgvs,
    Spdi,
    Gnomad,
    Beacon,
}

impl ExpressionFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpressionFormat::Hgvs => "hgvs",
            ExpressionFormat::Spdi => "spdi",
            ExpressionFormat::Gnomad => "gnomad",
            ExpressionFormat::Beacon => "beacon",
        }
    }
}

impl std::str::FromStr for ExpressionFormat {
    type Err = VrsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hgvs" => Ok(ExpressionFormat::Hgvs),
            "spdi" => Ok(ExpressionFormat::Spdi),
            "gnomad" | "vcf" => Ok(ExpressionFormat::Gnomad),
            "beacon" => Ok(ExpressionFormat::Beacon),
            other => Err(VrsError::InvalidInput(format!(
                "unknown expression format {other:?}"
            ))),
        }
    }
}

impl std::fmt::Display for ExpressionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared translator settings.
#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    /// Assembly used to resolve bare chromosome names (gnomAD, Beacon).
    pub default_assembly: String,
    /// Run fully-justified normalization on built alleles.
    pub normalize: bool,
    /// Assign computed identifiers bottom-up on built objects.
    pub identify: bool,
    /// Fail (rather than warn) when a stated reference disagrees with the
    /// repository.
    pub require_validation: bool,
    /// Forwarded to the normalizer's RLE convenience-sequence limit.
    pub rle_seq_limit: Option<usize>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        TranslatorConfig {
            default_assembly: "GRCh38".to_string(),
            normalize: true,
            identify: true,
            require_validation: true,
            rle_seq_limit: Some(50),
        }
    }
}

/// Translator between VRS Alleles and external variant grammars.
pub struct AlleleTranslator<'a> {
    repo: &'a dyn SequenceRepository,
    config: TranslatorConfig,
    mapper: Option<&'a dyn TranscriptMapper>,
}

impl<'a> AlleleTranslator<'a> {
    pub fn new(repo: &'a dyn SequenceRepository) -> Self {
        Self::with_config(repo, TranslatorConfig::default())
    }

    pub fn with_config(repo: &'a dyn SequenceRepository, config: TranslatorConfig) -> Self {
        AlleleTranslator {
            repo,
            config,
            mapper: None,
        }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Attach the collaborator that projects `c.`/`n.`/`r.` variants onto
    /// genomic sequences.
    pub fn set_transcript_mapper(&mut self, mapper: &'a dyn TranscriptMapper) {
        self.mapper = Some(mapper);
    }

    /// Translate an external expression of a known format into an Allele.
    pub fn translate_from(&self, expr: &str, fmt: ExpressionFormat) -> Result<Allele> {
        match fmt {
            ExpressionFormat::Hgvs => self.from_hgvs(expr),
            ExpressionFormat::Spdi => self.from_spdi(expr),
            ExpressionFormat::Gnomad => self.from_gnomad(expr, None),
            ExpressionFormat::Beacon => self.from_beacon(expr, None),
        }
    }

    /// Translate an expression by trying each known grammar in turn.
    pub fn translate_from_any(&self, expr: &str) -> Result<Allele> {
        for fmt in [
            ExpressionFormat::Spdi,
            ExpressionFormat::Hgvs,
            ExpressionFormat::Beacon,
            ExpressionFormat::Gnomad,
        ] {
            match self.translate_from(expr, fmt) {
                Ok(allele) => return Ok(allele),
                Err(e) => log::debug!("{expr:?} did not parse as {fmt}: {e}"),
            }
        }
        Err(VrsError::InvalidInput(format!(
            "{expr:?} does not match any supported grammar"
        )))
    }

    /// Render an Allele in the target grammar. HGVS yields one expression
    /// per matching alias; SPDI yields exactly one.
    pub fn translate_to(&self, allele: &Allele, fmt: ExpressionFormat) -> Result<Vec<String>> {
        match fmt {
            ExpressionFormat::Hgvs => self.to_hgvs(allele, None),
            ExpressionFormat::Spdi => {
                let mut all = self.to_spdi(allele, None)?;
                all.truncate(1);
                Ok(all)
            }
            other => Err(VrsError::Unrepresentable(format!(
                "{other} is an input-only format"
            ))),
        }
    }

    pub fn from_spdi(&self, expr: &str) -> Result<Allele> {
        let spdi = SpdiExpression::parse(expr)?;
        let accession = self.repo.derive_refget_accession(&spdi.sequence)?;
        self.build_allele(
            &accession,
            spdi.position,
            spdi.end(),
            &spdi.insertion,
            spdi.deletion.sequence(),
        )
    }

    pub fn from_gnomad(&self, expr: &str, assembly: Option<&str>) -> Result<Allele> {
        let g = GnomadExpression::parse(expr)?;
        let assembly = assembly.unwrap_or(&self.config.default_assembly);
        let accession = self
            .repo
            .derive_refget_accession(&format!("{assembly}:{}", g.chromosome))?;
        self.build_allele(&accession, g.start(), g.end(), &g.alternate, Some(&g.reference))
    }

    pub fn from_beacon(&self, expr: &str, assembly: Option<&str>) -> Result<Allele> {
        let b = BeaconExpression::parse(expr)?;
        let assembly = assembly.unwrap_or(&self.config.default_assembly);
        let accession = self
            .repo
            .derive_refget_accession(&format!("{assembly}:{}", b.chromosome))?;
        self.build_allele(&accession, b.start(), b.end(), &b.alternate, Some(&b.reference))
    }

    pub fn from_hgvs(&self, expr: &str) -> Result<Allele> {
        let variant = parse_hgvs(expr)?;
        self.from_hgvs_variant(&variant)
    }

    /// Translate a parsed HGVS variant (e.g. from an external grammar
    /// implementation) into an Allele.
    pub fn from_hgvs_variant(&self, variant: &HgvsVariant) -> Result<Allele> {
        let projected;
        let variant = if variant.kind.is_sequence_direct() {
            variant
        } else {
            let mapper = self.mapper.ok_or_else(|| {
                VrsError::InvalidInput(format!(
                    "{} is a {}-relative expression; a transcript mapper collaborator is required",
                    variant.accession,
                    variant.kind.code()
                ))
            })?;
            projected = mapper.project_to_genome(variant)?;
            &projected
        };

        let accession = self.repo.derive_refget_accession(&variant.accession)?;
        let iv = variant.interval;
        let (start, end, alternate, stated) = match &variant.edit {
            HgvsEdit::Substitution { reference, alternate } => (
                iv.start - 1,
                iv.end,
                alternate.clone(),
                Some(reference.clone()),
            ),
            HgvsEdit::Deletion { reference } => {
                (iv.start - 1, iv.end, String::new(), reference.clone())
            }
            HgvsEdit::Insertion { sequence } => (iv.start, iv.start, sequence.clone(), None),
            HgvsEdit::Delins { sequence } => (iv.start - 1, iv.end, sequence.clone(), None),
            HgvsEdit::Duplication { reference } => {
                let span = self.fetch(&accession, iv.start - 1, iv.end)?;
                (
                    iv.start - 1,
                    iv.end,
                    span.repeat(2),
                    reference.clone().or(Some(span)),
                )
            }
            HgvsEdit::Identity { reference } => {
                let span = self.fetch(&accession, iv.start - 1, iv.end)?;
                (iv.start - 1, iv.end, span.clone(), reference.clone().or(Some(span)))
            }
        };
        self.build_allele(&accession, start, end, &alternate, stated.as_deref())
    }

    /// Render an Allele as SPDI, one expression per alias in `namespace`
    /// (default `refseq`).
    pub fn to_spdi(&self, allele: &Allele, namespace: Option<&str>) -> Result<Vec<String>> {
        let (loc, start, end) = definite_location(allele)?;
        let alternate = self.concrete_state(loc, &allele.state, start, end)?;
        let aliases = self.aliases(loc, namespace.unwrap_or("refseq"))?;
        let tail = format!(":{start}:{}:{alternate}", end - start);
        Ok(aliases.into_iter().map(|a| format!("{a}{tail}")).collect())
    }

    /// Render an Allele as HGVS, one expression per alias in `namespace`
    /// (default `refseq`).
    pub fn to_hgvs(&self, allele: &Allele, namespace: Option<&str>) -> Result<Vec<String>> {
        let (loc, start, end) = definite_location(allele)?;
        let accession = loc.refget_accession();
        let reference = self.fetch(accession, start, end)?;
        let alternate = self.concrete_state(loc, &allele.state, start, end)?;

        let kind = self.coordinate_kind(loc)?;
        let (interval, edit) = classify(self, accession, start, end, &reference, &alternate)?;

        let aliases = self.aliases(loc, namespace.unwrap_or("refseq"))?;
        Ok(aliases
            .into_iter()
            .map(|alias| {
                format_hgvs(&HgvsVariant {
                    accession: alias,
                    kind,
                    interval,
                    edit: edit.clone(),
                })
            })
            .collect())
    }

    fn aliases(&self, loc: &SequenceLocation, namespace: &str) -> Result<Vec<String>> {
        let aliases = self.repo.translate_identifier(
            &format!("ga4gh:{}", loc.refget_accession()),
            Some(namespace),
        )?;
        if aliases.is_empty() {
            return Err(VrsError::Unrepresentable(format!(
                "{} has no alias in namespace {namespace:?}",
                loc.refget_accession()
            )));
        }
        Ok(aliases
            .into_iter()
            .map(|a| a[namespace.len() + 1..].to_string())
            .collect())
    }

    /// Infer the coordinate-system letter from the reference's alphabet.
    fn coordinate_kind(&self, loc: &SequenceLocation) -> Result<CoordinateKind> {
        let md = self
            .repo
            .get_metadata(&format!("ga4gh:{}", loc.refget_accession()))?;
        let is_na = !md.alphabet.is_empty()
            && md
                .alphabet
                .bytes()
                .all(|b| vrs_core::ResidueAlphabet::Na.contains(b));
        Ok(if is_na {
            CoordinateKind::Genomic
        } else {
            CoordinateKind::Protein
        })
    }

    /// The literal sequence expressed by a state, expanding RLE states
    /// through the repository.
    fn concrete_state(
        &self,
        loc: &SequenceLocation,
        state: &SequenceExpression,
        start: u64,
        end: u64,
    ) -> Result<String> {
        match state {
            SequenceExpression::Literal(lse) => Ok(lse.sequence.clone()),
            SequenceExpression::ReferenceLength(rle) => {
                if let Some(seq) = &rle.sequence {
                    return Ok(seq.clone());
                }
                let unit_len = rle.repeat_subunit_length;
                if unit_len == 0 || unit_len > end - start {
                    return Err(VrsError::Unrepresentable(format!(
                        "ReferenceLengthExpression with repeat subunit {unit_len} cannot be \
                         decompressed from a span of {}",
                        end - start
                    )));
                }
                let unit = self.fetch(loc.refget_accession(), start, start + unit_len)?;
                let mut out = String::with_capacity(rle.length as usize);
                while (out.len() as u64) < rle.length {
                    let take = ((rle.length as usize) - out.len()).min(unit.len());
                    out.push_str(&unit[..take]);
                }
                Ok(out)
            }
            SequenceExpression::Length(_) => Err(VrsError::Unrepresentable(
                "a LengthExpression state has no concrete sequence".to_string(),
            )),
        }
    }

    fn fetch(&self, accession: &str, start: u64, end: u64) -> Result<String> {
        self.repo
            .get_sequence(&format!("ga4gh:{accession}"), Some(start), Some(end))
    }

    /// Common back half of every `from_*` pipeline.
    fn build_allele(
        &self,
        refget_accession: &str,
        start: u64,
        end: u64,
        alternate: &str,
        stated_reference: Option<&str>,
    ) -> Result<Allele> {
        if let Some(stated) = stated_reference {
            if !stated.is_empty() {
                let actual = self.fetch(refget_accession, start, end)?;
                if actual != stated {
                    if self.config.require_validation {
                        return Err(VrsError::ReferenceMismatch {
                            accession: refget_accession.to_string(),
                            start,
                            end,
                            expected: stated.to_string(),
                            actual,
                        });
                    }
                    log::warn!(
                        "stated reference {stated:?} differs from {refget_accession}:{start}-{end} ({actual:?})"
                    );
                }
            }
        }

        let location = SequenceLocation::new(SequenceReference::new(refget_accession), start, end);
        let mut allele = Allele::new(location, SequenceExpression::literal(alternate));

        if self.config.normalize {
            let options = NormalizeOptions {
                rle_seq_limit: self.config.rle_seq_limit,
            };
            allele = normalize_allele_with(&allele, self.repo, &options)?;
        }
        if self.config.identify {
            let mut v = Variation::Allele(allele);
            identify(&mut v)?;
            let Variation::Allele(identified) = v else { unreachable!() };
            allele = identified;
        }
        Ok(allele)
    }
}

fn definite_location(allele: &Allele) -> Result<(&SequenceLocation, u64, u64)> {
    let loc = match &allele.location {
        LocationRef::Inlined(loc) => loc,
        LocationRef::Referenced(id) => {
            return Err(VrsError::InvalidInput(format!(
                "allele location is a reference ({id}); deref it first"
            )))
        }
    };
    match (loc.start.value(), loc.end.value()) {
        (Some(start), Some(end)) => Ok((loc, start, end)),
        _ => Err(VrsError::Unrepresentable(
            "range-valued coordinates cannot be expressed in this grammar".to_string(),
        )),
    }
}

/// Choose the HGVS edit for a normalized (ref, alt) pair.
fn classify(
    translator: &AlleleTranslator<'_>,
    accession: &str,
    start: u64,
    end: u64,
    reference: &str,
    alternate: &str,
) -> Result<(HgvsInterval, HgvsEdit)> {
    if reference == alternate {
        return Ok((
            HgvsInterval::span(start + 1, end),
            HgvsEdit::Identity {
                reference: Some(reference.to_string()),
            },
        ));
    }
    if reference.len() == 1 && alternate.len() == 1 {
        return Ok((
            HgvsInterval::point(start + 1),
            HgvsEdit::Substitution {
                reference: reference.to_string(),
                alternate: alternate.to_string(),
            },
        ));
    }
    if alternate.is_empty() {
        return Ok((
            HgvsInterval::span(start + 1, end),
            HgvsEdit::Deletion {
                reference: Some(reference.to_string()),
            },
        ));
    }
    if reference.is_empty() {
        // A pure insertion duplicates when it restates the immediately
        // preceding reference segment.
        let ins_len = alternate.len() as u64;
        if start >= ins_len
            && translator.fetch(accession, start - ins_len, start)? == alternate
        {
            return Ok((
                HgvsInterval::span(start - ins_len + 1, start),
                HgvsEdit::Duplication {
                    reference: Some(alternate.to_string()),
                },
            ));
        }
        if start == 0 {
            return Err(VrsError::Unrepresentable(
                "an insertion before the first residue has no HGVS form".to_string(),
            ));
        }
        return Ok((
            HgvsInterval::span(start, start + 1),
            HgvsEdit::Insertion {
                sequence: alternate.to_string(),
            },
        ));
    }
    if alternate.starts_with(reference) {
        // Fully-justified insertions arrive as ref + inserted tail.
        let ins = &alternate[reference.len()..];
        if reference.ends_with(ins) {
            let ins_len = ins.len() as u64;
            return Ok((
                HgvsInterval::span(end - ins_len + 1, end),
                HgvsEdit::Duplication {
                    reference: Some(ins.to_string()),
                },
            ));
        }
        return Ok((
            HgvsInterval::span(end, end + 1),
            HgvsEdit::Insertion {
                sequence: ins.to_string(),
            },
        ));
    }
    if reference.starts_with(alternate) {
        // Fully-justified deletions arrive as a kept head plus deleted tail.
        let kept = alternate.len() as u64;
        let deleted = &reference[alternate.len()..];
        return Ok((
            HgvsInterval::span(start + kept + 1, end),
            HgvsEdit::Deletion {
                reference: Some(deleted.to_string()),
            },
        ));
    }
    Ok((
        HgvsInterval::span(start + 1, end),
        HgvsEdit::Delins {
            sequence: alternate.to_string(),
        },
    ))
}
