//! Copy-number translation from HGVS del/dup expressions.

use vrs_core::{
    identify, Coordinate, CopyChange, CopyNumberChange, CopyNumberCount, Result,
    SequenceLocation, SequenceReference, SequenceRepository, Variation, VrsError,
};

use crate::allele::TranslatorConfig;
use crate::hgvs::{parse_hgvs, HgvsEdit, HgvsVariant, TranscriptMapper};

/// Translator from del/dup HGVS expressions to VRS copy-number classes.
pub struct CnvTranslator<'a> {
    repo: &'a dyn SequenceRepository,
    config: TranslatorConfig,
    mapper: Option<&'a dyn TranscriptMapper>,
}

impl<'a> CnvTranslator<'a> {
    pub fn new(repo: &'a dyn SequenceRepository) -> Self {
        Self::with_config(repo, TranslatorConfig::default())
    }

    pub fn with_config(repo: &'a dyn SequenceRepository, config: TranslatorConfig) -> Self {
        CnvTranslator {
            repo,
            config,
            mapper: None,
        }
    }

    pub fn set_transcript_mapper(&mut self, mapper: &'a dyn TranscriptMapper) {
        self.mapper = Some(mapper);
    }

    /// Translate a del/dup expression into a [`CopyNumberCount`] with the
    /// given absolute copy count.
    pub fn from_hgvs_count(&self, expr: &str, copies: Coordinate) -> Result<Variation> {
        let location = self.location_for(expr)?;
        let mut v = Variation::CopyNumberCount(CopyNumberCount::new(location, copies));
        if self.config.identify {
            identify(&mut v)?;
        }
        Ok(v)
    }

    /// Translate a del/dup expression into a [`CopyNumberChange`]. When no
    /// term is given, deletions default to loss (EFO:0030067) and
    /// duplications to gain (EFO:0030070).
    pub fn from_hgvs_change(&self, expr: &str, copy_change: Option<CopyChange>) -> Result<Variation> {
        let (location, is_deletion) = self.location_and_kind_for(expr)?;
        let copy_change = copy_change.unwrap_or(if is_deletion {
            CopyChange::Loss
        } else {
            CopyChange::Gain
        });
        let mut v = Variation::CopyNumberChange(CopyNumberChange::new(location, copy_change));
        if self.config.identify {
            identify(&mut v)?;
        }
        Ok(v)
    }

    fn location_for(&self, expr: &str) -> Result<SequenceLocation> {
        self.location_and_kind_for(expr).map(|(loc, _)| loc)
    }

    fn location_and_kind_for(&self, expr: &str) -> Result<(SequenceLocation, bool)> {
        let parsed = parse_hgvs(expr)?;
        let projected;
        let variant: &HgvsVariant = if parsed.kind.is_sequence_direct() {
            &parsed
        } else {
            let mapper = self.mapper.ok_or_else(|| {
                VrsError::InvalidInput(format!(
                    "{} is a {}-relative expression; a transcript mapper collaborator is required",
                    parsed.accession,
                    parsed.kind.code()
                ))
            })?;
            projected = mapper.project_to_genome(&parsed)?;
            &projected
        };

        let is_deletion = match &variant.edit {
            HgvsEdit::Deletion { .. } => true,
            HgvsEdit::Duplication { .. } => false,
            other => {
                return Err(VrsError::InvalidInput(format!(
                    "copy-number translation needs a del or dup expression, got {other:?}"
                )))
            }
        };

        let accession = self.repo.derive_refget_accession(&variant.accession)?;
        let location = SequenceLocation::new(
            SequenceReference::new(accession),
            variant.interval.start - 1,
            variant.interval.end,
        );
        Ok((location, is_deletion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vrs_dataproxy::MemoryRepository;

    fn repo() -> MemoryRepository {
        let mut repo = MemoryRepository::new();
        // Digests are irrelevant here; only the alias graph is consulted.
        repo.add_sequence_window("SQ.eK4D2MosgK_ivBkgi6FVPg5UXs1bYESm", 107043718, 0, b"");
        repo.add_alias(
            "refseq",
            "NC_000014.9",
            "SQ.eK4D2MosgK_ivBkgi6FVPg5UXs1bYESm",
        );
        repo
    }

    #[test]
    fn deletion_defaults_to_loss() {
        let repo = repo();
        let tlr = CnvTranslator::new(&repo);
        let v = tlr
            .from_hgvs_change("NC_000014.9:g.45002867_45015056del", None)
            .unwrap();
        assert_eq!(v.id(), Some("ga4gh:CX.XQt04FoCIptvgp6GtE2qjEaUJC7cr1wo"));
        let Variation::CopyNumberChange(cnx) = &v else { panic!("expected CopyNumberChange") };
        assert_eq!(cnx.copy_change, CopyChange::Loss);
        let loc = cnx.location.as_inlined().unwrap();
        assert_eq!(loc.start.value(), Some(45002866));
        assert_eq!(loc.end.value(), Some(45015056));
    }

    #[test]
    fn duplication_defaults_to_gain() {
        let repo = repo();
        let tlr = CnvTranslator::new(&repo);
        let v = tlr
            .from_hgvs_change("NC_000014.9:g.45002867_45015056dup", None)
            .unwrap();
        let Variation::CopyNumberChange(cnx) = &v else { panic!("expected CopyNumberChange") };
        assert_eq!(cnx.copy_change, CopyChange::Gain);
    }

    #[test]
    fn explicit_term_and_copies() {
        let repo = repo();
        let tlr = CnvTranslator::new(&repo);

        let v = tlr
            .from_hgvs_change(
                "NC_000014.9:g.45002867_45015056del",
                Some(CopyChange::HighLevelLoss),
            )
            .unwrap();
        let Variation::CopyNumberChange(cnx) = &v else { panic!("expected CopyNumberChange") };
        assert_eq!(cnx.copy_change, CopyChange::HighLevelLoss);

        let v = tlr
            .from_hgvs_count("NC_000014.9:g.45002867_45015056dup", Coordinate::Range(3, 5))
            .unwrap();
        let Variation::CopyNumberCount(cnc) = &v else { panic!("expected CopyNumberCount") };
        assert_eq!(cnc.copies, Coordinate::Range(3, 5));
        assert!(cnc.id.as_deref().unwrap().starts_with("ga4gh:CN."));
    }

    #[test]
    fn non_cnv_edits_are_rejected() {
        let repo = repo();
        let tlr = CnvTranslator::new(&repo);
        assert!(matches!(
            tlr.from_hgvs_change("NC_000014.9:g.45002867C>T", None),
            Err(VrsError::InvalidInput(_))
        ));
    }
}
