//! Transcript projection collaborator.

use vrs_core::Result;

use super::ast::HgvsVariant;

/// Projects transcript-relative variants (`c.`, `n.`, `r.`) onto a genomic
/// reference, using a transcript-alignment database.
///
/// This is a collaborator interface: the alignment data and projection
/// mathematics live outside this crate. Translators consult the mapper
/// whenever an HGVS variant is not directly interpretable on the named
/// sequence.
pub trait TranscriptMapper {
    /// Return an equivalent `g.` variant on a genomic accession.
    fn project_to_genome(&self, variant: &HgvsVariant) -> Result<HgvsVariant>;
}
