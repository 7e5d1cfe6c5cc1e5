//! # Variant grammar translators
//!
//! Conversion between GA4GH VRS objects and external variant nomenclatures:
//!
//! | format | from | to |
//! |--------|------|----|
//! | HGVS   | yes  | yes |
//! | SPDI   | yes  | yes |
//! | gnomAD (`chr-pos-ref-alt`) | yes | no |
//! | Beacon (`chr : pos ref > alt`) | yes | no |
//!
//! `translate_from` runs the common pipeline: parse, resolve the reference
//! through the sequence repository, validate, build a raw Allele,
//! normalize, and assign identifiers bottom-up. The [`vcf`] module drives
//! the same pipeline over whole VCF files.

pub mod allele;
pub mod beacon;
pub mod cnv;
pub mod gnomad;
pub mod hgvs;
pub mod spdi;
pub mod vcf;

pub use allele::{AlleleTranslator, ExpressionFormat, TranslatorConfig};
pub use cnv::CnvTranslator;
pub use hgvs::{parse_hgvs, CoordinateKind, HgvsEdit, HgvsInterval, HgvsVariant, TranscriptMapper};
pub use spdi::SpdiExpression;
pub use vcf::{VcfAnnotator, VcfAnnotatorConfig, VcfStats};
