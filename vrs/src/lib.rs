//! # vrs: *<small>GA4GH Variation Representation Specification in Rust</small>*
//!
//! `vrs` re-exports the workspace crates behind feature gates: the object
//! model and identifier algebra (`core`), sequence repository backends
//! (`dataproxy`), and the grammar translators plus VCF annotation engine
//! (`translate`).
//!
//! ```no_run
//! use vrs::dataproxy::MemoryRepository;
//! use vrs::translate::AlleleTranslator;
//!
//! let mut repo = MemoryRepository::new();
//! repo.import_fasta("genome.fa", "GRCh38").unwrap();
//! let tlr = AlleleTranslator::new(&repo);
//! let allele = tlr.from_spdi("NC_000005.10:80656488:C:T").unwrap();
//! println!("{}", allele.id.unwrap());
//! ```

#[cfg(feature = "core")]
#[doc(inline)]
pub use vrs_core as core;

#[cfg(feature = "dataproxy")]
#[doc(inline)]
pub use vrs_dataproxy as dataproxy;

#[cfg(feature = "translate")]
#[doc(inline)]
pub use vrs_translate as translate;
