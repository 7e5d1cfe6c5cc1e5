//! # GA4GH VRS core
//!
//! Data model and computation pipeline for the GA4GH Variation
//! Representation Specification (VRS). This crate provides:
//!
//! - VRS data models (Allele, SequenceLocation, copy number classes, ...)
//! - Canonical JSON serialization and sha512t24u digest computation
//! - Computed identifiers (`ga4gh:VA....`) assigned bottom-up
//! - Fully-justified allele normalization against a sequence repository
//! - Enref/deref between inlined and referenced object graphs
//!
//! Sequence data is consumed through the [`SequenceRepository`] trait;
//! concrete backends live in the `vrs-dataproxy` crate.

pub mod digest;
pub mod enderef;
pub mod errors;
pub mod models;
pub mod normalize;
pub mod repository;
pub mod store;

pub use digest::{
    allele_digest, allele_identifier, canonicalize_json, identify, identify_location,
    identify_object, location_digest, location_identifier, object_digest, parse_ga4gh_curie,
    sha512t24u, DigestWriter,
};
pub use enderef::{deref, enref};
pub use errors::{Result, VrsError};
pub use models::{
    Allele, Coordinate, CopyChange, CopyNumberChange, CopyNumberCount, LengthExpression,
    LiteralSequenceExpression, LocationRef, ReferenceLengthExpression, ResidueAlphabet,
    SequenceExpression, SequenceLocation, SequenceReference, Variation, VrsObject,
};
pub use normalize::{normalize, normalize_allele, normalize_allele_with, NormalizeOptions};
pub use repository::{coerce_namespace, SequenceMetadata, SequenceProxy, SequenceRepository};
pub use store::{MemoryObjectStore, ObjectStore};
