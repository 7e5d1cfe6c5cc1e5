//! # Sequence repository backends
//!
//! Concrete [`vrs_core::SequenceRepository`] implementations:
//!
//! - [`MemoryRepository`] - sequences held in RAM, built directly or from
//!   FASTA files
//! - [`DirRepository`] - a lazy disk-backed layout (metadata index, one
//!   residue file per sequence, alias TSVs per namespace)
//! - [`RestRepository`] - a seqrepo REST service client
//!
//! [`create_repository`] selects a backend from a `seqrepo+...` URI.

pub mod alias;
pub mod dir;
pub mod memory;
pub mod rest;
pub mod uri;

pub use alias::AliasTable;
pub use dir::DirRepository;
pub use memory::MemoryRepository;
pub use rest::RestRepository;
pub use uri::{create_repository, DATAPROXY_URI_ENV};
