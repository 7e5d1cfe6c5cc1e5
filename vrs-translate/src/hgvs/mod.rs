//! HGVS expressions.
//!
//! The AST ([`HgvsVariant`]) is the seam between this crate and any full
//! HGVS grammar implementation: translators accept and emit the AST, and
//! the built-in parser/writer cover the linear subset used for genomic,
//! mitochondrial, and protein references (substitution, deletion,
//! insertion, delins, duplication, identity). Transcript-relative variants
//! (`c.`/`n.`/`r.`) parse into the AST but need a [`TranscriptMapper`]
//! collaborator to reach a genomic sequence.

mod aminoacids;
mod ast;
mod mapper;
mod parser;
mod writer;

pub use ast::{CoordinateKind, HgvsEdit, HgvsInterval, HgvsVariant};
pub use mapper::TranscriptMapper;
pub use parser::parse_hgvs;
pub use writer::format_hgvs;
