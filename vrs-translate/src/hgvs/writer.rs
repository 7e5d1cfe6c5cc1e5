//! HGVS expression formatting from the AST.

use super::aminoacids;
use super::ast::{CoordinateKind, HgvsEdit, HgvsInterval, HgvsVariant};

/// Render a variant as an HGVS expression string.
pub fn format_hgvs(variant: &HgvsVariant) -> String {
    let posedit = match variant.kind {
        CoordinateKind::Protein => protein_posedit(variant),
        _ => na_posedit(variant),
    };
    format!(
        "{}:{}.{}",
        variant.accession,
        variant.kind.code(),
        posedit
    )
}

fn na_interval(interval: &HgvsInterval) -> String {
    if interval.is_point() {
        interval.start.to_string()
    } else {
        format!("{}_{}", interval.start, interval.end)
    }
}

fn na_posedit(variant: &HgvsVariant) -> String {
    let pos = na_interval(&variant.interval);
    match &variant.edit {
        HgvsEdit::Substitution { reference, alternate } => format!("{pos}{reference}>{alternate}"),
        HgvsEdit::Deletion { .. } => format!("{pos}del"),
        HgvsEdit::Duplication { .. } => format!("{pos}dup"),
        HgvsEdit::Insertion { sequence } => format!("{pos}ins{sequence}"),
        HgvsEdit::Delins { sequence } => format!("{pos}delins{sequence}"),
        HgvsEdit::Identity { .. } => format!("{pos}="),
    }
}

fn protein_residue(residue: Option<char>) -> &'static str {
    residue.and_then(aminoacids::one_to_three).unwrap_or("Xaa")
}

fn protein_sequence(sequence: &str) -> String {
    aminoacids::encode_sequence(sequence).unwrap_or_else(|| "Xaa".to_string())
}

fn protein_posedit(variant: &HgvsVariant) -> String {
    // Protein positions carry their residue. A stated reference covering
    // the whole interval names the endpoints; otherwise the writer falls
    // back to Xaa, so callers producing spans should state the reference.
    let reference = variant.edit.stated_reference();
    let endpoints = |r: &str| {
        (r.len() as u64 == variant.interval.len()).then(|| (r.chars().next(), r.chars().last()))
    };
    let pos = if variant.interval.is_point() {
        format!(
            "{}{}",
            protein_residue(reference.and_then(|r| r.chars().next())),
            variant.interval.start
        )
    } else {
        let (first, last) = reference.and_then(endpoints).unwrap_or((None, None));
        format!(
            "{}{}_{}{}",
            protein_residue(first),
            variant.interval.start,
            protein_residue(last),
            variant.interval.end
        )
    };
    match &variant.edit {
        HgvsEdit::Substitution { alternate, .. } => format!("{pos}{}", protein_sequence(alternate)),
        HgvsEdit::Deletion { .. } => format!("{pos}del"),
        HgvsEdit::Duplication { .. } => format!("{pos}dup"),
        HgvsEdit::Insertion { sequence } => format!("{pos}ins{}", protein_sequence(sequence)),
        HgvsEdit::Delins { sequence } => format!("{pos}delins{}", protein_sequence(sequence)),
        HgvsEdit::Identity { .. } => format!("{pos}="),
    }
}
