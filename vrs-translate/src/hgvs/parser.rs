//! Hand-rolled parser for the linear HGVS subset.
//!
//! Covers `g.`/`m.`/`p.` expressions with substitution, deletion,
//! insertion, delins, duplication, and identity edits, plus the same edit
//! set on `c.`/`n.`/`r.` accessions with plain (exonic) positions.
//! Intronic and UTR offsets (`+`, `-`, `*`) are out of grammar; a full
//! HGVS parser collaborator can hand equivalent [`HgvsVariant`] values to
//! the translators directly.

use vrs_core::{Result, VrsError};

use super::aminoacids;
use super::ast::{CoordinateKind, HgvsEdit, HgvsInterval, HgvsVariant};

/// Parse an HGVS expression into the AST.
pub fn parse_hgvs(expr: &str) -> Result<HgvsVariant> {
    let bad = |why: &str| VrsError::InvalidInput(format!("HGVS expression {expr:?}: {why}"));

    let (accession, rest) = expr.split_once(':').ok_or_else(|| bad("missing ':'"))?;
    if accession.is_empty() || accession.chars().any(char::is_whitespace) {
        return Err(bad("malformed accession"));
    }

    let mut chars = rest.chars();
    let kind = chars
        .next()
        .and_then(CoordinateKind::from_code)
        .ok_or_else(|| bad("unknown coordinate system"))?;
    if chars.next() != Some('.') {
        return Err(bad("expected '.' after the coordinate system"));
    }
    let posedit = &rest[2..];

    let (interval, edit) = match kind {
        CoordinateKind::Protein => parse_protein_posedit(posedit).map_err(|why| bad(&why))?,
        _ => parse_na_posedit(posedit).map_err(|why| bad(&why))?,
    };

    Ok(HgvsVariant {
        accession: accession.to_string(),
        kind,
        interval,
        edit,
    })
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Cursor { rest: s }
    }

    fn eat(&mut self, token: &str) -> bool {
        match self.rest.strip_prefix(token) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn number(&mut self) -> Option<u64> {
        let digits = self.rest.len() - self.rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 {
            return None;
        }
        let (num, rest) = self.rest.split_at(digits);
        self.rest = rest;
        num.parse().ok()
    }

    fn letters(&mut self) -> &'a str {
        let n = self.rest.len() - self.rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()).len();
        let (word, rest) = self.rest.split_at(n);
        self.rest = rest;
        word
    }

    fn done(&self) -> bool {
        self.rest.is_empty()
    }
}

type Posedit = (HgvsInterval, HgvsEdit);

fn parse_na_posedit(s: &str) -> std::result::Result<Posedit, String> {
    if s.contains(['+', '-', '*']) {
        return Err("intronic and UTR offsets are not supported; \
                    project the variant with a transcript mapper first"
            .to_string());
    }
    let mut cur = Cursor::new(s);

    let start = cur.number().ok_or("expected a position")?;
    let end = if cur.eat("_") {
        cur.number().ok_or("expected an end position after '_'")?
    } else {
        start
    };
    if start == 0 || end < start {
        return Err(format!("invalid interval {start}_{end}"));
    }
    let interval = HgvsInterval::span(start, end);

    if cur.eat("=") {
        if !cur.done() {
            return Err("trailing characters after '='".to_string());
        }
        return Ok((interval, HgvsEdit::Identity { reference: None }));
    }
    if cur.eat("delins") {
        let seq = na_sequence(cur.letters())?;
        if seq.is_empty() || !cur.done() {
            return Err("delins requires a replacement sequence".to_string());
        }
        return Ok((interval, HgvsEdit::Delins { sequence: seq }));
    }
    if cur.eat("del") {
        let seq = na_sequence(cur.letters())?;
        if !cur.done() {
            return Err("trailing characters after del".to_string());
        }
        let reference = (!seq.is_empty()).then_some(seq);
        return Ok((interval, HgvsEdit::Deletion { reference }));
    }
    if cur.eat("dup") {
        let seq = na_sequence(cur.letters())?;
        if !cur.done() {
            return Err("trailing characters after dup".to_string());
        }
        let reference = (!seq.is_empty()).then_some(seq);
        return Ok((interval, HgvsEdit::Duplication { reference }));
    }
    if cur.eat("ins") {
        let seq = na_sequence(cur.letters())?;
        if seq.is_empty() || !cur.done() {
            return Err("ins requires an inserted sequence".to_string());
        }
        if interval.len() != 2 {
            return Err("ins requires two flanking positions (e.g. 123_124ins...)".to_string());
        }
        return Ok((interval, HgvsEdit::Insertion { sequence: seq }));
    }

    // Substitution: `<ref>><alt>`, single base each, at a point position.
    let reference = na_sequence(cur.letters())?;
    if !cur.eat(">") {
        return Err("unrecognized edit".to_string());
    }
    let alternate = na_sequence(cur.letters())?;
    if reference.len() != 1 || alternate.len() != 1 || !cur.done() {
        return Err("substitution must be a single base (e.g. 123C>T)".to_string());
    }
    if !interval.is_point() {
        return Err("substitution takes a single position".to_string());
    }
    Ok((interval, HgvsEdit::Substitution { reference, alternate }))
}

fn parse_protein_posedit(s: &str) -> std::result::Result<Posedit, String> {
    let mut cur = Cursor::new(s);

    let (start_aa, start) = protein_position(&mut cur)?;
    let (end_aa, end) = if cur.eat("_") {
        let (aa, pos) = protein_position(&mut cur)?;
        (Some(aa), pos)
    } else {
        (None, start)
    };
    if start == 0 || end < start {
        return Err(format!("invalid interval {start}_{end}"));
    }
    let interval = HgvsInterval::span(start, end);
    let point_reference = || end_aa.is_none().then(|| start_aa.to_string());

    if cur.eat("=") {
        if !cur.done() {
            return Err("trailing characters after '='".to_string());
        }
        return Ok((interval, HgvsEdit::Identity { reference: point_reference() }));
    }
    if cur.eat("delins") {
        let seq = protein_sequence(&mut cur)?;
        if seq.is_empty() || !cur.done() {
            return Err("delins requires a replacement sequence".to_string());
        }
        return Ok((interval, HgvsEdit::Delins { sequence: seq }));
    }
    if cur.eat("del") {
        if !cur.done() {
            return Err("trailing characters after del".to_string());
        }
        return Ok((interval, HgvsEdit::Deletion { reference: point_reference() }));
    }
    if cur.eat("dup") {
        if !cur.done() {
            return Err("trailing characters after dup".to_string());
        }
        return Ok((interval, HgvsEdit::Duplication { reference: point_reference() }));
    }
    if cur.eat("ins") {
        let seq = protein_sequence(&mut cur)?;
        if seq.is_empty() || !cur.done() {
            return Err("ins requires an inserted sequence".to_string());
        }
        if interval.len() != 2 {
            return Err("ins requires two flanking positions".to_string());
        }
        return Ok((interval, HgvsEdit::Insertion { sequence: seq }));
    }

    // Substitution: `Arg97Gly` - the alternate follows the position directly.
    let alternate = protein_sequence(&mut cur)?;
    if alternate.len() != 1 || !cur.done() || !interval.is_point() {
        return Err("protein substitution must be a single residue (e.g. Arg97Gly)".to_string());
    }
    Ok((
        interval,
        HgvsEdit::Substitution {
            reference: start_aa.to_string(),
            alternate,
        },
    ))
}

fn protein_position(cur: &mut Cursor<'_>) -> std::result::Result<(char, u64), String> {
    let residue = if cur.eat("*") {
        '*'
    } else {
        let code: String = cur.rest.chars().take(3).collect();
        let one = aminoacids::three_to_one(&code)
            .ok_or_else(|| format!("unknown amino acid code {code:?}"))?;
        cur.rest = &cur.rest[3..];
        one
    };
    let pos = cur.number().ok_or("expected a residue number")?;
    Ok((residue, pos))
}

fn protein_sequence(cur: &mut Cursor<'_>) -> std::result::Result<String, String> {
    let word = cur.letters();
    if word.is_empty() {
        return Ok(String::new());
    }
    aminoacids::decode_sequence(word)
        .ok_or_else(|| format!("{word:?} is not a three-letter amino acid sequence"))
}

fn na_sequence(word: &str) -> std::result::Result<String, String> {
    let upper = word.to_uppercase();
    if let Some(bad) = upper
        .bytes()
        .find(|b| !vrs_core::ResidueAlphabet::Na.contains(*b))
    {
        return Err(format!("{:?} is not a nucleotide", bad as char));
    }
    Ok(upper)
}
