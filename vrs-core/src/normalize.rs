//! Fully-justified allele normalization.
//!
//! Rewrites a sequence-replacement allele into its unique canonical form:
//! common affixes are trimmed, then indels are extended left and right
//! across adjacent tandem repeats. When the extended span is an exact
//! repeat block the state is emitted as a `ReferenceLengthExpression`;
//! otherwise the literal flanks-plus-alternate sequence is emitted.
//!
//! Reference residues are read through a [`SequenceProxy`], so only the
//! touched pages of the reference are ever fetched.

use crate::errors::{Result, VrsError};
use crate::models::{
    Allele, Coordinate, LiteralSequenceExpression, LocationRef, ReferenceLengthExpression,
    SequenceExpression, SequenceLocation, Variation,
};
use crate::repository::{coerce_namespace, SequenceProxy, SequenceRepository};

/// Tuning knobs for normalization.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// When a `ReferenceLengthExpression` is emitted, also carry the literal
    /// expressed sequence if it is no longer than this. `None` means always.
    pub rle_seq_limit: Option<usize>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        NormalizeOptions {
            rle_seq_limit: Some(50),
        }
    }
}

/// Normalize any variation. Alleles are fully justified; copy-number
/// classes pass through unchanged.
pub fn normalize(v: &Variation, repo: &dyn SequenceRepository) -> Result<Variation> {
    match v {
        Variation::Allele(a) => Ok(Variation::Allele(normalize_allele(a, repo)?)),
        other => Ok(other.clone()),
    }
}

/// Normalize an allele with default options.
pub fn normalize_allele(allele: &Allele, repo: &dyn SequenceRepository) -> Result<Allele> {
    normalize_allele_with(allele, repo, &NormalizeOptions::default())
}

/// Normalize an allele. The input is never mutated; the result either is a
/// structural copy of the input (already-normal or not normalizable) or a
/// new allele with cleared `id`/`digest` fields.
pub fn normalize_allele_with(
    allele: &Allele,
    repo: &dyn SequenceRepository,
    options: &NormalizeOptions,
) -> Result<Allele> {
    let loc = match &allele.location {
        LocationRef::Inlined(loc) => loc,
        LocationRef::Referenced(id) => {
            return Err(VrsError::InvalidInput(format!(
                "cannot normalize an allele with a referenced location ({id}); deref it first"
            )))
        }
    };

    // Uncertain coordinates are preserved as-is; there is no well-defined
    // justification for a range-valued boundary.
    let (Some(start), Some(end)) = (loc.start.value(), loc.end.value()) else {
        log::debug!(
            "allele on {} has range-valued coordinates; skipping normalization",
            loc.refget_accession()
        );
        return Ok(allele.clone());
    };

    let proxy = SequenceProxy::new(repo, &coerce_namespace(loc.refget_accession()))?;
    let circular = proxy.is_circular() || loc.sequence_reference.circular == Some(true);
    let seq_len = proxy.len() as i128;

    if end > proxy.len() || start > proxy.len() || (start > end && !circular) {
        return Err(VrsError::InvalidInput(format!(
            "interval [{start}, {end}) is not within {} (length {})",
            loc.refget_accession(),
            proxy.len()
        )));
    }

    // Work in unwrapped coordinates: on circular references an
    // origin-spanning interval continues past the sequence length.
    let s0 = start as i128;
    let e0 = if start > end {
        end as i128 + seq_len
    } else {
        end as i128
    };

    let reference = fetch(&proxy, circular, s0, e0)?;
    let alternate = match &allele.state {
        SequenceExpression::Literal(lse) => lse.sequence.clone(),
        SequenceExpression::ReferenceLength(rle) => {
            expand_rle(rle, &proxy, circular, s0, e0)?
        }
        // No sequence content to justify.
        SequenceExpression::Length(_) => return Ok(allele.clone()),
    };

    check_alphabet(loc, &reference)?;
    check_alphabet(loc, &alternate)?;

    // Identity allele: the state restates the reference span.
    if reference == alternate {
        return Ok(allele.clone());
    }

    // Step 1: trim common affixes.
    let r = reference.as_bytes();
    let a = alternate.as_bytes();
    let prefix = common_prefix(r, a);
    let suffix = common_suffix(&r[prefix..], &a[prefix..]);
    let r_trim = &r[prefix..r.len() - suffix];
    let a_trim = &a[prefix..a.len() - suffix];
    let s = s0 + prefix as i128;
    let e = e0 - suffix as i128;

    // Step 2: classify. Substitutions and complex delins cannot extend.
    if !r_trim.is_empty() && !a_trim.is_empty() {
        return Ok(rebuild(
            allele,
            loc,
            wrap(s, seq_len, circular),
            wrap(e, seq_len, circular),
            SequenceExpression::Literal(LiteralSequenceExpression::new(
                String::from_utf8_lossy(a_trim).into_owned(),
            )),
        ));
    }

    // Step 3: roll the bubble sequence to the bounds of the repeat block.
    let unit = if r_trim.is_empty() { a_trim } else { r_trim };
    let unit_len = unit.len() as i128;

    let left_bound = if circular { seq_len - (e - s) } else { s };
    let left_roll = roll_left(&proxy, circular, unit, s, left_bound)?;
    let right_bound = if circular {
        seq_len - (e - s) - left_roll
    } else {
        seq_len - e
    };
    let right_roll = roll_right(&proxy, circular, unit, e, right_bound)?;

    let lo = s - left_roll;
    let hi = e + right_roll;
    let span = hi - lo;
    let delta = a_trim.len() as i128 - r_trim.len() as i128;

    // Step 4: emit. An exact repeat block compresses to a
    // ReferenceLengthExpression; everything else stays literal.
    let expressed = {
        let mut out = fetch(&proxy, circular, lo, s)?;
        out.push_str(&String::from_utf8_lossy(a_trim));
        out.push_str(&fetch(&proxy, circular, e, hi)?);
        out
    };

    let state = if span > 0 && unit_len >= 2 && span % unit_len == 0 {
        let carry_sequence = match options.rle_seq_limit {
            Some(limit) => expressed.len() <= limit,
            None => true,
        };
        SequenceExpression::ReferenceLength(ReferenceLengthExpression {
            length: (span + delta) as u64,
            repeat_subunit_length: unit_len as u64,
            sequence: carry_sequence.then_some(expressed),
        })
    } else {
        SequenceExpression::Literal(LiteralSequenceExpression::new(expressed))
    };

    Ok(rebuild(
        allele,
        loc,
        wrap(lo, seq_len, circular),
        wrap(hi, seq_len, circular),
        state,
    ))
}

fn wrap(pos: i128, seq_len: i128, circular: bool) -> u64 {
    if circular {
        pos.rem_euclid(seq_len) as u64
    } else {
        pos as u64
    }
}

fn fetch(proxy: &SequenceProxy<'_>, circular: bool, start: i128, end: i128) -> Result<String> {
    if circular {
        proxy.slice_wrapped(start, end)
    } else {
        proxy.slice(start as u64, end as u64)
    }
}

fn residue_at(proxy: &SequenceProxy<'_>, circular: bool, pos: i128) -> Result<u8> {
    if circular {
        proxy.residue_wrapped(pos)
    } else {
        proxy.residue(pos as u64)
    }
}

fn check_alphabet(loc: &SequenceLocation, sequence: &str) -> Result<()> {
    let Some(alphabet) = loc.sequence_reference.residue_alphabet else {
        return Ok(());
    };
    for (offset, b) in sequence.bytes().enumerate() {
        if !alphabet.contains(b) {
            return Err(VrsError::InvalidAlphabet {
                residue: b as char,
                offset,
                alphabet: alphabet.as_str(),
            });
        }
    }
    Ok(())
}

fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

fn common_suffix(a: &[u8], b: &[u8]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// How far the bubble can be shifted left of `pos`, treating the unit as
/// circular from its end, up to `bound` steps.
fn roll_left(
    proxy: &SequenceProxy<'_>,
    circular: bool,
    unit: &[u8],
    pos: i128,
    bound: i128,
) -> Result<i128> {
    let len = unit.len() as i128;
    let mut d = 0i128;
    while d < bound {
        let unit_idx = (len - 1 - d % len) as usize;
        if residue_at(proxy, circular, pos - 1 - d)? != unit[unit_idx] {
            break;
        }
        d += 1;
    }
    Ok(d)
}

/// How far the bubble can be shifted right of `pos`, treating the unit as
/// circular from its start, up to `bound` steps.
fn roll_right(
    proxy: &SequenceProxy<'_>,
    circular: bool,
    unit: &[u8],
    pos: i128,
    bound: i128,
) -> Result<i128> {
    let len = unit.len() as i128;
    let mut d = 0i128;
    while d < bound {
        if residue_at(proxy, circular, pos + d)? != unit[(d % len) as usize] {
            break;
        }
        d += 1;
    }
    Ok(d)
}

/// Reconstruct the literal sequence expressed by an RLE state so it can be
/// re-justified from scratch.
fn expand_rle(
    rle: &ReferenceLengthExpression,
    proxy: &SequenceProxy<'_>,
    circular: bool,
    start: i128,
    end: i128,
) -> Result<String> {
    if let Some(seq) = &rle.sequence {
        return Ok(seq.clone());
    }
    let unit_len = rle.repeat_subunit_length as i128;
    if unit_len == 0 || unit_len > end - start {
        return Err(VrsError::Unrepresentable(format!(
            "ReferenceLengthExpression with repeat subunit {} cannot be expanded from a span of {}",
            rle.repeat_subunit_length,
            end - start
        )));
    }
    let unit = fetch(proxy, circular, start, start + unit_len)?;
    let mut out = String::with_capacity(rle.length as usize);
    while (out.len() as u64) < rle.length {
        let take = ((rle.length as usize) - out.len()).min(unit.len());
        out.push_str(&unit[..take]);
    }
    Ok(out)
}

fn rebuild(
    allele: &Allele,
    loc: &SequenceLocation,
    start: u64,
    end: u64,
    state: SequenceExpression,
) -> Allele {
    let mut new_loc = SequenceLocation::new(
        loc.sequence_reference.clone(),
        Coordinate::Value(start),
        Coordinate::Value(end),
    );
    new_loc.label = loc.label.clone();
    new_loc.description = loc.description.clone();

    let mut out = Allele::new(new_loc, state);
    out.label = allele.label.clone();
    out.description = allele.description.clone();
    out
}
