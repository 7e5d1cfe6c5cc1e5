//! VRS data models.
//!
//! Tagged algebraic types for the GA4GH VRS entities. Equality is structural
//! over identity-contributing fields only; annotation fields (`id`, `label`,
//! `description`, `alternative_labels`) never participate in comparisons or
//! digests. Objects are treated as immutable once identified: normalization
//! and enref/deref always produce new values.

use serde_json::{json, Value};

/// The character set referred to by a refget accession.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResidueAlphabet {
    /// Nucleic acid (IUPAC one-letter codes).
    Na,
    /// Amino acid (IUPAC one-letter codes).
    Aa,
}

impl ResidueAlphabet {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResidueAlphabet::Na => "na",
            ResidueAlphabet::Aa => "aa",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "na" => Some(ResidueAlphabet::Na),
            "aa" => Some(ResidueAlphabet::Aa),
            _ => None,
        }
    }

    /// Whether `residue` is a legal character for this alphabet, including
    /// IUPAC ambiguity codes.
    pub fn contains(&self, residue: u8) -> bool {
        match self {
            ResidueAlphabet::Na => matches!(
                residue,
                b'A' | b'C' | b'G' | b'T' | b'U' | b'R' | b'Y' | b'S' | b'W' | b'K' | b'M'
                    | b'B' | b'D' | b'H' | b'V' | b'N'
            ),
            ResidueAlphabet::Aa => matches!(residue, b'A'..=b'Z' | b'*' | b'-'),
        }
    }
}

impl std::fmt::Display for ResidueAlphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coordinate or count that is either definite or an uncertain
/// `[lower, upper]` interval with `lower <= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coordinate {
    Value(u64),
    Range(u64, u64),
}

impl Coordinate {
    /// The definite value, if this coordinate is not a range.
    pub fn value(&self) -> Option<u64> {
        match self {
            Coordinate::Value(v) => Some(*v),
            Coordinate::Range(..) => None,
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, Coordinate::Range(..))
    }

    /// `lower <= upper` for ranges; definite values are always valid.
    pub fn is_well_formed(&self) -> bool {
        match self {
            Coordinate::Value(_) => true,
            Coordinate::Range(lo, hi) => lo <= hi,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Coordinate::Value(v) => json!(v),
            Coordinate::Range(lo, hi) => json!([lo, hi]),
        }
    }
}

impl From<u64> for Coordinate {
    fn from(v: u64) -> Self {
        Coordinate::Value(v)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Coordinate::Value(v) => write!(f, "{v}"),
            Coordinate::Range(lo, hi) => write!(f, "[{lo},{hi}]"),
        }
    }
}

/// A reference to a biological sequence by its refget accession
/// (`SQ.` + 32 base64url characters). Not independently identifiable;
/// the accession is its identity.
#[derive(Debug, Clone)]
pub struct SequenceReference {
    pub refget_accession: String,
    pub residue_alphabet: Option<ResidueAlphabet>,
    pub circular: Option<bool>,
    pub label: Option<String>,
    pub alternative_labels: Option<Vec<String>>,
    pub description: Option<String>,
}

impl SequenceReference {
    pub fn new(refget_accession: impl Into<String>) -> Self {
        SequenceReference {
            refget_accession: refget_accession.into(),
            residue_alphabet: None,
            circular: None,
            label: None,
            alternative_labels: None,
            description: None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut o = json!({
            "refgetAccession": self.refget_accession,
            "type": "SequenceReference",
        });
        if let Some(alpha) = self.residue_alphabet {
            o["residueAlphabet"] = json!(alpha.as_str());
        }
        if let Some(circular) = self.circular {
            o["circular"] = json!(circular);
        }
        annotate(&mut o, &self.label, &self.description, &self.alternative_labels);
        o
    }
}

impl PartialEq for SequenceReference {
    fn eq(&self, other: &Self) -> bool {
        self.refget_accession == other.refget_accession
    }
}

/// A half-open interbase interval on a [`SequenceReference`]. Identifiable.
#[derive(Debug, Clone)]
pub struct SequenceLocation {
    pub id: Option<String>,
    pub digest: Option<String>,
    pub sequence_reference: SequenceReference,
    pub start: Coordinate,
    pub end: Coordinate,
    pub label: Option<String>,
    pub description: Option<String>,
}

impl SequenceLocation {
    pub fn new(
        sequence_reference: SequenceReference,
        start: impl Into<Coordinate>,
        end: impl Into<Coordinate>,
    ) -> Self {
        SequenceLocation {
            id: None,
            digest: None,
            sequence_reference,
            start: start.into(),
            end: end.into(),
            label: None,
            description: None,
        }
    }

    pub fn refget_accession(&self) -> &str {
        &self.sequence_reference.refget_accession
    }

    /// `start <= end` when both are definite, and range bounds ordered.
    pub fn is_well_formed(&self) -> bool {
        if !self.start.is_well_formed() || !self.end.is_well_formed() {
            return false;
        }
        match (self.start.value(), self.end.value()) {
            (Some(s), Some(e)) => {
                // start > end is legal only on circular references.
                s <= e || self.sequence_reference.circular == Some(true)
            }
            _ => true,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut o = json!({
            "end": self.end.to_json(),
            "sequenceReference": self.sequence_reference.to_json(),
            "start": self.start.to_json(),
            "type": "SequenceLocation",
        });
        identified(&mut o, &self.id, &self.digest);
        annotate(&mut o, &self.label, &self.description, &None);
        o
    }
}

impl PartialEq for SequenceLocation {
    fn eq(&self, other: &Self) -> bool {
        self.sequence_reference == other.sequence_reference
            && self.start == other.start
            && self.end == other.end
    }
}

/// An explicit sequence string.
#[derive(Debug, Clone)]
pub struct LiteralSequenceExpression {
    pub sequence: String,
}

impl LiteralSequenceExpression {
    pub fn new(sequence: impl Into<String>) -> Self {
        LiteralSequenceExpression { sequence: sequence.into() }
    }
}

impl PartialEq for LiteralSequenceExpression {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}

/// A compressed expression for tandem repeats: the total expressed length
/// and the repeat-unit length. The optional literal `sequence` is a
/// convenience copy and never contributes to digests.
#[derive(Debug, Clone)]
pub struct ReferenceLengthExpression {
    pub length: u64,
    pub repeat_subunit_length: u64,
    pub sequence: Option<String>,
}

impl PartialEq for ReferenceLengthExpression {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.repeat_subunit_length == other.repeat_subunit_length
    }
}

/// A purely numeric change in length with no sequence content.
#[derive(Debug, Clone, PartialEq)]
pub struct LengthExpression {
    pub length: Option<Coordinate>,
}

/// The state of an [`Allele`].
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceExpression {
    Literal(LiteralSequenceExpression),
    ReferenceLength(ReferenceLengthExpression),
    Length(LengthExpression),
}

impl SequenceExpression {
    pub fn literal(sequence: impl Into<String>) -> Self {
        SequenceExpression::Literal(LiteralSequenceExpression::new(sequence))
    }

    /// The literal sequence, when this expression carries one.
    pub fn sequence(&self) -> Option<&str> {
        match self {
            SequenceExpression::Literal(lse) => Some(&lse.sequence),
            SequenceExpression::ReferenceLength(rle) => rle.sequence.as_deref(),
            SequenceExpression::Length(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            SequenceExpression::Literal(lse) => json!({
                "sequence": lse.sequence,
                "type": "LiteralSequenceExpression",
            }),
            SequenceExpression::ReferenceLength(rle) => {
                let mut o = json!({
                    "length": rle.length,
                    "repeatSubunitLength": rle.repeat_subunit_length,
                    "type": "ReferenceLengthExpression",
                });
                if let Some(seq) = &rle.sequence {
                    o["sequence"] = json!(seq);
                }
                o
            }
            SequenceExpression::Length(le) => {
                let mut o = json!({ "type": "LengthExpression" });
                if let Some(len) = &le.length {
                    o["length"] = len.to_json();
                }
                o
            }
        }
    }
}

/// A slot that holds either an inlined [`SequenceLocation`] or a
/// `ga4gh:SL....` identifier reference.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationRef {
    Inlined(Box<SequenceLocation>),
    Referenced(String),
}

impl LocationRef {
    pub fn inlined(location: SequenceLocation) -> Self {
        LocationRef::Inlined(Box::new(location))
    }

    pub fn as_inlined(&self) -> Option<&SequenceLocation> {
        match self {
            LocationRef::Inlined(loc) => Some(loc),
            LocationRef::Referenced(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            LocationRef::Inlined(loc) => loc.to_json(),
            LocationRef::Referenced(id) => json!(id),
        }
    }
}

impl From<SequenceLocation> for LocationRef {
    fn from(loc: SequenceLocation) -> Self {
        LocationRef::inlined(loc)
    }
}

/// A single contiguous state at a location. Identifiable.
#[derive(Debug, Clone)]
pub struct Allele {
    pub id: Option<String>,
    pub digest: Option<String>,
    pub location: LocationRef,
    pub state: SequenceExpression,
    pub label: Option<String>,
    pub description: Option<String>,
}

impl Allele {
    pub fn new(location: impl Into<LocationRef>, state: SequenceExpression) -> Self {
        Allele {
            id: None,
            digest: None,
            location: location.into(),
            state,
            label: None,
            description: None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut o = json!({
            "location": self.location.to_json(),
            "state": self.state.to_json(),
            "type": "Allele",
        });
        identified(&mut o, &self.id, &self.digest);
        annotate(&mut o, &self.label, &self.description, &None);
        o
    }
}

impl PartialEq for Allele {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location && self.state == other.state
    }
}

/// The absolute count of copies of a location within a system. Identifiable.
#[derive(Debug, Clone)]
pub struct CopyNumberCount {
    pub id: Option<String>,
    pub digest: Option<String>,
    pub location: LocationRef,
    pub copies: Coordinate,
    pub label: Option<String>,
    pub description: Option<String>,
}

impl CopyNumberCount {
    pub fn new(location: impl Into<LocationRef>, copies: impl Into<Coordinate>) -> Self {
        CopyNumberCount {
            id: None,
            digest: None,
            location: location.into(),
            copies: copies.into(),
            label: None,
            description: None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut o = json!({
            "copies": self.copies.to_json(),
            "location": self.location.to_json(),
            "type": "CopyNumberCount",
        });
        identified(&mut o, &self.id, &self.digest);
        annotate(&mut o, &self.label, &self.description, &None);
        o
    }
}

impl PartialEq for CopyNumberCount {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location && self.copies == other.copies
    }
}

/// The closed, versioned set of EFO copy-change terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyChange {
    CompleteGenomicLoss,
    HighLevelLoss,
    LowLevelLoss,
    Loss,
    RegionalBasePloidy,
    Gain,
    LowLevelGain,
    HighLevelGain,
}

impl CopyChange {
    /// The EFO CURIE for this term.
    pub fn code(&self) -> &'static str {
        match self {
            CopyChange::CompleteGenomicLoss => "EFO:0030069",
            CopyChange::HighLevelLoss => "EFO:0020073",
            CopyChange::LowLevelLoss => "EFO:0030068",
            CopyChange::Loss => "EFO:0030067",
            CopyChange::RegionalBasePloidy => "EFO:0030064",
            CopyChange::Gain => "EFO:0030070",
            CopyChange::LowLevelGain => "EFO:0030071",
            CopyChange::HighLevelGain => "EFO:0030072",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "EFO:0030069" => Some(CopyChange::CompleteGenomicLoss),
            "EFO:0020073" => Some(CopyChange::HighLevelLoss),
            "EFO:0030068" => Some(CopyChange::LowLevelLoss),
            "EFO:0030067" => Some(CopyChange::Loss),
            "EFO:0030064" => Some(CopyChange::RegionalBasePloidy),
            "EFO:0030070" => Some(CopyChange::Gain),
            "EFO:0030071" => Some(CopyChange::LowLevelGain),
            "EFO:0030072" => Some(CopyChange::HighLevelGain),
            _ => None,
        }
    }
}

impl std::fmt::Display for CopyChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// An assessment of copy number relative to baseline ploidy. Identifiable.
#[derive(Debug, Clone)]
pub struct CopyNumberChange {
    pub id: Option<String>,
    pub digest: Option<String>,
    pub location: LocationRef,
    pub copy_change: CopyChange,
    pub label: Option<String>,
    pub description: Option<String>,
}

impl CopyNumberChange {
    pub fn new(location: impl Into<LocationRef>, copy_change: CopyChange) -> Self {
        CopyNumberChange {
            id: None,
            digest: None,
            location: location.into(),
            copy_change,
            label: None,
            description: None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut o = json!({
            "copyChange": self.copy_change.code(),
            "location": self.location.to_json(),
            "type": "CopyNumberChange",
        });
        identified(&mut o, &self.id, &self.digest);
        annotate(&mut o, &self.label, &self.description, &None);
        o
    }
}

impl PartialEq for CopyNumberChange {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location && self.copy_change == other.copy_change
    }
}

/// Any in-scope variation class.
#[derive(Debug, Clone, PartialEq)]
pub enum Variation {
    Allele(Allele),
    CopyNumberCount(CopyNumberCount),
    CopyNumberChange(CopyNumberChange),
}

impl Variation {
    pub fn type_name(&self) -> &'static str {
        match self {
            Variation::Allele(_) => "Allele",
            Variation::CopyNumberCount(_) => "CopyNumberCount",
            Variation::CopyNumberChange(_) => "CopyNumberChange",
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Variation::Allele(a) => a.id.as_deref(),
            Variation::CopyNumberCount(c) => c.id.as_deref(),
            Variation::CopyNumberChange(c) => c.id.as_deref(),
        }
    }

    pub fn location(&self) -> &LocationRef {
        match self {
            Variation::Allele(a) => &a.location,
            Variation::CopyNumberCount(c) => &c.location,
            Variation::CopyNumberChange(c) => &c.location,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Variation::Allele(a) => a.to_json(),
            Variation::CopyNumberCount(c) => c.to_json(),
            Variation::CopyNumberChange(c) => c.to_json(),
        }
    }
}

impl From<Allele> for Variation {
    fn from(a: Allele) -> Self {
        Variation::Allele(a)
    }
}

impl From<CopyNumberCount> for Variation {
    fn from(c: CopyNumberCount) -> Self {
        Variation::CopyNumberCount(c)
    }
}

impl From<CopyNumberChange> for Variation {
    fn from(c: CopyNumberChange) -> Self {
        Variation::CopyNumberChange(c)
    }
}

/// Any identifiable object, as held by an object store.
#[derive(Debug, Clone, PartialEq)]
pub enum VrsObject {
    Allele(Allele),
    CopyNumberCount(CopyNumberCount),
    CopyNumberChange(CopyNumberChange),
    SequenceLocation(SequenceLocation),
}

impl VrsObject {
    pub fn type_name(&self) -> &'static str {
        match self {
            VrsObject::Allele(_) => "Allele",
            VrsObject::CopyNumberCount(_) => "CopyNumberCount",
            VrsObject::CopyNumberChange(_) => "CopyNumberChange",
            VrsObject::SequenceLocation(_) => "SequenceLocation",
        }
    }

    /// The ga4gh type prefix used in computed identifiers.
    pub fn type_prefix(&self) -> &'static str {
        match self {
            VrsObject::Allele(_) => "VA",
            VrsObject::CopyNumberCount(_) => "CN",
            VrsObject::CopyNumberChange(_) => "CX",
            VrsObject::SequenceLocation(_) => "SL",
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            VrsObject::Allele(a) => a.to_json(),
            VrsObject::CopyNumberCount(c) => c.to_json(),
            VrsObject::CopyNumberChange(c) => c.to_json(),
            VrsObject::SequenceLocation(l) => l.to_json(),
        }
    }
}

impl From<Variation> for VrsObject {
    fn from(v: Variation) -> Self {
        match v {
            Variation::Allele(a) => VrsObject::Allele(a),
            Variation::CopyNumberCount(c) => VrsObject::CopyNumberCount(c),
            Variation::CopyNumberChange(c) => VrsObject::CopyNumberChange(c),
        }
    }
}

impl From<SequenceLocation> for VrsObject {
    fn from(l: SequenceLocation) -> Self {
        VrsObject::SequenceLocation(l)
    }
}

fn identified(o: &mut Value, id: &Option<String>, digest: &Option<String>) {
    if let Some(id) = id {
        o["id"] = json!(id);
    }
    if let Some(digest) = digest {
        o["digest"] = json!(digest);
    }
}

fn annotate(
    o: &mut Value,
    label: &Option<String>,
    description: &Option<String>,
    alternative_labels: &Option<Vec<String>>,
) {
    if let Some(label) = label {
        o["label"] = json!(label);
    }
    if let Some(description) = description {
        o["description"] = json!(description);
    }
    if let Some(alts) = alternative_labels {
        o["alternativeLabels"] = json!(alts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> SequenceLocation {
        SequenceLocation::new(
            SequenceReference::new("SQ.aUiQCzCPZ2d0csHbMSbh2NzInhonSXwI"),
            80656488u64,
            80656489u64,
        )
    }

    #[test]
    fn equality_ignores_annotations() {
        let mut a = Allele::new(location(), SequenceExpression::literal("T"));
        let mut b = Allele::new(location(), SequenceExpression::literal("T"));
        a.label = Some("rs1234".to_string());
        b.description = Some("a test allele".to_string());
        b.id = Some("custom-id".to_string());
        assert_eq!(a, b);
    }

    #[test]
    fn equality_is_structural() {
        let a = Allele::new(location(), SequenceExpression::literal("T"));
        let b = Allele::new(location(), SequenceExpression::literal("G"));
        assert_ne!(a, b);
    }

    #[test]
    fn rle_equality_ignores_convenience_sequence() {
        let a = ReferenceLengthExpression {
            length: 12,
            repeat_subunit_length: 3,
            sequence: Some("CAGCAGCAGCAG".to_string()),
        };
        let b = ReferenceLengthExpression {
            length: 12,
            repeat_subunit_length: 3,
            sequence: None,
        };
        assert_eq!(a, b);
    }

    #[test]
    fn coordinate_range_well_formedness() {
        assert!(Coordinate::Range(3, 7).is_well_formed());
        assert!(!Coordinate::Range(7, 3).is_well_formed());
        assert!(Coordinate::Value(0).is_well_formed());
    }

    #[test]
    fn copy_change_codes_round_trip() {
        for cc in [
            CopyChange::CompleteGenomicLoss,
            CopyChange::HighLevelLoss,
            CopyChange::LowLevelLoss,
            CopyChange::Loss,
            CopyChange::RegionalBasePloidy,
            CopyChange::Gain,
            CopyChange::LowLevelGain,
            CopyChange::HighLevelGain,
        ] {
            assert_eq!(CopyChange::from_code(cc.code()), Some(cc));
        }
        assert_eq!(CopyChange::from_code("EFO:9999999"), None);
    }

    #[test]
    fn wire_json_includes_type_tags() {
        let allele = Allele::new(location(), SequenceExpression::literal("T"));
        let v = allele.to_json();
        assert_eq!(v["type"], "Allele");
        assert_eq!(v["location"]["type"], "SequenceLocation");
        assert_eq!(
            v["location"]["sequenceReference"]["type"],
            "SequenceReference"
        );
        assert_eq!(v["state"]["type"], "LiteralSequenceExpression");
    }

    #[test]
    fn na_alphabet_accepts_iupac_codes() {
        let na = ResidueAlphabet::Na;
        for c in b"ACGTUN" {
            assert!(na.contains(*c));
        }
        assert!(na.contains(b'R'));
        assert!(!na.contains(b'Z'));
        assert!(!na.contains(b'a'));
    }
}
