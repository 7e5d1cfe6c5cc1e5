//! Canonical serialization and digest computation.
//!
//! Identifiers are `ga4gh:<prefix>.<digest>` where the digest is the
//! sha512t24u (SHA-512, truncated to 24 bytes, base64url without padding)
//! of the object's canonical JSON. Canonical JSON uses lexicographic key
//! order, minimal whitespace, UTF-8, and integer-only numerics; only the
//! digest-contributing keys of each type are serialized, and nested
//! identifiable objects are replaced by their bare 32-character digest.
//!
//! Two paths are provided: a generic path over `serde_json::Value` and a
//! reusable [`DigestWriter`] that writes canonical bytes straight into a
//! scratch buffer for the VCF annotation hot loop.

use serde_json::{json, Value};
use sha2::{Digest, Sha512};

use crate::errors::{Result, VrsError};
use crate::models::{
    Allele, CopyNumberChange, CopyNumberCount, LocationRef, SequenceExpression, SequenceLocation,
    Variation, VrsObject,
};

/// Compute the GA4GH sha512t24u digest of the input bytes.
pub fn sha512t24u<T: AsRef<[u8]>>(input: T) -> String {
    let mut hasher = Sha512::new();
    hasher.update(input.as_ref());
    base64_url::encode(&hasher.finalize()[..24])
}

/// Serialize a JSON value canonically: lexicographic key order, no
/// whitespace, integer-only numerics.
pub fn canonicalize_json(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            // VRS objects never carry floats; coordinates and counts are integers.
            if let Some(u) = n.as_u64() {
                u.to_string()
            } else if let Some(i) = n.as_i64() {
                i.to_string()
            } else {
                n.to_string()
            }
        }
        Value::String(s) => serde_json::to_string(s).expect("string escaping is infallible"),
        Value::Array(arr) => {
            let elements: Vec<String> = arr.iter().map(canonicalize_json).collect();
            format!("[{}]", elements.join(","))
        }
        Value::Object(obj) => {
            let mut keys: Vec<&String> = obj.keys().collect();
            keys.sort();
            let pairs: Vec<String> = keys
                .iter()
                .map(|k| {
                    format!(
                        "{}:{}",
                        serde_json::to_string(k).expect("string escaping is infallible"),
                        canonicalize_json(&obj[*k])
                    )
                })
                .collect();
            format!("{{{}}}", pairs.join(","))
        }
    }
}

/// Split a `ga4gh:<prefix>.<digest>` CURIE into its prefix and 32-character
/// digest, if well formed.
pub fn parse_ga4gh_curie(curie: &str) -> Option<(&str, &str)> {
    let rest = curie.strip_prefix("ga4gh:")?;
    let (prefix, digest) = rest.split_once('.')?;
    if prefix.is_empty() || digest.len() != 32 {
        return None;
    }
    if !digest
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        return None;
    }
    Some((prefix, digest))
}

fn identifier(prefix: &str, digest: &str) -> String {
    format!("ga4gh:{prefix}.{digest}")
}

// === Digest serialization (allow-list per type) ===

fn sequence_reference_digest_value(accession: &str) -> Value {
    json!({
        "refgetAccession": accession,
        "type": "SequenceReference",
    })
}

fn location_digest_value(loc: &SequenceLocation) -> Value {
    json!({
        "end": loc.end.to_json(),
        "sequenceReference": sequence_reference_digest_value(loc.refget_accession()),
        "start": loc.start.to_json(),
        "type": "SequenceLocation",
    })
}

fn state_digest_value(state: &SequenceExpression) -> Value {
    match state {
        SequenceExpression::Literal(lse) => json!({
            "sequence": lse.sequence,
            "type": "LiteralSequenceExpression",
        }),
        SequenceExpression::ReferenceLength(rle) => json!({
            "length": rle.length,
            "repeatSubunitLength": rle.repeat_subunit_length,
            "type": "ReferenceLengthExpression",
        }),
        SequenceExpression::Length(le) => match &le.length {
            Some(len) => json!({ "length": len.to_json(), "type": "LengthExpression" }),
            None => json!({ "type": "LengthExpression" }),
        },
    }
}

/// The digest of a location slot: inlined locations are digested in place,
/// references must carry a well-formed `ga4gh:` identifier.
fn location_ref_digest(location: &LocationRef) -> Result<String> {
    match location {
        LocationRef::Inlined(loc) => location_digest(loc),
        LocationRef::Referenced(id) => parse_ga4gh_curie(id)
            .map(|(_, digest)| digest.to_string())
            .ok_or_else(|| {
                VrsError::Serialization(format!(
                    "location reference {id:?} is not a ga4gh computed identifier"
                ))
            }),
    }
}

/// Check a literal state against the alphabet declared by the enclosing
/// location's sequence reference, when there is one.
fn check_state_alphabet(location: &LocationRef, state: &SequenceExpression) -> Result<()> {
    let alphabet = match location.as_inlined().and_then(|l| l.sequence_reference.residue_alphabet) {
        Some(a) => a,
        None => return Ok(()),
    };
    if let Some(sequence) = state.sequence() {
        for (offset, b) in sequence.bytes().enumerate() {
            if !alphabet.contains(b) {
                return Err(VrsError::InvalidAlphabet {
                    residue: b as char,
                    offset,
                    alphabet: alphabet.as_str(),
                });
            }
        }
    }
    Ok(())
}

/// Compute the digest of a SequenceLocation.
pub fn location_digest(loc: &SequenceLocation) -> Result<String> {
    Ok(sha512t24u(canonicalize_json(&location_digest_value(loc))))
}

/// Compute the digest of an Allele.
pub fn allele_digest(allele: &Allele) -> Result<String> {
    check_state_alphabet(&allele.location, &allele.state)?;
    let v = json!({
        "location": location_ref_digest(&allele.location)?,
        "state": state_digest_value(&allele.state),
        "type": "Allele",
    });
    Ok(sha512t24u(canonicalize_json(&v)))
}

/// Compute the digest of a CopyNumberCount.
pub fn copy_number_count_digest(cnc: &CopyNumberCount) -> Result<String> {
    let v = json!({
        "copies": cnc.copies.to_json(),
        "location": location_ref_digest(&cnc.location)?,
        "type": "CopyNumberCount",
    });
    Ok(sha512t24u(canonicalize_json(&v)))
}

/// Compute the digest of a CopyNumberChange.
pub fn copy_number_change_digest(cnx: &CopyNumberChange) -> Result<String> {
    let v = json!({
        "copyChange": cnx.copy_change.code(),
        "location": location_ref_digest(&cnx.location)?,
        "type": "CopyNumberChange",
    });
    Ok(sha512t24u(canonicalize_json(&v)))
}

/// Compute the full computed identifier for a SequenceLocation.
pub fn location_identifier(loc: &SequenceLocation) -> Result<String> {
    Ok(identifier("SL", &location_digest(loc)?))
}

/// Compute the full computed identifier for an Allele.
pub fn allele_identifier(allele: &Allele) -> Result<String> {
    Ok(identifier("VA", &allele_digest(allele)?))
}

/// Compute the digest of any identifiable object.
pub fn object_digest(obj: &VrsObject) -> Result<String> {
    match obj {
        VrsObject::Allele(a) => allele_digest(a),
        VrsObject::CopyNumberCount(c) => copy_number_count_digest(c),
        VrsObject::CopyNumberChange(c) => copy_number_change_digest(c),
        VrsObject::SequenceLocation(l) => location_digest(l),
    }
}

// === Identifier assignment (strictly bottom-up) ===

/// Populate `digest` and (when absent) `id` on a location; returns the
/// computed identifier.
pub fn identify_location(loc: &mut SequenceLocation) -> Result<String> {
    let digest = location_digest(loc)?;
    let id = identifier("SL", &digest);
    loc.digest = Some(digest);
    if loc.id.is_none() {
        loc.id = Some(id.clone());
    }
    Ok(id)
}

fn identify_location_ref(location: &mut LocationRef) -> Result<()> {
    if let LocationRef::Inlined(loc) = location {
        identify_location(loc)?;
    }
    Ok(())
}

fn assign(
    prefix: &str,
    digest: String,
    digest_slot: &mut Option<String>,
    id_slot: &mut Option<String>,
) -> String {
    let id = identifier(prefix, &digest);
    *digest_slot = Some(digest);
    if id_slot.is_none() {
        *id_slot = Some(id.clone());
    }
    id
}

fn identify_allele(a: &mut Allele) -> Result<String> {
    identify_location_ref(&mut a.location)?;
    let digest = allele_digest(a)?;
    Ok(assign("VA", digest, &mut a.digest, &mut a.id))
}

fn identify_copy_number_count(c: &mut CopyNumberCount) -> Result<String> {
    identify_location_ref(&mut c.location)?;
    let digest = copy_number_count_digest(c)?;
    Ok(assign("CN", digest, &mut c.digest, &mut c.id))
}

fn identify_copy_number_change(c: &mut CopyNumberChange) -> Result<String> {
    identify_location_ref(&mut c.location)?;
    let digest = copy_number_change_digest(c)?;
    Ok(assign("CX", digest, &mut c.digest, &mut c.id))
}

/// Populate identifiers on a variation, children first; returns the
/// top-level computed identifier.
pub fn identify(v: &mut Variation) -> Result<String> {
    match v {
        Variation::Allele(a) => identify_allele(a),
        Variation::CopyNumberCount(c) => identify_copy_number_count(c),
        Variation::CopyNumberChange(c) => identify_copy_number_change(c),
    }
}

/// Populate identifiers on any identifiable object; returns the computed
/// identifier.
pub fn identify_object(obj: &mut VrsObject) -> Result<String> {
    match obj {
        VrsObject::SequenceLocation(loc) => identify_location(loc),
        VrsObject::Allele(a) => identify_allele(a),
        VrsObject::CopyNumberCount(c) => identify_copy_number_count(c),
        VrsObject::CopyNumberChange(c) => identify_copy_number_change(c),
    }
}

// === Hot path ===

/// Reusable digest writer that avoids per-call allocations.
///
/// Writes canonical JSON for the location/allele pair straight into a
/// scratch buffer. Accessions are `SQ.` + base64url and literal states are
/// uppercase residues, so neither needs JSON escaping; the unit tests
/// assert equivalence with the generic path.
pub struct DigestWriter {
    buf: Vec<u8>,
}

impl DigestWriter {
    pub fn new() -> Self {
        DigestWriter {
            buf: Vec::with_capacity(512),
        }
    }

    /// `ga4gh:VA.<digest>` for an allele with a literal state at a definite
    /// interval. For range coordinates or non-literal states use the
    /// generic [`allele_identifier`].
    pub fn literal_allele_identifier(
        &mut self,
        refget_accession: &str,
        start: u64,
        end: u64,
        sequence: &str,
    ) -> String {
        let mut itoa_buf = itoa::Buffer::new();

        self.buf.clear();
        self.buf.extend_from_slice(b"{\"end\":");
        self.buf.extend_from_slice(itoa_buf.format(end).as_bytes());
        self.buf
            .extend_from_slice(b",\"sequenceReference\":{\"refgetAccession\":\"");
        self.buf.extend_from_slice(refget_accession.as_bytes());
        self.buf
            .extend_from_slice(b"\",\"type\":\"SequenceReference\"},\"start\":");
        self.buf.extend_from_slice(itoa_buf.format(start).as_bytes());
        self.buf.extend_from_slice(b",\"type\":\"SequenceLocation\"}");
        let location_digest = sha512t24u(&self.buf);

        self.buf.clear();
        self.buf.extend_from_slice(b"{\"location\":\"");
        self.buf.extend_from_slice(location_digest.as_bytes());
        self.buf.extend_from_slice(b"\",\"state\":{\"sequence\":\"");
        self.buf.extend_from_slice(sequence.as_bytes());
        self.buf
            .extend_from_slice(b"\",\"type\":\"LiteralSequenceExpression\"},\"type\":\"Allele\"}");
        let allele_digest = sha512t24u(&self.buf);

        identifier("VA", &allele_digest)
    }
}

impl Default for DigestWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ResidueAlphabet, SequenceReference};

    fn snv(accession: &str, start: u64, end: u64, alt: &str) -> Allele {
        Allele::new(
            SequenceLocation::new(SequenceReference::new(accession), start, end),
            SequenceExpression::literal(alt),
        )
    }

    #[test]
    fn sha512t24u_known_answers() {
        assert_eq!(sha512t24u(""), "z4PhNX7vuL3xVChQ1m2AB9Yg5AULVxXc");
        assert_eq!(sha512t24u("ACGT"), "aKF498dAxcJAqme6QYQ7EZ07-fiw8Kw2");
    }

    #[test]
    fn canonical_json_sorts_keys_and_strips_whitespace() {
        let v = json!({"b": 1, "a": {"d": 2, "c": [3, 4]}});
        assert_eq!(canonicalize_json(&v), r#"{"a":{"c":[3,4],"d":2},"b":1}"#);
    }

    #[test]
    fn location_digest_rs7412() {
        let loc = SequenceLocation::new(
            SequenceReference::new("SQ.IIB53T8CNeJJdUqzn9V_JnRtQadwWCbl"),
            44908821u64,
            44908822u64,
        );
        assert_eq!(
            location_digest(&loc).unwrap(),
            "wIlaGykfwHIpPY2Fcxtbx4TINbbODFVz"
        );
    }

    #[test]
    fn allele_identifier_rs7412() {
        let allele = snv("SQ.IIB53T8CNeJJdUqzn9V_JnRtQadwWCbl", 44908821, 44908822, "T");
        assert_eq!(
            allele_identifier(&allele).unwrap(),
            "ga4gh:VA.0AePZIWZUNsUlQTamyLrjm2HWUw2opLt"
        );
    }

    #[test]
    fn allele_identifier_with_rle_state() {
        let allele = Allele::new(
            SequenceLocation::new(
                SequenceReference::new("SQ.Ya6Rs7DHhDeg7YaOSg1EoNi3U_nQ9SvO"),
                40819438u64,
                40819446u64,
            ),
            SequenceExpression::ReferenceLength(crate::models::ReferenceLengthExpression {
                length: 11,
                repeat_subunit_length: 3,
                sequence: None,
            }),
        );
        assert_eq!(
            allele_identifier(&allele).unwrap(),
            "ga4gh:VA.Oop4kjdTtKcg1kiZjIJAAR3bp7qi4aNT"
        );
    }

    #[test]
    fn rle_convenience_sequence_does_not_change_digest() {
        let bare = Allele::new(
            SequenceLocation::new(
                SequenceReference::new("SQ.Ya6Rs7DHhDeg7YaOSg1EoNi3U_nQ9SvO"),
                40819438u64,
                40819446u64,
            ),
            SequenceExpression::ReferenceLength(crate::models::ReferenceLengthExpression {
                length: 11,
                repeat_subunit_length: 3,
                sequence: None,
            }),
        );
        let mut with_seq = bare.clone();
        if let SequenceExpression::ReferenceLength(rle) = &mut with_seq.state {
            rle.sequence = Some("TAATAATAATA".to_string());
        }
        assert_eq!(
            allele_digest(&bare).unwrap(),
            allele_digest(&with_seq).unwrap()
        );
    }

    #[test]
    fn annotation_fields_do_not_contribute() {
        let plain = snv("SQ.IIB53T8CNeJJdUqzn9V_JnRtQadwWCbl", 44908821, 44908822, "T");
        let mut annotated = plain.clone();
        annotated.label = Some("rs7412".to_string());
        annotated.description = Some("APOE e2 variant".to_string());
        annotated.id = Some("clinvar:17848".to_string());
        if let LocationRef::Inlined(loc) = &mut annotated.location {
            loc.label = Some("APOE region".to_string());
        }
        assert_eq!(
            allele_digest(&plain).unwrap(),
            allele_digest(&annotated).unwrap()
        );
    }

    #[test]
    fn referenced_location_digests_like_inlined() {
        let inlined = snv("SQ.IIB53T8CNeJJdUqzn9V_JnRtQadwWCbl", 44908821, 44908822, "T");
        let mut referenced = inlined.clone();
        let loc_id = location_identifier(inlined.location.as_inlined().unwrap()).unwrap();
        referenced.location = LocationRef::Referenced(loc_id);
        assert_eq!(
            allele_digest(&inlined).unwrap(),
            allele_digest(&referenced).unwrap()
        );
    }

    #[test]
    fn malformed_reference_is_a_serialization_error() {
        let mut allele = snv("SQ.IIB53T8CNeJJdUqzn9V_JnRtQadwWCbl", 44908821, 44908822, "T");
        allele.location = LocationRef::Referenced("refseq:NC_000019.10".to_string());
        assert!(matches!(
            allele_digest(&allele),
            Err(VrsError::Serialization(_))
        ));
    }

    #[test]
    fn alphabet_violation_is_rejected() {
        let mut reference = SequenceReference::new("SQ.IIB53T8CNeJJdUqzn9V_JnRtQadwWCbl");
        reference.residue_alphabet = Some(ResidueAlphabet::Na);
        let allele = Allele::new(
            SequenceLocation::new(reference, 10u64, 11u64),
            SequenceExpression::literal("TQ"),
        );
        assert!(matches!(
            allele_digest(&allele),
            Err(VrsError::InvalidAlphabet { residue: 'Q', offset: 1, .. })
        ));
    }

    #[test]
    fn copy_number_change_digest_uses_efo_code() {
        let cnx = CopyNumberChange::new(
            SequenceLocation::new(
                SequenceReference::new("SQ.eK4D2MosgK_ivBkgi6FVPg5UXs1bYESm"),
                45002866u64,
                45015056u64,
            ),
            crate::models::CopyChange::Loss,
        );
        let mut v = Variation::CopyNumberChange(cnx);
        assert_eq!(
            identify(&mut v).unwrap(),
            "ga4gh:CX.XQt04FoCIptvgp6GtE2qjEaUJC7cr1wo"
        );
    }

    #[test]
    fn identify_assigns_bottom_up() {
        let mut v = Variation::Allele(snv(
            "SQ.aUiQCzCPZ2d0csHbMSbh2NzInhonSXwI",
            80656488,
            80656489,
            "T",
        ));
        let id = identify(&mut v).unwrap();
        assert_eq!(id, "ga4gh:VA.ebezGL6HoAhtGJyVnB_mE5BH18ntKev4");
        let Variation::Allele(a) = &v else { unreachable!() };
        assert_eq!(a.id.as_deref(), Some("ga4gh:VA.ebezGL6HoAhtGJyVnB_mE5BH18ntKev4"));
        let loc = a.location.as_inlined().unwrap();
        assert_eq!(loc.id.as_deref(), Some("ga4gh:SL.JiLRuuyS5wefF_6-Vw7m3Yoqqb2YFkss"));
        assert_eq!(loc.digest.as_deref(), Some("JiLRuuyS5wefF_6-Vw7m3Yoqqb2YFkss"));
    }

    #[test]
    fn fast_path_matches_generic_path() {
        let allele = snv("SQ.F-LrLMe1SRpfUZHkQmvkVKFEGaoDeHul", 55181319, 55181320, "T");
        let generic = allele_identifier(&allele).unwrap();
        let mut writer = DigestWriter::new();
        let fast = writer.literal_allele_identifier(
            "SQ.F-LrLMe1SRpfUZHkQmvkVKFEGaoDeHul",
            55181319,
            55181320,
            "T",
        );
        assert_eq!(generic, fast);
        assert_eq!(fast, "ga4gh:VA.Hy2XU_-rp4IMh6I_1NXNecBo8Qx8n0oE");
    }

    #[test]
    fn curie_parsing() {
        assert_eq!(
            parse_ga4gh_curie("ga4gh:VA.ebezGL6HoAhtGJyVnB_mE5BH18ntKev4"),
            Some(("VA", "ebezGL6HoAhtGJyVnB_mE5BH18ntKev4"))
        );
        assert_eq!(parse_ga4gh_curie("refseq:NC_000019.10"), None);
        assert_eq!(parse_ga4gh_curie("ga4gh:VA.short"), None);
    }
}
