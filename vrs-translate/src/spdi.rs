//! SPDI expressions: `<sequence>:<position>:<deletion>:<insertion>`.
//!
//! The position is interbase (0-based). The deletion operand is either the
//! deleted sequence or its length; the insertion operand is always a
//! sequence. SPDI and VRS share the same normalization, so a normalized
//! allele round-trips losslessly.

use vrs_core::{Result, VrsError};

/// One parsed SPDI expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpdiExpression {
    pub sequence: String,
    pub position: u64,
    pub deletion: Deletion,
    pub insertion: String,
}

/// The deletion operand of an SPDI expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deletion {
    Length(u64),
    Sequence(String),
}

impl Deletion {
    pub fn len(&self) -> u64 {
        match self {
            Deletion::Length(n) => *n,
            Deletion::Sequence(s) => s.len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The stated deleted sequence, when spelled out.
    pub fn sequence(&self) -> Option<&str> {
        match self {
            Deletion::Length(_) => None,
            Deletion::Sequence(s) => Some(s),
        }
    }
}

impl SpdiExpression {
    /// Parse `seq:pos:del:ins`. The sequence field must be non-empty and
    /// colon-free, so exactly four fields are expected.
    pub fn parse(expr: &str) -> Result<Self> {
        let fields: Vec<&str> = expr.split(':').collect();
        let [sequence, position, deletion, insertion] = fields.as_slice() else {
            return Err(VrsError::InvalidInput(format!(
                "SPDI expression {expr:?} must have four colon-separated fields"
            )));
        };
        if sequence.is_empty() {
            return Err(VrsError::InvalidInput(format!(
                "SPDI expression {expr:?} has an empty sequence field"
            )));
        }
        let position: u64 = position.parse().map_err(|_| {
            VrsError::InvalidInput(format!("SPDI position {position:?} is not a number"))
        })?;
        let deletion = if deletion.chars().all(|c| c.is_ascii_digit()) && !deletion.is_empty() {
            Deletion::Length(deletion.parse().expect("checked digits"))
        } else {
            check_residues(deletion, expr)?;
            Deletion::Sequence(deletion.to_uppercase())
        };
        check_residues(insertion, expr)?;
        Ok(SpdiExpression {
            sequence: sequence.to_string(),
            position,
            deletion,
            insertion: insertion.to_uppercase(),
        })
    }

    /// Interbase end of the replaced span.
    pub fn end(&self) -> u64 {
        self.position + self.deletion.len()
    }
}

impl std::fmt::Display for SpdiExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let del = match &self.deletion {
            Deletion::Length(n) => n.to_string(),
            Deletion::Sequence(s) => s.clone(),
        };
        write!(
            f,
            "{}:{}:{}:{}",
            self.sequence, self.position, del, self.insertion
        )
    }
}

fn check_residues(operand: &str, expr: &str) -> Result<()> {
    if let Some(bad) = operand
        .chars()
        .find(|c| !c.is_ascii_alphabetic() && *c != '*' && *c != '-')
    {
        return Err(VrsError::InvalidInput(format!(
            "SPDI expression {expr:?} contains invalid residue {bad:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn parses_sequence_deletion_operand() {
        let spdi = SpdiExpression::parse("NC_000005.10:80656488:C:T").unwrap();
        assert_eq!(spdi.sequence, "NC_000005.10");
        assert_eq!(spdi.position, 80656488);
        assert_eq!(spdi.deletion, Deletion::Sequence("C".to_string()));
        assert_eq!(spdi.insertion, "T");
        assert_eq!(spdi.end(), 80656489);
    }

    #[test]
    fn parses_numeric_deletion_operand() {
        let spdi = SpdiExpression::parse("NC_000013.11:32936731:1:C").unwrap();
        assert_eq!(spdi.deletion, Deletion::Length(1));
        assert_eq!(spdi.deletion.sequence(), None);
        assert_eq!(spdi.end(), 32936732);
    }

    #[test]
    fn parses_empty_operands() {
        // Pure insertion: empty deletion; pure deletion: empty insertion.
        let ins = SpdiExpression::parse("NC_000005.10:100::TT").unwrap();
        assert_eq!(ins.deletion, Deletion::Sequence(String::new()));
        assert_eq!(ins.end(), 100);

        let del = SpdiExpression::parse("NC_000005.10:100:ACG:").unwrap();
        assert_eq!(del.deletion.len(), 3);
        assert!(del.insertion.is_empty());
    }

    #[test]
    fn display_round_trips() {
        for expr in [
            "NC_000005.10:80656488:C:T",
            "NC_000013.11:32936731:3:C",
            "NC_000005.10:100::TT",
        ] {
            assert_eq!(SpdiExpression::parse(expr).unwrap().to_string(), expr);
        }
    }

    #[rstest]
    #[case("NC_000005.10:80656488:C")]
    #[case("NC_000005.10:80656488:C:T:extra")]
    #[case(":80656488:C:T")]
    #[case("NC_000005.10:pos:C:T")]
    #[case("NC_000005.10:1:C:T%")]
    fn rejects_malformed_expressions(#[case] expr: &str) {
        assert!(SpdiExpression::parse(expr).is_err(), "accepted {expr:?}");
    }
}
