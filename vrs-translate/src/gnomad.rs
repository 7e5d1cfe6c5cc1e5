//! gnomAD / VCF-style expressions: `<chr>-<pos>-<ref>-<alt>`.
//!
//! Positions are 1-based; ref and alt are IUPAC nucleotide strings,
//! accepted case-insensitively and uppercased.

use vrs_core::{Result, VrsError};

/// One parsed gnomAD expression, coordinates still 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GnomadExpression {
    pub chromosome: String,
    pub position: u64,
    pub reference: String,
    pub alternate: String,
}

impl GnomadExpression {
    pub fn parse(expr: &str) -> Result<Self> {
        let fields: Vec<&str> = expr.split('-').collect();
        let [chromosome, position, reference, alternate] = fields.as_slice() else {
            return Err(VrsError::InvalidInput(format!(
                "gnomAD expression {expr:?} must have four dash-separated fields"
            )));
        };
        if chromosome.is_empty() {
            return Err(VrsError::InvalidInput(format!(
                "gnomAD expression {expr:?} has an empty chromosome field"
            )));
        }
        let position: u64 = position.parse().map_err(|_| {
            VrsError::InvalidInput(format!("gnomAD position {position:?} is not a number"))
        })?;
        if position == 0 {
            return Err(VrsError::InvalidInput(format!(
                "gnomAD expression {expr:?} uses 1-based positions; 0 is not valid"
            )));
        }
        Ok(GnomadExpression {
            chromosome: chromosome.to_string(),
            position,
            reference: checked_allele(reference, expr)?,
            alternate: checked_allele(alternate, expr)?,
        })
    }

    /// Interbase start of the replaced span.
    pub fn start(&self) -> u64 {
        self.position - 1
    }

    /// Interbase end of the replaced span.
    pub fn end(&self) -> u64 {
        self.start() + self.reference.len() as u64
    }
}

impl std::fmt::Display for GnomadExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.chromosome, self.position, self.reference, self.alternate
        )
    }
}

fn checked_allele(operand: &str, expr: &str) -> Result<String> {
    if operand.is_empty() {
        return Err(VrsError::InvalidInput(format!(
            "gnomAD expression {expr:?} has an empty allele field"
        )));
    }
    let upper = operand.to_uppercase();
    if let Some(bad) = upper
        .bytes()
        .find(|b| !vrs_core::ResidueAlphabet::Na.contains(*b))
    {
        return Err(VrsError::InvalidAlphabet {
            residue: bad as char,
            offset: upper.bytes().position(|b| b == bad).unwrap_or(0),
            alphabet: vrs_core::ResidueAlphabet::Na.as_str(),
        });
    }
    Ok(upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_uppercases() {
        let g = GnomadExpression::parse("5-80656489-c-t").unwrap();
        assert_eq!(g.chromosome, "5");
        assert_eq!(g.position, 80656489);
        assert_eq!(g.reference, "C");
        assert_eq!(g.alternate, "T");
        assert_eq!((g.start(), g.end()), (80656488, 80656489));
    }

    #[test]
    fn multi_base_reference_extends_the_span() {
        let g = GnomadExpression::parse("1-55516887-GA-G").unwrap();
        assert_eq!((g.start(), g.end()), (55516886, 55516888));
    }

    #[test]
    fn rejects_malformed_expressions() {
        for expr in [
            "5-80656489-C",
            "5-80656489-C-T-extra",
            "-80656489-C-T",
            "5-pos-C-T",
            "5-0-C-T",
            "5-10-CQ-T",
            "5-10--T",
        ] {
            assert!(GnomadExpression::parse(expr).is_err(), "accepted {expr:?}");
        }
    }
}
