//! Beacon expressions: `<chr> : <pos> <ref> > <alt>`, whitespace-tolerant.

use vrs_core::{Result, VrsError};

/// One parsed Beacon expression, coordinates still 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaconExpression {
    pub chromosome: String,
    pub position: u64,
    pub reference: String,
    pub alternate: String,
}

impl BeaconExpression {
    pub fn parse(expr: &str) -> Result<Self> {
        // All whitespace is decorative.
        let compact: String = expr.chars().filter(|c| !c.is_whitespace()).collect();
        let err = || {
            VrsError::InvalidInput(format!(
                "beacon expression {expr:?} does not match `chr : pos ref > alt`"
            ))
        };

        let (chromosome, rest) = compact.split_once(':').ok_or_else(err)?;
        if chromosome.is_empty() {
            return Err(err());
        }
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        let position: u64 = digits.parse().map_err(|_| err())?;
        if position == 0 {
            return Err(err());
        }
        let (reference, alternate) = rest[digits.len()..].split_once('>').ok_or_else(err)?;
        if reference.is_empty()
            || alternate.is_empty()
            || !reference.chars().all(|c| c.is_ascii_alphabetic())
            || !alternate.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(err());
        }
        Ok(BeaconExpression {
            chromosome: chromosome.to_string(),
            position,
            reference: reference.to_uppercase(),
            alternate: alternate.to_uppercase(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_spaced_and_compact_forms() {
        for expr in ["5 : 80656489 C > T", "5:80656489C>T", "5 :80656489  C>T"] {
            let b = BeaconExpression::parse(expr).unwrap();
            assert_eq!(b.chromosome, "5");
            assert_eq!(b.position, 80656489);
            assert_eq!(b.reference, "C");
            assert_eq!(b.alternate, "T");
        }
    }

    #[test]
    fn multi_base_alleles() {
        let b = BeaconExpression::parse("19 : 44908822 CG > TA").unwrap();
        assert_eq!((b.start(), b.end()), (44908821, 44908823));
        assert_eq!(b.alternate, "TA");
    }

    #[test]
    fn rejects_malformed_expressions() {
        for expr in [
            "5 80656489 C > T",
            "5 : C > T",
            "5 : 80656489 C T",
            "5 : 0 C > T",
            " : 80656489 C > T",
            "5 : 80656489 > T",
        ] {
            assert!(BeaconExpression::parse(expr).is_err(), "accepted {expr:?}");
        }
    }
}
