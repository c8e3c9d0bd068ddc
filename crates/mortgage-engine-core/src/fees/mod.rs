//! Fee and insurance rule tables: PMI, FHA MIP and the VA funding fee.
//!
//! Each table is an explicit, ordered list of `(threshold, value)` pairs.
//! Lookups are boundary-inclusive and never interpolate. A key outside the
//! documented range is clamped to the nearest bracket and reported as a
//! warning; [`BracketTable::lookup_strict`] refuses it instead.

pub mod fha;
pub mod pmi;
pub mod va;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MortgageError;
use crate::MortgageResult;

/// How a key is compared against bracket thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bound {
    /// `key <= threshold`; thresholds ascending. Keys above the last clamp.
    AtMost,
    /// `key >= threshold`; thresholds descending. Keys below the last clamp.
    AtLeast,
}

#[derive(Debug, Clone, Copy)]
pub struct BracketTable<V: 'static> {
    pub name: &'static str,
    pub bound: Bound,
    pub brackets: &'static [(Decimal, V)],
}

/// The bracket a key resolved to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BracketMatch<V> {
    pub threshold: Decimal,
    pub value: V,
    /// The key was outside the table and snapped to the nearest bracket.
    pub clamped: bool,
}

impl<V: Copy> BracketTable<V> {
    pub const fn new(name: &'static str, bound: Bound, brackets: &'static [(Decimal, V)]) -> Self {
        BracketTable {
            name,
            bound,
            brackets,
        }
    }

    /// Resolve `key`, clamping out-of-range keys to the nearest bracket.
    pub fn lookup(&self, key: Decimal) -> MortgageResult<BracketMatch<V>> {
        let hit = self.brackets.iter().find(|(threshold, _)| match self.bound {
            Bound::AtMost => key <= *threshold,
            Bound::AtLeast => key >= *threshold,
        });
        if let Some(&(threshold, value)) = hit {
            return Ok(BracketMatch {
                threshold,
                value,
                clamped: false,
            });
        }
        match self.brackets.last() {
            Some(&(threshold, value)) => Ok(BracketMatch {
                threshold,
                value,
                clamped: true,
            }),
            None => Err(self.unsupported(key)),
        }
    }

    /// Resolve `key`, rejecting keys outside the table.
    pub fn lookup_strict(&self, key: Decimal) -> MortgageResult<BracketMatch<V>> {
        let hit = self.lookup(key)?;
        if hit.clamped {
            return Err(self.unsupported(key));
        }
        Ok(hit)
    }

    /// [`lookup`](Self::lookup), recording a warning when the key was clamped.
    pub fn lookup_or_warn(&self, key: Decimal, warnings: &mut Vec<String>) -> MortgageResult<V> {
        let hit = self.lookup(key)?;
        if hit.clamped {
            log::warn!("{} key {} clamped to {}", self.name, key, hit.threshold);
            warnings.push(format!(
                "{} of {} is outside the table; using the {} bracket",
                self.name, key, hit.threshold
            ));
        }
        Ok(hit.value)
    }

    fn unsupported(&self, key: Decimal) -> MortgageError {
        MortgageError::UnsupportedBracket {
            table: self.name.into(),
            key: key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const UP_TO: BracketTable<u8> = BracketTable::new(
        "test ascending",
        Bound::AtMost,
        &[(dec!(10), 1), (dec!(20), 2), (dec!(30), 3)],
    );

    const AT_LEAST: BracketTable<u8> = BracketTable::new(
        "test descending",
        Bound::AtLeast,
        &[(dec!(10), 3), (dec!(5), 2), (dec!(0), 1)],
    );

    const EMPTY: BracketTable<u8> = BracketTable::new("empty", Bound::AtMost, &[]);

    #[test]
    fn test_at_most_is_boundary_inclusive() {
        assert_eq!(UP_TO.lookup(dec!(10)).unwrap().value, 1);
        assert_eq!(UP_TO.lookup(dec!(10.01)).unwrap().value, 2);
        assert_eq!(UP_TO.lookup(dec!(-5)).unwrap().value, 1);
    }

    #[test]
    fn test_at_least_is_boundary_inclusive() {
        assert_eq!(AT_LEAST.lookup(dec!(10)).unwrap().value, 3);
        assert_eq!(AT_LEAST.lookup(dec!(9.99)).unwrap().value, 2);
        assert_eq!(AT_LEAST.lookup(dec!(5)).unwrap().value, 2);
        assert_eq!(AT_LEAST.lookup(dec!(4.99)).unwrap().value, 1);
    }

    #[test]
    fn test_out_of_range_clamps() {
        let hit = UP_TO.lookup(dec!(45)).unwrap();
        assert_eq!(hit.value, 3);
        assert!(hit.clamped);
        let hit = AT_LEAST.lookup(dec!(-1)).unwrap();
        assert_eq!(hit.value, 1);
        assert!(hit.clamped);
    }

    #[test]
    fn test_strict_rejects_out_of_range() {
        let err = UP_TO.lookup_strict(dec!(45)).unwrap_err();
        assert!(matches!(err, MortgageError::UnsupportedBracket { .. }));
        assert!(UP_TO.lookup_strict(dec!(30)).is_ok());
    }

    #[test]
    fn test_lookup_or_warn_records_clamp() {
        let mut warnings = Vec::new();
        assert_eq!(UP_TO.lookup_or_warn(dec!(15), &mut warnings).unwrap(), 2);
        assert!(warnings.is_empty());
        assert_eq!(UP_TO.lookup_or_warn(dec!(31), &mut warnings).unwrap(), 3);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_empty_table_is_unsupported() {
        assert!(EMPTY.lookup(dec!(1)).is_err());
    }
}
