use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// One band of the progressive table.
///
/// Tax for a base inside the band is `base * rate - deduction`, where the
/// deduction folds in the lower bands so no cumulative walk is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TaxBracket {
    /// Inclusive upper limit of the band, absent for the top band
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub upper_bound: Option<Decimal>,
    /// Marginal rate as a fraction (0.075 = 7.5%)
    #[schemars(with = "f64")]
    pub rate: Decimal,
    /// Fixed amount subtracted after applying the rate
    #[schemars(with = "f64")]
    pub deduction: Decimal,
}

/// Annual table (values in BRL)
const ANNUAL_BRACKETS: [TaxBracket; 5] = [
    TaxBracket {
        upper_bound: Some(dec!(24511.92)),
        rate: dec!(0),
        deduction: dec!(0),
    },
    TaxBracket {
        upper_bound: Some(dec!(33919.80)),
        rate: dec!(0.075),
        deduction: dec!(1838.39),
    },
    TaxBracket {
        upper_bound: Some(dec!(45012.60)),
        rate: dec!(0.15),
        deduction: dec!(4382.38),
    },
    TaxBracket {
        upper_bound: Some(dec!(55976.16)),
        rate: dec!(0.225),
        deduction: dec!(7953.24),
    },
    TaxBracket {
        upper_bound: None,
        rate: dec!(0.275),
        deduction: dec!(10752.05),
    },
];

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum BracketTableError {
    #[error("bracket table cannot be empty")]
    Empty,
    #[error("only the last bracket may be unbounded (bracket {0})")]
    UnboundedBeforeLast(usize),
    #[error("the last bracket must be unbounded")]
    BoundedLast,
    #[error("upper bounds must be strictly ascending (bracket {0})")]
    NotAscending(usize),
    #[error("rate must be between 0 and 1 (bracket {0})")]
    InvalidRate(usize),
    #[error("deduction cannot be negative (bracket {0})")]
    NegativeDeduction(usize),
}

/// Immutable, validated, ascending list of brackets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct BracketTable {
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, BracketTableError> {
        let last = brackets.len().checked_sub(1).ok_or(BracketTableError::Empty)?;
        let mut previous: Option<Decimal> = None;

        for (i, bracket) in brackets.iter().enumerate() {
            let number = i + 1;
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(BracketTableError::InvalidRate(number));
            }
            if bracket.deduction < Decimal::ZERO {
                return Err(BracketTableError::NegativeDeduction(number));
            }
            match (bracket.upper_bound, i == last) {
                (None, false) => return Err(BracketTableError::UnboundedBeforeLast(number)),
                (Some(_), true) => return Err(BracketTableError::BoundedLast),
                (Some(bound), false) => {
                    if previous.is_some_and(|p| bound <= p) {
                        return Err(BracketTableError::NotAscending(number));
                    }
                    previous = Some(bound);
                }
                (None, true) => {}
            }
        }

        Ok(BracketTable { brackets })
    }

    /// The annual table shared by every default calculation.
    pub fn annual() -> &'static BracketTable {
        static ANNUAL: OnceLock<BracketTable> = OnceLock::new();
        ANNUAL.get_or_init(|| BracketTable {
            brackets: ANNUAL_BRACKETS.to_vec(),
        })
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// First bracket whose upper bound is at or above `base`.
    pub fn bracket_for(&self, base: Decimal) -> &TaxBracket {
        let last = &self.brackets[self.brackets.len() - 1];
        self.brackets
            .iter()
            .find(|b| b.upper_bound.is_some_and(|upper| base <= upper))
            .unwrap_or(last)
    }
}

impl TryFrom<Vec<TaxBracket>> for BracketTable {
    type Error = BracketTableError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        BracketTable::new(brackets)
    }
}

impl From<BracketTable> for Vec<TaxBracket> {
    fn from(table: BracketTable) -> Self {
        table.brackets
    }
}
