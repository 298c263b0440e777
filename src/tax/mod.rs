pub mod brackets;
pub mod calculator;

pub use brackets::{BracketTable, BracketTableError, TaxBracket};
pub use calculator::{calculate_tax, CalculationError, ProgressiveTaxCalculator, TaxCalculationResult};
