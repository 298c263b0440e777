use super::brackets::BracketTable;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CalculationError {
    #[error("total income cannot be negative: {0}")]
    NegativeIncome(Decimal),
    #[error("total deductions cannot be negative: {0}")]
    NegativeDeductions(Decimal),
    #[error("final balance overflows after withholding {0}")]
    BalanceOverflow(Decimal),
}

/// Outcome of a progressive tax calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxCalculationResult {
    pub total_income: Decimal,
    pub total_deductions: Decimal,
    pub calculation_base: Decimal,
    pub tax_due: Decimal,
    /// Realized average rate in percent, `tax_due / total_income * 100`
    pub effective_aliquot: Decimal,
    /// Amount still owed; equals `tax_due` unless overridden
    pub final_balance: Decimal,
}

impl TaxCalculationResult {
    fn exempt(total_income: Decimal, total_deductions: Decimal) -> Self {
        TaxCalculationResult {
            total_income,
            total_deductions,
            calculation_base: Decimal::ZERO,
            tax_due: Decimal::ZERO,
            effective_aliquot: Decimal::ZERO,
            final_balance: Decimal::ZERO,
        }
    }

    pub fn with_final_balance(self, final_balance: Decimal) -> Self {
        TaxCalculationResult {
            final_balance,
            ..self
        }
    }

    /// Balance after tax already withheld at source. Negative means refund.
    pub fn apply_withholding(self, withheld: Decimal) -> Result<Self, CalculationError> {
        let balance = self
            .tax_due
            .checked_sub(withheld)
            .ok_or(CalculationError::BalanceOverflow(withheld))?;
        Ok(self.with_final_balance(balance))
    }
}

/// Applies a bracket table to declaration totals.
#[derive(Debug, Clone, Copy)]
pub struct ProgressiveTaxCalculator<'a> {
    table: &'a BracketTable,
}

impl<'a> ProgressiveTaxCalculator<'a> {
    pub fn new(table: &'a BracketTable) -> Self {
        ProgressiveTaxCalculator { table }
    }

    pub fn calculate(
        &self,
        total_income: Decimal,
        total_deductions: Decimal,
    ) -> Result<TaxCalculationResult, CalculationError> {
        if total_income < Decimal::ZERO {
            return Err(CalculationError::NegativeIncome(total_income));
        }
        if total_deductions < Decimal::ZERO {
            return Err(CalculationError::NegativeDeductions(total_deductions));
        }

        let base = total_income - total_deductions;
        if base <= Decimal::ZERO {
            log::debug!(
                "Calculation base {} not positive, no tax due (income {}, deductions {})",
                base,
                total_income,
                total_deductions
            );
            return Ok(TaxCalculationResult::exempt(total_income, total_deductions));
        }

        let bracket = self.table.bracket_for(base);
        let mut tax_due = (base * bracket.rate - bracket.deduction)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        tax_due.rescale(2);

        // base > 0 with non-negative deductions implies total_income > 0
        let mut effective_aliquot = (tax_due / total_income * dec!(100))
            .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
        effective_aliquot.rescale(4);

        log::debug!(
            "Base {} in bracket rate {} deduction {}: tax due {}, aliquot {}%",
            base,
            bracket.rate,
            bracket.deduction,
            tax_due,
            effective_aliquot
        );

        Ok(TaxCalculationResult {
            total_income,
            total_deductions,
            calculation_base: base,
            tax_due,
            effective_aliquot,
            final_balance: tax_due,
        })
    }
}

impl Default for ProgressiveTaxCalculator<'static> {
    fn default() -> Self {
        ProgressiveTaxCalculator::new(BracketTable::annual())
    }
}

/// Calculate tax due with the annual bracket table
pub fn calculate_tax(
    total_income: Decimal,
    total_deductions: Decimal,
) -> Result<TaxCalculationResult, CalculationError> {
    ProgressiveTaxCalculator::default().calculate(total_income, total_deductions)
}
