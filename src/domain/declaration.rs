use super::dependent::Dependent;
use super::error::{DeclarationError, EntryKind, NotFoundError, StateError, ValidationError};
use super::expense::DeductibleExpense;
use super::income::Income;
use crate::tax::{calculate_tax, CalculationError, TaxCalculationResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type DeclarationId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeclarationStatus {
    #[default]
    Editing,
    Delivered,
}

impl fmt::Display for DeclarationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationStatus::Editing => f.write_str("EDITING"),
            DeclarationStatus::Delivered => f.write_str("DELIVERED"),
        }
    }
}

/// Annual income tax declaration of a single taxpayer.
///
/// Incomes, expenses and dependents can only change while the declaration is
/// [`DeclarationStatus::Editing`]. Submitting moves it to
/// [`DeclarationStatus::Delivered`] once and stamps the delivery instant.
/// Every operation either fully applies or leaves the declaration untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    id: Option<DeclarationId>,
    taxpayer_id: Uuid,
    year: i32,
    status: DeclarationStatus,
    delivery_date: Option<DateTime<Utc>>,
    incomes: Vec<Income>,
    deductible_expenses: Vec<DeductibleExpense>,
    dependents: Vec<Dependent>,
}

impl Declaration {
    pub fn new(taxpayer_id: Uuid, year: i32) -> Result<Self, ValidationError> {
        validate_year(year)?;
        Ok(Declaration {
            id: None,
            taxpayer_id,
            year,
            status: DeclarationStatus::Editing,
            delivery_date: None,
            incomes: Vec::new(),
            deductible_expenses: Vec::new(),
            dependents: Vec::new(),
        })
    }

    /// Rebuild a declaration with already validated children, bypassing the
    /// editing-only checks so delivered declarations can be loaded.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore(
        id: Option<DeclarationId>,
        taxpayer_id: Uuid,
        year: i32,
        status: DeclarationStatus,
        delivery_date: Option<DateTime<Utc>>,
        incomes: Vec<Income>,
        deductible_expenses: Vec<DeductibleExpense>,
        dependents: Vec<Dependent>,
    ) -> Result<Self, ValidationError> {
        validate_year(year)?;
        checked_total(incomes.iter().map(Income::value))
            .ok_or(ValidationError::TotalOverflow(EntryKind::Income))?;
        checked_total(deductible_expenses.iter().map(DeductibleExpense::value))
            .ok_or(ValidationError::TotalOverflow(EntryKind::DeductibleExpense))?;
        match (status, delivery_date) {
            (DeclarationStatus::Editing, Some(_)) => {
                return Err(ValidationError::InconsistentSnapshot(
                    "editing declaration cannot have a delivery date",
                ))
            }
            (DeclarationStatus::Delivered, None) => {
                return Err(ValidationError::InconsistentSnapshot(
                    "delivered declaration must have a delivery date",
                ))
            }
            _ => {}
        }
        Ok(Declaration {
            id,
            taxpayer_id,
            year,
            status,
            delivery_date,
            incomes,
            deductible_expenses,
            dependents,
        })
    }

    pub fn id(&self) -> Option<DeclarationId> {
        self.id
    }

    pub fn taxpayer_id(&self) -> Uuid {
        self.taxpayer_id
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn status(&self) -> DeclarationStatus {
        self.status
    }

    pub fn delivery_date(&self) -> Option<DateTime<Utc>> {
        self.delivery_date
    }

    pub fn incomes(&self) -> &[Income] {
        &self.incomes
    }

    pub fn deductible_expenses(&self) -> &[DeductibleExpense] {
        &self.deductible_expenses
    }

    pub fn dependents(&self) -> &[Dependent] {
        &self.dependents
    }

    pub fn is_editing(&self) -> bool {
        self.status == DeclarationStatus::Editing
    }

    pub fn add_income(&mut self, income: Income) -> Result<(), DeclarationError> {
        self.calculate_total_income()
            .checked_add(income.value())
            .ok_or(ValidationError::TotalOverflow(EntryKind::Income))?;
        self.ensure_editing("add income to")?;
        self.incomes.push(income);
        Ok(())
    }

    pub fn remove_income(&mut self, income_id: Option<i64>) -> Result<(), DeclarationError> {
        let id = income_id.ok_or(ValidationError::MissingId(EntryKind::Income))?;
        self.ensure_editing("remove income from")?;
        let index = position(&self.incomes, EntryKind::Income, id, Income::id)?;
        self.incomes.remove(index);
        Ok(())
    }

    pub fn add_deductible_expense(
        &mut self,
        expense: DeductibleExpense,
    ) -> Result<(), DeclarationError> {
        self.calculate_total_deductions()
            .checked_add(expense.value())
            .ok_or(ValidationError::TotalOverflow(EntryKind::DeductibleExpense))?;
        self.ensure_editing("add expense to")?;
        self.deductible_expenses.push(expense);
        Ok(())
    }

    pub fn remove_deductible_expense(
        &mut self,
        expense_id: Option<i64>,
    ) -> Result<(), DeclarationError> {
        let id = expense_id.ok_or(ValidationError::MissingId(EntryKind::DeductibleExpense))?;
        self.ensure_editing("remove expense from")?;
        let index = position(
            &self.deductible_expenses,
            EntryKind::DeductibleExpense,
            id,
            DeductibleExpense::id,
        )?;
        self.deductible_expenses.remove(index);
        Ok(())
    }

    /// Add a dependent. The same CPF cannot be declared twice.
    pub fn add_dependent(&mut self, dependent: Dependent) -> Result<(), DeclarationError> {
        self.ensure_editing("add dependent to")?;
        if self.dependents.iter().any(|d| d.cpf() == dependent.cpf()) {
            return Err(ValidationError::DuplicateDependent(dependent.cpf().clone()).into());
        }
        self.dependents.push(dependent);
        Ok(())
    }

    pub fn remove_dependent(&mut self, dependent_id: Option<i64>) -> Result<(), DeclarationError> {
        let id = dependent_id.ok_or(ValidationError::MissingId(EntryKind::Dependent))?;
        self.ensure_editing("remove dependent from")?;
        let index = position(&self.dependents, EntryKind::Dependent, id, Dependent::id)?;
        self.dependents.remove(index);
        Ok(())
    }

    pub fn submit(&mut self) -> Result<(), DeclarationError> {
        self.submit_at(Utc::now())
    }

    /// Deliver the declaration, recording `delivered_at` as the delivery date.
    pub fn submit_at(&mut self, delivered_at: DateTime<Utc>) -> Result<(), DeclarationError> {
        self.ensure_editing("submit")?;
        if self.incomes.is_empty() {
            return Err(StateError::NoIncomes.into());
        }
        self.status = DeclarationStatus::Delivered;
        self.delivery_date = Some(delivered_at);
        Ok(())
    }

    /// Sum of income values. Adding an income that would overflow the
    /// total is rejected, so this never saturates in practice.
    pub fn calculate_total_income(&self) -> Decimal {
        checked_total(self.incomes.iter().map(Income::value)).unwrap_or(Decimal::MAX)
    }

    pub fn calculate_total_deductions(&self) -> Decimal {
        checked_total(self.deductible_expenses.iter().map(DeductibleExpense::value))
            .unwrap_or(Decimal::MAX)
    }

    pub fn calculate_tax(&self) -> Result<TaxCalculationResult, CalculationError> {
        calculate_tax(
            self.calculate_total_income(),
            self.calculate_total_deductions(),
        )
    }

    fn ensure_editing(&self, action: &'static str) -> Result<(), StateError> {
        if self.is_editing() {
            Ok(())
        } else {
            Err(StateError::NotEditing { action })
        }
    }
}

fn validate_year(year: i32) -> Result<(), ValidationError> {
    if (1000..=9999).contains(&year) {
        Ok(())
    } else {
        Err(ValidationError::InvalidYear(year))
    }
}

fn checked_total(values: impl Iterator<Item = Decimal>) -> Option<Decimal> {
    values.fold(Some(Decimal::ZERO), |acc, v| acc?.checked_add(v))
}

fn position<T>(
    entries: &[T],
    kind: EntryKind,
    id: i64,
    entry_id: impl Fn(&T) -> Option<i64>,
) -> Result<usize, NotFoundError> {
    entries
        .iter()
        .position(|e| entry_id(e) == Some(id))
        .ok_or(NotFoundError { kind, id })
}
