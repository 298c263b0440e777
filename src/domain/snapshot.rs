//! Persisted form of a declaration.
//!
//! Snapshots are plain serde records with no invariants of their own. Turning
//! one back into a [`Declaration`] re-validates every child entry.

use super::cpf::Cpf;
use super::declaration::{Declaration, DeclarationId, DeclarationStatus};
use super::dependent::Dependent;
use super::error::ValidationError;
use super::expense::{DeductibleExpense, ExpenseType};
use super::income::{Income, IncomeType};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IncomeRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub paying_source: String,
    #[serde(rename = "type")]
    pub income_type: IncomeType,
    #[schemars(with = "f64")]
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExpenseRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    #[schemars(with = "f64")]
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DependentRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    /// CPF digits, with or without the `000.000.000-00` mask
    pub cpf: String,
    pub birth_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DeclarationSnapshot {
    /// Assigned by the repository on first save
    #[serde(default)]
    pub id: Option<DeclarationId>,
    #[schemars(with = "String")]
    pub taxpayer_id: Uuid,
    pub year: i32,
    #[serde(default)]
    pub status: DeclarationStatus,
    /// RFC 3339 instant the declaration was delivered
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub delivery_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub incomes: Vec<IncomeRecord>,
    #[serde(default)]
    pub deductible_expenses: Vec<ExpenseRecord>,
    #[serde(default)]
    pub dependents: Vec<DependentRecord>,
}

impl From<&Income> for IncomeRecord {
    fn from(income: &Income) -> Self {
        IncomeRecord {
            id: income.id(),
            paying_source: income.paying_source().to_string(),
            income_type: income.income_type(),
            value: income.value(),
        }
    }
}

impl TryFrom<IncomeRecord> for Income {
    type Error = ValidationError;

    fn try_from(record: IncomeRecord) -> Result<Self, Self::Error> {
        let income = Income::new(record.paying_source, record.income_type, record.value)?;
        Ok(match record.id {
            Some(id) => income.with_id(id),
            None => income,
        })
    }
}

impl From<&DeductibleExpense> for ExpenseRecord {
    fn from(expense: &DeductibleExpense) -> Self {
        ExpenseRecord {
            id: expense.id(),
            description: expense.description().to_string(),
            expense_type: expense.expense_type(),
            value: expense.value(),
        }
    }
}

impl TryFrom<ExpenseRecord> for DeductibleExpense {
    type Error = ValidationError;

    fn try_from(record: ExpenseRecord) -> Result<Self, Self::Error> {
        let expense =
            DeductibleExpense::new(record.description, record.expense_type, record.value)?;
        Ok(match record.id {
            Some(id) => expense.with_id(id),
            None => expense,
        })
    }
}

impl From<&Dependent> for DependentRecord {
    fn from(dependent: &Dependent) -> Self {
        DependentRecord {
            id: dependent.id(),
            name: dependent.name().to_string(),
            cpf: dependent.cpf().to_string(),
            birth_date: dependent.birth_date(),
        }
    }
}

impl TryFrom<DependentRecord> for Dependent {
    type Error = ValidationError;

    fn try_from(record: DependentRecord) -> Result<Self, Self::Error> {
        let cpf = Cpf::parse(&record.cpf)?;
        let dependent = Dependent::new(record.name, cpf, record.birth_date);
        Ok(match record.id {
            Some(id) => dependent.with_id(id),
            None => dependent,
        })
    }
}

impl Declaration {
    pub fn to_snapshot(&self) -> DeclarationSnapshot {
        DeclarationSnapshot {
            id: self.id(),
            taxpayer_id: self.taxpayer_id(),
            year: self.year(),
            status: self.status(),
            delivery_date: self.delivery_date(),
            incomes: self.incomes().iter().map(IncomeRecord::from).collect(),
            deductible_expenses: self
                .deductible_expenses()
                .iter()
                .map(ExpenseRecord::from)
                .collect(),
            dependents: self.dependents().iter().map(DependentRecord::from).collect(),
        }
    }

    pub fn from_snapshot(snapshot: DeclarationSnapshot) -> Result<Self, ValidationError> {
        let incomes = snapshot
            .incomes
            .into_iter()
            .map(Income::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let expenses = snapshot
            .deductible_expenses
            .into_iter()
            .map(DeductibleExpense::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let dependents = snapshot
            .dependents
            .into_iter()
            .map(Dependent::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::new();
        for dependent in &dependents {
            if !seen.insert(dependent.cpf()) {
                return Err(ValidationError::DuplicateDependent(dependent.cpf().clone()));
            }
        }

        Declaration::restore(
            snapshot.id,
            snapshot.taxpayer_id,
            snapshot.year,
            snapshot.status,
            snapshot.delivery_date,
            incomes,
            expenses,
            dependents,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cpf::CpfError;
    use crate::domain::error::EntryKind;
    use rust_decimal_macros::dec;

    fn sample() -> Declaration {
        let mut d = Declaration::new(Uuid::new_v4(), 2024).unwrap();
        d.add_income(
            Income::new("Company A", IncomeType::Salary, dec!(50000.00))
                .unwrap()
                .with_id(1),
        )
        .unwrap();
        d.add_deductible_expense(
            DeductibleExpense::new("Consulta médica", ExpenseType::Health, dec!(350.00))
                .unwrap()
                .with_id(2),
        )
        .unwrap();
        d.add_dependent(
            Dependent::new(
                "Carlos Pereira",
                Cpf::parse("753.838.240-22").unwrap(),
                NaiveDate::from_ymd_opt(2015, 3, 20).unwrap(),
            )
            .with_id(3),
        )
        .unwrap();
        d
    }

    #[test]
    fn snapshot_restores_same_declaration() {
        let declaration = sample();
        let restored = Declaration::from_snapshot(declaration.to_snapshot()).unwrap();
        assert_eq!(restored, declaration);
    }

    #[test]
    fn delivered_snapshot_can_be_restored() {
        let mut declaration = sample();
        declaration.submit().unwrap();

        let json = serde_json::to_string(&declaration.to_snapshot()).unwrap();
        let snapshot: DeclarationSnapshot = serde_json::from_str(&json).unwrap();
        let restored = Declaration::from_snapshot(snapshot).unwrap();

        assert_eq!(restored.status(), DeclarationStatus::Delivered);
        assert_eq!(restored.delivery_date(), declaration.delivery_date());
    }

    #[test]
    fn snapshot_uses_enum_names() {
        let json = serde_json::to_value(sample().to_snapshot()).unwrap();
        assert_eq!(json["status"], "EDITING");
        assert_eq!(json["incomes"][0]["type"], "SALARY");
        assert_eq!(json["deductible_expenses"][0]["type"], "HEALTH");
        assert_eq!(json["dependents"][0]["cpf"], "75383824022");
    }

    #[test]
    fn minimal_snapshot_defaults_to_editing() {
        let json = r#"{"taxpayer_id": "6f1c2a8e-3d4b-4c5a-9e7f-1a2b3c4d5e6f", "year": 2024}"#;
        let snapshot: DeclarationSnapshot = serde_json::from_str(json).unwrap();
        let declaration = Declaration::from_snapshot(snapshot).unwrap();
        assert!(declaration.is_editing());
        assert!(declaration.incomes().is_empty());
    }

    #[test]
    fn invalid_children_are_rejected() {
        let mut snapshot = sample().to_snapshot();
        snapshot.incomes[0].value = dec!(-1);
        assert_eq!(
            Declaration::from_snapshot(snapshot),
            Err(ValidationError::NegativeIncome(dec!(-1)))
        );

        let mut snapshot = sample().to_snapshot();
        snapshot.dependents[0].cpf = "11111111111".to_string();
        assert_eq!(
            Declaration::from_snapshot(snapshot),
            Err(ValidationError::InvalidCpf(CpfError::RepeatedDigits))
        );
    }

    #[test]
    fn overflowing_income_total_in_snapshot_is_rejected() {
        let mut snapshot = sample().to_snapshot();
        snapshot.incomes[0].value = Decimal::MAX;
        snapshot.incomes.push(snapshot.incomes[0].clone());
        assert_eq!(
            Declaration::from_snapshot(snapshot),
            Err(ValidationError::TotalOverflow(EntryKind::Income))
        );
    }

    #[test]
    fn duplicate_dependent_cpf_in_snapshot_is_rejected() {
        let mut snapshot = sample().to_snapshot();
        let mut twin = snapshot.dependents[0].clone();
        twin.id = Some(4);
        twin.cpf = "75383824022".to_string();
        snapshot.dependents.push(twin);

        assert!(matches!(
            Declaration::from_snapshot(snapshot),
            Err(ValidationError::DuplicateDependent(_))
        ));
    }
}
