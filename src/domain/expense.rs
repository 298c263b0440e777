use super::error::ValidationError;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a deductible expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseType {
    Health,
    Education,
    PrivatePension,
    Alimony,
    Other,
}

impl fmt::Display for ExpenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExpenseType::Health => "HEALTH",
            ExpenseType::Education => "EDUCATION",
            ExpenseType::PrivatePension => "PRIVATE_PENSION",
            ExpenseType::Alimony => "ALIMONY",
            ExpenseType::Other => "OTHER",
        };
        f.write_str(s)
    }
}

/// An expense that reduces the calculation base.
///
/// The description is free text and may be blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeductibleExpense {
    id: Option<i64>,
    description: String,
    #[serde(rename = "type")]
    expense_type: ExpenseType,
    value: Decimal,
}

impl DeductibleExpense {
    pub fn new(
        description: impl Into<String>,
        expense_type: ExpenseType,
        value: Decimal,
    ) -> Result<Self, ValidationError> {
        if value <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveExpense(value));
        }
        Ok(DeductibleExpense {
            id: None,
            description: description.into(),
            expense_type,
            value,
        })
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn expense_type(&self) -> ExpenseType {
        self.expense_type
    }

    pub fn value(&self) -> Decimal {
        self.value
    }
}
