use super::error::ValidationError;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a declared income
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncomeType {
    Salary,
    SelfEmployment,
    Rental,
    Pension,
    Dividends,
    Other,
}

impl fmt::Display for IncomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IncomeType::Salary => "SALARY",
            IncomeType::SelfEmployment => "SELF_EMPLOYMENT",
            IncomeType::Rental => "RENTAL",
            IncomeType::Pension => "PENSION",
            IncomeType::Dividends => "DIVIDENDS",
            IncomeType::Other => "OTHER",
        };
        f.write_str(s)
    }
}

/// Income received from a single paying source during the calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Income {
    id: Option<i64>,
    paying_source: String,
    #[serde(rename = "type")]
    income_type: IncomeType,
    value: Decimal,
}

impl Income {
    pub fn new(
        paying_source: impl Into<String>,
        income_type: IncomeType,
        value: Decimal,
    ) -> Result<Self, ValidationError> {
        if value < Decimal::ZERO {
            return Err(ValidationError::NegativeIncome(value));
        }
        let paying_source = paying_source.into();
        if paying_source.trim().is_empty() {
            return Err(ValidationError::BlankPayingSource);
        }
        Ok(Income {
            id: None,
            paying_source,
            income_type,
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

    pub fn paying_source(&self) -> &str {
        &self.paying_source
    }

    pub fn income_type(&self) -> IncomeType {
        self.income_type
    }

    pub fn value(&self) -> Decimal {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn creates_valid_income() {
        let income = Income::new("Company A", IncomeType::Salary, dec!(50000.00)).unwrap();
        assert_eq!(income.id(), None);
        assert_eq!(income.paying_source(), "Company A");
        assert_eq!(income.income_type(), IncomeType::Salary);
        assert_eq!(income.value(), dec!(50000.00));
    }

    #[test]
    fn zero_value_is_allowed() {
        assert!(Income::new("Company A", IncomeType::Salary, dec!(0)).is_ok());
    }

    #[test]
    fn negative_value_is_rejected() {
        let err = Income::new("Company A", IncomeType::Salary, dec!(-0.01)).unwrap_err();
        assert_eq!(err, ValidationError::NegativeIncome(dec!(-0.01)));
    }

    #[test]
    fn blank_paying_source_is_rejected() {
        for source in ["", "   ", "\t"] {
            assert_eq!(
                Income::new(source, IncomeType::Salary, dec!(1000)),
                Err(ValidationError::BlankPayingSource)
            );
        }
    }

    #[test]
    fn with_id_keeps_fields() {
        let income = Income::new("Company & Co. Ltda.", IncomeType::Rental, dec!(1000))
            .unwrap()
            .with_id(7);
        assert_eq!(income.id(), Some(7));
        assert_eq!(income.paying_source(), "Company & Co. Ltda.");
    }

    #[test]
    fn display_matches_serialized_name() {
        for income_type in [IncomeType::SelfEmployment, IncomeType::Dividends] {
            let json = serde_json::to_value(income_type).unwrap();
            assert_eq!(json, income_type.to_string());
        }
    }

    #[test]
    fn serializes_type_by_enum_name() {
        let income = Income::new("Company A", IncomeType::SelfEmployment, dec!(10.50)).unwrap();
        let json = serde_json::to_value(&income).unwrap();
        assert_eq!(json["type"], "SELF_EMPLOYMENT");
        assert_eq!(json["value"], "10.50");
        assert_eq!(json["paying_source"], "Company A");
    }
}
