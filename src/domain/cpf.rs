use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const CPF_LENGTH: usize = 11;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CpfError {
    #[error("CPF cannot be empty")]
    Empty,
    #[error("CPF must contain exactly 11 digits, found {0}")]
    WrongLength(usize),
    #[error("CPF cannot have all digits equal")]
    RepeatedDigits,
    #[error("CPF check digits do not match")]
    InvalidCheckDigits,
}

/// Brazilian individual taxpayer number (Cadastro de Pessoas Físicas).
///
/// Always holds the 11 normalized digits, so two CPFs written with and
/// without the `000.000.000-00` mask compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cpf(String);

impl Cpf {
    pub fn parse(raw: &str) -> Result<Self, CpfError> {
        if raw.trim().is_empty() {
            return Err(CpfError::Empty);
        }

        let digits: Vec<u32> = raw.chars().filter_map(|c| c.to_digit(10)).collect();
        if digits.len() != CPF_LENGTH {
            return Err(CpfError::WrongLength(digits.len()));
        }
        if digits.iter().all(|d| *d == digits[0]) {
            return Err(CpfError::RepeatedDigits);
        }

        let first = check_digit(&digits[..9]);
        let second = check_digit(&digits[..10]);
        if digits[9] != first || digits[10] != second {
            return Err(CpfError::InvalidCheckDigits);
        }

        let normalized = digits
            .iter()
            .filter_map(|d| char::from_digit(*d, 10))
            .collect();
        Ok(Cpf(normalized))
    }

    /// The 11 normalized digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Conventional `000.000.000-00` rendering.
    pub fn formatted(&self) -> String {
        let s = &self.0;
        format!("{}.{}.{}-{}", &s[..3], &s[3..6], &s[6..9], &s[9..])
    }
}

/// Weighted sum mod 11 where the first weight is `digits.len() + 1`.
fn check_digit(digits: &[u32]) -> u32 {
    let top = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top - i as u32))
        .sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

impl FromStr for Cpf {
    type Err = CpfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cpf::parse(s)
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Cpf {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
