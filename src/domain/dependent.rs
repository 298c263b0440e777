use super::cpf::Cpf;
use chrono::NaiveDate;
use serde::Serialize;

/// A person declared as dependent of the taxpayer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependent {
    id: Option<i64>,
    name: String,
    cpf: Cpf,
    birth_date: NaiveDate,
}

impl Dependent {
    pub fn new(name: impl Into<String>, cpf: Cpf, birth_date: NaiveDate) -> Self {
        Dependent {
            id: None,
            name: name.into(),
            cpf,
            birth_date,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cpf(&self) -> &Cpf {
        &self.cpf
    }

    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }
}
