use crate::domain::{
    Declaration, DeclarationError, DeclarationId, DeclarationStatus, DeductibleExpense,
    Dependent, Income, IncomeType, ValidationError,
};
use crate::store::{DeclarationRepository, StoreError};
use crate::tax::{CalculationError, TaxCalculationResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("declaration not found with id: {0}")]
    NotFound(DeclarationId),
    #[error("a declaration for taxpayer {taxpayer_id} and year {year} already exists")]
    AlreadyExists { taxpayer_id: Uuid, year: i32 },
    #[error(transparent)]
    Declaration(#[from] DeclarationError),
    #[error(transparent)]
    Calculation(#[from] CalculationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("income import row {row}: {source}")]
    ImportRow {
        row: usize,
        #[source]
        source: ValidationError,
    },
    #[error("income import row {row}: invalid amount '{value}'")]
    ImportAmount { row: usize, value: String },
    #[error("income import: {0}")]
    Csv(#[from] csv::Error),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Declaration(err.into())
    }
}

/// Entry of a taxpayer's filing history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub id: Option<DeclarationId>,
    pub year: i32,
    pub status: DeclarationStatus,
}

/// CSV row for bulk income import
#[derive(Debug, Deserialize)]
struct IncomeRow {
    paying_source: String,
    #[serde(rename = "type")]
    income_type: IncomeType,
    value: String,
}

/// Loads a declaration, applies one operation and saves it back.
pub struct DeclarationService<R> {
    repository: R,
}

impl<R: DeclarationRepository> DeclarationService<R> {
    pub fn new(repository: R) -> Self {
        DeclarationService { repository }
    }

    pub fn create(&mut self, taxpayer_id: Uuid, year: i32) -> Result<Declaration, ServiceError> {
        if self
            .repository
            .exists_by_taxpayer_and_year(taxpayer_id, year)?
        {
            return Err(ServiceError::AlreadyExists { taxpayer_id, year });
        }
        let declaration = Declaration::new(taxpayer_id, year)?;
        let saved = self.save(&declaration)?;
        log::info!(
            "Created declaration {:?} for taxpayer {} year {}",
            saved.id(),
            taxpayer_id,
            year
        );
        Ok(saved)
    }

    pub fn get(&self, id: DeclarationId) -> Result<Declaration, ServiceError> {
        let snapshot = self
            .repository
            .find_by_id(id)?
            .ok_or(ServiceError::NotFound(id))?;
        Ok(Declaration::from_snapshot(snapshot)?)
    }

    pub fn add_income(
        &mut self,
        id: DeclarationId,
        income: Income,
    ) -> Result<Declaration, ServiceError> {
        self.update(id, |d| d.add_income(income))
    }

    pub fn remove_income(
        &mut self,
        id: DeclarationId,
        income_id: Option<i64>,
    ) -> Result<Declaration, ServiceError> {
        self.update(id, |d| d.remove_income(income_id))
    }

    pub fn add_deductible_expense(
        &mut self,
        id: DeclarationId,
        expense: DeductibleExpense,
    ) -> Result<Declaration, ServiceError> {
        self.update(id, |d| d.add_deductible_expense(expense))
    }

    pub fn remove_deductible_expense(
        &mut self,
        id: DeclarationId,
        expense_id: Option<i64>,
    ) -> Result<Declaration, ServiceError> {
        self.update(id, |d| d.remove_deductible_expense(expense_id))
    }

    pub fn add_dependent(
        &mut self,
        id: DeclarationId,
        dependent: Dependent,
    ) -> Result<Declaration, ServiceError> {
        self.update(id, |d| d.add_dependent(dependent))
    }

    pub fn remove_dependent(
        &mut self,
        id: DeclarationId,
        dependent_id: Option<i64>,
    ) -> Result<Declaration, ServiceError> {
        self.update(id, |d| d.remove_dependent(dependent_id))
    }

    pub fn submit(&mut self, id: DeclarationId) -> Result<Declaration, ServiceError> {
        let delivered = self.update(id, Declaration::submit)?;
        log::info!(
            "Declaration {} delivered at {:?}",
            id,
            delivered.delivery_date()
        );
        Ok(delivered)
    }

    pub fn calculate(&self, id: DeclarationId) -> Result<TaxCalculationResult, ServiceError> {
        Ok(self.get(id)?.calculate_tax()?)
    }

    pub fn history(&self, taxpayer_id: Uuid) -> Result<Vec<HistoryEntry>, ServiceError> {
        let entries = self
            .repository
            .find_all_by_taxpayer(taxpayer_id)?
            .into_iter()
            .map(|s| HistoryEntry {
                id: s.id,
                year: s.year,
                status: s.status,
            })
            .collect();
        Ok(entries)
    }

    /// Add every income of a `paying_source,type,value` CSV. Rows are all
    /// validated before the declaration is touched.
    pub fn import_incomes<Rd: Read>(
        &mut self,
        id: DeclarationId,
        reader: Rd,
    ) -> Result<Declaration, ServiceError> {
        let mut incomes = Vec::new();
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        for (i, row) in rdr.deserialize::<IncomeRow>().enumerate() {
            let row = row?;
            let value = Decimal::from_str(&row.value).map_err(|_| ServiceError::ImportAmount {
                row: i + 1,
                value: row.value.clone(),
            })?;
            let income = Income::new(row.paying_source, row.income_type, value)
                .map_err(|source| ServiceError::ImportRow { row: i + 1, source })?;
            incomes.push(income);
        }
        log::info!("Read {} income records", incomes.len());

        self.update(id, |d| {
            incomes
                .into_iter()
                .try_for_each(|income| d.add_income(income))
        })
    }

    fn update<F>(&mut self, id: DeclarationId, op: F) -> Result<Declaration, ServiceError>
    where
        F: FnOnce(&mut Declaration) -> Result<(), DeclarationError>,
    {
        let mut declaration = self.get(id)?;
        op(&mut declaration)?;
        self.save(&declaration)
    }

    fn save(&mut self, declaration: &Declaration) -> Result<Declaration, ServiceError> {
        let saved = self.repository.save(declaration.to_snapshot())?;
        Ok(Declaration::from_snapshot(saved)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Cpf, ErrorKind, ExpenseType, StateError};
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn service() -> DeclarationService<MemoryStore> {
        DeclarationService::new(MemoryStore::new())
    }

    fn salary(value: Decimal) -> Income {
        Income::new("Company A", IncomeType::Salary, value).unwrap()
    }

    fn declaration_error(err: ServiceError) -> DeclarationError {
        match err {
            ServiceError::Declaration(e) => e,
            other => panic!("expected declaration error, got {other:?}"),
        }
    }

    #[test]
    fn create_assigns_id() {
        let mut service = service();
        let declaration = service.create(Uuid::new_v4(), 2024).unwrap();
        assert_eq!(declaration.id(), Some(1));
        assert!(declaration.is_editing());
    }

    #[test]
    fn create_rejects_same_taxpayer_and_year() {
        let mut service = service();
        let taxpayer = Uuid::new_v4();
        service.create(taxpayer, 2024).unwrap();

        let err = service.create(taxpayer, 2024).unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists { year: 2024, .. }));

        // other year and other taxpayer are fine
        service.create(taxpayer, 2023).unwrap();
        service.create(Uuid::new_v4(), 2024).unwrap();
    }

    #[test]
    fn create_rejects_invalid_year() {
        let err = service().create(Uuid::new_v4(), 99).unwrap_err();
        assert_eq!(
            declaration_error(err),
            DeclarationError::Validation(ValidationError::InvalidYear(99))
        );
    }

    #[test]
    fn unknown_declaration_is_not_found() {
        let mut service = service();
        assert!(matches!(service.get(42), Err(ServiceError::NotFound(42))));
        assert!(matches!(
            service.add_income(42, salary(dec!(1))),
            Err(ServiceError::NotFound(42))
        ));
    }

    #[test]
    fn added_entries_receive_ids() {
        let mut service = service();
        let id = service.create(Uuid::new_v4(), 2024).unwrap().id().unwrap();

        let d = service.add_income(id, salary(dec!(50000))).unwrap();
        let income_id = d.incomes()[0].id();
        assert!(income_id.is_some());

        let d = service.remove_income(id, income_id).unwrap();
        assert!(d.incomes().is_empty());

        let err = service.remove_income(id, income_id).unwrap_err();
        assert_eq!(declaration_error(err).kind(), ErrorKind::NotFound);
    }

    #[test]
    fn expenses_and_dependents_round_trip() {
        let mut service = service();
        let id = service.create(Uuid::new_v4(), 2024).unwrap().id().unwrap();

        let expense =
            DeductibleExpense::new("Consulta médica", ExpenseType::Health, dec!(350.00)).unwrap();
        let d = service.add_deductible_expense(id, expense).unwrap();
        let expense_id = d.deductible_expenses()[0].id();

        let dependent = Dependent::new(
            "Maria Silva",
            Cpf::parse("753.838.240-22").unwrap(),
            NaiveDate::from_ymd_opt(2010, 5, 15).unwrap(),
        );
        let d = service.add_dependent(id, dependent.clone()).unwrap();
        let dependent_id = d.dependents()[0].id();

        let err = service.add_dependent(id, dependent).unwrap_err();
        assert_eq!(declaration_error(err).kind(), ErrorKind::Validation);

        service.remove_deductible_expense(id, expense_id).unwrap();
        let d = service.remove_dependent(id, dependent_id).unwrap();
        assert!(d.deductible_expenses().is_empty());
        assert!(d.dependents().is_empty());
    }

    #[test]
    fn submit_persists_delivery() {
        let mut service = service();
        let id = service.create(Uuid::new_v4(), 2024).unwrap().id().unwrap();

        let err = service.submit(id).unwrap_err();
        assert_eq!(
            declaration_error(err),
            DeclarationError::State(StateError::NoIncomes)
        );

        service.add_income(id, salary(dec!(1000))).unwrap();
        service.submit(id).unwrap();

        let stored = service.get(id).unwrap();
        assert_eq!(stored.status(), DeclarationStatus::Delivered);
        assert!(stored.delivery_date().is_some());

        let err = service.add_income(id, salary(dec!(1))).unwrap_err();
        assert_eq!(declaration_error(err).kind(), ErrorKind::State);
        assert_eq!(service.get(id).unwrap().incomes().len(), 1);
    }

    #[test]
    fn calculate_uses_stored_totals() {
        let mut service = service();
        let id = service.create(Uuid::new_v4(), 2024).unwrap().id().unwrap();
        service.add_income(id, salary(dec!(60000.00))).unwrap();
        let expense =
            DeductibleExpense::new("School", ExpenseType::Education, dec!(5000.00)).unwrap();
        service.add_deductible_expense(id, expense).unwrap();

        let result = service.calculate(id).unwrap();
        assert_eq!(result.calculation_base, dec!(55000.00));
        assert_eq!(result.tax_due, dec!(4421.76));
    }

    #[test]
    fn history_lists_years_in_order() {
        let mut service = service();
        let taxpayer = Uuid::new_v4();
        let later = service.create(taxpayer, 2024).unwrap().id().unwrap();
        service.create(taxpayer, 2023).unwrap();
        service.create(Uuid::new_v4(), 2022).unwrap();
        service.add_income(later, salary(dec!(1))).unwrap();
        service.submit(later).unwrap();

        let history = service.history(taxpayer).unwrap();
        let summary: Vec<_> = history.iter().map(|h| (h.year, h.status)).collect();
        assert_eq!(
            summary,
            vec![
                (2023, DeclarationStatus::Editing),
                (2024, DeclarationStatus::Delivered)
            ]
        );
    }

    #[test]
    fn import_incomes_from_csv() {
        let mut service = service();
        let id = service.create(Uuid::new_v4(), 2024).unwrap().id().unwrap();
        let csv = "paying_source,type,value\nCompany A,SALARY,40000.00\nTenant, RENTAL ,12000\n";

        let d = service.import_incomes(id, csv.as_bytes()).unwrap();
        assert_eq!(d.incomes().len(), 2);
        assert_eq!(d.incomes()[1].income_type(), IncomeType::Rental);
        assert_eq!(d.calculate_total_income(), dec!(52000.00));
    }

    #[test]
    fn import_is_all_or_nothing() {
        let mut service = service();
        let id = service.create(Uuid::new_v4(), 2024).unwrap().id().unwrap();
        let csv = "paying_source,type,value\nCompany A,SALARY,100\nCompany B,SALARY,-5\n";

        let err = service.import_incomes(id, csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::ImportRow {
                row: 2,
                source: ValidationError::NegativeIncome(_)
            }
        ));
        assert!(service.get(id).unwrap().incomes().is_empty());
    }

    #[test]
    fn import_reports_malformed_amount() {
        let mut service = service();
        let id = service.create(Uuid::new_v4(), 2024).unwrap().id().unwrap();
        let csv = "paying_source,type,value\nCompany A,SALARY,1.000,00\n";

        let err = service.import_incomes(id, csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ServiceError::Csv(_)));

        let csv = "paying_source,type,value\nCompany A,SALARY,abc\n";
        let err = service.import_incomes(id, csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ServiceError::ImportAmount { row: 1, .. }));
    }
}
