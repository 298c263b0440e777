//! Income, expense and dependent commands

use crate::cmd::display::{print_dependents, print_expenses, print_incomes};
use crate::cmd::open_service;
use crate::domain::{
    Cpf, DeclarationId, DeductibleExpense, Dependent, ExpenseType, Income, IncomeType,
};
use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum IncomeTypeArg {
    Salary,
    SelfEmployment,
    Rental,
    Pension,
    Dividends,
    Other,
}

impl From<IncomeTypeArg> for IncomeType {
    fn from(arg: IncomeTypeArg) -> Self {
        match arg {
            IncomeTypeArg::Salary => IncomeType::Salary,
            IncomeTypeArg::SelfEmployment => IncomeType::SelfEmployment,
            IncomeTypeArg::Rental => IncomeType::Rental,
            IncomeTypeArg::Pension => IncomeType::Pension,
            IncomeTypeArg::Dividends => IncomeType::Dividends,
            IncomeTypeArg::Other => IncomeType::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExpenseTypeArg {
    Health,
    Education,
    PrivatePension,
    Alimony,
    Other,
}

impl From<ExpenseTypeArg> for ExpenseType {
    fn from(arg: ExpenseTypeArg) -> Self {
        match arg {
            ExpenseTypeArg::Health => ExpenseType::Health,
            ExpenseTypeArg::Education => ExpenseType::Education,
            ExpenseTypeArg::PrivatePension => ExpenseType::PrivatePension,
            ExpenseTypeArg::Alimony => ExpenseType::Alimony,
            ExpenseTypeArg::Other => ExpenseType::Other,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum IncomeCommand {
    /// Add an income to a declaration
    Add {
        /// Declaration id
        declaration: DeclarationId,
        /// Who paid the income (employer, tenant, ...)
        #[arg(short, long)]
        source: String,
        #[arg(short = 't', long = "type", value_enum, default_value_t = IncomeTypeArg::Salary)]
        income_type: IncomeTypeArg,
        #[arg(short, long)]
        value: Decimal,
    },
    /// Remove an income by id
    Remove {
        /// Declaration id
        declaration: DeclarationId,
        /// Income id
        id: i64,
    },
    /// Add every income of a CSV file (paying_source,type,value)
    Import {
        /// Declaration id
        declaration: DeclarationId,
        /// CSV file with a header row
        #[arg(short, long)]
        file: PathBuf,
    },
}

impl IncomeCommand {
    pub fn exec(&self, store: &Path) -> anyhow::Result<()> {
        let mut service = open_service(store)?;
        let declaration = match self {
            IncomeCommand::Add {
                declaration,
                source,
                income_type,
                value,
            } => {
                let income = Income::new(source.as_str(), (*income_type).into(), *value)?;
                service.add_income(*declaration, income)?
            }
            IncomeCommand::Remove { declaration, id } => {
                service.remove_income(*declaration, Some(*id))?
            }
            IncomeCommand::Import { declaration, file } => {
                let reader = BufReader::new(File::open(file)?);
                service.import_incomes(*declaration, reader)?
            }
        };
        print_incomes(declaration.incomes());
        Ok(())
    }
}

#[derive(Subcommand, Debug)]
pub enum ExpenseCommand {
    /// Add a deductible expense to a declaration
    Add {
        /// Declaration id
        declaration: DeclarationId,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short = 't', long = "type", value_enum)]
        expense_type: ExpenseTypeArg,
        #[arg(short, long)]
        value: Decimal,
    },
    /// Remove a deductible expense by id
    Remove {
        /// Declaration id
        declaration: DeclarationId,
        /// Expense id
        id: i64,
    },
}

impl ExpenseCommand {
    pub fn exec(&self, store: &Path) -> anyhow::Result<()> {
        let mut service = open_service(store)?;
        let declaration = match self {
            ExpenseCommand::Add {
                declaration,
                description,
                expense_type,
                value,
            } => {
                let expense =
                    DeductibleExpense::new(description.as_str(), (*expense_type).into(), *value)?;
                service.add_deductible_expense(*declaration, expense)?
            }
            ExpenseCommand::Remove { declaration, id } => {
                service.remove_deductible_expense(*declaration, Some(*id))?
            }
        };
        print_expenses(declaration.deductible_expenses());
        Ok(())
    }
}

#[derive(Subcommand, Debug)]
pub enum DependentCommand {
    /// Add a dependent to a declaration
    Add {
        /// Declaration id
        declaration: DeclarationId,
        #[arg(short, long)]
        name: String,
        /// CPF, with or without the 000.000.000-00 mask
        #[arg(short, long)]
        cpf: String,
        /// Birth date (YYYY-MM-DD)
        #[arg(short, long)]
        birth_date: NaiveDate,
    },
    /// Remove a dependent by id
    Remove {
        /// Declaration id
        declaration: DeclarationId,
        /// Dependent id
        id: i64,
    },
}

impl DependentCommand {
    pub fn exec(&self, store: &Path) -> anyhow::Result<()> {
        let mut service = open_service(store)?;
        let declaration = match self {
            DependentCommand::Add {
                declaration,
                name,
                cpf,
                birth_date,
            } => {
                let dependent = Dependent::new(name.as_str(), Cpf::parse(cpf)?, *birth_date);
                service.add_dependent(*declaration, dependent)?
            }
            DependentCommand::Remove { declaration, id } => {
                service.remove_dependent(*declaration, Some(*id))?
            }
        };
        print_dependents(declaration.dependents());
        Ok(())
    }
}
