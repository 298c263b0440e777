//! Table rendering shared by the declaration commands

use crate::domain::{Declaration, DeductibleExpense, Dependent, Income, IncomeType};
use crate::tax::TaxCalculationResult;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

pub fn format_brl(amount: Decimal) -> String {
    if amount < Decimal::ZERO {
        format!("-R$ {:.2}", amount.abs())
    } else {
        format!("R$ {:.2}", amount)
    }
}

fn format_id(id: Option<i64>) -> String {
    id.map_or("-".to_string(), |id| id.to_string())
}

#[derive(Debug, Tabled)]
struct IncomeRow {
    #[tabled(rename = "#")]
    id: String,
    #[tabled(rename = "Paying Source")]
    paying_source: String,
    #[tabled(rename = "Type")]
    income_type: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl From<&Income> for IncomeRow {
    fn from(income: &Income) -> Self {
        IncomeRow {
            id: format_id(income.id()),
            paying_source: income.paying_source().to_string(),
            income_type: income.income_type().to_string(),
            value: format_brl(income.value()),
        }
    }
}

#[derive(Debug, Tabled)]
struct ExpenseRow {
    #[tabled(rename = "#")]
    id: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Type")]
    expense_type: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl From<&DeductibleExpense> for ExpenseRow {
    fn from(expense: &DeductibleExpense) -> Self {
        ExpenseRow {
            id: format_id(expense.id()),
            description: expense.description().to_string(),
            expense_type: expense.expense_type().to_string(),
            value: format_brl(expense.value()),
        }
    }
}

#[derive(Debug, Tabled)]
struct DependentRow {
    #[tabled(rename = "#")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "CPF")]
    cpf: String,
    #[tabled(rename = "Birth Date")]
    birth_date: String,
}

impl From<&Dependent> for DependentRow {
    fn from(dependent: &Dependent) -> Self {
        DependentRow {
            id: format_id(dependent.id()),
            name: dependent.name().to_string(),
            cpf: dependent.cpf().formatted(),
            birth_date: dependent.birth_date().format("%Y-%m-%d").to_string(),
        }
    }
}

/// Tables share a four column layout with the amount column last
fn print_rows<T: Tabled>(title: &str, rows: Vec<T>) {
    println!("{}", title);
    if rows.is_empty() {
        println!("  (none)");
    } else {
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(3..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
    }
    println!();
}

pub fn print_incomes(incomes: &[Income]) {
    print_rows("INCOMES", incomes.iter().map(IncomeRow::from).collect());
}

pub fn print_expenses(expenses: &[DeductibleExpense]) {
    print_rows(
        "DEDUCTIBLE EXPENSES",
        expenses.iter().map(ExpenseRow::from).collect(),
    );
}

pub fn print_dependents(dependents: &[Dependent]) {
    print_rows(
        "DEPENDENTS",
        dependents.iter().map(DependentRow::from).collect(),
    );
}

/// Same columns as the income import, so exports can be re-imported
#[derive(Debug, Serialize)]
struct IncomeCsvRow<'a> {
    paying_source: &'a str,
    #[serde(rename = "type")]
    income_type: IncomeType,
    value: Decimal,
}

pub fn write_incomes_csv<W: Write>(incomes: &[Income], writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for income in incomes {
        wtr.serialize(IncomeCsvRow {
            paying_source: income.paying_source(),
            income_type: income.income_type(),
            value: income.value(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_declaration(declaration: &Declaration) {
    println!();
    println!(
        "DECLARATION {} ({})",
        format_id(declaration.id()),
        declaration.year()
    );
    println!("  Taxpayer: {}", declaration.taxpayer_id());
    println!("  Status: {}", declaration.status());
    if let Some(delivered) = declaration.delivery_date() {
        println!("  Delivered: {}", delivered.to_rfc3339());
    }
    println!();

    print_incomes(declaration.incomes());
    print_expenses(declaration.deductible_expenses());
    print_dependents(declaration.dependents());

    println!(
        "Total income: {} | Total deductions: {}",
        format_brl(declaration.calculate_total_income()),
        format_brl(declaration.calculate_total_deductions())
    );
}

pub fn print_calculation(result: &TaxCalculationResult) {
    println!();
    println!("TAX CALCULATION");
    println!("  Total income:      {}", format_brl(result.total_income));
    println!("  Total deductions:  {}", format_brl(result.total_deductions));
    println!("  Calculation base:  {}", format_brl(result.calculation_base));
    println!("  Tax due:           {}", format_brl(result.tax_due));
    println!("  Effective aliquot: {}%", result.effective_aliquot);
    if result.final_balance != result.tax_due {
        let label = if result.final_balance < Decimal::ZERO {
            "Refund"
        } else {
            "Balance due"
        };
        println!("  {}: {}", label, format_brl(result.final_balance.abs()));
    }
}
