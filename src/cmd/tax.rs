//! Tax command - progressive tax over explicit totals

use crate::cmd::display::print_calculation;
use crate::tax::{BracketTable, ProgressiveTaxCalculator};
use clap::Args;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct TaxCommand {
    /// Total taxable income for the year
    #[arg(short, long)]
    income: Decimal,

    /// Total deductible expenses
    #[arg(short, long, default_value = "0")]
    deductions: Decimal,

    /// Tax already withheld at source, used for the final balance
    #[arg(short, long)]
    withheld: Option<Decimal>,

    /// JSON file with a custom bracket table (see `schema brackets`)
    #[arg(short, long)]
    brackets: Option<PathBuf>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl TaxCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let custom = self.brackets.as_deref().map(load_brackets).transpose()?;
        let table = match &custom {
            Some(table) => table,
            None => BracketTable::annual(),
        };

        let mut result =
            ProgressiveTaxCalculator::new(table).calculate(self.income, self.deductions)?;
        if let Some(withheld) = self.withheld {
            result = result.apply_withholding(withheld)?;
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_calculation(&result);
        }
        Ok(())
    }
}

pub fn load_brackets(path: &Path) -> anyhow::Result<BracketTable> {
    let file = File::open(path)?;
    let table: BracketTable = serde_json::from_reader(BufReader::new(file))?;
    log::info!(
        "Loaded {} brackets from {}",
        table.brackets().len(),
        path.display()
    );
    Ok(table)
}
