//! Declaration lifecycle commands

use crate::cmd::display::{
    format_brl, print_calculation, print_declaration, write_incomes_csv,
};
use crate::cmd::open_service;
use crate::domain::DeclarationId;
use clap::Args;
use rust_decimal::Decimal;
use std::io;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use uuid::Uuid;

#[derive(Args, Debug)]
pub struct NewCommand {
    /// Taxpayer identifier (UUID)
    #[arg(short, long)]
    taxpayer: Uuid,

    /// Calendar year being declared
    #[arg(short, long)]
    year: i32,
}

impl NewCommand {
    pub fn exec(&self, store: &Path) -> anyhow::Result<()> {
        let mut service = open_service(store)?;
        let declaration = service.create(self.taxpayer, self.year)?;
        println!(
            "Created declaration {} for year {}",
            declaration.id().unwrap_or_default(),
            declaration.year()
        );
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ShowCommand {
    /// Declaration id
    id: DeclarationId,

    /// Output as JSON instead of formatted tables
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Output the incomes as CSV, in the `income import` format
    #[arg(long)]
    csv: bool,
}

impl ShowCommand {
    pub fn exec(&self, store: &Path) -> anyhow::Result<()> {
        let declaration = open_service(store)?.get(self.id)?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&declaration)?);
        } else if self.csv {
            write_incomes_csv(declaration.incomes(), io::stdout())?;
        } else {
            print_declaration(&declaration);
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct HistoryCommand {
    /// Taxpayer identifier (UUID)
    #[arg(short, long)]
    taxpayer: Uuid,

    /// Output as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Tabled)]
struct HistoryRow {
    #[tabled(rename = "#")]
    id: String,
    #[tabled(rename = "Year")]
    year: i32,
    #[tabled(rename = "Status")]
    status: String,
}

impl HistoryCommand {
    pub fn exec(&self, store: &Path) -> anyhow::Result<()> {
        let history = open_service(store)?.history(self.taxpayer)?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&history)?);
            return Ok(());
        }
        if history.is_empty() {
            println!("No declarations found for taxpayer {}", self.taxpayer);
            return Ok(());
        }
        let rows = history.iter().map(|h| HistoryRow {
            id: h.id.map_or("-".to_string(), |id| id.to_string()),
            year: h.year,
            status: h.status.to_string(),
        });
        println!("{}", Table::new(rows).with(Style::rounded()));
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct SubmitCommand {
    /// Declaration id
    id: DeclarationId,
}

impl SubmitCommand {
    pub fn exec(&self, store: &Path) -> anyhow::Result<()> {
        let mut service = open_service(store)?;
        let declaration = service.submit(self.id)?;
        let delivered = declaration
            .delivery_date()
            .map(|d| d.to_rfc3339())
            .unwrap_or_default();
        println!("Declaration {} delivered at {}", self.id, delivered);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct CalculateCommand {
    /// Declaration id
    id: DeclarationId,

    /// Tax already withheld at source, used for the final balance
    #[arg(short, long)]
    withheld: Option<Decimal>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl CalculateCommand {
    pub fn exec(&self, store: &Path) -> anyhow::Result<()> {
        let mut result = open_service(store)?.calculate(self.id)?;
        if let Some(withheld) = self.withheld {
            result = result.apply_withholding(withheld)?;
        }
        log::info!(
            "Declaration {} tax due {}",
            self.id,
            format_brl(result.tax_due)
        );

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_calculation(&result);
        }
        Ok(())
    }
}
