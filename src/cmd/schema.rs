//! Schema command - print expected file formats

use crate::store::MemoryStore;
use crate::tax::{BracketTable, TaxBracket};
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// What to print
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema of the declaration store file
    JsonSchema,
    /// JSON Schema of a custom bracket table
    BracketsSchema,
    /// The annual bracket table, usable as a template for --brackets
    Brackets,
    /// CSV header row for income import
    CsvHeader,
    /// CSV column descriptions for income import
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => {
                let schema = schema_for!(MemoryStore);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::BracketsSchema => {
                let schema = schema_for!(Vec<TaxBracket>);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::Brackets => {
                println!("{}", serde_json::to_string_pretty(BracketTable::annual())?);
            }
            SchemaFormat::CsvHeader => {
                let names: Vec<_> = CSV_FIELDS.iter().map(|(name, _)| *name).collect();
                println!("{}", names.join(","));
            }
            SchemaFormat::CsvFields => {
                println!("Income CSV Format");
                println!("=================");
                println!();
                for (name, description) in CSV_FIELDS {
                    println!("{:15} {}", name, description);
                }
            }
        }
        Ok(())
    }
}

const CSV_FIELDS: &[(&str, &str)] = &[
    ("paying_source", "Who paid the income, cannot be blank"),
    (
        "type",
        "SALARY, SELF_EMPLOYMENT, RENTAL, PENSION, DIVIDENDS or OTHER",
    ),
    ("value", "Amount in BRL using a dot as decimal separator, not negative"),
];
