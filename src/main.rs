mod cmd;
mod domain;
mod service;
mod store;
mod tax;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "irpf")]
#[command(about = "Brazilian annual income tax declarations (IRPF)", version)]
struct Cli {
    /// Declaration store file
    #[arg(
        long,
        global = true,
        env = "IRPF_STORE",
        default_value = "declarations.json"
    )]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Progressive tax for an income and deductions, without a declaration
    Tax(cmd::tax::TaxCommand),
    /// Validate and format a CPF
    Cpf(cmd::cpf::CpfCommand),
    /// Create a declaration for a taxpayer and year
    New(cmd::declaration::NewCommand),
    /// Show a declaration with its entries
    Show(cmd::declaration::ShowCommand),
    /// List a taxpayer's declarations by year
    History(cmd::declaration::HistoryCommand),
    /// Manage incomes
    #[command(subcommand)]
    Income(cmd::entries::IncomeCommand),
    /// Manage deductible expenses
    #[command(subcommand)]
    Expense(cmd::entries::ExpenseCommand),
    /// Manage dependents
    #[command(subcommand)]
    Dependent(cmd::entries::DependentCommand),
    /// Deliver a declaration, freezing it
    Submit(cmd::declaration::SubmitCommand),
    /// Calculate the tax due for a declaration
    Calculate(cmd::declaration::CalculateCommand),
    /// Print file formats and the annual bracket table
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let store = cli.store.as_path();

    match cli.command {
        Commands::Tax(c) => c.exec(),
        Commands::Cpf(c) => c.exec(),
        Commands::New(c) => c.exec(store),
        Commands::Show(c) => c.exec(store),
        Commands::History(c) => c.exec(store),
        Commands::Income(c) => c.exec(store),
        Commands::Expense(c) => c.exec(store),
        Commands::Dependent(c) => c.exec(store),
        Commands::Submit(c) => c.exec(store),
        Commands::Calculate(c) => c.exec(store),
        Commands::Schema(c) => c.exec(),
    }
}
