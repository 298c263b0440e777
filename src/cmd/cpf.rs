//! CPF command - validate and normalize a taxpayer number

use crate::domain::Cpf;
use clap::Args;

#[derive(Args, Debug)]
pub struct CpfCommand {
    /// CPF to validate, with or without the 000.000.000-00 mask
    value: String,

    /// Print the masked form instead of bare digits
    #[arg(long)]
    formatted: bool,
}

impl CpfCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match Cpf::parse(&self.value) {
            Ok(cpf) if self.formatted => println!("{}", cpf.formatted()),
            Ok(cpf) => println!("{}", cpf),
            Err(e) => {
                eprintln!("Invalid CPF '{}': {}", self.value, e);
                std::process::exit(1);
            }
        }
        Ok(())
    }
}
