pub mod cpf;
pub mod declaration;
pub mod dependent;
pub mod error;
pub mod expense;
pub mod income;
pub mod snapshot;

// Flat public surface for domain types.
pub use cpf::{Cpf, CpfError};
pub use declaration::{Declaration, DeclarationId, DeclarationStatus};
pub use dependent::Dependent;
pub use error::{
    DeclarationError, EntryKind, ErrorKind, NotFoundError, StateError, ValidationError,
};
pub use expense::{DeductibleExpense, ExpenseType};
pub use income::{Income, IncomeType};
pub use snapshot::{DeclarationSnapshot, DependentRecord, ExpenseRecord, IncomeRecord};
