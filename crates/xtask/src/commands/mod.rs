//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod check_catalog;
mod list_powers;
mod simulate;

pub use check_catalog::CheckCatalog;
pub use list_powers::ListPowers;
pub use simulate::Simulate;
