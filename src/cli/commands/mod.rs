//! Command implementations for the CLI, one module per subcommand.

pub mod call;
pub mod index;

pub use call::run_call;
pub use index::run_index;
