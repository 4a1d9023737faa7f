pub mod actor;
pub mod requests;
pub mod reports;

// Re-exports
pub use actor::*;
pub use requests::*;
pub use reports::*;
