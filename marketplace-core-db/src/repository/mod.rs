pub mod approval_log_repository;
pub mod attachment_repository;
pub mod contract_repository;
pub mod party_repository;
pub mod ticket_repository;
pub mod transaction_repository;

// Re-exports
pub use approval_log_repository::*;
pub use attachment_repository::*;
pub use contract_repository::*;
pub use party_repository::*;
pub use ticket_repository::*;
pub use transaction_repository::*;
