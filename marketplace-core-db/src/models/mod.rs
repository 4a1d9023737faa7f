pub mod approval_log;
pub mod attachment;
pub mod common_enums;
pub mod contract;
pub mod identifiable;
pub mod party;
pub mod ticket;
pub mod transaction;

// Re-exports
pub use approval_log::*;
pub use attachment::*;
pub use common_enums::*;
pub use contract::*;
pub use identifiable::*;
pub use party::*;
pub use ticket::*;
pub use transaction::*;
