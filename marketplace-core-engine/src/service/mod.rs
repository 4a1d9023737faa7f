pub mod approval;
pub mod audit;
pub mod disbursement;
pub mod milestone;
pub mod payment;
pub mod settlement;
pub mod ticket;

// Re-exports
pub use approval::*;
pub use milestone::*;
pub use payment::*;
pub use settlement::*;
pub use ticket::*;
