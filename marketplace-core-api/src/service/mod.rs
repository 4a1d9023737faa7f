pub mod auth_gate;
pub mod notifier;

// Re-exports
pub use auth_gate::*;
pub use notifier::*;
