//! Store implementations. The document store itself is an external
//! collaborator; [`memory::MemoryStore`] is the in-process reference
//! implementation of the repository traits.

pub mod memory;

pub use memory::MemoryStore;
