//! Storage backends implementing the domain ports. The engine is
//! storage-agnostic; the in-memory backend is the reference implementation.

pub mod in_memory;
