//! # Storage Module
//!
//! Defines the remote-store abstraction the ledger services talk to.
//!
//! The store is the eventual source of truth; the domain services keep local
//! state on top of it and re-read from it after every write. Two
//! implementations exist:
//!
//! - **HTTP**: `io::http::HttpConnection`, the production REST client
//! - **Memory**: [`memory::MemoryConnection`], an in-process store used by
//!   tests, the offline demo and the stub server
//!
//! ## Design Principles
//!
//! - **Repository Pattern**: One repository per entity family, handed out by a [`Connection`]
//! - **Wire Types at the Boundary**: Stores speak `shared` DTOs in minor units
//! - **Dependency Inversion**: Services are generic over `C: Connection`

pub mod memory;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

pub use memory::MemoryConnection;
pub use traits::*;
