//! # IO Module
//!
//! Everything that crosses a process boundary.
//!
//! - **http**: the reqwest store, a [`Connection`] backed by the Ledger REST API
//! - **rest**: the axum stub server exposing any [`Connection`] under the same
//!   contract, plus the wire <-> domain mappers both sides share
//!
//! Wire types live in the `shared` crate. Amounts on the wire are minor-unit
//! integers and months are `YYYY-MM` strings; nothing above this layer sees
//! either representation.
//!
//! [`Connection`]: crate::backend::storage::Connection

pub mod http;
pub mod rest;

pub use http::{HttpConnection, RestClient};
pub use rest::{create_router, serve};
