//! # Domain Module
//!
//! Contains the budgeting logic of the Ledger client.
//!
//! Everything here works on decimal amounts and [`month::MonthKey`]s. Wire
//! types and minor units stay behind the storage traits and the REST mappers.
//!
//! ## Module Organization
//!
//! - **money**: Minor-unit conversion, rounding and display formatting
//! - **month**: `YYYY-MM` month keys
//! - **budget_overlay**: Sparse month-indexed budget entries with optimistic writes
//! - **spending** / **rollover**: Per-category spend and surplus routing between months
//! - **objective_planner**: Objectives, their plan schedules and overlay reconciliation
//! - **budgets_view**: The per-month board of category cards
//! - **category_service**, **transaction_service**, **recurring_service**: CRUD consumers
//! - **optimistic**: Undo tokens shared by every optimistic write
//!
//! ## Business Rules
//!
//! - At most one budget entry per month and category
//! - Surplus is never negative; a rollover category without a target keeps its surplus
//! - Objective plan amounts always add up exactly in the currency's minor unit
//! - Input is validated before any local change or remote call

pub mod budget_overlay;
pub mod budgets_view;
pub mod category_service;
pub mod commands;
pub mod error;
pub mod models;
pub mod money;
pub mod month;
pub mod objective_planner;
pub mod optimistic;
pub mod recurring_service;
pub mod rollover;
pub mod spending;
pub mod transaction_service;

pub use budget_overlay::*;
pub use budgets_view::*;
pub use category_service::*;
pub use error::*;
pub use money::*;
pub use month::*;
pub use objective_planner::*;
pub use recurring_service::*;
pub use rollover::*;
pub use transaction_service::*;
