//! # Backend Module
//!
//! Contains all non-UI logic of the Ledger client.
//!
//! This module serves as the orchestration layer that brings together:
//! - **Domain**: budgeting rules, the month overlay, rollover and objectives
//! - **Storage**: the remote-store traits and the in-memory store
//! - **IO**: the reqwest store and the axum stub server
//!
//! ## Architecture
//!
//! ```text
//! Presentation (CLI, any UI)
//!     ↓
//! AppState (services, cloned by handle)
//!     ↓
//! Domain services (optimistic local state)
//!     ↓
//! Connection (HTTP or in-memory store)
//! ```
//!
//! Services hold their session state behind `Arc<RwLock<_>>`, so cloning
//! [`AppState`] shares one session rather than copying it.

pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;
use tracing::info;

use crate::backend::domain::{
    BudgetOverlay, BudgetsView, CategoryService, LedgerResult, MoneyService, MonthKey,
    ObjectivePlanner, RecurringService, TransactionService,
};
use crate::backend::io::HttpConnection;
use crate::backend::storage::{Connection, MemoryConnection};
use crate::config::AppConfig;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState<C: Connection> {
    pub money: MoneyService,
    pub budgets: BudgetOverlay<C>,
    pub objectives: ObjectivePlanner<C>,
    pub categories: CategoryService<C>,
    pub transactions: TransactionService<C>,
    pub recurring: RecurringService<C>,
    pub view: BudgetsView<C>,
}

impl<C: Connection> AppState<C> {
    pub fn new(connection: Arc<C>, money: MoneyService) -> Self {
        let budgets = BudgetOverlay::new(connection.clone(), money.clone());
        let categories = CategoryService::new(connection.clone(), money.clone());
        let transactions = TransactionService::new(connection.clone(), money.clone());
        let recurring = RecurringService::new(connection.clone(), money.clone());
        let objectives = ObjectivePlanner::new(connection, money.clone(), budgets.clone(), categories.clone());
        let view = BudgetsView::new(budgets.clone(), categories.clone(), transactions.clone());

        Self {
            money,
            budgets,
            objectives,
            categories,
            transactions,
            recurring,
            view,
        }
    }
}

/// Initialize the backend against the configured REST API
pub fn initialize_backend(config: &AppConfig) -> LedgerResult<AppState<HttpConnection>> {
    info!("Connecting to {}", config.api_base_url);
    let connection = HttpConnection::connect(
        &config.api_base_url,
        config.api_token.clone(),
        config.request_timeout(),
    )?;

    info!("Setting up domain services (default currency {})", config.default_currency);
    Ok(AppState::new(Arc::new(connection), config.money_service()))
}

/// Initialize the backend over an in-memory store seeded around `month`
pub async fn initialize_offline(month: MonthKey, money: MoneyService) -> AppState<MemoryConnection> {
    info!("Setting up offline store for {}", month);
    let connection = MemoryConnection::with_demo_data(month).await;
    AppState::new(Arc::new(connection), money)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_board_has_demo_cards() {
        let month = MonthKey::parse("2026-03").unwrap();
        let app = initialize_offline(month, MoneyService::default()).await;

        let board = app.view.load_board(month, false).await.unwrap();

        assert!(!board.cards.is_empty());
        assert!(board.cards.iter().any(|card| card.category.id == "transport"));
        assert!(!board.can_copy_previous);
    }

    #[test]
    fn test_backend_rejects_bad_base_url() {
        let config = AppConfig {
            api_base_url: "not a url".to_string(),
            ..AppConfig::default()
        };
        assert!(initialize_backend(&config).is_err());
    }
}
