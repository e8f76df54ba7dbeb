use anyhow::{bail, Context, Result};
use ledger_client::backend::domain::{BudgetBoard, MoneyService, MonthKey};
use ledger_client::backend::io::serve;
use ledger_client::backend::storage::MemoryConnection;
use ledger_client::{initialize_backend, initialize_offline, AppConfig};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter};

const USAGE: &str = "usage: ledger [MONTH] [--offline] [--serve ADDR]";

/// `RUST_LOG` wins over the level from config or `LEDGER_LOG_LEVEL`
fn log_directive(rust_log: Option<String>, fallback: &str) -> String {
    match rust_log {
        Some(directive) if !directive.trim().is_empty() => directive,
        _ => fallback.to_string(),
    }
}

struct Args {
    month: Option<MonthKey>,
    offline: bool,
    serve: Option<SocketAddr>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        month: None,
        offline: false,
        serve: None,
    };
    let mut raw = std::env::args().skip(1);
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--offline" => args.offline = true,
            "--serve" => {
                let addr = raw.next().context(USAGE)?;
                args.serve = Some(addr.parse().with_context(|| format!("Invalid address '{}'", addr))?);
            }
            "-h" | "--help" => bail!(USAGE),
            month if args.month.is_none() => {
                args.month = Some(MonthKey::parse(month).with_context(|| format!("Invalid month '{}'", month))?);
            }
            other => bail!("Unexpected argument '{}'\n{}", other, USAGE),
        }
    }
    Ok(args)
}

fn print_board(board: &BudgetBoard, money: &MoneyService) {
    let currency = money.default_currency();
    println!("Budgets for {}", board.month);
    for card in &board.cards {
        let marker = if card.is_over_budget { "!" } else { " " };
        println!(
            "{} {:<20} {:>14} of {:>14} ({}%)",
            marker,
            card.category.name,
            money.format_amount(card.spent, currency),
            money.format_amount(card.limit, currency),
            card.percentage
        );
    }
    println!(
        "  {:<20} {:>14} of {:>14}",
        "Total",
        money.format_amount(board.total_spent, currency),
        money.format_amount(board.total_budget, currency)
    );
    if board.can_copy_previous {
        println!("No budgets yet; last month's can be copied.");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Installed before the config loads so its log lines are not lost
    let rust_log = std::env::var("RUST_LOG").ok();
    let bootstrap_level = std::env::var("LEDGER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let (filter, filter_handle) =
        reload::Layer::new(EnvFilter::new(log_directive(rust_log.clone(), &bootstrap_level)));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    filter_handle
        .reload(EnvFilter::new(log_directive(rust_log, &config.log_level)))
        .context("Failed to apply configured log level")?;

    let args = parse_args()?;
    let month = args.month.unwrap_or_else(MonthKey::current);

    if let Some(addr) = args.serve {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        let connection = MemoryConnection::with_demo_data(month).await;
        serve(listener, connection, config.api_token.clone()).await?;
        return Ok(());
    }

    let money = config.money_service();
    let board = if args.offline {
        let app = initialize_offline(month, money.clone()).await;
        app.view.load_board(month, false).await?
    } else {
        let app = initialize_backend(&config)?;
        app.view.load_board(month, false).await?
    };

    info!("Loaded {} cards for {}", board.cards.len(), month);
    print_board(&board, &money);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_log_overrides_configured_level() {
        assert_eq!(log_directive(Some("ledger_client=trace".to_string()), "info"), "ledger_client=trace");
        assert_eq!(log_directive(None, "debug"), "debug");
        assert_eq!(log_directive(Some("  ".to_string()), "warn"), "warn");
    }
}
