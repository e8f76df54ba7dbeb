use rust_decimal::Decimal;
use shared::{ApiRecurringToggle, BillUpdatePayload};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::backend::domain::commands::recurring::SaveRecurringCommand;
use crate::backend::domain::error::{LedgerError, LedgerResult};
use crate::backend::domain::models::recurring::{BillInstance, BillStatus, RecurringPayment};
use crate::backend::domain::money::MoneyService;
use crate::backend::domain::month::MonthKey;
use crate::backend::io::rest::mappers::recurring_mapper::RecurringMapper;
use crate::backend::storage::{Connection, RecurringStorage};

/// Bills due in one month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthBills {
    pub month: MonthKey,
    /// Ordered by due date
    pub bills: Vec<BillInstance>,
    /// Sum of the bills still projected; paid and skipped ones are excluded
    pub projected_total: Decimal,
}

/// Recurring rules and their bill instances, read-mostly
#[derive(Clone)]
pub struct RecurringService<C: Connection> {
    recurring_repository: C::RecurringRepository,
    money: MoneyService,
    rules: Arc<RwLock<Vec<RecurringPayment>>>,
}

impl<C: Connection> RecurringService<C> {
    pub fn new(connection: Arc<C>, money: MoneyService) -> Self {
        Self {
            recurring_repository: connection.create_recurring_repository(),
            money,
            rules: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn load(&self) -> LedgerResult<Vec<RecurringPayment>> {
        let dtos = self.recurring_repository.list_recurring().await?;
        let rules: Vec<RecurringPayment> = dtos
            .into_iter()
            .map(|dto| RecurringMapper::rule_to_domain(dto, &self.money))
            .collect();
        debug!("Loaded {} recurring rules", rules.len());

        *self.rules.write().await = rules.clone();
        Ok(rules)
    }

    /// Rules that still generate bills
    pub async fn active_rules(&self) -> Vec<RecurringPayment> {
        self.rules
            .read()
            .await
            .iter()
            .filter(|rule| !rule.paused)
            .cloned()
            .collect()
    }

    pub async fn create(&self, command: SaveRecurringCommand) -> LedgerResult<RecurringPayment> {
        command.validate()?;
        let payload = RecurringMapper::to_payload(&command, &self.money)?;

        info!("Creating recurring rule '{}'", payload.name);
        let dto = self.recurring_repository.create_recurring(&payload).await?;
        let rule = RecurringMapper::rule_to_domain(dto, &self.money);
        self.rules.write().await.push(rule.clone());
        Ok(rule)
    }

    pub async fn update(&self, rule_id: &str, command: SaveRecurringCommand) -> LedgerResult<RecurringPayment> {
        command.validate()?;
        let payload = RecurringMapper::to_payload(&command, &self.money)?;

        info!("Updating recurring rule {}", rule_id);
        let dto = self.recurring_repository.update_recurring(rule_id, &payload).await?;
        let rule = RecurringMapper::rule_to_domain(dto, &self.money);
        let mut rules = self.rules.write().await;
        match rules.iter_mut().find(|existing| existing.id == rule.id) {
            Some(existing) => *existing = rule.clone(),
            None => rules.push(rule.clone()),
        }
        Ok(rule)
    }

    pub async fn pause(&self, rule_id: &str) -> LedgerResult<RecurringPayment> {
        info!("Pausing recurring rule {}", rule_id);
        let toggle = self.recurring_repository.pause_recurring(rule_id).await?;
        self.apply_toggle(toggle).await
    }

    pub async fn resume(&self, rule_id: &str) -> LedgerResult<RecurringPayment> {
        info!("Resuming recurring rule {}", rule_id);
        let toggle = self.recurring_repository.resume_recurring(rule_id).await?;
        self.apply_toggle(toggle).await
    }

    /// Ends the rule as of today; it stays listed but no longer generates bills
    pub async fn stop(&self, rule_id: &str) -> LedgerResult<RecurringPayment> {
        info!("Stopping recurring rule {}", rule_id);
        let toggle = self.recurring_repository.stop_recurring(rule_id).await?;
        self.apply_toggle(toggle).await
    }

    async fn apply_toggle(&self, toggle: ApiRecurringToggle) -> LedgerResult<RecurringPayment> {
        {
            let mut rules = self.rules.write().await;
            if let Some(rule) = rules.iter_mut().find(|rule| rule.id == toggle.rule_id) {
                rule.paused = toggle.is_paused;
                if toggle.end_date.is_some() {
                    rule.end_date = toggle.end_date;
                }
                return Ok(rule.clone());
            }
        }

        // Not loaded yet
        self.load()
            .await?
            .into_iter()
            .find(|rule| rule.id == toggle.rule_id)
            .ok_or_else(|| LedgerError::not_found(format!("Recurring rule {}", toggle.rule_id)))
    }

    pub async fn bills_in_month(&self, month: MonthKey) -> LedgerResult<MonthBills> {
        let dtos = self
            .recurring_repository
            .list_bills(&month.first_day(), &month.last_day())
            .await?;
        let mut bills = dtos
            .into_iter()
            .map(|dto| RecurringMapper::bill_to_domain(dto, &self.money))
            .collect::<LedgerResult<Vec<_>>>()?;
        bills.sort_by(|a, b| a.due_date.cmp(&b.due_date));

        let projected_total: Decimal = bills
            .iter()
            .filter(|bill| bill.status == BillStatus::Projected)
            .filter_map(|bill| bill.amount)
            .sum();

        Ok(MonthBills {
            month,
            bills,
            projected_total,
        })
    }

    pub async fn set_bill_status(&self, bill_id: &str, status: BillStatus) -> LedgerResult<BillInstance> {
        info!("Marking bill {} as {}", bill_id, status);
        let payload = BillUpdatePayload {
            status: Some(status.as_str().to_string()),
            amount: None,
        };
        let dto = self.recurring_repository.update_bill(bill_id, &payload).await?;
        RecurringMapper::bill_to_domain(dto, &self.money)
    }
}
