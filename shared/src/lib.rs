//! Wire types shared between the Ledger client and its REST store.
//!
//! Every monetary field in this crate is an integer in the currency's minor
//! unit (cents for USD, whole pesos for CLP). Dates travel as `YYYY-MM-DD`
//! and months as `YYYY-MM`. Field names follow the server's camelCase JSON.

use serde::{Deserialize, Serialize};
use std::fmt;

fn default_true() -> bool {
    true
}

/// Deserialize a field that distinguishes "absent" from an explicit `null`.
///
/// Absent fields fall back to `None` through `#[serde(default)]`; a present
/// field, `null` included, lands in `Some`.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A month-scoped budget entry as returned by `GET /budgets?month=`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiBudget {
    pub month: String,
    pub category_id: String,
    /// Limit in minor units
    pub limit: i64,
    #[serde(default)]
    pub rollover: bool,
    #[serde(default)]
    pub rollover_target_category_id: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    /// Source month when the server returned a carried-forward or copied entry
    #[serde(default)]
    pub copied_from_month: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default = "default_true")]
    pub carry_forward_enabled: bool,
    #[serde(default)]
    pub is_terminal: bool,
    #[serde(default)]
    pub objective_id: Option<String>,
}

/// Scope of a budget deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetDeleteScope {
    /// Only the entry for the given month
    ThisMonth,
    /// The given month and every later month
    FromMonth,
    /// Every month regardless of position
    All,
}

impl BudgetDeleteScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetDeleteScope::ThisMonth => "this_month",
            BudgetDeleteScope::FromMonth => "from_month",
            BudgetDeleteScope::All => "all",
        }
    }

    pub fn from_string(s: &str) -> Result<Self, String> {
        match s {
            "this_month" => Ok(BudgetDeleteScope::ThisMonth),
            "from_month" => Ok(BudgetDeleteScope::FromMonth),
            "all" => Ok(BudgetDeleteScope::All),
            other => Err(format!("Unknown delete scope: {}", other)),
        }
    }
}

impl fmt::Display for BudgetDeleteScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response body for delete endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedResponse {
    /// An empty `{}` body counts as a successful delete
    #[serde(default = "default_true")]
    pub deleted: bool,
    /// Number of removed rows, only reported by scoped deletes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

/// Whether an objective month plans spending or saving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanKind {
    Spend,
    Save,
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanKind::Spend => f.write_str("SPEND"),
            PlanKind::Save => f.write_str("SAVE"),
        }
    }
}

/// Lifecycle state of an objective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectiveStatus {
    Active,
    Completed,
    Archived,
}

impl fmt::Display for ObjectiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectiveStatus::Active => f.write_str("ACTIVE"),
            ObjectiveStatus::Completed => f.write_str("COMPLETED"),
            ObjectiveStatus::Archived => f.write_str("ARCHIVED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiObjectiveMonthPlan {
    pub month: String,
    /// Planned amount in minor units
    pub amount: i64,
    pub kind: PlanKind,
    #[serde(default)]
    pub is_last_month: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiObjective {
    pub objective_id: String,
    pub name: String,
    pub category_id: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub total_amount: Option<i64>,
    pub status: ObjectiveStatus,
    #[serde(default)]
    pub plans: Vec<ApiObjectiveMonthPlan>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body of `POST /objectives`
///
/// A `None` category asks the server to create or reuse a category named
/// after the objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateObjectivePayload {
    pub name: String,
    pub category_id: Option<String>,
    pub currency: Option<String>,
    pub total_amount: Option<i64>,
    pub plans: Vec<ApiObjectiveMonthPlan>,
}

/// Body of `PATCH /objectives/{id}`; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateObjectivePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ObjectiveStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plans: Option<Vec<ApiObjectiveMonthPlan>>,
}

/// One budget slot an objective could not claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetConflict {
    pub month: String,
    pub category_id: String,
    #[serde(default)]
    pub objective_id: Option<String>,
}

impl fmt::Display for BudgetConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.month, self.category_id)
    }
}

/// `detail` payload of a 409 response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictDetail {
    pub message: String,
    #[serde(default)]
    pub conflicts: Vec<BudgetConflict>,
}

/// Generic error envelope: `{"detail": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCategory {
    pub category_id: String,
    pub name: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub rollover: bool,
    #[serde(default)]
    pub rollover_target_category_id: Option<String>,
    /// Default monthly limit in minor units
    #[serde(default)]
    pub monthly_budget: Option<i64>,
}

/// Body for creating (`POST`) or patching (`PATCH`) a category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollover: Option<bool>,
    /// `Some(None)` is sent as `null` and clears the target
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "explicit_null")]
    pub rollover_target_category_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_budget: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTransactionSplit {
    pub id: String,
    pub label: String,
    /// Split amount in minor units
    pub amount: i64,
    #[serde(default)]
    pub category_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTransaction {
    pub txn_id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    #[serde(default)]
    pub merchant: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Signed amount in minor units, negative for expenses
    pub amount: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub receipt_id: Option<String>,
    #[serde(default)]
    pub splits: Vec<ApiTransactionSplit>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body for creating or patching a transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    pub date: String,
    #[serde(default)]
    pub merchant: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub receipt_id: Option<String>,
    #[serde(default)]
    pub splits: Vec<ApiTransactionSplit>,
}

/// Date window for `GET /transactions`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionListRequest {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub category_id: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRecurring {
    pub rule_id: String,
    pub name: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub category_id: Option<String>,
    /// `MONTHLY` or `WEEKLY`
    pub cadence: String,
    #[serde(default)]
    pub day_of_month: Option<u32>,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub autopost_mode: Option<String>,
    #[serde(default)]
    pub is_paused: bool,
}

/// Body of `POST /recurring` and the full replacement body of
/// `PATCH /recurring/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringPayload {
    pub name: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub category_id: Option<String>,
    pub cadence: String,
    #[serde(default)]
    pub day_of_month: Option<u32>,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub autopost_mode: Option<String>,
    #[serde(default)]
    pub is_paused: bool,
}

/// Response of the pause, resume and stop actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRecurringToggle {
    pub rule_id: String,
    pub is_paused: bool,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiBill {
    pub bill_id: String,
    #[serde(default)]
    pub rule_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    /// `projected`, `paid` or `skipped`
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub linked_txn_id: Option<String>,
}

/// Body of `PATCH /bills/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillUpdatePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_defaults_from_minimal_json() {
        let json = r#"{"month":"2026-03","categoryId":"cat-1","limit":60000}"#;
        let budget: ApiBudget = serde_json::from_str(json).unwrap();

        assert_eq!(budget.month, "2026-03");
        assert!(!budget.rollover);
        assert!(budget.carry_forward_enabled);
        assert!(!budget.is_terminal);
        assert_eq!(budget.objective_id, None);
    }

    #[test]
    fn test_budget_serializes_camel_case() {
        let budget = ApiBudget {
            month: "2026-03".to_string(),
            category_id: "cat-1".to_string(),
            limit: 600,
            rollover: true,
            rollover_target_category_id: Some("cat-2".to_string()),
            currency: Some("CLP".to_string()),
            copied_from_month: None,
            purpose: None,
            carry_forward_enabled: false,
            is_terminal: true,
            objective_id: None,
        };
        let value = serde_json::to_value(&budget).unwrap();

        assert_eq!(value["categoryId"], "cat-1");
        assert_eq!(value["rolloverTargetCategoryId"], "cat-2");
        assert_eq!(value["carryForwardEnabled"], false);
        assert_eq!(value["isTerminal"], true);
    }

    #[test]
    fn test_plan_kind_and_status_wire_names() {
        assert_eq!(serde_json::to_string(&PlanKind::Save).unwrap(), "\"SAVE\"");
        assert_eq!(serde_json::to_string(&ObjectiveStatus::Archived).unwrap(), "\"ARCHIVED\"");
        let status: ObjectiveStatus = serde_json::from_str("\"COMPLETED\"").unwrap();
        assert_eq!(status, ObjectiveStatus::Completed);
    }

    #[test]
    fn test_update_objective_payload_skips_absent_fields() {
        let payload = UpdateObjectivePayload {
            name: Some("Trip".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, serde_json::json!({"name": "Trip"}));
    }

    #[test]
    fn test_category_payload_keeps_explicit_null_target() {
        let cleared = CategoryPayload {
            rollover_target_category_id: Some(None),
            ..Default::default()
        };
        let value = serde_json::to_value(&cleared).unwrap();
        assert_eq!(value, serde_json::json!({"rolloverTargetCategoryId": null}));

        let untouched = serde_json::to_value(CategoryPayload::default()).unwrap();
        assert_eq!(untouched, serde_json::json!({}));

        let parsed: CategoryPayload = serde_json::from_str(r#"{"rolloverTargetCategoryId":null}"#).unwrap();
        assert_eq!(parsed.rollover_target_category_id, Some(None));
        let parsed: CategoryPayload = serde_json::from_str(r#"{"rolloverTargetCategoryId":"cat-2"}"#).unwrap();
        assert_eq!(parsed.rollover_target_category_id, Some(Some("cat-2".to_string())));
        let parsed: CategoryPayload = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.rollover_target_category_id, None);
    }

    #[test]
    fn test_delete_scope_strings() {
        for scope in [BudgetDeleteScope::ThisMonth, BudgetDeleteScope::FromMonth, BudgetDeleteScope::All] {
            assert_eq!(BudgetDeleteScope::from_string(scope.as_str()).unwrap(), scope);
        }
        assert!(BudgetDeleteScope::from_string("next_month").is_err());
    }

    #[test]
    fn test_conflict_detail_parses() {
        let json = r#"{"message":"Budget conflicts","conflicts":[{"month":"2026-01","categoryId":"cat-1"}]}"#;
        let detail: ConflictDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.conflicts.len(), 1);
        assert_eq!(detail.conflicts[0].to_string(), "2026-01/cat-1");
    }
}
