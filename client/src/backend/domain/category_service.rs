use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::backend::domain::commands::categories::{CreateCategoryCommand, UpdateCategoryCommand};
use crate::backend::domain::error::{LedgerError, LedgerResult};
use crate::backend::domain::models::category::Category;
use crate::backend::domain::money::MoneyService;
use crate::backend::domain::optimistic::{run_optimistic, EntityList};
use crate::backend::io::rest::mappers::category_mapper::CategoryMapper;
use crate::backend::storage::{CategoryStorage, Connection};

/// Category list with optimistic create, patch and delete
#[derive(Clone)]
pub struct CategoryService<C: Connection> {
    category_repository: C::CategoryRepository,
    money: MoneyService,
    state: Arc<RwLock<EntityList<Category>>>,
}

impl<C: Connection> CategoryService<C> {
    pub fn new(connection: Arc<C>, money: MoneyService) -> Self {
        Self {
            category_repository: connection.create_category_repository(),
            money,
            state: Arc::new(RwLock::new(EntityList::default())),
        }
    }

    pub async fn load(&self, force: bool) -> LedgerResult<Vec<Category>> {
        if !force {
            let state = self.state.read().await;
            if state.is_loaded() {
                return Ok(state.items().to_vec());
            }
        }

        let dtos = self.category_repository.list_categories().await?;
        let categories = CategoryMapper::to_domain_list(dtos, &self.money);
        debug!("Loaded {} categories", categories.len());

        let mut state = self.state.write().await;
        state.replace_all(categories);
        Ok(state.items().to_vec())
    }

    pub async fn all(&self) -> Vec<Category> {
        self.state.read().await.items().to_vec()
    }

    pub async fn get(&self, category_id: &str) -> Option<Category> {
        self.state.read().await.get(category_id).cloned()
    }

    /// Shows the category under a temporary id until the store assigns one
    pub async fn add(&self, command: CreateCategoryCommand) -> LedgerResult<Category> {
        command.validate()?;
        let payload = CategoryMapper::to_create_payload(&command, &self.money)?;

        let temp_id = format!("tmp-{}", Uuid::new_v4());
        let local = Category {
            id: temp_id.clone(),
            name: command.name.trim().to_string(),
            group: command.group.clone(),
            icon: command.icon.clone(),
            color: command.color.clone(),
            rollover: command.rollover,
            rollover_target_category_id: command.rollover_target_category_id.clone(),
            default_limit: self
                .money
                .round(command.default_limit, self.money.default_currency()),
        };

        info!("Creating category '{}'", local.name);
        let dto = run_optimistic(
            &self.state,
            |_| vec![temp_id.clone()],
            move |list| list.upsert(local),
            self.category_repository.create_category(&payload),
        )
        .await?;

        let created = CategoryMapper::to_domain(dto, &self.money);
        self.state.write().await.replace_id(&temp_id, created.clone());
        Ok(created)
    }

    pub async fn update(&self, category_id: &str, command: UpdateCategoryCommand) -> LedgerResult<Category> {
        command.validate()?;
        let mut local = self
            .get(category_id)
            .await
            .ok_or_else(|| LedgerError::not_found(format!("Category {}", category_id)))?;
        let payload = CategoryMapper::to_update_payload(&command, &self.money)?;

        if let Some(name) = &command.name {
            local.name = name.trim().to_string();
        }
        if let Some(group) = command.group {
            local.group = Some(group);
        }
        if let Some(icon) = command.icon {
            local.icon = Some(icon);
        }
        if let Some(color) = command.color {
            local.color = Some(color);
        }
        if let Some(rollover) = command.rollover {
            local.rollover = rollover;
        }
        if let Some(target) = command.rollover_target_category_id {
            local.rollover_target_category_id = target;
        }
        if let Some(limit) = command.default_limit {
            local.default_limit = self.money.round(limit, self.money.default_currency());
        }

        info!("Updating category {}", category_id);
        let dto = run_optimistic(
            &self.state,
            |_| vec![category_id.to_string()],
            move |list| list.upsert(local),
            self.category_repository.update_category(category_id, &payload),
        )
        .await?;

        let updated = CategoryMapper::to_domain(dto, &self.money);
        self.state.write().await.upsert(updated.clone());
        Ok(updated)
    }

    pub async fn delete(&self, category_id: &str) -> LedgerResult<()> {
        if self.get(category_id).await.is_none() {
            return Err(LedgerError::not_found(format!("Category {}", category_id)));
        }

        info!("Deleting category {}", category_id);
        run_optimistic(
            &self.state,
            |_| vec![category_id.to_string()],
            |list| {
                list.remove(category_id);
            },
            self.category_repository.delete_category(category_id),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::test_utils::TestEnvironment;
    use rust_decimal_macros::dec;

    fn groceries() -> CreateCategoryCommand {
        CreateCategoryCommand {
            name: "  Groceries ".to_string(),
            group: Some("Living".to_string()),
            icon: None,
            color: None,
            rollover: true,
            rollover_target_category_id: None,
            default_limit: dec!(150000),
        }
    }

    #[tokio::test]
    async fn test_add_replaces_temporary_id() {
        let env = TestEnvironment::new().await;
        let service = env.app.categories.clone();
        service.load(false).await.unwrap();

        let created = service.add(groceries()).await.unwrap();

        assert!(!created.id.starts_with("tmp-"));
        assert_eq!(created.name, "Groceries");
        assert_eq!(created.default_limit, dec!(150000));
        let all = service.all().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, created.id);
    }

    #[tokio::test]
    async fn test_failed_add_rolls_back() {
        let env = TestEnvironment::new().await;
        let service = env.app.categories.clone();
        service.load(false).await.unwrap();

        env.connection.fail_next(LedgerError::Network("offline".to_string())).await;
        let result = service.add(groceries()).await;

        assert!(matches!(result, Err(LedgerError::Network(_))));
        assert!(service.all().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_and_failed_delete() {
        let env = TestEnvironment::new().await;
        env.seed_category("cat-1", "Food").await;
        let service = env.app.categories.clone();
        service.load(false).await.unwrap();

        let updated = service
            .update(
                "cat-1",
                UpdateCategoryCommand {
                    rollover: Some(true),
                    rollover_target_category_id: Some(Some("cat-2".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.rollover_destination(), Some("cat-2"));

        env.connection
            .fail_next(LedgerError::Remote { status: 500, message: "down".to_string() })
            .await;
        assert!(service.delete("cat-1").await.is_err());
        assert!(service.get("cat-1").await.is_some());

        service.delete("cat-1").await.unwrap();
        assert!(service.get("cat-1").await.is_none());
    }

    #[tokio::test]
    async fn test_clearing_target_returns_surplus_to_category() {
        let env = TestEnvironment::new().await;
        env.seed_rollover_category("cat-1", "Dining", Some("cat-2")).await;
        let service = env.app.categories.clone();
        service.load(false).await.unwrap();
        assert_eq!(service.get("cat-1").await.unwrap().rollover_destination(), Some("cat-2"));

        let cleared = service
            .update(
                "cat-1",
                UpdateCategoryCommand {
                    rollover: Some(true),
                    rollover_target_category_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(cleared.rollover_destination(), Some("cat-1"));
        assert_eq!(service.get("cat-1").await.unwrap().rollover_target_category_id, None);
        let stored = service.load(true).await.unwrap();
        assert_eq!(stored[0].rollover_destination(), Some("cat-1"));
    }

    #[tokio::test]
    async fn test_absent_target_is_left_untouched() {
        let env = TestEnvironment::new().await;
        env.seed_rollover_category("cat-1", "Dining", Some("cat-2")).await;
        let service = env.app.categories.clone();
        service.load(false).await.unwrap();

        let updated = service
            .update(
                "cat-1",
                UpdateCategoryCommand {
                    color: Some("#f97316".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.rollover_destination(), Some("cat-2"));
        assert_eq!(updated.color.as_deref(), Some("#f97316"));
    }

    #[tokio::test]
    async fn test_rename_and_default_limit_change() {
        let env = TestEnvironment::new().await;
        env.seed_category("cat-1", "Food").await;
        let service = env.app.categories.clone();
        service.load(false).await.unwrap();

        let updated = service
            .update(
                "cat-1",
                UpdateCategoryCommand {
                    name: Some(" Food & Drink ".to_string()),
                    default_limit: Some(dec!(1234.4)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Food & Drink");
        assert_eq!(updated.default_limit, dec!(1234));
        let stored = service.load(true).await.unwrap();
        assert_eq!(stored[0].name, "Food & Drink");
        assert_eq!(stored[0].default_limit, dec!(1234));
    }

    #[tokio::test]
    async fn test_disabling_rollover_stops_routing() {
        let env = TestEnvironment::new().await;
        env.seed_rollover_category("cat-1", "Dining", Some("cat-2")).await;
        let service = env.app.categories.clone();
        service.load(false).await.unwrap();

        let updated = service
            .update(
                "cat-1",
                UpdateCategoryCommand {
                    rollover: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(!updated.rollover);
        assert_eq!(updated.rollover_destination(), None);
        assert_eq!(updated.rollover_target_category_id.as_deref(), Some("cat-2"));
    }

    #[tokio::test]
    async fn test_failed_update_rolls_back() {
        let env = TestEnvironment::new().await;
        env.seed_category("cat-1", "Food").await;
        let service = env.app.categories.clone();
        service.load(false).await.unwrap();

        env.connection.fail_next(LedgerError::Network("offline".to_string())).await;
        let result = service
            .update(
                "cat-1",
                UpdateCategoryCommand {
                    name: Some("Groceries".to_string()),
                    rollover: Some(true),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(LedgerError::Network(_))));
        let local = service.get("cat-1").await.unwrap();
        assert_eq!(local.name, "Food");
        assert!(!local.rollover);
    }

    #[tokio::test]
    async fn test_update_of_unknown_category_is_not_found() {
        let env = TestEnvironment::new().await;
        let service = env.app.categories.clone();
        service.load(false).await.unwrap();

        let result = service.update("missing", UpdateCategoryCommand::default()).await;
        assert!(matches!(result, Err(LedgerError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let env = TestEnvironment::new().await;
        let mut command = groceries();
        command.name = " ".to_string();

        let result = env.app.categories.add(command).await;
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }
}
