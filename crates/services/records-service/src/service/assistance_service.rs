//! Assistance type catalog.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use common::{AppError, AppResult, OptionExt};
use domain::{validate_input, AssistanceType, AssistanceTypeInput};

use crate::infra::DocumentStore;
use crate::types::{compare_text, matches_search, Paginated, PaginationParams, SortDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssistanceSort {
    Id,
    #[default]
    Name,
}

impl FromStr for AssistanceSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            other => Err(format!("unknown assistance sort key '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssistanceQuery {
    pub search: Option<String>,
    pub sort: AssistanceSort,
    pub direction: SortDirection,
    pub pagination: PaginationParams,
}

/// Deleting a type leaves operations that reference it in place; they
/// display the unknown name.
#[async_trait]
pub trait AssistanceService: Send + Sync {
    async fn add_assistance_type(&self, input: AssistanceTypeInput) -> AppResult<AssistanceType>;

    async fn rename_assistance_type(
        &self,
        id: u64,
        input: AssistanceTypeInput,
    ) -> AppResult<AssistanceType>;

    async fn delete_assistance_type(&self, id: u64) -> AppResult<()>;

    /// Returns the number of types removed.
    async fn delete_assistance_types(&self, ids: &[u64]) -> AppResult<usize>;

    async fn list_assistance_types(
        &self,
        query: AssistanceQuery,
    ) -> AppResult<Paginated<AssistanceType>>;
}

pub struct AssistanceManager {
    store: Arc<DocumentStore>,
}

impl AssistanceManager {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AssistanceService for AssistanceManager {
    async fn add_assistance_type(&self, input: AssistanceTypeInput) -> AppResult<AssistanceType> {
        let input = AssistanceTypeInput::new(input.name);
        validate_input(&input)?;

        let created = self
            .store
            .apply(move |doc| {
                let assistance = AssistanceType {
                    id: doc.next_assistance_id(),
                    name: input.name,
                };
                doc.assistance_types.push(assistance.clone());
                Ok(assistance)
            })
            .await?;

        info!(id = created.id, "Assistance type added");
        Ok(created)
    }

    async fn rename_assistance_type(
        &self,
        id: u64,
        input: AssistanceTypeInput,
    ) -> AppResult<AssistanceType> {
        let input = AssistanceTypeInput::new(input.name);
        validate_input(&input)?;

        self.store
            .apply(move |doc| {
                let slot = doc
                    .assistance_types
                    .iter_mut()
                    .find(|a| a.id == id)
                    .ok_or_not_found(format!("Assistance type {}", id))?;
                slot.name = input.name;
                Ok(slot.clone())
            })
            .await
    }

    async fn delete_assistance_type(&self, id: u64) -> AppResult<()> {
        self.store
            .apply(move |doc| {
                let before = doc.assistance_types.len();
                doc.assistance_types.retain(|a| a.id != id);
                if doc.assistance_types.len() == before {
                    return Err(AppError::not_found(format!("Assistance type {}", id)));
                }
                Ok(())
            })
            .await?;

        info!(id, "Assistance type deleted");
        Ok(())
    }

    async fn delete_assistance_types(&self, ids: &[u64]) -> AppResult<usize> {
        let targets: HashSet<u64> = ids.iter().copied().collect();
        let removed = self
            .store
            .apply(move |doc| {
                let before = doc.assistance_types.len();
                doc.assistance_types.retain(|a| !targets.contains(&a.id));
                Ok(before - doc.assistance_types.len())
            })
            .await?;

        info!(removed, "Assistance types deleted");
        Ok(removed)
    }

    async fn list_assistance_types(
        &self,
        query: AssistanceQuery,
    ) -> AppResult<Paginated<AssistanceType>> {
        let doc = self.store.snapshot().await;
        let mut rows: Vec<AssistanceType> = doc
            .assistance_types
            .iter()
            .filter(|a| matches_search(query.search.as_deref(), &[a.name.as_str()]))
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            let ordering = match query.sort {
                AssistanceSort::Id => a.id.cmp(&b.id),
                AssistanceSort::Name => compare_text(&a.name, &b.name),
            };
            query.direction.apply(ordering)
        });

        Ok(Paginated::from_rows(rows, query.pagination))
    }
}
