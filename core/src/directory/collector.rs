use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use super::models::{CollectionPage, CollectionScope, PageRequest};
use super::r#trait::DirectoryApi;
use crate::dispatch::{Dispatcher, RetryPolicy};
use crate::error::DirectoryError;

/// Walks a cursor-paginated listing to completion.
///
/// Pages of one pass are fetched strictly in cursor order; every page request
/// goes through the shared dispatcher and the read retry policy.
#[derive(Clone)]
pub struct PaginatedCollector {
    dispatcher: Arc<Dispatcher>,
    retry: RetryPolicy,
    page_size: u32,
}

impl PaginatedCollector {
    pub fn new(dispatcher: Arc<Dispatcher>, retry: RetryPolicy, page_size: u32) -> Self {
        Self {
            dispatcher,
            retry,
            page_size: page_size.max(1),
        }
    }

    /// Collect every record of `scope`. Records sharing an `id` are kept once
    /// (first occurrence wins); arrival order is otherwise preserved.
    pub async fn collect(
        &self,
        api: &dyn DirectoryApi,
        scope: &CollectionScope,
    ) -> Result<Vec<Value>, DirectoryError> {
        let mut items = Vec::new();
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut sent_cursors: HashSet<String> = HashSet::new();
        let mut cursor: Option<String> = None;
        let mut pages: usize = 0;

        loop {
            let req = PageRequest {
                page_size: self.page_size,
                start_cursor: cursor.clone(),
            };
            let page = self.fetch_page(api, scope, req).await?;
            pages += 1;

            for item in page.items {
                let duplicate = item
                    .get("id")
                    .and_then(Value::as_str)
                    .is_some_and(|id| !seen_ids.insert(id.to_string()));
                if !duplicate {
                    items.push(item);
                }
            }

            if !page.has_more {
                break;
            }

            let next = page
                .next_cursor
                .filter(|c| !c.trim().is_empty())
                .ok_or_else(|| {
                    DirectoryError::ProtocolViolation(format!(
                        "{} page {pages} reported has_more without next_cursor",
                        scope.label()
                    ))
                })?;
            // Any cursor seen before means the listing has cycled.
            if !sent_cursors.insert(next.clone()) {
                return Err(DirectoryError::ProtocolViolation(format!(
                    "{} page {pages} returned already visited cursor {next:?}",
                    scope.label()
                )));
            }
            cursor = Some(next);
        }

        tracing::debug!(
            target: "taskbridge.directory",
            scope = scope.label(),
            pages = pages,
            items = items.len(),
            "collection pass complete"
        );
        Ok(items)
    }

    async fn fetch_page(
        &self,
        api: &dyn DirectoryApi,
        scope: &CollectionScope,
        req: PageRequest,
    ) -> Result<CollectionPage, DirectoryError> {
        match scope {
            CollectionScope::People => {
                self.retry
                    .run(&self.dispatcher, "list_people", || api.list_people(req.clone()))
                    .await
            }
            CollectionScope::Database { database_id } => {
                self.retry
                    .run(&self.dispatcher, "query_records", || {
                        api.query_records(database_id, req.clone())
                    })
                    .await
            }
        }
    }
}
