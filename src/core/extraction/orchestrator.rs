// Request orchestrator - runs one extraction task per requested document and
// merges the outcomes once every task has finished.

use dashmap::DashMap;
use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use super::extraction_service::ExtractionError;

/// Per-document outcomes keyed by the identifier as it was requested.
pub type DocumentResults<T> = BTreeMap<String, Result<T, ExtractionError>>;

/// Spawn `task` once for every distinct id and wait for all of them.
///
/// Tasks write into a shared map as they finish, so one document failing (or
/// panicking) never affects the others.
pub async fn fan_out<T, F, Fut>(document_ids: Vec<String>, task: F) -> DocumentResults<T>
where
    T: Send + Sync + 'static,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T, ExtractionError>> + Send + 'static,
{
    let results: Arc<DashMap<String, Result<T, ExtractionError>>> = Arc::new(DashMap::new());
    let mut seen = HashSet::new();
    let mut handles = Vec::new();

    for id in document_ids {
        if !seen.insert(id.clone()) {
            continue;
        }

        let work = task(id.clone());
        let results = Arc::clone(&results);
        let key = id.clone();
        let handle = tokio::spawn(async move {
            let outcome = work.await;
            results.insert(key, outcome);
        });
        handles.push((id, handle));
    }

    let mut merged = BTreeMap::new();
    for (id, handle) in handles {
        if let Err(e) = handle.await {
            tracing::error!("Extraction task for {} did not complete: {}", id, e);
            results.insert(id.clone(), Err(ExtractionError::Task(e.to_string())));
        }
        if let Some((id, outcome)) = results.remove(&id) {
            merged.insert(id, outcome);
        }
    }

    merged
}
