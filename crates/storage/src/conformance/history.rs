use std::future::Future;
use std::sync::Arc;

use stratus_core::ExecutionStatus;

use super::{ids, make_execution, TestResult};
use crate::{ExecutionFilter, StorageError, StratusStorage};

pub(super) async fn run_history_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: StratusStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "history",
            "saved_execution_loads_unchanged",
            saved_execution_loads_unchanged(factory).await,
        ),
        TestResult::from_result(
            "history",
            "load_unknown_id_is_not_found",
            load_unknown_id_is_not_found(factory).await,
        ),
        TestResult::from_result(
            "history",
            "saving_same_id_replaces_record",
            saving_same_id_replaces_record(factory).await,
        ),
        TestResult::from_result(
            "history",
            "empty_store_lists_nothing",
            empty_store_lists_nothing(factory).await,
        ),
        TestResult::from_result(
            "history",
            "executions_ordered_most_recent_first",
            executions_ordered_most_recent_first(factory).await,
        ),
        TestResult::from_result(
            "history",
            "filter_by_template_id",
            filter_by_template_id(factory).await,
        ),
        TestResult::from_result(
            "history",
            "filter_by_status_and_errors",
            filter_by_status_and_errors(factory).await,
        ),
        TestResult::from_result("history", "limit_truncates", limit_truncates(factory).await),
        TestResult::from_result(
            "history",
            "list_templates_keys_by_run_id",
            list_templates_keys_by_run_id(factory).await,
        ),
        TestResult::from_result(
            "history",
            "concurrent_saves_are_all_kept",
            concurrent_saves_are_all_kept(factory).await,
        ),
    ]
}

async fn seeded<S, F, Fut>(factory: &F) -> Result<S, String>
where
    S: StratusStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for exec in [
        make_execution("run1", "tpl-a", "2025-01-01T00:00:00Z", false),
        make_execution("run2", "tpl-b", "2025-01-02T00:00:00Z", true),
        make_execution("run3", "tpl-a", "2025-01-03T00:00:00Z", false),
    ] {
        s.save_execution(&exec).await.map_err(|e| e.to_string())?;
    }
    Ok(s)
}

// ── Test implementations ──────────────────────────────────────────────────────

async fn saved_execution_loads_unchanged<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StratusStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let exec = make_execution("run1", "tpl-a", "2025-01-01T00:00:00Z", true);
    s.save_execution(&exec).await.map_err(|e| e.to_string())?;
    let loaded = s.load_execution("run1").await.map_err(|e| e.to_string())?;
    if loaded != exec {
        return Err(format!("loaded record differs: {loaded:?}"));
    }
    Ok(())
}

async fn load_unknown_id_is_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StratusStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.load_execution("missing").await {
        Err(StorageError::ExecutionNotFound { execution_id }) if execution_id == "missing" => {
            Ok(())
        }
        other => Err(format!("expected ExecutionNotFound, got {:?}", other)),
    }
}

async fn saving_same_id_replaces_record<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StratusStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut exec = make_execution("run1", "tpl-a", "2025-01-01T00:00:00Z", false);
    s.save_execution(&exec).await.map_err(|e| e.to_string())?;
    exec.message = "second".to_string();
    s.save_execution(&exec).await.map_err(|e| e.to_string())?;

    let all = s
        .load_executions(&ExecutionFilter::default())
        .await
        .map_err(|e| e.to_string())?;
    if all.len() != 1 || all[0].message != "second" {
        return Err(format!("expected one replaced record, got {:?}", ids(&all)));
    }
    Ok(())
}

async fn empty_store_lists_nothing<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StratusStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let all = s
        .load_executions(&ExecutionFilter::default())
        .await
        .map_err(|e| e.to_string())?;
    let templates = s.list_templates().await.map_err(|e| e.to_string())?;
    if !all.is_empty() || !templates.is_empty() {
        return Err("expected an empty store".to_string());
    }
    Ok(())
}

async fn executions_ordered_most_recent_first<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StratusStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = seeded(factory).await?;
    let all = s
        .load_executions(&ExecutionFilter::default())
        .await
        .map_err(|e| e.to_string())?;
    if ids(&all) != ["run3", "run2", "run1"] {
        return Err(format!("unexpected order {:?}", ids(&all)));
    }
    Ok(())
}

async fn filter_by_template_id<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StratusStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = seeded(factory).await?;
    let filter = ExecutionFilter {
        template_id: Some("tpl-a".to_string()),
        ..Default::default()
    };
    let found = s.load_executions(&filter).await.map_err(|e| e.to_string())?;
    if ids(&found) != ["run3", "run1"] {
        return Err(format!("unexpected selection {:?}", ids(&found)));
    }
    Ok(())
}

async fn filter_by_status_and_errors<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StratusStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = seeded(factory).await?;
    let failed = ExecutionFilter {
        status: Some(ExecutionStatus::Failed),
        ..Default::default()
    };
    let found = s.load_executions(&failed).await.map_err(|e| e.to_string())?;
    if ids(&found) != ["run2"] {
        return Err(format!("status filter selected {:?}", ids(&found)));
    }
    let errors = ExecutionFilter {
        only_errors: true,
        template_id: Some("tpl-a".to_string()),
        ..Default::default()
    };
    let found = s.load_executions(&errors).await.map_err(|e| e.to_string())?;
    if !found.is_empty() {
        return Err(format!("errors filter selected {:?}", ids(&found)));
    }
    Ok(())
}

async fn limit_truncates<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StratusStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = seeded(factory).await?;
    let filter = ExecutionFilter {
        limit: 1,
        ..Default::default()
    };
    let found = s.load_executions(&filter).await.map_err(|e| e.to_string())?;
    if ids(&found) != ["run3"] {
        return Err(format!("limit selected {:?}", ids(&found)));
    }
    Ok(())
}

async fn list_templates_keys_by_run_id<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StratusStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = seeded(factory).await?;
    let listed = s.list_templates().await.map_err(|e| e.to_string())?;
    let keys: Vec<&str> = listed.iter().map(|(k, _)| k.as_str()).collect();
    if keys != ["run3", "run2", "run1"] {
        return Err(format!("unexpected keys {:?}", keys));
    }
    if listed.iter().any(|(k, e)| k != &e.id) {
        return Err("key does not match record id".to_string());
    }
    Ok(())
}

/// Parallel saves from independent tasks must all be retained.
async fn concurrent_saves_are_all_kept<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StratusStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = Arc::new(factory().await);
    let mut handles = Vec::new();
    for i in 0..16 {
        let s = Arc::clone(&s);
        handles.push(tokio::spawn(async move {
            let exec = make_execution(
                &format!("run{i:02}"),
                "tpl-c",
                &format!("2025-02-01T00:00:{i:02}Z"),
                false,
            );
            s.save_execution(&exec).await
        }));
    }
    for handle in handles {
        handle
            .await
            .map_err(|e| format!("task panicked: {e}"))?
            .map_err(|e| e.to_string())?;
    }
    let all = s
        .load_executions(&ExecutionFilter::default())
        .await
        .map_err(|e| e.to_string())?;
    if all.len() != 16 {
        return Err(format!("expected 16 executions, got {}", all.len()));
    }
    Ok(())
}
