use std::future::Future;

use super::TestResult;
use crate::{StorageError, StratusStorage};

pub(super) async fn run_config_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: StratusStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "config",
            "unset_key_is_none",
            unset_key_is_none(factory).await,
        ),
        TestResult::from_result(
            "config",
            "set_then_get_and_overwrite",
            set_then_get_and_overwrite(factory).await,
        ),
        TestResult::from_result(
            "config",
            "scopes_are_independent",
            scopes_are_independent(factory).await,
        ),
        TestResult::from_result(
            "config",
            "empty_scope_or_key_rejected",
            empty_scope_or_key_rejected(factory).await,
        ),
    ]
}

async fn unset_key_is_none<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StratusStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.config_get("aws", "region").await {
        Ok(None) => Ok(()),
        other => Err(format!("expected Ok(None), got {:?}", other)),
    }
}

async fn set_then_get_and_overwrite<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StratusStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.config_set("aws", "region", "us-west-2")
        .await
        .map_err(|e| e.to_string())?;
    s.config_set("aws", "region", "eu-west-1")
        .await
        .map_err(|e| e.to_string())?;
    let got = s.config_get("aws", "region").await.map_err(|e| e.to_string())?;
    if got.as_deref() != Some("eu-west-1") {
        return Err(format!("expected eu-west-1, got {:?}", got));
    }
    Ok(())
}

async fn scopes_are_independent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StratusStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.config_set("defaults", "instance.type", "t2.micro")
        .await
        .map_err(|e| e.to_string())?;
    s.config_set("aliases", "instance.type", "ignored")
        .await
        .map_err(|e| e.to_string())?;
    let got = s
        .config_get("defaults", "instance.type")
        .await
        .map_err(|e| e.to_string())?;
    if got.as_deref() != Some("t2.micro") {
        return Err(format!("expected t2.micro, got {:?}", got));
    }
    Ok(())
}

async fn empty_scope_or_key_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: StratusStorage,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.config_set("", "region", "x").await {
        Err(StorageError::InvalidKey { .. }) => {}
        other => return Err(format!("expected InvalidKey on set, got {:?}", other)),
    }
    match s.config_get("aws", "").await {
        Err(StorageError::InvalidKey { .. }) => Ok(()),
        other => Err(format!("expected InvalidKey on get, got {:?}", other)),
    }
}
