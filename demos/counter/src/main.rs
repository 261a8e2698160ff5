//! Counter demo.
//!
//! Declares one action of each async shape plus a sync action, runs them
//! against an in-memory state and logs every transition with its diff.
//!
//! Run with `RUST_LOG=debug cargo run -p stateful-actions-counter` to see
//! the retry schedule and the diff groups.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use serde_json::{Value, json};
use stateful_actions::logging::{ChangeLogger, Transition};
use stateful_actions::prelude::*;
use thiserror::Error;

/// Failures of the simulated backend.
#[derive(Debug, Clone, Error)]
enum BackendError {
    /// Temporary outage; worth retrying.
    #[error("backend unavailable")]
    Unavailable,

    /// Request rejected; retrying will not help.
    #[error("request rejected: {0}")]
    Rejected(String),
}

type Decl = ActionDecl<(), BackendError>;

fn increment() -> Decl {
    ActionDecl::callable(|state, args, _props| {
        let by = args.first().and_then(Value::as_i64).unwrap_or(1);
        let count = state.get("count").and_then(Value::as_i64).unwrap_or(0);
        let mut next = state.clone();
        next.insert("count".into(), json!(count + by));
        next
    })
}

/// Saves the counter; the backend is down for the first two calls.
fn save(calls: Arc<AtomicU32>) -> Decl {
    ActionRecord::new()
        .promise(operation(move |invocation: Invocation<()>| {
            let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if attempt < 3 {
                    return Err(BackendError::Unavailable);
                }
                let count = invocation.state.get("count").cloned().unwrap_or(Value::Null);
                Ok(json!({"saved": count, "attempt": attempt}))
            }
        }))
        .retry_count(4)
        .delay(Duration::from_millis(50))
        .is_retry_error(Arc::new(|err: &BackendError| {
            matches!(err, BackendError::Unavailable)
        }))
        .into()
}

/// Refreshes the history list from the "server".
fn refresh_history() -> Decl {
    ActionRecord::new()
        .promise_get(Arc::new(
            |state: Snapshot, _: Value, _: ()| -> Option<BoxFuture<Result<Value, BackendError>>> {
                let count = state.get("count").and_then(Value::as_i64)?;
                if count < 0 {
                    return Some(Box::pin(async move {
                        Err(BackendError::Rejected(format!("negative count {count}")))
                    }));
                }
                Some(Box::pin(async move { Ok(json!((1..=count).collect::<Vec<_>>())) }))
            },
        ))
        .delay(Duration::from_millis(20))
        .into()
}

async fn run_async(
    decl: Decl,
    state: &Snapshot,
    args: Args,
) -> Result<Option<Value>, BackendError> {
    let action = match decl.classify().into_async() {
        Ok(action) => action.normalize(),
        Err(err) => {
            tracing::error!(error = %err, "not an async action");
            return Ok(None);
        }
    };
    tracing::info!(
        max_calls = action.max_calls(),
        policy = ?action.policy(),
        "running async action"
    );

    let operation = action.into_operation();
    match operation(Invocation::new(args, state.clone(), Value::Null, ())) {
        Some(pending) => pending.await.map(Some),
        None => Ok(None),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mode = match BuildMode::from_env() {
        Ok(mode) => mode,
        Err(err) => {
            tracing::warn!(error = %err, "falling back to development mode");
            BuildMode::Development
        }
    };
    let logger = ChangeLogger::new(LoggerConfig::new(mode));

    let mut state = Snapshot::new();
    state.insert("count".into(), json!(0));
    state.insert("history".into(), json!([]));

    // Sync action.
    let args = vec![json!(3)];
    let before = state.clone();
    let transition = match increment().classify().into_sync() {
        Ok(transition) => transition,
        Err(err) => {
            tracing::error!(error = %err, "increment is not a sync action");
            return;
        }
    };
    state = transition(&state, &args, &Value::Null);
    logger.log_transition(true, &Transition::new("increment", &before, Some(&state), &args));

    // Promise action with retry.
    let calls = Arc::new(AtomicU32::new(0));
    let before = state.clone();
    let saved = run_async(save(calls.clone()), &state, Vec::new()).await;
    match saved {
        Ok(Some(receipt)) => {
            state.insert("lastSave".into(), receipt);
            logger.log_transition(
                true,
                &Transition::new("save", &before, Some(&state), &Vec::new()).source("demo"),
            );
        }
        Ok(None) => tracing::info!("save had nothing to do"),
        Err(err) => {
            tracing::error!(error = %err, calls = calls.load(Ordering::SeqCst), "save failed");
            logger.log_transition(
                true,
                &Transition::new("save", &before, Some(&before), &Vec::new()).failed(true),
            );
        }
    }

    // Factory action, normalized with three attempts and REUSE.
    let before = state.clone();
    match run_async(refresh_history(), &state, Vec::new()).await {
        Ok(Some(history)) => {
            state.insert("history".into(), history);
            logger.log_transition(
                true,
                &Transition::new("refreshHistory", &before, Some(&state), &Vec::new()),
            );
        }
        Ok(None) => {
            logger.log_single("refreshHistory", &Vec::new(), true, Some("nothing to refresh"));
        }
        Err(err) => tracing::error!(error = %err, "refresh failed"),
    }

    println!("{}", Value::Object(state));
}
