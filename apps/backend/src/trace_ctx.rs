//! Task-local trace context.
//!
//! `RequestTrace` scopes every request future with its trace id so error
//! responses, database error logs and engine logs can all reference it
//! without threading the id through every call.

use tokio::task_local;

task_local! {
    static TRACE_ID: String;
}

const UNKNOWN: &str = "unknown";

/// Trace id of the current task, or `"unknown"` outside a traced scope
/// (background tasks, tests, the websocket actor).
pub fn trace_id() -> String {
    TRACE_ID
        .try_with(|id| id.clone())
        .unwrap_or_else(|_| UNKNOWN.to_string())
}

/// Run `future` with `trace_id` installed as the task-local trace id.
pub async fn with_trace_id<F, R>(trace_id: String, future: F) -> R
where
    F: std::future::Future<Output = R>,
{
    TRACE_ID.scope(trace_id, future).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trace_id_scoping() {
        assert_eq!(trace_id(), "unknown");

        let seen = with_trace_id("req-1".to_string(), async {
            let inner = with_trace_id("req-2".to_string(), async { trace_id() }).await;
            (trace_id(), inner)
        })
        .await;

        assert_eq!(seen, ("req-1".to_string(), "req-2".to_string()));
        assert_eq!(trace_id(), "unknown");
    }

    #[tokio::test]
    async fn test_spawned_tasks_do_not_inherit_trace_id() {
        let inner = with_trace_id("req-3".to_string(), async {
            tokio::spawn(async { trace_id() }).await.expect("join")
        })
        .await;
        assert_eq!(inner, "unknown");
    }
}
