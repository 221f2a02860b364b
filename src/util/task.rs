use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// Runs `future` to completion, turning a panic into `Err(message)`.
///
/// Long-lived background loops use this so one bad iteration is logged
/// instead of silently ending the task.
pub async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic payload".to_string()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passes_through_value() {
        assert_eq!(catch_task_panic(async { 42 }).await, Ok(42));
    }

    #[tokio::test]
    async fn test_captures_panic_message() {
        let result: Result<(), String> = catch_task_panic(async {
            panic!("round exploded");
        })
        .await;
        assert_eq!(result, Err("round exploded".to_string()));
    }
}
