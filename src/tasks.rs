use std::future::Future;

use tokio::task::{JoinError, JoinHandle};

/// Handle on work that outlives the request that started it.
///
/// The task runs on the runtime regardless of what happens to the request;
/// dropping the handle detaches it. Keeping the handle lets a caller await the
/// outcome, which is how tests observe email delivery and image uploads.
#[must_use = "drop the handle explicitly to detach the task"]
pub struct BackgroundTask<T> {
    name: &'static str,
    handle: JoinHandle<T>,
}

impl<T: Send + 'static> BackgroundTask<T> {
    pub fn spawn<F>(name: &'static str, future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        tracing::debug!("🚀 Spawning background task {}", name);
        Self {
            name,
            handle: tokio::spawn(future),
        }
    }

    /// Waits for the task and returns its output.
    pub async fn wait(self) -> Result<T, JoinError> {
        let name = self.name;
        self.handle.await.inspect_err(|e| {
            tracing::error!("❌ Background task {} did not complete: {}", name, e);
        })
    }

    /// Lets the task run to completion without anyone waiting on it.
    pub fn detach(self) {
        tracing::debug!("Background task {} detached", self.name);
    }
}

/// Waits for every task in a batch, in order.
pub async fn wait_all<T: Send + 'static>(
    tasks: Vec<BackgroundTask<T>>,
) -> Vec<Result<T, JoinError>> {
    futures::future::join_all(tasks.into_iter().map(BackgroundTask::wait)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn detached_task_still_runs() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        BackgroundTask::spawn("probe", async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            let _ = tx.send(42);
        })
        .detach();

        assert_eq!(rx.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn wait_all_preserves_order() {
        let tasks = (0..3)
            .map(|i| {
                BackgroundTask::spawn("count", async move {
                    tokio::time::sleep(Duration::from_millis(10 - i * 3)).await;
                    i
                })
            })
            .collect();

        let results: Vec<u64> = wait_all(tasks).await.into_iter().map(Result::unwrap).collect();
        assert_eq!(results, vec![0, 1, 2]);
    }
}
