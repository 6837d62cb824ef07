pub mod test_sink;

use std::time::Duration;

/// Polls `condition` until it holds, giving background pumps time to run.
pub async fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
