//! Auto-save countdown.

use super::TaskEvent;
use crate::error::TaskError;
use std::sync::mpsc::Sender;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};

/// Counts down from `seconds` once per `tick`, then asks the UI context to save.
///
/// Repeats until shutdown. Returns `Ok` when the event receiver is gone and
/// [`TaskError::Interrupted`] when shutdown arrives mid-cycle.
pub(crate) async fn run_countdown(
    seconds: u64,
    tick: Duration,
    events: Sender<TaskEvent>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), TaskError> {
    let mut ticker = interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        for remaining in (1..=seconds.max(1)).rev() {
            if events.send(TaskEvent::Countdown(remaining)).is_err() {
                return Ok(());
            }
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => return Err(TaskError::Interrupted),
            }
        }
        if events.send(TaskEvent::AutoSaveDue).is_err() {
            return Ok(());
        }
        log::debug!("Auto-save due");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap()
    }

    #[test]
    fn counts_down_then_requests_save() {
        let (tx, rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let result = runtime().block_on(async move {
            let countdown = run_countdown(3, Duration::from_millis(5), tx, shutdown_rx);
            tokio::pin!(countdown);
            tokio::select! {
                result = &mut countdown => result,
                _ = tokio::time::sleep(Duration::from_millis(80)) => {
                    let _ = shutdown_tx.send(true);
                    countdown.await
                }
            }
        });
        assert!(matches!(result, Err(TaskError::Interrupted)));

        let events: Vec<TaskEvent> = rx.try_iter().collect();
        assert_eq!(
            &events[..4],
            &[
                TaskEvent::Countdown(3),
                TaskEvent::Countdown(2),
                TaskEvent::Countdown(1),
                TaskEvent::AutoSaveDue,
            ]
        );
    }

    #[test]
    fn stops_when_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        drop(rx);
        let result = runtime().block_on(run_countdown(
            10,
            Duration::from_millis(1),
            tx,
            shutdown_rx,
        ));
        assert!(result.is_ok());
    }
}
