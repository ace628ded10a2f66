use crate::domain::payment::{PaymentResult, Summary};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::debug;

/// A thread-safe, append-only log of completed payments plus a broadcast feed.
///
/// Uses `Arc<Mutex<..>>` so clones share the same log and subscriber list.
/// Each subscriber owns an unbounded queue: publishing never waits on a slow
/// consumer, whose queue simply grows until it catches up.
#[derive(Default, Clone)]
pub struct ResultSink {
    state: Arc<Mutex<SinkState>>,
}

#[derive(Default)]
struct SinkState {
    log: Vec<PaymentResult>,
    subscribers: Vec<mpsc::UnboundedSender<PaymentResult>>,
}

impl SinkState {
    fn publish(&mut self, result: PaymentResult) {
        self.subscribers.retain(|tx| tx.send(result).is_ok());
    }
}

impl ResultSink {
    /// Creates a new, empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    // The state is only ever appended to, so a poisoned lock still holds a
    // consistent log.
    fn state(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends to the log and publishes in one atomic step, so every
    /// subscriber sees results in log order.
    pub fn append_and_publish(&self, result: PaymentResult) {
        let mut state = self.state();
        state.log.push(result);
        state.publish(result);
        debug!(
            position = state.log.len(),
            subscribers = state.subscribers.len(),
            "result recorded"
        );
    }

    pub fn append(&self, result: PaymentResult) {
        self.state().log.push(result);
    }

    /// Pushes `result` to every live subscription. Cancelled ones are pruned.
    pub fn publish(&self, result: PaymentResult) {
        self.state().publish(result);
    }

    /// Point-in-time copy of the log, in completion order.
    pub fn snapshot(&self) -> Vec<PaymentResult> {
        self.state().log.clone()
    }

    pub fn len(&self) -> usize {
        self.state().log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().log.is_empty()
    }

    pub fn summary(&self) -> Summary {
        Summary::from_results(&self.state().log)
    }

    /// Registers a live feed. Only results published after this call are delivered.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state().subscribers.push(tx);
        Subscription { rx }
    }

    pub fn subscriber_count(&self) -> usize {
        let mut state = self.state();
        state.subscribers.retain(|tx| !tx.is_closed());
        state.subscribers.len()
    }
}

/// A live registration against a [`ResultSink`].
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<PaymentResult>,
}

impl Subscription {
    /// Waits for the next published result.
    ///
    /// Returns `None` once the sink has been dropped and everything queued was delivered.
    pub async fn recv(&mut self) -> Option<PaymentResult> {
        self.rx.recv().await
    }

    /// Returns an already queued result without waiting.
    pub fn try_recv(&mut self) -> Option<PaymentResult> {
        self.rx.try_recv().ok()
    }

    /// Unregisters from the sink. Dropping the subscription has the same effect.
    pub fn cancel(mut self) {
        self.rx.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::{Amount, PaymentStatus};
    use rust_decimal_macros::dec;

    fn ok(amount: rust_decimal::Decimal) -> PaymentResult {
        PaymentResult::ok(Amount::new(amount).unwrap())
    }

    #[test]
    fn test_append_keeps_order() {
        let sink = ResultSink::new();
        sink.append(ok(dec!(1.0)));
        sink.append(ok(dec!(2.0)));
        sink.append(ok(dec!(3.0)));

        let amounts: Vec<_> = sink.snapshot().iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![dec!(1.0), dec!(2.0), dec!(3.0)]);
        assert_eq!(sink.len(), 3);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let sink = ResultSink::new();
        sink.append(ok(dec!(1.0)));
        let before = sink.snapshot();
        sink.append(ok(dec!(2.0)));

        assert_eq!(before.len(), 1);
        assert_eq!(sink.snapshot().len(), 2);
    }

    #[test]
    fn test_subscriber_sees_only_later_publishes() {
        let sink = ResultSink::new();
        sink.append_and_publish(ok(dec!(1.0)));

        let mut sub = sink.subscribe();
        sink.append_and_publish(ok(dec!(2.0)));
        sink.append_and_publish(ok(dec!(3.0)));

        assert_eq!(sub.try_recv().map(|r| r.amount), Some(dec!(2.0)));
        assert_eq!(sub.try_recv().map(|r| r.amount), Some(dec!(3.0)));
        assert_eq!(sub.try_recv(), None);
    }

    #[test]
    fn test_every_subscriber_gets_every_publish() {
        let sink = ResultSink::new();
        let mut first = sink.subscribe();
        let mut second = sink.subscribe();

        sink.publish(ok(dec!(5.0)));

        assert_eq!(first.try_recv().map(|r| r.status), Some(PaymentStatus::Ok));
        assert_eq!(second.try_recv().map(|r| r.amount), Some(dec!(5.0)));
        // Publish alone does not touch the log.
        assert!(sink.is_empty());
    }

    #[test]
    fn test_cancelled_subscription_is_pruned() {
        let sink = ResultSink::new();
        let keep = sink.subscribe();
        let gone = sink.subscribe();
        assert_eq!(sink.subscriber_count(), 2);

        gone.cancel();
        sink.publish(ok(dec!(1.0)));
        assert_eq!(sink.subscriber_count(), 1);
        drop(keep);
        assert_eq!(sink.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_recv_ends_when_sink_dropped() {
        let sink = ResultSink::new();
        let mut sub = sink.subscribe();
        sink.append_and_publish(ok(dec!(4.2)));
        drop(sink);

        assert_eq!(sub.recv().await.map(|r| r.amount), Some(dec!(4.2)));
        assert_eq!(sub.recv().await, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_are_all_kept() {
        let sink = ResultSink::new();
        let mut tasks = Vec::new();
        for i in 1..=50 {
            let sink = sink.clone();
            tasks.push(tokio::spawn(async move {
                sink.append_and_publish(ok(rust_decimal::Decimal::from(i)));
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(sink.len(), 50);
        assert_eq!(sink.summary().sum, Some(dec!(1275)));
    }
}
