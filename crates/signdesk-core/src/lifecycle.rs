//! Async operation lifecycle.
//!
//! Every registry load and pipeline run follows the same two-phase
//! contract: `Started` is reported synchronously before the caller
//! regains control, the work itself is deferred by one scheduling tick,
//! and exactly one terminal event (`Succeeded` or `Failed`) fires when
//! the work completes. There is no cancellation: once started, an
//! operation always reaches a terminal event.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// One event in the life of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent<T, E> {
    /// The operation was accepted; work has not run yet.
    Started,
    /// Terminal: the operation finished with a payload.
    Succeeded(T),
    /// Terminal: the operation finished with an error.
    Failed(E),
}

impl<T, E> LifecycleEvent<T, E> {
    /// True for `Succeeded` or `Failed`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Started)
    }
}

/// Receives lifecycle events for one operation.
///
/// `on_started` is invoked on the caller's stack; the terminal callbacks
/// run on the spawned task.
pub trait Observer<T, E>: Send + Sync {
    /// The operation was accepted.
    fn on_started(&self);
    /// The operation completed with a payload.
    fn on_succeeded(&self, payload: T);
    /// The operation completed with an error.
    fn on_failed(&self, error: E);
}

/// Run `operation` under the lifecycle contract.
///
/// Reports `Started` synchronously, then spawns the future prefixed by a
/// single `yield_now` so the work never executes inside the caller's
/// synchronous call stack. The future's `Result` becomes the single
/// terminal event.
pub fn spawn_operation<T, E, O, F>(observer: Arc<O>, operation: F) -> JoinHandle<()>
where
    T: Send + 'static,
    E: Send + 'static,
    O: Observer<T, E> + ?Sized + 'static,
    F: Future<Output = std::result::Result<T, E>> + Send + 'static,
{
    observer.on_started();
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        match operation.await {
            Ok(payload) => observer.on_succeeded(payload),
            Err(error) => observer.on_failed(error),
        }
    })
}

/// Channel-backed observer: forwards every event into an unbounded mpsc
/// queue, in the order they fired.
pub struct EventSink<T, E> {
    tx: mpsc::UnboundedSender<LifecycleEvent<T, E>>,
}

impl<T: Send + 'static, E: Send + 'static> EventSink<T, E> {
    /// Create a sink and the receiver that drains it.
    #[must_use]
    pub fn channel() -> (Arc<Self>, mpsc::UnboundedReceiver<LifecycleEvent<T, E>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl<T: Send + 'static, E: Send + 'static> Observer<T, E> for EventSink<T, E> {
    fn on_started(&self) {
        // Receiver gone means nobody is watching; drop the event.
        let _ = self.tx.send(LifecycleEvent::Started);
    }

    fn on_succeeded(&self, payload: T) {
        let _ = self.tx.send(LifecycleEvent::Succeeded(payload));
    }

    fn on_failed(&self, error: E) {
        let _ = self.tx.send(LifecycleEvent::Failed(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn started_fires_before_spawn_returns() {
        let (sink, mut rx) = EventSink::<u32, String>::channel();
        let handle = spawn_operation(sink, async { Ok(7) });

        // Started must already be queued, with no terminal event yet.
        assert_eq!(rx.try_recv().unwrap(), LifecycleEvent::Started);
        assert!(rx.try_recv().is_err());

        handle.await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), LifecycleEvent::Succeeded(7));
    }

    #[tokio::test]
    async fn work_is_deferred_past_the_trigger_stack() {
        let flag = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&flag);
        let (sink, mut rx) = EventSink::<bool, String>::channel();

        let handle = spawn_operation(sink, async move {
            Ok(seen.load(Ordering::SeqCst))
        });
        // Set after spawn_operation returned; the operation body must
        // observe this store, proving it did not run inline.
        flag.store(true, Ordering::SeqCst);

        handle.await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), LifecycleEvent::Started);
        assert_eq!(rx.recv().await.unwrap(), LifecycleEvent::Succeeded(true));
    }

    #[tokio::test]
    async fn failure_yields_exactly_one_terminal_event() {
        let (sink, mut rx) = EventSink::<u32, String>::channel();
        let handle = spawn_operation(sink, async { Err("boom".to_string()) });
        handle.await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), LifecycleEvent::Started);
        assert_eq!(
            rx.recv().await.unwrap(),
            LifecycleEvent::Failed("boom".to_string())
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn terminal_classification() {
        assert!(!LifecycleEvent::<u8, u8>::Started.is_terminal());
        assert!(LifecycleEvent::<u8, u8>::Succeeded(1).is_terminal());
        assert!(LifecycleEvent::<u8, u8>::Failed(1).is_terminal());
    }
}
