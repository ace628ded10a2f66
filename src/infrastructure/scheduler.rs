use crate::error::{PaymentError, Result};
use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

type Job = Box<dyn FnOnce() + Send + 'static>;

enum Command {
    Schedule { deadline: Instant, job: Job },
    Shutdown { done: oneshot::Sender<ShutdownReport> },
}

/// What happened to the outstanding work when the scheduler stopped.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct ShutdownReport {
    /// Units that were already due and ran during shutdown.
    pub ran: usize,
    /// Units whose deadline had not been reached; their handles resolve to `Cancelled`.
    pub dropped: usize,
}

/// A single shared delay scheduler backed by one background worker task.
///
/// Cloning is cheap: every clone feeds the same worker, so all scheduled units
/// are serialized on one execution context. The worker stops when
/// [`Scheduler::shutdown`] is called or when the last clone is dropped.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

struct Inner {
    commands: mpsc::UnboundedSender<Command>,
    closed: AtomicBool,
    pending: Arc<AtomicUsize>,
}

impl Scheduler {
    /// Spawns the worker on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn start() -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        tokio::spawn(run_worker(receiver, Arc::clone(&pending)));

        Self {
            inner: Arc::new(Inner {
                commands,
                closed: AtomicBool::new(false),
                pending,
            }),
        }
    }

    /// Schedules `work` to run once on the worker, no earlier than `delay` from now.
    ///
    /// Never blocks. The returned [`Handle`] resolves with the value produced by `work`.
    pub fn schedule_after<T, F>(&self, delay: Duration, work: F) -> Result<Handle<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(PaymentError::SchedulerClosed);
        }

        let (tx, rx) = oneshot::channel();
        let job: Job = Box::new(move || {
            // The caller may have dropped its handle; the work still counts.
            let _ = tx.send(work());
        });
        let deadline = Instant::now() + delay;

        self.inner.pending.fetch_add(1, Ordering::AcqRel);
        if self
            .inner
            .commands
            .send(Command::Schedule { deadline, job })
            .is_err()
        {
            self.inner.pending.fetch_sub(1, Ordering::AcqRel);
            return Err(PaymentError::SchedulerClosed);
        }

        debug!(?delay, "unit of work scheduled");
        Ok(Handle { rx, delay })
    }

    /// Number of accepted units that have neither fired nor been dropped.
    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Stops accepting new work, runs every unit that is already due and drops the rest.
    ///
    /// Calling it again after the first shutdown is a no-op returning an empty report.
    pub async fn shutdown(&self) -> ShutdownReport {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return ShutdownReport::default();
        }

        let (done, report) = oneshot::channel();
        if self.inner.commands.send(Command::Shutdown { done }).is_err() {
            return ShutdownReport::default();
        }
        report.await.unwrap_or_default()
    }
}

/// A single-use handle on one scheduled unit of work.
///
/// Awaiting it yields the unit's output, or [`PaymentError::Cancelled`] if the
/// unit was dropped by a shutdown before it could fire.
#[derive(Debug)]
pub struct Handle<T> {
    rx: oneshot::Receiver<T>,
    delay: Duration,
}

impl<T> Handle<T> {
    /// The delay this unit was scheduled with.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl<T> Future for Handle<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.map_err(|_| PaymentError::Cancelled))
    }
}

struct Entry {
    deadline: Instant,
    seq: u64,
    job: Job,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

// Reversed so that `BinaryHeap` pops the earliest deadline first.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

async fn run_worker(mut commands: mpsc::UnboundedReceiver<Command>, pending: Arc<AtomicUsize>) {
    let mut queue = BinaryHeap::new();
    let mut seq = 0u64;

    let done = loop {
        let next_deadline = queue.peek().map(|entry: &Entry| entry.deadline);

        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Schedule { deadline, job }) => {
                    queue.push(Entry { deadline, seq, job });
                    seq += 1;
                }
                Some(Command::Shutdown { done }) => break Some(done),
                None => break None,
            },
            _ = sleep_until(next_deadline.unwrap_or_else(Instant::now)), if next_deadline.is_some() => {
                fire_due(&mut queue, &pending);
            }
        }
    };

    // Units buffered behind the shutdown raced with it; they get the same treatment.
    commands.close();
    while let Ok(command) = commands.try_recv() {
        if let Command::Schedule { deadline, job } = command {
            queue.push(Entry { deadline, seq, job });
            seq += 1;
        }
    }

    let ran = fire_due(&mut queue, &pending);
    let dropped = queue.len();
    queue.clear();
    pending.fetch_sub(dropped, Ordering::AcqRel);

    if dropped > 0 {
        warn!(dropped, "scheduler stopped with work not yet due");
    }
    debug!(ran, dropped, "scheduler worker exited");

    if let Some(done) = done {
        let _ = done.send(ShutdownReport { ran, dropped });
    }
}

fn fire_due(queue: &mut BinaryHeap<Entry>, pending: &AtomicUsize) -> usize {
    let now = Instant::now();
    let mut ran = 0;
    while queue.peek().is_some_and(|entry| entry.deadline <= now) {
        if let Some(entry) = queue.pop() {
            (entry.job)();
            pending.fetch_sub(1, Ordering::AcqRel);
            ran += 1;
        }
    }
    ran
}
