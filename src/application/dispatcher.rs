use crate::domain::payment::{Amount, PaymentRequest, PaymentResult};
use crate::error::Result;
use crate::infrastructure::result_sink::ResultSink;
use crate::infrastructure::scheduler::{Handle, Scheduler};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::info;

/// Tuning knobs for a [`Dispatcher`].
#[derive(Debug, Clone, Copy)]
pub struct DispatcherConfig {
    /// Length of one delay unit. Channel bounds are expressed in these units.
    pub time_unit: Duration,
    /// Fixed seed for the delay generator; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            time_unit: Duration::from_secs(1),
            seed: None,
        }
    }
}

/// The entry point for simulated payments.
///
/// `Dispatcher` validates a request, draws its channel delay once, and hands
/// the completion to the shared scheduler. It owns no state beyond the delay
/// generator; the scheduler and the sink are injected.
pub struct Dispatcher {
    scheduler: Scheduler,
    sink: ResultSink,
    config: DispatcherConfig,
    rng: Mutex<StdRng>,
}

impl Dispatcher {
    /// Creates a new `Dispatcher` instance.
    ///
    /// # Arguments
    ///
    /// * `scheduler` - The shared delay scheduler completions run on.
    /// * `sink` - Where completed results are logged and published.
    /// * `config` - Time unit and seed for delay randomization.
    pub fn new(scheduler: Scheduler, sink: ResultSink, config: DispatcherConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            scheduler,
            sink,
            config,
            rng: Mutex::new(rng),
        }
    }

    /// Submits a payment for simulated processing.
    ///
    /// Returns immediately. An amount that is not strictly positive is rejected
    /// with `InvalidAmount` before anything is scheduled. The returned handle
    /// resolves once the channel delay has elapsed and the result has been
    /// logged and published.
    pub fn submit(&self, request: PaymentRequest) -> Result<Handle<PaymentResult>> {
        let amount = Amount::new(request.amount())?;
        let channel = request.channel();

        let delay = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            channel
                .delay_bounds()
                .sample(&mut *rng, self.config.time_unit)
        };

        let sink = self.sink.clone();
        let handle = self.scheduler.schedule_after(delay, move || {
            let result = PaymentResult::ok(amount);
            sink.append_and_publish(result);
            info!(%channel, amount = %result.amount, "payment completed");
            result
        })?;

        info!(
            %channel,
            amount = %amount.value(),
            ?delay,
            "payment activated, please wait"
        );
        Ok(handle)
    }

    pub fn sink(&self) -> &ResultSink {
        &self.sink
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The time unit and seed this dispatcher was built with.
    pub fn config(&self) -> DispatcherConfig {
        self.config
    }
}
