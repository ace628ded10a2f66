use paysim::application::dispatcher::{Dispatcher, DispatcherConfig};
use paysim::domain::channel::ChannelKind;
use paysim::domain::payment::PaymentRequest;
use paysim::infrastructure::result_sink::ResultSink;
use paysim::infrastructure::scheduler::Scheduler;
use rand::Rng;
use rust_decimal::Decimal;
use std::time::Duration;

pub fn dispatcher(time_unit: Duration, seed: u64) -> Dispatcher {
    Dispatcher::new(
        Scheduler::start(),
        ResultSink::new(),
        DispatcherConfig {
            time_unit,
            seed: Some(seed),
        },
    )
}

/// Mixed-channel requests with amounts between 0.01 and 1000.00.
pub fn random_requests(count: usize) -> Vec<PaymentRequest> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let channel = ChannelKind::ALL[rng.gen_range(0..ChannelKind::ALL.len())];
            let cents: i64 = rng.gen_range(1..=100_000);
            PaymentRequest::new(channel, Decimal::new(cents, 2))
        })
        .collect()
}
