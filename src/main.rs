use clap::Parser;
use miette::{IntoDiagnostic, Result};
use paysim::application::dispatcher::{Dispatcher, DispatcherConfig};
use paysim::domain::channel::ChannelKind;
use paysim::domain::payment::{PaymentRequest, Summary};
use paysim::infrastructure::result_sink::ResultSink;
use paysim::infrastructure::scheduler::Scheduler;
use paysim::interfaces::csv::payment_reader::PaymentReader;
use paysim::interfaces::csv::result_writer::ResultWriter;
use paysim::telemetry;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input payments CSV file (`channel, amount`). Runs a demo set when omitted.
    input: Option<PathBuf>,

    /// Length of one delay unit in milliseconds.
    #[arg(long, default_value_t = 1000)]
    time_unit_ms: u64,

    /// Seed for the delay generator, for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
}

fn demo_requests() -> Vec<PaymentRequest> {
    vec![
        PaymentRequest::Cash(dec!(38.3)),
        PaymentRequest::Card(dec!(78.9)),
        PaymentRequest::WalletTransfer(dec!(99.99)),
    ]
}

fn print_summary(summary: &Summary) {
    let show = |value: Option<Decimal>| value.map_or_else(|| "-".to_string(), |v| v.to_string());

    match summary.sum {
        Some(sum) => println!(">> The total amount is {}", sum),
        None => println!(">> The total amount overflows"),
    }
    println!(">> The number of payments is {}", summary.count);
    println!(">> The payment max is {}", show(summary.max));
    println!(">> The payment min is {}", show(summary.min));
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();
    let cli = Cli::parse();

    let config = DispatcherConfig {
        time_unit: Duration::from_millis(cli.time_unit_ms),
        seed: cli.seed,
    };
    let dispatcher = Dispatcher::new(Scheduler::start(), ResultSink::new(), config);

    // Observer: report each payment as soon as it is published
    let mut subscription = dispatcher.sink().subscribe();
    let observer = tokio::spawn(async move {
        while let Some(result) = subscription.recv().await {
            eprintln!(">>> A payment has been done: {:?} {}", result.status, result.amount);
        }
    });

    let requests: Vec<PaymentRequest> = match cli.input {
        Some(path) => {
            let file = File::open(path).into_diagnostic()?;
            PaymentReader::new(file)
                .requests()
                .filter_map(|request| {
                    request
                        .inspect_err(|e| eprintln!("Error reading payment: {}", e))
                        .ok()
                })
                .collect()
        }
        None => demo_requests(),
    };

    let mut handles: Vec<(ChannelKind, _)> = Vec::new();
    for request in requests {
        match dispatcher.submit(request) {
            Ok(handle) => handles.push((request.channel(), handle)),
            Err(e) => eprintln!("Error submitting payment: {}", e),
        }
    }

    for (channel, handle) in handles {
        match handle.await {
            Ok(result) => eprintln!(">> The payment by {} is {:?}", channel, result.status),
            Err(e) => eprintln!("Payment by {} did not complete: {}", channel, e),
        }
    }

    dispatcher.scheduler().shutdown().await;

    let results = dispatcher.sink().snapshot();
    let stdout = io::stdout();
    let mut writer = ResultWriter::new(stdout.lock());
    writer.write_results(&results).into_diagnostic()?;
    drop(writer);
    print_summary(&dispatcher.sink().summary());

    // Dropping the last sink handle ends the observer's feed.
    drop(dispatcher);
    observer.await.into_diagnostic()?;

    Ok(())
}
