use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Invalid amount: {0} (must be strictly positive)")]
    InvalidAmount(Decimal),
    #[error("Unknown payment channel: {0}")]
    UnknownChannel(String),
    #[error("Payment was cancelled before completion")]
    Cancelled,
    #[error("Scheduler is shut down and no longer accepts work")]
    SchedulerClosed,
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PaymentError>;
