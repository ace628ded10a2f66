use super::channel::ChannelKind;
use crate::error::PaymentError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents a positive monetary amount for payments.
///
/// This is a wrapper around `rust_decimal::Decimal` that can only be built
/// from a strictly positive value.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::InvalidAmount(value))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// A payment submitted to the dispatcher.
///
/// One variant per channel, each carrying the requested amount. The amount is
/// validated at submission time rather than here, so an invalid request can
/// still be expressed and rejected by the dispatcher.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum PaymentRequest {
    Cash(Decimal),
    Card(Decimal),
    WalletTransfer(Decimal),
}

impl PaymentRequest {
    pub fn new(channel: ChannelKind, amount: Decimal) -> Self {
        match channel {
            ChannelKind::Cash => PaymentRequest::Cash(amount),
            ChannelKind::Card => PaymentRequest::Card(amount),
            ChannelKind::WalletTransfer => PaymentRequest::WalletTransfer(amount),
        }
    }

    pub fn channel(&self) -> ChannelKind {
        match self {
            PaymentRequest::Cash(_) => ChannelKind::Cash,
            PaymentRequest::Card(_) => ChannelKind::Card,
            PaymentRequest::WalletTransfer(_) => ChannelKind::WalletTransfer,
        }
    }

    pub fn amount(&self) -> Decimal {
        match *self {
            PaymentRequest::Cash(amount)
            | PaymentRequest::Card(amount)
            | PaymentRequest::WalletTransfer(amount) => amount,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Ok,
    /// Never produced by the simulated network today.
    Failed,
}

/// The outcome of one dispatched payment.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
pub struct PaymentResult {
    pub status: PaymentStatus,
    pub amount: Decimal,
}

impl PaymentResult {
    pub fn ok(amount: Amount) -> Self {
        Self {
            status: PaymentStatus::Ok,
            amount: amount.value(),
        }
    }
}

/// Aggregate statistics over a sequence of results.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Summary {
    pub count: usize,
    /// Total of all amounts, or `None` if it does not fit in a `Decimal`.
    pub sum: Option<Decimal>,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl Summary {
    pub fn from_results(results: &[PaymentResult]) -> Self {
        let empty = Self {
            count: 0,
            sum: Some(Decimal::ZERO),
            min: None,
            max: None,
        };
        results.iter().fold(empty, |acc, result| Self {
            count: acc.count + 1,
            sum: acc.sum.and_then(|sum| sum.checked_add(result.amount)),
            min: Some(acc.min.map_or(result.amount, |m| m.min(result.amount))),
            max: Some(acc.max.map_or(result.amount, |m| m.max(result.amount))),
        })
    }
}
