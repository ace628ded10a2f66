use crate::error::PaymentError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// The closed set of payment channels understood by the simulator.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Cash,
    Card,
    WalletTransfer,
}

/// Completion latency range of a channel, in whole time units.
///
/// `min` is inclusive and `max` is exclusive.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct DelayBounds {
    pub min: u32,
    pub max: u32,
}

impl DelayBounds {
    /// Draws one delay uniformly from `[min, max)` units.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, unit: Duration) -> Duration {
        unit * rng.gen_range(self.min..self.max)
    }

    /// Whether `delay` falls inside `[min, max)` units.
    pub fn contains(&self, delay: Duration, unit: Duration) -> bool {
        delay >= unit * self.min && delay < unit * self.max
    }
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 3] = [
        ChannelKind::Cash,
        ChannelKind::Card,
        ChannelKind::WalletTransfer,
    ];

    pub const fn delay_bounds(self) -> DelayBounds {
        match self {
            ChannelKind::Cash => DelayBounds { min: 1, max: 3 },
            ChannelKind::Card => DelayBounds { min: 3, max: 10 },
            ChannelKind::WalletTransfer => DelayBounds { min: 4, max: 8 },
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ChannelKind::Cash => "cash",
            ChannelKind::Card => "card",
            ChannelKind::WalletTransfer => "wallet_transfer",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelKind {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(ChannelKind::Cash),
            "card" => Ok(ChannelKind::Card),
            "wallet_transfer" | "paypal" => Ok(ChannelKind::WalletTransfer),
            other => Err(PaymentError::UnknownChannel(other.to_string())),
        }
    }
}
