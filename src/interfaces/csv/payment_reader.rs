use crate::domain::channel::ChannelKind;
use crate::domain::payment::PaymentRequest;
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct PaymentRecord {
    channel: String,
    amount: Decimal,
}

impl TryFrom<PaymentRecord> for PaymentRequest {
    type Error = PaymentError;

    fn try_from(record: PaymentRecord) -> Result<Self> {
        let channel: ChannelKind = record.channel.parse()?;
        Ok(PaymentRequest::new(channel, record.amount))
    }
}

/// Reads payment requests from a CSV source with a `channel, amount` header.
///
/// Whitespace is trimmed and record lengths are flexible. Amounts are not
/// validated here; the dispatcher rejects non-positive ones at submission.
pub struct PaymentReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> PaymentReader<R> {
    /// Creates a new `PaymentReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads one request per record.
    pub fn requests(self) -> impl Iterator<Item = Result<PaymentRequest>> {
        self.reader
            .into_deserialize::<PaymentRecord>()
            .map(|record| -> Result<PaymentRequest> { PaymentRequest::try_from(record?) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "channel, amount\ncash, 38.3\ncard, 78.9\nwallet_transfer, 99.99";
        let reader = PaymentReader::new(data.as_bytes());
        let results: Vec<Result<PaymentRequest>> = reader.requests().collect();

        assert_eq!(results.len(), 3);
        assert_eq!(
            *results[0].as_ref().unwrap(),
            PaymentRequest::Cash(dec!(38.3))
        );
        assert_eq!(
            *results[2].as_ref().unwrap(),
            PaymentRequest::WalletTransfer(dec!(99.99))
        );
    }

    #[test]
    fn test_reader_unknown_channel() {
        let data = "channel, amount\ncheque, 1.0\ncash, 2.0";
        let reader = PaymentReader::new(data.as_bytes());
        let results: Vec<Result<PaymentRequest>> = reader.requests().collect();

        assert!(matches!(results[0], Err(PaymentError::UnknownChannel(_))));
        assert!(results[1].is_ok());
    }

    #[test]
    fn test_reader_malformed_amount() {
        let data = "channel, amount\ncard, lots";
        let reader = PaymentReader::new(data.as_bytes());
        let results: Vec<Result<PaymentRequest>> = reader.requests().collect();

        assert!(matches!(results[0], Err(PaymentError::CsvError(_))));
    }

    #[test]
    fn test_reader_keeps_non_positive_amounts() {
        let data = "channel, amount\ncash, -3";
        let reader = PaymentReader::new(data.as_bytes());
        let results: Vec<Result<PaymentRequest>> = reader.requests().collect();

        assert_eq!(
            *results[0].as_ref().unwrap(),
            PaymentRequest::Cash(dec!(-3))
        );
    }
}
