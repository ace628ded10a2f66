use crate::domain::payment::PaymentResult;
use crate::error::Result;
use std::io::Write;

/// Writes completed payment results as `status,amount` CSV rows.
pub struct ResultWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ResultWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_results<'a>(
        &mut self,
        results: impl IntoIterator<Item = &'a PaymentResult>,
    ) -> Result<()> {
        for result in results {
            self.writer.serialize(result)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
