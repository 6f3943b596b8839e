use crate::domain::account::UserProfile;
use crate::error::Result;
use std::io::Write;

/// Writes the final profile report as CSV.
///
/// Rows are sorted by account so the output is deterministic regardless of
/// store iteration order. Monetary columns use the implied-decimal display
/// (`1.500000` USD, `1723.75` MXN).
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(target: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(target),
        }
    }

    pub fn write_profiles(&mut self, mut profiles: Vec<UserProfile>) -> Result<()> {
        profiles.sort_by(|a, b| a.account.cmp(&b.account));
        self.writer.write_record([
            "account",
            "username",
            "balance",
            "total_sent",
            "total_received",
            "remittances",
            "verified",
        ])?;
        for profile in profiles {
            self.writer.write_record([
                profile.account.to_string(),
                profile.username.unwrap_or_default(),
                profile.balance.to_string(),
                profile.total_sent.to_string(),
                profile.total_received.to_string(),
                profile.remittance_count.to_string(),
                profile.is_verified.to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
