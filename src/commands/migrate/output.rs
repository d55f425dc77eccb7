//! Output formatting for migrate command results.

use super::execute::MigrateResult;
use crate::output::Outputable;

impl Outputable for MigrateResult {
    fn to_table(&self) -> String {
        let mut output = format!("Migrate: {}\n\n", self.out);

        if self.applied.is_empty() {
            output.push_str(&format!(
                "Database is up to date ({} already applied).\n",
                self.skipped
            ));
            return output;
        }

        output.push_str(&format!("Applied {} migration(s):\n", self.applied.len()));
        for tag in &self.applied {
            output.push_str(&format!("  ✓ {}\n", tag));
        }
        output
    }
}
