//! Output formatting for status command results.

use super::execute::StatusResult;
use crate::output::Outputable;

impl Outputable for StatusResult {
    fn to_table(&self) -> String {
        let mut output = format!("Migration status: {} ({})\n\n", self.out, self.backend);

        if self.status.entries.is_empty() {
            output.push_str("No migrations found.\n");
            return output;
        }

        for entry in &self.status.entries {
            let (symbol, state) = if entry.applied {
                ("✓", "applied")
            } else {
                ("→", "pending")
            };
            output.push_str(&format!("  {} {} ({})\n", symbol, entry.tag, state));
        }

        output.push_str(&format!(
            "\n{} applied, {} pending.\n",
            self.status.applied, self.status.pending
        ));
        output
    }
}
