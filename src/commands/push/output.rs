//! Output formatting for push command results.

use super::execute::PushResult;
use crate::output::Outputable;

impl Outputable for PushResult {
    fn to_table(&self) -> String {
        let mut output = String::new();

        if self.dry_run {
            output.push_str("Push (dry-run)\n\n");
        } else {
            output.push_str("Push\n\n");
        }

        if self.changes.is_empty() {
            output.push_str("No changes detected, database matches the declared schema.\n");
            return output;
        }

        output.push_str(&format!("Changes ({}):\n", self.changes.len()));
        for change in &self.changes {
            let symbol = if self.executed { "✓" } else { "→" };
            output.push_str(&format!("  {} {}\n", symbol, change));
        }

        if self.dry_run {
            output.push_str("\nStatements:\n");
            for statement in &self.statements {
                output.push_str(statement);
                output.push('\n');
            }
            output.push_str("\nNo changes made (dry-run mode).\n");
        } else if self.executed {
            output.push_str(&format!("\nExecuted {} statement(s).\n", self.statements.len()));
        }
        output
    }
}
