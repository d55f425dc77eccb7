//! Output formatting for generate command results.

use super::execute::GenerateResult;
use crate::output::{bullet_list, Outputable};

impl Outputable for GenerateResult {
    fn to_table(&self) -> String {
        let mut output = format!("Generate: {}\n\n", self.out);

        let Some(migration) = &self.migration else {
            output.push_str("No schema changes, nothing to generate.\n");
            return output;
        };

        output.push_str(&format!(
            "Created {} ({} statements):\n",
            migration.path.display(),
            migration.statements.len()
        ));
        output.push_str(&bullet_list(&migration.changes, "no changes"));

        if migration.destructive {
            output.push_str("\nWarning: this migration drops or rewrites existing data.\n");
        }
        output
    }
}
