//! Output formatting for check command results.

use super::execute::CheckResult;
use crate::output::Outputable;

impl Outputable for CheckResult {
    fn to_table(&self) -> String {
        let mut output = format!("Check: {}\n\n", self.out);
        output.push_str(&format!(
            "  ✓ schema: {} tables, {} enum(s), {} relations\n",
            self.tables, self.enums, self.relations
        ));
        output.push_str(&format!("  ✓ journal: {} migration(s)\n", self.migrations));

        if self.up_to_date {
            output.push_str("\nMigrations are up to date with the declared schema.\n");
        } else {
            output.push_str("\nDeclared schema has changes; run `generate`.\n");
        }
        output
    }
}
