//! Output formatting for export command results.

use super::execute::ExportResult;
use crate::db::migrations::join_statements;
use crate::output::Outputable;

impl Outputable for ExportResult {
    fn to_table(&self) -> String {
        if self.breakpoints {
            join_statements(&self.statements)
        } else {
            let mut sql = self.statements.join("\n\n");
            sql.push('\n');
            sql
        }
    }
}
