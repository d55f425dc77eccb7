//! Rendering of command results.
//!
//! Every result is `Serialize`; the plain-text layout is written per command
//! and the machine formats come for free from serde.

use clap::ValueEnum;
use serde::Serialize;

/// Selected with the global `--format` flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text for terminals
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact toon encoding of the JSON value
    Toon,
}

/// A command result that can be printed.
pub trait Outputable: Serialize {
    fn to_table(&self) -> String;

    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => self.to_table(),
            OutputFormat::Json => serde_json::to_string_pretty(self).unwrap_or_default(),
            OutputFormat::Toon => match serde_json::to_value(self) {
                Ok(value) => toon::encode(&value, None),
                Err(_) => String::new(),
            },
        }
    }
}

/// Indented bullet list, or `empty` when there are no items.
pub fn bullet_list<S: AsRef<str>>(items: &[S], empty: &str) -> String {
    if items.is_empty() {
        return format!("  {}\n", empty);
    }
    items
        .iter()
        .map(|item| format!("  - {}\n", item.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Serialize)]
    struct Sample {
        name: String,
        count: usize,
    }

    impl Outputable for Sample {
        fn to_table(&self) -> String {
            format!("{}: {}", self.name, self.count)
        }
    }

    #[rstest]
    fn test_table_format() {
        let sample = Sample { name: "tables".into(), count: 7 };
        assert_eq!(sample.format(OutputFormat::Table), "tables: 7");
    }

    #[rstest]
    fn test_json_format() {
        let sample = Sample { name: "tables".into(), count: 7 };
        let parsed: serde_json::Value =
            serde_json::from_str(&sample.format(OutputFormat::Json)).unwrap();
        assert_eq!(parsed["count"], 7);
    }

    #[rstest]
    fn test_toon_format_mentions_fields() {
        let sample = Sample { name: "tables".into(), count: 7 };
        let output = sample.format(OutputFormat::Toon);
        assert!(output.contains("name"));
        assert!(output.contains("count"));
    }

    #[rstest]
    fn test_bullet_list() {
        assert_eq!(bullet_list(&["a", "b"], "none"), "  - a\n  - b\n");
        assert_eq!(bullet_list::<&str>(&[], "none"), "  none\n");
    }
}
