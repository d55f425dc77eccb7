//! CLI parsing tests for generate command using the test DSL.

#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use clap::Parser;
    use rstest::rstest;

    crate::cli_defaults_test! {
        command: "generate",
        variant: Generate,
        required_args: [],
        defaults: {
            name: None,
        },
    }

    crate::cli_option_test! {
        command: "generate",
        variant: Generate,
        test_name: test_generate_with_name,
        args: ["--name", "add_isbn"],
        field: name,
        expected: Some("add_isbn".to_string()),
    }

    crate::cli_option_test! {
        command: "generate",
        variant: Generate,
        test_name: test_generate_with_short_name,
        args: ["-n", "init"],
        field: name,
        expected: Some("init".to_string()),
    }
}
