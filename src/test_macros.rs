//! Declarative macros for generating CLI parsing and output tests.
//!
//! Instead of writing repetitive test functions, declare the test cases and
//! let the macro generate the actual test code. Modules using the CLI macros
//! must import `crate::cli::Args`, `clap::Parser` and `rstest::rstest`.

/// Parse `bookstore_schema <command> <args...>` and unwrap the expected variant.
#[macro_export]
#[doc(hidden)]
macro_rules! parse_command {
    ($cmd:literal, $variant:ident, [$($arg:literal),*]) => {{
        let args = Args::try_parse_from(["bookstore_schema", $cmd $(, $arg)*])
            .expect(concat!("`", $cmd, "` should parse"));
        let crate::commands::Command::$variant(cmd) = args.command else {
            panic!(concat!("`", $cmd, "` did not parse as ", stringify!($variant)));
        };
        cmd
    }};
}

/// Generate a test checking every listed field's default value.
#[macro_export]
macro_rules! cli_defaults_test {
    (
        command: $cmd:literal,
        variant: $variant:ident,
        required_args: [$($req_arg:literal),*],
        defaults: {
            $($def_field:ident : $def_expected:expr),* $(,)?
        } $(,)?
    ) => {
        #[rstest]
        fn test_defaults() {
            let cmd = $crate::parse_command!($cmd, $variant, [$($req_arg),*]);
            $(
                assert_eq!(cmd.$def_field, $def_expected, stringify!($def_field));
            )*
        }
    };
}

/// Generate a test checking that `args` set `field` to `expected`.
#[macro_export]
macro_rules! cli_option_test {
    (
        command: $cmd:literal,
        variant: $variant:ident,
        test_name: $test_name:ident,
        args: [$($arg:literal),+],
        field: $field:ident,
        expected: $expected:expr $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            let cmd = $crate::parse_command!($cmd, $variant, [$($arg),+]);
            assert_eq!(cmd.$field, $expected, stringify!($field));
        }
    };
}

/// Generate a test that verifies a CLI invocation is rejected.
///
/// # Example
/// ```ignore
/// cli_error_test! {
///     command: "push",
///     test_name: test_push_rejects_value_for_flag,
///     args: ["--force=maybe"],
/// }
/// ```
#[macro_export]
macro_rules! cli_error_test {
    (
        command: $cmd:literal,
        test_name: $test_name:ident,
        args: [$($arg:literal),+] $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            let parsed = Args::try_parse_from(["bookstore_schema", $cmd, $($arg),+]);
            assert!(parsed.is_err(), "expected a parse error");
        }
    };
}

// =============================================================================
// Output Test Macros
// =============================================================================

/// Generate a test that verifies JSON output is valid and contains expected fields.
///
/// # Example
/// ```ignore
/// output_json_test! {
///     test_name: test_format_json,
///     fixture: status_result,
///     fixture_type: StatusResult,
///     assertions: {
///         "backend": "PostgreSQL",
///     },
/// }
/// ```
#[macro_export]
macro_rules! output_json_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        assertions: { $($field:literal : $expected:expr),* $(,)? } $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use crate::output::{Outputable, OutputFormat};
            let output = $fixture.format(OutputFormat::Json);
            let json: serde_json::Value = serde_json::from_str(&output).unwrap();
            $(
                assert_eq!(json[$field], $expected, $field);
            )*
        }
    };
}

/// Generate a test that verifies Toon output contains expected strings.
#[macro_export]
macro_rules! output_toon_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        contains: [$($needle:literal),* $(,)?] $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use crate::output::{Outputable, OutputFormat};
            let output = $fixture.format(OutputFormat::Toon);
            for needle in [$($needle),*] {
                assert!(output.contains(needle), "missing {needle:?} in:\n{output}");
            }
        }
    };
}
