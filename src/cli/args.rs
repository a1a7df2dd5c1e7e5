use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::core::runner::RunConfig;
use crate::types::Operation;

/// Bulk suspend/restore of directory accounts from a CSV export
#[derive(Parser, Debug)]
#[command(name = "bulk-lifecycle-engine")]
#[command(about = "Bulk suspend/restore of directory accounts from a CSV export", long_about = None)]
pub struct CliArgs {
    /// Lifecycle operation to apply to each eligible row
    #[arg(value_enum, value_name = "OPERATION")]
    pub operation: Operation,

    /// Path to the input CSV file
    #[arg(long = "csv", value_name = "FILE", default_value = "users.csv")]
    pub csv: PathBuf,

    /// Ignore the status column and process every row
    #[arg(long = "all")]
    pub all: bool,

    /// Simulate the run: no remote calls, no checkpoint changes
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Process only the first eligible row, then stop
    #[arg(long = "test")]
    pub test: bool,

    /// Suppress confirmation and resume prompts
    #[arg(long = "non-interactive")]
    pub non_interactive: bool,

    /// Delay between rows in seconds
    #[arg(long = "delay", value_name = "SECONDS")]
    pub delay: Option<f64>,

    /// Maximum retries per remote call
    #[arg(long = "max-retries", value_name = "COUNT")]
    pub max_retries: Option<u32>,

    /// Delay between retries in seconds
    #[arg(long = "retry-delay", value_name = "SECONDS")]
    pub retry_delay: Option<f64>,
}

impl CliArgs {
    /// Create a RunConfig from CLI arguments
    ///
    /// Flags fall back to the engine defaults when not provided. The
    /// `NON_INTERACTIVE` environment variable also enables non-interactive
    /// mode, matching the flag.
    pub fn to_run_config(&self) -> RunConfig {
        let default = RunConfig::default();
        let env_non_interactive = std::env::var("NON_INTERACTIVE")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        RunConfig {
            max_retries: self.max_retries.unwrap_or(default.max_retries),
            retry_delay: self
                .retry_delay
                .map(Duration::from_secs_f64)
                .unwrap_or(default.retry_delay),
            base_delay: self
                .delay
                .map(Duration::from_secs_f64)
                .unwrap_or(default.base_delay),
            all: self.all,
            dry_run: self.dry_run,
            test: self.test,
            non_interactive: self.non_interactive || env_non_interactive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::suspend(&["program", "suspend"], Operation::Suspend)]
    #[case::restore(&["program", "restore"], Operation::Restore)]
    fn test_operation_parsing(#[case] args: &[&str], #[case] expected: Operation) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.operation, expected);
    }

    #[rstest]
    #[case::defaults(&["program", "suspend"], false, false, false, false)]
    #[case::all(&["program", "suspend", "--all"], true, false, false, false)]
    #[case::dry_run(&["program", "suspend", "--dry-run"], false, true, false, false)]
    #[case::test_mode(&["program", "restore", "--test"], false, false, true, false)]
    #[case::non_interactive(&["program", "restore", "--non-interactive"], false, false, false, true)]
    #[case::combined(
        &["program", "suspend", "--all", "--dry-run", "--test", "--non-interactive"],
        true, true, true, true
    )]
    fn test_flag_parsing(
        #[case] args: &[&str],
        #[case] all: bool,
        #[case] dry_run: bool,
        #[case] test: bool,
        #[case] non_interactive: bool,
    ) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.all, all);
        assert_eq!(parsed.dry_run, dry_run);
        assert_eq!(parsed.test, test);
        assert_eq!(parsed.non_interactive, non_interactive);
    }

    #[test]
    fn test_csv_default() {
        let parsed = CliArgs::try_parse_from(["program", "suspend"]).unwrap();
        assert_eq!(parsed.csv, PathBuf::from("users.csv"));
    }

    #[test]
    fn test_run_config_defaults() {
        let parsed = CliArgs::try_parse_from(["program", "suspend"]).unwrap();
        let config = parsed.to_run_config();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay, Duration::from_secs(1));
        assert_eq!(config.base_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_run_config_overrides() {
        let parsed = CliArgs::try_parse_from([
            "program",
            "restore",
            "--delay",
            "2.5",
            "--max-retries",
            "5",
            "--retry-delay",
            "0.25",
        ])
        .unwrap();
        let config = parsed.to_run_config();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_delay, Duration::from_millis(250));
        assert_eq!(config.base_delay, Duration::from_millis(2500));
    }

    #[rstest]
    #[case::missing_operation(&["program"])]
    #[case::invalid_operation(&["program", "delete"])]
    #[case::bad_retries(&["program", "suspend", "--max-retries", "lots"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        let result = CliArgs::try_parse_from(args);
        assert!(result.is_err());
    }
}
