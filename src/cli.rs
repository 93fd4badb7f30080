//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde_json::Value;

/// Create a claim on a Wikibase entity.
///
/// The value is encoded according to the property's datatype, taken from
/// `--datatype` or from a `--properties` JSON file mapping property ids to
/// datatype names. Credentials come from `WIKIBASE_USERNAME` and
/// `WIKIBASE_PASSWORD` (bot password) or `WIKIBASE_OAUTH_TOKEN`.
#[derive(Parser, Debug)]
#[command(name = "wikibase-edit")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Wikibase instance base URL
    #[arg(short, long, default_value = "https://www.wikidata.org")]
    pub instance: String,

    /// Entity receiving the claim (e.g. Q4115189)
    #[arg(short, long)]
    pub entity: String,

    /// Property id (e.g. P31)
    #[arg(short, long)]
    pub property: String,

    /// Claim value; values starting with `{` or `"` are parsed as JSON
    #[arg(
        long,
        allow_hyphen_values = true,
        required_unless_present = "snaktype",
        conflicts_with = "snaktype"
    )]
    pub value: Option<String>,

    /// Create a novalue or somevalue claim instead of a value claim
    #[arg(long, value_enum)]
    pub snaktype: Option<SnaktypeArg>,

    /// Datatype of the property (e.g. wikibase-item, time, quantity)
    #[arg(short, long, conflicts_with = "properties")]
    pub datatype: Option<String>,

    /// JSON file mapping property ids to datatypes
    #[arg(long)]
    pub properties: Option<PathBuf>,

    /// Edit summary
    #[arg(short, long, default_value = "")]
    pub summary: String,

    /// Mark the edit as a bot edit
    #[arg(long)]
    pub bot: bool,

    /// Override the User-Agent header
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Print the request payload instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

/// Snaktype overrides accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SnaktypeArg {
    Novalue,
    Somevalue,
}

/// Interprets a `--value` argument: JSON objects and quoted strings are
/// parsed, anything else is taken as a plain string.
///
/// # Errors
///
/// Returns the JSON error when a value that looks like JSON does not parse.
pub fn parse_value_arg(raw: &str) -> Result<Value, serde_json::Error> {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('"') {
        serde_json::from_str(trimmed)
    } else {
        Ok(Value::String(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn base() -> Vec<&'static str> {
        vec!["wikibase-edit", "-e", "Q1", "-p", "P578"]
    }

    #[test]
    fn test_cli_minimal_args() {
        let mut argv = base();
        argv.extend(["--value", "1802"]);
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(args.instance, "https://www.wikidata.org");
        assert_eq!(args.value.as_deref(), Some("1802"));
        assert!(!args.bot);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_cli_value_may_start_with_hyphen() {
        for value in ["-9002", "-0.25", "-0044-03-15"] {
            let mut argv = base();
            argv.extend(["--value", value]);
            let args = Args::try_parse_from(argv).unwrap();
            assert_eq!(args.value.as_deref(), Some(value));
        }
    }

    #[test]
    fn test_cli_requires_value_or_snaktype() {
        let err = Args::try_parse_from(base()).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let mut argv = base();
        argv.extend(["--snaktype", "novalue"]);
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(args.snaktype, Some(SnaktypeArg::Novalue));
    }

    #[test]
    fn test_cli_value_conflicts_with_snaktype() {
        let mut argv = base();
        argv.extend(["--value", "x", "--snaktype", "somevalue"]);
        let err = Args::try_parse_from(argv).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let mut argv = base();
        argv.extend(["--value", "x", "-vv"]);
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["wikibase-edit", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_parse_value_arg() {
        assert_eq!(parse_value_arg("1802").unwrap(), json!("1802"));
        assert_eq!(parse_value_arg("Q5").unwrap(), json!("Q5"));
        assert_eq!(
            parse_value_arg(r#"{"text":"bulgroz","language":"fr"}"#).unwrap(),
            json!({"text": "bulgroz", "language": "fr"})
        );
        assert_eq!(parse_value_arg(r#""quoted""#).unwrap(), json!("quoted"));
        assert!(parse_value_arg("{broken").is_err());
    }
}
