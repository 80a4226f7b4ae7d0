//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::ScenarioKind;

/// Org chart scenario engine: role hierarchies, costing, and restructuring scenarios
#[derive(Parser, Debug)]
#[command(name = "orgchart")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (default: ./.orgchart.toml if present)
    #[arg(long, global = true, env = "ORGCHART_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build, cost and restructure an org chart
    Build {
        /// Role file (.json or .csv)
        #[arg(value_hint = ValueHint::FilePath)]
        roles: PathBuf,

        /// Custom rate file (.json or .toml)
        #[arg(long, value_hint = ValueHint::FilePath)]
        rates: Option<PathBuf>,

        /// Override a single rate, e.g. --rate "Data Scientist=125000"
        #[arg(long = "rate", value_name = "TITLE=AMOUNT", value_parser = parse_rate)]
        rate: Vec<(String, f64)>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
        format: OutputFormat,

        /// Scenario tree to render (tree, svg, hierarchy, csv)
        #[arg(short, long, value_enum, default_value_t = ScenarioArg::Baseline)]
        scenario: ScenarioArg,

        /// Write output to file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Keep input sibling order instead of sorting by cost
        #[arg(long)]
        no_optimize: bool,
    },

    /// Report structural issues in a role file
    Validate {
        /// Role file (.json or .csv)
        #[arg(value_hint = ValueHint::FilePath)]
        roles: PathBuf,

        /// Fail with a data error exit code when issues are found
        #[arg(long)]
        strict: bool,
    },

    /// Show the effective rate table
    Rates {
        /// Custom rate file (.json or .toml)
        #[arg(long, value_hint = ValueHint::FilePath)]
        rates: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a commented config template
    Template,

    /// Show config paths
    Path,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Scenario comparison table and issues
    Summary,
    /// Tree and scenarios as JSON
    Json,
    /// One row per position
    Csv,
    /// SVG chart
    Svg,
    /// Nested hierarchy document (JSON)
    Hierarchy,
    /// Terminal tree
    Tree,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioArg {
    Baseline,
    Moderate,
    Aggressive,
}

impl From<ScenarioArg> for ScenarioKind {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::Baseline => ScenarioKind::Baseline,
            ScenarioArg::Moderate => ScenarioKind::Moderate,
            ScenarioArg::Aggressive => ScenarioKind::Aggressive,
        }
    }
}

/// Parse `TITLE=AMOUNT`; the title may itself contain spaces.
pub fn parse_rate(s: &str) -> Result<(String, f64), String> {
    let (title, amount) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected TITLE=AMOUNT, got {s:?}"))?;
    let title = title.trim();
    if title.is_empty() {
        return Err(format!("missing title in {s:?}"));
    }
    let amount: f64 = amount
        .trim()
        .parse()
        .map_err(|e| format!("invalid amount in {s:?}: {e}"))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(format!("rate must be a non-negative number, got {amount}"));
    }
    Ok((title.to_string(), amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_rate_with_spaces_when_parsing_then_title_kept_whole() {
        let (title, amount) = parse_rate("Data Scientist = 125000").unwrap();
        assert_eq!(title, "Data Scientist");
        assert_eq!(amount, 125_000.0);
    }

    #[test]
    fn given_malformed_rates_when_parsing_then_rejected() {
        assert!(parse_rate("Manager").is_err());
        assert!(parse_rate("=1000").is_err());
        assert!(parse_rate("Manager=lots").is_err());
        assert!(parse_rate("Manager=-5").is_err());
    }

    #[test]
    fn given_build_args_when_parsing_then_repeated_rates_collected() {
        let cli = Cli::try_parse_from([
            "orgchart",
            "-vv",
            "build",
            "roles.json",
            "--rate",
            "Manager=99000",
            "--rate",
            "Lead=90000",
            "--format",
            "csv",
            "--scenario",
            "aggressive",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Build {
                rate,
                format,
                scenario,
                no_optimize,
                ..
            } => {
                assert_eq!(rate.len(), 2);
                assert_eq!(rate[1], ("Lead".to_string(), 90_000.0));
                assert_eq!(format, OutputFormat::Csv);
                assert_eq!(scenario, ScenarioArg::Aggressive);
                assert!(!no_optimize);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
