//! Command dispatch

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::services::svg::group_thousands;
use crate::application::services::{
    export_to_format, render_svg, ChartBuildResult, ChartService, ExportFormat,
};
use crate::cli::args::{Cli, Commands, ConfigCommands, OutputFormat, ScenarioArg};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{
    build_org_tree, optimize_layout, validate_tree, ScenarioKind, ScenarioSummary,
    TreeNodeConvert,
};
use crate::infrastructure::di::ServiceContainer;

/// Execute the parsed command line.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Build {
            roles,
            rates,
            rate,
            format,
            scenario,
            output,
            no_optimize,
        } => {
            let container = load_container(cli)?;
            let request = BuildRequest {
                format: *format,
                scenario: *scenario,
                optimize: !no_optimize,
            };
            cmd_build(&container, roles, rates.as_deref(), rate, &request, output.as_deref())
        }
        Commands::Validate { roles, strict } => {
            let container = load_container(cli)?;
            cmd_validate(&container, roles, *strict)
        }
        Commands::Rates { rates } => {
            let container = load_container(cli)?;
            cmd_rates(&container, rates.as_deref())
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => cmd_config_show(cli.config.as_deref()),
            ConfigCommands::Template => {
                output::info(&Settings::template());
                Ok(())
            }
            ConfigCommands::Path => cmd_config_path(cli.config.as_deref()),
        },
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

fn load_container(cli: &Cli) -> CliResult<ServiceContainer> {
    let settings = Settings::load(cli.config.as_deref())?;
    Ok(ServiceContainer::new(settings))
}

/// Rendering options for `build`.
#[derive(Debug, Clone, Copy)]
pub struct BuildRequest {
    pub format: OutputFormat,
    pub scenario: ScenarioArg,
    /// Sort siblings by cost before rendering
    pub optimize: bool,
}

#[instrument(level = "debug", skip(container, rate_overrides, request))]
fn cmd_build(
    container: &ServiceContainer,
    roles_path: &Path,
    rates_path: Option<&Path>,
    rate_overrides: &[(String, f64)],
    request: &BuildRequest,
    output_path: Option<&Path>,
) -> CliResult<()> {
    let roles = container.loader.load_roles(roles_path)?;
    let custom_rates = collect_custom_rates(container, rates_path, rate_overrides)?;

    let result = container.chart.build_chart(&roles, custom_rates.as_ref())?;
    let svg_width = container.settings.render.svg_width;
    let rendered = render_build(&container.chart, &result, request, svg_width)?;

    match output_path {
        Some(path) => {
            container.loader.write_output(path, &rendered)?;
            output::action("Wrote", &path.display());
        }
        None => output::info(&rendered),
    }

    if request.format == OutputFormat::Summary || output_path.is_some() {
        for issue in &result.issues {
            output::warning(&issue.message);
        }
    }
    Ok(())
}

/// Rates file first, then `--rate` flags on top.
fn collect_custom_rates(
    container: &ServiceContainer,
    rates_path: Option<&Path>,
    rate_overrides: &[(String, f64)],
) -> CliResult<Option<BTreeMap<String, f64>>> {
    let mut rates = match rates_path {
        Some(path) => Some(container.loader.load_rates(path)?),
        None => None,
    };
    if !rate_overrides.is_empty() {
        rates
            .get_or_insert_with(BTreeMap::new)
            .extend(rate_overrides.iter().cloned());
    }
    debug!(custom = rates.as_ref().map_or(0, |r| r.len()), "custom rates");
    Ok(rates)
}

/// Render a built chart in the requested format.
pub fn render_build(
    chart: &ChartService,
    result: &ChartBuildResult,
    request: &BuildRequest,
    svg_width: u32,
) -> CliResult<String> {
    let kind = ScenarioKind::from(request.scenario);
    let tree = match kind {
        ScenarioKind::Baseline => result.tree.clone(),
        _ => chart.scenario_tree(result, kind),
    };
    let tree = if request.optimize {
        optimize_layout(tree)
    } else {
        tree
    };

    let rendered = match request.format {
        OutputFormat::Summary => render_summary(&result.scenarios.iter().collect::<Vec<_>>()),
        OutputFormat::Json => export_to_format(&tree, &result.scenarios, ExportFormat::Json)?,
        OutputFormat::Csv => export_to_format(&tree, &result.scenarios, ExportFormat::Csv)?,
        OutputFormat::Hierarchy => {
            export_to_format(&tree, &result.scenarios, ExportFormat::Hierarchy)?
        }
        OutputFormat::Svg => render_svg(&tree, svg_width),
        OutputFormat::Tree => tree.as_slice().to_tree_string().to_string(),
    };
    Ok(rendered)
}

/// Plain-text scenario comparison table.
pub fn render_summary(summaries: &[&ScenarioSummary]) -> String {
    let mut lines = vec![format!(
        "{:<26} {:>9} {:>8} {:>12} {:>9} {:>20}",
        "Scenario", "Positions", "FTE", "Cost", "Avg span", "Savings"
    )];
    for s in summaries {
        let savings = match (s.savings_vs_baseline, s.savings_percentage) {
            (Some(amount), Some(pct)) => format!("{} ({:.1}%)", group_thousands(amount), pct),
            _ => "-".to_string(),
        };
        lines.push(format!(
            "{:<26} {:>9} {:>8.1} {:>12} {:>9.1} {:>20}",
            s.name,
            s.position_count,
            s.total_fte,
            group_thousands(s.total_cost),
            s.avg_span_of_control,
            savings
        ));
    }
    lines.join("\n")
}

#[instrument(level = "debug", skip(container))]
fn cmd_validate(container: &ServiceContainer, roles_path: &Path, strict: bool) -> CliResult<()> {
    let roles = container.loader.load_roles(roles_path)?;
    let tree = build_org_tree(&roles).map_err(crate::application::ApplicationError::from)?;
    let issues = validate_tree(&tree, &container.settings.validation);

    if issues.is_empty() {
        output::success(&format!("{}: no structural issues", roles_path.display()));
        return Ok(());
    }

    output::header(&format!("{} issue(s) in {}", issues.len(), roles_path.display()));
    for issue in &issues {
        output::failure(&format!("{}: {}", issue.kind, issue.message));
    }
    if strict {
        return Err(CliError::IssuesFound(issues.len()));
    }
    Ok(())
}

fn cmd_rates(container: &ServiceContainer, rates_path: Option<&Path>) -> CliResult<()> {
    let custom = match rates_path {
        Some(path) => Some(container.loader.load_rates(path)?),
        None => None,
    };
    let table = container.chart.rate_table(custom.as_ref());

    output::header("Rates (USD/year)");
    for (title, rate) in table.rates() {
        output::detail(&format!("{:<20} {:>12}", title, group_thousands(rate.round() as i64)));
    }
    output::detail(&format!(
        "unknown titles use {:?}, else {}",
        table.fallback_title(),
        group_thousands(table.default_rate().round() as i64)
    ));
    Ok(())
}

fn cmd_config_show(config: Option<&Path>) -> CliResult<()> {
    let settings = Settings::load(config)?;
    output::info(&settings.to_toml()?);
    Ok(())
}

fn cmd_config_path(config: Option<&Path>) -> CliResult<()> {
    match global_config_path() {
        Some(path) => output::action("Global", &describe_path(&path)),
        None => output::warning("no global config directory on this platform"),
    }
    let local = config
        .map(Path::to_path_buf)
        .unwrap_or_else(|| local_config_path(Path::new(".")));
    output::action("Local", &describe_path(&local));
    Ok(())
}

fn describe_path(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found)", path.display())
    }
}
