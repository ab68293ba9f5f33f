//! mermaid-timeline CLI
//!
//! Reads a project timeline spreadsheet, resolves it and writes a Mermaid
//! Gantt chart, optionally exporting it to PNG or SVG through `mmdc`.

mod diagnostics;
mod mmdc;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use timeline_core::{ChartRenderer, GenerateError, ScheduledItem, Timeline};
use timeline_render::{derive_title, MermaidRenderer};
use timeline_solver::{group_progress, TimelineBuilder};

use diagnostics::{
    Diagnostic, DiagnosticConfig, DiagnosticEmitter, ExitCode, JsonDiagnostic, JsonEmitter,
    TerminalEmitter,
};
use mmdc::{ImageFormat, MermaidCli, DEFAULT_MMDC};

#[derive(Parser)]
#[command(name = "mermaid-timeline")]
#[command(author, version, about = "Turn project timeline spreadsheets into Mermaid Gantt charts", long_about = None)]
struct Cli {
    /// Verbose output (-v warn, -vv info, -vvv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a chart image (PNG or SVG) via the Mermaid CLI
    Render {
        /// Input file path (.csv, .xlsx, .xls)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output image path; its extension must match --format
        #[arg(short, long)]
        output: PathBuf,

        /// Image format
        #[arg(short, long, value_enum, default_value_t = ImageFormat::Png)]
        format: ImageFormat,

        /// Mermaid CLI executable
        #[arg(long, env = "MERMAID_TIMELINE_MMDC", default_value = DEFAULT_MMDC)]
        mmdc: PathBuf,

        #[command(flatten)]
        chart: ChartArgs,
    },

    /// Print or write the Mermaid chart text
    Mermaid {
        /// Input file path (.csv, .xlsx, .xls)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        chart: ChartArgs,
    },

    /// Validate an input file and report rejected rows
    Check {
        /// Input file path (.csv, .xlsx, .xls)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,

        /// Treat rejected rows as errors
        #[arg(long)]
        strict: bool,

        /// Only print errors
        #[arg(short, long)]
        quiet: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Chart options shared by `render` and `mermaid`
#[derive(Args, Debug)]
struct ChartArgs {
    /// Chart title (derived from the input file name if omitted)
    #[arg(short, long)]
    title: Option<String>,

    /// Hide Saturdays and Sundays on the time axis
    #[arg(long)]
    exclude_weekends: bool,

    /// Leave bars untagged instead of marking them done/active
    #[arg(long)]
    no_status: bool,

    /// Axis tick label format (d3 time format)
    #[arg(long, default_value = "%d.%m")]
    axis_format: String,

    /// Label of the section that holds milestones
    #[arg(long, default_value = "Milestones")]
    milestone_section: String,

    /// Refuse to produce a chart if any row was rejected
    #[arg(long)]
    strict: bool,
}

impl ChartArgs {
    fn renderer(&self) -> MermaidRenderer {
        let mut renderer = MermaidRenderer::new()
            .axis_format(&self.axis_format)
            .milestone_section(&self.milestone_section);
        if self.no_status {
            renderer = renderer.no_status();
        }
        if self.exclude_weekends {
            renderer = renderer.exclude_weekends();
        }
        renderer
    }

    fn title_for(&self, file: &Path) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| derive_title(&file.to_string_lossy()))
    }

    fn diagnostic_config(&self, file: &Path) -> DiagnosticConfig {
        DiagnosticConfig {
            strict: self.strict,
            quiet: false,
            file: Some(file.display().to_string()),
        }
    }
}

fn main() -> Result<std::process::ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match cli.command {
        Commands::Render {
            file,
            output,
            format,
            mmdc,
            chart,
        } => cmd_render(&file, &output, format, &MermaidCli::new(mmdc), &chart)?,
        Commands::Mermaid {
            file,
            output,
            chart,
        } => cmd_mermaid(&file, output.as_deref(), &chart)?,
        Commands::Check {
            file,
            format,
            strict,
            quiet,
        } => {
            let config = DiagnosticConfig {
                strict,
                quiet,
                file: Some(file.display().to_string()),
            };
            cmd_check(&file, format, config)?
        }
    };

    Ok(code.into())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

// ============================================================================
// Pipeline
// ============================================================================

/// Read and resolve an input file, reporting rejected rows.
///
/// Returns the number of data rows read and the timeline, which is `None`
/// when no row was usable.
fn load_timeline<E: DiagnosticEmitter>(
    file: &Path,
    emitter: &mut E,
) -> Result<(usize, Option<Timeline>)> {
    let rows = timeline_parser::parse_file(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    info!("Read {} rows from {}", rows.len(), file.display());

    match TimelineBuilder::new().build(&rows) {
        Ok(timeline) => {
            for failure in &timeline.failures {
                emitter.emit(Diagnostic::rejected_row(failure));
            }
            Ok((rows.len(), Some(timeline)))
        }
        Err(GenerateError::NoValidData {
            total_rows,
            failures,
        }) => {
            for failure in &failures {
                emitter.emit(Diagnostic::rejected_row(failure));
            }
            let hint = if failures.is_empty() {
                "the file has a header row but no data rows".to_string()
            } else {
                format!("{} rows rejected; see the diagnostics above", failures.len())
            };
            emitter.emit(Diagnostic::no_valid_data(total_rows).with_note(hint));
            Ok((total_rows, None))
        }
        Err(e) => Err(e.into()),
    }
}

/// Resolve and render, or `None` if the run must stop with a failure
fn chart_text(file: &Path, chart: &ChartArgs) -> Result<Option<String>> {
    let mut emitter = TerminalEmitter::new(io::stderr(), chart.diagnostic_config(file));
    let (_, timeline) = load_timeline(file, &mut emitter)?;

    let Some(timeline) = timeline else {
        return Ok(None);
    };
    if !emitter.exit_code().is_success() {
        return Ok(None);
    }

    let diagram = chart
        .renderer()
        .render(&timeline, &chart.title_for(file))
        .context("failed to render chart")?;
    Ok(Some(diagram))
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_mermaid(file: &Path, output: Option<&Path>, chart: &ChartArgs) -> Result<ExitCode> {
    let Some(diagram) = chart_text(file, chart)? else {
        return Ok(ExitCode::Failure);
    };

    match output {
        Some(path) => {
            mmdc::write_diagram(path, &diagram)?;
            println!("Mermaid chart written to {}", path.display());
        }
        None => print!("{diagram}"),
    }
    Ok(ExitCode::Success)
}

fn cmd_render(
    file: &Path,
    output: &Path,
    format: ImageFormat,
    cli: &MermaidCli,
    chart: &ChartArgs,
) -> Result<ExitCode> {
    mmdc::check_extension(output, format)?;

    let Some(diagram) = chart_text(file, chart)? else {
        return Ok(ExitCode::Failure);
    };

    let mmd = mmdc::mermaid_path(output);
    mmdc::write_diagram(&mmd, &diagram)?;
    cli.convert(&mmd, output)?;

    println!("Chart saved to {}", output.display());
    Ok(ExitCode::Success)
}

/// Machine-readable `check` result
#[derive(Debug, Serialize)]
struct CheckReport {
    file: String,
    rows: usize,
    usable: usize,
    sections: usize,
    bars: usize,
    milestones: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_date: Option<NaiveDate>,
    groups: Vec<GroupReport>,
    diagnostics: Vec<JsonDiagnostic>,
}

#[derive(Debug, Serialize)]
struct GroupReport {
    name: String,
    members: usize,
    complete: usize,
    finish: NaiveDate,
}

impl CheckReport {
    fn new(file: &Path, rows: usize, timeline: Option<&Timeline>) -> Self {
        let mut report = Self {
            file: file.display().to_string(),
            rows,
            usable: 0,
            sections: 0,
            bars: 0,
            milestones: 0,
            first_date: None,
            last_date: None,
            groups: Vec::new(),
            diagnostics: Vec::new(),
        };

        if let Some(timeline) = timeline {
            let items: Vec<ScheduledItem> = timeline.items().cloned().collect();
            report.usable = rows.saturating_sub(timeline.failures.len());
            report.sections = timeline.sections.len();
            report.bars = items.len();
            report.milestones = timeline.milestones.len();
            if let Some((first, last)) = timeline.date_range() {
                report.first_date = Some(first);
                report.last_date = Some(last);
            }
            report.groups = group_progress(&items)
                .into_iter()
                .map(|g| GroupReport {
                    name: g.name,
                    members: g.members,
                    complete: g.complete,
                    finish: g.finish,
                })
                .collect();
        }
        report
    }

    fn print_text(&self) {
        println!(
            "Checked {}: {} of {} rows usable",
            self.file, self.usable, self.rows
        );
        if self.usable == 0 {
            return;
        }
        println!(
            "  {} sections, {} bars, {} milestones",
            self.sections, self.bars, self.milestones
        );
        if let (Some(first), Some(last)) = (self.first_date, self.last_date) {
            println!("  span {first} .. {last}");
        }
        for group in &self.groups {
            if group.complete == group.members {
                println!(
                    "  group {}: {}/{} complete, milestone {}",
                    group.name, group.complete, group.members, group.finish
                );
            } else {
                println!(
                    "  group {}: {}/{} complete",
                    group.name, group.complete, group.members
                );
            }
        }
    }
}

fn cmd_check(file: &Path, format: ReportFormat, config: DiagnosticConfig) -> Result<ExitCode> {
    match format {
        ReportFormat::Text => {
            let quiet = config.quiet;
            let mut emitter = TerminalEmitter::new(io::stderr(), config);
            let (rows, timeline) = load_timeline(file, &mut emitter)?;
            if !quiet {
                CheckReport::new(file, rows, timeline.as_ref()).print_text();
            }
            Ok(emitter.exit_code())
        }
        ReportFormat::Json => {
            let mut emitter = JsonEmitter::new(config);
            let (rows, timeline) = load_timeline(file, &mut emitter)?;
            let code = emitter.exit_code();

            let mut report = CheckReport::new(file, rows, timeline.as_ref());
            report.diagnostics = emitter.into_diagnostics();
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(code)
        }
    }
}
