use std::io::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use covgate::cli::{self, ChangedOptions, ExitStatus, GateOutcome, Style};
use covgate::config::{self, ThresholdOverrides};
use covgate::error::CovgateError;
use covgate::model::EmptyDenominator;
use covgate::render::{JsonFormatter, MarkdownFormatter, SummaryFormatter, TextFormatter};

/// covgate — JaCoCo coverage threshold gate for CI.
#[derive(Parser)]
#[command(name = "covgate", version, about)]
struct Cli {
    /// Output style for the summary printed to stdout.
    #[arg(long, global = true, value_enum, default_value_t = Style::Text)]
    style: Style,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check coverage restricted to a changed-file set (pull-request gating).
    Changed {
        /// Path to the JaCoCo XML report.
        #[arg(long)]
        report: PathBuf,

        /// Path to a newline-separated list of changed file paths.
        #[arg(long)]
        changed_files: PathBuf,

        /// Source-root prefix to strip (e.g. backend/src/main/java).
        #[arg(long)]
        src_root: String,

        /// Extension of source files that participate in coverage.
        #[arg(long, default_value = ".java")]
        source_ext: String,

        /// Minimum LINE percentage (0 disables; falls back to $MIN_LINE).
        #[arg(long)]
        min_line: Option<f64>,

        /// Minimum BRANCH percentage.
        #[arg(long)]
        min_branch: Option<f64>,

        /// Minimum INSTRUCTION percentage.
        #[arg(long)]
        min_instruction: Option<f64>,

        /// Minimum METHOD percentage.
        #[arg(long)]
        min_method: Option<f64>,

        /// Minimum CLASS percentage.
        #[arg(long)]
        min_class: Option<f64>,

        /// Exit non-zero when no changed file matched any coverage data.
        #[arg(long)]
        fail_if_no_data: bool,

        /// How to report a metric with no measurable units.
        #[arg(long, value_enum, default_value_t = EmptyDenominator::Uncovered)]
        empty_denominator: EmptyDenominator,
    },

    /// Check overall repository coverage from the report totals.
    Overall {
        /// Path to the JaCoCo XML report.
        #[arg(long)]
        report: PathBuf,

        /// Minimum LINE percentage (0 disables; falls back to $MIN_LINE).
        #[arg(long)]
        min_line: Option<f64>,

        /// Minimum BRANCH percentage.
        #[arg(long)]
        min_branch: Option<f64>,

        /// Minimum INSTRUCTION percentage.
        #[arg(long)]
        min_instruction: Option<f64>,

        /// Minimum METHOD percentage.
        #[arg(long)]
        min_method: Option<f64>,

        /// Minimum CLASS percentage.
        #[arg(long)]
        min_class: Option<f64>,

        /// How to report a metric with no measurable units.
        #[arg(long, value_enum, default_value_t = EmptyDenominator::FullyCovered)]
        empty_denominator: EmptyDenominator,
    },
}

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(status) => std::process::exit(status.code()),
        Err(err) => {
            // No partial summary on fatal errors, only the diagnostic.
            eprintln!("[ERROR] {err:#}");
            let status = err
                .downcast_ref::<CovgateError>()
                .map(exit_status_for)
                .unwrap_or(ExitStatus::ReportUnreadable);
            std::process::exit(status.code());
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitStatus> {
    let style = cli.style;
    let outcome = match cli.command {
        Commands::Changed {
            report,
            changed_files,
            src_root,
            source_ext,
            min_line,
            min_branch,
            min_instruction,
            min_method,
            min_class,
            fail_if_no_data,
            empty_denominator,
        } => {
            let thresholds = config::resolve_thresholds(&ThresholdOverrides {
                line: min_line,
                branch: min_branch,
                instruction: min_instruction,
                method: min_method,
                class: min_class,
            });
            let opts = ChangedOptions {
                src_root,
                source_ext,
                thresholds,
                empty: empty_denominator,
                fail_if_no_data,
            };
            cli::cmd_changed(&report, &changed_files, &opts)?
        }
        Commands::Overall {
            report,
            min_line,
            min_branch,
            min_instruction,
            min_method,
            min_class,
            empty_denominator,
        } => {
            let thresholds = config::resolve_thresholds(&ThresholdOverrides {
                line: min_line,
                branch: min_branch,
                instruction: min_instruction,
                method: min_method,
                class: min_class,
            });
            cli::cmd_overall(&report, &thresholds, empty_denominator)?
        }
    };

    emit(&outcome, style);
    Ok(outcome.status)
}

/// Print the summary to stdout in the requested style and append the
/// markdown rendering to the CI step-summary file when one is configured.
/// Both are best-effort; the exit code remains the authoritative signal.
fn emit(outcome: &GateOutcome, style: Style) {
    let formatter: Box<dyn SummaryFormatter> = match style {
        Style::Text => Box::new(TextFormatter),
        Style::Markdown => Box::new(MarkdownFormatter),
        Style::Json => Box::new(JsonFormatter),
    };
    print!("{}", formatter.format(&outcome.summary));

    if let Ok(path) = std::env::var("GITHUB_STEP_SUMMARY") {
        if !path.is_empty() {
            let markdown = MarkdownFormatter.format(&outcome.summary);
            if let Err(err) = append_to_file(&path, &markdown) {
                eprintln!("[WARN] failed to write step summary to '{path}': {err}");
            }
        }
    }
}

fn append_to_file(path: &str, content: &str) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)?;
    file.write_all(content.as_bytes())
}

fn exit_status_for(err: &CovgateError) -> ExitStatus {
    match err {
        CovgateError::NoUsableCounters => ExitStatus::NoCoverageData,
        CovgateError::Io(_) | CovgateError::Xml { .. } => ExitStatus::ReportUnreadable,
    }
}
