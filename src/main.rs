use clap::Parser;
use colored::Colorize;
use miette::Result;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use redundantoverride::baseline::Baseline;
use redundantoverride::report::{ReportFormat, Reporter};
use redundantoverride::{
    Config, FileFinder, FixApplier, Inspector, ProjectBuilder, QuickFix, SearchMode, SourceOrigin,
};

/// redundantoverride - find Java method overrides that add nothing to the method they override
#[derive(Parser, Debug)]
#[command(name = "redundantoverride")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the project directory to analyze
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target directories to analyze (can be specified multiple times)
    #[arg(short, long)]
    target: Vec<PathBuf>,

    /// Patterns to exclude (can be specified multiple times)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Library source roots, used for resolution only (can be specified multiple times)
    #[arg(short, long, value_name = "DIR")]
    library: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file (for json/sarif formats)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Compare against library super methods through their attached sources
    #[arg(long)]
    check_library_methods: bool,

    /// Do not report overrides that only delegate to super
    #[arg(long)]
    ignore_delegates: bool,

    /// Require the override's doc comment to match the super method's
    #[arg(long)]
    check_javadoc: bool,

    /// Disable the abstract-overrides-abstract inspection
    #[arg(long)]
    no_abstract_override: bool,

    /// Probe occurrence counts before scanning for references
    #[arg(long)]
    on_the_fly: bool,

    /// Enable parallel processing for faster analysis
    #[arg(long)]
    parallel: bool,

    /// Apply quick fixes to the reported overrides
    #[arg(long)]
    fix: bool,

    /// Prefer rewriting bodies as explicit super calls over deleting methods
    #[arg(long)]
    replace_with_super: bool,

    /// Interactive mode for fixes (confirm each)
    #[arg(long)]
    interactive: bool,

    /// Dry run - show what would be fixed without making changes
    #[arg(long)]
    dry_run: bool,

    /// Apply fixes without asking for confirmation
    #[arg(short, long)]
    yes: bool,

    /// Generate undo script
    #[arg(long)]
    undo_script: Option<PathBuf>,

    /// Baseline file for ignoring existing issues
    /// New issues not in baseline will be reported
    #[arg(long, value_name = "FILE")]
    baseline: Option<PathBuf>,

    /// Generate a baseline file from current results
    #[arg(long, value_name = "FILE")]
    generate_baseline: Option<PathBuf>,

    /// Exit with status 1 when any finding is reported
    #[arg(long)]
    fail_on_findings: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Terminal,
    Json,
    Sarif,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => ReportFormat::Terminal,
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Sarif => ReportFormat::Sarif,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    info!("redundantoverride v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    let findings_reported = run_analysis(&config, &cli)?;

    if cli.fail_on_findings && findings_reported > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Reports may go to stdout, so logs stay on stderr
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::from_default_locations(&cli.path)?
    };

    // Override with CLI arguments
    if !cli.target.is_empty() {
        config.targets = cli.target.clone();
    }
    if !cli.exclude.is_empty() {
        config.exclude.extend(cli.exclude.clone());
    }
    if !cli.library.is_empty() {
        config.library_paths.extend(cli.library.clone());
    }
    if let Some(format) = cli.format {
        config.report.format = match format {
            OutputFormat::Terminal => "terminal",
            OutputFormat::Json => "json",
            OutputFormat::Sarif => "sarif",
        }
        .to_string();
    }

    let redundant = &mut config.inspections.redundant_override;
    redundant.check_library_methods |= cli.check_library_methods;
    redundant.ignore_delegates |= cli.ignore_delegates;
    redundant.check_javadoc |= cli.check_javadoc;

    if cli.no_abstract_override {
        config.inspections.abstract_override.enabled = false;
    }
    if cli.on_the_fly {
        config.search.mode = SearchMode::OnTheFly;
    }
    config.parallel |= cli.parallel;

    Ok(config)
}

/// Runs the whole pipeline and returns the number of reported findings
fn run_analysis(config: &Config, cli: &Cli) -> Result<usize> {
    let start_time = Instant::now();
    let format: ReportFormat = config.report.format.parse()?;
    let terminal = format == ReportFormat::Terminal;

    // Step 1: Discover files
    info!("Discovering files...");
    let finder = FileFinder::new(config);
    let files = finder.find_files(&cli.path)?;
    let library_files = finder.find_library_files(&cli.path);

    info!(
        "Found {} files to analyze, {} library files",
        files.len(),
        library_files.len()
    );

    if files.is_empty() {
        if !cli.quiet && terminal {
            println!("{}", "No Java files found.".yellow());
        }
        Reporter::new(format, cli.output.clone()).report(&[])?;
        return Ok(0);
    }

    // Step 2: Parse and build the project model
    let mut builder = ProjectBuilder::new()
        .with_parallel(config.parallel)
        .with_progress(terminal && !cli.quiet);
    builder.add_files(&files, SourceOrigin::Project);
    builder.add_files(&library_files, SourceOrigin::LibrarySource);
    let project = builder.build()?;

    // Step 3: Run inspections
    let run = Inspector::from_config(config).run(&project);
    if run.cancelled > 0 {
        warn!("{} checks were cancelled", run.cancelled);
    }
    info!(
        "Checked {} methods in {:.2}s",
        run.methods_checked,
        start_time.elapsed().as_secs_f64()
    );

    let mut findings = run.findings;

    // Step 4: Baseline
    if let Some(path) = &cli.generate_baseline {
        let baseline = Baseline::from_findings(&findings, &cli.path);
        baseline
            .save(path)
            .map_err(|e| miette::miette!("Failed to write baseline: {}", e))?;
        if !cli.quiet && terminal {
            println!(
                "{}",
                format!("Baseline with {} issues written to {}", findings.len(), path.display()).cyan()
            );
        }
    }

    if let Some(path) = &cli.baseline {
        match Baseline::load(path) {
            Ok(baseline) => {
                let stats = baseline.stats(&findings, &cli.path);
                if !cli.quiet && terminal {
                    println!("{}", format!("Baseline: {}", stats).cyan());
                }
                findings = baseline.filter_new(&findings, &cli.path);
            }
            Err(e) => warn!("Ignoring baseline {}: {}", path.display(), e),
        }
    }

    // Step 5: Report
    Reporter::new(format, cli.output.clone())
        .with_fixes(config.report.show_fixes)
        .report(&findings)?;

    // Step 6: Fixes
    if cli.fix || cli.dry_run {
        let preferred = if cli.replace_with_super {
            QuickFix::ReplaceWithSuperDelegation
        } else {
            QuickFix::DeleteOverride
        };
        let summary = FixApplier::new(cli.interactive, cli.dry_run, cli.undo_script.clone())
            .with_preferred(preferred)
            .with_assume_yes(cli.yes)
            .apply(&project, &findings)?;

        if !cli.dry_run {
            println!(
                "{}",
                format!("Applied {} fixes, {} failed", summary.applied, summary.failed).green()
            );
        }
    }

    Ok(findings.len())
}
