//! Fraud Detection Toolkit Core - evaluation and drift monitoring CLI
//!
//! The main entry point for fd-core, handling:
//! - Evaluation reports for scored CSV files
//! - Drift reports between a reference and a current CSV
//! - Drift simulation and preprocessing of CSV files
//! - Configuration inspection and JSON schema export

use clap::{Args, Parser, Subcommand, ValueEnum};
use fd_common::{Error, ErrorCategory, OutputFormat, StructuredError, SCHEMA_VERSION};
use fd_config::{load_config, validate_config, ConfigError, LoadedConfig, ToolkitConfig};
use fd_core::calibrate::ClassificationEvaluator;
use fd_core::drift::{
    affected_rows, drift_report_with, shared_numeric_features, simulate_drift, DriftKind,
    DriftOptions,
};
use fd_core::exit_codes::ExitCode;
use fd_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogFormat, LogLevel, Stage,
};
use fd_core::output::{render_drift, render_evaluation, to_json, FrameSummary};
use fd_core::preprocess::{
    BalanceDeltaTransformer, ClipMethod, FrequencyEncoder, OutlierClipper, Pipeline, Transformer,
};
use fd_core::schema::{available_schemas, format_schema, generate_schema, SchemaFormat};
use fd_core::table::Frame;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Fraud Detection Toolkit - calibration, evaluation and drift monitoring
#[derive(Parser)]
#[command(name = "fd-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Configuration file (JSON or TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate predicted probabilities against labels
    Evaluate(EvaluateArgs),

    /// Compare feature distributions between two CSV files (exit 1 on drift)
    Drift(DriftArgs),

    /// Inject synthetic drift into one column of a CSV file
    Simulate(SimulateArgs),

    /// Apply preprocessing transformers to a CSV file
    Preprocess(PreprocessArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Print JSON Schema for output payloads
    Schema(SchemaArgs),

    /// Print version information
    Version,
}

// ============================================================================
// Command argument structs
// ============================================================================

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Scored CSV file
    #[arg(long)]
    input: PathBuf,

    /// Column holding 0/1 labels
    #[arg(long)]
    label_col: String,

    /// Column holding predicted probabilities
    #[arg(long)]
    prob_col: String,

    /// Decision threshold (overrides config)
    #[arg(long)]
    threshold: Option<f64>,

    /// Calibration bins (overrides config)
    #[arg(long)]
    bins: Option<usize>,

    /// Number of hardest misclassifications to list (overrides config)
    #[arg(long)]
    hard: Option<usize>,

    /// Model name shown in reports (overrides config)
    #[arg(long)]
    model_name: Option<String>,

    /// Also write the JSON report to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DriftArgs {
    /// Reference (training-time) CSV file
    #[arg(long)]
    reference: PathBuf,

    /// Current (production) CSV file
    #[arg(long)]
    current: PathBuf,

    /// Features to compare; defaults to every shared numeric column
    #[arg(long, value_delimiter = ',')]
    features: Option<Vec<String>>,

    /// PSI bins (overrides config)
    #[arg(long)]
    bins: Option<usize>,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// Input CSV file
    #[arg(long)]
    input: PathBuf,

    /// Column to perturb
    #[arg(long)]
    feature: String,

    /// shift, scale, spike or missing
    #[arg(long)]
    kind: String,

    /// Strength of the perturbation
    #[arg(long, default_value_t = fd_core::drift::DEFAULT_MAGNITUDE, allow_negative_numbers = true)]
    magnitude: f64,

    /// Seed for row selection
    #[arg(long, default_value_t = fd_core::drift::DEFAULT_SEED)]
    seed: u64,

    /// Output CSV file
    #[arg(long)]
    output: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ClipChoice {
    Iqr,
    Percentile,
}

#[derive(Args, Debug)]
struct PreprocessArgs {
    /// Input CSV file
    #[arg(long)]
    input: PathBuf,

    /// Output CSV file
    #[arg(long)]
    output: PathBuf,

    /// Frequency-encode these columns; with no value, every categorical column
    #[arg(long, value_delimiter = ',', num_args = 0..=1, default_missing_value = "")]
    frequency: Option<Vec<String>>,

    /// Encode raw counts instead of proportions
    #[arg(long)]
    counts: bool,

    /// Clip numeric columns to learned bounds
    #[arg(long, value_enum)]
    clip: Option<ClipChoice>,

    /// IQR multiplier for --clip iqr
    #[arg(long, default_value_t = 1.5)]
    iqr_factor: f64,

    /// Lower percentile for --clip percentile
    #[arg(long, default_value_t = 1.0)]
    lower_pct: f64,

    /// Upper percentile for --clip percentile
    #[arg(long, default_value_t = 99.0)]
    upper_pct: f64,

    /// Add PaySim balance-discrepancy features
    #[arg(long)]
    balance_delta: bool,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective configuration and where it came from
    Show,

    /// Validate a configuration file (defaults to the resolved one)
    Validate {
        /// File to validate
        path: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Payload name (evaluation, drift, config, config-snapshot)
    name: Option<String>,

    /// List available schemas
    #[arg(long)]
    list: bool,

    /// Single-line JSON
    #[arg(long)]
    compact: bool,
}

// ============================================================================
// Error plumbing
// ============================================================================

/// Anything a command can fail with.
enum CommandError {
    Args(String),
    Core(Error),
    Config(ConfigError),
}

impl From<Error> for CommandError {
    fn from(err: Error) -> Self {
        CommandError::Core(err)
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        CommandError::Config(err)
    }
}

impl CommandError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CommandError::Args(_) => ExitCode::ArgsError,
            CommandError::Core(e) => ExitCode::from(e),
            CommandError::Config(e) => ExitCode::from(e),
        }
    }

    fn structured(&self) -> StructuredError {
        match self {
            CommandError::Core(e) => StructuredError::from(e),
            CommandError::Args(message) => StructuredError {
                code: 1,
                category: ErrorCategory::Input,
                message: message.clone(),
                remediation: "Run with --help to see the available options.".to_string(),
                context: Default::default(),
            },
            CommandError::Config(e) => StructuredError {
                code: e.code(),
                category: ErrorCategory::Config,
                message: e.to_string(),
                remediation: "Run 'fd-core config validate <path>' and fix the reported field."
                    .to_string(),
                context: Default::default(),
            },
        }
    }
}

type CommandResult = Result<ExitCode, CommandError>;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = if e.use_stderr() {
                ExitCode::ArgsError.as_i32()
            } else {
                ExitCode::Clean.as_i32()
            };
            std::process::exit(code);
        }
    };

    let log_config = LogConfig::from_env(
        LogLevel::from_verbosity(cli.global.verbose, cli.global.quiet),
        cli.global.log_format,
    );
    init_logging(&log_config);

    let run_id = generate_run_id();
    info!(
        run_id = %run_id,
        event = event_names::RUN_STARTED,
        stage = %Stage::Init,
        version = env!("CARGO_PKG_VERSION"),
        "fd-core starting"
    );

    let result = match &cli.command {
        Commands::Evaluate(args) => run_evaluate(&cli.global, args),
        Commands::Drift(args) => run_drift(&cli.global, args),
        Commands::Simulate(args) => run_simulate(&cli.global, args),
        Commands::Preprocess(args) => run_preprocess(&cli.global, args),
        Commands::Config(args) => run_config(&cli.global, args),
        Commands::Schema(args) => run_schema(args),
        Commands::Version => print_version(&cli.global),
    };

    let exit_code = match result {
        Ok(code) => {
            info!(run_id = %run_id, event = event_names::RUN_FINISHED, exit_code = code.as_i32(), "fd-core finished");
            code
        }
        Err(err) => {
            let code = err.exit_code();
            let structured = err.structured();
            warn!(
                run_id = %run_id,
                event = event_names::RUN_FAILED,
                exit_code = code.as_i32(),
                error_code = structured.code,
                "{}",
                structured.message
            );
            eprintln!("{}", structured.with_context("exit_code", code.code_name()).to_json());
            code
        }
    };

    std::process::exit(exit_code.as_i32());
}

fn emit(text: &str) {
    print!("{}", text);
    if !text.ends_with('\n') {
        println!();
    }
}

fn load_effective_config(global: &GlobalOpts) -> Result<LoadedConfig, ConfigError> {
    let loaded = load_config(global.config.as_deref())?;
    match &loaded.path {
        Some(path) => info!(
            event = event_names::CONFIG_LOADED,
            stage = %Stage::Init,
            path = %path.display(),
            source = %loaded.source,
            "configuration loaded"
        ),
        None => info!(
            event = event_names::CONFIG_DEFAULT_USED,
            stage = %Stage::Init,
            "using built-in configuration defaults"
        ),
    }
    Ok(loaded)
}

fn read_table(path: &Path) -> Result<Frame, Error> {
    let frame = Frame::read_csv(path)?;
    info!(
        event = event_names::TABLE_LOADED,
        stage = %Stage::Load,
        path = %path.display(),
        rows = frame.n_rows(),
        cols = frame.n_cols(),
        "table loaded"
    );
    Ok(frame)
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_evaluate(global: &GlobalOpts, args: &EvaluateArgs) -> CommandResult {
    let loaded = load_effective_config(global)?;
    let cfg = &loaded.config.evaluation;

    let frame = read_table(&args.input)?;
    let y_true = frame.dense_numeric(&args.label_col)?;
    let y_prob = frame.dense_numeric(&args.prob_col)?;

    let threshold = args.threshold.unwrap_or(cfg.threshold);
    let model_name = args.model_name.clone().unwrap_or_else(|| cfg.model_name.clone());
    let evaluator = ClassificationEvaluator::new(&y_true, &y_prob, threshold, model_name)?
        .with_calibration_bins(args.bins.unwrap_or(cfg.calibration_bins))?;
    let report = evaluator
        .report(args.hard.unwrap_or(cfg.hard_sample_count))?
        .with_config(loaded.snapshot.clone());

    info!(
        event = event_names::EVALUATE_FINISHED,
        stage = %Stage::Evaluate,
        model = %report.model_name,
        n = report.n_samples,
        roc_auc = report.metrics.roc_auc,
        ece = report.metrics.ece,
        "evaluation complete"
    );

    if let Some(path) = &args.output {
        report.write_json(path)?;
        info!(
            event = event_names::REPORT_WRITTEN,
            stage = %Stage::Output,
            path = %path.display(),
            "evaluation report written"
        );
    }

    emit(&render_evaluation(&report, global.format)?);
    Ok(ExitCode::Clean)
}

fn run_drift(global: &GlobalOpts, args: &DriftArgs) -> CommandResult {
    let loaded = load_effective_config(global)?;
    let mut options = DriftOptions::from(&loaded.config.drift);
    if let Some(bins) = args.bins {
        options.n_bins = bins;
    }

    let reference = read_table(&args.reference)?;
    let current = read_table(&args.current)?;

    let features = match &args.features {
        Some(list) => list.clone(),
        None => shared_numeric_features(&reference, &current),
    };
    if features.is_empty() {
        return Err(Error::invalid("no numeric features shared by the reference and current files").into());
    }

    let report =
        drift_report_with(&reference, &current, &features, &options)?.with_config(loaded.snapshot.clone());
    for row in &report.rows {
        info!(
            event = event_names::DRIFT_FEATURE,
            stage = %Stage::Drift,
            feature = %row.feature,
            psi = row.psi,
            alert = %row.psi_alert,
            ks_drift = row.ks_drift,
            "feature compared"
        );
    }

    emit(&render_drift(&report, global.format)?);

    let drifted = report.drifted_features();
    if drifted.is_empty() {
        Ok(ExitCode::Clean)
    } else {
        warn!(
            event = event_names::DRIFT_DETECTED,
            stage = %Stage::Drift,
            features = %drifted.join(","),
            "drift detected"
        );
        Ok(ExitCode::DriftDetected)
    }
}

fn run_simulate(global: &GlobalOpts, args: &SimulateArgs) -> CommandResult {
    let kind: DriftKind = args.kind.parse()?;
    let frame = read_table(&args.input)?;
    let drifted = simulate_drift(&frame, &args.feature, kind, args.magnitude, args.seed)?;
    drifted.write_csv(&args.output)?;

    let mut summary = FrameSummary::new("simulate", args.output.display().to_string(), &drifted)
        .with_detail("feature", &args.feature)
        .with_detail("kind", kind)
        .with_detail("magnitude", args.magnitude)
        .with_detail("seed", args.seed);
    if matches!(kind, DriftKind::Spike | DriftKind::Missing) {
        summary = summary.with_detail("rows_affected", affected_rows(frame.n_rows(), args.magnitude));
    }
    info!(
        event = event_names::SIMULATE_FINISHED,
        stage = %Stage::Simulate,
        feature = %args.feature,
        kind = %kind,
        path = %args.output.display(),
        "drift simulated"
    );

    emit(&summary.render(global.format)?);
    Ok(ExitCode::Clean)
}

fn run_preprocess(global: &GlobalOpts, args: &PreprocessArgs) -> CommandResult {
    let mut pipeline = Pipeline::new();
    if args.balance_delta {
        pipeline = pipeline.push(BalanceDeltaTransformer::default());
    }
    if let Some(columns) = &args.frequency {
        let columns: Vec<String> = columns.iter().filter(|c| !c.is_empty()).cloned().collect();
        let columns = if columns.is_empty() { None } else { Some(columns) };
        pipeline = pipeline.push(FrequencyEncoder::new(columns, !args.counts));
    }
    if let Some(choice) = args.clip {
        let method = match choice {
            ClipChoice::Iqr => ClipMethod::Iqr {
                factor: args.iqr_factor,
            },
            ClipChoice::Percentile => ClipMethod::Percentile {
                lower: args.lower_pct,
                upper: args.upper_pct,
            },
        };
        pipeline = pipeline.push(OutlierClipper::new(method));
    }
    if pipeline.is_empty() {
        return Err(CommandError::Args(
            "no preprocessing step selected; pass --balance-delta, --frequency or --clip".to_string(),
        ));
    }

    let frame = read_table(&args.input)?;
    let steps = pipeline.step_names();
    let out = pipeline.fit_transform(&frame)?;
    out.write_csv(&args.output)?;
    info!(
        event = event_names::PREPROCESS_FINISHED,
        stage = %Stage::Preprocess,
        steps = %steps.join(","),
        path = %args.output.display(),
        "preprocessing complete"
    );

    let summary = FrameSummary::new("preprocess", args.output.display().to_string(), &out)
        .with_detail("steps", &steps);
    emit(&summary.render(global.format)?);
    Ok(ExitCode::Clean)
}

fn run_config(global: &GlobalOpts, args: &ConfigArgs) -> CommandResult {
    match &args.command {
        ConfigCommands::Show => run_config_show(global),
        ConfigCommands::Validate { path } => run_config_validate(global, path.as_deref()),
    }
}

/// Display the effective configuration (defaults if no file is present).
fn run_config_show(global: &GlobalOpts) -> CommandResult {
    let loaded = load_effective_config(global)?;
    let response = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "source": {
            "path": loaded.path.as_ref().map(|p| p.display().to_string()),
            "kind": loaded.source.to_string(),
            "hash": &loaded.snapshot.hash,
            "using_defaults": loaded.path.is_none(),
        },
        "config": &loaded.config,
    });

    match global.format {
        OutputFormat::Json => emit(&to_json(&response)?),
        OutputFormat::Summary => {
            let src = loaded
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in defaults".to_string());
            println!("config: {} ({})", src, loaded.source);
            print_config_values(&loaded.config);
        }
        OutputFormat::Md => {
            println!("# fd-core config show");
            println!();
            match &loaded.path {
                Some(path) => {
                    println!("Source: {} ({})", path.display(), loaded.source);
                    println!("Hash: {}", loaded.snapshot.hash);
                }
                None => println!("Source: **built-in defaults** (no toolkit.json found)"),
            }
            println!();
            println!("```");
            print_config_values(&loaded.config);
            println!("```");
        }
    }
    Ok(ExitCode::Clean)
}

fn print_config_values(config: &ToolkitConfig) {
    let e = &config.evaluation;
    let d = &config.drift;
    println!("  evaluation.threshold         {}", e.threshold);
    println!("  evaluation.calibration_bins  {}", e.calibration_bins);
    println!("  evaluation.hard_sample_count {}", e.hard_sample_count);
    println!("  evaluation.model_name        {}", e.model_name);
    println!("  drift.psi_bins               {}", d.psi_bins);
    println!("  drift.psi_epsilon            {}", d.psi_epsilon);
    println!("  drift.ks_threshold           {}", d.ks_threshold);
    println!("  drift.psi_moderate           {}", d.psi_moderate);
    println!("  drift.psi_significant        {}", d.psi_significant);
}

/// Validate a configuration file.
fn run_config_validate(global: &GlobalOpts, path: Option<&Path>) -> CommandResult {
    let loaded = load_config(path.or(global.config.as_deref()))?;
    // load_config validates; re-check so the intent is explicit when a
    // default config is in use.
    validate_config(&loaded.config).map_err(ConfigError::from)?;

    let response = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "status": "valid",
        "path": loaded.path.as_ref().map(|p| p.display().to_string()),
        "source": loaded.source.to_string(),
        "using_defaults": loaded.path.is_none(),
        "hash": &loaded.snapshot.hash,
    });

    match global.format {
        OutputFormat::Json => emit(&to_json(&response)?),
        OutputFormat::Summary => println!("config validate: OK"),
        OutputFormat::Md => {
            println!("# Configuration Validation");
            println!();
            println!("Status: ✓ Valid");
            match &loaded.path {
                Some(p) => println!("File: {}", p.display()),
                None => println!("File: using built-in defaults"),
            }
        }
    }
    Ok(ExitCode::Clean)
}

fn run_schema(args: &SchemaArgs) -> CommandResult {
    if args.list || args.name.is_none() {
        for (name, desc) in available_schemas() {
            println!("{:<16} {}", name, desc);
        }
        return Ok(ExitCode::Clean);
    }
    let name = args.name.as_deref().unwrap_or_default();
    let schema = generate_schema(name).ok_or_else(|| {
        let names: Vec<&str> = available_schemas().into_iter().map(|(n, _)| n).collect();
        CommandError::Args(format!(
            "unknown schema {:?}; expected one of: {}",
            name,
            names.join(", ")
        ))
    })?;
    let format = if args.compact {
        SchemaFormat::JsonCompact
    } else {
        SchemaFormat::Json
    };
    println!("{}", format_schema(&schema, format));
    Ok(ExitCode::Clean)
}

fn print_version(global: &GlobalOpts) -> CommandResult {
    let version_info = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "fd_core_version": env!("CARGO_PKG_VERSION"),
        "rust_version": env!("CARGO_PKG_RUST_VERSION"),
    });

    match global.format {
        OutputFormat::Json => emit(&to_json(&version_info)?),
        _ => {
            println!("fd-core {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
    Ok(ExitCode::Clean)
}
