//! `salary`: train, serve and query the salary prediction model.

use std::fs;
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use salary_predictor::data::io::load_salary_csv;
use salary_predictor::data::{train_test_split, train_valid_test_split, DEFAULT_TEST_FRACTION};
use salary_predictor::serve::{self, ServeConfig, DEFAULT_ADDR};
use salary_predictor::testing::sample_requests;
use salary_predictor::training::{Mae, Rmse, Verbosity, R2};
use salary_predictor::{
    ArtifactStore, FeatureSchema, GBDTConfig, MetricFn, PredictionService, SalaryPipeline,
};

#[derive(Parser)]
#[command(name = "salary", version)]
#[command(about = "Train and serve a gradient-boosted salary model")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "SALARY_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fit a pipeline on a CSV file and write artifacts
    Train(TrainArgs),
    /// Serve predictions over HTTP
    Serve(ServeArgs),
    /// Run requests through a saved pipeline without HTTP
    Predict(PredictArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Salary survey CSV
    #[arg(long, default_value = "Salary_Data.csv")]
    data: PathBuf,

    /// Output directory for artifacts
    #[arg(long, default_value = "artifacts")]
    out: PathBuf,

    #[arg(long, default_value_t = 300)]
    n_trees: u32,

    #[arg(long, default_value_t = 0.1)]
    learning_rate: f64,

    #[arg(long, default_value_t = 4)]
    max_depth: u32,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value_t = DEFAULT_TEST_FRACTION)]
    test_size: f64,

    /// Stop when validation RMSE (a split of the training rows) stops improving for this many rounds
    #[arg(long)]
    early_stopping_rounds: Option<u32>,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Training threads (default: all cores)
    #[arg(long)]
    threads: Option<NonZeroUsize>,
}

#[derive(Args)]
struct ServeArgs {
    #[arg(long, env = "SALARY_ARTIFACTS", default_value = "artifacts")]
    artifacts: PathBuf,

    #[arg(long, env = "SALARY_ADDR", default_value_t = DEFAULT_ADDR)]
    addr: SocketAddr,

    /// Maximum concurrent predictions (default: CPU cores)
    #[arg(long, env = "SALARY_MAX_CONCURRENCY")]
    max_concurrency: Option<usize>,
}

#[derive(Args)]
struct PredictArgs {
    #[arg(long, env = "SALARY_ARTIFACTS", default_value = "artifacts")]
    artifacts: PathBuf,

    /// JSON file with an array of request objects (default: built-in samples)
    #[arg(long)]
    input: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json)?;

    match cli.command {
        Command::Train(args) => train(args),
        Command::Serve(args) => run_server(args),
        Command::Predict(args) => predict(args),
    }
}

fn init_logging(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter);
    let result = if json {
        subscriber.with(fmt::layer().json()).try_init()
    } else {
        subscriber.with(fmt::layer()).try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to init logging: {e}"))
}

// =============================================================================
// Commands
// =============================================================================

fn train(args: TrainArgs) -> Result<()> {
    if !(0.0..1.0).contains(&args.test_size) {
        bail!("--test-size must be in [0, 1), got {}", args.test_size);
    }

    let schema = FeatureSchema::salary();
    let loaded = load_salary_csv(&args.data, &schema)
        .with_context(|| format!("loading {}", args.data.display()))?;
    let report = loaded.report;
    tracing::info!(
        total = report.total_rows,
        kept = report.kept(),
        dropped_missing = report.dropped_missing,
        dropped_unparseable = report.dropped_unparseable,
        dropped_low_target = report.dropped_low_target,
        "cleaned dataset"
    );

    // Early stopping watches a validation split carved from the training rows.
    let n_rows = loaded.dataset.n_rows();
    let (train_idx, valid_idx, test_idx) = match args.early_stopping_rounds {
        Some(_) => train_valid_test_split(n_rows, args.test_size, DEFAULT_TEST_FRACTION, args.seed),
        None => {
            let (train_idx, test_idx) = train_test_split(n_rows, args.test_size, args.seed);
            (train_idx, Vec::new(), test_idx)
        }
    };
    let train_set = loaded.dataset.select(&train_idx);
    let valid_set = loaded.dataset.select(&valid_idx);
    let test_set = loaded.dataset.select(&test_idx);

    let config = GBDTConfig::builder()
        .n_trees(args.n_trees)
        .learning_rate(args.learning_rate)
        .max_depth(args.max_depth)
        .seed(args.seed)
        .maybe_n_threads(args.threads)
        .maybe_early_stopping_rounds(args.early_stopping_rounds)
        .verbosity(Verbosity::Info)
        .build()?;

    let eval = (!valid_set.is_empty()).then_some(&valid_set);
    let pipeline = SalaryPipeline::fit(&schema, &train_set, eval, &config)?;

    if !test_set.is_empty() {
        let preds = pipeline.predict(&test_set.rows)?;
        let targets = &test_set.targets;
        tracing::info!(
            n_rows = test_set.n_rows(),
            rmse = Rmse.compute(&preds, targets),
            mae = Mae.compute(&preds, targets),
            r2 = R2.compute(&preds, targets),
            "test set evaluation"
        );
    }
    log_top_features(&pipeline);

    let (pipeline_path, mappings_path) = ArtifactStore::save(&args.out, &pipeline)?;
    println!("{}", pipeline_path.display());
    println!("{}", mappings_path.display());
    Ok(())
}

fn log_top_features(pipeline: &SalaryPipeline) {
    let names = pipeline.preprocessor().output_names();
    let mut counts: Vec<(usize, &str)> = pipeline
        .model()
        .split_counts()
        .into_iter()
        .zip(names.iter().map(String::as_str))
        .filter(|(count, _)| *count > 0)
        .collect();
    counts.sort_by(|a, b| b.0.cmp(&a.0));
    for (splits, feature) in counts.into_iter().take(5) {
        tracing::info!(feature, splits, "feature usage");
    }
}

fn run_server(args: ServeArgs) -> Result<()> {
    let config = ServeConfig::builder()
        .artifacts(args.artifacts)
        .addr(args.addr)
        .maybe_max_concurrency(args.max_concurrency)
        .build();

    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    runtime.block_on(serve::serve(config))?;
    Ok(())
}

fn predict(args: PredictArgs) -> Result<()> {
    let requests: Vec<serde_json::Value> = match &args.input {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))?
        }
        None => sample_requests(),
    };

    let store = ArtifactStore::load(&args.artifacts)?;
    let service = PredictionService::new(Arc::new(store));

    for (i, request) in requests.iter().enumerate() {
        let (status, body) = match service.predict(Some(request)) {
            Ok(response) => (200, serde_json::to_value(response)?),
            Err(e) => (e.status().as_u16(), serde_json::json!({ "error": e.to_string() })),
        };
        println!("[{i}] {status} {body}");
    }
    Ok(())
}
