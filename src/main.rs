use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use salesforest_pipeline::{PipelineConfig, TestSize, synthetic_sales};
use salesforest_rf::{OobMode, RandomForestConfig, SplitCriterion};

#[derive(Parser)]
#[command(name = "salesforest")]
#[command(about = "Fit a random forest to sales data and report held-out mean squared error")]
#[command(version)]
struct Cli {
    /// Rows in the generated sales table
    #[arg(long, default_value_t = 100)]
    rows: usize,

    /// RNG seed for the generated sales table
    #[arg(long, default_value_t = 7)]
    data_seed: u64,

    /// Fraction of rows held out for testing
    #[arg(long, default_value_t = 0.2)]
    test_size: f64,

    /// RNG seed for the train/test split and the forest
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of trees in the Random Forest
    #[arg(long, default_value_t = 100)]
    n_trees: usize,

    /// Maximum tree depth (unlimited if not set)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Split quality criterion
    #[arg(long, value_enum, default_value_t = CriterionArg::SquaredError)]
    criterion: CriterionArg,

    /// Also compute the out-of-bag score
    #[arg(long, default_value_t = false)]
    oob: bool,

    /// Print the full report as JSON instead of the MSE line
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Enable verbose (debug-level) logging
    #[arg(long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum CriterionArg {
    SquaredError,
    Poisson,
}

impl From<CriterionArg> for SplitCriterion {
    fn from(arg: CriterionArg) -> Self {
        match arg {
            CriterionArg::SquaredError => SplitCriterion::SquaredError,
            CriterionArg::Poisson => SplitCriterion::Poisson,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    let dataset = synthetic_sales(cli.rows, cli.data_seed);
    info!(n_rows = dataset.len(), data_seed = cli.data_seed, "sales table generated");

    let oob_mode = if cli.oob {
        OobMode::Enabled
    } else {
        OobMode::Disabled
    };
    let forest_config = RandomForestConfig::new(cli.n_trees)?
        .with_max_depth(cli.max_depth)
        .with_criterion(cli.criterion.into())
        .with_oob_mode(oob_mode)
        .with_seed(cli.seed);

    let report = PipelineConfig::new(forest_config)
        .with_test_size(TestSize::Fraction(cli.test_size))?
        .with_seed(cli.seed)
        .run(&dataset)
        .context("pipeline failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    Ok(())
}
