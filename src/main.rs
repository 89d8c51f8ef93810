//! sqlgauge - an execution-based evaluation harness for text-to-SQL
//! generation.

use tracing::{error, info};

use sqlgauge::app;
use sqlgauge::cli::Cli;
use sqlgauge::config::Config;
use sqlgauge::dataset::EvaluationDataset;
use sqlgauge::error::Result;
use sqlgauge::llm;
use sqlgauge::logging;

#[tokio::main]
async fn main() {
    // API keys may live in a .env next to the data.
    dotenvy::dotenv().ok();
    logging::init();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    cli.apply_to(&mut config);

    let dataset_config = config.resolve_dataset()?;
    let filter = config.question_filter();
    let options = config.eval_options()?;
    let mut dataset = EvaluationDataset::load(&dataset_config, &filter, options)?;

    if cli.gold_check {
        let report = app::run_gold_check(&mut dataset, cli.limit).await;
        println!("{}", report.summary());
        return Ok(());
    }

    let provider = config.provider()?;
    let model = config.model(provider);
    info!("Generator: {provider} ({model})");
    let generator = llm::create_generator(provider, &model)?;

    let report = app::run_evaluation(&mut dataset, &generator, cli.limit).await;
    println!("{}", report.summary(&dataset));

    Ok(())
}
