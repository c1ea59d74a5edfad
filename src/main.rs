use clap::Parser;
use log::info;
use ndarray::Axis;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_elm::metrics::rmse;
use rust_elm::parsing::scaling::MinMaxScaler;
use rust_elm::parsing::{table, Dataset};
use rust_elm::{Elm, ElmConfig, Model, Result, DEFAULT_HIDDEN_LAYER_SIZE};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The path of the dataset (numeric CSV, targets in the last columns)
    #[arg(short, long)]
    data_path: String,

    /// How many trailing columns of each record are targets
    #[arg(short, long, default_value_t = 1)]
    target_columns: usize,

    /// Number of random hidden units
    #[arg(short = 'n', long, default_value_t = DEFAULT_HIDDEN_LAYER_SIZE)]
    hidden_layer_size: usize,

    /// Fraction of the instances held out for testing
    #[arg(short = 'f', long, default_value_t = 0.33)]
    test_fraction: f64,

    /// Seed for the split and the random projection
    /// If this parameter is not provided, OS entropy is used instead
    #[arg(short, long, default_value = None)]
    seed: Option<u64>,

    /// Whether the first line of the CSV is a header
    #[arg(long)]
    has_headers: bool,

    /// Write the test predictions to this CSV file
    #[arg(short, long, default_value = None)]
    output_path: Option<String>,
}

/// One row of the predictions file
#[derive(Serialize)]
struct PredictionRecord {
    instance: usize,
    output: usize,
    predicted: f64,
    actual: f64,
}

/// Predict every test instance one at a time, printing predicted vs actual
fn test_model(model: &Elm, dataset: &Dataset) -> Result<Vec<PredictionRecord>> {
    let mut records = vec![];

    for (instance, (row, target)) in dataset
        .data
        .axis_iter(Axis(0))
        .zip(dataset.target.axis_iter(Axis(0)))
        .enumerate()
    {
        let prediction = model.predict_one(&row)?;
        println!("{}    {}", prediction, target);

        for (output, (p, a)) in prediction.iter().zip(target.iter()).enumerate() {
            records.push(PredictionRecord {
                instance,
                output,
                predicted: *p,
                actual: *a,
            });
        }
    }

    Ok(records)
}

/// Write the predictions in CSV format
fn write_predictions(output_path: &str, records: &[PredictionRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(output_path)?;

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

fn run(args: Args) -> Result<()> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let raw = table::parse_dataset(&args.data_path, args.target_columns, args.has_headers)?;
    let (_, scaled) = MinMaxScaler::fit_transform(&raw.data.view())?;
    let dataset = Dataset::new(scaled, raw.target)?;
    let (train, test) = dataset.split(args.test_fraction, &mut rng)?;

    info!(
        "loaded {} instances with {} features ({} train, {} test)",
        dataset.num_samples(),
        dataset.num_features(),
        train.num_samples(),
        test.num_samples()
    );

    let mut model = Elm::from_config(&ElmConfig {
        hidden_layer_size: args.hidden_layer_size,
        seed: args.seed,
    })?;
    model.fit(&train)?;

    let records = test_model(&model, &test)?;
    let predictions = model.predict(&test.data.view())?;
    println!(
        "The test RMSE is {}",
        rmse(&predictions.view(), &test.target.view())?
    );

    if let Some(output_path) = args.output_path {
        write_predictions(&output_path, &records)?;
        info!("wrote {} predictions to {}", records.len(), output_path);
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
