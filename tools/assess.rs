//! Submission tool
//!
//! Takes the fields of the transaction entry form, scores them either locally
//! against a model file or through the scoring service, and prints the model
//! inputs and the prediction.

use anyhow::{Context, Result};
use card_fraud_scorer::{
    config::AppConfig,
    models::{FraudClassifier, ModelLoader},
    scorer::FraudScorer,
    telemetry,
    types::{AssessmentReply, FraudAssessment, TransactionInput},
};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Score one card transaction for fraud
#[derive(Parser, Debug)]
#[command(name = "assess", about = "Score one card transaction for fraud")]
struct Cli {
    /// Amount of the most recent prior transaction
    #[arg(long, default_value_t = 0.0)]
    t1: f64,

    /// Amount of the second most recent prior transaction
    #[arg(long, default_value_t = 0.0)]
    t2: f64,

    /// Amount of the third most recent prior transaction
    #[arg(long, default_value_t = 0.0)]
    t3: f64,

    /// Amount of the transaction being evaluated
    #[arg(long, default_value_t = 0.0)]
    current: f64,

    /// Distance from home (km)
    #[arg(long, default_value_t = 0.0)]
    distance_from_home: f64,

    /// Distance from the last transaction (km)
    #[arg(long, default_value_t = 0.0)]
    distance_from_last: f64,

    /// Repeat retailer (1 = yes, 0 = no)
    #[arg(long, default_value_t = 0)]
    repeat_retailer: u8,

    /// Chip used (1 = yes, 0 = no)
    #[arg(long, default_value_t = 0)]
    used_chip: u8,

    /// PIN used (1 = yes, 0 = no)
    #[arg(long, default_value_t = 0)]
    used_pin: u8,

    /// Online order (1 = yes, 0 = no)
    #[arg(long, default_value_t = 0)]
    online_order: u8,

    /// Score locally with this ONNX model instead of calling the service
    #[arg(long)]
    model: Option<String>,

    /// NATS server URL (defaults to the configured one)
    #[arg(long)]
    nats_url: Option<String>,

    /// Request subject (defaults to the configured one)
    #[arg(long)]
    subject: Option<String>,

    /// Print the assessment as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn input(&self) -> TransactionInput {
        TransactionInput::new()
            .with_history([self.t1, self.t2, self.t3])
            .with_current_amount(self.current)
            .with_distances(self.distance_from_home, self.distance_from_last)
            .with_flags([
                self.repeat_retailer,
                self.used_chip,
                self.used_pin,
                self.online_order,
            ])
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    telemetry::init(&config.logging, "assess")?;
    if let Some(e) = config_error {
        warn!(error = %e, "Using default configuration");
    }

    let input = cli.input();
    debug!(?input, "Submission");

    let reply = match &cli.model {
        Some(path) => score_locally(path, &config, &input),
        None => score_remotely(&cli, &config, &input).await?,
    };

    match reply.into_result() {
        Ok(assessment) => {
            print_assessment(&assessment, cli.json)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            // No prediction is shown when scoring failed
            eprintln!("Prediction unavailable: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn score_locally(path: &str, config: &AppConfig, input: &TransactionInput) -> AssessmentReply {
    info!(model = %path, "Scoring locally");

    let loader = ModelLoader::with_threads(config.model.onnx_threads);
    let result = loader.load_model(path).and_then(|model| {
        let model: Arc<dyn FraudClassifier> = Arc::new(model);
        FraudScorer::with_threshold(model, config.detection.threshold).assess(input)
    });

    AssessmentReply::from(result)
}

async fn score_remotely(
    cli: &Cli,
    config: &AppConfig,
    input: &TransactionInput,
) -> Result<AssessmentReply> {
    let url = cli.nats_url.as_deref().unwrap_or(&config.nats.url);
    let subject = cli
        .subject
        .clone()
        .unwrap_or_else(|| config.nats.request_subject.clone());

    let client = async_nats::connect(url)
        .await
        .with_context(|| format!("Failed to connect to NATS at {}", url))?;
    info!(nats_url = %url, subject = %subject, "Sending assessment request");

    let payload = serde_json::to_vec(input)?;
    let response = client
        .request(subject, payload.into())
        .await
        .context("Assessment request failed")?;

    serde_json::from_slice(&response.payload).context("Malformed reply from scoring service")
}

fn print_assessment(assessment: &FraudAssessment, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(assessment)?);
        return Ok(());
    }

    println!("Model inputs:");
    for (name, value) in assessment.features.named() {
        println!("  {:<32} {}", name, value);
    }
    println!();
    println!("{}", assessment.report());
    Ok(())
}
