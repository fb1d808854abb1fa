//! Card Fraud Scorer - Main Entry Point
//!
//! Answers assessment requests over NATS. Each request message is one form
//! submission; the classifier is loaded once at startup and shared.

use anyhow::Result;
use card_fraud_scorer::{
    config::AppConfig,
    consumer::RequestConsumer,
    metrics::{MetricsReporter, ScoringMetrics},
    models::{FraudClassifier, ModelLoader},
    producer::ReplyPublisher,
    scorer::FraudScorer,
    telemetry,
    types::{AssessmentReply, TransactionInput},
    workers::WorkerLimit,
};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;
    telemetry::init(&config.logging, "card_fraud_scorer")?;

    info!("Starting Card Fraud Scorer");
    info!(
        model = %config.model.path,
        threshold = config.detection.threshold,
        timeout_ms = config.pipeline.timeout_ms,
        "Configuration loaded"
    );

    // Load the classifier once; a missing artifact stops startup
    let loader = ModelLoader::with_threads(config.model.onnx_threads);
    let model: Arc<dyn FraudClassifier> = Arc::new(loader.load_model(&config.model.path)?);
    let scorer = Arc::new(FraudScorer::with_threshold(
        model,
        config.detection.threshold,
    ));
    info!(
        model = %scorer.model_name(),
        threshold = scorer.threshold(),
        "Scorer initialized"
    );

    let metrics = Arc::new(ScoringMetrics::new());

    // Connect to NATS
    let client = async_nats::connect(&config.nats.url).await?;
    info!("Connected to NATS at {}", config.nats.url);

    let consumer = RequestConsumer::new(client.clone(), &config.nats.request_subject);
    let publisher = ReplyPublisher::new(client.clone());

    let num_workers = config.pipeline.workers;
    let timeout = config.pipeline.timeout();
    info!(
        workers = num_workers,
        subject = %consumer.subject(),
        "Listening for assessment requests"
    );

    // Limit concurrent requests
    let workers = WorkerLimit::new(num_workers);

    // Start metrics reporter (prints summary every 60 seconds)
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        MetricsReporter::new(metrics_clone, 60).start().await;
    });

    let mut subscription = consumer.subscribe().await?;

    loop {
        let message = tokio::select! {
            message = subscription.next() => match message {
                Some(message) => message,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        };

        let Some(reply_to) = message.reply.clone() else {
            warn!(subject = %message.subject, "Request without reply subject, ignoring");
            continue;
        };

        let permit = workers.acquire().await?;

        let scorer = scorer.clone();
        let publisher = publisher.clone();
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let start_time = Instant::now();

            let reply = match serde_json::from_slice::<TransactionInput>(&message.payload) {
                Ok(input) => {
                    let result = scorer.assess_with_timeout(input, timeout).await;
                    let processing_time = start_time.elapsed();

                    match &result {
                        Ok(assessment) => {
                            metrics.record_assessment(
                                processing_time,
                                assessment.fraud_probability,
                                assessment.verdict,
                            );
                            info!(
                                assessment_id = %assessment.assessment_id,
                                fraud_probability = assessment.fraud_probability,
                                ratio = assessment.ratio_to_median_purchase_price,
                                verdict = ?assessment.verdict,
                                processing_time_us = processing_time.as_micros() as u64,
                                "Transaction assessed"
                            );
                        }
                        Err(e) => {
                            metrics.record_failure(e.kind(), processing_time);
                            error!(kind = e.kind(), error = %e, "Assessment failed");
                        }
                    }

                    AssessmentReply::from(result)
                }
                Err(e) => {
                    metrics.record_failure("invalid_input", start_time.elapsed());
                    warn!(error = %e, "Failed to deserialize request");
                    AssessmentReply::malformed(e)
                }
            };

            if let Err(e) = publisher.publish(reply_to, &reply).await {
                error!(error = %e, "Failed to publish reply");
            } else {
                debug!("Reply published");
            }

            drop(permit);
        });
    }

    info!("Scorer shutting down...");
    workers.drain().await?;
    client.flush().await?;
    metrics.print_summary();

    Ok(())
}
