//! Simple SDK Example
//!
//! Forecasts the sample dataset and prints the high-risk SKUs.
//!
//! # Usage
//!
//! ```bash
//! IMHOTEP_API_URL=http://localhost:8000 IMHOTEP_TOKEN=... \
//!     cargo run --package imhotep-sdk --example simple
//! ```

use futures::StreamExt;
use imhotep_sdk::{
    ClientConfig, ForecastClient, JobUpdate, ResultView, StaticSession, SubmissionOutcome,
    TransportKind,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Imhotep SDK - Simple Example");
    println!("============================\n");

    // 1. Configure
    let config = ClientConfig::load(None)?;
    let session = Arc::new(StaticSession::new(std::env::var("IMHOTEP_TOKEN").ok(), None));
    let client = ForecastClient::connect(config, session)?;
    println!("1. Client ready for {}\n", client.config().api_url);

    // 2. Submit
    println!("2. Submitting sample dataset...");
    let outcome = client.submit_sample(Some("retail".to_string())).await?;
    let result = match outcome {
        SubmissionOutcome::Ready(result) => {
            println!("   ✓ Answered synchronously\n");
            *result
        }
        SubmissionOutcome::Failed { error, .. } => return Err(error.into()),
        SubmissionOutcome::Accepted { job_id } => {
            println!("   ✓ Job accepted: {}\n", job_id);

            // 3. Watch progress until terminal
            println!("3. Watching job...");
            let mut observation = client.observe(&job_id, TransportKind::Poll);
            while let Some(update) = observation.next().await {
                match update {
                    JobUpdate::Status { state, .. } => println!("   - {}", state),
                    JobUpdate::Progress(p) => println!("   - {:.0}%", p.progress * 100.0),
                    JobUpdate::Failed { error } => return Err(error.into()),
                    JobUpdate::Aborted(reason) => return Err(reason.into()),
                    _ => {}
                }
            }
            println!();
            client.completed_result(&job_id).await?
        }
    };

    // 4. Result
    let view = ResultView::new(&result);
    println!("4. High-risk SKUs:");
    for item in view.top_high_risk(3) {
        println!("   - {}: {}", item.sku, item.recommendation);
    }

    println!("\n✓ Example completed successfully!");
    Ok(())
}
