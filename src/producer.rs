//! NATS publisher for assessment replies

use crate::types::reply::AssessmentReply;
use anyhow::Result;
use async_nats::{Client, Subject};
use tracing::debug;

/// Publishes replies to the inbox named by each request
#[derive(Clone)]
pub struct ReplyPublisher {
    client: Client,
}

impl ReplyPublisher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Publish a reply to the requester's inbox
    pub async fn publish(&self, reply_to: Subject, reply: &AssessmentReply) -> Result<()> {
        let payload = serde_json::to_vec(reply)?;

        self.client.publish(reply_to.clone(), payload.into()).await?;

        match reply {
            AssessmentReply::Ok { assessment } => debug!(
                reply_to = %reply_to,
                assessment_id = %assessment.assessment_id,
                fraud_probability = assessment.fraud_probability,
                "Published assessment"
            ),
            AssessmentReply::Error { kind, .. } => debug!(
                reply_to = %reply_to,
                kind = %kind,
                "Published error reply"
            ),
        }

        Ok(())
    }
}
