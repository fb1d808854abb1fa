//! NATS subscriber for incoming assessment requests

use anyhow::Result;
use async_nats::{Client, Subscriber};
use tracing::info;

/// Queue group shared by all scorer instances, so each request is handled once
pub const QUEUE_GROUP: &str = "fraud-scorers";

/// Consumer for receiving assessment requests from NATS
pub struct RequestConsumer {
    client: Client,
    subject: String,
}

impl RequestConsumer {
    /// Create a new request consumer
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Subscribe to the request subject as a member of the scorer queue group
    pub async fn subscribe(&self) -> Result<Subscriber> {
        let subscriber = self
            .client
            .queue_subscribe(self.subject.clone(), QUEUE_GROUP.to_string())
            .await?;
        info!(subject = %self.subject, queue = QUEUE_GROUP, "Subscribed to request subject");
        Ok(subscriber)
    }

    /// Get the subject name
    pub fn subject(&self) -> &str {
        &self.subject
    }
}
