//! Premium allow-list check against a public plaintext file of emails.

pub mod handlers;

use std::collections::HashSet;
use std::time::Duration;

use tracing::{error, info};

use crate::config::PremiumConfig;
use crate::error::GenerationError;

pub struct PremiumVerifier {
    client: reqwest::Client,
    emails_url: String,
}

impl PremiumVerifier {
    pub fn new(config: &PremiumConfig, timeout: Duration) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::InvalidRequest(e.to_string()))?;
        Ok(Self {
            client,
            emails_url: config.emails_url.clone(),
        })
    }

    /// Fetches the allow-list. Any failure yields an empty list.
    pub async fn fetch_approved_emails(&self) -> HashSet<String> {
        match self.request_list().await {
            Ok(body) => parse_email_list(&body),
            Err(e) => {
                error!("Error fetching approved emails: {}", e);
                HashSet::new()
            }
        }
    }

    pub async fn is_premium_approved(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return false;
        }

        let approved = self.fetch_approved_emails().await.contains(&email);
        info!(approved, "Premium check for {}", email);
        approved
    }

    async fn request_list(&self) -> Result<String, GenerationError> {
        let res = self.client.get(&self.emails_url).send().await?;
        if !res.status().is_success() {
            return Err(GenerationError::ResponseError(format!(
                "{}: Failed to fetch approved emails list",
                res.status()
            )));
        }
        Ok(res.text().await?)
    }
}

pub fn parse_email_list(body: &str) -> HashSet<String> {
    body.lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty() && line.contains('@'))
        .collect()
}
