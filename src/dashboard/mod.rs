//! Dashboard actions: the guard, charge, generate and record sequence the
//! generator forms run, plus the premium upgrade flow.

pub mod handlers;

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::auth::{SessionStore, UserPatch};
use crate::credits::{CreditLedger, CreditState};
use crate::error::{AppError, AuthError};
use crate::generation::{prompt, Generator, ImageStyle, Tone, WritingStyle};
use crate::history::{HistoryStore, ImageHistoryRecord, TextHistoryRecord};
use crate::premium::PremiumVerifier;
use crate::Result;

pub const TEXT_COST: u32 = 1;
pub const IMAGE_COST: u32 = 2;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRequest {
    pub prompt: String,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub style: WritingStyle,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
    #[serde(default)]
    pub style: ImageStyle,
}

pub struct Dashboard {
    pub session: RwLock<SessionStore>,
    pub credits: Arc<RwLock<CreditLedger>>,
    pub history: HistoryStore,
    pub generator: Arc<dyn Generator>,
    pub premium: PremiumVerifier,
}

impl Dashboard {
    pub fn new(
        session: SessionStore,
        credits: CreditLedger,
        history: HistoryStore,
        generator: Arc<dyn Generator>,
        premium: PremiumVerifier,
    ) -> Self {
        Self {
            session: RwLock::new(session),
            credits: Arc::new(RwLock::new(credits)),
            history,
            generator,
            premium,
        }
    }

    pub async fn require_login(&self) -> Result<()> {
        self.session.read().await.require_user().map(|_| ())
    }

    /// Current balance after applying any due daily refill.
    pub async fn credits(&self) -> Result<CreditState> {
        let mut ledger = self.credits.write().await;
        ledger.check_and_reset_credits()?;
        Ok(ledger.state().clone())
    }

    pub async fn generate_text(&self, request: TextRequest) -> Result<TextHistoryRecord> {
        self.require_login().await?;
        let raw_prompt = non_empty_prompt(&request.prompt)?;
        self.charge(TEXT_COST).await?;

        let enriched = prompt::text_prompt(raw_prompt, request.tone, request.style);
        let result = self.generator.generate_text(&enriched).await?;

        let mut record = TextHistoryRecord::new(raw_prompt.to_string(), result);
        record.tone = Some(request.tone);
        record.style = Some(request.style);
        record.content_type = request.content_type;
        self.history.record_text(record.clone())?;
        Ok(record)
    }

    pub async fn generate_image(&self, request: ImageRequest) -> Result<ImageHistoryRecord> {
        self.require_login().await?;
        let raw_prompt = non_empty_prompt(&request.prompt)?;
        self.charge(IMAGE_COST).await?;

        let enriched = prompt::image_prompt(raw_prompt, request.style);
        let image = self.generator.generate_image(&enriched).await?;

        let record = ImageHistoryRecord::new(raw_prompt.to_string(), image, Some(request.style));
        self.history.record_image(record.clone())?;
        Ok(record)
    }

    /// Upgrades the current user when their email is on the allow-list.
    pub async fn verify_premium(&self) -> Result<CreditState> {
        let email = self.session.read().await.require_user()?.email.clone();

        if !self.premium.is_premium_approved(&email).await {
            warn!("Premium verification refused for {}", email);
            return Err(AuthError::NotApproved.into());
        }

        self.set_tier(true).await
    }

    pub async fn cancel_premium(&self) -> Result<CreditState> {
        self.require_login().await?;
        self.set_tier(false).await
    }

    async fn set_tier(&self, is_premium: bool) -> Result<CreditState> {
        let state = {
            let mut ledger = self.credits.write().await;
            ledger.set_premium(is_premium)?;
            ledger.state().clone()
        };
        self.session.write().await.update_user(UserPatch {
            is_premium: Some(is_premium),
            ..Default::default()
        })?;
        info!(is_premium, "Account tier updated");
        Ok(state)
    }

    async fn charge(&self, amount: u32) -> Result<()> {
        let mut ledger = self.credits.write().await;
        if ledger.use_credits(amount)? {
            return Ok(());
        }
        Err(AppError::InsufficientCredits {
            required: amount,
            available: ledger.state().credits,
        })
    }
}

fn non_empty_prompt(prompt: &str) -> Result<&str> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError("Please enter a prompt".into()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HistoryConfig, PremiumConfig};
    use crate::credits::CreditPolicy;
    use crate::error::GenerationError;
    use crate::generation::MockGenerator;
    use crate::storage::{KeyValueStore, MemoryStore};
    use chrono::Utc;
    use std::time::Duration;

    fn dashboard(generator: MockGenerator, credits: u32) -> Dashboard {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut session = SessionStore::new(storage.clone()).unwrap();
        session.login("user@example.com", "pw").unwrap();

        let ledger = CreditLedger::with_state(
            storage.clone(),
            CreditPolicy::default(),
            CreditState {
                credits,
                max_credits: 10,
                last_reset: Some(Utc::now()),
                is_premium: false,
            },
        )
        .unwrap();
        let history = HistoryStore::new(storage, &HistoryConfig { text_cap: 50, image_cap: 20 });
        let premium = PremiumVerifier::new(
            &PremiumConfig { emails_url: "http://127.0.0.1:9/emails.txt".into() },
            Duration::from_millis(200),
        )
        .unwrap();

        Dashboard::new(session, ledger, history, Arc::new(generator), premium)
    }

    fn text(prompt: &str) -> TextRequest {
        TextRequest {
            prompt: prompt.into(),
            tone: Tone::Friendly,
            style: WritingStyle::Detailed,
            content_type: None,
        }
    }

    #[tokio::test]
    async fn test_text_generation_charges_and_records() {
        let mut generator = MockGenerator::new();
        generator
            .expect_generate_text()
            .withf(|prompt: &str| prompt == "Hello\n\nTone: friendly\nStyle: detailed")
            .times(1)
            .returning(|_| Ok("Hi there".to_string()));

        let dashboard = dashboard(generator, 10);
        let record = dashboard.generate_text(text("  Hello ")).await.unwrap();

        assert_eq!(record.prompt, "Hello");
        assert_eq!(record.result, "Hi there");
        assert_eq!(record.tone, Some(Tone::Friendly));
        assert_eq!(dashboard.credits.read().await.state().credits, 9);
        assert_eq!(dashboard.history.text_history().unwrap(), vec![record]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_generations_each_recorded() {
        let mut generator = MockGenerator::new();
        generator
            .expect_generate_text()
            .times(8)
            .returning(|prompt| Ok(format!("re: {prompt}")));

        let dashboard = Arc::new(dashboard(generator, 10));
        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let dashboard = dashboard.clone();
                tokio::spawn(async move { dashboard.generate_text(text(&format!("prompt {i}"))).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(dashboard.history.text_history().unwrap().len(), 8);
        assert_eq!(dashboard.credits.read().await.state().credits, 2);
    }

    #[tokio::test]
    async fn test_image_generation_costs_two() {
        let mut generator = MockGenerator::new();
        generator
            .expect_generate_image()
            .withf(|prompt: &str| prompt == "a fox, watercolor style, high quality")
            .times(1)
            .returning(|_| Ok("iVBORw0KGgo=".to_string()));

        let dashboard = dashboard(generator, 3);
        let record = dashboard
            .generate_image(ImageRequest { prompt: "a fox".into(), style: ImageStyle::Watercolor })
            .await
            .unwrap();

        assert_eq!(record.image, "iVBORw0KGgo=");
        assert_eq!(dashboard.credits.read().await.state().credits, 1);
    }

    #[tokio::test]
    async fn test_insufficient_credits_skips_generator() {
        let mut generator = MockGenerator::new();
        generator.expect_generate_image().times(0);

        let dashboard = dashboard(generator, 1);
        let err = dashboard
            .generate_image(ImageRequest { prompt: "a fox".into(), style: ImageStyle::default() })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InsufficientCredits { required: 2, available: 1 }));
        assert_eq!(dashboard.credits.read().await.state().credits, 1);
        assert!(dashboard.history.image_history().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_prompt_rejected_before_charge() {
        let mut generator = MockGenerator::new();
        generator.expect_generate_text().times(0);

        let dashboard = dashboard(generator, 10);
        let err = dashboard.generate_text(text("   ")).await.unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(dashboard.credits.read().await.state().credits, 10);
    }

    #[tokio::test]
    async fn test_failed_generation_keeps_charge_and_skips_history() {
        let mut generator = MockGenerator::new();
        generator
            .expect_generate_text()
            .times(1)
            .returning(|_| Err(GenerationError::ResponseError("503".into())));

        let dashboard = dashboard(generator, 10);
        let err = dashboard.generate_text(text("Hello")).await.unwrap_err();

        assert!(matches!(err, AppError::GenerationError(_)));
        assert_eq!(dashboard.credits.read().await.state().credits, 9);
        assert!(dashboard.history.text_history().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_logged_out_user_cannot_generate() {
        let mut generator = MockGenerator::new();
        generator.expect_generate_text().times(0);

        let dashboard = dashboard(generator, 10);
        dashboard.session.write().await.logout().unwrap();

        let err = dashboard.generate_text(text("Hello")).await.unwrap_err();
        assert!(matches!(err, AppError::AuthError(AuthError::NotLoggedIn)));
    }

    #[tokio::test]
    async fn test_cancel_premium_refills_free_tier() {
        let dashboard = dashboard(MockGenerator::new(), 2);
        let state = dashboard.cancel_premium().await.unwrap();

        assert_eq!(state.credits, 10);
        assert!(!state.is_premium);
        let session = dashboard.session.read().await;
        assert!(!session.current_user().unwrap().is_premium);
    }

    #[tokio::test]
    async fn test_unreachable_allow_list_refuses_premium() {
        let dashboard = dashboard(MockGenerator::new(), 2);
        let err = dashboard.verify_premium().await.unwrap_err();

        assert!(matches!(err, AppError::AuthError(AuthError::NotApproved)));
        assert_eq!(dashboard.credits.read().await.state().credits, 2);
    }
}
