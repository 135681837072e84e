#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use genora::error::GenerationError;
use genora::{AppState, Generator, HttpGenerator, MemoryStore, Settings};

/// Generator that answers every prompt with canned output.
pub struct CannedGenerator;

#[async_trait]
impl Generator for CannedGenerator {
    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        Ok(format!("generated for: {}", prompt))
    }

    async fn generate_image(&self, _prompt: &str) -> Result<String, GenerationError> {
        // "PNG" in base64
        Ok("UE5H".to_string())
    }
}

pub fn test_settings() -> Settings {
    Settings::new_for_test(std::env::temp_dir().join("genora-unused")).expect("Failed to load test config")
}

pub fn canned_state() -> AppState {
    AppState::with_parts(test_settings(), Arc::new(MemoryStore::new()), Arc::new(CannedGenerator))
        .expect("Failed to build state")
}

/// State whose generator and allow-list point at `base_url`.
pub fn remote_state(base_url: &str) -> AppState {
    let mut settings = test_settings();
    settings.generation.text_endpoint = format!("{}/api/v1/chat/completions", base_url);
    settings.generation.image_endpoint = format!("{}/api/v1/generateImage", base_url);
    settings.generation.api_key = "test-key".to_string();
    settings.premium.emails_url = format!("{}/emails.txt", base_url);

    let generator = Arc::new(HttpGenerator::new(settings.generation.clone()).unwrap());
    AppState::with_parts(settings, Arc::new(MemoryStore::new()), generator).expect("Failed to build state")
}
