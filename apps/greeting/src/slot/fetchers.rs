//! Fetchers that back content slots with the generative client.

use async_trait::async_trait;

use crate::genai_client::GenAiClient;
use crate::slot::{Fetcher, SlotFailure};

/// Asks the text model for one piece of text (compliment, poem, forecast...).
pub struct TextFetcher {
    client: GenAiClient,
    prompt: &'static str,
}

impl TextFetcher {
    pub fn new(client: GenAiClient, prompt: &'static str) -> Self {
        Self { client, prompt }
    }
}

#[async_trait]
impl Fetcher<String> for TextFetcher {
    fn preflight(&self) -> Result<(), SlotFailure> {
        self.client.ensure_configured()?;
        Ok(())
    }

    async fn fetch(&self) -> Result<String, SlotFailure> {
        Ok(self.client.generate_text(self.prompt).await?)
    }
}

/// Asks the image model for the card image. Resolves to a `data:` URI.
pub struct ImageFetcher {
    client: GenAiClient,
    prompt: &'static str,
}

impl ImageFetcher {
    pub fn new(client: GenAiClient, prompt: &'static str) -> Self {
        Self { client, prompt }
    }
}

#[async_trait]
impl Fetcher<String> for ImageFetcher {
    fn preflight(&self) -> Result<(), SlotFailure> {
        self.client.ensure_configured()?;
        Ok(())
    }

    async fn fetch(&self) -> Result<String, SlotFailure> {
        Ok(self.client.generate_image(self.prompt).await?)
    }
}
