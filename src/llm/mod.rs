pub mod openai;
pub mod prompt;

use crate::error::PipelineError;
use async_trait::async_trait;

/// The text-generation black box: one system string, one user string, one
/// generated block back.
#[async_trait]
pub trait TextProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Model identifier reported alongside the commentary.
    fn model(&self) -> &str;

    async fn generate(&self, system: &str, prompt: &str) -> Result<String, PipelineError>;
}
