//! Dummy provider — echoes the prompt back prefixed with `[echo]`.
//! Lets the assistant run end-to-end without a model server or API key.

use crate::llm::ProviderError;

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        Ok(format!("[echo] {prompt}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generate_prefixes_echo() {
        let p = DummyProvider;
        assert_eq!(p.generate("hello").await.unwrap(), "[echo] hello");
    }

    #[tokio::test]
    async fn generate_keeps_case() {
        let p = DummyProvider;
        assert_eq!(p.generate("Hello World").await.unwrap(), "[echo] Hello World");
    }
}
