//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{Router, extract::State, routing::post};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use medassist_bot::llm::{
    GenerationOptions, LlmProvider,
    providers::{gemini::GeminiProvider, text_generation::TextGenerationProvider},
};

pub const GEMINI_ROUTE: &str = "/v1beta/models/gemini-pro:generateContent";

/// Serve `router` on an ephemeral port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

/// Counts requests and answers each with a fixed status + JSON body.
#[derive(Clone)]
pub struct Canned {
    pub hits: Arc<AtomicUsize>,
    status: u16,
    body: Value,
}

impl Canned {
    pub fn new(status: u16, body: Value) -> Self {
        Self { hits: Arc::new(AtomicUsize::new(0)), status, body }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn router(&self, path: &str) -> Router {
        Router::new()
            .route(
                path,
                post(|State(c): State<Canned>| async move {
                    c.hits.fetch_add(1, Ordering::SeqCst);
                    let status = axum::http::StatusCode::from_u16(c.status).unwrap();
                    (status, axum::Json(c.body))
                }),
            )
            .with_state(self.clone())
    }
}

pub fn gemini_reply(text: &str) -> Value {
    json!({ "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }] })
}

pub fn local_provider(base: &str) -> LlmProvider {
    LlmProvider::TextGeneration(
        TextGenerationProvider::new(format!("{base}/generate"), "distilgpt2".into(), 150, 1, 5).unwrap(),
    )
}

pub fn gemini_provider(base: &str) -> LlmProvider {
    LlmProvider::Gemini(
        GeminiProvider::new(
            format!("{base}/v1beta"),
            "gemini-pro".into(),
            GenerationOptions::default(),
            5,
            "test-key".into(),
        )
        .unwrap(),
    )
}
