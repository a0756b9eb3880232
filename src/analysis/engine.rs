use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::analysis::{
    Analysis, AnalysisMode, AnalysisRequest,
    fallback::{self, SummaryInput},
    gemini::{GenerationParams, TextGenerator},
    parser,
    prompt::{build_prompt, is_no_match_reply},
};

/// Chooses between the model and the deterministic summarizer and never
/// fails: every model-side problem degrades to the deterministic result.
#[derive(Clone)]
pub struct AnalysisEngine {
    generator: Option<Arc<dyn TextGenerator>>,
    params: GenerationParams,
}

impl AnalysisEngine {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, params: GenerationParams) -> Self {
        Self { generator, params }
    }

    /// An engine with no model configured.
    pub fn deterministic() -> Self {
        Self::new(None, GenerationParams::default())
    }

    pub fn has_model(&self) -> bool {
        self.generator.is_some()
    }

    #[instrument(skip_all, fields(url = %request.url, mode = ?request.mode))]
    pub async fn analyze(&self, request: &AnalysisRequest<'_>) -> Analysis {
        let input = SummaryInput {
            content: request.content,
            keywords: request.keywords,
            title: request.title,
            url: request.url,
        };

        let generator = match (request.mode, &self.generator) {
            (AnalysisMode::Model, Some(generator)) => generator,
            (AnalysisMode::Model, None) => {
                debug!("No model configured, using deterministic analysis");
                return Analysis::deterministic(fallback::summarize(&input));
            }
            (AnalysisMode::Deterministic, _) => {
                return Analysis::deterministic(fallback::summarize(&input));
            }
        };

        let prompt = build_prompt(
            request.content,
            request.keywords,
            request.url,
            request.title,
            request.site_keywords,
        );
        match generator.generate(&prompt, self.params).await {
            Ok(reply) if reply.trim().is_empty() => {
                warn!("Model returned an empty reply, falling back");
                Analysis::deterministic(fallback::summarize(&input))
            }
            Ok(reply) if is_no_match_reply(&reply) => {
                warn!("Model found no relevant content, falling back");
                Analysis::deterministic(fallback::summarize(&input))
            }
            Ok(reply) => Analysis::model(parser::parse_reply(&reply, &input)),
            Err(e) => {
                warn!(error = %e, "Model analysis failed, falling back");
                Analysis::deterministic(fallback::summarize(&input))
            }
        }
    }
}
