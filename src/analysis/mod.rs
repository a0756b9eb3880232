//! Content analysis: the model-backed path (prompt, Gemini call, reply
//! parser) and the deterministic summarizer it falls back to.
//!
//! Callers only ever see [`Analysis`]; raw model text never leaves this
//! module.

pub mod engine;
pub mod fallback;
pub mod gemini;
pub mod parser;
pub mod prompt;

pub use engine::AnalysisEngine;
pub use gemini::{GeminiClient, GenerateError, GenerationParams, TextGenerator};

use crate::entities::{AnalysisSource, SocialPosts};

/// Which analysis path the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    Model,
    Deterministic,
}

impl AnalysisMode {
    pub fn from_flag(use_model_analysis: bool) -> Self {
        if use_model_analysis {
            Self::Model
        } else {
            Self::Deterministic
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest<'a> {
    pub content: &'a str,
    pub keywords: &'a [String],
    pub url: &'a str,
    pub title: Option<&'a str>,
    /// The page's meta keywords, passed to the model as context.
    pub site_keywords: &'a [&'a str],
    pub mode: AnalysisMode,
}

/// Typed analysis output, whichever path produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisFields {
    pub source_summary: String,
    pub short_summary: Option<String>,
    pub key_highlights: Vec<String>,
    pub verified_origin: Option<String>,
    pub future_forecast: Option<String>,
    pub relevance_score: Option<f32>,
    pub social_posts: SocialPosts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub source: AnalysisSource,
    pub fields: AnalysisFields,
}

impl Analysis {
    pub fn model(fields: AnalysisFields) -> Self {
        Self {
            source: AnalysisSource::Model,
            fields,
        }
    }

    pub fn deterministic(fields: AnalysisFields) -> Self {
        Self {
            source: AnalysisSource::Deterministic,
            fields,
        }
    }
}
