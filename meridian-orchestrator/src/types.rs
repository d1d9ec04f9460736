// ABOUTME: SynthesizedAnswer and its supporting result-set types

use std::time::Duration;

use meridian_core::types::{Citation, Confidence};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SynthesizedAnswer {
    pub text: String,
    pub citations: Vec<Citation>,
    pub systems_used: Vec<&'static str>,
    pub confidence: Confidence,
    pub fallback_chain: Vec<&'static str>,
    pub timings: Timings,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Timings {
    pub vector: Option<Duration>,
    pub graph: Option<Duration>,
    pub ess: Option<Duration>,
    pub total: Duration,
}
