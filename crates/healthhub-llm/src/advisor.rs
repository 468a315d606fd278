//! Advisory operations over a [`TextGenerator`].
//!
//! None of these return an error: a failed remote call degrades to a fixed
//! fallback string or `None`, and the failure is logged.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::client::{GenerationRequest, LlmError, LlmResult, TextGenerator};
use crate::config::GeminiConfig;
use crate::prompts;

/// Reply when a health question cannot be answered.
pub const HEALTH_ADVICE_FALLBACK: &str =
    "I'm having trouble connecting to my knowledge base. Please consult a pharmacist in person.";

/// Reply when the dosage calculator fails.
pub const DOSAGE_FALLBACK: &str = "Calculation failed. Consult a doctor.";

/// Result of a drug-drug interaction check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionReport {
    /// "high", "medium" or "low"
    pub risk: String,
    pub warning: String,
}

impl InteractionReport {
    pub fn is_high_risk(&self) -> bool {
        self.risk.trim().eq_ignore_ascii_case("high")
    }
}

/// Fields read off a photographed prescription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionScan {
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub instructions: String,
}

/// Parse a JSON object out of a reply, ignoring any text around it.
pub fn parse_json_reply<T: DeserializeOwned>(reply: &str) -> LlmResult<T> {
    let start = reply
        .find('{')
        .ok_or_else(|| LlmError::InvalidFormat("No JSON object found in response".into()))?;
    let end = reply
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| LlmError::InvalidFormat("No closing brace found in response".into()))?;

    Ok(serde_json::from_str(&reply[start..=end])?)
}

pub struct HealthAdvisor<G> {
    generator: G,
    fast_model: String,
    reasoning_model: String,
}

impl<G: TextGenerator> HealthAdvisor<G> {
    pub fn new(generator: G, config: &GeminiConfig) -> Self {
        Self {
            generator,
            fast_model: config.fast_model.clone(),
            reasoning_model: config.reasoning_model.clone(),
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Answer a free-text health question.
    pub async fn health_advice(&self, query: &str) -> String {
        let request = GenerationRequest::new(&self.fast_model, query)
            .with_system_instruction(prompts::ASSISTANT_INSTRUCTION);

        match self.generator.generate(request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Health advice failed");
                HEALTH_ADVICE_FALLBACK.to_string()
            }
        }
    }

    /// Check two or more medications for interactions.
    ///
    /// `None` for fewer than two medications or when the check fails.
    pub async fn check_interactions(&self, medications: &[String]) -> Option<InteractionReport> {
        if medications.len() < 2 {
            return None;
        }

        let request = GenerationRequest::new(
            &self.reasoning_model,
            prompts::make_interaction_prompt(medications),
        )
        .with_system_instruction(prompts::PHARMACOLOGIST_INSTRUCTION)
        .with_response_schema(prompts::interaction_schema());

        match self.structured(request).await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(error = %e, count = medications.len(), "Interaction check failed");
                None
            }
        }
    }

    /// Dosage guidance for a patient's age and weight.
    pub async fn dosage_advice(&self, medication: &str, age: u32, weight_kg: f64) -> String {
        let request = GenerationRequest::new(
            &self.reasoning_model,
            prompts::make_dosage_prompt(medication, age, weight_kg),
        )
        .with_system_instruction(prompts::DOSAGE_INSTRUCTION);

        match self.generator.generate(request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, medication, "Dosage calculation failed");
                DOSAGE_FALLBACK.to_string()
            }
        }
    }

    /// Read medication, dosage and frequency off a JPEG photo.
    pub async fn scan_prescription(&self, jpeg: Vec<u8>) -> Option<PrescriptionScan> {
        let request = GenerationRequest::new(&self.fast_model, prompts::SCAN_PROMPT)
            .with_response_schema(prompts::prescription_schema())
            .with_image(jpeg);

        match self.structured(request).await {
            Ok(scan) => Some(scan),
            Err(e) => {
                warn!(error = %e, "Prescription scan failed");
                None
            }
        }
    }

    async fn structured<T: DeserializeOwned>(&self, request: GenerationRequest) -> LlmResult<T> {
        let reply = self.generator.generate(request).await?;
        parse_json_reply(&reply)
    }
}
