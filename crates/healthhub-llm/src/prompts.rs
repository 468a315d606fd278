//! Prompts and response schemas for the pharmacy assistant.
//!
//! Schemas use the generative-language `Schema` object format (upper-case type
//! names) and are sent as `generationConfig.responseSchema`.

use serde_json::{json, Value};

/// System instruction for free-text health questions.
pub const ASSISTANT_INSTRUCTION: &str = r#"You are a helpful pharmacy health assistant.
IMPORTANT: Always include a clear medical disclaimer that you are an AI and not a doctor.
Provide information about common over-the-counter medications, health tips, and wellness.
If a symptom sounds serious, strongly advise seeking professional medical attention immediately.
Keep answers concise and supportive."#;

/// System instruction for drug-drug interaction checks.
pub const PHARMACOLOGIST_INSTRUCTION: &str =
    "You are a clinical pharmacologist. Be precise and conservative.";

/// System instruction for the dosage calculator.
pub const DOSAGE_INSTRUCTION: &str =
    "You are a dosage calculator. Always provide warnings about consulting real doctors.";

/// Text part sent alongside a prescription photo.
pub const SCAN_PROMPT: &str = "Extract medication name, dosage, and frequency from this prescription.";

pub fn make_interaction_prompt(medications: &[String]) -> String {
    format!(
        "Identify potential dangerous drug-drug interactions between these medications: {}.",
        medications.join(", ")
    )
}

pub fn make_dosage_prompt(medication: &str, age: u32, weight_kg: f64) -> String {
    format!(
        "Calculate appropriate dosage for {} for a person aged {} and weighing {}kg. \
         Include standard frequency and maximum daily limit. \
         Provide a VERY strict medical disclaimer.",
        medication, age, weight_kg
    )
}

/// `{risk, warning}` reply of an interaction check.
pub fn interaction_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "risk": {
                "type": "STRING",
                "description": "The risk level: high, medium, or low"
            },
            "warning": {
                "type": "STRING",
                "description": "A concise description of the interaction warning"
            }
        },
        "required": ["risk", "warning"]
    })
}

/// Fields read off a prescription photo.
pub fn prescription_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "medication": { "type": "STRING" },
            "dosage": { "type": "STRING" },
            "frequency": { "type": "STRING" },
            "instructions": { "type": "STRING" }
        },
        "required": ["medication", "dosage", "frequency", "instructions"]
    })
}
