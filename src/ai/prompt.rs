//! Prompt Construction
//!
//! Deterministic template rendering for topic explanation prompts: the same
//! topic, complexity level, and examples flag always produce the same prompt
//! string. The template instructs the model to answer in a fixed JSON shape
//! with an `explanation` and a nested `test_case`.

use std::fmt;

/// System message sent alongside every explanation prompt.
pub const SYSTEM_MESSAGE: &str = "You are an expert educator and technical writer.";

const INCLUDE_EXAMPLES: &str = "Include practical examples and use cases.";
const NO_EXAMPLES: &str = "Focus on theoretical concepts without specific examples.";

/// Caller-selected complexity level controlling prompt phrasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComplexityLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl ComplexityLevel {
    /// Parse a complexity level, falling back to intermediate for any
    /// unrecognized value. Never fails.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "beginner" => Self::Beginner,
            "advanced" => Self::Advanced,
            _ => Self::Intermediate,
        }
    }

    /// Instructional phrasing for this level.
    fn instruction(self) -> &'static str {
        match self {
            Self::Beginner => {
                "Explain in simple terms that a beginner can understand. \
                 Use basic vocabulary and avoid jargon."
            }
            Self::Intermediate => {
                "Provide a balanced explanation with some technical details. \
                 Assume basic familiarity with the subject."
            }
            Self::Advanced => {
                "Give a comprehensive, technical explanation with advanced \
                 concepts and terminology."
            }
        }
    }
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Beginner => write!(f, "beginner"),
            Self::Intermediate => write!(f, "intermediate"),
            Self::Advanced => write!(f, "advanced"),
        }
    }
}

/// Render the explanation prompt for a topic.
///
/// The stated 100-1000 word requirement is what the model is asked for; the
/// response validator enforces a looser floor of 20 words.
pub fn build_prompt(topic: &str, level: ComplexityLevel, include_examples: bool) -> String {
    let examples_instruction = if include_examples {
        INCLUDE_EXAMPLES
    } else {
        NO_EXAMPLES
    };

    format!(
        r#"You are an expert educator and technical writer. Your task is to provide a comprehensive explanation of the given topic and create a corresponding test case.

Topic: {topic}
Complexity Level: {level}
Instructions: {instruction}
Examples: {examples_instruction}

Please provide your response in the following JSON format:
{{
    "explanation": "Your detailed explanation of the topic here. Make it comprehensive and well-structured.",
    "test_case": {{
        "input": "A specific input or scenario to test understanding",
        "expected_output": "The expected result or answer",
        "description": "Brief description of what this test case validates"
    }}
}}

Requirements:
1. The explanation should be accurate, well-structured, and appropriate for the specified complexity level
2. The test case should directly relate to the explanation and test key concepts
3. Ensure the JSON is properly formatted and valid
4. The explanation should be at least 100 words but not exceed 1000 words
5. The test case should be practical and verifiable

Topic to explain: {topic}"#,
        topic = topic,
        level = level,
        instruction = level.instruction(),
        examples_instruction = examples_instruction,
    )
}

// =============================================================================
// Tests
// =============================================================================
