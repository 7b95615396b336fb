//! Step chain entities

use serde::{Deserialize, Serialize};

use super::StepError;

/// Number of steps in the chain
pub const CHAIN_LENGTH: usize = 3;

/// 1-based position of a step in the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct StepIndex(usize);

impl StepIndex {
    pub const FIRST: Self = Self(1);
    pub const LAST: Self = Self(CHAIN_LENGTH);

    /// Create a StepIndex after range validation
    pub fn new(step: usize) -> Result<Self, StepError> {
        if (1..=CHAIN_LENGTH).contains(&step) {
            Ok(Self(step))
        } else {
            Err(StepError::InvalidStep {
                step,
                max: CHAIN_LENGTH,
            })
        }
    }

    /// All steps in chain order
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=CHAIN_LENGTH).map(Self)
    }

    pub fn get(&self) -> usize {
        self.0
    }

    pub fn is_first(&self) -> bool {
        self.0 == 1
    }

    pub fn is_last(&self) -> bool {
        self.0 == CHAIN_LENGTH
    }

    /// The step this one depends on
    pub fn previous(&self) -> Option<Self> {
        if self.is_first() {
            None
        } else {
            Some(Self(self.0 - 1))
        }
    }

    /// Zero-based slot position
    pub(crate) fn slot(&self) -> usize {
        self.0 - 1
    }
}

impl TryFrom<usize> for StepIndex {
    type Error = StepError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StepIndex> for usize {
    fn from(step: StepIndex) -> Self {
        step.0
    }
}

impl std::fmt::Display for StepIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the outbound message of a step is assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionMode {
    /// Send only the prompt; the remote conversation supplies prior turns
    #[default]
    Continuation,
    /// Re-send prior results as labeled blocks ahead of the prompt
    InjectedContext,
}

impl std::fmt::Display for InstructionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Continuation => write!(f, "continuation"),
            Self::InjectedContext => write!(f, "injected_context"),
        }
    }
}

/// Default title, prompt and mode of a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub title: String,
    pub prompt: String,
    #[serde(default)]
    pub mode: InstructionMode,
}

impl StepDefinition {
    pub fn new(title: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            prompt: prompt.into(),
            mode: InstructionMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: InstructionMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Built-in step definitions: extraction, risk analysis, JSON conversion
pub fn default_step_definitions() -> [StepDefinition; CHAIN_LENGTH] {
    [
        StepDefinition::new(
            "Initial Extraction",
            "Summarize the key technical requirements in this document.",
        ),
        StepDefinition::new(
            "Risk Analysis",
            "Based on the summary above, list the top 5 high-priority risks.",
        ),
        StepDefinition::new(
            "JSON Conversion",
            "Convert the risk list into a strict JSON format.",
        ),
    ]
}
