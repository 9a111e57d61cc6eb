//! Multi-step quiz flow with one conditional branch.
//!
//! Steps are integer indices. Step 3 (skin tone) classifies the selected
//! tone: ambiguous middle tones route through step 4 (sun reaction),
//! everything else skips straight to step 5. Back-navigation mirrors the
//! same skip so the flow never lands on a step the user was never shown.

use crate::rules::{SkinProfile, MATURITY_AGE};
use serde::{Deserialize, Serialize};

pub const STEP_NAME: usize = 0;
pub const STEP_AGE: usize = 1;
pub const STEP_SKIN_TYPE: usize = 2;
pub const STEP_SKIN_TONE: usize = 3;
pub const STEP_SUN_REACTION: usize = 4;
pub const STEP_ACNE_TYPES: usize = 5;
pub const STEP_SEVERITY: usize = 6;
pub const STEP_PREGNANCY: usize = 7;
pub const STEP_REVIEW: usize = 8;

const STEP_COUNT: usize = 9;

/// The accumulated answer set handed to the completion callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAnswers {
    pub name: String,
    pub age: u8,
    pub skin_type: String,
    pub fitzpatrick_group: String,
    pub acne_types: Vec<String>,
    pub acne_severity: String,
    pub is_pregnant_or_nursing: bool,
}

impl QuizAnswers {
    /// Derive the rule-table input tuple. Acne types collapse to a single
    /// canonical value: both inflamed and noninflamed present means "mixed",
    /// an empty list means "none" (only wildcard rows match it).
    pub fn profile(&self) -> SkinProfile {
        let lowered: Vec<String> = self
            .acne_types
            .iter()
            .map(|value| value.trim().to_ascii_lowercase())
            .collect();
        let has_inflamed = lowered.iter().any(|value| value == "inflamed");
        let has_noninflamed = lowered.iter().any(|value| value == "noninflamed");
        let acne_type = match (has_inflamed, has_noninflamed) {
            (true, true) => "mixed".to_string(),
            (true, false) => "inflamed".to_string(),
            (false, true) => "noninflamed".to_string(),
            (false, false) => lowered.first().cloned().unwrap_or_else(|| "none".to_string()),
        };

        SkinProfile {
            is_pregnant_or_nursing: self.is_pregnant_or_nursing,
            acne_type,
            severity: self.acne_severity.trim().to_ascii_lowercase(),
            is_mature: self.age >= MATURITY_AGE,
            fitzpatrick_group: self.fitzpatrick_group.clone(),
            skin_type: self.skin_type.trim().to_ascii_lowercase(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    MovedTo(usize),
    /// Back from the initial step invokes the caller's cancel path.
    Cancelled,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QuizFlowError {
    #[error("answer recorded for step {expected} while flow is at step {current}")]
    WrongStep { expected: usize, current: usize },
    #[error("skin tone must be between 1 and 6, got {0}")]
    ToneOutOfRange(u8),
    #[error("quiz is missing required answers")]
    Incomplete,
}

#[derive(Debug, Clone, Default)]
struct Draft {
    name: Option<String>,
    age: Option<u8>,
    skin_type: Option<String>,
    skin_tone: Option<u8>,
    burns_easily: Option<bool>,
    acne_types: Option<Vec<String>>,
    acne_severity: Option<String>,
    is_pregnant_or_nursing: Option<bool>,
}

/// Client-side quiz navigation state.
#[derive(Debug, Clone, Default)]
pub struct QuizFlow {
    step: usize,
    draft: Draft,
}

/// Tones 3 and 4 sit in the ambiguous middle of the scale; only they need
/// the sun-reaction follow-up to classify the Fitzpatrick group.
fn tone_is_ambiguous(tone: u8) -> bool {
    (3..=4).contains(&tone)
}

impl QuizFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> usize {
        self.step
    }

    fn branch_taken(&self) -> bool {
        self.draft.skin_tone.map(tone_is_ambiguous).unwrap_or(false)
    }

    fn expect_step(&self, expected: usize) -> Result<(), QuizFlowError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(QuizFlowError::WrongStep {
                expected,
                current: self.step,
            })
        }
    }

    pub fn answer_name(&mut self, name: String) -> Result<usize, QuizFlowError> {
        self.expect_step(STEP_NAME)?;
        self.draft.name = Some(name);
        self.step = STEP_AGE;
        Ok(self.step)
    }

    pub fn answer_age(&mut self, age: u8) -> Result<usize, QuizFlowError> {
        self.expect_step(STEP_AGE)?;
        self.draft.age = Some(age);
        self.step = STEP_SKIN_TYPE;
        Ok(self.step)
    }

    pub fn answer_skin_type(&mut self, skin_type: String) -> Result<usize, QuizFlowError> {
        self.expect_step(STEP_SKIN_TYPE)?;
        self.draft.skin_type = Some(skin_type);
        self.step = STEP_SKIN_TONE;
        Ok(self.step)
    }

    /// Records the tone swatch and branches: ambiguous middle tones go to
    /// the sun-reaction question, everything else skips it.
    pub fn answer_skin_tone(&mut self, tone: u8) -> Result<usize, QuizFlowError> {
        self.expect_step(STEP_SKIN_TONE)?;
        if !(1..=6).contains(&tone) {
            return Err(QuizFlowError::ToneOutOfRange(tone));
        }
        self.draft.skin_tone = Some(tone);
        if tone_is_ambiguous(tone) {
            self.step = STEP_SUN_REACTION;
        } else {
            self.draft.burns_easily = None;
            self.step = STEP_ACNE_TYPES;
        }
        Ok(self.step)
    }

    pub fn answer_sun_reaction(&mut self, burns_easily: bool) -> Result<usize, QuizFlowError> {
        self.expect_step(STEP_SUN_REACTION)?;
        self.draft.burns_easily = Some(burns_easily);
        self.step = STEP_ACNE_TYPES;
        Ok(self.step)
    }

    pub fn answer_acne_types(&mut self, acne_types: Vec<String>) -> Result<usize, QuizFlowError> {
        self.expect_step(STEP_ACNE_TYPES)?;
        self.draft.acne_types = Some(acne_types);
        self.step = STEP_SEVERITY;
        Ok(self.step)
    }

    pub fn answer_severity(&mut self, severity: String) -> Result<usize, QuizFlowError> {
        self.expect_step(STEP_SEVERITY)?;
        self.draft.acne_severity = Some(severity);
        self.step = STEP_PREGNANCY;
        Ok(self.step)
    }

    pub fn answer_pregnancy(&mut self, is_pregnant_or_nursing: bool) -> Result<usize, QuizFlowError> {
        self.expect_step(STEP_PREGNANCY)?;
        self.draft.is_pregnant_or_nursing = Some(is_pregnant_or_nursing);
        self.step = STEP_REVIEW;
        Ok(self.step)
    }

    /// Terminal transition: returns the full accumulated answer set.
    pub fn confirm(&self) -> Result<QuizAnswers, QuizFlowError> {
        self.expect_step(STEP_REVIEW)?;
        let draft = &self.draft;
        let tone = draft.skin_tone.ok_or(QuizFlowError::Incomplete)?;
        let fitzpatrick_group = match tone {
            1 | 2 => "1-3".to_string(),
            5 | 6 => "4-6".to_string(),
            _ => {
                let burns = draft.burns_easily.ok_or(QuizFlowError::Incomplete)?;
                if burns { "1-3" } else { "4-6" }.to_string()
            }
        };

        Ok(QuizAnswers {
            name: draft.name.clone().ok_or(QuizFlowError::Incomplete)?,
            age: draft.age.ok_or(QuizFlowError::Incomplete)?,
            skin_type: draft.skin_type.clone().ok_or(QuizFlowError::Incomplete)?,
            fitzpatrick_group,
            acne_types: draft.acne_types.clone().ok_or(QuizFlowError::Incomplete)?,
            acne_severity: draft
                .acne_severity
                .clone()
                .ok_or(QuizFlowError::Incomplete)?,
            is_pregnant_or_nursing: draft
                .is_pregnant_or_nursing
                .ok_or(QuizFlowError::Incomplete)?,
        })
    }

    /// Back mirrors the forward skip: from the acne-type step the flow
    /// returns to the sun-reaction question only when it was shown.
    pub fn back(&mut self) -> BackOutcome {
        if self.step == STEP_NAME {
            return BackOutcome::Cancelled;
        }
        self.step = if self.step == STEP_ACNE_TYPES && !self.branch_taken() {
            STEP_SKIN_TONE
        } else {
            self.step - 1
        };
        BackOutcome::MovedTo(self.step)
    }

    /// Number of steps the user will actually see: 9 when the branch is
    /// taken, 8 otherwise.
    pub fn visible_step_count(&self) -> usize {
        if self.branch_taken() {
            STEP_COUNT
        } else {
            STEP_COUNT - 1
        }
    }

    /// Percentage of the visible flow completed, including the current step.
    pub fn progress_percent(&self) -> u8 {
        let position = if self.step > STEP_SUN_REACTION && !self.branch_taken() {
            self.step - 1
        } else {
            self.step
        };
        (((position + 1) * 100) / self.visible_step_count()) as u8
    }
}
