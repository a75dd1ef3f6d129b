use serde::Serialize;

use crate::content::CodeLockSpec;
use crate::state::Effect;

/// Asks the input surface to collect a code for a locked zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeEntryRequest {
    pub zone_id: String,
    pub code_length: usize,
}

/// Digits typed so far on an open keypad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeEntry {
    zone_id: String,
    code_length: usize,
    entered: String,
}

impl CodeEntry {
    pub fn open(request: CodeEntryRequest) -> Self {
        Self {
            zone_id: request.zone_id,
            code_length: request.code_length,
            entered: String::new(),
        }
    }

    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    pub fn code_length(&self) -> usize {
        self.code_length
    }

    pub fn entered(&self) -> &str {
        &self.entered
    }

    /// Ignores non-digits and input past the code length.
    pub fn push_digit(&mut self, digit: char) -> bool {
        if !digit.is_ascii_digit() || self.is_complete() {
            return false;
        }
        self.entered.push(digit);
        true
    }

    pub fn clear(&mut self) {
        self.entered.clear();
    }

    pub fn is_complete(&self) -> bool {
        self.entered.len() >= self.code_length
    }

    /// Keypad readout such as `3 1 _`.
    pub fn display(&self) -> String {
        let mut slots = self
            .entered
            .chars()
            .map(String::from)
            .collect::<Vec<_>>();
        slots.resize(self.code_length.max(slots.len()), "_".to_string());
        slots.join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeVerdict {
    Accepted,
    Rejected,
    Incomplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeSubmission {
    pub verdict: CodeVerdict,
    pub effects: Vec<Effect>,
    pub messages: Vec<String>,
}

/// Compares `entered` verbatim against the lock's code.
pub fn resolve_code_submission(spec: &CodeLockSpec, entered: &str) -> CodeSubmission {
    if entered.chars().count() < spec.code_length() {
        return CodeSubmission {
            verdict: CodeVerdict::Incomplete,
            effects: Vec::new(),
            messages: Vec::new(),
        };
    }
    if entered != spec.correct_code {
        return CodeSubmission {
            verdict: CodeVerdict::Rejected,
            effects: Vec::new(),
            messages: vec!["It won't budge.".to_string()],
        };
    }

    let mut messages = vec![format!("The {} unlocks!", spec.noun)];
    if let Some(contents) = &spec.contents {
        messages.push(format!("Inside you see a {contents}"));
    }
    CodeSubmission {
        verdict: CodeVerdict::Accepted,
        effects: vec![
            Effect::SetFlag {
                key: spec.unlocked_flag.clone(),
                value: true,
            },
            Effect::SetFlag {
                key: spec.open_flag.clone(),
                value: true,
            },
        ],
        messages,
    }
}

pub fn close_message(spec: &CodeLockSpec) -> String {
    format!("You step back from the {}.", spec.noun)
}
