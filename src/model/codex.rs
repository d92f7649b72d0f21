use crate::model::advice::{AdviceDispatcher, AdviceError, AdvicePrompt, AdviceRequest, AdviceTarget};

pub const CODEX_FALLBACK: &str = "The pages are faded... (Error receiving response)";

/// Free-form lore question dialog. One question in flight at a time.
#[derive(Debug, Clone, Default)]
pub struct CodexState {
    pub open: bool,
    pub draft: String,
    asked: Option<String>,
    answer: Option<String>,
    loading: bool,
}

impl CodexState {
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn asked(&self) -> Option<&str> {
        self.asked.as_deref()
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn can_submit(&self) -> bool {
        !self.loading && !self.draft.trim().is_empty()
    }

    /// Sends the draft. `build` turns the question into the full prompt.
    pub fn submit<D, F>(&mut self, dispatcher: &D, build: F) -> bool
    where
        D: AdviceDispatcher + ?Sized,
        F: FnOnce(&str) -> AdvicePrompt,
    {
        if !self.can_submit() {
            return false;
        }

        let question = self.draft.trim().to_string();
        let prompt = build(&question);
        self.asked = Some(question);
        self.answer = None;
        self.loading = true;

        dispatcher.dispatch(AdviceRequest {
            target: AdviceTarget::Codex,
            prompt,
        });
        true
    }

    pub fn complete(&mut self, outcome: Result<String, AdviceError>) {
        if !self.loading {
            return;
        }
        self.loading = false;
        self.answer = Some(match outcome {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Codex query failed: {e}");
                CODEX_FALLBACK.to_string()
            }
        });
    }
}
