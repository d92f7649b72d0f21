use std::collections::HashMap;

/// Shown in place of item advice when generation fails.
pub const ITEM_ADVICE_FALLBACK: &str = "Vesemir grunted. (Error receiving advice)";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdviceError {
    #[error("no API key configured (set {0})")]
    MissingApiKey(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("advice service returned HTTP {0}")]
    Status(u16),
    #[error("advice service response could not be decoded: {0}")]
    Decode(String),
    #[error("advice service returned no text")]
    EmptyResponse,
    #[error("advice service unavailable: {0}")]
    Unavailable(String),
}

impl AdviceError {
    /// Transport hiccups and non-success statuses are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AdviceError::Transport(_) | AdviceError::Status(_))
    }
}

/// Who receives the generated text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AdviceTarget {
    Item(String),
    Codex,
}

/// Prompt plus role instruction for the advice collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvicePrompt {
    pub prompt: String,
    pub system: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdviceRequest {
    pub target: AdviceTarget,
    pub prompt: AdvicePrompt,
}

/// Hands a request to whatever performs generation. Completion comes back later
/// through `AdviceCache::complete` or `CodexState::complete`.
pub trait AdviceDispatcher {
    fn dispatch(&self, request: AdviceRequest);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdviceState {
    Loading,
    Ready(String),
}

/// One advice text per item, fetched at most once.
#[derive(Debug, Clone, Default)]
pub struct AdviceCache {
    entries: HashMap<String, AdviceState>,
}

impl AdviceCache {
    pub fn state(&self, item_id: &str) -> Option<&AdviceState> {
        self.entries.get(item_id)
    }

    pub fn is_loading(&self, item_id: &str) -> bool {
        matches!(self.entries.get(item_id), Some(AdviceState::Loading))
    }

    pub fn any_loading(&self) -> bool {
        self.entries.values().any(|s| *s == AdviceState::Loading)
    }

    pub fn text(&self, item_id: &str) -> Option<&str> {
        match self.entries.get(item_id) {
            Some(AdviceState::Ready(text)) => Some(text),
            _ => None,
        }
    }

    /// Dispatches a fetch unless one is in flight or already resolved.
    /// Returns whether a fetch was issued.
    pub fn request<D: AdviceDispatcher + ?Sized>(
        &mut self,
        item_id: &str,
        prompt: AdvicePrompt,
        dispatcher: &D,
    ) -> bool {
        if self.entries.contains_key(item_id) {
            return false;
        }

        self.entries
            .insert(item_id.to_string(), AdviceState::Loading);
        log::debug!("Requesting advice for '{item_id}'");
        dispatcher.dispatch(AdviceRequest {
            target: AdviceTarget::Item(item_id.to_string()),
            prompt,
        });
        true
    }

    /// Resolves an in-flight request. Failures become the fixed apology text.
    pub fn complete(&mut self, item_id: &str, outcome: Result<String, AdviceError>) {
        let Some(state) = self.entries.get_mut(item_id) else {
            log::warn!("Advice arrived for '{item_id}' which was never requested");
            return;
        };
        if *state != AdviceState::Loading {
            return;
        }

        let text = match outcome {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Advice for '{item_id}' failed: {e}");
                ITEM_ADVICE_FALLBACK.to_string()
            }
        };
        *state = AdviceState::Ready(text);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    pub(crate) struct RecordingDispatcher {
        pub(crate) sent: RefCell<Vec<AdviceRequest>>,
    }

    impl AdviceDispatcher for RecordingDispatcher {
        fn dispatch(&self, request: AdviceRequest) {
            self.sent.borrow_mut().push(request);
        }
    }

    fn prompt() -> AdvicePrompt {
        AdvicePrompt {
            prompt: "Advice for: The Crystal Skull".to_string(),
            system: "Be grumpy.".to_string(),
        }
    }

    #[test]
    fn second_request_after_ready_does_not_fetch_again() {
        let dispatcher = RecordingDispatcher::default();
        let mut cache = AdviceCache::default();

        assert!(cache.request("wo-1", prompt(), &dispatcher));
        cache.complete("wo-1", Ok("Look north of the road.".to_string()));
        assert!(!cache.request("wo-1", prompt(), &dispatcher));

        assert_eq!(dispatcher.sent.borrow().len(), 1);
        assert_eq!(cache.text("wo-1"), Some("Look north of the road."));
    }

    #[test]
    fn request_while_loading_is_ignored() {
        let dispatcher = RecordingDispatcher::default();
        let mut cache = AdviceCache::default();

        cache.request("wo-1", prompt(), &dispatcher);
        assert!(cache.is_loading("wo-1"));
        assert!(!cache.request("wo-1", prompt(), &dispatcher));
        assert_eq!(dispatcher.sent.borrow().len(), 1);
    }

    #[test]
    fn different_items_fetch_independently() {
        let dispatcher = RecordingDispatcher::default();
        let mut cache = AdviceCache::default();

        cache.request("wo-1", prompt(), &dispatcher);
        cache.request("wo-2", prompt(), &dispatcher);
        cache.complete("wo-2", Ok("second".to_string()));
        assert!(cache.any_loading());

        assert!(cache.is_loading("wo-1"));
        assert_eq!(cache.text("wo-2"), Some("second"));
        let targets: Vec<AdviceTarget> = dispatcher
            .sent
            .borrow()
            .iter()
            .map(|r| r.target.clone())
            .collect();
        assert_eq!(
            targets,
            vec![
                AdviceTarget::Item("wo-1".to_string()),
                AdviceTarget::Item("wo-2".to_string())
            ]
        );
    }

    #[test]
    fn failure_is_absorbed_as_apology_and_never_refetched() {
        let dispatcher = RecordingDispatcher::default();
        let mut cache = AdviceCache::default();

        cache.request("sk-1", prompt(), &dispatcher);
        cache.complete("sk-1", Err(AdviceError::Status(503)));
        assert!(!cache.any_loading());

        assert_eq!(
            cache.state("sk-1"),
            Some(&AdviceState::Ready(ITEM_ADVICE_FALLBACK.to_string()))
        );
        assert!(!cache.request("sk-1", prompt(), &dispatcher));
        assert_eq!(dispatcher.sent.borrow().len(), 1);
    }

    #[test]
    fn unsolicited_completion_is_ignored() {
        let mut cache = AdviceCache::default();
        cache.complete("ghost", Ok("boo".to_string()));
        assert!(cache.state("ghost").is_none());
    }

    #[test]
    fn only_transport_and_status_errors_retry() {
        assert!(AdviceError::Transport("reset".into()).is_retryable());
        assert!(AdviceError::Status(500).is_retryable());
        assert!(!AdviceError::EmptyResponse.is_retryable());
        assert!(!AdviceError::MissingApiKey("GEMINI_API_KEY".into()).is_retryable());
    }
}
