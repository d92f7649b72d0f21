//! The checklist screen's state, composed from the independent model containers.
//!
//! Every user action is a method here; every derived view (filtered checklist,
//! completion percent, map markers) is recomputed from current state on demand.

use crate::engine::prompt_builder::PromptBuilder;
use crate::model::advice::{AdviceCache, AdviceDispatcher, AdviceError, AdviceTarget};
use crate::model::catalog::{Catalog, Item, Region};
use crate::model::codex::CodexState;
use crate::model::expansion::ExpansionState;
use crate::model::filter::{filter_catalog, FilteredPhase, FilteredView};
use crate::model::map_focus::{MapFocus, Marker};
use crate::model::progress::{ProgressMap, ProgressStorage, ProgressStore};

pub struct ChecklistSession<S> {
    catalog: Catalog,
    progress: ProgressStore<S>,
    expansion: ExpansionState,
    query: String,
    map: MapFocus,
    advice: AdviceCache,
    pub codex: CodexState,
}

impl<S: ProgressStorage> ChecklistSession<S> {
    pub fn new(catalog: Catalog, storage: S) -> Self {
        let expansion = ExpansionState::new(catalog.first_phase().map(|p| p.id.as_str()));
        let map = MapFocus::new(catalog.default_region());

        Self {
            progress: ProgressStore::load(storage),
            expansion,
            query: String::new(),
            map,
            advice: AdviceCache::default(),
            codex: CodexState::default(),
            catalog,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /* -------- Progress -------- */

    pub fn toggle_item(&mut self, item_id: &str) {
        self.progress.toggle(item_id);
    }

    /// Clears all progress. Callers confirm with the user first.
    pub fn reset_progress(&mut self) {
        self.progress.reset();
    }

    pub fn import_progress(&mut self, progress: ProgressMap) {
        log::info!("Importing {} progress entries", progress.len());
        self.progress.replace(progress);
    }

    pub fn progress(&self) -> &ProgressMap {
        self.progress.mapping()
    }

    pub fn is_checked(&self, item_id: &str) -> bool {
        self.progress.is_checked(item_id)
    }

    pub fn completed_count(&self) -> usize {
        self.progress.completed_count()
    }

    pub fn percent(&self) -> u8 {
        self.progress.percent(self.catalog.total_items())
    }

    /* -------- Filter -------- */

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn query_active(&self) -> bool {
        !self.query.trim().is_empty()
    }

    /// Changes the search text and drops map focus if the focused item vanished.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        let view = filter_catalog(&self.catalog, &self.query);
        self.map.retain_visible(&view);
    }

    pub fn view(&self) -> FilteredView<'_> {
        filter_catalog(&self.catalog, &self.query)
    }

    /* -------- Expansion -------- */

    /// Opening a phase also points the map at its region; closing leaves the map alone.
    pub fn toggle_phase(&mut self, phase_id: &str) {
        let Some(region) = self.catalog.phase(phase_id).map(|p| p.region) else {
            log::debug!("Ignoring toggle of unknown phase '{phase_id}'");
            return;
        };
        if self.expansion.toggle_phase(phase_id) {
            self.map.set_active_region(region);
        }
    }

    pub fn phase_is_open(&self, phase: &FilteredPhase<'_>) -> bool {
        phase.force_expand || self.query_active() || self.expansion.phase_open(&phase.phase.id)
    }

    /// No effect while searching; matched items are forced open then.
    pub fn toggle_item_details(&mut self, item_id: &str) {
        if self.query_active() {
            return;
        }
        self.expansion.toggle_item(item_id);
    }

    pub fn item_details_open(&self, item_id: &str) -> bool {
        self.query_active() || self.expansion.item_open(item_id)
    }

    /* -------- Map -------- */

    pub fn map(&self) -> &MapFocus {
        &self.map
    }

    pub fn toggle_map(&mut self) {
        self.map.toggle_panel();
    }

    pub fn show_phase_on_map(&mut self, phase_id: &str) {
        if let Some(phase) = self.catalog.phase(phase_id) {
            self.map.set_active_region(phase.region);
        }
    }

    /// Focuses a visible item on the map. Items hidden by the filter are refused.
    pub fn locate(&mut self, item_id: &str, region: Region) -> bool {
        if !self.view().contains_item(item_id) {
            log::debug!("Refusing to locate '{item_id}', not in the current view");
            return false;
        }
        self.map.locate(item_id, region);
        true
    }

    pub fn clear_focus(&mut self) {
        self.map.clear_focus();
    }

    pub fn focused_item(&self) -> Option<&Item> {
        let id = self.map.focused_item()?;
        self.catalog.item(id).map(|(_, item)| item)
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.map.markers(&self.view())
    }

    /* -------- Advice -------- */

    pub fn advice(&self) -> &AdviceCache {
        &self.advice
    }

    pub fn request_advice<D: AdviceDispatcher + ?Sized>(
        &mut self,
        item_id: &str,
        dispatcher: &D,
    ) -> bool {
        let Some((_, item)) = self.catalog.item(item_id) else {
            return false;
        };
        let prompt = PromptBuilder::item_advice(item);
        self.advice.request(item_id, prompt, dispatcher)
    }

    pub fn ask_codex<D: AdviceDispatcher + ?Sized>(&mut self, dispatcher: &D) -> bool {
        self.codex.submit(dispatcher, PromptBuilder::codex)
    }

    pub fn apply_advice(&mut self, target: AdviceTarget, outcome: Result<String, AdviceError>) {
        match target {
            AdviceTarget::Item(item_id) => self.advice.complete(&item_id, outcome),
            AdviceTarget::Codex => self.codex.complete(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::advice::tests::RecordingDispatcher;
    use crate::model::advice::{AdviceState, ITEM_ADVICE_FALLBACK};
    use crate::model::codex::CODEX_FALLBACK;
    use crate::model::progress::tests::MemoryStorage;

    fn session() -> (ChecklistSession<MemoryStorage>, MemoryStorage) {
        let storage = MemoryStorage::default();
        let session = ChecklistSession::new(Catalog::witcher3().unwrap(), storage.clone());
        (session, storage)
    }

    #[test]
    fn starts_with_first_phase_open_and_map_closed() {
        let (session, _) = session();
        let view = session.view();

        assert!(session.phase_is_open(&view.phases[0]));
        assert!(view.phases[1..].iter().all(|p| !session.phase_is_open(p)));
        assert_eq!(session.map().active_region(), Region::WhiteOrchard);
        assert!(!session.map().panel_open());
        assert!(session.map().focused_item().is_none());
        assert_eq!(session.percent(), 0);
    }

    #[test]
    fn checking_first_item_gives_one_share_of_total() {
        let (mut session, storage) = session();
        let n = session.catalog().total_items();

        session.toggle_item("wo-1");

        assert_eq!(session.percent(), (100.0 / n as f64).round() as u8);
        assert_eq!(session.percent(), 4);
        assert_eq!(storage.saved().unwrap().get("wo-1"), Some(&true));
    }

    #[test]
    fn reset_zeroes_percent_and_storage() {
        let (mut session, storage) = session();
        session.toggle_item("wo-1");
        session.toggle_item("vel-1");

        session.reset_progress();

        assert_eq!(session.percent(), 0);
        assert!(storage.saved().unwrap().is_empty());
    }

    #[test]
    fn progress_survives_a_new_session() {
        let (mut session, storage) = session();
        session.toggle_item("baw-2");
        drop(session);

        let reopened = ChecklistSession::new(Catalog::witcher3().unwrap(), storage);
        assert!(reopened.is_checked("baw-2"));
        assert_eq!(reopened.completed_count(), 1);
    }

    #[test]
    fn opening_a_phase_retargets_the_map() {
        let (mut session, _) = session();

        session.toggle_phase("phase-2");
        assert_eq!(session.map().active_region(), Region::Velen);

        session.show_phase_on_map("phase-1");
        session.toggle_phase("phase-2");
        assert_eq!(
            session.map().active_region(),
            Region::WhiteOrchard,
            "collapsing must not move the map"
        );
    }

    #[test]
    fn unknown_phase_toggle_is_ignored() {
        let (mut session, _) = session();
        session.toggle_phase("phase-99");
        assert_eq!(session.map().active_region(), Region::WhiteOrchard);
    }

    #[test]
    fn search_forces_phases_and_details_open() {
        let (mut session, _) = session();
        session.set_query("gwent");
        let view = session.view();

        let ids: Vec<&str> = view.phases.iter().map(|p| p.phase.id.as_str()).collect();
        assert_eq!(ids, vec!["phase-1", "phase-2", "phase-3"]);
        assert!(view.phases.iter().all(|p| session.phase_is_open(p)));
        assert!(session.item_details_open("vel-1"));
    }

    #[test]
    fn item_details_toggle_is_ignored_while_searching() {
        let (mut session, _) = session();
        session.set_query("skull");
        session.toggle_item_details("wo-1");

        session.set_query("");
        assert!(!session.item_details_open("wo-1"));

        session.toggle_item_details("wo-1");
        assert!(session.item_details_open("wo-1"));
    }

    #[test]
    fn clearing_search_restores_saved_expansion() {
        let (mut session, _) = session();
        session.toggle_phase("phase-1");
        session.set_query("gwent");
        session.set_query("");

        let view = session.view();
        assert!(!session.phase_is_open(&view.phases[0]));
        assert!(view.phases.iter().all(|p| !p.force_expand));
    }

    #[test]
    fn locate_sets_focus_region_and_opens_panel() {
        let (mut session, _) = session();

        assert!(session.locate("wo-3", Region::WhiteOrchard));

        assert_eq!(session.map().focused_item(), Some("wo-3"));
        assert_eq!(session.map().active_region(), Region::WhiteOrchard);
        assert!(session.map().panel_open());
        assert_eq!(session.focused_item().unwrap().title, "Viper School Gear");
    }

    #[test]
    fn filter_that_hides_focused_item_clears_focus() {
        let (mut session, _) = session();
        session.locate("vel-1", Region::Velen);

        session.set_query("baron");
        assert_eq!(session.map().focused_item(), Some("vel-1"));

        session.set_query("skellige");
        assert_eq!(session.map().focused_item(), None);
        assert!(session.map().panel_open());
    }

    #[test]
    fn clearing_focus_keeps_region_and_panel() {
        let (mut session, _) = session();
        session.locate("vel-2", Region::Velen);

        session.clear_focus();

        assert!(session.focused_item().is_none());
        assert_eq!(session.map().active_region(), Region::Velen);
        assert!(session.map().panel_open());
    }

    #[test]
    fn cannot_locate_item_hidden_by_filter() {
        let (mut session, _) = session();
        session.set_query("gwent");

        assert!(!session.locate("wo-1", Region::WhiteOrchard));
        assert!(session.map().focused_item().is_none());
        assert!(!session.map().panel_open());
    }

    #[test]
    fn markers_track_filter_and_focus() {
        let (mut session, _) = session();
        assert_eq!(session.markers().len(), 5);

        session.locate("wo-4", Region::WhiteOrchard);
        let focused: Vec<String> = session
            .markers()
            .into_iter()
            .filter(|m| m.focused)
            .map(|m| m.item_id)
            .collect();
        assert_eq!(focused, vec!["wo-4".to_string()]);

        session.set_query("gwent");
        assert_eq!(session.markers().len(), 1);
    }

    #[test]
    fn advice_is_fetched_once_per_item() {
        let (mut session, _) = session();
        let dispatcher = RecordingDispatcher::default();

        assert!(session.request_advice("sk-2", &dispatcher));
        session.apply_advice(
            AdviceTarget::Item("sk-2".into()),
            Ok("Keep the Loon quiet.".into()),
        );
        assert!(!session.request_advice("sk-2", &dispatcher));

        let sent = dispatcher.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].prompt.prompt.starts_with("Advice for: The Lord of Undvik."));
        assert_eq!(session.advice().text("sk-2"), Some("Keep the Loon quiet."));
    }

    #[test]
    fn advice_failure_shows_apology() {
        let (mut session, _) = session();
        let dispatcher = RecordingDispatcher::default();
        session.request_advice("sk-1", &dispatcher);
        session.apply_advice(
            AdviceTarget::Item("sk-1".into()),
            Err(AdviceError::Status(500)),
        );
        assert_eq!(
            session.advice().state("sk-1"),
            Some(&AdviceState::Ready(ITEM_ADVICE_FALLBACK.to_string()))
        );
    }

    #[test]
    fn advice_for_unknown_item_is_not_requested() {
        let (mut session, _) = session();
        let dispatcher = RecordingDispatcher::default();
        assert!(!session.request_advice("nope", &dispatcher));
        assert!(dispatcher.sent.borrow().is_empty());
    }

    #[test]
    fn codex_round_trip() {
        let (mut session, _) = session();
        let dispatcher = RecordingDispatcher::default();
        session.codex.draft = "How do I beat a griffin?".into();

        assert!(session.ask_codex(&dispatcher));
        assert!(dispatcher.sent.borrow()[0].prompt.system.contains("Codex"));
        session.apply_advice(AdviceTarget::Codex, Err(AdviceError::EmptyResponse));

        assert_eq!(session.codex.answer(), Some(CODEX_FALLBACK));
    }

    #[test]
    fn import_replaces_progress() {
        let (mut session, storage) = session();
        session.toggle_item("wo-1");
        let imported: ProgressMap = [("nov-2".to_string(), true)].into_iter().collect();

        session.import_progress(imported.clone());

        assert!(!session.is_checked("wo-1"));
        assert!(session.is_checked("nov-2"));
        assert_eq!(storage.saved(), Some(imported));
    }
}
