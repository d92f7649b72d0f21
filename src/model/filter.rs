use crate::model::catalog::{Catalog, Item, Phase};

/// One phase of the filtered checklist, with the items that survived the query.
#[derive(Debug, Clone)]
pub struct FilteredPhase<'a> {
    pub phase: &'a Phase,
    pub items: Vec<&'a Item>,
    /// Set for every phase returned by an active query; overrides collapsed state.
    pub force_expand: bool,
}

#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    pub phases: Vec<FilteredPhase<'a>>,
    query_active: bool,
}

impl<'a> FilteredView<'a> {
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn query_active(&self) -> bool {
        self.query_active
    }

    pub fn items(&self) -> impl Iterator<Item = &'a Item> + '_ {
        self.phases.iter().flat_map(|p| p.items.iter().copied())
    }

    pub fn contains_item(&self, item_id: &str) -> bool {
        self.items().any(|item| item.id == item_id)
    }
}

/// Case-insensitive substring match on title or short description.
pub fn matches(item: &Item, needle_lower: &str) -> bool {
    item.title.to_lowercase().contains(needle_lower)
        || item.short_desc.to_lowercase().contains(needle_lower)
}

/// Derive the visible checklist for `query`.
///
/// A blank query returns the whole catalog untouched. Otherwise phases keep
/// their order, items keep their order within the phase, phases without a
/// single match are dropped and the rest are force-expanded.
pub fn filter_catalog<'a>(catalog: &'a Catalog, query: &str) -> FilteredView<'a> {
    if query.trim().is_empty() {
        return FilteredView {
            phases: catalog
                .phases
                .iter()
                .map(|phase| FilteredPhase {
                    phase,
                    items: phase.items.iter().collect(),
                    force_expand: false,
                })
                .collect(),
            query_active: false,
        };
    }

    let needle = query.to_lowercase();
    let phases = catalog
        .phases
        .iter()
        .filter_map(|phase| {
            let items: Vec<&Item> = phase
                .items
                .iter()
                .filter(|item| matches(item, &needle))
                .collect();

            (!items.is_empty()).then_some(FilteredPhase {
                phase,
                items,
                force_expand: true,
            })
        })
        .collect();

    FilteredView {
        phases,
        query_active: true,
    }
}
