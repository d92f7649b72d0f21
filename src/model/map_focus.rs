use std::collections::BTreeMap;

use crate::model::catalog::{Coordinates, Region};
use crate::model::filter::FilteredView;

/// Region whose background is used when another region has none.
pub const DEFAULT_REGION: Region = Region::WhiteOrchard;

const BUILTIN_REGION_IMAGES: &[(Region, &str)] = &[
    (
        Region::WhiteOrchard,
        "https://img.game8.co/3248145/1f2608107931f6d84d7d92558f88755a.png/show",
    ),
    (
        Region::Velen,
        "https://via.placeholder.com/1000x1000/2a4858/ffffff.png?text=Velen+Map",
    ),
    (
        Region::Skellige,
        "https://via.placeholder.com/1000x1000/1a2a3a/ffffff.png?text=Skellige+Map",
    ),
    (
        Region::KaerMorhen,
        "https://via.placeholder.com/1000x1000/3a2a1a/ffffff.png?text=Kaer+Morhen+Map",
    ),
    (
        Region::Toussaint,
        "https://via.placeholder.com/1000x1000/4a1a1a/ffffff.png?text=Toussaint+Map",
    ),
];

const WIKI_SEARCH_URL: &str = "https://witcher.fandom.com/wiki/Special:Search";

pub fn external_map_url(region: Region) -> &'static str {
    match region {
        Region::WhiteOrchard => "https://mapgenie.io/witcher-3/maps/white-orchard",
        Region::Velen => "https://mapgenie.io/witcher-3/maps/velen-novigrad",
        Region::Skellige => "https://mapgenie.io/witcher-3/maps/skellige",
        Region::KaerMorhen => "https://mapgenie.io/witcher-3/maps/kaer-morhen",
        Region::Toussaint => "https://mapgenie.io/witcher-3/maps/toussaint",
    }
}

pub fn wiki_search_url(term: &str) -> anyhow::Result<String> {
    let url = reqwest::Url::parse_with_params(WIKI_SEARCH_URL, &[("query", term)])?;
    Ok(url.to_string())
}

/// Region → background image source (URL or local path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionImages {
    sources: BTreeMap<Region, String>,
}

impl RegionImages {
    pub fn new(sources: BTreeMap<Region, String>) -> Self {
        Self { sources }
    }

    /// Built-in sources with `overrides` layered on top. Blank overrides unset a region.
    pub fn with_overrides(overrides: &BTreeMap<Region, String>) -> Self {
        let mut sources: BTreeMap<Region, String> = BUILTIN_REGION_IMAGES
            .iter()
            .map(|(region, url)| (*region, url.to_string()))
            .collect();

        for (region, source) in overrides {
            if source.trim().is_empty() {
                sources.remove(region);
            } else {
                sources.insert(*region, source.clone());
            }
        }
        Self { sources }
    }

    /// Source for `region`, falling back to the default region's image.
    pub fn resolve(&self, region: Region) -> Option<&str> {
        self.sources
            .get(&region)
            .or_else(|| self.sources.get(&DEFAULT_REGION))
            .map(String::as_str)
    }
}

impl Default for RegionImages {
    fn default() -> Self {
        Self::with_overrides(&BTreeMap::new())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub item_id: String,
    pub title: String,
    pub short_desc: String,
    pub position: Coordinates,
    pub focused: bool,
}

/// Map panel state: what region is shown, what item is focused, whether the panel is open.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFocus {
    active_region: Region,
    focused_item: Option<String>,
    panel_open: bool,
}

impl MapFocus {
    pub fn new(active_region: Region) -> Self {
        Self {
            active_region,
            focused_item: None,
            panel_open: false,
        }
    }

    pub fn active_region(&self) -> Region {
        self.active_region
    }

    pub fn focused_item(&self) -> Option<&str> {
        self.focused_item.as_deref()
    }

    pub fn panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn set_active_region(&mut self, region: Region) {
        if self.active_region != region {
            log::debug!("Map region {} -> {}", self.active_region, region);
        }
        self.active_region = region;
    }

    /// Opens the panel, switches to `region` and focuses `item_id` in one step.
    pub fn locate(&mut self, item_id: &str, region: Region) {
        self.panel_open = true;
        self.set_active_region(region);
        self.focused_item = Some(item_id.to_string());
    }

    pub fn clear_focus(&mut self) {
        self.focused_item = None;
    }

    pub fn toggle_panel(&mut self) {
        self.panel_open = !self.panel_open;
    }

    /// Drops the focus if the focused item is no longer visible.
    pub fn retain_visible(&mut self, view: &FilteredView<'_>) {
        if let Some(id) = &self.focused_item {
            if !view.contains_item(id) {
                log::debug!("Clearing map focus on '{id}', no longer visible");
                self.clear_focus();
            }
        }
    }

    /// One marker per visible item that has coordinates.
    pub fn markers(&self, view: &FilteredView<'_>) -> Vec<Marker> {
        view.items()
            .filter_map(|item| {
                item.coordinates.map(|position| Marker {
                    item_id: item.id.clone(),
                    title: item.title.clone(),
                    short_desc: item.short_desc.clone(),
                    position,
                    focused: self.focused_item.as_deref() == Some(item.id.as_str()),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::catalog::tests::small_catalog;
    use crate::model::catalog::Catalog;
    use crate::model::filter::filter_catalog;

    #[test]
    fn locate_opens_panel_and_sets_region_and_focus() {
        let mut focus = MapFocus::new(Region::WhiteOrchard);
        assert!(!focus.panel_open());

        focus.locate("vel-1", Region::Velen);

        assert!(focus.panel_open());
        assert_eq!(focus.active_region(), Region::Velen);
        assert_eq!(focus.focused_item(), Some("vel-1"));
    }

    #[test]
    fn locate_keeps_an_open_panel_open() {
        let mut focus = MapFocus::new(Region::WhiteOrchard);
        focus.toggle_panel();
        focus.locate("wo-1", Region::WhiteOrchard);
        assert!(focus.panel_open());
    }

    #[test]
    fn focus_is_dropped_when_item_leaves_view() {
        let catalog = small_catalog();
        let mut focus = MapFocus::new(Region::WhiteOrchard);
        focus.locate("a-1", Region::WhiteOrchard);

        focus.retain_visible(&filter_catalog(&catalog, "skull"));
        assert_eq!(focus.focused_item(), Some("a-1"));

        focus.retain_visible(&filter_catalog(&catalog, "gwent"));
        assert_eq!(focus.focused_item(), None);
        assert_eq!(focus.active_region(), Region::WhiteOrchard);
    }

    #[test]
    fn markers_skip_items_without_coordinates() {
        let catalog = Catalog::witcher3().unwrap();
        let mut focus = MapFocus::new(Region::WhiteOrchard);
        focus.locate("wo-3", Region::WhiteOrchard);

        let markers = focus.markers(&filter_catalog(&catalog, ""));
        let ids: Vec<&str> = markers.iter().map(|m| m.item_id.as_str()).collect();
        assert_eq!(ids, vec!["wo-1", "wo-2", "wo-3", "wo-4", "wo-6"]);
        assert_eq!(
            markers.iter().filter(|m| m.focused).count(),
            1,
            "only the located item is highlighted"
        );
        assert_eq!(markers[2].position, [600.0, 600.0]);
    }

    #[test]
    fn markers_follow_the_filter() {
        let catalog = Catalog::witcher3().unwrap();
        let focus = MapFocus::new(Region::WhiteOrchard);
        let markers = focus.markers(&filter_catalog(&catalog, "viper"));
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].title, "Viper School Gear");
        assert!(filter_catalog(&catalog, "baron").items().count() > 0);
        assert!(focus.markers(&filter_catalog(&catalog, "baron")).is_empty());
    }

    #[test]
    fn missing_region_image_falls_back_to_default_region() {
        let sources: BTreeMap<Region, String> =
            [(Region::WhiteOrchard, "orchard.png".to_string())].into_iter().collect();
        let images = RegionImages::new(sources);
        assert_eq!(images.resolve(Region::Toussaint), Some("orchard.png"));
        assert_eq!(images.resolve(Region::WhiteOrchard), Some("orchard.png"));
        assert_eq!(RegionImages::new(BTreeMap::new()).resolve(Region::Velen), None);
    }

    #[test]
    fn overrides_replace_or_unset_builtin_images() {
        let overrides: BTreeMap<Region, String> = [
            (Region::Velen, "/maps/velen.jpg".to_string()),
            (Region::Skellige, String::new()),
        ]
        .into_iter()
        .collect();
        let images = RegionImages::with_overrides(&overrides);
        assert_eq!(images.resolve(Region::Velen), Some("/maps/velen.jpg"));
        assert_eq!(
            images.resolve(Region::Skellige),
            images.resolve(Region::WhiteOrchard)
        );
    }

    #[test]
    fn external_links_are_region_and_term_specific() {
        assert!(external_map_url(Region::Skellige).ends_with("/skellige"));
        let url = wiki_search_url("On Death's Bed").unwrap();
        assert!(url.starts_with("https://witcher.fandom.com/wiki/Special:Search?query="));
        assert!(url.contains("On+Death%27s+Bed"));
    }
}
