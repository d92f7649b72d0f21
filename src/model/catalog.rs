use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// The checklist shipped with the application.
const WITCHER3_CATALOG: &str = include_str!("../../assets/witcher3.json");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("phase id '{0}' appears more than once")]
    DuplicatePhase(String),
    #[error("item id '{0}' appears in more than one place")]
    DuplicateItem(String),
    #[error("catalog has no phases")]
    Empty,
}

/// Map area a phase belongs to. Selects the map background and marker set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    WhiteOrchard,
    Velen,
    Skellige,
    KaerMorhen,
    Toussaint,
}

impl Region {
    pub fn label(self) -> &'static str {
        match self {
            Region::WhiteOrchard => "White Orchard",
            Region::Velen => "Velen & Novigrad",
            Region::Skellige => "Skellige",
            Region::KaerMorhen => "Kaer Morhen",
            Region::Toussaint => "Toussaint",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Region::WhiteOrchard => "white_orchard",
            Region::Velen => "velen",
            Region::Skellige => "skellige",
            Region::KaerMorhen => "kaer_morhen",
            Region::Toussaint => "toussaint",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Missable,
    Critical,
    Gear,
    Quest,
    Exploration,
    Contract,
    Warning,
    Task,
    Save,
    Achievement,
    Decision,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::Missable,
        Category::Critical,
        Category::Gear,
        Category::Quest,
        Category::Exploration,
        Category::Contract,
        Category::Warning,
        Category::Task,
        Category::Save,
        Category::Achievement,
        Category::Decision,
    ];

    /// Unchecked urgent items get the red "Critical" badge.
    pub fn is_urgent(self) -> bool {
        matches!(self, Category::Critical | Category::Warning)
    }

    pub fn key(self) -> &'static str {
        match self {
            Category::Missable => "missable",
            Category::Critical => "critical",
            Category::Gear => "gear",
            Category::Quest => "quest",
            Category::Exploration => "exploration",
            Category::Contract => "contract",
            Category::Warning => "warning",
            Category::Task => "task",
            Category::Save => "save",
            Category::Achievement => "achievement",
            Category::Decision => "decision",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::Missable | Category::Warning => "⚠",
            Category::Critical => "☠",
            Category::Gear => "🛡",
            Category::Quest | Category::Contract | Category::Task => "✔",
            Category::Exploration => "🗺",
            Category::Save => "💾",
            Category::Achievement => "⚓",
            Category::Decision => "ℹ",
        }
    }
}

/// `[lat, lng]` on the 1000x1000 simple map plane.
pub type Coordinates = [f32; 2];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub short_desc: String,
    pub long_desc: String,
    pub location: String,
    pub map_search_term: String,
    pub wiki_search: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub id: String,
    pub title: String,
    pub region: Region,
    pub description: String,
    #[serde(default = "default_accent")]
    pub accent: [u8; 3],
    pub items: Vec<Item>,
}

fn default_accent() -> [u8; 3] {
    [156, 163, 175]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub game_id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    /// Name of the persisted progress slot for this game.
    pub storage_key: String,
    pub phases: Vec<Phase>,
}

impl Catalog {
    /// Parse and validate a catalog document.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// The built-in Witcher 3 checklist.
    pub fn witcher3() -> Result<Self, CatalogError> {
        Self::from_json(WITCHER3_CATALOG)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.phases.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut phase_ids = HashSet::new();
        let mut item_ids = HashSet::new();
        for phase in &self.phases {
            if !phase_ids.insert(phase.id.as_str()) {
                return Err(CatalogError::DuplicatePhase(phase.id.clone()));
            }
            for item in &phase.items {
                if !item_ids.insert(item.id.as_str()) {
                    return Err(CatalogError::DuplicateItem(item.id.clone()));
                }
            }
        }
        Ok(())
    }

    pub fn total_items(&self) -> usize {
        self.phases.iter().map(|p| p.items.len()).sum()
    }

    pub fn phase(&self, phase_id: &str) -> Option<&Phase> {
        self.phases.iter().find(|p| p.id == phase_id)
    }

    /// Finds an item together with the phase that owns it.
    pub fn item(&self, item_id: &str) -> Option<(&Phase, &Item)> {
        self.phases.iter().find_map(|phase| {
            phase
                .items
                .iter()
                .find(|item| item.id == item_id)
                .map(|item| (phase, item))
        })
    }

    /// Phase that is open when a session starts.
    pub fn first_phase(&self) -> Option<&Phase> {
        self.phases.first()
    }

    pub fn default_region(&self) -> Region {
        self.first_phase()
            .map(|p| p.region)
            .unwrap_or(Region::WhiteOrchard)
    }
}
