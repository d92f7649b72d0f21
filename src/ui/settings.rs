use egui::Color32;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::catalog::Category;

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct UiSettings {
    pub ui_scale: f32,

    // Category key → badge color
    pub category_colors: HashMap<String, [u8; 4]>,
}

impl Default for UiSettings {
    fn default() -> Self {
        let mut category_colors = HashMap::new();

        for category in Category::ALL {
            let rgba = match category {
                Category::Critical | Category::Warning => [220, 38, 38, 255],
                Category::Missable => [234, 179, 8, 255],
                Category::Gear => [59, 130, 246, 255],
                Category::Exploration => [20, 184, 166, 255],
                Category::Contract => [168, 85, 247, 255],
                Category::Save => [34, 197, 94, 255],
                Category::Achievement => [245, 158, 11, 255],
                Category::Decision => [236, 72, 153, 255],
                Category::Quest | Category::Task => [156, 163, 175, 255],
            };
            category_colors.insert(category.key().into(), rgba);
        }

        Self {
            ui_scale: 1.0,
            category_colors,
        }
    }
}

impl UiSettings {
    pub fn color(&self, category: Category) -> Color32 {
        self.category_colors
            .get(category.key())
            .map(|c| Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3]))
            .unwrap_or(Color32::GRAY)
    }

    pub fn set_color(&mut self, category: Category, color: Color32) {
        self.category_colors.insert(
            category.key().to_string(),
            [color.r(), color.g(), color.b(), color.a()],
        );
    }
}
