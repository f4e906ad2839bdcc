use serde::{Deserialize, Serialize};

/// Fallback accent used for any group without an explicit color mapping
/// (rooms, the `Other` category).
pub const NEUTRAL_ACCENT: u32 = 0x8A8A8A;

/// Closed set of item categories. Grouping, color coding and the fixed
/// display order for detail views all key off this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Furniture,
    Lighting,
    Decor,
    Textiles,
    Artwork,
    Appliances,
    Fixtures,
    Finishes,
    Services,
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Furniture,
        Category::Lighting,
        Category::Decor,
        Category::Textiles,
        Category::Artwork,
        Category::Appliances,
        Category::Fixtures,
        Category::Finishes,
        Category::Services,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Furniture => "Furniture",
            Category::Lighting => "Lighting",
            Category::Decor => "Decor",
            Category::Textiles => "Textiles",
            Category::Artwork => "Artwork",
            Category::Appliances => "Appliances",
            Category::Fixtures => "Fixtures",
            Category::Finishes => "Finishes",
            Category::Services => "Services",
            Category::Other => "Other",
        }
    }

    /// Accent color as 0xRRGGBB. `Other` carries no explicit mapping and
    /// resolves to the neutral fallback.
    pub fn accent_color(self) -> u32 {
        match self {
            Category::Furniture => 0xB0865A,
            Category::Lighting => 0xE3B448,
            Category::Decor => 0x7FA88F,
            Category::Textiles => 0xA56E7F,
            Category::Artwork => 0x5E7B9B,
            Category::Appliances => 0x6F7D8C,
            Category::Fixtures => 0x53828B,
            Category::Finishes => 0x9A8F79,
            Category::Services => 0x8064A2,
            Category::Other => NEUTRAL_ACCENT,
        }
    }

    /// Rank in the fixed display-order table used by technical/detail views.
    pub fn display_rank(self) -> usize {
        match self {
            Category::Furniture => 0,
            Category::Lighting => 1,
            Category::Textiles => 2,
            Category::Decor => 3,
            Category::Artwork => 4,
            Category::Appliances => 5,
            Category::Fixtures => 6,
            Category::Finishes => 7,
            Category::Services => 8,
            Category::Other => 9,
        }
    }
}
