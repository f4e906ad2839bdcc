use serde::{Deserialize, Serialize};

use super::category::Category;

/// Fields shared by the three item variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFields {
    /// Sequence number, positive and unique within one request.
    pub position: u32,
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ItemFields {
    /// Derived, never persisted. Recomputed wherever a total is needed so
    /// price edits cannot drift from cached sums.
    pub fn line_total(&self) -> f64 {
        price_or_zero(self.unit_price) * quantity_or_one(self.quantity)
    }
}

/// Line item as submitted in a generation request, tagged by family.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentItem {
    Budget {
        #[serde(flatten)]
        fields: ItemFields,
        #[serde(default)]
        notes: Option<String>,
    },
    Shopping {
        #[serde(flatten)]
        fields: ItemFields,
        #[serde(default, rename = "drawingUrl")]
        drawing_url: Option<String>,
    },
    Technical {
        #[serde(flatten)]
        fields: ItemFields,
        #[serde(default)]
        dimensions: Option<String>,
        #[serde(default)]
        material: Option<String>,
        #[serde(default)]
        finish: Option<String>,
        #[serde(default)]
        notes: Option<String>,
    },
}

impl DocumentItem {
    pub fn fields(&self) -> &ItemFields {
        match self {
            DocumentItem::Budget { fields, .. } => fields,
            DocumentItem::Shopping { fields, .. } => fields,
            DocumentItem::Technical { fields, .. } => fields,
        }
    }

    pub fn notes(&self) -> Option<&str> {
        match self {
            DocumentItem::Budget { notes, .. } => notes.as_deref(),
            DocumentItem::Technical { notes, .. } => notes.as_deref(),
            DocumentItem::Shopping { .. } => None,
        }
    }

    pub fn drawing_url(&self) -> Option<&str> {
        match self {
            DocumentItem::Shopping { drawing_url, .. } => drawing_url.as_deref(),
            _ => None,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.fields().line_total()
    }
}

// Default policies for optional fields. Every fallback in the engine goes
// through one of these so the behavior is testable in isolation.

pub fn quantity_or_one(quantity: Option<f64>) -> f64 {
    quantity.unwrap_or(1.0)
}

pub fn price_or_zero(price: Option<f64>) -> f64 {
    price.unwrap_or(0.0)
}

pub fn text_or_dash(text: Option<&str>) -> &str {
    match text {
        Some(t) if !t.trim().is_empty() => t,
        _ => "-",
    }
}

pub fn room_or_unspecified(room: Option<&str>) -> &str {
    match room {
        Some(r) if !r.trim().is_empty() => r,
        _ => "Unspecified",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_fields() -> ItemFields {
        ItemFields {
            position: 1,
            name: "Lounge chair".into(),
            category: Category::Furniture,
            room: None,
            unit_price: Some(420.0),
            quantity: Some(2.0),
            supplier: None,
            link: None,
            image_url: None,
        }
    }

    #[test]
    fn line_total_multiplies_price_by_quantity() {
        let fields = base_fields();
        assert!((fields.line_total() - 840.0).abs() < f64::EPSILON);
    }

    #[test]
    fn absent_quantity_defaults_to_one_but_explicit_zero_stays_zero() {
        let mut fields = base_fields();
        fields.quantity = None;
        assert!((fields.line_total() - 420.0).abs() < f64::EPSILON);

        fields.quantity = Some(0.0);
        assert_eq!(fields.line_total(), 0.0);
    }

    #[test]
    fn absent_price_yields_zero_total() {
        let mut fields = base_fields();
        fields.unit_price = None;
        assert_eq!(fields.line_total(), 0.0);
    }

    #[test]
    fn text_defaults_collapse_blank_to_dash() {
        assert_eq!(text_or_dash(None), "-");
        assert_eq!(text_or_dash(Some("")), "-");
        assert_eq!(text_or_dash(Some("   ")), "-");
        assert_eq!(text_or_dash(Some("Oak veneer")), "Oak veneer");
    }

    #[test]
    fn room_default_is_the_unspecified_bucket() {
        assert_eq!(room_or_unspecified(None), "Unspecified");
        assert_eq!(room_or_unspecified(Some(" ")), "Unspecified");
        assert_eq!(room_or_unspecified(Some("Kitchen")), "Kitchen");
    }

    #[test]
    fn tagged_payload_deserializes_by_type() {
        let json = r#"{
            "type": "shopping",
            "position": 3,
            "name": "Pendant lamp",
            "category": "lighting",
            "unitPrice": 129.5,
            "quantity": 3,
            "drawingUrl": "https://cdn.example.com/drawings/lamp.png"
        }"#;
        let item: DocumentItem = serde_json::from_str(json).unwrap();
        match &item {
            DocumentItem::Shopping { fields, drawing_url } => {
                assert_eq!(fields.position, 3);
                assert_eq!(fields.category, Category::Lighting);
                assert_eq!(drawing_url.as_deref(), Some("https://cdn.example.com/drawings/lamp.png"));
            }
            other => panic!("expected shopping item, got {other:?}"),
        }
        assert!((item.line_total() - 388.5).abs() < 1e-9);
    }

    #[test]
    fn unknown_type_tag_is_rejected() {
        let json = r#"{"type": "invoice", "position": 1, "name": "x", "category": "other"}"#;
        assert!(serde_json::from_str::<DocumentItem>(json).is_err());
    }
}
