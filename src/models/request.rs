use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::item::DocumentItem;

/// Every document the engine can produce, one per endpoint payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    BudgetDeck,
    ScheduleDeck,
    ShoppingList,
    BudgetWorkbook,
    Proposal,
    ScheduleDocument,
    ProposalDocument,
    TechnicalSheet,
}

/// Renderer family a kind is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererFamily {
    Slides,
    Spreadsheet,
    FixedPage,
    Flowing,
}

impl DocumentKind {
    pub fn family(self) -> RendererFamily {
        match self {
            DocumentKind::BudgetDeck | DocumentKind::ScheduleDeck => RendererFamily::Slides,
            DocumentKind::ShoppingList | DocumentKind::BudgetWorkbook => RendererFamily::Spreadsheet,
            DocumentKind::Proposal | DocumentKind::ScheduleDocument => RendererFamily::FixedPage,
            DocumentKind::ProposalDocument | DocumentKind::TechnicalSheet => RendererFamily::Flowing,
        }
    }

    /// Stem of the generated filename, combined with the client slug.
    pub fn filename_stem(self) -> &'static str {
        match self {
            DocumentKind::BudgetDeck => "budget-presentation",
            DocumentKind::ScheduleDeck => "delivery-schedule",
            DocumentKind::ShoppingList => "shopping-list",
            DocumentKind::BudgetWorkbook => "budget",
            DocumentKind::Proposal => "proposal",
            DocumentKind::ScheduleDocument => "delivery-schedule",
            DocumentKind::ProposalDocument => "proposal",
            DocumentKind::TechnicalSheet => "technical-sheet",
        }
    }

    pub fn extension(self) -> &'static str {
        match self.family() {
            RendererFamily::Slides => "pptx",
            RendererFamily::Spreadsheet => "xlsx",
            RendererFamily::FixedPage => "pdf",
            RendererFamily::Flowing => "docx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self.family() {
            RendererFamily::Slides => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            RendererFamily::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            RendererFamily::FixedPage => "application/pdf",
            RendererFamily::Flowing => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

/// Format-specific toggles. All optional in the payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFlags {
    #[serde(default)]
    pub group_by_room: bool,
    #[serde(default = "default_true")]
    pub include_suppliers: bool,
    #[serde(default = "default_true")]
    pub include_prices: bool,
    #[serde(default = "default_true")]
    pub include_formulas: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RenderFlags {
    fn default() -> Self {
        RenderFlags {
            group_by_room: false,
            include_suppliers: true,
            include_prices: true,
            include_formulas: true,
        }
    }
}

/// Named image sections carried by slide-deck requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Cover,
    Moodboard,
    FloorPlan,
    Renders,
}

impl SectionKind {
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Cover => "Cover",
            SectionKind::Moodboard => "Moodboard",
            SectionKind::FloorPlan => "Floor Plan",
            SectionKind::Renders => "Renders",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSection {
    pub kind: SectionKind,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Studio engagement tiers driving the delivery-schedule rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Advisory,
    Express,
    FullProject,
    Turnkey,
}

impl ServiceType {
    pub fn label(self) -> &'static str {
        match self {
            ServiceType::Advisory => "Advisory",
            ServiceType::Express => "Express",
            ServiceType::FullProject => "Full Project",
            ServiceType::Turnkey => "Turnkey",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    InPerson,
    Remote,
}

/// Inputs for delivery-schedule documents. Milestone dates are derived from
/// these, never taken from the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInput {
    pub service: ServiceType,
    pub start_date: NaiveDate,
    pub modality: Modality,
    #[serde(default = "default_room_count")]
    pub room_count: u32,
}

fn default_room_count() -> u32 {
    1
}

/// Top-level generation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    pub kind: DocumentKind,
    pub client_name: String,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub flags: RenderFlags,
    #[serde(default)]
    pub items: Vec<DocumentItem>,
    #[serde(default)]
    pub sections: Vec<ImageSection>,
    #[serde(default)]
    pub schedule: Option<ScheduleInput>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl DocumentRequest {
    /// Structural checks applied before any work is scheduled.
    pub fn validate(&self) -> Result<(), String> {
        if self.client_name.trim().is_empty() {
            return Err("client name must not be empty".into());
        }

        let mut seen = std::collections::HashSet::new();
        for item in &self.items {
            let fields = item.fields();
            if fields.position == 0 {
                return Err(format!("item '{}' has position 0, positions start at 1", fields.name));
            }
            if !seen.insert(fields.position) {
                return Err(format!("duplicate item position {}", fields.position));
            }
            if fields.name.trim().is_empty() {
                return Err(format!("item at position {} has an empty name", fields.position));
            }
            if let Some(q) = fields.quantity {
                if !q.is_finite() || q < 0.0 {
                    return Err(format!(
                        "item '{}' has invalid quantity {q}, must be a non-negative number",
                        fields.name
                    ));
                }
            }
            if let Some(p) = fields.unit_price {
                if !p.is_finite() || p < 0.0 {
                    return Err(format!(
                        "item '{}' has invalid unit price {p}, must be a non-negative number",
                        fields.name
                    ));
                }
            }
        }

        if matches!(self.kind, DocumentKind::ScheduleDeck | DocumentKind::ScheduleDocument)
            && self.schedule.is_none()
        {
            return Err("delivery-schedule documents require a schedule block".into());
        }

        Ok(())
    }

    pub fn project_title(&self) -> &str {
        match self.project_name.as_deref() {
            Some(p) if !p.trim().is_empty() => p,
            _ => "Interior Project",
        }
    }
}
