//! The four per-format renderers. Each consumes an aggregated and paginated
//! view of one [`DocumentRequest`](crate::models::DocumentRequest) plus the
//! images resolved for it, and produces a complete byte buffer. Renderers are
//! synchronous; the orchestrator runs them on a blocking thread.

pub mod pdf;
pub mod slides;
pub mod spreadsheet;
pub mod word;

use crate::engine::aggregate::{aggregate, GroupBy, GroupOrder};
use crate::models::{CategoryGroup, DocumentRequest};

/// Grouping key for a request: room when the caller asked for it, category
/// otherwise. Shared by every renderer so the four outputs group identically.
pub(crate) fn group_request_items(
    request: &DocumentRequest,
    order: GroupOrder,
) -> Vec<CategoryGroup> {
    let group_by = if request.flags.group_by_room { GroupBy::Room } else { GroupBy::Category };
    aggregate(&request.items, group_by, order)
}

/// Standard engagement terms printed on both proposal formats.
pub(crate) const PROPOSAL_TERMS: &[&str] = &[
    "This proposal is valid for 30 days from the date above.",
    "Work begins upon signed acceptance and receipt of the initial deposit.",
    "Item prices are supplier quotes and may change until orders are placed.",
    "Lead times vary by supplier and are confirmed at ordering.",
    "Taxes, shipping and installation are billed separately unless itemized.",
];

/// Quantities print without a fraction when whole.
pub(crate) fn quantity_text(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{quantity:.0}")
    } else {
        format!("{quantity:.2}")
    }
}

/// Scales (width, height) to fit inside a bounding box, preserving aspect.
pub(crate) fn fit_box(aspect: f64, max_w: f64, max_h: f64) -> (f64, f64) {
    if aspect <= 0.0 {
        return (max_w, max_h);
    }
    if max_w / max_h > aspect {
        (max_h * aspect, max_h)
    } else {
        (max_w, max_w / aspect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_box_constrains_the_long_side() {
        // Wide image in a square box: width pinned.
        let (w, h) = fit_box(2.0, 100.0, 100.0);
        assert!((w - 100.0).abs() < 1e-9);
        assert!((h - 50.0).abs() < 1e-9);

        // Tall image: height pinned.
        let (w, h) = fit_box(0.5, 100.0, 100.0);
        assert!((w - 50.0).abs() < 1e-9);
        assert!((h - 100.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_aspect_falls_back_to_the_box() {
        assert_eq!(fit_box(0.0, 80.0, 40.0), (80.0, 40.0));
    }

    #[test]
    fn quantity_text_drops_whole_number_decimals() {
        assert_eq!(quantity_text(2.0), "2");
        assert_eq!(quantity_text(2.5), "2.50");
    }
}
