use std::collections::HashMap;

use crate::models::{room_or_unspecified, CategoryGroup, DocumentItem, GroupKey};

/// Grouping key selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Category,
    Room,
}

/// Group ordering. Summary and budget views sort by subtotal, technical and
/// detail views follow the fixed category display-order table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOrder {
    SubtotalDesc,
    DisplayRank,
}

/// Groups items, computes subtotals and percentages, and orders the groups.
///
/// Every item lands in exactly one group. Percentages are taken against the
/// grand total of the items passed in, so a filtered sub-view still sums to
/// 100%. A zero grand total yields 0% everywhere.
pub fn aggregate(items: &[DocumentItem], group_by: GroupBy, order: GroupOrder) -> Vec<CategoryGroup> {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut buckets: Vec<(GroupKey, Vec<DocumentItem>)> = Vec::new();

    for item in items {
        let key = match group_by {
            GroupBy::Category => GroupKey::Category(item.fields().category),
            GroupBy::Room => {
                GroupKey::Room(room_or_unspecified(item.fields().room.as_deref()).to_string())
            }
        };
        match index.get(&key) {
            Some(&slot) => buckets[slot].1.push(item.clone()),
            None => {
                index.insert(key.clone(), buckets.len());
                buckets.push((key, vec![item.clone()]));
            }
        }
    }

    let grand_total: f64 = items.iter().map(DocumentItem::line_total).sum();

    let mut groups: Vec<CategoryGroup> = buckets
        .into_iter()
        .map(|(key, items)| {
            let subtotal: f64 = items.iter().map(DocumentItem::line_total).sum();
            let percentage = if grand_total > 0.0 {
                subtotal / grand_total * 100.0
            } else {
                0.0
            };
            CategoryGroup {
                label: key.label(),
                color: key.accent_color(),
                item_count: items.len(),
                key,
                items,
                subtotal,
                percentage,
            }
        })
        .collect();

    match order {
        // Stable sort keeps first-seen order for equal subtotals.
        GroupOrder::SubtotalDesc => groups.sort_by(|a, b| {
            b.subtotal
                .partial_cmp(&a.subtotal)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
        GroupOrder::DisplayRank => groups.sort_by_key(|g| match &g.key {
            GroupKey::Category(c) => c.display_rank(),
            // Rooms keep arrival order, with the unspecified bucket last.
            GroupKey::Room(name) => {
                if name == "Unspecified" {
                    usize::MAX
                } else {
                    0
                }
            }
        }),
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ItemFields, NEUTRAL_ACCENT};

    fn item(position: u32, category: Category, price: f64, qty: f64, room: Option<&str>) -> DocumentItem {
        DocumentItem::Budget {
            fields: ItemFields {
                position,
                name: format!("Item {position}"),
                category,
                room: room.map(str::to_string),
                unit_price: Some(price),
                quantity: Some(qty),
                supplier: None,
                link: None,
                image_url: None,
            },
            notes: None,
        }
    }

    #[test]
    fn subtotals_conserve_the_grand_total() {
        let items = vec![
            item(1, Category::Furniture, 100.0, 2.0, None),
            item(2, Category::Lighting, 50.0, 1.0, None),
            item(3, Category::Furniture, 10.0, 3.0, None),
            item(4, Category::Decor, 0.0, 5.0, None),
        ];
        let groups = aggregate(&items, GroupBy::Category, GroupOrder::SubtotalDesc);

        let expected: f64 = items.iter().map(DocumentItem::line_total).sum();
        let summed: f64 = groups.iter().map(|g| g.subtotal).sum();
        assert!((summed - expected).abs() < 1e-9);

        let total_items: usize = groups.iter().map(|g| g.item_count).sum();
        assert_eq!(total_items, items.len());
    }

    #[test]
    fn worked_example_splits_eighty_twenty() {
        let items = vec![
            item(1, Category::Furniture, 100.0, 2.0, None),
            item(2, Category::Lighting, 50.0, 1.0, None),
        ];
        let groups = aggregate(&items, GroupBy::Category, GroupOrder::SubtotalDesc);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "Furniture");
        assert!((groups[0].subtotal - 200.0).abs() < 1e-9);
        assert!((groups[0].percentage - 80.0).abs() < 1e-9);
        assert_eq!(groups[1].label, "Lighting");
        assert!((groups[1].subtotal - 50.0).abs() < 1e-9);
        assert!((groups[1].percentage - 20.0).abs() < 1e-9);
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let items = vec![
            item(1, Category::Furniture, 33.0, 1.0, None),
            item(2, Category::Lighting, 17.5, 2.0, None),
            item(3, Category::Artwork, 99.99, 1.0, None),
            item(4, Category::Services, 250.0, 0.5, None),
        ];
        let groups = aggregate(&items, GroupBy::Category, GroupOrder::SubtotalDesc);
        let sum: f64 = groups.iter().map(|g| g.percentage).sum();
        assert!((sum - 100.0).abs() < 0.1, "percentages summed to {sum}");
    }

    #[test]
    fn zero_grand_total_never_divides() {
        let items = vec![
            item(1, Category::Furniture, 0.0, 2.0, None),
            item(2, Category::Lighting, 0.0, 1.0, None),
        ];
        let groups = aggregate(&items, GroupBy::Category, GroupOrder::SubtotalDesc);
        assert!(groups.iter().all(|g| g.percentage == 0.0));
    }

    #[test]
    fn missing_rooms_fall_into_the_unspecified_bucket() {
        let items = vec![
            item(1, Category::Furniture, 10.0, 1.0, Some("Kitchen")),
            item(2, Category::Lighting, 10.0, 1.0, None),
            item(3, Category::Decor, 10.0, 1.0, Some("  ")),
        ];
        let groups = aggregate(&items, GroupBy::Room, GroupOrder::DisplayRank);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "Kitchen");
        assert_eq!(groups[1].label, "Unspecified");
        assert_eq!(groups[1].item_count, 2);
        assert_eq!(groups[1].color, NEUTRAL_ACCENT);
    }

    #[test]
    fn subtotal_ties_keep_first_seen_order() {
        let items = vec![
            item(1, Category::Decor, 25.0, 1.0, None),
            item(2, Category::Lighting, 25.0, 1.0, None),
            item(3, Category::Furniture, 25.0, 1.0, None),
        ];
        let groups = aggregate(&items, GroupBy::Category, GroupOrder::SubtotalDesc);
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, ["Decor", "Lighting", "Furniture"]);
    }

    #[test]
    fn display_rank_orders_detail_views() {
        let items = vec![
            item(1, Category::Services, 10.0, 1.0, None),
            item(2, Category::Furniture, 10.0, 1.0, None),
            item(3, Category::Textiles, 10.0, 1.0, None),
        ];
        let groups = aggregate(&items, GroupBy::Category, GroupOrder::DisplayRank);
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, ["Furniture", "Textiles", "Services"]);
    }

    #[test]
    fn filtered_subsets_still_sum_to_one_hundred() {
        let items = vec![
            item(1, Category::Furniture, 100.0, 1.0, Some("Kitchen")),
            item(2, Category::Lighting, 60.0, 1.0, Some("Kitchen")),
        ];
        // Caller pre-filters to one room, percentages stay relative to it.
        let filtered: Vec<DocumentItem> = items
            .iter()
            .filter(|i| i.fields().room.as_deref() == Some("Kitchen"))
            .cloned()
            .collect();
        let groups = aggregate(&filtered, GroupBy::Category, GroupOrder::SubtotalDesc);
        let sum: f64 = groups.iter().map(|g| g.percentage).sum();
        assert!((sum - 100.0).abs() < 0.1);
    }
}
