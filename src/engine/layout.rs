/// Capacity model for one page or slide. Grid capacity is derived from the
/// drawable height, list capacity is a fixed row budget.
#[derive(Debug, Clone, Copy)]
pub enum Capacity {
    Grid { columns: usize, usable_height: f32, card_height: f32 },
    Rows { per_page: usize },
}

impl Capacity {
    pub fn grid(columns: usize, usable_height: f32, card_height: f32) -> Self {
        Capacity::Grid { columns, usable_height, card_height }
    }

    pub fn rows(per_page: usize) -> Self {
        Capacity::Rows { per_page }
    }

    /// Items that fit on one page, never less than 1 so planning always
    /// makes progress.
    pub fn per_page(&self) -> usize {
        match *self {
            Capacity::Grid { columns, usable_height, card_height } => {
                let rows = if card_height > 0.0 {
                    (usable_height / card_height).floor() as usize
                } else {
                    0
                };
                (columns * rows).max(1)
            }
            Capacity::Rows { per_page } => per_page.max(1),
        }
    }
}

/// Pages in original order plus the count of items dropped by an explicit
/// truncation cap. `omitted` is zero unless the caller opted into a cap.
#[derive(Debug)]
pub struct Paginated<'a, T> {
    pub pages: Vec<&'a [T]>,
    pub omitted: usize,
}

impl<'a, T> Paginated<'a, T> {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn shown(&self) -> usize {
        self.pages.iter().map(|p| p.len()).sum()
    }
}

/// Splits an ordered sequence into pages of at most `capacity.per_page()`
/// items, preserving order. Called once per group, so group boundaries
/// always start a fresh page.
pub fn paginate<'a, T>(items: &'a [T], capacity: &Capacity) -> Paginated<'a, T> {
    paginate_capped(items, capacity, None)
}

/// Same as [`paginate`] but with an optional total cap. Items past the cap
/// are counted in `omitted` so renderers can show a "+N more" indicator
/// instead of paginating indefinitely.
pub fn paginate_capped<'a, T>(
    items: &'a [T],
    capacity: &Capacity,
    max_items: Option<usize>,
) -> Paginated<'a, T> {
    let shown = match max_items {
        Some(cap) => items.len().min(cap),
        None => items.len(),
    };
    let omitted = items.len() - shown;
    let pages = items[..shown].chunks(capacity.per_page()).collect();
    Paginated { pages, omitted }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_six_items_at_fifteen_rows_make_two_pages() {
        let items: Vec<u32> = (1..=26).collect();
        let paged = paginate(&items, &Capacity::rows(15));
        assert_eq!(paged.page_count(), 2);
        assert_eq!(paged.pages[0].len(), 15);
        assert_eq!(paged.pages[1].len(), 11);
        assert_eq!(paged.omitted, 0);
    }

    #[test]
    fn concatenated_pages_reproduce_the_input_order() {
        let items: Vec<u32> = (1..=53).collect();
        let paged = paginate(&items, &Capacity::rows(12));
        let rebuilt: Vec<u32> = paged.pages.iter().flat_map(|p| p.iter().copied()).collect();
        assert_eq!(rebuilt, items);
        assert_eq!(paged.shown(), items.len());
    }

    #[test]
    fn exact_multiples_produce_full_pages_only() {
        let items: Vec<u32> = (1..=30).collect();
        let paged = paginate(&items, &Capacity::rows(15));
        assert_eq!(paged.page_count(), 2);
        assert!(paged.pages.iter().all(|p| p.len() == 15));
    }

    #[test]
    fn empty_input_yields_no_pages() {
        let items: Vec<u32> = Vec::new();
        let paged = paginate(&items, &Capacity::rows(15));
        assert_eq!(paged.page_count(), 0);
        assert_eq!(paged.shown(), 0);
    }

    #[test]
    fn grid_capacity_multiplies_columns_by_fitting_rows() {
        // 190.5mm drawable, 60mm cards, 2 columns: 3 rows fit, 6 cards.
        let capacity = Capacity::grid(2, 190.5, 60.0);
        assert_eq!(capacity.per_page(), 6);

        let items: Vec<u32> = (1..=13).collect();
        let paged = paginate(&items, &capacity);
        assert_eq!(paged.page_count(), 3);
        assert_eq!(paged.pages[2].len(), 1);
    }

    #[test]
    fn oversized_cards_still_advance_one_item_per_page() {
        let capacity = Capacity::grid(2, 100.0, 400.0);
        assert_eq!(capacity.per_page(), 1);
    }

    #[test]
    fn truncation_cap_records_omitted_count() {
        let items: Vec<u32> = (1..=40).collect();
        let paged = paginate_capped(&items, &Capacity::rows(15), Some(20));
        assert_eq!(paged.shown(), 20);
        assert_eq!(paged.omitted, 20);
        assert_eq!(paged.page_count(), 2);
        assert_eq!(paged.pages[1].len(), 5);
    }

    #[test]
    fn cap_larger_than_input_omits_nothing() {
        let items: Vec<u32> = (1..=8).collect();
        let paged = paginate_capped(&items, &Capacity::rows(15), Some(100));
        assert_eq!(paged.omitted, 0);
        assert_eq!(paged.shown(), 8);
    }
}
