//! Slide renderer for the budget and schedule decks.
//!
//! Decks are 16:9 and composed of absolutely positioned shapes on the blank
//! layout. The budget deck runs cover, image sections, per-group item cards,
//! summary and closing; the schedule deck runs cover plus paginated
//! milestone pages with a duration footer.

use crate::core::fmt::{long_date, money, percentage, short_date};
use crate::core::{EngineError, EngineResult};
use crate::engine::images::{ImageSet, ResolvedImage};
use crate::engine::layout::{paginate, paginate_capped, Capacity};
use crate::engine::{derive_timeline, GroupOrder, TimelineRules};
use crate::models::{
    price_or_zero, quantity_or_one, room_or_unspecified, CategoryGroup, DocumentItem,
    DocumentKind, DocumentRequest, RenderFlags, SectionKind,
};
use crate::pptx::{inches, Align, Package, SlideBuilder, TextLine, SLIDE_HEIGHT};

use super::{fit_box, group_request_items, quantity_text};

const INK: u32 = 0x2E2A26;
const MUTED: u32 = 0x8C8478;
const PAPER: u32 = 0xEFECE6;
const HAIRLINE: u32 = 0xD9D4CC;
const ACCENT: u32 = 0xB0865A;
const WHITE: u32 = 0xFFFFFF;

/// Slide geometry in inches. The body band sits under the header rule and
/// above the footer strip.
const SLIDE_W_IN: f64 = 13.333;
const MARGIN_X: f64 = 0.67;
const USABLE_W: f64 = SLIDE_W_IN - 2.0 * MARGIN_X;
const BODY_TOP: f64 = 1.3;
const BODY_HEIGHT: f64 = 5.6;
const FOOTER_Y: f64 = 6.85;

/// Card cells. Two columns when photos are present, three for text cards.
const GRID_CELL_H: f64 = 2.7;
const IMAGE_CARD_H: f64 = 2.7;
const TEXT_CARD_H: f64 = 1.75;
const GROUP_CARD_CAP: usize = 24;
const SUMMARY_ROWS: usize = 10;
const MILESTONES_PER_SLIDE: usize = 6;
const MILESTONE_ROW_H: f64 = 0.82;

/// Gallery sections in presentation order. Cover images are consumed by the
/// cover slide instead.
const GALLERY_SECTIONS: [SectionKind; 3] =
    [SectionKind::Moodboard, SectionKind::FloorPlan, SectionKind::Renders];

pub fn render(request: &DocumentRequest, images: &ImageSet) -> EngineResult<Vec<u8>> {
    match request.kind {
        DocumentKind::ScheduleDeck => render_schedule_deck(request, images),
        _ => render_budget_deck(request, images),
    }
}

fn render_budget_deck(request: &DocumentRequest, images: &ImageSet) -> EngineResult<Vec<u8>> {
    let flags = &request.flags;
    let groups = group_request_items(request, GroupOrder::SubtotalDesc);
    let grand_total: f64 = groups.iter().map(|g| g.subtotal).sum();

    let mut deck = Package::new(format!("Budget Presentation - {}", request.client_name));

    let date_line = long_date(chrono::Local::now().date_naive());
    let cover = cover_slide(&mut deck, request, images, "BUDGET PRESENTATION", &date_line);
    deck.push_slide(cover);

    for kind in GALLERY_SECTIONS {
        let resolved = images.section(kind);
        if resolved.is_empty() {
            continue;
        }
        deck.push_slide(section_intro(kind, resolved.len()));
        let capacity = Capacity::grid(2, BODY_HEIGHT as f32, GRID_CELL_H as f32);
        for page in paginate(resolved, &capacity).pages {
            let slide = image_grid_slide(&mut deck, kind, page);
            deck.push_slide(slide);
        }
    }

    for group in &groups {
        push_group_slides(&mut deck, group, flags, images);
    }

    if !groups.is_empty() {
        push_summary_slides(&mut deck, &groups, grand_total, flags);
    }

    deck.push_slide(closing_slide(request));
    deck.save_to_buffer()
}

fn render_schedule_deck(request: &DocumentRequest, images: &ImageSet) -> EngineResult<Vec<u8>> {
    let schedule = request.schedule.as_ref().ok_or_else(|| {
        EngineError::InvalidInput("delivery-schedule decks require a schedule block".into())
    })?;
    let timeline = derive_timeline(TimelineRules::current(), schedule);

    let mut deck = Package::new(format!("Delivery Schedule - {}", request.client_name));

    let info_line = format!(
        "{} \u{2022} starts {}",
        timeline.service.label(),
        long_date(schedule.start_date)
    );
    let cover = cover_slide(&mut deck, request, images, "DELIVERY SCHEDULE", &info_line);
    deck.push_slide(cover);

    let footer = format!(
        "Total duration: {} days \u{2022} Expected meetings: {}",
        timeline.total_days, timeline.expected_meetings
    );
    for page in paginate(&timeline.milestones, &Capacity::rows(MILESTONES_PER_SLIDE)).pages {
        let mut slide = SlideBuilder::new();
        slide_title(&mut slide, "Project Timeline");

        let mut y = BODY_TOP + 0.1;
        for milestone in page {
            // Key meetings get the accent marker, the rest stay neutral.
            let marker = if milestone.key_event { ACCENT } else { HAIRLINE };
            slide.rect(inches(MARGIN_X + 0.05), inches(y + 0.08), inches(0.14), inches(0.14), marker);
            slide.text_box(
                inches(MARGIN_X + 0.35),
                inches(y),
                inches(1.5),
                inches(0.3),
                &[TextLine::new(short_date(milestone.date), 12, INK).bold()],
            );
            slide.text_box(
                inches(MARGIN_X + 2.0),
                inches(y),
                inches(USABLE_W - 2.0),
                inches(0.3),
                &[TextLine::new(milestone.title, 13, INK).bold()],
            );
            slide.text_box(
                inches(MARGIN_X + 2.0),
                inches(y + 0.32),
                inches(USABLE_W - 2.0),
                inches(0.35),
                &[TextLine::new(milestone.description, 11, MUTED)],
            );
            y += MILESTONE_ROW_H;
        }

        slide.text_box(
            inches(MARGIN_X),
            inches(FOOTER_Y),
            inches(USABLE_W),
            inches(0.4),
            &[TextLine::new(footer.clone(), 11, MUTED)],
        );
        deck.push_slide(slide);
    }

    deck.save_to_buffer()
}

/// Cover: accent band, logo or monogram, kicker, title, client and info
/// lines. The first resolved cover-section image becomes a hero on the
/// right half.
fn cover_slide(
    deck: &mut Package,
    request: &DocumentRequest,
    images: &ImageSet,
    kicker: &str,
    info_line: &str,
) -> SlideBuilder {
    let mut slide = SlideBuilder::new();
    slide.rect(0, 0, inches(0.3), SLIDE_HEIGHT, ACCENT);

    let hero = images.section(SectionKind::Cover).first();
    let title_width = if hero.is_some() { 6.2 } else { 11.3 };

    if let Some(logo) = &images.logo {
        let (w, h) = fit_box(logo.aspect(), 3.0, 1.1);
        let media = deck.add_png(logo.png.clone());
        slide.picture(media, inches(0.9), inches(0.7), inches(w), inches(h));
    } else {
        slide.rect(inches(0.9), inches(0.7), inches(1.1), inches(1.1), ACCENT);
        slide.text_box(
            inches(0.9),
            inches(0.95),
            inches(1.1),
            inches(0.7),
            &[TextLine::new(monogram(&request.client_name), 40, WHITE).bold().align(Align::Center)],
        );
    }

    if let Some(hero) = hero {
        let (w, h) = fit_box(hero.aspect(), 5.2, 4.6);
        let media = deck.add_png(hero.png.clone());
        let x = SLIDE_W_IN - 0.73 - w;
        let y = 1.3 + (4.6 - h) / 2.0;
        slide.picture(media, inches(x), inches(y), inches(w), inches(h));
    }

    slide.text_box(
        inches(0.9),
        inches(2.75),
        inches(title_width),
        inches(0.35),
        &[TextLine::new(kicker, 13, ACCENT).bold()],
    );
    slide.text_box(
        inches(0.9),
        inches(3.15),
        inches(title_width),
        inches(1.55),
        &[TextLine::new(request.project_title(), 36, INK).bold()],
    );
    slide.text_box(
        inches(0.9),
        inches(4.8),
        inches(title_width),
        inches(0.5),
        &[TextLine::new(format!("Prepared for {}", request.client_name), 18, MUTED)],
    );
    slide.text_box(
        inches(0.9),
        inches(5.4),
        inches(title_width),
        inches(0.4),
        &[TextLine::new(info_line, 13, MUTED)],
    );
    slide
}

/// First letter of the client name, for covers without a logo.
fn monogram(name: &str) -> String {
    name.trim()
        .chars()
        .find(|c| c.is_alphanumeric())
        .map(|c| c.to_uppercase().collect::<String>())
        .unwrap_or_else(|| "S".to_string())
}

fn slide_title(slide: &mut SlideBuilder, text: &str) {
    slide.text_box(
        inches(MARGIN_X),
        inches(0.45),
        inches(USABLE_W),
        inches(0.5),
        &[TextLine::new(text, 20, INK).bold()],
    );
    slide.rect(inches(MARGIN_X), inches(1.05), inches(USABLE_W), inches(0.02), HAIRLINE);
}

fn section_intro(kind: SectionKind, image_count: usize) -> SlideBuilder {
    let mut slide = SlideBuilder::new();
    slide.text_box(
        inches(MARGIN_X),
        inches(2.8),
        inches(USABLE_W),
        inches(0.8),
        &[TextLine::new(kind.title(), 32, INK).bold()],
    );
    slide.rect(inches(MARGIN_X), inches(3.7), inches(0.7), inches(0.06), ACCENT);
    let noun = if image_count == 1 { "image" } else { "images" };
    slide.text_box(
        inches(MARGIN_X),
        inches(3.95),
        inches(USABLE_W),
        inches(0.45),
        &[TextLine::new(format!("{image_count} {noun}"), 14, MUTED)],
    );
    slide
}

fn image_grid_slide(deck: &mut Package, kind: SectionKind, page: &[ResolvedImage]) -> SlideBuilder {
    let mut slide = SlideBuilder::new();
    slide_title(&mut slide, kind.title());

    let cell_w = USABLE_W / 2.0;
    for (i, image) in page.iter().enumerate() {
        let cell_x = MARGIN_X + (i % 2) as f64 * cell_w;
        let cell_y = BODY_TOP + (i / 2) as f64 * GRID_CELL_H;
        let (w, h) = fit_box(image.aspect(), cell_w - 0.3, GRID_CELL_H - 0.25);
        let media = deck.add_png(image.png.clone());
        slide.picture(
            media,
            inches(cell_x + (cell_w - w) / 2.0),
            inches(cell_y + (GRID_CELL_H - 0.25 - h) / 2.0),
            inches(w),
            inches(h),
        );
    }
    slide
}

/// Card pages for one group. Groups with at least one resolved photo use the
/// two-column image cards; text-only groups pack three columns. The per-group
/// cap keeps runaway groups from flooding the deck.
fn push_group_slides(
    deck: &mut Package,
    group: &CategoryGroup,
    flags: &RenderFlags,
    images: &ImageSet,
) {
    let with_images =
        group.items.iter().any(|item| images.for_item(item.fields().position).is_some());
    let (columns, card_h) = if with_images { (2, IMAGE_CARD_H) } else { (3, TEXT_CARD_H) };
    let capacity = Capacity::grid(columns, BODY_HEIGHT as f32, card_h as f32);
    let paged = paginate_capped(&group.items, &capacity, Some(GROUP_CARD_CAP));

    let page_count = paged.pages.len();
    for (page_index, page) in paged.pages.iter().enumerate() {
        let mut slide = SlideBuilder::new();
        group_header(&mut slide, group, flags.include_prices);

        let cell_w = USABLE_W / columns as f64;
        for (i, item) in page.iter().enumerate() {
            let x = MARGIN_X + (i % columns) as f64 * cell_w;
            let y = BODY_TOP + (i / columns) as f64 * card_h;
            if with_images {
                image_card(deck, &mut slide, item, flags, images, x, y, cell_w);
            } else {
                text_card(&mut slide, item, flags, group.color, x, y, cell_w);
            }
        }

        if page_index + 1 == page_count && paged.omitted > 0 {
            slide.text_box(
                inches(MARGIN_X),
                inches(FOOTER_Y),
                inches(USABLE_W),
                inches(0.4),
                &[TextLine::new(format!("+{} more", paged.omitted), 12, MUTED)
                    .align(Align::Right)],
            );
        }
        deck.push_slide(slide);
    }
}

fn group_header(slide: &mut SlideBuilder, group: &CategoryGroup, include_prices: bool) {
    slide.rect(inches(MARGIN_X), inches(0.52), inches(0.16), inches(0.34), group.color);
    let title = if include_prices {
        format!("{}  ({})", group.label, money(group.subtotal))
    } else {
        group.label.clone()
    };
    slide.text_box(
        inches(MARGIN_X + 0.3),
        inches(0.45),
        inches(USABLE_W - 0.3),
        inches(0.5),
        &[TextLine::new(title, 20, INK).bold()],
    );
    slide.rect(inches(MARGIN_X), inches(1.05), inches(USABLE_W), inches(0.02), HAIRLINE);
}

fn image_card(
    deck: &mut Package,
    slide: &mut SlideBuilder,
    item: &DocumentItem,
    flags: &RenderFlags,
    images: &ImageSet,
    x: f64,
    y: f64,
    w: f64,
) {
    let photo_h = 1.55;
    match images.for_item(item.fields().position) {
        Some(photo) => {
            let (iw, ih) = fit_box(photo.aspect(), w - 0.35, photo_h);
            let media = deck.add_png(photo.png.clone());
            slide.picture(
                media,
                inches(x + (w - iw) / 2.0),
                inches(y + (photo_h - ih) / 2.0),
                inches(iw),
                inches(ih),
            );
        }
        // Unresolved photos in a photo group keep the cell rhythm.
        None => slide.rect(inches(x + 0.17), inches(y), inches(w - 0.35), inches(photo_h), PAPER),
    }
    slide.text_box(
        inches(x + 0.17),
        inches(y + photo_h + 0.08),
        inches(w - 0.35),
        inches(IMAGE_CARD_H - photo_h - 0.15),
        &card_lines(item, flags),
    );
}

fn text_card(
    slide: &mut SlideBuilder,
    item: &DocumentItem,
    flags: &RenderFlags,
    accent: u32,
    x: f64,
    y: f64,
    w: f64,
) {
    slide.rect(inches(x), inches(y + 0.05), inches(0.05), inches(TEXT_CARD_H - 0.2), accent);
    slide.text_box(
        inches(x + 0.2),
        inches(y + 0.05),
        inches(w - 0.4),
        inches(TEXT_CARD_H - 0.15),
        &card_lines(item, flags),
    );
}

fn card_lines(item: &DocumentItem, flags: &RenderFlags) -> Vec<TextLine> {
    let fields = item.fields();
    let mut lines = vec![TextLine::new(fields.name.as_str(), 12, INK).bold()];

    let mut detail = if flags.group_by_room {
        fields.category.label().to_string()
    } else {
        room_or_unspecified(fields.room.as_deref()).to_string()
    };
    if flags.include_suppliers {
        if let Some(supplier) = fields.supplier.as_deref().filter(|s| !s.trim().is_empty()) {
            detail.push_str(" \u{2022} ");
            detail.push_str(supplier);
        }
    }
    lines.push(TextLine::new(detail, 10, MUTED));

    if flags.include_prices {
        let quantity = quantity_or_one(fields.quantity);
        let price_line = if quantity == 1.0 {
            money(item.line_total())
        } else {
            format!(
                "{} x {} = {}",
                quantity_text(quantity),
                money(price_or_zero(fields.unit_price)),
                money(item.line_total())
            )
        };
        lines.push(TextLine::new(price_line, 11, INK).bold());
    }
    lines
}

fn push_summary_slides(
    deck: &mut Package,
    groups: &[CategoryGroup],
    grand_total: f64,
    flags: &RenderFlags,
) {
    let title = if flags.include_prices { "Investment Summary" } else { "Selection Overview" };
    let cross = if flags.group_by_room { "Room" } else { "Category" };

    let label_x = 1.25;
    let count_x = 5.6;
    let subtotal_x = 7.1;
    let share_x = 9.8;
    let row_h = 0.44;

    let paged = paginate(groups, &Capacity::rows(SUMMARY_ROWS));
    let page_count = paged.pages.len();

    for (page_index, page) in paged.pages.iter().enumerate() {
        let mut slide = SlideBuilder::new();
        slide_title(&mut slide, title);

        let header_y = BODY_TOP + 0.1;
        summary_cell(&mut slide, label_x, 4.2, header_y, TextLine::new(cross, 11, MUTED).bold());
        summary_cell(
            &mut slide,
            count_x,
            1.2,
            header_y,
            TextLine::new("Items", 11, MUTED).bold().align(Align::Right),
        );
        if flags.include_prices {
            summary_cell(
                &mut slide,
                subtotal_x,
                2.4,
                header_y,
                TextLine::new("Subtotal", 11, MUTED).bold().align(Align::Right),
            );
            summary_cell(
                &mut slide,
                share_x,
                1.5,
                header_y,
                TextLine::new("Share", 11, MUTED).bold().align(Align::Right),
            );
        }
        slide.rect(
            inches(MARGIN_X),
            inches(header_y + 0.42),
            inches(USABLE_W),
            inches(0.015),
            HAIRLINE,
        );

        let mut y = header_y + 0.55;
        for group in *page {
            slide.rect(inches(0.87), inches(y + 0.07), inches(0.18), inches(0.18), group.color);
            summary_cell(&mut slide, label_x, 4.2, y, TextLine::new(group.label.clone(), 13, INK));
            summary_cell(
                &mut slide,
                count_x,
                1.2,
                y,
                TextLine::new(group.item_count.to_string(), 13, INK).align(Align::Right),
            );
            if flags.include_prices {
                summary_cell(
                    &mut slide,
                    subtotal_x,
                    2.4,
                    y,
                    TextLine::new(money(group.subtotal), 13, INK).align(Align::Right),
                );
                summary_cell(
                    &mut slide,
                    share_x,
                    1.5,
                    y,
                    TextLine::new(percentage(group.percentage), 12, MUTED).align(Align::Right),
                );
            }
            y += row_h;
        }

        if page_index + 1 == page_count {
            y += 0.08;
            slide.rect(inches(MARGIN_X), inches(y), inches(USABLE_W), inches(0.02), INK);
            y += 0.08;
            summary_cell(&mut slide, label_x, 4.2, y, TextLine::new("Total", 14, INK).bold());
            let item_total: usize = groups.iter().map(|g| g.item_count).sum();
            summary_cell(
                &mut slide,
                count_x,
                1.2,
                y,
                TextLine::new(item_total.to_string(), 14, INK).bold().align(Align::Right),
            );
            if flags.include_prices {
                summary_cell(
                    &mut slide,
                    subtotal_x,
                    2.4,
                    y,
                    TextLine::new(money(grand_total), 14, INK).bold().align(Align::Right),
                );
            }
        }

        deck.push_slide(slide);
    }
}

fn summary_cell(slide: &mut SlideBuilder, x: f64, w: f64, y: f64, line: TextLine) {
    slide.text_box(inches(x), inches(y), inches(w), inches(0.38), &[line]);
}

fn closing_slide(request: &DocumentRequest) -> SlideBuilder {
    let mut slide = SlideBuilder::new();
    slide.rect(0, 0, inches(0.3), SLIDE_HEIGHT, ACCENT);
    slide.text_box(
        inches(0.9),
        inches(3.0),
        inches(11.5),
        inches(0.9),
        &[TextLine::new("Thank you", 36, INK).bold().align(Align::Center)],
    );
    slide.text_box(
        inches(0.9),
        inches(4.05),
        inches(11.5),
        inches(0.5),
        &[TextLine::new(
            format!("{} \u{2022} {}", request.client_name, request.project_title()),
            15,
            MUTED,
        )
        .align(Align::Center)],
    );
    slide
}
