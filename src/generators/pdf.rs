//! Fixed-page renderer for proposals and delivery schedules.
//!
//! Layout runs on an explicit vertical cursor in millimeters from the page
//! bottom. Every block asks for space before drawing; when the answer is no,
//! the composer starts a fresh page and re-emits the running header. Footers
//! are stamped onto every page at save time, once the count is known.

use std::io::{BufWriter, Cursor};

use printpdf::{
    BuiltinFont, Color, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject,
    IndirectFontRef, Line, Mm, PaintMode, PdfDocument, PdfDocumentReference, PdfLayerIndex,
    PdfLayerReference, PdfPageIndex, Point, Polygon, Px, Rgb, WindingOrder,
};

use crate::core::fmt::{long_date, money, percentage, short_date};
use crate::core::{EngineError, EngineResult, PageGeometry};
use crate::engine::images::{ImageSet, ResolvedImage};
use crate::engine::{derive_timeline, GroupOrder, TimelineRules};
use crate::models::{
    price_or_zero, quantity_or_one, DocumentKind, DocumentRequest, Modality, RenderFlags,
};

use super::{fit_box, group_request_items, quantity_text, PROPOSAL_TERMS};

const TITLE_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;
const SMALL_SIZE: f32 = 8.0;

const LINE_HEIGHT: f32 = 5.0;
const CELL_PAD: f32 = 1.5;
const PT_TO_MM: f32 = 0.352_778;

pub fn render(request: &DocumentRequest, images: &ImageSet) -> EngineResult<Vec<u8>> {
    match request.kind {
        DocumentKind::ScheduleDocument => render_schedule(request, images),
        _ => render_proposal(request, images),
    }
}

fn render_proposal(request: &DocumentRequest, images: &ImageSet) -> EngineResult<Vec<u8>> {
    let flags = &request.flags;
    let groups = group_request_items(request, GroupOrder::SubtotalDesc);
    let grand_total: f64 = groups.iter().map(|g| g.subtotal).sum();

    let mut page = PageComposer::new(
        &format!("Proposal - {}", request.client_name),
        format!("{} - {}", request.client_name, request.project_title()),
    )?;

    if let Some(logo) = &images.logo {
        page.logo_top_right(logo, 40.0, 18.0);
    }
    page.title("Interior Design Proposal");
    page.gap(2.0);
    page.label_value("Client", &request.client_name);
    page.label_value("Project", request.project_title());
    page.label_value("Date", &long_date(chrono::Local::now().date_naive()));
    page.gap(4.0);
    page.set_running_header();

    let columns = item_columns(flags, page.usable_width());
    for group in &groups {
        let heading = if flags.include_prices {
            format!("{}  ({})", group.label, money(group.subtotal))
        } else {
            group.label.clone()
        };
        page.heading(&heading);
        let rows: Vec<Vec<String>> = group
            .items
            .iter()
            .map(|item| {
                let fields = item.fields();
                let name = match item.notes() {
                    Some(notes) => format!("{} ({})", fields.name, notes),
                    None => fields.name.clone(),
                };
                let mut row = vec![fields.position.to_string(), name];
                if flags.include_suppliers {
                    row.push(fields.supplier.clone().unwrap_or_else(|| "-".into()));
                }
                row.push(quantity_text(quantity_or_one(fields.quantity)));
                if flags.include_prices {
                    row.push(money(price_or_zero(fields.unit_price)));
                    row.push(money(item.line_total()));
                }
                row
            })
            .collect();
        page.table(&columns, &rows);
        page.gap(4.0);
    }

    if flags.include_prices && !groups.is_empty() {
        page.heading("Investment Summary");
        let summary_columns = investment_columns(page.usable_width(), flags.group_by_room);
        let rows: Vec<Vec<String>> = groups
            .iter()
            .map(|g| {
                vec![
                    g.label.clone(),
                    g.item_count.to_string(),
                    money(g.subtotal),
                    percentage(g.percentage),
                ]
            })
            .collect();
        page.table(&summary_columns, &rows);
        page.gap(2.0);
        page.total_line("Total Investment", &money(grand_total));
        page.gap(4.0);
    }

    if let Some(notes) = request.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        page.heading("Notes");
        page.paragraph(notes);
        page.gap(4.0);
    }

    page.heading("Terms & Conditions");
    for term in PROPOSAL_TERMS {
        page.bullet(term);
    }
    page.gap(6.0);
    page.signature_block();

    page.save()
}

fn render_schedule(request: &DocumentRequest, images: &ImageSet) -> EngineResult<Vec<u8>> {
    let schedule = request.schedule.as_ref().ok_or_else(|| {
        EngineError::InvalidInput("delivery-schedule documents require a schedule block".into())
    })?;
    let timeline = derive_timeline(TimelineRules::current(), schedule);

    let mut page = PageComposer::new(
        &format!("Delivery Schedule - {}", request.client_name),
        format!("{} - {}", request.client_name, request.project_title()),
    )?;

    if let Some(logo) = &images.logo {
        page.logo_top_right(logo, 40.0, 18.0);
    }
    page.title("Delivery Schedule");
    page.gap(2.0);
    page.label_value("Client", &request.client_name);
    page.label_value("Project", request.project_title());
    page.label_value("Service", timeline.service.label());
    let modality = match schedule.modality {
        Modality::InPerson => "In person",
        Modality::Remote => "Remote",
    };
    page.label_value("Modality", modality);
    page.label_value("Start date", &long_date(schedule.start_date));
    page.label_value("Rooms in scope", &schedule.room_count.to_string());
    page.gap(4.0);
    page.set_running_header();

    let usable = page.usable_width();
    let columns = vec![
        TableColumn::new("Date", 26.0),
        TableColumn::new("Milestone", 52.0),
        TableColumn::new("Description", usable - 26.0 - 52.0),
    ];
    let rows: Vec<Vec<String>> = timeline
        .milestones
        .iter()
        .map(|m| {
            // Built-in fonts are WinAnsi only, so the key marker stays ASCII.
            let title = if m.key_event { format!("{} *", m.title) } else { m.title.to_string() };
            vec![short_date(m.date), title, m.description.to_string()]
        })
        .collect();
    page.heading("Milestones");
    page.table(&columns, &rows);
    page.small_note("* Key meeting");
    page.gap(4.0);

    page.label_value("Total duration", &format!("{} days", timeline.total_days));
    page.label_value("Expected meetings", timeline.expected_meetings);
    page.gap(4.0);
    page.paragraph(
        "Dates assume timely client feedback at each key meeting. Delays at a key meeting \
         shift every later milestone by the same amount.",
    );

    page.save()
}

fn item_columns(flags: &RenderFlags, usable: f32) -> Vec<TableColumn> {
    let mut fixed = 10.0 + 14.0;
    if flags.include_suppliers {
        fixed += 32.0;
    }
    if flags.include_prices {
        fixed += 26.0 + 26.0;
    }
    let mut columns = vec![TableColumn::new("#", 10.0), TableColumn::new("Item", usable - fixed)];
    if flags.include_suppliers {
        columns.push(TableColumn::new("Supplier", 32.0));
    }
    columns.push(TableColumn::right("Qty", 14.0));
    if flags.include_prices {
        columns.push(TableColumn::right("Unit Price", 26.0));
        columns.push(TableColumn::right("Line Total", 26.0));
    }
    columns
}

fn investment_columns(usable: f32, group_by_room: bool) -> Vec<TableColumn> {
    let label = if group_by_room { "Room" } else { "Category" };
    vec![
        TableColumn::new(label, usable - 18.0 - 30.0 - 18.0),
        TableColumn::right("Items", 18.0),
        TableColumn::right("Subtotal", 30.0),
        TableColumn::right("Share", 18.0),
    ]
}

#[derive(Debug, Clone)]
struct TableColumn {
    header: &'static str,
    width: f32,
    align_right: bool,
}

impl TableColumn {
    fn new(header: &'static str, width: f32) -> TableColumn {
        TableColumn { header, width, align_right: false }
    }

    fn right(header: &'static str, width: f32) -> TableColumn {
        TableColumn { header, width, align_right: true }
    }
}

struct PageComposer {
    doc: PdfDocumentReference,
    pages: Vec<(PdfPageIndex, PdfLayerIndex)>,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    geometry: PageGeometry,
    /// Millimeters from the page bottom to the next baseline.
    cursor: f32,
    running_header: Option<String>,
    footer_note: String,
}

impl PageComposer {
    fn new(doc_title: &str, footer_note: String) -> EngineResult<PageComposer> {
        let geometry = PageGeometry::default();
        let (doc, page, layer) =
            PdfDocument::new(doc_title, Mm(geometry.width()), Mm(geometry.height()), "Layer 1");
        let layer_ref = doc.get_page(page).get_layer(layer);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| EngineError::Render(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| EngineError::Render(e.to_string()))?;
        Ok(PageComposer {
            doc,
            pages: vec![(page, layer)],
            layer: layer_ref,
            regular,
            bold,
            geometry,
            cursor: geometry.content_top(),
            running_header: None,
            footer_note,
        })
    }

    fn usable_width(&self) -> f32 {
        self.geometry.usable_width()
    }

    fn left(&self) -> f32 {
        self.geometry.margin.left
    }

    fn space_remaining(&self) -> f32 {
        self.cursor - self.geometry.content_bottom()
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.space_remaining() < needed {
            self.page_break();
        }
    }

    /// From this point on, page breaks repeat the client line as a small
    /// header so continuation pages stay attributable.
    fn set_running_header(&mut self) {
        self.running_header = Some(self.footer_note.clone());
    }

    fn page_break(&mut self) {
        let (page, layer) =
            self.doc.add_page(Mm(self.geometry.width()), Mm(self.geometry.height()), "Layer 1");
        self.pages.push((page, layer));
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = self.geometry.content_top();

        if let Some(header) = self.running_header.clone() {
            self.set_text_gray(0.45);
            self.layer.use_text(
                header,
                SMALL_SIZE,
                Mm(self.left()),
                Mm(self.cursor - 3.0),
                &self.regular,
            );
            self.set_text_gray(0.0);
            self.hairline(self.cursor - 5.0, 0.7);
            self.cursor -= 10.0;
        }
    }

    /// Text is painted with the fill color, so this doubles as the text
    /// color setter.
    fn set_text_gray(&self, level: f32) {
        self.layer.set_fill_color(Color::Rgb(Rgb::new(level, level, level, None)));
    }

    fn title(&mut self, text: &str) {
        self.ensure_space(14.0);
        self.cursor -= TITLE_SIZE * PT_TO_MM;
        self.layer.use_text(text, TITLE_SIZE, Mm(self.left()), Mm(self.cursor), &self.bold);
        self.cursor -= 4.0;
    }

    /// Section heading with a rule underneath. Reserves room for a couple of
    /// following lines so a heading never strands at a page bottom.
    fn heading(&mut self, text: &str) {
        self.ensure_space(HEADING_SIZE * PT_TO_MM + 4.0 + 2.0 * LINE_HEIGHT);
        self.cursor -= HEADING_SIZE * PT_TO_MM + 2.0;
        self.layer.use_text(text, HEADING_SIZE, Mm(self.left()), Mm(self.cursor), &self.bold);
        self.hairline(self.cursor - 1.5, 0.75);
        self.cursor -= 4.0;
    }

    fn paragraph(&mut self, text: &str) {
        for line in wrap_text(text, BODY_SIZE, self.usable_width()) {
            self.ensure_space(LINE_HEIGHT);
            self.cursor -= LINE_HEIGHT;
            self.layer.use_text(line, BODY_SIZE, Mm(self.left()), Mm(self.cursor), &self.regular);
        }
    }

    fn bullet(&mut self, text: &str) {
        let indent = 6.0;
        let mut first = true;
        for line in wrap_text(text, BODY_SIZE, self.usable_width() - indent) {
            self.ensure_space(LINE_HEIGHT);
            self.cursor -= LINE_HEIGHT;
            if first {
                // 0x95 in WinAnsi, safe with the built-in fonts.
                self.layer.use_text(
                    "\u{2022}",
                    BODY_SIZE,
                    Mm(self.left()),
                    Mm(self.cursor),
                    &self.regular,
                );
                first = false;
            }
            self.layer.use_text(
                line,
                BODY_SIZE,
                Mm(self.left() + indent),
                Mm(self.cursor),
                &self.regular,
            );
        }
    }

    fn small_note(&mut self, text: &str) {
        self.ensure_space(LINE_HEIGHT);
        self.cursor -= LINE_HEIGHT;
        self.set_text_gray(0.35);
        self.layer.use_text(text, SMALL_SIZE, Mm(self.left()), Mm(self.cursor), &self.regular);
        self.set_text_gray(0.0);
    }

    fn label_value(&mut self, label: &str, value: &str) {
        self.ensure_space(LINE_HEIGHT + 1.0);
        self.cursor -= LINE_HEIGHT + 1.0;
        self.layer.use_text(label, BODY_SIZE, Mm(self.left()), Mm(self.cursor), &self.bold);
        self.layer.use_text(
            value,
            BODY_SIZE,
            Mm(self.left() + 40.0),
            Mm(self.cursor),
            &self.regular,
        );
    }

    fn total_line(&mut self, label: &str, value: &str) {
        self.ensure_space(10.0);
        self.cursor -= 8.0;
        self.layer.use_text(label, HEADING_SIZE, Mm(self.left()), Mm(self.cursor), &self.bold);
        let x = self.left() + self.usable_width() - text_width_mm(value, HEADING_SIZE);
        self.layer.use_text(value, HEADING_SIZE, Mm(x), Mm(self.cursor), &self.bold);
        self.cursor -= 2.0;
    }

    fn gap(&mut self, mm: f32) {
        self.cursor -= mm;
    }

    fn hairline(&self, y: f32, gray: f32) {
        self.layer.set_outline_color(Color::Rgb(Rgb::new(gray, gray, gray, None)));
        self.layer.set_outline_thickness(0.4);
        self.draw_line(self.left(), y, self.left() + self.usable_width(), y);
    }

    fn draw_line(&self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let line = Line {
            points: vec![
                (Point::new(Mm(x1), Mm(y1)), false),
                (Point::new(Mm(x2), Mm(y2)), false),
            ],
            is_closed: false,
        };
        self.layer.add_line(line);
    }

    fn fill_rect(&self, x: f32, y: f32, width: f32, height: f32, gray: f32) {
        self.layer.set_fill_color(Color::Rgb(Rgb::new(gray, gray, gray, None)));
        let ring = vec![
            (Point::new(Mm(x), Mm(y)), false),
            (Point::new(Mm(x + width), Mm(y)), false),
            (Point::new(Mm(x + width), Mm(y + height)), false),
            (Point::new(Mm(x), Mm(y + height)), false),
        ];
        self.layer.add_polygon(Polygon {
            rings: vec![ring],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
        self.set_text_gray(0.0);
    }

    /// Table with a shaded header row. Rows break across pages one at a
    /// time, and every continuation page repeats the header row.
    fn table(&mut self, columns: &[TableColumn], rows: &[Vec<String>]) {
        self.table_header(columns);
        for row in rows {
            let wrapped: Vec<Vec<String>> = row
                .iter()
                .zip(columns)
                .map(|(cell, col)| wrap_text(cell, BODY_SIZE, col.width - 2.0 * CELL_PAD))
                .collect();
            let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
            let row_height = lines as f32 * LINE_HEIGHT + 2.0;

            if self.space_remaining() < row_height {
                self.page_break();
                self.table_header(columns);
            }

            let top = self.cursor;
            for (cell_lines, (col, x)) in
                wrapped.iter().zip(column_positions(columns, self.left()))
            {
                let mut y = top - LINE_HEIGHT;
                for line in cell_lines {
                    let text_x = if col.align_right {
                        x + col.width - CELL_PAD - text_width_mm(line, BODY_SIZE)
                    } else {
                        x + CELL_PAD
                    };
                    self.layer.use_text(line, BODY_SIZE, Mm(text_x), Mm(y), &self.regular);
                    y -= LINE_HEIGHT;
                }
            }
            self.cursor = top - row_height;
            self.hairline(self.cursor + 1.0, 0.82);
        }
    }

    fn table_header(&mut self, columns: &[TableColumn]) {
        let height = LINE_HEIGHT + 2.0;
        self.ensure_space(height + LINE_HEIGHT);
        let top = self.cursor;
        let width: f32 = columns.iter().map(|c| c.width).sum();
        self.fill_rect(self.left(), top - height, width, height, 0.9);
        for (col, x) in columns.iter().zip(column_positions(columns, self.left()).into_iter().map(|(_, x)| x)) {
            let text_x = if col.align_right {
                x + col.width - CELL_PAD - text_width_mm(col.header, BODY_SIZE)
            } else {
                x + CELL_PAD
            };
            self.layer.use_text(col.header, BODY_SIZE, Mm(text_x), Mm(top - LINE_HEIGHT), &self.bold);
        }
        self.cursor = top - height;
    }

    /// Places the logo against the top-right corner without moving the
    /// cursor; the title block flows beside it.
    fn logo_top_right(&self, logo: &ResolvedImage, max_width: f32, max_height: f32) {
        let (width, height) = fit_box(logo.aspect(), f64::from(max_width), f64::from(max_height));
        let (width, height) = (width as f32, height as f32);
        let x = self.left() + self.usable_width() - width;
        let y = self.geometry.content_top() - height;
        embed_rgb(&self.layer, logo, x, y, width);
    }

    fn signature_block(&mut self) {
        self.ensure_space(28.0);
        let rule_y = self.cursor - 16.0;
        let rule_width = 62.0;
        let left_x = self.left();
        let right_x = self.left() + self.usable_width() - rule_width;

        self.layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        self.layer.set_outline_thickness(0.5);
        self.draw_line(left_x, rule_y, left_x + rule_width, rule_y);
        self.draw_line(right_x, rule_y, right_x + rule_width, rule_y);

        self.layer.use_text("Client", SMALL_SIZE, Mm(left_x), Mm(rule_y - 4.0), &self.regular);
        self.layer.use_text(
            "For the Studio",
            SMALL_SIZE,
            Mm(right_x),
            Mm(rule_y - 4.0),
            &self.regular,
        );
        self.cursor = rule_y - 10.0;
    }

    fn save(self) -> EngineResult<Vec<u8>> {
        let total = self.pages.len();
        let footer_y = self.geometry.content_bottom() - 8.0;
        for (i, (page, layer)) in self.pages.iter().enumerate() {
            let layer_ref = self.doc.get_page(*page).get_layer(*layer);
            layer_ref.set_fill_color(Color::Rgb(Rgb::new(0.45, 0.45, 0.45, None)));
            layer_ref.use_text(
                &self.footer_note,
                SMALL_SIZE,
                Mm(self.geometry.margin.left),
                Mm(footer_y),
                &self.regular,
            );
            let page_text = format!("Page {} of {}", i + 1, total);
            let x = self.geometry.margin.left + self.geometry.usable_width()
                - text_width_mm(&page_text, SMALL_SIZE);
            layer_ref.use_text(page_text, SMALL_SIZE, Mm(x), Mm(footer_y), &self.regular);
        }

        let mut bytes = Vec::new();
        {
            let mut writer = BufWriter::new(Cursor::new(&mut bytes));
            self.doc.save(&mut writer).map_err(|e| EngineError::Render(e.to_string()))?;
        }
        Ok(bytes)
    }
}

/// X origin of each column, left to right.
fn column_positions<'a>(columns: &'a [TableColumn], left: f32) -> Vec<(&'a TableColumn, f32)> {
    let mut x = left;
    columns
        .iter()
        .map(|col| {
            let position = (col, x);
            x += col.width;
            position
        })
        .collect()
}

fn embed_rgb(layer: &PdfLayerReference, image: &ResolvedImage, x: f32, y: f32, width_mm: f32) {
    let pdf_image = Image::from(ImageXObject {
        width: Px(image.width as usize),
        height: Px(image.height as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: image.rgb.clone(),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    });
    // DPI chosen so the pixel width lands on the requested physical width.
    let dpi = image.width as f32 / (width_mm / 25.4);
    pdf_image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(Mm(y)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
}

/// Greedy word wrap against an average-glyph-width estimate. Helvetica runs
/// close to half the point size per character.
fn wrap_text(text: &str, size_pt: f32, max_width_mm: f32) -> Vec<String> {
    let max_chars = ((max_width_mm / (size_pt * 0.5 * PT_TO_MM)) as usize).max(8);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    text.chars().count() as f32 * size_pt * 0.5 * PT_TO_MM
}
