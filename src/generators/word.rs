//! Flowing renderer for proposal documents and technical sheets.
//!
//! There is no layout cursor here: Word paginates the flow natively, so
//! structure comes from sized headings and fixed-grid tables. Widths are
//! twips against an A4 text column, run sizes are half-points.

use std::io::Cursor;

use docx_rs::{
    AlignmentType, BorderType, Docx, PageMargin, Paragraph, Pic, Run, RunFonts, ShdType, Shading,
    Table, TableCell, TableCellBorder, TableCellBorderPosition, TableLayoutType, TableRow,
    WidthType,
};

use crate::core::fmt::{long_date, money, percentage};
use crate::core::{EngineError, EngineResult};
use crate::engine::images::{ImageSet, ResolvedImage};
use crate::engine::GroupOrder;
use crate::models::{
    price_or_zero, quantity_or_one, room_or_unspecified, text_or_dash, CategoryGroup,
    DocumentItem, DocumentKind, DocumentRequest, RenderFlags,
};

use super::{fit_box, group_request_items, quantity_text, PROPOSAL_TERMS};

const INK: &str = "2E2A26";
const MUTED: &str = "8C8478";
const PAPER: &str = "EFECE6";
const ACCENT: &str = "B0865A";

// Half-points.
const TITLE_SIZE: usize = 40;
const HEADING_SIZE: usize = 28;
const SUBHEADING_SIZE: usize = 24;
const BODY_SIZE: usize = 22;
const SMALL_SIZE: usize = 18;

// A4 with 2 cm margins, all in twips.
const PAGE_W: u32 = 11906;
const PAGE_H: u32 = 16838;
const MARGIN: i32 = 1134;
const CONTENT_W: usize = 9638;
const LABEL_W: usize = 2200;
const RULE_W: usize = 3600;

const EMU_PER_INCH: f64 = 914_400.0;

pub fn render(request: &DocumentRequest, images: &ImageSet) -> EngineResult<Vec<u8>> {
    let docx = match request.kind {
        DocumentKind::TechnicalSheet => technical_sheet(request, images),
        _ => proposal_document(request, images),
    };

    let mut buffer = Vec::new();
    docx.build()
        .pack(Cursor::new(&mut buffer))
        .map_err(|e| EngineError::Render(e.to_string()))?;
    Ok(buffer)
}

fn proposal_document(request: &DocumentRequest, images: &ImageSet) -> Docx {
    let flags = &request.flags;
    let groups = group_request_items(request, GroupOrder::SubtotalDesc);
    let grand_total: f64 = groups.iter().map(|g| g.subtotal).sum();

    let mut docx = front_matter(base_document(), request, images, "Interior Design Proposal");

    for group in &groups {
        docx = docx
            .add_paragraph(heading(&group_heading_text(group, flags)))
            .add_table(group_table(group, flags))
            .add_paragraph(spacer());
    }

    if flags.include_prices && !groups.is_empty() {
        docx = docx
            .add_paragraph(heading("Investment Summary"))
            .add_table(summary_table(&groups, grand_total, flags.group_by_room))
            .add_paragraph(spacer());
    }

    if let Some(notes) = request.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        docx = docx
            .add_paragraph(heading("Notes"))
            .add_paragraph(body(notes))
            .add_paragraph(spacer());
    }

    docx = docx.add_paragraph(heading("Terms & Conditions"));
    for term in PROPOSAL_TERMS {
        docx = docx.add_paragraph(bullet(term));
    }

    docx.add_paragraph(spacer()).add_paragraph(spacer()).add_table(signature_table())
}

fn technical_sheet(request: &DocumentRequest, images: &ImageSet) -> Docx {
    let flags = &request.flags;
    let groups = group_request_items(request, GroupOrder::DisplayRank);

    let mut docx = front_matter(base_document(), request, images, "Technical Sheet");

    for group in &groups {
        docx = docx.add_paragraph(heading(&group.label));
        for item in &group.items {
            let fields = item.fields();
            docx = docx
                .add_paragraph(item_heading(fields.position, &fields.name))
                .add_table(spec_table(item, flags));
            if let Some(media) = media_paragraph(images, fields.position) {
                docx = docx.add_paragraph(spacer()).add_paragraph(media);
            }
            docx = docx.add_paragraph(spacer());
        }
    }
    docx
}

fn base_document() -> Docx {
    Docx::new()
        .page_size(PAGE_W, PAGE_H)
        .page_margin(PageMargin::new().top(MARGIN).bottom(MARGIN).left(MARGIN).right(MARGIN))
        .default_fonts(RunFonts::new().ascii("Calibri"))
        .default_size(BODY_SIZE)
}

/// Logo, title and the client block shared by both flowing documents.
fn front_matter(
    docx: Docx,
    request: &DocumentRequest,
    images: &ImageSet,
    title: &str,
) -> Docx {
    let mut docx = docx;
    if let Some(logo) = &images.logo {
        docx = docx.add_paragraph(logo_paragraph(logo));
    }
    docx.add_paragraph(title_paragraph(title))
        .add_paragraph(spacer())
        .add_table(info_table(request))
        .add_paragraph(spacer())
}

fn info_table(request: &DocumentRequest) -> Table {
    let rows = vec![
        ("Client", request.client_name.clone()),
        ("Project", request.project_title().to_string()),
        ("Date", long_date(chrono::Local::now().date_naive())),
    ];
    label_value_table(&rows)
}

fn group_heading_text(group: &CategoryGroup, flags: &RenderFlags) -> String {
    if flags.include_prices {
        format!("{}  ({})", group.label, money(group.subtotal))
    } else {
        group.label.clone()
    }
}

fn group_table(group: &CategoryGroup, flags: &RenderFlags) -> Table {
    let columns = item_columns(flags);
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
    data_table(&columns, &rows)
}

fn item_columns(flags: &RenderFlags) -> Vec<Column> {
    let mut fixed = 600 + 900;
    if flags.include_suppliers {
        fixed += 2000;
    }
    if flags.include_prices {
        fixed += 1400 + 1500;
    }
    let mut columns = vec![Column::new("#", 600), Column::new("Item", CONTENT_W - fixed)];
    if flags.include_suppliers {
        columns.push(Column::new("Supplier", 2000));
    }
    columns.push(Column::right("Qty", 900));
    if flags.include_prices {
        columns.push(Column::right("Unit Price", 1400));
        columns.push(Column::right("Line Total", 1500));
    }
    columns
}

/// Per-group breakdown closing with a shaded grand-total row.
fn summary_table(groups: &[CategoryGroup], grand_total: f64, group_by_room: bool) -> Table {
    let columns = summary_columns(group_by_room);
    let mut rows = vec![TableRow::new(columns.iter().map(header_cell).collect())];
    for group in groups {
        let values = vec![
            group.label.clone(),
            group.item_count.to_string(),
            money(group.subtotal),
            percentage(group.percentage),
        ];
        rows.push(TableRow::new(
            columns.iter().zip(&values).map(|(c, v)| value_cell(c, v)).collect(),
        ));
    }
    let item_total: usize = groups.iter().map(|g| g.item_count).sum();
    let totals = vec![
        "Total Investment".to_string(),
        item_total.to_string(),
        money(grand_total),
        String::new(),
    ];
    rows.push(TableRow::new(
        columns.iter().zip(&totals).map(|(c, v)| emphasis_cell(c, v)).collect(),
    ));

    Table::new(rows)
        .set_grid(columns.iter().map(|c| c.width).collect())
        .width(CONTENT_W, WidthType::Dxa)
        .layout(TableLayoutType::Fixed)
}

fn summary_columns(group_by_room: bool) -> Vec<Column> {
    let label = if group_by_room { "Room" } else { "Category" };
    vec![
        Column::new(label, CONTENT_W - 900 - 1700 - 1100),
        Column::right("Items", 900),
        Column::right("Subtotal", 1700),
        Column::right("Share", 1100),
    ]
}

/// One label/value block per technical item. Rows without backing data still
/// print so a missing spec is visible as a dash rather than silently absent.
fn spec_table(item: &DocumentItem, flags: &RenderFlags) -> Table {
    let fields = item.fields();
    let (dimensions, material, finish) = technical_details(item);

    let mut rows: Vec<(&str, String)> = Vec::new();
    if flags.group_by_room {
        rows.push(("Category", fields.category.label().to_string()));
    } else {
        rows.push(("Room", room_or_unspecified(fields.room.as_deref()).to_string()));
    }
    rows.push(("Dimensions", text_or_dash(dimensions).to_string()));
    rows.push(("Material", text_or_dash(material).to_string()));
    rows.push(("Finish", text_or_dash(finish).to_string()));
    if flags.include_suppliers {
        rows.push(("Supplier", text_or_dash(fields.supplier.as_deref()).to_string()));
    }
    rows.push(("Quantity", quantity_text(quantity_or_one(fields.quantity))));
    if flags.include_prices {
        rows.push(("Unit price", money(price_or_zero(fields.unit_price))));
        rows.push(("Line total", money(item.line_total())));
    }
    if let Some(notes) = item.notes().filter(|n| !n.trim().is_empty()) {
        rows.push(("Notes", notes.to_string()));
    }
    label_value_table(&rows)
}

/// Spec fields exist only on the technical variant; other variants dash all
/// three.
fn technical_details(item: &DocumentItem) -> (Option<&str>, Option<&str>, Option<&str>) {
    match item {
        DocumentItem::Technical { dimensions, material, finish, .. } => {
            (dimensions.as_deref(), material.as_deref(), finish.as_deref())
        }
        _ => (None, None, None),
    }
}

/// Item photo and technical drawing side by side when resolved.
fn media_paragraph(images: &ImageSet, position: u32) -> Option<Paragraph> {
    let mut paragraph = Paragraph::new();
    let mut any = false;
    for image in [images.for_item(position), images.drawing_for(position)].into_iter().flatten() {
        paragraph = paragraph
            .add_run(Run::new().add_image(sized_pic(image, 2.6, 2.0)))
            .add_run(Run::new().add_text("  "));
        any = true;
    }
    any.then_some(paragraph)
}

fn sized_pic(image: &ResolvedImage, max_w_in: f64, max_h_in: f64) -> Pic {
    let (w, h) = fit_box(image.aspect(), max_w_in, max_h_in);
    Pic::new(image.png.as_slice()).size(to_emu(w), to_emu(h))
}

fn to_emu(inches: f64) -> u32 {
    (inches * EMU_PER_INCH) as u32
}

fn logo_paragraph(logo: &ResolvedImage) -> Paragraph {
    Paragraph::new()
        .align(AlignmentType::Right)
        .add_run(Run::new().add_image(sized_pic(logo, 1.8, 0.75)))
}

/// Two blank signing rules with labels beneath, side by side.
fn signature_table() -> Table {
    let gap_w = CONTENT_W - 2 * RULE_W;
    let rule_cell = || {
        TableCell::new()
            .width(RULE_W, WidthType::Dxa)
            .clear_all_border()
            .set_border(
                TableCellBorder::new(TableCellBorderPosition::Bottom)
                    .border_type(BorderType::Single)
                    .size(6)
                    .color(INK),
            )
            .add_paragraph(spacer())
            .add_paragraph(spacer())
    };
    let gap_cell = || {
        TableCell::new().width(gap_w, WidthType::Dxa).clear_all_border().add_paragraph(spacer())
    };
    let label_cell = |text: &str| {
        TableCell::new().width(RULE_W, WidthType::Dxa).clear_all_border().add_paragraph(
            Paragraph::new().add_run(Run::new().add_text(text).size(SMALL_SIZE).color(MUTED)),
        )
    };

    Table::new(vec![
        TableRow::new(vec![rule_cell(), gap_cell(), rule_cell()]),
        TableRow::new(vec![label_cell("Client"), gap_cell(), label_cell("For the Studio")]),
    ])
    .set_grid(vec![RULE_W, gap_w, RULE_W])
    .width(CONTENT_W, WidthType::Dxa)
    .layout(TableLayoutType::Fixed)
    .clear_all_border()
}

fn data_table(columns: &[Column], rows: &[Vec<String>]) -> Table {
    let mut table_rows = vec![TableRow::new(columns.iter().map(header_cell).collect())];
    for row in rows {
        table_rows.push(TableRow::new(
            columns.iter().zip(row).map(|(c, v)| value_cell(c, v)).collect(),
        ));
    }
    Table::new(table_rows)
        .set_grid(columns.iter().map(|c| c.width).collect())
        .width(CONTENT_W, WidthType::Dxa)
        .layout(TableLayoutType::Fixed)
}

fn label_value_table(rows: &[(&str, String)]) -> Table {
    let table_rows = rows
        .iter()
        .map(|(label, value)| {
            TableRow::new(vec![
                TableCell::new()
                    .width(LABEL_W, WidthType::Dxa)
                    .shading(fill(PAPER))
                    .add_paragraph(Paragraph::new().add_run(run(label, BODY_SIZE).bold())),
                TableCell::new()
                    .width(CONTENT_W - LABEL_W, WidthType::Dxa)
                    .add_paragraph(Paragraph::new().add_run(run(value, BODY_SIZE))),
            ])
        })
        .collect();
    Table::new(table_rows)
        .set_grid(vec![LABEL_W, CONTENT_W - LABEL_W])
        .width(CONTENT_W, WidthType::Dxa)
        .layout(TableLayoutType::Fixed)
}

#[derive(Debug, Clone)]
struct Column {
    header: &'static str,
    width: usize,
    align_right: bool,
}

impl Column {
    fn new(header: &'static str, width: usize) -> Column {
        Column { header, width, align_right: false }
    }

    fn right(header: &'static str, width: usize) -> Column {
        Column { header, width, align_right: true }
    }
}

fn header_cell(column: &Column) -> TableCell {
    emphasis_cell(column, column.header)
}

fn emphasis_cell(column: &Column, value: &str) -> TableCell {
    let mut paragraph = Paragraph::new().add_run(run(value, BODY_SIZE).bold());
    if column.align_right {
        paragraph = paragraph.align(AlignmentType::Right);
    }
    TableCell::new()
        .width(column.width, WidthType::Dxa)
        .shading(fill(PAPER))
        .add_paragraph(paragraph)
}

fn value_cell(column: &Column, value: &str) -> TableCell {
    let mut paragraph = Paragraph::new().add_run(run(value, BODY_SIZE));
    if column.align_right {
        paragraph = paragraph.align(AlignmentType::Right);
    }
    TableCell::new().width(column.width, WidthType::Dxa).add_paragraph(paragraph)
}

fn fill(color: &str) -> Shading {
    Shading::new().shd_type(ShdType::Clear).fill(color)
}

fn run(text: &str, size: usize) -> Run {
    Run::new().add_text(text).size(size).color(INK)
}

fn title_paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(run(text, TITLE_SIZE).bold())
}

fn heading(text: &str) -> Paragraph {
    Paragraph::new().add_run(run(text, HEADING_SIZE).bold())
}

fn item_heading(position: u32, name: &str) -> Paragraph {
    Paragraph::new()
        .add_run(
            Run::new().add_text(format!("{position}. ")).size(SUBHEADING_SIZE).bold().color(ACCENT),
        )
        .add_run(run(name, SUBHEADING_SIZE).bold())
}

fn body(text: &str) -> Paragraph {
    Paragraph::new().add_run(run(text, BODY_SIZE))
}

fn bullet(text: &str) -> Paragraph {
    Paragraph::new().add_run(run(&format!("\u{2022} {text}"), BODY_SIZE))
}

fn spacer() -> Paragraph {
    Paragraph::new()
}
