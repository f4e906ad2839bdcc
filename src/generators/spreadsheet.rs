//! Spreadsheet renderer for the shopping-list and budget-workbook kinds.
//!
//! One summary worksheet up front, then one detail worksheet per group. In
//! formula mode the sheets carry live `=SUM(...)` and cross-sheet references
//! so the workbook stays editable; literal mode writes plain numbers.

use std::collections::HashSet;

use rust_xlsxwriter::{
    Color, DocProperties, ExcelDateTime, Format, FormatAlign, FormatBorder, Workbook, Worksheet,
};

use crate::core::EngineResult;
use crate::engine::images::ImageSet;
use crate::engine::GroupOrder;
use crate::models::{
    price_or_zero, quantity_or_one, room_or_unspecified, text_or_dash, Category, CategoryGroup,
    DocumentItem, DocumentKind, DocumentRequest, GroupKey, RenderFlags,
};

use super::group_request_items;

const SUMMARY_SHEET: &str = "Summary";
const SUMMARY_HEADER_ROW: u32 = 5;

/// Detail sheets: title row, blank spacer, header row, then data.
const HEADER_ROW: u32 = 2;
const FIRST_DATA_ROW: u32 = 3;

const COL_POS: u16 = 0;
const COL_ITEM: u16 = 1;
const COL_CROSS: u16 = 2;
const COL_QTY: u16 = 3;

/// Excel refuses worksheet names longer than this.
const SHEET_NAME_MAX: usize = 31;

pub fn render(request: &DocumentRequest, _images: &ImageSet) -> EngineResult<Vec<u8>> {
    let order = match request.kind {
        DocumentKind::ShoppingList => GroupOrder::DisplayRank,
        _ => GroupOrder::SubtotalDesc,
    };
    let groups = group_request_items(request, order);
    let plan = ColumnPlan::new(&request.flags);
    let styles = Styles::new();

    // Sheet names and subtotal coordinates are fixed before any cell is
    // written so the summary can reference detail sheets created after it.
    let mut used_names = HashSet::new();
    used_names.insert(SUMMARY_SHEET.to_lowercase());
    let ledger: Vec<DetailPlan> = groups
        .iter()
        .map(|group| DetailPlan {
            sheet: unique_sheet_name(&group.label, &mut used_names),
            subtotal_row: FIRST_DATA_ROW + group.items.len() as u32,
            total_col: plan.total.unwrap_or(COL_QTY),
        })
        .collect();

    let mut workbook = Workbook::new();
    // Pinned creation date keeps repeat runs of the same payload
    // byte-identical.
    let created = ExcelDateTime::from_ymd(2024, 1, 1)?;
    let properties = DocProperties::new()
        .set_title(format!("{} - {}", doc_title(request.kind), request.client_name))
        .set_subject(request.project_title())
        .set_author("Studio Docs")
        .set_creation_datetime(&created);
    workbook.set_properties(&properties);

    let summary = workbook.add_worksheet();
    summary.set_name(SUMMARY_SHEET)?;
    write_summary(summary, request, &groups, &ledger, &styles)?;

    for (group, detail) in groups.iter().zip(&ledger) {
        let sheet = workbook.add_worksheet();
        sheet.set_name(&detail.sheet)?;
        sheet.set_tab_color(Color::RGB(group.color));
        write_detail(sheet, request, group, &plan, &styles)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn doc_title(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::ShoppingList => "Shopping List",
        _ => "Budget",
    }
}

/// Where a group's detail sheet keeps its subtotal, recorded up front so the
/// summary sheet can point at it.
struct DetailPlan {
    sheet: String,
    subtotal_row: u32,
    total_col: u16,
}

/// Column assignments for the detail sheets. Optional columns collapse when
/// their flag is off, everything after them shifts left.
struct ColumnPlan {
    cross_header: &'static str,
    qty: u16,
    price: Option<u16>,
    total: Option<u16>,
    supplier: Option<u16>,
    link: u16,
    last: u16,
}

impl ColumnPlan {
    fn new(flags: &RenderFlags) -> ColumnPlan {
        let mut next = COL_QTY + 1;
        let mut price = None;
        let mut total = None;
        if flags.include_prices {
            price = Some(next);
            total = Some(next + 1);
            next += 2;
        }
        let mut supplier = None;
        if flags.include_suppliers {
            supplier = Some(next);
            next += 1;
        }
        let link = next;
        ColumnPlan {
            cross_header: if flags.group_by_room { "Category" } else { "Room" },
            qty: COL_QTY,
            price,
            total,
            supplier,
            link,
            last: link,
        }
    }
}

struct Styles {
    title: Format,
    label: Format,
    header: Format,
    cell: Format,
    money: Format,
    percent: Format,
    subtotal_label: Format,
    subtotal_money: Format,
    total_label: Format,
    total_number: Format,
    total_money: Format,
    total_percent: Format,
}

impl Styles {
    fn new() -> Styles {
        let grand = Format::new().set_bold().set_border_top(FormatBorder::Double);
        Styles {
            title: Format::new().set_bold().set_font_size(14).set_align(FormatAlign::Center),
            label: Format::new().set_bold(),
            header: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0xE0E0E0))
                .set_border(FormatBorder::Thin),
            cell: Format::new().set_border(FormatBorder::Thin),
            money: Format::new().set_num_format("$#,##0.00").set_border(FormatBorder::Thin),
            percent: Format::new().set_num_format("0.00%").set_border(FormatBorder::Thin),
            subtotal_label: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0xF0F0F0))
                .set_border(FormatBorder::Thin),
            subtotal_money: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0xF0F0F0))
                .set_num_format("$#,##0.00")
                .set_border(FormatBorder::Thin),
            total_label: grand.clone(),
            total_number: grand.clone(),
            total_money: grand.clone().set_num_format("$#,##0.00"),
            total_percent: grand.set_num_format("0.00%"),
        }
    }
}

/// One summary line: a present group (with its detail sheet) or a zero row
/// for a category no item used.
struct SummaryRow<'a> {
    label: String,
    count: usize,
    subtotal: f64,
    share: f64,
    source: Option<&'a DetailPlan>,
}

fn summary_rows<'a>(
    groups: &[CategoryGroup],
    ledger: &'a [DetailPlan],
    flags: &RenderFlags,
) -> Vec<SummaryRow<'a>> {
    let mut rows: Vec<SummaryRow> = groups
        .iter()
        .zip(ledger)
        .map(|(group, plan)| SummaryRow {
            label: group.label.clone(),
            count: group.item_count,
            subtotal: group.subtotal,
            share: group.percentage / 100.0,
            source: Some(plan),
        })
        .collect();

    // Category summaries list the whole vocabulary; untouched categories
    // trail the active ones as zero rows in display order. Room summaries
    // only list rooms that actually occur.
    if !flags.group_by_room {
        let mut absent: Vec<Category> = Category::ALL
            .iter()
            .copied()
            .filter(|c| !groups.iter().any(|g| g.key == GroupKey::Category(*c)))
            .collect();
        absent.sort_by_key(|c| c.display_rank());
        for category in absent {
            rows.push(SummaryRow {
                label: category.label().to_string(),
                count: 0,
                subtotal: 0.0,
                share: 0.0,
                source: None,
            });
        }
    }
    rows
}

fn write_summary(
    sheet: &mut Worksheet,
    request: &DocumentRequest,
    groups: &[CategoryGroup],
    ledger: &[DetailPlan],
    styles: &Styles,
) -> EngineResult<()> {
    let flags = &request.flags;
    let last_col: u16 = if flags.include_prices { 3 } else { 1 };
    let title = format!("{} - {}", doc_title(request.kind), request.client_name);
    sheet.merge_range(0, 0, 0, last_col, &title, &styles.title)?;

    sheet.write_string_with_format(2, 0, "Client", &styles.label)?;
    sheet.write_string(2, 1, &request.client_name)?;
    sheet.write_string_with_format(3, 0, "Project", &styles.label)?;
    sheet.write_string(3, 1, request.project_title())?;

    let group_header = if flags.group_by_room { "Room" } else { "Category" };
    sheet.write_string_with_format(SUMMARY_HEADER_ROW, 0, group_header, &styles.header)?;
    sheet.write_string_with_format(SUMMARY_HEADER_ROW, 1, "Items", &styles.header)?;
    if flags.include_prices {
        sheet.write_string_with_format(SUMMARY_HEADER_ROW, 2, "Subtotal", &styles.header)?;
        sheet.write_string_with_format(SUMMARY_HEADER_ROW, 3, "Share", &styles.header)?;
    }

    let rows = summary_rows(groups, ledger, flags);
    let first = SUMMARY_HEADER_ROW + 1;
    let grand_row = first + rows.len() as u32;

    for (i, row) in rows.iter().enumerate() {
        let r = first + i as u32;
        sheet.write_string_with_format(r, 0, &row.label, &styles.cell)?;
        sheet.write_number_with_format(r, 1, row.count as f64, &styles.cell)?;
        if !flags.include_prices {
            continue;
        }
        match row.source {
            // The subtotal cell mirrors the detail sheet rather than
            // restating the number, so edits there flow through.
            Some(plan) if flags.include_formulas => {
                let reference = format!(
                    "='{}'!{}",
                    plan.sheet.replace('\'', "''"),
                    cell(plan.subtotal_row, plan.total_col)
                );
                sheet.write_formula_with_format(r, 2, reference.as_str(), &styles.money)?;
            }
            _ => {
                sheet.write_number_with_format(r, 2, row.subtotal, &styles.money)?;
            }
        }
        if flags.include_formulas {
            let share = format!(
                "=IF($C${g}=0,0,{c}/$C${g})",
                g = grand_row + 1,
                c = cell(r, 2)
            );
            sheet.write_formula_with_format(r, 3, share.as_str(), &styles.percent)?;
        } else {
            sheet.write_number_with_format(r, 3, row.share, &styles.percent)?;
        }
    }

    // The grand total sums the subtotal cells, never the raw item rows, so
    // it cannot double-count.
    sheet.write_string_with_format(grand_row, 0, "Grand Total", &styles.total_label)?;
    if rows.is_empty() {
        sheet.write_number_with_format(grand_row, 1, 0.0, &styles.total_number)?;
        if flags.include_prices {
            sheet.write_number_with_format(grand_row, 2, 0.0, &styles.total_money)?;
            sheet.write_number_with_format(grand_row, 3, 0.0, &styles.total_percent)?;
        }
    } else if flags.include_formulas {
        let last = grand_row - 1;
        let count = format!("=SUM({}:{})", cell(first, 1), cell(last, 1));
        sheet.write_formula_with_format(grand_row, 1, count.as_str(), &styles.total_number)?;
        if flags.include_prices {
            let total = format!("=SUM({}:{})", cell(first, 2), cell(last, 2));
            sheet.write_formula_with_format(grand_row, 2, total.as_str(), &styles.total_money)?;
            let share = format!("=SUM({}:{})", cell(first, 3), cell(last, 3));
            sheet.write_formula_with_format(grand_row, 3, share.as_str(), &styles.total_percent)?;
        }
    } else {
        let count: usize = rows.iter().map(|r| r.count).sum();
        let total: f64 = rows.iter().map(|r| r.subtotal).sum();
        sheet.write_number_with_format(grand_row, 1, count as f64, &styles.total_number)?;
        if flags.include_prices {
            sheet.write_number_with_format(grand_row, 2, total, &styles.total_money)?;
            let share = if total > 0.0 { 1.0 } else { 0.0 };
            sheet.write_number_with_format(grand_row, 3, share, &styles.total_percent)?;
        }
    }

    sheet.set_column_width(0, 24.0)?;
    sheet.set_column_width(1, 10.0)?;
    if flags.include_prices {
        sheet.set_column_width(2, 16.0)?;
        sheet.set_column_width(3, 10.0)?;
    }
    Ok(())
}

fn write_detail(
    sheet: &mut Worksheet,
    request: &DocumentRequest,
    group: &CategoryGroup,
    plan: &ColumnPlan,
    styles: &Styles,
) -> EngineResult<()> {
    let flags = &request.flags;
    sheet.merge_range(0, 0, 0, plan.last, &group.label, &styles.title)?;

    sheet.write_string_with_format(HEADER_ROW, COL_POS, "#", &styles.header)?;
    sheet.write_string_with_format(HEADER_ROW, COL_ITEM, "Item", &styles.header)?;
    sheet.write_string_with_format(HEADER_ROW, COL_CROSS, plan.cross_header, &styles.header)?;
    sheet.write_string_with_format(HEADER_ROW, plan.qty, "Qty", &styles.header)?;
    if let Some(col) = plan.price {
        sheet.write_string_with_format(HEADER_ROW, col, "Unit Price", &styles.header)?;
    }
    if let Some(col) = plan.total {
        sheet.write_string_with_format(HEADER_ROW, col, "Line Total", &styles.header)?;
    }
    if let Some(col) = plan.supplier {
        sheet.write_string_with_format(HEADER_ROW, col, "Supplier", &styles.header)?;
    }
    sheet.write_string_with_format(HEADER_ROW, plan.link, "Link", &styles.header)?;

    for (i, item) in group.items.iter().enumerate() {
        let row = FIRST_DATA_ROW + i as u32;
        write_item_row(sheet, row, item, plan, flags, styles)?;
    }
    let last_data_row = FIRST_DATA_ROW + group.items.len() as u32 - 1;

    if let Some(total_col) = plan.total {
        let subtotal_row = last_data_row + 1;
        sheet.write_string_with_format(subtotal_row, COL_ITEM, "Subtotal", &styles.subtotal_label)?;
        if flags.include_formulas {
            let sum = format!(
                "=SUM({}:{})",
                cell(FIRST_DATA_ROW, total_col),
                cell(last_data_row, total_col)
            );
            sheet.write_formula_with_format(subtotal_row, total_col, sum.as_str(), &styles.subtotal_money)?;
        } else {
            sheet.write_number_with_format(subtotal_row, total_col, group.subtotal, &styles.subtotal_money)?;
        }
    }

    sheet.set_column_width(COL_POS, 6.0)?;
    sheet.set_column_width(COL_ITEM, 32.0)?;
    sheet.set_column_width(COL_CROSS, 16.0)?;
    sheet.set_column_width(plan.qty, 8.0)?;
    if let Some(col) = plan.price {
        sheet.set_column_width(col, 13.0)?;
    }
    if let Some(col) = plan.total {
        sheet.set_column_width(col, 13.0)?;
    }
    if let Some(col) = plan.supplier {
        sheet.set_column_width(col, 20.0)?;
    }
    sheet.set_column_width(plan.link, 40.0)?;

    sheet.set_freeze_panes(FIRST_DATA_ROW, 0)?;
    sheet.autofilter(HEADER_ROW, 0, last_data_row, plan.last)?;
    Ok(())
}

fn write_item_row(
    sheet: &mut Worksheet,
    row: u32,
    item: &DocumentItem,
    plan: &ColumnPlan,
    flags: &RenderFlags,
    styles: &Styles,
) -> EngineResult<()> {
    let fields = item.fields();
    sheet.write_number_with_format(row, COL_POS, f64::from(fields.position), &styles.cell)?;
    sheet.write_string_with_format(row, COL_ITEM, &fields.name, &styles.cell)?;
    let cross = if flags.group_by_room {
        fields.category.label()
    } else {
        room_or_unspecified(fields.room.as_deref())
    };
    sheet.write_string_with_format(row, COL_CROSS, cross, &styles.cell)?;
    sheet.write_number_with_format(row, plan.qty, quantity_or_one(fields.quantity), &styles.cell)?;

    if let (Some(price_col), Some(total_col)) = (plan.price, plan.total) {
        sheet.write_number_with_format(row, price_col, price_or_zero(fields.unit_price), &styles.money)?;
        if flags.include_formulas {
            let product = format!("={}*{}", cell(row, plan.qty), cell(row, price_col));
            sheet.write_formula_with_format(row, total_col, product.as_str(), &styles.money)?;
        } else {
            sheet.write_number_with_format(row, total_col, item.line_total(), &styles.money)?;
        }
    }
    if let Some(col) = plan.supplier {
        sheet.write_string_with_format(row, col, text_or_dash(fields.supplier.as_deref()), &styles.cell)?;
    }
    sheet.write_string_with_format(row, plan.link, text_or_dash(fields.link.as_deref()), &styles.cell)?;
    Ok(())
}

/// A1-style reference for a zero-based row and column.
fn cell(row: u32, col: u16) -> String {
    format!("{}{}", col_letters(col), row + 1)
}

fn col_letters(col: u16) -> String {
    let mut letters = String::new();
    let mut n = u32::from(col) + 1;
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.insert(0, char::from(b'A' + rem));
        n = (n - 1) / 26;
    }
    letters
}

/// Strips characters Excel rejects and caps the length. Group labels come
/// from user payloads, so anything can show up here.
fn sanitize_sheet_name(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => ' ',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('\'').trim();
    let capped: String = trimmed.chars().take(SHEET_NAME_MAX).collect();
    let capped = capped.trim_end().trim_end_matches('\'');
    if capped.is_empty() {
        "Sheet".to_string()
    } else {
        capped.to_string()
    }
}

/// Distinct labels can collapse to the same name once truncated; suffix the
/// later ones. Excel compares sheet names case-insensitively.
fn unique_sheet_name(label: &str, used: &mut HashSet<String>) -> String {
    let base = sanitize_sheet_name(label);
    let mut name = base.clone();
    let mut n = 2u32;
    while !used.insert(name.to_lowercase()) {
        let suffix = format!(" {n}");
        let keep = SHEET_NAME_MAX.saturating_sub(suffix.chars().count());
        let stem: String = base.chars().take(keep).collect();
        name = format!("{}{}", stem.trim_end(), suffix);
        n += 1;
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemFields, RenderFlags};
    use std::io::Read as _;

    fn item(
        position: u32,
        name: &str,
        category: Category,
        price: f64,
        qty: f64,
        room: Option<&str>,
    ) -> DocumentItem {
        DocumentItem::Budget {
            fields: ItemFields {
                position,
                name: name.into(),
                category,
                room: room.map(str::to_string),
                unit_price: Some(price),
                quantity: Some(qty),
                supplier: Some("Vitra".into()),
                link: Some("https://shop.test/item".into()),
                image_url: None,
            },
            notes: None,
        }
    }

    fn workbook_request() -> DocumentRequest {
        DocumentRequest {
            kind: DocumentKind::BudgetWorkbook,
            client_name: "Casa Flores".into(),
            project_name: Some("Casa Flores Renovation".into()),
            logo_url: None,
            flags: RenderFlags::default(),
            items: vec![
                item(1, "Lounge chair", Category::Furniture, 420.0, 2.0, Some("Living Room")),
                item(2, "Pendant lamp", Category::Lighting, 150.0, 1.0, Some("Kitchen")),
                item(3, "Side table", Category::Furniture, 260.0, 1.0, Some("Living Room")),
            ],
            sections: Vec::new(),
            schedule: None,
            notes: None,
        }
    }

    fn render_bytes(request: &DocumentRequest) -> Vec<u8> {
        render(request, &ImageSet::default()).unwrap()
    }

    fn file_text(bytes: &[u8], name: &str) -> String {
        let cursor = std::io::Cursor::new(bytes.to_vec());
        let mut archive = zip::ZipArchive::new(cursor).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut text = String::new();
        file.read_to_string(&mut text).unwrap();
        text
    }

    fn sheet_names(bytes: &[u8]) -> Vec<String> {
        let xml = file_text(bytes, "xl/workbook.xml");
        let sheets = xml
            .split("<sheets>")
            .nth(1)
            .and_then(|rest| rest.split("</sheets>").next())
            .unwrap();
        let mut names = Vec::new();
        let mut rest = sheets;
        while let Some(pos) = rest.find("name=\"") {
            rest = &rest[pos + 6..];
            let end = rest.find('"').unwrap();
            names.push(rest[..end].to_string());
            rest = &rest[end..];
        }
        names
    }

    #[test]
    fn summary_lists_every_category_even_without_items() {
        let bytes = render_bytes(&workbook_request());
        assert_eq!(sheet_names(&bytes), ["Summary", "Furniture", "Lighting"]);

        let shared = file_text(&bytes, "xl/sharedStrings.xml");
        for label in ["Artwork", "Appliances", "Services", "Other", "Grand Total"] {
            assert!(shared.contains(label), "summary is missing {label}");
        }
    }

    #[test]
    fn formula_mode_links_summary_to_detail_subtotals() {
        let bytes = render_bytes(&workbook_request());

        // Furniture detail: two items on rows 4-5, subtotal on row 6.
        let detail = file_text(&bytes, "xl/worksheets/sheet2.xml");
        assert!(detail.contains("D4*E4"), "line totals should multiply qty by price");
        assert!(detail.contains("SUM(F4:F5)"), "subtotal should sum the line-total cells");

        // Summary: 10 vocabulary rows under the header, grand total below.
        let summary = file_text(&bytes, "xl/worksheets/sheet1.xml");
        assert!(summary.contains("'Furniture'!F6"), "summary should reference the detail subtotal");
        assert!(summary.contains("SUM(C7:C16)"), "grand total should sum the subtotal cells");
        assert!(summary.contains("$C$17"), "share formulas should divide by the grand total");
    }

    #[test]
    fn literal_mode_emits_no_formulas() {
        let mut request = workbook_request();
        request.flags.include_formulas = false;
        let bytes = render_bytes(&request);

        for sheet in ["sheet1", "sheet2", "sheet3"] {
            let xml = file_text(&bytes, &format!("xl/worksheets/{sheet}.xml"));
            assert!(!xml.contains("<f>"), "{sheet} should hold literals only");
        }
        let summary = file_text(&bytes, "xl/worksheets/sheet1.xml");
        assert!(summary.contains(">1250<"), "grand total should be written as a number");
    }

    #[test]
    fn literal_runs_are_byte_identical() {
        let mut request = workbook_request();
        request.flags.include_formulas = false;
        let first = render_bytes(&request);
        let second = render_bytes(&request);
        assert_eq!(first, second);
    }

    #[test]
    fn price_columns_follow_the_flag() {
        let mut request = workbook_request();
        request.flags.include_prices = false;
        let bytes = render_bytes(&request);

        let shared = file_text(&bytes, "xl/sharedStrings.xml");
        assert!(!shared.contains("Unit Price"));
        assert!(!shared.contains("Share"));
        assert!(!shared.contains(">Subtotal<"), "no subtotal rows without prices");
        assert!(shared.contains("Grand Total"), "the item count total still appears");
    }

    #[test]
    fn supplier_column_follows_the_flag() {
        let with = render_bytes(&workbook_request());
        assert!(file_text(&with, "xl/sharedStrings.xml").contains("Supplier"));

        let mut request = workbook_request();
        request.flags.include_suppliers = false;
        let without = render_bytes(&request);
        assert!(!file_text(&without, "xl/sharedStrings.xml").contains("Supplier"));
    }

    #[test]
    fn room_sheets_use_sanitized_capped_names() {
        let mut request = workbook_request();
        request.flags.group_by_room = true;
        if let DocumentItem::Budget { fields, .. } = &mut request.items[0] {
            fields.room = Some("Kitchen/Pantry [Phase 2]: West Annex Conservatory".into());
        }
        let bytes = render_bytes(&request);
        let names = sheet_names(&bytes);
        assert_eq!(names[0], "Summary");
        for name in &names[1..] {
            assert!(name.chars().count() <= SHEET_NAME_MAX);
            assert!(!name.contains(['[', ']', ':', '*', '?', '/', '\\']));
        }
    }

    #[test]
    fn colliding_truncations_get_distinct_names() {
        let mut used = HashSet::new();
        let first = unique_sheet_name("Conservatory and orangery wing A", &mut used);
        let second = unique_sheet_name("Conservatory and orangery wing B", &mut used);
        assert_ne!(first, second);
        assert!(second.chars().count() <= SHEET_NAME_MAX);
        assert!(second.ends_with(" 2"), "{second}");
    }

    #[test]
    fn empty_room_grouping_yields_a_bare_summary() {
        let mut request = workbook_request();
        request.flags.group_by_room = true;
        request.items.clear();
        let bytes = render_bytes(&request);
        assert_eq!(sheet_names(&bytes), ["Summary"]);
        assert!(file_text(&bytes, "xl/sharedStrings.xml").contains("Grand Total"));
    }

    #[test]
    fn detail_tabs_carry_group_accent_colors() {
        let bytes = render_bytes(&workbook_request());
        let furniture = file_text(&bytes, "xl/worksheets/sheet2.xml");
        assert!(furniture.contains("B0865A"), "tab color should match the category accent");
    }

    #[test]
    fn shopping_lists_order_groups_by_display_rank() {
        let mut request = workbook_request();
        request.kind = DocumentKind::ShoppingList;
        // Lighting outspends furniture, but display rank still wins.
        request.items = vec![
            item(1, "Chandelier", Category::Lighting, 2000.0, 1.0, None),
            item(2, "Stool", Category::Furniture, 80.0, 1.0, None),
        ];
        let bytes = render_bytes(&request);
        assert_eq!(sheet_names(&bytes), ["Summary", "Furniture", "Lighting"]);
    }

    #[test]
    fn cell_references_use_a1_notation() {
        assert_eq!(cell(0, 0), "A1");
        assert_eq!(cell(3, 5), "F4");
        assert_eq!(col_letters(25), "Z");
        assert_eq!(col_letters(26), "AA");
        assert_eq!(col_letters(27), "AB");
        assert_eq!(col_letters(701), "ZZ");
    }

    #[test]
    fn sheet_name_sanitizer_strips_forbidden_characters() {
        let name = sanitize_sheet_name("Kitchen/Pantry [Phase 2]: West Annex Conservatory");
        assert!(name.chars().count() <= SHEET_NAME_MAX);
        assert!(!name.contains(['/', '[', ']', ':']));
        assert_eq!(sanitize_sheet_name("   "), "Sheet");
        assert_eq!(sanitize_sheet_name("'Quoted'"), "Quoted");
    }
}
