// End-to-end tests: build a real purchase-order workbook with rust_xlsxwriter,
// split it, run the title setter and stamper, and re-import the outputs.
// Run with: cargo test -p sheetcut-io --test split_workbook

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, FormatBorder, Workbook};
use sheetcut_engine::cell::{BorderStyle, CellValue};
use sheetcut_engine::{Grid, SplitOptions};
use sheetcut_io::{set_print_titles, split, split_with_report, stamp, xlsx};

const COMPANY: &str = "PROCTER & GAMBLE (GUANGZHOU) LTD.";

/// 1x1 transparent PNG
const PNG_1X1: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

/// Two tables on one sheet (0-based rows below, 1-based in comments):
///   1  title row            13 P&G
///   2  P&G                  14 company name
///   3  company name (A:C)   17 ITEM NO. header
///   6  ITEM NO. header      18-19 items 4, 5
///   7-9 items 1..3          20 TOTAL / 21 TOTAL DAP
///   10 TOTAL / 11 TOTAL DAP
fn write_po_fixture(path: &Path) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("PO").unwrap();

    let title = Format::new().set_bold().set_font_size(14);
    let header = Format::new().set_bold().set_border(FormatBorder::Thin);
    let cell = Format::new().set_border(FormatBorder::Thin);

    sheet.write_string_with_format(0, 4, "PURCHASE ORDER", &title).unwrap();
    sheet.write_string(0, 5, "No. 4500123").unwrap();
    sheet.set_column_width(1, 30).unwrap();
    sheet.set_row_height(5, 24).unwrap();

    let mut write_table = |top: u32, first_item: u32, items: u32, merge_company: bool| {
        sheet.write_string(top, 0, "P&G").unwrap();
        if merge_company {
            sheet.merge_range(top + 1, 0, top + 1, 2, COMPANY, &Format::new()).unwrap();
        } else {
            sheet.write_string(top + 1, 0, COMPANY).unwrap();
        }
        let header_row = top + 4;
        for (col, label) in [(0, "ITEM NO."), (1, "DESCRIPTION"), (4, "QTY"), (5, "AMOUNT")] {
            sheet.write_string_with_format(header_row, col, label, &header).unwrap();
        }
        for i in 0..items {
            let row = header_row + 1 + i;
            sheet.write_number_with_format(row, 0, f64::from(first_item + i), &cell).unwrap();
            sheet.write_string_with_format(row, 1, "carton", &cell).unwrap();
            sheet.write_number_with_format(row, 4, 10.0, &cell).unwrap();
            sheet.write_number_with_format(row, 5, 25.5, &cell).unwrap();
        }
        let total = header_row + 1 + items;
        sheet.write_string(total, 1, "TOTAL").unwrap();
        sheet.write_number(total, 5, 76.5).unwrap();
        sheet.write_string(total + 1, 1, "TOTAL DAP").unwrap();
        sheet.write_number(total + 1, 5, 80.0).unwrap();
    };
    write_table(1, 1, 3, true);
    write_table(12, 4, 2, false);

    workbook.save(path).unwrap();
}

fn fixture() -> (tempfile::TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = temp_dir.path().join("po.xlsx");
    write_po_fixture(&input);
    (temp_dir, input)
}

fn find_row(grid: &Grid, needle: &str) -> Option<u32> {
    (1..=grid.max_row()).find(|&r| grid.row_text(r).contains(needle))
}

fn item_numbers(grid: &Grid) -> Vec<f64> {
    let header_row = find_row(grid, "ITEM NO").unwrap();
    (header_row + 1..=grid.max_row())
        .filter_map(|r| match grid.value(r, 1) {
            CellValue::Number(n) => Some(*n),
            _ => None,
        })
        .collect()
}

#[test]
fn split_produces_lettered_outputs() {
    let (temp_dir, input) = fixture();
    let prefix = temp_dir.path().join("out").join("PO 4500123");

    let paths = split(&input, &prefix, 30).unwrap();
    let names: Vec<String> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["POA 4500123.xlsx", "POB 4500123.xlsx"]);
}

#[test]
fn outputs_are_renumbered_and_styled() {
    let (temp_dir, input) = fixture();
    let report = split_with_report(&input, &temp_dir.path().join("PO"), &SplitOptions::default()).unwrap();
    assert_eq!(report.paths.len(), 2);
    assert_eq!(report.item_counts, vec![Some(3), Some(2)]);

    for path in &report.paths {
        let (grid, _) = xlsx::import(path).unwrap();
        assert_eq!(grid.sheet_name.as_deref(), Some("PO"));

        let items = item_numbers(&grid);
        let expected: Vec<f64> = (1..=items.len()).map(|n| n as f64).collect();
        assert_eq!(items, expected, "{}", path.display());

        // company block and enlarged title in row 1
        assert_eq!(grid.value(1, 1), &CellValue::Text("P&G".into()));
        let title_size = (1..=grid.max_col())
            .filter_map(|c| grid.style(1, c).and_then(|s| s.font.size))
            .fold(0.0_f64, f64::max);
        assert!(title_size >= 20.0, "title font size {}", title_size);
        assert_eq!(grid.row_height(1), Some(36.0));

        // item borders survive the copy
        let first_item_row = find_row(&grid, "ITEM NO").unwrap() + 1;
        assert_eq!(grid.style(first_item_row, 1).unwrap().border.top.style, BorderStyle::Thin);

        // TOTAL DAP label bolded
        let dap_row = find_row(&grid, "TOTAL DAP").unwrap();
        let dap_col = (1..=grid.max_col())
            .find(|&c| grid.value(dap_row, c) == &CellValue::Text("TOTAL DAP".into()))
            .unwrap();
        assert!(grid.style(dap_row, dap_col).unwrap().font.bold);

        assert_eq!(grid.page_setup.paper_size, 9);
        assert_eq!(grid.page_setup.fit_to_pages, Some((1, 0)));
        assert!(grid.page_setup.center_horizontally);
    }
}

#[test]
fn titles_and_stamp_on_split_output() {
    let (temp_dir, input) = fixture();
    let paths = split(&input, &temp_dir.path().join("PO"), 30).unwrap();
    let image = temp_dir.path().join("stamp.png");
    std::fs::write(&image, PNG_1X1).unwrap();

    let first = &paths[0];
    let titles = set_print_titles(first);
    assert!(titles.ok, "{}", titles.message);

    let stamped = stamp(first, &image);
    assert!(stamped.ok, "{}", stamped.message);
    assert!(stamped.message.contains('E'));

    // print titles survive the stamper's rewrite
    let (grid, _) = xlsx::import(first).unwrap();
    let item_header = find_row(&grid, "ITEM NO").unwrap();
    assert_eq!(grid.print_title_rows, Some((1, item_header)));

    let file = std::fs::File::open(first).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    assert!(archive.by_name("xl/media/image1.png").is_ok());
}

#[test]
fn stamp_with_missing_image_reports_path() {
    let (temp_dir, input) = fixture();
    let missing = temp_dir.path().join("pic").join("stamp.png");
    let outcome = stamp(&input, &missing);
    assert!(!outcome.ok);
    assert_eq!(outcome.message, format!("stamp image not found: {}", missing.display()));
}
