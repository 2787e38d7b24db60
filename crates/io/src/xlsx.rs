// XLSX import/export for the splitter's Grid model.
//
// Import: calamine reads cell values (formula cells yield their cached results),
// xlsx_styles fills in everything visual from the raw XML parts.
// Export: rust_xlsxwriter, merges first, then cells, layout, page setup, images.

use std::path::Path;
use std::time::Instant;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, FormatPattern, FormatUnderline, Image,
    Workbook as XlsxWorkbook, Worksheet,
};
use sheetcut_engine::cell::{
    BorderStyle, CellStyle, CellValue, FillPattern, HorizontalAlignment, NumberFormat, Rgba,
    Underline, VerticalAlignment,
};
use sheetcut_engine::grid::{col_to_letter, Grid, ImagePlacement, PageSetup};
use sheetcut_engine::SplitError;

use crate::xlsx_styles;

/// Excel's max column count; rust_xlsxwriter rejects anything past XFD.
const MAX_COLS: u32 = 16_384;

/// Padding Excel adds to a stored column width (Calibri 11, 7px max digit width).
/// rust_xlsxwriter adds it back on save, so raw widths are stripped before export.
const WIDTH_PADDING: f64 = 0.7109375;
const WIDTH_TOLERANCE: f64 = 0.0005;

#[derive(Debug, Default)]
pub struct ImportResult {
    pub sheet_name: String,
    pub cells_imported: usize,
    pub styled_cells: usize,
    pub merges_imported: usize,
    /// Merges dropped because they overlapped an earlier one
    pub merges_skipped: usize,
    pub unsupported: Vec<String>,
    pub import_duration_ms: u128,
}

impl ImportResult {
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{} cells", self.cells_imported)];
        if self.styled_cells > 0 {
            parts.push(format!("{} styled", self.styled_cells));
        }
        if self.merges_imported > 0 {
            parts.push(format!("{} merges", self.merges_imported));
        }
        format!("'{}': {}", self.sheet_name, parts.join(" · "))
    }
}

#[derive(Debug, Default)]
pub struct ExportResult {
    pub cells_exported: usize,
    pub merges_exported: usize,
    pub images_exported: usize,
    pub export_duration_ms: u128,
}

// =============================================================================
// Import
// =============================================================================

/// Load the active sheet of an xlsx file into a Grid (1-based rows/cols).
pub fn import(path: &Path) -> Result<(Grid, ImportResult), SplitError> {
    let start_time = Instant::now();

    // Style/layout parts first: they also tell us which sheet is active.
    let parts = xlsx_styles::read_active_sheet_parts(path)
        .map_err(|e| SplitError::Io(format!("{}: {}", path.display(), e)))?;

    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| SplitError::Io(format!("Failed to open Excel file {}: {}", path.display(), e)))?;
    let range = workbook
        .worksheet_range(&parts.sheet_name)
        .map_err(|e| SplitError::Io(format!("Failed to read sheet '{}': {}", parts.sheet_name, e)))?;

    let mut grid = Grid::new();
    let mut result = ImportResult {
        sheet_name: parts.sheet_name.clone(),
        unsupported: parts.unsupported,
        ..Default::default()
    };
    grid.sheet_name = Some(parts.sheet_name);

    if let Some((row0, col0)) = range.start() {
        for (r, row) in range.rows().enumerate() {
            for (c, data) in row.iter().enumerate() {
                let value = data_to_value(data);
                if value.is_empty() {
                    continue;
                }
                let row = row0 + r as u32 + 1;
                let col = col0 + c as u32 + 1;
                if col > MAX_COLS {
                    continue;
                }
                grid.set_value(row, col, value);
                result.cells_imported += 1;
            }
        }
    }

    let formatting = parts.formatting;
    for (row, col, style_id) in formatting.cell_styles {
        match parts.styles.get(style_id) {
            Some(style) if !style.is_default() => {
                grid.set_style(row, col, style.clone());
                result.styled_cells += 1;
            }
            Some(_) => {}
            None => log::debug!("style id {} out of range at {}{}", style_id, col_to_letter(col), row),
        }
    }

    for (col, width) in formatting.col_widths {
        grid.set_col_width(col, width);
    }
    for (row, height) in formatting.row_heights {
        grid.set_row_height(row, height);
    }
    for region in formatting.merged_regions {
        match grid.add_merge(region) {
            Ok(()) => result.merges_imported += 1,
            Err(e) => {
                log::warn!("skipping merge {}: {}", region.a1(), e);
                result.merges_skipped += 1;
            }
        }
    }

    grid.page_setup = formatting.page_setup;
    grid.print_title_rows = parts.print_titles;

    result.import_duration_ms = start_time.elapsed().as_millis();
    log::debug!("imported {} in {}ms", result.summary(), result.import_duration_ms);
    Ok((grid, result))
}

/// Cached cell value → grid value. Dates stay serial numbers (their number
/// format carries the display), errors keep their Excel spelling.
fn data_to_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

// =============================================================================
// Export
// =============================================================================

/// Write a Grid as a single-sheet xlsx file.
pub fn export(grid: &Grid, path: &Path) -> Result<ExportResult, SplitError> {
    let start_time = Instant::now();
    let mut result = ExportResult::default();
    let mut xlsx_workbook = XlsxWorkbook::new();

    let worksheet = xlsx_workbook.add_worksheet();
    if let Some(name) = &grid.sheet_name {
        worksheet
            .set_name(name)
            .map_err(|e| SplitError::Layout(format!("Failed to name sheet '{}': {}", name, e)))?;
    }

    // Merges first: merge_range() writes the anchor format across the range,
    // then the cell pass overwrites the anchor with its typed value and
    // restores per-cell styles (e.g. borders) on the covered cells.
    for merge in grid.merged_regions() {
        let format = grid
            .style(merge.min_row, merge.min_col)
            .map(build_excel_format)
            .unwrap_or_else(Format::new);
        worksheet
            .merge_range(
                merge.min_row - 1,
                col_index(merge.min_col)?,
                merge.max_row - 1,
                col_index(merge.max_col)?,
                "",
                &format,
            )
            .map_err(|e| SplitError::Layout(format!("Failed to write merge {}: {}", merge.a1(), e)))?;
        result.merges_exported += 1;
    }

    result.cells_exported = export_cells(grid, worksheet)?;
    apply_layout(grid, worksheet)?;
    apply_page_setup(worksheet, &grid.page_setup);

    if let Some((first, last)) = grid.print_title_rows {
        worksheet
            .set_repeat_rows(first.saturating_sub(1), last.saturating_sub(1))
            .map_err(|e| SplitError::Layout(format!("Failed to set print titles {}:{}: {}", first, last, e)))?;
    }

    for placement in &grid.images {
        insert_image(worksheet, placement)?;
        result.images_exported += 1;
    }

    xlsx_workbook
        .save(path)
        .map_err(|e| SplitError::Io(format!("Failed to save XLSX file {}: {}", path.display(), e)))?;

    result.export_duration_ms = start_time.elapsed().as_millis();
    Ok(result)
}

fn col_index(col: u32) -> Result<u16, SplitError> {
    if col == 0 || col > MAX_COLS {
        return Err(SplitError::Layout(format!("column {} out of range", col)));
    }
    Ok((col - 1) as u16)
}

fn export_cells(grid: &Grid, worksheet: &mut Worksheet) -> Result<usize, SplitError> {
    let mut cells_exported = 0;

    // Sorted so the written file is deterministic
    let mut cells: Vec<_> = grid.cells_iter().collect();
    cells.sort_by_key(|(pos, _)| **pos);

    for (&(row, col), cell) in cells {
        let row32 = row - 1;
        let col16 = col_index(col)?;
        let format = build_excel_format(&cell.style);
        let write_err = |e: rust_xlsxwriter::XlsxError| {
            SplitError::Layout(format!("Failed to write cell {}{}: {}", col_to_letter(col), row, e))
        };

        match &cell.value {
            CellValue::Empty => {
                if cell.style.is_default() {
                    continue;
                }
                worksheet.write_blank(row32, col16, &format).map_err(write_err)?;
            }
            CellValue::Text(s) => {
                worksheet.write_string_with_format(row32, col16, s, &format).map_err(write_err)?;
            }
            CellValue::Number(n) => {
                worksheet.write_number_with_format(row32, col16, *n, &format).map_err(write_err)?;
            }
            CellValue::Bool(b) => {
                worksheet.write_boolean_with_format(row32, col16, *b, &format).map_err(write_err)?;
            }
        }
        cells_exported += 1;
    }

    Ok(cells_exported)
}

fn xlsx_color([r, g, b, _]: Rgba) -> Color {
    Color::RGB(((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
}

fn build_excel_format(style: &CellStyle) -> Format {
    let mut format = Format::new();

    // Font
    let font = &style.font;
    if font.bold {
        format = format.set_bold();
    }
    if font.italic {
        format = format.set_italic();
    }
    format = match font.underline {
        Underline::None => format,
        Underline::Single => format.set_underline(FormatUnderline::Single),
        Underline::Double => format.set_underline(FormatUnderline::Double),
        Underline::SingleAccounting => format.set_underline(FormatUnderline::SingleAccounting),
        Underline::DoubleAccounting => format.set_underline(FormatUnderline::DoubleAccounting),
    };
    if font.strikethrough {
        format = format.set_font_strikethrough();
    }
    if let Some(ref name) = font.name {
        format = format.set_font_name(name);
    }
    if let Some(size) = font.size {
        format = format.set_font_size(size);
    }
    if let Some(color) = font.color {
        format = format.set_font_color(xlsx_color(color));
    }

    // Fill
    let fill = &style.fill;
    match fill.pattern {
        FillPattern::None => {}
        FillPattern::Solid => {
            // For solid fills the visible color is the pattern foreground
            format = format.set_pattern(FormatPattern::Solid);
            if let Some(fg) = fill.fg_color.or(fill.bg_color) {
                format = format.set_background_color(xlsx_color(fg));
            }
        }
        pattern => {
            format = format.set_pattern(pattern_to_xlsx(pattern));
            if let Some(fg) = fill.fg_color {
                format = format.set_foreground_color(xlsx_color(fg));
            }
            if let Some(bg) = fill.bg_color {
                format = format.set_background_color(xlsx_color(bg));
            }
        }
    }

    // Borders
    let border = &style.border;
    if border.top.is_set() {
        format = format.set_border_top(border_style_to_xlsx(border.top.style));
        if let Some(c) = border.top.color {
            format = format.set_border_top_color(xlsx_color(c));
        }
    }
    if border.right.is_set() {
        format = format.set_border_right(border_style_to_xlsx(border.right.style));
        if let Some(c) = border.right.color {
            format = format.set_border_right_color(xlsx_color(c));
        }
    }
    if border.bottom.is_set() {
        format = format.set_border_bottom(border_style_to_xlsx(border.bottom.style));
        if let Some(c) = border.bottom.color {
            format = format.set_border_bottom_color(xlsx_color(c));
        }
    }
    if border.left.is_set() {
        format = format.set_border_left(border_style_to_xlsx(border.left.style));
        if let Some(c) = border.left.color {
            format = format.set_border_left_color(xlsx_color(c));
        }
    }

    // Number format
    format = match &style.number_format {
        NumberFormat::General => format,
        NumberFormat::Builtin(id) => format.set_num_format_index(*id),
        NumberFormat::Custom(code) => format.set_num_format(code),
    };

    // Protection
    if !style.protection.locked {
        format = format.set_unlocked();
    }
    if style.protection.hidden {
        format = format.set_hidden();
    }

    // Alignment
    let align = &style.alignment;
    format = match align.horizontal {
        HorizontalAlignment::General => format, // Excel default: numbers right, text left
        HorizontalAlignment::Left => format.set_align(FormatAlign::Left),
        HorizontalAlignment::Center => format.set_align(FormatAlign::Center),
        HorizontalAlignment::Right => format.set_align(FormatAlign::Right),
        HorizontalAlignment::Fill => format.set_align(FormatAlign::Fill),
        HorizontalAlignment::Justify => format.set_align(FormatAlign::Justify),
        HorizontalAlignment::CenterContinuous => format.set_align(FormatAlign::CenterAcross),
        HorizontalAlignment::Distributed => format.set_align(FormatAlign::Distributed),
    };
    format = match align.vertical {
        VerticalAlignment::Bottom => format,
        VerticalAlignment::Top => format.set_align(FormatAlign::Top),
        VerticalAlignment::Center => format.set_align(FormatAlign::VerticalCenter),
        VerticalAlignment::Justify => format.set_align(FormatAlign::VerticalJustify),
        VerticalAlignment::Distributed => format.set_align(FormatAlign::VerticalDistributed),
    };
    if align.wrap_text {
        format = format.set_text_wrap();
    }
    if align.shrink_to_fit {
        format = format.set_shrink();
    }
    if align.indent > 0 {
        format = format.set_indent(align.indent);
    }
    if let Some(rotation) = xlsx_rotation(align.rotation) {
        format = format.set_rotation(rotation);
    }

    format
}

/// OOXML textRotation (0-90 up, 91-180 down, 255 stacked) → rust_xlsxwriter
/// angle (-90..=90, or 270 for stacked).
fn xlsx_rotation(rotation: i16) -> Option<i16> {
    match rotation {
        0 => None,
        1..=90 => Some(rotation),
        91..=180 => Some(-(rotation - 90)),
        255 => Some(270),
        _ => None,
    }
}

fn border_style_to_xlsx(style: BorderStyle) -> FormatBorder {
    match style {
        BorderStyle::None => FormatBorder::None,
        BorderStyle::Thin => FormatBorder::Thin,
        BorderStyle::Medium => FormatBorder::Medium,
        BorderStyle::Dashed => FormatBorder::Dashed,
        BorderStyle::Dotted => FormatBorder::Dotted,
        BorderStyle::Thick => FormatBorder::Thick,
        BorderStyle::Double => FormatBorder::Double,
        BorderStyle::Hair => FormatBorder::Hair,
        BorderStyle::MediumDashed => FormatBorder::MediumDashed,
        BorderStyle::DashDot => FormatBorder::DashDot,
        BorderStyle::MediumDashDot => FormatBorder::MediumDashDot,
        BorderStyle::DashDotDot => FormatBorder::DashDotDot,
        BorderStyle::MediumDashDotDot => FormatBorder::MediumDashDotDot,
        BorderStyle::SlantDashDot => FormatBorder::SlantDashDot,
    }
}

fn pattern_to_xlsx(pattern: FillPattern) -> FormatPattern {
    match pattern {
        FillPattern::None => FormatPattern::None,
        FillPattern::Solid => FormatPattern::Solid,
        FillPattern::MediumGray => FormatPattern::MediumGray,
        FillPattern::DarkGray => FormatPattern::DarkGray,
        FillPattern::LightGray => FormatPattern::LightGray,
        FillPattern::DarkHorizontal => FormatPattern::DarkHorizontal,
        FillPattern::DarkVertical => FormatPattern::DarkVertical,
        FillPattern::DarkDown => FormatPattern::DarkDown,
        FillPattern::DarkUp => FormatPattern::DarkUp,
        FillPattern::DarkGrid => FormatPattern::DarkGrid,
        FillPattern::DarkTrellis => FormatPattern::DarkTrellis,
        FillPattern::LightHorizontal => FormatPattern::LightHorizontal,
        FillPattern::LightVertical => FormatPattern::LightVertical,
        FillPattern::LightDown => FormatPattern::LightDown,
        FillPattern::LightUp => FormatPattern::LightUp,
        FillPattern::LightGrid => FormatPattern::LightGrid,
        FillPattern::LightTrellis => FormatPattern::LightTrellis,
        FillPattern::Gray125 => FormatPattern::Gray125,
        FillPattern::Gray0625 => FormatPattern::Gray0625,
    }
}

/// Raw stored width → the character width rust_xlsxwriter expects.
fn strip_excel_padding(raw: f64) -> f64 {
    let frac = raw % 1.0;
    if (frac - WIDTH_PADDING).abs() < WIDTH_TOLERANCE && raw >= WIDTH_PADDING {
        return ((raw - WIDTH_PADDING) * 10000.0).round() / 10000.0;
    }
    (raw * 10000.0).round() / 10000.0
}

/// Apply column widths and row heights
fn apply_layout(grid: &Grid, worksheet: &mut Worksheet) -> Result<(), SplitError> {
    for (&col, &width) in grid.col_widths() {
        if col > MAX_COLS {
            continue;
        }
        worksheet
            .set_column_width(col_index(col)?, strip_excel_padding(width))
            .map_err(|e| SplitError::Layout(format!("Failed to set column {} width: {}", col_to_letter(col), e)))?;
    }

    for (&row, &height) in grid.row_heights() {
        worksheet
            .set_row_height(row - 1, height)
            .map_err(|e| SplitError::Layout(format!("Failed to set row {} height: {}", row, e)))?;
    }

    Ok(())
}

fn apply_page_setup(worksheet: &mut Worksheet, page: &PageSetup) {
    if page.paper_size > 0 {
        worksheet.set_paper_size(page.paper_size);
    }
    if page.landscape {
        worksheet.set_landscape();
    }
    let m = &page.margins;
    worksheet.set_margins(m.left, m.right, m.top, m.bottom, m.header, m.footer);
    if let Some((wide, tall)) = page.fit_to_pages {
        worksheet.set_print_fit_to_pages(wide, tall);
    }
    worksheet.set_print_center_horizontally(page.center_horizontally);
    worksheet.set_print_center_vertically(page.center_vertically);
}

fn insert_image(worksheet: &mut Worksheet, placement: &ImagePlacement) -> Result<(), SplitError> {
    if !placement.path.exists() {
        return Err(SplitError::MissingResource(placement.path.clone()));
    }
    let image = Image::new(&placement.path)
        .map_err(|e| SplitError::Io(format!("Failed to load image {}: {}", placement.path.display(), e)))?;

    let (width, height) = (image.width(), image.height());
    let mut image = image;
    if width > 0.0 && height > 0.0 {
        image = image
            .set_scale_width(f64::from(placement.width_px) / width)
            .set_scale_height(f64::from(placement.height_px) / height);
    }

    worksheet
        .insert_image(placement.row.saturating_sub(1), col_index(placement.col)?, &image)
        .map_err(|e| SplitError::Layout(format!("Failed to insert image: {}", e)))?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sheetcut_engine::cell::{Border, BorderSide, Fill, Font};
    use sheetcut_engine::grid::{MergedRegion, PageMargins};

    fn styled(bold: bool) -> CellStyle {
        CellStyle {
            font: Font { bold, size: Some(12.0), name: Some("Arial".into()), ..Default::default() },
            fill: Fill { pattern: FillPattern::Solid, fg_color: Some([255, 255, 0, 255]), bg_color: None },
            border: Border::all(BorderSide::thin()),
            number_format: NumberFormat::Custom("#,##0.000".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_strip_excel_padding() {
        assert_eq!(strip_excel_padding(12.7109375), 12.0);
        assert_eq!(strip_excel_padding(8.43), 8.43);
        assert_eq!(strip_excel_padding(0.5), 0.5);
    }

    #[test]
    fn test_xlsx_rotation() {
        assert_eq!(xlsx_rotation(0), None);
        assert_eq!(xlsx_rotation(45), Some(45));
        assert_eq!(xlsx_rotation(135), Some(-45));
        assert_eq!(xlsx_rotation(255), Some(270));
    }

    #[test]
    fn test_data_to_value() {
        assert_eq!(data_to_value(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(data_to_value(&Data::String(String::new())), CellValue::Empty);
        assert_eq!(data_to_value(&Data::String("P&G".into())), CellValue::Text("P&G".into()));
        assert_eq!(data_to_value(&Data::Bool(true)), CellValue::Bool(true));
    }

    #[test]
    fn test_export_basic() {
        let mut grid = Grid::new();
        grid.set_value(1, 1, CellValue::Text("Hello".into()));
        grid.set_value(2, 1, CellValue::Number(42.0));

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("basic.xlsx");
        let result = export(&grid, &path).unwrap();
        assert_eq!(result.cells_exported, 2);
        assert!(path.exists());
    }

    #[test]
    fn test_round_trip_preserves_values_styles_and_layout() {
        let mut grid = Grid::new();
        grid.sheet_name = Some("PO".into());
        grid.set_value(1, 1, CellValue::Text("TITLE".into()));
        grid.set_value(2, 2, CellValue::Number(1234.5));
        grid.set_style(2, 2, styled(true));
        grid.set_style(3, 3, styled(false)); // styled blank
        grid.set_value(4, 1, CellValue::Bool(true));
        grid.add_merge(MergedRegion::new(1, 1, 1, 3)).unwrap();
        grid.set_col_width(2, 30.0);
        grid.set_row_height(1, 36.0);
        grid.page_setup = PageSetup {
            paper_size: 9,
            landscape: true,
            fit_to_pages: Some((1, 0)),
            center_horizontally: true,
            center_vertically: false,
            margins: PageMargins { left: 0.0, right: 0.0, top: 0.0, bottom: 0.0, header: 0.28, footer: 0.12 },
        };
        grid.print_title_rows = Some((1, 2));

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("round.xlsx");
        export(&grid, &path).unwrap();

        let (back, result) = import(&path).unwrap();
        assert_eq!(result.sheet_name, "PO");
        assert_eq!(back.sheet_name.as_deref(), Some("PO"));
        assert_eq!(back.value(1, 1), &CellValue::Text("TITLE".into()));
        assert_eq!(back.value(2, 2), &CellValue::Number(1234.5));
        assert_eq!(back.value(4, 1), &CellValue::Bool(true));

        let style = back.style(2, 2).unwrap();
        assert!(style.font.bold);
        assert_eq!(style.font.size, Some(12.0));
        assert_eq!(style.font.name.as_deref(), Some("Arial"));
        assert_eq!(style.fill.pattern, FillPattern::Solid);
        assert_eq!(style.fill.fg_color, Some([255, 255, 0, 255]));
        assert_eq!(style.border.left.style, BorderStyle::Thin);
        assert_eq!(style.number_format, NumberFormat::Custom("#,##0.000".into()));
        assert_eq!(back.style(3, 3).unwrap().border.bottom.style, BorderStyle::Thin);

        assert_eq!(back.merged_regions(), &[MergedRegion::new(1, 1, 1, 3)]);
        assert_eq!(back.col_width(2).map(strip_excel_padding), Some(30.0));
        assert_eq!(back.row_height(1), Some(36.0));
        assert_eq!(back.page_setup, grid.page_setup);
        assert_eq!(back.print_title_rows, Some((1, 2)));
    }

    #[test]
    fn test_export_missing_image_is_missing_resource() {
        let mut grid = Grid::new();
        grid.set_value(1, 1, CellValue::Text("x".into()));
        grid.images.push(ImagePlacement {
            path: "/nonexistent/stamp.png".into(),
            row: 1,
            col: 5,
            width_px: 180,
            height_px: 126,
        });
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("img.xlsx");
        let err = export(&grid, &path).unwrap_err();
        assert!(matches!(err, SplitError::MissingResource(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_import_missing_file_is_io_error() {
        let err = import(Path::new("/nonexistent/po.xlsx")).unwrap_err();
        assert!(matches!(err, SplitError::Io(_)));
    }
}
