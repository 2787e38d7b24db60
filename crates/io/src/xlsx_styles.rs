//! XLSX part parser: resolves styles.xml into full cell styles, worksheet XML
//! into per-cell style ids plus layout and page setup, and workbook.xml into the
//! sheet list, active tab and print titles.
//!
//! calamine gives us values only; everything the splitter needs to preserve
//! visually comes from here.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;
use sheetcut_engine::cell::{
    Alignment, Border, BorderSide, BorderStyle, CellStyle, Fill, FillPattern, Font,
    HorizontalAlignment, NumberFormat, Protection, Rgba, Underline, VerticalAlignment,
};
use sheetcut_engine::grid::{letter_to_col, MergedRegion, PageMargins, PageSetup};
use zip::ZipArchive;

// =============================================================================
// Public types
// =============================================================================

/// Parsed style table from styles.xml: maps cellXfs index → CellStyle.
#[derive(Debug, Default)]
pub struct StyleTable {
    pub styles: Vec<CellStyle>,
}

impl StyleTable {
    pub fn get(&self, id: usize) -> Option<&CellStyle> {
        self.styles.get(id)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

/// Per-cell style references and layout extracted from a worksheet XML.
/// All rows and columns are 1-based.
#[derive(Debug, Default)]
pub struct SheetFormatting {
    /// (row, col, style_id) triples
    pub cell_styles: Vec<(u32, u32, usize)>,
    /// Column widths in raw Excel character-width units
    pub col_widths: HashMap<u32, f64>,
    /// Row heights in points
    pub row_heights: HashMap<u32, f64>,
    pub merged_regions: Vec<MergedRegion>,
    pub page_setup: PageSetup,
}

/// Sheet list and workbook-level settings from workbook.xml.
#[derive(Debug, Default)]
pub struct WorkbookInfo {
    /// (sheet name, relationship id) in workbook order
    pub sheets: Vec<(String, String)>,
    pub active_tab: usize,
    /// Print title rows keyed by sheet index
    pub print_titles: HashMap<usize, (u32, u32)>,
}

/// Everything the importer needs from the active worksheet.
#[derive(Debug)]
pub struct ActiveSheetParts {
    pub sheet_name: String,
    pub styles: StyleTable,
    pub formatting: SheetFormatting,
    pub print_titles: Option<(u32, u32)>,
    pub unsupported: Vec<String>,
}

// =============================================================================
// XML entity unescaping
// =============================================================================

/// Unescape the 5 predefined XML entities: &amp; &lt; &gt; &quot; &apos;
fn unescape_xml(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

// =============================================================================
// Indexed color palette (standard 64 Excel colors)
// =============================================================================

/// Standard Excel indexed color palette (RGBA).
fn indexed_color(idx: u8) -> Option<Rgba> {
    let rgb: [u8; 3] = match idx {
        0 | 8 => [0, 0, 0],
        1 | 9 => [255, 255, 255],
        2 | 10 => [255, 0, 0],
        3 | 11 => [0, 255, 0],
        4 | 12 => [0, 0, 255],
        5 | 13 => [255, 255, 0],
        6 | 14 => [255, 0, 255],
        7 | 15 => [0, 255, 255],
        16 => [128, 0, 0],
        17 => [0, 128, 0],
        18 => [0, 0, 128],
        19 => [128, 128, 0],
        20 => [128, 0, 128],
        21 => [0, 128, 128],
        22 => [192, 192, 192],
        23 => [128, 128, 128],
        24 => [153, 153, 255],
        25 => [153, 51, 102],
        26 => [255, 255, 204],
        27 => [204, 255, 255],
        28 => [102, 0, 102],
        29 => [255, 128, 128],
        30 => [0, 102, 204],
        31 => [204, 204, 255],
        32 => [0, 0, 128],
        33 => [255, 0, 255],
        34 => [255, 255, 0],
        35 => [0, 255, 255],
        36 => [128, 0, 128],
        37 => [128, 0, 0],
        38 => [0, 128, 128],
        39 => [0, 0, 255],
        40 => [0, 204, 255],
        41 => [204, 255, 255],
        42 => [204, 255, 204],
        43 => [255, 255, 153],
        44 => [153, 204, 255],
        45 => [255, 153, 204],
        46 => [204, 153, 255],
        47 => [255, 204, 153],
        48 => [51, 102, 255],
        49 => [51, 204, 204],
        50 => [153, 204, 0],
        51 => [255, 204, 0],
        52 => [255, 153, 0],
        53 => [255, 102, 0],
        54 => [102, 102, 153],
        55 => [150, 150, 150],
        56 => [0, 51, 102],
        57 => [51, 153, 102],
        58 => [0, 51, 0],
        59 => [51, 51, 0],
        60 => [153, 51, 0],
        61 => [153, 51, 51],
        62 => [51, 51, 153],
        63 => [51, 51, 51],
        // System foreground / background
        64 => [0, 0, 0],
        65 => [255, 255, 255],
        _ => return None,
    };
    Some([rgb[0], rgb[1], rgb[2], 255])
}

/// Flat theme color defaults (approximate, no tint math).
fn theme_color_default(idx: u8) -> Option<Rgba> {
    let rgb: [u8; 3] = match idx {
        0 => [255, 255, 255], // lt1
        1 => [0, 0, 0],       // dk1
        2 => [238, 236, 225], // lt2
        3 => [31, 73, 125],   // dk2
        4 => [79, 129, 189],
        5 => [192, 80, 77],
        6 => [155, 187, 89],
        7 => [128, 100, 162],
        8 => [75, 172, 198],
        9 => [247, 150, 70],
        _ => return None,
    };
    Some([rgb[0], rgb[1], rgb[2], 255])
}

// =============================================================================
// Attribute helpers
// =============================================================================

fn attr_str(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .map(|a| unescape_xml(&String::from_utf8_lossy(&a.value)))
}

fn attr_parse<T: std::str::FromStr>(e: &BytesStart, name: &[u8]) -> Option<T> {
    attr_str(e, name).and_then(|s| s.trim().parse().ok())
}

fn attr_bool(e: &BytesStart, name: &[u8]) -> Option<bool> {
    attr_str(e, name).map(|v| v == "1" || v == "true")
}

/// Toggle elements like `<b/>` are on unless they carry val="0"/"false".
fn toggle_on(e: &BytesStart) -> bool {
    attr_bool(e, b"val").unwrap_or(true)
}

/// Parse a color element (rgb, indexed, or theme). Prefers rgb > indexed > theme.
fn parse_color(e: &BytesStart, unsupported: &mut Vec<String>) -> Option<Rgba> {
    if let Some(hex) = attr_str(e, b"rgb") {
        return parse_argb_hex(&hex);
    }
    if let Some(idx) = attr_parse::<u8>(e, b"indexed") {
        return indexed_color(idx);
    }
    if let Some(idx) = attr_parse::<u8>(e, b"theme") {
        let color = theme_color_default(idx);
        if color.is_some() && !unsupported.iter().any(|s| s.starts_with("theme colors")) {
            unsupported.push("theme colors approximated".to_string());
        }
        return color;
    }
    None
}

/// Parse AARRGGBB (or RRGGBB) hex to RGBA.
fn parse_argb_hex(hex: &str) -> Option<Rgba> {
    let s = hex.trim_start_matches('#');
    let byte = |i: usize| u8::from_str_radix(s.get(i..i + 2)?, 16).ok();
    match s.len() {
        8 => Some([byte(2)?, byte(4)?, byte(6)?, byte(0)?]),
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 255]),
        _ => None,
    }
}

fn parse_underline(e: &BytesStart) -> Underline {
    match attr_str(e, b"val").as_deref() {
        None | Some("single") => Underline::Single,
        Some("double") => Underline::Double,
        Some("singleAccounting") => Underline::SingleAccounting,
        Some("doubleAccounting") => Underline::DoubleAccounting,
        _ => Underline::None,
    }
}

fn parse_horizontal(s: &str) -> HorizontalAlignment {
    match s {
        "left" => HorizontalAlignment::Left,
        "center" => HorizontalAlignment::Center,
        "right" => HorizontalAlignment::Right,
        "fill" => HorizontalAlignment::Fill,
        "justify" => HorizontalAlignment::Justify,
        "centerContinuous" => HorizontalAlignment::CenterContinuous,
        "distributed" => HorizontalAlignment::Distributed,
        _ => HorizontalAlignment::General,
    }
}

fn parse_vertical(s: &str) -> VerticalAlignment {
    match s {
        "top" => VerticalAlignment::Top,
        "center" => VerticalAlignment::Center,
        "justify" => VerticalAlignment::Justify,
        "distributed" => VerticalAlignment::Distributed,
        _ => VerticalAlignment::Bottom,
    }
}

// =============================================================================
// styles.xml parser
// =============================================================================

/// Parse styles.xml content into a StyleTable.
pub fn parse_styles_xml(xml: &str) -> (StyleTable, Vec<String>) {
    let mut unsupported: Vec<String> = Vec::new();

    let custom_num_fmts = parse_num_fmts(xml);
    let fonts = parse_fonts(xml, &mut unsupported);
    let fills = parse_fills(xml, &mut unsupported);
    let borders = parse_borders(xml, &mut unsupported);
    let styles = parse_cell_xfs(xml, &custom_num_fmts, &fonts, &fills, &borders);

    (StyleTable { styles }, unsupported)
}

/// Parse <numFmts> section → HashMap<formatId, formatCode>
fn parse_num_fmts(xml: &str) -> HashMap<u16, String> {
    let mut map = HashMap::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_num_fmts = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"numFmts" => in_num_fmts = true,
            Ok(Event::End(ref e)) if e.name().as_ref() == b"numFmts" => break,
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if in_num_fmts && e.name().as_ref() == b"numFmt" =>
            {
                if let (Some(id), Some(code)) = (attr_parse::<u16>(e, b"numFmtId"), attr_str(e, b"formatCode")) {
                    map.insert(id, code);
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    map
}

/// Parse <fonts> section.
fn parse_fonts(xml: &str, unsupported: &mut Vec<String>) -> Vec<Font> {
    let mut fonts = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut depth = 0; // 0 = outside, 1 = inside <fonts>, 2 = inside <font>
    let mut current = Font::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"fonts" if depth == 0 => depth = 1,
                b"font" if depth == 1 => {
                    depth = 2;
                    current = Font::default();
                }
                b"color" if depth == 2 => current.color = parse_color(e, unsupported),
                _ => {}
            },
            Ok(Event::Empty(ref e)) if depth == 2 => match e.name().as_ref() {
                b"b" => current.bold = toggle_on(e),
                b"i" => current.italic = toggle_on(e),
                b"u" => current.underline = parse_underline(e),
                b"strike" => current.strikethrough = toggle_on(e),
                b"sz" => current.size = attr_parse(e, b"val"),
                b"color" => current.color = parse_color(e, unsupported),
                b"name" | b"rFont" => current.name = attr_str(e, b"val"),
                _ => {}
            },
            Ok(Event::Empty(ref e)) if depth == 1 && e.name().as_ref() == b"font" => {
                fonts.push(Font::default());
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"font" if depth == 2 => {
                    fonts.push(std::mem::take(&mut current));
                    depth = 1;
                }
                b"fonts" if depth == 1 => break,
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    fonts
}

/// Parse <fills> section.
fn parse_fills(xml: &str, unsupported: &mut Vec<String>) -> Vec<Fill> {
    let mut fills = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut depth = 0; // 0 = outside, 1 = inside <fills>, 2 = inside <fill>
    let mut in_pattern_fill = false;
    let mut current = Fill::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"fills" if depth == 0 => depth = 1,
                b"fill" if depth == 1 => {
                    depth = 2;
                    current = Fill::default();
                }
                b"patternFill" if depth == 2 => {
                    in_pattern_fill = true;
                    current.pattern = attr_str(e, b"patternType")
                        .map(|p| FillPattern::from_ooxml(&p))
                        .unwrap_or_default();
                }
                b"gradientFill" if depth == 2 => {
                    if !unsupported.iter().any(|s| s.starts_with("gradient fills")) {
                        unsupported.push("gradient fills".to_string());
                    }
                }
                b"fgColor" if in_pattern_fill => current.fg_color = parse_color(e, unsupported),
                b"bgColor" if in_pattern_fill => current.bg_color = parse_color(e, unsupported),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"patternFill" if depth == 2 => {
                    current.pattern = attr_str(e, b"patternType")
                        .map(|p| FillPattern::from_ooxml(&p))
                        .unwrap_or_default();
                }
                b"fgColor" if in_pattern_fill => current.fg_color = parse_color(e, unsupported),
                b"bgColor" if in_pattern_fill => current.bg_color = parse_color(e, unsupported),
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"patternFill" => in_pattern_fill = false,
                b"fill" if depth == 2 => {
                    fills.push(std::mem::take(&mut current));
                    depth = 1;
                    in_pattern_fill = false;
                }
                b"fills" if depth == 1 => break,
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    fills
}

fn set_side(border: &mut Border, side: &[u8], value: BorderSide) {
    match side {
        b"left" => border.left = value,
        b"right" => border.right = value,
        b"top" => border.top = value,
        b"bottom" => border.bottom = value,
        _ => {}
    }
}

/// Parse <borders> section.
fn parse_borders(xml: &str, unsupported: &mut Vec<String>) -> Vec<Border> {
    let mut borders = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut depth = 0; // 0 = outside, 1 = inside <borders>, 2 = inside <border>
    let mut current = Border::default();
    let mut current_side: Option<Vec<u8>> = None;
    let mut side = BorderSide::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                match name.as_ref() {
                    b"borders" if depth == 0 => depth = 1,
                    b"border" if depth == 1 => {
                        depth = 2;
                        current = Border::default();
                    }
                    b"left" | b"right" | b"top" | b"bottom" if depth == 2 => {
                        current_side = Some(name.as_ref().to_vec());
                        side = BorderSide {
                            style: attr_str(e, b"style")
                                .map(|s| BorderStyle::from_ooxml(&s))
                                .unwrap_or_default(),
                            color: None,
                        };
                    }
                    b"diagonal" if depth == 2 => {
                        if attr_str(e, b"style").is_some()
                            && !unsupported.iter().any(|s| s.starts_with("diagonal borders"))
                        {
                            unsupported.push("diagonal borders".to_string());
                        }
                    }
                    b"color" if current_side.is_some() => side.color = parse_color(e, unsupported),
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                match name.as_ref() {
                    b"left" | b"right" | b"top" | b"bottom" if depth == 2 => {
                        let style = attr_str(e, b"style")
                            .map(|s| BorderStyle::from_ooxml(&s))
                            .unwrap_or_default();
                        set_side(&mut current, name.as_ref(), BorderSide { style, color: None });
                    }
                    b"color" if current_side.is_some() => side.color = parse_color(e, unsupported),
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"left" | b"right" | b"top" | b"bottom" if depth == 2 => {
                    if let Some(name) = current_side.take() {
                        set_side(&mut current, &name, side);
                    }
                    side = BorderSide::default();
                }
                b"border" if depth == 2 => {
                    borders.push(std::mem::take(&mut current));
                    depth = 1;
                }
                b"borders" if depth == 1 => break,
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    borders
}

#[derive(Debug, Default)]
struct XfEntry {
    num_fmt_id: Option<u16>,
    font_id: Option<usize>,
    fill_id: Option<usize>,
    border_id: Option<usize>,
    alignment: Alignment,
    protection: Protection,
}

impl XfEntry {
    fn from_attrs(e: &BytesStart) -> Self {
        Self {
            num_fmt_id: attr_parse(e, b"numFmtId"),
            font_id: attr_parse(e, b"fontId"),
            fill_id: attr_parse(e, b"fillId"),
            border_id: attr_parse(e, b"borderId"),
            ..Self::default()
        }
    }

    fn read_alignment(&mut self, e: &BytesStart) {
        let a = &mut self.alignment;
        if let Some(h) = attr_str(e, b"horizontal") {
            a.horizontal = parse_horizontal(&h);
        }
        if let Some(v) = attr_str(e, b"vertical") {
            a.vertical = parse_vertical(&v);
        }
        a.wrap_text = attr_bool(e, b"wrapText").unwrap_or(false);
        a.shrink_to_fit = attr_bool(e, b"shrinkToFit").unwrap_or(false);
        a.indent = attr_parse(e, b"indent").unwrap_or(0);
        a.rotation = attr_parse(e, b"textRotation").unwrap_or(0);
    }

    fn read_protection(&mut self, e: &BytesStart) {
        if let Some(locked) = attr_bool(e, b"locked") {
            self.protection.locked = locked;
        }
        if let Some(hidden) = attr_bool(e, b"hidden") {
            self.protection.hidden = hidden;
        }
    }
}

/// Parse <cellXfs> and resolve each <xf> into a CellStyle.
fn parse_cell_xfs(
    xml: &str,
    custom_num_fmts: &HashMap<u16, String>,
    fonts: &[Font],
    fills: &[Fill],
    borders: &[Border],
) -> Vec<CellStyle> {
    let mut styles = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_cell_xfs = false;
    let mut current: Option<XfEntry> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"cellXfs" => in_cell_xfs = true,
                b"xf" if in_cell_xfs => current = Some(XfEntry::from_attrs(e)),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                // Self-closing <xf .../>
                b"xf" if in_cell_xfs => {
                    let xf = XfEntry::from_attrs(e);
                    styles.push(resolve_xf(&xf, custom_num_fmts, fonts, fills, borders));
                }
                b"alignment" => {
                    if let Some(xf) = current.as_mut() {
                        xf.read_alignment(e);
                    }
                }
                b"protection" => {
                    if let Some(xf) = current.as_mut() {
                        xf.read_protection(e);
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"xf" => {
                    if let Some(xf) = current.take() {
                        styles.push(resolve_xf(&xf, custom_num_fmts, fonts, fills, borders));
                    }
                }
                b"cellXfs" => break,
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    styles
}

/// Resolve an XfEntry into a CellStyle using the parsed component tables.
fn resolve_xf(
    xf: &XfEntry,
    custom_num_fmts: &HashMap<u16, String>,
    fonts: &[Font],
    fills: &[Fill],
    borders: &[Border],
) -> CellStyle {
    let number_format = match xf.num_fmt_id {
        None | Some(0) => NumberFormat::General,
        Some(id) => match custom_num_fmts.get(&id) {
            Some(code) => NumberFormat::Custom(code.clone()),
            None => u8::try_from(id).map(NumberFormat::Builtin).unwrap_or_default(),
        },
    };

    CellStyle {
        font: xf.font_id.and_then(|i| fonts.get(i)).cloned().unwrap_or_default(),
        fill: xf.fill_id.and_then(|i| fills.get(i)).cloned().unwrap_or_default(),
        border: xf.border_id.and_then(|i| borders.get(i)).cloned().unwrap_or_default(),
        number_format,
        protection: xf.protection.clone(),
        alignment: xf.alignment.clone(),
    }
}

// =============================================================================
// Worksheet XML parser: per-cell style IDs, layout, page setup
// =============================================================================

/// Parse a worksheet XML to extract per-cell style IDs, layout dimensions and
/// page setup.
pub fn parse_sheet_formatting(xml: &str) -> SheetFormatting {
    let mut sf = SheetFormatting::default();
    let mut fit_to_page = false;
    let mut fit = (1u16, 1u16);

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"row" => {
                    if let (Some(row), Some(height)) = (attr_parse::<u32>(e, b"r"), attr_parse::<f64>(e, b"ht")) {
                        sf.row_heights.insert(row, height);
                    }
                }
                b"c" => {
                    // s="0" is the default style; skip it
                    let style_id: Option<usize> = attr_parse(e, b"s");
                    if let (Some(style_id), Some(cell_ref)) = (style_id, attr_str(e, b"r")) {
                        if style_id > 0 {
                            if let Some((row, col)) = parse_cell_ref(&cell_ref) {
                                sf.cell_styles.push((row, col, style_id));
                            }
                        }
                    }
                }
                b"col" => {
                    let min: Option<u32> = attr_parse(e, b"min");
                    let max: Option<u32> = attr_parse(e, b"max");
                    let width: Option<f64> = attr_parse(e, b"width");
                    if let (Some(min), Some(max), Some(w)) = (min, max, width) {
                        // Guard against whole-sheet <col min="1" max="16384">
                        for col in min..=max.min(min + 1024) {
                            sf.col_widths.insert(col, w);
                        }
                    }
                }
                b"mergeCell" => {
                    if let Some(region) = attr_str(e, b"ref").and_then(|r| parse_merge_ref(&r)) {
                        sf.merged_regions.push(region);
                    }
                }
                b"pageSetUpPr" => fit_to_page = attr_bool(e, b"fitToPage").unwrap_or(false),
                b"pageMargins" => {
                    let d = PageMargins::default();
                    sf.page_setup.margins = PageMargins {
                        left: attr_parse(e, b"left").unwrap_or(d.left),
                        right: attr_parse(e, b"right").unwrap_or(d.right),
                        top: attr_parse(e, b"top").unwrap_or(d.top),
                        bottom: attr_parse(e, b"bottom").unwrap_or(d.bottom),
                        header: attr_parse(e, b"header").unwrap_or(d.header),
                        footer: attr_parse(e, b"footer").unwrap_or(d.footer),
                    };
                }
                b"pageSetup" => {
                    sf.page_setup.paper_size = attr_parse(e, b"paperSize").unwrap_or(0);
                    sf.page_setup.landscape = attr_str(e, b"orientation").as_deref() == Some("landscape");
                    fit = (
                        attr_parse(e, b"fitToWidth").unwrap_or(1),
                        attr_parse(e, b"fitToHeight").unwrap_or(1),
                    );
                }
                b"printOptions" => {
                    sf.page_setup.center_horizontally = attr_bool(e, b"horizontalCentered").unwrap_or(false);
                    sf.page_setup.center_vertically = attr_bool(e, b"verticalCentered").unwrap_or(false);
                }
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    if fit_to_page {
        sf.page_setup.fit_to_pages = Some(fit);
    }
    sf
}

/// Parse a merge range reference like "A1:C3" (1-based).
pub fn parse_merge_ref(r: &str) -> Option<MergedRegion> {
    let (start, end) = r.split_once(':')?;
    let (sr, sc) = parse_cell_ref(start)?;
    let (er, ec) = parse_cell_ref(end)?;
    Some(MergedRegion::new(sr, sc, er, ec))
}

/// Parse a cell reference like "B5" into 1-based (row, col) = (5, 2).
fn parse_cell_ref(r: &str) -> Option<(u32, u32)> {
    let r = r.replace('$', "");
    let split = r.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = r.split_at(split);
    let col = letter_to_col(letters)?;
    let row: u32 = digits.parse().ok()?;
    (row > 0).then_some((row, col))
}

// =============================================================================
// workbook.xml / rels parsers
// =============================================================================

/// Parse workbook.xml: sheets in order, active tab, print titles.
pub fn parse_workbook_xml(xml: &str) -> WorkbookInfo {
    let mut info = WorkbookInfo::default();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut print_titles_sheet: Option<usize> = None;
    let mut defined_text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"sheet" => {
                    if let (Some(name), Some(rid)) = (attr_str(e, b"name"), attr_str(e, b"r:id")) {
                        info.sheets.push((name, rid));
                    }
                }
                b"workbookView" => info.active_tab = attr_parse(e, b"activeTab").unwrap_or(0),
                b"definedName" => {
                    if attr_str(e, b"name").as_deref() == Some("_xlnm.Print_Titles") {
                        print_titles_sheet = Some(attr_parse(e, b"localSheetId").unwrap_or(0));
                        defined_text.clear();
                    }
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) if print_titles_sheet.is_some() => {
                defined_text.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"definedName" => {
                if let Some(sheet) = print_titles_sheet.take() {
                    if let Some(rows) = parse_print_title_rows(&unescape_xml(&defined_text)) {
                        info.print_titles.insert(sheet, rows);
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    info
}

/// Extract the row range from a print titles formula like `Sheet1!$1:$5`
/// (a column range may precede or follow it, separated by a comma).
pub fn parse_print_title_rows(formula: &str) -> Option<(u32, u32)> {
    formula.split(',').find_map(|part| {
        let range = part.rsplit('!').next()?;
        let (a, b) = range.split_once(':')?;
        let a: u32 = a.trim_start_matches('$').parse().ok()?;
        let b: u32 = b.trim_start_matches('$').parse().ok()?;
        Some((a.min(b), a.max(b)))
    })
}

/// Parse a .rels file into Id → Target.
fn parse_rels(xml: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr_str(e, b"Id"), attr_str(e, b"Target")) {
                    map.insert(id, target);
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    map
}

/// Zip path of a workbook relationship target ("worksheets/sheet1.xml" or "/xl/worksheets/sheet1.xml").
fn worksheet_zip_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

// =============================================================================
// Top-level entry point
// =============================================================================

/// Read styles, layout and workbook settings for the active sheet of an XLSX file.
pub fn read_active_sheet_parts(path: &Path) -> Result<ActiveSheetParts, String> {
    let file = std::fs::File::open(path)
        .map_err(|e| format!("Failed to open XLSX file for styles: {}", e))?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| format!("Failed to read XLSX as ZIP for styles: {}", e))?;

    let workbook_xml = read_zip_file(&mut archive, "xl/workbook.xml")?;
    let info = parse_workbook_xml(&workbook_xml);
    let active = if info.active_tab < info.sheets.len() { info.active_tab } else { 0 };
    let (sheet_name, rid) = info
        .sheets
        .get(active)
        .cloned()
        .ok_or_else(|| "Excel file contains no sheets".to_string())?;

    let rels_xml = read_zip_file(&mut archive, "xl/_rels/workbook.xml.rels").unwrap_or_default();
    let sheet_path = parse_rels(&rels_xml)
        .get(&rid)
        .map(|t| worksheet_zip_path(t))
        .ok_or_else(|| format!("No worksheet part for sheet '{}'", sheet_name))?;

    let (styles, unsupported) = match read_zip_file(&mut archive, "xl/styles.xml") {
        Ok(xml) => parse_styles_xml(&xml),
        Err(_) => (StyleTable::default(), Vec::new()),
    };
    let formatting = parse_sheet_formatting(&read_zip_file(&mut archive, &sheet_path)?);

    Ok(ActiveSheetParts {
        sheet_name,
        styles,
        formatting,
        print_titles: info.print_titles.get(&active).copied(),
        unsupported,
    })
}

/// Read a file from a ZIP archive.
fn read_zip_file<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String, String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| format!("File '{}' not found in XLSX: {}", path, e))?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| format!("Failed to read '{}': {}", path, e))?;
    Ok(content)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_argb_hex() {
        assert_eq!(parse_argb_hex("FF0000FF"), Some([0, 0, 255, 255]));
        assert_eq!(parse_argb_hex("FF0000"), Some([255, 0, 0, 255]));
        assert_eq!(parse_argb_hex("80FF0000"), Some([255, 0, 0, 128]));
        assert_eq!(parse_argb_hex("F00"), None);
    }

    #[test]
    fn test_indexed_color() {
        assert_eq!(indexed_color(0), Some([0, 0, 0, 255]));
        assert_eq!(indexed_color(2), Some([255, 0, 0, 255]));
        assert_eq!(indexed_color(99), None);
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1"), Some((1, 1)));
        assert_eq!(parse_cell_ref("B5"), Some((5, 2)));
        assert_eq!(parse_cell_ref("AA1"), Some((1, 27)));
        assert_eq!(parse_cell_ref("$C$7"), Some((7, 3)));
        assert_eq!(parse_cell_ref("A0"), None);
        assert_eq!(parse_merge_ref("D1:I1"), Some(MergedRegion::new(1, 4, 1, 9)));
    }

    #[test]
    fn test_print_title_rows() {
        assert_eq!(parse_print_title_rows("Sheet1!$1:$5"), Some((1, 5)));
        assert_eq!(parse_print_title_rows("'My Sheet'!$A:$B,'My Sheet'!$2:$4"), Some((2, 4)));
        assert_eq!(parse_print_title_rows("Sheet1!$A:$B"), None);
    }

    #[test]
    fn test_parse_styles_xml() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="1"><numFmt numFmtId="164" formatCode="&quot;$&quot;#,##0.00"/></numFmts>
  <fonts count="2">
    <font><sz val="11"/><name val="Calibri"/></font>
    <font><b/><i val="0"/><u val="double"/><sz val="14"/><color rgb="FFFF0000"/><name val="Arial"/></font>
  </fonts>
  <fills count="3">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
    <fill><patternFill patternType="solid"><fgColor rgb="FFFFFF00"/><bgColor indexed="64"/></patternFill></fill>
  </fills>
  <borders count="2">
    <border><left/><right/><top/><bottom/><diagonal/></border>
    <border><left style="thin"><color indexed="64"/></left><right style="mediumDashed"/><top style="hair"/><bottom style="double"><color rgb="FF0000FF"/></bottom></border>
  </borders>
  <cellXfs count="4">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
    <xf numFmtId="164" fontId="1" fillId="2" borderId="1" applyFont="1">
      <alignment horizontal="centerContinuous" vertical="center" wrapText="1" indent="2" textRotation="45"/>
      <protection locked="0" hidden="1"/>
    </xf>
    <xf numFmtId="14" fontId="0" fillId="0" borderId="0"/>
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"><alignment shrinkToFit="1"/></xf>
  </cellXfs>
</styleSheet>"#;

        let (table, _unsupported) = parse_styles_xml(xml);
        assert_eq!(table.len(), 4);

        let s0 = table.get(0).unwrap();
        assert_eq!(s0.font.size, Some(11.0));
        assert_eq!(s0.font.name.as_deref(), Some("Calibri"));
        assert!(s0.protection.locked);

        let s1 = table.get(1).unwrap();
        assert!(s1.font.bold);
        assert!(!s1.font.italic);
        assert_eq!(s1.font.underline, Underline::Double);
        assert_eq!(s1.font.color, Some([255, 0, 0, 255]));
        assert_eq!(s1.fill.pattern, FillPattern::Solid);
        assert_eq!(s1.fill.fg_color, Some([255, 255, 0, 255]));
        assert_eq!(s1.border.left, BorderSide { style: BorderStyle::Thin, color: Some([0, 0, 0, 255]) });
        assert_eq!(s1.border.right.style, BorderStyle::MediumDashed);
        assert_eq!(s1.border.top.style, BorderStyle::Hair);
        assert_eq!(s1.border.bottom.color, Some([0, 0, 255, 255]));
        assert_eq!(s1.number_format, NumberFormat::Custom("\"$\"#,##0.00".into()));
        assert_eq!(s1.alignment.horizontal, HorizontalAlignment::CenterContinuous);
        assert_eq!(s1.alignment.vertical, VerticalAlignment::Center);
        assert!(s1.alignment.wrap_text);
        assert_eq!(s1.alignment.indent, 2);
        assert_eq!(s1.alignment.rotation, 45);
        assert!(!s1.protection.locked && s1.protection.hidden);

        assert_eq!(table.get(2).unwrap().number_format, NumberFormat::Builtin(14));
        assert!(table.get(3).unwrap().alignment.shrink_to_fit);
    }

    #[test]
    fn test_parse_sheet_formatting() {
        let xml = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetPr><pageSetUpPr fitToPage="1"/></sheetPr>
  <cols><col min="1" max="2" width="12.7109375" customWidth="1"/><col min="4" max="4" width="30"/></cols>
  <sheetData>
    <row r="1" ht="36" customHeight="1"><c r="A1" s="3" t="s"><v>0</v></c><c r="B1" s="0"/></row>
    <row r="2"><c r="C2" s="1"><v>5</v></c></row>
  </sheetData>
  <mergeCells count="1"><mergeCell ref="A1:C1"/></mergeCells>
  <printOptions horizontalCentered="1"/>
  <pageMargins left="0" right="0" top="0" bottom="0" header="0.28" footer="0.12"/>
  <pageSetup paperSize="9" orientation="portrait" fitToHeight="0"/>
</worksheet>"#;
        let sf = parse_sheet_formatting(xml);
        assert_eq!(sf.cell_styles, vec![(1, 1, 3), (2, 3, 1)]);
        assert_eq!(sf.col_widths.get(&2), Some(&12.7109375));
        assert_eq!(sf.col_widths.get(&4), Some(&30.0));
        assert_eq!(sf.row_heights.get(&1), Some(&36.0));
        assert_eq!(sf.merged_regions, vec![MergedRegion::new(1, 1, 1, 3)]);
        assert_eq!(sf.page_setup.paper_size, 9);
        assert_eq!(sf.page_setup.fit_to_pages, Some((1, 0)));
        assert!(sf.page_setup.center_horizontally);
        assert_eq!(sf.page_setup.margins.header, 0.28);
        assert_eq!(sf.page_setup.margins.left, 0.0);
    }

    #[test]
    fn test_parse_workbook_xml() {
        let xml = r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <bookViews><workbookView activeTab="1"/></bookViews>
  <sheets><sheet name="Notes" sheetId="1" r:id="rId1"/><sheet name="PO" sheetId="2" r:id="rId2"/></sheets>
  <definedNames><definedName name="_xlnm.Print_Titles" localSheetId="1">PO!$1:$4</definedName></definedNames>
</workbook>"#;
        let info = parse_workbook_xml(xml);
        assert_eq!(info.sheets.len(), 2);
        assert_eq!(info.active_tab, 1);
        assert_eq!(info.print_titles.get(&1), Some(&(1, 4)));
        assert_eq!(worksheet_zip_path("worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
        assert_eq!(worksheet_zip_path("/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
    }
}
