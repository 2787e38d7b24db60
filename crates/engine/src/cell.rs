use serde::{Deserialize, Serialize};

/// RGBA color as stored in styles.xml (alpha is kept but ignored on export).
pub type Rgba = [u8; 4];

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum HorizontalAlignment {
    #[default]
    General,
    Left,
    Center,
    Right,
    Fill,
    Justify,
    CenterContinuous,
    Distributed,
}

/// Vertical text alignment (Excel's implicit default is bottom)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum VerticalAlignment {
    Top,
    Center,
    #[default]
    Bottom,
    Justify,
    Distributed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Alignment {
    pub horizontal: HorizontalAlignment,
    pub vertical: VerticalAlignment,
    pub wrap_text: bool,
    pub shrink_to_fit: bool,
    pub indent: u8,
    /// Text rotation in degrees as written in the file (0-180, or 255 for stacked)
    pub rotation: i16,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Underline {
    #[default]
    None,
    Single,
    Double,
    SingleAccounting,
    DoubleAccounting,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Font {
    /// None = workbook default (Calibri)
    pub name: Option<String>,
    /// Point size, None = workbook default (11pt)
    pub size: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    pub underline: Underline,
    pub strikethrough: bool,
    pub color: Option<Rgba>,
}

impl Font {
    /// Effective point size, falling back to `default` when the style leaves it unset.
    pub fn size_or(&self, default: f64) -> f64 {
        self.size.unwrap_or(default)
    }
}

/// Fill pattern names from the OOXML `patternType` attribute
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum FillPattern {
    #[default]
    None,
    Solid,
    MediumGray,
    DarkGray,
    LightGray,
    DarkHorizontal,
    DarkVertical,
    DarkDown,
    DarkUp,
    DarkGrid,
    DarkTrellis,
    LightHorizontal,
    LightVertical,
    LightDown,
    LightUp,
    LightGrid,
    LightTrellis,
    Gray125,
    Gray0625,
}

impl FillPattern {
    pub fn from_ooxml(name: &str) -> Self {
        match name {
            "solid" => FillPattern::Solid,
            "mediumGray" => FillPattern::MediumGray,
            "darkGray" => FillPattern::DarkGray,
            "lightGray" => FillPattern::LightGray,
            "darkHorizontal" => FillPattern::DarkHorizontal,
            "darkVertical" => FillPattern::DarkVertical,
            "darkDown" => FillPattern::DarkDown,
            "darkUp" => FillPattern::DarkUp,
            "darkGrid" => FillPattern::DarkGrid,
            "darkTrellis" => FillPattern::DarkTrellis,
            "lightHorizontal" => FillPattern::LightHorizontal,
            "lightVertical" => FillPattern::LightVertical,
            "lightDown" => FillPattern::LightDown,
            "lightUp" => FillPattern::LightUp,
            "lightGrid" => FillPattern::LightGrid,
            "lightTrellis" => FillPattern::LightTrellis,
            "gray125" => FillPattern::Gray125,
            "gray0625" => FillPattern::Gray0625,
            _ => FillPattern::None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Fill {
    pub pattern: FillPattern,
    /// Pattern foreground; for solid fills this is the visible cell color
    pub fg_color: Option<Rgba>,
    pub bg_color: Option<Rgba>,
}

/// Border line styles (the full OOXML set)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum BorderStyle {
    #[default]
    None,
    Thin,
    Medium,
    Dashed,
    Dotted,
    Thick,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

impl BorderStyle {
    pub fn from_ooxml(name: &str) -> Self {
        match name {
            "thin" => BorderStyle::Thin,
            "medium" => BorderStyle::Medium,
            "dashed" => BorderStyle::Dashed,
            "dotted" => BorderStyle::Dotted,
            "thick" => BorderStyle::Thick,
            "double" => BorderStyle::Double,
            "hair" => BorderStyle::Hair,
            "mediumDashed" => BorderStyle::MediumDashed,
            "dashDot" => BorderStyle::DashDot,
            "mediumDashDot" => BorderStyle::MediumDashDot,
            "dashDotDot" => BorderStyle::DashDotDot,
            "mediumDashDotDot" => BorderStyle::MediumDashDotDot,
            "slantDashDot" => BorderStyle::SlantDashDot,
            _ => BorderStyle::None,
        }
    }
}

/// One edge of a cell border
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct BorderSide {
    pub style: BorderStyle,
    pub color: Option<Rgba>,
}

impl BorderSide {
    pub fn thin() -> Self {
        Self { style: BorderStyle::Thin, color: None }
    }

    pub fn is_set(&self) -> bool {
        self.style != BorderStyle::None
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Border {
    pub left: BorderSide,
    pub right: BorderSide,
    pub top: BorderSide,
    pub bottom: BorderSide,
}

impl Border {
    pub fn all(side: BorderSide) -> Self {
        Self { left: side, right: side, top: side, bottom: side }
    }
}

/// Number format: either one of Excel's built-in ids or a custom format code
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub enum NumberFormat {
    #[default]
    General,
    Builtin(u8),
    Custom(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Protection {
    pub locked: bool,
    pub hidden: bool,
}

impl Default for Protection {
    fn default() -> Self {
        // Excel cells are locked unless a style says otherwise
        Self { locked: true, hidden: false }
    }
}

/// The full style bundle carried by every cell
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CellStyle {
    pub font: Font,
    pub fill: Fill,
    pub border: Border,
    pub number_format: NumberFormat,
    pub protection: Protection,
    pub alignment: Alignment,
}

impl CellStyle {
    pub fn is_default(&self) -> bool {
        *self == CellStyle::default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Loose truthiness used by the header fallback rules: empty, blank text,
    /// zero and `false` all count as "nothing here".
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Text(s) => !s.is_empty(),
            CellValue::Number(n) => *n != 0.0,
            CellValue::Bool(b) => *b,
        }
    }

    /// Plain display text: whole numbers print without a fraction.
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        }
    }

    /// Integer reading of an item number: numbers truncate, text must parse.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(n.trunc() as i64),
            CellValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub style: CellStyle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_whole_numbers() {
        assert_eq!(CellValue::Number(20.0).display(), "20");
        assert_eq!(CellValue::Number(2.5).display(), "2.5");
        assert_eq!(CellValue::Bool(true).display(), "TRUE");
        assert_eq!(CellValue::Empty.display(), "");
    }

    #[test]
    fn test_truthiness() {
        assert!(!CellValue::Empty.is_truthy());
        assert!(!CellValue::Text(String::new()).is_truthy());
        assert!(!CellValue::Number(0.0).is_truthy());
        assert!(CellValue::Text("P&G".into()).is_truthy());
        assert!(CellValue::Number(3.0).is_truthy());
    }

    #[test]
    fn test_as_integer() {
        assert_eq!(CellValue::Number(20.0).as_integer(), Some(20));
        assert_eq!(CellValue::Number(20.7).as_integer(), Some(20));
        assert_eq!(CellValue::Text(" 21 ".into()).as_integer(), Some(21));
        assert_eq!(CellValue::Text("n/a".into()).as_integer(), None);
        assert_eq!(CellValue::Empty.as_integer(), None);
    }

    #[test]
    fn test_default_style_is_locked() {
        let style = CellStyle::default();
        assert!(style.protection.locked);
        assert!(style.is_default());
    }

    #[test]
    fn test_ooxml_names() {
        assert_eq!(BorderStyle::from_ooxml("mediumDashDot"), BorderStyle::MediumDashDot);
        assert_eq!(BorderStyle::from_ooxml("bogus"), BorderStyle::None);
        assert_eq!(FillPattern::from_ooxml("solid"), FillPattern::Solid);
        assert_eq!(FillPattern::from_ooxml("gray125"), FillPattern::Gray125);
    }
}
