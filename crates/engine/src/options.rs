// Tunables for the splitter. Defaults reproduce the purchase-order layout the
// tool was built for; the config crate maps its [split] section onto these.

use serde::{Deserialize, Serialize};

use crate::grid::{PageMargins, PageSetup};

/// What to do when a later table's first item (last item + 1) can't be found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContinuationPolicy {
    /// Start data right below the company header row.
    #[default]
    HeaderStart,
    /// Start data right below the table's own ITEM NO. row.
    HeaderEnd,
    /// Fail the split.
    Strict,
}

impl std::str::FromStr for ContinuationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "header-start" => Ok(Self::HeaderStart),
            "header-end" => Ok(Self::HeaderEnd),
            "strict" => Ok(Self::Strict),
            other => Err(format!(
                "unknown continuation policy '{other}' (expected header-start, header-end or strict)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keywords {
    /// Short company marker on the header start row
    pub company_marker: String,
    /// Full company name expected on the row after the marker
    pub company_name: String,
    /// Every one of these must appear on a header end row
    pub header_end: Vec<String>,
    /// Identifies the item number column
    pub item_marker: String,
    /// Identifies the footer row that closes the data region
    pub footer_marker: String,
    /// Footer label whose cell and amount get bolded
    pub footer_highlight: String,
}

impl Default for Keywords {
    fn default() -> Self {
        Self {
            company_marker: "P&G".into(),
            company_name: "PROCTER & GAMBLE (GUANGZHOU) LTD.".into(),
            header_end: vec!["ITEM NO.".into(), "DESCRIPTION".into()],
            item_marker: "ITEM NO".into(),
            footer_marker: "TOTAL".into(),
            footer_highlight: "TOTAL DAP".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Added to the font size of every valued cell in output row 1
    pub title_font_delta: f64,
    /// Font size assumed when a style leaves it unset
    pub default_font_size: f64,
    /// Height of output row 1, in points
    pub title_row_height: f64,
    pub page: PageSetup,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            title_font_delta: 9.0,
            default_font_size: 11.0,
            title_row_height: 36.0,
            page: PageSetup {
                paper_size: 9,
                landscape: false,
                fit_to_pages: Some((1, 0)),
                center_horizontally: true,
                center_vertically: false,
                margins: PageMargins {
                    left: 0.0,
                    right: 0.0,
                    top: 0.0,
                    bottom: 0.0,
                    header: 0.28,
                    footer: 0.12,
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitOptions {
    /// Number of bottom rows searched for the highlighted footer
    pub footer_window: u32,
    pub continuation: ContinuationPolicy,
    pub keywords: Keywords,
    pub layout: LayoutOptions,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            footer_window: 15,
            continuation: ContinuationPolicy::default(),
            keywords: Keywords::default(),
            layout: LayoutOptions::default(),
        }
    }
}
