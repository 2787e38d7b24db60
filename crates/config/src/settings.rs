// User settings (TOML)

use serde::{Deserialize, Serialize};
use sheetcut_engine::SplitOptions;
use sheetcut_io::{StampOptions, TitleOptions};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StampSettings {
    /// Stamp picture; None disables stamping unless --stamp is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
    #[serde(flatten)]
    pub placement: StampOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub split: SplitOptions,
    pub titles: TitleOptions,
    pub stamp: StampSettings,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sheetcut");
        config_dir.join("settings.toml")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file();
            return settings;
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_toml(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    eprintln!("Error parsing settings.toml: {}", e);
                    eprintln!("Using default settings");
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Error reading settings.toml: {}", e);
                Self::default()
            }
        }
    }

    /// Load an explicitly named settings file. Unlike `load`, errors are returned.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Error reading {}: {}", path.display(), e))?;
        Self::from_toml(&contents).map_err(|e| format!("Error parsing {}: {}", path.display(), e))
    }

    pub fn from_toml(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| e.to_string())
    }

    /// Create default settings file with comments
    fn create_default_file(&self) {
        let path = Self::config_path();

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Error creating config directory: {}", e);
                return;
            }
        }

        if let Err(e) = fs::write(&path, DEFAULT_SETTINGS) {
            eprintln!("Error writing default settings.toml: {}", e);
        }
    }

    /// Get the config file path for display/opening
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}

const DEFAULT_SETTINGS: &str = r#"# sheetcut settings
# Every key is optional; missing keys use the values shown here.

[split]
# Bottom rows searched for the TOTAL DAP footer
footer_window = 15
# When a continued table's next item number is missing:
# "header-start" (data below the company header), "header-end" (below ITEM NO.), "strict" (fail)
continuation = "header-start"

[split.keywords]
company_marker = "P&G"
company_name = "PROCTER & GAMBLE (GUANGZHOU) LTD."
header_end = ["ITEM NO.", "DESCRIPTION"]
item_marker = "ITEM NO"
footer_marker = "TOTAL"
footer_highlight = "TOTAL DAP"

[split.layout]
title_font_delta = 9.0
default_font_size = 11.0
title_row_height = 36.0

[split.layout.page]
# 9 = A4
paper_size = 9
landscape = false
# [pages wide, pages tall]; 0 = as many as needed
fit_to_pages = [1, 0]
center_horizontally = true
center_vertically = false

[split.layout.page.margins]
left = 0.0
right = 0.0
top = 0.0
bottom = 0.0
header = 0.28
footer = 0.12

[titles]
scan_rows = 20
start_markers = ["P&G", "PROCTER & GAMBLE"]
end_marker = "ITEM NO"
extra_rows = 0

[stamp]
# image = "/path/to/stamp.png"
width_px = 180
height_px = 126
rows_above_last = 4
# 5 = column E
column = 5
"#;
