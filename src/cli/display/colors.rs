//! Color theme for CLI output

use comfy_table::Color as TableColor;

/// Color theme for terminal output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub error: TableColor,
    pub info: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            error: TableColor::Red,
            info: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    pub fn manifest_color(&self, generated: bool) -> TableColor {
        if generated {
            self.success
        } else {
            self.muted
        }
    }

    /// Workload kinds stand out from the Service row.
    pub fn kind_color(&self, kind: &str) -> TableColor {
        match kind {
            "Service" => self.info,
            _ => self.warning,
        }
    }
}
