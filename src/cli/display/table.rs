//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

/// One row of the generation summary
#[derive(Debug, Clone)]
pub struct ManifestRow {
    pub kind: String,
    pub name: Option<String>,
    pub namespace: Option<String>,
}

impl ManifestRow {
    pub fn generated(&self) -> bool {
        self.name.is_some()
    }
}

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render what was generated for a service as a formatted table
    pub fn render_manifest_summary(
        &self,
        service_name: &str,
        environment: &str,
        rows: &[ManifestRow],
    ) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("KIND").set_alignment(CellAlignment::Left),
                Cell::new("NAME").set_alignment(CellAlignment::Left),
                Cell::new("NAMESPACE").set_alignment(CellAlignment::Left),
                Cell::new("STATUS").set_alignment(CellAlignment::Center),
            ]);

        for row in rows {
            let generated = row.generated();
            table.add_row(vec![
                Cell::new(&row.kind).fg(self.theme.kind_color(&row.kind)),
                Cell::new(row.name.as_deref().unwrap_or("-")),
                Cell::new(row.namespace.as_deref().unwrap_or("default")),
                Cell::new(format!(
                    "{} {}",
                    StatusIcon::for_manifest(generated),
                    StatusIcon::status_text(generated)
                ))
                .fg(self.theme.manifest_color(generated)),
            ]);
        }

        let generated = rows.iter().filter(|row| row.generated()).count();

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ {} ({}) {} ─╮\n",
            service_name,
            environment,
            format!("[{} manifests]", generated).bright_black()
        ));
        output.push_str(&table.to_string());
        output.push('\n');

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_manifest_summary() {
        let rows = vec![
            ManifestRow {
                kind: "Service".to_string(),
                name: None,
                namespace: None,
            },
            ManifestRow {
                kind: "Deployment".to_string(),
                name: Some("chopper-api".to_string()),
                namespace: Some("payments".to_string()),
            },
        ];

        let output = TableRenderer::new().render_manifest_summary("chopper_api", "dev", &rows);

        assert!(output.contains("chopper_api (dev)"));
        assert!(output.contains("[1 manifests]"));
        assert!(output.contains("chopper-api"));
        assert!(output.contains("payments"));
        assert!(output.contains("Skipped"));
        assert!(output.contains("Generated"));
    }
}
