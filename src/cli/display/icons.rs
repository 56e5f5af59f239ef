//! Status icons for CLI output

/// Icons for the generation summary
pub struct StatusIcon;

impl StatusIcon {
    /// Manifest emitted
    pub const GENERATED: &'static str = "✓";

    /// Kind not applicable to this service
    pub const SKIPPED: &'static str = "-";

    pub const ERROR: &'static str = "✗";

    pub fn for_manifest(generated: bool) -> &'static str {
        if generated {
            Self::GENERATED
        } else {
            Self::SKIPPED
        }
    }

    pub fn status_text(generated: bool) -> &'static str {
        if generated {
            "Generated"
        } else {
            "Skipped"
        }
    }
}
