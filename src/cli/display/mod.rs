//! Display module for formatted CLI output

pub mod colors;
pub mod diff;
pub mod icons;
pub mod table;

pub use colors::ColorTheme;
pub use diff::{colorize_diff, DiffLine};
pub use icons::StatusIcon;
pub use table::{ManifestRow, TableRenderer};
