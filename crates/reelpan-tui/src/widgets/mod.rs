mod gallery;
mod help;
mod info;
mod status_bar;

pub use gallery::GalleryWidget;
pub use help::HelpWidget;
pub use info::InfoWidget;
pub use status_bar::StatusBarWidget;

use unicode_width::UnicodeWidthChar;

/// Truncate to `max_width` display columns, marking the cut with an ellipsis
pub(crate) fn truncate_to_width(s: &str, max_width: usize) -> String {
    let total: usize = s.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
