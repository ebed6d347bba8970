mod extract;
mod filter;
mod guard;
mod html;
mod inline;
mod line;
mod list;
mod parser;
mod placeholder;
mod sanitize;
mod table;

use log::debug;
use serde::{Deserialize, Serialize};

pub use extract::{BOLD_SIGNALS, Cell, ITALIC_SIGNALS, Row, Signal, Table, cell_text, extract_tables};
pub use filter::filter_input;
pub use guard::{Protected, protect, protect_all, restore, restore_html};
pub use html::{escape_attr, escape_html};
pub use inline::{InlineRule, RULES, render_inline};
pub use line::{LINE_RULES, LineKind, LineRule, classify, has_numbering, is_dash_only};
pub use list::{BULLET_GLYPH, ListItem, ListKind, render_list};
pub use parser::parse;
pub use placeholder::{Placeholder, PlaceholderArena};
pub use sanitize::sanitize_html;
pub use table::{Align, render_table};

/// Switches for [`render_preview`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviewOptions {
    /// Run the rendered HTML through [`sanitize_html`].
    pub sanitize: bool,
    /// Scrub active content from the source with [`filter_input`] before parsing.
    pub filter_input: bool,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            sanitize: true,
            filter_input: true,
        }
    }
}

/// Full preview pipeline: filter, protect math, parse, restore math, sanitize.
pub fn render_preview(source: &str, options: &PreviewOptions) -> String {
    let filtered;
    let source = if options.filter_input {
        filtered = filter_input(source);
        filtered.as_str()
    } else {
        source
    };
    let protected = protect(source);
    let html = restore_html(&parse(&protected.text), &protected.placeholders);
    debug!(
        "rendered {} bytes of source into {} bytes of html ({} math span(s))",
        source.len(),
        html.len(),
        protected.placeholders.len()
    );
    if options.sanitize {
        sanitize_html(&html)
    } else {
        html
    }
}

/// [`render_preview`] with filtering and sanitizing both on.
pub fn render_preview_default(source: &str) -> String {
    render_preview(source, &PreviewOptions::default())
}
