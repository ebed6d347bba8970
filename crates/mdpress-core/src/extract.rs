//! Rendered HTML back to table data.
//!
//! Extraction works on the HTML the user actually sees, not on the Markdown source, so any
//! styling applied after parsing is reflected in the bold/italic flags.

use log::debug;
use once_cell::sync::Lazy;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

static TABLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("table").expect("BUG: hardcoded selector 'table' is statically valid")
});
static TR_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("tr").expect("BUG: hardcoded selector 'tr' is statically valid")
});
static BOLD_TAGS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("strong, b").expect("BUG: hardcoded selector 'strong, b' is statically valid")
});
static ITALIC_TAGS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("em, i").expect("BUG: hardcoded selector 'em, i' is statically valid")
});

/// Elements a browser renders bold without any author style.
const DEFAULT_BOLD: &[&str] = &["th", "strong", "b", "h1", "h2", "h3", "h4", "h5", "h6"];
/// Elements a browser renders italic without any author style.
const DEFAULT_ITALIC: &[&str] = &["em", "i", "cite", "var", "dfn", "address"];

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    /// Plain text: tags stripped, entities decoded, `<br>` as a newline.
    pub text: String,
    pub original_html: String,
    pub is_bold: bool,
    pub is_italic: bool,
}

pub type Row = Vec<Cell>;
pub type Table = Vec<Row>;

/// One way a cell can show that it is bold or italic.
pub struct Signal {
    pub name: &'static str,
    test: fn(&ElementRef<'_>) -> bool,
}

impl Signal {
    pub fn check(&self, cell: &ElementRef<'_>) -> bool {
        (self.test)(cell)
    }
}

/// Checked in order; any signal is enough to flag the cell.
pub const BOLD_SIGNALS: &[Signal] = &[
    Signal {
        name: "markup",
        test: bold_markup,
    },
    Signal {
        name: "computed-style",
        test: computed_bold,
    },
    Signal {
        name: "inline-style",
        test: inline_bold,
    },
];

pub const ITALIC_SIGNALS: &[Signal] = &[
    Signal {
        name: "markup",
        test: italic_markup,
    },
    Signal {
        name: "computed-style",
        test: computed_italic,
    },
    Signal {
        name: "inline-style",
        test: inline_italic,
    },
];

/// Extracts every table in `html`, header and body rows alike.
///
/// Tables without rows are skipped; a document without tables yields an empty vector.
pub fn extract_tables(html: &str) -> Vec<Table> {
    let document = Html::parse_fragment(html);
    let tables: Vec<Table> = document
        .select(&TABLE_SELECTOR)
        .map(|table| {
            table
                .select(&TR_SELECTOR)
                .filter(|row| owning_table(row).is_some_and(|owner| owner.id() == table.id()))
                .map(extract_row)
                .collect::<Table>()
        })
        .filter(|table| !table.is_empty())
        .collect();
    debug!("extracted {} table(s)", tables.len());
    tables
}

fn owning_table<'a>(row: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
}

fn extract_row(row: ElementRef<'_>) -> Row {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .map(|cell| extract_cell(&cell))
        .collect()
}

fn extract_cell(cell: &ElementRef<'_>) -> Cell {
    Cell {
        text: cell_text(cell),
        original_html: cell.inner_html(),
        is_bold: BOLD_SIGNALS.iter().any(|signal| signal.check(cell)),
        is_italic: ITALIC_SIGNALS.iter().any(|signal| signal.check(cell)),
    }
}

/// Text content with `<br>` as a line break and whitespace collapsed within each line.
pub fn cell_text(cell: &ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(cell, &mut raw);
    let lines: Vec<String> = raw
        .split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    lines.join("\n").trim_matches('\n').to_string()
}

fn collect_text(element: &ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&text.replace('\n', " ")),
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(&child, out);
                }
            }
            _ => {}
        }
    }
}

fn bold_markup(cell: &ElementRef<'_>) -> bool {
    cell.select(&BOLD_TAGS).next().is_some()
}

fn italic_markup(cell: &ElementRef<'_>) -> bool {
    cell.select(&ITALIC_TAGS).next().is_some()
}

fn computed_bold(cell: &ElementRef<'_>) -> bool {
    computed(cell, "font-weight", DEFAULT_BOLD).is_some_and(|value| is_bold_weight(&value))
}

fn computed_italic(cell: &ElementRef<'_>) -> bool {
    computed(cell, "font-style", DEFAULT_ITALIC).is_some_and(|value| value == "italic")
}

fn inline_bold(cell: &ElementRef<'_>) -> bool {
    declaration(cell, "font-weight").is_some_and(|value| is_bold_weight(&value))
}

fn inline_italic(cell: &ElementRef<'_>) -> bool {
    declaration(cell, "font-style").is_some_and(|value| value == "italic")
}

/// Resolves an inherited property: the nearest element (the cell first) that declares it
/// inline or has a user-agent default for it decides.
fn computed(cell: &ElementRef<'_>, property: &str, defaults: &[&str]) -> Option<String> {
    let ua_value = match property {
        "font-weight" => "bold",
        _ => "italic",
    };
    std::iter::once(*cell)
        .chain(cell.ancestors().filter_map(ElementRef::wrap))
        .find_map(|el| {
            declaration(&el, property).or_else(|| {
                defaults
                    .contains(&el.value().name())
                    .then(|| ua_value.to_string())
            })
        })
}

/// Value of `property` in the element's `style` attribute; later declarations win.
fn declaration(el: &ElementRef<'_>, property: &str) -> Option<String> {
    let style = el.value().attr("style")?;
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case(property))
        .map(|(_, value)| {
            value
                .trim()
                .trim_end_matches("!important")
                .trim()
                .to_ascii_lowercase()
        })
        .next_back()
}

fn is_bold_weight(value: &str) -> bool {
    value == "bold" || value == "bolder" || value.parse::<u32>().is_ok_and(|weight| weight >= 600)
}
