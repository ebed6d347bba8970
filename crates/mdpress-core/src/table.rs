use crate::inline::render_inline;
use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\|\s*[-:]+\s*\|").expect("BUG: table separator regex is statically valid")
});

const CELL_STYLE: &str = "border:1px solid #000; padding:5px;";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    fn parse(cell: &str) -> Self {
        let cell = cell.trim();
        if cell.starts_with(':') && cell.ends_with(':') {
            Align::Center
        } else if cell.ends_with(':') {
            Align::Right
        } else {
            Align::Left
        }
    }

    pub fn as_css(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}

fn is_separator(row: &str) -> bool {
    SEPARATOR.is_match(row)
}

/// Splits a `|a|b|` row on pipes, dropping only the empty pieces.
fn cells(row: &str) -> impl Iterator<Item = &str> {
    row.split('|').filter(|cell| !cell.is_empty())
}

/// Renders buffered `|...|` rows (already trimmed) as a table.
///
/// A separator row in second position sets the column alignment; separator rows are never
/// emitted. The first emitted row is the header.
pub fn render_table(rows: &[String]) -> String {
    let alignments: Vec<Align> = match rows.get(1) {
        Some(row) if is_separator(row) => cells(row).map(Align::parse).collect(),
        _ => Vec::new(),
    };

    let mut html = String::from(
        "<div class=\"table-container\"><table border=\"1\" style=\"width:100%; border-collapse:collapse;\">",
    );
    let mut header = true;
    for row in rows.iter().filter(|row| !is_separator(row)) {
        let tag = if header { "th" } else { "td" };
        header = false;
        html.push_str("\n<tr>");
        for (index, cell) in cells(row).enumerate() {
            let align = alignments.get(index).copied().unwrap_or(Align::Left);
            html.push_str(&format!(
                "<{tag} style=\"{} text-align:{};\">{}</{tag}>",
                CELL_STYLE,
                align.as_css(),
                render_inline(cell.trim()),
                tag = tag
            ));
        }
        html.push_str("</tr>");
    }
    html.push_str("\n</table></div>");
    html
}
