use crate::html::{HtmlWriter, escape_html};
use crate::inline::render_inline;
use crate::line::{LineKind, classify, has_numbering, is_dash_only};
use crate::list::{BULLET_GLYPH, ListItem, ListKind, render_list};
use crate::table::render_table;
use log::{debug, trace};

/// Converts Markdown source to block-level HTML, one block per output line.
///
/// Never fails. Blocks still open at the end of input are closed with whatever they
/// buffered. Math spans in `\[..\]`/`\(..\)` form are expected to be protected by the caller
/// (see [`crate::guard`]); `$$` blocks and `$..$` spans are passed through verbatim.
pub fn parse(source: &str) -> String {
    let mut parser = Parser::new();
    for line in source.lines() {
        parser.feed(line);
    }
    parser.finish()
}

enum Mode {
    Normal,
    List {
        kind: ListKind,
        items: Vec<ListItem>,
    },
    Code {
        lang: Option<String>,
        buffer: String,
    },
    Table {
        rows: Vec<String>,
    },
    Math {
        buffer: String,
    },
}

impl Mode {
    fn name(&self) -> &'static str {
        match self {
            Mode::Normal => "paragraph",
            Mode::List { .. } => "list",
            Mode::Code { .. } => "code block",
            Mode::Table { .. } => "table",
            Mode::Math { .. } => "math block",
        }
    }
}

struct Parser {
    out: HtmlWriter,
    mode: Mode,
    empty_run: usize,
}

impl Parser {
    fn new() -> Self {
        Self {
            out: HtmlWriter::new(),
            mode: Mode::Normal,
            empty_run: 0,
        }
    }

    fn feed(&mut self, raw: &str) {
        match &mut self.mode {
            Mode::Code { buffer, .. } => {
                if matches!(classify(raw), LineKind::Fence { .. }) {
                    self.flush();
                } else {
                    buffer.push_str(raw);
                    buffer.push('\n');
                }
                return;
            }
            Mode::Math { buffer } => {
                let line = raw.trim();
                if line == "$$" {
                    self.flush();
                } else if line.ends_with("$$") {
                    buffer.push('\n');
                    buffer.push_str(line);
                    self.flush();
                } else {
                    if !buffer.is_empty() {
                        buffer.push('\n');
                    }
                    buffer.push_str(line);
                }
                return;
            }
            _ => {}
        }

        let kind = classify(raw);
        if kind != LineKind::Blank {
            self.empty_run = 0;
        }
        if matches!(self.mode, Mode::Table { .. }) && kind != LineKind::TableRow {
            self.flush();
        }

        match kind {
            LineKind::Fence { lang } => {
                self.flush();
                trace!("opening code block (lang: {:?})", lang);
                self.mode = Mode::Code {
                    lang: lang.map(str::to_string),
                    buffer: String::new(),
                };
            }
            LineKind::Math => {
                self.flush();
                let line = raw.trim();
                if line.chars().count() > 4 && line.ends_with("$$") {
                    self.out.line(&math_block(line));
                } else {
                    self.mode = Mode::Math {
                        buffer: line.to_string(),
                    };
                }
            }
            LineKind::TableRow => {
                let row = raw.trim().to_string();
                if let Mode::Table { rows } = &mut self.mode {
                    rows.push(row);
                } else {
                    self.flush();
                    self.mode = Mode::Table { rows: vec![row] };
                }
            }
            LineKind::Rule => {
                self.flush();
                self.out.line("<hr>");
            }
            LineKind::Blank => {
                self.empty_run += 1;
                self.flush();
                if self.empty_run == 1 {
                    self.out.line("<p>&nbsp;</p>");
                }
            }
            LineKind::Heading { level, text } => {
                self.flush();
                self.out
                    .line(&format!("<h{0}>{1}</h{0}>", level, render_inline(text)));
            }
            LineKind::Ordered { marker, rest } => {
                self.push_item(ListItem::ordered(marker, render_inline(rest)));
            }
            LineKind::Unordered { bullet, rest } => {
                let marker = (!is_dash_only(bullet, rest)).then_some(BULLET_GLYPH);
                self.push_item(ListItem::unordered(marker, render_inline(rest)));
            }
            LineKind::Quote { text } => {
                self.flush();
                self.out
                    .line(&format!("<blockquote>{}</blockquote>", render_inline(text)));
            }
            LineKind::Paragraph => {
                self.flush();
                let text = raw.trim();
                let open = if has_numbering(text) {
                    "<p data-has-numbering=\"true\">"
                } else {
                    "<p>"
                };
                self.out
                    .line(&format!("{}{}</p>", open, render_inline(text)));
            }
        }
    }

    fn push_item(&mut self, item: ListItem) {
        if let Mode::List { kind, items } = &mut self.mode
            && *kind == item.kind
        {
            items.push(item);
            return;
        }
        self.flush();
        trace!("opening {:?} list", item.kind);
        self.mode = Mode::List {
            kind: item.kind,
            items: vec![item],
        };
    }

    /// Closes the open block, if any, and writes its HTML.
    fn flush(&mut self) {
        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => {}
            Mode::List { kind, items } => {
                trace!("closing {:?} list with {} item(s)", kind, items.len());
                self.out.line(&render_list(kind, &items));
            }
            Mode::Table { rows } => {
                trace!("closing table with {} row(s)", rows.len());
                self.out.line(&render_table(&rows));
            }
            Mode::Code { lang, buffer } => {
                let open = match lang {
                    Some(lang) => format!("<pre><code class=\"language-{}\">", lang),
                    None => "<pre><code>".to_string(),
                };
                self.out
                    .line(&format!("{}{}</code></pre>", open, escape_html(&buffer)));
            }
            Mode::Math { buffer } => {
                if !buffer.is_empty() {
                    self.out.line(&math_block(&buffer));
                }
            }
        }
    }

    fn finish(mut self) -> String {
        if matches!(self.mode, Mode::Code { .. } | Mode::Math { .. }) {
            debug!("closing unterminated {} at end of input", self.mode.name());
        }
        self.flush();
        self.out.finish()
    }
}

fn math_block(content: &str) -> String {
    format!("<div class=\"math-block\">{}</div>", content)
}
