use mdpress_core::{
    PreviewOptions, extract_tables, parse, protect, render_inline, render_preview,
    render_preview_default, restore,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn math_emphasis_isolation() {
    let html = render_inline("the $a*b*c$ value");
    assert!(!html.contains("<em>"));
    assert!(html.contains("$a*b*c$"));
}

#[test]
fn ordered_marker_fidelity() {
    for (line, marker) in [("3. Skip ahead", "3."), ("①. Next", "①.")] {
        let html = parse(line);
        assert!(
            html.contains(&format!("data-original-number=\"{}\"", marker)),
            "{}",
            html
        );
        assert!(html.contains(&format!("class=\"list-marker\">{}</span>", marker)));
    }
}

#[test]
fn unordered_dash_suppression() {
    let dash = parse("- \n");
    assert!(dash.contains("<li "));
    assert!(!dash.contains("data-marker"));
    assert!(!dash.contains('•'));

    let item = parse("- Buy milk");
    assert!(item.contains("data-marker=\"•\""));
    assert!(item.contains(">Buy milk</li>"));
}

#[test]
fn blank_line_collapse() {
    let html = parse("one\n\n\n\n\ntwo");
    assert_eq!(html.matches("<p>&nbsp;</p>").count(), 1);
    assert_eq!(html, "<p>one</p>\n<p>&nbsp;</p>\n<p>two</p>");
}

#[test]
fn table_round_trip_scenario() {
    let tables = extract_tables(
        "<table><tr><td><strong>Name</strong></td><td>Age</td></tr><tr><td>Zhang</td><td>25</td></tr></table>",
    );
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].len(), 2);
    assert!(tables[0][0][0].is_bold);
    assert_eq!(tables[0][0][0].text, "Name");
    assert!(!tables[0][1][0].is_bold);
    assert_eq!(tables[0][1][0].text, "Zhang");
}

#[test]
fn rendered_markdown_tables_extract_with_header_bold() {
    init_logger();
    let html = render_preview_default("| **Name** | *Age* |\n|---|---|\n| Zhang | 25 |");
    let tables = extract_tables(&html);
    assert_eq!(tables.len(), 1);
    let rows = &tables[0];
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0].text, "Name");
    assert!(rows[0][0].is_bold);
    assert!(rows[0][1].is_bold);
    assert!(rows[0][1].is_italic);
    assert_eq!(rows[1][1].text, "25");
    assert!(!rows[1][1].is_bold);
}

#[test]
fn code_fence_escaping() {
    let unfiltered = PreviewOptions {
        filter_input: false,
        ..PreviewOptions::default()
    };
    let html = render_preview("```\n<script>alert(1)</script>\n```", &unfiltered);
    assert!(html.contains("<pre><code>&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!html.contains("<script>"));

    let filtered = render_preview_default("```\n<script>alert(1)</script>\n```");
    assert!(filtered.starts_with("<pre><code>"));
    assert!(!filtered.contains("alert"));
}

#[test]
fn unterminated_block_recovery() {
    init_logger();
    let html = parse("```\nlet a = 1;\nlet b = 2;");
    assert_eq!(html, "<pre><code>let a = 1;\nlet b = 2;\n</code></pre>");
}

#[test]
fn placeholder_round_trip_example() {
    let source = "Euler: \\[e^{i\\pi} + 1 = 0\\] and \\(a_1 * a_2\\) done";
    let protected = protect(source);
    assert_eq!(protected.placeholders.len(), 2);
    assert_eq!(restore(&protected.text, &protected.placeholders), source);
}

#[test]
fn preview_protects_bracket_math_from_emphasis() {
    let html = render_preview_default("value \\(x_a * y_b * z\\) here");
    assert_eq!(html, "<p>value \\(x_a * y_b * z\\) here</p>");
}

#[test]
fn bracket_math_inside_code_fence_stays_escaped() {
    let raw = PreviewOptions {
        sanitize: false,
        filter_input: false,
    };
    let html = render_preview("```\n\\(<script>alert(1)</script>\\)\n```", &raw);
    assert!(html.contains(r"<pre><code>\(&lt;script&gt;alert(1)&lt;/script&gt;\)"));
    assert!(!html.contains("<script>"));

    let html = render_preview_default("```\nif \\(a<b\\) { x }\n```");
    assert!(html.contains(r"<pre><code>if \(a&lt;b\) { x }"), "{}", html);
}

#[test]
fn bracket_math_in_link_target_cannot_leave_the_attribute() {
    let raw = PreviewOptions {
        sanitize: false,
        filter_input: false,
    };
    let html = render_preview(r#"[x](\(" onmouseover="alert(1)\))"#, &raw);
    assert!(html.contains(r#"href="\(&quot; onmouseover=&quot;alert(1)\)""#), "{}", html);
    assert!(!html.contains(r#"" onmouseover=""#));
}

#[test]
fn preview_options_control_filter_and_sanitizer() {
    let source = "<u onclick=\"x()\">hi</u>";
    let raw = PreviewOptions {
        sanitize: false,
        filter_input: false,
    };
    assert_eq!(render_preview(source, &raw), "<p><u onclick=\"x()\">hi</u></p>");
    assert_eq!(render_preview_default(source), "<p><u>hi</u></p>");
}

#[test]
fn concurrent_renders_are_independent() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                let source = format!("item {} has \\(x_{} * y\\) and *stress*", i, i);
                render_preview_default(&source)
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let html = handle.join().expect("render thread panicked");
        assert!(html.contains(&format!("\\(x_{} * y\\)", i)));
        assert!(html.contains("<em>stress</em>"));
    }
}
