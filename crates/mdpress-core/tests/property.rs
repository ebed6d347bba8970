use mdpress_core::{extract_tables, parse, protect, protect_all, render_inline, render_preview_default, restore};
use proptest::prelude::*;

const TEXT: &str = "[a-zA-Z0-9 #*_`~|>()\\[\\]!$\\\\.\\-\n]{0,80}";

fn math_span() -> impl Strategy<Value = String> {
    ("[a-z0-9 *_^+=-]{0,12}", prop::bool::ANY).prop_map(|(body, display)| {
        if display {
            format!("\\[{}\\]", body)
        } else {
            format!("\\({}\\)", body)
        }
    })
}

fn text_with_math() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![TEXT.prop_map(String::from), math_span()], 0..8)
        .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn placeholder_round_trip(source in text_with_math()) {
        let protected = protect(&source);
        prop_assert_eq!(restore(&protected.text, &protected.placeholders), source);
    }

    #[test]
    fn placeholder_round_trip_with_dollar_forms(source in text_with_math()) {
        let protected = protect_all(&source);
        prop_assert_eq!(restore(&protected.text, &protected.placeholders), source);
    }

    #[test]
    fn tokens_never_leak_into_preview(source in text_with_math()) {
        let html = render_preview_default(&source);
        prop_assert!(!html.contains('⟦'), "token left in {:?}", html);
    }

    #[test]
    fn math_bodies_survive_inline_rendering(body in "[a-z*_ ]{1,10}") {
        let line = format!("x ${}$ y", body);
        let html = render_inline(&line);
        let expected = format!("${}$", body);
        prop_assert!(html.contains(&expected), "{:?} lost math in {:?}", line, html);
    }

    #[test]
    fn parse_never_panics(source in "\\PC{0,200}") {
        let _ = parse(&source);
        let _ = render_preview_default(&source);
    }

    #[test]
    fn extraction_never_panics(html in "\\PC{0,200}") {
        let _ = extract_tables(&html);
    }
}
