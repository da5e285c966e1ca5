use click_trail::{Document, clip_text};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Fixture {
    tag: &'static str,
    classes: Vec<&'static str>,
    text: Option<&'static str>,
    children: Vec<Fixture>,
}

fn tag_strategy() -> BoxedStrategy<&'static str> {
    prop_oneof![
        Just("div"),
        Just("span"),
        Just("section"),
        Just("article"),
        Just("em"),
        Just("b"),
    ]
    .boxed()
}

fn classes_strategy() -> BoxedStrategy<Vec<&'static str>> {
    prop::collection::vec(
        prop_oneof![
            Just("card"),
            Just("item"),
            Just("active"),
            Just("x-1"),
            Just("note"),
        ],
        0..3,
    )
    .boxed()
}

fn text_strategy() -> BoxedStrategy<Option<&'static str>> {
    prop_oneof![
        Just(None),
        Just(Some("hello")),
        Just(Some("  spaced   out  ")),
        Just(Some("line\nbreak")),
    ]
    .boxed()
}

fn fixture_strategy() -> BoxedStrategy<Fixture> {
    let leaf = (tag_strategy(), classes_strategy(), text_strategy())
        .prop_map(|(tag, classes, text)| Fixture {
            tag,
            classes,
            text,
            children: Vec::new(),
        })
        .boxed();

    leaf.prop_recursive(3, 24, 4, |inner| {
        (
            tag_strategy(),
            classes_strategy(),
            text_strategy(),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(tag, classes, text, children)| Fixture {
                tag,
                classes,
                text,
                children,
            })
            .boxed()
    })
    .boxed()
}

fn render(fixture: &Fixture, out: &mut String) {
    out.push('<');
    out.push_str(fixture.tag);
    if !fixture.classes.is_empty() {
        out.push_str(" class=\"");
        out.push_str(&fixture.classes.join(" "));
        out.push('"');
    }
    out.push('>');
    if let Some(text) = fixture.text {
        out.push_str(text);
    }
    for child in &fixture.children {
        render(child, out);
    }
    out.push_str("</");
    out.push_str(fixture.tag);
    out.push('>');
}

fn page_for(fixture: &Fixture, wrap: bool) -> String {
    let mut body = String::new();
    render(fixture, &mut body);
    if wrap {
        format!("<html><head><title>fixture</title></head><body>{body}</body></html>")
    } else {
        body
    }
}

proptest! {
    #[test]
    fn generated_css_selectors_resolve_to_their_element(
        fixture in fixture_strategy(),
        wrap in any::<bool>(),
    ) {
        let doc = Document::from_html(&page_for(&fixture, wrap)).expect("fixture parses");
        for element in doc.elements() {
            let selector = doc.element_css_selector(element);
            prop_assert!(!selector.is_empty());
            let matches = doc.query_selector_all(&selector).expect("selector parses back");
            if wrap {
                prop_assert_eq!(matches, vec![element], "selector {} is not unique", selector);
            } else {
                // A bare fragment has no document element anchoring the walk,
                // so the top level keeps its unprobed candidate and the
                // selector only guarantees covering the element.
                prop_assert!(
                    matches.contains(&element),
                    "selector {} misses its element",
                    selector
                );
            }
        }
    }

    #[test]
    fn generated_xpaths_resolve_to_their_element(
        fixture in fixture_strategy(),
        wrap in any::<bool>(),
    ) {
        let doc = Document::from_html(&page_for(&fixture, wrap)).expect("fixture parses");
        for element in doc.elements() {
            let xpath = doc.element_xpath(element);
            prop_assert!(!xpath.is_empty());
            let matches = doc.evaluate_xpath(&xpath).expect("xpath evaluates");
            prop_assert_eq!(matches, vec![element], "xpath {} is not unique", xpath);
        }
    }

    #[test]
    fn locator_generation_is_deterministic(
        fixture in fixture_strategy(),
        wrap in any::<bool>(),
    ) {
        let doc = Document::from_html(&page_for(&fixture, wrap)).expect("fixture parses");
        for element in doc.elements() {
            prop_assert_eq!(doc.element_css_selector(element), doc.element_css_selector(element));
            prop_assert_eq!(doc.element_xpath(element), doc.element_xpath(element));
        }
    }

    #[test]
    fn clip_text_bounds_and_normalizes(text in "[ a-zA-Z\n\t]{0,120}", max in 0usize..80) {
        let clipped = clip_text(&text, max);
        prop_assert!(clipped.chars().count() <= max + 1);
        prop_assert!(clipped == clipped.trim());
        prop_assert!(!clipped.contains('\n'));
        prop_assert!(!clipped.contains('\t'));
        prop_assert!(!clipped.contains("  "));
    }
}
