use super::*;

#[test]
fn parses_nested_structure_with_doctype_and_comments() -> Result<()> {
    let html = r#"
        <!DOCTYPE html>
        <!-- header chrome -->
        <html>
          <head><title>Demo &amp; Co</title></head>
          <body><div id="app"><span>hi</span></div></body>
        </html>
        "#;
    let doc = Document::from_html(html)?;

    let root = doc.document_element().expect("html element exists");
    assert_eq!(doc.tag_name(root), Some("html"));

    let title = doc.query_selector("title")?.expect("title exists");
    assert_eq!(doc.text_content(title), "Demo & Co");

    let span = doc.query_selector("span")?.expect("span exists");
    assert_eq!(doc.parent_element(span), doc.by_id("app"));
    Ok(())
}

#[test]
fn void_tags_do_not_swallow_siblings() -> Result<()> {
    let doc = Document::from_html("<div><br><img src=x><i>t</i></div>")?;
    let div = doc.query_selector("div")?.expect("div exists");

    let children = doc.element_children(div);
    assert_eq!(children.len(), 3);
    assert_eq!(doc.tag_name(children[0]), Some("br"));
    assert_eq!(doc.tag_name(children[1]), Some("img"));
    assert_eq!(doc.tag_name(children[2]), Some("i"));
    Ok(())
}

#[test]
fn list_items_close_implicitly() -> Result<()> {
    let doc = Document::from_html("<ul><li>a<li>b<li>c</ul>")?;
    let ul = doc.query_selector("ul")?.expect("ul exists");

    let items = doc.element_children(ul);
    assert_eq!(items.len(), 3);
    for item in &items {
        assert_eq!(doc.tag_name(*item), Some("li"));
        assert_eq!(doc.parent_element(*item), Some(ul));
    }
    Ok(())
}

#[test]
fn paragraphs_close_before_block_elements() -> Result<()> {
    let doc = Document::from_html("<body><p>one<div>two</div></body>")?;
    let p = doc.query_selector("p")?.expect("p exists");
    let div = doc.query_selector("div")?.expect("div exists");

    assert_eq!(doc.text_content(p), "one");
    assert_ne!(doc.parent_element(div), Some(p));
    Ok(())
}

#[test]
fn description_list_items_close_implicitly() -> Result<()> {
    let doc = Document::from_html("<dl><dt>term<dd>def<dt>term2</dl>")?;
    let dl = doc.query_selector("dl")?.expect("dl exists");
    assert_eq!(doc.element_children(dl).len(), 3);
    Ok(())
}

#[test]
fn script_and_style_bodies_stay_raw_text() -> Result<()> {
    let html = r#"
        <div id="app"></div>
        <script>if (a < b) { render("<div>") }</script>
        <style>p > span { color: red }</style>
        "#;
    let doc = Document::from_html(html)?;

    assert_eq!(doc.query_selector_all("div")?.len(), 1);
    let script = doc.query_selector("script")?.expect("script exists");
    assert_eq!(doc.text_content(script), r#"if (a < b) { render("<div>") }"#);
    Ok(())
}

#[test]
fn attribute_forms_parse_and_entities_decode() -> Result<()> {
    let html = r#"<input type=checkbox disabled data-label="a&amp;b" title='q'>"#;
    let doc = Document::from_html(html)?;
    let input = doc.query_selector("input")?.expect("input exists");

    assert_eq!(doc.attr(input, "type"), Some("checkbox"));
    assert_eq!(doc.attr(input, "disabled"), Some(""));
    assert_eq!(doc.attr(input, "data-label"), Some("a&b"));
    assert_eq!(doc.attr(input, "title"), Some("q"));
    Ok(())
}

#[test]
fn malformed_attribute_fragments_are_skipped() -> Result<()> {
    let doc = Document::from_html(r#"<a href=""/en/"tools/" class="x">go</a>"#)?;
    let a = doc.query_selector("a")?.expect("a exists");

    assert_eq!(doc.attr(a, "href"), Some(""));
    assert_eq!(doc.attr(a, "class"), Some("x"));
    assert_eq!(doc.text_content(a), "go");
    Ok(())
}

#[test]
fn numeric_character_references_decode() -> Result<()> {
    let doc = Document::from_html("<p>&#65;&#x42;&unknown;</p>")?;
    let p = doc.query_selector("p")?.expect("p exists");
    assert_eq!(doc.text_content(p), "AB&unknown;");
    Ok(())
}

#[test]
fn mismatched_end_tags_unwind_the_stack() -> Result<()> {
    let doc = Document::from_html("<div><span>a</div><p>b</p>")?;
    let p = doc.query_selector("p")?.expect("p exists");
    // the stray </div> closed both open elements, so p is a top-level node
    assert_eq!(doc.parent_element(p), None);
    Ok(())
}

#[test]
fn text_content_concatenates_descendants_in_order() -> Result<()> {
    let doc = Document::from_html("<div>a<span>b<i>c</i></span>d</div>")?;
    let div = doc.query_selector("div")?.expect("div exists");
    assert_eq!(doc.text_content(div), "abcd");
    Ok(())
}

#[test]
fn unclosed_constructs_report_parse_errors() {
    for bad in [
        "<!-- never closed",
        "<script>let x = 1;",
        "<div title=\"unclosed>",
    ] {
        let err = Document::from_html(bad).expect_err("parse should fail");
        match err {
            Error::HtmlParse(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[test]
fn duplicate_attribute_keeps_the_last_value() -> Result<()> {
    let doc = Document::from_html(r#"<p class="a" class="b">x</p>"#)?;
    let p = doc.query_selector("p")?.expect("p exists");
    assert_eq!(doc.attr(p, "class"), Some("b"));
    Ok(())
}
