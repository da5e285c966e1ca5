use super::*;

#[test]
fn selector_groups_merge_without_duplicates() -> Result<()> {
    let doc = Document::from_html("<div class='a'>x</div><span>y</span>")?;
    let all = doc.query_selector_all("div, span, .a")?;
    assert_eq!(all.len(), 2);
    Ok(())
}

#[test]
fn child_combinator_is_stricter_than_descendant() -> Result<()> {
    let doc = Document::from_html("<section><div><span>deep</span></div></section>")?;
    let span = doc.query_selector("span")?.expect("span exists");

    assert!(doc.matches_selector(span, "section span")?);
    assert!(!doc.matches_selector(span, "section > span")?);
    assert!(doc.matches_selector(span, "div > span")?);
    Ok(())
}

#[test]
fn sibling_combinators_walk_element_siblings_only() -> Result<()> {
    let doc = Document::from_html("<ul><li>a</li> <li class='b'>b</li> <li>c</li></ul>")?;
    let items = doc.query_selector_all("li")?;

    assert!(doc.matches_selector(items[1], "li + li")?);
    assert!(!doc.matches_selector(items[0], "li + li")?);
    assert!(doc.matches_selector(items[2], ".b ~ li")?);
    Ok(())
}

#[test]
fn attribute_conditions_cover_all_operators() -> Result<()> {
    let doc =
        Document::from_html(r#"<a href="https://example.com/docs" lang="en-US" rel="nofollow noopener">x</a>"#)?;
    let a = doc.query_selector("a")?.expect("a exists");

    assert!(doc.matches_selector(a, "[href]")?);
    assert!(doc.matches_selector(a, r#"a[lang="en-US"]"#)?);
    assert!(doc.matches_selector(a, r#"a[href^="https://"]"#)?);
    assert!(doc.matches_selector(a, r#"a[href$="docs"]"#)?);
    assert!(doc.matches_selector(a, r#"a[href*="example"]"#)?);
    assert!(doc.matches_selector(a, r#"a[rel~="noopener"]"#)?);
    assert!(doc.matches_selector(a, r#"a[lang|="en"]"#)?);
    assert!(!doc.matches_selector(a, r#"a[lang|="e"]"#)?);
    assert!(!doc.matches_selector(a, r#"a[href^=""]"#)?);
    Ok(())
}

#[test]
fn positional_pseudo_classes_count_element_children() -> Result<()> {
    let doc = Document::from_html("<div>text<span>a</span><span>b</span><span>c</span></div>")?;
    let spans = doc.query_selector_all("span")?;

    assert!(doc.matches_selector(spans[0], "span:first-child")?);
    assert!(doc.matches_selector(spans[2], "span:last-child")?);
    assert!(doc.matches_selector(spans[1], "span:nth-child(2)")?);
    assert!(doc.matches_selector(spans[1], "span:nth-last-child(2)")?);
    assert!(doc.matches_selector(spans[0], "span:nth-child(odd)")?);
    assert!(doc.matches_selector(spans[1], "span:nth-child(even)")?);
    assert!(doc.matches_selector(spans[2], "span:nth-child(2n+1)")?);
    assert!(!doc.matches_selector(spans[0], "span:only-child")?);
    Ok(())
}

#[test]
fn nth_child_an_plus_b_handles_negative_coefficients() -> Result<()> {
    let doc = Document::from_html("<ul><li>1</li><li>2</li><li>3</li><li>4</li></ul>")?;
    let items = doc.query_selector_all("li")?;

    // -n+2 selects the first two children
    let matched = doc.query_selector_all("li:nth-child(-n+2)")?;
    assert_eq!(matched, vec![items[0], items[1]]);
    Ok(())
}

#[test]
fn not_pseudo_class_inverts_simple_steps() -> Result<()> {
    let doc = Document::from_html("<ul><li class='active'>a</li><li>b</li></ul>")?;
    let plain = doc.query_selector_all("li:not(.active)")?;
    assert_eq!(plain.len(), 1);
    assert_eq!(doc.text_content(plain[0]), "b");
    Ok(())
}

#[test]
fn id_fast_path_uses_the_index() -> Result<()> {
    let doc = Document::from_html(r#"<div id="a"><span id="b">x</span></div>"#)?;
    assert_eq!(doc.query_selector("#b")?, doc.by_id("b"));
    assert_eq!(doc.query_selector("#missing")?, None);
    Ok(())
}

#[test]
fn scoped_queries_exclude_the_scope_root() -> Result<()> {
    let doc = Document::from_html("<div class='x'><div class='x'>inner</div></div>")?;
    let outer = doc.query_selector(".x")?.expect("outer exists");

    let scoped = doc.query_selector_all_from(outer, "div.x")?;
    assert_eq!(scoped.len(), 1);
    assert_ne!(scoped[0], outer);
    Ok(())
}

#[test]
fn unsupported_selectors_are_rejected() -> Result<()> {
    let doc = Document::from_html("<div>x</div>")?;

    for bad in ["", "div >", "> div", "div::", ":hover", "div,,span", "[unclosed"] {
        let err = doc
            .query_selector_all(bad)
            .expect_err("selector should be rejected");
        match err {
            Error::UnsupportedSelector(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }
    Ok(())
}

#[test]
fn sibling_navigation_skips_text_nodes() -> Result<()> {
    let doc = Document::from_html("<div><b>a</b> mid <i>b</i></div>")?;
    let b = doc.query_selector("b")?.expect("b exists");
    let i = doc.query_selector("i")?.expect("i exists");

    assert_eq!(doc.next_element_sibling(b), Some(i));
    assert_eq!(doc.previous_element_sibling(i), Some(b));
    assert_eq!(doc.element_index(b), Some(1));
    assert_eq!(doc.element_index(i), Some(2));
    Ok(())
}

#[test]
fn elements_listing_is_in_tree_order() -> Result<()> {
    let doc = Document::from_html("<div><span>a</span></div><p>b</p>")?;
    let tags = doc
        .elements()
        .into_iter()
        .map(|element| doc.tag_name(element).unwrap_or("").to_string())
        .collect::<Vec<_>>();
    assert_eq!(tags, ["div", "span", "p"]);
    Ok(())
}

#[test]
fn universal_selector_matches_every_element() -> Result<()> {
    let doc = Document::from_html("<div><span>a</span></div>")?;
    assert_eq!(doc.query_selector_all("*")?.len(), 2);
    Ok(())
}
