use marksift::html_to_markdown;

const PRODUCT_PAGE: &str = r#"<html><body>
<nav>skip</nav>
<article>
<h1>Title</h1>
<p>Hello <a href="https://x.com">world</a></p>
</article>
</body></html>"#;

#[test]
fn end_to_end_product_page() {
    let md = html_to_markdown(PRODUCT_PAGE).unwrap();
    assert!(md.contains("# Title"));
    assert!(md.contains("[world](https://x.com)"));
    assert!(!md.contains("skip"));
}

#[test]
fn conversion_is_deterministic() {
    let first = html_to_markdown(PRODUCT_PAGE).unwrap();
    for _ in 0..5 {
        assert_eq!(html_to_markdown(PRODUCT_PAGE).unwrap(), first);
    }
}

#[test]
fn empty_and_blank_input_yield_none() {
    assert!(html_to_markdown("").is_none());
    assert!(html_to_markdown("   \n\t ").is_none());
}

#[test]
fn markup_with_no_text_yields_none() {
    assert!(html_to_markdown("<html><body><script>var x = 1;</script></body></html>").is_none());
}

#[test]
fn output_never_has_three_consecutive_newlines() {
    let html = r#"<html><body>
        <div><p>first</p></div>
        <div><div><div><p>second</p></div></div></div>
        <div><p>third</p></div>
    </body></html>"#;
    let md = html_to_markdown(html).unwrap();
    assert!(!md.contains("\n\n\n"));
    assert!(md.contains("first"));
    assert!(md.contains("second"));
    assert!(md.contains("third"));
}

#[test]
fn boilerplate_lines_are_filtered() {
    let html = r#"<html><body><main>
        <p>Actual review content</p>
        <p>All Rights Reserved</p>
        <p>Please accept our Cookie policy</p>
        <p>var tracker = init();</p>
    </main></body></html>"#;
    let md = html_to_markdown(html).unwrap();
    assert!(md.contains("Actual review content"));
    assert!(!md.to_lowercase().contains("rights reserved"));
    assert!(!md.to_lowercase().contains("cookie"));
    assert!(!md.contains("var tracker"));
}

#[test]
fn repeated_text_appears_once() {
    let html = r#"<html><body><main>
        <p>Free shipping on all orders</p>
        <div><p>Free shipping on all orders</p></div>
        <p>Unique closing line</p>
    </main></body></html>"#;
    let md = html_to_markdown(html).unwrap();
    assert_eq!(md.matches("Free shipping on all orders").count(), 1);
    assert!(md.contains("Unique closing line"));
}

#[test]
fn headings_lists_and_emphasis_survive() {
    let html = r#"<html><body><main>
        <h2>Grinder comparison</h2>
        <ul><li>Burr model</li><li>Blade model</li></ul>
        <p><strong>Verdict</strong> and <em>caveats</em></p>
    </main></body></html>"#;
    let md = html_to_markdown(html).unwrap();
    assert!(md.contains("## Grinder comparison"));
    assert!(md.contains("* Burr model"));
    assert!(md.contains("* Blade model"));
    assert!(md.contains("**Verdict**"));
    assert!(md.contains("*caveats*"));
}

#[test]
fn noise_identifier_classes_prune_whole_subtrees() {
    let html = r#"<html><body>
        <div class="cookie-banner"><p>We value your privacy</p></div>
        <div id="sidebar"><p>Related posts</p></div>
        <p>Kept paragraph</p>
    </body></html>"#;
    let md = html_to_markdown(html).unwrap();
    assert!(md.contains("Kept paragraph"));
    assert!(!md.contains("privacy"));
    assert!(!md.contains("Related posts"));
}

#[test]
fn malformed_markup_still_converts() {
    // Unclosed tags; the parser is lenient by construction.
    let html = "<html><body><main><h1>Broken<p>but readable";
    let md = html_to_markdown(html).unwrap();
    assert!(md.contains("# Broken"));
    assert!(md.contains("but readable"));
}

#[test]
fn article_is_used_when_main_is_absent() {
    let html = r#"<html><body>
        <p>outside the article</p>
        <article><p>inside the article</p></article>
    </body></html>"#;
    let md = html_to_markdown(html).unwrap();
    assert!(md.contains("inside the article"));
    assert!(!md.contains("outside the article"));
}
