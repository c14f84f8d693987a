mod noise;

pub use noise::NoiseFilter;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Convert raw HTML into clean, de-duplicated Markdown with the default
/// noise filter. Empty input yields `None`; the parser itself is lenient
/// and never fails on malformed markup.
pub fn html_to_markdown(html: &str) -> Option<String> {
    html_to_markdown_filtered(html, &NoiseFilter::default())
}

/// Same transform with a caller-supplied [`NoiseFilter`].
///
/// The walk is a depth-first linearization of the likely content region:
/// `<main>` if present, else `<article>`, else `<body>`, else the whole
/// document. Three independent noise-reduction layers apply: subtree
/// pruning (tag/identifier/empty-content), exact-text deduplication, and
/// line-level substring rejection.
pub fn html_to_markdown_filtered(html: &str, filter: &NoiseFilter) -> Option<String> {
    if html.trim().is_empty() {
        return None;
    }

    let document = Html::parse_document(html);
    let root = scan_root(&document);

    let mut lines: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    walk(root, filter, &mut lines, &mut seen);

    let joined = lines
        .iter()
        .filter(|line| !filter.is_noise_line(line))
        .filter(|line| !line.trim().is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join("\n");

    // Paragraph spacing: never more than one blank line in a row.
    let re_multi_newline = Regex::new(r"\n{3,}").expect("static regex");
    let markdown = re_multi_newline.replace_all(&joined, "\n\n").into_owned();
    if markdown.trim().is_empty() {
        return None;
    }
    Some(markdown)
}

/// Prefer the likely content container over the full document.
fn scan_root(document: &Html) -> ElementRef<'_> {
    for name in ["main", "article", "body"] {
        if let Ok(selector) = Selector::parse(name) {
            if let Some(element) = document.select(&selector).next() {
                return element;
            }
        }
    }
    document.root_element()
}

/// One frame of the explicit traversal stack. `tail` is the text that
/// follows the element inside its parent; it belongs to this frame so that
/// pruning an element also drops its tail, matching reading order.
enum Step<'a> {
    Element {
        element: ElementRef<'a>,
        depth: usize,
        tail: Option<String>,
    },
    Tail {
        text: String,
        depth: usize,
    },
}

fn walk(root: ElementRef<'_>, filter: &NoiseFilter, lines: &mut Vec<String>, seen: &mut HashSet<String>) {
    let mut stack = vec![Step::Element {
        element: root,
        depth: 0,
        tail: None,
    }];

    while let Some(step) = stack.pop() {
        match step {
            Step::Tail { text, depth } => {
                emit_plain(&text, depth, lines, seen);
            }
            Step::Element { element, depth, tail } => {
                if should_skip(element, filter) {
                    continue;
                }

                let tag = element.value().name();
                let indent = "  ".repeat(depth);
                let prefix = line_prefix(tag);

                // Direct text: runs before the first child element. Text
                // between or after child elements is those children's tail.
                let (direct, children) = partition_children(element, depth);
                let text = direct.trim();

                if !text.is_empty() && !seen.contains(text) {
                    // Anchors with a followable href replace their text with
                    // a link and terminate the frame: children and tail of a
                    // link are not walked.
                    if tag == "a" {
                        if let Some(href) = element.value().attr("href") {
                            if is_followable_href(href) {
                                lines.push(format!("{indent}{prefix}[{text}]({href})"));
                                seen.insert(text.to_string());
                                continue;
                            }
                        }
                    }

                    let rendered = match tag {
                        "strong" | "b" => format!("**{text}**"),
                        "em" | "i" => format!("*{text}*"),
                        _ => text.to_string(),
                    };
                    lines.push(format!("{indent}{prefix}{rendered}"));
                    seen.insert(text.to_string());
                }

                // LIFO: push the tail below the children so the subtree is
                // emitted first, then the element's trailing text.
                if let Some(text) = tail {
                    stack.push(Step::Tail { text, depth });
                }
                for child in children.into_iter().rev() {
                    stack.push(child);
                }
            }
        }
    }
}

/// Split an element's children into its direct leading text and an ordered
/// list of child frames, attaching inter-element text to the preceding
/// child as its tail.
fn partition_children<'a>(element: ElementRef<'a>, depth: usize) -> (String, Vec<Step<'a>>) {
    let mut direct = String::new();
    let mut children: Vec<Step<'a>> = Vec::new();

    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            children.push(Step::Element {
                element: child_element,
                depth: depth + 1,
                tail: None,
            });
        } else if let Some(text) = child.value().as_text() {
            match children.last_mut() {
                None => direct.push_str(&text.text),
                Some(Step::Element { tail, .. }) => {
                    tail.get_or_insert_with(String::new).push_str(&text.text);
                }
                Some(Step::Tail { .. }) => unreachable!("only element frames are queued as children"),
            }
        }
    }

    (direct, children)
}

fn should_skip(element: ElementRef<'_>, filter: &NoiseFilter) -> bool {
    if filter.skips_tag(element.value().name()) {
        return true;
    }
    if let Some(id) = element.value().attr("id") {
        if filter.skips_identifier(id) {
            return true;
        }
    }
    if let Some(class) = element.value().attr("class") {
        if filter.skips_identifier(class) {
            return true;
        }
    }
    // Empty-content pruning: nothing anywhere in the subtree.
    !element.text().any(|t| !t.trim().is_empty())
}

fn line_prefix(tag: &str) -> &'static str {
    match tag {
        "h1" => "# ",
        "h2" => "## ",
        "h3" => "### ",
        "h4" => "#### ",
        "h5" => "##### ",
        "h6" => "###### ",
        "li" => "* ",
        _ => "",
    }
}

fn is_followable_href(href: &str) -> bool {
    !href.starts_with('#') && !href.starts_with("javascript:") && !href.starts_with("mailto:")
}

fn emit_plain(text: &str, depth: usize, lines: &mut Vec<String>, seen: &mut HashSet<String>) {
    let trimmed = text.trim();
    if trimmed.is_empty() || seen.contains(trimmed) {
        return;
    }
    lines.push(format!("{}{}", "  ".repeat(depth), trimmed));
    seen.insert(trimmed.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_none() {
        assert_eq!(html_to_markdown(""), None);
        assert_eq!(html_to_markdown("   \n  "), None);
    }

    #[test]
    fn headings_and_list_items_get_prefixes() {
        let md = html_to_markdown(
            "<html><body><h2>Specs</h2><ul><li>Burr grinder</li><li>40 oz reservoir</li></ul></body></html>",
        )
        .unwrap();
        assert!(md.contains("## Specs"));
        assert!(md.contains("* Burr grinder"));
        assert!(md.contains("* 40 oz reservoir"));
    }

    #[test]
    fn emphasis_is_wrapped() {
        let md = html_to_markdown(
            "<html><body><p><strong>Pros</strong></p><p><em>subjective</em></p></body></html>",
        )
        .unwrap();
        assert!(md.contains("**Pros**"));
        assert!(md.contains("*subjective*"));
    }

    #[test]
    fn fragment_and_javascript_links_emit_plain_text() {
        let md = html_to_markdown(
            r##"<html><body><p><a href="#top">back to top</a> and <a href="javascript:void(0)">expand</a></p></body></html>"##,
        )
        .unwrap();
        assert!(md.contains("back to top"));
        assert!(md.contains("expand"));
        assert!(!md.contains("]("));
    }

    #[test]
    fn anchor_with_href_becomes_link() {
        let md = html_to_markdown(
            r#"<html><body><p>see <a href="https://x.com/review">the full review</a></p></body></html>"#,
        )
        .unwrap();
        assert!(md.contains("[the full review](https://x.com/review)"));
    }

    #[test]
    fn duplicate_text_is_emitted_once() {
        let md = html_to_markdown(
            "<html><body><p>Free shipping</p><div><p>Free shipping</p></div><p>Details</p></body></html>",
        )
        .unwrap();
        assert_eq!(md.matches("Free shipping").count(), 1);
        assert!(md.contains("Details"));
    }

    #[test]
    fn tail_text_is_preserved_in_reading_order() {
        let md = html_to_markdown(
            "<html><body><p><b>4.5</b> out of 5 stars</p></body></html>",
        )
        .unwrap();
        let bold = md.find("**4.5**").expect("bold rating present");
        let tail = md.find("out of 5 stars").expect("tail present");
        assert!(bold < tail);
    }

    #[test]
    fn main_is_preferred_over_body() {
        let md = html_to_markdown(
            "<html><body><div><p>outside</p></div><main><p>inside</p></main></body></html>",
        )
        .unwrap();
        assert!(md.contains("inside"));
        assert!(!md.contains("outside"));
    }

    #[test]
    fn skipped_subtrees_drop_their_tails_too() {
        let md = html_to_markdown(
            "<html><body><article><nav><a href=\"/a\">Home</a></nav><p>kept</p></article></body></html>",
        )
        .unwrap();
        assert!(md.contains("kept"));
        assert!(!md.contains("Home"));
    }
}
