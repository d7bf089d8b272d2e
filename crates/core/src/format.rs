//! Markdown to Intercom-ready HTML, and HTML cleanup
//!
//! Intercom's article editor expects a few presentational hooks on the HTML it
//! receives: paragraphs carry the `no-margin` class and tables sit inside a
//! table container `div` with `role="presentation"`. [`format_content`] renders
//! markdown and applies those hooks by re-serializing the parsed fragment;
//! [`clean_html`] strips the title heading from HTML that already has one.

use std::sync::LazyLock;

use ego_tree::NodeRef;
use pulldown_cmark::{Options, Parser};
use regex::Regex;
use scraper::node::Element;
use scraper::{Html, Node};

/// Class added to every paragraph
pub const PARAGRAPH_CLASS: &str = "no-margin";

/// Class of the `div` wrapping every table
pub const TABLE_CONTAINER_CLASS: &str = "intercom-interblocks-table-container";

/// `role` attribute set on every table
pub const TABLE_ROLE: &str = "presentation";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Closed `<h1>` elements, plus the comments and raw-text elements an `<h1>`
/// can hide in. Scanning left to right, whichever starts first wins, so an
/// `<h1>` inside a comment or script is consumed as part of it.
static TITLE_SCAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<!--.*?-->|<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|(?P<h1><h1\b[^>]*>.*?</h1\s*>)",
    )
    .expect("title pattern is valid")
});

/// Render markdown (CommonMark plus tables and strikethrough) to HTML
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(
        markdown,
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH,
    );

    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

/// Convert markdown into an HTML fragment ready to be used as an article body.
///
/// When `title` is given (and not empty) an `<h1>` holding it becomes the first
/// element. Every `<p>` gets `class="no-margin"`, replacing any class it had.
/// Every `<table>` gets `role="presentation"` and is wrapped in a
/// `div.intercom-interblocks-table-container`.
///
/// The input must be markdown: running the output through this function again
/// wraps its tables a second time.
pub fn format_content(content: &str, title: Option<&str>) -> String {
    let html = markdown_to_html(content);
    let fragment = Html::parse_fragment(&html);

    let mut out = String::with_capacity(html.len() + 128);

    if let Some(title) = title.filter(|t| !t.is_empty()) {
        out.push_str("<h1>");
        out.push_str(&html_escape::encode_text(title));
        out.push_str("</h1>");
    }

    for child in fragment.root_element().children() {
        write_node(child, &mut out);
    }

    out
}

/// Remove the first `<h1>` (the title, rendered elsewhere by Intercom) and any
/// whitespace left at the start. The rest of the markup is returned untouched.
///
/// Headings inside comments, `<script>` and `<style>` are not titles and are
/// skipped. An `<h1>` with no closing tag is left in place.
pub fn clean_html(content: &str) -> String {
    let title = TITLE_SCAN
        .captures_iter(content)
        .find_map(|captures| captures.name("h1"));

    match title {
        Some(title) => {
            let mut out = String::with_capacity(content.len() - title.len());
            out.push_str(&content[..title.start()]);
            out.push_str(&content[title.end()..]);
            out.trim_start().to_string()
        }
        None => content.trim_start().to_string(),
    }
}

fn write_node(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => {
            let raw = node
                .parent()
                .and_then(|parent| parent.value().as_element())
                .is_some_and(|parent| RAW_TEXT_ELEMENTS.contains(&parent.name()));

            if raw {
                out.push_str(text);
            } else {
                out.push_str(&html_escape::encode_text(&**text));
            }
        }
        Node::Element(element) => write_element(node, element, out),
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        _ => {}
    }
}

fn write_element(node: NodeRef<'_, Node>, element: &Element, out: &mut String) {
    let name = element.name();
    let is_paragraph = name == "p";
    let is_table = name == "table";

    if is_table {
        out.push_str(&format!(r#"<div class="{TABLE_CONTAINER_CLASS}">"#));
    }

    out.push('<');
    out.push_str(name);

    for (key, value) in element.attrs() {
        if (is_paragraph && key == "class") || (is_table && key == "role") {
            continue;
        }
        push_attribute(out, key, value);
    }

    if is_paragraph {
        push_attribute(out, "class", PARAGRAPH_CLASS);
    }
    if is_table {
        push_attribute(out, "role", TABLE_ROLE);
    }

    out.push('>');

    if VOID_ELEMENTS.contains(&name) {
        return;
    }

    for child in node.children() {
        write_node(child, out);
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');

    if is_table {
        out.push_str("</div>");
    }
}

fn push_attribute(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    out.push_str(&html_escape::encode_double_quoted_attribute(value));
    out.push('"');
}
