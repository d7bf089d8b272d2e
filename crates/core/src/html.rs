//! Small HTML builders used to assemble article bodies
//!
//! None of these escape their input: callers pass text that is already safe to
//! embed, or markup produced by the other builders.

/// Class of the horizontal rule produced by [`create_divider`]
pub const DIVIDER_CLASS: &str = "intercom-hr";

/// Heading of `level` followed by `content`, separated by blank lines.
///
/// Levels outside 2..=6 fall back to 2; level 1 is reserved for the title.
pub fn create_section(title: &str, content: &str, level: u8) -> String {
    let level = if (2..=6).contains(&level) { level } else { 2 };
    format!("<h{level}>{title}</h{level}>\n\n{content}\n\n")
}

/// Ordered (`<ol>`) or unordered (`<ul>`) list, one `<li>` per item, in order
pub fn create_list<I>(items: I, ordered: bool) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let tag = if ordered { "ol" } else { "ul" };
    let items_html = items
        .into_iter()
        .map(|item| format!("  <li>{}</li>", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n");

    format!("<{tag}>\n{items_html}\n</{tag}>")
}

pub fn create_divider() -> String {
    format!("<hr class=\"{DIVIDER_CLASS}\">\n\n")
}

pub fn bold(text: &str) -> String {
    format!("<strong>{text}</strong>")
}

pub fn italic(text: &str) -> String {
    format!("<em>{text}</em>")
}

/// Anchor to `url`. With `new_tab` the link opens in a new tab without giving
/// the target page access to the opener or the referrer.
pub fn create_link(text: &str, url: &str, new_tab: bool) -> String {
    let target = if new_tab {
        r#" target="_blank" rel="noopener noreferrer""#
    } else {
        ""
    };
    format!(r#"<a href="{url}"{target}>{text}</a>"#)
}
