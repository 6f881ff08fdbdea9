//! Markdown to HTML conversion with style annotation.
//!
//! Conversion itself is pulldown-cmark's. This module sits between the parser
//! and the HTML writer and rewrites the event stream so that styled elements
//! carry a `class` attribute from the [`StyleConfig`].
//!
//! Headings pass through as regular events with their `classes` filled in,
//! which keeps inline attribute syntax working: a heading written as
//! `# Title {.hero}` already has a class and is never looked up. Every other
//! element type is emitted as a raw opening tag when (and only when) it has
//! classes; its closing tag still comes from the writer.
//!
//! Unstyled documents produce exactly what pulldown-cmark would produce on
//! its own.

use crate::style::{ElementType, StyleConfig};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use pulldown_cmark::{
    CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd,
    html as md_html,
};
use std::borrow::Cow;

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Convert markdown to HTML, attaching classes resolved for `context`.
pub fn render(markdown: &str, styles: &StyleConfig, context: &str) -> String {
    let parser = Parser::new_ext(markdown, options());
    let events = annotate(parser, styles, context);
    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    md_html::push_html(&mut html, events.into_iter());
    html
}

/// Text of the first non-empty level-1 heading.
pub fn extract_title(markdown: &str) -> Option<String> {
    let mut in_title = false;
    let mut title = String::new();

    for event in Parser::new_ext(markdown, options()) {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) => {
                in_title = true;
                title.clear();
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                let trimmed = title.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
                in_title = false;
            }
            Event::Text(text) | Event::Code(text) if in_title => title.push_str(&text),
            Event::SoftBreak | Event::HardBreak if in_title => title.push(' '),
            _ => {}
        }
    }
    None
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Bytes pulldown-cmark's writer percent-encodes in `href` and `src`
/// values. Non-ASCII bytes are always encoded.
const HREF_UNSAFE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

fn attr(value: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(value)
}

/// URL attribute value encoded the way the writer encodes unstyled links.
fn url_attr(url: &str) -> String {
    let encoded = utf8_percent_encode(url, HREF_UNSAFE).to_string();
    attr(&encoded).into_owned()
}

fn class_attr(classes: &str) -> String {
    format!(" class=\"{}\"", attr(classes))
}

fn title_attr(title: &str) -> String {
    if title.is_empty() {
        String::new()
    } else {
        format!(" title=\"{}\"", attr(title))
    }
}

// ============================================================================
// Event annotation
// ============================================================================

fn annotate<'a>(
    mut events: impl Iterator<Item = Event<'a>>,
    styles: &StyleConfig,
    context: &str,
) -> Vec<Event<'a>> {
    let mut out = Vec::new();

    while let Some(event) = events.next() {
        let annotated = match event {
            Event::Start(Tag::Heading {
                level,
                id,
                mut classes,
                attrs,
            }) => {
                if classes.is_empty() {
                    let element = ElementType::heading(heading_level_to_num(level));
                    let resolved = styles.classes_for(element, context);
                    if !resolved.is_empty() {
                        classes.push(CowStr::from(resolved.to_string()));
                    }
                }
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                })
            }
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let classes = styles.classes_for(ElementType::Image, context);
                if classes.is_empty() {
                    Event::Start(Tag::Image {
                        link_type,
                        dest_url,
                        title,
                        id,
                    })
                } else {
                    let alt = collect_alt_text(&mut events);
                    Event::InlineHtml(CowStr::from(format!(
                        "<img src=\"{}\" alt=\"{}\"{}{} />",
                        url_attr(&dest_url),
                        attr(&alt),
                        title_attr(&title),
                        class_attr(classes)
                    )))
                }
            }
            Event::Start(tag) => match styled_open_tag(&tag, styles, context) {
                Some(html) => html,
                None => Event::Start(tag),
            },
            Event::Code(code) => {
                let classes = styles.classes_for(ElementType::Code, context);
                if classes.is_empty() {
                    Event::Code(code)
                } else {
                    Event::InlineHtml(CowStr::from(format!(
                        "<code{}>{}</code>",
                        class_attr(classes),
                        html_escape::encode_text(&*code)
                    )))
                }
            }
            other => other,
        };
        out.push(annotated);
    }

    out
}

/// Raw opening tag for a styled block or link, or `None` to keep the
/// writer's own rendering.
fn styled_open_tag<'a>(tag: &Tag<'a>, styles: &StyleConfig, context: &str) -> Option<Event<'a>> {
    let element = match tag {
        Tag::Paragraph => ElementType::Paragraph,
        Tag::BlockQuote(None) => ElementType::Blockquote,
        Tag::List(_) => ElementType::List,
        Tag::Item => ElementType::ListItem,
        Tag::CodeBlock(_) => ElementType::CodeBlock,
        Tag::Link { .. } => ElementType::Link,
        _ => return None,
    };
    let classes = styles.classes_for(element, context);
    if classes.is_empty() {
        return None;
    }
    let class = class_attr(classes);

    let html = match tag {
        Tag::Paragraph => format!("<p{class}>"),
        Tag::BlockQuote(_) => format!("<blockquote{class}>\n"),
        Tag::List(Some(1)) => format!("<ol{class}>\n"),
        Tag::List(Some(start)) => format!("<ol start=\"{start}\"{class}>\n"),
        Tag::List(None) => format!("<ul{class}>\n"),
        Tag::Item => format!("<li{class}>"),
        Tag::CodeBlock(CodeBlockKind::Fenced(info)) => {
            let lang = info.split(' ').next().unwrap_or("");
            if lang.is_empty() {
                format!("<pre{class}><code>")
            } else {
                format!("<pre{class}><code class=\"language-{}\">", attr(lang))
            }
        }
        Tag::CodeBlock(CodeBlockKind::Indented) => format!("<pre{class}><code>"),
        Tag::Link {
            link_type,
            dest_url,
            title,
            ..
        } => {
            let href = if *link_type == LinkType::Email {
                format!("mailto:{}", &**dest_url)
            } else {
                (**dest_url).to_string()
            };
            format!(
                "<a href=\"{}\"{}{class}>",
                url_attr(&href),
                title_attr(title)
            )
        }
        _ => return None,
    };

    let event = if matches!(tag, Tag::Link { .. }) {
        Event::InlineHtml(CowStr::from(html))
    } else {
        Event::Html(CowStr::from(html))
    };
    Some(event)
}

/// Consume events up to the matching image end, returning their plain text.
fn collect_alt_text<'a>(events: &mut impl Iterator<Item = Event<'a>>) -> String {
    let mut alt = String::new();
    let mut nesting = 0usize;
    for event in events.by_ref() {
        match event {
            Event::Start(_) => nesting += 1,
            Event::End(TagEnd::Image) if nesting == 0 => break,
            Event::End(_) => nesting = nesting.saturating_sub(1),
            Event::Text(text) | Event::Code(text) => alt.push_str(&text),
            Event::SoftBreak | Event::HardBreak => alt.push(' '),
            _ => {}
        }
    }
    alt
}
