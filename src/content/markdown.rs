//! Markdown rendering: GFM parse, link/image/list transforms, syntax
//! highlighting, and allow-list sanitization.
//!
//! The pipeline is a sequence of passes over the pulldown-cmark event
//! stream, serialized once and cleaned by ammonia at the end. It is a pure
//! function of its input; nothing is cached between calls.

use ammonia::Builder;
use anyhow::Result;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::html::{ClassedHTMLGenerator, ClassStyle};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Markdown renderer with syntax highlighting and HTML sanitization
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    sanitizer: Builder<'static>,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            sanitizer: build_sanitizer(),
        }
    }

    /// Render markdown to sanitized HTML.
    ///
    /// Pass order matters: link and image rewrites run on the raw parse,
    /// highlighting replaces code-block events with raw HTML, and the
    /// sanitizer has the final word on everything, including raw HTML
    /// embedded in the source document.
    pub fn render(&self, markdown: &str) -> Result<String> {
        if markdown.trim().is_empty() {
            return Ok(String::new());
        }

        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;

        let events: Vec<Event> = Parser::new_ext(markdown, options).collect();
        let events = wrap_image_captions(events);
        let events = rewrite_external_links(events);
        let events = tag_list_kinds(events);
        let events = self.highlight_code_blocks(events);

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(self.sanitizer.clean(&html_output).to_string())
    }

    /// Render markdown, falling back to the escaped raw content in a
    /// minimal container instead of failing the whole page.
    pub fn render_or_raw(&self, markdown: &str) -> String {
        match self.render(markdown) {
            Ok(html) => html,
            Err(err) => {
                tracing::warn!("markdown rendering failed, falling back to raw: {}", err);
                raw_fallback(markdown)
            }
        }
    }

    /// Replace fenced code blocks with highlighted `<pre><code>` HTML
    fn highlight_code_blocks<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut out = Vec::with_capacity(events.len());
        let mut block: Option<(Option<String>, String)> = None;

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                            Some(lang.to_string())
                        }
                        _ => None,
                    };
                    block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = block.take() {
                        let rendered = self.render_code_block(&code, lang.as_deref());
                        out.push(Event::Html(CowStr::from(rendered)));
                    }
                }
                Event::Text(text) => match block.as_mut() {
                    Some((_, code)) => code.push_str(&text),
                    None => out.push(Event::Text(text)),
                },
                other => out.push(other),
            }
        }

        out
    }

    fn render_code_block(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");
        // The language-c marker feeds the client-side brace-coloring pass
        let braces_attr = if lang == "c" {
            r#" data-c-braces="styled""#
        } else {
            ""
        };
        let body = self
            .highlight(code, lang)
            .unwrap_or_else(|| html_escape(code));

        format!(
            r#"<pre><code class="language-{lang}" data-language="{lang}"{braces_attr}>{body}</code></pre>"#
        )
    }

    /// Class-based highlighting so the markup survives sanitization;
    /// unknown languages or highlighter errors fall back to escaped text.
    fn highlight(&self, code: &str, lang: &str) -> Option<String> {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))?;

        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &self.syntax_set,
            ClassStyle::SpacedPrefixed { prefix: "hljs-" },
        );
        for line in LinesWithEndings::from(code) {
            if generator
                .parse_html_for_line_which_includes_newline(line)
                .is_err()
            {
                return None;
            }
        }
        Some(generator.finalize())
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Anchors pointing at `http(s)` targets open in a new context with
/// no-referrer/no-opener semantics; relative links are left untouched.
fn rewrite_external_links(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut in_external = false;

    for event in events {
        match event {
            Event::Start(Tag::Link {
                dest_url, title, ..
            }) if dest_url.starts_with("http") => {
                out.push(Event::Html(CowStr::from(anchor_open(&dest_url, &title))));
                in_external = true;
            }
            Event::End(TagEnd::Link) if in_external => {
                out.push(Event::Html(CowStr::from("</a>")));
                in_external = false;
            }
            other => out.push(other),
        }
    }

    out
}

/// Opening anchor markup; external targets get the new-tab attributes
fn anchor_open(dest: &str, title: &str) -> String {
    let title_attr = if title.is_empty() {
        String::new()
    } else {
        format!(r#" title="{}""#, html_escape(title))
    };
    if dest.starts_with("http") {
        format!(
            r#"<a href="{}"{} target="_blank" rel="noopener noreferrer">"#,
            html_escape(dest),
            title_attr
        )
    } else {
        format!(r#"<a href="{}"{}>"#, html_escape(dest), title_attr)
    }
}

/// Wrap images carrying non-empty alt text in a `<figure>` with a
/// `<figcaption>` sibling holding the alt text.
///
/// The emitted `data-processed` marker makes the pass idempotent: a second
/// run only ever sees raw HTML events, never image tags, so already
/// wrapped output passes through unchanged.
fn wrap_image_captions(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut iter = events.into_iter().peekable();

    while let Some(event) = iter.next() {
        match event {
            // A link wrapping an image moves inside the figure so no
            // dangling anchor leaks around the block-level wrapper
            Event::Start(Tag::Link {
                dest_url, title, ..
            }) if matches!(iter.peek(), Some(Event::Start(Tag::Image { .. }))) => {
                let (img_dest, img_title) = match iter.next() {
                    Some(Event::Start(Tag::Image {
                        dest_url, title, ..
                    })) => (dest_url, title),
                    _ => continue,
                };
                let alt = collect_alt(&mut iter);
                let open = anchor_open(&dest_url, &title);

                // The link held only the image: consume its end tag and
                // emit the whole construct as one raw block
                if matches!(iter.peek(), Some(Event::End(TagEnd::Link))) {
                    iter.next();
                    let html = if alt.trim().is_empty() {
                        format!("{}{}</a>", open, image_tag(&img_dest, &img_title, "", false))
                    } else {
                        format!(
                            "<figure>{}{}</a><figcaption>{}</figcaption></figure>",
                            open,
                            image_tag(&img_dest, &img_title, &alt, true),
                            html_escape(&alt)
                        )
                    };
                    out.push(Event::Html(CowStr::from(html)));
                } else {
                    // Mixed link content; the remaining children and the
                    // link end flow through as-is
                    out.push(Event::Html(CowStr::from(open)));
                    out.push(Event::Html(CowStr::from(render_image(
                        &img_dest, &img_title, &alt,
                    ))));
                }
            }
            Event::Start(Tag::Image {
                dest_url, title, ..
            }) => {
                let alt = collect_alt(&mut iter);
                out.push(Event::Html(CowStr::from(render_image(
                    &dest_url, &title, &alt,
                ))));
            }
            other => out.push(other),
        }
    }

    out
}

/// Consume events up to the matching image end, collecting the alt text
fn collect_alt<'a>(iter: &mut impl Iterator<Item = Event<'a>>) -> String {
    let mut alt = String::new();
    let mut depth = 0usize;

    for event in iter {
        match event {
            Event::Start(Tag::Image { .. }) => depth += 1,
            Event::End(TagEnd::Image) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Event::Text(text) | Event::Code(text) => alt.push_str(&text),
            Event::SoftBreak | Event::HardBreak => alt.push(' '),
            _ => {}
        }
    }

    alt
}

fn image_tag(dest: &str, title: &str, alt: &str, processed: bool) -> String {
    let title_attr = if title.is_empty() {
        String::new()
    } else {
        format!(r#" title="{}""#, html_escape(title))
    };
    let processed_attr = if processed {
        r#" data-processed="true""#
    } else {
        ""
    };
    format!(
        r#"<img src="{}" alt="{}"{}{}>"#,
        html_escape(dest),
        html_escape(alt),
        title_attr,
        processed_attr
    )
}

fn render_image(dest: &str, title: &str, alt: &str) -> String {
    if alt.trim().is_empty() {
        // No caption to show; keep the image bare
        image_tag(dest, title, "", false)
    } else {
        format!(
            "<figure>{}<figcaption>{}</figcaption></figure>",
            image_tag(dest, title, alt, true),
            html_escape(alt)
        )
    }
}

/// Tag every markdown-generated list with a class naming its kind, for the
/// client-side list styling hooks
fn tag_list_kinds(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());

    for event in events {
        match event {
            Event::Start(Tag::List(Some(start))) => {
                let html = if start == 1 {
                    r#"<ol class="markdown-ol">"#.to_string()
                } else {
                    format!(r#"<ol start="{}" class="markdown-ol">"#, start)
                };
                out.push(Event::Html(CowStr::from(html)));
            }
            Event::Start(Tag::List(None)) => {
                out.push(Event::Html(CowStr::from(r#"<ul class="markdown-ul">"#)));
            }
            Event::End(TagEnd::List(true)) => out.push(Event::Html(CowStr::from("</ol>"))),
            Event::End(TagEnd::List(false)) => out.push(Event::Html(CowStr::from("</ul>"))),
            other => out.push(other),
        }
    }

    out
}

/// The sanitization allow-list: the single security boundary of the
/// renderer. Elements and attributes outside it are removed, not escaped.
fn build_sanitizer() -> Builder<'static> {
    let mut builder = Builder::default();
    builder
        .add_tags([
            "figure",
            "figcaption",
            "details",
            "summary",
            "strike",
            "del",
            "s",
        ])
        .add_generic_attributes(["class", "data-language"])
        .add_tag_attributes("code", ["data-c-braces"])
        .add_tag_attributes("img", ["data-processed"])
        .add_tag_attributes("ol", ["start"])
        .add_tag_attributes("table", ["border", "cellpadding", "cellspacing"])
        .add_tag_attributes("th", ["scope", "colspan", "rowspan", "align"])
        .add_tag_attributes("td", ["colspan", "rowspan", "align"])
        // rel is managed by the external-link pass, not rewritten globally
        .link_rel(None)
        .add_tag_attributes("a", ["target", "rel"]);
    builder
}

/// Minimal container shown when rendering fails outright
fn raw_fallback(markdown: &str) -> String {
    format!(
        r#"<div class="markdown-raw"><pre>{}</pre></div>"#,
        html_escape(markdown)
    )
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(markdown: &str) -> String {
        MarkdownRenderer::new().render(markdown).unwrap()
    }

    #[test]
    fn test_render_basic_markdown() {
        let html = render("# Hello World\n\nThis is a test.");
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_empty_input_renders_empty() {
        assert_eq!(render(""), "");
        assert_eq!(render("   \n"), "");
    }

    #[test]
    fn test_image_with_alt_becomes_figure() {
        let html = render("![A caption](img.png)\n\n# Title");
        assert!(html.contains("<figure>"));
        assert!(html.contains(r#"alt="A caption""#));
        assert!(html.contains(r#"data-processed="true""#));
        assert!(html.contains("<figcaption>A caption</figcaption>"));
        assert!(html.contains("<h1>Title</h1>"));
    }

    #[test]
    fn test_image_without_alt_stays_bare() {
        let html = render("![](img.png)");
        assert!(!html.contains("<figure>"));
        assert!(!html.contains("figcaption"));
        assert!(html.contains(r#"src="img.png""#));
    }

    #[test]
    fn test_caption_wrapping_is_idempotent() {
        let options = Options::ENABLE_TABLES | Options::ENABLE_GFM;
        let events: Vec<Event> = Parser::new_ext("![A caption](img.png)", options).collect();

        let once = wrap_image_captions(events);
        let twice = wrap_image_captions(once.clone());

        let mut html_once = String::new();
        html::push_html(&mut html_once, once.into_iter());
        let mut html_twice = String::new();
        html::push_html(&mut html_twice, twice.into_iter());

        assert_eq!(html_once, html_twice);
    }

    #[test]
    fn test_linked_image_keeps_anchor_inside_figure() {
        let html = render("[![pic](i.png)](https://x.com)");
        assert!(html.contains("<figure>"));
        assert!(html.contains("<figcaption>pic</figcaption>"));

        // The anchor wraps the image instead of dangling empty around
        // the block-level figure
        let open = html.find("<a ").unwrap();
        let img = html.find("<img").unwrap();
        let close = html.find("</a>").unwrap();
        assert!(open < img && img < close);
        assert!(html.contains(r#"rel="noopener noreferrer""#));
    }

    #[test]
    fn test_linked_image_without_alt_stays_plain_link() {
        let html = render("[![](badge.svg)](https://ci.example.com)");
        assert!(!html.contains("<figure>"));
        assert!(html.contains("badge.svg"));
        assert!(html.contains(r#"target="_blank""#));
    }

    #[test]
    fn test_external_links_open_in_new_tab() {
        let html = render("[site](https://example.com) and [local](/about)");
        assert!(html.contains(r#"target="_blank""#));
        assert!(html.contains(r#"rel="noopener noreferrer""#));
        // The relative link keeps its plain form
        assert!(html.contains(r#"<a href="/about">local</a>"#));
    }

    #[test]
    fn test_lists_get_kind_classes() {
        let html = render("- one\n- two\n\n1. first\n2. second");
        assert!(html.contains(r#"<ul class="markdown-ul">"#));
        assert!(html.contains(r#"<ol class="markdown-ol">"#));
    }

    #[test]
    fn test_ordered_list_start_preserved() {
        let html = render("3. third\n4. fourth");
        assert!(html.contains(r#"start="3""#));
        assert!(html.contains("markdown-ol"));
    }

    #[test]
    fn test_code_block_language_classes() {
        let html = render("```rust\nfn main() {}\n```");
        assert!(html.contains(r#"class="language-rust""#));
        assert!(html.contains(r#"data-language="rust""#));
        assert!(!html.contains("data-c-braces"));
    }

    #[test]
    fn test_c_code_gets_brace_marker() {
        let html = render("```c\nint main(void) { return 0; }\n```");
        assert!(html.contains(r#"class="language-c""#));
        assert!(html.contains(r#"data-c-braces="styled""#));
    }

    #[test]
    fn test_unknown_language_falls_back_to_escaped_text() {
        let html = render("```nosuchlang\na < b\n```");
        assert!(html.contains("language-nosuchlang"));
        assert!(html.contains("a &lt; b"));
    }

    #[test]
    fn test_script_tags_are_removed() {
        let html = render("hello\n\n<script>alert('x')</script>\n");
        assert!(!html.contains("<script"));
        assert!(!html.contains("alert"));
        assert!(html.contains("hello"));
    }

    #[test]
    fn test_event_handler_attributes_are_removed() {
        let html = render(r#"<img src="x.png" onerror="alert(1)">"#);
        assert!(!html.contains("onerror"));
        assert!(!html.contains("alert"));
    }

    #[test]
    fn test_gfm_table_and_strikethrough_survive() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_raw_fallback_escapes_content() {
        let fallback = raw_fallback("<script>alert(1)</script>");
        assert!(fallback.starts_with(r#"<div class="markdown-raw"><pre>"#));
        assert!(!fallback.contains("<script>"));
        assert!(fallback.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_render_or_raw_passes_through_good_input() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render_or_raw("# ok");
        assert!(html.contains("<h1>ok</h1>"));
    }
}
