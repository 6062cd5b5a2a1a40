//! Markdown rendering for assistant answers.
//!
//! Every element gets a fixed class string so answers look the same wherever
//! they are shown. Raw HTML in the source is escaped, never passed through.

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

pub const CONTAINER: &str = "bg-card p-4 rounded-lg border border-border text-sm text-foreground";

const H1: &str = "text-xl font-bold mt-4 mb-2";
const H2: &str = "text-lg font-bold mt-3 mb-2";
const H3: &str = "text-base font-semibold mt-2 mb-1";
const H_OTHER: &str = "text-sm font-semibold mt-2 mb-1";
const P: &str = "mb-2 text-sm";
const UL: &str = "list-disc list-inside mb-2 space-y-1";
const OL: &str = "list-decimal list-inside mb-2 space-y-1";
const LI: &str = "text-sm";
const STRONG: &str = "font-semibold";
const EM: &str = "italic";
const CODE: &str = "bg-muted px-1 py-0.5 rounded text-xs font-mono";
const PRE: &str = "bg-muted p-3 rounded mb-2 overflow-x-auto text-xs";
const BLOCKQUOTE: &str = "border-l-4 border-muted-foreground pl-3 italic my-2";
const TABLE: &str = "w-full border-collapse border border-border my-2 text-xs";
const THEAD: &str = "bg-muted";
const TR: &str = "border border-border";
const TH: &str = "p-2 text-left font-semibold";
const TD: &str = "p-2";
const A: &str = "text-blue-600 underline hover:text-blue-800";

const PRINT_STYLES: &str = "\
body { font-family: Arial, sans-serif; padding: 20px; }
h1, h2, h3 { color: #333; }
p { line-height: 1.6; }
ul, ol { margin: 10px 0; }
code { background: #f5f5f5; padding: 2px 6px; border-radius: 3px; }
pre { background: #f5f5f5; padding: 10px; border-radius: 5px; overflow-x: auto; }
blockquote { border-left: 4px solid #ddd; padding-left: 10px; margin: 10px 0; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
th { background: #f5f5f5; }";

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

#[derive(Default)]
struct Renderer {
    out: String,
    in_table_head: bool,
    /// >0 while inside an image; only text is emitted (as alt).
    image_depth: usize,
}

/// Renders `text` to an HTML fragment using the fixed class mapping.
pub fn render_markdown(text: &str) -> String {
    let mut r = Renderer {
        out: String::with_capacity(text.len() * 2),
        ..Default::default()
    };
    for event in Parser::new_ext(text, options()) {
        r.event(event);
    }
    r.out
}

/// Rendered answer wrapped in the styled container div.
pub fn render_answer(text: &str) -> String {
    format!(r#"<div class="{CONTAINER}">{}</div>"#, render_markdown(text))
}

/// Standalone printable page for an answer.
pub fn print_document(title: &str, text: &str) -> String {
    let mut title_html = String::new();
    escape_into(&mut title_html, title);
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<title>{title_html}</title>\n\
         <style>\n{PRINT_STYLES}\n</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        render_markdown(text)
    )
}

impl Renderer {
    fn event(&mut self, event: Event<'_>) {
        if self.image_depth > 0 {
            match event {
                Event::Text(t) | Event::Code(t) => escape_into(&mut self.out, &t),
                Event::Start(Tag::Image { .. }) => self.image_depth += 1,
                Event::End(TagEnd::Image) => {
                    self.image_depth -= 1;
                    if self.image_depth == 0 {
                        self.out.push_str("\" />");
                    }
                }
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(t) => escape_into(&mut self.out, &t),
            Event::Code(c) => {
                let _ = write!(self.out, r#"<code class="{CODE}">"#);
                escape_into(&mut self.out, &c);
                self.out.push_str("</code>");
            }
            Event::Html(h) | Event::InlineHtml(h) => escape_into(&mut self.out, &h),
            Event::SoftBreak => self.out.push('\n'),
            Event::HardBreak => self.out.push_str("<br />\n"),
            Event::Rule => self.out.push_str("<hr />\n"),
            Event::TaskListMarker(done) => self.out.push_str(if done {
                r#"<input disabled="" type="checkbox" checked="" /> "#
            } else {
                r#"<input disabled="" type="checkbox" /> "#
            }),
            _ => {}
        }
    }

    fn open(&mut self, tag: &str, class: &str) {
        let _ = write!(self.out, r#"<{tag} class="{class}">"#);
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.open("p", P),
            Tag::Heading { level, .. } => {
                let (name, class) = heading(level);
                self.open(name, class);
            }
            Tag::BlockQuote => self.open("blockquote", BLOCKQUOTE),
            Tag::CodeBlock(kind) => {
                self.open("pre", PRE);
                match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                        let mut lang_attr = String::new();
                        escape_into(&mut lang_attr, lang.split_whitespace().next().unwrap_or(""));
                        let _ = write!(self.out, r#"<code class="language-{lang_attr}">"#);
                    }
                    _ => self.out.push_str("<code>"),
                }
            }
            Tag::List(Some(start)) if start != 1 => {
                let _ = write!(self.out, r#"<ol class="{OL}" start="{start}">"#);
            }
            Tag::List(Some(_)) => self.open("ol", OL),
            Tag::List(None) => self.open("ul", UL),
            Tag::Item => self.open("li", LI),
            Tag::Table(_) => self.open("table", TABLE),
            Tag::TableHead => {
                self.in_table_head = true;
                self.open("thead", THEAD);
                self.open("tr", TR);
            }
            Tag::TableRow => self.open("tr", TR),
            Tag::TableCell => {
                if self.in_table_head {
                    self.open("th", TH)
                } else {
                    self.open("td", TD)
                }
            }
            Tag::Emphasis => self.open("em", EM),
            Tag::Strong => self.open("strong", STRONG),
            Tag::Strikethrough => self.out.push_str("<del>"),
            Tag::Link { dest_url, .. } => {
                let mut href = String::new();
                escape_into(&mut href, safe_url(&dest_url));
                let _ = write!(
                    self.out,
                    r#"<a class="{A}" href="{href}" target="_blank" rel="noopener noreferrer">"#
                );
            }
            Tag::Image { dest_url, .. } => {
                let mut src = String::new();
                escape_into(&mut src, safe_url(&dest_url));
                let _ = write!(self.out, r#"<img src="{src}" alt=""#);
                self.image_depth = 1;
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        let close = match tag {
            TagEnd::Paragraph => "</p>\n",
            TagEnd::Heading(level) => match level {
                HeadingLevel::H1 => "</h1>\n",
                HeadingLevel::H2 => "</h2>\n",
                HeadingLevel::H3 => "</h3>\n",
                HeadingLevel::H4 => "</h4>\n",
                HeadingLevel::H5 => "</h5>\n",
                HeadingLevel::H6 => "</h6>\n",
            },
            TagEnd::BlockQuote => "</blockquote>\n",
            TagEnd::CodeBlock => "</code></pre>\n",
            TagEnd::List(true) => "</ol>\n",
            TagEnd::List(false) => "</ul>\n",
            TagEnd::Item => "</li>\n",
            TagEnd::Table => "</tbody></table>\n",
            TagEnd::TableHead => {
                self.in_table_head = false;
                "</tr></thead><tbody>\n"
            }
            TagEnd::TableRow => "</tr>\n",
            TagEnd::TableCell => {
                if self.in_table_head {
                    "</th>"
                } else {
                    "</td>"
                }
            }
            TagEnd::Emphasis => "</em>",
            TagEnd::Strong => "</strong>",
            TagEnd::Strikethrough => "</del>",
            TagEnd::Link => "</a>",
            _ => "",
        };
        self.out.push_str(close);
    }
}

fn heading(level: HeadingLevel) -> (&'static str, &'static str) {
    match level {
        HeadingLevel::H1 => ("h1", H1),
        HeadingLevel::H2 => ("h2", H2),
        HeadingLevel::H3 => ("h3", H3),
        HeadingLevel::H4 => ("h4", H_OTHER),
        HeadingLevel::H5 => ("h5", H_OTHER),
        HeadingLevel::H6 => ("h6", H_OTHER),
    }
}

/// Drops script-capable URL schemes.
fn safe_url(url: &str) -> &str {
    let lower = url.trim_start().to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("vbscript:") || lower.starts_with("data:text/html") {
        "#"
    } else {
        url
    }
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_and_paragraphs_get_fixed_classes() {
        let html = render_markdown("# Plan\n\nEat **more** greens.");
        assert!(html.contains(r#"<h1 class="text-xl font-bold mt-4 mb-2">Plan</h1>"#));
        assert!(html.contains(r#"<p class="mb-2 text-sm">Eat <strong class="font-semibold">more</strong> greens.</p>"#));
    }

    #[test]
    fn lists_keep_their_kind() {
        let html = render_markdown("- a\n- b\n\n3. x\n4. y\n");
        assert!(html.contains(&format!(r#"<ul class="{UL}">"#)));
        assert!(html.contains(&format!(r#"<ol class="{OL}" start="3">"#)));
        assert_eq!(html.matches("<li ").count(), 4);
    }

    #[test]
    fn tables_have_head_and_body() {
        let html = render_markdown("| Food | kcal |\n|---|---|\n| Rice | 130 |\n");
        assert!(html.contains(&format!(r#"<th class="{TH}">Food</th>"#)));
        assert!(html.contains(&format!(r#"<td class="{TD}">130</td>"#)));
        assert!(html.contains("</tr></thead><tbody>"));
        assert!(html.ends_with("</tbody></table>\n"));
    }

    #[test]
    fn code_is_escaped() {
        let html = render_markdown("`a<b`\n\n```rust\nlet x = 1 < 2;\n```\n");
        assert!(html.contains(&format!(r#"<code class="{CODE}">a&lt;b</code>"#)));
        assert!(html.contains(r#"<code class="language-rust">let x = 1 &lt; 2;"#));
    }

    #[test]
    fn raw_html_is_not_passed_through() {
        let html = render_markdown("<script>alert(1)</script>\n\nhi <b>there</b>");
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn unsafe_links_are_neutralized() {
        let html = render_markdown("[x](javascript:alert(1)) [y](https://example.com)");
        assert!(html.contains(r##"href="#""##));
        assert!(html.contains(r#"href="https://example.com""#));
    }

    #[test]
    fn image_alt_is_plain_text() {
        let html = render_markdown("![a *plate*](https://img/x.png)");
        assert!(html.contains(r#"<img src="https://img/x.png" alt="a plate" />"#));
    }

    #[test]
    fn print_document_is_standalone() {
        let doc = print_document("Análisis <1>", "## Hi");
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>Análisis &lt;1&gt;</title>"));
        assert!(doc.contains("th { background: #f5f5f5; }"));
        assert!(doc.contains(&format!(r#"<h2 class="{H2}">Hi</h2>"#)));
    }

    #[test]
    fn answer_is_wrapped_in_container() {
        assert!(render_answer("ok").starts_with(&format!(r#"<div class="{CONTAINER}">"#)));
    }
}
