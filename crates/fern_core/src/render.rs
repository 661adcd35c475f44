//! Line-node and styled-span rendering.
//!
//! Dispatch over both variant sets is an exhaustive `match`: a new line or
//! style kind fails to compile until every renderer arm handles it.

use std::path::Path;

use crate::graph::PageGraph;
use crate::links::{self, PageCtx};
use crate::media::{self, MediaKind};
use crate::model::{Diagnostic, LineNode, ListItem, StyledText};

/// A paragraph holding exactly this plain text renders as a thematic break.
pub const THEMATIC_BREAK: &str = ". . .";

pub fn render_body(
    graph: &mut PageGraph,
    diags: &mut Vec<Diagnostic>,
    ctx: &PageCtx<'_>,
    body: &[LineNode],
    res_dir: &Path,
) -> String {
    let mut out = String::new();
    let mut saw_header = false;
    for node in body {
        match node {
            LineNode::Header(text) => {
                if saw_header {
                    out.push_str(&format!("<h2 class=\"header\">{text}</h2>"));
                } else {
                    out.push_str(&format!("<h1 class=\"title\">{text}</h1>"));
                    saw_header = true;
                }
            }
            LineNode::Paragraph(spans) => {
                if is_thematic_break(spans) {
                    out.push_str("<hr class=\"break\"/>");
                } else {
                    let inner = styled_to_html(graph, diags, ctx, spans);
                    out.push_str(&format!("<p class=\"paragraph\">{inner}</p>"));
                }
            }
            LineNode::List(items) => out.push_str(&list_to_html(graph, diags, ctx, items)),
            LineNode::Block { lines, indent } => out.push_str(&block_to_html(lines, *indent)),
            LineNode::Embed { path, caption } => {
                if let Some(html) = embed_to_html(graph, diags, ctx, path, caption, res_dir) {
                    out.push_str(&html);
                }
            }
            LineNode::NavLink(_) => {}
        }
    }
    out
}

fn is_thematic_break(spans: &[StyledText]) -> bool {
    matches!(spans, [StyledText::Plain(text)] if text == THEMATIC_BREAK)
}

pub fn styled_to_html(
    graph: &mut PageGraph,
    diags: &mut Vec<Diagnostic>,
    ctx: &PageCtx<'_>,
    spans: &[StyledText],
) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            StyledText::Plain(text) => out.push_str(text),
            StyledText::Italic(text) => {
                out.push_str(&format!("<em class=\"italic\">{text}</em>"));
            }
            StyledText::Bold(text) => {
                out.push_str(&format!("<strong class=\"bold\">{text}</strong>"));
            }
            StyledText::Mono(text) => {
                out.push_str(&format!("<code class=\"mono\">{text}</code>"));
            }
            StyledText::InternalLink { text, target } => {
                out.push_str(&links::resolve_link(graph, diags, ctx, target, text));
            }
            StyledText::ExternalLink { text, url } => {
                let display = if text.is_empty() { url } else { text };
                out.push_str(&format!(
                    "<a class=\"external link\" href=\"{url}\" target=\"_blank\">{display}</a>"
                ));
            }
        }
    }
    out
}

fn list_to_html(
    graph: &mut PageGraph,
    diags: &mut Vec<Diagnostic>,
    ctx: &PageCtx<'_>,
    items: &[ListItem],
) -> String {
    let mut out = String::from("<ul class=\"list\">");
    for item in items {
        out.push_str("<li class=\"list-item\">");
        out.push_str(&styled_to_html(graph, diags, ctx, &item.value));
        if let Some(sublist) = item.sublist.as_deref() {
            out.push_str(&list_to_html(graph, diags, ctx, sublist));
        }
        out.push_str("</li>");
    }
    out.push_str("</ul>");
    out
}

fn block_to_html(lines: &[String], indent: usize) -> String {
    let mut out = String::from("<pre class=\"code\">");
    let mut first = true;
    for line in lines {
        if !first {
            out.push('\n');
        }
        first = false;
        let stripped: String = line.chars().skip(indent).collect();
        out.push_str(&escape_angle(&stripped));
    }
    out.push_str("</pre>");
    out
}

fn escape_angle(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

/// Renders one embed, or skips it entirely (with a diagnostic) when the
/// media type is unsupported or the resource cannot be read.
fn embed_to_html(
    graph: &mut PageGraph,
    diags: &mut Vec<Diagnostic>,
    ctx: &PageCtx<'_>,
    path: &str,
    caption: &[StyledText],
    res_dir: &Path,
) -> Option<String> {
    let Some(kind) = media::media_kind(path) else {
        diags.push(Diagnostic::warning(
            Some(ctx.local_name.as_str()),
            format!("'{path}' references an unsupported media type"),
        ));
        return None;
    };
    // the whole resource is held in memory for encoding, no streaming
    let bytes = match std::fs::read(res_dir.join(path)) {
        Ok(bytes) => bytes,
        Err(_) => {
            diags.push(Diagnostic::warning(
                Some(ctx.local_name.as_str()),
                format!("unable to open embed '{path}'"),
            ));
            return None;
        }
    };
    let uri = media::data_uri(kind, &bytes);

    let mut out = String::from("<figure class=\"embed\">");
    match kind {
        MediaKind::Raster => out.push_str(&format!("<img class=\"image\" src=\"{uri}\"/>")),
        MediaKind::Vector => out.push_str(&format!("<img class=\"vector\" src=\"{uri}\"/>")),
        MediaKind::Audio => {
            out.push_str(&format!(
                "<audio class=\"sound\" loop controls src=\"{uri}\"></audio>"
            ));
        }
    }
    if !caption.is_empty() {
        let inner = styled_to_html(graph, diags, ctx, caption);
        out.push_str(&format!(
            "<figcaption class=\"embed-caption\">{inner}</figcaption>"
        ));
    }
    out.push_str("</figure>");
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::model::Page;
    use chrono::Utc;
    use tempfile::TempDir;

    fn graph_with(ids: &[&str]) -> PageGraph {
        let mut graph = PageGraph::new();
        for id in ids {
            graph.insert(Page::new(id, Utc::now())).expect("insert");
        }
        graph
    }

    fn ctx<'a>(config: &'a SiteConfig) -> PageCtx<'a> {
        PageCtx {
            local_name: "page.fern".to_string(),
            config,
        }
    }

    fn render(body: &[LineNode]) -> (String, Vec<Diagnostic>) {
        let config = SiteConfig::default();
        let mut graph = graph_with(&["page", "other"]);
        let mut diags = Vec::new();
        let ctx = ctx(&config);
        let temp = TempDir::new().expect("tempdir");
        let html = render_body(&mut graph, &mut diags, &ctx, body, temp.path());
        (html, diags)
    }

    #[test]
    fn first_header_is_h1_rest_are_h2() {
        let body = vec![
            LineNode::Paragraph(vec![StyledText::Plain("intro".to_string())]),
            LineNode::Header("TOP".to_string()),
            LineNode::Header("SECTION".to_string()),
        ];
        let (html, _) = render(&body);
        assert!(html.contains("<h1 class=\"title\">TOP</h1>"));
        assert!(html.contains("<h2 class=\"header\">SECTION</h2>"));
        assert!(!html.contains("<h1 class=\"title\">SECTION"));
    }

    #[test]
    fn three_dot_paragraph_renders_as_break() {
        let body = vec![LineNode::Paragraph(vec![StyledText::Plain(
            ". . .".to_string(),
        )])];
        let (html, _) = render(&body);
        assert_eq!(html, "<hr class=\"break\"/>");
    }

    #[test]
    fn near_miss_three_dots_stay_a_paragraph() {
        let body = vec![LineNode::Paragraph(vec![StyledText::Plain(
            ". . . .".to_string(),
        )])];
        let (html, _) = render(&body);
        assert!(html.starts_with("<p class=\"paragraph\">"));
    }

    #[test]
    fn nested_lists_preserve_depth_and_order() {
        let body = vec![LineNode::List(vec![
            ListItem {
                value: vec![StyledText::Plain("one".to_string())],
                sublist: Some(vec![ListItem {
                    value: vec![StyledText::Plain("two".to_string())],
                    sublist: Some(vec![ListItem {
                        value: vec![StyledText::Plain("three".to_string())],
                        sublist: None,
                    }]),
                }]),
            },
            ListItem {
                value: vec![StyledText::Plain("four".to_string())],
                sublist: None,
            },
        ])];
        let (html, _) = render(&body);
        assert_eq!(
            html,
            "<ul class=\"list\"><li class=\"list-item\">one<ul class=\"list\"><li class=\"list-item\">two<ul class=\"list\"><li class=\"list-item\">three</li></ul></li></ul></li><li class=\"list-item\">four</li></ul>"
        );
    }

    #[test]
    fn block_strips_indent_and_escapes_angles() {
        let body = vec![LineNode::Block {
            lines: vec![
                "  if a < b {".to_string(),
                "    swap(a, b);".to_string(),
                "  }".to_string(),
            ],
            indent: 2,
        }];
        let (html, _) = render(&body);
        assert_eq!(
            html,
            "<pre class=\"code\">if a &lt; b {\n  swap(a, b);\n}</pre>"
        );
    }

    #[test]
    fn styled_spans_wrap_in_inline_elements() {
        let body = vec![LineNode::Paragraph(vec![
            StyledText::Bold("strong".to_string()),
            StyledText::Italic("soft".to_string()),
            StyledText::Mono("mono".to_string()),
        ])];
        let (html, _) = render(&body);
        assert!(html.contains("<strong class=\"bold\">strong</strong>"));
        assert!(html.contains("<em class=\"italic\">soft</em>"));
        assert!(html.contains("<code class=\"mono\">mono</code>"));
    }

    #[test]
    fn external_link_falls_back_to_url_display() {
        let body = vec![LineNode::Paragraph(vec![StyledText::ExternalLink {
            text: String::new(),
            url: "https://example.com".to_string(),
        }])];
        let (html, _) = render(&body);
        assert!(html.contains(
            "<a class=\"external link\" href=\"https://example.com\" target=\"_blank\">https://example.com</a>"
        ));
    }

    #[test]
    fn unsupported_embed_is_skipped_with_diagnostic() {
        let body = vec![LineNode::Embed {
            path: "clip.mp4".to_string(),
            caption: vec![StyledText::Plain("caption".to_string())],
        }];
        let (html, diags) = render(&body);
        assert!(html.is_empty());
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("unsupported media type"));
    }

    #[test]
    fn unreadable_embed_is_skipped_with_diagnostic() {
        let body = vec![LineNode::Embed {
            path: "ghost.png".to_string(),
            caption: Vec::new(),
        }];
        let (html, diags) = render(&body);
        assert!(html.is_empty());
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("unable to open embed"));
    }

    #[test]
    fn embed_renders_data_uri_and_styled_caption() {
        let config = SiteConfig::default();
        let mut graph = graph_with(&["page"]);
        let mut diags = Vec::new();
        let ctx = ctx(&config);
        let temp = TempDir::new().expect("tempdir");
        std::fs::write(temp.path().join("photo.png"), b"png bytes").expect("write resource");

        let body = vec![LineNode::Embed {
            path: "photo.png".to_string(),
            caption: vec![StyledText::Italic("dusk".to_string())],
        }];
        let html = render_body(&mut graph, &mut diags, &ctx, &body, temp.path());
        assert!(html.starts_with("<figure class=\"embed\">"));
        assert!(html.contains("<img class=\"image\" src=\"data:image/png;base64,"));
        assert!(html.contains(
            "<figcaption class=\"embed-caption\"><em class=\"italic\">dusk</em></figcaption>"
        ));
        assert!(diags.is_empty());
    }

    #[test]
    fn nav_links_never_render_as_content() {
        let body = vec![
            LineNode::NavLink("other".to_string()),
            LineNode::Paragraph(vec![StyledText::Plain("text".to_string())]),
        ];
        let (html, _) = render(&body);
        assert_eq!(html, "<p class=\"paragraph\">text</p>");
    }

    #[test]
    fn internal_link_bumps_target_ref_count() {
        let config = SiteConfig::default();
        let mut graph = graph_with(&["page", "other"]);
        let mut diags = Vec::new();
        let ctx = ctx(&config);
        let temp = TempDir::new().expect("tempdir");
        let body = vec![LineNode::Paragraph(vec![
            StyledText::InternalLink {
                text: String::new(),
                target: "other".to_string(),
            },
            StyledText::InternalLink {
                text: String::new(),
                target: "other".to_string(),
            },
        ])];
        let html = render_body(&mut graph, &mut diags, &ctx, &body, temp.path());
        assert!(html.contains("href=\"other.htm\""));
        assert_eq!(graph.lookup("other").expect("page").ref_count, 2);
    }
}
