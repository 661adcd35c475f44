use chrono::{DateTime, Utc};

use crate::config::SiteConfig;
use crate::graph::PageGraph;
use crate::templates::{self, TOKEN_NAME, TOKEN_POSTS, TOKEN_TITLE, TOKEN_UPDATED};

/// Aggregates every rendered page into the feed template. Runs strictly
/// after the render pass so `rendered` and `ref_count` are final.
pub fn render_feed(
    graph: &PageGraph,
    config: &SiteConfig,
    feed_template: &str,
    now: DateTime<Utc>,
) -> String {
    let mut posts = String::new();
    for id in graph.sorted_ids() {
        let Some(page) = graph.lookup(&id) else {
            continue;
        };
        let Some(rendered) = page.rendered.as_deref() else {
            continue;
        };
        let link = base_url_join(&config.base_url, &page.out_name);
        posts.push_str("<item>\n");
        posts.push_str(&format!("<title>{}</title>\n", escape_xml(page.label())));
        posts.push_str(&format!("<link>{}</link>\n", escape_xml(&link)));
        posts.push_str(&format!("<guid>{}</guid>\n", escape_xml(&link)));
        posts.push_str(&format!("<pubDate>{}</pubDate>\n", page.updated.to_rfc2822()));
        posts.push_str(&format!(
            "<description>{}</description>\n",
            escape_xml(rendered)
        ));
        posts.push_str("</item>\n");
    }

    let updated = now.to_rfc2822();
    templates::substitute(
        feed_template,
        &[
            (TOKEN_TITLE, config.title.as_str()),
            (TOKEN_NAME, config.title.as_str()),
            (TOKEN_UPDATED, updated.as_str()),
            (TOKEN_POSTS, posts.as_str()),
        ],
    )
}

fn base_url_join(base_url: &str, href: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = href.trim_start_matches('/');
    format!("{base}/{path}")
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
