//! Internal link and navigation-reference resolution.

use crate::config::SiteConfig;
use crate::graph::PageGraph;
use crate::model::{Diagnostic, LineNode, SOURCE_EXT};

/// Identity of the page being rendered, detached from the graph so the
/// resolver can mutate other pages while this page's body is checked out.
pub struct PageCtx<'a> {
    pub local_name: String,
    pub config: &'a SiteConfig,
}

/// Resolves an in-body internal link. A known target gains one `ref_count`
/// per rendered occurrence. An unknown target degrades to a visibly-marked
/// anchor pointing at the repository's create-new-file URL, plus a warning
/// naming the source page and the target id.
pub fn resolve_link(
    graph: &mut PageGraph,
    diags: &mut Vec<Diagnostic>,
    ctx: &PageCtx<'_>,
    target: &str,
    text: &str,
) -> String {
    match graph.lookup_mut(target) {
        Some(page) => {
            page.ref_count += 1;
            let display = if text.is_empty() { page.label() } else { text };
            format!(
                "<a class=\"internal link\" href=\"{}\">{display}</a>",
                page.out_name
            )
        }
        None => {
            diags.push(Diagnostic::warning(
                Some(ctx.local_name.as_str()),
                format!("broken internal link '{target}'"),
            ));
            let display = if text.is_empty() { target } else { text };
            let url = broken_link_url(ctx.config, target);
            format!(
                "<a class=\"broken external link\" href=\"{url}\" target=\"_blank\">{display}</a>"
            )
        }
    }
}

/// Deep link to a pre-filled create-new-file action for a missing page.
pub fn broken_link_url(config: &SiteConfig, target: &str) -> String {
    format!(
        "{}/new/main/{}?filename={target}.{SOURCE_EXT}",
        config.repo, config.source_dir
    )
}

/// Pre-pass resolution of a page's navigation references. Appends known
/// targets to the page's `nav`, deduplicated and self-excluded; `ref_count`
/// is untouched. Unknown targets are dropped with a warning.
pub fn collect_nav(graph: &mut PageGraph, diags: &mut Vec<Diagnostic>, page_id: &str) {
    let Some(page) = graph.lookup(page_id) else {
        return;
    };
    let local_name = page.local_name.clone();
    let targets: Vec<String> = page
        .body
        .iter()
        .filter_map(|node| match node {
            LineNode::NavLink(target) => Some(target.clone()),
            _ => None,
        })
        .collect();

    let mut known = Vec::new();
    for target in targets {
        if target == page_id {
            continue;
        }
        if graph.contains(&target) {
            known.push(target);
        } else {
            diags.push(Diagnostic::warning(
                Some(local_name.as_str()),
                format!("broken nav link '{target}'"),
            ));
        }
    }
    if let Some(page) = graph.lookup_mut(page_id) {
        for target in known {
            if !page.nav.contains(&target) {
                page.nav.push(target);
            }
        }
    }
}
