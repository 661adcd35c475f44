use crate::graph::PageGraph;

/// Renders a page's navigation list. Targets are sorted by full id so the
/// output never depends on graph storage order.
pub fn render_nav(graph: &PageGraph, page_id: &str) -> String {
    let mut targets = match graph.lookup(page_id) {
        Some(page) => page.nav.clone(),
        None => Vec::new(),
    };
    targets.sort();

    let mut out = String::from("<ul class=\"list\">");
    for target in &targets {
        if let Some(page) = graph.lookup(target) {
            out.push_str(&format!(
                "<li class=\"list-item\"><a class=\"internal link\" href=\"{}\">{}</a></li>",
                page.out_name,
                page.label()
            ));
        }
    }
    out.push_str("</ul>");
    out
}
