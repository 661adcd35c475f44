//! The two-pass build pipeline.
//!
//! Pass 1 parses every page and populates navigation and title metadata;
//! pass 2 renders and persists each page. Rendering one page may still bump
//! another page's `ref_count` through forward links, so orphan diagnostics
//! and the feed run strictly after pass 2 finishes for every page.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::error::BuildError;
use crate::feeds;
use crate::graph::PageGraph;
use crate::links::{self, PageCtx};
use crate::model::{Diagnostic, LineNode, Page, SOURCE_EXT};
use crate::nav;
use crate::parse;
use crate::render;
use crate::templates::{
    self, TOKEN_BODY, TOKEN_EDIT, TOKEN_LINK, TOKEN_NAME, TOKEN_NAV, TOKEN_STYLE, TOKEN_TITLE,
    TOKEN_UPDATED, TOKEN_YEAR,
};

pub const STYLE_NAME: &str = "style.css";
pub const PAGE_TEMPLATE_NAME: &str = "page.htm";
pub const FEED_TEMPLATE_NAME: &str = "feed.xml";
pub const FEED_OUT_NAME: &str = "feed.xml";

#[derive(Debug)]
pub struct BuildReport {
    pub pages: usize,
    pub generated: usize,
    pub out_dir: PathBuf,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn build_site(root: &Path, config: &SiteConfig) -> Result<BuildReport, BuildError> {
    let res_dir = root.join(&config.res_dir);
    let src_dir = root.join(&config.source_dir);
    let out_dir = root.join(&config.out_dir);

    let style_path = res_dir.join(STYLE_NAME);
    let styles = fs::read_to_string(&style_path)
        .map_err(|source| BuildError::Stylesheet {
            path: style_path,
            source,
        })?
        .replace(['\r', '\n'], "");

    let template_path = res_dir.join(PAGE_TEMPLATE_NAME);
    let page_template = fs::read_to_string(&template_path).map_err(|source| {
        BuildError::PageTemplate {
            path: template_path,
            source,
        }
    })?;
    let page_template = templates::preprocess(&page_template);

    let feed_path = res_dir.join(FEED_TEMPLATE_NAME);
    let feed_template =
        fs::read_to_string(&feed_path).map_err(|source| BuildError::FeedTemplate {
            path: feed_path,
            source,
        })?;
    let feed_template = templates::preprocess(&feed_template);

    fs::read_dir(&src_dir).map_err(|source| BuildError::SourceDir {
        path: src_dir.clone(),
        source,
    })?;
    fs::create_dir_all(&out_dir).map_err(|source| BuildError::OutputDir {
        path: out_dir.clone(),
        source,
    })?;

    let mut diagnostics = Vec::new();
    let mut graph = PageGraph::new();
    for entry in WalkDir::new(&src_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(SOURCE_EXT) {
            continue;
        }
        let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let modified = entry
            .metadata()
            .ok()
            .and_then(|metadata| metadata.modified().ok())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let page = Page::new(id, DateTime::<Utc>::from(modified));
        if let Err(err) = graph.insert(page) {
            diagnostics.push(Diagnostic::warning(None, err.to_string()));
        }
    }

    let ids = graph.sorted_ids();

    // pass 1: bodies, titles, navigation references
    let mut unreadable = HashSet::new();
    for id in &ids {
        let Some(page) = graph.lookup(id) else {
            continue;
        };
        let local_name = page.local_name.clone();
        let raw = match fs::read_to_string(src_dir.join(&local_name)) {
            Ok(raw) => raw,
            Err(_) => {
                diagnostics.push(Diagnostic::error(
                    Some(local_name.as_str()),
                    "unable to open page source",
                ));
                unreadable.insert(id.clone());
                continue;
            }
        };
        let body = parse::parse(&raw);
        if let Some(page) = graph.lookup_mut(id) {
            page.title = title_override(&body, &page.display_name);
            page.body = body;
        }
        links::collect_nav(&mut graph, &mut diagnostics, id);
    }

    // pass 2: render and persist each page
    let now = Utc::now();
    let year = now.format("%Y").to_string();
    let mut generated = 0;
    for id in &ids {
        if unreadable.contains(id) {
            continue;
        }
        let Some(page) = graph.lookup(id) else {
            continue;
        };
        let ctx = PageCtx {
            local_name: page.local_name.clone(),
            config,
        };
        let out_name = page.out_name.clone();
        let name = page.label().to_string();
        let updated = page.updated.format("%y%m%d").to_string();

        let nav_html = nav::render_nav(&graph, id);
        let body = graph.take_body(id);
        let body_html = render::render_body(&mut graph, &mut diagnostics, &ctx, &body, &res_dir);
        graph.restore_body(id, body);
        if let Some(page) = graph.lookup_mut(id) {
            page.rendered = Some(body_html.clone());
        }

        let edit = format!(
            "{}/edit/main/{}/{}",
            config.repo, config.source_dir, ctx.local_name
        );
        let html = templates::substitute(
            &page_template,
            &[
                (TOKEN_TITLE, config.title.as_str()),
                (TOKEN_NAME, name.as_str()),
                (TOKEN_STYLE, styles.as_str()),
                (TOKEN_NAV, nav_html.as_str()),
                (TOKEN_BODY, body_html.as_str()),
                (TOKEN_LINK, out_name.as_str()),
                (TOKEN_EDIT, edit.as_str()),
                (TOKEN_UPDATED, updated.as_str()),
                (TOKEN_YEAR, year.as_str()),
            ],
        );
        let out_path = out_dir.join(&out_name);
        match fs::write(&out_path, html) {
            Ok(()) => generated += 1,
            Err(err) => diagnostics.push(Diagnostic::warning(
                Some(ctx.local_name.as_str()),
                format!("unable to write '{}': {err}", out_path.display()),
            )),
        }
    }

    // post-pass: orphan detection, then the feed
    for id in &ids {
        let Some(page) = graph.lookup(id) else {
            continue;
        };
        if page.ref_count == 0 && page.id != config.home {
            diagnostics.push(Diagnostic::warning(
                Some(page.local_name.as_str()),
                "orphaned page",
            ));
        }
    }

    let feed = feeds::render_feed(&graph, config, &feed_template, now);
    let feed_out = out_dir.join(FEED_OUT_NAME);
    if let Err(err) = fs::write(&feed_out, feed) {
        diagnostics.push(Diagnostic::warning(
            None,
            format!("unable to write '{}': {err}", feed_out.display()),
        ));
    }

    Ok(BuildReport {
        pages: graph.len(),
        generated,
        out_dir,
        diagnostics,
    })
}

/// A page's first header becomes its title when it says something other
/// than the name already derived from the filename.
fn title_override(body: &[LineNode], display_name: &str) -> Option<String> {
    for node in body {
        if let LineNode::Header(text) = node {
            if text.eq_ignore_ascii_case(display_name) {
                return None;
            }
            return Some(text.clone());
        }
    }
    None
}
