//! Core page and document models

use chrono::{DateTime, Utc};

pub const SOURCE_EXT: &str = "fern";
pub const OUTPUT_EXT: &str = "htm";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyledText {
    Plain(String),
    Italic(String),
    Bold(String),
    Mono(String),
    InternalLink { text: String, target: String },
    ExternalLink { text: String, url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub value: Vec<StyledText>,
    pub sublist: Option<Vec<ListItem>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineNode {
    Header(String),
    Paragraph(Vec<StyledText>),
    List(Vec<ListItem>),
    Block { lines: Vec<String>, indent: usize },
    Embed { path: String, caption: Vec<StyledText> },
    NavLink(String),
}

#[derive(Debug, Clone)]
pub struct Page {
    /// Source filename minus extension. Primary key in the graph.
    pub id: String,
    pub display_name: String,
    /// Set when the page's first header differs from the derived display name.
    pub title: Option<String>,
    pub local_name: String,
    pub out_name: String,
    pub body: Vec<LineNode>,
    /// Ids of pages reached via navigation references. Deduplicated, never
    /// contains the page's own id.
    pub nav: Vec<String>,
    /// In-body internal-link resolutions that targeted this page.
    pub ref_count: u32,
    /// Source file modification time.
    pub updated: DateTime<Utc>,
    /// Rendered body fragment, consumed by the feed builder. `None` until the
    /// render pass completes (or when the page was skipped).
    pub rendered: Option<String>,
}

impl Page {
    pub fn new(id: &str, updated: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name_for(id),
            title: None,
            local_name: format!("{id}.{SOURCE_EXT}"),
            out_name: format!("{id}.{OUTPUT_EXT}"),
            body: Vec::new(),
            nav: Vec::new(),
            ref_count: 0,
            updated,
            rendered: None,
        }
    }

    /// Label shown wherever the page is linked: title override, else the
    /// derived display name.
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.display_name)
    }
}

pub fn display_name_for(id: &str) -> String {
    id.split('-')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut out = String::new();
    for ch in first.to_uppercase() {
        out.push(ch);
    }
    out.push_str(chars.as_str());
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub source_path: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(source_path: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            source_path: source_path.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn error(source_path: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            source_path: source_path.map(str::to_string),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn display_name_splits_and_capitalizes() {
        assert_eq!(display_name_for("beton-brutalism"), "Beton Brutalism");
        assert_eq!(display_name_for("index"), "Index");
        assert_eq!(display_name_for("a--b"), "A B");
    }

    #[test]
    fn page_names_derive_from_id() {
        let page = Page::new("field-notes", Utc::now());
        assert_eq!(page.local_name, "field-notes.fern");
        assert_eq!(page.out_name, "field-notes.htm");
        assert_eq!(page.display_name, "Field Notes");
        assert_eq!(page.label(), "Field Notes");
    }

    #[test]
    fn label_prefers_title_override() {
        let mut page = Page::new("home", Utc::now());
        page.title = Some("A Quiet Corner".to_string());
        assert_eq!(page.label(), "A Quiet Corner");
    }
}
