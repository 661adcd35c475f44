use std::collections::HashMap;

use thiserror::Error;

use crate::model::{LineNode, Page};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("duplicate page id: {0}")]
pub struct DuplicatePage(pub String);

/// Owns every page of a build, keyed by id. Storage has no inherent
/// iteration order; anything with observable output order goes through
/// [`PageGraph::sorted_ids`].
#[derive(Debug, Default)]
pub struct PageGraph {
    pages: HashMap<String, Page>,
}

impl PageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, page: Page) -> Result<(), DuplicatePage> {
        if self.pages.contains_key(&page.id) {
            return Err(DuplicatePage(page.id));
        }
        self.pages.insert(page.id.clone(), page);
        Ok(())
    }

    pub fn lookup(&self, id: &str) -> Option<&Page> {
        self.pages.get(id)
    }

    pub fn lookup_mut(&mut self, id: &str) -> Option<&mut Page> {
        self.pages.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.pages.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn sorted_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.pages.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Detaches a page's body so it can be rendered while the graph stays
    /// mutable for link resolution against other pages.
    pub fn take_body(&mut self, id: &str) -> Vec<LineNode> {
        self.pages
            .get_mut(id)
            .map(|page| std::mem::take(&mut page.body))
            .unwrap_or_default()
    }

    pub fn restore_body(&mut self, id: &str, body: Vec<LineNode>) {
        if let Some(page) = self.pages.get_mut(id) {
            page.body = body;
        }
    }
}
