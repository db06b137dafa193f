use crate::catalog::{Catalog, Product};

/// The set of selected product ids: set semantics, but iterated in insertion
/// order so the selected panel is stable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: Vec<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted JSON array. Anything unparseable yields an
    /// empty selection rather than an error; a corrupt selection file is not
    /// worth failing startup over.
    pub fn from_json(data: &str) -> Self {
        let ids: Vec<String> = serde_json::from_str(data).unwrap_or_default();
        let mut set = Self::new();
        for id in ids {
            if !set.contains(&id) {
                set.ids.push(id);
            }
        }
        set
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.ids).unwrap_or_else(|_| "[]".into())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|x| x == id)
    }

    /// Add the id if absent, remove it if present. Returns whether the id is
    /// a member afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(pos) = self.ids.iter().position(|x| x == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    /// Remove the id outright. Removing a non-member is a no-op.
    pub fn remove(&mut self, id: &str) {
        self.ids.retain(|x| x != id);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Join membership against the catalog in insertion order, silently
    /// skipping ids the catalog no longer contains.
    pub fn resolve<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Product> {
        self.ids.iter().filter_map(|id| catalog.get(id)).collect()
    }
}
