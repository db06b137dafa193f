use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use glow_core::filter::compute_visible;
use unicode_segmentation::UnicodeSegmentation;

use crate::strings::CATEGORY_ALL;

use super::{App, CategoryPickerState};

impl App {
    /// Re-filter the catalog. Runs on every search keystroke and every
    /// category change, keeping the cursor on the same product when it
    /// survives the new filter.
    pub fn recompute_visible(&mut self) {
        let keep = self.visible.get(self.catalog_cursor).cloned();
        self.visible = compute_visible(&self.catalog, self.category.as_deref(), &self.search)
            .into_iter()
            .map(|p| p.id.clone())
            .collect();
        self.catalog_cursor = keep
            .and_then(|id| self.visible.iter().position(|v| *v == id))
            .unwrap_or(0);
        if self.catalog_cursor >= self.visible.len() {
            self.catalog_cursor = self.visible.len().saturating_sub(1);
        }
        self.catalog_scroll = 0;
        self.ensure_catalog_visible();
    }

    pub fn search_push(&mut self, ch: char) {
        self.search.push(ch);
        self.recompute_visible();
    }

    pub fn search_backspace(&mut self) {
        let mut parts: Vec<&str> = self.search.graphemes(true).collect();
        if parts.pop().is_some() {
            self.search = parts.concat();
            self.recompute_visible();
        }
    }

    pub fn toggle_at_cursor(&mut self) {
        let Some(id) = self.visible.get(self.catalog_cursor).cloned() else {
            return;
        };
        self.toggle_product(&id);
    }

    /// Toggle membership and rewrite the persisted set. The selected panel is
    /// rendered straight from membership, so no further bookkeeping here.
    pub fn toggle_product(&mut self, id: &str) {
        self.selection.toggle(id);
        if self.selected_cursor >= self.selection.len() {
            self.selected_cursor = self.selection.len().saturating_sub(1);
        }
        self.persist_selection();
    }

    pub fn remove_selected_at_cursor(&mut self) {
        let Some(id) = self.selection.ids().get(self.selected_cursor).cloned() else {
            return;
        };
        self.selection.remove(&id);
        if self.selected_cursor >= self.selection.len() {
            self.selected_cursor = self.selection.len().saturating_sub(1);
        }
        self.persist_selection();
    }

    pub fn toggle_details_at_cursor(&mut self) {
        let Some(id) = self.visible.get(self.catalog_cursor).cloned() else {
            return;
        };
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
    }

    pub fn catalog_inner_height(&self) -> u16 {
        self.catalog_area
            .map(|a| a.height.saturating_sub(4)) // borders + search/category header
            .unwrap_or(0)
    }

    /// Keep the cursor row inside the visible window. Expanded details make
    /// rows taller; this tracks item indices, which is close enough for a
    /// list this size.
    pub fn ensure_catalog_visible(&mut self) {
        let h = self.catalog_inner_height() as usize;
        if h == 0 {
            return;
        }
        let start = self.catalog_scroll as usize;
        let end = start + h.saturating_sub(1);
        if self.catalog_cursor < start {
            self.catalog_scroll = self.catalog_cursor as u16;
        } else if self.catalog_cursor > end {
            self.catalog_scroll = (self.catalog_cursor + 1 - h) as u16;
        }
        let max = self.visible.len().saturating_sub(h) as u16;
        self.catalog_scroll = self.catalog_scroll.min(max);
    }

    pub fn open_category_picker(&mut self) {
        let mut all = vec![CATEGORY_ALL.to_string()];
        all.extend(self.catalog.categories());
        self.category_picker = Some(CategoryPickerState {
            buffer: String::new(),
            cursor: 0,
            filtered: all.clone(),
            all,
            selected: 0,
        });
    }

    fn picker_filter(st: &mut CategoryPickerState) {
        let q = st.buffer.to_lowercase();
        st.filtered = if q.is_empty() {
            st.all.clone()
        } else {
            st.all
                .iter()
                .filter(|c| c.to_lowercase().contains(&q))
                .cloned()
                .collect()
        };
        st.selected = st.selected.min(st.filtered.len().saturating_sub(1));
    }

    pub fn on_picker_key(&mut self, key: KeyEvent) {
        let mut chosen: Option<String> = None;
        let mut close = false;
        if let Some(st) = &mut self.category_picker {
            match key.code {
                KeyCode::Esc => close = true,
                KeyCode::Enter => {
                    if let Some(sel) = st.filtered.get(st.selected).cloned() {
                        chosen = Some(sel);
                    }
                    close = true;
                }
                KeyCode::Up => {
                    if st.selected > 0 {
                        st.selected -= 1;
                    }
                }
                KeyCode::Down => {
                    if st.selected + 1 < st.filtered.len() {
                        st.selected += 1;
                    }
                }
                KeyCode::Backspace => {
                    if st.cursor > 0 {
                        let mut parts: Vec<&str> = st.buffer.graphemes(true).collect();
                        let c = st.cursor.min(parts.len());
                        parts.remove(c - 1);
                        st.buffer = parts.concat();
                        st.cursor -= 1;
                        Self::picker_filter(st);
                    }
                }
                KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    let mut parts: Vec<&str> = st.buffer.graphemes(true).collect();
                    let c = st.cursor.min(parts.len());
                    let mut buf = [0u8; 4];
                    parts.insert(c, ch.encode_utf8(&mut buf));
                    st.buffer = parts.concat();
                    st.cursor += 1;
                    Self::picker_filter(st);
                }
                _ => {}
            }
        }
        if let Some(sel) = chosen {
            self.category = if sel == CATEGORY_ALL { None } else { Some(sel) };
            self.recompute_visible();
        }
        if close {
            self.category_picker = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent};
    use glow_core::{Catalog, SelectionSet};

    use crate::app::App;
    use crate::strings::CATEGORY_ALL;

    fn catalog() -> Catalog {
        Catalog::from_json(
            r#"{"products": [
                {"name": "Vitamin C Serum", "brand": "X", "category": "serum",
                 "description": "Brightening antioxidant.", "image": ""},
                {"name": "Hydra Cream", "brand": "Y", "category": "moisturizer",
                 "description": "Barrier repair.", "image": ""},
                {"name": "Foam Cleanser", "brand": "Z", "category": "cleanser",
                 "description": "Gentle daily wash.", "image": ""}
            ]}"#,
        )
        .unwrap()
    }

    fn app() -> App {
        App::new(None, catalog(), None, SelectionSet::new(), None)
    }

    #[test]
    fn typing_refilters_on_every_keystroke() {
        let mut a = app();
        assert_eq!(a.visible.len(), 3);
        for ch in "vitamin".chars() {
            a.search_push(ch);
        }
        assert_eq!(a.visible, vec!["vitamin-c-serum".to_string()]);
        a.search_backspace();
        assert_eq!(a.search, "vitami");
        for ch in " retinol".chars() {
            a.search_push(ch);
        }
        assert!(a.visible.is_empty());
    }

    #[test]
    fn category_picker_applies_exact_category_and_all_clears_it() {
        let mut a = app();
        a.open_category_picker();
        // "All categories" heads the list; pick "cleanser" by filtering.
        for ch in "clean".chars() {
            a.on_picker_key(KeyEvent::from(KeyCode::Char(ch)));
        }
        a.on_picker_key(KeyEvent::from(KeyCode::Enter));
        assert_eq!(a.category.as_deref(), Some("cleanser"));
        assert_eq!(a.visible, vec!["foam-cleanser".to_string()]);
        assert!(a.category_picker.is_none());

        a.open_category_picker();
        let st = a.category_picker.as_ref().unwrap();
        assert_eq!(st.filtered[0], CATEGORY_ALL);
        a.on_picker_key(KeyEvent::from(KeyCode::Enter));
        assert!(a.category.is_none());
        assert_eq!(a.visible.len(), 3);
    }

    #[test]
    fn toggle_at_cursor_flips_membership_and_is_involutive() {
        let mut a = app();
        a.catalog_cursor = 1;
        a.toggle_at_cursor();
        assert!(a.selection.contains("hydra-cream"));
        a.toggle_at_cursor();
        assert!(!a.selection.contains("hydra-cream"));
    }

    #[test]
    fn toggles_rewrite_the_injected_selection_store() {
        let path =
            std::env::temp_dir().join(format!("glow-store-{}.json", std::process::id()));
        let mut a = App::new(None, catalog(), None, SelectionSet::new(), Some(path.clone()));

        a.toggle_product("hydra-cream");
        let stored = crate::persist::load_selection(&path).unwrap();
        assert!(stored.contains("hydra-cream"));

        a.toggle_product("hydra-cream");
        let stored = crate::persist::load_selection(&path).unwrap();
        assert!(stored.is_empty());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn removing_from_selected_panel_clamps_the_cursor() {
        let mut a = app();
        a.toggle_product("vitamin-c-serum");
        a.toggle_product("hydra-cream");
        a.selected_cursor = 1;
        a.remove_selected_at_cursor();
        assert_eq!(a.selection.ids(), &["vitamin-c-serum".to_string()]);
        assert_eq!(a.selected_cursor, 0);
        a.remove_selected_at_cursor();
        assert!(a.selection.is_empty());
        a.remove_selected_at_cursor(); // no-op on empty
    }

    #[test]
    fn details_toggle_tracks_ids_not_rows() {
        let mut a = app();
        a.toggle_details_at_cursor();
        assert!(a.expanded.contains("vitamin-c-serum"));
        for ch in "hydra".chars() {
            a.search_push(ch);
        }
        // Filtering away does not lose the expanded flag.
        assert!(a.expanded.contains("vitamin-c-serum"));
        a.toggle_details_at_cursor();
        assert!(a.expanded.contains("hydra-cream"));
    }
}
