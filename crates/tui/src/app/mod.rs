use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use glow_core::cite::Citation;
use glow_core::{Catalog, ChatHistory, SelectionSet};
use glow_providers::routine::config::DEFAULT_SYSTEM_PROMPT;
use glow_providers::routine::RoutineConfig;
use ratatui::layout::Rect;
use tracing::warn;

use crate::strings::{self, catalog_error_line, ERROR_NOT_CONFIGURED, WELCOME};

pub mod browse;
pub mod exchange;
pub mod input;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Catalog,
    Selected,
    Input,
}

/// Pane order; mirrored under `Rtl`. Not persisted, resets every start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutDir {
    Ltr,
    Rtl,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    User,
    Assistant,
    Info,
    Error,
    Loading,
}

/// One rendered transcript entry. The transcript is presentation state; the
/// conversational context sent to the endpoint lives in `ChatHistory`.
#[derive(Clone, Debug)]
pub struct Entry {
    pub kind: EntryKind,
    pub content: String,
    pub citations: Vec<Citation>,
}

impl Entry {
    pub fn user<S: Into<String>>(s: S) -> Self {
        Self { kind: EntryKind::User, content: s.into(), citations: Vec::new() }
    }
    pub fn assistant<S: Into<String>>(s: S, citations: Vec<Citation>) -> Self {
        Self { kind: EntryKind::Assistant, content: s.into(), citations }
    }
    pub fn info<S: Into<String>>(s: S) -> Self {
        Self { kind: EntryKind::Info, content: s.into(), citations: Vec::new() }
    }
    pub fn error<S: Into<String>>(s: S) -> Self {
        Self { kind: EntryKind::Error, content: s.into(), citations: Vec::new() }
    }
    pub fn loading() -> Self {
        Self {
            kind: EntryKind::Loading,
            content: strings::LOADING_MESSAGE.to_string(),
            citations: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct CategoryPickerState {
    pub buffer: String,
    pub cursor: usize,
    pub all: Vec<String>,
    pub filtered: Vec<String>,
    pub selected: usize,
}

pub struct App {
    // Catalog + filters
    pub catalog: Catalog,
    pub category: Option<String>,
    pub search: String,
    pub visible: Vec<String>,
    pub catalog_cursor: usize,
    pub catalog_scroll: u16,
    pub expanded: HashSet<String>,
    // Selection
    pub selection: SelectionSet,
    pub selected_cursor: usize,
    /// Backing file for the selection; `None` disables persistence.
    pub selection_store: Option<PathBuf>,
    // Chat
    pub transcript: Vec<Entry>,
    pub history: ChatHistory,
    pub busy: bool,
    pub chat_rx: Option<Receiver<Result<String, String>>>,
    pub chat_scroll: u16,
    pub chat_viewport: u16,
    pub stick_to_bottom: bool,
    // Input box
    pub input: String,
    pub input_cursor: usize,
    // Layout / chrome
    pub focus: Focus,
    pub layout: LayoutDir,
    pub show_help: bool,
    pub category_picker: Option<CategoryPickerState>,
    pub catalog_area: Option<Rect>,
    /// Visible-index per inner catalog line, rebuilt each draw for mouse hits.
    pub catalog_row_map: Vec<Option<usize>>,
    pub selected_area: Option<Rect>,
    pub chat_area: Option<Rect>,
    pub should_quit: bool,
    pub dirty: bool,
    // Provider config; None leaves the app browsable but chat disabled.
    pub provider: Option<RoutineConfig>,
}

impl App {
    pub fn new(
        provider: Option<RoutineConfig>,
        catalog: Catalog,
        catalog_err: Option<String>,
        selection: SelectionSet,
        selection_store: Option<PathBuf>,
    ) -> Self {
        let system_prompt = provider
            .as_ref()
            .map(|c| c.system_prompt.clone())
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
        let mut transcript = vec![Entry::info(WELCOME)];
        if let Some(err) = catalog_err {
            transcript.push(Entry::error(catalog_error_line(&err)));
        }
        if provider.is_none() {
            transcript.push(Entry::info(ERROR_NOT_CONFIGURED));
        }
        let mut app = Self {
            catalog,
            category: None,
            search: String::new(),
            visible: Vec::new(),
            catalog_cursor: 0,
            catalog_scroll: 0,
            expanded: HashSet::new(),
            selection,
            selected_cursor: 0,
            selection_store,
            transcript,
            history: ChatHistory::new(system_prompt),
            busy: false,
            chat_rx: None,
            chat_scroll: 0,
            chat_viewport: 0,
            stick_to_bottom: true,
            input: String::new(),
            input_cursor: 0,
            focus: Focus::Catalog,
            layout: LayoutDir::Ltr,
            show_help: false,
            category_picker: None,
            catalog_area: None,
            catalog_row_map: Vec::new(),
            selected_area: None,
            chat_area: None,
            should_quit: false,
            dirty: true,
            provider,
        };
        app.recompute_visible();
        app
    }

    pub fn toggle_layout(&mut self) {
        self.layout = match self.layout {
            LayoutDir::Ltr => LayoutDir::Rtl,
            LayoutDir::Rtl => LayoutDir::Ltr,
        };
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if let KeyEventKind::Press = key.kind {
            if self.show_help {
                match key.code {
                    KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') => {
                        self.show_help = false;
                    }
                    _ => {}
                }
                self.dirty = true;
                return;
            }

            if self.category_picker.is_some() {
                self.on_picker_key(key);
                self.dirty = true;
                return;
            }

            match key.code {
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.should_quit = true;
                }
                KeyCode::Esc => self.should_quit = true,
                KeyCode::F(1) => {
                    self.show_help = true;
                }
                KeyCode::F(3) => {
                    self.open_category_picker();
                }
                KeyCode::F(4) => {
                    self.toggle_layout();
                }
                KeyCode::Char('g') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.generate_routine();
                }
                KeyCode::Tab => {
                    self.focus = match self.focus {
                        Focus::Catalog => Focus::Selected,
                        Focus::Selected => Focus::Input,
                        Focus::Input => Focus::Catalog,
                    };
                }
                KeyCode::PageUp => {
                    let step = self.chat_viewport.max(1);
                    self.chat_scroll = self.chat_scroll.saturating_add(step);
                    self.stick_to_bottom = false;
                }
                KeyCode::PageDown => {
                    let step = self.chat_viewport.max(1);
                    self.chat_scroll = self.chat_scroll.saturating_sub(step);
                    if self.chat_scroll == 0 {
                        self.stick_to_bottom = true;
                    }
                }
                KeyCode::Up if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.chat_scroll = self.chat_scroll.saturating_add(1);
                    self.stick_to_bottom = false;
                }
                KeyCode::Down if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.chat_scroll = self.chat_scroll.saturating_sub(1);
                    if self.chat_scroll == 0 {
                        self.stick_to_bottom = true;
                    }
                }
                _ => match self.focus {
                    Focus::Catalog => self.on_catalog_key(key),
                    Focus::Selected => self.on_selected_key(key),
                    Focus::Input => self.on_input_key(key),
                },
            }
            self.dirty = true;
        }
    }

    fn on_catalog_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => {
                if self.catalog_cursor > 0 {
                    self.catalog_cursor -= 1;
                }
                self.ensure_catalog_visible();
            }
            KeyCode::Down => {
                if self.catalog_cursor + 1 < self.visible.len() {
                    self.catalog_cursor += 1;
                }
                self.ensure_catalog_visible();
            }
            KeyCode::Enter => {
                self.toggle_at_cursor();
            }
            KeyCode::Right => {
                self.toggle_details_at_cursor();
            }
            KeyCode::Backspace => {
                self.search_backspace();
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.search_push(ch);
            }
            _ => {}
        }
    }

    fn on_selected_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => {
                if self.selected_cursor > 0 {
                    self.selected_cursor -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_cursor + 1 < self.selection.len() {
                    self.selected_cursor += 1;
                }
            }
            KeyCode::Delete | KeyCode::Char('x') | KeyCode::Char('X') => {
                self.remove_selected_at_cursor();
            }
            _ => {}
        }
    }

    fn on_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_follow_up(),
            KeyCode::Backspace => self.delete_left_grapheme(),
            KeyCode::Delete => self.delete_right_grapheme(),
            KeyCode::Left => {
                if self.input_cursor > 0 {
                    self.input_cursor -= 1;
                }
            }
            KeyCode::Right => {
                let len = self.input_grapheme_len();
                if self.input_cursor < len {
                    self.input_cursor += 1;
                }
            }
            KeyCode::Home => self.input_cursor = 0,
            KeyCode::End => self.input_cursor = self.input_grapheme_len(),
            KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.delete_prev_word();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.kill_to_start();
            }
            KeyCode::Char('k') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.kill_to_end();
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let mut buf = [0u8; 4];
                let s = ch.encode_utf8(&mut buf);
                self.insert_text(s);
            }
            _ => {}
        }
    }

    pub fn persist_selection(&self) {
        let Some(path) = &self.selection_store else {
            return;
        };
        if let Err(e) = crate::persist::save_selection(path, &self.selection) {
            warn!(target: "tui", "persist selection failed: {}", e);
        }
    }
}
