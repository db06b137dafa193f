use std::sync::mpsc;

use glow_core::chat::routine_prompt;
use glow_core::cite::linkify;
use glow_providers::routine::RoutineClient;
use tracing::{error, info};

use crate::strings::{ADVISORY_EMPTY_SELECTION, ERROR_EXCHANGE, ERROR_NOT_CONFIGURED};

use super::{App, Entry, EntryKind};

impl App {
    /// Reset the conversation and ask for an AM/PM routine built from the
    /// current selection. With nothing selected this shows an advisory entry
    /// and no request leaves the app.
    pub fn generate_routine(&mut self) {
        if self.busy {
            return;
        }
        let selected = self.selection.resolve(&self.catalog);
        if selected.is_empty() {
            self.transcript.push(Entry::info(ADVISORY_EMPTY_SELECTION));
            self.stick_to_bottom = true;
            self.chat_scroll = 0;
            return;
        }
        let names: Vec<String> = selected
            .iter()
            .map(|p| format!("{} ({})", p.name, p.brand))
            .collect();
        self.history.reset();
        self.history.push_user(routine_prompt(&selected));
        self.transcript.push(Entry::user(format!(
            "Build an AM/PM routine from: {}",
            names.join(", ")
        )));
        info!(target: "tui", "generate routine: {} products", selected.len());
        self.begin_exchange();
    }

    /// Append a plain follow-up turn. Empty-after-trim input is silently
    /// ignored; a trigger while a request is in flight is too.
    pub fn submit_follow_up(&mut self) {
        if self.busy {
            return;
        }
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return;
        }
        self.history.push_user(text.clone());
        self.transcript.push(Entry::user(text));
        self.input.clear();
        self.input_cursor = 0;
        info!(target: "tui", "follow-up: history_len={}", self.history.len());
        self.begin_exchange();
    }

    /// Shared exchange protocol: placeholder in the last transcript slot,
    /// busy flag up, full ordered history POSTed from a background thread.
    fn begin_exchange(&mut self) {
        self.transcript.push(Entry::loading());
        self.busy = true;
        self.stick_to_bottom = true;
        self.chat_scroll = 0;
        self.dispatch_request();
    }

    fn dispatch_request(&mut self) {
        let Some(cfg) = self.provider.clone() else {
            self.finish_exchange(Err(ERROR_NOT_CONFIGURED.to_string()));
            return;
        };
        let msgs = self.history.messages().to_vec();
        let (tx, rx) = mpsc::channel::<Result<String, String>>();
        self.chat_rx = Some(rx);
        std::thread::spawn(move || {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    let _ = tx.send(Err(format!("runtime: {}", e)));
                    return;
                }
            };
            rt.block_on(async move {
                let client = match RoutineClient::new(cfg) {
                    Ok(c) => c,
                    Err(e) => {
                        let _ = tx.send(Err(format!("client: {}", e)));
                        return;
                    }
                };
                match client.send_chat(&msgs).await {
                    Ok(reply) => {
                        let _ = tx.send(Ok(reply));
                    }
                    Err(e) => {
                        error!(target: "tui", "exchange failed: {}", e);
                        let _ = tx.send(Err(e.to_string()));
                    }
                }
            });
        });
    }

    /// Drain the in-flight exchange, if any. Called from the event loop tick.
    pub fn on_tick(&mut self) {
        let Some(rx) = &self.chat_rx else {
            return;
        };
        match rx.try_recv() {
            Ok(res) => {
                self.chat_rx = None;
                self.finish_exchange(res);
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                self.chat_rx = None;
                self.finish_exchange(Err("request thread exited".into()));
            }
        }
    }

    /// Resolve the exchange: drop the placeholder, then either append the
    /// assistant reply (history + transcript, URLs rewritten as [Source n]
    /// markers) or roll back the user turn and show a static error.
    pub fn finish_exchange(&mut self, res: Result<String, String>) {
        self.remove_loading_entry();
        match res {
            Ok(reply) => {
                self.history.push_assistant(reply.clone());
                let (text, citations) = linkify(&reply);
                self.transcript.push(Entry::assistant(text, citations));
            }
            Err(e) => {
                error!(target: "tui", "exchange error: {}", e);
                self.history.rollback_user();
                self.transcript.push(Entry::error(ERROR_EXCHANGE));
            }
        }
        self.busy = false;
        self.chat_rx = None;
        self.stick_to_bottom = true;
        self.chat_scroll = 0;
        self.dirty = true;
    }

    fn remove_loading_entry(&mut self) {
        if let Some(pos) = self
            .transcript
            .iter()
            .rposition(|e| e.kind == EntryKind::Loading)
        {
            self.transcript.remove(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use glow_core::chat::Role;
    use glow_core::{Catalog, SelectionSet};
    use glow_providers::routine::RoutineConfig;

    use crate::app::{App, EntryKind};
    use crate::strings::{ADVISORY_EMPTY_SELECTION, ERROR_EXCHANGE};

    fn catalog() -> Catalog {
        Catalog::from_json(
            r#"{"products": [{"name": "Vitamin C Serum", "brand": "X",
                "category": "serum", "description": "Brightening.", "image": ""}]}"#,
        )
        .unwrap()
    }

    // Endpoint on a reserved port; the background thread fails fast and the
    // test never drains it, so state stays deterministic.
    fn test_provider() -> RoutineConfig {
        RoutineConfig {
            endpoint: "http://127.0.0.1:9".into(),
            api_key: None,
            catalog: "products.json".into(),
            system_prompt: "You are a skincare advisor.".into(),
            timeout: Duration::from_millis(100),
            proxy: None,
        }
    }

    fn app_with_selection() -> App {
        let mut a = App::new(Some(test_provider()), catalog(), None, SelectionSet::new(), None);
        a.toggle_product("vitamin-c-serum");
        a
    }

    #[test]
    fn empty_selection_shows_advisory_and_sends_nothing() {
        let mut a = App::new(Some(test_provider()), catalog(), None, SelectionSet::new(), None);
        a.generate_routine();
        assert!(!a.busy);
        assert!(a.chat_rx.is_none());
        assert_eq!(a.history.len(), 1); // system only, untouched
        let last = a.transcript.last().unwrap();
        assert_eq!(last.kind, EntryKind::Info);
        assert_eq!(last.content, ADVISORY_EMPTY_SELECTION);
    }

    #[test]
    fn generate_resets_history_and_places_a_placeholder() {
        let mut a = app_with_selection();
        a.history.push_user("old turn");
        a.history.push_assistant("old reply");
        a.generate_routine();
        assert!(a.busy);
        let msgs = a.history.messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, Role::System);
        assert_eq!(msgs[1].role, Role::User);
        assert!(msgs[1].content.contains("Vitamin C Serum"));
        assert_eq!(a.transcript.last().unwrap().kind, EntryKind::Loading);
    }

    #[test]
    fn resolved_exchange_appends_assistant_to_history_and_transcript() {
        let mut a = app_with_selection();
        a.generate_routine();
        a.finish_exchange(Ok("AM: cleanse, serum. PM: moisturize.".into()));
        assert!(!a.busy);
        let msgs = a.history.messages();
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[2].role, Role::Assistant);
        assert!(!a.transcript.iter().any(|e| e.kind == EntryKind::Loading));
        let last = a.transcript.last().unwrap();
        assert_eq!(last.kind, EntryKind::Assistant);
        assert!(last.content.contains("AM: cleanse"));
    }

    #[test]
    fn failed_follow_up_rolls_back_the_user_turn() {
        let mut a = app_with_selection();
        a.generate_routine();
        a.finish_exchange(Ok("AM: serum.".into()));
        let len_before = a.history.len();

        a.input = "What about SPF?".into();
        a.submit_follow_up();
        assert!(a.busy);
        assert_eq!(a.history.len(), len_before + 1);

        a.finish_exchange(Err("network: connection refused".into()));
        assert!(!a.busy);
        assert_eq!(a.history.len(), len_before);
        assert!(!a.transcript.iter().any(|e| e.kind == EntryKind::Loading));
        let last = a.transcript.last().unwrap();
        assert_eq!(last.kind, EntryKind::Error);
        assert_eq!(last.content, ERROR_EXCHANGE);
    }

    #[test]
    fn failed_generation_rolls_back_to_system_only() {
        let mut a = app_with_selection();
        a.generate_routine();
        a.finish_exchange(Err("timeout: idle".into()));
        assert_eq!(a.history.len(), 1);
        assert_eq!(a.history.messages()[0].role, Role::System);
    }

    #[test]
    fn blank_follow_up_is_silently_ignored() {
        let mut a = app_with_selection();
        let transcript_len = a.transcript.len();
        a.input = "   ".into();
        a.submit_follow_up();
        assert!(!a.busy);
        assert_eq!(a.transcript.len(), transcript_len);
        assert_eq!(a.history.len(), 1);
    }

    #[test]
    fn busy_guard_serializes_exchanges() {
        let mut a = app_with_selection();
        a.generate_routine();
        let history_len = a.history.len();
        let transcript_len = a.transcript.len();

        a.input = "second request".into();
        a.submit_follow_up();
        a.generate_routine();

        assert_eq!(a.history.len(), history_len);
        assert_eq!(a.transcript.len(), transcript_len);
        assert_eq!(a.input, "second request");
    }

    #[test]
    fn reply_urls_become_source_markers() {
        let mut a = app_with_selection();
        a.generate_routine();
        a.finish_exchange(Ok(
            "Vitamin C is well studied: https://example.com/study".into()
        ));
        let last = a.transcript.last().unwrap();
        assert!(last.content.contains("[Source 1]"));
        assert_eq!(last.citations[0].url, "https://example.com/study");
    }

    #[test]
    fn history_head_stays_system_across_operation_sequences() {
        let mut a = app_with_selection();
        a.generate_routine();
        a.finish_exchange(Err("boom".into()));
        a.generate_routine();
        a.finish_exchange(Ok("AM: serum.".into()));
        a.input = "and at night?".into();
        a.submit_follow_up();
        a.finish_exchange(Ok("PM: rest.".into()));
        assert_eq!(a.history.messages()[0].role, Role::System);
    }
}
