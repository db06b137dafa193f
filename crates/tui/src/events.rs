use std::time::{Duration, Instant};

use crossterm::event::{self, Event, MouseButton, MouseEventKind};
use ratatui::{backend::Backend, Terminal};

use crate::{
    app::{App, Focus},
    ui,
};

pub fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> anyhow::Result<()> {
    let mut last_draw = Instant::now();
    let heartbeat = Duration::from_millis(500);
    loop {
        if app.dirty || last_draw.elapsed() >= heartbeat {
            terminal.draw(|f| ui::draw(f, app))?;
            app.dirty = false;
            last_draw = Instant::now();
        }
        if matches!(app.focus, Focus::Input) {
            let _ = terminal.show_cursor();
        } else {
            let _ = terminal.hide_cursor();
        }

        if event::poll(Duration::from_millis(120))? {
            match event::read()? {
                Event::Key(key) => {
                    app.on_key(key);
                }
                Event::Paste(s) => {
                    match app.focus {
                        Focus::Input => app.insert_text(&s),
                        Focus::Catalog => {
                            for ch in s.chars().filter(|c| !c.is_control()) {
                                app.search_push(ch);
                            }
                        }
                        Focus::Selected => {}
                    }
                    app.dirty = true;
                }
                Event::Resize(_, _) => {
                    app.dirty = true;
                }
                // Popups swallow mouse input.
                Event::Mouse(me) if !app.show_help && app.category_picker.is_none() => {
                    let x = me.column;
                    let y = me.row;
                    if let Some(area) = app.chat_area {
                        let inside = x >= area.x
                            && x < area.x + area.width
                            && y >= area.y
                            && y < area.y + area.height;
                        if inside {
                            match me.kind {
                                MouseEventKind::ScrollUp => {
                                    app.chat_scroll = app.chat_scroll.saturating_add(3);
                                    app.stick_to_bottom = false;
                                    app.dirty = true;
                                }
                                MouseEventKind::ScrollDown => {
                                    app.chat_scroll = app.chat_scroll.saturating_sub(3);
                                    if app.chat_scroll == 0 {
                                        app.stick_to_bottom = true;
                                    }
                                    app.dirty = true;
                                }
                                _ => {}
                            }
                        }
                    }
                    if let Some(area) = app.catalog_area {
                        let inside = x >= area.x
                            && x < area.x + area.width
                            && y >= area.y
                            && y < area.y + area.height;
                        if inside {
                            match me.kind {
                                MouseEventKind::ScrollUp => {
                                    app.catalog_scroll = app.catalog_scroll.saturating_sub(1);
                                    app.dirty = true;
                                }
                                MouseEventKind::ScrollDown => {
                                    let max = app.visible.len().saturating_sub(1) as u16;
                                    app.catalog_scroll =
                                        app.catalog_scroll.saturating_add(1).min(max);
                                    app.dirty = true;
                                }
                                MouseEventKind::Down(MouseButton::Left) => {
                                    // Click anywhere on a product row toggles
                                    // selection, like clicking a card.
                                    let rel_y = y.saturating_sub(area.y + 1) as usize;
                                    if let Some(Some(idx)) =
                                        app.catalog_row_map.get(rel_y).copied()
                                    {
                                        app.focus = Focus::Catalog;
                                        app.catalog_cursor = idx;
                                        app.toggle_at_cursor();
                                        app.dirty = true;
                                    }
                                }
                                _ => {}
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        app.on_tick();

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
