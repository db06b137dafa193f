use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};
use textwrap::{wrap, Options};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::app::{App, EntryKind, Focus, LayoutDir};
use crate::strings::{
    build_status_line, category_label, help_lines_ascii, INPUT_HINT, PREFIX_ASSISTANT,
    PREFIX_ERROR, PREFIX_INFO, PREFIX_USER, TITLE_CATALOG, TITLE_CATEGORY, TITLE_CHAT, TITLE_HELP,
    TITLE_INPUT,
};
use crate::theme::THEME;

pub fn draw(f: &mut Frame, app: &mut App) {
    // Three columns: catalog, chat, selected; mirrored under RTL layout.
    let constraints = match app.layout {
        LayoutDir::Ltr => [
            Constraint::Length(34),
            Constraint::Min(30),
            Constraint::Length(28),
        ],
        LayoutDir::Rtl => [
            Constraint::Length(28),
            Constraint::Min(30),
            Constraint::Length(34),
        ],
    };
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(f.area());
    let (catalog_chunk, chat_chunk, selected_chunk) = match app.layout {
        LayoutDir::Ltr => (chunks[0], chunks[1], chunks[2]),
        LayoutDir::Rtl => (chunks[2], chunks[1], chunks[0]),
    };
    app.catalog_area = Some(catalog_chunk);
    app.selected_area = Some(selected_chunk);

    draw_catalog(f, catalog_chunk, app);
    draw_chat_column(f, chat_chunk, app);
    draw_selected(f, selected_chunk, app);

    if let Some(state) = app.category_picker.clone() {
        draw_category_picker(f, f.area(), &state);
    }
    if app.show_help {
        draw_help(f, f.area());
    }
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(THEME.border_focus)
    } else {
        Style::default().fg(THEME.border_inactive)
    }
}

fn draw_catalog(f: &mut Frame, area: Rect, app: &mut App) {
    let focused = matches!(app.focus, Focus::Catalog);
    let block = Block::default()
        .title(Span::styled(
            TITLE_CATALOG,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(border_style(focused));

    let inner_w = area.width.saturating_sub(2) as usize;
    let inner_h = area.height.saturating_sub(2) as usize;
    app.ensure_catalog_visible();

    let mut lines: Vec<Line> = Vec::new();
    app.catalog_row_map.clear();

    let search_caret = if focused { "_" } else { "" };
    lines.push(Line::from(vec![
        Span::styled("Search: ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}{}", app.search, search_caret)),
    ]));
    app.catalog_row_map.push(None);
    lines.push(Line::from(vec![
        Span::styled("Category: ", Style::default().fg(Color::DarkGray)),
        Span::raw(category_label(app.category.as_deref())),
    ]));
    app.catalog_row_map.push(None);

    let start = app.catalog_scroll as usize;
    'items: for (i, id) in app.visible.iter().enumerate().skip(start) {
        if lines.len() >= inner_h {
            break;
        }
        let Some(p) = app.catalog.get(id) else {
            continue;
        };
        let is_cursor = i == app.catalog_cursor;
        let mark = if app.selection.contains(id) {
            "[x] "
        } else {
            "[ ] "
        };
        let mark_style = if app.selection.contains(id) {
            Style::default().fg(THEME.selected_mark)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let row_style = if is_cursor && focused {
            Style::default()
                .fg(THEME.cursor_fg)
                .bg(THEME.cursor_bg)
                .add_modifier(Modifier::BOLD)
        } else if is_cursor {
            Style::default()
                .fg(THEME.border_focus)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(mark, mark_style),
            Span::styled(format!("{} ({})", p.name, p.brand), row_style),
        ]));
        app.catalog_row_map.push(Some(i));

        if app.expanded.contains(id) {
            let detail = format!("{} - {}", p.category, p.description);
            let opts = Options::new(inner_w.saturating_sub(6).max(8));
            for piece in wrap(&detail, opts) {
                if lines.len() >= inner_h {
                    break 'items;
                }
                lines.push(Line::from(Span::styled(
                    format!("      {}", piece),
                    Style::default().fg(Color::DarkGray),
                )));
                app.catalog_row_map.push(Some(i));
            }
        }
    }
    if app.visible.is_empty() && lines.len() < inner_h {
        lines.push(Line::from(Span::styled(
            "  (no matching products)",
            Style::default().fg(Color::DarkGray),
        )));
        app.catalog_row_map.push(None);
    }

    let para = Paragraph::new(lines).block(block);
    f.render_widget(para, area);

    let inner = Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };
    let total = app.visible.len();
    if total + 2 > inner.height as usize {
        let mut sb_state = ScrollbarState::new(total).position(app.catalog_scroll as usize);
        let sb = Scrollbar::default().orientation(ScrollbarOrientation::VerticalRight);
        f.render_stateful_widget(sb, inner, &mut sb_state);
    }
}

fn draw_selected(f: &mut Frame, area: Rect, app: &App) {
    let focused = matches!(app.focus, Focus::Selected);
    let title = format!(" Selected ({}) ", app.selection.len());
    let block = Block::default()
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(border_style(focused));

    let inner_h = area.height.saturating_sub(2) as usize;
    // Membership joined against the catalog; ids with no catalog entry are
    // silently skipped, so the cursor is clamped to what actually renders
    // rather than raw membership.
    let resolved = app.selection.resolve(&app.catalog);
    let cursor = resolved_cursor(app.selected_cursor, resolved.len());
    let skip = cursor.saturating_sub(inner_h.saturating_sub(1));
    let mut lines: Vec<Line> = Vec::new();
    for (i, p) in resolved.iter().enumerate().skip(skip).take(inner_h) {
        let is_cursor = i == cursor;
        let prefix = if is_cursor { "> " } else { "  " };
        let style = if is_cursor && focused {
            Style::default()
                .fg(THEME.cursor_fg)
                .bg(THEME.cursor_bg)
                .add_modifier(Modifier::BOLD)
        } else if is_cursor {
            Style::default().fg(THEME.border_focus)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!("{}{}", prefix, p.name),
            style,
        )));
    }
    if resolved.is_empty() {
        lines.push(Line::from(Span::styled(
            "  (nothing selected)",
            Style::default().fg(Color::DarkGray),
        )));
    }
    let para = Paragraph::new(lines).block(block);
    f.render_widget(para, area);
}

fn draw_chat_column(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(area);
    app.chat_area = Some(chunks[0]);
    draw_transcript(f, chunks[0], app);
    draw_status(f, chunks[1], app);
    draw_input(f, chunks[2], app);
}

fn entry_prefix(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::User => PREFIX_USER,
        EntryKind::Assistant | EntryKind::Loading => PREFIX_ASSISTANT,
        EntryKind::Info => PREFIX_INFO,
        EntryKind::Error => PREFIX_ERROR,
    }
}

fn entry_style(kind: EntryKind) -> Style {
    match kind {
        EntryKind::User => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        EntryKind::Assistant => Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
        EntryKind::Info => Style::default().fg(Color::DarkGray),
        EntryKind::Error => Style::default().fg(THEME.error),
        EntryKind::Loading => Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    }
}

fn draw_transcript(f: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default()
        .title(TITLE_CHAT)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(THEME.chat_border));

    let inner_w = area.width.saturating_sub(2).max(1) as usize;
    let inner_h = area.height.saturating_sub(2).max(1) as usize;

    // Wrap every entry; prefix on the first line, hanging indent after.
    let mut all_lines: Vec<Line> = Vec::new();
    for entry in &app.transcript {
        let prefix = entry_prefix(entry.kind);
        let head_style = entry_style(entry.kind);
        let body_style = match entry.kind {
            EntryKind::User | EntryKind::Assistant => Style::default(),
            _ => head_style,
        };
        let full = format!("{}{}", prefix, entry.content);
        let indent = " ".repeat(UnicodeWidthStr::width(prefix));
        let opts = Options::new(inner_w).subsequent_indent(&indent);
        for (li, piece) in wrap(&full, opts).into_iter().enumerate() {
            let line = piece.into_owned();
            if li == 0 {
                let hb = UnicodeWidthStr::width(prefix).min(line.len());
                all_lines.push(Line::from(vec![
                    Span::styled(line[..hb].to_string(), head_style),
                    Span::styled(line[hb..].to_string(), body_style),
                ]));
            } else {
                all_lines.push(Line::from(Span::styled(line, body_style)));
            }
        }
        for c in &entry.citations {
            all_lines.push(Line::from(Span::styled(
                format!("  [{}] {}", c.index, c.url),
                Style::default().fg(THEME.citation),
            )));
        }
    }

    let total = all_lines.len();
    let viewport = inner_h;
    app.chat_viewport = viewport as u16;
    let max_scroll = total.saturating_sub(viewport) as u16;
    if app.stick_to_bottom {
        app.chat_scroll = 0;
    }
    app.chat_scroll = app.chat_scroll.min(max_scroll);
    let start = (max_scroll - app.chat_scroll) as usize;

    let vis: Vec<Line> = all_lines.into_iter().skip(start).take(viewport).collect();
    let para = Paragraph::new(vis).block(block);
    f.render_widget(para, area);

    let inner = Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };
    if total > inner.height as usize {
        let mut sb_state = ScrollbarState::new(total).position(start);
        let sb = Scrollbar::default().orientation(ScrollbarOrientation::VerticalRight);
        f.render_stateful_widget(sb, inner, &mut sb_state);
    }
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let focus = match app.focus {
        Focus::Catalog => "Products",
        Focus::Selected => "Selected",
        Focus::Input => "Input",
    };
    let dir = match app.layout {
        LayoutDir::Ltr => "LTR",
        LayoutDir::Rtl => "RTL",
    };
    let text = build_status_line(
        app.busy,
        focus,
        dir,
        app.category.as_deref(),
        app.visible.len(),
        app.catalog.len(),
        app.selection.len(),
        area.width,
    );
    let para = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(para, area);
}

fn draw_input(f: &mut Frame, area: Rect, app: &App) {
    let focused = matches!(app.focus, Focus::Input);
    let block = Block::default()
        .title(TITLE_INPUT)
        .borders(Borders::ALL)
        .border_style(border_style(focused));
    let inner_w = area.width.saturating_sub(2).max(1);

    let para = if app.input.is_empty() {
        Paragraph::new(Line::from(Span::styled(
            INPUT_HINT,
            Style::default().fg(Color::DarkGray),
        )))
        .block(block)
        .wrap(Wrap { trim: false })
    } else {
        Paragraph::new(app.input.clone())
            .block(block)
            .wrap(Wrap { trim: false })
    };
    f.render_widget(para, area);

    if focused {
        let graphemes: Vec<&str> = app.input.graphemes(true).collect();
        let upto = app.input_cursor.min(graphemes.len());
        let (line_idx, col) = measure_cursor(&graphemes, upto, inner_w);
        // The input box shows one line; pin the caret to it when wrapped.
        let col = if line_idx == 0 {
            col
        } else {
            inner_w.saturating_sub(1)
        };
        f.set_cursor_position(Position::new(
            area.x + 1 + col.min(inner_w.saturating_sub(1)),
            area.y + 1,
        ));
    }
}

fn draw_category_picker(f: &mut Frame, area: Rect, state: &crate::app::CategoryPickerState) {
    let popup_area = centered_rect(50, 60, area);
    let block = Block::default()
        .title(Span::styled(
            TITLE_CATEGORY,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(format!(">> {}", state.buffer)));
    let max_list = popup_area.height.saturating_sub(4) as usize;
    for (i, cat) in state.filtered.iter().take(max_list).enumerate() {
        let sel = i == state.selected;
        let style = if sel {
            Style::default()
                .fg(THEME.cursor_fg)
                .bg(THEME.cursor_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!("{} {}", if sel { ">" } else { " " }, cat),
            style,
        )));
    }
    let para = Paragraph::new(lines).block(block);
    f.render_widget(Clear, popup_area);
    f.render_widget(para, popup_area);

    let cursor_x = popup_area.x
        + 3
        + UnicodeWidthStr::width(
            state
                .buffer
                .graphemes(true)
                .take(state.cursor)
                .collect::<String>()
                .as_str(),
        ) as u16;
    f.set_cursor_position(Position::new(cursor_x, popup_area.y + 1));
}

fn draw_help(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(70, 70, area);
    let block = Block::default()
        .title(Span::styled(
            TITLE_HELP,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL);
    let lines = help_lines_ascii()
        .iter()
        .map(|s| Line::from(*s))
        .collect::<Vec<Line>>();
    let para = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(Clear, popup_area);
    f.render_widget(para, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vert[1]);
    horiz[1]
}

fn resolved_cursor(selected_cursor: usize, resolved_len: usize) -> usize {
    selected_cursor.min(resolved_len.saturating_sub(1))
}

fn measure_cursor(graphemes: &[&str], upto: usize, width: u16) -> (u16, u16) {
    if width == 0 {
        return (0, 0);
    }
    let mut line = 0u16;
    let mut col = 0u16;
    for g in graphemes.iter().take(upto) {
        let w = UnicodeWidthStr::width(*g) as u16;
        if col + w > width {
            line += 1;
            col = 0;
        }
        col += w;
    }
    (line, col)
}

#[cfg(test)]
mod tests {
    use super::{measure_cursor, resolved_cursor};
    use unicode_segmentation::UnicodeSegmentation;

    #[test]
    fn selected_cursor_clamps_to_resolved_rows() {
        // Stale ids shrink the resolved list below raw membership.
        assert_eq!(resolved_cursor(2, 1), 0);
        assert_eq!(resolved_cursor(0, 0), 0);
        assert_eq!(resolved_cursor(1, 3), 1);
    }

    #[test]
    fn cursor_measure_wraps_at_width() {
        let s = "abcdef";
        let g: Vec<&str> = s.graphemes(true).collect();
        assert_eq!(measure_cursor(&g, 5, 5), (0, 5));
        assert_eq!(measure_cursor(&g, 6, 5), (1, 1));
        assert_eq!(measure_cursor(&g, 0, 5), (0, 0));
    }
}
