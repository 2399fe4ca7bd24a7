use chrono::{DateTime, Local};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, InputMode, Screen};

pub fn render(frame: &mut Frame, app: &mut App) {
    match app.screen {
        Screen::Feed => render_feed(frame, app),
        Screen::Post => render_post(frame, app),
    }
}

/// RFC 3339 timestamps come straight from the feed document; anything that
/// fails to parse is shown as-is.
fn format_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Local).format("%b %e, %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", cut.trim_end())
    }
}

fn render_feed(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .split(frame.area());

    let title = Paragraph::new(Line::from(vec![
        Span::styled("Recent Posts", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(
            format!("({} posts)", app.feed.len()),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    if app.feed.is_empty() {
        let empty = Paragraph::new("No posts available.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, chunks[1]);
    } else {
        let width = chunks[1].width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = app
            .feed
            .posts()
            .iter()
            .map(|post| {
                let header = Line::from(vec![
                    Span::styled(
                        post.author.name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  {}", format_timestamp(&post.timestamp)),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]);
                let preview = Line::from(truncate(&post.content.text, width.max(20)));
                let counters = Line::from(Span::styled(
                    format!("♥ {}   💬 {} comments", post.likes, post.comments.len()),
                    Style::default().fg(Color::DarkGray),
                ));
                ListItem::new(vec![header, preview, counters, Line::default()])
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().bg(Color::Rgb(40, 44, 52)))
            .highlight_symbol("▌ ");
        frame.render_stateful_widget(list, chunks[1], &mut app.feed_state);
    }

    let help = Paragraph::new(Line::from(
        "j/k move · Enter open · q quit".fg(Color::DarkGray),
    ));
    frame.render_widget(help, chunks[2]);
}

fn render_post(frame: &mut Frame, app: &mut App) {
    let Some(post) = app.selected_post().cloned() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(post_header_height(&post.content.text, frame.area())),
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .split(frame.area());

    // Post header and body
    let mut body = vec![Line::from(vec![
        Span::styled(
            post.author.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", format_timestamp(&post.timestamp)),
            Style::default().fg(Color::DarkGray),
        ),
    ])];
    if let Some(image) = &post.content.image {
        body.push(Line::from(Span::styled(
            format!("[image: {}]", image),
            Style::default().fg(Color::Magenta),
        )));
    }
    body.push(Line::default());
    body.push(Line::from(post.content.text.clone()));

    let header = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Post "));
    frame.render_widget(header, chunks[0]);

    // Interaction status line
    let like_style = if app.liked {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let flag_style = if app.flagged {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let status = Paragraph::new(Line::from(vec![
        Span::styled(format!(" ♥ Like ({})", app.post_likes), like_style),
        Span::raw("   "),
        Span::styled(
            format!("💬 Reply ({})", post.comments.len()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("   "),
        Span::styled(
            if app.flagged { "⚑ Flagged" } else { "⚑ Flag" },
            flag_style,
        ),
    ]));
    frame.render_widget(status, chunks[1]);

    render_comments(frame, app, &post, chunks[2]);
    render_input(frame, app, chunks[3]);

    let help = match app.input_mode {
        InputMode::Normal => "j/k comments · u/d rate · l like · f flag · i write · Esc back · q quit",
        InputMode::Editing => "Enter send · Esc cancel",
    };
    frame.render_widget(
        Paragraph::new(Line::from(help.fg(Color::DarkGray))),
        chunks[4],
    );
}

fn post_header_height(text: &str, area: Rect) -> u16 {
    // Rough wrap estimate: author line + blank + wrapped body + borders
    let width = area.width.saturating_sub(2).max(20) as usize;
    let body_lines = (text.chars().count() / width + 1) as u16;
    (body_lines + 4).min(area.height / 2)
}

fn render_comments(frame: &mut Frame, app: &mut App, post: &crate::feed::Post, area: Rect) {
    let width = area.width.saturating_sub(4) as usize;
    let mut items: Vec<ListItem> = post
        .comments
        .iter()
        .map(|comment| {
            let is_assistant = comment.author.role == "assistant";
            let mut name_spans = vec![Span::styled(
                comment.author.name.clone(),
                Style::default().add_modifier(Modifier::BOLD).fg(if is_assistant {
                    Color::Cyan
                } else {
                    Color::White
                }),
            )];
            if is_assistant {
                name_spans.push(Span::raw(" "));
                name_spans.push(Span::styled(
                    "[AI]",
                    Style::default().fg(Color::Black).bg(Color::Cyan),
                ));
            }

            let mut lines = vec![Line::from(name_spans)];
            for wrapped in wrap_text(&comment.content.text, width.max(20)) {
                lines.push(Line::from(wrapped));
            }
            lines.push(Line::from(Span::styled(
                format!("👍 {}   👎 {}", comment.likes, comment.dislikes),
                Style::default().fg(Color::DarkGray),
            )));
            lines.push(Line::default());
            ListItem::new(lines)
        })
        .collect();

    if app.loading {
        let dots = ".".repeat(app.animation_frame as usize + 1);
        items.push(ListItem::new(Line::from(Span::styled(
            format!("AI is typing{}", dots),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
        ))));
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Comments "))
        .highlight_style(Style::default().bg(Color::Rgb(40, 44, 52)));
    frame.render_stateful_widget(list, area, &mut app.comment_state);
}

fn render_input(frame: &mut Frame, app: &mut App, area: Rect) {
    let (text, style) = if app.loading {
        (
            "AI is typing…".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else if app.draft.is_empty() && app.input_mode == InputMode::Normal {
        (
            "Write a comment… (press i)".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (app.draft.clone(), Style::default())
    };

    let border_style = if app.input_mode == InputMode::Editing {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let input = Paragraph::new(text)
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(" Comment "),
        );
    frame.render_widget(input, area);

    if app.input_mode == InputMode::Editing && !app.loading {
        let offset = cursor_display_offset(&app.draft, app.draft_cursor);
        let cursor_x = area.x + 1 + offset.min(area.width.saturating_sub(2) as usize) as u16;
        frame.set_cursor_position((cursor_x, area.y + 1));
    }
}

/// Terminal column of the cursor: the display width of everything before it,
/// so wide (CJK, emoji) characters advance by two cells.
fn cursor_display_offset(draft: &str, cursor: usize) -> usize {
    let byte_pos = draft
        .char_indices()
        .nth(cursor)
        .map(|(i, _)| i)
        .unwrap_or(draft.len());
    draft[..byte_pos].width()
}

/// Greedy character wrap; enough for comment bubbles.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for source_line in text.lines() {
        let chars: Vec<char> = source_line.chars().collect();
        if chars.is_empty() {
            lines.push(String::new());
            continue;
        }
        for chunk in chars.chunks(width) {
            lines.push(chunk.iter().collect());
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("short", 20), "short");
    }

    #[test]
    fn truncate_adds_ellipsis() {
        let out = truncate("a very long piece of text", 10);
        assert!(out.ends_with('…'));
        assert!(out.chars().count() <= 10);
    }

    #[test]
    fn wrap_splits_on_width() {
        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn unparsable_timestamps_pass_through() {
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn cursor_offset_counts_display_cells() {
        assert_eq!(cursor_display_offset("hello", 3), 3);
        // Each CJK character occupies two cells
        assert_eq!(cursor_display_offset("日本語", 2), 4);
        assert_eq!(cursor_display_offset("a日b", 2), 3);
        // Cursor past the end clamps to the full width
        assert_eq!(cursor_display_offset("日本", 10), 4);
    }
}
