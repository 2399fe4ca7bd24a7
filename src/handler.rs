use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, InputMode, Screen};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Tick => {
            app.tick_animation();
            app.poll_reply().await;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Works in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match app.screen {
        Screen::Feed => handle_feed_keys(app, key),
        Screen::Post => handle_post_keys(app, key),
    }
}

fn handle_feed_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.feed_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.feed_nav_up(),
        KeyCode::Enter => app.select_post(),
        _ => {}
    }
}

fn handle_post_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h') => app.deselect(),

        KeyCode::Char('j') | KeyCode::Down => app.comment_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.comment_nav_up(),

        KeyCode::Char('l') => app.toggle_like(),
        KeyCode::Char('f') => app.toggle_flag(),

        KeyCode::Char('u') => app.rate_selected_comment(true),
        KeyCode::Char('d') => app.rate_selected_comment(false),

        // Input is disabled while the assistant is typing
        KeyCode::Char('i') | KeyCode::Char('c') => {
            if !app.loading {
                app.input_mode = InputMode::Editing;
            }
        }
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.submit_comment();
        }
        KeyCode::Backspace => {
            if app.draft_cursor > 0 {
                app.draft_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.draft, app.draft_cursor);
                app.draft.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.draft.chars().count();
            if app.draft_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.draft, app.draft_cursor);
                app.draft.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.draft_cursor = app.draft_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.draft.chars().count();
            app.draft_cursor = (app.draft_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.draft_cursor = 0;
        }
        KeyCode::End => {
            app.draft_cursor = app.draft.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.draft, app.draft_cursor);
            app.draft.insert(byte_pos, c);
            app.draft_cursor += 1;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::AssistantClient;
    use crate::config::Config;
    use crate::feed::FeedStore;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> App {
        let posts: Vec<crate::feed::Post> =
            serde_json::from_str(crate::feed::FIXTURE).unwrap();
        let feed = FeedStore::from_posts(posts);
        let assistant = AssistantClient::new(&Config::default()).unwrap();
        App::with_parts(feed, assistant)
    }

    #[test]
    fn enter_opens_the_highlighted_post() {
        let mut app = test_app();
        handle_key(&mut app, key(KeyCode::Char('j')));
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.screen, Screen::Post);
        assert_eq!(app.selected, Some(1));
    }

    #[test]
    fn draft_editing_is_utf8_safe() {
        let mut app = test_app();
        app.select_post();
        handle_key(&mut app, key(KeyCode::Char('i')));
        assert_eq!(app.input_mode, InputMode::Editing);

        for c in "héllo".chars() {
            handle_key(&mut app, key(KeyCode::Char(c)));
        }
        assert_eq!(app.draft, "héllo");

        handle_key(&mut app, key(KeyCode::Left));
        handle_key(&mut app, key(KeyCode::Left));
        handle_key(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.draft, "hélo");
    }

    #[test]
    fn editing_is_blocked_while_loading() {
        let mut app = test_app();
        app.select_post();
        app.loading = true;

        handle_key(&mut app, key(KeyCode::Char('i')));
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn rating_keys_hit_the_highlighted_comment() {
        let mut app = test_app();
        app.select_post();
        handle_key(&mut app, key(KeyCode::Char('j')));

        handle_key(&mut app, key(KeyCode::Char('u')));
        handle_key(&mut app, key(KeyCode::Char('d')));

        let comment = &app.selected_post().unwrap().comments[0];
        assert_eq!(comment.likes, 2); // fixture starts at 1
        assert_eq!(comment.dislikes, 1);
    }
}
