use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use crate::app::App;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::RevealTick => app.tick_reveal(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Quit keys work in any state
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }
    if key.code == KeyCode::Esc {
        app.should_quit = true;
        return;
    }

    // Transcript scrolling stays available while a request is in flight
    match key.code {
        KeyCode::Up | KeyCode::PageUp => {
            app.scroll_up();
            return;
        }
        KeyCode::Down | KeyCode::PageDown => {
            app.scroll_down();
            return;
        }
        _ => {}
    }

    // Everything below edits the input, which is disabled while the
    // opening request is still connecting
    if !app.input_enabled {
        return;
    }

    match key.code {
        KeyCode::Enter => submit(app),
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.cursor = (app.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.cursor);
            app.input.insert(byte_pos, c);
            app.cursor += 1;
        }
        _ => {}
    }
}

/// The send pipeline: commit the user's turn, then issue exactly one
/// request for it. `take_submission` rejects whitespace-only input and
/// raced submits during the busy window.
fn submit(app: &mut App) {
    if let Some(text) = app.take_submission() {
        let backend = app.backend.clone();
        app.pending = Some(tokio::spawn(async move { backend.send(&text).await }));
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => {
            app.scroll_down();
            app.scroll_down();
            app.scroll_down();
        }
        MouseEventKind::ScrollUp => {
            app.scroll_up();
            app.scroll_up();
            app.scroll_up();
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Sender;
    use crate::config::Config;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> App {
        App::new(&Config::new())
    }

    #[test]
    fn test_char_to_byte_index_multibyte() {
        let s = "añc";
        assert_eq!(char_to_byte_index(s, 0), 0);
        assert_eq!(char_to_byte_index(s, 1), 1);
        assert_eq!(char_to_byte_index(s, 2), 3); // ñ is two bytes
        assert_eq!(char_to_byte_index(s, 5), s.len());
    }

    #[test]
    fn test_typing_inserts_at_cursor() {
        let mut app = test_app();
        for c in ['h', 'l', 'a'] {
            handle_key(&mut app, key(KeyCode::Char(c)));
        }
        handle_key(&mut app, key(KeyCode::Left));
        handle_key(&mut app, key(KeyCode::Left));
        handle_key(&mut app, key(KeyCode::Char('o')));

        assert_eq!(app.input, "hola");
        assert_eq!(app.cursor, 2);
    }

    #[test]
    fn test_backspace_removes_whole_char() {
        let mut app = test_app();
        app.input = "añ".to_string();
        app.cursor = 2;

        handle_key(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.input, "a");
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn test_typing_ignored_while_input_disabled() {
        let mut app = test_app();
        app.begin_connect();

        handle_key(&mut app, key(KeyCode::Char('x')));
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_escape_quits() {
        let mut app = test_app();
        handle_key(&mut app, key(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_enter_on_whitespace_sends_nothing() {
        let mut app = test_app();
        app.input = "   ".to_string();

        submit(&mut app);

        assert!(app.pending.is_none());
        assert!(app.transcript.is_empty());
    }

    #[tokio::test]
    async fn test_enter_commits_turn_and_spawns_request() {
        let mut app = test_app();
        app.input = " hola ".to_string();

        submit(&mut app);

        assert!(app.pending.is_some());
        assert!(app.busy);
        assert_eq!(app.transcript[0].sender, Sender::User);
        assert_eq!(app.transcript[0].text, "hola");

        // A second Enter during the busy window is a no-op
        app.input = "raced".to_string();
        let before = app.pending.take();
        submit(&mut app);
        assert!(app.pending.is_none());
        assert_eq!(app.transcript.len(), 1);
        drop(before);
    }
}
