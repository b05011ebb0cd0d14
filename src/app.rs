use tokio::task::JoinHandle;
use anyhow::Result;
use crate::backend::{BackendClient, BotOutcome};
use crate::config::Config;
use crate::reveal::Reveal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// One transcript entry. Immutable once pushed.
#[derive(Debug, Clone)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub transcript: Vec<Message>,

    // Input state
    pub input: String,
    pub cursor: usize, // cursor position in chars
    pub input_enabled: bool,

    // Busy state: a request is in flight and submits are rejected
    pub busy: bool,
    pub status: String,

    // Pending request (at most one, the busy guard enforces it)
    pub pending: Option<JoinHandle<Result<BotOutcome>>>,

    // Typewriter state (at most one, cancel-on-supersede)
    pub reveal: Option<Reveal>,
    pub reveal_enabled: bool,

    // Transcript scroll state
    pub scroll: u16,
    pub stick_to_bottom: bool,
    pub transcript_height: u16, // inner height, updated during render
    pub transcript_width: u16,  // inner width, for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub backend: BackendClient,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            should_quit: false,
            transcript: Vec::new(),

            input: String::new(),
            cursor: 0,
            input_enabled: true,

            busy: false,
            status: String::new(),

            pending: None,

            reveal: None,
            reveal_enabled: config.reveal_enabled(),

            scroll: 0,
            stick_to_bottom: true,
            transcript_height: 0,
            transcript_width: 0,

            animation_frame: 0,

            backend: BackendClient::new(&config.server_url()),
        }
    }

    /// True when a submit would be accepted right now. Drives the
    /// footer hint; the real guard is in `take_submission`.
    pub fn can_send(&self) -> bool {
        !self.busy && !self.input.trim().is_empty()
    }

    /// The send pipeline's entry: validates and commits the user's turn.
    ///
    /// Whitespace-only input and raced submits while a request is in
    /// flight are both no-ops. Otherwise the trimmed text is pushed as
    /// a user message, the input is cleared, and the busy window opens;
    /// the caller spawns the actual request with the returned text.
    pub fn take_submission(&mut self) -> Option<String> {
        if self.busy {
            return None;
        }

        let text = self.input.trim().to_string();
        if text.is_empty() {
            return None;
        }

        self.push_message(Sender::User, text.clone());
        self.input.clear();
        self.cursor = 0;
        self.busy = true;
        self.status = "Bot is typing".to_string();
        self.stick_to_bottom = true;

        Some(text)
    }

    /// Opens the connect window: input stays disabled until the
    /// initialization request settles.
    pub fn begin_connect(&mut self) {
        self.busy = true;
        self.input_enabled = false;
        self.status = "Connecting".to_string();
    }

    /// Settle the initialization request. Failure is non-fatal: the
    /// input is enabled either way so the user can still submit.
    pub fn finish_connect(&mut self, result: Result<BotOutcome>) {
        self.close_busy_window();
        self.input_enabled = true;

        match result {
            Ok(outcome) => self.apply_outcome(outcome),
            Err(e) => self.push_message(
                Sender::Bot,
                format!("Could not reach the server: {}", e),
            ),
        }
    }

    /// Settle a chat request.
    pub fn finish_exchange(&mut self, result: Result<BotOutcome>) {
        self.close_busy_window();

        match result {
            Ok(outcome) => self.apply_outcome(outcome),
            Err(e) => self.push_message(Sender::Bot, format!("Error: {}", e)),
        }
    }

    fn close_busy_window(&mut self) {
        self.busy = false;
        self.status.clear();
        self.animation_frame = 0;
        self.stick_to_bottom = true;
    }

    fn apply_outcome(&mut self, outcome: BotOutcome) {
        match outcome {
            BotOutcome::Reply(text) => self.push_bot_reply(text),
            // Errors render immediately, without the typewriter
            BotOutcome::Error(text) => self.push_message(Sender::Bot, text),
        }
    }

    /// Append a bot reply, revealed character by character when the
    /// typewriter is enabled. Starting this reveal supersedes any
    /// reveal still running on an earlier slot.
    pub fn push_bot_reply(&mut self, text: String) {
        let slot = self.transcript.len();
        if self.reveal_enabled && !text.is_empty() {
            self.reveal = Some(Reveal::new(slot, &text));
        }
        self.push_message(Sender::Bot, text);
    }

    pub fn push_message(&mut self, sender: Sender, text: String) {
        self.transcript.push(Message { sender, text });
        self.stick_to_bottom = true;
    }

    /// The currently visible text of a transcript entry: a prefix while
    /// that entry is revealing, the full text otherwise.
    pub fn visible_text(&self, idx: usize) -> &str {
        let text = self.transcript[idx].text.as_str();
        match &self.reveal {
            Some(reveal) if reveal.slot == idx => reveal.visible(text),
            _ => text,
        }
    }

    /// Advance the ellipsis animation (slow tick).
    pub fn tick_animation(&mut self) {
        if self.busy {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Advance the typewriter one character (fast tick) and keep the
    /// newest character in view.
    pub fn tick_reveal(&mut self) {
        if let Some(reveal) = &mut self.reveal {
            if reveal.advance() {
                self.reveal = None;
            }
            self.stick_to_bottom = true;
        }
    }

    // Transcript scrolling
    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
        self.stick_to_bottom = false;
    }

    pub fn scroll_down(&mut self) {
        let max_scroll = self.max_scroll();
        if self.scroll < max_scroll {
            self.scroll += 1;
        }
        self.stick_to_bottom = self.scroll >= max_scroll;
    }

    /// Snap the viewport so the newest line is visible. Called during
    /// render while `stick_to_bottom` holds.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.max_scroll();
    }

    fn max_scroll(&self) -> u16 {
        self.transcript_line_count()
            .saturating_sub(self.transcript_height)
    }

    /// Wrapped line count of the rendered transcript, mirroring what
    /// the transcript paragraph produces: a sender tag line, the
    /// wrapped content lines, and a blank line per message.
    pub fn transcript_line_count(&self) -> u16 {
        let wrap_width = if self.transcript_width > 0 {
            self.transcript_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for idx in 0..self.transcript.len() {
            total_lines += 1; // Sender tag line ("You" or "Bot")
            for line in self.visible_text(idx).lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1; // Empty line still takes one line
                } else {
                    total_lines += ((char_count.saturating_sub(1) / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        total_lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn test_app() -> App {
        App::new(&Config::new())
    }

    #[test]
    fn test_whitespace_submission_is_a_no_op() {
        let mut app = test_app();
        app.input = "   \t  ".to_string();

        assert!(app.take_submission().is_none());
        assert!(app.transcript.is_empty());
        assert!(!app.busy);
    }

    #[test]
    fn test_submission_while_busy_is_rejected() {
        let mut app = test_app();
        app.busy = true;
        app.input = "hello".to_string();

        assert!(app.take_submission().is_none());
        assert!(app.transcript.is_empty());
        // Input is kept so nothing is lost by the raced Enter
        assert_eq!(app.input, "hello");
    }

    #[test]
    fn test_submission_trims_and_opens_busy_window() {
        let mut app = test_app();
        app.input = "  hola mundo  ".to_string();
        app.cursor = 5;

        let sent = app.take_submission();
        assert_eq!(sent.as_deref(), Some("hola mundo"));
        assert_eq!(app.transcript.len(), 1);
        assert_eq!(app.transcript[0].sender, Sender::User);
        assert_eq!(app.transcript[0].text, "hola mundo");
        assert!(app.input.is_empty());
        assert_eq!(app.cursor, 0);
        assert!(app.busy);
        assert_eq!(app.status, "Bot is typing");
    }

    #[test]
    fn test_user_messages_keep_submission_order() {
        let mut app = test_app();
        for text in ["one", "two", "three"] {
            app.input = text.to_string();
            app.take_submission();
            app.finish_exchange(Ok(BotOutcome::Reply(String::new())));
        }

        let user_texts: Vec<&str> = app
            .transcript
            .iter()
            .filter(|m| m.sender == Sender::User)
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(user_texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_reply_outcome_starts_reveal() {
        let mut app = test_app();
        app.input = "hi".to_string();
        app.take_submission();

        app.finish_exchange(Ok(BotOutcome::Reply("Hola".to_string())));

        assert!(!app.busy);
        assert!(app.status.is_empty());
        assert_eq!(app.transcript.len(), 2);
        assert_eq!(app.transcript[1].sender, Sender::Bot);
        assert_eq!(app.transcript[1].text, "Hola");

        // Revealing from zero: nothing visible yet, full text after ticks
        assert_eq!(app.visible_text(1), "");
        for _ in 0..4 {
            app.tick_reveal();
        }
        assert_eq!(app.visible_text(1), "Hola");
        assert!(app.reveal.is_none());
    }

    #[test]
    fn test_error_outcome_renders_without_reveal() {
        let mut app = test_app();
        app.input = "hi".to_string();
        app.take_submission();

        app.finish_exchange(Ok(BotOutcome::Error("boom".to_string())));

        assert_eq!(app.transcript[1].text, "boom");
        assert!(app.reveal.is_none());
        assert_eq!(app.visible_text(1), "boom");
    }

    #[test]
    fn test_transport_failure_renders_reason_and_reopens_send() {
        let mut app = test_app();
        app.input = "hi".to_string();
        app.take_submission();

        app.finish_exchange(Err(anyhow!("connection refused")));

        assert!(!app.busy);
        assert_eq!(app.transcript[1].sender, Sender::Bot);
        assert!(app.transcript[1].text.contains("connection refused"));

        // Send is accepted again iff the input holds text
        assert!(!app.can_send());
        app.input = "retry".to_string();
        assert!(app.can_send());
    }

    #[test]
    fn test_reveal_disabled_shows_full_text_at_once() {
        let mut app = test_app();
        app.reveal_enabled = false;

        app.push_bot_reply("Hola".to_string());

        assert!(app.reveal.is_none());
        assert_eq!(app.visible_text(0), "Hola");
    }

    #[test]
    fn test_new_reply_supersedes_running_reveal() {
        let mut app = test_app();
        app.push_bot_reply("first message".to_string());
        app.tick_reveal();

        app.push_bot_reply("second".to_string());

        // The first message snaps to fully visible, only the new slot reveals
        assert_eq!(app.visible_text(0), "first message");
        assert_eq!(app.visible_text(1), "");
        assert_eq!(app.reveal.as_ref().unwrap().slot, 1);
    }

    #[test]
    fn test_connect_window_disables_input_then_enables() {
        let mut app = test_app();
        app.begin_connect();
        assert!(!app.input_enabled);
        assert!(app.busy);
        assert_eq!(app.status, "Connecting");

        app.finish_connect(Err(anyhow!("dns error")));
        assert!(app.input_enabled);
        assert!(!app.busy);
        assert!(app.status.is_empty());
        assert!(app.transcript[0].text.contains("dns error"));
    }

    #[test]
    fn test_connect_reply_renders_like_a_bot_message() {
        let mut app = test_app();
        app.begin_connect();
        app.finish_connect(Ok(BotOutcome::Reply("Welcome!".to_string())));

        assert_eq!(app.transcript[0].sender, Sender::Bot);
        assert_eq!(app.transcript[0].text, "Welcome!");
        assert!(app.reveal.is_some());
    }

    #[test]
    fn test_transcript_line_count_wraps_by_chars() {
        let mut app = test_app();
        app.transcript_width = 4;
        app.reveal_enabled = false;

        // Tag line + ceil(10 / 4) = 3 content lines + blank line
        app.push_message(Sender::Bot, "aaaaaaaaaa".to_string());
        assert_eq!(app.transcript_line_count(), 5);

        // Exact multiple of the width stays at width / 4 lines
        let mut app = test_app();
        app.transcript_width = 4;
        app.push_message(Sender::User, "aaaaaaaa".to_string());
        assert_eq!(app.transcript_line_count(), 4);
    }

    #[test]
    fn test_scroll_down_at_bottom_restores_stick() {
        let mut app = test_app();
        app.transcript_width = 10;
        app.transcript_height = 2;
        app.reveal_enabled = false;
        app.push_message(Sender::Bot, "a".repeat(40));
        app.scroll_to_bottom();

        app.scroll_up();
        assert!(!app.stick_to_bottom);

        app.scroll_down();
        assert!(app.stick_to_bottom);
    }
}
