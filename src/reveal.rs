/// Typewriter state for one transcript slot.
///
/// The reveal is plain state advanced by the tick timer rather than a
/// detached timer chain, so replacing it (starting a reveal for another
/// slot, or again for the same slot) cancels the old one outright.
/// Steps are counted in chars, not bytes, so multibyte text reveals one
/// visible character at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    pub slot: usize,
    shown: usize,
    total: usize,
}

impl Reveal {
    pub fn new(slot: usize, text: &str) -> Self {
        Self {
            slot,
            shown: 0,
            total: text.chars().count(),
        }
    }

    /// Advance one character. Returns true once the full text is shown.
    pub fn advance(&mut self) -> bool {
        if self.shown < self.total {
            self.shown += 1;
        }
        self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.shown >= self.total
    }

    /// The currently visible prefix of `text`.
    pub fn visible<'a>(&self, text: &'a str) -> &'a str {
        match text.char_indices().nth(self.shown) {
            Some((byte_pos, _)) => &text[..byte_pos],
            None => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_reveals_one_char_per_tick() {
        let mut reveal = Reveal::new(0, "abc");
        assert_eq!(reveal.visible("abc"), "");

        assert!(!reveal.advance());
        assert_eq!(reveal.visible("abc"), "a");

        assert!(!reveal.advance());
        assert_eq!(reveal.visible("abc"), "ab");

        assert!(reveal.advance());
        assert_eq!(reveal.visible("abc"), "abc");
    }

    #[test]
    fn test_advance_past_end_stays_done() {
        let mut reveal = Reveal::new(0, "hi");
        reveal.advance();
        reveal.advance();
        assert!(reveal.is_done());
        assert!(reveal.advance());
        assert_eq!(reveal.visible("hi"), "hi");
    }

    #[test]
    fn test_multibyte_text_steps_on_char_boundaries() {
        let text = "¡héllo!";
        let mut reveal = Reveal::new(0, text);

        reveal.advance();
        assert_eq!(reveal.visible(text), "¡");

        reveal.advance();
        assert_eq!(reveal.visible(text), "¡h");

        reveal.advance();
        assert_eq!(reveal.visible(text), "¡hé");
    }

    #[test]
    fn test_empty_text_is_immediately_done() {
        let reveal = Reveal::new(3, "");
        assert!(reveal.is_done());
        assert_eq!(reveal.visible(""), "");
    }
}
