use std::time::Duration;

pub const GREETING: &str = "hello";

const LETTER_DELAY: Duration = Duration::from_millis(140);
const HOLD: Duration = Duration::from_millis(700);

#[derive(Debug, Clone)]
pub struct Intro {
    elapsed: Duration,
    skipped: bool,
}

impl Intro {
    pub fn new() -> Self {
        Self {
            elapsed: Duration::ZERO,
            skipped: false,
        }
    }

    fn typing_time() -> Duration {
        LETTER_DELAY * GREETING.chars().count() as u32
    }

    pub fn tick(&mut self, dt: Duration) -> bool {
        if self.is_complete() {
            return false;
        }
        let before = self.visible();
        self.elapsed = self.elapsed.saturating_add(dt);
        self.visible() != before || self.is_complete()
    }

    pub fn skip(&mut self) {
        self.skipped = true;
    }

    pub fn is_complete(&self) -> bool {
        self.skipped || self.elapsed >= Self::typing_time() + HOLD
    }

    pub fn visible(&self) -> &'static str {
        if self.skipped {
            return GREETING;
        }
        let letters = (self.elapsed.as_millis() / LETTER_DELAY.as_millis()) as usize;
        let end = GREETING
            .char_indices()
            .nth(letters)
            .map(|(at, _)| at)
            .unwrap_or(GREETING.len());
        &GREETING[..end]
    }

    pub fn cursor_visible(&self) -> bool {
        if self.elapsed < Self::typing_time() {
            return true;
        }
        (self.elapsed.as_millis() / 250) % 2 == 0
    }
}

impl Default for Intro {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn types_one_letter_at_a_time() {
        let mut intro = Intro::new();
        assert_eq!(intro.visible(), "");
        assert!(intro.tick(LETTER_DELAY));
        assert_eq!(intro.visible(), "h");
        intro.tick(LETTER_DELAY * 2);
        assert_eq!(intro.visible(), "hel");
        assert!(!intro.is_complete());
    }

    #[test]
    fn completes_after_hold() {
        let mut intro = Intro::new();
        intro.tick(LETTER_DELAY * 5);
        assert_eq!(intro.visible(), GREETING);
        assert!(!intro.is_complete());
        assert!(intro.tick(HOLD));
        assert!(intro.is_complete());
        assert!(!intro.tick(HOLD));
    }

    #[test]
    fn skip_finishes_immediately() {
        let mut intro = Intro::new();
        intro.skip();
        assert!(intro.is_complete());
        assert_eq!(intro.visible(), GREETING);
    }
}
