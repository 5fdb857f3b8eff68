use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use crate::scroll::{ScrollController, Spring};

pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

pub struct SystemBrowser;

impl LinkOpener for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        webbrowser::open(url).with_context(|| format!("open {url} in browser"))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    anchors: HashMap<String, usize>,
    header_height: u16,
    max_offset: usize,
}

impl PageLayout {
    pub fn new(header_height: u16) -> Self {
        Self {
            header_height,
            ..Self::default()
        }
    }

    pub fn insert_anchor<S: Into<String>>(&mut self, id: S, top: usize) {
        self.anchors.insert(id.into(), top);
    }

    pub fn anchor_top(&self, id: &str) -> Option<usize> {
        self.anchors.get(id).copied()
    }

    pub fn header_height(&self) -> u16 {
        self.header_height
    }

    pub fn set_header_height(&mut self, height: u16) {
        self.header_height = height;
    }

    pub fn max_offset(&self) -> usize {
        self.max_offset
    }

    pub fn set_max_offset(&mut self, max: usize) {
        self.max_offset = max;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    External(String),
    Scrolling { target: f64 },
    Unresolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationKey {
    Enter,
    Space,
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyHandling {
    Intercepted(Navigation),
    PassThrough,
}

pub fn is_fragment(href: &str) -> bool {
    href.starts_with('#')
}

pub struct Navigator {
    opener: Arc<dyn LinkOpener + Send + Sync>,
    scroll: ScrollController,
}

impl Navigator {
    pub fn new(opener: Arc<dyn LinkOpener + Send + Sync>, spring: Spring) -> Self {
        Self {
            opener,
            scroll: ScrollController::new(spring),
        }
    }

    pub fn scroll(&self) -> &ScrollController {
        &self.scroll
    }

    pub fn scroll_mut(&mut self) -> &mut ScrollController {
        &mut self.scroll
    }

    pub fn tick(&mut self, dt: Duration) -> bool {
        self.scroll.tick(dt)
    }

    pub fn navigate(&mut self, href: &str, layout: &PageLayout) -> Result<Navigation> {
        if !is_fragment(href) {
            self.follow_link(href)?;
            return Ok(Navigation::External(href.to_string()));
        }

        let id = &href[1..];
        let Some(top) = layout.anchor_top(id) else {
            debug!(href, "no section for fragment");
            return Ok(Navigation::Unresolved);
        };

        self.scroll.set_max_offset(layout.max_offset() as f64);
        let target = top.saturating_sub(layout.header_height() as usize) as f64;
        self.scroll.start(target);
        debug!(href, target, "scrolling to section");
        Ok(Navigation::Scrolling {
            target: self.scroll.target().unwrap_or(self.scroll.offset()),
        })
    }

    /// Enter animates in-page fragments and leaves external links alone;
    /// Space always goes through `navigate`.
    pub fn handle_key(
        &mut self,
        key: ActivationKey,
        href: &str,
        layout: &PageLayout,
    ) -> Result<KeyHandling> {
        match key {
            ActivationKey::Enter if !is_fragment(href) => Ok(KeyHandling::PassThrough),
            ActivationKey::Enter | ActivationKey::Space => {
                Ok(KeyHandling::Intercepted(self.navigate(href, layout)?))
            }
        }
    }

    pub fn follow_link(&self, url: &str) -> Result<()> {
        self.opener.open(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingOpener {
        opened: Mutex<Vec<String>>,
    }

    impl LinkOpener for RecordingOpener {
        fn open(&self, url: &str) -> Result<()> {
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    fn layout() -> PageLayout {
        let mut layout = PageLayout::new(3);
        layout.insert_anchor("about", 0);
        layout.insert_anchor("projects", 40);
        layout.set_max_offset(100);
        layout
    }

    fn navigator() -> (Navigator, Arc<RecordingOpener>) {
        let opener = Arc::new(RecordingOpener::default());
        (Navigator::new(opener.clone(), Spring::default()), opener)
    }

    #[test]
    fn external_links_open_without_scrolling() {
        let (mut nav, opener) = navigator();
        let outcome = nav.navigate("https://example.com/cv.pdf", &layout()).unwrap();
        assert_eq!(outcome, Navigation::External("https://example.com/cv.pdf".into()));
        assert!(!nav.scroll().is_animating());
        assert_eq!(opener.opened.lock().unwrap().as_slice(), ["https://example.com/cv.pdf"]);
    }

    #[test]
    fn fragment_targets_subtract_header() {
        let (mut nav, _) = navigator();
        let outcome = nav.navigate("#projects", &layout()).unwrap();
        assert_eq!(outcome, Navigation::Scrolling { target: 37.0 });
        assert!(nav.scroll().is_animating());
    }

    #[test]
    fn missing_fragment_is_a_no_op() {
        let (mut nav, opener) = navigator();
        nav.scroll_mut().jump_to(5.0);
        let outcome = nav.navigate("#contact", &layout()).unwrap();
        assert_eq!(outcome, Navigation::Unresolved);
        assert!(!nav.scroll().is_animating());
        assert_eq!(nav.scroll().offset(), 5.0);
        assert!(opener.opened.lock().unwrap().is_empty());
    }

    #[test]
    fn top_section_does_not_go_negative() {
        let (mut nav, _) = navigator();
        nav.scroll_mut().jump_to(20.0);
        let outcome = nav.navigate("#about", &layout()).unwrap();
        assert_eq!(outcome, Navigation::Scrolling { target: 0.0 });
    }

    #[test]
    fn last_request_wins() {
        let (mut nav, _) = navigator();
        nav.navigate("#projects", &layout()).unwrap();
        nav.tick(Duration::from_millis(50));
        nav.navigate("#about", &layout()).unwrap();
        assert_eq!(nav.scroll().target(), Some(0.0));
        for _ in 0..500 {
            nav.tick(Duration::from_millis(16));
        }
        assert_eq!(nav.scroll().offset(), 0.0);
    }

    #[test]
    fn enter_passes_external_links_through() {
        let (mut nav, opener) = navigator();
        let handling = nav
            .handle_key(ActivationKey::Enter, "https://example.com", &layout())
            .unwrap();
        assert_eq!(handling, KeyHandling::PassThrough);
        assert!(opener.opened.lock().unwrap().is_empty());
    }

    #[test]
    fn enter_and_space_animate_fragments() {
        let (mut nav, _) = navigator();
        let handling = nav
            .handle_key(ActivationKey::Enter, "#projects", &layout())
            .unwrap();
        assert_eq!(
            handling,
            KeyHandling::Intercepted(Navigation::Scrolling { target: 37.0 })
        );
        let handling = nav
            .handle_key(ActivationKey::Space, "#about", &layout())
            .unwrap();
        assert_eq!(
            handling,
            KeyHandling::Intercepted(Navigation::Scrolling { target: 0.0 })
        );
    }

    #[test]
    fn space_routes_external_links_through_navigate() {
        let (mut nav, opener) = navigator();
        let handling = nav
            .handle_key(ActivationKey::Space, "mailto:me@example.dev", &layout())
            .unwrap();
        assert_eq!(
            handling,
            KeyHandling::Intercepted(Navigation::External("mailto:me@example.dev".into()))
        );
        assert_eq!(opener.opened.lock().unwrap().len(), 1);
    }
}
