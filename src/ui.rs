use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use textwrap::{wrap, Options as WrapOptions};
use tracing::{debug, info};
use unicode_width::UnicodeWidthStr;
use url::Url;

use crate::contact::{ContactForm, Field};
use crate::icons;
use crate::intro::Intro;
use crate::markdown;
use crate::modal::{ModalController, ModalError, Phase, Session, Tab};
use crate::navigator::{ActivationKey, KeyHandling, Navigation, Navigator};
use crate::portfolio::{Portfolio, Project};
use crate::resume::{self, EntryKind, Outcome};
use crate::sections::{self, Page, NAV_SECTIONS};
use crate::theme::{tag_color, Palette, ThemeMode};

const HEADER_HEIGHT: u16 = 3;
const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const WHEEL_STEP: f64 = 3.0;
const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let percent_x = percent_x.min(100);
    let percent_y = percent_y.min(100);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage(100 - percent_x - (100 - percent_x) / 2),
        ])
        .split(area);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage(100 - percent_y - (100 - percent_y) / 2),
        ])
        .split(horizontal[1]);
    vertical[1]
}

fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Focus {
    Nav,
    Projects,
}

impl Focus {
    fn toggled(self) -> Self {
        match self {
            Focus::Nav => Focus::Projects,
            Focus::Projects => Focus::Nav,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct NavItem {
    label: String,
    href: String,
}

fn resolve_link(base: Option<&str>, href: &str) -> Option<String> {
    if let Ok(url) = Url::parse(href) {
        return Some(url.to_string());
    }
    let base = Url::parse(base?).ok()?;
    base.join(href).ok().map(|url| url.to_string())
}

fn nav_items(portfolio: &Portfolio) -> Vec<NavItem> {
    let mut items: Vec<NavItem> = NAV_SECTIONS
        .iter()
        .map(|(id, label)| NavItem {
            label: (*label).to_string(),
            href: format!("#{id}"),
        })
        .collect();
    let base = portfolio
        .meta
        .url
        .as_deref()
        .or(portfolio.personal.contact.website.as_deref());
    if let Some(cv) = portfolio
        .meta
        .pdf
        .as_deref()
        .and_then(|pdf| resolve_link(base, pdf))
    {
        items.push(NavItem {
            label: "CV".to_string(),
            href: cv,
        });
    }
    items
}

struct Spinner {
    index: usize,
    last_tick: Instant,
}

impl Spinner {
    fn new() -> Self {
        Self {
            index: 0,
            last_tick: Instant::now(),
        }
    }

    fn frame(&self) -> &'static str {
        SPINNER_FRAMES[self.index % SPINNER_FRAMES.len()]
    }

    fn advance(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.last_tick) >= Duration::from_millis(120) {
            self.index = (self.index + 1) % SPINNER_FRAMES.len();
            self.last_tick = now;
            true
        } else {
            false
        }
    }

    fn reset(&mut self) {
        self.index = 0;
        self.last_tick = Instant::now();
    }
}

struct PageCache {
    width: u16,
    selected: Option<usize>,
    theme: ThemeMode,
    page: Page,
}

struct ReadmeView {
    project_id: String,
    width: u16,
    theme: ThemeMode,
    source_len: usize,
    lines: Vec<Line<'static>>,
}

fn refresh_readme_view(
    slot: &mut Option<ReadmeView>,
    session: &Session,
    theme: ThemeMode,
    width: u16,
) {
    let Some(readme) = session.readme() else {
        *slot = None;
        return;
    };
    let fresh = slot.as_ref().is_some_and(|view| {
        view.project_id == session.project_id()
            && view.width == width
            && view.theme == theme
            && view.source_len == readme.len()
    });
    if fresh {
        return;
    }
    let rendered = markdown::Renderer::new(theme.palette()).render(readme, width);
    *slot = Some(ReadmeView {
        project_id: session.project_id().to_string(),
        width,
        theme,
        source_len: readme.len(),
        lines: rendered.text.lines,
    });
}

fn wrap_with_prefixes(
    text: &str,
    width: usize,
    first_prefix: &str,
    rest_prefix: &str,
    style: Style,
) -> Vec<Line<'static>> {
    if text.trim().is_empty() {
        return vec![Line::from(Span::styled(String::new(), style))];
    }
    let min_width = first_prefix
        .chars()
        .count()
        .max(rest_prefix.chars().count())
        .saturating_add(1);
    let options = WrapOptions::new(width.max(min_width))
        .break_words(false)
        .initial_indent(first_prefix)
        .subsequent_indent(rest_prefix);
    wrap(text, options)
        .into_iter()
        .map(|cow| Line::from(Span::styled(cow.into_owned(), style)))
        .collect()
}

fn progress_line(ratio: f64, width: u16, palette: &Palette) -> Line<'static> {
    let width = width as usize;
    let ratio = ratio.clamp(0.0, 1.0);
    let filled = ((width as f64) * ratio).round() as usize;
    Line::from(vec![
        Span::styled("━".repeat(filled), Style::default().fg(palette.brand)),
        Span::styled(
            "─".repeat(width.saturating_sub(filled)),
            Style::default().fg(palette.border),
        ),
    ])
}

fn modal_lines(
    project: &Project,
    session: &Session,
    palette: &Palette,
    spinner: &str,
    readme: Option<&[Line<'static>]>,
    width: usize,
) -> Vec<Line<'static>> {
    let text = Style::default().fg(palette.text);
    let muted = Style::default().fg(palette.muted);
    let accent = Style::default().fg(palette.brand);
    let mut lines = Vec::new();

    if session.active_tab() == Tab::Playground {
        let href = project.href.clone().unwrap_or_default();
        if session.iframe_ready() {
            lines.push(Line::from(vec![
                Span::styled("✓ ", Style::default().fg(palette.success)),
                Span::styled("Live demo loaded: ", text),
                Span::styled(href, accent),
            ]));
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "Press o to open it in your browser.",
                muted,
            )));
        } else {
            lines.push(Line::from(vec![
                Span::styled(format!("{spinner} "), accent),
                Span::styled(format!("Loading {href}…"), muted),
            ]));
        }
        return lines;
    }

    if let Some(date) = project.date.as_ref() {
        lines.push(Line::from(Span::styled(date.display(), muted)));
    }
    lines.extend(wrap_with_prefixes(&project.description, width, "", "", text));

    if !project.bullets.is_empty() {
        lines.push(Line::default());
        for bullet in &project.bullets {
            lines.extend(wrap_with_prefixes(bullet, width, "• ", "  ", text));
        }
    }

    if !project.tags.is_empty() {
        lines.push(Line::default());
        let mut spans = Vec::new();
        for tag in &project.tags {
            spans.push(Span::styled(
                format!("[{tag}]"),
                Style::default().fg(tag_color(tag)),
            ));
            spans.push(Span::raw(" "));
        }
        spans.pop();
        lines.push(Line::from(spans));
    }

    if project.href.is_some() || !project.links.is_empty() {
        lines.push(Line::default());
    }
    if let Some(href) = project.href.as_deref() {
        lines.push(Line::from(vec![
            Span::styled("Live demo (o): ", muted),
            Span::styled(href.to_string(), accent),
        ]));
    }
    let github = project.github_link().map(|link| link.url.as_str());
    for link in &project.links {
        let key = if Some(link.url.as_str()) == github {
            " (g)"
        } else {
            ""
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{}{}{key}: ", icons::prefix(link.icon.as_deref()), link.label),
                muted,
            ),
            Span::styled(link.url.clone(), accent),
        ]));
    }

    if session.readme_pending() {
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled(format!("{spinner} "), accent),
            Span::styled("Fetching README…", muted),
        ]));
    } else if let Some(readme) = readme {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "README",
            Style::default()
                .fg(palette.brand)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::default());
        lines.extend(readme.iter().cloned());
    }

    lines
}

pub struct Options {
    pub portfolio: Arc<Portfolio>,
    pub modal: ModalController,
    pub navigator: Navigator,
    pub theme: ThemeMode,
    pub intro: bool,
    pub tick_rate: Duration,
    pub status_message: String,
}

pub struct Model {
    portfolio: Arc<Portfolio>,
    modal: ModalController,
    navigator: Navigator,
    theme: ThemeMode,
    status_message: String,
    focus: Focus,
    nav_items: Vec<NavItem>,
    nav_selected: usize,
    nav_hits: Vec<(Rect, usize)>,
    selected_project: usize,
    page: Option<PageCache>,
    page_area: Option<Rect>,
    modal_area: Option<Rect>,
    modal_scroll: usize,
    modal_body_height: usize,
    modal_view_height: u16,
    readme_view: Option<ReadmeView>,
    intro: Option<Intro>,
    resume: Option<resume::Terminal>,
    contact: ContactForm,
    contact_visible: bool,
    spinner: Spinner,
    tick_rate: Duration,
    needs_redraw: bool,
}

impl Model {
    pub fn new(opts: Options) -> Self {
        let nav_items = nav_items(&opts.portfolio);
        Self {
            nav_items,
            portfolio: opts.portfolio,
            modal: opts.modal,
            navigator: opts.navigator,
            theme: opts.theme,
            status_message: opts.status_message,
            focus: Focus::Nav,
            nav_selected: 0,
            nav_hits: Vec::new(),
            selected_project: 0,
            page: None,
            page_area: None,
            modal_area: None,
            modal_scroll: 0,
            modal_body_height: 0,
            modal_view_height: 0,
            readme_view: None,
            intro: opts.intro.then(Intro::new),
            resume: None,
            contact: ContactForm::default(),
            contact_visible: false,
            spinner: Spinner::new(),
            tick_rate: opts.tick_rate,
            needs_redraw: true,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(DisableMouseCapture)?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn palette(&self) -> Palette {
        self.theme.palette()
    }

    fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    fn is_animating(&self) -> bool {
        self.navigator.scroll().is_animating() || self.intro.is_some()
    }

    fn is_loading(&self) -> bool {
        self.modal.phase() == Phase::PlaygroundLoading
            || self
                .modal
                .session()
                .is_some_and(|session| session.readme_pending())
    }

    fn advance_animations(&mut self, dt: Duration) -> bool {
        let mut changed = self.navigator.tick(dt);
        if let Some(intro) = self.intro.as_mut() {
            changed |= intro.tick(dt);
            if intro.is_complete() {
                self.intro = None;
                changed = true;
            }
        }
        changed
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();
        let mut last_frame = Instant::now();

        loop {
            if self.modal.poll() {
                self.mark_dirty();
            }

            let dt = last_frame.elapsed();
            last_frame = Instant::now();
            if self.advance_animations(dt) {
                self.mark_dirty();
            }

            if self.needs_redraw {
                terminal.draw(|frame| self.draw(frame))?;
                self.needs_redraw = false;
            }

            let was_animating = self.is_animating();
            let rate = if was_animating {
                FRAME_INTERVAL
            } else {
                self.tick_rate
            };
            let timeout = rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or(Duration::ZERO);

            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        match self.handle_key(key.code) {
                            Ok(true) => break,
                            Ok(false) => {}
                            Err(err) => {
                                self.status_message = format!("Error: {}", err);
                                self.mark_dirty();
                            }
                        }
                    }
                    Event::Mouse(mouse) => {
                        if let Err(err) = self.handle_mouse(mouse) {
                            self.status_message = format!("Error: {}", err);
                            self.mark_dirty();
                        }
                    }
                    Event::Resize(_, _) => self.mark_dirty(),
                    _ => {}
                }
            }

            // an animation started by this event measures time from now
            if !was_animating {
                last_frame = Instant::now();
            }

            if last_tick.elapsed() >= rate {
                last_tick = Instant::now();
                if self.is_loading() {
                    if self.spinner.advance() {
                        self.mark_dirty();
                    }
                } else {
                    self.spinner.reset();
                }
            }
        }

        Ok(())
    }

    fn ensure_page(&mut self, width: u16, height: u16) {
        let selected = (!self.portfolio.projects.is_empty()).then_some(self.selected_project);
        let stale = self.page.as_ref().map_or(true, |cache| {
            cache.width != width || cache.selected != selected || cache.theme != self.theme
        });
        if stale {
            let mut page = sections::render_page(
                &self.portfolio,
                &self.palette(),
                width,
                HEADER_HEIGHT as usize,
                selected,
            );
            page.layout.set_header_height(HEADER_HEIGHT);
            self.page = Some(PageCache {
                width,
                selected,
                theme: self.theme,
                page,
            });
        }
        if let Some(cache) = self.page.as_mut() {
            let max = cache.page.height().saturating_sub(height as usize);
            cache.page.layout.set_max_offset(max);
            self.navigator.scroll_mut().set_max_offset(max as f64);
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        if let Some(intro) = self.intro.as_mut() {
            intro.skip();
            self.mark_dirty();
            return Ok(false);
        }
        if self.resume.is_some() {
            return self.handle_resume_key(code);
        }
        if self.contact_visible {
            return self.handle_contact_key(code);
        }
        if self.modal.is_open() {
            return self.handle_modal_key(code);
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = self.focus.toggled();
                self.status_message = match self.focus {
                    Focus::Nav => "Header: ←/→ choose a section, Enter or Space to go.".to_string(),
                    Focus::Projects => "Projects: j/k choose, Enter opens details.".to_string(),
                };
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.focus = Focus::Nav;
                self.nav_selected = self.nav_selected.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.focus = Focus::Nav;
                if self.nav_selected + 1 < self.nav_items.len() {
                    self.nav_selected += 1;
                }
            }
            KeyCode::Enter => self.activate(ActivationKey::Enter)?,
            KeyCode::Char(' ') => self.activate(ActivationKey::Space)?,
            KeyCode::Down | KeyCode::Char('j') => match self.focus {
                Focus::Projects => self.move_project(1),
                Focus::Nav => self.navigator.scroll_mut().scroll_by(1.0),
            },
            KeyCode::Up | KeyCode::Char('k') => match self.focus {
                Focus::Projects => self.move_project(-1),
                Focus::Nav => self.navigator.scroll_mut().scroll_by(-1.0),
            },
            KeyCode::PageDown => {
                let step = self.page_view_height();
                self.navigator.scroll_mut().scroll_by(step);
            }
            KeyCode::PageUp => {
                let step = self.page_view_height();
                self.navigator.scroll_mut().scroll_by(-step);
            }
            KeyCode::Home => self.navigator.scroll_mut().start(0.0),
            KeyCode::End => {
                let max = self
                    .page
                    .as_ref()
                    .map(|cache| cache.page.layout.max_offset())
                    .unwrap_or(0);
                self.navigator.scroll_mut().start(max as f64);
            }
            KeyCode::Char(ch @ '1'..='9') => {
                let index = ch as usize - '1' as usize;
                if index < self.nav_items.len() {
                    self.nav_selected = index;
                    self.focus = Focus::Nav;
                    self.activate(ActivationKey::Space)?;
                }
            }
            KeyCode::Char('t') => {
                self.theme = self.theme.toggled();
                self.status_message = match self.theme {
                    ThemeMode::Dark => "Dark theme.".to_string(),
                    ThemeMode::Light => "Light theme.".to_string(),
                };
            }
            KeyCode::Char('r') => {
                self.resume = Some(resume::Terminal::new(self.portfolio.clone()));
                self.status_message = "Resume terminal: type help, Esc closes.".to_string();
            }
            KeyCode::Char('f') => {
                self.contact_visible = true;
                self.status_message = "Contact form: Tab next field, Enter sends.".to_string();
            }
            _ => return Ok(false),
        }

        self.mark_dirty();
        Ok(false)
    }

    fn page_view_height(&self) -> f64 {
        self.page_area
            .map(|area| area.height.saturating_sub(HEADER_HEIGHT).max(1) as f64)
            .unwrap_or(10.0)
    }

    fn activate(&mut self, key: ActivationKey) -> Result<()> {
        if self.focus == Focus::Projects {
            return self.open_project(self.selected_project);
        }
        let Some(item) = self.nav_items.get(self.nav_selected).cloned() else {
            return Ok(());
        };
        let Some(cache) = self.page.as_ref() else {
            return Ok(());
        };
        match self.navigator.handle_key(key, &item.href, &cache.page.layout)? {
            KeyHandling::PassThrough => {
                self.navigator.follow_link(&item.href)?;
                self.status_message = format!("Opened {} in your browser.", item.label);
            }
            KeyHandling::Intercepted(navigation) => self.report_navigation(&item.label, navigation),
        }
        Ok(())
    }

    fn report_navigation(&mut self, label: &str, navigation: Navigation) {
        match navigation {
            Navigation::External(_) => {
                self.status_message = format!("Opened {label} in your browser.");
            }
            Navigation::Scrolling { .. } => {
                self.status_message = label.to_string();
            }
            Navigation::Unresolved => {}
        }
    }

    fn move_project(&mut self, delta: i32) {
        let count = self.portfolio.projects.len();
        if count == 0 {
            return;
        }
        let next = (self.selected_project as i64 + delta as i64).clamp(0, count as i64 - 1);
        self.selected_project = next as usize;
        self.ensure_project_visible();
    }

    fn ensure_project_visible(&mut self) {
        let Some(cache) = self.page.as_ref() else {
            return;
        };
        let Some(top) = cache.page.project_rows.get(self.selected_project).copied() else {
            return;
        };
        let header = HEADER_HEIGHT as usize;
        let view = self.page_view_height() as usize;
        let offset = self.navigator.scroll().target().unwrap_or(self.navigator.scroll().offset());
        let offset = offset.round() as usize;
        let bottom = cache
            .page
            .project_rows
            .get(self.selected_project + 1)
            .copied()
            .unwrap_or(top + 4);
        if top < offset + header {
            self.navigator
                .scroll_mut()
                .start(top.saturating_sub(header) as f64);
        } else if bottom > offset + header + view {
            self.navigator
                .scroll_mut()
                .start(bottom.saturating_sub(header + view) as f64);
        }
    }

    fn open_project(&mut self, index: usize) -> Result<()> {
        if self.modal.select(index)? {
            self.selected_project = index;
            self.modal_scroll = 0;
            let title = self
                .modal
                .project()
                .map(|project| project.title.clone())
                .unwrap_or_default();
            self.status_message = format!("{title}: 1 details · 2 playground · Esc closes");
        }
        Ok(())
    }

    fn handle_modal_key(&mut self, code: KeyCode) -> Result<bool> {
        match code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('x') => {
                self.modal.close();
                self.modal_area = None;
                self.status_message = "Closed project.".to_string();
            }
            KeyCode::Char('1') | KeyCode::Char('d') => {
                self.modal.show_details()?;
                self.modal_scroll = 0;
            }
            KeyCode::Char('2') | KeyCode::Char('p') => match self.modal.open_playground() {
                Ok(()) => self.modal_scroll = 0,
                Err(ModalError::EmbedNotAllowed) => {
                    self.status_message =
                        "This demo can't be embedded. Press o to open it.".to_string();
                }
                Err(err) => return Err(err.into()),
            },
            KeyCode::Down | KeyCode::Char('j') => self.scroll_modal(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_modal(-1),
            KeyCode::PageDown => self.scroll_modal(self.modal_view_height.max(1) as i64),
            KeyCode::PageUp => self.scroll_modal(-(self.modal_view_height.max(1) as i64)),
            KeyCode::Home => self.modal_scroll = 0,
            KeyCode::Left | KeyCode::Char('h') => {
                let current = self.modal.session().map(Session::project_index).unwrap_or(0);
                if current > 0 {
                    self.open_project(current - 1)?;
                }
            }
            KeyCode::Right | KeyCode::Char('l') => {
                let current = self.modal.session().map(Session::project_index).unwrap_or(0);
                if current + 1 < self.portfolio.projects.len() {
                    self.open_project(current + 1)?;
                }
            }
            KeyCode::Char('o') => self.open_demo()?,
            KeyCode::Char('g') => self.open_github()?,
            _ => return Ok(false),
        }
        self.mark_dirty();
        Ok(false)
    }

    fn scroll_modal(&mut self, delta: i64) {
        let max = self
            .modal_body_height
            .saturating_sub(self.modal_view_height as usize);
        let next = (self.modal_scroll as i64 + delta).clamp(0, max as i64);
        self.modal_scroll = next as usize;
    }

    fn open_demo(&mut self) -> Result<()> {
        let Some(href) = self.modal.project().and_then(|project| project.href.clone()) else {
            self.status_message = "No live demo for this project.".to_string();
            return Ok(());
        };
        self.navigator.follow_link(&href)?;
        self.status_message = "Opened the live demo in your browser.".to_string();
        Ok(())
    }

    fn open_github(&mut self) -> Result<()> {
        let Some(url) = self
            .modal
            .project()
            .and_then(Project::github_link)
            .map(|link| link.url.clone())
        else {
            self.status_message = "No GitHub link for this project.".to_string();
            return Ok(());
        };
        self.navigator.follow_link(&url)?;
        self.status_message = "Opened GitHub in your browser.".to_string();
        Ok(())
    }

    fn handle_resume_key(&mut self, code: KeyCode) -> Result<bool> {
        let Some(term) = self.resume.as_mut() else {
            return Ok(false);
        };
        match code {
            KeyCode::Esc => {
                self.resume = None;
                self.status_message = "Resume terminal closed.".to_string();
            }
            KeyCode::Enter => {
                if term.submit() == Outcome::Exit {
                    self.resume = None;
                    self.status_message = "Resume terminal closed.".to_string();
                }
            }
            KeyCode::Up => term.history_previous(),
            KeyCode::Down => term.history_next(),
            KeyCode::Backspace => term.backspace(),
            KeyCode::Char(ch) => term.insert_char(ch),
            _ => return Ok(false),
        }
        self.mark_dirty();
        Ok(false)
    }

    fn handle_contact_key(&mut self, code: KeyCode) -> Result<bool> {
        match code {
            KeyCode::Esc => {
                self.contact_visible = false;
                self.status_message = "Contact form closed.".to_string();
            }
            KeyCode::Tab | KeyCode::Down => self.contact.next(),
            KeyCode::BackTab | KeyCode::Up => self.contact.previous(),
            KeyCode::Enter => {
                if self.contact.active == Field::Message {
                    self.send_contact()?;
                } else {
                    self.contact.next();
                }
            }
            KeyCode::Backspace => self.contact.backspace(),
            KeyCode::Char(ch) => self.contact.insert_char(ch),
            _ => return Ok(false),
        }
        self.mark_dirty();
        Ok(false)
    }

    fn send_contact(&mut self) -> Result<()> {
        let recipient = self.portfolio.personal.contact.email.clone();
        match self.contact.mailto_url(recipient.as_deref()) {
            Ok(url) => {
                self.navigator.follow_link(&url)?;
                info!("contact message handed to the mail client");
                self.contact.clear();
                self.contact_visible = false;
                self.status_message = "Opened your mail client with the message.".to_string();
            }
            Err(err) => {
                debug!(error = %err, "contact form rejected");
                self.contact.set_status(err.to_string());
            }
        }
        Ok(())
    }

    fn handle_mouse(&mut self, event: MouseEvent) -> Result<()> {
        if self.intro.is_some() || self.resume.is_some() || self.contact_visible {
            return Ok(());
        }

        match event.kind {
            MouseEventKind::ScrollDown => {
                if self.modal.is_open() {
                    self.scroll_modal(WHEEL_STEP as i64);
                } else {
                    self.navigator.scroll_mut().scroll_by(WHEEL_STEP);
                }
                self.mark_dirty();
            }
            MouseEventKind::ScrollUp => {
                if self.modal.is_open() {
                    self.scroll_modal(-(WHEEL_STEP as i64));
                } else {
                    self.navigator.scroll_mut().scroll_by(-WHEEL_STEP);
                }
                self.mark_dirty();
            }
            MouseEventKind::Down(MouseButton::Left) => {
                self.handle_click(event.column, event.row)?;
                self.mark_dirty();
            }
            _ => {}
        }

        Ok(())
    }

    fn handle_click(&mut self, column: u16, row: u16) -> Result<()> {
        if self.modal.is_open() {
            let outside = self
                .modal_area
                .map_or(true, |area| !rect_contains(area, column, row));
            if outside {
                self.modal.close();
                self.modal_area = None;
                self.status_message = "Closed project.".to_string();
            }
            return Ok(());
        }

        let hit = self
            .nav_hits
            .iter()
            .find(|(rect, _)| rect_contains(*rect, column, row))
            .map(|(_, index)| *index);
        if let Some(index) = hit {
            self.nav_selected = index;
            self.focus = Focus::Nav;
            let Some(item) = self.nav_items.get(index).cloned() else {
                return Ok(());
            };
            let Some(cache) = self.page.as_ref() else {
                return Ok(());
            };
            let navigation = self.navigator.navigate(&item.href, &cache.page.layout)?;
            self.report_navigation(&item.label, navigation);
            return Ok(());
        }

        let Some(area) = self.page_area else {
            return Ok(());
        };
        if !rect_contains(area, column, row) || row < area.y.saturating_add(HEADER_HEIGHT) {
            return Ok(());
        }
        let page_row = (row - area.y) as usize + self.navigator.scroll().row() as usize;
        let card = self
            .page
            .as_ref()
            .and_then(|cache| cache.page.project_at(page_row));
        if let Some(index) = card {
            self.focus = Focus::Projects;
            self.selected_project = index;
            self.open_project(index)?;
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) {
        let palette = self.palette();
        let full = frame.size();
        frame.render_widget(Block::default().style(Style::default().bg(palette.bg)), full);

        if let Some(intro) = self.intro.as_ref() {
            self.draw_intro(frame, full, intro, &palette);
            return;
        }

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(full);

        let status_text = if self.is_loading() {
            format!("{} {}", self.spinner.frame(), self.status_message)
                .trim()
                .to_string()
        } else {
            self.status_message.clone()
        };
        let status_line = Paragraph::new(status_text).style(
            Style::default()
                .fg(palette.text)
                .bg(palette.surface_focused)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(status_line, layout[0]);

        self.draw_page(frame, layout[1], &palette);
        self.draw_header(frame, layout[1], &palette);

        let footer = Paragraph::new(self.footer_text())
            .style(
                Style::default()
                    .fg(palette.muted)
                    .bg(palette.surface)
                    .add_modifier(Modifier::ITALIC),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(footer, layout[2]);

        if self.modal.is_open() {
            self.draw_modal(frame, layout[1], &palette);
        }
        if self.contact_visible {
            self.draw_contact(frame, layout[1], &palette);
        }
        if self.resume.is_some() {
            self.draw_resume(frame, layout[1], &palette);
        }
    }

    fn draw_intro(&self, frame: &mut Frame<'_>, area: Rect, intro: &Intro, palette: &Palette) {
        let cursor = if intro.cursor_visible() { "▌" } else { " " };
        let text = Text::from(vec![
            Line::from(vec![
                Span::styled(
                    intro.visible(),
                    Style::default()
                        .fg(palette.brand)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(cursor, Style::default().fg(palette.muted)),
            ]),
            Line::default(),
            Line::from(Span::styled(
                "press any key",
                Style::default()
                    .fg(palette.muted)
                    .add_modifier(Modifier::ITALIC),
            )),
        ]);
        let middle = centered_rect(60, 20, area);
        frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), middle);
    }

    fn draw_page(&mut self, frame: &mut Frame<'_>, area: Rect, palette: &Palette) {
        self.page_area = Some(area);
        let inner = Rect {
            x: area.x.saturating_add(2),
            width: area.width.saturating_sub(4),
            ..area
        };
        self.ensure_page(inner.width, area.height);
        let Some(cache) = self.page.as_ref() else {
            return;
        };
        let paragraph = Paragraph::new(cache.page.lines.clone())
            .style(Style::default().fg(palette.text).bg(palette.bg))
            .scroll((self.navigator.scroll().row(), 0));
        frame.render_widget(paragraph, inner);
    }

    fn draw_header(&mut self, frame: &mut Frame<'_>, area: Rect, palette: &Palette) {
        let header = Rect {
            height: HEADER_HEIGHT.min(area.height),
            ..area
        };
        frame.render_widget(Clear, header);
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(palette.border))
            .style(Style::default().bg(palette.surface));
        let inner = block.inner(header);
        frame.render_widget(block, header);

        let name = format!(" {}  ", self.portfolio.personal.name);
        let mut spans = vec![Span::styled(
            name.clone(),
            Style::default()
                .fg(palette.brand)
                .add_modifier(Modifier::BOLD),
        )];
        self.nav_hits.clear();
        let row = inner.y.saturating_add(inner.height.saturating_sub(1) / 2);
        let mut x = inner.x.saturating_add(UnicodeWidthStr::width(name.as_str()) as u16);
        for (index, item) in self.nav_items.iter().enumerate() {
            let label = format!(" {} ", item.label);
            let width = UnicodeWidthStr::width(label.as_str()) as u16;
            let selected = index == self.nav_selected;
            let style = if selected && self.focus == Focus::Nav {
                Style::default()
                    .fg(palette.text)
                    .bg(palette.selected)
                    .add_modifier(Modifier::BOLD)
            } else if selected {
                Style::default().fg(palette.brand)
            } else {
                Style::default().fg(palette.muted)
            };
            spans.push(Span::styled(label, style));
            spans.push(Span::raw(" "));
            self.nav_hits.push((
                Rect {
                    x,
                    y: row,
                    width,
                    height: 1,
                },
                index,
            ));
            x = x.saturating_add(width + 1);
        }
        let line_area = Rect {
            y: row,
            height: 1,
            ..inner
        };
        frame.render_widget(Paragraph::new(Line::from(spans)), line_area);

        if header.height == HEADER_HEIGHT {
            let rule = Rect {
                y: header.y + header.height - 1,
                height: 1,
                ..header
            };
            frame.render_widget(
                Paragraph::new(progress_line(self.page_progress(), rule.width, palette)),
                rule,
            );
        }
    }

    fn page_progress(&self) -> f64 {
        let max = self
            .page
            .as_ref()
            .map(|cache| cache.page.layout.max_offset())
            .unwrap_or(0);
        if max == 0 {
            return 0.0;
        }
        self.navigator.scroll().offset() / max as f64
    }

    fn draw_modal(&mut self, frame: &mut Frame<'_>, area: Rect, palette: &Palette) {
        let popup = centered_rect(84, 84, area);
        self.modal_area = Some(popup);
        frame.render_widget(Clear, popup);

        let (Some(project), Some(session)) = (self.modal.project(), self.modal.session()) else {
            return;
        };
        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", project.title),
                Style::default()
                    .fg(palette.brand)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border_focused))
            .style(Style::default().bg(palette.surface));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let tabs_height = if session.iframe_allowed() { 1 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(tabs_height),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        if session.iframe_allowed() {
            let mut spans = Vec::new();
            for (key, tab) in [("1", Tab::Details), ("2", Tab::Playground)] {
                let style = if session.active_tab() == tab {
                    Style::default()
                        .fg(palette.text)
                        .bg(palette.selected)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(palette.muted)
                };
                spans.push(Span::styled(format!(" {key} {} ", tab.title()), style));
                spans.push(Span::raw(" "));
            }
            frame.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);
        }

        let body_area = chunks[2];
        refresh_readme_view(&mut self.readme_view, session, self.theme, body_area.width);
        let lines = modal_lines(
            project,
            session,
            palette,
            self.spinner.frame(),
            self.readme_view.as_ref().map(|view| view.lines.as_slice()),
            body_area.width as usize,
        );

        self.modal_body_height = lines.len();
        self.modal_view_height = body_area.height;
        let max = lines.len().saturating_sub(body_area.height as usize);
        self.modal_scroll = self.modal_scroll.min(max);
        let ratio = if max == 0 {
            1.0
        } else {
            self.modal_scroll as f64 / max as f64
        };
        frame.render_widget(
            Paragraph::new(progress_line(ratio, chunks[1].width, palette)),
            chunks[1],
        );

        let scroll = self.modal_scroll.min(u16::MAX as usize) as u16;
        frame.render_widget(
            Paragraph::new(lines)
                .style(Style::default().fg(palette.text))
                .scroll((scroll, 0)),
            body_area,
        );

        let hint = if session.iframe_allowed() {
            "1/2 tabs · j/k scroll · ←/→ other project · o demo · g GitHub · Esc close"
        } else {
            "j/k scroll · ←/→ other project · o demo · g GitHub · Esc close"
        };
        frame.render_widget(
            Paragraph::new(hint)
                .alignment(Alignment::Center)
                .style(
                    Style::default()
                        .fg(palette.muted)
                        .add_modifier(Modifier::ITALIC),
                ),
            chunks[3],
        );
    }

    fn draw_contact(&self, frame: &mut Frame<'_>, area: Rect, palette: &Palette) {
        let popup = centered_rect(64, 60, area);
        frame.render_widget(Clear, popup);
        let block = Block::default()
            .title(Span::styled(
                " Get in touch ",
                Style::default()
                    .fg(palette.brand)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border_focused))
            .style(Style::default().bg(palette.surface));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let width = inner.width.saturating_sub(2) as usize;
        let mut lines = Vec::new();
        for field in [Field::Name, Field::Email, Field::Message] {
            let active = self.contact.active == field;
            let label_style = if active {
                Style::default()
                    .fg(palette.brand)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.muted)
            };
            lines.push(Line::from(Span::styled(field.title(), label_style)));
            let mut value = self.contact.value(field).to_string();
            if active {
                value.push('█');
            }
            let value_style = if active {
                Style::default().fg(palette.text).bg(palette.surface_focused)
            } else {
                Style::default().fg(palette.text)
            };
            lines.extend(wrap_with_prefixes(&value, width, "  ", "  ", value_style));
            lines.push(Line::default());
        }
        if let Some(status) = self.contact.status() {
            lines.push(Line::from(Span::styled(
                status.to_string(),
                Style::default().fg(palette.error),
            )));
        }
        lines.push(Line::from(Span::styled(
            "Tab next field · Enter send · Esc close",
            Style::default()
                .fg(palette.muted)
                .add_modifier(Modifier::ITALIC),
        )));
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn draw_resume(&self, frame: &mut Frame<'_>, area: Rect, palette: &Palette) {
        let Some(term) = self.resume.as_ref() else {
            return;
        };
        let popup = centered_rect(80, 80, area);
        frame.render_widget(Clear, popup);
        let block = Block::default()
            .title(Span::styled(
                " resume.sh ",
                Style::default()
                    .fg(palette.success)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.success))
            .style(Style::default().bg(palette.backdrop));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let width = inner.width as usize;
        let mut lines = Vec::new();
        for entry in term.scrollback() {
            let style = match entry.kind {
                EntryKind::Input => Style::default().fg(palette.success),
                EntryKind::Output => Style::default().fg(palette.text),
                EntryKind::Error => Style::default().fg(palette.error),
            };
            lines.extend(wrap_with_prefixes(&entry.text, width, "", "", style));
        }
        lines.push(Line::from(vec![
            Span::styled(resume::PROMPT, Style::default().fg(palette.success)),
            Span::styled(format!("{}█", term.input()), Style::default().fg(palette.text)),
        ]));
        let scroll = lines.len().saturating_sub(inner.height as usize);
        frame.render_widget(
            Paragraph::new(lines).scroll((scroll.min(u16::MAX as usize) as u16, 0)),
            inner,
        );
    }

    fn footer_text(&self) -> String {
        if self.resume.is_some() {
            return "Resume: type a command · ↑/↓ history · Esc close".to_string();
        }
        if self.contact_visible {
            return "Contact: Tab/Shift-Tab change field · Enter send · Esc close".to_string();
        }
        if self.modal.is_open() {
            return "Project: 1 details · 2 playground · o demo · g GitHub · Esc close"
                .to_string();
        }

        let mut parts: Vec<String> = Vec::new();
        match self.focus {
            Focus::Nav => parts.push("←/→ sections · Enter/Space go".to_string()),
            Focus::Projects => parts.push("j/k projects · Enter details".to_string()),
        }
        parts.push("Tab switch focus".to_string());
        parts.push("1-6 jump".to_string());
        parts.push("f contact".to_string());
        parts.push("r resume".to_string());
        parts.push("t theme".to_string());
        parts.push("q quit".to_string());
        parts.join(" · ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MockReadmeService, OfflineEmbedService};
    use crate::embed::EmbedPolicy;
    use crate::navigator::LinkOpener;
    use crate::scroll::Spring;
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

    fn model() -> (Model, Arc<RecordingOpener>) {
        let portfolio = Arc::new(Portfolio::builtin().unwrap());
        let opener = Arc::new(RecordingOpener::default());
        let modal = ModalController::new(
            portfolio.clone(),
            Arc::new(MockReadmeService::default()),
            Arc::new(OfflineEmbedService),
            EmbedPolicy::default(),
        );
        let mut model = Model::new(Options {
            portfolio,
            modal,
            navigator: Navigator::new(opener.clone(), Spring::default()),
            theme: ThemeMode::Dark,
            intro: false,
            tick_rate: Duration::from_millis(120),
            status_message: String::new(),
        });
        model.page_area = Some(Rect::new(0, 1, 100, 30));
        model.ensure_page(96, 30);
        (model, opener)
    }

    #[test]
    fn rect_contains_is_half_open() {
        let rect = Rect::new(2, 3, 4, 2);
        assert!(rect_contains(rect, 2, 3));
        assert!(rect_contains(rect, 5, 4));
        assert!(!rect_contains(rect, 6, 4));
        assert!(!rect_contains(rect, 2, 5));
    }

    #[test]
    fn progress_line_fills_proportionally() {
        let line = progress_line(0.5, 10, &Palette::DARK);
        assert_eq!(line.spans[0].content.as_ref(), "━━━━━");
        assert_eq!(line.spans[1].content.as_ref(), "─────");
        let full = progress_line(3.0, 4, &Palette::DARK);
        assert_eq!(full.spans[1].content.as_ref(), "");
    }

    #[test]
    fn nav_items_include_resolved_cv() {
        let portfolio = Portfolio::builtin().unwrap();
        let items = nav_items(&portfolio);
        assert_eq!(items[0].href, "#about");
        let cv = items.last().unwrap();
        assert_eq!(cv.label, "CV");
        assert_eq!(cv.href, "https://mara.example.dev/Mara_Lindqvist_CV.pdf");
    }

    #[test]
    fn cv_resolves_against_site_url_first() {
        let mut portfolio = Portfolio::builtin().unwrap();
        portfolio.meta.url = Some("https://cv.example.org/site/".into());
        portfolio.meta.pdf = Some("files/cv.pdf".into());
        let items = nav_items(&portfolio);
        assert_eq!(
            items.last().unwrap().href,
            "https://cv.example.org/site/files/cv.pdf"
        );

        portfolio.meta.url = None;
        portfolio.personal.contact.website = None;
        assert_eq!(nav_items(&portfolio).len(), NAV_SECTIONS.len());
    }

    #[test]
    fn resolve_link_keeps_absolute_urls() {
        assert_eq!(
            resolve_link(None, "https://x.dev/cv.pdf").as_deref(),
            Some("https://x.dev/cv.pdf")
        );
        assert_eq!(resolve_link(None, "/cv.pdf"), None);
    }

    #[test]
    fn space_on_section_starts_scroll() {
        let (mut model, opener) = model();
        model.nav_selected = 2;
        model.handle_key(KeyCode::Char(' ')).unwrap();
        assert!(model.navigator.scroll().is_animating());
        assert!(opener.opened.lock().unwrap().is_empty());
    }

    #[test]
    fn enter_on_external_item_opens_browser() {
        let (mut model, opener) = model();
        model.nav_selected = model.nav_items.len() - 1;
        model.handle_key(KeyCode::Enter).unwrap();
        assert!(!model.navigator.scroll().is_animating());
        assert_eq!(opener.opened.lock().unwrap().len(), 1);
    }

    #[test]
    fn project_modal_opens_and_closes() {
        let (mut model, _) = model();
        model.handle_key(KeyCode::Tab).unwrap();
        model.handle_key(KeyCode::Char('j')).unwrap();
        model.handle_key(KeyCode::Enter).unwrap();
        assert!(model.modal.is_open());
        assert_eq!(model.modal.session().unwrap().project_index(), 1);
        model.handle_key(KeyCode::Right).unwrap();
        assert_eq!(model.modal.session().unwrap().project_index(), 2);
        assert_eq!(model.handle_key(KeyCode::Esc).unwrap(), false);
        assert!(!model.modal.is_open());
    }

    #[test]
    fn backdrop_click_closes_modal() {
        let (mut model, _) = model();
        model.open_project(0).unwrap();
        model.modal_area = Some(Rect::new(10, 5, 40, 20));
        model.handle_click(20, 10).unwrap();
        assert!(model.modal.is_open());
        model.handle_click(1, 1).unwrap();
        assert!(!model.modal.is_open());
    }

    #[test]
    fn header_click_does_not_reach_cards_beneath() {
        let (mut model, _) = model();
        let area = model.page_area.unwrap();
        let first_card = model.page.as_ref().unwrap().page.project_rows[0];
        model.navigator.scroll_mut().jump_to(first_card as f64);
        model.handle_click(area.width - 2, area.y + 1).unwrap();
        assert!(!model.modal.is_open());

        let header = HEADER_HEIGHT as usize;
        model
            .navigator
            .scroll_mut()
            .jump_to((first_card - header) as f64);
        model
            .handle_click(area.width - 2, area.y + HEADER_HEIGHT)
            .unwrap();
        assert!(model.modal.is_open());
    }

    #[test]
    fn page_progress_tracks_offset() {
        let (mut model, _) = model();
        assert_eq!(model.page_progress(), 0.0);
        let max = model.page.as_ref().unwrap().page.layout.max_offset();
        assert!(max > 0);
        model.navigator.scroll_mut().jump_to(max as f64 / 2.0);
        assert!((model.page_progress() - 0.5).abs() < 0.01);
        model.navigator.scroll_mut().jump_to(max as f64);
        assert_eq!(model.page_progress(), 1.0);
    }

    #[test]
    fn playground_refused_for_plain_hosts() {
        let (mut model, _) = model();
        let index = model.portfolio.project_index("pgsnoop").unwrap();
        model.open_project(index).unwrap();
        model.handle_key(KeyCode::Char('2')).unwrap();
        assert_eq!(model.modal.phase(), Phase::Details);
        assert!(model.status_message.contains("can't be embedded"));
    }

    #[test]
    fn intro_swallows_first_key() {
        let (mut model, _) = model();
        model.intro = Some(Intro::new());
        assert_eq!(model.handle_key(KeyCode::Char('q')).unwrap(), false);
        assert!(model.advance_animations(Duration::from_millis(1)));
        assert!(model.intro.is_none());
    }

    #[test]
    fn contact_form_sends_mailto() {
        let (mut model, opener) = model();
        model.handle_key(KeyCode::Char('f')).unwrap();
        for ch in "Ada".chars() {
            model.handle_key(KeyCode::Char(ch)).unwrap();
        }
        model.handle_key(KeyCode::Enter).unwrap();
        for ch in "ada@example.org".chars() {
            model.handle_key(KeyCode::Char(ch)).unwrap();
        }
        model.handle_key(KeyCode::Enter).unwrap();
        for ch in "hello".chars() {
            model.handle_key(KeyCode::Char(ch)).unwrap();
        }
        model.handle_key(KeyCode::Enter).unwrap();
        assert!(!model.contact_visible);
        let opened = opener.opened.lock().unwrap();
        assert!(opened[0].starts_with("mailto:mara@example.dev?subject="));
    }
}
