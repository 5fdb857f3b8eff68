use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use textwrap::{wrap, Options as WrapOptions};

use crate::theme::Palette;

pub struct Rendered {
    pub text: Text<'static>,
    pub links: Vec<String>,
}

pub struct Renderer {
    palette: Palette,
}

impl Renderer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn render(&self, input: &str, width: u16) -> Rendered {
        let mut opts = Options::empty();
        opts.insert(Options::ENABLE_STRIKETHROUGH);
        opts.insert(Options::ENABLE_TABLES);
        opts.insert(Options::ENABLE_TASKLISTS);

        let parser = Parser::new_ext(input, opts);
        let mut writer = Writer::new(width.max(20) as usize);
        writer.run(parser);
        writer.finish(&self.palette)
    }
}

#[derive(Clone)]
enum Block {
    Paragraph(String),
    Heading { level: u8, text: String },
    Item { indent: usize, marker: String, text: String },
    Quote(String),
    Code(Vec<String>),
    TableRow { cells: Vec<String>, header: bool },
    Rule,
    Gap,
}

#[derive(Clone, Copy)]
struct ListState {
    ordered: bool,
    next: u64,
}

struct Writer {
    width: usize,
    blocks: Vec<Block>,
    buffer: String,
    lists: Vec<ListState>,
    item_marker: Option<(usize, String)>,
    quote_depth: usize,
    heading: Option<u8>,
    code: Option<Vec<String>>,
    table_cells: Option<Vec<String>>,
    table_header: bool,
    links: Vec<String>,
    pending_link: Option<String>,
}

impl Writer {
    fn new(width: usize) -> Self {
        Self {
            width,
            blocks: Vec::new(),
            buffer: String::new(),
            lists: Vec::new(),
            item_marker: None,
            quote_depth: 0,
            heading: None,
            code: None,
            table_cells: None,
            table_header: false,
            links: Vec::new(),
            pending_link: None,
        }
    }

    fn run<'a, I>(&mut self, events: I)
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            match event {
                Event::Start(tag) => self.start(tag),
                Event::End(tag) => self.end(tag),
                Event::Text(text) => self.text(text),
                Event::Code(code) => self.buffer.push_str(&format!("`{code}`")),
                Event::Html(_) | Event::InlineHtml(_) => {}
                Event::FootnoteReference(name) => self.buffer.push_str(&format!("[^{name}]")),
                Event::SoftBreak => self.buffer.push(' '),
                Event::HardBreak => self.buffer.push('\n'),
                Event::Rule => {
                    self.flush();
                    self.blocks.push(Block::Rule);
                }
                Event::TaskListMarker(done) => {
                    self.buffer.push_str(if done { "[x] " } else { "[ ] " });
                }
            }
        }
        self.flush();
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.flush(),
            Tag::Heading { level, .. } => {
                self.flush();
                self.heading = Some(heading_level(level));
            }
            Tag::BlockQuote => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                let mut lines = Vec::new();
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        lines.push(format!("── {lang} ──"));
                    }
                }
                self.code = Some(lines);
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(ListState {
                    ordered: start.is_some(),
                    next: start.unwrap_or(1),
                });
            }
            Tag::Item => {
                self.flush();
                let indent = self.lists.len().saturating_sub(1);
                if let Some(state) = self.lists.last_mut() {
                    let marker = if state.ordered {
                        let marker = format!("{}.", state.next);
                        state.next += 1;
                        marker
                    } else {
                        "•".to_string()
                    };
                    self.item_marker = Some((indent, marker));
                }
            }
            Tag::Link { dest_url, .. } => {
                self.pending_link = Some(dest_url.into_string());
            }
            Tag::Image { dest_url, .. } => {
                self.buffer.push_str("[image");
                self.pending_link = Some(dest_url.into_string());
            }
            Tag::Table(_) => self.flush(),
            Tag::TableHead => {
                self.table_header = true;
                self.table_cells = Some(Vec::new());
            }
            Tag::TableRow => self.table_cells = Some(Vec::new()),
            Tag::TableCell => self.buffer.clear(),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush();
                if self.item_marker.is_none() && self.lists.is_empty() {
                    self.blocks.push(Block::Gap);
                }
            }
            TagEnd::Heading(_) => {
                self.flush();
                self.heading = None;
                self.blocks.push(Block::Gap);
            }
            TagEnd::BlockQuote => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.blocks.push(Block::Gap);
            }
            TagEnd::CodeBlock => {
                if let Some(lines) = self.code.take() {
                    self.blocks.push(Block::Code(lines));
                    self.blocks.push(Block::Gap);
                }
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blocks.push(Block::Gap);
                }
            }
            TagEnd::Item => {
                self.flush();
                self.item_marker = None;
            }
            TagEnd::Link => self.close_link(""),
            TagEnd::Image => self.close_link("]"),
            TagEnd::TableCell => {
                let cell = self.buffer.trim().to_string();
                self.buffer.clear();
                if let Some(cells) = self.table_cells.as_mut() {
                    cells.push(cell);
                }
            }
            TagEnd::TableHead | TagEnd::TableRow => {
                if let Some(cells) = self.table_cells.take() {
                    self.blocks.push(Block::TableRow {
                        cells,
                        header: self.table_header,
                    });
                }
                self.table_header = false;
            }
            TagEnd::Table => self.blocks.push(Block::Gap),
            _ => {}
        }
    }

    fn close_link(&mut self, suffix: &str) {
        self.buffer.push_str(suffix);
        if let Some(url) = self.pending_link.take() {
            if url.starts_with('#') {
                return;
            }
            self.links.push(url);
            self.buffer.push_str(&format!("[{}]", self.links.len()));
        }
    }

    fn text(&mut self, text: CowStr<'_>) {
        match self.code.as_mut() {
            Some(lines) => lines.extend(text.lines().map(str::to_string)),
            None => self.buffer.push_str(&text),
        }
    }

    fn flush(&mut self) {
        if self.table_cells.is_some() {
            return;
        }
        let text = self.buffer.trim().to_string();
        self.buffer.clear();
        if text.is_empty() {
            return;
        }

        let block = if let Some(level) = self.heading {
            Block::Heading { level, text }
        } else if let Some((indent, marker)) = self.item_marker.as_mut() {
            // continuation paragraphs of one item are not re-marked
            let marker = std::mem::replace(marker, " ".repeat(marker.chars().count()));
            Block::Item {
                indent: *indent,
                marker,
                text,
            }
        } else if self.quote_depth > 0 {
            Block::Quote(text)
        } else {
            Block::Paragraph(text)
        };
        self.blocks.push(block);
    }

    fn finish(mut self, palette: &Palette) -> Rendered {
        while matches!(self.blocks.last(), Some(Block::Gap)) {
            self.blocks.pop();
        }

        let width = self.width;
        let body = Style::default().fg(palette.text);
        let mut lines: Vec<Line<'static>> = Vec::new();
        for block in self.blocks {
            match block {
                Block::Paragraph(text) => lines.extend(wrap_lines(&text, width, "", "", body)),
                Block::Heading { level, text } => {
                    let style = heading_style(level, palette);
                    let prefix = if level <= 2 { "" } else { "▍ " };
                    lines.extend(wrap_lines(&text, width, prefix, prefix, style));
                    if level == 1 {
                        lines.push(Line::from(Span::styled(
                            "═".repeat(text.chars().count().min(width)),
                            Style::default().fg(palette.brand),
                        )));
                    }
                }
                Block::Item {
                    indent,
                    marker,
                    text,
                } => {
                    let lead = format!("{}{} ", "  ".repeat(indent), marker);
                    let rest = " ".repeat(lead.chars().count());
                    let mut wrapped = wrap_lines(&text, width, &lead, &rest, body);
                    if let Some(first) = wrapped.first_mut() {
                        let content: String =
                            first.spans.iter().map(|span| span.content.as_ref()).collect();
                        if let Some(item) = content.strip_prefix(lead.as_str()) {
                            *first = Line::from(vec![
                                Span::styled(lead.clone(), Style::default().fg(palette.brand)),
                                Span::styled(item.to_string(), body),
                            ]);
                        }
                    }
                    lines.extend(wrapped);
                }
                Block::Quote(text) => {
                    let style = Style::default().fg(palette.success);
                    lines.extend(wrap_lines(&text, width, "│ ", "│ ", style));
                }
                Block::Code(code) => {
                    let style = Style::default().fg(palette.muted).bg(palette.surface_focused);
                    for line in code {
                        lines.push(Line::from(Span::styled(format!("  {line}"), style)));
                    }
                }
                Block::TableRow { cells, header } => {
                    let style = if header {
                        body.add_modifier(Modifier::BOLD)
                    } else {
                        body
                    };
                    lines.push(Line::from(Span::styled(cells.join(" │ "), style)));
                }
                Block::Rule => lines.push(Line::from(Span::styled(
                    "─".repeat(width),
                    Style::default().fg(palette.border),
                ))),
                Block::Gap => lines.push(Line::default()),
            }
        }

        if !self.links.is_empty() {
            lines.push(Line::default());
            for (index, url) in self.links.iter().enumerate() {
                lines.push(Line::from(vec![
                    Span::styled(format!("[{}] ", index + 1), Style::default().fg(palette.muted)),
                    Span::styled(url.clone(), Style::default().fg(palette.brand)),
                ]));
            }
        }

        Rendered {
            text: Text::from(lines),
            links: self.links,
        }
    }
}

fn wrap_lines(text: &str, width: usize, first: &str, rest: &str, style: Style) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (index, paragraph) in text.split('\n').enumerate() {
        let lead = if index == 0 { first } else { rest };
        let options = WrapOptions::new(width)
            .initial_indent(lead)
            .subsequent_indent(rest);
        for piece in wrap(paragraph, &options) {
            lines.push(Line::from(Span::styled(piece.into_owned(), style)));
        }
    }
    lines
}

fn heading_style(level: u8, palette: &Palette) -> Style {
    match level {
        1 => Style::default()
            .fg(palette.brand)
            .add_modifier(Modifier::BOLD),
        2 => Style::default()
            .fg(palette.brand)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        _ => Style::default().fg(palette.text).add_modifier(Modifier::BOLD),
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn render(input: &str, width: u16) -> Rendered {
        Renderer::new(Palette::DARK).render(input, width)
    }

    #[test]
    fn headings_and_paragraphs() {
        let out = render("# Widget\n\nA small widget.", 40);
        let lines = plain(&out.text);
        assert_eq!(lines[0], "Widget");
        assert_eq!(lines[1], "══════");
        assert!(lines.contains(&"A small widget.".to_string()));
    }

    #[test]
    fn paragraphs_wrap_to_width() {
        let out = render("one two three four five six seven eight nine ten", 20);
        let lines = plain(&out.text);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|line| line.chars().count() <= 20));
    }

    #[test]
    fn lists_get_markers() {
        let out = render("- alpha\n- beta\n\n1. first\n2. second", 40);
        let lines = plain(&out.text);
        assert!(lines.contains(&"• alpha".to_string()));
        assert!(lines.contains(&"• beta".to_string()));
        assert!(lines.contains(&"1. first".to_string()));
        assert!(lines.contains(&"2. second".to_string()));
    }

    #[test]
    fn links_become_numbered_references() {
        let out = render("See [docs](https://docs.rs) and [top](#top).", 60);
        assert_eq!(out.links, vec!["https://docs.rs".to_string()]);
        let lines = plain(&out.text);
        assert_eq!(lines[0], "See docs[1] and top.");
        assert_eq!(lines.last().unwrap(), "[1] https://docs.rs");
    }

    #[test]
    fn code_blocks_keep_lines() {
        let out = render("```rust\nfn main() {}\nlet x = 1;\n```", 40);
        let lines = plain(&out.text);
        assert_eq!(lines[0], "  ── rust ──");
        assert_eq!(lines[1], "  fn main() {}");
        assert_eq!(lines[2], "  let x = 1;");
    }

    #[test]
    fn tables_render_row_by_row() {
        let out = render("| a | b |\n|---|---|\n| 1 | 2 |", 40);
        let lines = plain(&out.text);
        assert_eq!(lines[0], "a │ b");
        assert_eq!(lines[1], "1 │ 2");
    }

    #[test]
    fn html_is_dropped() {
        let out = render("<p align=\"center\"><img src=\"x.png\"></p>\n\nText", 40);
        assert_eq!(plain(&out.text), vec!["Text".to_string()]);
    }
}
