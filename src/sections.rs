use chrono::Datelike;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use textwrap::{wrap, Options as WrapOptions};
use unicode_width::UnicodeWidthStr;

use crate::avatar;
use crate::icons;
use crate::navigator::PageLayout;
use crate::portfolio::{Portfolio, Project, Skill};
use crate::theme::{tag_color, Palette};

pub const NAV_SECTIONS: [(&str, &str); 6] = [
    ("about", "About"),
    ("experience", "Experience"),
    ("projects", "Projects"),
    ("skills", "Skills"),
    ("organization", "Organization"),
    ("contact", "Contact"),
];

const INDENT: &str = "  ";
const BAR_CELLS: usize = 10;
const MIN_WIDTH: usize = 24;

pub struct Page {
    pub lines: Vec<Line<'static>>,
    pub layout: PageLayout,
    pub project_rows: Vec<usize>,
    projects_end: usize,
}

impl Page {
    pub fn height(&self) -> usize {
        self.lines.len()
    }

    pub fn project_at(&self, row: usize) -> Option<usize> {
        let index = self.project_rows.iter().rposition(|start| *start <= row)?;
        let end = self
            .project_rows
            .get(index + 1)
            .copied()
            .unwrap_or(self.projects_end);
        (row < end).then_some(index)
    }
}

struct PageWriter<'a> {
    palette: &'a Palette,
    width: usize,
    top: usize,
    lines: Vec<Line<'static>>,
    layout: PageLayout,
}

impl<'a> PageWriter<'a> {
    fn new(palette: &'a Palette, width: u16, top: usize) -> Self {
        Self {
            palette,
            width: (width as usize).max(MIN_WIDTH),
            top,
            lines: vec![Line::default(); top],
            layout: PageLayout::default(),
        }
    }

    fn row(&self) -> usize {
        self.lines.len()
    }

    fn push(&mut self, line: Line<'static>) {
        self.lines.push(line);
    }

    fn blank(&mut self) {
        self.lines.push(Line::default());
    }

    fn section(&mut self, id: &str, title: &str) {
        if self.row() > self.top {
            self.blank();
        }
        self.layout.insert_anchor(id, self.row());
        let style = Style::default()
            .fg(self.palette.brand)
            .add_modifier(Modifier::BOLD);
        self.push(Line::from(Span::styled(title.to_uppercase(), style)));
        self.push(Line::from(Span::styled(
            "─".repeat(UnicodeWidthStr::width(title).max(4)),
            Style::default().fg(self.palette.border),
        )));
    }

    fn wrapped(&mut self, text: &str, first: &str, rest: &str, style: Style) {
        let options = WrapOptions::new(self.width)
            .break_words(false)
            .initial_indent(first)
            .subsequent_indent(rest);
        for piece in wrap(text.trim(), options) {
            self.lines.push(Line::from(Span::styled(piece.into_owned(), style)));
        }
    }

    fn text(&self) -> Style {
        Style::default().fg(self.palette.text)
    }

    fn muted(&self) -> Style {
        Style::default().fg(self.palette.muted)
    }

    fn chips(&mut self, prefix: &str, tags: &[String]) {
        if tags.is_empty() {
            return;
        }
        let mut spans = vec![Span::raw(prefix.to_string())];
        for tag in tags {
            spans.push(Span::styled(
                format!("[{tag}]"),
                Style::default().fg(tag_color(tag)),
            ));
            spans.push(Span::raw(" "));
        }
        spans.pop();
        self.push(Line::from(spans));
    }

    fn finish(mut self) -> (Vec<Line<'static>>, PageLayout) {
        let height = self.lines.len();
        self.layout.set_max_offset(height.saturating_sub(1));
        (self.lines, self.layout)
    }
}

/// Renders every section of the portfolio below `top` blank rows, which a
/// fixed header covers. `selected` marks the focused project card.
pub fn render_page(
    portfolio: &Portfolio,
    palette: &Palette,
    width: u16,
    top: usize,
    selected: Option<usize>,
) -> Page {
    let mut out = PageWriter::new(palette, width, top);
    about(&mut out, portfolio);
    experience(&mut out, portfolio);
    let project_rows = projects(&mut out, portfolio, selected);
    let projects_end = out.row();
    skills(&mut out, portfolio);
    soft_skills(&mut out, portfolio);
    organizations(&mut out, portfolio);
    education(&mut out, portfolio);
    contact(&mut out, portfolio);
    footer(&mut out, portfolio);
    let (lines, layout) = out.finish();
    Page {
        lines,
        layout,
        project_rows,
        projects_end,
    }
}

fn about(out: &mut PageWriter<'_>, portfolio: &Portfolio) {
    let personal = &portfolio.personal;
    out.section("about", "About");

    out.push(Line::from(Span::styled(
        personal.name.clone(),
        Style::default()
            .fg(out.palette.text)
            .add_modifier(Modifier::BOLD),
    )));
    if !personal.title.trim().is_empty() {
        out.push(Line::from(Span::styled(
            personal.title.clone(),
            Style::default().fg(out.palette.brand),
        )));
    }
    if let Some(headline) = personal.headline.as_deref() {
        out.push(Line::from(Span::styled(headline.to_string(), out.muted())));
    }

    let avatars = avatar::normalize(personal.avatar.as_ref());
    for (index, item) in avatars.iter().enumerate() {
        out.push(Line::from(vec![
            Span::styled("◉ ", Style::default().fg(out.palette.brand)),
            Span::styled(item.display_label(index), out.text()),
            Span::styled(format!("  {}", item.url), out.muted()),
        ]));
    }

    if let Some(summary) = personal.hero_summary() {
        out.blank();
        let style = out.text();
        out.wrapped(summary, "", "", style);
    }

    if !portfolio.highlights.is_empty() {
        out.blank();
        let style = out.text();
        for highlight in &portfolio.highlights {
            out.wrapped(highlight, "✦ ", INDENT, style);
        }
    }

    let extras = &portfolio.extras;
    if !extras.languages.is_empty() {
        let languages: Vec<String> = extras
            .languages
            .iter()
            .map(|language| format!("{} ({})", language.name, language.level))
            .collect();
        out.blank();
        let style = out.muted();
        out.wrapped(&languages.join(" · "), "Languages: ", INDENT, style);
    }
    if !extras.interests.is_empty() {
        let style = out.muted();
        out.wrapped(&extras.interests.join(" · "), "Interests: ", INDENT, style);
    }

    out.blank();
    let cta = Style::default()
        .fg(out.palette.brand)
        .add_modifier(Modifier::BOLD);
    out.push(Line::from(vec![
        Span::styled("→ See my work", cta),
        Span::styled(" #projects", out.muted()),
        Span::raw("   "),
        Span::styled("→ Get in touch", cta),
        Span::styled(" #contact", out.muted()),
    ]));
}

fn experience(out: &mut PageWriter<'_>, portfolio: &Portfolio) {
    if portfolio.experience.is_empty() {
        return;
    }
    out.section("experience", "Experience");
    for (index, job) in portfolio.experience.iter().enumerate() {
        if index > 0 {
            out.blank();
        }
        out.push(Line::from(vec![
            Span::styled("● ", Style::default().fg(out.palette.brand)),
            Span::styled(
                job.title.clone(),
                Style::default()
                    .fg(out.palette.text)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" · {}", job.company), out.text()),
        ]));

        let when = job.date.as_ref().map(|date| date.display());
        let meta: Vec<String> = when.into_iter().chain(job.location.clone()).collect();
        if !meta.is_empty() {
            out.push(Line::from(Span::styled(
                format!("{INDENT}{}", meta.join(" · ")),
                out.muted(),
            )));
        }
        if let Some(summary) = job.summary.as_deref() {
            let style = out.text();
            out.wrapped(summary, INDENT, INDENT, style);
        }
        let style = out.text();
        for bullet in &job.bullets {
            out.wrapped(bullet, "  – ", "    ", style);
        }
        out.chips(INDENT, &job.tech);
    }
}

fn projects(out: &mut PageWriter<'_>, portfolio: &Portfolio, selected: Option<usize>) -> Vec<usize> {
    let mut rows = Vec::with_capacity(portfolio.projects.len());
    if portfolio.projects.is_empty() {
        return rows;
    }
    out.section("projects", "Projects");
    for (index, project) in portfolio.projects.iter().enumerate() {
        if index > 0 {
            out.blank();
        }
        rows.push(out.row());
        project_card(out, project, selected == Some(index));
    }
    rows
}

fn project_card(out: &mut PageWriter<'_>, project: &Project, selected: bool) {
    let (marker, title_style) = if selected {
        (
            Span::styled("▶ ", Style::default().fg(out.palette.brand)),
            Style::default()
                .fg(out.palette.text)
                .bg(out.palette.selected)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (
            Span::raw(INDENT),
            Style::default()
                .fg(out.palette.text)
                .add_modifier(Modifier::BOLD),
        )
    };
    let mut title = vec![marker, Span::styled(project.title.clone(), title_style)];
    if let Some(date) = project.date.as_ref() {
        title.push(Span::styled(format!("  {}", date.display()), out.muted()));
    }
    out.push(Line::from(title));

    let style = out.text();
    out.wrapped(&project.description, INDENT, INDENT, style);
    out.chips(INDENT, &project.tags);

    if !project.links.is_empty() || project.href.is_some() {
        let mut spans = vec![Span::raw(INDENT)];
        if project.href.is_some() {
            spans.push(Span::styled("Live demo", Style::default().fg(out.palette.brand)));
            spans.push(Span::raw("  "));
        }
        for link in &project.links {
            spans.push(Span::styled(
                format!("{}{}", icons::prefix(link.icon.as_deref()), link.label),
                Style::default().fg(out.palette.brand),
            ));
            spans.push(Span::raw("  "));
        }
        spans.pop();
        out.push(Line::from(spans));
    }
}

fn skill_bar(level: u8) -> String {
    let level = level.min(100) as usize;
    let filled = (level * BAR_CELLS + 50) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_CELLS - filled))
}

fn skill_line(out: &PageWriter<'_>, skill: &Skill, name_width: usize) -> Line<'static> {
    let name = format!("{}{}", icons::prefix(skill.icon.as_deref()), skill.name);
    let pad = name_width.saturating_sub(UnicodeWidthStr::width(name.as_str()));
    let mut spans = vec![
        Span::raw(INDENT),
        Span::styled(name, out.text()),
        Span::raw(" ".repeat(pad + 1)),
        Span::styled(skill_bar(skill.level), Style::default().fg(out.palette.brand)),
        Span::styled(format!(" {:>3}%", skill.level.min(100)), out.muted()),
    ];
    let mut notes = Vec::new();
    if let Some(years) = skill.years {
        notes.push(format!("{years}y"));
    }
    if let Some(note) = skill.note.as_deref() {
        notes.push(note.to_string());
    }
    if !notes.is_empty() {
        spans.push(Span::styled(format!("  {}", notes.join(" · ")), out.muted()));
    }
    Line::from(spans)
}

fn skills(out: &mut PageWriter<'_>, portfolio: &Portfolio) {
    if portfolio.skills.is_empty() {
        return;
    }
    out.section("skills", "Skills");
    let name_width = portfolio
        .skills
        .iter()
        .flat_map(|group| group.skills.iter())
        .map(|skill| {
            UnicodeWidthStr::width(icons::prefix(skill.icon.as_deref()).as_str())
                + UnicodeWidthStr::width(skill.name.as_str())
        })
        .max()
        .unwrap_or(0);
    for (index, group) in portfolio.skills.iter().enumerate() {
        if index > 0 {
            out.blank();
        }
        out.push(Line::from(Span::styled(
            group.title.clone(),
            Style::default()
                .fg(out.palette.text)
                .add_modifier(Modifier::BOLD),
        )));
        for skill in &group.skills {
            let line = skill_line(out, skill, name_width);
            out.push(line);
        }
    }
}

fn soft_skills(out: &mut PageWriter<'_>, portfolio: &Portfolio) {
    let soft = &portfolio.extras.soft_skills;
    if soft.is_empty() {
        return;
    }
    out.section("soft-skills", "Soft skills");
    for skill in soft {
        let mut spans = Vec::new();
        if let Some(icon) = skill.icon.as_deref().filter(|icon| !icon.trim().is_empty()) {
            spans.push(Span::raw(format!("{icon} ")));
        }
        spans.push(Span::styled(
            skill.name.clone(),
            Style::default()
                .fg(out.palette.text)
                .add_modifier(Modifier::BOLD),
        ));
        out.push(Line::from(spans));
        let style = out.muted();
        out.wrapped(&skill.description, INDENT, INDENT, style);
    }
}

fn organizations(out: &mut PageWriter<'_>, portfolio: &Portfolio) {
    let organizations = &portfolio.extras.organizations;
    if organizations.is_empty() {
        return;
    }
    out.section("organization", "Organization");
    for (index, org) in organizations.iter().enumerate() {
        if index > 0 {
            out.blank();
        }
        out.push(Line::from(vec![
            Span::styled(
                org.name.clone(),
                Style::default()
                    .fg(out.palette.text)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" · {}", org.role), out.text()),
        ]));
        if let Some(date) = org.date.as_deref() {
            out.push(Line::from(Span::styled(format!("{INDENT}{date}"), out.muted())));
        }
        if let Some(description) = org.description.as_deref() {
            let style = out.text();
            out.wrapped(description, INDENT, INDENT, style);
        }
    }
}

fn education(out: &mut PageWriter<'_>, portfolio: &Portfolio) {
    if portfolio.education.is_empty() {
        return;
    }
    out.section("education", "Education");
    for entry in &portfolio.education {
        out.push(Line::from(Span::styled(
            entry.degree.clone(),
            Style::default()
                .fg(out.palette.text)
                .add_modifier(Modifier::BOLD),
        )));
        let mut meta = vec![entry.school.clone()];
        meta.extend(entry.location.clone());
        meta.extend(entry.date.as_ref().map(|date| date.display()));
        meta.extend(entry.gpa.as_ref().map(|gpa| format!("GPA {gpa}")));
        out.push(Line::from(Span::styled(
            format!("{INDENT}{}", meta.join(" · ")),
            out.muted(),
        )));
    }
}

fn contact(out: &mut PageWriter<'_>, portfolio: &Portfolio) {
    let contact = &portfolio.personal.contact;
    out.section("contact", "Contact");
    let rows = [
        (Some("FaEnvelope"), "Email", contact.email.as_deref()),
        (None, "Phone", contact.phone.as_deref()),
        (None, "Location", contact.location.as_deref()),
        (Some("FaLink"), "Website", contact.website.as_deref()),
    ];
    for (icon, label, value) in rows {
        let Some(value) = value else { continue };
        out.push(Line::from(vec![
            Span::styled(
                format!("{}{label}: ", icons::prefix(icon)),
                out.muted(),
            ),
            Span::styled(value.to_string(), out.text()),
        ]));
    }
    for social in &contact.socials {
        out.push(Line::from(vec![
            Span::styled(
                format!("{}{}: ", icons::prefix(social.icon.as_deref()), social.label),
                out.muted(),
            ),
            Span::styled(social.url.clone(), Style::default().fg(out.palette.brand)),
        ]));
    }
    out.blank();
    out.push(Line::from(Span::styled(
        "Press f to send a message, r for the terminal resume.",
        Style::default()
            .fg(out.palette.muted)
            .add_modifier(Modifier::ITALIC),
    )));
}

fn footer(out: &mut PageWriter<'_>, portfolio: &Portfolio) {
    out.blank();
    let year = chrono::Local::now().year();
    out.push(Line::from(Span::styled(
        format!("© {year} {}", portfolio.personal.name),
        out.muted(),
    )));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn minimal() -> Portfolio {
        Portfolio::parse(
            "personal:\n  name: Solo Dev\nprojects:\n  - id: one\n    title: One\n    description: first\n  - id: two\n    title: Two\n    description: second\n",
        )
        .unwrap()
    }

    #[test]
    fn anchors_follow_page_order() {
        let portfolio = Portfolio::builtin().unwrap();
        let page = render_page(&portfolio, &Palette::DARK, 80, 0, None);
        let tops: Vec<usize> = NAV_SECTIONS
            .iter()
            .map(|(id, _)| page.layout.anchor_top(id).unwrap())
            .collect();
        assert_eq!(tops[0], 0);
        assert!(tops.windows(2).all(|pair| pair[0] < pair[1]), "{tops:?}");
        assert_eq!(page.layout.max_offset(), page.height() - 1);
    }

    #[test]
    fn absent_sections_have_no_anchor() {
        let page = render_page(&minimal(), &Palette::DARK, 80, 0, None);
        assert!(page.layout.anchor_top("experience").is_none());
        assert!(page.layout.anchor_top("skills").is_none());
        assert!(page.layout.anchor_top("organization").is_none());
        assert!(page.layout.anchor_top("projects").is_some());
        assert!(page.layout.anchor_top("contact").is_some());
    }

    #[test]
    fn missing_avatar_shows_placeholder() {
        let page = render_page(&minimal(), &Palette::DARK, 80, 0, None);
        let text = plain(&page.lines);
        assert!(text
            .iter()
            .any(|line| line.contains("Profile") && line.contains(avatar::PLACEHOLDER_URL)));
    }

    #[test]
    fn selected_project_is_marked() {
        let page = render_page(&minimal(), &Palette::DARK, 80, 0, Some(1));
        let text = plain(&page.lines);
        assert_eq!(page.project_rows.len(), 2);
        assert_eq!(text[page.project_rows[0]], "  One");
        assert_eq!(text[page.project_rows[1]], "▶ Two");
    }

    #[test]
    fn project_rows_map_back_to_cards() {
        let page = render_page(&minimal(), &Palette::DARK, 80, 0, None);
        let first = page.project_rows[0];
        let second = page.project_rows[1];
        assert_eq!(page.project_at(first), Some(0));
        assert_eq!(page.project_at(first + 1), Some(0));
        assert_eq!(page.project_at(second), Some(1));
        assert_eq!(page.project_at(0), None);
    }

    #[test]
    fn header_padding_shifts_anchors() {
        let portfolio = minimal();
        let flush = render_page(&portfolio, &Palette::DARK, 80, 0, None);
        let padded = render_page(&portfolio, &Palette::DARK, 80, 3, None);
        assert_eq!(padded.layout.anchor_top("about"), Some(3));
        assert_eq!(
            padded.layout.anchor_top("contact").unwrap(),
            flush.layout.anchor_top("contact").unwrap() + 3
        );
        assert_eq!(padded.height(), flush.height() + 3);
    }

    #[test]
    fn skill_bars_scale_with_level() {
        assert_eq!(skill_bar(0), "░".repeat(10));
        assert_eq!(skill_bar(80), format!("{}{}", "█".repeat(8), "░".repeat(2)));
        assert_eq!(skill_bar(250), "█".repeat(10));
    }

    #[test]
    fn narrow_widths_still_wrap() {
        let portfolio = Portfolio::builtin().unwrap();
        let page = render_page(&portfolio, &Palette::DARK, 10, 0, None);
        assert!(page.height() > 0);
    }
}
