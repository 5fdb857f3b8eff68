use std::sync::Arc;

use crate::portfolio::Portfolio;

pub const PROMPT: &str = "guest@folio:~$ ";

const WELCOME: &str = "Type `help` to see available commands.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Whoami,
    About,
    Experience,
    Projects,
    Skills,
    Education,
    Contact,
    Clear,
    Exit,
}

impl Command {
    pub const ALL: [Command; 10] = [
        Command::Help,
        Command::Whoami,
        Command::About,
        Command::Experience,
        Command::Projects,
        Command::Skills,
        Command::Education,
        Command::Contact,
        Command::Clear,
        Command::Exit,
    ];

    pub fn parse(input: &str) -> Option<Self> {
        let name = input.split_whitespace().next()?.to_ascii_lowercase();
        Command::ALL
            .into_iter()
            .find(|command| command.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Whoami => "whoami",
            Command::About => "about",
            Command::Experience => "experience",
            Command::Projects => "projects",
            Command::Skills => "skills",
            Command::Education => "education",
            Command::Contact => "contact",
            Command::Clear => "clear",
            Command::Exit => "exit",
        }
    }

    fn summary(self) -> &'static str {
        match self {
            Command::Help => "list commands",
            Command::Whoami => "name and title",
            Command::About => "short bio and highlights",
            Command::Experience => "work history",
            Command::Projects => "selected projects",
            Command::Skills => "skills by group",
            Command::Education => "degrees and schools",
            Command::Contact => "how to reach me",
            Command::Clear => "clear the screen",
            Command::Exit => "close the terminal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Input,
    Output,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub kind: EntryKind,
    pub text: String,
}

impl Entry {
    fn new<S: Into<String>>(kind: EntryKind, text: S) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Exit,
}

pub struct Terminal {
    portfolio: Arc<Portfolio>,
    input: String,
    history: Vec<String>,
    history_cursor: Option<usize>,
    scrollback: Vec<Entry>,
}

impl Terminal {
    pub fn new(portfolio: Arc<Portfolio>) -> Self {
        Self {
            portfolio,
            input: String::new(),
            history: Vec::new(),
            history_cursor: None,
            scrollback: vec![Entry::new(EntryKind::Output, WELCOME)],
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn scrollback(&self) -> &[Entry] {
        &self.scrollback
    }

    pub fn insert_char(&mut self, ch: char) {
        self.input.push(ch);
        self.history_cursor = None;
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn history_previous(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let index = match self.history_cursor {
            Some(index) => index.saturating_sub(1),
            None => self.history.len() - 1,
        };
        self.history_cursor = Some(index);
        self.input = self.history[index].clone();
    }

    pub fn history_next(&mut self) {
        let Some(index) = self.history_cursor else {
            return;
        };
        if index + 1 < self.history.len() {
            self.history_cursor = Some(index + 1);
            self.input = self.history[index + 1].clone();
        } else {
            self.history_cursor = None;
            self.input.clear();
        }
    }

    pub fn submit(&mut self) -> Outcome {
        let line = std::mem::take(&mut self.input);
        self.history_cursor = None;
        let trimmed = line.trim();
        self.scrollback
            .push(Entry::new(EntryKind::Input, format!("{PROMPT}{trimmed}")));
        if trimmed.is_empty() {
            return Outcome::Continue;
        }
        if self.history.last().map(String::as_str) != Some(trimmed) {
            self.history.push(trimmed.to_string());
        }

        let Some(command) = Command::parse(trimmed) else {
            let name = trimmed.split_whitespace().next().unwrap_or(trimmed);
            self.scrollback.push(Entry::new(
                EntryKind::Error,
                format!("command not found: {name} (try `help`)"),
            ));
            return Outcome::Continue;
        };

        match command {
            Command::Clear => {
                self.scrollback.clear();
                Outcome::Continue
            }
            Command::Exit => Outcome::Exit,
            other => {
                let output = run(other, &self.portfolio);
                self.scrollback
                    .extend(output.into_iter().map(|line| Entry::new(EntryKind::Output, line)));
                Outcome::Continue
            }
        }
    }
}

pub fn run(command: Command, portfolio: &Portfolio) -> Vec<String> {
    match command {
        Command::Help => Command::ALL
            .iter()
            .map(|command| format!("  {:<11} {}", command.name(), command.summary()))
            .collect(),
        Command::Whoami => whoami(portfolio),
        Command::About => about(portfolio),
        Command::Experience => experience(portfolio),
        Command::Projects => projects(portfolio),
        Command::Skills => skills(portfolio),
        Command::Education => education(portfolio),
        Command::Contact => contact(portfolio),
        Command::Clear | Command::Exit => Vec::new(),
    }
}

pub fn full_text(portfolio: &Portfolio) -> String {
    let sections = [
        ("", whoami(portfolio)),
        ("ABOUT", about(portfolio)),
        ("EXPERIENCE", experience(portfolio)),
        ("PROJECTS", projects(portfolio)),
        ("SKILLS", skills(portfolio)),
        ("EDUCATION", education(portfolio)),
        ("CONTACT", contact(portfolio)),
    ];
    let mut out = String::new();
    for (title, lines) in sections {
        if lines.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        if !title.is_empty() {
            out.push_str(title);
            out.push('\n');
        }
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

fn whoami(portfolio: &Portfolio) -> Vec<String> {
    let personal = &portfolio.personal;
    let mut lines = vec![personal.name.clone()];
    if !personal.title.trim().is_empty() {
        lines.push(personal.title.clone());
    }
    lines.extend(personal.contact.location.clone());
    lines
}

fn about(portfolio: &Portfolio) -> Vec<String> {
    let mut lines: Vec<String> = portfolio
        .personal
        .summary
        .as_deref()
        .or(portfolio.personal.hero_summary())
        .map(|summary| vec![summary.trim().to_string()])
        .unwrap_or_default();
    lines.extend(portfolio.highlights.iter().map(|item| format!("  * {item}")));
    lines
}

fn experience(portfolio: &Portfolio) -> Vec<String> {
    let mut lines = Vec::new();
    for job in &portfolio.experience {
        let when = job
            .date
            .as_ref()
            .map(|date| format!(" ({})", date.display()))
            .unwrap_or_default();
        lines.push(format!("{} @ {}{when}", job.title, job.company));
        lines.extend(job.bullets.iter().map(|bullet| format!("  - {bullet}")));
    }
    lines
}

fn projects(portfolio: &Portfolio) -> Vec<String> {
    let mut lines = Vec::new();
    for project in &portfolio.projects {
        lines.push(format!("{}: {}", project.title, project.description.trim()));
        if !project.tags.is_empty() {
            lines.push(format!("  [{}]", project.tags.join(", ")));
        }
        if let Some(href) = project.href.as_deref() {
            lines.push(format!("  {href}"));
        }
    }
    lines
}

fn skills(portfolio: &Portfolio) -> Vec<String> {
    portfolio
        .skills
        .iter()
        .filter(|group| !group.skills.is_empty())
        .map(|group| {
            let names: Vec<&str> = group.skills.iter().map(|skill| skill.name.as_str()).collect();
            format!("{}: {}", group.title, names.join(", "))
        })
        .collect()
}

fn education(portfolio: &Portfolio) -> Vec<String> {
    portfolio
        .education
        .iter()
        .map(|entry| {
            let when = entry
                .date
                .as_ref()
                .map(|date| format!(" ({})", date.display()))
                .unwrap_or_default();
            format!("{}, {}{when}", entry.degree, entry.school)
        })
        .collect()
}

fn contact(portfolio: &Portfolio) -> Vec<String> {
    let contact = &portfolio.personal.contact;
    let mut lines = Vec::new();
    if let Some(email) = contact.email.as_deref() {
        lines.push(format!("email: {email}"));
    }
    if let Some(website) = contact.website.as_deref() {
        lines.push(format!("web: {website}"));
    }
    for social in &contact.socials {
        lines.push(format!("{}: {}", social.label.to_lowercase(), social.url));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminal() -> Terminal {
        Terminal::new(Arc::new(Portfolio::builtin().unwrap()))
    }

    fn type_line(term: &mut Terminal, line: &str) -> Outcome {
        for ch in line.chars() {
            term.insert_char(ch);
        }
        term.submit()
    }

    #[test]
    fn commands_parse_case_insensitively() {
        assert_eq!(Command::parse("  WhoAmI "), Some(Command::Whoami));
        assert_eq!(Command::parse("projects --all"), Some(Command::Projects));
        assert_eq!(Command::parse("sudo"), None);
        assert_eq!(Command::parse("   "), None);
    }

    #[test]
    fn whoami_prints_name() {
        let mut term = terminal();
        assert_eq!(type_line(&mut term, "whoami"), Outcome::Continue);
        let last = &term.scrollback()[2];
        assert_eq!(last.kind, EntryKind::Output);
        assert_eq!(last.text, "Mara Lindqvist");
    }

    #[test]
    fn unknown_command_reports_error() {
        let mut term = terminal();
        type_line(&mut term, "rm -rf /");
        let last = term.scrollback().last().unwrap();
        assert_eq!(last.kind, EntryKind::Error);
        assert!(last.text.contains("command not found: rm"));
    }

    #[test]
    fn clear_and_exit() {
        let mut term = terminal();
        type_line(&mut term, "help");
        type_line(&mut term, "clear");
        assert!(term.scrollback().is_empty());
        assert_eq!(type_line(&mut term, "exit"), Outcome::Exit);
    }

    #[test]
    fn history_walks_back_and_forward() {
        let mut term = terminal();
        type_line(&mut term, "about");
        type_line(&mut term, "skills");
        type_line(&mut term, "skills");
        term.history_previous();
        assert_eq!(term.input(), "skills");
        term.history_previous();
        assert_eq!(term.input(), "about");
        term.history_previous();
        assert_eq!(term.input(), "about");
        term.history_next();
        assert_eq!(term.input(), "skills");
        term.history_next();
        assert_eq!(term.input(), "");
    }

    #[test]
    fn full_text_covers_sections() {
        let portfolio = Portfolio::builtin().unwrap();
        let text = full_text(&portfolio);
        assert!(text.starts_with("Mara Lindqvist\n"));
        for title in ["ABOUT", "EXPERIENCE", "PROJECTS", "SKILLS", "EDUCATION", "CONTACT"] {
            assert!(text.contains(&format!("\n{title}\n")), "missing {title}");
        }
    }
}
