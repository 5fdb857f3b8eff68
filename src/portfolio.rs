use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::avatar::AvatarSource;

const BUILTIN_DATA: &str = include_str!("../data/portfolio.yaml");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Portfolio {
    #[serde(default)]
    pub meta: Meta,
    pub personal: Personal,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub skills: Vec<SkillGroup>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub extras: Extras,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Meta {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub pdf: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Personal {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub avatar: Option<AvatarSource>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub hero: Option<Hero>,
    #[serde(default)]
    pub contact: Contact,
}

impl Personal {
    pub fn hero_summary(&self) -> Option<&str> {
        self.hero
            .as_ref()
            .and_then(|hero| hero.summary.as_deref())
            .or(self.summary.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Hero {
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Contact {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub socials: Vec<Link>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillGroup {
    pub title: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub level: u8,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub years: Option<u32>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Experience {
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date: Option<DateSpan>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub bullets: Vec<String>,
    #[serde(default)]
    pub tech: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub date: Option<DateSpan>,
    #[serde(default)]
    pub bullets: Vec<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Project {
    pub fn github_link(&self) -> Option<&Link> {
        self.links
            .iter()
            .find(|link| link.label.trim().eq_ignore_ascii_case("github"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Education {
    pub degree: String,
    pub school: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date: Option<DateSpan>,
    #[serde(default)]
    pub gpa: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Extras {
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub soft_skills: Vec<SoftSkill>,
    #[serde(default)]
    pub organizations: Vec<Organization>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Language {
    pub name: String,
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoftSkill {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A free-text date or a `{start, end?}` range. An open range is still running.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DateSpan {
    Text(String),
    Range {
        start: String,
        #[serde(default)]
        end: Option<String>,
    },
}

impl DateSpan {
    pub fn display(&self) -> String {
        match self {
            DateSpan::Text(text) => text.clone(),
            DateSpan::Range { start, end } => {
                let end = end
                    .as_deref()
                    .map(format_month)
                    .unwrap_or_else(|| "Present".to_string());
                format!("{} - {}", format_month(start), end)
            }
        }
    }
}

fn format_month(raw: &str) -> String {
    let trimmed = raw.trim();
    match NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d") {
        Ok(date) => date.format("%b %Y").to_string(),
        Err(_) => trimmed.to_string(),
    }
}

impl Portfolio {
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_DATA).context("parse built-in portfolio data")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read portfolio data at {}", path.display()))?;
        Self::parse(&data)
            .with_context(|| format!("Failed to parse portfolio data at {}", path.display()))
    }

    pub fn parse(data: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn project_index(&self, id: &str) -> Option<usize> {
        self.projects.iter().position(|project| project.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_dataset_parses() {
        let portfolio = Portfolio::builtin().unwrap();
        assert!(!portfolio.personal.name.is_empty());
        assert!(!portfolio.projects.is_empty());
        let mut ids: Vec<&str> = portfolio.projects.iter().map(|p| p.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), portfolio.projects.len(), "project ids are unique");
    }

    #[test]
    fn builtin_hrefs_are_urls() {
        let portfolio = Portfolio::builtin().unwrap();
        for project in &portfolio.projects {
            if let Some(href) = &project.href {
                assert!(url::Url::parse(href).is_ok(), "bad href {href}");
            }
        }
    }

    #[test]
    fn date_range_formats_months() {
        let span = DateSpan::Range {
            start: "2025-08".into(),
            end: Some("2026-02".into()),
        };
        assert_eq!(span.display(), "Aug 2025 - Feb 2026");
    }

    #[test]
    fn open_range_reads_present() {
        let span = DateSpan::Range {
            start: "2023-03".into(),
            end: None,
        };
        assert_eq!(span.display(), "Mar 2023 - Present");
    }

    #[test]
    fn free_text_dates_pass_through() {
        let span: DateSpan = serde_yaml::from_str("\"2022-2026 (Expected)\"").unwrap();
        assert_eq!(span.display(), "2022-2026 (Expected)");
        let odd = DateSpan::Range {
            start: "Spring 2020".into(),
            end: Some("2021".into()),
        };
        assert_eq!(odd.display(), "Spring 2020 - 2021");
    }

    #[test]
    fn github_link_matches_label_case_insensitively() {
        let project: Project = serde_yaml::from_str(
            "id: x\ntitle: X\ndescription: d\nlinks:\n  - label: Docs\n    url: https://docs.rs\n  - label: GITHUB\n    url: https://github.com/a/b\n",
        )
        .unwrap();
        assert_eq!(project.github_link().unwrap().url, "https://github.com/a/b");
    }

    #[test]
    fn optional_fields_default_to_absent() {
        let project: Project =
            serde_yaml::from_str("id: bare\ntitle: Bare\ndescription: nothing else\n").unwrap();
        assert!(project.tags.is_empty());
        assert!(project.bullets.is_empty());
        assert!(project.href.is_none());
        assert!(project.github_link().is_none());
    }

    #[test]
    fn load_reads_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "personal:\n  name: Test Person\nprojects:\n  - id: one\n    title: One\n    description: first\n"
        )
        .unwrap();
        let portfolio = Portfolio::load(file.path()).unwrap();
        assert_eq!(portfolio.personal.name, "Test Person");
        assert_eq!(portfolio.project_index("one"), Some(0));
        assert_eq!(portfolio.project_index("two"), None);
    }
}
