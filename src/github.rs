use std::time::Duration;

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::USER_AGENT;
use url::Url;

use crate::portfolio::Project;

pub const RAW_CONTENT_HOST: &str = "https://raw.githubusercontent.com";

static REPO_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"github\.com/([^/?#\s]+)/([^/?#\s]+)").expect("valid repo pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn parse(url: &str) -> Option<Self> {
        let caps = REPO_PATTERN.captures(url)?;
        let owner = caps.get(1)?.as_str().to_string();
        let repo = caps.get(2)?.as_str();
        let repo = repo.strip_suffix(".git").unwrap_or(repo).to_string();
        if owner.is_empty() || repo.is_empty() {
            return None;
        }
        Some(Self { owner, repo })
    }

    pub fn for_project(project: &Project) -> Option<Self> {
        project
            .github_link()
            .and_then(|link| Self::parse(&link.url))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub content_host: String,
    pub default_branch: String,
    pub user_agent: String,
    pub timeout: Option<Duration>,
    pub http_client: Option<HttpClient>,
}

pub struct Client {
    http: HttpClient,
    user_agent: String,
    content_host: Url,
    branch: String,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.user_agent.trim().is_empty() {
            bail!("github client user agent required");
        }

        let host = if config.content_host.trim().is_empty() {
            RAW_CONTENT_HOST
        } else {
            config.content_host.trim()
        };
        let content_host =
            Url::parse(host).with_context(|| format!("parse content host {host:?}"))?;
        if content_host.cannot_be_a_base() {
            bail!("content host {host:?} cannot carry a path");
        }

        let branch = if config.default_branch.trim().is_empty() {
            "main".to_string()
        } else {
            config.default_branch.trim().to_string()
        };

        let http = match config.http_client {
            Some(client) => client,
            None => HttpClient::builder()
                .timeout(config.timeout.unwrap_or(Duration::from_secs(20)))
                .build()
                .context("build README HTTP client")?,
        };

        Ok(Client {
            http,
            user_agent: config.user_agent,
            content_host,
            branch,
        })
    }

    pub fn readme_url(&self, repo: &RepoRef) -> Url {
        let mut url = self.content_host.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(&repo.owner)
                .push(&repo.repo)
                .push(&self.branch)
                .push("README.md");
        }
        url
    }

    pub fn readme(&self, repo: &RepoRef) -> Result<String> {
        let url = self.readme_url(repo);
        let response = self
            .http
            .get(url.clone())
            .header(USER_AGENT, &self.user_agent)
            .send()
            .with_context(|| format!("request {url}"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("README request to {url} failed with status {status}");
        }

        response.text().context("read README body")
    }
}
