use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::USER_AGENT;

use crate::github::{self, RepoRef};

pub trait ReadmeService: Send + Sync {
    fn load_readme(&self, repo: &RepoRef) -> Result<String>;
}

pub trait EmbedService: Send + Sync {
    fn load(&self, href: &str) -> Result<()>;
}

pub struct GithubReadmeService {
    client: Arc<github::Client>,
}

impl GithubReadmeService {
    pub fn new(client: Arc<github::Client>) -> Self {
        Self { client }
    }
}

impl ReadmeService for GithubReadmeService {
    fn load_readme(&self, repo: &RepoRef) -> Result<String> {
        self.client
            .readme(repo)
            .with_context(|| format!("fetch README for {}/{}", repo.owner, repo.repo))
    }
}

pub struct HttpEmbedService {
    http: HttpClient,
    user_agent: String,
}

impl HttpEmbedService {
    pub fn new(user_agent: String, timeout: Duration) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build embed HTTP client")?;
        Ok(Self { http, user_agent })
    }
}

impl EmbedService for HttpEmbedService {
    fn load(&self, href: &str) -> Result<()> {
        let response = self
            .http
            .get(href)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .with_context(|| format!("load {href}"))?;
        response.bytes().context("read embedded page")?;
        Ok(())
    }
}

#[derive(Default)]
pub struct OfflineReadmeService;

impl ReadmeService for OfflineReadmeService {
    fn load_readme(&self, repo: &RepoRef) -> Result<String> {
        bail!("offline: README for {}/{} not fetched", repo.owner, repo.repo)
    }
}

#[derive(Default)]
pub struct OfflineEmbedService;

impl EmbedService for OfflineEmbedService {
    fn load(&self, _href: &str) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MockReadmeService {
    pub body: String,
}

impl MockReadmeService {
    pub fn new<S: Into<String>>(body: S) -> Self {
        Self { body: body.into() }
    }
}

impl ReadmeService for MockReadmeService {
    fn load_readme(&self, repo: &RepoRef) -> Result<String> {
        if self.body.is_empty() {
            Ok(format!("# {}\n\nSample README for {}.", repo.repo, repo.owner))
        } else {
            Ok(self.body.clone())
        }
    }
}
