use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use thiserror::Error;
use tracing::{debug, info};

use crate::data::{EmbedService, ReadmeService};
use crate::embed::EmbedPolicy;
use crate::github::RepoRef;
use crate::portfolio::{Portfolio, Project};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Details,
    Playground,
}

impl Tab {
    pub fn title(self) -> &'static str {
        match self {
            Tab::Details => "Details",
            Tab::Playground => "Playground",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Closed,
    Details,
    PlaygroundLoading,
    PlaygroundReady,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModalError {
    #[error("no project is open")]
    Closed,
    #[error("this project's demo cannot be embedded")]
    EmbedNotAllowed,
    #[error("the playground has not been requested")]
    NotRequested,
    #[error("no project at index {0}")]
    UnknownProject(usize),
}

#[derive(Debug, Clone)]
pub struct Session {
    project: usize,
    project_id: String,
    token: u64,
    active_tab: Tab,
    iframe_allowed: bool,
    iframe_requested: bool,
    iframe_ready: bool,
    readme: Option<String>,
    readme_pending: bool,
}

impl Session {
    pub fn project_index(&self) -> usize {
        self.project
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn iframe_allowed(&self) -> bool {
        self.iframe_allowed
    }

    pub fn iframe_requested(&self) -> bool {
        self.iframe_requested
    }

    pub fn iframe_ready(&self) -> bool {
        self.iframe_ready
    }

    pub fn readme(&self) -> Option<&str> {
        self.readme.as_deref()
    }

    pub fn readme_pending(&self) -> bool {
        self.readme_pending
    }
}

enum Completion {
    Readme {
        token: u64,
        project_id: String,
        result: Result<String>,
    },
    Embed {
        token: u64,
        project_id: String,
        result: Result<()>,
    },
}

pub struct ModalController {
    portfolio: Arc<Portfolio>,
    readme_service: Arc<dyn ReadmeService + Send + Sync>,
    embed_service: Arc<dyn EmbedService + Send + Sync>,
    policy: EmbedPolicy,
    session: Option<Session>,
    next_token: u64,
    completion_tx: Sender<Completion>,
    completion_rx: Receiver<Completion>,
}

impl ModalController {
    pub fn new(
        portfolio: Arc<Portfolio>,
        readme_service: Arc<dyn ReadmeService + Send + Sync>,
        embed_service: Arc<dyn EmbedService + Send + Sync>,
        policy: EmbedPolicy,
    ) -> Self {
        let (completion_tx, completion_rx) = unbounded();
        Self {
            portfolio,
            readme_service,
            embed_service,
            policy,
            session: None,
            next_token: 1,
            completion_tx,
            completion_rx,
        }
    }

    pub fn phase(&self) -> Phase {
        match &self.session {
            None => Phase::Closed,
            Some(session) => match session.active_tab {
                Tab::Details => Phase::Details,
                Tab::Playground if session.iframe_ready => Phase::PlaygroundReady,
                Tab::Playground => Phase::PlaygroundLoading,
            },
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn project(&self) -> Option<&Project> {
        self.session
            .as_ref()
            .and_then(|session| self.portfolio.projects.get(session.project))
    }

    /// Opens the modal on a project. Returns `Ok(false)` when that project is
    /// already open, in which case nothing is reset or refetched.
    pub fn select(&mut self, index: usize) -> Result<bool, ModalError> {
        let project = self
            .portfolio
            .projects
            .get(index)
            .ok_or(ModalError::UnknownProject(index))?;

        if let Some(session) = &self.session {
            if session.project_id == project.id {
                return Ok(false);
            }
        }

        let token = self.next_token;
        self.next_token = self.next_token.wrapping_add(1);
        let iframe_allowed = self.policy.allows_project(project.href.as_deref());
        let repo = RepoRef::for_project(project);
        let project_id = project.id.clone();

        info!(project = %project_id, iframe_allowed, "open project modal");
        self.session = Some(Session {
            project: index,
            project_id: project_id.clone(),
            token,
            active_tab: Tab::Details,
            iframe_allowed,
            iframe_requested: false,
            iframe_ready: false,
            readme: None,
            readme_pending: repo.is_some(),
        });

        match repo {
            Some(repo) => self.spawn_readme(token, project_id, repo),
            None => debug!(project = %project_id, "no GitHub repository, README skipped"),
        }
        Ok(true)
    }

    pub fn close(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                info!(project = %session.project_id, "close project modal");
                true
            }
            None => false,
        }
    }

    pub fn open_playground(&mut self) -> Result<(), ModalError> {
        let session = self.session.as_mut().ok_or(ModalError::Closed)?;
        if !session.iframe_allowed {
            return Err(ModalError::EmbedNotAllowed);
        }
        session.active_tab = Tab::Playground;
        if session.iframe_requested {
            return Ok(());
        }
        session.iframe_requested = true;
        session.iframe_ready = false;

        let token = session.token;
        let project_id = session.project_id.clone();
        let href = self
            .portfolio
            .projects
            .get(session.project)
            .and_then(|project| project.href.clone())
            .unwrap_or_default();
        self.spawn_embed(token, project_id, href);
        Ok(())
    }

    pub fn show_details(&mut self) -> Result<(), ModalError> {
        let session = self.session.as_mut().ok_or(ModalError::Closed)?;
        session.active_tab = Tab::Details;
        Ok(())
    }

    pub fn mark_embed_ready(&mut self) -> Result<(), ModalError> {
        let session = self.session.as_mut().ok_or(ModalError::Closed)?;
        if !session.iframe_requested {
            return Err(ModalError::NotRequested);
        }
        session.iframe_ready = true;
        Ok(())
    }

    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(completion) = self.completion_rx.try_recv() {
            changed |= self.apply(completion);
        }
        changed
    }

    /// Blocks until one background task finishes or the timeout passes.
    /// Returns true if a task finished, whether or not its result was kept.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        match self.completion_rx.recv_timeout(timeout) {
            Ok(completion) => {
                self.apply(completion);
                true
            }
            Err(_) => false,
        }
    }

    fn spawn_readme(&self, token: u64, project_id: String, repo: RepoRef) {
        let tx = self.completion_tx.clone();
        let service = self.readme_service.clone();
        thread::spawn(move || {
            let result = service.load_readme(&repo);
            let _ = tx.send(Completion::Readme {
                token,
                project_id,
                result,
            });
        });
    }

    fn spawn_embed(&self, token: u64, project_id: String, href: String) {
        let tx = self.completion_tx.clone();
        let service = self.embed_service.clone();
        thread::spawn(move || {
            let result = service.load(&href);
            let _ = tx.send(Completion::Embed {
                token,
                project_id,
                result,
            });
        });
    }

    fn current_mut(&mut self, token: u64, project_id: &str) -> Option<&mut Session> {
        self.session
            .as_mut()
            .filter(|session| session.token == token && session.project_id == project_id)
    }

    fn apply(&mut self, completion: Completion) -> bool {
        match completion {
            Completion::Readme {
                token,
                project_id,
                result,
            } => {
                let Some(session) = self.current_mut(token, &project_id) else {
                    debug!(project = %project_id, "discarding stale README result");
                    return false;
                };
                session.readme_pending = false;
                match result {
                    Ok(text) => session.readme = Some(text),
                    Err(err) => {
                        debug!(project = %project_id, error = %format!("{err:#}"), "README unavailable");
                        session.readme = None;
                    }
                }
                true
            }
            Completion::Embed {
                token,
                project_id,
                result,
            } => {
                if self.current_mut(token, &project_id).is_none() {
                    debug!(project = %project_id, "discarding stale embed signal");
                    return false;
                }
                if let Err(err) = result {
                    debug!(project = %project_id, error = %format!("{err:#}"), "embedded demo finished with an error");
                }
                self.mark_embed_ready().is_ok()
            }
        }
    }
}
