use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::{self, Config};
use crate::data::{
    EmbedService, GithubReadmeService, HttpEmbedService, OfflineEmbedService,
    OfflineReadmeService, ReadmeService,
};
use crate::embed::EmbedPolicy;
use crate::github;
use crate::logging;
use crate::modal::ModalController;
use crate::navigator::{Navigator, SystemBrowser};
use crate::portfolio::Portfolio;
use crate::scroll::Spring;
use crate::theme::ThemeMode;
use crate::ui;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config_file: Option<PathBuf>,
    pub data_file: Option<PathBuf>,
    pub no_intro: bool,
}

pub fn load_config(opts: &RunOptions) -> Result<Config> {
    config::load(config::LoadOptions {
        config_file: opts.config_file.clone(),
        env_prefix: None,
    })
    .context("load config")
}

pub fn load_portfolio(cfg: &Config, data_file: Option<&Path>) -> Result<Portfolio> {
    match data_file.or(cfg.portfolio.data_file.as_deref()) {
        Some(path) => Portfolio::load(path),
        None => Portfolio::builtin(),
    }
}

pub fn run(opts: RunOptions) -> Result<()> {
    let cfg = load_config(&opts)?;
    let _log_guard = logging::init(&cfg.log);
    info!(version = crate::VERSION, "starting folio");

    let portfolio = Arc::new(
        load_portfolio(&cfg, opts.data_file.as_deref()).context("load portfolio data")?,
    );
    info!(
        projects = portfolio.projects.len(),
        name = %portfolio.personal.name,
        "portfolio loaded"
    );

    let user_agent = if !cfg.readme.user_agent.trim().is_empty() {
        cfg.readme.user_agent.clone()
    } else {
        format!("folio/{}", crate::VERSION)
    };

    let readme_service: Arc<dyn ReadmeService + Send + Sync> =
        match github::Client::new(github::ClientConfig {
            content_host: cfg.readme.content_host.clone(),
            default_branch: cfg.readme.default_branch.clone(),
            user_agent: user_agent.clone(),
            timeout: Some(cfg.readme.timeout),
            http_client: None,
        }) {
            Ok(client) => Arc::new(GithubReadmeService::new(Arc::new(client))),
            Err(err) => {
                warn!(error = %err, "README client unavailable; running offline");
                Arc::new(OfflineReadmeService)
            }
        };

    let embed_service: Arc<dyn EmbedService + Send + Sync> =
        match HttpEmbedService::new(user_agent, cfg.readme.timeout) {
            Ok(service) => Arc::new(service),
            Err(err) => {
                warn!(error = %err, "embed client unavailable; demos load instantly");
                Arc::new(OfflineEmbedService)
            }
        };

    let modal = ModalController::new(
        portfolio.clone(),
        readme_service,
        embed_service,
        EmbedPolicy::new(cfg.embed.allowed_hosts.iter()),
    );
    let navigator = Navigator::new(
        Arc::new(SystemBrowser),
        Spring::new(cfg.scroll.stiffness, cfg.scroll.damping),
    );

    let config_path = opts.config_file.clone().or_else(config::default_path);
    let status_message = format!(
        "{} · config {}",
        portfolio.personal.name,
        friendly_path(config_path.as_ref())
    );

    let options = ui::Options {
        portfolio,
        modal,
        navigator,
        theme: ThemeMode::from_name(&cfg.ui.theme),
        intro: cfg.ui.intro && !opts.no_intro,
        tick_rate: cfg.ui.tick_rate,
        status_message,
    };

    let mut model = ui::Model::new(options);
    model.run()?;
    info!("folio exiting");

    Ok(())
}

fn friendly_path(path: Option<&PathBuf>) -> String {
    if let Some(path) = path {
        if let Some(home) = dirs::home_dir() {
            if let Ok(stripped) = path.strip_prefix(&home) {
                let mut display = String::from("~");
                if !stripped.as_os_str().is_empty() {
                    display.push_str(&format!("/{}", stripped.display()));
                }
                return display;
            }
        }
        path.display().to_string()
    } else {
        "~/.config/folio/config.yaml".to_string()
    }
}
