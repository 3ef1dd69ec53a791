use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::auth::{Token, TOKEN_ENV_VAR};
use crate::config::{Config, ConfigOverrides};
use crate::output::{render_pipelines, render_workspaces, Exporter};
use crate::providers::zenhub::{Repository, ZenHubProvider};

#[derive(Parser)]
#[command(name = "boardlens")]
#[command(author, version, about = "ZenHub label export", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (defaults to ./boardlens.{toml,json,yaml,yml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// ZenHub personal API key
    #[arg(short, long, global = true, env = TOKEN_ENV_VAR, hide_env_values = true)]
    token: Option<String>,

    #[command(flatten)]
    overrides: OverrideArgs,
}

#[derive(Args)]
struct OverrideArgs {
    /// ZenHub GraphQL endpoint
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Workspace whose pipelines are read
    #[arg(short, long, global = true)]
    workspace_id: Option<String>,

    /// Directory receiving the raw dumps and CSV files
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Upper bound on pagination rounds per repository
    #[arg(short, long, global = true)]
    max_batches: Option<usize>,

    /// Repository to export as NAME=GH_ID; repeat to export several
    #[arg(short, long = "repo", global = true, value_name = "NAME=GH_ID")]
    repositories: Vec<Repository>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export label counts for every configured repository (default)
    Export,

    /// List the workspaces the configured repositories belong to
    Workspaces {
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List the pipelines of the configured workspace
    Pipelines {
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Write the default configuration, with any overrides applied, to a file
    Init {
        /// Destination; the extension picks TOML, JSON or YAML
        #[arg(default_value = "boardlens.toml")]
        path: PathBuf,

        /// Replace an existing file
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

impl From<&OverrideArgs> for ConfigOverrides {
    fn from(args: &OverrideArgs) -> Self {
        Self {
            endpoint: args.endpoint.clone(),
            workspace_id: args.workspace_id.clone(),
            output_dir: args.output_dir.clone(),
            max_batches: args.max_batches,
            repositories: args.repositories.clone(),
        }
    }
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        config.apply_overrides(ConfigOverrides::from(&self.overrides));
        config.validate()?;
        Ok(config)
    }

    /// Builds the provider; fails on a missing token before any request goes out.
    fn provider(&self, config: &Config) -> Result<ZenHubProvider> {
        let token = Token::resolve([self.token.as_deref(), config.zenhub.token.as_deref()])?;

        Ok(ZenHubProvider::new(
            &config.zenhub.endpoint,
            token,
            config.zenhub.workspace_id.clone(),
            config.zenhub.page_size,
            config.export.max_batches,
        )?)
    }

    async fn execute_export(&self, config: &Config) -> Result<()> {
        let provider = self.provider(config)?;

        info!(
            "Exporting {} repositories from workspace {}",
            config.repositories.len(),
            config.zenhub.workspace_id
        );

        let exporter = Exporter::to_filesystem(
            &config.export.output_dir,
            config.export.retry_policy(),
            config.export.pretty,
        );
        exporter.prepare().await?;

        let outcomes = provider
            .export_repositories(&config.repositories, &exporter)
            .await?;

        let incomplete: Vec<&Repository> = outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.is_complete())
            .map(|(repository, _)| repository)
            .collect();

        if incomplete.is_empty() {
            info!(
                "Export finished, files written to: {}",
                exporter.output_dir().display()
            );
        } else {
            warn!(
                "Export finished with {} of {} repositories missing files",
                incomplete.len(),
                outcomes.len()
            );
        }

        Ok(())
    }

    async fn execute_workspaces(&self, config: &Config, json: bool) -> Result<()> {
        let provider = self.provider(config)?;
        let found = provider.discover_workspaces(&config.repositories).await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&found)?);
        } else {
            print!("{}", render_workspaces(&found));
        }

        Ok(())
    }

    async fn execute_pipelines(&self, config: &Config, json: bool) -> Result<()> {
        let provider = self.provider(config)?;
        let pipelines = provider.fetch_pipelines().await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&pipelines)?);
        } else {
            print!("{}", render_pipelines(&provider.workspace_id, &pipelines));
        }

        Ok(())
    }

    /// Never reads an existing configuration file and never stores the token.
    fn execute_init(&self, path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            bail!("{} already exists, pass --force to replace it", path.display());
        }

        let mut config = Config::default();
        config.apply_overrides(ConfigOverrides::from(&self.overrides));
        config.validate()?;
        config.save(path)?;

        info!("Configuration written to {}", path.display());
        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        let json = match &self.command {
            Some(Commands::Init { path, force }) => return self.execute_init(path, *force),
            Some(Commands::Workspaces { json } | Commands::Pipelines { json }) => *json,
            None | Some(Commands::Export) => false,
        };

        let config = self.load_config()?;

        match &self.command {
            Some(Commands::Workspaces { .. }) => self.execute_workspaces(&config, json).await,
            Some(Commands::Pipelines { .. }) => self.execute_pipelines(&config, json).await,
            _ => self.execute_export(&config).await,
        }
    }
}
