use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    core::{
        config::{parse_origin, PortConfig},
        errors::AppResult,
        types::TransferOptions,
    },
    security::keyring,
};

pub mod export;
pub mod import;
pub mod settings;

#[derive(Debug, Parser)]
#[command(name = "formport", version, about = "Copy content-manager entries between Strapi environments")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Snapshot an entry into the transfer slot.
    Export(TransferArgs),
    /// Rewrite a previously exported entry into this environment.
    Import(ImportArgs),
    /// Store an admin token for an environment in the OS keyring.
    SetToken {
        #[arg(long, default_value = "default")]
        env: String,
        #[arg(long, env = "FORMPORT_TOKEN")]
        token: String,
    },
}

#[derive(Debug, Args)]
pub struct ConnectionArgs {
    #[arg(long, env = "FORMPORT_BASE_URL")]
    pub base_url: String,
    /// Keyring entry holding the admin token when `--token` is absent.
    #[arg(long, default_value = "default")]
    pub env: String,
    #[arg(long, env = "FORMPORT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    #[arg(long)]
    pub source_origin: Option<String>,
    #[arg(long)]
    pub page_uid: Option<String>,
}

#[derive(Debug, Args)]
pub struct TransferArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,
    /// Content type uid, e.g. `api::page.page`.
    #[arg(long)]
    pub uid: String,
    #[arg(long)]
    pub id: String,
    /// Transfer slot; defaults to `<data dir>/clipboard.json`.
    #[arg(long)]
    pub clipboard: Option<PathBuf>,
    #[arg(long)]
    pub no_reuse_assets: bool,
    #[arg(long)]
    pub no_match_pages: bool,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub transfer: TransferArgs,
    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    pub yes: bool,
    #[arg(long)]
    pub publish: bool,
    /// Field paths the import may write; defaults to the entry's own fields.
    #[arg(long = "field", value_name = "PATH")]
    pub fields: Vec<String>,
}

impl ConnectionArgs {
    pub fn config(&self) -> AppResult<PortConfig> {
        let mut config = PortConfig::new(&self.base_url)?.with_env_overrides()?;
        if let Some(origin) = &self.source_origin {
            config.source_origin = Some(parse_origin(origin)?);
        }
        if let Some(uid) = self.page_uid.as_deref().filter(|uid| !uid.trim().is_empty()) {
            config.page_uid = uid.trim().to_string();
        }
        Ok(config)
    }

    pub fn token(&self) -> AppResult<String> {
        match self.token.as_deref().filter(|token| !token.trim().is_empty()) {
            Some(token) => Ok(token.trim().to_string()),
            None => keyring::get_environment_token(&self.env),
        }
    }
}

impl TransferArgs {
    pub fn options(&self) -> TransferOptions {
        TransferOptions {
            reuse_existing_assets: !self.no_reuse_assets,
            match_page_relations: !self.no_match_pages,
        }
    }

    pub fn clipboard_path(&self, config: &PortConfig) -> PathBuf {
        self.clipboard
            .clone()
            .unwrap_or_else(|| config.clipboard_path())
    }
}

pub async fn dispatch(cli: Cli) -> AppResult<()> {
    match cli.command {
        Command::Export(args) => export::export_entry(args).await,
        Command::Import(args) => import::import_entry(args).await,
        Command::SetToken { env, token } => settings::set_token(&env, &token),
    }
}
