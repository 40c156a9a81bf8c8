//! Subcommand handlers.

pub mod admin;
pub mod auth;
pub mod shop;

use anyhow::{Context, Result};
use storefront_core::{ApiClient, ApiError, AuthStatus, Config};
use tracing::debug;

use crate::cli::{Args, Command};

/// Run one command against the backend.
pub async fn run(args: Args, config: &mut Config) -> Result<()> {
    let api = ApiClient::from_config(config).context("Failed to set up the API client")?;
    let json = args.json;

    if !args.command.skips_restore() {
        let status = api
            .session()
            .restore_session()
            .await
            .context("Could not verify the stored session")?;
        debug!(?status, "Session restored");
    }

    match args.command {
        Command::Login { email, admin } => auth::login(&api, config, email, admin).await,
        Command::Register { name, email } => auth::register(&api, config, name, email).await,
        Command::Logout { all } => auth::logout(&api, all).await,
        Command::Whoami => auth::whoami(&api, json).await,
        Command::Profile { name, email, mobile, address } => {
            auth::update_profile(&api, name, email, mobile, address, json).await
        }
        Command::Passwd => auth::change_password(&api).await,
        Command::Products { page, search, category, all } => {
            shop::products(&api, page, search, category, all, json).await
        }
        Command::Product { slug } => shop::product(&api, &slug, json).await,
        Command::Categories => shop::categories(&api, json).await,
        Command::Cart { action } => shop::cart(&api, action, json).await,
        Command::Orders { id, page } => shop::orders(&api, id, page, json).await,
        Command::Checkout { address, payment, notes } => {
            shop::checkout(&api, address, payment, notes, json).await
        }
        Command::Admin(command) => admin::execute(&api, command, json).await,
    }
}

/// Fail early with a readable message when no one is signed in.
pub(crate) fn require_login(api: &ApiClient) -> Result<()> {
    match api.session().status() {
        AuthStatus::Authenticated(_) => Ok(()),
        AuthStatus::Unauthenticated => Err(anyhow::Error::new(ApiError::SessionExpired).context("Not logged in")),
    }
}
