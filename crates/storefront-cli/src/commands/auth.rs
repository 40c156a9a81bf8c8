//! Account commands: login, registration, logout and profile.

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use storefront_core::models::{ChangePasswordRequest, ProfileUpdate, RegisterRequest};
use storefront_core::{ApiClient, CartState, Config};
use tracing::warn;

use crate::output;

use super::require_login;

/// Password source for non-interactive use
const PASSWORD_ENV: &str = "STOREFRONT_PASSWORD";

pub async fn login(api: &ApiClient, config: &mut Config, email: Option<String>, admin: bool) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt_email(config.last_email.as_deref())?,
    };
    let password = password("Password: ")?;

    println!("Authenticating...");
    let user = if admin {
        api.session().admin_login(&email, &password).await?
    } else {
        api.session().login(&email, &password).await?
    };

    remember_email(config, &email);

    if api.session().is_admin() {
        println!("Welcome back, {} (admin)", user.name);
    } else {
        println!("Welcome back, {}", user.name);
        // Pick up anything left in a guest cart
        let mut cart = CartState::new();
        cart.merge(api, None).await;
    }
    Ok(())
}

pub async fn register(api: &ApiClient, config: &mut Config, name: String, email: String) -> Result<()> {
    let password = password("Password: ")?;
    let confirmation = password_confirmation(&password)?;

    let registration = RegisterRequest {
        name,
        email: email.clone(),
        password,
        password_confirmation: confirmation,
    };
    let user = api.session().register(&registration).await?;

    remember_email(config, &email);
    println!("Account created. Signed in as {}", user.email);
    Ok(())
}

/// Always erases the stored tokens, even when the session was never verified.
pub async fn logout(api: &ApiClient, all: bool) -> Result<()> {
    if all {
        api.session().logout_all().await?;
        println!("Logged out on all devices.");
    } else {
        api.session().logout().await?;
        println!("Logged out.");
    }
    Ok(())
}

pub async fn whoami(api: &ApiClient, json: bool) -> Result<()> {
    let Some(user) = api.session().current_user() else {
        println!("Not logged in.");
        return Ok(());
    };
    if json {
        return output::print_json(&user);
    }
    output::user_detail(&user);
    if let Some(expires) = api.session().access_expires_at() {
        println!("Token expires: {}", expires.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}

pub async fn update_profile(
    api: &ApiClient,
    name: Option<String>,
    email: Option<String>,
    mobile: Option<String>,
    address: Option<String>,
    json: bool,
) -> Result<()> {
    require_login(api)?;
    if name.is_none() && email.is_none() && mobile.is_none() && address.is_none() {
        bail!("Nothing to update. Pass --name, --email, --mobile or --address.");
    }

    let update = ProfileUpdate {
        name,
        email,
        mobile_number: mobile,
        address,
        ..Default::default()
    };
    let user = api.session().update_profile(&update).await?;
    if json {
        return output::print_json(&user);
    }
    println!("Profile updated.");
    output::user_detail(&user);
    Ok(())
}

pub async fn change_password(api: &ApiClient) -> Result<()> {
    require_login(api)?;
    let current_password = rpassword::prompt_password("Current password: ")?;
    let password = rpassword::prompt_password("New password: ")?;
    let password_confirmation = password_confirmation(&password)?;

    api.session()
        .change_password(&ChangePasswordRequest {
            current_password,
            password,
            password_confirmation,
        })
        .await?;
    println!("Password changed.");
    Ok(())
}

fn remember_email(config: &mut Config, email: &str) {
    config.last_email = Some(email.to_string());
    if let Err(e) = config.save() {
        warn!(error = %format!("{:#}", e), "Failed to save config");
    }
}

fn prompt_email(last: Option<&str>) -> Result<String> {
    match last {
        Some(last) => print!("Email [{}]: ", last),
        None => print!("Email: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    match (input.is_empty(), last) {
        (false, _) => Ok(input.to_string()),
        (true, Some(last)) => Ok(last.to_string()),
        (true, None) => bail!("Email is required"),
    }
}

pub(crate) fn password(prompt: &str) -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    rpassword::prompt_password(prompt).context("Failed to read password")
}

pub(crate) fn password_confirmation(password: &str) -> Result<String> {
    if std::env::var(PASSWORD_ENV).is_ok() {
        return Ok(password.to_string());
    }
    let confirmation = rpassword::prompt_password("Confirm password: ").context("Failed to read password")?;
    if confirmation != password {
        bail!("Passwords do not match");
    }
    Ok(confirmation)
}
