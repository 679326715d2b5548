use anyhow::{Context as _, Result};
use dialoguer::Input;
use owo_colors::OwoColorize;
use pairdays_core::gateway::Gateway;

use super::Context;
use crate::utils::tui::spin;

pub async fn login(ctx: &Context, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(e) => e,
        None => Input::<String>::new()
            .with_prompt("  Email")
            .interact_text()?,
    };
    let password = rpassword::prompt_password("  Password: ").context("Failed to read password")?;

    let session = spin("Signing in", ctx.gateway.sign_in(email.trim(), &password)).await?;
    ctx.sessions.save(&session)?;

    let who = session.user.email.as_deref().unwrap_or(email.trim());
    println!("{}", format!("  Signed in as {who}").green());
    Ok(())
}

pub fn logout(ctx: &Context) -> Result<()> {
    if ctx.sessions.clear()? {
        println!("{}", "  Signed out".green());
    } else {
        println!("{}", "  Not signed in".dimmed());
    }
    Ok(())
}

pub async fn whoami(ctx: &Context) -> Result<()> {
    match spin("Checking session", ctx.gateway.current_user()).await? {
        Some(user) => {
            let email = user.email.as_deref().unwrap_or("(no email)");
            println!("{} {}", email, user.id.to_string().dimmed());
        }
        None => println!("{}", "Not signed in. Run `pairdays login`".dimmed()),
    }
    Ok(())
}
