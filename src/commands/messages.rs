use anyhow::Result;
use owo_colors::OwoColorize;
use pairdays_core::MessageText;
use pairdays_core::store::MessageFeed;
use uuid::Uuid;

use super::Context;
use crate::render::Render;
use crate::utils::tui::spin;

pub async fn list(ctx: &Context) -> Result<()> {
    let mut feed = MessageFeed::new(ctx.gateway.clone());
    let messages = spin("Loading messages", feed.list()).await?;

    if messages.is_empty() {
        println!("{}", "No messages yet".dimmed());
    }
    for message in messages {
        println!("{}", message.render());
    }
    Ok(())
}

pub async fn send(ctx: &Context, text: &str) -> Result<()> {
    // Checked locally so an oversized message never reaches the backend.
    let text = MessageText::new(text)?;

    let mut feed = MessageFeed::new(ctx.gateway.clone());
    spin("Sending", feed.create(&text)).await?;
    println!("{}", "  Sent".green());
    Ok(())
}

pub async fn delete(ctx: &Context, id: Uuid) -> Result<()> {
    let mut feed = MessageFeed::new(ctx.gateway.clone());
    spin("Deleting message", feed.delete(id)).await?;
    println!("{}", "  Deleted".red());
    Ok(())
}
