use anyhow::{Context as _, Result};
use dialoguer::{Confirm, Select};
use owo_colors::OwoColorize;
use pairdays_core::UploadFile;
use pairdays_core::carousel::{Viewer, ViewerOutcome};
use pairdays_core::constants::{DISMISS_THRESHOLD_PX, MAX_SCALE, MIN_SCALE, SWIPE_THRESHOLD_PX};
use pairdays_core::store::MemoryFeed;
use pairdays_supabase::SupabaseGateway;
use std::path::PathBuf;
use uuid::Uuid;

use super::Context;
use crate::render::Render;
use crate::utils::tui::spin;

fn feed(ctx: &Context) -> MemoryFeed<SupabaseGateway> {
    MemoryFeed::new(ctx.gateway.clone()).with_bucket(&ctx.config.supabase.bucket)
}

pub async fn list(ctx: &Context) -> Result<()> {
    let mut feed = feed(ctx);
    let memories = spin("Loading memories", feed.list()).await?;

    if memories.is_empty() {
        println!("{}", "No memories yet".dimmed());
        return Ok(());
    }

    for (i, memory) in memories.iter().enumerate() {
        println!("{}", memory.render());
        if i < memories.len() - 1 {
            println!();
        }
    }
    Ok(())
}

pub async fn add(
    ctx: &Context,
    title: &str,
    description: Option<&str>,
    files: &[PathBuf],
) -> Result<()> {
    let uploads = files
        .iter()
        .map(|path| {
            UploadFile::from_path(path).with_context(|| format!("Failed to read {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut feed = feed(ctx);
    let created = spin("Uploading memory", feed.create(title, description, uploads)).await?;

    println!(
        "{}",
        format!(
            "  Created: {} ({} of {} images)",
            created.memory.title,
            created.memory.images.len(),
            files.len()
        )
        .green()
    );
    for skipped in &created.skipped {
        eprintln!(
            "  {}",
            format!("Skipped {}: {}", skipped.file_name, skipped.reason).yellow()
        );
    }
    Ok(())
}

pub async fn delete(ctx: &Context, id: Uuid, yes: bool) -> Result<()> {
    let mut feed = feed(ctx);
    spin("Loading memories", feed.list()).await?;

    let title = feed
        .find(id)
        .map(|m| m.title.clone())
        .unwrap_or_else(|| id.to_string());

    if !yes
        && !Confirm::new()
            .with_prompt(format!("  Delete \"{title}\" and its images?"))
            .default(false)
            .interact()?
    {
        return Ok(());
    }

    spin("Deleting memory", feed.delete(id)).await?;
    println!("{}", format!("  Deleted: {title}").red());
    Ok(())
}

/// Actions offered by the viewer, each standing in for a gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    Next,
    Previous,
    ZoomIn,
    ZoomOut,
    Open,
    Close,
}

impl Action {
    const ALL: [Action; 6] = [
        Action::Next,
        Action::Previous,
        Action::ZoomIn,
        Action::ZoomOut,
        Action::Open,
        Action::Close,
    ];

    fn label(self) -> &'static str {
        match self {
            Action::Next => "Next (swipe left)",
            Action::Previous => "Previous (swipe right)",
            Action::ZoomIn => "Zoom in",
            Action::ZoomOut => "Zoom out",
            Action::Open => "Open in browser",
            Action::Close => "Close (swipe down)",
        }
    }

    /// Drive the viewer the way the matching gesture would.
    fn apply(self, viewer: &mut Viewer) -> ViewerOutcome {
        let swipe = SWIPE_THRESHOLD_PX * 2.0;
        match self {
            Action::Next => viewer.fling(-swipe, 0.0),
            Action::Previous => viewer.fling(swipe, 0.0),
            Action::ZoomIn => {
                viewer.pinch((viewer.scale() + 0.5).min(MAX_SCALE));
                ViewerOutcome::Stay
            }
            Action::ZoomOut => {
                viewer.pinch((viewer.scale() - 0.5).max(MIN_SCALE));
                ViewerOutcome::Stay
            }
            Action::Open => ViewerOutcome::Stay,
            Action::Close => viewer.fling(0.0, DISMISS_THRESHOLD_PX * 2.0),
        }
    }
}

pub async fn view(ctx: &Context, id: Uuid, start: usize) -> Result<()> {
    let mut feed = feed(ctx);
    spin("Loading memory", feed.list()).await?;

    let Some(memory) = feed.find(id) else {
        anyhow::bail!("Memory {id} not found");
    };
    let Some(mut viewer) = Viewer::open(memory.images.len(), start.saturating_sub(1)) else {
        println!("{}", format!("  \"{}\" has no images", memory.title).dimmed());
        return Ok(());
    };

    println!("{}", memory.title.bold());
    let labels: Vec<_> = Action::ALL.iter().map(|a| a.label()).collect();

    while viewer.is_open() {
        let image = &memory.images[viewer.active()];
        println!(
            "  [{}/{}] {} {}",
            viewer.active() + 1,
            memory.images.len(),
            image.image_path,
            format!("{:.1}x", viewer.scale()).dimmed()
        );
        println!("  {}", viewer.carousel().render());

        let choice = Select::new()
            .items(&labels)
            .default(0)
            .interact_opt()?;
        let action = choice.map(|i| Action::ALL[i]).unwrap_or(Action::Close);

        if action == Action::Open {
            if let Err(e) = open::that(&image.image_path) {
                eprintln!("  {}", format!("Could not open browser: {e}").red());
            }
            continue;
        }

        match action.apply(&mut viewer) {
            ViewerOutcome::Stay if matches!(action, Action::Next | Action::Previous) => {
                println!("  {}", "No more images that way".dimmed());
            }
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_drive_viewer() {
        let mut viewer = Viewer::open(3, 0).unwrap();

        assert_eq!(Action::Next.apply(&mut viewer), ViewerOutcome::Next);
        assert_eq!(viewer.active(), 1);
        assert_eq!(Action::Previous.apply(&mut viewer), ViewerOutcome::Previous);
        assert_eq!(Action::Previous.apply(&mut viewer), ViewerOutcome::Stay);
        assert_eq!(viewer.active(), 0);

        Action::ZoomIn.apply(&mut viewer);
        Action::ZoomIn.apply(&mut viewer);
        assert_eq!(viewer.scale(), 2.0);
        for _ in 0..5 {
            Action::ZoomIn.apply(&mut viewer);
        }
        assert_eq!(viewer.scale(), MAX_SCALE);
        for _ in 0..10 {
            Action::ZoomOut.apply(&mut viewer);
        }
        assert_eq!(viewer.scale(), MIN_SCALE);

        assert_eq!(Action::Close.apply(&mut viewer), ViewerOutcome::Dismiss);
        assert!(!viewer.is_open());
    }

    #[test]
    fn every_action_has_a_label() {
        for action in Action::ALL {
            assert!(!action.label().is_empty());
        }
    }
}
