//! Command handlers for the lecture organizer CLI
//!
//! This module implements the command handlers that connect CLI arguments to
//! the session, sync controller and tag composer.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::app::models::format_duration;
use crate::app::{
    ApiClient, HierarchyModel, OrganizerSession, RemoteStore, ReorderSyncController,
    TagFilterComposer, TagSet,
};
use crate::cli::{ImportArgs, MoveArgs, ReorderArgs, TagsArgs};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

fn build_client(config: &AppConfig) -> Result<ApiClient> {
    Ok(ApiClient::with_config(config.client.to_runtime_config())?)
}

/// Handle the import command
///
/// Fetches the playlist, auto-partitions it and sends one bulk import.
pub async fn handle_import(args: ImportArgs, config: &AppConfig) -> Result<()> {
    args.validate().map_err(AppError::generic)?;
    let start_time = Instant::now();

    let client = build_client(config)?;
    let prefix = args
        .chapter_prefix
        .as_deref()
        .unwrap_or(&config.organizer.chapter_prefix);
    let chapter_size = args
        .chapter_size
        .unwrap_or(config.organizer.default_chapter_size);

    let mut session =
        OrganizerSession::from_playlist(&client, &args.playlist_url, &args.course, prefix).await?;
    if session.model().unassigned_pool().is_empty() {
        warn!("Playlist {} has no items", args.playlist_url);
        println!("Playlist is empty, nothing to import.");
        return Ok(());
    }

    let created = session.auto_partition(chapter_size)?;
    info!("Created {} chapters of up to {}", created.len(), chapter_size);
    print_hierarchy(session.model());

    if args.dry_run {
        let payload = session.compile()?;
        let json = serde_json::to_string_pretty(&payload)
            .map_err(|e| AppError::generic(format!("Failed to render payload: {}", e)))?;
        println!("{}", json);
        println!("\nDry run: {} lectures not sent.", payload.len());
        return Ok(());
    }

    let summary = session.submit(&client).await?;
    println!(
        "\nImported {} lectures in {} chapters into course {} ({:?})",
        summary.lectures,
        summary.chapters,
        summary.scope_id,
        start_time.elapsed()
    );
    if !summary.message.is_empty() {
        println!("  {}", summary.message);
    }
    Ok(())
}

/// Handle the reorder command
pub async fn handle_reorder(args: ReorderArgs, config: &AppConfig) -> Result<()> {
    args.validate().map_err(AppError::generic)?;

    let store: Arc<dyn RemoteStore> = Arc::new(build_client(config)?);
    let controller = ReorderSyncController::load(store, &args.course).await?;

    let report = controller
        .reorder_lecture(&args.chapter, args.from - 1, args.to - 1)
        .await?;
    debug!("Reorder confirmed as operation {}", report.operation_id);

    println!(
        "Moved lecture {} to position {} ({}ms)",
        args.from,
        args.to,
        report.latency_ms()
    );
    if let Some(chapter) = controller.model().await.chapter(&args.chapter) {
        for lecture in &chapter.lectures {
            println!("  {:>3}. {}", lecture.position, lecture.title);
        }
    }
    Ok(())
}

/// Handle the move command
pub async fn handle_move(args: MoveArgs, config: &AppConfig) -> Result<()> {
    args.validate().map_err(AppError::generic)?;

    let store: Arc<dyn RemoteStore> = Arc::new(build_client(config)?);
    let controller = ReorderSyncController::load(store, &args.course).await?;

    let report = controller
        .move_lecture(
            &args.from_chapter,
            args.position - 1,
            &args.to_chapter,
            args.to_position - 1,
        )
        .await?;
    debug!("Move confirmed as operation {}", report.operation_id);

    println!(
        "Moved lecture to chapter {} position {} ({}ms)",
        args.to_chapter,
        args.to_position,
        report.latency_ms()
    );
    Ok(())
}

/// Handle the tags command
pub async fn handle_tags(args: TagsArgs, config: &AppConfig) -> Result<()> {
    let query = TagFilterComposer::compose(&args.tags, args.course.as_deref());

    if args.query_only {
        println!("{}", query);
        return Ok(());
    }

    let client = build_client(config)?;
    if query.is_empty() {
        let tags = client.list_unique_tags().await?;
        info!("Backend knows {} tags", tags.len());
        for tag in tags {
            println!("{}", tag);
        }
        return Ok(());
    }

    let (known, lectures) =
        futures::try_join!(client.list_unique_tags(), client.search_lectures(&query))?;
    let known: TagSet = known.into_iter().collect();
    let requested: TagSet = args.tags.iter().collect();
    for tag in requested.iter().filter(|t| !known.contains(t)) {
        warn!("Tag '{}' is not used by any lecture", tag);
    }

    println!("{} lectures match {}", lectures.len(), query);
    for lecture in lectures {
        println!(
            "  {} [{}] {}",
            lecture.title,
            format_duration(lecture.duration_seconds),
            lecture.tags.joined()
        );
    }
    Ok(())
}

fn print_hierarchy(model: &HierarchyModel) {
    for chapter in model.chapters() {
        println!(
            "{}. {} ({} lectures, {})",
            chapter.number,
            chapter.name,
            chapter.lectures.len(),
            format_duration(chapter.total_duration_seconds())
        );
        for lecture in &chapter.lectures {
            println!("   {:>3}. {}", lecture.position, lecture.title);
        }
    }
}
