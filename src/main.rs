mod cli;

use contactsheet::{
    annotate::{
        AnnotationEvent, AnnotationScheduler, MemorySurface, RenderSurface, ScrollViewport,
        SvgOverlaySurface,
    },
    config::{self, Config},
    metadata::{AssetTagExtractor, MetadataResolver},
    photos::{self, Photo},
    sheet::{frame_number, info_segment, ContactSheet},
};
use contactsheet_common::PhotoId;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "contactsheet=trace,contactsheet_common=debug".to_string()
        } else {
            "contactsheet=debug,contactsheet_common=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::List { json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(list_photos(cli.config.as_deref(), json))
        }
        Commands::Inspect { file, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(inspect_file(&file, json))
        }
        Commands::Simulate {
            out_dir,
            seed,
            step,
            no_delay,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(simulate(
                cli.config.as_deref(),
                SimulateOptions {
                    out_dir,
                    seed,
                    step,
                    no_delay,
                },
            ))
        }
        Commands::Validate { path } => {
            let path = path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("contactsheet {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Load the configured photo set with a resolver for the configured mode.
async fn load_sheet(config: &Config) -> Result<ContactSheet> {
    let client = reqwest::Client::new();
    let source = photos::source_from_config(config, client.clone())?;
    let extractor = Arc::new(AssetTagExtractor::with_client(client));
    let resolver = Arc::new(MetadataResolver::for_mode(
        config.acquisition_mode(),
        extractor,
    ));

    ContactSheet::load(source.as_ref(), resolver)
        .await
        .with_context(|| format!("Failed to load photos from {} source", config.source.kind))
}

#[derive(Serialize)]
struct ListEntry<'a> {
    id: PhotoId,
    frame: String,
    name: &'a str,
    source: &'a str,
    state: contactsheet_common::MetadataState,
    info: String,
    exif: contactsheet::metadata::Exif,
}

async fn list_photos(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let sheet = load_sheet(&config).await?;
    let records = sheet.resolve_all().await;

    if json {
        let entries: Vec<ListEntry> = sheet
            .photos()
            .iter()
            .zip(records)
            .enumerate()
            .map(|(i, (photo, exif))| ListEntry {
                id: photo.id,
                frame: frame_number(i),
                name: photo.display_name(),
                source: &photo.source_ref,
                state: sheet.metadata_state(photo.id),
                info: info_segment(&exif),
                exif,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if sheet.is_empty() {
        println!("No photos found.");
        return Ok(());
    }

    for (i, (photo, exif)) in sheet.photos().iter().zip(&records).enumerate() {
        println!(
            "{:>5}  {:<32} {}",
            frame_number(i),
            photo.display_name(),
            info_segment(exif)
        );
    }
    println!("\n{} photos", sheet.len());

    Ok(())
}

async fn inspect_file(file: &str, json: bool) -> Result<()> {
    let is_remote = file.starts_with("http://") || file.starts_with("https://");
    if !is_remote && !Path::new(file).exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let mut photo = Photo::new(PhotoId::new(1), file);
    photo.filename = Some(photo.display_name().to_string());

    let resolver = Arc::new(MetadataResolver::on_demand(Arc::new(AssetTagExtractor::new())));
    let sheet = ContactSheet::new(vec![photo], resolver);
    let detail = sheet.detail(PhotoId::new(1)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
    } else {
        print!("{}", detail.render_text());
        println!("State: {}", detail.state);
    }

    Ok(())
}

struct SimulateOptions {
    out_dir: Option<PathBuf>,
    seed: Option<u64>,
    step: Option<f64>,
    no_delay: bool,
}

async fn simulate(config_path: Option<&Path>, options: SimulateOptions) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;
    if options.no_delay {
        config.annotations.settle_delay_ms = 0;
        config.annotations.draw_duration_min_ms = 0;
        config.annotations.draw_duration_max_ms = 0;
    }

    let sheet = load_sheet(&config).await?;
    let ids = sheet.ids();
    let viewport = Arc::new(ScrollViewport::from_layout(&ids, &config.layout));

    let surface: Arc<dyn RenderSurface> = match &options.out_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
            Arc::new(SvgOverlaySurface::new(dir, ids.iter().copied()))
        }
        None => Arc::new(MemorySurface::new()),
    };

    let annotations = config.annotations.clone();
    let fraction = annotations.selection_fraction;
    let job_timeout = annotations.settle_delay()
        + annotations.draw_duration_max()
        + Duration::from_secs(1);
    let scheduler = match options.seed {
        Some(seed) => AnnotationScheduler::seeded(annotations, surface, viewport.clone(), seed),
        None => AnnotationScheduler::new(annotations, surface, viewport.clone()),
    };

    let mut events = scheduler.subscribe();
    let selected = scheduler.initialize(&ids, fraction);
    println!("Selected {} of {} photos for marking", selected.len(), ids.len());

    // Scroll from top to bottom.
    let max_offset = (viewport.content_height() - viewport.viewport_height()).max(0.0);
    let step = options
        .step
        .filter(|s| *s > 0.0)
        .unwrap_or(viewport.viewport_height() / 2.0);
    let mut offset = 0.0;
    loop {
        viewport.scroll_to(offset);
        tokio::task::yield_now().await;
        if offset >= max_offset {
            break;
        }
        offset = (offset + step).min(max_offset);
    }

    let mut finished = 0;
    while finished < selected.len() {
        match tokio::time::timeout(job_timeout, events.recv()).await {
            Ok(Ok(AnnotationEvent::Drawn {
                photo_id,
                mark_kind,
                duration,
            })) => {
                finished += 1;
                println!(
                    "{:>4}. frame {:<5} {:<10} {}ms",
                    finished,
                    sheet.frame_label(photo_id).unwrap_or_default(),
                    mark_kind.to_string(),
                    duration.as_millis()
                );
            }
            Ok(Ok(AnnotationEvent::Skipped { photo_id })) => {
                finished += 1;
                println!(
                    "{:>4}. frame {:<5} skipped",
                    finished,
                    sheet.frame_label(photo_id).unwrap_or_default()
                );
            }
            Ok(Ok(_)) => {}
            Ok(Err(RecvError::Lagged(missed))) => {
                tracing::warn!(missed, "Missed scheduler events");
            }
            Ok(Err(RecvError::Closed)) => break,
            Err(_) => {
                tracing::warn!(
                    remaining = selected.len() - finished,
                    "Some selected photos never became visible"
                );
                break;
            }
        }
    }

    if let Some(dir) = &options.out_dir {
        println!("\nOverlays written to {}", dir.display());
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_config_summary(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = Config::default();
            config::validate_config(&config)?;
            println!("Default config:");
            print_config_summary(&config);
        }
    }

    Ok(())
}

fn print_config_summary(config: &Config) {
    println!("  Source: {}", config.source.kind);
    println!("  Metadata mode: {}", config.acquisition_mode());
    println!("  Annotations enabled: {}", config.annotations.enabled);
    println!(
        "    Selection fraction: {}",
        config.annotations.selection_fraction
    );
    println!("    Settle delay: {}ms", config.annotations.settle_delay_ms);
    println!(
        "    Mark kinds: {}",
        config
            .annotations
            .mark_kinds
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  Photos per row: {}", config.layout.photos_per_row);
}
