//! Animation (.anim) command implementations

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;

use rox_import::import_animations;
use rox_model::{Animation, MaterialRef, Model, validate_animation};

use super::model::print_report;
use crate::utils::{
    add_table_row, create_spinner, create_table, format_bytes, format_seconds, unique_file_stem,
};

#[derive(Subcommand)]
pub enum AnimCommands {
    /// Import every clip of a glTF scene as animation files
    Import {
        /// Source glTF (.gltf or .glb) file
        source: PathBuf,

        /// Directory receiving one .anim file per clip
        output_dir: PathBuf,
    },

    /// Display information about an animation file
    Info {
        /// Path to the animation file
        file: PathBuf,

        /// Show per-track details
        #[arg(short, long)]
        detailed: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check an animation file for structural problems
    Validate {
        /// Path to the animation file
        file: PathBuf,

        /// Model the animation drives; its bone count must match the track count
        #[arg(short, long)]
        model: Option<PathBuf>,
    },
}

pub fn execute(cmd: AnimCommands) -> Result<()> {
    match cmd {
        AnimCommands::Import { source, output_dir } => handle_import(&source, &output_dir),
        AnimCommands::Info {
            file,
            detailed,
            json,
        } => handle_info(&file, detailed, json),
        AnimCommands::Validate { file, model } => handle_validate(&file, model.as_deref()),
    }
}

fn load_animation(file: &Path) -> Result<Animation> {
    Animation::load(file)
        .with_context(|| format!("Failed to load animation file: {}", file.display()))
}

fn handle_import(source: &Path, output_dir: &Path) -> Result<()> {
    let spinner = create_spinner(&format!("Importing animations from {}...", source.display()));
    let animations = import_animations(source)
        .with_context(|| format!("Failed to import {}", source.display()));
    spinner.finish_and_clear();
    let animations = animations?;

    if animations.is_empty() {
        println!("No animations found in {}", source.display());
        return Ok(());
    }

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut table = create_table(&["Clip", "File", "Tracks", "Keyframes", "Duration"]);
    let mut taken = HashSet::new();
    for (name, animation) in &animations {
        let stem = unique_file_stem(name, &mut taken);
        let path = output_dir.join(format!("{stem}.anim"));
        animation
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        add_table_row(
            &mut table,
            vec![
                name.clone(),
                path.display().to_string(),
                animation.num_tracks().to_string(),
                animation.keyframe_count().to_string(),
                format_seconds(animation.duration()),
            ],
        );
    }
    table.printstd();
    println!("\n✓ Wrote {} animation(s)", animations.len());
    Ok(())
}

#[derive(Serialize)]
struct AnimationSummary {
    name: String,
    file_size: u64,
    duration: f32,
    keyframes: usize,
    tracks: Vec<TrackSummary>,
}

#[derive(Serialize)]
struct TrackSummary {
    keyframes: usize,
    start: f32,
    end: f32,
    identity: bool,
}

impl AnimationSummary {
    fn new(animation: &Animation, file_size: u64) -> Self {
        Self {
            name: animation.name.clone(),
            file_size,
            duration: animation.duration(),
            keyframes: animation.keyframe_count(),
            tracks: animation
                .bone_animations
                .iter()
                .map(|track| TrackSummary {
                    keyframes: track.keyframes.len(),
                    start: track.keyframes.first().map_or(0.0, |k| k.time),
                    end: track.duration(),
                    identity: track.is_identity(),
                })
                .collect(),
        }
    }
}

fn handle_info(file: &Path, detailed: bool, json: bool) -> Result<()> {
    let animation = load_animation(file)?;
    let file_size = std::fs::metadata(file)?.len();
    let summary = AnimationSummary::new(&animation, file_size);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let identity_tracks = summary.tracks.iter().filter(|t| t.identity).count();

    println!("Animation Information");
    println!("=====================");
    println!();
    println!("Name:      {}", summary.name);
    println!("File size: {}", format_bytes(summary.file_size));
    println!("Duration:  {}", format_seconds(summary.duration));
    println!(
        "Tracks:    {} ({} at rest)",
        summary.tracks.len(),
        identity_tracks
    );
    println!("Keyframes: {}", summary.keyframes);

    if detailed && !summary.tracks.is_empty() {
        println!();
        let mut table = create_table(&["Track", "Keyframes", "Start", "End", "At Rest"]);
        for (index, track) in summary.tracks.iter().enumerate() {
            add_table_row(
                &mut table,
                vec![
                    index.to_string(),
                    track.keyframes.to_string(),
                    format_seconds(track.start),
                    format_seconds(track.end),
                    if track.identity { "yes" } else { "no" }.to_string(),
                ],
            );
        }
        table.printstd();
    }

    Ok(())
}

fn handle_validate(file: &Path, model: Option<&Path>) -> Result<()> {
    println!("Validating animation file: {}", file.display());

    let animation = match Animation::load(file) {
        Ok(animation) => animation,
        Err(e) => {
            println!("✗ Failed to load animation file: {e}");
            return Err(e.into());
        }
    };
    let model = model
        .map(|path| {
            Model::load(path, MaterialRef::default())
                .with_context(|| format!("Failed to load model file: {}", path.display()))
        })
        .transpose()?;

    let report = validate_animation(&animation, model.as_ref());
    print_report(&report.errors, &report.warnings);

    if report.has_errors() {
        anyhow::bail!(
            "Animation validation failed with {} error(s)",
            report.error_count()
        )
    }
    println!("✓ Animation file is valid");
    Ok(())
}
