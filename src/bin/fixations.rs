//! Batch fixation extraction: every subject × task under a data root →
//! one JSON file of sentence records each.
//!
//! Expects `<root>/<subject>/<task>/` folders containing a
//! `*_bundle.safetensors` coordinate/material bundle and a `*_ET.asc`
//! session log.  A failing or incomplete session is logged and skipped;
//! the batch always runs to the end.
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, warn};

use riftprep::{parse_session, write_sentence_records, EyeConfig, MalformedLinePolicy, TaskBundle};

#[derive(Parser)]
#[command(name = "fixations", about = "Align eye-tracker fixations to sentence words")]
struct Args {
    /// Data root containing one folder per subject.
    #[arg(long)]
    data: PathBuf,

    /// Output directory for the per-session JSON files.
    #[arg(long)]
    out: PathBuf,

    /// Sentence-onset trigger token.
    #[arg(long, default_value = "Trigger_4")]
    onset: String,

    /// Sentence-offset trigger token.
    #[arg(long, default_value = "Trigger_8")]
    offset: String,

    /// Vertical tolerance for word location, pixels.
    #[arg(long, default_value_t = 200.0)]
    vertical_tolerance: f32,

    /// Scale factor from presentation to tracker coordinates.
    #[arg(long, default_value_t = 2.0)]
    coord_scale: f32,

    /// Abort a session on a malformed log line instead of skipping it.
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let cfg = EyeConfig {
        onset_token: args.onset.clone(),
        offset_token: args.offset.clone(),
        vertical_tolerance: args.vertical_tolerance,
        coord_scale: args.coord_scale,
        on_malformed: if args.strict {
            MalformedLinePolicy::Abort
        } else {
            MalformedLinePolicy::Skip
        },
        ..EyeConfig::default()
    };

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating output directory {}", args.out.display()))?;

    for subject_dir in sorted_dirs(&args.data)? {
        let subject = dir_name(&subject_dir);
        println!("Processing subject: {subject}");

        for task_dir in sorted_dirs(&subject_dir)? {
            let task = dir_name(&task_dir);
            let out_file = args.out.join(format!("{subject}_{task}_eye.json"));

            match process_task(&task_dir, &out_file, &cfg) {
                Ok(n) => println!("  {task}: {n} sentences → {}", out_file.display()),
                // One bad session never stops the batch.
                Err(e) => error!(%subject, %task, error = ?e, "session failed, continuing"),
            }
        }
    }

    Ok(())
}

fn process_task(task_dir: &Path, out_file: &Path, cfg: &EyeConfig) -> Result<usize> {
    let Some(bundle_file) = find_with_suffix(task_dir, "_bundle.safetensors")? else {
        warn!(dir = %task_dir.display(), "no coordinate bundle, skipping task");
        return Ok(0);
    };
    let Some(asc_file) = find_with_suffix(task_dir, "_ET.asc")? else {
        warn!(dir = %task_dir.display(), "no session log, skipping task");
        return Ok(0);
    };

    let bundle = TaskBundle::load(&bundle_file)?;
    let log = BufReader::new(
        File::open(&asc_file).with_context(|| format!("opening {}", asc_file.display()))?,
    );
    let records = parse_session(log, bundle.word_coords.view(), &bundle.materials, cfg)?;
    write_sentence_records(&records, out_file)?;
    Ok(records.len())
}

fn sorted_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(root)
        .with_context(|| format!("listing {}", root.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn dir_name(path: &Path) -> String {
    path.file_name().unwrap_or_default().to_string_lossy().into_owned()
}

fn find_with_suffix(dir: &Path, suffix: &str) -> Result<Option<PathBuf>> {
    for entry in std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        if path
            .file_name()
            .map(|n| n.to_string_lossy().ends_with(suffix))
            .unwrap_or(false)
        {
            return Ok(Some(path));
        }
    }
    Ok(None)
}
