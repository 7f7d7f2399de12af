//! Batch MEG epoching: every session under a data root → one epoch
//! archive each.
//!
//! Expects `<root>/<subject>/<task>/` folders containing a
//! `*_MEG.safetensors` session (continuous `[T, C]` data, trigger channel,
//! label lists).  Epoch slabs are decoded lazily per trigger pair, so peak
//! memory stays bounded on long recordings.
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, warn};

use riftprep::{pair_triggers, write_epoch_archive, ChannelSet, MegConfig, MegSession};

#[derive(Parser)]
#[command(name = "megepochs", about = "Cut continuous MEG recordings into sentence epochs")]
struct Args {
    /// Data root containing one folder per subject.
    #[arg(long)]
    data: PathBuf,

    /// Output directory for the epoch archives.
    #[arg(long)]
    out: PathBuf,

    /// Sentence-onset trigger code.
    #[arg(long, default_value_t = 4)]
    onset: i32,

    /// Sentence-offset trigger code.
    #[arg(long, default_value_t = 8)]
    offset: i32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let cfg = MegConfig { onset_code: args.onset, offset_code: args.offset };

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating output directory {}", args.out.display()))?;

    for subject_dir in sorted_dirs(&args.data)? {
        let subject = dir_name(&subject_dir);
        println!("Processing subject: {subject}");

        for task_dir in sorted_dirs(&subject_dir)? {
            let task = dir_name(&task_dir);
            let out_file = args.out.join(format!("{subject}_{task}_epochs.safetensors"));

            match process_session(&task_dir, &out_file, &cfg) {
                Ok(n) => println!("  {task}: {n} epochs → {}", out_file.display()),
                Err(e) => error!(%subject, %task, error = ?e, "session failed, continuing"),
            }
        }
    }

    Ok(())
}

fn process_session(task_dir: &Path, out_file: &Path, cfg: &MegConfig) -> Result<usize> {
    let Some(meg_file) = find_with_suffix(task_dir, "_MEG.safetensors")? else {
        warn!(dir = %task_dir.display(), "no MEG session, skipping task");
        return Ok(0);
    };

    let session = MegSession::load(&meg_file)?;
    let pairs = pair_triggers(&session.triggers, cfg.onset_code, cfg.offset_code)?;
    let chans = ChannelSet::resolve(&session.all_labels, &session.valid_labels);
    if chans.is_empty() {
        bail!("no whitelisted channel present in the recording");
    }

    // Decode one slab at a time; out-of-range pairs are skipped, not fatal.
    let mut epochs = Vec::with_capacity(pairs.len());
    for (ordinal, &(on, off)) in pairs.iter().enumerate() {
        if on < 0 || off >= session.n_samples() as i64 {
            warn!(
                epoch = ordinal,
                onset = on,
                offset = off,
                n_samples = session.n_samples(),
                "epoch bounds outside recording, skipping"
            );
            continue;
        }
        epochs.push(session.epoch_slab((on, off), &chans.indices)?);
    }

    write_epoch_archive(&epochs, &chans.labels, out_file)?;
    Ok(epochs.len())
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
