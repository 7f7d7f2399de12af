//! # riftprep — offline preprocessing for a frequency-tagging reading study
//!
//! `riftprep` turns raw neuroscience experiment recordings — EyeLink ASCII
//! session logs, continuous MEG sample matrices, per-task word-coordinate
//! bundles — into aligned per-sentence datasets.  All inputs are
//! pre-recorded; processing is a sequential, single-threaded batch pass per
//! subject × task.
//!
//! ## Pipeline overview
//!
//! ```text
//! eye-tracking side                          MEG side
//! ─────────────────                          ────────
//! <task>_bundle.safetensors                  <session>_MEG.safetensors
//!   │  word boxes + materials                  │  [T, C] data + triggers + labels
//! <task>_ET.asc                                │
//!   │                                          ├─ triggers::pair_triggers()
//!   ├─ asc::LineClassifier     line kinds      │    onset/offset → validated bounds
//!   ├─ sentence::parse_session                 ├─ channels::ChannelSet::resolve()
//!   │    state machine over the log            │    whitelist → column indices
//!   │    ├─ words::WordBounds::resolve()       ├─ epoch::extract_epochs()
//!   │    │    gap-based word regions           │    one [len, C'] slab per pair
//!   │    └─ words::WordBounds::locate()        │
//!   │         fixation → word index            └─→ <session>_epochs.safetensors
//!   └─→ <sub>_<task>_eye.json
//!         scan path + fixation timing per sentence
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//! use std::path::Path;
//! use riftprep::{parse_session, EyeConfig, TaskBundle};
//!
//! let bundle = TaskBundle::load(Path::new("sub-001_task-semantic_bundle.safetensors")).unwrap();
//! let log = BufReader::new(File::open("sub-001_task-semantic_ET.asc").unwrap());
//!
//! let cfg = EyeConfig::default();
//! let records = parse_session(log, bundle.word_coords.view(), &bundle.materials, &cfg).unwrap();
//!
//! for r in &records {
//!     println!("sentence {}: {} located fixations", r.sentence_id, r.scan_path.len());
//! }
//! ```
//!
//! ## Running the MEG side
//!
//! ```no_run
//! use std::path::Path;
//! use riftprep::{pair_triggers, ChannelSet, MegConfig, MegSession};
//!
//! let session = MegSession::load(Path::new("sub-001_task-semantic_MEG.safetensors")).unwrap();
//! let cfg = MegConfig::default();
//!
//! let pairs = pair_triggers(&session.triggers, cfg.onset_code, cfg.offset_code).unwrap();
//! let chans = ChannelSet::resolve(&session.all_labels, &session.valid_labels);
//!
//! for (i, &pair) in pairs.iter().enumerate() {
//!     let epoch = session.epoch_slab(pair, &chans.indices).unwrap();
//!     println!("epoch {i}: shape {:?}", epoch.dim());
//! }
//! ```

pub mod asc;
pub mod channels;
pub mod config;
pub mod epoch;
pub mod io;
pub mod sentence;
pub mod triggers;
pub mod words;

// ── Crate-root re-exports ─────────────────────────────────────────────────
//
// Everything a downstream user is likely to need is available directly as
// `riftprep::Foo` without having to know the internal module layout.

// config
pub use config::{EyeConfig, MalformedLinePolicy, MegConfig};

// eye-tracking side
pub use asc::{Fixation, LineClassifier, LogLine};
pub use sentence::{parse_session, realign_first_fixation, RelFixation, SentenceRecord};
pub use words::{SentenceLayout, WordBounds, WordBox};

// MEG side
pub use channels::ChannelSet;
pub use epoch::extract_epochs;
pub use triggers::{pair_triggers, TriggerEvent};

// io — safetensors + JSON helpers
pub use io::{
    read_epoch_archive, read_sentence_records, write_epoch_archive, write_sentence_records,
    write_task_bundle, MegSession, StWriter, TaskBundle,
};
