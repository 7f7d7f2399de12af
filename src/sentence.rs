//! Sentence-scoped event parsing: one pass over a session log, one
//! [`SentenceRecord`] per displayed sentence.
//!
//! The parser is a small state machine driven by classified log lines:
//!
//! ```text
//! Idle ──sentence id──▶ AwaitingOnset ──onset──▶ Active
//!                            ▲                     │
//!                            └──────offset─────────┘  (record emitted)
//! ```
//!
//! A sentence-id line resets the per-sentence accumulators from any state.
//! Fixation reports are consumed only while `Active`; the end-of-block
//! marker stops the pass immediately, and a sentence still open at that
//! point (or at end of file) is emitted flagged as truncated rather than
//! silently dropped.
use std::io::BufRead;

use anyhow::{bail, Context, Result};
use ndarray::{ArrayView3, Axis};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::asc::{LineClassifier, LogLine};
use crate::config::{EyeConfig, MalformedLinePolicy};
use crate::words::{SentenceLayout, WordBounds};

/// One fixation relative to its sentence's onset trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelFixation {
    /// Start time relative to sentence onset (ms); negative when the gaze
    /// settled before the onset trigger fired.
    pub start_ms: i64,
    pub duration_ms: i64,
    pub x: f32,
    pub y: f32,
}

/// The scan path and fixation timing for one displayed sentence.
///
/// `scan_path`, `fixation_durations` and `fixation_onsets_wrt_sentence_onset`
/// always have equal length: the i-th entries all describe the i-th located
/// fixation.  Fixations that landed on no word are absent from all three.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceRecord {
    /// 1-based sentence id from the trial-open message.
    pub sentence_id: u32,
    /// The displayed words, empty slots removed.
    pub sentence_material: Vec<String>,
    /// Word index fixated, per located fixation, in temporal order.
    pub scan_path: Vec<u32>,
    /// Fixation durations (ms), same order.
    pub fixation_durations: Vec<i64>,
    /// Fixation onsets relative to the sentence-onset trigger (ms).
    pub fixation_onsets_wrt_sentence_onset: Vec<i64>,
    /// True when the sentence never saw its offset trigger (end of block or
    /// end of file reached first).
    #[serde(default)]
    pub truncated: bool,
}

/// Re-align the first fixation to the sentence onset.
///
/// A participant staring at the pre-trial fixation box produces a first
/// fixation that started before the onset trigger, i.e. a negative relative
/// start.  Folding that negative offset into the duration and clamping the
/// start to zero preserves total elapsed fixation time while normalizing the
/// first reported onset.  No-op on an empty sequence or a non-negative first
/// start.
pub fn realign_first_fixation(fixations: &mut [RelFixation]) {
    if let Some(first) = fixations.first_mut() {
        if first.start_ms < 0 {
            first.duration_ms += first.start_ms;
            first.start_ms = 0;
        }
    }
}

#[derive(Debug, PartialEq)]
enum State {
    Idle,
    AwaitingOnset,
    Active,
}

struct OpenSentence {
    id: u32,
    trial: usize,
    material: Vec<String>,
    onset_ms: i64,
    fixations: Vec<RelFixation>,
    /// Set once an offset has emitted a record for this id; suppresses a
    /// spurious truncated record at end of input.
    finalized: bool,
}

/// Parse one session log into sentence records.
///
/// `word_coords` is the task's `[trials x words x 4]` coordinate tensor
/// (unscaled; the scale correction from `cfg` is applied here) and
/// `materials` the matching per-trial word tokens.  The reader is consumed
/// linearly, stopping at the end-of-block marker.
pub fn parse_session<R: BufRead>(
    reader: R,
    word_coords: ArrayView3<'_, f32>,
    materials: &[Vec<String>],
    cfg: &EyeConfig,
) -> Result<Vec<SentenceRecord>> {
    let classifier = LineClassifier::new(cfg)?;
    let n_trials = word_coords.len_of(Axis(0));

    let mut records = Vec::new();
    let mut state = State::Idle;
    let mut current: Option<OpenSentence> = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line.with_context(|| format!("reading session log line {line_no}"))?;

        match classifier.classify(&line) {
            LogLine::SentenceId(id) => {
                if let Some(prev) = current.as_ref() {
                    if !prev.finalized {
                        warn!(
                            sentence_id = prev.id,
                            "sentence replaced before its offset trigger, dropping"
                        );
                    }
                }
                let trial = (id as usize)
                    .checked_sub(1)
                    .filter(|&t| t < n_trials)
                    .with_context(|| {
                        format!("sentence id {id} outside bundle with {n_trials} trials (line {line_no})")
                    })?;
                let material = materials
                    .get(trial)
                    .map(|ws| ws.iter().filter(|w| !w.is_empty()).cloned().collect())
                    .unwrap_or_default();
                current = Some(OpenSentence {
                    id,
                    trial,
                    material,
                    onset_ms: 0,
                    fixations: Vec::new(),
                    finalized: false,
                });
                state = State::AwaitingOnset;
            }
            LogLine::Onset { time_ms } => {
                if state == State::AwaitingOnset {
                    if let Some(s) = current.as_mut() {
                        s.onset_ms = time_ms;
                        s.fixations.clear();
                        state = State::Active;
                    }
                }
            }
            LogLine::Fixation(f) => {
                if state == State::Active {
                    if let Some(s) = current.as_mut() {
                        s.fixations.push(RelFixation {
                            start_ms: f.start_ms - s.onset_ms,
                            duration_ms: f.duration_ms,
                            x: f.x,
                            y: f.y,
                        });
                    }
                }
            }
            LogLine::Offset => {
                if state == State::Active {
                    if let Some(s) = current.as_mut() {
                        records.push(finalize(s, word_coords, cfg, false));
                        s.finalized = true;
                        state = State::AwaitingOnset;
                    }
                }
            }
            LogLine::Malformed(kind) => match cfg.on_malformed {
                MalformedLinePolicy::Skip => {
                    warn!(line_no, kind, "skipping malformed log line");
                }
                MalformedLinePolicy::Abort => {
                    bail!("malformed {kind} line at session log line {line_no}");
                }
            },
            LogLine::EndOfBlock => break,
            LogLine::Other => {}
        }
    }

    // A sentence identified but never closed by an offset trigger.
    if let Some(s) = current.as_mut() {
        if !s.finalized {
            warn!(sentence_id = s.id, "sentence open at end of input, emitting truncated record");
            records.push(finalize(s, word_coords, cfg, true));
        }
    }

    Ok(records)
}

/// Close out one sentence: realign, locate every fixation, drop unlocated
/// ones, emit the record.  Ambiguous word geometry degrades to a record
/// with empty sequences instead of failing the session.
fn finalize(
    s: &mut OpenSentence,
    word_coords: ArrayView3<'_, f32>,
    cfg: &EyeConfig,
    truncated: bool,
) -> SentenceRecord {
    let mut record = SentenceRecord {
        sentence_id: s.id,
        sentence_material: s.material.clone(),
        scan_path: Vec::new(),
        fixation_durations: Vec::new(),
        fixation_onsets_wrt_sentence_onset: Vec::new(),
        truncated,
    };

    realign_first_fixation(&mut s.fixations);

    let layout =
        SentenceLayout::from_coords(word_coords.index_axis(Axis(0), s.trial), cfg.coord_scale);
    let bounds = match WordBounds::resolve(&layout, cfg.vertical_tolerance) {
        Ok(b) => b,
        Err(e) => {
            warn!(sentence_id = s.id, error = %e, "cannot locate fixations, emitting empty record");
            return record;
        }
    };

    for f in &s.fixations {
        if let Some(word) = bounds.locate(f.x, f.y) {
            record.scan_path.push(word as u32);
            record.fixation_durations.push(f.duration_ms);
            record
                .fixation_onsets_wrt_sentence_onset
                .push(f.start_ms);
        }
    }
    record
}
