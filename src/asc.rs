//! Session-log line model for EyeLink ASCII (`.asc`) exports.
//!
//! The log is line-oriented.  Four line kinds matter here:
//! - a trial-open message embedding the sentence id (`... Sentence_ 17`),
//! - onset / offset trigger messages carrying a device timestamp,
//! - fixation reports (`EFIX ...`) with six numeric fields,
//! - a literal end-of-block marker.
//!
//! Everything else (saccades, blinks, raw samples) is passed through as
//! [`LogLine::Other`].
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

use crate::config::EyeConfig;

/// All numeric tokens on a line, integer or decimal (sign-less, as the
/// tracker writes them).
static NUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.?\d*").unwrap());

/// One fixation report from the tracker's fixation-detection stage.
///
/// Times are absolute device-clock milliseconds; coordinates are screen
/// pixels averaged over the fixation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fixation {
    pub start_ms: i64,
    pub end_ms: i64,
    pub duration_ms: i64,
    pub x: f32,
    pub y: f32,
    pub pupil: f32,
}

/// A classified session-log line.
#[derive(Debug, Clone, PartialEq)]
pub enum LogLine {
    /// Trial-open message with the 1-based sentence id.
    SentenceId(u32),
    /// Sentence-onset trigger with its device timestamp (ms).
    Onset { time_ms: i64 },
    /// Sentence-offset trigger.
    Offset,
    /// Fixation report.
    Fixation(Fixation),
    /// End-of-block marker; nothing after it is ever read.
    EndOfBlock,
    /// A recognized line whose numeric fields failed to parse; the payload
    /// names the field kind for the warning/error message.
    Malformed(&'static str),
    /// Any line this pipeline does not consume.
    Other,
}

/// Classifies log lines against one session's configured marker tokens.
pub struct LineClassifier {
    sentence_re: Regex,
    onset_token: String,
    offset_token: String,
    end_of_block: String,
}

impl LineClassifier {
    pub fn new(cfg: &EyeConfig) -> Result<Self> {
        let sentence_re = Regex::new(&format!(r"{}\s*(\d+)", regex::escape(&cfg.sentence_marker)))
            .context("compiling sentence-marker pattern")?;
        Ok(Self {
            sentence_re,
            onset_token: cfg.onset_token.clone(),
            offset_token: cfg.offset_token.clone(),
            end_of_block: cfg.end_of_block.clone(),
        })
    }

    /// Classify one line.  Check order matches consumption priority:
    /// sentence id, onset, offset, fixation report, end of block.
    pub fn classify(&self, line: &str) -> LogLine {
        if let Some(caps) = self.sentence_re.captures(line) {
            return match caps[1].parse::<u32>() {
                Ok(id) => LogLine::SentenceId(id),
                Err(_) => LogLine::Malformed("sentence id"),
            };
        }
        if line.contains(&self.onset_token) {
            return match first_int(line) {
                Some(t) => LogLine::Onset { time_ms: t },
                None => LogLine::Malformed("onset timestamp"),
            };
        }
        if line.contains(&self.offset_token) {
            return LogLine::Offset;
        }
        if line.contains("EFIX") {
            return match parse_efix(line) {
                Some(f) => LogLine::Fixation(f),
                None => LogLine::Malformed("fixation report"),
            };
        }
        if line.contains(&self.end_of_block) {
            return LogLine::EndOfBlock;
        }
        LogLine::Other
    }
}

fn first_int(line: &str) -> Option<i64> {
    NUM_RE.find(line)?.as_str().parse().ok()
}

/// Parse an `EFIX` line.  Field order after the eye marker:
/// `start end duration x y pupil`.
fn parse_efix(line: &str) -> Option<Fixation> {
    let mut it = NUM_RE.find_iter(line);
    let start_ms: i64 = it.next()?.as_str().parse().ok()?;
    let end_ms: i64 = it.next()?.as_str().parse().ok()?;
    let duration_ms: i64 = it.next()?.as_str().parse().ok()?;
    let x: f32 = it.next()?.as_str().parse().ok()?;
    let y: f32 = it.next()?.as_str().parse().ok()?;
    let pupil: f32 = it.next()?.as_str().parse().ok()?;
    Some(Fixation { start_ms, end_ms, duration_ms, x, y, pupil })
}
