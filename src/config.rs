//! Pipeline configuration.
//!
//! [`EyeConfig`] holds every tunable for the eye-tracking side (session-log
//! tokens, word-location tolerances), [`MegConfig`] every tunable for the MEG
//! epoching side (trigger codes).  All fields have defaults matching the
//! acquisition setup of the reading study, so `Default::default()` reproduces
//! the recorded sessions as-is.

/// What to do with a recognized log line whose numeric fields fail to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedLinePolicy {
    /// Skip the line with a warning carrying the line number. Default.
    #[default]
    Skip,
    /// Abort the whole session with an error naming the line.
    Abort,
}

/// Configuration for parsing one eye-tracker session log.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use riftprep::EyeConfig;
///
/// let cfg = EyeConfig {
///     vertical_tolerance: 120.0,   // tighter than the default 200 px
///     ..EyeConfig::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct EyeConfig {
    /// Token that opens a trial and carries the sentence id, e.g. the log
    /// line `MSG 55451900 Sentence_ 17`.  The id is the first integer after
    /// this token.
    ///
    /// Default: `"Sentence_"`.
    pub sentence_marker: String,

    /// Token marking sentence onset.  The first integer on the line is the
    /// device timestamp (ms) used as the sentence's time zero.
    ///
    /// Default: `"Trigger_4"`.
    pub onset_token: String,

    /// Token marking sentence offset; finalizes the current sentence.
    ///
    /// Default: `"Trigger_8"`.
    pub offset_token: String,

    /// Literal marker after which the rest of the log is never read.
    ///
    /// Default: `"end of block"`.
    pub end_of_block: String,

    /// Tolerated vertical error when locating a fixation on a word, in
    /// pixels.  Word regions are padded by this amount above and below to
    /// absorb gaze noise and text-line jitter.
    ///
    /// Default: `200.0` px.
    pub vertical_tolerance: f32,

    /// Linear factor applied to word bounding boxes on load.
    ///
    /// The tagging display renders each sentence in four quadrants, so the
    /// presentation software reports coordinates at half the tracker's
    /// screen resolution.  Doubling reconciles the two coordinate systems.
    ///
    /// Default: `2.0`.
    pub coord_scale: f32,

    /// Policy for recognized lines with unparseable numeric fields.
    ///
    /// Default: [`MalformedLinePolicy::Skip`].
    pub on_malformed: MalformedLinePolicy,
}

impl Default for EyeConfig {
    fn default() -> Self {
        Self {
            sentence_marker: "Sentence_".into(),
            onset_token: "Trigger_4".into(),
            offset_token: "Trigger_8".into(),
            end_of_block: "end of block".into(),
            vertical_tolerance: 200.0,
            coord_scale: 2.0,
            on_malformed: MalformedLinePolicy::Skip,
        }
    }
}

/// Configuration for epoching one continuous MEG recording.
#[derive(Debug, Clone)]
pub struct MegConfig {
    /// Trigger code marking sentence onset.
    ///
    /// Default: `4`.
    pub onset_code: i32,

    /// Trigger code marking sentence offset.
    ///
    /// Default: `8`.
    pub offset_code: i32,
}

impl Default for MegConfig {
    fn default() -> Self {
        Self { onset_code: 4, offset_code: 8 }
    }
}
