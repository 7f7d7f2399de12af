/// Shared fixture builders: a synthetic session log and matching word
/// geometry for a three-word sentence layout.
use ndarray::Array3;
use std::path::PathBuf;

/// Three words on one line per trial, gap 20 px:
/// word 0 `[100, 300, 140, 330]`, word 1 `[160, 300, 220, 330]`,
/// word 2 `[240, 300, 310, 330]`.  With the measured gap the x regions are
/// `(80, 140)`, `(140, 220)`, `(220, 310)`.
#[allow(unused)]
pub fn three_word_coords(n_trials: usize) -> Array3<f32> {
    let row = [
        [100.0, 300.0, 140.0, 330.0],
        [160.0, 300.0, 220.0, 330.0],
        [240.0, 300.0, 310.0, 330.0],
    ];
    Array3::from_shape_fn((n_trials, 3, 4), |(_, w, k)| row[w][k])
}

#[allow(unused)]
pub fn three_word_materials(n_trials: usize) -> Vec<Vec<String>> {
    (0..n_trials)
        .map(|_| vec!["The".to_string(), "quick".to_string(), "fox".to_string()])
        .collect()
}

/// A two-sentence session: sentence 1 has a pre-onset first fixation and an
/// off-word third fixation, sentence 2 a single fixation on word 2.  A third
/// sentence after the end-of-block marker must never be read.
#[allow(unused)]
pub fn session_log() -> String {
    "\
** CONVERTED FROM tracker.edf
MSG\t1000 Sentence_ 1
MSG\t1100 Trigger_4
EFIX R   1050\t1180\t130\t  120.0\t  315.0\t  900
EFIX R   1200\t1350\t150\t  180.0\t  310.0\t  905
EFIX R   1400\t1500\t100\t  700.0\t  315.0\t  910
MSG\t1600 Trigger_8
MSG\t1700 Sentence_ 2
MSG\t1800 Trigger_4
EFIX R   1850\t1950\t100\t  250.0\t  320.0\t  910
MSG\t2100 Trigger_8
MSG\t2200 end of block
MSG\t2300 Sentence_ 3
"
    .to_string()
}

/// Unique temp path for one test; the OS temp dir is shared across tests
/// running in parallel.
#[allow(unused)]
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("riftprep_{name}_{}", std::process::id()))
}
