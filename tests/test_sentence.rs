mod common;
use common::{session_log, three_word_coords, three_word_materials};

use std::io::BufReader;

use ndarray::Array3;
use riftprep::{parse_session, EyeConfig, MalformedLinePolicy};

fn test_cfg() -> EyeConfig {
    // Fixture coordinates are already in tracker pixels.
    EyeConfig { coord_scale: 1.0, ..EyeConfig::default() }
}

#[test]
fn session_yields_one_record_per_closed_sentence() {
    let coords = three_word_coords(3);
    let records = parse_session(
        BufReader::new(session_log().as_bytes()),
        coords.view(),
        &three_word_materials(3),
        &test_cfg(),
    )
    .unwrap();

    // Sentence 3 sits after the end-of-block marker: never read.
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].sentence_id, 1);
    assert_eq!(records[1].sentence_id, 2);
    assert!(records.iter().all(|r| !r.truncated));
}

#[test]
fn sequences_share_length_and_order() {
    let coords = three_word_coords(3);
    let records = parse_session(
        BufReader::new(session_log().as_bytes()),
        coords.view(),
        &three_word_materials(3),
        &test_cfg(),
    )
    .unwrap();

    for r in &records {
        assert_eq!(r.scan_path.len(), r.fixation_durations.len(), "sentence {}", r.sentence_id);
        assert_eq!(
            r.scan_path.len(),
            r.fixation_onsets_wrt_sentence_onset.len(),
            "sentence {}",
            r.sentence_id
        );
    }

    // Sentence 1: pre-onset fixation realigned (start -50 folded into the
    // 130 ms duration), off-word fixation dropped.
    let r = &records[0];
    assert_eq!(r.scan_path, vec![0, 1]);
    assert_eq!(r.fixation_durations, vec![80, 150]);
    assert_eq!(r.fixation_onsets_wrt_sentence_onset, vec![0, 100]);

    // Sentence 2: one fixation on word 2, 50 ms after onset.
    let r = &records[1];
    assert_eq!(r.scan_path, vec![2]);
    assert_eq!(r.fixation_durations, vec![100]);
    assert_eq!(r.fixation_onsets_wrt_sentence_onset, vec![50]);
}

#[test]
fn material_is_attached_to_each_record() {
    let coords = three_word_coords(3);
    let records = parse_session(
        BufReader::new(session_log().as_bytes()),
        coords.view(),
        &three_word_materials(3),
        &test_cfg(),
    )
    .unwrap();
    assert_eq!(records[0].sentence_material, vec!["The", "quick", "fox"]);
}

#[test]
fn fixations_outside_active_sentence_are_ignored() {
    let log = "\
EFIX R   900\t950\t50\t  120.0\t  315.0\t  900
MSG\t1000 Sentence_ 1
EFIX R   1010\t1060\t50\t  120.0\t  315.0\t  900
MSG\t1100 Trigger_4
MSG\t1600 Trigger_8
";
    let coords = three_word_coords(1);
    let records = parse_session(
        BufReader::new(log.as_bytes()),
        coords.view(),
        &three_word_materials(1),
        &test_cfg(),
    )
    .unwrap();
    // Both fixations arrived before the onset trigger: empty but valid.
    assert_eq!(records.len(), 1);
    assert!(records[0].scan_path.is_empty());
    assert!(records[0].fixation_durations.is_empty());
    assert!(records[0].fixation_onsets_wrt_sentence_onset.is_empty());
}

#[test]
fn empty_sentence_does_not_crash() {
    let log = "\
MSG\t1000 Sentence_ 1
MSG\t1100 Trigger_4
MSG\t1600 Trigger_8
";
    let coords = three_word_coords(1);
    let records = parse_session(
        BufReader::new(log.as_bytes()),
        coords.view(),
        &three_word_materials(1),
        &test_cfg(),
    )
    .unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].scan_path.is_empty());
}

#[test]
fn open_sentence_at_eof_is_flagged_truncated() {
    let log = "\
MSG\t1000 Sentence_ 1
MSG\t1100 Trigger_4
EFIX R   1200\t1350\t150\t  180.0\t  310.0\t  905
";
    let coords = three_word_coords(1);
    let records = parse_session(
        BufReader::new(log.as_bytes()),
        coords.view(),
        &three_word_materials(1),
        &test_cfg(),
    )
    .unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].truncated);
    assert_eq!(records[0].scan_path, vec![1]);
}

#[test]
fn sentence_id_line_resets_an_open_sentence() {
    // Sentence 1 never closes; sentence 2 does. Only sentence 2 gets a
    // complete record, and sentence 1's fixations do not leak into it.
    let log = "\
MSG\t1000 Sentence_ 1
MSG\t1100 Trigger_4
EFIX R   1200\t1350\t150\t  180.0\t  310.0\t  905
MSG\t1700 Sentence_ 2
MSG\t1800 Trigger_4
EFIX R   1850\t1950\t100\t  250.0\t  320.0\t  910
MSG\t2100 Trigger_8
";
    let coords = three_word_coords(2);
    let records = parse_session(
        BufReader::new(log.as_bytes()),
        coords.view(),
        &three_word_materials(2),
        &test_cfg(),
    )
    .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].sentence_id, 2);
    assert_eq!(records[0].scan_path, vec![2]);
}

#[test]
fn ambiguous_geometry_yields_empty_record() {
    // Single real word: the inter-word gap is unmeasurable.
    let mut coords = Array3::<f32>::zeros((1, 3, 4));
    coords[[0, 0, 0]] = 100.0;
    coords[[0, 0, 1]] = 300.0;
    coords[[0, 0, 2]] = 140.0;
    coords[[0, 0, 3]] = 330.0;

    let log = "\
MSG\t1000 Sentence_ 1
MSG\t1100 Trigger_4
EFIX R   1200\t1350\t150\t  120.0\t  315.0\t  905
MSG\t1600 Trigger_8
";
    let records = parse_session(
        BufReader::new(log.as_bytes()),
        coords.view(),
        &[vec!["Word".to_string()]],
        &test_cfg(),
    )
    .unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].scan_path.is_empty());
    assert_eq!(records[0].sentence_material, vec!["Word"]);
}

#[test]
fn malformed_line_skipped_by_default() {
    let log = "\
MSG\t1000 Sentence_ 1
MSG\t1100 Trigger_4
EFIX R garbage fields
EFIX R   1200\t1350\t150\t  180.0\t  310.0\t  905
MSG\t1600 Trigger_8
";
    let coords = three_word_coords(1);
    let records = parse_session(
        BufReader::new(log.as_bytes()),
        coords.view(),
        &three_word_materials(1),
        &test_cfg(),
    )
    .unwrap();
    assert_eq!(records[0].scan_path, vec![1]);
}

#[test]
fn malformed_line_aborts_in_strict_mode() {
    let log = "\
MSG\t1000 Sentence_ 1
MSG\t1100 Trigger_4
EFIX R garbage fields
MSG\t1600 Trigger_8
";
    let cfg = EyeConfig { on_malformed: MalformedLinePolicy::Abort, ..test_cfg() };
    let coords = three_word_coords(1);
    let err = parse_session(
        BufReader::new(log.as_bytes()),
        coords.view(),
        &three_word_materials(1),
        &cfg,
    )
    .unwrap_err();
    assert!(err.to_string().contains("line 3"), "got: {err}");
}

#[test]
fn sentence_id_beyond_bundle_fails_with_context() {
    let log = "MSG\t1000 Sentence_ 9\n";
    let coords = three_word_coords(2);
    let err = parse_session(
        BufReader::new(log.as_bytes()),
        coords.view(),
        &three_word_materials(2),
        &test_cfg(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("sentence id 9"), "got: {err}");
}

#[test]
fn coordinate_scale_halved_bundle_locates_the_same() {
    // Bundle at presentation resolution, fixations at tracker resolution.
    let coords = three_word_coords(1).mapv(|v| v / 2.0);
    let log = "\
MSG\t1000 Sentence_ 1
MSG\t1100 Trigger_4
EFIX R   1200\t1350\t150\t  180.0\t  310.0\t  905
MSG\t1600 Trigger_8
";
    let cfg = EyeConfig::default(); // coord_scale = 2.0
    let records = parse_session(
        BufReader::new(log.as_bytes()),
        coords.view(),
        &three_word_materials(1),
        &cfg,
    )
    .unwrap();
    assert_eq!(records[0].scan_path, vec![1]);
}
