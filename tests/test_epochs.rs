use ndarray::Array2;
use riftprep::{extract_epochs, pair_triggers, ChannelSet, TriggerEvent};

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Trigger stream in acquisition order, 1-based sample indices.
fn stream(pairs: &[(i64, i64)]) -> Vec<TriggerEvent> {
    let mut ev = Vec::new();
    for &(on, off) in pairs {
        ev.push(TriggerEvent { code: 4, sample: on });
        ev.push(TriggerEvent { code: 8, sample: off });
    }
    ev
}

#[test]
fn two_pairs_on_1000_samples_give_expected_shapes() {
    // Onsets [100, 500], offsets [300, 900] (0-based) on a 1000 x 4 matrix
    // with a 3-channel whitelist: epochs [201 x 3] and [401 x 3].
    let data = Array2::from_shape_fn((1000, 4), |(t, c)| (t * 4 + c) as f32);
    let events = stream(&[(101, 301), (501, 901)]);
    let pairs = pair_triggers(&events, 4, 8).unwrap();
    assert_eq!(pairs, vec![(100, 300), (500, 900)]);

    let all = labels(&["MEG001", "MEG002", "EOG001", "MEG003"]);
    let valid = labels(&["MEG001", "MEG002", "MEG003"]);
    let chans = ChannelSet::resolve(&all, &valid);
    assert_eq!(chans.indices, vec![0, 1, 3]);

    let epochs = extract_epochs(data.view(), &pairs, &chans.indices);
    assert_eq!(epochs.len(), 2);
    assert_eq!(epochs[0].dim(), (201, 3));
    assert_eq!(epochs[1].dim(), (401, 3));

    // First epoch starts at sample 100; the EOG column is gone.
    assert_eq!(epochs[0][[0, 0]], 400.0);
    assert_eq!(epochs[0][[0, 2]], 403.0);
}

#[test]
fn invalid_bounds_shorten_the_result_without_failing() {
    let data = Array2::<f32>::zeros((200, 2));
    let events = stream(&[(11, 51), (151, 251)]); // second offset beyond T
    let pairs = pair_triggers(&events, 4, 8).unwrap();
    let epochs = extract_epochs(data.view(), &pairs, &[0, 1]);
    assert_eq!(epochs.len(), 1);
    assert_eq!(epochs[0].nrows(), 41);
}

#[test]
fn mismatched_counts_fail_the_session() {
    let events = vec![
        TriggerEvent { code: 4, sample: 100 },
        TriggerEvent { code: 8, sample: 200 },
        TriggerEvent { code: 4, sample: 300 },
    ];
    let err = pair_triggers(&events, 4, 8).unwrap_err();
    assert!(err.to_string().contains("mismatched trigger counts"), "got: {err}");
}

#[test]
fn unrelated_codes_are_ignored_by_pairing() {
    let events = vec![
        TriggerEvent { code: 16, sample: 50 },
        TriggerEvent { code: 4, sample: 101 },
        TriggerEvent { code: 32, sample: 200 },
        TriggerEvent { code: 8, sample: 301 },
    ];
    let pairs = pair_triggers(&events, 4, 8).unwrap();
    assert_eq!(pairs, vec![(100, 300)]);
}
