//! Trigger pairing: onset/offset marker codes → validated epoch bounds.
use anyhow::{bail, Result};

/// One marker on the trigger channel.
///
/// `sample` is the 1-based sample index assigned by the acquisition system;
/// [`pair_triggers`] converts to 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent {
    pub code: i32,
    pub sample: i64,
}

/// Pair onset and offset triggers positionally: the i-th onset with the
/// i-th offset, in stream order.
///
/// Unequal counts or broken alternation (an offset before its onset, or an
/// onset before the previous offset) fail the whole session; positional
/// pairing is only meaningful when the stream really alternates.  Returned
/// bounds are 0-based and inclusive on both ends.
pub fn pair_triggers(
    events: &[TriggerEvent],
    onset_code: i32,
    offset_code: i32,
) -> Result<Vec<(i64, i64)>> {
    let onsets: Vec<i64> = events
        .iter()
        .filter(|e| e.code == onset_code)
        .map(|e| e.sample - 1)
        .collect();
    let offsets: Vec<i64> = events
        .iter()
        .filter(|e| e.code == offset_code)
        .map(|e| e.sample - 1)
        .collect();

    if onsets.len() != offsets.len() {
        bail!(
            "mismatched trigger counts: {} onsets (code {onset_code}) vs {} offsets (code {offset_code})",
            onsets.len(),
            offsets.len()
        );
    }

    for i in 0..onsets.len() {
        if onsets[i] > offsets[i] {
            bail!(
                "trigger pair {i} out of order: onset at sample {} after offset at sample {}",
                onsets[i],
                offsets[i]
            );
        }
        if i + 1 < onsets.len() && offsets[i] >= onsets[i + 1] {
            bail!(
                "triggers do not alternate: offset {i} at sample {} overlaps onset {} at sample {}",
                offsets[i],
                i + 1,
                onsets[i + 1]
            );
        }
    }

    Ok(onsets.into_iter().zip(offsets).collect())
}
