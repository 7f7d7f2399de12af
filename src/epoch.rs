//! Trigger-bounded epoching.
//!
//! Cuts a continuous `[T, C]` recording into one slab per onset/offset
//! trigger pair, inclusive of both bounding samples, restricted to the
//! session's valid channel columns.  Rows are sliced before columns are
//! selected so only the needed slab is ever materialized.
use ndarray::{s, Array2, ArrayView2};
use tracing::warn;

/// Extract one `[len, C']` epoch per trigger pair from `data` (`[T, C]`).
///
/// `pairs` are 0-based inclusive sample bounds from
/// [`pair_triggers`](crate::triggers::pair_triggers); `channel_idx` the
/// column indices from [`ChannelSet`](crate::channels::ChannelSet).
///
/// A pair whose bounds fall outside the recording is skipped with a
/// warning, so the result can be shorter than `pairs` but never fails.
pub fn extract_epochs(
    data: ArrayView2<'_, f32>,
    pairs: &[(i64, i64)],
    channel_idx: &[usize],
) -> Vec<Array2<f32>> {
    let n_samples = data.nrows() as i64;
    let mut epochs = Vec::with_capacity(pairs.len());
    for (ordinal, &(on, off)) in pairs.iter().enumerate() {
        if on < 0 || off >= n_samples {
            warn!(
                epoch = ordinal,
                onset = on,
                offset = off,
                n_samples,
                "epoch bounds outside recording, skipping"
            );
            continue;
        }
        let slab = data.slice(s![on as usize..=off as usize, ..]);
        epochs.push(slab.select(ndarray::Axis(1), channel_idx));
    }
    epochs
}
