//! Word geometry: bounding boxes, inclusive word regions, fixation location.
//!
//! A sentence's word boxes come from the presentation software as one
//! `[words x 4]` row of a per-trial tensor, `[x_start, y_start, x_end,
//! y_end]` per slot.  An all-zero row means the slot holds no word.
//!
//! Region construction mirrors the display logic: words are laid out with a
//! uniform horizontal gap, so the gap measured between the first two words is
//! reused as left padding for every word — each word owns the empty space to
//! its left but not its right, which partitions the line without overlap.
use anyhow::{bail, Result};
use ndarray::ArrayView2;

/// One word's bounding rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordBox {
    pub x_start: f32,
    pub y_start: f32,
    pub x_end: f32,
    pub y_end: f32,
}

/// Ordered word boxes for one sentence; `None` marks an empty slot.
///
/// Index = word position in reading order (0-based).
#[derive(Debug, Clone)]
pub struct SentenceLayout {
    pub slots: Vec<Option<WordBox>>,
}

impl SentenceLayout {
    /// Build a layout from one `[words x 4]` coordinate row, scaling every
    /// coordinate by `scale` (tracker vs. presentation resolution).
    ///
    /// Rows that are all zero become `None` and can never match a fixation.
    pub fn from_coords(row: ArrayView2<'_, f32>, scale: f32) -> Self {
        let slots = row
            .rows()
            .into_iter()
            .map(|r| {
                if r.iter().all(|&v| v == 0.0) {
                    None
                } else {
                    Some(WordBox {
                        x_start: r[0] * scale,
                        y_start: r[1] * scale,
                        x_end: r[2] * scale,
                        y_end: r[3] * scale,
                    })
                }
            })
            .collect();
        Self { slots }
    }

    /// Number of slots that actually hold a word.
    pub fn word_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// Inclusive per-word match regions derived from a [`SentenceLayout`].
///
/// One `(low, high)` pair per slot on each axis; `None` for empty slots.
#[derive(Debug, Clone)]
pub struct WordBounds {
    pub x: Vec<Option<(f32, f32)>>,
    pub y: Vec<Option<(f32, f32)>>,
}

impl WordBounds {
    /// Derive match regions for every word of `layout`.
    ///
    /// The horizontal gap is measured once, between slots 0 and 1, and
    /// subtracted from every word's `x_start`; the vertical range is padded
    /// by `vertical_tolerance` on both sides.
    ///
    /// Fails when slot 0 or slot 1 holds no word: the gap is then undefined
    /// and any region would be a silent miscalculation.  Callers treat this
    /// as a per-sentence condition, not a session failure.
    pub fn resolve(layout: &SentenceLayout, vertical_tolerance: f32) -> Result<Self> {
        let (first, second) = match (layout.slots.first(), layout.slots.get(1)) {
            (Some(Some(a)), Some(Some(b))) => (a, b),
            _ => bail!(
                "ambiguous word geometry: need words in slots 0 and 1 to measure \
                 the inter-word gap, layout has {} word(s)",
                layout.word_count()
            ),
        };
        let gap = second.x_start - first.x_end;

        let x = layout
            .slots
            .iter()
            .map(|s| s.map(|w| (w.x_start - gap, w.x_end)))
            .collect();
        let y = layout
            .slots
            .iter()
            .map(|s| s.map(|w| (w.y_start - vertical_tolerance, w.y_end + vertical_tolerance)))
            .collect();
        Ok(Self { x, y })
    }

    /// Locate a fixation at `(x, y)` to a word index, or `None` when the
    /// gaze fell outside every word region.
    ///
    /// Comparisons are strict on both axes, so a coordinate exactly on a
    /// region edge is not located.  When the vertical padding makes two
    /// regions overlap, the lowest word index wins.
    pub fn locate(&self, x: f32, y: f32) -> Option<usize> {
        self.x
            .iter()
            .zip(&self.y)
            .position(|(xr, yr)| match (xr, yr) {
                (Some((xl, xh)), Some((yl, yh))) => {
                    x > *xl && x < *xh && y > *yl && y < *yh
                }
                _ => false,
            })
    }
}
