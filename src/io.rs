//! Safetensors and JSON I/O for the preprocessing pipeline.
//!
//! Task bundles (`word_coords` + `materials`) and MEG sessions (`data`,
//! `triggers`, label lists) are stored as safetensors files; sentence
//! records are written as one JSON document per subject × task.
//!
//! String lists ride along as `U8` tensors, newline-separated (materials use
//! one line per trial with tab-separated words).
use anyhow::{bail, Context, Result};
use ndarray::{Array2, Array3};
use std::collections::HashMap;
use std::path::Path;

use crate::sentence::SentenceRecord;
use crate::triggers::TriggerEvent;

// ── Low-level safetensors parser (no dependency on the `safetensors` crate's
//    tensor types — we just need raw bytes → ndarray). ─────────────────────────

fn parse_header(bytes: &[u8]) -> Result<(HashMap<String, serde_json::Value>, usize)> {
    if bytes.len() < 8 {
        bail!("safetensors file too small");
    }
    let n = u64::from_le_bytes(bytes[..8].try_into().unwrap()) as usize;
    let header: HashMap<String, serde_json::Value> =
        serde_json::from_slice(&bytes[8..8 + n])
            .context("failed to parse safetensors header")?;
    Ok((header, 8 + n))
}

fn data_range(entry: &serde_json::Value) -> (usize, usize) {
    let offsets = entry["data_offsets"].as_array().unwrap();
    (
        offsets[0].as_u64().unwrap() as usize,
        offsets[1].as_u64().unwrap() as usize,
    )
}

fn read_f32_tensor(
    bytes: &[u8],
    data_start: usize,
    entry: &serde_json::Value,
) -> Result<Vec<f32>> {
    let (s, e) = data_range(entry);
    let raw = &bytes[data_start + s..data_start + e];
    Ok(raw
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn read_i64_tensor(
    bytes: &[u8],
    data_start: usize,
    entry: &serde_json::Value,
) -> Result<Vec<i64>> {
    let (s, e) = data_range(entry);
    let raw = &bytes[data_start + s..data_start + e];
    Ok(raw
        .chunks_exact(8)
        .map(|b| i64::from_le_bytes(b.try_into().unwrap()))
        .collect())
}

/// Newline-separated string list stored as a `U8` tensor.
fn read_string_tensor(
    bytes: &[u8],
    data_start: usize,
    entry: &serde_json::Value,
) -> Result<Vec<String>> {
    let (s, e) = data_range(entry);
    let raw = std::str::from_utf8(&bytes[data_start + s..data_start + e])
        .context("string tensor is not UTF-8")?;
    Ok(raw
        .split('\n')
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

fn shape_of(entry: &serde_json::Value) -> Vec<usize> {
    entry["shape"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_u64().unwrap() as usize)
        .collect()
}

// ── Task bundle (eye-tracking side) ───────────────────────────────────────────

/// Word coordinates and sentence materials for one task.
///
/// `word_coords` is `[trials, words, 4]` in the presentation software's
/// coordinate system; the tracker-resolution scale correction is applied
/// later, when per-sentence layouts are built.
pub struct TaskBundle {
    pub word_coords: Array3<f32>,
    /// Per-trial word tokens, empty slots already absent.
    pub materials: Vec<Vec<String>>,
}

impl TaskBundle {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading task bundle {}", path.display()))?;
        let (header, data_start) = parse_header(&bytes)?;

        let entry = header.get("word_coords").context("missing 'word_coords' key")?;
        let shape = shape_of(entry);
        if shape.len() != 3 || shape[2] != 4 {
            bail!("word_coords must be [trials, words, 4], got {shape:?}");
        }
        let coords = read_f32_tensor(&bytes, data_start, entry)?;
        let word_coords = Array3::from_shape_vec((shape[0], shape[1], shape[2]), coords)?;

        let entry = header.get("materials").context("missing 'materials' key")?;
        let materials = read_string_tensor(&bytes, data_start, entry)?
            .into_iter()
            .map(|line| {
                line.split('\t')
                    .filter(|w| !w.is_empty())
                    .map(String::from)
                    .collect()
            })
            .collect::<Vec<Vec<String>>>();

        if materials.len() != word_coords.shape()[0] {
            bail!(
                "bundle mismatch: {} material rows vs {} coordinate trials",
                materials.len(),
                word_coords.shape()[0]
            );
        }
        Ok(Self { word_coords, materials })
    }
}

/// Write a task bundle (used by converters and test fixtures).
pub fn write_task_bundle(
    word_coords: &Array3<f32>,
    materials: &[Vec<String>],
    path: &Path,
) -> Result<()> {
    let mut w = StWriter::new();
    let flat: Vec<f32> = word_coords.iter().copied().collect();
    w.add_f32("word_coords", &flat, word_coords.shape());
    let lines: Vec<String> = materials.iter().map(|ws| ws.join("\t")).collect();
    w.add_str("materials", &lines);
    w.write(path)
}

// ── MEG session (continuous recording + trigger channel) ──────────────────────

/// One continuous MEG recording with its trigger channel and label lists.
///
/// The sample matrix is *not* decoded on load: the raw file bytes are kept
/// and [`slice_rows`](MegSession::slice_rows) materializes only the sample
/// range an epoch needs, which bounds peak memory on long recordings.
pub struct MegSession {
    bytes: Vec<u8>,
    data_start: usize,
    data_offset: usize,
    n_samples: usize,
    n_channels: usize,
    /// Trigger channel events in stream order.
    pub triggers: Vec<TriggerEvent>,
    /// Every recorded channel label, in column order.
    pub all_labels: Vec<String>,
    /// Whitelisted labels valid for analysis.
    pub valid_labels: Vec<String>,
}

impl MegSession {
    /// Expected tensors: `data` `[T, C]` F32, `triggers` `[2, N]` I64
    /// (row 0 codes, row 1 sample indices), `labels` and `valid_labels`
    /// string tensors.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading MEG session {}", path.display()))?;
        let (header, data_start) = parse_header(&bytes)?;

        let entry = header.get("data").context("missing 'data' key")?;
        let shape = shape_of(entry);
        if shape.len() != 2 {
            bail!("data must be [samples, channels], got {shape:?}");
        }
        let (data_offset, data_end) = data_range(entry);
        if data_end - data_offset != shape[0] * shape[1] * 4 {
            bail!("data tensor byte length does not match its shape");
        }

        let entry = header.get("triggers").context("missing 'triggers' key")?;
        let trig_shape = shape_of(entry);
        if trig_shape.len() != 2 || trig_shape[0] != 2 {
            bail!("triggers must be [2, n_events], got {trig_shape:?}");
        }
        let trig = read_i64_tensor(&bytes, data_start, entry)?;
        let n_events = trig_shape[1];
        let triggers = (0..n_events)
            .map(|i| TriggerEvent {
                code: trig[i] as i32,
                sample: trig[n_events + i],
            })
            .collect();

        let entry = header.get("labels").context("missing 'labels' key")?;
        let all_labels = read_string_tensor(&bytes, data_start, entry)?;
        let entry = header.get("valid_labels").context("missing 'valid_labels' key")?;
        let valid_labels = read_string_tensor(&bytes, data_start, entry)?;

        if all_labels.len() != shape[1] {
            bail!(
                "label mismatch: {} labels vs {} data columns",
                all_labels.len(),
                shape[1]
            );
        }

        Ok(Self {
            bytes,
            data_start,
            data_offset,
            n_samples: shape[0],
            n_channels: shape[1],
            triggers,
            all_labels,
            valid_labels,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn n_channels(&self) -> usize {
        self.n_channels
    }

    /// Decode rows `start..=end` of the `[T, C]` sample matrix.
    ///
    /// Only the requested byte range is converted, the rest of the file
    /// stays as undecoded bytes.
    pub fn slice_rows(&self, start: usize, end: usize) -> Result<Array2<f32>> {
        if start > end || end >= self.n_samples {
            bail!(
                "sample range {start}..={end} outside recording of {} samples",
                self.n_samples
            );
        }
        let row_bytes = self.n_channels * 4;
        let from = self.data_start + self.data_offset + start * row_bytes;
        let to = self.data_start + self.data_offset + (end + 1) * row_bytes;
        let vals: Vec<f32> = self.bytes[from..to]
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        Ok(Array2::from_shape_vec((end - start + 1, self.n_channels), vals)?)
    }

    /// Decode the slab for one trigger pair restricted to `channel_idx`.
    pub fn epoch_slab(&self, pair: (i64, i64), channel_idx: &[usize]) -> Result<Array2<f32>> {
        let (on, off) = pair;
        if on < 0 || off >= self.n_samples as i64 {
            bail!(
                "epoch bounds {on}..={off} outside recording of {} samples",
                self.n_samples
            );
        }
        let rows = self.slice_rows(on as usize, off as usize)?;
        Ok(rows.select(ndarray::Axis(1), channel_idx))
    }
}

// ── Sentence record JSON ──────────────────────────────────────────────────────

/// Write one subject × task's sentence records as pretty-printed JSON.
pub fn write_sentence_records(records: &[SentenceRecord], path: &Path) -> Result<()> {
    let f = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(f), records)
        .context("serializing sentence records")?;
    Ok(())
}

pub fn read_sentence_records(path: &Path) -> Result<Vec<SentenceRecord>> {
    let f = std::fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(std::io::BufReader::new(f))
        .context("parsing sentence records")
}

// ── Generic safetensors builder ───────────────────────────────────────────────

/// Simple safetensors file writer for F32, I64 and string (`U8`) tensors.
///
/// Usage:
/// ```rust,no_run
/// use riftprep::io::StWriter;
/// use std::path::Path;
/// let mut w = StWriter::new();
/// w.add_f32("signal", &[1.0f32, 2.0, 3.0], &[1, 3]);
/// w.write(Path::new("/tmp/out.safetensors")).unwrap();
/// ```
#[derive(Default)]
pub struct StWriter {
    entries: Vec<(String, Vec<u8>, &'static str, Vec<usize>)>,
}

impl StWriter {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn add_f32(&mut self, name: &str, data: &[f32], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "F32", shape.to_vec()));
    }

    pub fn add_f32_arr2(&mut self, name: &str, arr: &Array2<f32>) {
        let data: Vec<f32> = arr.iter().copied().collect();
        self.add_f32(name, &data, &[arr.nrows(), arr.ncols()]);
    }

    pub fn add_i64(&mut self, name: &str, data: &[i64], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "I64", shape.to_vec()));
    }

    /// Newline-joined string list as a `U8` tensor.
    pub fn add_str(&mut self, name: &str, lines: &[String]) {
        let joined = lines.join("\n");
        let bytes = joined.into_bytes();
        let len = bytes.len();
        self.entries.push((name.to_string(), bytes, "U8", vec![len]));
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        use std::io::Write;
        let mut header_map = serde_json::Map::new();
        let mut offset: usize = 0;
        for (name, data, dtype, shape) in &self.entries {
            header_map.insert(name.clone(), serde_json::json!({
                "dtype": dtype,
                "shape": shape,
                "data_offsets": [offset, offset + data.len()],
            }));
            offset += data.len();
        }
        let hdr_bytes = serde_json::to_vec(&header_map)?;
        let pad = (8 - hdr_bytes.len() % 8) % 8;
        let padded: Vec<u8> = hdr_bytes.into_iter()
            .chain(std::iter::repeat(b' ').take(pad))
            .collect();
        let mut f = std::fs::File::create(path)?;
        f.write_all(&(padded.len() as u64).to_le_bytes())?;
        f.write_all(&padded)?;
        for (_, data, _, _) in &self.entries {
            f.write_all(data)?;
        }
        Ok(())
    }
}

// ── Epoch archive ─────────────────────────────────────────────────────────────

/// Write one session's epochs plus the retained channel labels.
///
/// Tensors: `epoch_0 .. epoch_{n-1}` (`[len_i, C']` F32) and `channels`.
pub fn write_epoch_archive(
    epochs: &[Array2<f32>],
    channel_labels: &[String],
    path: &Path,
) -> Result<()> {
    let mut w = StWriter::new();
    for (i, ep) in epochs.iter().enumerate() {
        w.add_f32_arr2(&format!("epoch_{i}"), ep);
    }
    w.add_str("channels", channel_labels);
    w.write(path)
}

/// Read back an epoch archive (ordered epochs, channel labels).
pub fn read_epoch_archive(path: &Path) -> Result<(Vec<Array2<f32>>, Vec<String>)> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading epoch archive {}", path.display()))?;
    let (header, data_start) = parse_header(&bytes)?;

    let mut epochs = Vec::new();
    for i in 0.. {
        let Some(entry) = header.get(&format!("epoch_{i}")) else { break };
        let shape = shape_of(entry);
        let vals = read_f32_tensor(&bytes, data_start, entry)?;
        epochs.push(Array2::from_shape_vec((shape[0], shape[1]), vals)?);
    }

    let entry = header.get("channels").context("missing 'channels' key")?;
    let labels = read_string_tensor(&bytes, data_start, entry)?;
    Ok((epochs, labels))
}
