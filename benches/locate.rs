use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::{Array2, Array3, Axis};
use riftprep::{extract_epochs, SentenceLayout, WordBounds};

fn ten_word_layout() -> SentenceLayout {
    let coords = Array3::from_shape_fn((1, 10, 4), |(_, w, k)| {
        let x0 = 100.0 + w as f32 * 80.0;
        match k {
            0 => x0,
            1 => 300.0,
            2 => x0 + 60.0,
            _ => 330.0,
        }
    });
    SentenceLayout::from_coords(coords.index_axis(Axis(0), 0), 1.0)
}

fn bench_locate(c: &mut Criterion) {
    let layout = ten_word_layout();
    let bounds = WordBounds::resolve(&layout, 200.0).unwrap();
    // A scan path sweeping the whole line plus off-word samples.
    let fixations: Vec<(f32, f32)> = (0..1000)
        .map(|i| (60.0 + (i % 120) as f32 * 8.0, 280.0 + (i % 7) as f32 * 20.0))
        .collect();

    c.bench_function("locate 1000 fixations / 10 words", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for &(x, y) in &fixations {
                if bounds.locate(black_box(x), black_box(y)).is_some() {
                    hits += 1;
                }
            }
            black_box(hits)
        })
    });
}

fn bench_extract(c: &mut Criterion) {
    let data = Array2::from_shape_fn((60_000, 306), |(t, ch)| (t as f32 * 0.01 + ch as f32).sin());
    let pairs: Vec<(i64, i64)> = (0..20).map(|i| (i * 3000, i * 3000 + 2499)).collect();
    let idx: Vec<usize> = (0..306).filter(|c| c % 3 != 2).collect();

    c.bench_function("extract 20 epochs [2500 x 204]", |b| {
        b.iter(|| {
            let epochs = extract_epochs(black_box(data.view()), &pairs, &idx);
            black_box(epochs.len())
        })
    });
}

criterion_group!(benches, bench_locate, bench_extract);
criterion_main!(benches);
