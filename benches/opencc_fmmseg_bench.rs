use criterion::{criterion_group, criterion_main, Criterion};
use once_cell::sync::Lazy;
use opencc_fmmseg::OpenCC;
use std::time::Duration;

// Synthetic corpus: this crate ships no dictionary data or fixture text, so inputs
// are generated by repeating a short seed sentence to the desired character count
// rather than reading a bundled sample file.
const SIMP_SEED: &str = "汉字转换测试，龙马精神，意大利面。";
const TRAD_SEED: &str = "漢字轉換測試，龍馬精神，義大利麵。";

fn repeat_to_chars(seed: &str, n: usize) -> String {
    let seed_chars: Vec<char> = seed.chars().collect();
    seed_chars.iter().cycle().take(n).collect()
}

static SIMP_TEXT: Lazy<String> = Lazy::new(|| repeat_to_chars(SIMP_SEED, 1_000_000));
static TRAD_TEXT: Lazy<String> = Lazy::new(|| repeat_to_chars(TRAD_SEED, 1_000_000));

static INPUTS_SIMP: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    let s = SIMP_TEXT.as_str();
    vec![
        ("s2t_100", &s[..s.char_indices().nth(100).map_or(s.len(), |(i, _)| i)]),
        ("s2t_1k", &s[..s.char_indices().nth(1_000).map_or(s.len(), |(i, _)| i)]),
        ("s2t_10k", &s[..s.char_indices().nth(10_000).map_or(s.len(), |(i, _)| i)]),
        ("s2t_100k", &s[..s.char_indices().nth(100_000).map_or(s.len(), |(i, _)| i)]),
        ("s2t_1m", s),
    ]
});

static INPUTS_TRAD: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    let s = TRAD_TEXT.as_str();
    vec![
        ("t2s_100", &s[..s.char_indices().nth(100).map_or(s.len(), |(i, _)| i)]),
        ("t2s_1k", &s[..s.char_indices().nth(1_000).map_or(s.len(), |(i, _)| i)]),
        ("t2s_10k", &s[..s.char_indices().nth(10_000).map_or(s.len(), |(i, _)| i)]),
        ("t2s_100k", &s[..s.char_indices().nth(100_000).map_or(s.len(), |(i, _)| i)]),
        ("t2s_1m", s),
    ]
});

fn bench_convert(c: &mut Criterion) {
    // Dictionary data must be supplied by the caller at bench time; point this at a
    // real OpenCC lexicon directory via the `OPENCC_FMMSEG_DICTS` env var.
    let dicts_dir =
        std::env::var("OPENCC_FMMSEG_DICTS").unwrap_or_else(|_| "dicts".to_string());
    let s2t = OpenCC::from_dicts(&dicts_dir, Some("s2t"));
    let t2s = OpenCC::from_dicts(&dicts_dir, Some("t2s"));

    for (name, input) in INPUTS_SIMP.iter() {
        c.bench_function(name, |b| {
            b.iter(|| s2t.convert(input, false));
        });
    }

    for (name, input) in INPUTS_TRAD.iter() {
        c.bench_function(name, |b| {
            b.iter(|| t2s.convert(input, false));
        });
    }
}

fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .warm_up_time(Duration::from_secs(3))
        .measurement_time(Duration::from_secs(5))
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets = bench_convert
}
criterion_main!(benches);
