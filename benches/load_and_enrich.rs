use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use osu_map_report::config::{ReportConfig, Taxonomy};
use osu_map_report::enrich::Enricher;
use osu_map_report::frequency::top_values;
use osu_map_report::loader::{self, LoadedTable};
use osu_map_report::report;
use tempfile::TempDir;

const ARTISTS: [&str; 6] = ["xi", "Camellia", "DragonForce", "Toby Fox", "nekodex", "t+pazolite"];

fn generate_maps(records: usize) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let path = temp_dir.path().join("maps.json");
    let mut file = File::create(&path).expect("create maps.json");
    write!(file, "[[").expect("open page");
    for i in 0..records {
        if i > 0 {
            write!(file, ",").expect("separator");
        }
        let month = (i % 12) + 1;
        let year = 2008 + (i % 12);
        write!(
            file,
            r#"{{"beatmapset_id":"{set}","beatmap_id":"{i}","artist":"{artist}","title":"Song {title}","creator":"mapper{creator}","version":"Diff {i}","mode":"{mode}","difficultyrating":"{rating:.2}","total_length":"{length}","hit_length":"{hit}","bpm":"{bpm}","diff_approach":"{ar}","max_combo":"{combo}","playcount":"{plays}","favourite_count":"{favs}","approved_date":"{year}-{month:02}-15 12:00:00","source":""}}"#,
            set = i / 4,
            artist = ARTISTS[i % ARTISTS.len()],
            title = i % 97,
            creator = i % 41,
            mode = i % 4,
            rating = (i % 900) as f64 / 100.0,
            length = 60 + i % 400,
            hit = 50 + i % 380,
            bpm = 100 + i % 150,
            ar = 5 + i % 5,
            combo = 200 + i % 2500,
            plays = (i * 37) % 500_000,
            favs = (i * 7) % 3_000,
        )
        .expect("record");
    }
    write!(file, "]]").expect("close page");
    (temp_dir, path)
}

fn load(path: &PathBuf) -> LoadedTable {
    loader::load_json(path).expect("load maps")
}

fn bench_pipeline(c: &mut Criterion) {
    let (_dir, path) = generate_maps(20_000);
    let enricher = Enricher::new(Taxonomy::default()).expect("taxonomy");

    c.bench_function("load_json_20k", |b| b.iter(|| load(&path)));

    let table = load(&path);
    c.bench_function("enrich_20k", |b| {
        b.iter_batched(
            || table.beatmaps(),
            |maps| enricher.enrich(maps),
            BatchSize::LargeInput,
        )
    });

    let rows = enricher.enrich(table.beatmaps());
    c.bench_function("top_artists_20k", |b| {
        b.iter(|| {
            top_values(
                rows.iter().filter_map(|row| row.beatmap.artist.as_deref()),
                20,
            )
        })
    });

    let config = ReportConfig::default();
    c.bench_function("generate_report_20k", |b| {
        b.iter(|| report::generate(&rows, &config))
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_pipeline
}
criterion_main!(benches);
