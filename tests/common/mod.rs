#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes records as a single page in the downloader's layout.
    pub fn write_maps(&self, name: &str, records: &[Value]) -> PathBuf {
        let pages = json!([records]);
        self.write(name, &serde_json::to_string_pretty(&pages).expect("serialize maps"))
    }
}

/// A beatmap record with every field as the API returns it (strings).
pub fn map_record(fields: &[(&str, &str)]) -> Value {
    let mut record = Map::new();
    for (key, value) in [
        ("beatmapset_id", "1"),
        ("beatmap_id", "1"),
        ("artist", "xi"),
        ("title", "FREEDOM DiVE"),
        ("creator", "Nakagawa-Kanon"),
        ("version", "Normal"),
        ("mode", "0"),
        ("difficultyrating", "2.0"),
        ("total_length", "263"),
        ("hit_length", "258"),
        ("bpm", "222.22"),
        ("diff_approach", "5"),
        ("max_combo", "640"),
        ("playcount", "1000"),
        ("favourite_count", "10"),
        ("approved_date", "2012-03-03 14:01:20"),
        ("source", ""),
    ] {
        record.insert(key.to_string(), Value::String(value.to_string()));
    }
    for (key, value) in fields {
        record.insert(key.to_string(), Value::String(value.to_string()));
    }
    Value::Object(record)
}
