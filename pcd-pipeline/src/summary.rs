use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub path: PathBuf,
    /// Highest label of the file's label raster.
    pub segments: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

/// Segment count per input file, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    entries: Vec<SummaryEntry>,
    /// Files skipped under the continue policy.
    pub failures: Vec<FailedFile>,
    #[serde(skip)]
    index: HashMap<PathBuf, usize>,
}

impl RunSummary {
    /// Records a count, replacing the value of an already present path in place.
    pub fn insert(&mut self, path: PathBuf, segments: u32) {
        match self.index.get(&path) {
            Some(&i) => self.entries[i].segments = segments,
            None => {
                self.index.insert(path.clone(), self.entries.len());
                self.entries.push(SummaryEntry { path, segments });
            }
        }
    }

    pub fn record_failure(&mut self, path: PathBuf, error: String) {
        self.failures.push(FailedFile { path, error });
    }

    pub fn get(&self, path: &Path) -> Option<u32> {
        self.index.get(path).map(|&i| self.entries[i].segments)
    }

    pub fn entries(&self) -> &[SummaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, u32)> {
        self.entries
            .iter()
            .map(|entry| (entry.path.as_path(), entry.segments))
    }

    pub fn write_json(&self, path: &Path) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn insert_keeps_order_and_overwrites() {
        let mut summary = RunSummary::default();
        summary.insert(PathBuf::from("in/b.las"), 5);
        summary.insert(PathBuf::from("in/a.las"), 3);
        summary.insert(PathBuf::from("in/b.las"), 7);

        let entries: Vec<(&Path, u32)> = summary.iter().collect();
        assert_eq!(
            entries,
            vec![(Path::new("in/b.las"), 7), (Path::new("in/a.las"), 3)]
        );
        assert_eq!(summary.get(Path::new("in/a.las")), Some(3));
        assert_eq!(summary.get(Path::new("in/c.las")), None);
    }

    #[test]
    fn many_files_are_indexed_by_path() {
        let mut summary = RunSummary::default();
        for i in 0..10_000u32 {
            summary.insert(PathBuf::from(format!("in/{i}.las")), i);
        }
        summary.insert(PathBuf::from("in/42.las"), 1);

        assert_eq!(summary.len(), 10_000);
        assert_eq!(summary.get(Path::new("in/42.las")), Some(1));
        assert_eq!(summary.entries()[42].segments, 1);
        assert_eq!(summary.entries()[9_999].path, PathBuf::from("in/9999.las"));
    }

    #[test]
    fn json_export() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let mut summary = RunSummary::default();
        summary.insert(PathBuf::from("in/a.las"), 3);
        summary.record_failure(PathBuf::from("in/bad.las"), "broken".to_string());

        summary.write_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["entries"][0]["path"], "in/a.las");
        assert_eq!(value["entries"][0]["segments"], 3);
        assert_eq!(value["failures"][0]["error"], "broken");
    }
}
