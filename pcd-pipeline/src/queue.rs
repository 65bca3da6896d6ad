use std::{
    collections::VecDeque,
    fs, io,
    path::{Path, PathBuf},
};

use glob::Pattern;

/// One input file waiting to be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub path: PathBuf,
}

/// Regular files of `folder` whose name matches `pattern`, sorted by path.
pub fn list_pointcloud_files(folder: &Path, pattern: &Pattern) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        if pattern.matches(&file_name.to_string_lossy()) {
            files.push(folder.join(file_name));
        }
    }
    files.sort();
    Ok(files)
}

pub fn build_queue(files: Vec<PathBuf>) -> VecDeque<WorkItem> {
    let queue: VecDeque<WorkItem> = files
        .into_iter()
        .map(|path| {
            log::debug!("file_queue enqueued {:?}", path);
            WorkItem { path }
        })
        .collect();
    log::debug!("file_queue created with size of {}", queue.len());
    queue
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn lists_matching_files_only() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.las"), b"").unwrap();
        fs::write(dir.path().join("a.las"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::create_dir(dir.path().join("sub.las")).unwrap();

        let all = list_pointcloud_files(dir.path(), &Pattern::new("*").unwrap()).unwrap();
        assert_eq!(
            all,
            vec![
                dir.path().join("a.las"),
                dir.path().join("b.las"),
                dir.path().join("notes.txt"),
            ]
        );

        let las = list_pointcloud_files(dir.path(), &Pattern::new("*.las").unwrap()).unwrap();
        assert_eq!(las, vec![dir.path().join("a.las"), dir.path().join("b.las")]);
    }

    #[test]
    fn queue_is_fifo() {
        let mut queue = build_queue(vec![PathBuf::from("x/1.las"), PathBuf::from("x/2.las")]);
        assert_eq!(queue.pop_front().unwrap().path, PathBuf::from("x/1.las"));
        assert_eq!(queue.pop_front().unwrap().path, PathBuf::from("x/2.las"));
        assert!(queue.pop_front().is_none());
    }
}
