use std::{fs, io, path::Path};

use crate::config::ClearPolicy;

/// Whether outputs are computed or read back from a previous run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Compute,
    Recover,
}

/// Source of operator answers for [`ClearPolicy::Interactive`].
pub trait Prompt {
    fn ask(&mut self, question: &str) -> io::Result<String>;
}

/// Creates `result_dir` if needed and decides how existing outputs are handled.
pub fn prepare_result_dir(
    result_dir: &Path,
    policy: ClearPolicy,
    prompt: &mut dyn Prompt,
) -> io::Result<RunMode> {
    if result_dir.exists() {
        log::info!("folder {:?} already exists", result_dir);
    } else {
        log::info!("creating folder {:?}...", result_dir);
        fs::create_dir_all(result_dir)?;
    }

    if fs::read_dir(result_dir)?.next().is_none() {
        return Ok(RunMode::Compute);
    }

    let clear = match policy {
        ClearPolicy::ForceClear => {
            log::warn!(
                "files are already present in {:?}, deleting them (--confirm)",
                result_dir
            );
            true
        }
        ClearPolicy::ForceSkip => {
            log::warn!(
                "files are already present in {:?}, reusing them (--no-confirm)",
                result_dir
            );
            false
        }
        ClearPolicy::Interactive => {
            let answer = prompt.ask(&format!(
                "files are already present in {}, delete them and recompute? [y/N] ",
                result_dir.display()
            ))?;
            answer.trim().eq_ignore_ascii_case("y")
        }
    };

    if clear {
        clear_dir(result_dir)?;
        Ok(RunMode::Compute)
    } else {
        log::info!("existing results will be reused");
        Ok(RunMode::Recover)
    }
}

fn clear_dir(dir: &Path) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct Answer {
        reply: &'static str,
        asked: usize,
    }

    impl Answer {
        fn new(reply: &'static str) -> Self {
            Self { reply, asked: 0 }
        }
    }

    impl Prompt for Answer {
        fn ask(&mut self, _question: &str) -> io::Result<String> {
            self.asked += 1;
            Ok(self.reply.to_string())
        }
    }

    fn populated_dir() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let results = dir.path().join("results");
        fs::create_dir(&results).unwrap();
        fs::write(results.join("label_a.las.tif"), b"old").unwrap();
        fs::create_dir(results.join("nested")).unwrap();
        (dir, results)
    }

    #[test]
    fn missing_folder_is_created_without_asking() {
        let dir = tempdir().unwrap();
        let results = dir.path().join("out").join("results");
        let mut prompt = Answer::new("y");

        let mode = prepare_result_dir(&results, ClearPolicy::Interactive, &mut prompt).unwrap();

        assert_eq!(mode, RunMode::Compute);
        assert!(results.is_dir());
        assert_eq!(prompt.asked, 0);
    }

    #[test]
    fn force_clear_empties_the_folder() {
        let (_dir, results) = populated_dir();
        let mut prompt = Answer::new("n");

        let mode = prepare_result_dir(&results, ClearPolicy::ForceClear, &mut prompt).unwrap();

        assert_eq!(mode, RunMode::Compute);
        assert_eq!(fs::read_dir(&results).unwrap().count(), 0);
        assert_eq!(prompt.asked, 0);
    }

    #[test]
    fn force_skip_keeps_files() {
        let (_dir, results) = populated_dir();
        let mut prompt = Answer::new("y");

        let mode = prepare_result_dir(&results, ClearPolicy::ForceSkip, &mut prompt).unwrap();

        assert_eq!(mode, RunMode::Recover);
        assert!(results.join("label_a.las.tif").exists());
        assert_eq!(prompt.asked, 0);
    }

    #[test]
    fn interactive_yes_clears() {
        let (_dir, results) = populated_dir();
        let mut prompt = Answer::new(" Y\n");

        let mode = prepare_result_dir(&results, ClearPolicy::Interactive, &mut prompt).unwrap();

        assert_eq!(mode, RunMode::Compute);
        assert_eq!(fs::read_dir(&results).unwrap().count(), 0);
        assert_eq!(prompt.asked, 1);
    }

    #[test]
    fn interactive_other_answer_reuses() {
        let (_dir, results) = populated_dir();
        let mut prompt = Answer::new("yes");

        let mode = prepare_result_dir(&results, ClearPolicy::Interactive, &mut prompt).unwrap();

        assert_eq!(mode, RunMode::Recover);
        assert!(results.join("label_a.las.tif").exists());
    }
}
