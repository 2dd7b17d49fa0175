use std::path::{Path, PathBuf};

fn is_dir_or_extension(e: &walkdir::DirEntry, extension: &str) -> bool {
    let is_dir = e.file_type().is_dir();
    let has_extension = e.file_type().is_file()
        && e.path()
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
            .unwrap_or(false);

    is_dir || has_extension
}

/// Expands `inputs` into a list of files. Directories are walked for files
/// with `extension`; anything else is passed through as is, so a missing file
/// is reported by whoever reads it.
pub fn collect_files<I>(inputs: I, extension: &str) -> Vec<PathBuf>
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    let mut files = Vec::new();

    for input in inputs {
        let input = input.as_ref();
        if !input.is_dir() {
            files.push(input.to_path_buf());
            continue;
        }

        log::info!("Searching {} for .{} files", input.to_string_lossy(), extension);
        let dir_walker = walkdir::WalkDir::new(input)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| is_dir_or_extension(e, extension));

        for dir_entry in dir_walker {
            match dir_entry {
                Ok(de) => {
                    if de.file_type().is_dir() {
                        continue;
                    }
                    files.push(de.into_path());
                }
                Err(e) => log::warn!("{:?}", e),
            }
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_directories_and_keeps_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(dir.path().join("b-help.xml"), "").unwrap();
        std::fs::write(nested.join("a-help.XML"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        let missing = dir.path().join("missing-help.xml");
        let files = collect_files(vec![dir.path().to_path_buf(), missing.clone()], "xml");

        assert_eq!(
            files,
            vec![
                dir.path().join("b-help.xml"),
                nested.join("a-help.XML"),
                missing,
            ]
        );
    }
}
