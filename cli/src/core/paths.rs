use std::path::Path;

pub fn clean_path_str(s: &str) -> &str {
    #[cfg(windows)]
    {
        if let Some(stripped) = s.strip_prefix(r"\\?\") {
            return stripped;
        }
    }
    s
}

pub fn clean_path(path: &Path) -> String {
    let s = path.display().to_string();
    clean_path_str(&s).to_string()
}

/// Resolves `relative` against the directory holding the collection file.
pub fn relative_to(base_dir: &Path, relative: &str) -> std::path::PathBuf {
    let candidate = Path::new(relative);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base_dir.join(candidate)
    }
}
