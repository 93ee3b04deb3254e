use std::path::{Path, PathBuf};

/// `input` with its extension replaced by `<suffix>.<ext>`.
pub fn with_suffix(input: &Path, suffix: &str, ext: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{suffix}.{ext}"))
}

/// `<input>_label.ply`, or the first free `<input>_label_<i>.ply`.
pub fn free_label_path(input: &Path) -> PathBuf {
    let mut candidate = with_suffix(input, "_label", "ply");
    let mut i = 0;
    while candidate.exists() {
        i += 1;
        candidate = with_suffix(input, &format!("_label_{i}"), "ply");
    }
    candidate
}
