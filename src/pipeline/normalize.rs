//! Turn an extracted suggestion into the final on-disk filename.

/// Normalise `suggestion` into a filename ending with `original_ext`.
///
/// Lowercases, replaces spaces with hyphens, and appends the lowercased
/// original extension unless the name already ends with it. Path separators
/// become hyphens too, so the result always stays in the source directory.
///
/// `original_ext` may be given with or without the leading dot.
pub fn normalize_filename(suggestion: &str, original_ext: &str) -> String {
    let mut name: String = suggestion
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '-',
            other => other,
        })
        .collect();

    let ext = original_ext.trim_start_matches('.').to_lowercase();
    if !ext.is_empty() {
        let suffix = format!(".{ext}");
        if !name.ends_with(&suffix) {
            name.push_str(&suffix);
        }
    }
    name
}
