//! Filename extraction: pull one usable line out of free-form model text.
//!
//! Even when told to answer with a bare filename, models sometimes open with a
//! preamble ("Here is a filename:") or decorate the answer with markdown bold
//! or bullets. The rules below skip the former and strip the latter.
//!
//! ## Rules (applied per line, first match wins)
//!
//! 1. Trim surrounding whitespace
//! 2. Strip `*` runs at both ends, then `•` runs, then whitespace again
//! 3. Skip empty lines
//! 4. Skip lines starting with `Here` (case-sensitive)
//! 5. Skip lines starting with `suggested` (any case)

/// Return the first usable filename line of `response`, or `None` when the
/// model gave no suggestion.
pub fn extract_filename(response: &str) -> Option<String> {
    response
        .lines()
        .map(clean_line)
        .find(|line| !line.is_empty() && !is_preamble(line))
        .map(str::to_string)
}

fn clean_line(line: &str) -> &str {
    line.trim().trim_matches('*').trim_matches('•').trim()
}

fn is_preamble(line: &str) -> bool {
    if line.starts_with("Here") {
        return true;
    }
    line.get(..9)
        .is_some_and(|head| head.eq_ignore_ascii_case("suggested"))
}
