//! Line-window extraction.

/// Select the lines `[from, to)` of `text`, 0-based.
///
/// - `from == 0 && to == 0` returns `text` unchanged.
/// - `to <= from` selects everything from `from` to the end.
/// - `from` past the last line yields an empty string.
pub fn slice(text: &str, from: usize, to: usize) -> String {
    if from == 0 && to == 0 {
        return text.to_string();
    }

    let lines = text.split('\n').skip(from);
    let selected: Vec<&str> = match to.checked_sub(from).filter(|len| *len > 0) {
        Some(len) => lines.take(len).collect(),
        None => lines.collect(),
    };

    selected.join("\n")
}
