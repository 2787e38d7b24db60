use std::path::{Path, PathBuf};

/// Segment letter for a 0-based index: A..Z, then AA, AB, ...
pub fn segment_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Output path for segment `index`. The letter goes before the last space of
/// the file name ("PO 123" -> "POA 123.xlsx") or is appended ("PO" -> "POA.xlsx").
/// Directory components are never rewritten.
pub fn output_path(prefix: &Path, index: usize) -> PathBuf {
    let letter = segment_letter(index);
    let name = prefix.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let stem = name.strip_suffix(".xlsx").unwrap_or(&name);

    let file_name = match stem.rsplit_once(' ') {
        Some((head, tail)) => format!("{head}{letter} {tail}.xlsx"),
        None => format!("{stem}{letter}.xlsx"),
    };
    match prefix.file_name() {
        Some(_) => prefix.with_file_name(file_name),
        None => prefix.join(file_name),
    }
}
