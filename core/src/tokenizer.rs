/// Split `text` into every contiguous run of `n` characters, left to right.
///
/// Characters are Unicode scalar values, so a gram never splits a code point.
/// Returns nothing when the text holds fewer than `n` characters (or `n == 0`).
/// No normalization happens here; callers hand in already cleaned text.
pub fn ngrams(text: &str, n: usize) -> Vec<&str> {
    if n == 0 {
        return Vec::new();
    }
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let chars = bounds.len() - 1;
    if chars < n {
        return Vec::new();
    }
    (0..=chars - n).map(|i| &text[bounds[i]..bounds[i + n]]).collect()
}
