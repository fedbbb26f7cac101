/// Canonical form used to decide whether typed input matches a sentence.
///
/// Lowercases, keeps only `[a-z0-9]` and whitespace, collapses whitespace
/// runs to a single space and trims both ends.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;

    for ch in lowered.chars() {
        if ch.is_whitespace() {
            pending_space = true;
        } else if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        }
    }

    out
}

pub fn sentences_match(original: &str, input: &str) -> bool {
    normalize(original) == normalize(input)
}
