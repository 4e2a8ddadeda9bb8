//! String utilities for the domain layer.

/// Collapse whitespace runs into single spaces and cap the result at
/// `max_len` bytes, appending `...` when anything was cut.
///
/// Used for step input/output summaries and for echoing raw LLM output in
/// error messages. Truncation never splits a UTF-8 character.
pub fn summarize(s: &str, max_len: usize) -> String {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.len() <= max_len {
        return collapsed;
    }
    let mut end = max_len.saturating_sub(3);
    while end > 0 && !collapsed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &collapsed[..end])
}
