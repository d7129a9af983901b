//! Helpers for quoting HTTP response bodies in error messages.

/// Truncates `message` to `max_chars` characters, appending `...` when
/// anything was cut.
pub(crate) fn truncate_for_message(message: &str, max_chars: usize) -> String {
    let mut output = String::new();
    let mut chars = message.chars();

    for _ in 0..max_chars {
        let Some(character) = chars.next() else {
            return output;
        };
        output.push(character);
    }

    if chars.next().is_some() {
        output.push_str("...");
    }

    output
}
