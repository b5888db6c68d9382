//! Post-processing for backend completions

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref THINK_TAG: Regex = Regex::new(r"(?i)</?think>").expect("think tag pattern is valid");
}

/// Remove every `<think>...</think>` span (tags included) from a completion.
///
/// Spans may span lines and may nest; an opening tag without a matching close
/// is left in place. The result is trimmed, and applying the function to its
/// own output changes nothing.
pub fn strip_think_tags(text: &str) -> String {
    let mut current = strip_once(text);
    loop {
        let next = strip_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_once(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut depth = 0usize;
    let mut span_start = 0;

    for tag in THINK_TAG.find_iter(text) {
        let closing = tag.as_str().starts_with("</");
        match (closing, depth) {
            (false, 0) => {
                output.push_str(&text[cursor..tag.start()]);
                span_start = tag.start();
                depth = 1;
            }
            (false, _) => depth += 1,
            (true, 0) => {}
            (true, 1) => {
                depth = 0;
                cursor = tag.end();
            }
            (true, _) => depth -= 1,
        }
    }

    if depth > 0 {
        output.push_str(&text[span_start..]);
    } else {
        output.push_str(&text[cursor..]);
    }

    output.trim().to_string()
}
