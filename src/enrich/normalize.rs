// src/enrich/normalize.rs
// Strip presentation fencing from raw model text

const FENCE: &str = "```";

/// Reduce raw model text to a candidate payload.
///
/// Removes a leading ```` ``` ```` fence (with its optional language tag line),
/// a trailing fence, and surrounding whitespace. Nested wrappers are peeled
/// until nothing changes, so the result is a fixed point:
/// `normalize(normalize(x)) == normalize(x)`. Text without fences is only trimmed.
pub fn normalize(raw: &str) -> &str {
    let mut current = raw.trim();
    loop {
        let next = strip_fence_once(current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_fence_once(s: &str) -> &str {
    let trimmed = s.trim();
    let mut body = trimmed;

    if let Some(rest) = body.strip_prefix(FENCE) {
        body = strip_language_tag(rest);
    }
    if let Some(rest) = body.strip_suffix(FENCE) {
        body = rest;
    }

    body.trim()
}

/// Drop the info string after an opening fence (```` ```json\n ````).
///
/// Only a single word on its own line counts as a tag, and only when
/// something remains after it; ```` ```high\n``` ```` keeps `high`.
fn strip_language_tag(after_fence: &str) -> &str {
    let Some((first_line, remainder)) = after_fence.split_once('\n') else {
        return after_fence;
    };

    let tag = first_line.trim();
    let is_tag = tag
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+'));
    let remainder_has_content = !remainder
        .trim()
        .trim_end_matches(FENCE)
        .trim()
        .is_empty();

    if is_tag && (tag.is_empty() || remainder_has_content) {
        remainder
    } else {
        after_fence
    }
}
