//! Bounded payment descriptions.
//!
//! Payment protocols carry a free-text description field with a hard ceiling of 639
//! characters. Descriptions have the shape `rss::payment::{action} {url} {message}`; the
//! message is truncated to fit, and dropped entirely when too little of it would survive.
//!
//! Lengths are counted in Unicode scalar values, so truncation never splits a code point.

use crate::constants::{DESCRIPTION_HARD_LIMIT, DESCRIPTION_PREFIX, DESCRIPTION_RESERVED_LEN};

const ELLIPSIS: &str = "...";

/// Shortest message worth keeping after truncation.
const MIN_MESSAGE_LEN: usize = 3;

/// Builds the description for a payment of kind `action` pointing at `url`.
///
/// Total over all inputs: an absent or empty `message` yields `rss::payment::{action} {url}`
/// with no trailing space; a message that has to be shortened ends in `...`.
pub fn format_description(action: &str, url: &str, message: Option<&str>) -> String {
    let bare = format!("{DESCRIPTION_PREFIX}{action} {url}");

    let Some(message) = message.filter(|m| !m.is_empty()) else {
        return bare;
    };

    let budget = (DESCRIPTION_HARD_LIMIT - DESCRIPTION_RESERVED_LEN)
        .saturating_sub(url.chars().count())
        .saturating_sub(action.chars().count());

    let original_len = message.chars().count();
    let kept_len = original_len.min(budget);
    if kept_len < MIN_MESSAGE_LEN {
        return bare;
    }

    let text: String = if kept_len < original_len {
        message
            .chars()
            .take(kept_len - ELLIPSIS.len())
            .chain(ELLIPSIS.chars())
            .collect()
    } else {
        message.to_owned()
    };

    format!("{bare} {text}")
}
