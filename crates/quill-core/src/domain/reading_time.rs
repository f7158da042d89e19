/// Reading speed used for estimates.
pub const WORDS_PER_MINUTE: usize = 200;

/// Estimate how many whole minutes it takes to read `content`.
///
/// Words are runs of non-whitespace; partial minutes round up, so a single
/// word reads in one minute and blank content in zero.
pub fn estimate_reading_time(content: &str) -> u32 {
    let words = content.split_whitespace().count();
    u32::try_from(words.div_ceil(WORDS_PER_MINUTE)).unwrap_or(u32::MAX)
}
