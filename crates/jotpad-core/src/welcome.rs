use std::time::Duration;

/// Placeholder typed out while the editor is in the welcome phase.
pub const WELCOME_TEXT: &str = "Just start typing.\n\nDrop a .txt or .md file here, or press Ctrl+O to open one.\nNothing leaves this window; the draft is gone when it closes.";
pub const REVEAL_INTERVAL: Duration = Duration::from_millis(60);

/// The part of the placeholder visible `elapsed` after the welcome began.
pub fn visible(elapsed: Duration) -> &'static str {
    let shown = usize::try_from(elapsed.as_millis() / REVEAL_INTERVAL.as_millis())
        .unwrap_or(usize::MAX);
    match WELCOME_TEXT.char_indices().nth(shown) {
        Some((idx, _)) => &WELCOME_TEXT[..idx],
        None => WELCOME_TEXT,
    }
}

/// Time until the next character appears, or `None` once fully revealed.
pub fn next_reveal(elapsed: Duration) -> Option<Duration> {
    if visible(elapsed).len() == WELCOME_TEXT.len() {
        return None;
    }
    let interval = REVEAL_INTERVAL.as_millis();
    let into = elapsed.as_millis() % interval;
    Some(Duration::from_millis(u64::try_from(interval - into).unwrap_or(0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveals_one_char_per_interval() {
        assert_eq!(visible(Duration::ZERO), "");
        assert_eq!(visible(REVEAL_INTERVAL), "J");
        assert_eq!(visible(REVEAL_INTERVAL * 4 + Duration::from_millis(59)), "Just");
        assert_eq!(visible(Duration::from_secs(3600)), WELCOME_TEXT);
    }

    #[test]
    fn next_reveal_stops_when_complete() {
        assert_eq!(next_reveal(Duration::from_millis(10)), Some(Duration::from_millis(50)));
        assert_eq!(next_reveal(Duration::from_secs(3600)), None);
    }
}
