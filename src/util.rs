use regex::Regex;
use std::sync::OnceLock;
use std::time::Instant;

static INIT_ONCE: std::sync::Once = std::sync::Once::new();
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt().with_env_filter(env_filter).try_init();
    });
}

/// Split `items` into contiguous chunks of at most `size`, preserving order.
/// Only the final chunk may be shorter. Empty input yields no chunks.
///
/// Panics if `size == 0`.
pub fn chunk_ids<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    assert!(size > 0, "chunk size must be positive");
    items.chunks(size).map(<[T]>::to_vec).collect()
}

/// Y/N answer: case-insensitive "y" is yes, anything else is no.
pub fn parse_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Whole seconds since `t`, rounded like the progress messages expect.
#[inline]
pub fn elapsed_secs(t: Instant) -> u64 {
    t.elapsed().as_secs_f64().round() as u64
}

/// Subreddit names are 2..=21 chars of letters, digits, underscore.
pub fn is_valid_subreddit(name: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]{2,21}$").expect("static regex"));
    re.is_match(name)
}

/// Safe to embed in a single path component: no separators, no `..`, no NUL.
pub fn is_path_safe(part: &str) -> bool {
    !part.contains(['/', '\\', '\0']) && !part.contains("..")
}
