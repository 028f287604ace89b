// Key identifier normalization.
// Older browsers report `KeyboardEvent.key` as "Up", "Spacebar", ...; map them onto the
// current names so a single binding matches both.

/// Canonical form of a key identifier. Unknown identifiers pass through unchanged.
pub fn normalize(key: &str) -> &str {
    match key {
        "Up" => "ArrowUp",
        "Down" => "ArrowDown",
        "Left" => "ArrowLeft",
        "Right" => "ArrowRight",
        "Space" | "Spacebar" => " ",
        "Esc" => "Escape",
        other => other,
    }
}
