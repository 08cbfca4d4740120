/// Base for line and record counts (`10K` = 10 000).
pub const COUNT_BASE: u64 = 1000;
/// Base for byte sizes (`10K` = 10 240).
pub const SIZE_BASE: u64 = 1024;

/// Parse a count or size with an optional `K`, `M` or `G` suffix.
///
/// The suffix is only recognised when the text is longer than one character,
/// so a bare `"K"` is treated as a malformed numeral. A numeral that fails to
/// parse counts as 0; callers rely on this instead of receiving an error.
pub fn parse_suffixed(text: &str, base: u64) -> u64 {
    let text = text.trim();
    let mut numeral = text;
    let mut multiplier = 1u64;

    if text.chars().count() > 1
        && let Some(last) = text.chars().last()
    {
        let exponent = match last.to_ascii_uppercase() {
            'G' => Some(3),
            'M' => Some(2),
            'K' => Some(1),
            _ => None,
        };
        if let Some(exponent) = exponent {
            multiplier = base.saturating_pow(exponent);
            numeral = &text[..text.len() - last.len_utf8()];
        }
    }

    numeral
        .parse::<u64>()
        .unwrap_or(0)
        .saturating_mul(multiplier)
}

/// Plain integer with no suffix handling, 0 when malformed.
pub fn parse_plain(text: &str) -> u64 {
    text.trim().parse().unwrap_or(0)
}
