use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

lazy_static! {
    static ref OFFSET_RE: Regex = Regex::new(r"^(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?$")
        .unwrap_or_else(|e| panic!("invalid offset pattern: {}", e));
}

/// Parses a playback offset like `1h2m3s`, `90s` or `5m` into seconds.
///
/// Every group is optional but they must appear in `h`, `m`, `s` order with
/// nothing in between or around them. Anything else, including the empty
/// string, yields `0`.
pub fn parse_offset(input: &str) -> u64 {
    let Some(caps) = OFFSET_RE.captures(input) else {
        debug!("Ignoring malformed playback offset {:?}", input);
        return 0;
    };

    let group = |i: usize, unit: u64| -> Option<u64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse::<u64>().ok()?.checked_mul(unit),
            None => Some(0),
        }
    };

    let total = group(1, 3600)
        .zip(group(2, 60))
        .zip(group(3, 1))
        .and_then(|((h, m), s)| h.checked_add(m)?.checked_add(s));

    total.unwrap_or_else(|| {
        debug!("Ignoring out of range playback offset {:?}", input);
        0
    })
}
