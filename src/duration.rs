//! Durations written as unit-suffixed decimals, e.g. `300ms`, `1.5h`,
//! `2h45m`. Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`.

use std::time::Duration;

use crate::error::Error;

const NANOS_PER_SEC: u128 = 1_000_000_000;

pub fn parse(input: &str) -> Result<Duration, Error> {
    let fail = |reason: String| Error::InvalidDuration {
        value: input.to_string(),
        reason,
    };

    let mut rest = input.strip_prefix('+').unwrap_or(input);
    if let Some(unsigned) = rest.strip_prefix('-') {
        if unsigned == "0" {
            return Ok(Duration::ZERO);
        }
        return Err(fail("negative durations are not supported".into()));
    }
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(fail("empty duration".into()));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let whole_len = leading_digits(rest);
        let (whole, tail) = rest.split_at(whole_len);
        rest = tail;

        let mut fraction = "";
        if let Some(tail) = rest.strip_prefix('.') {
            let len = leading_digits(tail);
            fraction = &tail[..len];
            rest = &tail[len..];
        }
        if whole.is_empty() && fraction.is_empty() {
            return Err(fail("expected a number".into()));
        }

        let unit_len = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        if unit_len == 0 {
            return Err(fail("missing unit".into()));
        }
        let (unit, tail) = rest.split_at(unit_len);
        rest = tail;

        let scale = unit_scale(unit).ok_or_else(|| fail(format!("unknown unit {unit:?}")))?;
        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| fail("overflow".into()))?
        };
        let nanos = whole
            .checked_mul(scale)
            .and_then(|nanos| nanos.checked_add(scaled_fraction(fraction, scale)))
            .ok_or_else(|| fail("overflow".into()))?;
        total = total
            .checked_add(nanos)
            .ok_or_else(|| fail("overflow".into()))?;
    }

    let nanos = u64::try_from(total).map_err(|_| fail("overflow".into()))?;
    Ok(Duration::from_nanos(nanos))
}

/// Render `d` the way it is written: `1h2m3.5s`, `300ms`, `0s`.
pub fn format(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < NANOS_PER_SEC {
        let (unit, scale) = if nanos < 1_000 {
            ("ns", 1)
        } else if nanos < 1_000_000 {
            ("µs", 1_000)
        } else {
            ("ms", 1_000_000)
        };
        return format!("{}{unit}", decimal(nanos, scale));
    }

    let secs = nanos / NANOS_PER_SEC;
    let hours = secs / 3600;
    let minutes = (secs / 60) % 60;
    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    let seconds = nanos % (60 * NANOS_PER_SEC);
    out.push_str(&format!("{}s", decimal(seconds, NANOS_PER_SEC)));
    out
}

fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

fn unit_scale(unit: &str) -> Option<u128> {
    let scale = match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SEC,
        "m" => 60 * NANOS_PER_SEC,
        "h" => 3600 * NANOS_PER_SEC,
        _ => return None,
    };
    Some(scale)
}

/// `0.<fraction>` of `scale`, truncated toward zero.
fn scaled_fraction(fraction: &str, scale: u128) -> u128 {
    let mut numerator: u128 = 0;
    let mut denominator: u128 = 1;
    for digit in fraction.bytes().take(18) {
        numerator = numerator * 10 + u128::from(digit - b'0');
        denominator *= 10;
    }
    numerator * scale / denominator
}

fn decimal(value: u128, scale: u128) -> String {
    let whole = value / scale;
    let fraction = value % scale;
    if fraction == 0 {
        return whole.to_string();
    }
    let width = scale.to_string().len() - 1;
    let digits = format!("{fraction:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
