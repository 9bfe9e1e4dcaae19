//! Human-readable byte sizes, binary multiples only.

const UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseBytesError {
    #[error("empty size")]
    Empty,
    #[error("invalid size {0:?}")]
    Invalid(String),
    #[error("size {0:?} does not fit in 64 bits")]
    Overflow(String),
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

/// Parses `"512"`, `"10G"`, `"1.5TiB"`, `"200mb"` and the like.
pub fn parse_bytes(input: &str) -> Result<u64, ParseBytesError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseBytesError::Empty);
    }

    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, suffix) = trimmed.split_at(split);
    let invalid = || ParseBytesError::Invalid(input.to_string());

    let shift = match suffix.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 0,
        "k" | "kb" | "kib" => 10,
        "m" | "mb" | "mib" => 20,
        "g" | "gb" | "gib" => 30,
        "t" | "tb" | "tib" => 40,
        "p" | "pb" | "pib" => 50,
        _ => return Err(invalid()),
    };
    let multiplier = 1u64 << shift;

    if let Ok(whole) = number.parse::<u64>() {
        return whole
            .checked_mul(multiplier)
            .ok_or_else(|| ParseBytesError::Overflow(input.to_string()));
    }

    let fractional: f64 = number.parse().map_err(|_| invalid())?;
    let scaled = fractional * multiplier as f64;
    if !scaled.is_finite() || scaled >= u64::MAX as f64 {
        return Err(ParseBytesError::Overflow(input.to_string()));
    }
    Ok(scaled as u64)
}
