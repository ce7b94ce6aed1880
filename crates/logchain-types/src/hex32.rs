use crate::error::TypeError;

/// Render 32 bytes as `0x` + 64 lowercase hex characters.
pub(crate) fn render(bytes: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse the strict `0x` + 64 hex digit shape. Digits may be of either case.
pub(crate) fn parse(s: &str) -> Result<[u8; 32], TypeError> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| TypeError::MissingPrefix(s.to_string()))?;
    if digits.len() != 64 {
        return Err(TypeError::InvalidLength {
            expected: 64,
            actual: digits.len(),
        });
    }
    let mut out = [0u8; 32];
    hex::decode_to_slice(digits, &mut out).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
    Ok(out)
}
