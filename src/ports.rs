use anyhow::{bail, Context, Result};

/// Parse a port range specification into an inclusive `(start, end)` pair (1..=65535).
///
/// Supported forms:
/// - single port number: `80`
/// - inclusive range: `8000-8010`
/// - surrounding whitespace is ignored
pub fn parse_port_range(s: &str) -> Result<(u16, u16)> {
    let spec = s.trim();
    if spec.is_empty() {
        bail!("empty port range");
    }

    if let Some((a, b)) = spec.split_once('-') {
        let start = parse_port_str(a.trim())
            .with_context(|| format!("invalid start in range: {a}"))?;
        let end =
            parse_port_str(b.trim()).with_context(|| format!("invalid end in range: {b}"))?;
        check_range(start, end)?;
        return Ok((start, end));
    }

    let p = parse_port_str(spec).with_context(|| format!("invalid port value: {spec}"))?;
    Ok((p, p))
}

/// Reject ranges whose start is after their end.
pub fn check_range(start: u16, end: u16) -> Result<()> {
    if start == 0 || end == 0 {
        bail!("ports must be between 1 and 65535");
    }
    if start > end {
        bail!("invalid range {start}-{end} (start > end)");
    }
    Ok(())
}

/// Parse one port number, rejecting 0 and anything above 65535.
pub fn parse_port_str(s: &str) -> Result<u16> {
    let val: u32 = s.parse::<u32>().map_err(|e| anyhow::anyhow!(e))?;
    if val == 0 || val > 65535 {
        bail!("port out of range: {val}");
    }
    Ok(val as u16)
}
