use anyhow::{Context as _, Error};

/// Parses newline-separated unsigned integers.
///
/// Surrounding whitespace is trimmed. Blank lines, and lines starting with `#`, are skipped.
pub fn parse_values(raw: &str) -> Result<Vec<u64>, Error> {
    raw.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line_number, line)| {
            line.parse::<u64>()
                .with_context(|| format!("Invalid value '{}' on line {}.", line, line_number))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_values() {
        let values = parse_values("# latencies\n3\n\n  7 \n0\n").unwrap();
        assert_eq!(values, vec![3, 7, 0]);
    }

    #[test]
    fn empty() {
        assert!(parse_values("").unwrap().is_empty());
        assert!(parse_values("\n# nothing here\n").unwrap().is_empty());
    }

    #[test]
    fn rejects_garbage() {
        let error = parse_values("1\n2\n-3\n").unwrap_err();
        assert!(error.to_string().contains("line 3"));

        assert!(parse_values("1.5").is_err());
    }
}
