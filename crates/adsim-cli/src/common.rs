//! Small shared helpers for the command implementations in `main.rs`.

use std::io::{self, Write};

use serde::Serialize;

/// Write data as pretty JSON to the given writer, followed by a newline.
pub fn write_json<W: Write, T: Serialize>(data: &T, writer: &mut W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, data).map_err(io::Error::other)?;
    writeln!(writer)?;
    Ok(())
}

pub fn parse_csv_u64(spec: &str) -> Vec<u64> {
    spec.split(',').map(str::trim).filter(|s| !s.is_empty()).filter_map(|s| s.parse().ok()).collect()
}

pub fn parse_csv_string(spec: &str) -> Vec<String> {
    spec.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_json_to_string() {
        let data = serde_json::json!({"id": 1, "name": "monopoly"});
        let mut output = Vec::new();
        write_json(&data, &mut output).unwrap();
        let result = String::from_utf8(output).unwrap();
        assert!(result.contains("monopoly"));
    }

    #[test]
    fn test_parse_csv_u64() {
        assert_eq!(parse_csv_u64("1, 2,3"), vec![1, 2, 3]);
        assert_eq!(parse_csv_u64(""), Vec::<u64>::new());
    }

    #[test]
    fn test_parse_csv_string() {
        assert_eq!(parse_csv_string("a, b ,c"), vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    }
}
