//! Reads one or more input files of hex-per-line or CSV-with-hex-first-field
//! records into a batch of moduli, applying textual (not exact-value)
//! deduplication as it goes. Exact-value duplicates that differ in their
//! textual form (leading zeros, mixed case) are intentionally left for the
//! engines to surface as collisions.

use anyhow::{Context, Result};
use batchgcd_bigint::Natural;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub fn load(paths: &[impl AsRef<Path>]) -> Result<Vec<Natural>> {
    let mut seen_text = HashSet::new();
    let mut moduli = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        for (lineno, line) in contents.lines().enumerate() {
            let field = line.split(',').next().unwrap_or("").trim();
            if !seen_text.insert(field.to_string()) {
                continue;
            }
            let natural = Natural::from_hex(field)
                .with_context(|| format!("{}:{}: not valid hex: {field:?}", path.display(), lineno + 1))?;
            moduli.push(natural);
        }
    }
    Ok(moduli)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_hex_and_csv_lines_and_dedupes_by_text() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "23").unwrap();
        writeln!(f, "4d,extra,columns").unwrap();
        writeln!(f, "23").unwrap();
        f.flush().unwrap();

        let moduli = load(&[f.path()]).unwrap();
        assert_eq!(moduli, vec![Natural::from_hex("23").unwrap(), Natural::from_hex("4d").unwrap()]);
    }

    #[test]
    fn rejects_bad_hex() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "not-hex").unwrap();
        f.flush().unwrap();
        assert!(load(&[f.path()]).is_err());
    }

    #[test]
    fn rejects_blank_lines() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "23").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "4d").unwrap();
        f.flush().unwrap();
        assert!(load(&[f.path()]).is_err());
    }
}
