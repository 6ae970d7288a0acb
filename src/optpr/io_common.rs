use std::path::Path;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// A score cell: `Ok(None)` is a blank, `Err(())` is unreadable.
pub fn parse_score(cell: &str, blank_label: Option<&str>) -> Result<Option<f64>, ()> {
    let c = cell.trim();
    if c.is_empty() || Some(c) == blank_label {
        return Ok(None);
    }
    match c.parse::<f64>() {
        Ok(x) if x.is_finite() => Ok(Some(x)),
        _ => Err(()),
    }
}
