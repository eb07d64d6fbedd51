//! Name and path checks applied before anything touches the store.

use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;

/// A single resource name: non-empty, no separators, no traversal.
pub fn validate_name(name: &str) -> AppResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_operation("Name cannot be empty"));
    }
    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(AppError::invalid_operation(format!(
            "Name '{name}' cannot contain path separators"
        )));
    }
    if trimmed.contains("..") {
        return Err(AppError::invalid_operation(format!(
            "Name '{name}' cannot contain '..'"
        )));
    }
    Ok(())
}

/// Folder segments of a client-supplied relative path such as
/// `"A/B/file.txt"`. The last segment names the file and is dropped; empty
/// and `.` segments are ignored.
pub fn folder_segments(relative_path: &str) -> AppResult<Vec<String>> {
    if relative_path.contains("..") {
        return Err(AppError::invalid_operation(format!(
            "Relative path '{relative_path}' cannot contain '..'"
        )));
    }
    let mut segments: Vec<String> = relative_path
        .split(['/', '\\'])
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != ".")
        .map(str::to_string)
        .collect();
    segments.pop();
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Reports 2024").is_ok());
        assert!(validate_name("  ").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("..").is_err());
    }

    #[test]
    fn test_folder_segments() {
        assert_eq!(
            folder_segments("A/B/file.txt").unwrap(),
            vec!["A".to_string(), "B".to_string()]
        );
        assert_eq!(folder_segments("/A//./file.txt").unwrap(), vec!["A".to_string()]);
        assert!(folder_segments("file.txt").unwrap().is_empty());
        assert!(folder_segments("A/../etc/passwd").is_err());
    }
}
