use std::path::Path;

use crate::ConfigError;

/// A category listing to harvest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub url: String,
    pub name: String,
}

/// Load the category list from a plain-text file.
///
/// # Errors
///
/// Returns [`ConfigError::CategoriesFileIo`] if the file cannot be read.
pub fn load_categories(path: &Path) -> Result<Vec<Category>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CategoriesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(parse_categories(&content))
}

/// Parse category lines of the form `URL` or `URL|Display name`.
///
/// Blank lines and lines starting with `#` are skipped. Categories without a
/// display name are named after their 1-based line number.
#[must_use]
pub fn parse_categories(content: &str) -> Vec<Category> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let line_num = idx + 1;
            let (url, name) = match line.split_once('|') {
                Some((url, name)) => (url.trim(), name.trim().to_string()),
                None => (line, format!("Категорія {line_num}")),
            };
            Some(Category {
                url: url.to_string(),
                name,
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "categories_test.rs"]
mod tests;
