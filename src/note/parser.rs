//! # YAML Frontmatter Parser
//!
//! Parses and serializes Markdown files with YAML frontmatter. Generic over
//! the header type so plain notes and task notes share one codec.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use serde::{de::DeserializeOwned, Serialize};

use crate::{
    constants::FRONTMATTER_DELIMITER,
    error::{Error, Result},
};

/// Splits a document into its raw YAML header and trimmed body.
///
/// The header starts at a leading `---` line and ends at the next line that
/// is exactly `---`.
pub fn split(content: &str) -> Result<(&str, &str)> {
    let content = content.trim_start_matches('\u{feff}').trim_start();

    let after_start = content
        .strip_prefix(FRONTMATTER_DELIMITER)
        .ok_or(Error::NoFrontMatter)?;
    let after_start = after_start
        .strip_prefix("\r\n")
        .or_else(|| after_start.strip_prefix('\n'))
        .ok_or(Error::NoFrontMatter)?;

    let mut offset = 0;
    for line in after_start.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == FRONTMATTER_DELIMITER {
            let yaml = &after_start[..offset];
            let body = &after_start[offset + line.len()..];
            return Ok((yaml, body.trim()));
        }
        offset += line.len();
    }

    Err(Error::NoFrontMatter)
}

/// Parses a Markdown document into a typed header and its body.
///
/// # Returns
/// A tuple of (header, trimmed body)
pub fn parse<H: DeserializeOwned + 'static>(content: &str) -> Result<(H, String)> {
    let (yaml, body) = split(content)?;
    let header =
        serde_yml::from_str(yaml).map_err(|e| Error::InvalidFrontMatter(e.to_string()))?;
    Ok((header, body.to_string()))
}

/// Serializes a header and body back to Markdown.
///
/// Output shape: `---\n<yaml>---\n\n<body>\n`.
pub fn serialize<H: Serialize>(header: &H, body: &str) -> Result<String> {
    let yaml =
        serde_yml::to_string(header).map_err(|e| Error::InvalidFrontMatter(e.to_string()))?;

    let mut result = String::with_capacity(yaml.len() + body.len() + 16);
    result.push_str(FRONTMATTER_DELIMITER);
    result.push('\n');
    result.push_str(&yaml);
    if !yaml.ends_with('\n') {
        result.push('\n');
    }
    result.push_str(FRONTMATTER_DELIMITER);
    result.push('\n');

    let body = body.trim();
    if !body.is_empty() {
        result.push('\n');
        result.push_str(body);
        result.push('\n');
    }

    Ok(result)
}
