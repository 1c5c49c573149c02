//! Parser for pip `requirements.txt` files

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use super::normalize_packages;
use super::traits::ManifestParser;
use crate::application::errors::ParseError;
use crate::domain::vulnerability::{
    entities::{ManifestFile, PackageDetails},
    value_objects::Ecosystem,
};

/// Version recorded when a requirement does not pin one
pub const UNPINNED_VERSION: &str = "0.0.0";

/// Constraint operators in priority order; `!=` excludes rather than pins
const CONSTRAINTS: [&str; 4] = ["==", ">=", "~=", "!="];

static RE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(^|\s+)#.*$").unwrap());

static RE_CONTINUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^\\]|^)(\\{2})*\\$").unwrap());

static RE_NAME_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-_.]+").unwrap());

/// Line ends in an odd number of backslashes
fn is_line_continuation(line: &str) -> bool {
    RE_CONTINUATION.is_match(line)
}

fn remove_comments(line: &str) -> String {
    RE_COMMENT.replace(line, "").trim().to_string()
}

/// Flags, URLs and filesystem paths are not requirements
fn is_not_requirement_line(line: &str) -> bool {
    line.is_empty()
        || line.starts_with('-')
        || line.starts_with("https://")
        || line.starts_with("http://")
        || line.starts_with('.')
        || line.starts_with('/')
}

/// PEP-503 name normalization, with any `[extras]` suffix dropped
///
/// Advisories do not always use normalized names, so both sides are
/// normalized; this favours false positives over missed matches.
pub fn normalize_requirement_name(name: &str) -> String {
    let normalized = RE_NAME_SEPARATORS.replace_all(name, "-").to_lowercase();
    match normalized.split_once('[') {
        Some((base, _)) => base.to_string(),
        None => normalized,
    }
}

/// Name and version of a single requirement line
fn parse_line(line: &str) -> (String, String) {
    let Some(constraint) = CONSTRAINTS.iter().find(|op| line.contains(*op)) else {
        return (normalize_requirement_name(line), UNPINNED_VERSION.to_string());
    };

    let (name, rest) = line.split_once(constraint).unwrap_or((line, ""));
    let version = if *constraint == "!=" {
        UNPINNED_VERSION.to_string()
    } else {
        rest.split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string()
    };

    (normalize_requirement_name(name.trim()), version)
}

/// Logical lines of a requirements file, with continuations joined
fn logical_lines(content: &str) -> Vec<String> {
    let mut lines = content.lines();
    let mut logical = Vec::new();

    while let Some(line) = lines.next() {
        let mut line = line.to_string();
        while is_line_continuation(&line) {
            line.pop();
            match lines.next() {
                Some(next) => line.push_str(next),
                None => break,
            }
        }
        logical.push(line);
    }

    logical
}

/// Group tag for a requirements file: its file name without extension
pub fn requirements_group(file: &ManifestFile) -> String {
    let source = if file.path.is_empty() {
        &file.name
    } else {
        &file.path
    };
    Path::new(source)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Parser for requirements.txt files
pub struct RequirementsTxtParser;

impl Default for RequirementsTxtParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequirementsTxtParser {
    pub fn new() -> Self {
        Self
    }
}

impl ManifestParser for RequirementsTxtParser {
    fn parse_file(&self, file: &ManifestFile) -> Result<Vec<PackageDetails>, ParseError> {
        let group = requirements_group(file);

        let packages: Vec<PackageDetails> = logical_lines(&file.content)
            .iter()
            .map(|line| remove_comments(line))
            .filter(|line| !is_not_requirement_line(line))
            .map(|line| {
                let (name, version) = parse_line(&line);
                PackageDetails::new(name, version, Ecosystem::pypi()).with_groups([group.as_str()])
            })
            .collect();

        tracing::debug!(path = %file.path, count = packages.len(), "Parsed requirements");

        Ok(packages)
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::pypi()
    }
}

/// Parse several requirements files into one normalized package list
///
/// A package listed in more than one file carries the group tag of every
/// file it appears in.
pub fn parse_requirements_files(files: &[ManifestFile]) -> Result<Vec<PackageDetails>, ParseError> {
    let parser = RequirementsTxtParser::new();
    let mut packages = Vec::new();
    for file in files {
        packages.extend(parser.parse_file(file)?);
    }
    Ok(normalize_packages(packages))
}
