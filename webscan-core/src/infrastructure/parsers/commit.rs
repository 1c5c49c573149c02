//! VCS commit extraction from dependency locators
//!
//! Locators are matched against an ordered rule table; the first rule whose
//! pattern matches supplies the commit. New locator forms are added as rules.
//! When no rule matches, URLs on a known git host are checked for a `ref`
//! query parameter or a fragment.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// A named pattern whose first capture group is the commit
#[derive(Debug)]
pub struct CommitRule {
    pub name: &'static str,
    pattern: Regex,
}

impl CommitRule {
    fn new(name: &'static str, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn extract(&self, locator: &str) -> Option<String> {
        self.pattern
            .captures(locator)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

const RULE_SOURCES: &[(&str, &str)] = &[
    // git://, git+ssh://, git+https://, ssh://
    (
        "git-url",
        r"(?:^|.+@)(?:git(?:\+(?:ssh|https))?|ssh)://.+#(\w+)$",
    ),
    ("https-git", r"(?:^|.+@)https://.+\.git#(\w+)$"),
    (
        "github-codeload",
        r"https://codeload\.github\.com(?:/[\w.-]+){2}/tar\.gz/(\w+)$",
    ),
    ("commit-suffix", r".+#commit[:=](\w+)$"),
    // github:, gitlab:, bitbucket: shorthands
    ("host-shorthand", r"^(?:github|gitlab|bitbucket):.+#(\w+)$"),
];

const GIT_HOSTS: &[&str] = &["bitbucket.org", "github.com", "gitlab.com"];

static COMMIT_RULES: Lazy<Vec<CommitRule>> = Lazy::new(|| {
    RULE_SOURCES
        .iter()
        .filter_map(|(name, pattern)| match CommitRule::new(name, pattern) {
            Ok(rule) => Some(rule),
            Err(e) => {
                tracing::error!(rule = name, error = %e, "Invalid commit extraction rule");
                None
            }
        })
        .collect()
});

/// The rule table, in priority order
pub fn commit_rules() -> &'static [CommitRule] {
    &COMMIT_RULES
}

/// Extract the commit a dependency locator pins to, if any
pub fn try_extract_commit(locator: &str) -> Option<String> {
    if locator.is_empty() {
        return None;
    }

    if let Some(commit) = commit_rules()
        .iter()
        .find_map(|rule| rule.extract(locator))
    {
        return Some(commit);
    }

    extract_from_git_host_url(locator)
}

fn extract_from_git_host_url(locator: &str) -> Option<String> {
    let url = Url::parse(locator).ok()?;
    let host = url.host_str()?;
    if !GIT_HOSTS.contains(&host) {
        return None;
    }

    if let Some((_, reference)) = url
        .query_pairs()
        .find(|(key, value)| key == "ref" && !value.is_empty())
    {
        return Some(reference.into_owned());
    }

    url.fragment()
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
}
