//! Severity scoring and classification
//!
//! Scores come from OSV `severity` entries: plain numeric strings are taken
//! as-is and CVSS v3 vectors are converted to their base score. Records
//! without either fall back to the `database_specific` CVSS fields some
//! databases publish.

use tracing::warn;

use webscan_core::domain::vulnerability::{
    entities::{GroupInfo, Vulnerability},
    value_objects::{SeverityCategory, SeverityType},
};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

/// Round up to one decimal place
pub fn round_up_tenth(value: f64) -> f64 {
    (value * 10.0).ceil() / 10.0
}

/// Map a numeric score to its bucket
///
/// Scores outside `[0, 10]` are logged and reported as [`SeverityCategory::High`].
pub fn classify(score: f64) -> SeverityCategory {
    let rounded = round_up_tenth(score);
    if rounded.is_nan() || !(MIN_SCORE..=MAX_SCORE).contains(&rounded) {
        warn!(score = score, "Severity score outside the 0-10 range, classifying as High");
        return SeverityCategory::High;
    }

    if rounded <= 3.9 {
        SeverityCategory::Low
    } else if rounded <= 6.9 {
        SeverityCategory::Moderate
    } else {
        SeverityCategory::High
    }
}

/// Classify a group's maximum severity; groups without a score count as 0.0
pub fn classify_group(group: Option<&GroupInfo>) -> SeverityCategory {
    classify(group.and_then(|g| g.max_severity).unwrap_or(MIN_SCORE))
}

/// Highest score derivable from a vulnerability record
pub fn vulnerability_score(vulnerability: &Vulnerability) -> Option<f64> {
    let declared = vulnerability
        .severity
        .iter()
        .filter_map(|severity| {
            let score = severity.score.trim();
            if let Ok(value) = score.parse::<f64>() {
                return Some(value);
            }
            match severity.severity_type {
                SeverityType::CvssV3 => cvss_v3_base_score(score),
                SeverityType::Unknown if score.starts_with("CVSS:3.") => cvss_v3_base_score(score),
                _ => None,
            }
        })
        .fold(None, max_score);

    declared.or_else(|| database_specific_score(vulnerability))
}

/// Largest member score, or `None` when no member has one
pub fn max_severity<'a, I>(members: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Vulnerability>,
{
    members
        .into_iter()
        .filter_map(vulnerability_score)
        .fold(None, max_score)
}

fn max_score(acc: Option<f64>, score: f64) -> Option<f64> {
    Some(acc.map_or(score, |current| current.max(score)))
}

fn database_specific_score(vulnerability: &Vulnerability) -> Option<f64> {
    let specific = vulnerability.database_specific.as_ref()?;
    ["cvss_score", "cvss"].iter().find_map(|key| {
        let value = specific.get(key)?;
        value
            .as_f64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
    })
}

/// CVSS v3.x base score of a vector such as `CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H`
pub fn cvss_v3_base_score(vector: &str) -> Option<f64> {
    let mut parts = vector.split('/');
    if !parts.next()?.starts_with("CVSS:3.") {
        return None;
    }

    let mut av = None;
    let mut ac = None;
    let mut pr = None;
    let mut ui = None;
    let mut scope_changed = None;
    let mut c = None;
    let mut i = None;
    let mut a = None;

    for metric in parts {
        let (key, value) = metric.split_once(':')?;
        match key {
            "AV" => {
                av = Some(match value {
                    "N" => 0.85,
                    "A" => 0.62,
                    "L" => 0.55,
                    "P" => 0.2,
                    _ => return None,
                })
            }
            "AC" => {
                ac = Some(match value {
                    "L" => 0.77,
                    "H" => 0.44,
                    _ => return None,
                })
            }
            "PR" => pr = Some(value),
            "UI" => {
                ui = Some(match value {
                    "N" => 0.85,
                    "R" => 0.62,
                    _ => return None,
                })
            }
            "S" => {
                scope_changed = Some(match value {
                    "U" => false,
                    "C" => true,
                    _ => return None,
                })
            }
            "C" => c = Some(impact_weight(value)?),
            "I" => i = Some(impact_weight(value)?),
            "A" => a = Some(impact_weight(value)?),
            // temporal and environmental metrics do not affect the base score
            _ => {}
        }
    }

    let scope_changed = scope_changed?;
    let pr = match (pr?, scope_changed) {
        ("N", _) => 0.85,
        ("L", false) => 0.62,
        ("L", true) => 0.68,
        ("H", false) => 0.27,
        ("H", true) => 0.5,
        _ => return None,
    };

    let iss = 1.0 - (1.0 - c?) * (1.0 - i?) * (1.0 - a?);
    let impact = if scope_changed {
        7.52 * (iss - 0.029) - 3.25 * (iss - 0.02).powi(15)
    } else {
        6.42 * iss
    };
    let exploitability = 8.22 * av? * ac? * pr * ui?;

    if impact <= 0.0 {
        return Some(0.0);
    }
    let base = if scope_changed {
        1.08 * (impact + exploitability)
    } else {
        impact + exploitability
    };
    Some(cvss_round_up(base.min(MAX_SCORE)))
}

fn impact_weight(value: &str) -> Option<f64> {
    match value {
        "H" => Some(0.56),
        "L" => Some(0.22),
        "N" => Some(0.0),
        _ => None,
    }
}

/// CVSS v3.1 round-up, which works on integers to avoid float noise
fn cvss_round_up(value: f64) -> f64 {
    let scaled = (value * 100_000.0).round() as i64;
    if scaled % 10_000 == 0 {
        scaled as f64 / 100_000.0
    } else {
        ((scaled / 10_000) + 1) as f64 / 10.0
    }
}
