//! Alias grouping of vulnerability records
//!
//! Two records belong to the same group when their alias lists intersect or
//! when one lists the other's id as an alias. Groups are the connected
//! components of that relation, computed with an alias index and a
//! union-find so the cost stays near-linear in the number of aliases.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use webscan_core::domain::vulnerability::entities::{GroupInfo, Vulnerability};

use super::severity;

/// Id and aliases of one record, the only input grouping needs
#[derive(Debug, Clone, Copy)]
pub struct IdAliases<'a> {
    pub id: &'a str,
    pub aliases: &'a [String],
}

impl<'a> From<&'a Vulnerability> for IdAliases<'a> {
    fn from(vulnerability: &'a Vulnerability) -> Self {
        Self {
            id: &vulnerability.id,
            aliases: &vulnerability.aliases,
        }
    }
}

struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = node;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a == root_b {
            return;
        }
        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => self.parent[root_a] = root_b,
            std::cmp::Ordering::Greater => self.parent[root_b] = root_a,
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] += 1;
            }
        }
    }
}

/// Group records by shared aliases
///
/// Groups come out ordered by the index of their first member. `max_severity`
/// is left empty; see [`group_with_severity`].
pub fn group(records: &[IdAliases<'_>]) -> Vec<GroupInfo> {
    let mut sets = DisjointSet::new(records.len());

    // alias -> first record listing it; later records listing it join that record
    let mut alias_owner: HashMap<&str, usize> = HashMap::new();
    for (index, record) in records.iter().enumerate() {
        for alias in record.aliases {
            match alias_owner.entry(alias.as_str()) {
                Entry::Occupied(owner) => sets.union(*owner.get(), index),
                Entry::Vacant(slot) => {
                    slot.insert(index);
                }
            }
        }
    }
    for (index, record) in records.iter().enumerate() {
        if let Some(&owner) = alias_owner.get(record.id) {
            sets.union(owner, index);
        }
    }

    let mut component_of_root: HashMap<usize, usize> = HashMap::new();
    let mut components: Vec<Vec<usize>> = Vec::new();
    for index in 0..records.len() {
        let root = sets.find(index);
        let component = *component_of_root.entry(root).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[component].push(index);
    }

    components
        .into_iter()
        .map(|members| {
            let mut ids: Vec<String> = members.iter().map(|&i| records[i].id.to_string()).collect();
            let mut aliases: Vec<String> = members
                .iter()
                .flat_map(|&i| records[i].aliases.iter().cloned())
                .chain(ids.iter().cloned())
                .collect();
            ids.sort();
            aliases.sort();
            aliases.dedup();

            GroupInfo {
                ids,
                aliases,
                max_severity: None,
            }
        })
        .collect()
}

/// Group full records and attach each group's highest member score
pub fn group_with_severity(vulnerabilities: &[Vulnerability]) -> Vec<GroupInfo> {
    let records: Vec<IdAliases<'_>> = vulnerabilities.iter().map(IdAliases::from).collect();
    let mut groups = group(&records);

    for group in &mut groups {
        group.max_severity = severity::max_severity(
            vulnerabilities
                .iter()
                .filter(|vulnerability| group.ids.contains(&vulnerability.id)),
        );
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(id: &str, aliases: &[&str]) -> (String, Vec<String>) {
        (id.to_string(), aliases.iter().map(|a| a.to_string()).collect())
    }

    fn run(input: &[(String, Vec<String>)]) -> Vec<GroupInfo> {
        let records: Vec<IdAliases<'_>> = input
            .iter()
            .map(|(id, aliases)| IdAliases { id, aliases })
            .collect();
        group(&records)
    }

    #[test]
    fn test_id_listed_as_alias_joins_group() {
        let groups = run(&[owned("GHSA-1", &["CVE-1"]), owned("CVE-1", &[])]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].ids, vec!["CVE-1", "GHSA-1"]);
        assert_eq!(groups[0].aliases, vec!["CVE-1", "GHSA-1"]);
    }

    #[test]
    fn test_transitive_alias_chain_forms_one_group() {
        let groups = run(&[
            owned("A", &["X"]),
            owned("B", &["X", "Y"]),
            owned("C", &["Y"]),
        ]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].ids, vec!["A", "B", "C"]);
        assert_eq!(groups[0].aliases, vec!["A", "B", "C", "X", "Y"]);
    }

    #[test]
    fn test_unrelated_records_stay_apart_in_first_member_order() {
        let groups = run(&[
            owned("OSV-2", &[]),
            owned("GHSA-1", &["CVE-1"]),
            owned("OSV-1", &["CVE-1"]),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].ids, vec!["OSV-2"]);
        assert_eq!(groups[0].aliases, vec!["OSV-2"]);
        assert_eq!(groups[1].ids, vec!["GHSA-1", "OSV-1"]);
    }

    #[test]
    fn test_late_alias_reference_merges_earlier_groups() {
        let groups = run(&[
            owned("A", &[]),
            owned("B", &[]),
            owned("C", &["A", "B"]),
        ]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(group(&[]).is_empty());
    }

    #[test]
    fn test_group_with_severity_takes_member_maximum() {
        let vulnerabilities: Vec<Vulnerability> = serde_json::from_value(serde_json::json!([
            {"id": "GHSA-1", "aliases": ["CVE-1"], "severity": [{"type": "CVSS_V3", "score": "5.0"}]},
            {"id": "CVE-1", "severity": [{"type": "CVSS_V3", "score": "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H"}]},
            {"id": "OSV-1"}
        ]))
        .unwrap();

        let groups = group_with_severity(&vulnerabilities);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].max_severity, Some(9.8));
        assert_eq!(groups[1].ids, vec!["OSV-1"]);
        assert_eq!(groups[1].max_severity, None);
    }
}
