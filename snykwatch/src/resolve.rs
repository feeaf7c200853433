use std::collections::HashSet;

use crate::model::Target;

/// Target id to display name, limited to configured targets that exist
/// remotely.
///
/// Entries keep the order the API returned them in. Each id appears once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionMap {
    entries: Vec<Target>,
}

impl ResolutionMap {
    /// Keep the remote targets whose display name is in `names`.
    pub fn resolve<I>(remote: I, names: &[String]) -> Self
    where
        I: IntoIterator<Item = Target>,
    {
        let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
        let mut seen_ids: HashSet<String> = HashSet::new();

        let entries = remote
            .into_iter()
            .filter(|t| wanted.contains(t.display_name.as_str()))
            .filter(|t| seen_ids.insert(t.id.clone()))
            .collect();

        Self { entries }
    }

    pub fn get(&self, target_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|t| t.id == target_id)
            .map(|t| t.display_name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|t| (t.id.as_str(), t.display_name.as_str()))
    }

    /// Resolved display names in map order, without repeats.
    pub fn names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .map(|t| t.display_name.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: &str, name: &str) -> Target {
        Target {
            id: id.to_string(),
            display_name: name.to_string(),
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn keeps_only_configured_targets() {
        let remote = vec![
            target("T1", "svc-a"),
            target("T2", "svc-b"),
            target("T3", "svc-c"),
        ];
        let map = ResolutionMap::resolve(remote, &names(&["svc-a", "svc-b"]));

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("T1"), Some("svc-a"));
        assert_eq!(map.get("T2"), Some("svc-b"));
        assert!(map.get("T3").is_none());
    }

    #[test]
    fn preserves_remote_order() {
        let remote = vec![target("T2", "svc-b"), target("T1", "svc-a")];
        let map = ResolutionMap::resolve(remote, &names(&["svc-a", "svc-b"]));
        let ids: Vec<&str> = map.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["T2", "T1"]);
    }

    #[test]
    fn disjoint_names_resolve_to_empty() {
        let remote = vec![target("T1", "svc-a")];
        let map = ResolutionMap::resolve(remote, &names(&["other"]));
        assert!(map.is_empty());
        assert!(map.names().is_empty());
    }

    #[test]
    fn configured_name_missing_remotely_is_dropped() {
        let remote = vec![target("T1", "svc-a")];
        let map = ResolutionMap::resolve(remote, &names(&["svc-a", "ghost"]));
        assert_eq!(map.names(), vec!["svc-a"]);
    }

    #[test]
    fn shared_display_name_lists_name_once() {
        let remote = vec![target("T1", "svc-a"), target("T9", "svc-a")];
        let map = ResolutionMap::resolve(remote, &names(&["svc-a"]));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("T9"), Some("svc-a"));
        assert_eq!(map.names(), vec!["svc-a"]);
    }

    #[test]
    fn duplicate_ids_keep_first_entry() {
        let remote = vec![target("T1", "svc-a"), target("T1", "svc-b")];
        let map = ResolutionMap::resolve(remote, &names(&["svc-a", "svc-b"]));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("T1"), Some("svc-a"));
    }
}
