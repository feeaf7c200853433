#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub target_id: String,
}

/// A high or critical finding.
///
/// `scan_item_id` is the id of the project the issue was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub scan_item_id: String,
}
