use serde::{Deserialize, Serialize};

/// A node in the project's area hierarchy, flattened to its full path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub id: i32,
    pub name: String,
    pub path: String,
}

impl Area {
    pub fn new(id: i32, name: impl Into<String>, raw_path: &str) -> Self {
        let name = name.into();
        let path = normalize_path(raw_path);
        Self { id, name, path }
    }

    /// Last path segment, for compact display.
    pub fn display_name(&self) -> &str {
        self.path.rsplit('\\').next().unwrap_or(&self.name)
    }
}

/// Normalizes an area path as returned by the classification-nodes API.
/// The API inserts a structural "Area" node (`\Project\Area\Team`) that work
/// items do not carry (`Project\Team`); this strips it once, at ingestion.
pub fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim_matches('\\');
    let parts: Vec<&str> = trimmed.split('\\').collect();
    if parts.len() >= 2 && parts[1] == "Area" {
        let mut kept = vec![parts[0]];
        kept.extend(&parts[2..]);
        kept.join("\\")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_structural_area_segment() {
        assert_eq!(normalize_path("\\ProjectX\\Area\\TeamA"), "ProjectX\\TeamA");
        assert_eq!(normalize_path("\\ProjectX\\Area"), "ProjectX");
        assert_eq!(
            normalize_path("ProjectX\\Area\\TeamA\\SubTeam"),
            "ProjectX\\TeamA\\SubTeam"
        );
    }

    #[test]
    fn path_without_area_segment_only_loses_outer_separators() {
        assert_eq!(normalize_path("\\ProjectX\\TeamA\\"), "ProjectX\\TeamA");
        assert_eq!(normalize_path("ProjectX"), "ProjectX");
    }

    #[test]
    fn area_segment_elsewhere_is_kept() {
        // Only the root-level structural node is stripped.
        assert_eq!(
            normalize_path("ProjectX\\TeamA\\Area"),
            "ProjectX\\TeamA\\Area"
        );
    }

    #[test]
    fn display_name_is_last_segment() {
        let area = Area::new(1, "TeamA", "\\ProjectX\\Area\\TeamA");
        assert_eq!(area.path, "ProjectX\\TeamA");
        assert_eq!(area.display_name(), "TeamA");
    }
}
