use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub display_name: String,
    /// Stable identifier used for assignment (typically the email address).
    pub unique_name: String,
}

impl TeamMember {
    /// Case-insensitive substring match on display name or unique name.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.display_name.to_lowercase().contains(&needle)
            || self.unique_name.to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_either_name_field() {
        let member = TeamMember {
            id: "1".into(),
            display_name: "Ada Lovelace".into(),
            unique_name: "ada@example.com".into(),
        };
        assert!(member.matches("love"));
        assert!(member.matches("ADA@"));
        assert!(!member.matches("babbage"));
    }
}
