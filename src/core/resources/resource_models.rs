use serde::{Deserialize, Serialize};

/// One entry of the community resource catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: i64,
    /// e.g. "TypeScript", "C#"
    pub subject: String,
    /// e.g. "General", "Interfaces"
    pub topic: String,
    pub description: String,
    pub link: String,
    /// Submitter's user id.
    pub added_by: String,
    /// Only approved resources are shown by `/resources`.
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub approver: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

impl Resource {
    pub fn added_by_id(&self) -> Option<u64> {
        self.added_by.parse().ok()
    }

    /// Case-insensitive match against subject or topic.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        self.subject.eq_ignore_ascii_case(query) || self.topic.eq_ignore_ascii_case(query)
    }
}

/// A validated submission, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResource {
    pub subject: String,
    pub topic: String,
    pub description: String,
    pub link: String,
    pub added_by: u64,
    pub created_at: String,
}

impl NewResource {
    pub fn into_resource(self, id: i64) -> Resource {
        Resource {
            id,
            subject: self.subject,
            topic: self.topic,
            description: self.description,
            link: self.link,
            added_by: self.added_by.to_string(),
            approved: false,
            approver: None,
            created_at: self.created_at,
        }
    }
}

/// Result of `/resources <topic>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceSearch {
    pub builtin: Vec<&'static str>,
    pub catalog: Vec<Resource>,
}

impl ResourceSearch {
    pub fn is_empty(&self) -> bool {
        self.builtin.is_empty() && self.catalog.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(subject: &str, topic: &str) -> Resource {
        NewResource {
            subject: subject.into(),
            topic: topic.into(),
            description: "d".into(),
            link: "https://example.com".into(),
            added_by: 3,
            created_at: String::new(),
        }
        .into_resource(1)
    }

    #[test]
    fn matches_subject_or_topic_ignoring_case() {
        let r = resource("Rust", "Traits");
        assert!(r.matches("rust"));
        assert!(r.matches(" TRAITS "));
        assert!(!r.matches("go"));
    }

    #[test]
    fn new_resources_start_unapproved() {
        let r = resource("Rust", "Traits");
        assert!(!r.approved);
        assert!(r.approver.is_none());
        assert_eq!(r.added_by_id(), Some(3));
    }
}
