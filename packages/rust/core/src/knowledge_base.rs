//! The fixed, ordered table of first-aid topics.
//!
//! The default table ships inside the binary (`data/first_aid.json`); a
//! replacement file can be supplied through config. Either way the table is
//! validated once and never mutated afterwards.

use std::collections::HashSet;
use std::path::Path;

use noahaid_shared::{NoahAidError, Result, Topic};
use tracing::debug;

/// Topic table compiled into the binary.
const BUNDLED_TOPICS: &str = include_str!("../data/first_aid.json");

/// Immutable, ordered collection of topics. Order decides match priority.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    topics: Vec<Topic>,
}

impl KnowledgeBase {
    /// Build a knowledge base, rejecting tables that break its invariants.
    pub fn new(topics: Vec<Topic>) -> Result<Self> {
        validate(&topics)?;
        Ok(Self { topics })
    }

    /// The built-in first-aid table.
    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_TOPICS)
    }

    /// Parse a JSON array of topics.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let topics: Vec<Topic> = serde_json::from_str(json)
            .map_err(|e| NoahAidError::parse(format!("invalid topic table: {e}")))?;
        Self::new(topics)
    }

    /// Load a topic table from a JSON file on disk.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| NoahAidError::io(path, e))?;
        let kb = Self::from_json_str(&content)?;
        debug!(?path, topics = kb.len(), "loaded knowledge base");
        Ok(kb)
    }

    /// Load from `path` when given, otherwise fall back to the bundled table.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from(p),
            None => Self::bundled(),
        }
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Topic> {
        self.topics.iter()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Look a topic up by its stable id.
    pub fn get(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == id)
    }
}

impl<'a> IntoIterator for &'a KnowledgeBase {
    type Item = &'a Topic;
    type IntoIter = std::slice::Iter<'a, Topic>;

    fn into_iter(self) -> Self::IntoIter {
        self.topics.iter()
    }
}

fn validate(topics: &[Topic]) -> Result<()> {
    if topics.is_empty() {
        return Err(NoahAidError::validation("knowledge base has no topics"));
    }

    let mut seen = HashSet::new();
    for topic in topics {
        if !seen.insert(topic.id.as_str()) {
            return Err(NoahAidError::validation(format!(
                "duplicate topic id '{}'",
                topic.id
            )));
        }
        if topic.keywords.is_empty() {
            return Err(NoahAidError::validation(format!(
                "topic '{}' has no keywords",
                topic.id
            )));
        }
        if topic.steps.is_empty() {
            return Err(NoahAidError::validation(format!(
                "topic '{}' has no steps",
                topic.id
            )));
        }
        for keyword in &topic.keywords {
            if keyword.trim().is_empty() {
                return Err(NoahAidError::validation(format!(
                    "topic '{}' has a blank keyword",
                    topic.id
                )));
            }
            // Matching compares against a lowercased query without re-folding keywords.
            if *keyword != keyword.to_lowercase() {
                return Err(NoahAidError::validation(format!(
                    "topic '{}' keyword '{keyword}' must be lowercase",
                    topic.id
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use noahaid_shared::Severity;

    fn topic(id: &str, keywords: &[&str], steps: &[&str]) -> Topic {
        Topic {
            id: id.into(),
            title: format!("{id} title"),
            severity: Severity::Low,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            steps: steps.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn bundled_table_loads_in_order() {
        let kb = KnowledgeBase::bundled().expect("bundled table");
        let ids: Vec<&str> = kb.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["bleeding", "choking", "burn", "cpr"]);
    }

    #[test]
    fn bundled_table_content() {
        let kb = KnowledgeBase::bundled().expect("bundled table");

        let bleeding = kb.get("bleeding").expect("bleeding");
        assert_eq!(bleeding.title, "Severe bleeding");
        assert_eq!(bleeding.severity, Severity::High);
        assert_eq!(bleeding.keywords.len(), 13);
        assert_eq!(bleeding.steps.len(), 6);

        let choking = kb.get("choking").expect("choking");
        assert_eq!(choking.title, "Choking (conscious adult)");
        assert_eq!(choking.steps.len(), 5);
        assert!(choking.keywords.contains(&"can't breathe".to_string()));

        let burn = kb.get("burn").expect("burn");
        assert_eq!(burn.severity, Severity::Medium);
        assert_eq!(burn.keywords.first().map(String::as_str), Some("burn"));

        let cpr = kb.get("cpr").expect("cpr");
        assert_eq!(cpr.title, "CPR (adult)");
        assert_eq!(cpr.keywords.last().map(String::as_str), Some("unconscious"));
    }

    #[test]
    fn get_unknown_id_is_none() {
        let kb = KnowledgeBase::bundled().expect("bundled table");
        assert!(kb.get("snakebite").is_none());
    }

    #[test]
    fn empty_table_is_rejected() {
        let err = KnowledgeBase::new(vec![]).unwrap_err();
        assert!(err.to_string().contains("no topics"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = KnowledgeBase::new(vec![
            topic("burn", &["burn"], &["Cool it."]),
            topic("burn", &["scald"], &["Cool it."]),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate topic id 'burn'"));
    }

    #[test]
    fn empty_keywords_or_steps_are_rejected() {
        assert!(KnowledgeBase::new(vec![topic("a", &[], &["step"])]).is_err());
        assert!(KnowledgeBase::new(vec![topic("a", &["kw"], &[])]).is_err());
        assert!(KnowledgeBase::new(vec![topic("a", &["  "], &["step"])]).is_err());
    }

    #[test]
    fn uppercase_keyword_is_rejected() {
        let err = KnowledgeBase::new(vec![topic("cpr", &["CPR"], &["Push."])]).unwrap_err();
        assert!(err.to_string().contains("must be lowercase"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = KnowledgeBase::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, NoahAidError::Parse { .. }));
    }

    #[test]
    fn load_from_missing_file_is_io_error() {
        let err = KnowledgeBase::load_from(Path::new("/nonexistent/noahaid/topics.json"))
            .unwrap_err();
        assert!(matches!(err, NoahAidError::Io { .. }));
    }

    #[test]
    fn resolve_reads_override_file() {
        let path = std::env::temp_dir().join(format!("noahaid_kb_{}.json", uuid::Uuid::now_v7()));
        let json = r#"[{"id":"sting","title":"Bee sting","severity":"low",
            "keywords":["sting","bee"],"steps":["Scrape out the stinger."]}]"#;
        std::fs::write(&path, json).expect("write kb");

        let kb = KnowledgeBase::resolve(Some(&path)).expect("resolve");
        assert_eq!(kb.len(), 1);
        assert_eq!(kb.topics()[0].id, "sting");

        let _ = std::fs::remove_file(&path);
    }
}
