//! Query → topic selection.
//!
//! Plain substring containment on the lowercased query, first topic wins.
//! There is no scoring and no word-boundary handling: "burns" hits the
//! `burn` keyword, and a query mentioning two topics resolves to whichever
//! comes first in the knowledge base.

use noahaid_shared::{TitleMatch, Topic};
use tracing::trace;

/// Select the first topic matching `query`, comparing titles as
/// [`TitleMatch::TitleInQuery`].
pub fn find_match<'a>(query: &str, topics: &'a [Topic]) -> Option<&'a Topic> {
    find_match_with(query, topics, TitleMatch::default())
}

/// Select the first topic whose keyword (or title, per `title_match`) is
/// contained in the lowercased query.
///
/// Empty and whitespace-only queries never match.
pub fn find_match_with<'a>(
    query: &str,
    topics: &'a [Topic],
    title_match: TitleMatch,
) -> Option<&'a Topic> {
    if query.trim().is_empty() {
        return None;
    }

    let q = query.to_lowercase();
    topics.iter().find(|topic| {
        let hit = topic_matches(&q, topic, title_match);
        trace!(topic = %topic.id, hit, "evaluated topic");
        hit
    })
}

/// `lowered_query` must already be lowercase.
fn topic_matches(lowered_query: &str, topic: &Topic, title_match: TitleMatch) -> bool {
    if topic
        .keywords
        .iter()
        .any(|k| lowered_query.contains(k.as_str()))
    {
        return true;
    }

    let title = topic.title.to_lowercase();
    match title_match {
        TitleMatch::TitleInQuery => lowered_query.contains(&title),
        TitleMatch::QueryInTitle => title.contains(lowered_query),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge_base::KnowledgeBase;
    use noahaid_shared::Severity;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::bundled().expect("bundled table")
    }

    fn id_of(query: &str) -> Option<String> {
        find_match(query, kb().topics()).map(|t| t.id.clone())
    }

    fn custom(id: &str, title: &str, keywords: &[&str]) -> Topic {
        Topic {
            id: id.into(),
            title: title.into(),
            severity: Severity::Medium,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            steps: vec!["Stay calm.".into()],
        }
    }

    #[test]
    fn title_matches_its_own_topic() {
        let kb = kb();
        for topic in kb.iter() {
            let single = std::slice::from_ref(topic);
            let found = find_match(&topic.title, single).map(|t| t.id.as_str());
            assert_eq!(found, Some(topic.id.as_str()), "title of {}", topic.id);
        }
    }

    #[test]
    fn every_keyword_resolves_to_first_matching_topic() {
        let kb = kb();
        for topic in kb.iter() {
            for keyword in &topic.keywords {
                let expected = kb
                    .iter()
                    .find(|t| {
                        t.keywords.iter().any(|k| keyword.contains(k.as_str()))
                            || keyword.contains(&t.title.to_lowercase())
                    })
                    .map(|t| t.id.as_str());
                let found = find_match(keyword, kb.topics()).map(|t| t.id.as_str());
                assert_eq!(found, expected, "keyword '{keyword}'");
                assert!(found.is_some());
            }
        }
    }

    #[test]
    fn empty_and_whitespace_queries_never_match() {
        assert_eq!(id_of(""), None);
        assert_eq!(id_of("   "), None);
        assert_eq!(id_of("\n\t"), None);
        assert!(find_match_with("  ", kb().topics(), TitleMatch::QueryInTitle).is_none());
    }

    #[test]
    fn matching_is_substring_not_whole_word() {
        assert_eq!(id_of("my hand burns"), Some("burn".into()));
        assert_eq!(id_of("a papercut"), Some("bleeding".into()));
        assert_eq!(id_of("photography"), Some("burn".into()));
        assert_eq!(id_of("class"), None);
    }

    #[test]
    fn matching_ignores_query_case() {
        assert_eq!(id_of("NEEDS CPR NOW"), Some("cpr".into()));
        assert_eq!(id_of("He Is Choking"), Some("choking".into()));
    }

    #[test]
    fn first_topic_wins_on_overlap() {
        assert_eq!(id_of("a cut and a burn"), Some("bleeding".into()));
        assert_eq!(id_of("burn, then cardiac arrest"), Some("burn".into()));
    }

    #[test]
    fn multi_word_keywords_match() {
        assert_eq!(id_of("I am choking and can't breathe"), Some("choking".into()));
        assert_eq!(id_of("he has no pulse"), Some("cpr".into()));
    }

    #[test]
    fn no_match_for_unrelated_text() {
        assert_eq!(id_of("purple elephant"), None);
    }

    #[test]
    fn title_contained_in_query_matches() {
        let topics = vec![custom("snake", "Snake bite", &["venom"])];
        assert!(find_match("what to do for a snake bite now", &topics).is_some());
        assert!(find_match("snake", &topics).is_none());
    }

    #[test]
    fn query_in_title_policy_reverses_containment() {
        let topics = vec![custom("snake", "Snake bite", &["venom"])];
        let found = find_match_with("SNAKE", &topics, TitleMatch::QueryInTitle);
        assert_eq!(found.map(|t| t.id.as_str()), Some("snake"));
        assert!(find_match_with("a snake bite", &topics, TitleMatch::QueryInTitle).is_none());
    }

    #[test]
    fn whitespace_is_not_trimmed_before_matching() {
        let topics = vec![custom("cpr", "CPR (adult)", &["cpr"])];
        assert!(find_match("  cpr  ", &topics).is_some());
        let spaced = vec![custom("x", "X", &[" no pulse"])];
        assert!(find_match("no pulse", &spaced).is_none());
    }
}
