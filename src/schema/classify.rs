//! Pure semantic classification of column names.

use crate::types::SemanticRole;

/// Columns whose name suggests they identify the entity itself.
const ENTITY_KEY_KEYWORDS: &[&str] = &["name", "player", "full_name"];

/// Position/team style dimensions.
const CATEGORICAL_KEYWORDS: &[&str] = &["position", "pos", "eligible", "team", "tm", "club"];

/// Date/season/week style columns.
const TEMPORAL_KEYWORDS: &[&str] = &["date", "time", "timestamp", "season", "year", "week"];

/// Stat columns worth projecting.
const STATISTIC_KEYWORDS: &[&str] = &[
    "fantasy",
    "points",
    "pts",
    "yards",
    "yd",
    "touchdown",
    "td",
    "reception",
    "rec",
    "target",
    "tgt",
    "rush",
    "pass",
    "adp",
    "rank",
    "projection",
    "proj",
    "actual",
    "score",
    "snap",
    "share",
    "ppr",
    "game",
];

/// Classify a column name into zero or more semantic roles.
///
/// Matching is substring containment against the lower-cased name, so a name
/// may land in several groups; all matches are returned in priority order
/// (entity key, categorical, temporal, statistic) and the caller resolves the
/// final role with [`resolve`].
///
/// When `samples` are supplied and the name matched as an entity-key
/// candidate, a majority of the non-empty sample values must contain an
/// internal space ("looks like a person's full name") for the candidate to
/// stand; otherwise it is dropped, which keeps single-token identifier columns
/// from shadowing the real name field.
///
/// Pure and deterministic; no side effects.
pub fn classify(name: &str, samples: Option<&[String]>) -> Vec<SemanticRole> {
    let lower = name.to_lowercase();
    let mut roles = Vec::new();

    if matches_any(&lower, ENTITY_KEY_KEYWORDS) {
        let keep = match samples {
            Some(values) => looks_like_full_names(values),
            None => true,
        };
        if keep {
            roles.push(SemanticRole::EntityKey);
        }
    }
    if matches_any(&lower, CATEGORICAL_KEYWORDS) {
        roles.push(SemanticRole::Categorical);
    }
    if matches_any(&lower, TEMPORAL_KEYWORDS) {
        roles.push(SemanticRole::Temporal);
    }
    if matches_any(&lower, STATISTIC_KEYWORDS) {
        roles.push(SemanticRole::Statistic);
    }

    roles
}

/// Resolve a match set to a single role: first match in priority order,
/// [`SemanticRole::Unclassified`] when nothing matched.
pub fn resolve(roles: &[SemanticRole]) -> SemanticRole {
    roles
        .iter()
        .copied()
        .min()
        .unwrap_or(SemanticRole::Unclassified)
}

fn matches_any(lower_name: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| lower_name.contains(kw))
}

fn looks_like_full_names(values: &[String]) -> bool {
    let mut non_empty = 0usize;
    let mut spaced = 0usize;
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        non_empty += 1;
        if trimmed.contains(' ') {
            spaced += 1;
        }
    }
    non_empty > 0 && spaced * 2 > non_empty
}
