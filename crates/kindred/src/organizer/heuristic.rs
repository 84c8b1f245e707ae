//! Age/gender heuristic classifier
//!
//! Infers probable parent/child status from ages and genders alone. Used
//! when a family has no usable relationship edges, when its edges carry no
//! generational structure, and as the fallback when relationship data puts
//! two same-gender people in the parent tier.
//!
//! The rules are deliberately asymmetric: a two-person family is read as a
//! couple with a loose age gap, while larger families need the second
//! parent to be clearly older than everyone else.

use tracing::{span, trace, Level};

use crate::core::{OrganizerConfig, Person, PersonId};

/// Parent/child split produced by the classifier
///
/// Only parent and child tiers are ever produced; age alone is not trusted
/// to place grandparents or grandchildren.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeuristicClassification {
    pub parents: Vec<PersonId>,
    pub children: Vec<PersonId>,
}

impl HeuristicClassification {
    fn split(parents: Vec<&Person>, children: Vec<&Person>) -> Self {
        Self {
            parents: parents.into_iter().map(|p| p.id).collect(),
            children: children.into_iter().map(|p| p.id).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty() && self.children.is_empty()
    }
}

/// Classifier over a flat member list
#[derive(Debug, Clone, Default)]
pub struct HeuristicClassifier {
    config: OrganizerConfig,
}

impl HeuristicClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OrganizerConfig) -> Self {
        Self { config }
    }

    /// Split members into parents and children
    pub fn classify(&self, members: &[Person]) -> HeuristicClassification {
        let classify_span = span!(Level::DEBUG, "classify_heuristic", members = members.len());
        let _enter = classify_span.enter();

        let result = match members {
            [] => HeuristicClassification::default(),
            [only] => HeuristicClassification::split(vec![only], Vec::new()),
            [a, b] => self.classify_pair(a, b),
            _ => self.classify_group(members),
        };

        trace!(
            parents = result.parents.len(),
            children = result.children.len(),
            "Heuristic classification done"
        );
        result
    }

    fn classify_pair<'a>(&self, a: &'a Person, b: &'a Person) -> HeuristicClassification {
        let gap = a.effective_age().abs_diff(b.effective_age());

        if a.has_positive_age()
            && b.has_positive_age()
            && gap <= self.config.couple_max_age_gap
            && a.differs_in_gender(b)
        {
            return HeuristicClassification::split(vec![a, b], Vec::new());
        }

        if a.has_positive_age() || b.has_positive_age() {
            let (older, younger) = if a.effective_age() >= b.effective_age() {
                (a, b)
            } else {
                (b, a)
            };
            return HeuristicClassification::split(vec![older], vec![younger]);
        }

        HeuristicClassification::split(Vec::new(), vec![a, b])
    }

    fn classify_group(&self, members: &[Person]) -> HeuristicClassification {
        let mut sorted: Vec<&Person> = members.iter().collect();
        // Stable: equal ages keep input order, unknown ages sink to the end
        sorted.sort_by(|a, b| b.effective_age().cmp(&a.effective_age()));

        let first = sorted[0];
        if !first.has_positive_age() {
            return HeuristicClassification::split(Vec::new(), sorted);
        }

        let second = sorted[1];
        let rest = &sorted[2..];
        let min_gap = self.config.second_parent_min_gap;
        let clear_gap = rest.iter().all(|other| {
            second.effective_age().saturating_sub(other.effective_age()) >= min_gap
        });

        if second.has_positive_age() && clear_gap && second.differs_in_gender(first) {
            HeuristicClassification::split(vec![first, second], rest.to_vec())
        } else {
            HeuristicClassification::split(vec![first], sorted[1..].to_vec())
        }
    }
}
