//! Reconciliation of loose uploaded files against project records.
//!
//! Planning is pure: given filenames and a snapshot of projects, it decides
//! which file becomes which project's poster or slide deck. Persisting the
//! resulting assignments (and moving files between buckets) is the caller's
//! job, so the same plan can be committed or previewed.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classify::{classify, leading_token, FileKind};
use crate::roster::Roster;

/// The slice of a project record needed for matching.
#[derive(Debug, Clone)]
pub struct ProjectRef {
    pub id: Uuid,
    pub group_name: String,
    pub member1_name: String,
    pub member2_name: String,
}

/// Artifact filenames assigned to one project by a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub poster: Option<String>,
    pub presentation: Option<String>,
}

/// Outcome for one candidate group label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupReport {
    pub label: String,
    /// The project the label resolved to, if any.
    pub project_id: Option<Uuid>,
    /// Number of files assigned from this label's bucket.
    pub files_assigned: usize,
}

/// Full result of a reconciliation planning pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilePlan {
    /// Final artifact assignments, keyed by project id. When several labels
    /// resolve to the same project, later labels overwrite earlier ones
    /// field by field (last writer wins).
    pub assignments: BTreeMap<Uuid, Assignment>,
    /// Per-label outcomes, in first-seen label order.
    pub groups: Vec<GroupReport>,
    /// Files that could not be processed: unknown kind, no inferable group,
    /// or a group label that matched no project.
    pub unmatched_files: Vec<String>,
    /// Candidate labels that matched no project.
    pub unmatched_groups: Vec<String>,
}

impl ReconcilePlan {
    /// Number of labels that resolved to a project.
    pub fn matched(&self) -> usize {
        self.groups.iter().filter(|g| g.project_id.is_some()).count()
    }
}

/// Files collected under one candidate label. The first file of each kind
/// (in input order) wins; later duplicates are ignored.
#[derive(Debug, Default)]
struct LabelFiles {
    poster: Option<String>,
    presentation: Option<String>,
    all: Vec<String>,
}

/// Plans artifact assignments for a batch of filenames.
///
/// Deterministic for a fixed input: running it twice over the same
/// filenames and projects yields identical assignments.
pub fn plan(filenames: &[String], projects: &[ProjectRef], roster: &Roster) -> ReconcilePlan {
    let mut unmatched_files = Vec::new();

    // Step 1 + 2: classify every file and bucket by candidate label,
    // preserving first-seen label order.
    let mut label_order: Vec<String> = Vec::new();
    let mut by_label: HashMap<String, LabelFiles> = HashMap::new();

    for filename in filenames {
        let classification = classify(filename, roster);
        let label = match (classification.kind, classification.candidate_group) {
            (FileKind::Unknown, _) | (_, None) => {
                unmatched_files.push(filename.clone());
                continue;
            }
            (_, Some(label)) => label,
        };

        if !by_label.contains_key(&label) {
            label_order.push(label.clone());
        }
        let entry = by_label.entry(label).or_default();
        entry.all.push(filename.clone());
        let slot = match classification.kind {
            FileKind::Poster => &mut entry.poster,
            FileKind::Presentation => &mut entry.presentation,
            FileKind::Unknown => unreachable!("unknown kinds are filtered above"),
        };
        if slot.is_none() {
            *slot = Some(filename.clone());
        }
    }

    // Step 3 + 4: resolve each label to a project and record assignments.
    let mut assignments: BTreeMap<Uuid, Assignment> = BTreeMap::new();
    let mut groups = Vec::new();
    let mut unmatched_groups = Vec::new();

    for label in label_order {
        let files = &by_label[&label];
        let project = projects
            .iter()
            .find(|p| p.group_name == label)
            .or_else(|| match_by_member_name(files, projects));

        match project {
            Some(project) => {
                let assignment = assignments.entry(project.id).or_default();
                let mut files_assigned = 0;
                if let Some(poster) = &files.poster {
                    assignment.poster = Some(poster.clone());
                    files_assigned += 1;
                }
                if let Some(presentation) = &files.presentation {
                    assignment.presentation = Some(presentation.clone());
                    files_assigned += 1;
                }
                groups.push(GroupReport {
                    label,
                    project_id: Some(project.id),
                    files_assigned,
                });
            }
            None => {
                unmatched_files.extend(files.all.iter().cloned());
                unmatched_groups.push(label.clone());
                groups.push(GroupReport {
                    label,
                    project_id: None,
                    files_assigned: 0,
                });
            }
        }
    }

    ReconcilePlan {
        assignments,
        groups,
        unmatched_files,
        unmatched_groups,
    }
}

/// Fallback match: the leading token of each grouped filename (presumed to
/// be a person's given name) is tested as a case-insensitive substring of
/// either member name, or vice versa. Files are tried in input order and
/// projects in store order; the first hit wins.
fn match_by_member_name<'a>(
    files: &LabelFiles,
    projects: &'a [ProjectRef],
) -> Option<&'a ProjectRef> {
    for filename in &files.all {
        let token = leading_token(filename).to_lowercase();
        if token.is_empty() {
            continue;
        }
        for project in projects {
            let member1 = project.member1_name.to_lowercase();
            let member2 = project.member2_name.to_lowercase();
            if member1.contains(&token)
                || token.contains(&member1)
                || member2.contains(&token)
                || token.contains(&member2)
            {
                return Some(project);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: u128, group: &str, member1: &str, member2: &str) -> ProjectRef {
        ProjectRef {
            id: Uuid::from_u128(id),
            group_name: group.to_string(),
            member1_name: member1.to_string(),
            member2_name: member2.to_string(),
        }
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_exact_label_match_assigns_both_kinds() {
        let projects = vec![project(1, "ChCG", "Alice Green", "Bob Stone")];
        let files = names(&["alice_poster_ChCG.pdf", "bob_presentation_chcg_v2.pdf"]);

        let plan = plan(&files, &projects, &Roster::default());

        assert_eq!(plan.matched(), 1);
        let assignment = &plan.assignments[&Uuid::from_u128(1)];
        assert_eq!(assignment.poster.as_deref(), Some("alice_poster_ChCG.pdf"));
        assert_eq!(
            assignment.presentation.as_deref(),
            Some("bob_presentation_chcg_v2.pdf")
        );
        assert!(plan.unmatched_files.is_empty());
        assert!(plan.unmatched_groups.is_empty());
    }

    #[test]
    fn test_unknown_kind_is_reported_unmatched() {
        let projects = vec![project(1, "ChCG", "Alice", "Bob")];
        let files = names(&["alice_notes_ChCG.pdf"]);

        let plan = plan(&files, &projects, &Roster::default());

        assert_eq!(plan.matched(), 0);
        assert_eq!(plan.unmatched_files, ["alice_notes_ChCG.pdf"]);
    }

    #[test]
    fn test_first_file_of_each_kind_wins() {
        let projects = vec![project(1, "ChCG", "Alice", "Bob")];
        let files = names(&["a_poster_chcg.pdf", "b_poster_chcg_late.pdf"]);

        let plan = plan(&files, &projects, &Roster::default());

        let assignment = &plan.assignments[&Uuid::from_u128(1)];
        assert_eq!(assignment.poster.as_deref(), Some("a_poster_chcg.pdf"));
        assert_eq!(plan.groups[0].files_assigned, 1);
    }

    #[test]
    fn test_member_name_fallback() {
        // "Orbit" is nobody's roster entry, so the label misses the exact
        // lookup; the leading token "priya" matches member1.
        let roster = Roster::new(vec![], vec![]);
        let projects = vec![
            project(1, "Team Red", "Sam Hill", "Lee Park"),
            project(2, "Team Blue", "Priya Nair", "Omar Diaz"),
        ];
        let files = names(&["priya_2024_orbit_poster.pdf"]);

        let plan = plan(&files, &projects, &roster);

        assert_eq!(plan.groups.len(), 1);
        assert_eq!(plan.groups[0].project_id, Some(Uuid::from_u128(2)));
        let assignment = &plan.assignments[&Uuid::from_u128(2)];
        assert_eq!(assignment.poster.as_deref(), Some("priya_2024_orbit_poster.pdf"));
    }

    #[test]
    fn test_unmatched_group_is_reported() {
        let roster = Roster::new(vec![], vec![]);
        let projects = vec![project(1, "Team Red", "Sam Hill", "Lee Park")];
        let files = names(&["zoe_2024_orbit_poster.pdf"]);

        let plan = plan(&files, &projects, &roster);

        assert_eq!(plan.matched(), 0);
        assert_eq!(plan.unmatched_groups, ["Orbit"]);
        assert_eq!(plan.unmatched_files, ["zoe_2024_orbit_poster.pdf"]);
        assert!(plan.assignments.is_empty());
    }

    #[test]
    fn test_last_writer_wins_across_labels() {
        // Two distinct labels resolve to the same project: "ChCG" by exact
        // lookup and "Widget" through the member-name fallback. The later
        // label's poster overwrites the earlier one.
        let roster = Roster::new(vec!["ChCG".into()], vec![]);
        let projects = vec![project(1, "ChCG", "Alice Green", "Bob Stone")];
        let files = names(&["sam_poster_chcg.pdf", "alice_2024_widget_poster.pdf"]);

        let plan = plan(&files, &projects, &roster);

        assert_eq!(plan.groups.len(), 2);
        assert_eq!(plan.groups[0].label, "ChCG");
        assert_eq!(plan.groups[1].label, "Widget");
        let assignment = &plan.assignments[&Uuid::from_u128(1)];
        assert_eq!(
            assignment.poster.as_deref(),
            Some("alice_2024_widget_poster.pdf")
        );
    }

    #[test]
    fn test_plan_is_idempotent() {
        let projects = vec![
            project(1, "ChCG", "Alice Green", "Bob Stone"),
            project(2, "Team Alpha", "Carol Mae", "Dan Roe"),
        ];
        let files = names(&[
            "alice_poster_ChCG.pdf",
            "bob_presentation_chcg_v2.pdf",
            "carol_alpha_slides.pdf",
            "mystery.pdf",
        ]);
        let roster = Roster::default();

        let first = plan(&files, &projects, &roster);
        let second = plan(&files, &projects, &roster);

        assert_eq!(first.assignments, second.assignments);
        assert_eq!(first.unmatched_files, second.unmatched_files);
        assert_eq!(first.unmatched_groups, second.unmatched_groups);
    }
}
