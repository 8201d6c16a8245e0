//! Project model: one research group's gallery entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use symposium_core::reconcile::ProjectRef;

use crate::storage::{ArtifactStore, Bucket};

/// One research group's submission: two members, their paper titles, and
/// references to at most one combined poster PDF and one combined
/// slide-deck PDF.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub group_name: String,
    pub member1_name: String,
    pub member2_name: String,
    pub paper1_title: String,
    pub paper2_title: String,
    /// Which paper member 1 worked on.
    pub member1_paper: String,
    /// Which paper member 2 worked on.
    pub member2_paper: String,
    pub presentation_video_url: Option<String>,
    /// Stored filename of the combined posters PDF.
    pub combined_posters_filename: Option<String>,
    /// Stored filename of the combined slide decks PDF.
    pub combined_slide_decks_filename: Option<String>,
    /// Free-text comma-separated tag list.
    pub tags: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Tag tokens, lowercased and trimmed.
    pub fn parsed_tags(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .map(symposium_core::parse_tags)
            .unwrap_or_default()
    }

    /// URL of the combined posters PDF, when one is linked.
    pub fn posters_url(&self) -> Option<String> {
        self.combined_posters_filename
            .as_deref()
            .map(|name| ArtifactStore::url_path(Bucket::Posters, name))
    }

    /// URL of the combined slide decks PDF, when one is linked.
    pub fn slide_decks_url(&self) -> Option<String> {
        self.combined_slide_decks_filename
            .as_deref()
            .map(|name| ArtifactStore::url_path(Bucket::Presentations, name))
    }

    /// The slice of this record the reconciliation engine matches against.
    pub fn as_match_ref(&self) -> ProjectRef {
        ProjectRef {
            id: self.id,
            group_name: self.group_name.clone(),
            member1_name: self.member1_name.clone(),
            member2_name: self.member2_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        Project {
            id: Uuid::from_u128(7),
            group_name: "ChCG".into(),
            member1_name: "Alice Green".into(),
            member2_name: "Bob Stone".into(),
            paper1_title: "Paper One".into(),
            paper2_title: "Paper Two".into(),
            member1_paper: "Paper One".into(),
            member2_paper: "Paper Two".into(),
            presentation_video_url: None,
            combined_posters_filename: Some("abc_poster.pdf".into()),
            combined_slide_decks_filename: None,
            tags: Some("Mobile, UI Design".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_parsed_tags() {
        assert_eq!(project().parsed_tags(), ["mobile", "ui design"]);
    }

    #[test]
    fn test_artifact_urls() {
        let p = project();
        assert_eq!(p.posters_url().as_deref(), Some("/files/posters/abc_poster.pdf"));
        assert_eq!(p.slide_decks_url(), None);
    }

    #[test]
    fn test_as_match_ref() {
        let r = project().as_match_ref();
        assert_eq!(r.id, Uuid::from_u128(7));
        assert_eq!(r.group_name, "ChCG");
    }
}
