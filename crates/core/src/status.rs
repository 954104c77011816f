//! Project lifecycle status mapped to the `project_statuses` lookup table.
//!
//! Each variant's discriminant matches the seed data order (1-based) in the
//! database. Transition rules live in [`crate::lifecycle`].

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

/// Project lifecycle status.
///
/// - `Draft`      -- created, no document generated yet.
/// - `Processing` -- a generation call is in flight.
/// - `Generated`  -- a document exists but is not publicly reachable.
/// - `Published`  -- the document is served on the project's subdomain.
/// - `Live`       -- display-only refinement of `Published` once a custom
///   domain has verified; editability is identical to `Published`.
/// - `Cancelled`  -- the owning subscription has ended; the project is in
///   its grace period and will be deleted when it elapses.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    Draft = 1,
    Processing = 2,
    Generated = 3,
    Published = 4,
    Live = 5,
    Cancelled = 6,
}

impl ProjectStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Map a database status ID back to the enum.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Draft),
            2 => Some(Self::Processing),
            3 => Some(Self::Generated),
            4 => Some(Self::Published),
            5 => Some(Self::Live),
            6 => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// String representation for display, logging, and API responses.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Processing => "processing",
            Self::Generated => "generated",
            Self::Published => "published",
            Self::Live => "live",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` once a document exists for this status.
    ///
    /// `document` is never null at or past `Generated`; edits and surgical
    /// updates are only legal for these statuses.
    pub fn has_document(self) -> bool {
        matches!(self, Self::Generated | Self::Published | Self::Live)
    }

    /// Returns `true` if the project is publicly reachable.
    pub fn is_public(self) -> bool {
        matches!(self, Self::Published | Self::Live)
    }
}

impl From<ProjectStatus> for StatusId {
    fn from(value: ProjectStatus) -> Self {
        value as StatusId
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_roundtrip() {
        for status in [
            ProjectStatus::Draft,
            ProjectStatus::Processing,
            ProjectStatus::Generated,
            ProjectStatus::Published,
            ProjectStatus::Live,
            ProjectStatus::Cancelled,
        ] {
            assert_eq!(ProjectStatus::from_id(status.id()), Some(status));
        }
    }

    #[test]
    fn unknown_id_is_none() {
        assert_eq!(ProjectStatus::from_id(0), None);
        assert_eq!(ProjectStatus::from_id(7), None);
    }

    #[test]
    fn document_presence_by_status() {
        assert!(!ProjectStatus::Draft.has_document());
        assert!(!ProjectStatus::Processing.has_document());
        assert!(ProjectStatus::Generated.has_document());
        assert!(ProjectStatus::Published.has_document());
        assert!(ProjectStatus::Live.has_document());
        assert!(!ProjectStatus::Cancelled.has_document());
    }

    #[test]
    fn public_statuses() {
        assert!(ProjectStatus::Published.is_public());
        assert!(ProjectStatus::Live.is_public());
        assert!(!ProjectStatus::Generated.is_public());
    }
}
