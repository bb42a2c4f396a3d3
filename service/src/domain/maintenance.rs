//! [`MaintenanceRequest`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

use crate::domain::{property, user};

/// Issue filed by a tenant against a [`Property`].
///
/// [`Property`]: crate::domain::Property
#[derive(Clone, Debug)]
pub struct MaintenanceRequest {
    /// ID of this [`MaintenanceRequest`].
    pub id: Id,

    /// ID of the tenant who filed this [`MaintenanceRequest`].
    pub tenant_id: user::Id,

    /// ID of the [`Property`] this [`MaintenanceRequest`] is about.
    ///
    /// [`Property`]: crate::domain::Property
    pub property_id: property::Id,

    /// [`Title`] of this [`MaintenanceRequest`].
    pub title: Title,

    /// [`Description`] of this [`MaintenanceRequest`].
    pub description: Description,

    /// Current [`Status`] of this [`MaintenanceRequest`].
    status: Status,

    /// [`Priority`] of this [`MaintenanceRequest`].
    pub priority: Priority,

    /// [`Comment`]s on this [`MaintenanceRequest`], oldest first.
    comments: Vec<Comment>,

    /// [`DateTime`] when this [`MaintenanceRequest`] was filed.
    pub requested_at: RequestDateTime,

    /// [`DateTime`] when this [`MaintenanceRequest`] first became
    /// [`Status::Resolved`].
    resolved_at: Option<ResolutionDateTime>,

    /// [`DateTime`] when this [`MaintenanceRequest`] was last modified.
    pub updated_at: ModificationDateTime,

    /// [`DateTime`] when this [`MaintenanceRequest`] was deleted.
    pub deleted_at: Option<DeletionDateTime>,
}

impl MaintenanceRequest {
    /// Files a new [`Status::Pending`] [`MaintenanceRequest`].
    #[must_use]
    pub fn new(
        tenant_id: user::Id,
        property_id: property::Id,
        title: Title,
        description: Description,
        priority: Priority,
    ) -> Self {
        let now = common::DateTime::now();
        Self {
            id: Id::new(),
            tenant_id,
            property_id,
            title,
            description,
            status: Status::Pending,
            priority,
            comments: Vec::new(),
            requested_at: now.coerce(),
            resolved_at: None,
            updated_at: now.coerce(),
            deleted_at: None,
        }
    }

    /// Restores a [`MaintenanceRequest`] from its stored parts.
    ///
    /// # Safety
    ///
    /// `resolved_at` must be [`Some`] if `status` is [`Status::Resolved`],
    /// and `comments` must be in the order they were added.
    #[expect(clippy::too_many_arguments, reason = "plain record")]
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn from_parts(
        id: Id,
        tenant_id: user::Id,
        property_id: property::Id,
        title: Title,
        description: Description,
        status: Status,
        priority: Priority,
        comments: Vec<Comment>,
        requested_at: RequestDateTime,
        resolved_at: Option<ResolutionDateTime>,
        updated_at: ModificationDateTime,
        deleted_at: Option<DeletionDateTime>,
    ) -> Self {
        Self {
            id,
            tenant_id,
            property_id,
            title,
            description,
            status,
            priority,
            comments,
            requested_at,
            resolved_at,
            updated_at,
            deleted_at,
        }
    }

    /// Returns the current [`Status`] of this [`MaintenanceRequest`].
    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Returns [`DateTime`] when this [`MaintenanceRequest`] was resolved for
    /// the first time.
    #[must_use]
    pub fn resolved_at(&self) -> Option<ResolutionDateTime> {
        self.resolved_at
    }

    /// Returns [`Comment`]s of this [`MaintenanceRequest`], oldest first.
    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Sets the [`Status`] of this [`MaintenanceRequest`].
    ///
    /// Any [`Status`] may follow any other. Becoming [`Status::Resolved`]
    /// stamps the resolution time once; it is never cleared afterwards.
    pub fn set_status(&mut self, status: Status) {
        if status == Status::Resolved && self.resolved_at.is_none() {
            self.resolved_at = Some(common::DateTime::now().coerce());
        }
        self.status = status;
    }

    /// Appends a new [`Comment`] to this [`MaintenanceRequest`].
    pub fn add_comment(&mut self, author_id: user::Id, text: CommentText) {
        self.comments.push(Comment {
            text,
            author_id,
            created_at: common::DateTime::now().coerce(),
        });
    }
}

/// Comment on a [`MaintenanceRequest`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Comment {
    /// [`CommentText`] of this [`Comment`].
    pub text: CommentText,

    /// ID of the user who wrote this [`Comment`].
    pub author_id: user::Id,

    /// [`DateTime`] when this [`Comment`] was written.
    pub created_at: CommentDateTime,
}

/// ID of a [`MaintenanceRequest`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_text! {
    /// Short summary of a [`MaintenanceRequest`].
    Title(max = 256)
}

define_text! {
    /// Detailed description of a [`MaintenanceRequest`].
    Description(max = 4096)
}

define_text! {
    /// Text of a [`Comment`].
    CommentText(max = 4096)
}

define_kind! {
    #[doc = "Status of a [`MaintenanceRequest`]."]
    enum Status {
        #[doc = "Not looked at yet."]
        Pending = 1,

        #[doc = "Being worked on."]
        InProgress = 2,

        #[doc = "Fixed."]
        Resolved = 3,
    }
}

define_kind! {
    #[doc = "Urgency of a [`MaintenanceRequest`]."]
    enum Priority {
        #[doc = "Can wait."]
        Low = 1,

        #[doc = "Regular issue."]
        Medium = 2,

        #[doc = "Should be handled soon."]
        High = 3,

        #[doc = "Must be handled right away."]
        Emergency = 4,
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

/// [`DateTime`] when a [`MaintenanceRequest`] was filed.
pub type RequestDateTime = DateTimeOf<(MaintenanceRequest, unit::Creation)>;

/// [`DateTime`] when a [`MaintenanceRequest`] was resolved.
pub type ResolutionDateTime =
    DateTimeOf<(MaintenanceRequest, unit::Resolution)>;

/// [`DateTime`] when a [`MaintenanceRequest`] was last modified.
pub type ModificationDateTime =
    DateTimeOf<(MaintenanceRequest, unit::Modification)>;

/// [`DateTime`] when a [`MaintenanceRequest`] was deleted.
pub type DeletionDateTime = DateTimeOf<(MaintenanceRequest, unit::Deletion)>;

/// [`DateTime`] when a [`Comment`] was written.
pub type CommentDateTime = DateTimeOf<(Comment, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{
        CommentText, Description, MaintenanceRequest, Priority, Status, Title,
    };
    use crate::domain::{property, user};

    fn request() -> MaintenanceRequest {
        MaintenanceRequest::new(
            user::Id::new(),
            property::Id::new(),
            Title::new("Leaking tap").unwrap(),
            Description::new("Kitchen tap drips all night").unwrap(),
            Priority::default(),
        )
    }

    #[test]
    fn starts_pending_with_medium_priority() {
        let req = request();

        assert_eq!(req.status(), Status::Pending);
        assert_eq!(req.priority, Priority::Medium);
        assert!(req.resolved_at().is_none());
        assert!(req.comments().is_empty());
    }

    #[test]
    fn resolution_time_is_stamped_once() {
        let mut req = request();

        req.set_status(Status::InProgress);
        assert!(req.resolved_at().is_none());

        req.set_status(Status::Resolved);
        let resolved_at = req.resolved_at().unwrap();

        req.set_status(Status::Pending);
        assert_eq!(req.resolved_at(), Some(resolved_at));

        req.set_status(Status::Resolved);
        assert_eq!(req.resolved_at(), Some(resolved_at));
    }

    #[test]
    fn comments_keep_order() {
        let mut req = request();
        let (tenant, landlord) = (user::Id::new(), user::Id::new());

        req.add_comment(tenant, CommentText::new("Any update?").unwrap());
        let text = CommentText::new("Plumber on Monday").unwrap();
        req.add_comment(landlord, text);

        let authors = req.comments().iter().map(|c| c.author_id);
        assert_eq!(authors.collect::<Vec<_>>(), [tenant, landlord]);
    }
}
