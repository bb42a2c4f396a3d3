//! [`MaintenanceRequest`]-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLObject, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, Context};

/// A request of a tenant to fix something in the occupied [`Property`].
///
/// [`Property`]: api::Property
#[derive(Clone, Debug, From)]
pub struct MaintenanceRequest(domain::MaintenanceRequest);

/// A request of a tenant to fix something in a `Property`.
#[graphql_object(context = Context)]
impl MaintenanceRequest {
    /// Unique identifier of this `MaintenanceRequest`.
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Tenant who filed this `MaintenanceRequest`.
    pub fn tenant(&self) -> api::User {
        #[expect(
            unsafe_code,
            reason = "`MaintenanceRequest` is filed by a registered tenant"
        )]
        unsafe {
            api::User::new_unchecked(self.0.tenant_id)
        }
    }

    /// ID of the `Property` needing maintenance.
    pub fn property_id(&self) -> api::property::Id {
        self.0.property_id.into()
    }

    /// Short summary of the issue.
    pub fn title(&self) -> Title {
        self.0.title.clone().into()
    }

    /// Detailed description of the issue.
    pub fn description(&self) -> Description {
        self.0.description.clone().into()
    }

    /// Current status of this `MaintenanceRequest`.
    pub fn status(&self) -> Status {
        self.0.status().into()
    }

    /// Urgency of this `MaintenanceRequest`.
    pub fn priority(&self) -> Priority {
        self.0.priority.into()
    }

    /// Discussion of this `MaintenanceRequest`, oldest first.
    pub fn comments(&self) -> Vec<Comment> {
        self.0.comments().iter().cloned().map(Into::into).collect()
    }

    /// `DateTime` when this `MaintenanceRequest` was filed.
    pub fn requested_at(&self) -> DateTime {
        self.0.requested_at.coerce()
    }

    /// `DateTime` when this `MaintenanceRequest` was first resolved.
    pub fn resolved_at(&self) -> Option<DateTime> {
        self.0.resolved_at().map(|d| d.coerce())
    }

    /// `DateTime` when this `MaintenanceRequest` was last modified.
    pub fn updated_at(&self) -> DateTime {
        self.0.updated_at.coerce()
    }
}

/// Unique identifier of a `MaintenanceRequest`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::maintenance::Id)]
#[into(domain::maintenance::Id)]
#[graphql(name = "MaintenanceRequestId", transparent)]
pub struct Id(Uuid);

define_text_scalar! {
    /// Title of a `MaintenanceRequest`.
    Title(domain::maintenance::Title) as "MaintenanceRequestTitle"
}

define_text_scalar! {
    /// Description of a `MaintenanceRequest`.
    Description(domain::maintenance::Description)
        as "MaintenanceRequestDescription"
}

define_text_scalar! {
    /// Text of a `MaintenanceComment`.
    CommentText(domain::maintenance::CommentText) as "MaintenanceCommentText"
}

/// Comment left on a `MaintenanceRequest`.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context, name = "MaintenanceComment")]
pub struct Comment {
    /// Text of this `MaintenanceComment`.
    pub text: CommentText,

    /// Author of this `MaintenanceComment`.
    pub author: api::User,

    /// `DateTime` when this `MaintenanceComment` was left.
    pub created_at: DateTime,
}

impl From<domain::maintenance::Comment> for Comment {
    fn from(comment: domain::maintenance::Comment) -> Self {
        let domain::maintenance::Comment {
            text,
            author_id,
            created_at,
        } = comment;
        #[expect(
            unsafe_code,
            reason = "comments are left by registered participants"
        )]
        let author = unsafe { api::User::new_unchecked(author_id) };
        Self {
            text: text.into(),
            author,
            created_at: created_at.coerce(),
        }
    }
}

/// Status of a `MaintenanceRequest`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "MaintenanceStatus")]
pub enum Status {
    /// Not looked at yet.
    Pending,

    /// Being worked on.
    InProgress,

    /// Fixed.
    Resolved,
}

impl From<domain::maintenance::Status> for Status {
    fn from(status: domain::maintenance::Status) -> Self {
        use domain::maintenance::Status as S;
        match status {
            S::Pending => Self::Pending,
            S::InProgress => Self::InProgress,
            S::Resolved => Self::Resolved,
        }
    }
}

impl From<Status> for domain::maintenance::Status {
    fn from(status: Status) -> Self {
        match status {
            Status::Pending => Self::Pending,
            Status::InProgress => Self::InProgress,
            Status::Resolved => Self::Resolved,
        }
    }
}

/// Urgency of a `MaintenanceRequest`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "MaintenancePriority")]
pub enum Priority {
    /// Can wait.
    Low,

    /// Regular issue.
    Medium,

    /// Should be handled soon.
    High,

    /// Must be handled right away.
    Emergency,
}

impl From<domain::maintenance::Priority> for Priority {
    fn from(priority: domain::maintenance::Priority) -> Self {
        use domain::maintenance::Priority as P;
        match priority {
            P::Low => Self::Low,
            P::Medium => Self::Medium,
            P::High => Self::High,
            P::Emergency => Self::Emergency,
        }
    }
}

impl From<Priority> for domain::maintenance::Priority {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Low => Self::Low,
            Priority::Medium => Self::Medium,
            Priority::High => Self::High,
            Priority::Emergency => Self::Emergency,
        }
    }
}
