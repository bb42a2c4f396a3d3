//! [`Command`] definition.

pub mod authorize_user_session;
pub mod comment_maintenance_request;
pub mod create_property;
pub mod create_user;
pub mod create_user_session;
pub mod decide_rent_application;
pub mod delete_maintenance_request;
pub mod delete_property;
pub mod delete_user;
pub mod record_payment;
pub mod send_message;
pub mod submit_maintenance_request;
pub mod submit_rent_application;
pub mod update_maintenance_request;
pub mod update_property;
pub mod update_user_profile;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    comment_maintenance_request::CommentMaintenanceRequest,
    create_property::CreateProperty, create_user::CreateUser,
    create_user_session::CreateUserSession,
    decide_rent_application::DecideRentApplication,
    delete_maintenance_request::DeleteMaintenanceRequest,
    delete_property::DeleteProperty, delete_user::DeleteUser,
    record_payment::RecordPayment, send_message::SendMessage,
    submit_maintenance_request::SubmitMaintenanceRequest,
    submit_rent_application::SubmitRentApplication,
    update_maintenance_request::UpdateMaintenanceRequest,
    update_property::UpdateProperty, update_user_profile::UpdateUserProfile,
};
