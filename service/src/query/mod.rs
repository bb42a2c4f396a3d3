//! [`Query`] definition.

pub mod messages;
pub mod properties;
pub mod property;
pub mod scoped;
pub mod user;
pub mod users;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{MaintenanceRequest, Payment, RentApplication},
    infra::{database, Database},
    Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// Lists [`RentApplication`]s of a [`read::Participant`], newest first.
///
/// [`read::Participant`]: crate::read::Participant
pub type ListRentApplications = scoped::List<RentApplication>;

/// Lists [`MaintenanceRequest`]s of a [`read::Participant`], newest first.
///
/// [`read::Participant`]: crate::read::Participant
pub type ListMaintenanceRequests = scoped::List<MaintenanceRequest>;

/// Lists [`Payment`]s of a [`read::Participant`], newest first.
///
/// [`read::Participant`]: crate::read::Participant
pub type ListPayments = scoped::List<Payment>;

/// Fetches a single [`RentApplication`] by its ID.
pub type RentApplicationById = scoped::ById<RentApplication>;

/// Fetches a single [`MaintenanceRequest`] by its ID.
pub type MaintenanceRequestById = scoped::ById<MaintenanceRequest>;

/// Fetches a single [`Payment`] by its ID.
pub type PaymentById = scoped::ById<Payment>;

/// [`Query`] [`Select`]ing a `T`ype from a [`Database`].
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DatabaseQuery<T>(T);

impl<W, B> DatabaseQuery<By<W, B>> {
    /// Creates a new [`DatabaseQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Db, W, B> Query<DatabaseQuery<By<W, B>>> for Service<Db>
where
    Db: Database<Select<By<W, B>>, Ok = W, Err = Traced<database::Error>>,
{
    type Ok = W;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        DatabaseQuery(by): DatabaseQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}
