//! GraphQL [`Subscription`]s definitions.

use std::future;

use futures::{
    stream::{self, BoxStream},
    StreamExt as _,
};
use juniper::graphql_subscription;
use service::{query, Query as _};
use tokio::sync::broadcast::error::RecvError;

use crate::{api, AsError, Context, Error, Service};

/// Root of all GraphQL subscription.
#[derive(Clone, Copy, Debug)]
pub struct Subscription;

#[graphql_subscription(context = Context)]
impl Subscription {
    /// Emits the `RentApplication`s of the specified tenant, or the ones for
    /// the `Property`s of the specified landlord, once on subscription and
    /// then each time any of them changes.
    ///
    /// Changes are delivered on a best-effort basis: a lagging subscriber
    /// receives the up-to-date list without the intermediate ones.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_ARGUMENT` - not exactly one of the IDs is provided;
    /// - `UNAUTHENTICATED` - no credential is presented;
    /// - `FORBIDDEN` - the provided ID is not the current `User`'s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "rentApplications",
            landlord_id = ?landlord_id,
            otel.name = "GraphQL subscription",
            tenant_id = ?tenant_id,
        ),
    )]
    pub async fn rent_applications(
        tenant_id: Option<api::user::Id>,
        landlord_id: Option<api::user::Id>,
        ctx: &Context,
    ) -> Result<
        BoxStream<'static, Result<Vec<api::RentApplication>, Error>>,
        Error,
    > {
        let of = api::participant(tenant_id, landlord_id)
            .map_err(ctx.error())?;
        let initiator = ctx.current_session().await?.initiator;
        let query = query::ListRentApplications::new(initiator, of);

        // Subscribe before the initial query to not miss the changes made
        // in between.
        let svc = ctx.service().clone();
        let events = svc.subscribe();
        let initial = list(&svc, query).await.map_err(ctx.error())?;

        let updates =
            stream::unfold((svc, events), move |(svc, mut events)| async move {
                loop {
                    match events.recv().await {
                        Ok(ev) if !ev.concerns(of.id()) => continue,
                        Ok(_) | Err(RecvError::Lagged(_)) => {}
                        Err(RecvError::Closed) => return None,
                    }
                    match list(&svc, query).await {
                        Ok(apps) => return Some((Ok(apps), (svc, events))),
                        Err(e) => tracing::warn!(
                            "failed to re-query `RentApplication`s: {e}",
                        ),
                    }
                }
            });

        Ok(stream::once(future::ready(Ok(initial))).chain(updates).boxed())
    }
}

/// Lists the `RentApplication`s selected by the provided `query`.
async fn list(
    svc: &Service,
    query: query::ListRentApplications,
) -> Result<Vec<api::RentApplication>, Error> {
    svc.execute(query)
        .await
        .map_err(AsError::into_error)
        .map(|apps| apps.into_iter().map(Into::into).collect())
}
