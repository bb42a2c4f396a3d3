//! HTTP surface of the [`api::Schema`].

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{MatchedPath, WebSocketUpgrade},
    response::IntoResponse,
    routing::{get, on, MethodFilter},
    Extension, Json, Router,
};
use axum_client_ip::InsecureClientIp;
use derive_more::Debug;
use juniper::{http::GraphQLBatchResponse, DefaultScalarValue, ScalarValue};
use juniper_axum::{extract::JuniperRequest, subscriptions};
use juniper_graphql_ws::ConnectionConfig;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing as log;

use crate::{api, Context, Service};

/// Path serving GraphQL queries and mutations.
pub const GRAPHQL_PATH: &str = "/graphql";

/// Path serving GraphQL subscriptions over WebSocket.
pub const SUBSCRIPTIONS_PATH: &str = "/subscriptions";

/// Limit of a single WebSocket frame or message, in bytes.
const WS_MESSAGE_LIMIT: usize = 1024;

/// Number of subscriptions a single WebSocket connection may run at once.
const WS_MAX_IN_FLIGHT: usize = 10;

/// GraphQL response carrying the HTTP status of its first error.
#[derive(Debug)]
pub struct ApiResponse<S = DefaultScalarValue>
where
    S: ScalarValue,
{
    /// HTTP status used when the response has errors.
    pub status_code: http::StatusCode,

    /// Executed GraphQL response.
    #[debug(skip)]
    pub body: GraphQLBatchResponse<S>,
}

impl<S> IntoResponse for ApiResponse<S>
where
    S: ScalarValue,
{
    fn into_response(self) -> axum::response::Response {
        let status = if self.body.is_ok() {
            http::StatusCode::OK
        } else {
            self.status_code
        };
        (status, Json(self.body)).into_response()
    }
}

/// Builds the [`Router`] serving the [`api::Schema`] backed by the provided
/// [`Service`].
///
/// `origins` are the allowed [CORS] origins, `*` allowing any.
///
/// # Errors
///
/// If any of the `origins` is not a valid header value.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
pub fn router<I>(service: Service, origins: I) -> Result<Router, String>
where
    I: IntoIterator<Item = String>,
{
    let cors = origins.into_iter().try_fold(
        CorsLayer::new()
            .allow_methods([
                http::Method::GET,
                http::Method::OPTIONS,
                http::Method::POST,
            ])
            .allow_headers([
                http::header::AUTHORIZATION,
                http::header::CONTENT_TYPE,
            ]),
        |cors, origin| {
            origin
                .parse::<http::HeaderValue>()
                .map(|o| cors.allow_origin(o))
                .map_err(|e| format!("invalid CORS origin `{origin}`: {e}"))
        },
    )?;

    let schema = api::Schema::new(api::Query, api::Mutation, api::Subscription);

    Ok(Router::new()
        .route(
            GRAPHQL_PATH,
            on(MethodFilter::GET.or(MethodFilter::POST), graphql),
        )
        .route(SUBSCRIPTIONS_PATH, get(subscriptions))
        .layer(Extension(Arc::new(schema)))
        .layer(Extension(service))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|r: &http::Request<_>| request_span(r))
                .on_response(
                    |r: &http::Response<_>, took: Duration, span: &log::Span| {
                        record_response(r, took, span);
                    },
                ),
        ))
}

/// Executes a GraphQL query or mutation.
pub async fn graphql(
    Extension(schema): Extension<Arc<api::Schema>>,
    context: Context,
    JuniperRequest(request): JuniperRequest,
) -> ApiResponse {
    let body = request.execute(&*schema, &context).await;
    ApiResponse {
        status_code: context.error_status_code(),
        body,
    }
}

/// Upgrades the connection to WebSocket and serves GraphQL subscriptions
/// over it.
///
/// Clients may authenticate by passing an `authToken` connection variable.
#[expect(clippy::unused_async, reason = "axum handlers are `async`")]
pub async fn subscriptions(
    Extension(schema): Extension<Arc<api::Schema>>,
    mut context: Context,
    ws: WebSocketUpgrade,
) -> axum::response::Response {
    ws.protocols(["graphql-transport-ws", "graphql-ws"])
        .max_frame_size(WS_MESSAGE_LIMIT)
        .max_message_size(WS_MESSAGE_LIMIT)
        .write_buffer_size(WS_MESSAGE_LIMIT / 2)
        .max_write_buffer_size(WS_MESSAGE_LIMIT)
        .on_upgrade(move |socket| {
            subscriptions::serve_ws(socket, schema, move |vars| async move {
                context.apply_subscription_variables(&vars)?;
                Ok::<_, crate::Error>(
                    ConnectionConfig::new(context)
                        .with_max_in_flight_operations(WS_MAX_IN_FLIGHT),
                )
            })
        })
}

/// Opens the span of an incoming HTTP request.
fn request_span<B>(req: &http::Request<B>) -> log::Span {
    let client_ip = InsecureClientIp::from(req.headers(), req.extensions())
        .ok()
        .map(|ip| ip.0.to_string());
    let route = req.extensions().get::<MatchedPath>().map(MatchedPath::as_str);
    let target = req
        .uri()
        .path_and_query()
        .map(http::uri::PathAndQuery::as_str);
    let user_agent = req
        .headers()
        .get(http::header::USER_AGENT)
        .and_then(|h| h.to_str().ok());

    log::info_span!(
        "HTTP request",
        http.client_ip = client_ip,
        http.flavor = ?req.version(),
        http.host = req.uri().host(),
        http.method = req.method().as_str(),
        http.route = route,
        http.target = target,
        http.user_agent = user_agent,
        http.status_code = log::field::Empty,
    )
}

/// Records the status of an HTTP response into its request `span` and logs
/// how long the request took.
fn record_response<B>(
    resp: &http::Response<B>,
    took: Duration,
    span: &log::Span,
) {
    let status = resp.status();
    _ = span.record("http.status_code", status.as_u16());

    let duration = format!("{}ms", took.as_millis());
    if status.is_client_error() || status.is_server_error() {
        log::error!(duration = duration.as_str());
    } else {
        log::info!(duration = duration.as_str());
    }
}
