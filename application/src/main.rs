use std::{future::IntoFuture as _, io, sync::OnceLock};

use application::{router, Args, Config, Service};
use service::infra::{postgres, Postgres};
use tokio::net::TcpListener;
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

/// Maximum level of emitted events, set once the [`Config`] is loaded.
static MAX_LEVEL: OnceLock<log::Level> = OnceLock::new();

postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() {
    init_logging();

    _ = run().await;
}

/// Installs the global subscriber writing warnings and errors to `stderr`
/// and everything else to `stdout`.
fn init_logging() {
    fn enabled(meta: &log::Metadata<'_>, to_stderr: bool) -> bool {
        let level = *meta.level();
        let max = MAX_LEVEL.get().copied().unwrap_or(log::Level::INFO);
        let is_problem = level <= log::Level::WARN;
        meta.is_span() || (to_stderr == is_problem && max >= level)
    }

    let out = tracing_subscriber::fmt::layer()
        .compact()
        .with_thread_names(true)
        .with_writer(io::stdout)
        .with_filter(filter_fn(|meta| enabled(meta, false)));
    let err = tracing_subscriber::fmt::layer()
        .compact()
        .with_thread_names(true)
        .with_writer(io::stderr)
        .with_filter(filter_fn(|meta| enabled(meta, true)));

    tracing_subscriber::registry().with(out).with(err).init();
}

/// Loads the [`Config`], migrates the database and serves the API until
/// the server fails.
async fn run() -> Result<(), ()> {
    let Args { config } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        postgres,
        service,
        server,
        log,
    } = Config::new(&config).map_err(|e| {
        log::error!("failed to load `Config` from `{config}`: {e}");
    })?;

    MAX_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("set only once"));

    let mut db = Postgres::new(&postgres.into())
        .map_err(|e| log::error!("failed to create `Postgres` pool: {e}"))?;
    let report = migrations::runner()
        .run_async(&mut db)
        .await
        .map_err(|e| log::error!("failed to migrate database: {e}"))?;
    for m in report.applied_migrations() {
        log::info!("applied migration `{m}`");
    }

    let app = router(Service::new(service.into(), db), server.cors.origins)
        .map_err(|e| log::error!("failed to build router: {e}"))?;

    let addr = format!("{}:{}", server.host, server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| log::error!("failed to listen on `{addr}`: {e}"))?;
    log::info!("listening on `{addr}`");

    axum::serve(listener, app)
        .into_future()
        .await
        .map_err(|e| log::error!("server failed: {e}"))
}
