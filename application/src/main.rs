use std::{
    io,
    sync::{Arc, OnceLock},
    time,
};

use application::{api, config, graphql, Args, Config};
use axum::{
    extract::MatchedPath,
    routing::{on, MethodFilter},
    Extension, Router,
};
use axum_client_ip::InsecureClientIp;
use service::{
    command::{self, Command as _},
    domain::user,
    infra::{postgres, Postgres},
    Service,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() {
    init_logging();

    _ = start().await;
}

/// Installs `stdout` and `stderr` log layers filtered by the [`LOG_LEVEL`].
fn init_logging() {
    let enabled = |meta: &log::Metadata<'_>, stderr: bool| {
        meta.is_span()
            || STDERR_LEVELS.contains(meta.level()) == stderr
                && LOG_LEVEL.get().copied().unwrap_or(log::Level::INFO)
                    >= *meta.level()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stdout)
                .with_filter(filter_fn(move |meta| enabled(meta, false))),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(move |meta| enabled(meta, true))),
        )
        .init();
}

async fn start() -> Result<(), ()> {
    let Args { config } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        postgres,
        service,
        server,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    service.check().map_err(|e| {
        log::error!("invalid `Config`: {e}");
    })?;

    let mut postgres = Postgres::new(&postgres.into()).map_err(|e| {
        log::error!("failed to initialize `Postgres` client: {e}");
    })?;

    migrations::runner()
        .run_async(&mut postgres)
        .await
        .map_err(|e| {
            log::error!("failed to run database migrations: {e}");
        })?;

    let admin = service.admin.clone();
    let service = Service::new(service.into(), postgres);

    bootstrap_admin(&service, admin).await?;

    let app = router(&server.cors)?
        .layer(Extension(Arc::new(api::schema())))
        .layer(Extension(service));

    let listener = TcpListener::bind((server.host.clone(), server.port))
        .await
        .map_err(|e| {
            log::error!(
                "failed to listen on `{}:{}`: {e}",
                server.host,
                server.port,
            );
        })?;

    log::info!("listening on `{}:{}`", server.host, server.port);

    axum::serve(listener, app)
        .await
        .map_err(|e| log::error!("webserver failed: {e}"))
}

/// Creates the configured administrator, unless there are [`user::User`]s
/// already.
async fn bootstrap_admin(
    service: &application::Service,
    admin: config::Admin,
) -> Result<(), ()> {
    let config::Admin { login, password } = admin;
    let is_default_password = password == config::Admin::default().password;

    let login = user::Login::new(login).ok_or_else(|| {
        log::error!("configured administrator login is invalid");
    })?;
    let password = user::Password::new(password).ok_or_else(|| {
        log::error!("configured administrator password is invalid");
    })?;

    let created = service
        .execute(command::BootstrapAdmin {
            login,
            password: secrecy::SecretBox::init_with(move || password),
        })
        .await
        .map_err(|e| {
            log::error!("failed to bootstrap administrator: {e}");
        })?;
    if let Some(admin) = created.filter(|_| is_default_password) {
        log::warn!(
            "created administrator `{}` with the default password, \
             change it",
            admin.login,
        );
    }

    Ok(())
}

/// Creates the HTTP [`Router`] serving the GraphQL API.
fn router(cors: &config::Cors) -> Result<Router, ()> {
    let mut cors_layer = CorsLayer::new()
        .allow_methods([
            http::Method::GET,
            http::Method::OPTIONS,
            http::Method::POST,
        ])
        .allow_headers([
            http::header::AUTHORIZATION,
            http::header::CONTENT_TYPE,
        ]);
    for origin in &cors.origins {
        cors_layer = cors_layer.allow_origin(
            origin.parse::<http::header::HeaderValue>().map_err(|e| {
                log::error!("`{origin}` is not correct CORS origin: {e}");
            })?,
        );
    }

    Ok(Router::new()
        .route(
            "/graphql",
            on(MethodFilter::GET.or(MethodFilter::POST), graphql),
        )
        .layer(cors_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|r: &http::Request<_>| {
                    tracing::info_span!(
                        "HTTP request",
                        http.client_ip = InsecureClientIp::from(
                            r.headers(),
                            r.extensions()
                        )
                            .map(|ip| ip.0.to_string())
                            .ok(),
                        http.flavor = ?r.version(),
                        http.method = r.method().as_str(),
                        http.route = r
                            .extensions()
                            .get::<MatchedPath>()
                            .map(MatchedPath::as_str),
                        http.target = r
                            .uri()
                            .path_and_query()
                            .map(http::uri::PathAndQuery::as_str),
                        http.user_agent = r
                            .headers()
                            .get("User-Agent")
                            .and_then(|h| h.to_str().ok()),
                        http.status_code = tracing::field::Empty,
                    )
                })
                .on_response(
                    |r: &http::Response<_>,
                     dur: time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(r.status().as_u16()),
                        );

                        if r.status().is_server_error() {
                            tracing::error!(
                                duration = format!("{}ms", dur.as_millis()),
                            );
                        } else {
                            tracing::info!(
                                duration = format!("{}ms", dur.as_millis()),
                            );
                        }
                    },
                ),
        ))
}
