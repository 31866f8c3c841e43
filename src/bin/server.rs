use std::{fs::OpenOptions, net::SocketAddr, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use time::Time;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use tallybook::{
    AppState, HttpBalanceSource, HttpMailer, build_router, graceful_shutdown,
    run_reminder_dispatcher, run_snapshot_job,
};

/// The REST API server for tallybook.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The local timezone as a canonical timezone name, e.g.
    /// "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// URL of the HTTP mail relay that reminder emails are posted to.
    #[arg(long)]
    mail_relay_url: String,

    /// Base URL of the server reporting the authoritative total balance.
    /// Defaults to this server's own address.
    #[arg(long)]
    balance_url: Option<String>,

    /// The local wall-clock time (HH:MM) at which debt reminders are sent.
    #[arg(long, default_value = "09:00")]
    reminder_time: String,

    /// The local wall-clock time (HH:MM) at which the balance snapshot is
    /// taken.
    #[arg(long, default_value = "00:00")]
    snapshot_time: String,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let reminder_time = parse_wall_clock_time(&args.reminder_time);
    let snapshot_time = parse_wall_clock_time(&args.snapshot_time);

    let balance_url = args
        .balance_url
        .unwrap_or_else(|| format!("http://{addr}"));

    let conn = Connection::open(&args.db_path).expect("Could not open the database");
    let state = AppState::new(conn, &args.timezone, HttpBalanceSource::new(&balance_url))
        .expect("Could not initialize the database");

    tokio::spawn(run_reminder_dispatcher(
        state.db_connection.clone(),
        HttpMailer::new(&args.mail_relay_url),
        state.local_timezone.clone(),
        reminder_time,
    ));
    tokio::spawn(run_snapshot_job(
        state.db_connection.clone(),
        state.balance_source.clone(),
        state.local_timezone.clone(),
        snapshot_time,
    ));

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .unwrap();
}

fn parse_wall_clock_time(text: &str) -> Time {
    let format = time::macros::format_description!("[hour]:[minute]");

    Time::parse(text, &format).expect("Wall-clock times must be given as HH:MM")
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our
        // specific logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
