pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use config::Config;
use services::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
}

/// Build the full application router over the given state. Split out so
/// tests can drive the HTTP surface without binding a socket.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Staff roster
        .route("/staff", post(handlers::staff::create_staff))
        .route("/staff", get(handlers::staff::list_staff))
        .route("/staff/:staff_id", get(handlers::staff::get_staff))
        .route("/staff/:staff_id", put(handlers::staff::update_staff))
        // Client roster
        .route("/clients", post(handlers::clients::create_client))
        .route("/clients", get(handlers::clients::list_clients))
        .route("/clients/:client_id", get(handlers::clients::get_client))
        // Work entries and the daily allocation view
        .route(
            "/work-entries",
            post(handlers::work_entries::create_work_entry),
        )
        .route(
            "/work-entries",
            get(handlers::work_entries::list_work_entries),
        )
        .route(
            "/work-entries/summary/daily",
            get(handlers::work_entries::daily_summary),
        )
        .route(
            "/work-entries/:entry_id",
            put(handlers::work_entries::update_work_entry),
        )
        .route(
            "/work-entries/:entry_id",
            delete(handlers::work_entries::delete_work_entry),
        )
        // Invoice lifecycle
        .route("/invoices", post(handlers::invoices::create_invoice))
        .route("/invoices", get(handlers::invoices::list_invoices))
        .route(
            "/invoices/sweep-overdue",
            post(handlers::invoices::sweep_overdue),
        )
        .route("/invoices/:invoice_id", get(handlers::invoices::get_invoice))
        .route(
            "/invoices/:invoice_id/line-items",
            get(handlers::invoices::list_line_items),
        )
        .route(
            "/invoices/:invoice_id/line-items/:line_item_id",
            delete(handlers::invoices::remove_line_item),
        )
        .route(
            "/invoices/:invoice_id/additional-costs",
            get(handlers::invoices::list_additional_costs),
        )
        .route(
            "/invoices/:invoice_id/additional-costs",
            post(handlers::invoices::add_additional_cost),
        )
        .route(
            "/invoices/:invoice_id/additional-costs/:cost_id",
            delete(handlers::invoices::remove_additional_cost),
        )
        .route(
            "/invoices/:invoice_id/issue",
            post(handlers::invoices::issue_invoice),
        )
        .route(
            "/invoices/:invoice_id/payment",
            post(handlers::invoices::record_payment),
        )
        .route(
            "/invoices/:invoice_id/cancel",
            post(handlers::invoices::cancel_invoice),
        )
        // Wage settlement
        .route("/wages/summary", get(handlers::wages::wages_summary))
        .route(
            "/wages/payment-runs",
            post(handlers::wages::generate_payments),
        )
        .route(
            "/wages/payments",
            get(handlers::wages::list_wage_payments),
        )
        .route(
            "/wages/payments/:payment_id/record",
            post(handlers::wages::record_wage_payment),
        )
        .route(
            "/wages/payments/:payment_id/cancel",
            post(handlers::wages::cancel_wage_payment),
        )
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .with_state(state)
}

pub struct Application {
    addr: String,
    router: Router,
}

impl Application {
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port);
        let state = AppState {
            db: Database::new(),
            config,
        };
        let router = router(state);

        Ok(Self { addr, router })
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!("Listening on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}
