use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryEnquiryRepository};
use crate::routes::with_intake_routes;
use axum::Extension;
use axum::Router;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use lourdes_intake::config::AppConfig;
use lourdes_intake::error::AppError;
use lourdes_intake::intake::{
    EnquiryIntakeService, EnquiryRepository, LogNotifier, SqliteEnquiryRepository,
};
use lourdes_intake::telemetry;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = match &config.storage.database_path {
        Some(path) => {
            info!(path = %path.display(), "opening submission database");
            let repository = Arc::new(SqliteEnquiryRepository::open(path)?);
            intake_app(repository)
        }
        None => {
            warn!("APP_DATABASE_PATH not set; enquiries are held in process memory");
            intake_app(Arc::new(InMemoryEnquiryRepository::default()))
        }
    }
    .layer(Extension(app_state))
    .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "enquiry intake service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn intake_app<R>(repository: Arc<R>) -> Router
where
    R: EnquiryRepository + 'static,
{
    let service = Arc::new(EnquiryIntakeService::new(repository, Arc::new(LogNotifier)));
    with_intake_routes(service)
}
