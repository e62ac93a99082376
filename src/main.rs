use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;

use leave_ledger::config::Config;
use leave_ledger::docs::ApiDoc;
use leave_ledger::leave::lifecycle::LeaveLifecycle;
use leave_ledger::notify::LogNotifier;
use leave_ledger::routes;
use leave_ledger::store::HrStore;

use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Leave Ledger"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let store = Arc::new(HrStore::new());
    let lifecycle = Data::new(LeaveLifecycle::new(store.clone(), Arc::new(LogNotifier)));

    // Load the employee directory in the background; requests against
    // employees that are not loaded yet simply answer NOT_FOUND.
    if let Some(seed_file) = config.seed_file.clone() {
        let store_for_seed = store.clone();
        actix_web::rt::spawn(async move {
            match store_for_seed.load_directory(&seed_file) {
                Ok(count) => info!(count, "employee directory loaded"),
                Err(e) => eprintln!("Failed to load employee directory: {:?}", e),
            }
        });
    }

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::from(store.clone()))
            .app_data(lifecycle.clone())
            .app_data(Data::new(config.clone()))
            .service(index)
            // Configure protected routes with auth + rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
