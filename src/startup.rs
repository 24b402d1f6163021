use std::{net::TcpListener, time::Duration};

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{
    dev::Server,
    error::InternalError,
    http::StatusCode,
    web::{self, Data},
    App, HttpRequest, HttpResponse, HttpServer,
};
use anyhow::Context;
use diesel::{r2d2::ConnectionManager, PgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing_actix_web::TracingLogger;

use crate::{
    configuration::{DatabaseSettings, Settings},
    response,
    routes::*,
    telemetry::spawn_blocking_with_tracing,
    utils::DbPool,
};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

// Frontend base url, used to build links in emails
pub struct FrontendUrl(pub String);

impl FrontendUrl {
    pub fn login_url(&self) -> String {
        format!("{}/login", self.0.trim_end_matches('/'))
    }
}

pub struct Application{
    port: u16,
    server: Server
}

impl Application {
    pub async fn new(settings: Settings) -> Result<Self, anyhow::Error>{
        let pool = get_connection_pool(&settings.database)?;
        run_migrations(&pool).await?;

        let email_client = settings.email.client()?;

        std::fs::create_dir_all(&settings.application.uploads_dir)
            .context("Failed to create uploads directory")?;

        let listener = TcpListener::bind((
            settings.application.host.as_str(),
            settings.application.port
        ))
        .context("Failed to bind address")?;
        let port = listener.local_addr()?.port();
        tracing::info!("Listening on {}:{}", settings.application.host, port);

        let server = run(
            listener,
            pool,
            email_client,
            settings.application.frontend_url,
            settings.application.cors_origin,
            settings.application.uploads_dir
        )?;

        Ok(Application { port, server })
    }

    pub fn port(&self) -> u16{
        self.port
    }

    pub fn get_server(self) -> Server{
        self.server
    }
}

pub fn get_connection_pool(settings: &DatabaseSettings) -> Result<DbPool, anyhow::Error>{
    let manager = ConnectionManager::<PgConnection>::new(settings.url());

    DbPool::builder()
        .connection_timeout(Duration::from_secs(5))
        .build(manager)
        .context("Failed to build database connection pool")
}

#[tracing::instrument(
    "Running database migrations",
    skip_all
)]
pub async fn run_migrations(pool: &DbPool) -> Result<(), anyhow::Error>{
    let pool = pool.clone();

    spawn_blocking_with_tracing(move || {
        let mut conn = pool.get()
            .context("Failed to get connection from pool")?;
        let applied = conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow::anyhow!(e))
            .context("Failed to run migrations")?;

        for version in applied {
            tracing::info!("Applied migration {}", version);
        }
        Ok(())
    })
    .await
    .context("Failed due to threadpool error")?
}

fn cors(origin: &str) -> Cors{
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);

    if origin == "*" {
        cors.allow_any_origin()
    } else {
        cors.allowed_origin(origin)
    }
}

// Extractor failures still answer with the json envelope
fn bad_request<E>(err: E, _req: &HttpRequest) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static
{
    let response = response::failure(StatusCode::BAD_REQUEST, &err);
    InternalError::from_response(err, response).into()
}

async fn not_found() -> HttpResponse{
    response::failure(StatusCode::NOT_FOUND, "Route not found")
}

pub fn run(
    listener: TcpListener,
    pool: DbPool,
    email_client: crate::email_client::EmailClient,
    frontend_url: String,
    cors_origin: String,
    uploads_dir: String
) -> Result<Server, anyhow::Error>{
    let pool = Data::new(pool);
    let email_client = Data::new(email_client);
    let frontend_url = Data::new(FrontendUrl(frontend_url));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors(&cors_origin))
            .app_data(web::JsonConfig::default().error_handler(bad_request))
            .app_data(web::PathConfig::default().error_handler(bad_request))
            .app_data(web::QueryConfig::default().error_handler(bad_request))
            .app_data(pool.clone())
            .app_data(email_client.clone())
            .app_data(frontend_url.clone())
            .route("/health", web::get().to(health_check))
            .service(Files::new("/uploads", &uploads_dir))
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(health_check))
                    .service(
                        web::scope("/auth")
                            .route("/login", web::post().to(login))
                            .route("/change-password", web::post().to(change_password))
                    )
                    .service(
                        web::scope("/restaurants")
                            .route("", web::get().to(get_restaurants))
                            .route("/register", web::post().to(register_restaurant))
                            .route("/{id}", web::get().to(get_restaurant))
                            .route("/{id}/hours", web::put().to(put_hours))
                            .route("/{id}/menu", web::get().to(get_menu))
                            .route("/{id}/menu", web::post().to(post_menu_item))
                            .route("/{id}/menu/{item_id}", web::put().to(update_menu_item))
                            .route("/{id}/menu/{item_id}", web::delete().to(delete_menu_item))
                            .route("/{id}/withdraw", web::post().to(request_withdrawal))
                            .route("/{id}/orders", web::get().to(get_restaurant_orders))
                    )
                    .service(
                        web::scope("/admin/restaurants")
                            .route("/pending", web::get().to(get_pending_restaurants))
                            .route("/approved", web::get().to(get_approved_restaurants))
                            .route("/withdrawals", web::get().to(get_withdrawal_requests))
                            .route("/{id}/approve", web::post().to(approve_restaurant))
                            .route("/{id}/reject", web::post().to(reject_restaurant))
                            .route("/{id}/withdrawal/approve", web::post().to(approve_withdrawal))
                            .route("/{id}/withdrawal/reject", web::post().to(reject_withdrawal))
                    )
                    .service(
                        web::scope("/staff")
                            .route("", web::get().to(get_staff))
                            .route("", web::post().to(post_staff))
                            .route("/{id}", web::delete().to(delete_staff))
                    )
                    .service(
                        web::scope("/drivers")
                            .route("", web::get().to(get_drivers))
                            .route("", web::post().to(post_driver))
                            .route("/{id}/status", web::put().to(put_driver_status))
                            .route("/{id}", web::delete().to(delete_driver))
                    )
                    .service(
                        web::scope("/orders")
                            .route("", web::get().to(get_orders))
                            .route("", web::post().to(post_order))
                            .route("/quote", web::post().to(post_quote))
                            .route("/{id}", web::get().to(get_order))
                            .route("/{id}/status", web::put().to(update_order_status))
                    )
                    .service(
                        web::scope("/deliveries")
                            .route("", web::get().to(get_deliveries))
                            .route("", web::post().to(post_delivery))
                            .route("/{id}/status", web::put().to(put_delivery_status))
                    )
                    .route("/notifications/email", web::post().to(post_email))
            )
            .default_service(web::route().to(not_found))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
