use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};

use campervan_booking::availability::OccupancyPolicy;
use campervan_booking::build_app;
use campervan_booking::config::database::DatabaseConfig;
use campervan_booking::config::environment::EnvironmentConfig;
use campervan_booking::database::DatabaseConnection;
use campervan_booking::repositories::{
    MemoryReservationRepository, MemoryUserRepository, PgReservationRepository, PgUserRepository,
    ReservationRepository, UserRepository,
};
use campervan_booking::services::{LogMailer, Mailer, NotificationService, SmtpMailer};
use campervan_booking::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("🚐 Campervan Booking API");
    info!("================================================");
    info!(
        "🚗 Flota: {} campers | canceladas ocupan cupo: {}",
        config.fleet_capacity, config.count_cancelled_reservations
    );

    let policy = OccupancyPolicy::new(config.count_cancelled_reservations);

    // Inicializar almacenamiento
    let (users, reservations): (Arc<dyn UserRepository>, Arc<dyn ReservationRepository>) =
        match DatabaseConfig::from_environment(&config) {
            Some(db_config) => {
                let db_connection = match DatabaseConnection::connect(&db_config).await {
                    Ok(conn) => conn,
                    Err(e) => {
                        error!("❌ Error conectando a la base de datos: {:#}", e);
                        return Err(e);
                    }
                };
                let pool = db_connection.pool().clone();

                let reservations = PgReservationRepository::new(pool.clone(), policy);
                reservations
                    .rebuild_occupancy()
                    .await
                    .context("no se pudo reconstruir el índice de ocupación")?;

                let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool));
                let reservations: Arc<dyn ReservationRepository> = Arc::new(reservations);
                (users, reservations)
            }
            None => {
                warn!("⚠️ DATABASE_URL no definido: usando almacenamiento en memoria (los datos se pierden al reiniciar)");
                let memory_users = Arc::new(MemoryUserRepository::new());
                let reservations: Arc<dyn ReservationRepository> =
                    Arc::new(MemoryReservationRepository::new(memory_users.clone(), policy));
                let users: Arc<dyn UserRepository> = memory_users;
                (users, reservations)
            }
        };

    // Correo al operador
    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp, &config.mail_from)?),
        None => {
            warn!("⚠️ SMTP no configurado: las notificaciones solo se registran en el log");
            Arc::new(LogMailer)
        }
    };
    let (notifications, _worker) = NotificationService::start(mailer, config.operator_email.clone());

    let addr: SocketAddr = config
        .server_url()
        .parse()
        .with_context(|| format!("dirección inválida: {}", config.server_url()))?;

    let app = build_app(AppState::new(config, users, reservations, notifications));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("   POST /api/auth/register | POST /api/auth/login | PUT /api/auth/profile");
    info!("   GET  /api/inquiry/blocked-dates | POST /api/inquiry | GET /api/inquiry/my-orders");
    info!("   GET  /api/admin/orders | PUT /api/admin/orders/:id/status");
    info!("   POST /api/pdf/generate");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
