//! Backend entry-point: wires the HTTP API, the daily scheduler, and SMTP
//! reminder delivery.

use std::sync::Arc;

use actix_web::web;
use mockable::{DefaultClock, DefaultEnv};
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use expenses_backend::api::health::HealthState;
use expenses_backend::domain::reminders::ReminderService;
use expenses_backend::domain::rollover::RolloverService;
use expenses_backend::domain::scheduler::{Scheduler, TokioSleeper};
use expenses_backend::inbound::http::state::HttpState;
use expenses_backend::outbound::mail::SmtpMailer;
use expenses_backend::outbound::persistence::{
    run_migrations, DbPool, DieselExpenseRepository, DieselReminderQuery,
    DieselRolloverRepository, DieselUserRepository, PoolConfig,
};
use expenses_backend::server::{
    app_config_from_env, create_server, session_key_from_env, ServerConfig,
};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let env = DefaultEnv::default();
    let config = app_config_from_env(&env).map_err(std::io::Error::other)?;
    let key = session_key_from_env(&env).map_err(std::io::Error::other)?;

    let database_url = config.database_url();
    run_migrations(&database_url).map_err(std::io::Error::other)?;

    let pool = DbPool::new(PoolConfig::new(database_url.as_str()))
        .await
        .map_err(std::io::Error::other)?;

    let mailer = SmtpMailer::new(&config.smtp).map_err(std::io::Error::other)?;
    let scheduler = Scheduler::new(
        RolloverService::new(Arc::new(DieselRolloverRepository::new(pool.clone()))),
        ReminderService::new(
            Arc::new(DieselReminderQuery::new(pool.clone())),
            Arc::new(mailer),
        ),
        Arc::new(DefaultClock),
        Arc::new(TokioSleeper),
        config.cadence(),
    );
    tokio::spawn(scheduler.run_forever());

    let http_state = HttpState::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselExpenseRepository::new(pool)),
    );
    let health_state = web::Data::new(HealthState::new());

    let cookie_secure = !cfg!(debug_assertions);
    let server = create_server(
        health_state,
        http_state,
        ServerConfig::new(key, cookie_secure, config.bind_addr),
    )?;
    server.await
}
