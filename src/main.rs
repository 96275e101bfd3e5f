mod errors;
mod logging;
mod initialization;
mod handlers;
mod manager_forecast;
mod manager_history;
mod manager_owm;

use std::sync::Arc;
use actix_web::{web, App, HttpServer};
use tokio::sync::Mutex;
use log::info;
use crate::errors::{ConfigError, UnrecoverableError};
use crate::initialization::{config, Backend};
use crate::manager_history::{HistoryStore, MemoryHistory};
use crate::manager_history::sqlite::SqliteHistory;
use crate::manager_owm::OWM;

struct AppState {
    history: Arc<Mutex<Box<dyn HistoryStore>>>,
    owm: Arc<OWM>,
    forecast_days: usize,
    list_limit: usize,
}

#[actix_web::main]
async fn main() -> Result<(), UnrecoverableError> {
    let config = config()?;

    let store: Box<dyn HistoryStore> = match config.history.backend {
        Backend::Memory => {
            info!("keeping search history in memory");
            Box::new(MemoryHistory::new(config.history.max_entries))
        },
        Backend::Sqlite => {
            let db_path = config.history.db_path.as_deref()
                .ok_or(ConfigError::from("history.db_path is required for the sqlite backend"))?;
            info!("keeping search history in {}", db_path);
            Box::new(SqliteHistory::new(db_path, config.history.max_entries)?)
        },
    };
    let history = Arc::new(Mutex::new(store));

    let owm = Arc::new(OWM::new(
        &config.weather.base_url,
        config.weather.api_key.clone(),
        config.weather.timeout_secs,
        config.weather.search_limit,
    )?);

    let forecast_days = config.weather.forecast_days;
    let list_limit = config.history.list_limit;

    info!("starting web server on {}:{}", config.web_server.bind_address, config.web_server.bind_port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(AppState {
                history: history.clone(),
                owm: owm.clone(),
                forecast_days,
                list_limit,
            }))
            .configure(handlers::routes)
    })
        .bind((config.web_server.bind_address, config.web_server.bind_port))?
        .run()
        .await?;

    Ok(())
}
