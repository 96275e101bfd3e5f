use actix_web::{delete, get, post, web, HttpResponse, Responder};
use actix_web::error::InternalError;
use log::{error, info};
use serde::{Deserialize, Serialize};
use crate::AppState;
use crate::manager_forecast::aggregate_feed;
use crate::manager_history::errors::HistoryError;
use crate::manager_history::models::HistoryCandidate;
use crate::manager_owm::errors::OWMError;

const INVALID_HISTORY: &str = "Invalid search history data";

#[derive(Serialize)]
struct Message {
    message: String,
}

fn message(text: &str) -> Message {
    Message { message: text.to_string() }
}

#[derive(Deserialize, Debug)]
struct ForecastParams {
    days: Option<usize>,
}

/// Registers all routes, the city route ahead of the coordinate route it would otherwise collide with
///
/// # Arguments
///
/// * 'cfg' - service config of the app
pub fn routes(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        info!("rejected request body: {}", err);
        let response = HttpResponse::BadRequest().json(message(INVALID_HISTORY));
        InternalError::from_response(err, response).into()
    });

    cfg.app_data(json_config)
        .service(current_weather_by_city)
        .service(current_weather)
        .service(forecast)
        .service(search_cities)
        .service(list_history)
        .service(add_history)
        .service(clear_history);
}

/// Turns a failure from OpenWeatherMap into a 500 response
///
/// # Arguments
///
/// * 'e' - the error
/// * 'failure' - message to show the client
fn upstream_failure(e: OWMError, failure: &str) -> HttpResponse {
    error!("{}: {}", failure, e);
    match e {
        OWMError::MissingApiKey => HttpResponse::InternalServerError().json(message("Weather API key not configured")),
        _ => HttpResponse::InternalServerError().json(message(failure)),
    }
}

#[get("/api/weather/current/city/{city}")]
async fn current_weather_by_city(path: web::Path<String>, data: web::Data<AppState>) -> impl Responder {
    let city = path.into_inner();
    info!("current weather for city {}", city);

    match data.owm.current_by_city(&city).await {
        Ok(json) => HttpResponse::Ok().json(json),
        Err(OWMError::NotFound(e)) => {
            info!("city {} not found: {}", city, e);
            HttpResponse::NotFound().json(message("City not found"))
        },
        Err(e) => upstream_failure(e, "Failed to fetch weather data"),
    }
}

#[get("/api/weather/current/{lat}/{lon}")]
async fn current_weather(path: web::Path<(f64, f64)>, data: web::Data<AppState>) -> impl Responder {
    let (lat, lon) = path.into_inner();
    info!("current weather for {}, {}", lat, lon);

    match data.owm.current_by_coords(lat, lon).await {
        Ok(json) => HttpResponse::Ok().json(json),
        Err(e) => upstream_failure(e, "Failed to fetch weather data"),
    }
}

#[get("/api/weather/forecast/{lat}/{lon}")]
async fn forecast(path: web::Path<(f64, f64)>, params: web::Query<ForecastParams>, data: web::Data<AppState>) -> impl Responder {
    let (lat, lon) = path.into_inner();
    let days = params.days.unwrap_or(data.forecast_days);
    info!("forecast for {}, {}, {} days", lat, lon, days);

    match data.owm.forecast(lat, lon).await {
        Ok(feed) => HttpResponse::Ok().json(aggregate_feed(&feed, days)),
        Err(e) => upstream_failure(e, "Failed to fetch forecast data"),
    }
}

#[get("/api/weather/search/{query}")]
async fn search_cities(path: web::Path<String>, data: web::Data<AppState>) -> impl Responder {
    let query = path.into_inner();
    info!("city search for {}", query);

    match data.owm.search_cities(&query).await {
        Ok(json) => HttpResponse::Ok().json(json),
        Err(e) => upstream_failure(e, "Failed to search cities"),
    }
}

#[get("/api/search-history")]
async fn list_history(data: web::Data<AppState>) -> impl Responder {
    let history = data.history.lock().await;

    match history.list(data.list_limit) {
        Ok(entries) => HttpResponse::Ok().json(entries),
        Err(e) => {
            error!("failed to list search history: {}", e);
            HttpResponse::InternalServerError().json(message("Failed to fetch search history"))
        }
    }
}

#[post("/api/search-history")]
async fn add_history(body: web::Json<HistoryCandidate>, data: web::Data<AppState>) -> impl Responder {
    info!("{:?}", body);

    let mut history = data.history.lock().await;

    match history.add(body.into_inner()) {
        Ok(entry) => HttpResponse::Ok().json(entry),
        Err(HistoryError::Validation(e)) => {
            info!("rejected search history entry: {}", e);
            HttpResponse::BadRequest().json(message(INVALID_HISTORY))
        },
        Err(e) => {
            error!("failed to add to search history: {}", e);
            HttpResponse::InternalServerError().json(message("Failed to add to search history"))
        }
    }
}

#[delete("/api/search-history")]
async fn clear_history(data: web::Data<AppState>) -> impl Responder {
    let mut history = data.history.lock().await;

    match history.clear() {
        Ok(_) => {
            info!("search history cleared");
            HttpResponse::Ok().json(message("Search history cleared"))
        },
        Err(e) => {
            error!("failed to clear search history: {}", e);
            HttpResponse::InternalServerError().json(message("Failed to clear search history"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use actix_web::{test, App};
    use actix_web::http::StatusCode;
    use serde_json::{json, Value};
    use tokio::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use crate::manager_history::{HistoryStore, MemoryHistory};
    use crate::manager_history::models::HistoryEntry;
    use crate::manager_owm::OWM;

    fn state(base_url: &str, api_key: Option<&str>) -> web::Data<AppState> {
        let store: Box<dyn HistoryStore> = Box::new(MemoryHistory::new(None));
        web::Data::new(AppState {
            history: Arc::new(Mutex::new(store)),
            owm: Arc::new(OWM::new(base_url, api_key.map(str::to_string), 5, 5).unwrap()),
            forecast_days: 5,
            list_limit: 10,
        })
    }

    #[actix_web::test]
    async fn test_add_list_and_clear_history() {
        let app = test::init_service(
            App::new().app_data(state("http://localhost:1", None)).configure(routes)
        ).await;

        for city in ["Malmo", "Kiruna"] {
            let req = test::TestRequest::post()
                .uri("/api/search-history")
                .set_json(json!({"cityName": city, "country": "SE", "lat": "55.6", "lon": "13.0", "temperature": 7}))
                .to_request();
            let entry: HistoryEntry = test::call_and_read_body_json(&app, req).await;
            assert_eq!(entry.city_name, city);
        }

        let req = test::TestRequest::get().uri("/api/search-history").to_request();
        let entries: Vec<HistoryEntry> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].city_name, "Kiruna");
        assert_eq!(entries[0].id, 2);

        let req = test::TestRequest::delete().uri("/api/search-history").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "Search history cleared");

        let req = test::TestRequest::get().uri("/api/search-history").to_request();
        let entries: Vec<HistoryEntry> = test::call_and_read_body_json(&app, req).await;
        assert!(entries.is_empty());
    }

    #[actix_web::test]
    async fn test_invalid_history_is_bad_request() {
        let app = test::init_service(
            App::new().app_data(state("http://localhost:1", None)).configure(routes)
        ).await;

        let req = test::TestRequest::post()
            .uri("/api/search-history")
            .set_json(json!({"lat": "1", "lon": "2"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], INVALID_HISTORY);

        let req = test::TestRequest::post()
            .uri("/api/search-history")
            .set_json(json!({"cityName": "Bergen", "lat": "60.4", "lon": "5.3", "temperature": "warm"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/api/search-history").to_request();
        let entries: Vec<HistoryEntry> = test::call_and_read_body_json(&app, req).await;
        assert!(entries.is_empty());
    }

    #[actix_web::test]
    async fn test_forecast_is_aggregated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "list": [
                    {"dt": 1792400400, "main": {"temp_max": 20.0, "temp_min": 12.0},
                     "weather": [{"description": "clear", "icon": "01d"}]},
                    {"dt": 1792400400, "main": {"temp_max": 25.0, "temp_min": 14.0},
                     "weather": [{"description": "clouds", "icon": "03d"}]},
                    {"dt": 1792486800, "main": {"temp_max": 18.0, "temp_min": 10.0},
                     "weather": [{"description": "rain", "icon": "10d"}]}
                ]
            })))
            .mount(&server)
            .await;
        let app = test::init_service(
            App::new().app_data(state(&server.uri(), Some("secret"))).configure(routes)
        ).await;

        let req = test::TestRequest::get().uri("/api/weather/forecast/59.3/18.1").to_request();
        let days: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(days.len(), 2);
        assert_eq!(days[0]["high"], 25.0);
        assert_eq!(days[0]["low"], 12.0);
        assert_eq!(days[0]["condition"], "clear");
        assert_eq!(days[1]["condition"], "rain");

        let req = test::TestRequest::get().uri("/api/weather/forecast/59.3/18.1?days=1").to_request();
        let days: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(days.len(), 1);
    }

    #[actix_web::test]
    async fn test_unknown_city_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let app = test::init_service(
            App::new().app_data(state(&server.uri(), Some("secret"))).configure(routes)
        ).await;

        let req = test::TestRequest::get().uri("/api/weather/current/city/Atlantis").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "City not found");
    }

    #[actix_web::test]
    async fn test_upstream_failure_and_missing_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let app = test::init_service(
            App::new().app_data(state(&server.uri(), Some("secret"))).configure(routes)
        ).await;
        let req = test::TestRequest::get().uri("/api/weather/current/59.3/18.1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Failed to fetch weather data");

        let app = test::init_service(
            App::new().app_data(state(&server.uri(), None)).configure(routes)
        ).await;
        let req = test::TestRequest::get().uri("/api/weather/search/Lund").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Weather API key not configured");
    }

    #[actix_web::test]
    async fn test_current_weather_passes_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Visby", "main": {"temp": 9.5}})))
            .mount(&server)
            .await;
        let app = test::init_service(
            App::new().app_data(state(&server.uri(), Some("secret"))).configure(routes)
        ).await;

        let req = test::TestRequest::get().uri("/api/weather/current/city/Visby").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["name"], "Visby");

        let req = test::TestRequest::get().uri("/api/weather/current/57.6/18.3").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["main"]["temp"], 9.5);
    }
}
