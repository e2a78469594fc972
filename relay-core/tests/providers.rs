mod common;

use common::{openweather_body, yahoo_forecast_body, yahoo_place_body};
use weather_relay_core::{
    FetchError, LocationQuery, ProviderConditionCode, TemperatureUnit, WeatherProvider,
    provider::{
        openweather::{OpenWeatherProvider, OwCondition, UnitMode},
        yahoo::YahooProvider,
    },
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const YQL_PATH: &str = "/v1/public/yql";

#[tokio::test]
async fn openweather_place_query_uses_requested_unit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Paris"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openweather_body("Paris", 12.6, 500, "10d")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenWeatherProvider::new(None).with_base_url(server.uri());
    let reading = provider
        .get_weather(&LocationQuery::Place("Paris".into()), TemperatureUnit::Celsius)
        .await
        .expect("reading");

    assert_eq!(reading.temperature, 13);
    assert_eq!(reading.unit, TemperatureUnit::Celsius);
    assert_eq!(reading.condition, ProviderConditionCode::IconCode("10d".into()));
    assert_eq!(reading.location_name.as_deref(), Some("Paris"));
}

#[tokio::test]
async fn openweather_kelvin_mode_converts_locally() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "45.5"))
        .and(query_param("lon", "-122.5"))
        .and(query_param("appid", "KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openweather_body("Portland", 293.15, 801, "02d")))
        .mount(&server)
        .await;

    let provider = OpenWeatherProvider::new(Some("KEY".into()))
        .with_base_url(server.uri())
        .with_unit_mode(UnitMode::Kelvin)
        .with_condition(OwCondition::WeatherId);

    let reading = provider
        .get_weather(
            &LocationQuery::Coordinates { latitude: 45.5, longitude: -122.5 },
            TemperatureUnit::Fahrenheit,
        )
        .await
        .expect("reading");

    assert_eq!(reading.temperature, 68);
    assert_eq!(reading.condition, ProviderConditionCode::WeatherId(801));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].url.query_pairs().all(|(k, _)| k != "units"));
}

#[tokio::test]
async fn openweather_error_status_is_a_fetch_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"cod":401,"message":"Invalid API key"}"#))
        .mount(&server)
        .await;

    let provider = OpenWeatherProvider::new(None).with_base_url(server.uri());
    let err = provider
        .get_weather(&LocationQuery::Place("Paris".into()), TemperatureUnit::Celsius)
        .await
        .unwrap_err();

    match err {
        FetchError::Status { status, body, .. } => {
            assert_eq!(status.as_u16(), 401);
            assert!(body.contains("Invalid API key"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn openweather_without_weather_entries_is_a_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Nowhere",
            "main": { "temp": 1.0 },
            "weather": []
        })))
        .mount(&server)
        .await;

    let provider = OpenWeatherProvider::new(None).with_base_url(server.uri());
    let err = provider
        .get_weather(&LocationQuery::Place("Nowhere".into()), TemperatureUnit::Celsius)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Parse { .. }), "{err:?}");
}

#[tokio::test]
async fn openweather_malformed_json_is_a_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let provider = OpenWeatherProvider::new(None).with_base_url(server.uri());
    let err = provider
        .get_weather(&LocationQuery::Place("Paris".into()), TemperatureUnit::Fahrenheit)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Parse { .. }), "{err:?}");
}

#[tokio::test]
async fn yahoo_looks_up_place_then_forecast() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(YQL_PATH))
        .and(query_param("q", "select woeid from geo.places(1) where text=\"Paris\""))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(yahoo_place_body("615702")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(YQL_PATH))
        .and(query_param(
            "q",
            "select item.condition, location from weather.forecast where woeid=615702 and u='c'",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(yahoo_forecast_body("Paris", "28", "14")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = YahooProvider::with_base_url(server.uri());
    let reading = provider
        .get_weather(&LocationQuery::Place("Paris".into()), TemperatureUnit::Celsius)
        .await
        .expect("reading");

    assert_eq!(reading.temperature, 14);
    assert_eq!(reading.condition, ProviderConditionCode::ConditionCode(28));
    assert_eq!(reading.location_name.as_deref(), Some("Paris"));
}

#[tokio::test]
async fn yahoo_unknown_place_is_a_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(YQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": { "count": 0, "results": null }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = YahooProvider::with_base_url(server.uri());
    let err = provider
        .get_weather(&LocationQuery::Place("Atlantis".into()), TemperatureUnit::Fahrenheit)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Atlantis"), "{err}");
}

#[tokio::test]
async fn network_error_does_not_leak_api_key() {
    let closed_port = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .expect("free port")
        .port();

    let provider = OpenWeatherProvider::new(Some("SECRETKEY".into()))
        .with_base_url(format!("http://127.0.0.1:{closed_port}"));
    let err = provider
        .get_weather(&LocationQuery::Place("Paris".into()), TemperatureUnit::Celsius)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Network { provider: "openweather", .. }), "{err:?}");
    assert!(!err.to_string().contains("SECRETKEY"), "{err}");
    assert!(!format!("{err:?}").contains("SECRETKEY"), "{err:?}");
}
