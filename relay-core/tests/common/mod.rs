#![allow(dead_code)]

use serde_json::{Value, json};
use weather_relay_core::{TemperatureUnit, UserOptions};

pub fn openweather_body(name: &str, temp: f64, id: i64, icon: &str) -> Value {
    json!({
        "coord": { "lon": 2.35, "lat": 48.85 },
        "weather": [{ "id": id, "main": "Rain", "description": "light rain", "icon": icon }],
        "main": { "temp": temp, "feels_like": temp, "humidity": 81 },
        "name": name,
        "cod": 200
    })
}

pub fn yahoo_place_body(woeid: &str) -> Value {
    json!({
        "query": {
            "count": 1,
            "results": { "place": { "woeid": woeid } }
        }
    })
}

pub fn yahoo_forecast_body(city: &str, code: &str, temp: &str) -> Value {
    json!({
        "query": {
            "count": 1,
            "results": {
                "channel": {
                    "location": { "city": city, "country": "France", "region": " Ile-de-France" },
                    "item": {
                        "condition": { "code": code, "date": "Mon, 12 Oct 2026 09:00 AM CEST", "temp": temp, "text": "Mostly Cloudy" }
                    }
                }
            }
        }
    })
}

pub fn gps_options(units: TemperatureUnit) -> UserOptions {
    UserOptions { use_gps: true, location: String::new(), units, invert_color: false }
}

pub fn manual_options(place: &str, units: TemperatureUnit) -> UserOptions {
    UserOptions { use_gps: false, location: place.to_string(), units, invert_color: false }
}
