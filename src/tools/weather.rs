//! Weather toolkit.
//!
//! Simulates an N-day forecast with a 50% chance of rain per day. Rainy days
//! run cooler and are flagged unsuitable for outdoor workouts.

use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use super::DayWindow;
use crate::config::ToolsConfig;
use crate::context::{Calendar, RandomSource, ToolContext};
use crate::error::Result;
use crate::tool::{Tool, ToolRegistry};

pub const WEATHER_UNAVAILABLE: &str =
    "Unable to retrieve weather forecast. Please try again later.";

/// Create the `weather_tool` toolkit.
pub fn weather_toolkit(config: &ToolsConfig, ctx: &ToolContext) -> ToolRegistry {
    let mut registry = ctx.registry();
    registry.register(WeatherTool::new(config, ctx));
    registry
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WeatherCondition {
    Sunny,
    PartlyCloudy,
    Cloudy,
    Clear,
    LightRain,
    HeavyRain,
    Drizzle,
    Showers,
}

impl WeatherCondition {
    pub const CLEAR: [WeatherCondition; 4] = [
        WeatherCondition::Sunny,
        WeatherCondition::PartlyCloudy,
        WeatherCondition::Cloudy,
        WeatherCondition::Clear,
    ];

    pub const RAIN: [WeatherCondition; 4] = [
        WeatherCondition::LightRain,
        WeatherCondition::HeavyRain,
        WeatherCondition::Drizzle,
        WeatherCondition::Showers,
    ];

    pub fn is_rain(self) -> bool {
        Self::RAIN.contains(&self)
    }

    pub fn label(self) -> &'static str {
        match self {
            WeatherCondition::Sunny => "Sunny",
            WeatherCondition::PartlyCloudy => "Partly Cloudy",
            WeatherCondition::Cloudy => "Cloudy",
            WeatherCondition::Clear => "Clear",
            WeatherCondition::LightRain => "Light Rain",
            WeatherCondition::HeavyRain => "Heavy Rain",
            WeatherCondition::Drizzle => "Drizzle",
            WeatherCondition::Showers => "Showers",
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub condition: WeatherCondition,
    /// Degrees Fahrenheit.
    pub high_temp: i32,
    pub low_temp: i32,
    pub outdoor_suitable: bool,
}

impl DayForecast {
    pub fn weekday(&self) -> String {
        self.date.format("%A").to_string()
    }
}

/// Draw one day. Rain: high 45-60, low 35-50. Otherwise: high 55-75, low 40-60.
pub fn forecast_day<R: Rng + ?Sized>(rng: &mut R, date: NaiveDate) -> DayForecast {
    let will_rain = rng.gen_bool(0.5);
    let (pool, high, low) = if will_rain {
        (&WeatherCondition::RAIN, 45..=60, 35..=50)
    } else {
        (&WeatherCondition::CLEAR, 55..=75, 40..=60)
    };
    DayForecast {
        date,
        condition: pool[rng.gen_range(0..pool.len())],
        high_temp: rng.gen_range(high),
        low_temp: rng.gen_range(low),
        outdoor_suitable: !will_rain,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub location: String,
    pub days: Vec<DayForecast>,
}

impl fmt::Display for Forecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} Weather Forecast:", self.location)?;
        writeln!(f, "{}", "=".repeat(40))?;
        for day in &self.days {
            writeln!(
                f,
                "{} ({}): {}",
                day.weekday(),
                day.date.format("%Y-%m-%d"),
                day.condition
            )?;
            writeln!(f, "  High: {}°F, Low: {}°F", day.high_temp, day.low_temp)?;
            let verdict = if day.outdoor_suitable {
                "✅ Suitable"
            } else {
                "❌ Not Recommended"
            };
            writeln!(f, "  Outdoor Workout: {verdict}")?;
            writeln!(f)?;
        }
        Ok(())
    }
}

/// `get_weather(days = 7)`.
#[derive(Debug, Clone)]
pub struct WeatherTool {
    location: String,
    window: DayWindow,
    random: RandomSource,
    calendar: Calendar,
}

impl WeatherTool {
    pub fn new(config: &ToolsConfig, ctx: &ToolContext) -> Self {
        Self {
            location: config.location.clone(),
            window: DayWindow::from_config(config),
            random: ctx.random.clone(),
            calendar: ctx.calendar,
        }
    }

    pub fn forecast(&self, days: u32) -> Result<Forecast> {
        let days = self.window.clamp(days, "get_weather");
        info!(days, location = %self.location, "fetching weather forecast");
        let dates = self.calendar.dates(days)?;
        let days: Vec<DayForecast> = self
            .random
            .with_rng(|rng| dates.into_iter().map(|date| forecast_day(rng, date)).collect());
        Ok(Forecast {
            location: self.location.clone(),
            days,
        })
    }

    /// Rendered forecast, or the unavailable message on any fault.
    pub fn get_weather(&self, days: u32) -> String {
        render_or_unavailable(self.forecast(days))
    }
}

fn render_or_unavailable(forecast: Result<Forecast>) -> String {
    match forecast {
        Ok(forecast) => forecast.to_string(),
        Err(err) => {
            error!(error = %err, "error getting weather forecast");
            WEATHER_UNAVAILABLE.to_string()
        }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get the weather forecast, one entry per day with high/low temperatures and whether \
         the day suits an outdoor workout. Expects {\"days\": integer} (default 7)."
    }

    fn parameters(&self) -> Option<Value> {
        Some(self.window.parameters("forecast"))
    }

    async fn call(&self, input: Value) -> Result<Value> {
        let forecast = self
            .window
            .resolve(&input, self.name())
            .and_then(|days| self.forecast(days));
        Ok(Value::String(render_or_unavailable(forecast)))
    }
}
