//! Mock data tools exposed to the agent runtime.
//!
//! - Weather: randomized N-day forecast with outdoor suitability
//! - Schedule: randomized N-day personal activity schedule
//! - Meal: recipe selection, calorie lookup and macro estimate

pub mod meal;
pub mod schedule;
pub mod weather;

pub use meal::{
    aggregate_nutrition, healthy_meal_toolkit, lookup_calories, select_recipe, HealthyMealTool,
    MealRecommendation, NutritionSummary,
};
pub use schedule::{
    personal_schedule_toolkit, Activity, PersonalScheduleTool, Schedule, ScheduleDay,
};
pub use weather::{weather_toolkit, DayForecast, Forecast, WeatherCondition, WeatherTool};

use serde_json::{json, Value};
use tracing::warn;

use crate::config::ToolsConfig;
use crate::context::ToolContext;
use crate::error::{CoachError, Result};
use crate::tool::ToolRegistry;

/// Every tool, under one registry.
pub fn fitness_toolkit(config: &ToolsConfig, ctx: &ToolContext) -> ToolRegistry {
    let mut registry = ctx.registry();
    registry.extend(weather_toolkit(config, ctx));
    registry.extend(personal_schedule_toolkit(config, ctx));
    registry.extend(healthy_meal_toolkit(ctx));
    registry
}

/// Default and upper bound for the `days` argument of the generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub default_days: u32,
    pub max_days: u32,
}

impl DayWindow {
    pub fn from_config(config: &ToolsConfig) -> Self {
        Self {
            default_days: config.default_days,
            max_days: config.max_days,
        }
    }

    /// Read `days` from tool arguments. Absent or null means the default, and
    /// whole floats such as `7.0` count as integers.
    pub fn resolve(&self, input: &Value, tool: &str) -> Result<u32> {
        let days = match input.get("days") {
            None | Some(Value::Null) => return Ok(self.clamp(self.default_days, tool)),
            Some(value) => value,
        };
        let days = days
            .as_i64()
            .or_else(|| whole_number(days))
            .ok_or_else(|| {
                CoachError::invalid_argument("days", format!("expected an integer, got {days}"))
            })?;
        let days = u32::try_from(days).map_err(|_| {
            CoachError::invalid_argument("days", format!("must be between 0 and {}", u32::MAX))
        })?;
        Ok(self.clamp(days, tool))
    }

    pub fn clamp(&self, days: u32, tool: &str) -> u32 {
        if days > self.max_days {
            warn!(tool, requested = days, max = self.max_days, "clamping requested days");
            self.max_days
        } else {
            days
        }
    }

    pub fn parameters(&self, what: &str) -> Value {
        json!({
            "type": "object",
            "properties": {
                "days": {
                    "type": "integer",
                    "minimum": 0,
                    "maximum": self.max_days,
                    "default": self.default_days,
                    "description": format!("Number of days of {what} to return"),
                }
            }
        })
    }
}

fn whole_number(value: &Value) -> Option<i64> {
    let float = value.as_f64()?;
    let in_range = float >= i64::MIN as f64 && float < i64::MAX as f64;
    (float.fract() == 0.0 && in_range).then_some(float as i64)
}
