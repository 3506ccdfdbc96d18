//! Personal schedule toolkit.

use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use super::DayWindow;
use crate::config::ToolsConfig;
use crate::context::{Calendar, RandomSource, ToolContext};
use crate::error::Result;
use crate::tool::{Tool, ToolRegistry};

pub const SCHEDULE_UNAVAILABLE: &str =
    "Unable to retrieve personal schedule. Please try again later.";

/// Create the `personal_schedule_tool` toolkit.
pub fn personal_schedule_toolkit(config: &ToolsConfig, ctx: &ToolContext) -> ToolRegistry {
    let mut registry = ctx.registry();
    registry.register(PersonalScheduleTool::new(config, ctx));
    registry
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Activity {
    Meeting,
    Workout,
    MealPrep,
    Rest,
}

impl Activity {
    pub const ALL: [Activity; 4] = [
        Activity::Meeting,
        Activity::Workout,
        Activity::MealPrep,
        Activity::Rest,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Activity::Meeting => "Meeting",
            Activity::Workout => "Workout",
            Activity::MealPrep => "Meal Prep",
            Activity::Rest => "Rest",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleDay {
    pub date: NaiveDate,
    pub events: Vec<Activity>,
}

impl ScheduleDay {
    pub fn weekday(&self) -> String {
        self.date.format("%A").to_string()
    }
}

/// One to three distinct activities, sampled without replacement.
pub fn schedule_day<R: Rng + ?Sized>(rng: &mut R, date: NaiveDate) -> ScheduleDay {
    let count = rng.gen_range(1..=3);
    ScheduleDay {
        date,
        events: Activity::ALL.choose_multiple(rng, count).copied().collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    pub days: Vec<ScheduleDay>,
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Personal Schedule:")?;
        writeln!(f, "{}", "=".repeat(40))?;
        for day in &self.days {
            writeln!(f, "{} ({}):", day.weekday(), day.date.format("%Y-%m-%d"))?;
            for event in &day.events {
                writeln!(f, "  • {event}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// `get_schedule(days = 7)`.
#[derive(Debug, Clone)]
pub struct PersonalScheduleTool {
    window: DayWindow,
    random: RandomSource,
    calendar: Calendar,
}

impl PersonalScheduleTool {
    pub fn new(config: &ToolsConfig, ctx: &ToolContext) -> Self {
        Self {
            window: DayWindow::from_config(config),
            random: ctx.random.clone(),
            calendar: ctx.calendar,
        }
    }

    pub fn schedule(&self, days: u32) -> Result<Schedule> {
        let days = self.window.clamp(days, "get_schedule");
        info!(days, "fetching personal schedule");
        let dates = self.calendar.dates(days)?;
        let days: Vec<ScheduleDay> = self
            .random
            .with_rng(|rng| dates.into_iter().map(|date| schedule_day(rng, date)).collect());
        Ok(Schedule { days })
    }

    pub fn get_schedule(&self, days: u32) -> String {
        render_or_unavailable(self.schedule(days))
    }
}

fn render_or_unavailable(schedule: Result<Schedule>) -> String {
    match schedule {
        Ok(schedule) => schedule.to_string(),
        Err(err) => {
            error!(error = %err, "error getting personal schedule");
            SCHEDULE_UNAVAILABLE.to_string()
        }
    }
}

#[async_trait]
impl Tool for PersonalScheduleTool {
    fn name(&self) -> &str {
        "get_schedule"
    }

    fn description(&self) -> &str {
        "Get the user's personal schedule (meetings, workouts, meal prep, rest) for the \
         coming days. Expects {\"days\": integer} (default 7)."
    }

    fn parameters(&self) -> Option<Value> {
        Some(self.window.parameters("schedule"))
    }

    async fn call(&self, input: Value) -> Result<Value> {
        let schedule = self
            .window
            .resolve(&input, self.name())
            .and_then(|days| self.schedule(days));
        Ok(Value::String(render_or_unavailable(schedule)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn tool(seed: u64) -> PersonalScheduleTool {
        let ctx = ToolContext::seeded(seed).with_calendar(Calendar::Fixed(start()));
        PersonalScheduleTool::new(&ToolsConfig::default(), &ctx)
    }

    #[test]
    fn events_are_distinct_and_bounded() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut sizes = HashSet::new();
        for _ in 0..300 {
            let day = schedule_day(&mut rng, start());
            let unique: HashSet<_> = day.events.iter().collect();
            assert!((1..=3).contains(&day.events.len()));
            assert_eq!(unique.len(), day.events.len());
            sizes.insert(day.events.len());
        }
        assert_eq!(sizes.len(), 3);
    }

    #[test]
    fn schedule_has_one_entry_per_day() {
        for n in [0u32, 1, 7, 20] {
            assert_eq!(tool(2).schedule(n).unwrap().days.len(), n as usize);
        }
    }

    #[test]
    fn renders_bulleted_days() {
        let schedule = Schedule {
            days: vec![ScheduleDay {
                date: start(),
                events: vec![Activity::Workout, Activity::MealPrep],
            }],
        };
        let expected = format!(
            "Personal Schedule:\n{}\nMonday (2024-06-03):\n  • Workout\n  • Meal Prep\n\n",
            "=".repeat(40)
        );
        assert_eq!(schedule.to_string(), expected);
    }

    #[test]
    fn zero_days_renders_header_only() {
        assert_eq!(
            tool(1).get_schedule(0),
            format!("Personal Schedule:\n{}\n", "=".repeat(40))
        );
    }

    #[tokio::test]
    async fn tool_call_renders_requested_days() {
        let output = tool(4).call(json!({"days": 3})).await.unwrap();
        let text = output.as_str().unwrap();
        assert_eq!(text.matches("2024-06-0").count(), 3);
        assert!(text.contains("Wednesday (2024-06-05):"));
    }

    #[tokio::test]
    async fn negative_days_render_unavailable_message() {
        let output = tool(4).call(json!({"days": -2})).await.unwrap();
        assert_eq!(output, json!(SCHEDULE_UNAVAILABLE));
    }
}
