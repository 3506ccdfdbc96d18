//! Injectable sources of nondeterminism: the random generator and "today".

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Days, Local, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::ToolsConfig;
use crate::error::{CoachError, Result};
use crate::telemetry::TelemetryCollector;
use crate::tool::ToolRegistry;

/// Shared pseudo-random generator. Clones draw from the same stream.
#[derive(Clone, Debug)]
pub struct RandomSource {
    rng: Arc<Mutex<StdRng>>,
}

impl RandomSource {
    pub fn from_entropy() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_config(config: &ToolsConfig) -> Self {
        match config.seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// Run `f` with exclusive access to the generator. A panic in an earlier
    /// closure does not disable the source.
    pub fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut guard = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Where day offsets are counted from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Calendar {
    #[default]
    Local,
    Fixed(NaiveDate),
}

impl Calendar {
    pub fn today(&self) -> NaiveDate {
        match self {
            Calendar::Local => Local::now().date_naive(),
            Calendar::Fixed(date) => *date,
        }
    }

    /// `today + offset` for every offset in `0..days`.
    pub fn dates(&self, days: u32) -> Result<Vec<NaiveDate>> {
        let start = self.today();
        (0..days)
            .map(|offset| {
                start
                    .checked_add_days(Days::new(u64::from(offset)))
                    .ok_or_else(|| {
                        CoachError::Protocol(format!("date overflow at {start} + {offset} days"))
                    })
            })
            .collect()
    }
}

/// Everything a tool needs besides its own configuration.
#[derive(Clone, Debug, Default)]
pub struct ToolContext {
    pub random: RandomSource,
    pub calendar: Calendar,
    pub telemetry: Option<TelemetryCollector>,
}

impl ToolContext {
    pub fn from_config(config: &ToolsConfig) -> Self {
        Self {
            random: RandomSource::from_config(config),
            calendar: Calendar::default(),
            telemetry: None,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            random: RandomSource::seeded(seed),
            calendar: Calendar::default(),
            telemetry: None,
        }
    }

    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn with_telemetry(mut self, telemetry: TelemetryCollector) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// An empty registry wired to this context's telemetry.
    pub fn registry(&self) -> ToolRegistry {
        match &self.telemetry {
            Some(telemetry) => ToolRegistry::new().with_telemetry(telemetry.clone()),
            None => ToolRegistry::new(),
        }
    }
}
