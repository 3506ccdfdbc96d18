use serde_json::Value;
use tracing::debug;

use crate::agent::AgentProfile;
use crate::config::{AppConfig, ModelConfig};
use crate::context::ToolContext;
use crate::error::{CoachError, Result};
use crate::tools::{healthy_meal_toolkit, personal_schedule_toolkit, weather_toolkit};

/// A coordinating roster of agents. Tool calls are routed to the member that
/// owns the tool; conversation state lives in the external runtime.
#[derive(Debug, Clone)]
pub struct Team {
    name: String,
    mode: String,
    model: ModelConfig,
    members: Vec<AgentProfile>,
    success_criteria: Option<String>,
    instructions: Vec<String>,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: "coordinate".into(),
            model: ModelConfig::default(),
            members: Vec::new(),
            success_criteria: None,
            instructions: Vec::new(),
        }
    }

    /// Model the coordinator runs on, independent of its members.
    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    pub fn with_member(mut self, agent: AgentProfile) -> Self {
        self.members.push(agent);
        self
    }

    pub fn with_success_criteria(mut self, criteria: impl Into<String>) -> Self {
        self.success_criteria = Some(criteria.into());
        self
    }

    pub fn with_instructions<I, S>(mut self, instructions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions.extend(instructions.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    pub fn success_criteria(&self) -> Option<&str> {
        self.success_criteria.as_deref()
    }

    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }

    pub fn members(&self) -> &[AgentProfile] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&AgentProfile> {
        self.members
            .iter()
            .find(|agent| agent.name().eq_ignore_ascii_case(name))
    }

    /// Number of registered agents.
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// First member, in registration order, that owns `tool`.
    pub fn route(&self, tool: &str) -> Option<&AgentProfile> {
        self.members.iter().find(|agent| agent.owns_tool(tool))
    }

    /// Every tool name reachable through the team, sorted and deduplicated.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .members
            .iter()
            .flat_map(|agent| agent.tools().names())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value> {
        let agent = self
            .route(tool)
            .ok_or_else(|| CoachError::ToolNotFound(tool.to_string()))?;
        debug!(team = %self.name, agent = agent.name(), tool, "routing tool call");
        agent.call_tool(tool, arguments).await
    }
}

/// Weather and schedule owner; coordinates with the Fitness Agent.
pub fn planning_agent(config: &AppConfig, ctx: &ToolContext) -> AgentProfile {
    AgentProfile::new(
        "Planning Agent",
        "Coordinate fitness coaching and manage user sessions",
    )
    .with_model(config.model.clone())
    .with_agents_config(&config.agents)
    .with_calendar(ctx.calendar)
    .with_toolkit(personal_schedule_toolkit(&config.tools, ctx))
    .with_toolkit(weather_toolkit(&config.tools, ctx))
    .with_instructions([
        "Always check weather when outdoor activities are requested.",
        "Coordinate with the Fitness Agent for workout and meal planning.",
        "Maintain user context and preferences across sessions.",
        "If weather is unsuitable for outdoor activities, suggest indoor alternatives.",
    ])
}

/// Exercise and nutrition specialist; owns the meal tool.
pub fn fitness_agent(config: &AppConfig, ctx: &ToolContext) -> AgentProfile {
    AgentProfile::new(
        "Fitness Agent",
        "Provide specialized fitness and nutrition advice",
    )
    .with_model(config.model.clone())
    .with_agents_config(&config.agents)
    .with_calendar(ctx.calendar)
    .with_toolkit(healthy_meal_toolkit(ctx))
    .with_instructions([
        "You are a specialized fitness and nutrition expert.",
        "Provide specific workout recommendations based on recovery stage.",
        "Suggest healthy meals that support recovery and fitness goals.",
        "Always consider injury limitations when recommending exercises.",
    ])
}

pub fn fitness_team(config: &AppConfig, ctx: &ToolContext) -> Team {
    Team::new("Fitness Team")
        .with_model(config.model.clone())
        .with_member(planning_agent(config, ctx))
        .with_member(fitness_agent(config, ctx))
        .with_success_criteria(
            "Provide comprehensive, safe, and weather-appropriate fitness guidance",
        )
        .with_instructions([
            "Work together to provide the best fitness coaching experience.",
            "Planning Agent handles weather and coordination.",
            "Fitness Agent provides specialized exercise and nutrition advice.",
            "Always prioritize user safety, especially ACL recovery considerations.",
            "Provide encouraging and supportive responses.",
        ])
}
