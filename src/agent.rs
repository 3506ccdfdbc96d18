use serde_json::Value;

use crate::config::{AgentsConfig, ModelConfig};
use crate::context::Calendar;
use crate::error::Result;
use crate::tool::{ToolDescription, ToolRegistry};

/// Declarative description of one agent: who it is, what it may call, and the
/// model the external runtime should drive it with.
#[derive(Debug, Clone)]
pub struct AgentProfile {
    name: String,
    role: String,
    model: ModelConfig,
    instructions: Vec<String>,
    tools: ToolRegistry,
    history_responses: usize,
    markdown: bool,
    calendar: Calendar,
}

impl AgentProfile {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        let agents = AgentsConfig::default();
        Self {
            name: name.into(),
            role: role.into(),
            model: ModelConfig::default(),
            instructions: Vec::new(),
            tools: ToolRegistry::new(),
            history_responses: agents.history_responses,
            markdown: agents.markdown,
            calendar: Calendar::default(),
        }
    }

    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    pub fn with_agents_config(mut self, config: &AgentsConfig) -> Self {
        self.history_responses = config.history_responses;
        self.markdown = config.markdown;
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

    /// Add every tool of a toolkit to this agent.
    pub fn with_toolkit(mut self, toolkit: ToolRegistry) -> Self {
        self.tools.extend(toolkit);
        self
    }

    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }

    pub fn history_responses(&self) -> usize {
        self.history_responses
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn owns_tool(&self, name: &str) -> bool {
        self.tools.contains(name)
    }

    pub fn tool_descriptions(&self) -> Vec<ToolDescription> {
        self.tools.describe()
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value> {
        self.tools.call(name, arguments).await
    }

    /// System message handed to the model at the start of every exchange.
    pub fn system_prompt(&self) -> String {
        let mut prompt = format!("You are {}. Your role: {}.\n", self.name, self.role);
        prompt.push_str(&format!(
            "The current date is {}.\n\n",
            self.calendar.today().format("%Y-%m-%d")
        ));
        if !self.instructions.is_empty() {
            prompt.push_str("Instructions:\n");
            for instruction in &self.instructions {
                prompt.push_str(&format!("- {instruction}\n"));
            }
            prompt.push('\n');
        }
        if self.tools.is_empty() {
            prompt.push_str("No tools are available.\n");
        } else {
            prompt.push_str("Available tools:\n");
            for tool in self.tools.describe() {
                prompt.push_str(&format!("- {}: {}\n", tool.name, tool.description));
                if let Some(params) = tool.parameters {
                    prompt.push_str(&format!("  parameters: {params}\n"));
                }
            }
        }
        if self.markdown {
            prompt.push_str("\nFormat your replies using markdown.\n");
        }
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    use crate::tool::Tool;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes the `text` field back"
        }

        fn parameters(&self) -> Option<Value> {
            Some(serde_json::json!({
                "type": "object",
                "properties": {"text": {"type": "string"}},
            }))
        }

        async fn call(&self, input: Value) -> Result<Value> {
            Ok(input)
        }
    }

    fn echo_toolkit() -> ToolRegistry {
        let mut tools = ToolRegistry::new();
        tools.register(EchoTool);
        tools
    }

    #[test]
    fn prompt_includes_role_instructions_and_tools() {
        let agent = AgentProfile::new("Echo Agent", "Repeat things")
            .with_instructions(["Be brief."])
            .with_toolkit(echo_toolkit())
            .with_calendar(Calendar::Fixed(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()));

        let prompt = agent.system_prompt();
        assert!(prompt.starts_with("You are Echo Agent. Your role: Repeat things.\n"));
        assert!(prompt.contains("The current date is 2024-06-03."));
        assert!(prompt.contains("- Be brief.\n"));
        assert!(prompt.contains("- echo: Echoes the `text` field back"));
        assert!(prompt.contains("parameters"));
        assert!(prompt.ends_with("markdown.\n"));
    }

    #[test]
    fn prompt_without_tools() {
        let agent = AgentProfile::new("Quiet", "Nothing").with_agents_config(&AgentsConfig {
            history_responses: 2,
            markdown: false,
        });
        let prompt = agent.system_prompt();
        assert!(prompt.ends_with("No tools are available.\n"));
        assert_eq!(agent.history_responses(), 2);
    }

    #[tokio::test]
    async fn calls_owned_tools() {
        let agent = AgentProfile::new("Echo Agent", "Repeat things").with_toolkit(echo_toolkit());
        assert!(agent.owns_tool("echo"));
        let reply = agent
            .call_tool("echo", serde_json::json!({"text": "ping"}))
            .await
            .unwrap();
        assert_eq!(reply["text"], "ping");
    }
}
