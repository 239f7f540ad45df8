//! The ReAct loop driver.

use std::sync::Arc;

use review::{CompletionRequest, LlmProvider};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::react::{parse_step, react_prompt, tool_names, AgentStep, OBSERVATION_STOP};
use crate::{AgentError, Tool};

/// Default upper bound on model turns per run.
pub const DEFAULT_MAX_ITERATIONS: usize = 15;

/// One tool invocation made during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Tool name as written by the model (may not exist).
    pub tool: String,
    pub input: String,
    pub observation: String,
}

/// The result of a completed agent run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOutcome {
    /// The model's final answer.
    pub output: String,
    /// Tool invocations in the order they happened.
    pub steps: Vec<ToolInvocation>,
    /// Number of model turns taken, including the final one.
    pub iterations: usize,
}

/// Drives the Thought / Action / Observation loop until the model produces a
/// final answer.
///
/// Malformed turns are not fatal: the parse error is fed back to the model as
/// the observation and the loop continues.
pub struct AgentExecutor {
    provider: Arc<dyn LlmProvider>,
    tools: Vec<Arc<dyn Tool>>,
    max_iterations: usize,
}

impl AgentExecutor {
    /// Creates an executor over `tools`.
    ///
    /// # Errors
    ///
    /// [`AgentError::NoTools`] if `tools` is empty.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Vec<Arc<dyn Tool>>,
    ) -> Result<Self, AgentError> {
        if tools.is_empty() {
            return Err(AgentError::NoTools);
        }
        Ok(Self {
            provider,
            tools,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        })
    }

    /// Overrides the turn limit. A limit of zero is raised to one.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Runs the loop for `input`.
    ///
    /// # Errors
    ///
    /// - [`AgentError::Provider`] if a model call fails.
    /// - [`AgentError::IterationLimit`] if no final answer arrives in time.
    pub async fn run(&self, input: &str) -> Result<AgentOutcome, AgentError> {
        let span = info_span!("agent", model = %self.provider.model(), max_iterations = self.max_iterations);
        self.run_loop(input).instrument(span).await
    }

    async fn run_loop(&self, input: &str) -> Result<AgentOutcome, AgentError> {
        let mut scratchpad = String::new();
        let mut steps = Vec::new();

        for iteration in 1..=self.max_iterations {
            let prompt = react_prompt(&self.tools, input, &scratchpad);
            let request = CompletionRequest::from_user(prompt)
                .with_temperature(0.0)
                .with_stop(OBSERVATION_STOP);
            let turn = self.provider.complete(request).await?.content;
            debug!(iteration, turn = %turn, "Model turn");

            let (tool, tool_input, observation) = match parse_step(&turn) {
                Ok(AgentStep::Final { answer }) => {
                    info!(iteration, tool_calls = steps.len(), "Agent finished");
                    return Ok(AgentOutcome {
                        output: answer,
                        steps,
                        iterations: iteration,
                    });
                }
                Ok(AgentStep::Action { tool, input }) => {
                    let observation = self.dispatch(&tool, &input).await;
                    (tool, input, observation)
                }
                Err(e) => {
                    warn!(iteration, error = %e, "Unparseable model turn");
                    (String::new(), String::new(), format!("Invalid Format: {e}"))
                }
            };

            scratchpad.push_str(turn.trim_end());
            scratchpad.push_str(OBSERVATION_STOP);
            scratchpad.push(' ');
            scratchpad.push_str(&observation);
            scratchpad.push_str("\nThought: ");

            if !tool.is_empty() {
                steps.push(ToolInvocation {
                    tool,
                    input: tool_input,
                    observation,
                });
            }
        }

        Err(AgentError::IterationLimit {
            max_iterations: self.max_iterations,
        })
    }

    async fn dispatch(&self, tool: &str, input: &str) -> String {
        match self.tools.iter().find(|t| t.name().as_str() == tool) {
            Some(t) => {
                info!(tool, "Invoking tool");
                t.run(input).await
            }
            None => {
                warn!(tool, "Model asked for an unknown tool");
                format!(
                    "{tool} is not a valid tool, try one of [{}].",
                    tool_names(&self.tools)
                )
            }
        }
    }
}

impl std::fmt::Debug for AgentExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentExecutor")
            .field("model", self.provider.model())
            .field("tools", &tool_names(&self.tools))
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}
