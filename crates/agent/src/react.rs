//! ReAct prompt formatting and step parsing.
//!
//! The model is asked to answer in the
//! `Thought / Action / Action Input / Observation / ... / Final Answer` format.
//! [`react_prompt`] renders the instructions plus the running scratchpad, and
//! [`parse_step`] reads one model turn back into an [`AgentStep`].

use std::sync::Arc;

use thiserror::Error;

use crate::Tool;

const FINAL_ANSWER: &str = "Final Answer:";
const ACTION: &str = "Action:";
const ACTION_INPUT: &str = "Action Input:";

/// Marker the model must not generate itself; the executor supplies it.
pub const OBSERVATION_STOP: &str = "\nObservation:";

/// One parsed model turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStep {
    /// Invoke `tool` with `input`.
    Action { tool: String, input: String },
    /// The loop is finished.
    Final { answer: String },
}

/// A model turn that follows neither the action nor the final-answer format.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StepParseError {
    #[error("Missing 'Action:' after 'Thought:'")]
    MissingAction,
    #[error("Missing 'Action Input:' after 'Action:'")]
    MissingActionInput,
    #[error("'Action:' names no tool")]
    EmptyAction,
}

/// Renders the analyst prompt for `input`, listing `tools` and appending the
/// scratchpad of previous turns.
pub fn react_prompt(tools: &[Arc<dyn Tool>], input: &str, scratchpad: &str) -> String {
    let descriptions = tools
        .iter()
        .map(|t| format!("{}: {}", t.name(), t.description()))
        .collect::<Vec<_>>()
        .join("\n");
    let names = tool_names(tools);

    format!(
        "You are a building requirements analyst. Your task is to analyze building documents\n\
         and determine if they meet specified requirements.\n\
         \n\
         You have access to the following tools:\n\
         {descriptions}\n\
         \n\
         Tool Names: {names}\n\
         \n\
         To analyze the documents, follow these steps:\n\
         1. Use the document_analysis tool to read and analyze the building document\n\
         2. Review the requirements and determine if they are met\n\
         3. Provide a clear explanation for each requirement\n\
         \n\
         You must respond in this format:\n\
         Thought: Consider what tool to use and why\n\
         Action: the action to take, should be one of [{names}]\n\
         Action Input: the input to the action\n\
         Observation: the result of the action\n\
         ... (this Thought/Action/Action Input/Observation can repeat N times)\n\
         Thought: I now know the final answer\n\
         Final Answer: the final answer to the original input question\n\
         \n\
         Question: {input}\n\
         {scratchpad}"
    )
}

/// Comma-separated tool names, as shown to the model.
pub fn tool_names(tools: &[Arc<dyn Tool>]) -> String {
    tools
        .iter()
        .map(|t| t.name().as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parses one model turn.
///
/// A `Final Answer:` anywhere in the turn ends the loop, even if an action is
/// also present. Otherwise the turn must contain `Action:` followed by
/// `Action Input:`. Anything the model wrote after a hallucinated
/// `Observation:` line is ignored.
pub fn parse_step(text: &str) -> Result<AgentStep, StepParseError> {
    if let Some(pos) = text.find(FINAL_ANSWER) {
        let answer = text[pos + FINAL_ANSWER.len()..].trim().to_string();
        return Ok(AgentStep::Final { answer });
    }

    let action_pos = text.find(ACTION).ok_or(StepParseError::MissingAction)?;
    let after_action = &text[action_pos + ACTION.len()..];
    let input_pos = after_action
        .find(ACTION_INPUT)
        .ok_or(StepParseError::MissingActionInput)?;

    let tool = after_action[..input_pos].trim();
    if tool.is_empty() {
        return Err(StepParseError::EmptyAction);
    }

    let mut input = &after_action[input_pos + ACTION_INPUT.len()..];
    if let Some(end) = input.find(OBSERVATION_STOP) {
        input = &input[..end];
    }
    let input = input.trim().trim_matches('"');

    Ok(AgentStep::Action {
        tool: tool.to_string(),
        input: input.to_string(),
    })
}
