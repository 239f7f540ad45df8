//! The tool port exposed to the agent loop.

use async_trait::async_trait;
use review::ToolName;

/// A capability the model can invoke by name.
///
/// Tools never fail the loop: any failure is reported back to the model as
/// the observation text, so `run` returns a plain `String`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The name the model uses in `Action:` lines.
    fn name(&self) -> &ToolName;

    /// One-line description shown to the model.
    fn description(&self) -> &str;

    /// Runs the tool and returns the observation text.
    async fn run(&self, input: &str) -> String;
}
