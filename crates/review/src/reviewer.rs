//! Sequential requirement review against a single document.

use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use crate::{
    analysis_prompt, parse_verdict, AnalysisReport, AnalysisRunId, Assessment, CompletionRequest,
    DocumentText, LlmProvider, Requirement, RequirementAnalysis, RequirementResult,
    ResponseFormat, ReviewError, StatusTally, Timestamp, TokenUsage,
};

/// Asks an [`LlmProvider`] for a verdict on each requirement in turn.
///
/// Requirements are processed strictly one after another; each provider call
/// is awaited before the next prompt is built.
///
/// Requests ask for a plain-text reply unless
/// [`with_response_format`](Self::with_response_format) opts into the
/// provider's JSON mode, which not every model supports. The prompt already
/// asks for JSON and [`parse_verdict`] tolerates fences and surrounding prose.
#[derive(Clone)]
pub struct RequirementReviewer {
    provider: Arc<dyn LlmProvider>,
    response_format: ResponseFormat,
}

impl RequirementReviewer {
    /// Creates a reviewer backed by `provider`.
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            response_format: ResponseFormat::Text,
        }
    }

    /// Sets the reply format requested from the provider.
    pub fn with_response_format(mut self, response_format: ResponseFormat) -> Self {
        self.response_format = response_format;
        self
    }

    /// Returns the provider this reviewer calls.
    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    /// Analyses one requirement against `document`.
    ///
    /// # Errors
    ///
    /// [`ReviewError::Provider`] if the provider call fails and
    /// [`ReviewError::Verdict`] if its reply is not a valid verdict.
    pub async fn analyze(
        &self,
        requirement: &Requirement,
        document: &DocumentText,
    ) -> Result<RequirementAnalysis, ReviewError> {
        let (reply, _) = self.ask(1, requirement, document).await?;
        parse_verdict(&reply).map_err(|source| ReviewError::Verdict {
            requirement: requirement.to_string(),
            source,
        })
    }

    /// Reviews every requirement and collects the results in input order.
    ///
    /// A reply that is not a valid verdict is recorded as
    /// [`Assessment::Failed`] and the review continues, so the report always
    /// holds one result per requirement.
    ///
    /// # Errors
    ///
    /// [`ReviewError::Provider`] aborts the run at the first provider failure.
    pub async fn review(
        &self,
        requirements: &[Requirement],
        document: &DocumentText,
    ) -> Result<AnalysisReport, ReviewError> {
        self.review_with_progress(requirements, document, |_, _| {})
            .await
    }

    /// Same as [`review`](Self::review), calling `on_requirement` with the
    /// 1-based index and requirement just before each provider call.
    pub async fn review_with_progress<F>(
        &self,
        requirements: &[Requirement],
        document: &DocumentText,
        mut on_requirement: F,
    ) -> Result<AnalysisReport, ReviewError>
    where
        F: FnMut(usize, &Requirement),
    {
        let run_id = AnalysisRunId::new_random();
        let model = self.provider.model().clone();
        let span = info_span!("review", %run_id, %model, requirements = requirements.len());

        async move {
            let started_at = Timestamp::now();
            let mut usage = TokenUsage::default();
            let mut results = Vec::with_capacity(requirements.len());

            for (i, requirement) in requirements.iter().enumerate() {
                let index = i + 1;
                on_requirement(index, requirement);
                let (reply, call_usage) = self
                    .ask(index, requirement, document)
                    .instrument(info_span!("requirement", index))
                    .await?;
                if let Some(call_usage) = call_usage {
                    usage += call_usage;
                }

                let assessment = match parse_verdict(&reply) {
                    Ok(analysis) => {
                        info!(index, status = %analysis.status, "Requirement analysed");
                        Assessment::Analyzed(analysis)
                    }
                    Err(e) => {
                        warn!(index, error = %e, raw = e.raw(), "Discarding malformed verdict");
                        Assessment::Failed {
                            reason: e.to_string(),
                        }
                    }
                };

                results.push(RequirementResult {
                    requirement: requirement.clone(),
                    assessment,
                });
            }

            let tally = StatusTally::from_results(&results);
            info!(
                met = tally.met,
                not_met = tally.not_met,
                not_addressed = tally.not_addressed,
                failed = tally.failed,
                "Review complete"
            );

            Ok::<_, ReviewError>(AnalysisReport {
                run_id,
                model,
                started_at,
                finished_at: Timestamp::now(),
                results,
                tally,
                usage,
            })
        }
        .instrument(span)
        .await
    }

    async fn ask(
        &self,
        index: usize,
        requirement: &Requirement,
        document: &DocumentText,
    ) -> Result<(String, Option<TokenUsage>), ReviewError> {
        let request = CompletionRequest::from_user(analysis_prompt(requirement, document))
            .with_temperature(0.0)
            .with_response_format(self.response_format);

        let completion =
            self.provider
                .complete(request)
                .await
                .map_err(|source| ReviewError::Provider {
                    index,
                    requirement: requirement.to_string(),
                    source,
                })?;
        Ok((completion.content, completion.usage))
    }
}

impl std::fmt::Debug for RequirementReviewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequirementReviewer")
            .field("model", self.provider.model())
            .field("response_format", &self.response_format)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use crate::{parse_requirements, AnalysisStatus, LlmError};
    use pretty_assertions::assert_eq;

    fn verdict(status: &str, error: Option<&str>) -> Result<String, LlmError> {
        Ok(serde_json::json!({
            "status": status,
            "explanation": format!("explained {status}"),
            "error": error,
        })
        .to_string())
    }

    fn document() -> DocumentText {
        DocumentText::new("Floor plan shows two exits and 48 inch corridors.", 1)
    }

    #[tokio::test]
    async fn one_result_per_requirement_in_input_order() {
        let requirements = parse_requirements("Two exits.\n\nCorridors 44 in.\n  Sprinklers.  \n");
        let provider = ScriptedProvider::with_results([
            verdict("met", None),
            verdict("met", None),
            verdict("not_addressed", None),
        ]);
        let reviewer = RequirementReviewer::new(provider.clone());

        let report = reviewer.review(&requirements, &document()).await.unwrap();

        assert_eq!(report.results.len(), requirements.len());
        let order: Vec<&str> = report
            .results
            .iter()
            .map(|r| r.requirement.as_str())
            .collect();
        assert_eq!(order, vec!["Two exits.", "Corridors 44 in.", "Sprinklers."]);
        assert_eq!(report.tally.met, 2);
        assert_eq!(report.tally.not_addressed, 1);
        assert_eq!(report.usage.total().as_u64(), 360);
        assert_eq!(report.model.as_str(), "scripted");
        assert!(report.finished_at >= report.started_at);
    }

    #[tokio::test]
    async fn each_prompt_carries_its_requirement_and_the_document() {
        let requirements = parse_requirements("Two exits.\nCorridors 44 in.");
        let provider = ScriptedProvider::with_results([verdict("met", None), verdict("met", None)]);
        let reviewer = RequirementReviewer::new(provider.clone());

        reviewer.review(&requirements, &document()).await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        for (request, requirement) in requests.iter().zip(["Two exits.", "Corridors 44 in."]) {
            assert_eq!(request.messages.len(), 1);
            let prompt = &request.messages[0].content;
            assert!(prompt.contains(&format!("Requirement: {requirement}")));
            assert!(prompt.contains("Floor plan shows two exits"));
            assert_eq!(request.temperature, Some(0.0));
        }
    }

    #[tokio::test]
    async fn plain_text_replies_are_requested_by_default() {
        let requirements = parse_requirements("Two exits.");
        let provider = ScriptedProvider::with_results([verdict("met", None)]);

        RequirementReviewer::new(provider.clone())
            .review(&requirements, &document())
            .await
            .unwrap();

        assert_eq!(provider.requests()[0].response_format, ResponseFormat::Text);
    }

    #[tokio::test]
    async fn json_mode_is_opt_in() {
        let requirements = parse_requirements("Two exits.");
        let provider = ScriptedProvider::with_results([verdict("met", None)]);

        RequirementReviewer::new(provider.clone())
            .with_response_format(ResponseFormat::JsonObject)
            .review(&requirements, &document())
            .await
            .unwrap();

        assert_eq!(
            provider.requests()[0].response_format,
            ResponseFormat::JsonObject
        );
    }

    #[tokio::test]
    async fn progress_is_reported_before_each_call() {
        let requirements = parse_requirements("a\nb");
        let provider = ScriptedProvider::with_results([verdict("met", None)]);
        let mut seen = Vec::new();

        let err = RequirementReviewer::new(provider)
            .review_with_progress(&requirements, &document(), |index, requirement| {
                seen.push(format!("{index}:{requirement}"));
            })
            .await
            .unwrap_err();

        // The second call fails, but its progress line was already reported.
        assert!(matches!(err, ReviewError::Provider { index: 2, .. }));
        assert_eq!(seen, vec!["1:a".to_string(), "2:b".to_string()]);
    }

    #[tokio::test]
    async fn malformed_reply_is_recorded_and_review_continues() {
        let requirements = parse_requirements("a\nb\nc");
        let provider = ScriptedProvider::with_results([
            verdict("not_met", Some("Only one exit.")),
            Ok("I think it is fine.".to_string()),
            verdict("met", None),
        ]);
        let reviewer = RequirementReviewer::new(provider);

        let report = reviewer.review(&requirements, &document()).await.unwrap();

        assert_eq!(report.results.len(), 3);
        assert!(matches!(
            report.results[1].assessment,
            Assessment::Failed { .. }
        ));
        match &report.results[0].assessment {
            Assessment::Analyzed(analysis) => {
                assert_eq!(analysis.status, AnalysisStatus::NotMet);
                assert_eq!(analysis.error.as_deref(), Some("Only one exit."));
            }
            other => panic!("expected analysis, got {other:?}"),
        }
        assert_eq!(report.tally.failed, 1);
        assert_eq!(report.tally.total(), 3);
    }

    #[tokio::test]
    async fn provider_failure_aborts_the_run() {
        let requirements = parse_requirements("a\nb\nc");
        let provider = ScriptedProvider::with_results([
            verdict("met", None),
            Err(LlmError::Authentication {
                message: "invalid key".into(),
            }),
        ]);
        let reviewer = RequirementReviewer::new(provider.clone());

        let err = reviewer.review(&requirements, &document()).await.unwrap_err();

        match err {
            ReviewError::Provider {
                index, requirement, ..
            } => {
                assert_eq!(index, 2);
                assert_eq!(requirement, "b");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn empty_requirement_list_makes_no_calls() {
        let provider = ScriptedProvider::new(Vec::<String>::new());
        let reviewer = RequirementReviewer::new(provider.clone());

        let report = reviewer.review(&[], &document()).await.unwrap();

        assert!(report.results.is_empty());
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn analyze_surfaces_malformed_verdicts_as_errors() {
        let requirement = parse_requirements("a").remove(0);
        let provider = ScriptedProvider::new(["{\"status\": \"maybe\"}"]);
        let reviewer = RequirementReviewer::new(provider);

        let err = reviewer.analyze(&requirement, &document()).await.unwrap_err();
        assert!(matches!(err, ReviewError::Verdict { .. }));
    }
}
