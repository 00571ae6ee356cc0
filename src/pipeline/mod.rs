//! Meeting analysis orchestrator.
//!
//! Runs the analysis stages for one request:
//! understanding → action items → follow-ups → done
//!
//! Each stage builds a prompt, calls the generator and normalizes the reply.
//! The generator, normalizer and session cache are injected at construction.

pub mod outcome;

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::{AssistantError, Result};
use crate::meeting::{
    ActionItemBatch, FollowUpPlan, PipelineRun, StageKind, StructuredMeeting,
};
use crate::normalizer::Normalizer;
use crate::prompts;
use crate::provider::{GenerationOptions, TextGenerator};
use crate::session::{self, SessionCache};

pub use outcome::{
    AnalysisData, AnswerOutcome, MeetingSource, ProcessMetadata, ProcessOutcome, QaContext,
    SummaryOutcome,
};

pub struct MeetingPipeline {
    generator: Arc<dyn TextGenerator>,
    normalizer: Normalizer,
    sessions: SessionCache,
    options: GenerationOptions,
}

impl MeetingPipeline {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        normalizer: Normalizer,
        sessions: SessionCache,
    ) -> Self {
        Self {
            generator,
            normalizer,
            sessions,
            options: GenerationOptions::default(),
        }
    }

    /// Per-call generation overrides applied to every stage.
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn sessions(&self) -> &SessionCache {
        &self.sessions
    }

    pub fn generator_name(&self) -> &'static str {
        self.generator.name()
    }

    /// Run all stages on `transcript` and cache the understanding result.
    ///
    /// All-or-nothing: a failing stage aborts the run and no partial result
    /// is returned.
    pub async fn process(
        &self,
        transcript: &str,
        session_id: Option<&str>,
    ) -> Result<ProcessOutcome> {
        let transcript = require_transcript(Some(transcript))?;
        let session_id = resolve_session_id(session_id)?;

        let mut run = PipelineRun::new();
        info!(
            "Processing {} byte transcript for session {}",
            transcript.len(),
            session_id
        );

        let summary = match self.understand(transcript).await {
            Ok(summary) => summary,
            Err(e) => return Err(Self::abort(&mut run, e)),
        };
        run.advance();

        let action_items = match self.action_items(&summary).await {
            Ok(items) => items,
            Err(e) => return Err(Self::abort(&mut run, e)),
        };
        run.advance();

        let follow_ups = match self.follow_ups(&summary, &action_items).await {
            Ok(plan) => plan,
            Err(e) => return Err(Self::abort(&mut run, e)),
        };
        run.advance();

        let cached = self.remember(&session_id, &summary).await;

        let data = AnalysisData {
            summary,
            action_items,
            follow_ups,
        };
        let processing_time_ms = run.elapsed().as_millis() as u64;
        let metadata = ProcessMetadata::from_data(&data, processing_time_ms);

        info!(
            "Session {} {}: {} participants, {} action items, {} follow-ups in {}ms",
            session_id,
            run.phase().as_str(),
            metadata.participant_count,
            metadata.action_item_count,
            metadata.follow_up_count,
            processing_time_ms
        );

        Ok(ProcessOutcome {
            session_id,
            data,
            metadata,
            cached,
        })
    }

    /// Understanding stage only; the result is cached for later questions.
    pub async fn summarize(
        &self,
        transcript: &str,
        session_id: Option<&str>,
    ) -> Result<SummaryOutcome> {
        let transcript = require_transcript(Some(transcript))?;
        let session_id = resolve_session_id(session_id)?;

        let meeting = self.understand(transcript).await?;
        let cached = self.remember(&session_id, &meeting).await;

        Ok(SummaryOutcome {
            session_id,
            meeting,
            cached,
        })
    }

    /// Action item stage, running understanding first for raw transcripts.
    pub async fn extract_actions(&self, source: MeetingSource) -> Result<ActionItemBatch> {
        let meeting = self.resolve_meeting(source).await?;
        self.action_items(&meeting).await
    }

    /// Follow-up stage. Missing action items are extracted first.
    pub async fn plan_follow_ups(
        &self,
        source: MeetingSource,
        actions: Option<ActionItemBatch>,
    ) -> Result<FollowUpPlan> {
        let meeting = self.resolve_meeting(source).await?;
        let actions = match actions {
            Some(mut batch) => {
                batch.reconcile();
                batch
            }
            None => self.action_items(&meeting).await?,
        };
        self.follow_ups(&meeting, &actions).await
    }

    /// Answer a question from a cached session or an inline transcript.
    ///
    /// A known session wins over the transcript. An unknown session with a
    /// transcript analyses the transcript and caches it under that id. An
    /// unknown session without a transcript is `NotFound` and makes no
    /// upstream call.
    pub async fn answer(&self, question: &str, context: QaContext) -> Result<AnswerOutcome> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AssistantError::validation("Question is required"));
        }

        let transcript = context
            .transcript
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let (session_id, meeting) = match context.session_id.as_deref() {
            Some(id) => {
                session::validate_session_id(id)?;
                match self.sessions.get(id).await {
                    Ok(meeting) => {
                        debug!("Answering from cached session {}", id);
                        (Some(id.to_string()), meeting)
                    }
                    Err(AssistantError::NotFound(message)) => {
                        let Some(transcript) = transcript else {
                            return Err(AssistantError::NotFound(message));
                        };
                        info!("Session {} not cached, analysing transcript", id);
                        let meeting = self.understand(transcript).await?;
                        self.remember(id, &meeting).await;
                        (Some(id.to_string()), meeting)
                    }
                    Err(e) => return Err(e),
                }
            }
            None => {
                let Some(transcript) = transcript else {
                    return Err(AssistantError::validation(
                        "Either sessionId or transcript is required",
                    ));
                };
                (None, self.understand(transcript).await?)
            }
        };

        let raw = self
            .generate(StageKind::Qa, &prompts::qa_prompt(&meeting, question))
            .await?;
        let exchange = self.normalizer.qa(&raw, question);

        Ok(AnswerOutcome {
            session_id,
            exchange,
        })
    }

    /// Drop a cached session. Returns whether it existed.
    pub async fn forget(&self, session_id: &str) -> Result<bool> {
        session::validate_session_id(session_id)?;
        Ok(self.sessions.delete(session_id).await)
    }

    async fn resolve_meeting(&self, source: MeetingSource) -> Result<StructuredMeeting> {
        match source {
            MeetingSource::Transcript(transcript) => {
                let transcript = require_transcript(Some(&transcript))?;
                self.understand(transcript).await
            }
            MeetingSource::Structured(meeting) => Ok(meeting),
            MeetingSource::Session(id) => {
                session::validate_session_id(&id)?;
                self.sessions.get(&id).await
            }
        }
    }

    async fn understand(&self, transcript: &str) -> Result<StructuredMeeting> {
        let raw = self
            .generate(
                StageKind::Understanding,
                &prompts::understanding_prompt(transcript),
            )
            .await?;
        Ok(self.normalizer.understanding(&raw))
    }

    async fn action_items(&self, meeting: &StructuredMeeting) -> Result<ActionItemBatch> {
        let raw = self
            .generate(
                StageKind::ActionItems,
                &prompts::action_items_prompt(meeting),
            )
            .await?;
        Ok(self.normalizer.action_items(&raw))
    }

    async fn follow_ups(
        &self,
        meeting: &StructuredMeeting,
        actions: &ActionItemBatch,
    ) -> Result<FollowUpPlan> {
        let raw = self
            .generate(
                StageKind::FollowUps,
                &prompts::follow_up_prompt(meeting, actions),
            )
            .await?;
        Ok(self.normalizer.follow_ups(&raw))
    }

    async fn generate(&self, stage: StageKind, prompt: &str) -> Result<String> {
        info!("Running {} stage via {}", stage, self.generator.name());
        match self.generator.generate(prompt, &self.options).await {
            Ok(raw) => {
                debug!("{} stage returned {} bytes", stage, raw.len());
                Ok(raw)
            }
            Err(e) => {
                error!("{} stage failed: {}", stage, e);
                Err(e.in_stage(stage))
            }
        }
    }

    /// Cache a meeting unless it is a parse fallback.
    async fn remember(&self, session_id: &str, meeting: &StructuredMeeting) -> bool {
        if meeting.parse_error {
            warn!(
                "Not caching session {}: understanding output could not be parsed",
                session_id
            );
            return false;
        }
        self.sessions.put(session_id, meeting.clone()).await;
        true
    }

    fn abort(run: &mut PipelineRun, err: AssistantError) -> AssistantError {
        let stage = run.fail();
        warn!(
            "Pipeline aborted in {} phase after {}ms",
            run.phase().as_str(),
            run.elapsed().as_millis()
        );
        match stage {
            Some(stage) => err.in_stage(stage),
            None => err,
        }
    }
}

fn require_transcript(transcript: Option<&str>) -> Result<&str> {
    transcript
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AssistantError::validation("Transcript is required"))
}

fn resolve_session_id(session_id: Option<&str>) -> Result<String> {
    match session_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => {
            session::validate_session_id(id)?;
            Ok(id.to_string())
        }
        None => Ok(session::new_session_id()),
    }
}
