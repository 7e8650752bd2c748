//! ProcessTurnHandler - runs one conversation turn end to end.
//!
//! Order of evaluation per turn:
//! 1. image interrupt (forwards the images, forces a handoff)
//! 2. token authentication, or the login prompt for anonymous turns
//! 3. intent classification
//! 4. stage planning, backend queries and result interpretation
//! 5. reply rendering from the catalog snapshot taken at the start of the turn
//!
//! Every failure after authentication ends in a well-formed handoff reply; the
//! technical detail goes to the log and to the turn metadata.

use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::AnonymousPolicy;
use crate::domain::auth::{TokenError, TokenVerifier};
use crate::domain::catalog::WorkflowCatalog;
use crate::domain::extraction::{Identifier, IdentifierExtractor};
use crate::domain::foundation::{
    BusinessType, HistoryEntry, Language, SessionId, UserId, ValidationError,
};
use crate::domain::intent::{CategoryHint, IntentClassifier, IntentDecision, IntentError, IntentInput};
use crate::domain::outcome::{
    interpret, ActivityRef, ControlSignal, ErrorClass, ErrorClassifier, ExpectedPayload,
    MessageKey, QueryEnvelope, QueryError,
};
use crate::domain::workflow::{
    ConversationState, Cycle, ImageInterrupt, ListResolution, PendingQuery, Phase, PlannedQuery,
    QueryResolution, Stage, StageInput, StagePlan, StageTracker, Transition,
};
use crate::ports::{
    CatalogProvider, ImageNotification, ImageNotifier, OrderQueryService, QueryKind, QueryRequest,
    SemanticClassifier, SemanticRequest,
};

// ════════════════════════════════════════════════════════════════════════════
// Command and result
// ════════════════════════════════════════════════════════════════════════════

/// One user turn.
#[derive(Debug, Clone)]
pub struct ProcessTurnCommand {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub platform: String,
    pub language: Language,
    pub logged_in: bool,
    pub message: String,
    pub history: Vec<HistoryEntry>,
    pub images: Vec<String>,
    pub category: Option<CategoryHint>,
    /// Business type preset by the caller, `Unset` when absent.
    pub business_type: BusinessType,
    pub token: Option<String>,
    /// State returned by the previous turn.
    pub state: Option<ConversationState>,
    /// Drop the carried business type and classify afresh.
    pub reset: bool,
    pub site: i64,
}

/// Outcome of a processed turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResult {
    pub session_id: SessionId,
    pub response: String,
    pub phase: Phase,
    pub business_type: BusinessType,
    pub signal: ControlSignal,
    pub images: Vec<String>,
    /// State for the caller to send with the next turn.
    pub state: Option<ConversationState>,
    pub site: i64,
    pub metadata: TurnMetadata,
}

impl TurnResult {
    pub fn transfer_human(&self) -> bool {
        self.signal.transfers_human()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnMetadata {
    pub turn_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<IntentDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    pub api_results: Vec<ApiCallRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Summary of one backend query made during the turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiCallRecord {
    pub code: &'static str,
    pub state: Option<i64>,
    pub status: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub classification: Option<ErrorClass>,
}

impl ApiCallRecord {
    fn from_result(code: &'static str, result: &Result<QueryEnvelope, QueryError>) -> Self {
        match result {
            Ok(envelope) => Self {
                code,
                state: envelope.state,
                status: envelope.status().map(str::to_string),
                message: envelope.message.clone(),
                error: None,
                classification: None,
            },
            Err(e) => Self {
                code,
                state: None,
                status: None,
                message: None,
                error: Some(e.to_string()),
                classification: None,
            },
        }
    }
}

/// Turns the engine refuses to process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnRejection {
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] TokenError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

// ════════════════════════════════════════════════════════════════════════════
// Internal turn bookkeeping
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct TurnTrace {
    intent: Option<IntentDecision>,
    business_type: Option<BusinessType>,
    api_results: Vec<ApiCallRecord>,
    error: Option<String>,
}

impl TurnTrace {
    fn classify_last(&mut self, class: Option<ErrorClass>) {
        if let Some(record) = self.api_results.last_mut() {
            record.classification = class;
        }
    }

    fn into_metadata(self, stage: Option<Stage>) -> TurnMetadata {
        TurnMetadata {
            turn_id: Uuid::new_v4(),
            intent: self.intent,
            stage,
            api_results: self.api_results,
            error: self.error,
            timestamp: Utc::now(),
        }
    }
}

enum Step {
    Workflow(Transition),
    DirectAnswer(String),
}

#[derive(Debug, Error)]
enum TurnFault {
    #[error(transparent)]
    State(#[from] ValidationError),

    #[error(transparent)]
    Intent(#[from] IntentError),
}

// ════════════════════════════════════════════════════════════════════════════
// Handler
// ════════════════════════════════════════════════════════════════════════════

pub struct ProcessTurnHandler {
    catalog: Arc<dyn CatalogProvider>,
    intent: IntentClassifier,
    semantic: Arc<dyn SemanticClassifier>,
    queries: Arc<dyn OrderQueryService>,
    notifier: Arc<dyn ImageNotifier>,
    verifier: TokenVerifier,
    anonymous_policy: AnonymousPolicy,
}

impl ProcessTurnHandler {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        semantic: Arc<dyn SemanticClassifier>,
        queries: Arc<dyn OrderQueryService>,
        notifier: Arc<dyn ImageNotifier>,
        verifier: TokenVerifier,
        anonymous_policy: AnonymousPolicy,
    ) -> Self {
        Self {
            intent: IntentClassifier::new(Arc::clone(&semantic)),
            catalog,
            semantic,
            queries,
            notifier,
            verifier,
            anonymous_policy,
        }
    }

    #[tracing::instrument(
        skip(self, cmd),
        fields(session_id = %cmd.session_id, user_id = %cmd.user_id, platform = %cmd.platform)
    )]
    pub async fn handle(&self, cmd: ProcessTurnCommand) -> Result<TurnResult, TurnRejection> {
        if cmd.message.trim().is_empty() && cmd.images.is_empty() {
            return Err(TurnRejection::InvalidRequest(
                "message must not be empty".to_string(),
            ));
        }

        let catalog = self.catalog.snapshot();
        let mut trace = TurnTrace::default();
        let prior = Self::prior_state(&cmd);
        let basis = prior.clone().or_else(|| {
            cmd.business_type
                .is_set()
                .then(|| ConversationState::start(cmd.business_type))
        });

        // 1. Images override everything, authentication included.
        if let Some(transition) = ImageInterrupt::apply(basis.as_ref(), &cmd.images) {
            self.forward_images(&cmd).await;
            return Ok(Self::assemble(&cmd, &catalog, transition, trace));
        }

        // 2. Authentication
        if cmd.logged_in {
            let now = Utc::now().timestamp();
            if let Err(e) = self
                .verifier
                .verify(cmd.token.as_deref(), &cmd.user_id, now)
            {
                tracing::warn!(reason = e.reason(), "Token rejected");
                return Err(TurnRejection::Unauthorized(e));
            }
        } else if self.anonymous_policy == AnonymousPolicy::PromptLogin {
            return Ok(Self::login_prompt(&cmd, &catalog, basis, trace));
        }

        // 3-4. Classification and stage processing; any fault becomes a handoff.
        let outcome = AssertUnwindSafe(self.advance(&cmd, &catalog, prior.as_ref(), &mut trace))
            .catch_unwind()
            .await;

        let step = match outcome {
            Ok(Ok(step)) => step,
            Ok(Err(fault)) => {
                tracing::error!(error = %fault, "Turn failed, handing off");
                trace.error = Some(fault.to_string());
                Step::Workflow(Transition::forced_handoff(Self::fallback_state(
                    basis,
                    trace.business_type,
                )))
            }
            Err(_) => {
                tracing::error!("Stage processing panicked, handing off");
                trace.error = Some("stage processing panicked".to_string());
                Step::Workflow(Transition::forced_handoff(Self::fallback_state(
                    basis,
                    trace.business_type,
                )))
            }
        };

        // 5. Response assembly
        Ok(match step {
            Step::Workflow(transition) => Self::assemble(&cmd, &catalog, transition, trace),
            Step::DirectAnswer(answer) => Self::direct_answer(&cmd, answer, trace),
        })
    }

    /// The caller's state, unless this turn starts a new cycle.
    fn prior_state(cmd: &ProcessTurnCommand) -> Option<ConversationState> {
        if cmd.reset {
            return None;
        }
        let state = cmd.state.clone()?;
        if !state.is_consistent() {
            tracing::warn!(
                business_type = %state.business_type,
                stage = %state.stage,
                "Inconsistent conversation state from caller, starting over"
            );
            return None;
        }
        if cmd.business_type.is_set() && cmd.business_type != state.business_type {
            return None;
        }
        Some(state)
    }

    fn fallback_state(
        basis: Option<ConversationState>,
        decided: Option<BusinessType>,
    ) -> ConversationState {
        match (basis, decided) {
            (Some(state), Some(bt)) if state.business_type == bt => state,
            (_, Some(bt)) if bt.is_set() => ConversationState::start(bt),
            (Some(state), None) => state,
            _ => ConversationState::start(BusinessType::HumanService),
        }
    }

    async fn advance(
        &self,
        cmd: &ProcessTurnCommand,
        catalog: &WorkflowCatalog,
        prior: Option<&ConversationState>,
        trace: &mut TurnTrace,
    ) -> Result<Step, TurnFault> {
        let assigned = if cmd.business_type.is_set() {
            cmd.business_type
        } else {
            prior.map(|s| s.business_type).unwrap_or_default()
        };

        let input = IntentInput {
            message: &cmd.message,
            history: &cmd.history,
            language: cmd.language,
            category: cmd.category.as_ref(),
            assigned,
            reset: cmd.reset,
        };
        let decision = self.intent.classify(&input, catalog).await?;
        trace.intent = Some(decision.clone());

        let business_type = match decision {
            IntentDecision::DirectAnswer { answer, .. } => return Ok(Step::DirectAnswer(answer)),
            IntentDecision::Business { business_type, .. } => business_type,
        };
        trace.business_type = Some(business_type);

        let cycle = match prior {
            Some(state) if state.business_type == business_type => Cycle::Resume(state),
            _ => Cycle::Start(business_type),
        };
        let rejected = match cycle {
            Cycle::Resume(state) => state.slots.rejected.as_ref(),
            Cycle::Start(_) => None,
        };
        let stage_input = Self::stage_input(cmd, catalog, business_type, rejected);

        let mut plan = StageTracker::plan(cycle, &stage_input, &catalog.guide_images(business_type))?;
        loop {
            match plan {
                StagePlan::Respond(transition) => return Ok(Step::Workflow(transition)),
                StagePlan::Query(pending) => {
                    plan = self.run_query(cmd, catalog, pending, trace).await?;
                }
            }
        }
    }

    fn stage_input(
        cmd: &ProcessTurnCommand,
        catalog: &WorkflowCatalog,
        business_type: BusinessType,
        rejected: Option<&Identifier>,
    ) -> StageInput {
        let settings = catalog.identifier;
        let extractor = IdentifierExtractor::new(settings.history_window, settings.attempt_min_digits);
        let uses_identifier = business_type.uses_identifier();

        StageInput {
            identifier: if uses_identifier {
                extractor.extract_excluding(&cmd.message, &cmd.history, rejected)
            } else {
                None
            },
            malformed_attempt: uses_identifier && extractor.has_malformed_attempt(&cmd.message),
            dont_know: catalog.is_dont_know(&cmd.message, cmd.language),
            wants_human: catalog.wants_human(&cmd.message, cmd.language),
        }
    }

    async fn run_query(
        &self,
        cmd: &ProcessTurnCommand,
        catalog: &WorkflowCatalog,
        pending: PendingQuery,
        trace: &mut TurnTrace,
    ) -> Result<StagePlan, TurnFault> {
        let classifier = ErrorClassifier::new(catalog.reserved_state_codes.clone());
        let business_type = pending.state.business_type;

        match pending.query {
            PlannedQuery::OrderStatus(identifier) => {
                let kind = match business_type {
                    BusinessType::Withdrawal => QueryKind::WithdrawalStatus { identifier },
                    _ => QueryKind::DepositStatus { identifier },
                };
                let result = self.query(cmd, kind, trace).await;
                let resolution = Self::status_resolution(&classifier, &result, business_type, trace);
                Ok(StagePlan::Respond(StageTracker::resolve_order(
                    &pending.state,
                    resolution,
                )?))
            }
            PlannedQuery::ActivityList => {
                let result = self.query(cmd, QueryKind::ActivityList, trace).await;
                let class = classifier.classify(&result, ExpectedPayload::ActivityList, false);
                trace.classify_last(class);

                let resolution = match class {
                    None => {
                        let activities = result
                            .as_ref()
                            .ok()
                            .and_then(QueryEnvelope::activities)
                            .unwrap_or_default();
                        self.match_activity(cmd, catalog, &activities, trace).await
                    }
                    Some(ErrorClass::UserInput) => ListResolution::UserInput,
                    Some(class) => {
                        tracing::error!(?class, "Activity list query failed");
                        ListResolution::System
                    }
                };
                Ok(StageTracker::resolve_activity_list(&pending.state, resolution)?)
            }
            PlannedQuery::ActivityStatus(activity) => {
                let kind = QueryKind::ActivityStatus {
                    activity_id: activity.id.clone(),
                };
                let result = self.query(cmd, kind, trace).await;
                let resolution = Self::status_resolution(&classifier, &result, business_type, trace);
                Ok(StagePlan::Respond(StageTracker::resolve_activity_status(
                    &pending.state,
                    resolution,
                )?))
            }
        }
    }

    async fn query(
        &self,
        cmd: &ProcessTurnCommand,
        kind: QueryKind,
        trace: &mut TurnTrace,
    ) -> Result<QueryEnvelope, QueryError> {
        let code = kind.code();
        let result = self
            .queries
            .query(QueryRequest::new(cmd.session_id.clone(), kind).with_site(cmd.site))
            .await;
        trace.api_results.push(ApiCallRecord::from_result(code, &result));
        result
    }

    fn status_resolution(
        classifier: &ErrorClassifier,
        result: &Result<QueryEnvelope, QueryError>,
        business_type: BusinessType,
        trace: &mut TurnTrace,
    ) -> QueryResolution {
        let class = classifier.classify(result, ExpectedPayload::Status, false);
        trace.classify_last(class);

        match class {
            None => match result.as_ref().ok().and_then(QueryEnvelope::status) {
                Some(status) => QueryResolution::Outcome(interpret(business_type, status)),
                None => QueryResolution::System,
            },
            Some(ErrorClass::UserInput) => QueryResolution::UserInput,
            Some(class) => {
                tracing::error!(?class, "Status query failed");
                QueryResolution::System
            }
        }
    }

    /// Catalog names and aliases first, then the semantic classifier
    /// restricted to the listed activity names.
    async fn match_activity(
        &self,
        cmd: &ProcessTurnCommand,
        catalog: &WorkflowCatalog,
        activities: &[ActivityRef],
        trace: &mut TurnTrace,
    ) -> ListResolution {
        if let Some(activity) = catalog.match_activity(&cmd.message, activities) {
            return ListResolution::Matched(activity);
        }

        let names: Vec<String> = activities.iter().map(|a| a.name.clone()).collect();
        if names.is_empty() {
            return ListResolution::Unmatched { names };
        }

        let request =
            SemanticRequest::new(cmd.message.clone(), names.clone()).with_history(cmd.history.clone());
        match self.semantic.classify(request).await {
            Ok(label)
                if !label.is_none()
                    && label.confidence >= catalog.classification.min_confidence =>
            {
                match activities.iter().find(|a| a.name == label.label) {
                    Some(activity) => ListResolution::Matched(activity.clone()),
                    None => ListResolution::Unmatched { names },
                }
            }
            Ok(_) => ListResolution::Unmatched { names },
            Err(e) => {
                tracing::error!(error = %e, "Activity classification failed");
                trace.error = Some(e.to_string());
                ListResolution::System
            }
        }
    }

    async fn forward_images(&self, cmd: &ProcessTurnCommand) {
        let notification = ImageNotification {
            images: cmd.images.clone(),
            user_id: cmd.user_id.clone(),
            session_id: cmd.session_id.clone(),
        };
        if let Err(e) = self.notifier.dispatch(notification).await {
            tracing::error!(error = %e, "Image dispatch failed");
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Response assembly
    // ────────────────────────────────────────────────────────────────────────

    fn assemble(
        cmd: &ProcessTurnCommand,
        catalog: &WorkflowCatalog,
        transition: Transition,
        trace: TurnTrace,
    ) -> TurnResult {
        let Transition {
            state,
            signal,
            reply,
        } = transition;
        let response = catalog.render(state.business_type, reply.key, cmd.language, &reply.args);

        tracing::info!(
            business_type = %state.business_type,
            stage = %state.stage,
            ?signal,
            reply = %reply.key,
            "Turn processed"
        );

        TurnResult {
            session_id: cmd.session_id.clone(),
            response,
            phase: state.stage.phase(),
            business_type: state.business_type,
            signal,
            images: reply.images,
            site: cmd.site,
            metadata: trace.into_metadata(Some(state.stage)),
            state: Some(state),
        }
    }

    fn login_prompt(
        cmd: &ProcessTurnCommand,
        catalog: &WorkflowCatalog,
        basis: Option<ConversationState>,
        trace: TurnTrace,
    ) -> TurnResult {
        tracing::info!("Anonymous turn, prompting for login");
        TurnResult {
            session_id: cmd.session_id.clone(),
            response: catalog.render(
                BusinessType::Unset,
                MessageKey::LoginRequired,
                cmd.language,
                &[],
            ),
            phase: Phase::Working,
            business_type: basis.map(|s| s.business_type).unwrap_or_default(),
            signal: ControlSignal::Continue,
            images: Vec::new(),
            state: cmd.state.clone(),
            site: cmd.site,
            metadata: trace.into_metadata(None),
        }
    }

    fn direct_answer(cmd: &ProcessTurnCommand, answer: String, trace: TurnTrace) -> TurnResult {
        tracing::info!("Answered directly from category route");
        TurnResult {
            session_id: cmd.session_id.clone(),
            response: answer,
            phase: Phase::Finish,
            business_type: BusinessType::Unset,
            signal: ControlSignal::Finish,
            images: Vec::new(),
            state: None,
            site: cmd.site,
            metadata: trace.into_metadata(None),
        }
    }
}
