//! Stage tracker: the per-business-type workflow state machine.
//!
//! Every function here is pure. A turn is advanced in up to three steps:
//! `plan` decides between an immediate reply and a backend query, and the
//! `resolve_*` functions fold the classified query result back into a
//! transition. Every stage change goes through [`StateMachine::transition_to`]
//! so a regression is an error, never a silent state.

use serde::Serialize;

use super::{ConversationState, Stage};
use crate::domain::extraction::Identifier;
use crate::domain::foundation::{BusinessType, StateMachine, ValidationError};
use crate::domain::outcome::{ActivityRef, ControlSignal, MessageKey, StatusOutcome};

/// Reply to render for the turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub key: MessageKey,
    pub images: Vec<String>,
    pub args: Vec<(String, String)>,
}

impl Reply {
    pub fn new(key: MessageKey) -> Self {
        Self {
            key,
            images: Vec::new(),
            args: Vec::new(),
        }
    }

    pub fn with_images(mut self, images: &[String]) -> Self {
        self.images = images.to_vec();
        self
    }

    pub fn with_arg(mut self, name: &str, value: impl Into<String>) -> Self {
        self.args.push((name.to_string(), value.into()));
        self
    }
}

/// Result of a turn: the next state, the control signal and the reply.
///
/// The stage is Finish exactly when the signal is not Continue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub state: ConversationState,
    pub signal: ControlSignal,
    pub reply: Reply,
}

impl Transition {
    /// Validated move from `from` to `next` (or to Finish when `signal` ends the cycle).
    pub fn proceed(
        from: &ConversationState,
        next: ConversationState,
        signal: ControlSignal,
        reply: Reply,
    ) -> Result<Self, ValidationError> {
        let target = if signal.ends_cycle() {
            Stage::Finish
        } else {
            next.stage
        };
        if target == Stage::Finish && !signal.ends_cycle() {
            return Err(ValidationError::invalid_format(
                "state_transition",
                "Continue cannot land on Finish",
            ));
        }
        let stage = from.stage.transition_to(target)?;
        Ok(Self {
            state: next.at(stage),
            signal,
            reply,
        })
    }

    fn handoff(from: &ConversationState, key: MessageKey) -> Result<Self, ValidationError> {
        Self::proceed(from, from.clone(), ControlSignal::TransferHuman, Reply::new(key))
    }

    /// Unconditional handoff that skips edge validation.
    pub(crate) fn forced_handoff(state: ConversationState) -> Self {
        Self {
            state: state.at(Stage::Finish),
            signal: ControlSignal::TransferHuman,
            reply: Reply::new(MessageKey::Handoff),
        }
    }
}

/// Classified facts about the current turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageInput {
    /// Identifier from the message or recent history.
    pub identifier: Option<Identifier>,
    /// The message holds a long digit run of the wrong length.
    pub malformed_attempt: bool,
    /// The user says they cannot find their order number.
    pub dont_know: bool,
    /// The user abandons the automated flow for a human agent.
    pub wants_human: bool,
}

/// Where the turn's cycle comes from.
#[derive(Debug, Clone, Copy)]
pub enum Cycle<'a> {
    /// New cycle for a freshly classified business type.
    Start(BusinessType),
    /// Cycle carried over from earlier turns.
    Resume(&'a ConversationState),
}

/// Backend lookup the turn needs before it can reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedQuery {
    OrderStatus(Identifier),
    ActivityList,
    ActivityStatus(ActivityRef),
}

/// A query plus the state to resolve its result against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    pub state: ConversationState,
    pub query: PlannedQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagePlan {
    Respond(Transition),
    Query(PendingQuery),
}

/// Classified result of an order or activity status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResolution {
    Outcome(StatusOutcome),
    UserInput,
    System,
}

/// Classified result of the activity list query plus matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListResolution {
    Matched(ActivityRef),
    Unmatched { names: Vec<String> },
    UserInput,
    System,
}

pub struct StageTracker;

impl StageTracker {
    /// Decides what the turn does before any backend call.
    pub fn plan(
        cycle: Cycle<'_>,
        input: &StageInput,
        guide_images: &[String],
    ) -> Result<StagePlan, ValidationError> {
        let state = match cycle {
            Cycle::Resume(state) if state.is_finished() => {
                return Ok(StagePlan::Respond(Transition {
                    state: state.clone(),
                    signal: ControlSignal::Finish,
                    reply: Reply::new(MessageKey::SessionClosed),
                }));
            }
            Cycle::Resume(state) => state.clone(),
            Cycle::Start(business_type) => {
                let state = ConversationState::start(business_type);
                if state.is_finished() {
                    // Human service has no dialogue; its cycle opens at Finish.
                    return Ok(StagePlan::Respond(Transition {
                        state,
                        signal: ControlSignal::TransferHuman,
                        reply: Reply::new(MessageKey::Handoff),
                    }));
                }
                state
            }
        };

        match state.business_type {
            BusinessType::Deposit | BusinessType::Withdrawal => {
                Self::plan_identifier(&state, input, guide_images)
            }
            BusinessType::Activity => Self::plan_activity(&state, input),
            BusinessType::HumanService | BusinessType::Unset => {
                Ok(StagePlan::Respond(Transition::handoff(&state, MessageKey::Handoff)?))
            }
        }
    }

    fn plan_identifier(
        state: &ConversationState,
        input: &StageInput,
        guide_images: &[String],
    ) -> Result<StagePlan, ValidationError> {
        if input.wants_human {
            return Ok(StagePlan::Respond(Transition::handoff(state, MessageKey::Handoff)?));
        }

        let remembered = match state.stage {
            Stage::ProcessIdentifier => state.slots.identifier.clone(),
            _ => None,
        };
        if let Some(identifier) = input.identifier.clone().or(remembered) {
            let stage = state.stage.transition_to(Stage::ProcessIdentifier)?;
            let mut pending = state.at(stage);
            pending.slots.identifier = Some(identifier.clone());
            return Ok(StagePlan::Query(PendingQuery {
                state: pending,
                query: PlannedQuery::OrderStatus(identifier),
            }));
        }

        let waiting = match state.stage {
            Stage::GuideImage => Stage::AskIdentifier,
            other => other,
        };
        let (stage, reply) = if input.malformed_attempt {
            (waiting, Reply::new(MessageKey::InvalidIdentifier))
        } else if input.dont_know {
            let stage = match waiting {
                Stage::AskIdentifier => Stage::GuideImage,
                other => other,
            };
            (stage, Reply::new(MessageKey::GuideImage).with_images(guide_images))
        } else {
            (waiting, Reply::new(MessageKey::AskIdentifier))
        };

        Ok(StagePlan::Respond(Transition::proceed(
            state,
            state.at(stage),
            ControlSignal::Continue,
            reply,
        )?))
    }

    fn plan_activity(state: &ConversationState, input: &StageInput) -> Result<StagePlan, ValidationError> {
        if input.wants_human {
            return Ok(StagePlan::Respond(Transition::handoff(state, MessageKey::Handoff)?));
        }
        Ok(StagePlan::Query(PendingQuery {
            state: state.clone(),
            query: PlannedQuery::ActivityList,
        }))
    }

    /// Folds a deposit or withdrawal status query into the turn's transition.
    pub fn resolve_order(
        pending: &ConversationState,
        resolution: QueryResolution,
    ) -> Result<Transition, ValidationError> {
        let identifier = pending
            .slots
            .identifier
            .as_ref()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default();

        match resolution {
            QueryResolution::Outcome(outcome) => Transition::proceed(
                pending,
                pending.clone(),
                outcome.signal,
                Reply::new(outcome.message_key).with_arg("identifier", identifier),
            ),
            QueryResolution::UserInput => {
                let mut next = pending.clone();
                next.slots.rejected = next.slots.identifier.take();
                Transition::proceed(
                    pending,
                    next,
                    ControlSignal::Continue,
                    Reply::new(MessageKey::IdentifierNotFound).with_arg("identifier", identifier),
                )
            }
            QueryResolution::System => Transition::handoff(pending, MessageKey::Handoff),
        }
    }

    /// Folds the activity list query and matching result into the next step.
    pub fn resolve_activity_list(
        pending: &ConversationState,
        resolution: ListResolution,
    ) -> Result<StagePlan, ValidationError> {
        match resolution {
            ListResolution::Matched(activity) => {
                let mut next = pending.clone();
                next.slots.activity = Some(activity.clone());
                Ok(StagePlan::Query(PendingQuery {
                    state: next,
                    query: PlannedQuery::ActivityStatus(activity),
                }))
            }
            ListResolution::Unmatched { names } => {
                Ok(StagePlan::Respond(Self::failed_match(pending, &names)?))
            }
            ListResolution::UserInput => Ok(StagePlan::Respond(Transition::proceed(
                pending,
                pending.clone(),
                ControlSignal::Continue,
                Reply::new(MessageKey::ActivityRetry),
            )?)),
            ListResolution::System => Ok(StagePlan::Respond(Transition::handoff(
                pending,
                MessageKey::Handoff,
            )?)),
        }
    }

    /// Folds the activity status query into the turn's transition.
    pub fn resolve_activity_status(
        pending: &ConversationState,
        resolution: QueryResolution,
    ) -> Result<Transition, ValidationError> {
        let activity = pending
            .slots
            .activity
            .as_ref()
            .map(|a| a.name.clone())
            .unwrap_or_default();

        match resolution {
            QueryResolution::Outcome(outcome) => Transition::proceed(
                pending,
                pending.clone(),
                outcome.signal,
                Reply::new(outcome.message_key).with_arg("activity", activity),
            ),
            QueryResolution::UserInput => {
                let mut next = pending.clone();
                next.slots.activity = None;
                Transition::proceed(
                    pending,
                    next,
                    ControlSignal::Continue,
                    Reply::new(MessageKey::ActivityRetry),
                )
            }
            QueryResolution::System => Transition::handoff(pending, MessageKey::Handoff),
        }
    }

    /// First miss asks the user to pick from the list; the second hands off.
    fn failed_match(
        pending: &ConversationState,
        names: &[String],
    ) -> Result<Transition, ValidationError> {
        let mut next = pending.clone();
        next.slots.failed_matches = next.slots.failed_matches.saturating_add(1);

        match pending.stage {
            Stage::ListAndMatch => Transition::proceed(
                pending,
                next.at(Stage::Disambiguate),
                ControlSignal::Continue,
                Reply::new(MessageKey::ActivityDisambiguate).with_arg("activities", names.join(", ")),
            ),
            _ => Transition::proceed(
                pending,
                next,
                ControlSignal::TransferHuman,
                Reply::new(MessageKey::ActivityNotFound),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "123456789012345678";

    fn id() -> Identifier {
        Identifier::new(ID).unwrap()
    }

    fn guide() -> Vec<String> {
        vec!["https://cdn.example.com/depositOrder.png".to_string()]
    }

    fn respond(plan: StagePlan) -> Transition {
        match plan {
            StagePlan::Respond(t) => t,
            other => panic!("Expected Respond, got {:?}", other),
        }
    }

    fn query(plan: StagePlan) -> PendingQuery {
        match plan {
            StagePlan::Query(q) => q,
            other => panic!("Expected Query, got {:?}", other),
        }
    }

    fn state(business_type: BusinessType, stage: Stage) -> ConversationState {
        ConversationState::start(business_type).at(stage)
    }

    // ══════════════════════════════════════════════════════════════
    // Deposit / Withdrawal
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn fresh_deposit_without_digits_asks_for_identifier() {
        let plan = StageTracker::plan(
            Cycle::Start(BusinessType::Deposit),
            &StageInput::default(),
            &guide(),
        )
        .unwrap();
        let t = respond(plan);
        assert_eq!(t.state.stage, Stage::AskIdentifier);
        assert_eq!(t.signal, ControlSignal::Continue);
        assert_eq!(t.reply.key, MessageKey::AskIdentifier);
    }

    #[test]
    fn identifier_moves_to_process_and_queries() {
        let input = StageInput {
            identifier: Some(id()),
            ..Default::default()
        };
        let q = query(StageTracker::plan(Cycle::Start(BusinessType::Withdrawal), &input, &[]).unwrap());
        assert_eq!(q.state.stage, Stage::ProcessIdentifier);
        assert_eq!(q.state.slots.identifier, Some(id()));
        assert_eq!(q.query, PlannedQuery::OrderStatus(id()));
    }

    #[test]
    fn malformed_attempt_gets_corrective_prompt_and_keeps_stage() {
        let input = StageInput {
            malformed_attempt: true,
            ..Default::default()
        };
        let current = state(BusinessType::Deposit, Stage::AskIdentifier);
        let t = respond(StageTracker::plan(Cycle::Resume(&current), &input, &[]).unwrap());
        assert_eq!(t.state.stage, Stage::AskIdentifier);
        assert_eq!(t.reply.key, MessageKey::InvalidIdentifier);
    }

    #[test]
    fn dont_know_shows_guide_then_returns_to_ask() {
        let input = StageInput {
            dont_know: true,
            ..Default::default()
        };
        let current = state(BusinessType::Deposit, Stage::AskIdentifier);
        let t = respond(StageTracker::plan(Cycle::Resume(&current), &input, &guide()).unwrap());
        assert_eq!(t.state.stage, Stage::GuideImage);
        assert_eq!(t.reply.key, MessageKey::GuideImage);
        assert_eq!(t.reply.images, guide());

        let next = respond(
            StageTracker::plan(Cycle::Resume(&t.state), &StageInput::default(), &guide()).unwrap(),
        );
        assert_eq!(next.state.stage, Stage::AskIdentifier);
        assert_eq!(next.reply.key, MessageKey::AskIdentifier);
    }

    #[test]
    fn human_request_in_order_flow_hands_off() {
        let input = StageInput {
            wants_human: true,
            ..Default::default()
        };
        let current = state(BusinessType::Withdrawal, Stage::GuideImage);
        let t = respond(StageTracker::plan(Cycle::Resume(&current), &input, &[]).unwrap());
        assert_eq!(t.state.stage, Stage::Finish);
        assert_eq!(t.signal, ControlSignal::TransferHuman);
    }

    #[test]
    fn process_stage_requeries_remembered_identifier() {
        let mut current = state(BusinessType::Withdrawal, Stage::ProcessIdentifier);
        current.slots.identifier = Some(id());
        let q = query(StageTracker::plan(Cycle::Resume(&current), &StageInput::default(), &[]).unwrap());
        assert_eq!(q.query, PlannedQuery::OrderStatus(id()));
    }

    #[test]
    fn order_outcomes_resolve_by_signal() {
        let mut pending = state(BusinessType::Withdrawal, Stage::ProcessIdentifier);
        pending.slots.identifier = Some(id());

        let processing = StatusOutcome::new(MessageKey::WithdrawalProcessing, ControlSignal::Continue);
        let t = StageTracker::resolve_order(&pending, QueryResolution::Outcome(processing)).unwrap();
        assert_eq!(t.state.stage, Stage::ProcessIdentifier);
        assert_eq!(t.reply.args, vec![("identifier".to_string(), ID.to_string())]);

        let success = StatusOutcome::new(MessageKey::WithdrawalSuccess, ControlSignal::Finish);
        let t = StageTracker::resolve_order(&pending, QueryResolution::Outcome(success)).unwrap();
        assert_eq!(t.state.stage, Stage::Finish);
        assert_eq!(t.signal, ControlSignal::Finish);
    }

    #[test]
    fn user_input_error_stays_in_process_and_forgets_identifier() {
        let mut pending = state(BusinessType::Deposit, Stage::ProcessIdentifier);
        pending.slots.identifier = Some(id());
        let t = StageTracker::resolve_order(&pending, QueryResolution::UserInput).unwrap();
        assert_eq!(t.state.stage, Stage::ProcessIdentifier);
        assert_eq!(t.signal, ControlSignal::Continue);
        assert_eq!(t.reply.key, MessageKey::IdentifierNotFound);
        assert_eq!(t.state.slots.identifier, None);
        assert_eq!(t.state.slots.rejected, Some(id()));
    }

    #[test]
    fn system_error_hands_off() {
        let pending = state(BusinessType::Deposit, Stage::ProcessIdentifier);
        let t = StageTracker::resolve_order(&pending, QueryResolution::System).unwrap();
        assert_eq!(t.state.stage, Stage::Finish);
        assert_eq!(t.signal, ControlSignal::TransferHuman);
        assert_eq!(t.reply.key, MessageKey::Handoff);
    }

    // ══════════════════════════════════════════════════════════════
    // Activity
    // ══════════════════════════════════════════════════════════════

    fn rebate() -> ActivityRef {
        ActivityRef {
            id: "7".into(),
            name: "Weekly Rebate".into(),
        }
    }

    #[test]
    fn activity_always_lists_first() {
        let q = query(
            StageTracker::plan(Cycle::Start(BusinessType::Activity), &StageInput::default(), &[])
                .unwrap(),
        );
        assert_eq!(q.query, PlannedQuery::ActivityList);
        assert_eq!(q.state.stage, Stage::ListAndMatch);
    }

    #[test]
    fn match_proceeds_to_status_query_and_finish() {
        let pending = ConversationState::start(BusinessType::Activity);
        let q = query(
            StageTracker::resolve_activity_list(&pending, ListResolution::Matched(rebate())).unwrap(),
        );
        assert_eq!(q.query, PlannedQuery::ActivityStatus(rebate()));

        let paid = StatusOutcome::new(MessageKey::ActivityPaid, ControlSignal::Finish);
        let t = StageTracker::resolve_activity_status(&q.state, QueryResolution::Outcome(paid)).unwrap();
        assert_eq!(t.state.stage, Stage::Finish);
        assert_eq!(t.reply.args, vec![("activity".to_string(), "Weekly Rebate".to_string())]);
    }

    #[test]
    fn first_miss_disambiguates_second_hands_off() {
        let pending = ConversationState::start(BusinessType::Activity);
        let names = vec!["Weekly Rebate".to_string(), "First Deposit Bonus".to_string()];

        let first = respond(
            StageTracker::resolve_activity_list(&pending, ListResolution::Unmatched { names: names.clone() })
                .unwrap(),
        );
        assert_eq!(first.state.stage, Stage::Disambiguate);
        assert_eq!(first.state.slots.failed_matches, 1);
        assert_eq!(
            first.reply.args,
            vec![("activities".to_string(), "Weekly Rebate, First Deposit Bonus".to_string())]
        );

        let second = respond(
            StageTracker::resolve_activity_list(&first.state, ListResolution::Unmatched { names }).unwrap(),
        );
        assert_eq!(second.state.stage, Stage::Finish);
        assert_eq!(second.signal, ControlSignal::TransferHuman);
        assert_eq!(second.reply.key, MessageKey::ActivityNotFound);
    }

    #[test]
    fn activity_user_input_error_does_not_escalate() {
        let pending = state(BusinessType::Activity, Stage::Disambiguate);
        let t = respond(StageTracker::resolve_activity_list(&pending, ListResolution::UserInput).unwrap());
        assert_eq!(t.signal, ControlSignal::Continue);
        assert_eq!(t.state.stage, Stage::Disambiguate);
        assert_eq!(t.reply.key, MessageKey::ActivityRetry);
        assert!(t.reply.args.is_empty());
    }

    #[test]
    fn activity_status_user_input_error_asks_again_without_list() {
        let mut pending = state(BusinessType::Activity, Stage::ListAndMatch);
        pending.slots.activity = Some(ActivityRef {
            id: "7".into(),
            name: "Daily Check-in".into(),
        });
        let t = StageTracker::resolve_activity_status(&pending, QueryResolution::UserInput).unwrap();
        assert_eq!(t.signal, ControlSignal::Continue);
        assert_eq!(t.reply.key, MessageKey::ActivityRetry);
        assert_eq!(t.state.slots.activity, None);
    }

    // ══════════════════════════════════════════════════════════════
    // Human service and Finish
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn human_service_cycle_hands_off_immediately() {
        let t = respond(
            StageTracker::plan(Cycle::Start(BusinessType::HumanService), &StageInput::default(), &[])
                .unwrap(),
        );
        assert_eq!(t.state.stage, Stage::Finish);
        assert_eq!(t.signal, ControlSignal::TransferHuman);
    }

    #[test]
    fn finished_cycle_absorbs_further_turns() {
        let done = state(BusinessType::Deposit, Stage::Finish);
        let input = StageInput {
            identifier: Some(id()),
            ..Default::default()
        };
        let t = respond(StageTracker::plan(Cycle::Resume(&done), &input, &[]).unwrap());
        assert_eq!(t.state, done);
        assert_eq!(t.signal, ControlSignal::Finish);
        assert_eq!(t.reply.key, MessageKey::SessionClosed);
    }

    #[test]
    fn proceed_rejects_regression() {
        let from = state(BusinessType::Deposit, Stage::ProcessIdentifier);
        let result = Transition::proceed(
            &from,
            from.at(Stage::AskIdentifier),
            ControlSignal::Continue,
            Reply::new(MessageKey::AskIdentifier),
        );
        assert!(result.is_err());
    }
}
