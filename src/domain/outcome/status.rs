//! Status tables mapping external order and activity statuses to outcomes.
//!
//! Each business type owns a closed set of statuses. Parsing is lenient about
//! case, surrounding whitespace and the British spelling of `cancelled`; any
//! other string is unknown and escalates.

use serde::Serialize;

use super::{ControlSignal, MessageKey};
use crate::domain::foundation::BusinessType;

/// Reply key and control signal derived from one external status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusOutcome {
    pub message_key: MessageKey,
    pub signal: ControlSignal,
}

impl StatusOutcome {
    pub const fn new(message_key: MessageKey, signal: ControlSignal) -> Self {
        Self { message_key, signal }
    }

    /// The outcome for a status absent from the table.
    pub const fn unknown() -> Self {
        Self::new(MessageKey::UnknownStatus, ControlSignal::TransferHuman)
    }
}

fn normalize(raw: &str) -> String {
    let lowered = raw.trim().to_ascii_lowercase();
    match lowered.as_str() {
        "cancelled" => "canceled".to_string(),
        _ => lowered,
    }
}

/// Deposit (recharge) order statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositStatus {
    Success,
    Canceled,
    Pending,
    Rejected,
    Failed,
}

impl DepositStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize(raw).as_str() {
            "success" => Some(Self::Success),
            "canceled" => Some(Self::Canceled),
            "pending" => Some(Self::Pending),
            "rejected" => Some(Self::Rejected),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn outcome(&self) -> StatusOutcome {
        use ControlSignal::*;
        match self {
            Self::Success => StatusOutcome::new(MessageKey::DepositSuccess, Finish),
            Self::Canceled => StatusOutcome::new(MessageKey::DepositCanceled, Finish),
            Self::Pending => StatusOutcome::new(MessageKey::DepositPending, TransferHuman),
            Self::Rejected => StatusOutcome::new(MessageKey::DepositRejected, TransferHuman),
            Self::Failed => StatusOutcome::new(MessageKey::DepositFailed, TransferHuman),
        }
    }
}

/// Withdrawal order statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalStatus {
    Success,
    Processing,
    Canceled,
    Failed,
    Rejected,
    CardLimitExceeded,
    InvalidCardNumber,
    BankMaintenance,
    CardAbnormal,
    ResubmitAfterCutoff,
    Reversed,
}

impl WithdrawalStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize(raw).as_str() {
            "success" => Some(Self::Success),
            "processing" => Some(Self::Processing),
            "canceled" => Some(Self::Canceled),
            "failed" => Some(Self::Failed),
            "rejected" => Some(Self::Rejected),
            "card_limit_exceeded" => Some(Self::CardLimitExceeded),
            "invalid_card_number" => Some(Self::InvalidCardNumber),
            "bank_maintenance" => Some(Self::BankMaintenance),
            "card_abnormal" => Some(Self::CardAbnormal),
            "resubmit_after_cutoff" => Some(Self::ResubmitAfterCutoff),
            "reversed" => Some(Self::Reversed),
            _ => None,
        }
    }

    pub fn outcome(&self) -> StatusOutcome {
        use ControlSignal::*;
        let (key, signal) = match self {
            Self::Success => (MessageKey::WithdrawalSuccess, Finish),
            Self::Processing => (MessageKey::WithdrawalProcessing, Continue),
            Self::Canceled => (MessageKey::WithdrawalCanceled, Finish),
            Self::Failed => (MessageKey::WithdrawalFailed, TransferHuman),
            Self::Rejected => (MessageKey::WithdrawalRejected, TransferHuman),
            Self::CardLimitExceeded => (MessageKey::WithdrawalCardLimitExceeded, TransferHuman),
            Self::InvalidCardNumber => (MessageKey::WithdrawalInvalidCardNumber, TransferHuman),
            Self::BankMaintenance => (MessageKey::WithdrawalBankMaintenance, TransferHuman),
            Self::CardAbnormal => (MessageKey::WithdrawalCardAbnormal, TransferHuman),
            Self::ResubmitAfterCutoff => (MessageKey::WithdrawalResubmitAfterCutoff, TransferHuman),
            Self::Reversed => (MessageKey::WithdrawalReversed, TransferHuman),
        };
        StatusOutcome::new(key, signal)
    }
}

/// Activity reward statuses for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityStatus {
    ConditionsUnmet,
    Paid,
    AwaitingPayment,
    ManualPaymentRequired,
}

impl ActivityStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize(raw).as_str() {
            "conditions_unmet" => Some(Self::ConditionsUnmet),
            "paid" => Some(Self::Paid),
            "awaiting_payment" => Some(Self::AwaitingPayment),
            "manual_payment_required" => Some(Self::ManualPaymentRequired),
            _ => None,
        }
    }

    pub fn outcome(&self) -> StatusOutcome {
        use ControlSignal::*;
        match self {
            Self::ConditionsUnmet => StatusOutcome::new(MessageKey::ActivityConditionsUnmet, Finish),
            Self::Paid => StatusOutcome::new(MessageKey::ActivityPaid, Finish),
            Self::AwaitingPayment => StatusOutcome::new(MessageKey::ActivityAwaitingPayment, Finish),
            Self::ManualPaymentRequired => {
                StatusOutcome::new(MessageKey::ActivityManualPaymentRequired, TransferHuman)
            }
        }
    }
}

/// Interprets a raw status for a business type.
///
/// Pure apart from the warn log on an unknown status. Business types without
/// a status table (HumanService, Unset) always interpret to unknown.
pub fn interpret(business_type: BusinessType, raw: &str) -> StatusOutcome {
    let known = match business_type {
        BusinessType::Deposit => DepositStatus::parse(raw).map(|s| s.outcome()),
        BusinessType::Withdrawal => WithdrawalStatus::parse(raw).map(|s| s.outcome()),
        BusinessType::Activity => ActivityStatus::parse(raw).map(|s| s.outcome()),
        BusinessType::HumanService | BusinessType::Unset => None,
    };

    known.unwrap_or_else(|| {
        tracing::warn!(
            business_type = %business_type,
            status = raw,
            "Unrecognized external status, escalating to human"
        );
        StatusOutcome::unknown()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_table_has_five_entries_with_expected_signals() {
        let cases = [
            ("success", ControlSignal::Finish),
            ("canceled", ControlSignal::Finish),
            ("pending", ControlSignal::TransferHuman),
            ("rejected", ControlSignal::TransferHuman),
            ("failed", ControlSignal::TransferHuman),
        ];
        for (raw, signal) in cases {
            assert_eq!(interpret(BusinessType::Deposit, raw).signal, signal, "{}", raw);
        }
    }

    #[test]
    fn withdrawal_processing_continues() {
        let outcome = interpret(BusinessType::Withdrawal, "processing");
        assert_eq!(outcome.signal, ControlSignal::Continue);
        assert_eq!(outcome.message_key, MessageKey::WithdrawalProcessing);
    }

    #[test]
    fn withdrawal_failure_variants_escalate() {
        for raw in [
            "failed",
            "rejected",
            "card_limit_exceeded",
            "invalid_card_number",
            "bank_maintenance",
            "card_abnormal",
            "resubmit_after_cutoff",
            "reversed",
        ] {
            assert_eq!(
                interpret(BusinessType::Withdrawal, raw).signal,
                ControlSignal::TransferHuman,
                "{}",
                raw
            );
        }
        assert_eq!(
            interpret(BusinessType::Withdrawal, "success").signal,
            ControlSignal::Finish
        );
        assert_eq!(
            interpret(BusinessType::Withdrawal, "canceled").signal,
            ControlSignal::Finish
        );
    }

    #[test]
    fn activity_only_manual_payment_escalates() {
        assert_eq!(
            interpret(BusinessType::Activity, "manual_payment_required").signal,
            ControlSignal::TransferHuman
        );
        for raw in ["conditions_unmet", "paid", "awaiting_payment"] {
            assert_eq!(interpret(BusinessType::Activity, raw).signal, ControlSignal::Finish);
        }
    }

    #[test]
    fn parsing_tolerates_case_whitespace_and_spelling() {
        assert_eq!(DepositStatus::parse(" SUCCESS "), Some(DepositStatus::Success));
        assert_eq!(DepositStatus::parse("Cancelled"), Some(DepositStatus::Canceled));
    }

    #[test]
    fn unknown_status_escalates_with_unknown_key() {
        let outcome = interpret(BusinessType::Deposit, "processing");
        assert_eq!(outcome, StatusOutcome::unknown());
        assert_eq!(outcome.message_key, MessageKey::UnknownStatus);
    }

    #[test]
    fn business_types_without_table_are_unknown() {
        assert_eq!(
            interpret(BusinessType::HumanService, "success"),
            StatusOutcome::unknown()
        );
    }
}
