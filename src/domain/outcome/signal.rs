//! Control signals and the message keys replies are rendered from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the caller should do with the conversation after this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlSignal {
    /// Stay in the workflow and wait for the next user turn.
    Continue,
    /// Workflow resolved; nothing left to do.
    Finish,
    /// Workflow ends and a human agent takes over.
    TransferHuman,
}

impl ControlSignal {
    pub fn ends_cycle(&self) -> bool {
        !matches!(self, ControlSignal::Continue)
    }

    pub fn transfers_human(&self) -> bool {
        matches!(self, ControlSignal::TransferHuman)
    }
}

/// Key of a localized reply template in the workflow catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKey {
    AskIdentifier,
    InvalidIdentifier,
    GuideImage,
    IdentifierNotFound,
    Handoff,
    LoginRequired,
    SessionClosed,
    ActivityDisambiguate,
    ActivityRetry,
    ActivityNotFound,
    UnknownStatus,

    DepositSuccess,
    DepositCanceled,
    DepositPending,
    DepositRejected,
    DepositFailed,

    WithdrawalSuccess,
    WithdrawalProcessing,
    WithdrawalCanceled,
    WithdrawalFailed,
    WithdrawalRejected,
    WithdrawalCardLimitExceeded,
    WithdrawalInvalidCardNumber,
    WithdrawalBankMaintenance,
    WithdrawalCardAbnormal,
    WithdrawalResubmitAfterCutoff,
    WithdrawalReversed,

    ActivityConditionsUnmet,
    ActivityPaid,
    ActivityAwaitingPayment,
    ActivityManualPaymentRequired,
}

impl MessageKey {
    pub fn as_str(&self) -> &'static str {
        use MessageKey::*;
        match self {
            AskIdentifier => "ask_identifier",
            InvalidIdentifier => "invalid_identifier",
            GuideImage => "guide_image",
            IdentifierNotFound => "identifier_not_found",
            Handoff => "handoff",
            LoginRequired => "login_required",
            SessionClosed => "session_closed",
            ActivityDisambiguate => "activity_disambiguate",
            ActivityRetry => "activity_retry",
            ActivityNotFound => "activity_not_found",
            UnknownStatus => "unknown_status",
            DepositSuccess => "deposit_success",
            DepositCanceled => "deposit_canceled",
            DepositPending => "deposit_pending",
            DepositRejected => "deposit_rejected",
            DepositFailed => "deposit_failed",
            WithdrawalSuccess => "withdrawal_success",
            WithdrawalProcessing => "withdrawal_processing",
            WithdrawalCanceled => "withdrawal_canceled",
            WithdrawalFailed => "withdrawal_failed",
            WithdrawalRejected => "withdrawal_rejected",
            WithdrawalCardLimitExceeded => "withdrawal_card_limit_exceeded",
            WithdrawalInvalidCardNumber => "withdrawal_invalid_card_number",
            WithdrawalBankMaintenance => "withdrawal_bank_maintenance",
            WithdrawalCardAbnormal => "withdrawal_card_abnormal",
            WithdrawalResubmitAfterCutoff => "withdrawal_resubmit_after_cutoff",
            WithdrawalReversed => "withdrawal_reversed",
            ActivityConditionsUnmet => "activity_conditions_unmet",
            ActivityPaid => "activity_paid",
            ActivityAwaitingPayment => "activity_awaiting_payment",
            ActivityManualPaymentRequired => "activity_manual_payment_required",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_matches_serde_name() {
        for key in [
            MessageKey::UnknownStatus,
            MessageKey::ActivityRetry,
            MessageKey::WithdrawalResubmitAfterCutoff,
            MessageKey::ActivityManualPaymentRequired,
        ] {
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{}\"", key.as_str()));
        }
    }

    #[test]
    fn only_continue_keeps_cycle_open() {
        assert!(!ControlSignal::Continue.ends_cycle());
        assert!(ControlSignal::Finish.ends_cycle());
        assert!(ControlSignal::TransferHuman.ends_cycle());
        assert!(!ControlSignal::Finish.transfers_human());
    }
}
