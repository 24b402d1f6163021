use std::str::FromStr;

use diesel::{deserialize::FromSqlRow, expression::AsExpression, sql_types::Text};
use serde::{Deserialize, Serialize};

use super::UnknownVariant;

/// Value of the `request_status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromSqlRow, AsExpression, Serialize, Deserialize)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Registration,
    Approved,
    Rejected,
    Withdrawal,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Registration => "REGISTRATION",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Withdrawal => "WITHDRAWAL",
        }
    }
}

impl FromStr for RequestStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REGISTRATION" => Ok(RequestStatus::Registration),
            "APPROVED" => Ok(RequestStatus::Approved),
            "REJECTED" => Ok(RequestStatus::Rejected),
            "WITHDRAWAL" => Ok(RequestStatus::Withdrawal),
            other => Err(UnknownVariant {
                kind: "request_status",
                value: other.to_string(),
            }),
        }
    }
}

text_column_enum!(RequestStatus);

/// Lifecycle state of a restaurant, encoded in the database by the
/// `(request_status, is_active)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestaurantState {
    Pending,
    Approved,
    Rejected,
    WithdrawalPending,
    Withdrawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Approve,
    Reject,
    RequestWithdrawal,
    ApproveWithdrawal,
    RejectWithdrawal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Restaurant is already approved")]
    AlreadyApproved,
    #[error("Restaurant has already been rejected")]
    AlreadyRejected,
    #[error("Restaurant has already been withdrawn")]
    AlreadyWithdrawn,
    #[error("Restaurant is not approved")]
    NotApproved,
    #[error("Restaurant already has a pending withdrawal request")]
    WithdrawalAlreadyPending,
    #[error("Restaurant has no pending withdrawal request")]
    NoWithdrawalPending,
}

impl RestaurantState {
    pub fn from_columns(status: RequestStatus, is_active: bool) -> Self {
        match (status, is_active) {
            (RequestStatus::Registration, _) => RestaurantState::Pending,
            (RequestStatus::Approved, true) => RestaurantState::Approved,
            // an approved row that was switched off by hand counts as withdrawn
            (RequestStatus::Approved, false) => RestaurantState::Withdrawn,
            (RequestStatus::Rejected, _) => RestaurantState::Rejected,
            (RequestStatus::Withdrawal, true) => RestaurantState::WithdrawalPending,
            (RequestStatus::Withdrawal, false) => RestaurantState::Withdrawn,
        }
    }

    pub fn columns(&self) -> (RequestStatus, bool) {
        match self {
            RestaurantState::Pending => (RequestStatus::Registration, false),
            RestaurantState::Approved => (RequestStatus::Approved, true),
            RestaurantState::Rejected => (RequestStatus::Rejected, false),
            RestaurantState::WithdrawalPending => (RequestStatus::Withdrawal, true),
            RestaurantState::Withdrawn => (RequestStatus::Withdrawal, false),
        }
    }

    pub fn apply(&self, transition: Transition) -> Result<RestaurantState, TransitionError> {
        use RestaurantState as S;
        use Transition as T;
        use TransitionError as E;

        match (transition, self) {
            (T::Approve, S::Pending) => Ok(S::Approved),
            (T::Reject, S::Pending) => Ok(S::Rejected),
            (T::Approve | T::Reject, S::Approved | S::WithdrawalPending) => Err(E::AlreadyApproved),
            (T::Approve | T::Reject, S::Rejected) => Err(E::AlreadyRejected),
            (T::Approve | T::Reject, S::Withdrawn) => Err(E::AlreadyWithdrawn),

            (T::RequestWithdrawal, S::Approved) => Ok(S::WithdrawalPending),
            (T::RequestWithdrawal, S::WithdrawalPending) => Err(E::WithdrawalAlreadyPending),
            (T::RequestWithdrawal, S::Withdrawn) => Err(E::AlreadyWithdrawn),
            (T::RequestWithdrawal, S::Pending | S::Rejected) => Err(E::NotApproved),

            (T::ApproveWithdrawal, S::WithdrawalPending) => Ok(S::Withdrawn),
            (T::RejectWithdrawal, S::WithdrawalPending) => Ok(S::Approved),
            (T::ApproveWithdrawal | T::RejectWithdrawal, _) => Err(E::NoWithdrawalPending),
        }
    }
}
