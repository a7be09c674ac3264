use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::{FormatError, TransitionError},
    protocol::RawBillRecord,
};

/// Opaque store-assigned identifier of a bill.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillId(pub String);

impl BillId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BillId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserType {
    Employee,
    Admin,
}

/// Session descriptor persisted under the `user` key of local storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub email: String,
}

impl Session {
    pub fn employee(email: impl Into<String>) -> Self {
        Self {
            user_type: UserType::Employee,
            email: email.into(),
        }
    }

    pub fn admin(email: impl Into<String>) -> Self {
        Self {
            user_type: UserType::Admin,
            email: email.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Pending,
    Accepted,
    Refused,
}

impl BillStatus {
    /// Dashboard panel order.
    pub const ALL: [BillStatus; 3] = [
        BillStatus::Pending,
        BillStatus::Accepted,
        BillStatus::Refused,
    ];

    pub fn code(self) -> &'static str {
        match self {
            BillStatus::Pending => "pending",
            BillStatus::Accepted => "accepted",
            BillStatus::Refused => "refused",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, FormatError> {
        match code {
            "pending" => Ok(BillStatus::Pending),
            "accepted" => Ok(BillStatus::Accepted),
            "refused" => Ok(BillStatus::Refused),
            other => Err(FormatError::UnknownStatus(other.to_string())),
        }
    }

    /// Label shown to employees.
    pub fn label(self) -> &'static str {
        match self {
            BillStatus::Pending => "En attente",
            BillStatus::Accepted => "Accepté",
            BillStatus::Refused => "Refusé",
        }
    }

    pub fn from_panel_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(BillStatus::Pending),
            2 => Some(BillStatus::Accepted),
            3 => Some(BillStatus::Refused),
            _ => None,
        }
    }

    pub fn panel_index(self) -> u8 {
        match self {
            BillStatus::Pending => 1,
            BillStatus::Accepted => 2,
            BillStatus::Refused => 3,
        }
    }

    /// Checks a lifecycle move. Only `pending` may move, and only to a terminal status.
    pub fn transition_to(self, target: BillStatus) -> Result<BillStatus, TransitionError> {
        match (self, target) {
            (BillStatus::Pending, BillStatus::Accepted | BillStatus::Refused) => Ok(target),
            (from, to) => Err(TransitionError::InvalidTransition { from, to }),
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BillId>,
    #[serde(rename = "email")]
    pub employee_email: String,
    #[serde(rename = "type")]
    pub expense_type: String,
    pub name: String,
    pub amount: u64,
    pub date: String,
    pub vat: String,
    pub pct: u32,
    pub commentary: String,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub status: BillStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_admin: Option<String>,
}

impl Bill {
    pub const DEFAULT_PCT: u32 = 20;

    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// Full-record copy carrying an admin decision.
    pub fn with_decision(&self, status: BillStatus, comment_admin: Option<String>) -> Bill {
        Bill {
            status,
            comment_admin,
            ..self.clone()
        }
    }
}

impl TryFrom<RawBillRecord> for Bill {
    type Error = FormatError;

    fn try_from(raw: RawBillRecord) -> Result<Self, Self::Error> {
        let status = BillStatus::from_code(&raw.status)?;
        Ok(Bill {
            id: raw.id,
            employee_email: raw.email,
            expense_type: raw.expense_type,
            name: raw.name,
            amount: raw.amount,
            date: raw.date,
            vat: raw.vat,
            pct: raw.pct,
            commentary: raw.commentary,
            file_url: raw.file_url,
            file_name: raw.file_name,
            status,
            comment_admin: raw.comment_admin,
        })
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
