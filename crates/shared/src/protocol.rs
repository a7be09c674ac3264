use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{Bill, BillId};

/// Bill as the store returns it; `status` stays a raw code until formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBillRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BillId>,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "type", default)]
    pub expense_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub vat: String,
    #[serde(default = "default_pct")]
    pub pct: u32,
    #[serde(default)]
    pub commentary: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_admin: Option<String>,
}

fn default_pct() -> u32 {
    Bill::DEFAULT_PCT
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected vat as string or number, got {other}"
        ))),
    }
}

impl From<Bill> for RawBillRecord {
    fn from(bill: Bill) -> Self {
        Self {
            id: bill.id,
            email: bill.employee_email,
            expense_type: bill.expense_type,
            name: bill.name,
            amount: bill.amount,
            date: bill.date,
            vat: bill.vat,
            pct: bill.pct,
            commentary: bill.commentary,
            file_url: bill.file_url,
            file_name: bill.file_name,
            status: bill.status.code().to_string(),
            comment_admin: bill.comment_admin,
        }
    }
}

/// Store write: `data` is the serialized bill, `selector` the id to overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub data: String,
    pub selector: Option<BillId>,
}

impl UpdateRequest {
    pub fn for_bill(bill: &Bill, selector: Option<BillId>) -> serde_json::Result<Self> {
        Ok(Self {
            data: serde_json::to_string(bill)?,
            selector,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateResponse {
    pub id: BillId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub file_url: String,
    pub file_name: String,
}
