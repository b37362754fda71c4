use std::str::FromStr;

use chrono::{DateTime, Utc};

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::domain::EmailAddress;

/// Email format preference, mirrors the `Email_Format__c` picklist:
/// H=HTML, T=plain text, N/empty=no selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmailFormat {
    #[default]
    #[serde(rename = "H")]
    Html,
    #[serde(rename = "T")]
    Text,
    #[serde(rename = "N")]
    None,
    #[serde(rename = "")]
    Unset,
}

impl EmailFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "H",
            Self::Text => "T",
            Self::None => "N",
            Self::Unset => "",
        }
    }
}

impl FromStr for EmailFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "H" => Ok(Self::Html),
            "T" => Ok(Self::Text),
            "N" => Ok(Self::None),
            "" => Ok(Self::Unset),
            other => Err(format!("{:?} is not a valid email format", other)),
        }
    }
}

/// Stored Identity record: a contact's primary email and related data.
/// Field names mirror the corresponding Salesforce columns.
#[derive(Debug, Clone, Serialize)]
pub struct EmailRecord {
    pub email_id: Uuid,
    pub primary_email: String,
    pub basket_token: Option<Uuid>,
    pub sfdc_id: Option<String>,
    pub mofo_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub mailing_country: Option<String>,
    pub email_format: EmailFormat,
    pub email_lang: Option<String>,
    pub mofo_relevant: bool,
    pub has_opted_out_of_email: bool,
    pub unsubscribe_reason: Option<String>,
    /// Creation and update timestamps
    /// NOTE: Auto-set by database defaults, excluded from equality
    pub create_timestamp: DateTime<Utc>,
    pub update_timestamp: DateTime<Utc>,
}

// Server-assigned timestamps are excluded; every other field must match.
// The identifier is a mandatory field of this type, so there is no
// "comparison without an identifier" case to reject at runtime.
impl PartialEq for EmailRecord {
    fn eq(&self, other: &Self) -> bool {
        self.email_id == other.email_id
            && self.primary_email == other.primary_email
            && self.basket_token == other.basket_token
            && self.sfdc_id == other.sfdc_id
            && self.mofo_id == other.mofo_id
            && self.first_name == other.first_name
            && self.last_name == other.last_name
            && self.mailing_country == other.mailing_country
            && self.email_format == other.email_format
            && self.email_lang == other.email_lang
            && self.mofo_relevant == other.mofo_relevant
            && self.has_opted_out_of_email == other.has_opted_out_of_email
            && self.unsubscribe_reason == other.unsubscribe_reason
    }
}

/// Create-input for an Identity record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailIn {
    /// Assigned server-side when absent
    #[serde(default)]
    pub email_id: Option<Uuid>,
    pub primary_email: EmailAddress,
    #[serde(default)]
    pub basket_token: Option<Uuid>,
    #[serde(default)]
    pub sfdc_id: Option<String>,
    #[serde(default)]
    pub mofo_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub mailing_country: Option<String>,
    #[serde(default)]
    pub email_format: EmailFormat,
    #[serde(default = "default_email_lang")]
    pub email_lang: Option<String>,
    #[serde(default)]
    pub mofo_relevant: bool,
    #[serde(default)]
    pub has_opted_out_of_email: bool,
    #[serde(default)]
    pub unsubscribe_reason: Option<String>,
}

fn default_email_lang() -> Option<String> {
    Some("en".into())
}
