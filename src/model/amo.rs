use chrono::{DateTime, NaiveDate, Utc};

use serde::{Deserialize, Serialize};

/// The add-ons marketplace data for a contact.
/// Field names mirror the `AMO_*__c` columns in Salesforce.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmoAccount {
    /// Comma-separated list of add-ons for the account
    pub add_on_ids: Option<String>,
    pub display_name: Option<String>,
    pub email_opt_in: bool,
    pub language: Option<String>,
    pub last_login: Option<NaiveDate>,
    /// Free-text location
    pub location: Option<String>,
    pub profile_url: Option<String>,
    /// True if the record came from an add-on account sync
    pub user: bool,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub create_timestamp: Option<DateTime<Utc>>,
    pub update_timestamp: Option<DateTime<Utc>>,
}
