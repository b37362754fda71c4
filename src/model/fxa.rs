use serde::{Deserialize, Serialize};

/// Linked account-service data for a contact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FxaAccount {
    pub fxa_id: Option<String>,
    /// The email the account service knows the contact by; may differ
    /// from the Identity record's primary email
    pub primary_email: Option<String>,
    pub created_date: Option<String>,
    pub lang: Option<String>,
    pub first_service: Option<String>,
    pub account_deleted: bool,
}
