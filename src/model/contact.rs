use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::model::{AmoAccount, EmailIn, EmailRecord, FxaAccount, VpnWaitlist};

/// In-memory contact aggregate: one Identity record plus its optional
/// sub-entity records and subscription names.
///
/// Sub-entity slots are `None` when no matching row exists. Absence and
/// "present but empty" are distinct states here; only the response
/// transform collapses them.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub email: EmailRecord,
    pub amo: Option<AmoAccount>,
    pub fxa: Option<FxaAccount>,
    pub vpn_waitlist: Option<VpnWaitlist>,
    /// Always a list, empty when the contact has no subscriptions.
    /// Insertion order is preserved for display stability.
    pub newsletters: Vec<String>,
}

impl Contact {
    /// Assemble an aggregate from one joined row group and its
    /// subscription set. Callers must have established that the Identity
    /// row exists; a missing root is a resolver outcome, not an assembly
    /// outcome.
    pub fn assemble(
        email: EmailRecord,
        amo: Option<AmoAccount>,
        fxa: Option<FxaAccount>,
        vpn_waitlist: Option<VpnWaitlist>,
        newsletters: Vec<String>,
    ) -> Self {
        Self {
            email,
            amo,
            fxa,
            vpn_waitlist,
            newsletters,
        }
    }
}

/// Create-input: one mandatory Identity payload plus optional sub-entity
/// payloads and subscription names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContact {
    pub email: EmailIn,
    #[serde(default)]
    pub amo: Option<AmoAccount>,
    #[serde(default)]
    pub fxa: Option<FxaAccount>,
    #[serde(default)]
    pub vpn_waitlist: Option<VpnWaitlist>,
    #[serde(default)]
    pub newsletters: Vec<String>,
}

/// Alternate-identifier key set for contact resolution.
/// Supplied keys narrow the match (logical AND); omitted keys impose no
/// constraint. At least one key is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactCriteria {
    pub email_id: Option<Uuid>,
    pub primary_email: Option<String>,
    pub basket_token: Option<Uuid>,
    pub sfdc_id: Option<String>,
    pub mofo_id: Option<String>,
    pub amo_user_id: Option<String>,
    pub fxa_id: Option<String>,
    pub fxa_primary_email: Option<String>,
}

impl ContactCriteria {
    pub fn is_empty(&self) -> bool {
        self.email_id.is_none()
            && self.primary_email.is_none()
            && self.basket_token.is_none()
            && self.sfdc_id.is_none()
            && self.mofo_id.is_none()
            && self.amo_user_id.is_none()
            && self.fxa_id.is_none()
            && self.fxa_primary_email.is_none()
    }
}

/// External response shape: sub-records are always present. An absent
/// aggregate slot becomes the zero-valued default shape, never null.
/// Field names are a stable contract with the downstream consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtmsResponse {
    pub amo: AmoAccount,
    pub email: EmailRecord,
    pub fxa: FxaAccount,
    pub newsletters: Vec<String>,
    pub status: &'static str,
    pub vpn_waitlist: VpnWaitlist,
}

impl From<Contact> for CtmsResponse {
    fn from(contact: Contact) -> Self {
        Self {
            amo: contact.amo.unwrap_or_default(),
            email: contact.email,
            fxa: contact.fxa.unwrap_or_default(),
            newsletters: contact.newsletters,
            status: "ok",
            vpn_waitlist: contact.vpn_waitlist.unwrap_or_default(),
        }
    }
}

/// The identity keys for a contact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityResponse {
    pub email_id: Uuid,
    pub basket_token: Option<Uuid>,
    pub amo_user_id: Option<String>,
    pub fxa_id: Option<String>,
    pub fxa_primary_email: Option<String>,
}

impl From<&Contact> for IdentityResponse {
    fn from(contact: &Contact) -> Self {
        Self {
            email_id: contact.email.email_id,
            basket_token: contact.email.basket_token,
            amo_user_id: contact.amo.as_ref().and_then(|amo| amo.user_id.clone()),
            fxa_id: contact.fxa.as_ref().and_then(|fxa| fxa.fxa_id.clone()),
            fxa_primary_email: contact
                .fxa
                .as_ref()
                .and_then(|fxa| fxa.primary_email.clone()),
        }
    }
}
