use chrono::{DateTime, NaiveDate, Utc};

use sqlx::{PgExecutor, PgPool};

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{
    AmoAccount, Contact, ContactCriteria, EmailFormat, EmailIn, EmailRecord, FxaAccount,
    NewContact, VpnWaitlist,
};

/// One Identity row outer-joined against each sub-entity table.
/// Sub-entity columns are all nullable; a sub-entity row exists iff its
/// key column came back non-null.
const CONTACT_QUERY: &str = r#"
select
    e.email_id, e.primary_email, e.basket_token, e.sfdc_id, e.mofo_id,
    e.first_name, e.last_name, e.mailing_country, e.email_format,
    e.email_lang, e.mofo_relevant, e.has_opted_out_of_email,
    e.unsubscribe_reason, e.create_timestamp, e.update_timestamp,
    a.email_id as amo_email_id, a.add_on_ids, a.display_name,
    a.email_opt_in, a.language as amo_language, a.last_login, a.location,
    a.profile_url, a."user" as amo_user, a.user_id as amo_user_id,
    a.username as amo_username, a.create_timestamp as amo_create_timestamp,
    a.update_timestamp as amo_update_timestamp,
    f.email_id as fxa_email_id, f.fxa_id, f.primary_email as fxa_primary_email,
    f.created_date as fxa_created_date, f.lang as fxa_lang, f.first_service,
    f.account_deleted,
    v.email_id as vpn_email_id, v.geo, v.platform
from emails e
left join amo_accounts a on a.email_id = e.email_id
left join fxa_accounts f on f.email_id = e.email_id
left join vpn_waitlist v on v.email_id = e.email_id
"#;

fn decode_email_format(value: &str) -> sqlx::Result<EmailFormat> {
    value
        .parse::<EmailFormat>()
        .map_err(|e| sqlx::Error::Decode(e.into()))
}

/// Raw row shape for a single Identity record
#[derive(Debug, sqlx::FromRow)]
struct EmailRow {
    email_id: Uuid,
    primary_email: String,
    basket_token: Option<Uuid>,
    sfdc_id: Option<String>,
    mofo_id: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    mailing_country: Option<String>,
    email_format: String,
    email_lang: Option<String>,
    mofo_relevant: bool,
    has_opted_out_of_email: bool,
    unsubscribe_reason: Option<String>,
    create_timestamp: DateTime<Utc>,
    update_timestamp: DateTime<Utc>,
}

impl EmailRow {
    fn into_record(self) -> sqlx::Result<EmailRecord> {
        let email_format = decode_email_format(&self.email_format)?;

        Ok(EmailRecord {
            email_id: self.email_id,
            primary_email: self.primary_email,
            basket_token: self.basket_token,
            sfdc_id: self.sfdc_id,
            mofo_id: self.mofo_id,
            first_name: self.first_name,
            last_name: self.last_name,
            mailing_country: self.mailing_country,
            email_format,
            email_lang: self.email_lang,
            mofo_relevant: self.mofo_relevant,
            has_opted_out_of_email: self.has_opted_out_of_email,
            unsubscribe_reason: self.unsubscribe_reason,
            create_timestamp: self.create_timestamp,
            update_timestamp: self.update_timestamp,
        })
    }
}

/// Raw row shape for the outer-joined contact query
#[derive(Debug, sqlx::FromRow)]
struct ContactRow {
    email_id: Uuid,
    primary_email: String,
    basket_token: Option<Uuid>,
    sfdc_id: Option<String>,
    mofo_id: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    mailing_country: Option<String>,
    email_format: String,
    email_lang: Option<String>,
    mofo_relevant: bool,
    has_opted_out_of_email: bool,
    unsubscribe_reason: Option<String>,
    create_timestamp: DateTime<Utc>,
    update_timestamp: DateTime<Utc>,

    amo_email_id: Option<Uuid>,
    add_on_ids: Option<String>,
    display_name: Option<String>,
    email_opt_in: Option<bool>,
    amo_language: Option<String>,
    last_login: Option<NaiveDate>,
    location: Option<String>,
    profile_url: Option<String>,
    amo_user: Option<bool>,
    amo_user_id: Option<String>,
    amo_username: Option<String>,
    amo_create_timestamp: Option<DateTime<Utc>>,
    amo_update_timestamp: Option<DateTime<Utc>>,

    fxa_email_id: Option<Uuid>,
    fxa_id: Option<String>,
    fxa_primary_email: Option<String>,
    fxa_created_date: Option<String>,
    fxa_lang: Option<String>,
    first_service: Option<String>,
    account_deleted: Option<bool>,

    vpn_email_id: Option<Uuid>,
    geo: Option<String>,
    platform: Option<String>,
}

impl ContactRow {
    /// Pair the joined columns into an aggregate: the Identity record plus
    /// one optional record per sub-entity, keyed on the joined key column
    fn into_contact(self, newsletters: Vec<String>) -> sqlx::Result<Contact> {
        let email_format = decode_email_format(&self.email_format)?;

        let email = EmailRecord {
            email_id: self.email_id,
            primary_email: self.primary_email,
            basket_token: self.basket_token,
            sfdc_id: self.sfdc_id,
            mofo_id: self.mofo_id,
            first_name: self.first_name,
            last_name: self.last_name,
            mailing_country: self.mailing_country,
            email_format,
            email_lang: self.email_lang,
            mofo_relevant: self.mofo_relevant,
            has_opted_out_of_email: self.has_opted_out_of_email,
            unsubscribe_reason: self.unsubscribe_reason,
            create_timestamp: self.create_timestamp,
            update_timestamp: self.update_timestamp,
        };

        let amo = if self.amo_email_id.is_some() {
            Some(AmoAccount {
                add_on_ids: self.add_on_ids,
                display_name: self.display_name,
                email_opt_in: self.email_opt_in.unwrap_or_default(),
                language: self.amo_language,
                last_login: self.last_login,
                location: self.location,
                profile_url: self.profile_url,
                user: self.amo_user.unwrap_or_default(),
                user_id: self.amo_user_id,
                username: self.amo_username,
                create_timestamp: self.amo_create_timestamp,
                update_timestamp: self.amo_update_timestamp,
            })
        } else {
            None
        };

        let fxa = if self.fxa_email_id.is_some() {
            Some(FxaAccount {
                fxa_id: self.fxa_id,
                primary_email: self.fxa_primary_email,
                created_date: self.fxa_created_date,
                lang: self.fxa_lang,
                first_service: self.first_service,
                account_deleted: self.account_deleted.unwrap_or_default(),
            })
        } else {
            None
        };

        let vpn_waitlist = if self.vpn_email_id.is_some() {
            Some(VpnWaitlist {
                geo: self.geo,
                platform: self.platform,
            })
        } else {
            None
        };

        Ok(Contact::assemble(email, amo, fxa, vpn_waitlist, newsletters))
    }
}

/// Repository for interfacing with the contact tables
pub struct ContactsRepo;

impl ContactsRepo {
    #[tracing::instrument(name = "Fetch an identity record", skip(executor))]
    pub async fn get_email_by_id<'con>(
        executor: impl PgExecutor<'con>,
        email_id: Uuid,
    ) -> sqlx::Result<Option<EmailRecord>> {
        let row = sqlx::query_as::<_, EmailRow>(
            r#"
            select email_id, primary_email, basket_token, sfdc_id, mofo_id,
                   first_name, last_name, mailing_country, email_format,
                   email_lang, mofo_relevant, has_opted_out_of_email,
                   unsubscribe_reason, create_timestamp, update_timestamp
            from emails
            where email_id = $1
            "#,
        )
        .bind(email_id)
        .fetch_optional(executor)
        .await?;

        row.map(EmailRow::into_record).transpose()
    }

    /// Fetch all the data for one contact.
    /// `None` is the not-found outcome; absent sub-entities are not.
    #[tracing::instrument(name = "Fetch a contact", skip(pool))]
    pub async fn get_contact_by_email_id(
        pool: &PgPool,
        email_id: Uuid,
    ) -> Result<Option<Contact>> {
        let query = format!("{} where e.email_id = $1", CONTACT_QUERY);

        let row = sqlx::query_as::<_, ContactRow>(&query)
            .bind(email_id)
            .fetch_optional(pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let newsletters = Self::get_newsletters(pool, row.email_id).await?;
        let contact = row.into_contact(newsletters)?;

        Ok(Some(contact))
    }

    /// Resolve contacts by any combination of alternate identifiers.
    /// Supplied keys AND-combine; the outer joins keep a contact visible
    /// even when it has no row in a given sub-entity table.
    #[tracing::instrument(name = "Resolve contacts by any identifier", skip(pool))]
    pub async fn get_contacts_by_any_id(
        pool: &PgPool,
        criteria: &ContactCriteria,
    ) -> Result<Vec<Contact>> {
        if criteria.is_empty() {
            return Err(Error::MissingIdentifiers);
        }

        let query = format!(
            r#"{}
            where ($1::uuid is null or e.email_id = $1)
              and ($2::text is null or e.primary_email = $2)
              and ($3::uuid is null or e.basket_token = $3)
              and ($4::text is null or e.sfdc_id = $4)
              and ($5::text is null or e.mofo_id = $5)
              and ($6::text is null or a.user_id = $6)
              and ($7::text is null or f.fxa_id = $7)
              and ($8::text is null or f.primary_email = $8)
            order by e.create_timestamp, e.email_id
            "#,
            CONTACT_QUERY
        );

        let rows = sqlx::query_as::<_, ContactRow>(&query)
            .bind(criteria.email_id)
            .bind(criteria.primary_email.as_deref())
            .bind(criteria.basket_token)
            .bind(criteria.sfdc_id.as_deref())
            .bind(criteria.mofo_id.as_deref())
            .bind(criteria.amo_user_id.as_deref())
            .bind(criteria.fxa_id.as_deref())
            .bind(criteria.fxa_primary_email.as_deref())
            .fetch_all(pool)
            .await?;

        // The one-to-many subscription set is fetched per matched contact;
        // folding it into the outer join would duplicate parent rows
        let mut contacts = Vec::with_capacity(rows.len());
        for row in rows {
            let newsletters = Self::get_newsletters(pool, row.email_id).await?;
            contacts.push(row.into_contact(newsletters)?);
        }

        Ok(contacts)
    }

    #[tracing::instrument(name = "Fetch newsletter subscriptions", skip(executor))]
    pub async fn get_newsletters<'con>(
        executor: impl PgExecutor<'con>,
        email_id: Uuid,
    ) -> sqlx::Result<Vec<String>> {
        sqlx::query_scalar("select name from newsletters where email_id = $1 order by id")
            .bind(email_id)
            .fetch_all(executor)
            .await
    }

    #[tracing::instrument(name = "Insert identity record", skip(executor, email))]
    pub async fn insert_email<'con>(
        executor: impl PgExecutor<'con>,
        email_id: Uuid,
        email: &EmailIn,
    ) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            insert into emails (
                email_id, primary_email, basket_token, sfdc_id, mofo_id,
                first_name, last_name, mailing_country, email_format,
                email_lang, mofo_relevant, has_opted_out_of_email,
                unsubscribe_reason
            ) values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(email_id)
        .bind(email.primary_email.as_ref())
        .bind(email.basket_token)
        .bind(email.sfdc_id.as_deref())
        .bind(email.mofo_id.as_deref())
        .bind(email.first_name.as_deref())
        .bind(email.last_name.as_deref())
        .bind(email.mailing_country.as_deref())
        .bind(email.email_format.as_str())
        .bind(email.email_lang.as_deref())
        .bind(email.mofo_relevant)
        .bind(email.has_opted_out_of_email)
        .bind(email.unsubscribe_reason.as_deref())
        .execute(executor)
        .await?;

        Ok(())
    }

    #[tracing::instrument(name = "Insert add-on account record", skip(executor, amo))]
    pub async fn insert_amo<'con>(
        executor: impl PgExecutor<'con>,
        email_id: Uuid,
        amo: &AmoAccount,
    ) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            insert into amo_accounts (
                email_id, add_on_ids, display_name, email_opt_in, language,
                last_login, location, profile_url, "user", user_id, username
            ) values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(email_id)
        .bind(amo.add_on_ids.as_deref())
        .bind(amo.display_name.as_deref())
        .bind(amo.email_opt_in)
        .bind(amo.language.as_deref())
        .bind(amo.last_login)
        .bind(amo.location.as_deref())
        .bind(amo.profile_url.as_deref())
        .bind(amo.user)
        .bind(amo.user_id.as_deref())
        .bind(amo.username.as_deref())
        .execute(executor)
        .await?;

        Ok(())
    }

    #[tracing::instrument(name = "Insert account-service record", skip(executor, fxa))]
    pub async fn insert_fxa<'con>(
        executor: impl PgExecutor<'con>,
        email_id: Uuid,
        fxa: &FxaAccount,
    ) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            insert into fxa_accounts (
                email_id, fxa_id, primary_email, created_date, lang,
                first_service, account_deleted
            ) values ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(email_id)
        .bind(fxa.fxa_id.as_deref())
        .bind(fxa.primary_email.as_deref())
        .bind(fxa.created_date.as_deref())
        .bind(fxa.lang.as_deref())
        .bind(fxa.first_service.as_deref())
        .bind(fxa.account_deleted)
        .execute(executor)
        .await?;

        Ok(())
    }

    #[tracing::instrument(name = "Insert waitlist record", skip(executor, vpn_waitlist))]
    pub async fn insert_vpn_waitlist<'con>(
        executor: impl PgExecutor<'con>,
        email_id: Uuid,
        vpn_waitlist: &VpnWaitlist,
    ) -> sqlx::Result<()> {
        sqlx::query("insert into vpn_waitlist (email_id, geo, platform) values ($1, $2, $3)")
            .bind(email_id)
            .bind(vpn_waitlist.geo.as_deref())
            .bind(vpn_waitlist.platform.as_deref())
            .execute(executor)
            .await?;

        Ok(())
    }

    /// Duplicate subscription names collapse on the (email_id, name) key
    #[tracing::instrument(name = "Insert newsletter subscription", skip(executor))]
    pub async fn insert_newsletter<'con>(
        executor: impl PgExecutor<'con>,
        email_id: Uuid,
        name: &str,
    ) -> sqlx::Result<()> {
        sqlx::query(
            "insert into newsletters (email_id, name) values ($1, $2) \
             on conflict (email_id, name) do nothing",
        )
        .bind(email_id)
        .bind(name)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Expand a create-input into one insert per present payload, all
    /// within one transaction. Any failure rolls the whole set back when
    /// the transaction is dropped uncommitted.
    #[tracing::instrument(name = "Create a contact", skip(pool, new_contact))]
    pub async fn create_contact(pool: &PgPool, new_contact: &NewContact) -> Result<Uuid> {
        let email_id = new_contact.email.email_id.unwrap_or_else(Uuid::new_v4);

        let mut tx = pool.begin().await?;

        Self::insert_email(&mut *tx, email_id, &new_contact.email).await?;
        if let Some(amo) = &new_contact.amo {
            Self::insert_amo(&mut *tx, email_id, amo).await?;
        }
        if let Some(fxa) = &new_contact.fxa {
            Self::insert_fxa(&mut *tx, email_id, fxa).await?;
        }
        if let Some(vpn_waitlist) = &new_contact.vpn_waitlist {
            Self::insert_vpn_waitlist(&mut *tx, email_id, vpn_waitlist).await?;
        }
        for name in &new_contact.newsletters {
            Self::insert_newsletter(&mut *tx, email_id, name).await?;
        }

        tx.commit().await?;

        Ok(email_id)
    }
}
