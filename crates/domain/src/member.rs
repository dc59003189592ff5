use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::DomainResult;
use crate::error::DomainError;
use crate::ports::member::MemberRepository;
use crate::util::{coerce_calendar_date, now_ms};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Pending,
    Inactive,
    Suspended,
}

impl MemberStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Pending => "pending",
            MemberStatus::Inactive => "inactive",
            MemberStatus::Suspended => "suspended",
        }
    }
}

/// Identity anchor for an organization. Created once at registration and
/// never deleted; status changes come from admin action or the expiry sweep.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub member_id: i64,
    pub organization_name: String,
    pub organization_type: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub status: MemberStatus,
    pub membership_expiry_date: Option<Date>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MemberCreate {
    pub organization_name: String,
    pub organization_type: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub membership_expiry_date: Option<String>,
}

#[derive(Clone)]
pub struct MemberService {
    repository: Arc<dyn MemberRepository>,
}

impl MemberService {
    pub fn new(repository: Arc<dyn MemberRepository>) -> Self {
        Self { repository }
    }

    pub async fn register(&self, input: MemberCreate) -> DomainResult<Member> {
        let input = validate_member_create(input)?;
        let now = now_ms();
        let member = Member {
            member_id: 0,
            organization_name: input.organization_name,
            organization_type: input.organization_type,
            contact_person: input.contact_person,
            contact_phone: input.contact_phone,
            contact_email: input.contact_email,
            status: MemberStatus::Pending,
            membership_expiry_date: input
                .membership_expiry_date
                .as_deref()
                .and_then(coerce_calendar_date),
            created_at_ms: now,
            updated_at_ms: now,
        };
        self.repository.insert(&member).await
    }

    pub async fn get(&self, member_id: i64) -> DomainResult<Member> {
        self.repository
            .get(member_id)
            .await?
            .ok_or(DomainError::NotFound)
    }

    pub async fn set_status(&self, member_id: i64, status: MemberStatus) -> DomainResult<Member> {
        self.repository
            .set_status(member_id, status, now_ms())
            .await
    }

    /// Moves every active member whose membership lapsed strictly before
    /// `today` to inactive. Returns how many members were swept.
    pub async fn sweep_expired(&self, today: Date) -> DomainResult<u64> {
        self.repository.sweep_expired(today, now_ms()).await
    }
}

fn validate_member_create(input: MemberCreate) -> DomainResult<MemberCreate> {
    let organization_name = input.organization_name.trim().to_string();
    if organization_name.is_empty() {
        return Err(DomainError::Validation(
            "organization_name is required".into(),
        ));
    }

    if let Some(email) = &input.contact_email {
        if !email.trim().is_empty() && !email.contains('@') {
            return Err(DomainError::Validation(
                "contact_email must contain '@'".into(),
            ));
        }
    }

    Ok(MemberCreate {
        organization_name,
        ..input
    })
}
