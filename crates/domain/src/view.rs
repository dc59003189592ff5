use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::DomainResult;
use crate::error::DomainError;
use crate::member::Member;
use crate::ports::profile::ProfileRepository;
use crate::profile::{
    Address, CertificationDetail, Email, KeyContact, Phone, RegistrationDetail, SocialLink,
};

/// Denormalized read model: one member with every profile section attached.
/// Absent sections render as `None` or an empty list, never as an error.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileView {
    pub member: Member,
    pub registration: Option<RegistrationDetail>,
    pub certification: Option<CertificationDetail>,
    pub permanent_address: Option<Address>,
    pub phones: Vec<Phone>,
    pub emails: Vec<Email>,
    pub social_links: Vec<SocialLink>,
    pub key_contacts: Vec<KeyContact>,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MemberSortKey {
    #[default]
    Id,
    Name,
    Status,
    CreatedAt,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Clone)]
pub struct ProfileViewService {
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileViewService {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    pub async fn get(&self, member_id: i64) -> DomainResult<ProfileView> {
        self.profiles
            .fetch_view(member_id)
            .await?
            .ok_or(DomainError::NotFound)
    }

    pub async fn list_all(
        &self,
        sort: MemberSortKey,
        direction: SortDirection,
    ) -> DomainResult<Vec<ProfileView>> {
        let mut views = self.profiles.list_views().await?;
        sort_views(&mut views, sort, direction);
        Ok(views)
    }
}

/// Orders views by the requested key; ties always break by member id
/// ascending, regardless of direction.
pub fn sort_views(views: &mut [ProfileView], sort: MemberSortKey, direction: SortDirection) {
    views.sort_by(|left, right| {
        let ordering = match sort {
            MemberSortKey::Id => left.member.member_id.cmp(&right.member.member_id),
            MemberSortKey::Name => left
                .member
                .organization_name
                .to_lowercase()
                .cmp(&right.member.organization_name.to_lowercase()),
            MemberSortKey::Status => left
                .member
                .status
                .as_str()
                .cmp(right.member.status.as_str()),
            MemberSortKey::CreatedAt => left.member.created_at_ms.cmp(&right.member.created_at_ms),
        };
        let ordering = match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering == Ordering::Equal {
            left.member.member_id.cmp(&right.member.member_id)
        } else {
            ordering
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::MemberStatus;

    fn view(member_id: i64, name: &str, status: MemberStatus, created_at_ms: i64) -> ProfileView {
        ProfileView {
            member: Member {
                member_id,
                organization_name: name.to_string(),
                organization_type: None,
                contact_person: None,
                contact_phone: None,
                contact_email: None,
                status,
                membership_expiry_date: None,
                created_at_ms,
                updated_at_ms: created_at_ms,
            },
            registration: None,
            certification: None,
            permanent_address: None,
            phones: Vec::new(),
            emails: Vec::new(),
            social_links: Vec::new(),
            key_contacts: Vec::new(),
        }
    }

    #[test]
    fn sorts_by_name_case_insensitively() {
        let mut views = vec![
            view(1, "zenith", MemberStatus::Active, 10),
            view(2, "Apex", MemberStatus::Active, 20),
            view(3, "mid", MemberStatus::Active, 30),
        ];
        sort_views(&mut views, MemberSortKey::Name, SortDirection::Asc);
        let names: Vec<_> = views
            .iter()
            .map(|view| view.member.organization_name.as_str())
            .collect();
        assert_eq!(names, vec!["Apex", "mid", "zenith"]);
    }

    #[test]
    fn ties_break_by_id_ascending_even_when_descending() {
        let mut views = vec![
            view(3, "Same", MemberStatus::Active, 50),
            view(1, "Same", MemberStatus::Active, 50),
            view(2, "Same", MemberStatus::Active, 50),
        ];
        sort_views(&mut views, MemberSortKey::CreatedAt, SortDirection::Desc);
        let ids: Vec<_> = views.iter().map(|view| view.member.member_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn descending_reverses_the_key_order() {
        let mut views = vec![
            view(1, "a", MemberStatus::Active, 10),
            view(2, "b", MemberStatus::Active, 20),
        ];
        sort_views(&mut views, MemberSortKey::CreatedAt, SortDirection::Desc);
        let ids: Vec<_> = views.iter().map(|view| view.member.member_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }
}
