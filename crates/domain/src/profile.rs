use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::DomainResult;
use crate::error::DomainError;
use crate::ports::geo::GeoRepository;
use crate::ports::member::MemberRepository;
use crate::ports::profile::ProfileRepository;
use crate::util::{coerce_calendar_date, now_ms};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AddressKind {
    Permanent,
    Communication,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OtherDetail {
    pub label: String,
    pub noted_on: Option<Date>,
}

/// Extended registration attributes, at most one row per member. An update
/// replaces every field with the latest submission.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RegistrationDetail {
    pub member_id: i64,
    pub registration_type: Option<String>,
    pub registration_number: Option<String>,
    pub registration_date: Option<Date>,
    pub alternate_registration_number: Option<String>,
    pub alternate_registration_date: Option<Date>,
    pub pan_number: Option<String>,
    pub gst_number: Option<String>,
    pub other_details: Vec<OtherDetail>,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Address {
    pub member_id: i64,
    pub kind: AddressKind,
    pub line1: String,
    pub line2: Option<String>,
    pub state_id: i64,
    pub district_id: i64,
    pub taluka_id: Option<i64>,
    pub city_id: Option<i64>,
    pub postal_code: Option<String>,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Phone {
    pub member_id: i64,
    pub label: Option<String>,
    pub number: String,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Email {
    pub member_id: i64,
    pub label: Option<String>,
    pub address: String,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SocialLink {
    pub member_id: i64,
    pub platform: String,
    pub url: String,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct KeyContact {
    pub member_id: i64,
    pub name: String,
    pub designation: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CertificationDetail {
    pub member_id: i64,
    pub certification_name: String,
    pub certification_number: Option<String>,
    pub issued_on: Option<Date>,
    pub valid_until: Option<Date>,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OtherDetailInput {
    pub label: String,
    pub noted_on: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RegistrationDetailInput {
    pub registration_type: Option<String>,
    pub registration_number: Option<String>,
    pub registration_date: Option<String>,
    pub alternate_registration_number: Option<String>,
    pub alternate_registration_date: Option<String>,
    pub pan_number: Option<String>,
    pub gst_number: Option<String>,
    #[serde(default)]
    pub other_details: Vec<OtherDetailInput>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddressInput {
    pub kind: AddressKind,
    pub line1: String,
    pub line2: Option<String>,
    pub state_id: i64,
    pub district_id: i64,
    pub taluka_id: Option<i64>,
    pub city_id: Option<i64>,
    pub postal_code: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PhoneInput {
    pub label: Option<String>,
    pub number: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmailInput {
    pub label: Option<String>,
    pub address: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SocialLinkInput {
    pub platform: String,
    pub url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyContactInput {
    pub name: String,
    pub designation: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CertificationInput {
    pub certification_name: String,
    pub certification_number: Option<String>,
    pub issued_on: Option<String>,
    pub valid_until: Option<String>,
}

/// One submission for one member. Every section is optional; omitted
/// sections are left untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProfileSubmission {
    pub registration: Option<RegistrationDetailInput>,
    #[serde(default)]
    pub addresses: Vec<AddressInput>,
    #[serde(default)]
    pub phones: Vec<PhoneInput>,
    #[serde(default)]
    pub emails: Vec<EmailInput>,
    #[serde(default)]
    pub social_links: Vec<SocialLinkInput>,
    #[serde(default)]
    pub key_contacts: Vec<KeyContactInput>,
    #[serde(default)]
    pub certifications: Vec<CertificationInput>,
}

/// Normalized section writes handed to the store as one atomic unit.
/// List-shaped sections are applied in order with an upsert keyed on member
/// id alone, so the last entry of a multi-entry list is the one that
/// survives.
#[derive(Clone, Debug, Default)]
pub struct ProfileWrite {
    pub registration: Option<RegistrationDetail>,
    pub addresses: Vec<Address>,
    pub phones: Vec<Phone>,
    pub emails: Vec<Email>,
    pub social_links: Vec<SocialLink>,
    pub key_contacts: Vec<KeyContact>,
    pub certifications: Vec<CertificationDetail>,
}

impl ProfileWrite {
    pub fn is_empty(&self) -> bool {
        self.registration.is_none()
            && self.addresses.is_empty()
            && self.phones.is_empty()
            && self.emails.is_empty()
            && self.social_links.is_empty()
            && self.key_contacts.is_empty()
            && self.certifications.is_empty()
    }
}

#[derive(Clone)]
pub struct ProfileService {
    members: Arc<dyn MemberRepository>,
    geo: Arc<dyn GeoRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        geo: Arc<dyn GeoRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            members,
            geo,
            profiles,
        }
    }

    /// Persists one submission across every section it carries, all within a
    /// single storage transaction. Either every section write lands or none
    /// does; a storage error surfaces as `Persistence` with prior state
    /// intact. Re-submitting an identical payload leaves identical state.
    pub async fn save(&self, member_id: i64, submission: ProfileSubmission) -> DomainResult<()> {
        if !self.members.exists(member_id).await? {
            return Err(DomainError::MemberNotFound);
        }

        let write = normalize_submission(member_id, submission)?;
        if write.is_empty() {
            return Ok(());
        }
        for address in &write.addresses {
            self.assert_location_chain(address).await?;
        }

        self.profiles.save_sections(member_id, &write).await
    }

    /// An address must name a district inside its state, and any taluka or
    /// city inside its district. Deactivated talukas and cities stay valid
    /// references.
    async fn assert_location_chain(&self, address: &Address) -> DomainResult<()> {
        self.geo
            .get_state(address.state_id)
            .await?
            .ok_or_else(|| {
                DomainError::Validation(format!("state {} does not exist", address.state_id))
            })?;

        let district = self
            .geo
            .get_district(address.district_id)
            .await?
            .ok_or_else(|| {
                DomainError::Validation(format!("district {} does not exist", address.district_id))
            })?;
        if district.state_id != address.state_id {
            return Err(DomainError::Validation(format!(
                "district {} does not belong to state {}",
                address.district_id, address.state_id
            )));
        }

        if let Some(taluka_id) = address.taluka_id {
            let taluka = self.geo.get_taluka(taluka_id).await?.ok_or_else(|| {
                DomainError::Validation(format!("taluka {taluka_id} does not exist"))
            })?;
            if taluka.district_id != address.district_id {
                return Err(DomainError::Validation(format!(
                    "taluka {} does not belong to district {}",
                    taluka_id, address.district_id
                )));
            }
        }

        if let Some(city_id) = address.city_id {
            let city = self
                .geo
                .get_city(city_id)
                .await?
                .ok_or_else(|| DomainError::Validation(format!("city {city_id} does not exist")))?;
            if city.district_id != address.district_id {
                return Err(DomainError::Validation(format!(
                    "city {} does not belong to district {}",
                    city_id, address.district_id
                )));
            }
        }

        Ok(())
    }
}

pub(crate) fn normalize_submission(
    member_id: i64,
    submission: ProfileSubmission,
) -> DomainResult<ProfileWrite> {
    let now = now_ms();
    let mut write = ProfileWrite::default();

    if let Some(registration) = submission.registration {
        write.registration = Some(RegistrationDetail {
            member_id,
            registration_type: trimmed(registration.registration_type),
            registration_number: trimmed(registration.registration_number),
            registration_date: registration
                .registration_date
                .as_deref()
                .and_then(coerce_calendar_date),
            alternate_registration_number: trimmed(registration.alternate_registration_number),
            alternate_registration_date: registration
                .alternate_registration_date
                .as_deref()
                .and_then(coerce_calendar_date),
            pan_number: trimmed(registration.pan_number),
            gst_number: trimmed(registration.gst_number),
            other_details: registration
                .other_details
                .into_iter()
                .map(|detail| OtherDetail {
                    label: detail.label.trim().to_string(),
                    noted_on: detail.noted_on.as_deref().and_then(coerce_calendar_date),
                })
                .collect(),
            updated_at_ms: now,
        });
    }

    for address in submission.addresses {
        let line1 = address.line1.trim().to_string();
        if line1.is_empty() {
            return Err(DomainError::Validation("address line1 is required".into()));
        }
        write.addresses.push(Address {
            member_id,
            kind: address.kind,
            line1,
            line2: trimmed(address.line2),
            state_id: address.state_id,
            district_id: address.district_id,
            taluka_id: address.taluka_id,
            city_id: address.city_id,
            postal_code: trimmed(address.postal_code),
            updated_at_ms: now,
        });
    }

    for phone in submission.phones {
        let number = phone.number.trim().to_string();
        if number.is_empty() {
            return Err(DomainError::Validation("phone number is required".into()));
        }
        write.phones.push(Phone {
            member_id,
            label: trimmed(phone.label),
            number,
            updated_at_ms: now,
        });
    }

    for email in submission.emails {
        let address = email.address.trim().to_string();
        if address.is_empty() {
            return Err(DomainError::Validation("email address is required".into()));
        }
        if !address.contains('@') {
            return Err(DomainError::Validation(
                "email address must contain '@'".into(),
            ));
        }
        write.emails.push(Email {
            member_id,
            label: trimmed(email.label),
            address,
            updated_at_ms: now,
        });
    }

    for link in submission.social_links {
        let platform = link.platform.trim().to_string();
        let url = link.url.trim().to_string();
        if platform.is_empty() || url.is_empty() {
            return Err(DomainError::Validation(
                "social link platform and url are required".into(),
            ));
        }
        write.social_links.push(SocialLink {
            member_id,
            platform,
            url,
            updated_at_ms: now,
        });
    }

    for contact in submission.key_contacts {
        let name = contact.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::Validation("key contact name is required".into()));
        }
        write.key_contacts.push(KeyContact {
            member_id,
            name,
            designation: trimmed(contact.designation),
            phone: trimmed(contact.phone),
            email: trimmed(contact.email),
            updated_at_ms: now,
        });
    }

    for certification in submission.certifications {
        let certification_name = certification.certification_name.trim().to_string();
        if certification_name.is_empty() {
            return Err(DomainError::Validation(
                "certification name is required".into(),
            ));
        }
        write.certifications.push(CertificationDetail {
            member_id,
            certification_name,
            certification_number: trimmed(certification.certification_number),
            issued_on: certification
                .issued_on
                .as_deref()
                .and_then(coerce_calendar_date),
            valid_until: certification
                .valid_until
                .as_deref()
                .and_then(coerce_calendar_date),
            updated_at_ms: now,
        });
    }

    Ok(write)
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
