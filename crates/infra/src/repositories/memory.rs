use std::collections::HashMap;
use std::sync::Arc;

use sanstha_domain::DomainResult;
use sanstha_domain::draft::SubmissionDraft;
use sanstha_domain::error::DomainError;
use sanstha_domain::geo::{
    CityRecord, CityUpsert, DistrictRecord, DistrictUpsert, GeoKind, StateRecord, StateUpsert,
    TalukaRecord, TalukaUpsert,
};
use sanstha_domain::member::{Member, MemberStatus};
use sanstha_domain::ports::BoxFuture;
use sanstha_domain::ports::draft::DraftRepository;
use sanstha_domain::ports::geo::{GeoRepository, GeoScope};
use sanstha_domain::ports::member::MemberRepository;
use sanstha_domain::ports::profile::ProfileRepository;
use sanstha_domain::profile::{
    Address, AddressKind, CertificationDetail, Email, KeyContact, Phone, ProfileWrite,
    RegistrationDetail, SocialLink,
};
use sanstha_domain::view::ProfileView;
use time::Date;
use tokio::sync::RwLock;

#[derive(Default)]
struct MemberTable {
    rows: HashMap<i64, Member>,
    seq: i64,
}

#[derive(Default)]
struct GeoTables {
    states: HashMap<i64, StateRecord>,
    districts: HashMap<i64, DistrictRecord>,
    talukas: HashMap<i64, TalukaRecord>,
    cities: HashMap<i64, CityRecord>,
    seq: i64,
}

#[derive(Default)]
struct ProfileTables {
    registrations: HashMap<i64, RegistrationDetail>,
    addresses: HashMap<(i64, AddressKind), Address>,
    phones: HashMap<i64, Phone>,
    emails: HashMap<i64, Email>,
    social_links: HashMap<i64, SocialLink>,
    key_contacts: HashMap<i64, KeyContact>,
    certifications: HashMap<i64, CertificationDetail>,
}

/// Process-local backend. Every repository handed out by one backend shares
/// the same tables, so the write path and the read path see one another.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    members: Arc<RwLock<MemberTable>>,
    geo: Arc<RwLock<GeoTables>>,
    profiles: Arc<RwLock<ProfileTables>>,
    drafts: Arc<RwLock<HashMap<i64, SubmissionDraft>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn member_repo(&self) -> Arc<dyn MemberRepository> {
        Arc::new(InMemoryMemberRepository {
            table: self.members.clone(),
        })
    }

    pub fn geo_repo(&self) -> Arc<dyn GeoRepository> {
        Arc::new(InMemoryGeoRepository {
            tables: self.geo.clone(),
        })
    }

    pub fn profile_repo(&self) -> Arc<dyn ProfileRepository> {
        Arc::new(InMemoryProfileRepository {
            members: self.members.clone(),
            tables: self.profiles.clone(),
        })
    }

    pub fn draft_repo(&self) -> Arc<dyn DraftRepository> {
        Arc::new(InMemoryDraftRepository {
            rows: self.drafts.clone(),
        })
    }
}

pub struct InMemoryMemberRepository {
    table: Arc<RwLock<MemberTable>>,
}

impl MemberRepository for InMemoryMemberRepository {
    fn insert(&self, member: &Member) -> BoxFuture<'_, DomainResult<Member>> {
        let member = member.clone();
        let table = self.table.clone();
        Box::pin(async move {
            let mut table = table.write().await;
            table.seq += 1;
            let member = Member {
                member_id: table.seq,
                ..member
            };
            table.rows.insert(member.member_id, member.clone());
            Ok(member)
        })
    }

    fn get(&self, member_id: i64) -> BoxFuture<'_, DomainResult<Option<Member>>> {
        let table = self.table.clone();
        Box::pin(async move { Ok(table.read().await.rows.get(&member_id).cloned()) })
    }

    fn exists(&self, member_id: i64) -> BoxFuture<'_, DomainResult<bool>> {
        let table = self.table.clone();
        Box::pin(async move { Ok(table.read().await.rows.contains_key(&member_id)) })
    }

    fn set_status(
        &self,
        member_id: i64,
        status: MemberStatus,
        updated_at_ms: i64,
    ) -> BoxFuture<'_, DomainResult<Member>> {
        let table = self.table.clone();
        Box::pin(async move {
            let mut table = table.write().await;
            let member = table.rows.get_mut(&member_id).ok_or(DomainError::NotFound)?;
            member.status = status;
            member.updated_at_ms = updated_at_ms;
            Ok(member.clone())
        })
    }

    fn sweep_expired(&self, today: Date, updated_at_ms: i64) -> BoxFuture<'_, DomainResult<u64>> {
        let table = self.table.clone();
        Box::pin(async move {
            let mut table = table.write().await;
            let mut swept = 0;
            for member in table.rows.values_mut() {
                let lapsed = member.status == MemberStatus::Active
                    && member
                        .membership_expiry_date
                        .is_some_and(|expiry| expiry < today);
                if lapsed {
                    member.status = MemberStatus::Inactive;
                    member.updated_at_ms = updated_at_ms;
                    swept += 1;
                }
            }
            Ok(swept)
        })
    }
}

pub struct InMemoryGeoRepository {
    tables: Arc<RwLock<GeoTables>>,
}

impl GeoRepository for InMemoryGeoRepository {
    fn list_states(&self) -> BoxFuture<'_, DomainResult<Vec<StateRecord>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            let mut states: Vec<_> = tables
                .states
                .values()
                .filter(|state| state.is_active)
                .cloned()
                .collect();
            states.sort_by(|left, right| {
                left.name
                    .to_lowercase()
                    .cmp(&right.name.to_lowercase())
                    .then_with(|| left.state_id.cmp(&right.state_id))
            });
            Ok(states)
        })
    }

    fn get_state(&self, state_id: i64) -> BoxFuture<'_, DomainResult<Option<StateRecord>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.states.get(&state_id).cloned()) })
    }

    fn insert_state(&self, input: &StateUpsert) -> BoxFuture<'_, DomainResult<StateRecord>> {
        let input = input.clone();
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            let collision = tables.states.values().any(|state| {
                state.name.eq_ignore_ascii_case(&input.name)
                    || state.code.eq_ignore_ascii_case(&input.code)
            });
            if collision {
                return Err(DomainError::DuplicateName);
            }
            tables.seq += 1;
            let record = StateRecord {
                state_id: tables.seq,
                name: input.name,
                code: input.code,
                is_active: true,
            };
            tables.states.insert(record.state_id, record.clone());
            Ok(record)
        })
    }

    fn update_state(
        &self,
        state_id: i64,
        input: &StateUpsert,
    ) -> BoxFuture<'_, DomainResult<StateRecord>> {
        let input = input.clone();
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            if !tables.states.contains_key(&state_id) {
                return Err(DomainError::NotFound);
            }
            let collision = tables.states.values().any(|state| {
                state.state_id != state_id
                    && (state.name.eq_ignore_ascii_case(&input.name)
                        || state.code.eq_ignore_ascii_case(&input.code))
            });
            if collision {
                return Err(DomainError::DuplicateName);
            }
            let state = tables
                .states
                .get_mut(&state_id)
                .ok_or(DomainError::NotFound)?;
            state.name = input.name;
            state.code = input.code;
            Ok(state.clone())
        })
    }

    fn list_districts(&self, scope: &GeoScope) -> BoxFuture<'_, DomainResult<Vec<DistrictRecord>>> {
        let scope = *scope;
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            let mut districts: Vec<_> = tables
                .districts
                .values()
                .filter(|district| district.is_active)
                .filter(|district| {
                    scope
                        .state_id
                        .is_none_or(|state_id| district.state_id == state_id)
                })
                .cloned()
                .collect();
            districts.sort_by(|left, right| {
                left.name
                    .to_lowercase()
                    .cmp(&right.name.to_lowercase())
                    .then_with(|| left.district_id.cmp(&right.district_id))
            });
            Ok(districts)
        })
    }

    fn get_district(
        &self,
        district_id: i64,
    ) -> BoxFuture<'_, DomainResult<Option<DistrictRecord>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.districts.get(&district_id).cloned()) })
    }

    fn insert_district(
        &self,
        input: &DistrictUpsert,
    ) -> BoxFuture<'_, DomainResult<DistrictRecord>> {
        let input = input.clone();
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            let collision = tables.districts.values().any(|district| {
                district.state_id == input.state_id
                    && district.name.eq_ignore_ascii_case(&input.name)
            });
            if collision {
                return Err(DomainError::DuplicateName);
            }
            tables.seq += 1;
            let record = DistrictRecord {
                district_id: tables.seq,
                name: input.name,
                state_id: input.state_id,
                is_active: true,
            };
            tables.districts.insert(record.district_id, record.clone());
            Ok(record)
        })
    }

    fn update_district(
        &self,
        district_id: i64,
        input: &DistrictUpsert,
    ) -> BoxFuture<'_, DomainResult<DistrictRecord>> {
        let input = input.clone();
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            if !tables.districts.contains_key(&district_id) {
                return Err(DomainError::NotFound);
            }
            let collision = tables.districts.values().any(|district| {
                district.district_id != district_id
                    && district.state_id == input.state_id
                    && district.name.eq_ignore_ascii_case(&input.name)
            });
            if collision {
                return Err(DomainError::DuplicateName);
            }
            {
                let district = tables
                    .districts
                    .get_mut(&district_id)
                    .ok_or(DomainError::NotFound)?;
                district.name = input.name;
                district.state_id = input.state_id;
            }
            // Children carry a denormalized state id that must follow their
            // district when it moves.
            for taluka in tables
                .talukas
                .values_mut()
                .filter(|taluka| taluka.district_id == district_id)
            {
                taluka.state_id = input.state_id;
            }
            for city in tables
                .cities
                .values_mut()
                .filter(|city| city.district_id == district_id)
            {
                city.state_id = input.state_id;
            }
            Ok(tables.districts[&district_id].clone())
        })
    }

    fn list_talukas(&self, scope: &GeoScope) -> BoxFuture<'_, DomainResult<Vec<TalukaRecord>>> {
        let scope = *scope;
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            let mut talukas: Vec<_> = tables
                .talukas
                .values()
                .filter(|taluka| taluka.is_active)
                .filter(|taluka| {
                    scope
                        .state_id
                        .is_none_or(|state_id| taluka.state_id == state_id)
                        && scope
                            .district_id
                            .is_none_or(|district_id| taluka.district_id == district_id)
                })
                .cloned()
                .collect();
            talukas.sort_by(|left, right| {
                left.name
                    .to_lowercase()
                    .cmp(&right.name.to_lowercase())
                    .then_with(|| left.taluka_id.cmp(&right.taluka_id))
            });
            Ok(talukas)
        })
    }

    fn get_taluka(&self, taluka_id: i64) -> BoxFuture<'_, DomainResult<Option<TalukaRecord>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.talukas.get(&taluka_id).cloned()) })
    }

    fn insert_taluka(&self, input: &TalukaUpsert) -> BoxFuture<'_, DomainResult<TalukaRecord>> {
        let input = input.clone();
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            let collision = tables.talukas.values().any(|taluka| {
                taluka.district_id == input.district_id
                    && taluka.name.eq_ignore_ascii_case(&input.name)
            });
            if collision {
                return Err(DomainError::DuplicateName);
            }
            tables.seq += 1;
            let record = TalukaRecord {
                taluka_id: tables.seq,
                name: input.name,
                district_id: input.district_id,
                state_id: input.state_id,
                is_active: true,
            };
            tables.talukas.insert(record.taluka_id, record.clone());
            Ok(record)
        })
    }

    fn update_taluka(
        &self,
        taluka_id: i64,
        input: &TalukaUpsert,
    ) -> BoxFuture<'_, DomainResult<TalukaRecord>> {
        let input = input.clone();
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            if !tables.talukas.contains_key(&taluka_id) {
                return Err(DomainError::NotFound);
            }
            let collision = tables.talukas.values().any(|taluka| {
                taluka.taluka_id != taluka_id
                    && taluka.district_id == input.district_id
                    && taluka.name.eq_ignore_ascii_case(&input.name)
            });
            if collision {
                return Err(DomainError::DuplicateName);
            }
            let taluka = tables
                .talukas
                .get_mut(&taluka_id)
                .ok_or(DomainError::NotFound)?;
            taluka.name = input.name;
            taluka.district_id = input.district_id;
            taluka.state_id = input.state_id;
            Ok(taluka.clone())
        })
    }

    fn list_cities(&self, scope: &GeoScope) -> BoxFuture<'_, DomainResult<Vec<CityRecord>>> {
        let scope = *scope;
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            let mut cities: Vec<_> = tables
                .cities
                .values()
                .filter(|city| city.is_active)
                .filter(|city| {
                    scope
                        .state_id
                        .is_none_or(|state_id| city.state_id == state_id)
                        && scope
                            .district_id
                            .is_none_or(|district_id| city.district_id == district_id)
                })
                .cloned()
                .collect();
            cities.sort_by(|left, right| {
                left.name
                    .to_lowercase()
                    .cmp(&right.name.to_lowercase())
                    .then_with(|| left.city_id.cmp(&right.city_id))
            });
            Ok(cities)
        })
    }

    fn get_city(&self, city_id: i64) -> BoxFuture<'_, DomainResult<Option<CityRecord>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.cities.get(&city_id).cloned()) })
    }

    fn insert_city(&self, input: &CityUpsert) -> BoxFuture<'_, DomainResult<CityRecord>> {
        let input = input.clone();
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            let collision = tables.cities.values().any(|city| {
                city.district_id == input.district_id && city.name.eq_ignore_ascii_case(&input.name)
            });
            if collision {
                return Err(DomainError::DuplicateName);
            }
            tables.seq += 1;
            let record = CityRecord {
                city_id: tables.seq,
                name: input.name,
                district_id: input.district_id,
                state_id: input.state_id,
                is_active: true,
            };
            tables.cities.insert(record.city_id, record.clone());
            Ok(record)
        })
    }

    fn update_city(
        &self,
        city_id: i64,
        input: &CityUpsert,
    ) -> BoxFuture<'_, DomainResult<CityRecord>> {
        let input = input.clone();
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            if !tables.cities.contains_key(&city_id) {
                return Err(DomainError::NotFound);
            }
            let collision = tables.cities.values().any(|city| {
                city.city_id != city_id
                    && city.district_id == input.district_id
                    && city.name.eq_ignore_ascii_case(&input.name)
            });
            if collision {
                return Err(DomainError::DuplicateName);
            }
            let city = tables
                .cities
                .get_mut(&city_id)
                .ok_or(DomainError::NotFound)?;
            city.name = input.name;
            city.district_id = input.district_id;
            city.state_id = input.state_id;
            Ok(city.clone())
        })
    }

    fn remove_cascading(&self, kind: GeoKind, id: i64) -> BoxFuture<'_, DomainResult<u64>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            let removed = match kind {
                GeoKind::State => {
                    if tables.states.remove(&id).is_none() {
                        return Err(DomainError::NotFound);
                    }
                    let cities = drain_matching(&mut tables.cities, |city| city.state_id == id);
                    let talukas =
                        drain_matching(&mut tables.talukas, |taluka| taluka.state_id == id);
                    let districts =
                        drain_matching(&mut tables.districts, |district| district.state_id == id);
                    1 + cities + talukas + districts
                }
                GeoKind::District => {
                    if tables.districts.remove(&id).is_none() {
                        return Err(DomainError::NotFound);
                    }
                    let cities = drain_matching(&mut tables.cities, |city| city.district_id == id);
                    let talukas =
                        drain_matching(&mut tables.talukas, |taluka| taluka.district_id == id);
                    1 + cities + talukas
                }
                GeoKind::Taluka => {
                    if tables.talukas.remove(&id).is_none() {
                        return Err(DomainError::NotFound);
                    }
                    1
                }
                GeoKind::City => {
                    if tables.cities.remove(&id).is_none() {
                        return Err(DomainError::NotFound);
                    }
                    1
                }
            };
            Ok(removed)
        })
    }

    fn deactivate(&self, kind: GeoKind, id: i64) -> BoxFuture<'_, DomainResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            let found = match kind {
                GeoKind::State => tables
                    .states
                    .get_mut(&id)
                    .map(|state| state.is_active = false),
                GeoKind::District => tables
                    .districts
                    .get_mut(&id)
                    .map(|district| district.is_active = false),
                GeoKind::Taluka => tables
                    .talukas
                    .get_mut(&id)
                    .map(|taluka| taluka.is_active = false),
                GeoKind::City => tables.cities.get_mut(&id).map(|city| city.is_active = false),
            };
            found.ok_or(DomainError::NotFound)
        })
    }
}

fn drain_matching<K, V, F>(rows: &mut HashMap<K, V>, matches: F) -> u64
where
    K: std::hash::Hash + Eq + Clone,
    F: Fn(&V) -> bool,
{
    let keys: Vec<_> = rows
        .iter()
        .filter(|(_, value)| matches(value))
        .map(|(key, _)| key.clone())
        .collect();
    let removed = keys.len() as u64;
    for key in keys {
        rows.remove(&key);
    }
    removed
}

pub struct InMemoryProfileRepository {
    members: Arc<RwLock<MemberTable>>,
    tables: Arc<RwLock<ProfileTables>>,
}

impl InMemoryProfileRepository {
    fn assemble(member: Member, tables: &ProfileTables) -> ProfileView {
        let member_id = member.member_id;
        ProfileView {
            member,
            registration: tables.registrations.get(&member_id).cloned(),
            certification: tables.certifications.get(&member_id).cloned(),
            permanent_address: tables
                .addresses
                .get(&(member_id, AddressKind::Permanent))
                .cloned(),
            phones: tables.phones.get(&member_id).cloned().into_iter().collect(),
            emails: tables.emails.get(&member_id).cloned().into_iter().collect(),
            social_links: tables
                .social_links
                .get(&member_id)
                .cloned()
                .into_iter()
                .collect(),
            key_contacts: tables
                .key_contacts
                .get(&member_id)
                .cloned()
                .into_iter()
                .collect(),
        }
    }
}

impl ProfileRepository for InMemoryProfileRepository {
    fn save_sections(
        &self,
        member_id: i64,
        write: &ProfileWrite,
    ) -> BoxFuture<'_, DomainResult<()>> {
        let write = write.clone();
        let tables = self.tables.clone();
        Box::pin(async move {
            // Every section of the call is applied under one write guard, so
            // a concurrent reader sees either all of it or none of it.
            let mut tables = tables.write().await;
            if let Some(registration) = write.registration {
                tables.registrations.insert(member_id, registration);
            }
            for address in write.addresses {
                tables.addresses.insert((member_id, address.kind), address);
            }
            for phone in write.phones {
                tables.phones.insert(member_id, phone);
            }
            for email in write.emails {
                tables.emails.insert(member_id, email);
            }
            for link in write.social_links {
                tables.social_links.insert(member_id, link);
            }
            for contact in write.key_contacts {
                tables.key_contacts.insert(member_id, contact);
            }
            for certification in write.certifications {
                tables.certifications.insert(member_id, certification);
            }
            Ok(())
        })
    }

    fn fetch_view(&self, member_id: i64) -> BoxFuture<'_, DomainResult<Option<ProfileView>>> {
        let members = self.members.clone();
        let tables = self.tables.clone();
        Box::pin(async move {
            let member = members.read().await.rows.get(&member_id).cloned();
            let Some(member) = member else {
                return Ok(None);
            };
            let tables = tables.read().await;
            Ok(Some(Self::assemble(member, &tables)))
        })
    }

    fn list_views(&self) -> BoxFuture<'_, DomainResult<Vec<ProfileView>>> {
        let members = self.members.clone();
        let tables = self.tables.clone();
        Box::pin(async move {
            let members: Vec<_> = members.read().await.rows.values().cloned().collect();
            let tables = tables.read().await;
            Ok(members
                .into_iter()
                .map(|member| Self::assemble(member, &tables))
                .collect())
        })
    }
}

pub struct InMemoryDraftRepository {
    rows: Arc<RwLock<HashMap<i64, SubmissionDraft>>>,
}

impl DraftRepository for InMemoryDraftRepository {
    fn get(&self, member_id: i64) -> BoxFuture<'_, DomainResult<Option<SubmissionDraft>>> {
        let rows = self.rows.clone();
        Box::pin(async move { Ok(rows.read().await.get(&member_id).cloned()) })
    }

    fn put(&self, draft: &SubmissionDraft) -> BoxFuture<'_, DomainResult<()>> {
        let draft = draft.clone();
        let rows = self.rows.clone();
        Box::pin(async move {
            rows.write().await.insert(draft.member_id, draft);
            Ok(())
        })
    }

    fn remove(&self, member_id: i64) -> BoxFuture<'_, DomainResult<()>> {
        let rows = self.rows.clone();
        Box::pin(async move {
            rows.write().await.remove(&member_id);
            Ok(())
        })
    }
}

#[cfg(test)]
mod geo_repository_tests {
    use super::*;

    async fn seeded_backend() -> (MemoryBackend, i64, i64, i64, i64) {
        let backend = MemoryBackend::new();
        let repo = backend.geo_repo();
        let state = repo
            .insert_state(&StateUpsert {
                name: "Maharashtra".to_string(),
                code: "MH".to_string(),
            })
            .await
            .expect("state");
        let district = repo
            .insert_district(&DistrictUpsert {
                name: "Pune".to_string(),
                state_id: state.state_id,
            })
            .await
            .expect("district");
        let taluka = repo
            .insert_taluka(&TalukaUpsert {
                name: "Haveli".to_string(),
                district_id: district.district_id,
                state_id: state.state_id,
            })
            .await
            .expect("taluka");
        let city = repo
            .insert_city(&CityUpsert {
                name: "Pune City".to_string(),
                district_id: district.district_id,
                state_id: state.state_id,
            })
            .await
            .expect("city");
        (
            backend,
            state.state_id,
            district.district_id,
            taluka.taluka_id,
            city.city_id,
        )
    }

    #[tokio::test]
    async fn create_then_list_returns_exactly_one_and_duplicates_are_rejected() {
        let (backend, state_id, ..) = seeded_backend().await;
        let repo = backend.geo_repo();

        let err = repo
            .insert_district(&DistrictUpsert {
                name: "pune".to_string(),
                state_id,
            })
            .await
            .expect_err("sibling name collision");
        assert!(matches!(err, DomainError::DuplicateName));

        let districts = repo
            .list_districts(&GeoScope::for_state(state_id))
            .await
            .expect("list");
        assert_eq!(districts.len(), 1);
        assert_eq!(districts[0].name, "Pune");
    }

    #[tokio::test]
    async fn same_name_under_another_parent_is_allowed() {
        let (backend, ..) = seeded_backend().await;
        let repo = backend.geo_repo();
        let other_state = repo
            .insert_state(&StateUpsert {
                name: "Karnataka".to_string(),
                code: "KA".to_string(),
            })
            .await
            .expect("state");
        repo.insert_district(&DistrictUpsert {
            name: "Pune".to_string(),
            state_id: other_state.state_id,
        })
        .await
        .expect("same name in a different state");
    }

    #[tokio::test]
    async fn deleting_a_state_cascades_over_every_level() {
        let (backend, state_id, district_id, taluka_id, city_id) = seeded_backend().await;
        let repo = backend.geo_repo();

        let removed = repo
            .remove_cascading(GeoKind::State, state_id)
            .await
            .expect("cascade");
        assert_eq!(removed, 4);
        assert!(repo.get_district(district_id).await.expect("get").is_none());
        assert!(repo.get_taluka(taluka_id).await.expect("get").is_none());
        assert!(repo.get_city(city_id).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn deleting_a_district_leaves_siblings_untouched() {
        let (backend, state_id, district_id, ..) = seeded_backend().await;
        let repo = backend.geo_repo();
        let sibling = repo
            .insert_district(&DistrictUpsert {
                name: "Nashik".to_string(),
                state_id,
            })
            .await
            .expect("sibling");

        repo.remove_cascading(GeoKind::District, district_id)
            .await
            .expect("cascade");

        assert!(repo.get_state(state_id).await.expect("get").is_some());
        assert!(
            repo.get_district(sibling.district_id)
                .await
                .expect("get")
                .is_some()
        );
        let talukas = repo
            .list_talukas(&GeoScope::for_state(state_id))
            .await
            .expect("list");
        assert!(talukas.is_empty());
    }

    #[tokio::test]
    async fn deactivated_city_leaves_listings_but_stays_addressable() {
        let (backend, state_id, _, _, city_id) = seeded_backend().await;
        let repo = backend.geo_repo();

        repo.deactivate(GeoKind::City, city_id)
            .await
            .expect("deactivate");

        let cities = repo
            .list_cities(&GeoScope::for_state(state_id))
            .await
            .expect("list");
        assert!(cities.is_empty());

        let city = repo
            .get_city(city_id)
            .await
            .expect("get")
            .expect("row kept");
        assert!(!city.is_active);
    }

    #[tokio::test]
    async fn moving_a_district_updates_denormalized_child_state_ids() {
        let (backend, _, district_id, taluka_id, _) = seeded_backend().await;
        let repo = backend.geo_repo();
        let other_state = repo
            .insert_state(&StateUpsert {
                name: "Karnataka".to_string(),
                code: "KA".to_string(),
            })
            .await
            .expect("state");

        repo.update_district(
            district_id,
            &DistrictUpsert {
                name: "Pune".to_string(),
                state_id: other_state.state_id,
            },
        )
        .await
        .expect("move district");

        let taluka = repo
            .get_taluka(taluka_id)
            .await
            .expect("get")
            .expect("taluka kept");
        assert_eq!(taluka.state_id, other_state.state_id);
    }
}

#[cfg(test)]
mod profile_repository_tests {
    use super::*;
    use sanstha_domain::profile::{Phone, RegistrationDetail};

    async fn registered_member(backend: &MemoryBackend) -> i64 {
        let member = backend
            .member_repo()
            .insert(&Member {
                member_id: 0,
                organization_name: "Alpha Trust".to_string(),
                organization_type: None,
                contact_person: None,
                contact_phone: None,
                contact_email: None,
                status: MemberStatus::Active,
                membership_expiry_date: None,
                created_at_ms: 1,
                updated_at_ms: 1,
            })
            .await
            .expect("member");
        member.member_id
    }

    fn registration(member_id: i64, number: &str) -> RegistrationDetail {
        RegistrationDetail {
            member_id,
            registration_type: Some("society".to_string()),
            registration_number: Some(number.to_string()),
            registration_date: None,
            alternate_registration_number: None,
            alternate_registration_date: None,
            pan_number: None,
            gst_number: None,
            other_details: Vec::new(),
            updated_at_ms: 1,
        }
    }

    fn phone(member_id: i64, number: &str) -> Phone {
        Phone {
            member_id,
            label: None,
            number: number.to_string(),
            updated_at_ms: 1,
        }
    }

    #[tokio::test]
    async fn identical_saves_accumulate_no_duplicate_rows() {
        let backend = MemoryBackend::new();
        let member_id = registered_member(&backend).await;
        let repo = backend.profile_repo();

        let write = ProfileWrite {
            registration: Some(registration(member_id, "REG-1")),
            addresses: vec![Address {
                member_id,
                kind: AddressKind::Permanent,
                line1: "12 Station Road".to_string(),
                line2: None,
                state_id: 1,
                district_id: 2,
                taluka_id: None,
                city_id: None,
                postal_code: None,
                updated_at_ms: 1,
            }],
            ..ProfileWrite::default()
        };
        repo.save_sections(member_id, &write).await.expect("first");
        repo.save_sections(member_id, &write).await.expect("second");

        let view = repo
            .fetch_view(member_id)
            .await
            .expect("fetch")
            .expect("view");
        assert_eq!(
            view.registration.expect("registration").registration_number,
            Some("REG-1".to_string())
        );
        assert!(view.permanent_address.is_some());
    }

    #[tokio::test]
    async fn multi_entry_phone_list_collapses_to_the_last_entry() {
        let backend = MemoryBackend::new();
        let member_id = registered_member(&backend).await;
        let repo = backend.profile_repo();

        let write = ProfileWrite {
            phones: vec![phone(member_id, "022-1111"), phone(member_id, "98200-2222")],
            ..ProfileWrite::default()
        };
        repo.save_sections(member_id, &write).await.expect("save");

        let view = repo
            .fetch_view(member_id)
            .await
            .expect("fetch")
            .expect("view");
        assert_eq!(view.phones.len(), 1);
        assert_eq!(view.phones[0].number, "98200-2222");
    }

    #[tokio::test]
    async fn partial_save_leaves_other_sections_untouched() {
        let backend = MemoryBackend::new();
        let member_id = registered_member(&backend).await;
        let repo = backend.profile_repo();

        repo.save_sections(
            member_id,
            &ProfileWrite {
                registration: Some(registration(member_id, "Alpha")),
                addresses: vec![Address {
                    member_id,
                    kind: AddressKind::Permanent,
                    line1: "12 Station Road".to_string(),
                    line2: None,
                    state_id: 1,
                    district_id: 2,
                    taluka_id: None,
                    city_id: Some(7),
                    postal_code: None,
                    updated_at_ms: 1,
                }],
                ..ProfileWrite::default()
            },
        )
        .await
        .expect("full save");

        repo.save_sections(
            member_id,
            &ProfileWrite {
                registration: Some(registration(member_id, "Beta")),
                ..ProfileWrite::default()
            },
        )
        .await
        .expect("partial save");

        let view = repo
            .fetch_view(member_id)
            .await
            .expect("fetch")
            .expect("view");
        assert_eq!(
            view.registration.expect("registration").registration_number,
            Some("Beta".to_string())
        );
        assert_eq!(
            view.permanent_address.expect("address kept").city_id,
            Some(7)
        );
    }

    #[tokio::test]
    async fn expiry_sweep_moves_only_lapsed_active_members() {
        use time::macros::date;

        let backend = MemoryBackend::new();
        let repo = backend.member_repo();
        let template = Member {
            member_id: 0,
            organization_name: "Org".to_string(),
            organization_type: None,
            contact_person: None,
            contact_phone: None,
            contact_email: None,
            status: MemberStatus::Active,
            membership_expiry_date: Some(date!(2024 - 01 - 01)),
            created_at_ms: 1,
            updated_at_ms: 1,
        };
        let lapsed = repo.insert(&template).await.expect("lapsed");
        let current = repo
            .insert(&Member {
                membership_expiry_date: Some(date!(2026 - 01 - 01)),
                ..template.clone()
            })
            .await
            .expect("current");
        let suspended = repo
            .insert(&Member {
                status: MemberStatus::Suspended,
                ..template.clone()
            })
            .await
            .expect("suspended");

        let swept = repo
            .sweep_expired(date!(2025 - 06 - 01), 99)
            .await
            .expect("sweep");
        assert_eq!(swept, 1);

        let lapsed = repo.get(lapsed.member_id).await.expect("get").expect("row");
        assert_eq!(lapsed.status, MemberStatus::Inactive);
        let current = repo
            .get(current.member_id)
            .await
            .expect("get")
            .expect("row");
        assert_eq!(current.status, MemberStatus::Active);
        let suspended = repo
            .get(suspended.member_id)
            .await
            .expect("get")
            .expect("row");
        assert_eq!(suspended.status, MemberStatus::Suspended);
    }
}
