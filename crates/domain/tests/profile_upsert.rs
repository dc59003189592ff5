use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use sanstha_domain::error::DomainError;
use sanstha_domain::geo::{
    CityRecord, CityUpsert, DistrictRecord, DistrictUpsert, GeoKind, StateRecord, StateUpsert,
    TalukaRecord, TalukaUpsert,
};
use sanstha_domain::member::{Member, MemberStatus};
use sanstha_domain::ports::BoxFuture;
use sanstha_domain::ports::geo::{GeoRepository, GeoScope};
use sanstha_domain::ports::member::MemberRepository;
use sanstha_domain::ports::profile::ProfileRepository;
use sanstha_domain::profile::{
    AddressInput, AddressKind, PhoneInput, ProfileService, ProfileSubmission, ProfileWrite,
};
use sanstha_domain::view::ProfileView;
use sanstha_domain::DomainResult;
use time::Date;

struct FixedMemberRepository {
    known_id: i64,
}

impl MemberRepository for FixedMemberRepository {
    fn insert(&self, _member: &Member) -> BoxFuture<'_, DomainResult<Member>> {
        Box::pin(async { Err(DomainError::Persistence("read-only fixture".into())) })
    }

    fn get(&self, member_id: i64) -> BoxFuture<'_, DomainResult<Option<Member>>> {
        let known = member_id == self.known_id;
        Box::pin(async move {
            Ok(known.then(|| Member {
                member_id,
                organization_name: "Fixture Org".to_string(),
                organization_type: None,
                contact_person: None,
                contact_phone: None,
                contact_email: None,
                status: MemberStatus::Active,
                membership_expiry_date: None,
                created_at_ms: 0,
                updated_at_ms: 0,
            }))
        })
    }

    fn exists(&self, member_id: i64) -> BoxFuture<'_, DomainResult<bool>> {
        let known = member_id == self.known_id;
        Box::pin(async move { Ok(known) })
    }

    fn set_status(
        &self,
        _member_id: i64,
        _status: MemberStatus,
        _updated_at_ms: i64,
    ) -> BoxFuture<'_, DomainResult<Member>> {
        Box::pin(async { Err(DomainError::Persistence("read-only fixture".into())) })
    }

    fn sweep_expired(&self, _today: Date, _updated_at_ms: i64) -> BoxFuture<'_, DomainResult<u64>> {
        Box::pin(async { Ok(0) })
    }
}

/// One state (id 1) holding one district (id 10) holding taluka 100 and
/// city 200; district 11 belongs to a different state.
struct TinyHierarchy;

impl GeoRepository for TinyHierarchy {
    fn list_states(&self) -> BoxFuture<'_, DomainResult<Vec<StateRecord>>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn get_state(&self, state_id: i64) -> BoxFuture<'_, DomainResult<Option<StateRecord>>> {
        Box::pin(async move {
            Ok((state_id == 1 || state_id == 2).then(|| StateRecord {
                state_id,
                name: format!("state-{state_id}"),
                code: format!("S{state_id}"),
                is_active: true,
            }))
        })
    }

    fn insert_state(&self, _input: &StateUpsert) -> BoxFuture<'_, DomainResult<StateRecord>> {
        unimplemented!("fixture is read-only")
    }

    fn update_state(
        &self,
        _state_id: i64,
        _input: &StateUpsert,
    ) -> BoxFuture<'_, DomainResult<StateRecord>> {
        unimplemented!("fixture is read-only")
    }

    fn list_districts(&self, _scope: &GeoScope) -> BoxFuture<'_, DomainResult<Vec<DistrictRecord>>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn get_district(
        &self,
        district_id: i64,
    ) -> BoxFuture<'_, DomainResult<Option<DistrictRecord>>> {
        Box::pin(async move {
            let state_id = match district_id {
                10 => Some(1),
                11 => Some(2),
                _ => None,
            };
            Ok(state_id.map(|state_id| DistrictRecord {
                district_id,
                name: format!("district-{district_id}"),
                state_id,
                is_active: true,
            }))
        })
    }

    fn insert_district(
        &self,
        _input: &DistrictUpsert,
    ) -> BoxFuture<'_, DomainResult<DistrictRecord>> {
        unimplemented!("fixture is read-only")
    }

    fn update_district(
        &self,
        _district_id: i64,
        _input: &DistrictUpsert,
    ) -> BoxFuture<'_, DomainResult<DistrictRecord>> {
        unimplemented!("fixture is read-only")
    }

    fn list_talukas(&self, _scope: &GeoScope) -> BoxFuture<'_, DomainResult<Vec<TalukaRecord>>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn get_taluka(&self, taluka_id: i64) -> BoxFuture<'_, DomainResult<Option<TalukaRecord>>> {
        Box::pin(async move {
            Ok((taluka_id == 100).then(|| TalukaRecord {
                taluka_id,
                name: "taluka-100".to_string(),
                district_id: 10,
                state_id: 1,
                is_active: true,
            }))
        })
    }

    fn insert_taluka(&self, _input: &TalukaUpsert) -> BoxFuture<'_, DomainResult<TalukaRecord>> {
        unimplemented!("fixture is read-only")
    }

    fn update_taluka(
        &self,
        _taluka_id: i64,
        _input: &TalukaUpsert,
    ) -> BoxFuture<'_, DomainResult<TalukaRecord>> {
        unimplemented!("fixture is read-only")
    }

    fn list_cities(&self, _scope: &GeoScope) -> BoxFuture<'_, DomainResult<Vec<CityRecord>>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn get_city(&self, city_id: i64) -> BoxFuture<'_, DomainResult<Option<CityRecord>>> {
        Box::pin(async move {
            Ok((city_id == 200).then(|| CityRecord {
                city_id,
                name: "city-200".to_string(),
                district_id: 10,
                state_id: 1,
                is_active: false,
            }))
        })
    }

    fn insert_city(&self, _input: &CityUpsert) -> BoxFuture<'_, DomainResult<CityRecord>> {
        unimplemented!("fixture is read-only")
    }

    fn update_city(
        &self,
        _city_id: i64,
        _input: &CityUpsert,
    ) -> BoxFuture<'_, DomainResult<CityRecord>> {
        unimplemented!("fixture is read-only")
    }

    fn remove_cascading(&self, _kind: GeoKind, _id: i64) -> BoxFuture<'_, DomainResult<u64>> {
        unimplemented!("fixture is read-only")
    }

    fn deactivate(&self, _kind: GeoKind, _id: i64) -> BoxFuture<'_, DomainResult<()>> {
        unimplemented!("fixture is read-only")
    }
}

#[derive(Default)]
struct RecordingProfileRepository {
    saves: AtomicUsize,
    fail_next: AtomicBool,
}

impl ProfileRepository for RecordingProfileRepository {
    fn save_sections(
        &self,
        _member_id: i64,
        _write: &ProfileWrite,
    ) -> BoxFuture<'_, DomainResult<()>> {
        let fail = self.fail_next.swap(false, Ordering::SeqCst);
        if !fail {
            self.saves.fetch_add(1, Ordering::SeqCst);
        }
        Box::pin(async move {
            if fail {
                Err(DomainError::Persistence("injected failure".into()))
            } else {
                Ok(())
            }
        })
    }

    fn fetch_view(&self, _member_id: i64) -> BoxFuture<'_, DomainResult<Option<ProfileView>>> {
        Box::pin(async { Ok(None) })
    }

    fn list_views(&self) -> BoxFuture<'_, DomainResult<Vec<ProfileView>>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

fn service(profiles: Arc<RecordingProfileRepository>) -> ProfileService {
    ProfileService::new(
        Arc::new(FixedMemberRepository { known_id: 42 }),
        Arc::new(TinyHierarchy),
        profiles,
    )
}

fn address(district_id: i64, taluka_id: Option<i64>, city_id: Option<i64>) -> AddressInput {
    AddressInput {
        kind: AddressKind::Permanent,
        line1: "12 Station Road".to_string(),
        line2: None,
        state_id: 1,
        district_id,
        taluka_id,
        city_id,
        postal_code: Some("400001".to_string()),
    }
}

#[tokio::test]
async fn unknown_member_short_circuits_before_any_write() {
    let profiles = Arc::new(RecordingProfileRepository::default());
    let service = service(profiles.clone());

    let submission = ProfileSubmission {
        phones: vec![PhoneInput {
            label: None,
            number: "022-1111".to_string(),
        }],
        ..ProfileSubmission::default()
    };
    let err = service.save(99, submission).await.expect_err("must fail");
    assert!(matches!(err, DomainError::MemberNotFound));
    assert_eq!(profiles.saves.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn district_outside_state_fails_with_no_write() {
    let profiles = Arc::new(RecordingProfileRepository::default());
    let service = service(profiles.clone());

    let submission = ProfileSubmission {
        addresses: vec![address(11, None, None)],
        ..ProfileSubmission::default()
    };
    let err = service.save(42, submission).await.expect_err("must fail");
    assert!(matches!(err, DomainError::Validation(_)));
    assert_eq!(profiles.saves.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn city_outside_district_fails_with_no_write() {
    let profiles = Arc::new(RecordingProfileRepository::default());
    let service = service(profiles.clone());

    let submission = ProfileSubmission {
        addresses: vec![AddressInput {
            state_id: 2,
            ..address(11, None, Some(200))
        }],
        ..ProfileSubmission::default()
    };
    let err = service.save(42, submission).await.expect_err("must fail");
    assert!(matches!(err, DomainError::Validation(_)));
    assert_eq!(profiles.saves.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn deactivated_city_in_its_district_stays_a_valid_reference() {
    let profiles = Arc::new(RecordingProfileRepository::default());
    let service = service(profiles.clone());

    let submission = ProfileSubmission {
        addresses: vec![address(10, Some(100), Some(200))],
        ..ProfileSubmission::default()
    };
    service.save(42, submission).await.expect("save succeeds");
    assert_eq!(profiles.saves.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn storage_failure_surfaces_as_persistence() {
    let profiles = Arc::new(RecordingProfileRepository::default());
    profiles.fail_next.store(true, Ordering::SeqCst);
    let service = service(profiles.clone());

    let submission = ProfileSubmission {
        phones: vec![PhoneInput {
            label: None,
            number: "022-1111".to_string(),
        }],
        ..ProfileSubmission::default()
    };
    let err = service.save(42, submission).await.expect_err("must fail");
    assert!(matches!(err, DomainError::Persistence(_)));
    assert_eq!(profiles.saves.load(Ordering::SeqCst), 0);
}
