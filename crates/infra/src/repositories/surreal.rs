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
use surrealdb::{
    Surreal,
    engine::remote::ws::{Client, Ws},
    opt::auth::Root,
};
use time::{Date, macros::format_description};

use crate::db::DbConfig;

pub async fn connect_client(db_config: &DbConfig) -> anyhow::Result<Arc<Surreal<Client>>> {
    let db = Surreal::<Client>::init();
    db.connect::<Ws>(&db_config.endpoint).await?;
    db.signin(Root {
        username: &db_config.username,
        password: &db_config.password,
    })
    .await?;
    db.use_ns(&db_config.namespace)
        .use_db(&db_config.database)
        .await?;
    Ok(Arc::new(db))
}

fn map_surreal_error(err: surrealdb::Error) -> DomainError {
    let message = err.to_string().to_lowercase();
    if message.contains("duplicate_name")
        || message.contains("already exists")
        || message.contains("unique")
    {
        return DomainError::DuplicateName;
    }
    if message.contains("not_found") {
        return DomainError::NotFound;
    }
    DomainError::Persistence(format!("surreal query failed: {message}"))
}

async fn next_id(client: &Surreal<Client>, sequence: &str) -> DomainResult<i64> {
    let mut response = client
        .query("UPSERT type::thing('seq', $sequence) SET value += 1 RETURN VALUE value;")
        .bind(("sequence", sequence.to_string()))
        .await
        .map_err(map_surreal_error)?;
    let value: Option<i64> = response.take(0).map_err(map_surreal_error)?;
    value.ok_or_else(|| DomainError::Persistence("sequence allocation returned nothing".into()))
}

fn format_date(date: Date) -> DomainResult<String> {
    date.format(&format_description!("[year]-[month]-[day]"))
        .map_err(|err| DomainError::Persistence(format!("unformattable date: {err}")))
}

#[derive(Clone)]
pub struct SurrealMemberRepository {
    client: Arc<Surreal<Client>>,
}

impl SurrealMemberRepository {
    pub fn with_client(client: Arc<Surreal<Client>>) -> Self {
        Self { client }
    }

    pub async fn new(db_config: &DbConfig) -> anyhow::Result<Self> {
        Ok(Self::with_client(connect_client(db_config).await?))
    }
}

impl MemberRepository for SurrealMemberRepository {
    fn insert(&self, member: &Member) -> BoxFuture<'_, DomainResult<Member>> {
        let member = member.clone();
        let client = self.client.clone();
        Box::pin(async move {
            let member_id = next_id(&client, "member").await?;
            let record = Member { member_id, ..member };
            client
                .query("CREATE type::thing('member', $member_id) CONTENT $member;")
                .bind(("member_id", member_id))
                .bind(("member", record.clone()))
                .await
                .map_err(map_surreal_error)?
                .check()
                .map_err(map_surreal_error)?;
            Ok(record)
        })
    }

    fn get(&self, member_id: i64) -> BoxFuture<'_, DomainResult<Option<Member>>> {
        let client = self.client.clone();
        Box::pin(async move {
            let mut response = client
                .query("SELECT * FROM type::thing('member', $member_id);")
                .bind(("member_id", member_id))
                .await
                .map_err(map_surreal_error)?;
            response.take(0).map_err(map_surreal_error)
        })
    }

    fn exists(&self, member_id: i64) -> BoxFuture<'_, DomainResult<bool>> {
        let client = self.client.clone();
        Box::pin(async move {
            let mut response = client
                .query("RETURN record::exists(type::thing('member', $member_id));")
                .bind(("member_id", member_id))
                .await
                .map_err(map_surreal_error)?;
            let exists: Option<bool> = response.take(0).map_err(map_surreal_error)?;
            Ok(exists.unwrap_or(false))
        })
    }

    fn set_status(
        &self,
        member_id: i64,
        status: MemberStatus,
        updated_at_ms: i64,
    ) -> BoxFuture<'_, DomainResult<Member>> {
        let client = self.client.clone();
        Box::pin(async move {
            let mut response = client
                .query(
                    "UPDATE type::thing('member', $member_id) \
                     SET status = $status, updated_at_ms = $updated_at_ms RETURN AFTER;",
                )
                .bind(("member_id", member_id))
                .bind(("status", status))
                .bind(("updated_at_ms", updated_at_ms))
                .await
                .map_err(map_surreal_error)?;
            let member: Option<Member> = response.take(0).map_err(map_surreal_error)?;
            member.ok_or(DomainError::NotFound)
        })
    }

    fn sweep_expired(&self, today: Date, updated_at_ms: i64) -> BoxFuture<'_, DomainResult<u64>> {
        let client = self.client.clone();
        Box::pin(async move {
            let today = format_date(today)?;
            let mut response = client
                .query(
                    "UPDATE member \
                     SET status = 'inactive', updated_at_ms = $updated_at_ms \
                     WHERE status = 'active' \
                       AND membership_expiry_date != NONE \
                       AND membership_expiry_date != NULL \
                       AND membership_expiry_date < $today \
                     RETURN AFTER;",
                )
                .bind(("today", today))
                .bind(("updated_at_ms", updated_at_ms))
                .await
                .map_err(map_surreal_error)?;
            let swept: Vec<Member> = response.take(0).map_err(map_surreal_error)?;
            Ok(swept.len() as u64)
        })
    }
}

#[derive(Clone)]
pub struct SurrealGeoRepository {
    client: Arc<Surreal<Client>>,
}

impl SurrealGeoRepository {
    pub fn with_client(client: Arc<Surreal<Client>>) -> Self {
        Self { client }
    }

    pub async fn new(db_config: &DbConfig) -> anyhow::Result<Self> {
        Ok(Self::with_client(connect_client(db_config).await?))
    }

    async fn fetch<T>(&self, table: &'static str, id: i64) -> DomainResult<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut response = self
            .client
            .query("SELECT * FROM type::thing($table, $id);")
            .bind(("table", table))
            .bind(("id", id))
            .await
            .map_err(map_surreal_error)?;
        response.take(0).map_err(map_surreal_error)
    }
}

impl GeoRepository for SurrealGeoRepository {
    fn list_states(&self) -> BoxFuture<'_, DomainResult<Vec<StateRecord>>> {
        let client = self.client.clone();
        Box::pin(async move {
            let mut response = client
                .query("SELECT * FROM state WHERE is_active = true ORDER BY name ASC;")
                .await
                .map_err(map_surreal_error)?;
            response.take(0).map_err(map_surreal_error)
        })
    }

    fn get_state(&self, state_id: i64) -> BoxFuture<'_, DomainResult<Option<StateRecord>>> {
        Box::pin(self.fetch("state", state_id))
    }

    fn insert_state(&self, input: &StateUpsert) -> BoxFuture<'_, DomainResult<StateRecord>> {
        let input = input.clone();
        let client = self.client.clone();
        Box::pin(async move {
            let state_id = next_id(&client, "geo").await?;
            let record = StateRecord {
                state_id,
                name: input.name,
                code: input.code,
                is_active: true,
            };
            client
                .query(
                    "BEGIN TRANSACTION; \
                     LET $dupes = (SELECT VALUE id FROM state \
                       WHERE string::lowercase(name) = string::lowercase($record.name) \
                          OR string::lowercase(code) = string::lowercase($record.code)); \
                     IF array::len($dupes) > 0 { THROW \"duplicate_name\"; }; \
                     CREATE type::thing('state', $state_id) CONTENT $record; \
                     COMMIT TRANSACTION;",
                )
                .bind(("state_id", state_id))
                .bind(("record", record.clone()))
                .await
                .map_err(map_surreal_error)?
                .check()
                .map_err(map_surreal_error)?;
            Ok(record)
        })
    }

    fn update_state(
        &self,
        state_id: i64,
        input: &StateUpsert,
    ) -> BoxFuture<'_, DomainResult<StateRecord>> {
        let input = input.clone();
        let client = self.client.clone();
        Box::pin(async move {
            client
                .query(
                    "BEGIN TRANSACTION; \
                     IF !record::exists(type::thing('state', $state_id)) { THROW \"not_found\"; }; \
                     LET $dupes = (SELECT VALUE id FROM state \
                       WHERE id != type::thing('state', $state_id) \
                         AND (string::lowercase(name) = string::lowercase($name) \
                           OR string::lowercase(code) = string::lowercase($code))); \
                     IF array::len($dupes) > 0 { THROW \"duplicate_name\"; }; \
                     UPDATE type::thing('state', $state_id) SET name = $name, code = $code; \
                     COMMIT TRANSACTION;",
                )
                .bind(("state_id", state_id))
                .bind(("name", input.name))
                .bind(("code", input.code))
                .await
                .map_err(map_surreal_error)?
                .check()
                .map_err(map_surreal_error)?;
            let repository = SurrealGeoRepository {
                client: client.clone(),
            };
            let record: Option<StateRecord> = repository.fetch("state", state_id).await?;
            record.ok_or(DomainError::NotFound)
        })
    }

    fn list_districts(&self, scope: &GeoScope) -> BoxFuture<'_, DomainResult<Vec<DistrictRecord>>> {
        let scope = *scope;
        let client = self.client.clone();
        Box::pin(async move {
            let mut statement =
                String::from("SELECT * FROM district WHERE is_active = true");
            if scope.state_id.is_some() {
                statement.push_str(" AND state_id = $state_id");
            }
            statement.push_str(" ORDER BY name ASC;");
            let mut query = client.query(statement);
            if let Some(state_id) = scope.state_id {
                query = query.bind(("state_id", state_id));
            }
            let mut response = query.await.map_err(map_surreal_error)?;
            response.take(0).map_err(map_surreal_error)
        })
    }

    fn get_district(
        &self,
        district_id: i64,
    ) -> BoxFuture<'_, DomainResult<Option<DistrictRecord>>> {
        Box::pin(self.fetch("district", district_id))
    }

    fn insert_district(
        &self,
        input: &DistrictUpsert,
    ) -> BoxFuture<'_, DomainResult<DistrictRecord>> {
        let input = input.clone();
        let client = self.client.clone();
        Box::pin(async move {
            let district_id = next_id(&client, "geo").await?;
            let record = DistrictRecord {
                district_id,
                name: input.name,
                state_id: input.state_id,
                is_active: true,
            };
            client
                .query(
                    "BEGIN TRANSACTION; \
                     LET $dupes = (SELECT VALUE id FROM district \
                       WHERE state_id = $record.state_id \
                         AND string::lowercase(name) = string::lowercase($record.name)); \
                     IF array::len($dupes) > 0 { THROW \"duplicate_name\"; }; \
                     CREATE type::thing('district', $district_id) CONTENT $record; \
                     COMMIT TRANSACTION;",
                )
                .bind(("district_id", district_id))
                .bind(("record", record.clone()))
                .await
                .map_err(map_surreal_error)?
                .check()
                .map_err(map_surreal_error)?;
            Ok(record)
        })
    }

    fn update_district(
        &self,
        district_id: i64,
        input: &DistrictUpsert,
    ) -> BoxFuture<'_, DomainResult<DistrictRecord>> {
        let input = input.clone();
        let client = self.client.clone();
        Box::pin(async move {
            client
                .query(
                    "BEGIN TRANSACTION; \
                     IF !record::exists(type::thing('district', $district_id)) { THROW \"not_found\"; }; \
                     LET $dupes = (SELECT VALUE id FROM district \
                       WHERE id != type::thing('district', $district_id) \
                         AND state_id = $state_id \
                         AND string::lowercase(name) = string::lowercase($name)); \
                     IF array::len($dupes) > 0 { THROW \"duplicate_name\"; }; \
                     UPDATE type::thing('district', $district_id) SET name = $name, state_id = $state_id; \
                     UPDATE taluka SET state_id = $state_id WHERE district_id = $district_id; \
                     UPDATE city SET state_id = $state_id WHERE district_id = $district_id; \
                     COMMIT TRANSACTION;",
                )
                .bind(("district_id", district_id))
                .bind(("name", input.name))
                .bind(("state_id", input.state_id))
                .await
                .map_err(map_surreal_error)?
                .check()
                .map_err(map_surreal_error)?;
            let repository = SurrealGeoRepository {
                client: client.clone(),
            };
            let record: Option<DistrictRecord> = repository.fetch("district", district_id).await?;
            record.ok_or(DomainError::NotFound)
        })
    }

    fn list_talukas(&self, scope: &GeoScope) -> BoxFuture<'_, DomainResult<Vec<TalukaRecord>>> {
        let scope = *scope;
        let client = self.client.clone();
        Box::pin(async move {
            let mut statement = String::from("SELECT * FROM taluka WHERE is_active = true");
            if scope.state_id.is_some() {
                statement.push_str(" AND state_id = $state_id");
            }
            if scope.district_id.is_some() {
                statement.push_str(" AND district_id = $district_id");
            }
            statement.push_str(" ORDER BY name ASC;");
            let mut query = client.query(statement);
            if let Some(state_id) = scope.state_id {
                query = query.bind(("state_id", state_id));
            }
            if let Some(district_id) = scope.district_id {
                query = query.bind(("district_id", district_id));
            }
            let mut response = query.await.map_err(map_surreal_error)?;
            response.take(0).map_err(map_surreal_error)
        })
    }

    fn get_taluka(&self, taluka_id: i64) -> BoxFuture<'_, DomainResult<Option<TalukaRecord>>> {
        Box::pin(self.fetch("taluka", taluka_id))
    }

    fn insert_taluka(&self, input: &TalukaUpsert) -> BoxFuture<'_, DomainResult<TalukaRecord>> {
        let input = input.clone();
        let client = self.client.clone();
        Box::pin(async move {
            let taluka_id = next_id(&client, "geo").await?;
            let record = TalukaRecord {
                taluka_id,
                name: input.name,
                district_id: input.district_id,
                state_id: input.state_id,
                is_active: true,
            };
            client
                .query(
                    "BEGIN TRANSACTION; \
                     LET $dupes = (SELECT VALUE id FROM taluka \
                       WHERE district_id = $record.district_id \
                         AND string::lowercase(name) = string::lowercase($record.name)); \
                     IF array::len($dupes) > 0 { THROW \"duplicate_name\"; }; \
                     CREATE type::thing('taluka', $taluka_id) CONTENT $record; \
                     COMMIT TRANSACTION;",
                )
                .bind(("taluka_id", taluka_id))
                .bind(("record", record.clone()))
                .await
                .map_err(map_surreal_error)?
                .check()
                .map_err(map_surreal_error)?;
            Ok(record)
        })
    }

    fn update_taluka(
        &self,
        taluka_id: i64,
        input: &TalukaUpsert,
    ) -> BoxFuture<'_, DomainResult<TalukaRecord>> {
        let input = input.clone();
        let client = self.client.clone();
        Box::pin(async move {
            client
                .query(
                    "BEGIN TRANSACTION; \
                     IF !record::exists(type::thing('taluka', $taluka_id)) { THROW \"not_found\"; }; \
                     LET $dupes = (SELECT VALUE id FROM taluka \
                       WHERE id != type::thing('taluka', $taluka_id) \
                         AND district_id = $district_id \
                         AND string::lowercase(name) = string::lowercase($name)); \
                     IF array::len($dupes) > 0 { THROW \"duplicate_name\"; }; \
                     UPDATE type::thing('taluka', $taluka_id) \
                       SET name = $name, district_id = $district_id, state_id = $state_id; \
                     COMMIT TRANSACTION;",
                )
                .bind(("taluka_id", taluka_id))
                .bind(("name", input.name))
                .bind(("district_id", input.district_id))
                .bind(("state_id", input.state_id))
                .await
                .map_err(map_surreal_error)?
                .check()
                .map_err(map_surreal_error)?;
            let repository = SurrealGeoRepository {
                client: client.clone(),
            };
            let record: Option<TalukaRecord> = repository.fetch("taluka", taluka_id).await?;
            record.ok_or(DomainError::NotFound)
        })
    }

    fn list_cities(&self, scope: &GeoScope) -> BoxFuture<'_, DomainResult<Vec<CityRecord>>> {
        let scope = *scope;
        let client = self.client.clone();
        Box::pin(async move {
            let mut statement = String::from("SELECT * FROM city WHERE is_active = true");
            if scope.state_id.is_some() {
                statement.push_str(" AND state_id = $state_id");
            }
            if scope.district_id.is_some() {
                statement.push_str(" AND district_id = $district_id");
            }
            statement.push_str(" ORDER BY name ASC;");
            let mut query = client.query(statement);
            if let Some(state_id) = scope.state_id {
                query = query.bind(("state_id", state_id));
            }
            if let Some(district_id) = scope.district_id {
                query = query.bind(("district_id", district_id));
            }
            let mut response = query.await.map_err(map_surreal_error)?;
            response.take(0).map_err(map_surreal_error)
        })
    }

    fn get_city(&self, city_id: i64) -> BoxFuture<'_, DomainResult<Option<CityRecord>>> {
        Box::pin(self.fetch("city", city_id))
    }

    fn insert_city(&self, input: &CityUpsert) -> BoxFuture<'_, DomainResult<CityRecord>> {
        let input = input.clone();
        let client = self.client.clone();
        Box::pin(async move {
            let city_id = next_id(&client, "geo").await?;
            let record = CityRecord {
                city_id,
                name: input.name,
                district_id: input.district_id,
                state_id: input.state_id,
                is_active: true,
            };
            client
                .query(
                    "BEGIN TRANSACTION; \
                     LET $dupes = (SELECT VALUE id FROM city \
                       WHERE district_id = $record.district_id \
                         AND string::lowercase(name) = string::lowercase($record.name)); \
                     IF array::len($dupes) > 0 { THROW \"duplicate_name\"; }; \
                     CREATE type::thing('city', $city_id) CONTENT $record; \
                     COMMIT TRANSACTION;",
                )
                .bind(("city_id", city_id))
                .bind(("record", record.clone()))
                .await
                .map_err(map_surreal_error)?
                .check()
                .map_err(map_surreal_error)?;
            Ok(record)
        })
    }

    fn update_city(
        &self,
        city_id: i64,
        input: &CityUpsert,
    ) -> BoxFuture<'_, DomainResult<CityRecord>> {
        let input = input.clone();
        let client = self.client.clone();
        Box::pin(async move {
            client
                .query(
                    "BEGIN TRANSACTION; \
                     IF !record::exists(type::thing('city', $city_id)) { THROW \"not_found\"; }; \
                     LET $dupes = (SELECT VALUE id FROM city \
                       WHERE id != type::thing('city', $city_id) \
                         AND district_id = $district_id \
                         AND string::lowercase(name) = string::lowercase($name)); \
                     IF array::len($dupes) > 0 { THROW \"duplicate_name\"; }; \
                     UPDATE type::thing('city', $city_id) \
                       SET name = $name, district_id = $district_id, state_id = $state_id; \
                     COMMIT TRANSACTION;",
                )
                .bind(("city_id", city_id))
                .bind(("name", input.name))
                .bind(("district_id", input.district_id))
                .bind(("state_id", input.state_id))
                .await
                .map_err(map_surreal_error)?
                .check()
                .map_err(map_surreal_error)?;
            let repository = SurrealGeoRepository {
                client: client.clone(),
            };
            let record: Option<CityRecord> = repository.fetch("city", city_id).await?;
            record.ok_or(DomainError::NotFound)
        })
    }

    fn remove_cascading(&self, kind: GeoKind, id: i64) -> BoxFuture<'_, DomainResult<u64>> {
        let client = self.client.clone();
        Box::pin(async move {
            let (count_statement, delete_statement) = match kind {
                GeoKind::State => (
                    "RETURN count(SELECT 1 FROM city WHERE state_id = $id) \
                       + count(SELECT 1 FROM taluka WHERE state_id = $id) \
                       + count(SELECT 1 FROM district WHERE state_id = $id);",
                    "BEGIN TRANSACTION; \
                     IF !record::exists(type::thing('state', $id)) { THROW \"not_found\"; }; \
                     DELETE city WHERE state_id = $id; \
                     DELETE taluka WHERE state_id = $id; \
                     DELETE district WHERE state_id = $id; \
                     DELETE type::thing('state', $id); \
                     COMMIT TRANSACTION;",
                ),
                GeoKind::District => (
                    "RETURN count(SELECT 1 FROM city WHERE district_id = $id) \
                       + count(SELECT 1 FROM taluka WHERE district_id = $id);",
                    "BEGIN TRANSACTION; \
                     IF !record::exists(type::thing('district', $id)) { THROW \"not_found\"; }; \
                     DELETE city WHERE district_id = $id; \
                     DELETE taluka WHERE district_id = $id; \
                     DELETE type::thing('district', $id); \
                     COMMIT TRANSACTION;",
                ),
                GeoKind::Taluka => (
                    "RETURN 0;",
                    "BEGIN TRANSACTION; \
                     IF !record::exists(type::thing('taluka', $id)) { THROW \"not_found\"; }; \
                     DELETE type::thing('taluka', $id); \
                     COMMIT TRANSACTION;",
                ),
                GeoKind::City => (
                    "RETURN 0;",
                    "BEGIN TRANSACTION; \
                     IF !record::exists(type::thing('city', $id)) { THROW \"not_found\"; }; \
                     DELETE type::thing('city', $id); \
                     COMMIT TRANSACTION;",
                ),
            };

            let mut response = client
                .query(count_statement)
                .bind(("id", id))
                .await
                .map_err(map_surreal_error)?;
            let descendants: Option<i64> = response.take(0).map_err(map_surreal_error)?;

            client
                .query(delete_statement)
                .bind(("id", id))
                .await
                .map_err(map_surreal_error)?
                .check()
                .map_err(map_surreal_error)?;

            Ok(descendants.unwrap_or(0).max(0) as u64 + 1)
        })
    }

    fn deactivate(&self, kind: GeoKind, id: i64) -> BoxFuture<'_, DomainResult<()>> {
        let client = self.client.clone();
        Box::pin(async move {
            let table = match kind {
                GeoKind::State => "state",
                GeoKind::District => "district",
                GeoKind::Taluka => "taluka",
                GeoKind::City => "city",
            };
            let mut response = client
                .query("UPDATE type::thing($table, $id) SET is_active = false RETURN AFTER;")
                .bind(("table", table))
                .bind(("id", id))
                .await
                .map_err(map_surreal_error)?;
            let updated: Option<serde_json::Value> = response.take(0).map_err(map_surreal_error)?;
            updated.map(|_| ()).ok_or(DomainError::NotFound)
        })
    }
}

#[derive(Clone)]
pub struct SurrealProfileRepository {
    client: Arc<Surreal<Client>>,
}

impl SurrealProfileRepository {
    pub fn with_client(client: Arc<Surreal<Client>>) -> Self {
        Self { client }
    }

    pub async fn new(db_config: &DbConfig) -> anyhow::Result<Self> {
        Ok(Self::with_client(connect_client(db_config).await?))
    }
}

impl ProfileRepository for SurrealProfileRepository {
    fn save_sections(
        &self,
        member_id: i64,
        write: &ProfileWrite,
    ) -> BoxFuture<'_, DomainResult<()>> {
        let write = write.clone();
        let client = self.client.clone();
        Box::pin(async move {
            client
                .query(
                    "BEGIN TRANSACTION; \
                     IF $registration != NONE AND $registration != NULL { \
                       UPSERT type::thing('registration_detail', $member_id) CONTENT $registration; \
                     }; \
                     FOR $address IN $addresses { \
                       UPSERT type::thing('address', [$member_id, $address.kind]) CONTENT $address; \
                     }; \
                     FOR $phone IN $phones { \
                       UPSERT type::thing('phone', $member_id) CONTENT $phone; \
                     }; \
                     FOR $email IN $emails { \
                       UPSERT type::thing('email', $member_id) CONTENT $email; \
                     }; \
                     FOR $link IN $social_links { \
                       UPSERT type::thing('social_link', $member_id) CONTENT $link; \
                     }; \
                     FOR $contact IN $key_contacts { \
                       UPSERT type::thing('key_contact', $member_id) CONTENT $contact; \
                     }; \
                     FOR $certification IN $certifications { \
                       UPSERT type::thing('certification_detail', $member_id) CONTENT $certification; \
                     }; \
                     COMMIT TRANSACTION;",
                )
                .bind(("member_id", member_id))
                .bind(("registration", write.registration))
                .bind(("addresses", write.addresses))
                .bind(("phones", write.phones))
                .bind(("emails", write.emails))
                .bind(("social_links", write.social_links))
                .bind(("key_contacts", write.key_contacts))
                .bind(("certifications", write.certifications))
                .await
                .map_err(map_surreal_error)?
                .check()
                .map_err(map_surreal_error)?;
            Ok(())
        })
    }

    fn fetch_view(&self, member_id: i64) -> BoxFuture<'_, DomainResult<Option<ProfileView>>> {
        let client = self.client.clone();
        Box::pin(async move {
            let mut response = client
                .query("SELECT * FROM type::thing('member', $member_id);")
                .query("SELECT * FROM type::thing('registration_detail', $member_id);")
                .query("SELECT * FROM type::thing('certification_detail', $member_id);")
                .query("SELECT * FROM type::thing('address', [$member_id, 'permanent']);")
                .query("SELECT * FROM type::thing('phone', $member_id);")
                .query("SELECT * FROM type::thing('email', $member_id);")
                .query("SELECT * FROM type::thing('social_link', $member_id);")
                .query("SELECT * FROM type::thing('key_contact', $member_id);")
                .bind(("member_id", member_id))
                .await
                .map_err(map_surreal_error)?;

            let member: Option<Member> = response.take(0).map_err(map_surreal_error)?;
            let Some(member) = member else {
                return Ok(None);
            };
            let registration: Option<RegistrationDetail> =
                response.take(1).map_err(map_surreal_error)?;
            let certification: Option<CertificationDetail> =
                response.take(2).map_err(map_surreal_error)?;
            let permanent_address: Option<Address> = response.take(3).map_err(map_surreal_error)?;
            let phone: Option<Phone> = response.take(4).map_err(map_surreal_error)?;
            let email: Option<Email> = response.take(5).map_err(map_surreal_error)?;
            let social_link: Option<SocialLink> = response.take(6).map_err(map_surreal_error)?;
            let key_contact: Option<KeyContact> = response.take(7).map_err(map_surreal_error)?;

            Ok(Some(ProfileView {
                member,
                registration,
                certification,
                permanent_address,
                phones: phone.into_iter().collect(),
                emails: email.into_iter().collect(),
                social_links: social_link.into_iter().collect(),
                key_contacts: key_contact.into_iter().collect(),
            }))
        })
    }

    fn list_views(&self) -> BoxFuture<'_, DomainResult<Vec<ProfileView>>> {
        let client = self.client.clone();
        Box::pin(async move {
            let mut response = client
                .query("SELECT * FROM member;")
                .query("SELECT * FROM registration_detail;")
                .query("SELECT * FROM certification_detail;")
                .query("SELECT * FROM address WHERE kind = 'permanent';")
                .query("SELECT * FROM phone;")
                .query("SELECT * FROM email;")
                .query("SELECT * FROM social_link;")
                .query("SELECT * FROM key_contact;")
                .await
                .map_err(map_surreal_error)?;

            let members: Vec<Member> = response.take(0).map_err(map_surreal_error)?;
            let registrations: Vec<RegistrationDetail> =
                response.take(1).map_err(map_surreal_error)?;
            let certifications: Vec<CertificationDetail> =
                response.take(2).map_err(map_surreal_error)?;
            let addresses: Vec<Address> = response.take(3).map_err(map_surreal_error)?;
            let phones: Vec<Phone> = response.take(4).map_err(map_surreal_error)?;
            let emails: Vec<Email> = response.take(5).map_err(map_surreal_error)?;
            let social_links: Vec<SocialLink> = response.take(6).map_err(map_surreal_error)?;
            let key_contacts: Vec<KeyContact> = response.take(7).map_err(map_surreal_error)?;

            let registrations: std::collections::HashMap<i64, RegistrationDetail> = registrations
                .into_iter()
                .map(|row| (row.member_id, row))
                .collect();
            let certifications: std::collections::HashMap<i64, CertificationDetail> =
                certifications
                    .into_iter()
                    .map(|row| (row.member_id, row))
                    .collect();
            let addresses: std::collections::HashMap<i64, Address> = addresses
                .into_iter()
                .filter(|row| row.kind == AddressKind::Permanent)
                .map(|row| (row.member_id, row))
                .collect();
            let phones: std::collections::HashMap<i64, Phone> =
                phones.into_iter().map(|row| (row.member_id, row)).collect();
            let emails: std::collections::HashMap<i64, Email> =
                emails.into_iter().map(|row| (row.member_id, row)).collect();
            let social_links: std::collections::HashMap<i64, SocialLink> = social_links
                .into_iter()
                .map(|row| (row.member_id, row))
                .collect();
            let key_contacts: std::collections::HashMap<i64, KeyContact> = key_contacts
                .into_iter()
                .map(|row| (row.member_id, row))
                .collect();

            Ok(members
                .into_iter()
                .map(|member| {
                    let member_id = member.member_id;
                    ProfileView {
                        member,
                        registration: registrations.get(&member_id).cloned(),
                        certification: certifications.get(&member_id).cloned(),
                        permanent_address: addresses.get(&member_id).cloned(),
                        phones: phones.get(&member_id).cloned().into_iter().collect(),
                        emails: emails.get(&member_id).cloned().into_iter().collect(),
                        social_links: social_links.get(&member_id).cloned().into_iter().collect(),
                        key_contacts: key_contacts.get(&member_id).cloned().into_iter().collect(),
                    }
                })
                .collect())
        })
    }
}

#[derive(Clone)]
pub struct SurrealDraftRepository {
    client: Arc<Surreal<Client>>,
}

impl SurrealDraftRepository {
    pub fn with_client(client: Arc<Surreal<Client>>) -> Self {
        Self { client }
    }

    pub async fn new(db_config: &DbConfig) -> anyhow::Result<Self> {
        Ok(Self::with_client(connect_client(db_config).await?))
    }
}

impl DraftRepository for SurrealDraftRepository {
    fn get(&self, member_id: i64) -> BoxFuture<'_, DomainResult<Option<SubmissionDraft>>> {
        let client = self.client.clone();
        Box::pin(async move {
            let mut response = client
                .query("SELECT * FROM type::thing('submission_draft', $member_id);")
                .bind(("member_id", member_id))
                .await
                .map_err(map_surreal_error)?;
            response.take(0).map_err(map_surreal_error)
        })
    }

    fn put(&self, draft: &SubmissionDraft) -> BoxFuture<'_, DomainResult<()>> {
        let draft = draft.clone();
        let client = self.client.clone();
        Box::pin(async move {
            client
                .query("UPSERT type::thing('submission_draft', $member_id) CONTENT $draft;")
                .bind(("member_id", draft.member_id))
                .bind(("draft", draft.clone()))
                .await
                .map_err(map_surreal_error)?
                .check()
                .map_err(map_surreal_error)?;
            Ok(())
        })
    }

    fn remove(&self, member_id: i64) -> BoxFuture<'_, DomainResult<()>> {
        let client = self.client.clone();
        Box::pin(async move {
            client
                .query("DELETE type::thing('submission_draft', $member_id);")
                .bind(("member_id", member_id))
                .await
                .map_err(map_surreal_error)?
                .check()
                .map_err(map_surreal_error)?;
            Ok(())
        })
    }
}
