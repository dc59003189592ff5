use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::DomainResult;
use crate::error::DomainError;
use crate::ports::geo::{GeoRepository, GeoScope};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GeoKind {
    State,
    District,
    Taluka,
    City,
}

/// How a node leaves the hierarchy. States and districts are removed
/// outright, cascading over every descendant level in one transaction;
/// talukas and cities are deactivated and stay addressable by id so
/// addresses referencing them keep resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovalPolicy {
    Remove,
    Deactivate,
}

impl GeoKind {
    pub const fn removal_policy(self) -> RemovalPolicy {
        match self {
            GeoKind::State | GeoKind::District => RemovalPolicy::Remove,
            GeoKind::Taluka | GeoKind::City => RemovalPolicy::Deactivate,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateRecord {
    pub state_id: i64,
    pub name: String,
    pub code: String,
    pub is_active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DistrictRecord {
    pub district_id: i64,
    pub name: String,
    pub state_id: i64,
    pub is_active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TalukaRecord {
    pub taluka_id: i64,
    pub name: String,
    pub district_id: i64,
    pub state_id: i64,
    pub is_active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CityRecord {
    pub city_id: i64,
    pub name: String,
    pub district_id: i64,
    pub state_id: i64,
    pub is_active: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StateUpsert {
    pub name: String,
    pub code: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DistrictUpsert {
    pub name: String,
    pub state_id: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TalukaUpsert {
    pub name: String,
    pub district_id: i64,
    pub state_id: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CityUpsert {
    pub name: String,
    pub district_id: i64,
    pub state_id: i64,
}

#[derive(Clone)]
pub struct GeoService {
    repository: Arc<dyn GeoRepository>,
}

impl GeoService {
    pub fn new(repository: Arc<dyn GeoRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_states(&self) -> DomainResult<Vec<StateRecord>> {
        self.repository.list_states().await
    }

    pub async fn create_state(&self, input: StateUpsert) -> DomainResult<StateRecord> {
        let input = validate_state_upsert(input)?;
        self.repository.insert_state(&input).await
    }

    pub async fn update_state(&self, state_id: i64, input: StateUpsert) -> DomainResult<StateRecord> {
        let input = validate_state_upsert(input)?;
        self.repository.update_state(state_id, &input).await
    }

    pub async fn list_districts(&self, scope: GeoScope) -> DomainResult<Vec<DistrictRecord>> {
        self.repository.list_districts(&scope).await
    }

    pub async fn create_district(&self, input: DistrictUpsert) -> DomainResult<DistrictRecord> {
        let input = validate_district_upsert(input)?;
        self.assert_state_exists(input.state_id).await?;
        self.repository.insert_district(&input).await
    }

    pub async fn update_district(
        &self,
        district_id: i64,
        input: DistrictUpsert,
    ) -> DomainResult<DistrictRecord> {
        let input = validate_district_upsert(input)?;
        self.assert_state_exists(input.state_id).await?;
        self.repository.update_district(district_id, &input).await
    }

    pub async fn list_talukas(&self, scope: GeoScope) -> DomainResult<Vec<TalukaRecord>> {
        self.repository.list_talukas(&scope).await
    }

    pub async fn create_taluka(&self, input: TalukaUpsert) -> DomainResult<TalukaRecord> {
        let input = validate_taluka_upsert(input)?;
        self.assert_district_in_state(input.district_id, input.state_id)
            .await?;
        self.repository.insert_taluka(&input).await
    }

    pub async fn update_taluka(
        &self,
        taluka_id: i64,
        input: TalukaUpsert,
    ) -> DomainResult<TalukaRecord> {
        let input = validate_taluka_upsert(input)?;
        self.assert_district_in_state(input.district_id, input.state_id)
            .await?;
        self.repository.update_taluka(taluka_id, &input).await
    }

    pub async fn list_cities(&self, scope: GeoScope) -> DomainResult<Vec<CityRecord>> {
        self.repository.list_cities(&scope).await
    }

    pub async fn create_city(&self, input: CityUpsert) -> DomainResult<CityRecord> {
        let input = validate_city_upsert(input)?;
        self.assert_district_in_state(input.district_id, input.state_id)
            .await?;
        self.repository.insert_city(&input).await
    }

    pub async fn update_city(&self, city_id: i64, input: CityUpsert) -> DomainResult<CityRecord> {
        let input = validate_city_upsert(input)?;
        self.assert_district_in_state(input.district_id, input.state_id)
            .await?;
        self.repository.update_city(city_id, &input).await
    }

    /// Deletes a node under the policy its kind carries. Returns how many
    /// rows were removed (always zero for a deactivation).
    pub async fn delete(&self, kind: GeoKind, id: i64) -> DomainResult<u64> {
        match kind.removal_policy() {
            RemovalPolicy::Remove => self.repository.remove_cascading(kind, id).await,
            RemovalPolicy::Deactivate => {
                self.repository.deactivate(kind, id).await?;
                Ok(0)
            }
        }
    }

    async fn assert_state_exists(&self, state_id: i64) -> DomainResult<()> {
        self.repository
            .get_state(state_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| DomainError::Validation(format!("state {state_id} does not exist")))
    }

    async fn assert_district_in_state(&self, district_id: i64, state_id: i64) -> DomainResult<()> {
        let district = self
            .repository
            .get_district(district_id)
            .await?
            .ok_or_else(|| {
                DomainError::Validation(format!("district {district_id} does not exist"))
            })?;
        if district.state_id != state_id {
            return Err(DomainError::Validation(format!(
                "district {district_id} does not belong to state {state_id}"
            )));
        }
        Ok(())
    }
}

fn validate_state_upsert(input: StateUpsert) -> DomainResult<StateUpsert> {
    let name = input.name.trim().to_string();
    let code = input.code.trim().to_uppercase();
    if name.is_empty() {
        return Err(DomainError::Validation("name is required".into()));
    }
    if code.is_empty() {
        return Err(DomainError::Validation("code is required".into()));
    }
    Ok(StateUpsert { name, code })
}

fn validate_district_upsert(input: DistrictUpsert) -> DomainResult<DistrictUpsert> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::Validation("name is required".into()));
    }
    Ok(DistrictUpsert { name, ..input })
}

fn validate_taluka_upsert(input: TalukaUpsert) -> DomainResult<TalukaUpsert> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::Validation("name is required".into()));
    }
    Ok(TalukaUpsert { name, ..input })
}

fn validate_city_upsert(input: CityUpsert) -> DomainResult<CityUpsert> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::Validation("name is required".into()));
    }
    Ok(CityUpsert { name, ..input })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removal_policy_is_asymmetric_across_levels() {
        assert_eq!(GeoKind::State.removal_policy(), RemovalPolicy::Remove);
        assert_eq!(GeoKind::District.removal_policy(), RemovalPolicy::Remove);
        assert_eq!(GeoKind::Taluka.removal_policy(), RemovalPolicy::Deactivate);
        assert_eq!(GeoKind::City.removal_policy(), RemovalPolicy::Deactivate);
    }

    #[test]
    fn state_code_is_uppercased() {
        let input = StateUpsert {
            name: " Maharashtra ".to_string(),
            code: "mh".to_string(),
        };
        let validated = validate_state_upsert(input).expect("valid input");
        assert_eq!(validated.name, "Maharashtra");
        assert_eq!(validated.code, "MH");
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(
            validate_district_upsert(DistrictUpsert {
                name: "  ".to_string(),
                state_id: 1,
            })
            .is_err()
        );
        assert!(
            validate_city_upsert(CityUpsert {
                name: "".to_string(),
                district_id: 1,
                state_id: 1,
            })
            .is_err()
        );
    }
}
