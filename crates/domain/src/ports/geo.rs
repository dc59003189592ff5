use serde::{Deserialize, Serialize};

use crate::DomainResult;
use crate::geo::{
    CityRecord, CityUpsert, DistrictRecord, DistrictUpsert, GeoKind, StateRecord, StateUpsert,
    TalukaRecord, TalukaUpsert,
};
use crate::ports::BoxFuture;

/// Parent filters for hierarchy listings. Listings return active nodes only,
/// ordered by name ascending.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct GeoScope {
    pub state_id: Option<i64>,
    pub district_id: Option<i64>,
}

impl GeoScope {
    pub fn for_state(state_id: i64) -> Self {
        Self {
            state_id: Some(state_id),
            district_id: None,
        }
    }
}

/// Reference-data store for the four-level hierarchy. Inserts and updates
/// enforce parent-scoped name uniqueness (global for states, which also
/// covers the state code) and report collisions as `DuplicateName`.
pub trait GeoRepository: Send + Sync {
    fn list_states(&self) -> BoxFuture<'_, DomainResult<Vec<StateRecord>>>;
    fn get_state(&self, state_id: i64) -> BoxFuture<'_, DomainResult<Option<StateRecord>>>;
    fn insert_state(&self, input: &StateUpsert) -> BoxFuture<'_, DomainResult<StateRecord>>;
    fn update_state(
        &self,
        state_id: i64,
        input: &StateUpsert,
    ) -> BoxFuture<'_, DomainResult<StateRecord>>;

    fn list_districts(&self, scope: &GeoScope) -> BoxFuture<'_, DomainResult<Vec<DistrictRecord>>>;
    fn get_district(&self, district_id: i64)
    -> BoxFuture<'_, DomainResult<Option<DistrictRecord>>>;
    fn insert_district(
        &self,
        input: &DistrictUpsert,
    ) -> BoxFuture<'_, DomainResult<DistrictRecord>>;
    fn update_district(
        &self,
        district_id: i64,
        input: &DistrictUpsert,
    ) -> BoxFuture<'_, DomainResult<DistrictRecord>>;

    fn list_talukas(&self, scope: &GeoScope) -> BoxFuture<'_, DomainResult<Vec<TalukaRecord>>>;
    fn get_taluka(&self, taluka_id: i64) -> BoxFuture<'_, DomainResult<Option<TalukaRecord>>>;
    fn insert_taluka(&self, input: &TalukaUpsert) -> BoxFuture<'_, DomainResult<TalukaRecord>>;
    fn update_taluka(
        &self,
        taluka_id: i64,
        input: &TalukaUpsert,
    ) -> BoxFuture<'_, DomainResult<TalukaRecord>>;

    fn list_cities(&self, scope: &GeoScope) -> BoxFuture<'_, DomainResult<Vec<CityRecord>>>;
    fn get_city(&self, city_id: i64) -> BoxFuture<'_, DomainResult<Option<CityRecord>>>;
    fn insert_city(&self, input: &CityUpsert) -> BoxFuture<'_, DomainResult<CityRecord>>;
    fn update_city(
        &self,
        city_id: i64,
        input: &CityUpsert,
    ) -> BoxFuture<'_, DomainResult<CityRecord>>;

    /// Hard-deletes the node and every descendant beneath it in one
    /// transaction; returns the number of rows removed.
    fn remove_cascading(&self, kind: GeoKind, id: i64) -> BoxFuture<'_, DomainResult<u64>>;

    /// Marks the node inactive. The row stays addressable by id.
    fn deactivate(&self, kind: GeoKind, id: i64) -> BoxFuture<'_, DomainResult<()>>;
}
