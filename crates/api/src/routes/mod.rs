use axum::extract::{Extension, Path, Query, State};
use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
};
use sanstha_domain::{
    draft::SubmissionDraft,
    error::DomainError,
    geo::{
        CityRecord, CityUpsert, DistrictRecord, DistrictUpsert, GeoKind, StateRecord, StateUpsert,
        TalukaRecord, TalukaUpsert,
    },
    member::{Member, MemberCreate, MemberStatus},
    ports::geo::GeoScope,
    profile::ProfileSubmission,
    view::{MemberSortKey, ProfileView, SortDirection},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::middleware::ActorContext;
use crate::observability;
use crate::{error::ApiError, middleware as app_middleware, state::AppState, validation};

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/v1/geo/states", get(list_states).post(create_state))
        .route(
            "/v1/geo/states/:state_id",
            put(update_state).delete(delete_state),
        )
        .route("/v1/geo/districts", get(list_districts).post(create_district))
        .route(
            "/v1/geo/districts/:district_id",
            put(update_district).delete(delete_district),
        )
        .route("/v1/geo/talukas", get(list_talukas).post(create_taluka))
        .route(
            "/v1/geo/talukas/:taluka_id",
            put(update_taluka).delete(delete_taluka),
        )
        .route("/v1/geo/cities", get(list_cities).post(create_city))
        .route(
            "/v1/geo/cities/:city_id",
            put(update_city).delete(delete_city),
        )
        .route("/v1/members", post(register_member))
        .route("/v1/members/:member_id", get(get_member))
        .route("/v1/members/:member_id/status", patch(set_member_status))
        .route(
            "/v1/members/:member_id/profile",
            put(save_profile).get(get_profile),
        )
        .route("/v1/profiles", get(list_profiles))
        .route(
            "/v1/members/:member_id/draft",
            get(get_draft).delete(discard_draft),
        )
        .route(
            "/v1/members/:member_id/draft/steps/:step",
            put(record_draft_step),
        )
        .route_layer(middleware::from_fn(
            app_middleware::require_actor_middleware,
        ));

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(protected)
        .layer(app_middleware::timeout_layer(
            state.config.request_timeout_ms,
        ))
        .layer(app_middleware::trace_layer())
        .layer(app_middleware::set_request_id_layer())
        .layer(app_middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(
            app_middleware::actor_context_middleware,
        ))
        .layer(middleware::from_fn(
            app_middleware::correlation_id_middleware,
        ))
        .layer(middleware::from_fn(app_middleware::metrics_layer));

    if !state.config.app_env.eq_ignore_ascii_case("test") {
        app = app.layer(app_middleware::rate_limit_layer());
    }

    app.with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    storage: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let storage = match &state.storage {
        Some(probe) => match probe.ping().await {
            Ok(()) => "ok",
            Err(err) => {
                tracing::warn!(error = %err, "storage probe failed");
                "unreachable"
            }
        },
        None => "memory",
    };
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.app_env.clone(),
        storage,
    })
}

async fn metrics() -> Response {
    match observability::render_metrics() {
        Some(body) => body.into_response(),
        None => ApiError::Internal.into_response(),
    }
}

#[derive(Debug, Deserialize, Validate)]
struct StateRequest {
    #[validate(length(min = 1, max = 120))]
    name: String,
    #[validate(length(min = 1, max = 16))]
    code: String,
}

#[derive(Debug, Deserialize, Validate)]
struct DistrictRequest {
    #[validate(length(min = 1, max = 120))]
    name: String,
    state_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
struct TalukaRequest {
    #[validate(length(min = 1, max = 120))]
    name: String,
    district_id: i64,
    state_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
struct CityRequest {
    #[validate(length(min = 1, max = 120))]
    name: String,
    district_id: i64,
    state_id: i64,
}

#[derive(Debug, Deserialize)]
struct GeoListQuery {
    state_id: Option<i64>,
    district_id: Option<i64>,
}

impl GeoListQuery {
    fn scope(&self) -> GeoScope {
        GeoScope {
            state_id: self.state_id,
            district_id: self.district_id,
        }
    }
}

#[derive(Serialize)]
struct RemovedResponse {
    removed: u64,
}

async fn list_states(State(state): State<AppState>) -> Result<Json<Vec<StateRecord>>, ApiError> {
    let states = state
        .geo_service()
        .list_states()
        .await
        .map_err(map_domain_error)?;
    Ok(Json(states))
}

async fn create_state(
    State(state): State<AppState>,
    Json(payload): Json<StateRequest>,
) -> Result<(StatusCode, Json<StateRecord>), ApiError> {
    validation::validate(&payload)?;
    let record = state
        .geo_service()
        .create_state(StateUpsert {
            name: payload.name,
            code: payload.code,
        })
        .await
        .map_err(map_domain_error)?;
    observability::register_geo_mutation("state", "create");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_state(
    State(state): State<AppState>,
    Path(state_id): Path<i64>,
    Json(payload): Json<StateRequest>,
) -> Result<Json<StateRecord>, ApiError> {
    validation::validate(&payload)?;
    let record = state
        .geo_service()
        .update_state(
            state_id,
            StateUpsert {
                name: payload.name,
                code: payload.code,
            },
        )
        .await
        .map_err(map_domain_error)?;
    observability::register_geo_mutation("state", "update");
    Ok(Json(record))
}

async fn delete_state(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(state_id): Path<i64>,
) -> Result<Json<RemovedResponse>, ApiError> {
    let removed = state
        .geo_service()
        .delete(GeoKind::State, state_id)
        .await
        .map_err(map_domain_error)?;
    observability::register_geo_mutation("state", "delete");
    tracing::info!(
        actor_id = actor.actor_id.as_deref().unwrap_or("-"),
        state_id,
        removed,
        "state removed with descendants"
    );
    Ok(Json(RemovedResponse { removed }))
}

async fn list_districts(
    State(state): State<AppState>,
    Query(query): Query<GeoListQuery>,
) -> Result<Json<Vec<DistrictRecord>>, ApiError> {
    let districts = state
        .geo_service()
        .list_districts(query.scope())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(districts))
}

async fn create_district(
    State(state): State<AppState>,
    Json(payload): Json<DistrictRequest>,
) -> Result<(StatusCode, Json<DistrictRecord>), ApiError> {
    validation::validate(&payload)?;
    let record = state
        .geo_service()
        .create_district(DistrictUpsert {
            name: payload.name,
            state_id: payload.state_id,
        })
        .await
        .map_err(map_domain_error)?;
    observability::register_geo_mutation("district", "create");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_district(
    State(state): State<AppState>,
    Path(district_id): Path<i64>,
    Json(payload): Json<DistrictRequest>,
) -> Result<Json<DistrictRecord>, ApiError> {
    validation::validate(&payload)?;
    let record = state
        .geo_service()
        .update_district(
            district_id,
            DistrictUpsert {
                name: payload.name,
                state_id: payload.state_id,
            },
        )
        .await
        .map_err(map_domain_error)?;
    observability::register_geo_mutation("district", "update");
    Ok(Json(record))
}

async fn delete_district(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(district_id): Path<i64>,
) -> Result<Json<RemovedResponse>, ApiError> {
    let removed = state
        .geo_service()
        .delete(GeoKind::District, district_id)
        .await
        .map_err(map_domain_error)?;
    observability::register_geo_mutation("district", "delete");
    tracing::info!(
        actor_id = actor.actor_id.as_deref().unwrap_or("-"),
        district_id,
        removed,
        "district removed with descendants"
    );
    Ok(Json(RemovedResponse { removed }))
}

async fn list_talukas(
    State(state): State<AppState>,
    Query(query): Query<GeoListQuery>,
) -> Result<Json<Vec<TalukaRecord>>, ApiError> {
    let talukas = state
        .geo_service()
        .list_talukas(query.scope())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(talukas))
}

async fn create_taluka(
    State(state): State<AppState>,
    Json(payload): Json<TalukaRequest>,
) -> Result<(StatusCode, Json<TalukaRecord>), ApiError> {
    validation::validate(&payload)?;
    let record = state
        .geo_service()
        .create_taluka(TalukaUpsert {
            name: payload.name,
            district_id: payload.district_id,
            state_id: payload.state_id,
        })
        .await
        .map_err(map_domain_error)?;
    observability::register_geo_mutation("taluka", "create");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_taluka(
    State(state): State<AppState>,
    Path(taluka_id): Path<i64>,
    Json(payload): Json<TalukaRequest>,
) -> Result<Json<TalukaRecord>, ApiError> {
    validation::validate(&payload)?;
    let record = state
        .geo_service()
        .update_taluka(
            taluka_id,
            TalukaUpsert {
                name: payload.name,
                district_id: payload.district_id,
                state_id: payload.state_id,
            },
        )
        .await
        .map_err(map_domain_error)?;
    observability::register_geo_mutation("taluka", "update");
    Ok(Json(record))
}

async fn delete_taluka(
    State(state): State<AppState>,
    Path(taluka_id): Path<i64>,
) -> Result<Json<RemovedResponse>, ApiError> {
    let removed = state
        .geo_service()
        .delete(GeoKind::Taluka, taluka_id)
        .await
        .map_err(map_domain_error)?;
    observability::register_geo_mutation("taluka", "delete");
    Ok(Json(RemovedResponse { removed }))
}

async fn list_cities(
    State(state): State<AppState>,
    Query(query): Query<GeoListQuery>,
) -> Result<Json<Vec<CityRecord>>, ApiError> {
    let cities = state
        .geo_service()
        .list_cities(query.scope())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(cities))
}

async fn create_city(
    State(state): State<AppState>,
    Json(payload): Json<CityRequest>,
) -> Result<(StatusCode, Json<CityRecord>), ApiError> {
    validation::validate(&payload)?;
    let record = state
        .geo_service()
        .create_city(CityUpsert {
            name: payload.name,
            district_id: payload.district_id,
            state_id: payload.state_id,
        })
        .await
        .map_err(map_domain_error)?;
    observability::register_geo_mutation("city", "create");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_city(
    State(state): State<AppState>,
    Path(city_id): Path<i64>,
    Json(payload): Json<CityRequest>,
) -> Result<Json<CityRecord>, ApiError> {
    validation::validate(&payload)?;
    let record = state
        .geo_service()
        .update_city(
            city_id,
            CityUpsert {
                name: payload.name,
                district_id: payload.district_id,
                state_id: payload.state_id,
            },
        )
        .await
        .map_err(map_domain_error)?;
    observability::register_geo_mutation("city", "update");
    Ok(Json(record))
}

async fn delete_city(
    State(state): State<AppState>,
    Path(city_id): Path<i64>,
) -> Result<Json<RemovedResponse>, ApiError> {
    let removed = state
        .geo_service()
        .delete(GeoKind::City, city_id)
        .await
        .map_err(map_domain_error)?;
    observability::register_geo_mutation("city", "delete");
    Ok(Json(RemovedResponse { removed }))
}

#[derive(Debug, Deserialize, Validate)]
struct RegisterMemberRequest {
    #[validate(length(min = 1, max = 200))]
    organization_name: String,
    organization_type: Option<String>,
    contact_person: Option<String>,
    contact_phone: Option<String>,
    contact_email: Option<String>,
    membership_expiry_date: Option<String>,
}

async fn register_member(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(payload): Json<RegisterMemberRequest>,
) -> Result<(StatusCode, Json<Member>), ApiError> {
    validation::validate(&payload)?;
    let member = state
        .member_service()
        .register(MemberCreate {
            organization_name: payload.organization_name,
            organization_type: payload.organization_type,
            contact_person: payload.contact_person,
            contact_phone: payload.contact_phone,
            contact_email: payload.contact_email,
            membership_expiry_date: payload.membership_expiry_date,
        })
        .await
        .map_err(map_domain_error)?;
    tracing::info!(
        actor_id = actor.actor_id.as_deref().unwrap_or("-"),
        member_id = member.member_id,
        "member registered"
    );
    Ok((StatusCode::CREATED, Json(member)))
}

async fn get_member(
    State(state): State<AppState>,
    Path(member_id): Path<i64>,
) -> Result<Json<Member>, ApiError> {
    let member = state
        .member_service()
        .get(member_id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(member))
}

#[derive(Debug, Deserialize)]
struct SetMemberStatusRequest {
    status: MemberStatus,
}

async fn set_member_status(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(member_id): Path<i64>,
    Json(payload): Json<SetMemberStatusRequest>,
) -> Result<Json<Member>, ApiError> {
    if !actor.is_admin {
        return Err(ApiError::Unauthorized);
    }
    let member = state
        .member_service()
        .set_status(member_id, payload.status)
        .await
        .map_err(map_domain_error)?;
    tracing::info!(
        actor_id = actor.actor_id.as_deref().unwrap_or("-"),
        member_id,
        status = member.status.as_str(),
        "member status changed"
    );
    Ok(Json(member))
}

async fn save_profile(
    State(state): State<AppState>,
    Path(member_id): Path<i64>,
    Json(payload): Json<ProfileSubmission>,
) -> Result<StatusCode, ApiError> {
    let result = state.profile_service().save(member_id, payload).await;
    match &result {
        Ok(()) => observability::register_profile_save("success"),
        Err(DomainError::Persistence(_)) => observability::register_profile_save("persistence"),
        Err(_) => observability::register_profile_save("rejected"),
    }
    result.map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_profile(
    State(state): State<AppState>,
    Path(member_id): Path<i64>,
) -> Result<Json<ProfileView>, ApiError> {
    let view = state
        .view_service()
        .get(member_id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
struct ProfileListQuery {
    sort: Option<MemberSortKey>,
    direction: Option<SortDirection>,
}

async fn list_profiles(
    State(state): State<AppState>,
    Query(query): Query<ProfileListQuery>,
) -> Result<Json<Vec<ProfileView>>, ApiError> {
    let views = state
        .view_service()
        .list_all(
            query.sort.unwrap_or_default(),
            query.direction.unwrap_or_default(),
        )
        .await
        .map_err(map_domain_error)?;
    Ok(Json(views))
}

async fn get_draft(
    State(state): State<AppState>,
    Path(member_id): Path<i64>,
) -> Result<Json<SubmissionDraft>, ApiError> {
    let draft = state
        .draft_service()
        .get(member_id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(draft))
}

async fn record_draft_step(
    State(state): State<AppState>,
    Path((member_id, step)): Path<(i64, u32)>,
    Json(payload): Json<ProfileSubmission>,
) -> Result<Json<SubmissionDraft>, ApiError> {
    let draft = state
        .draft_service()
        .record_step(member_id, step, payload)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(draft))
}

async fn discard_draft(
    State(state): State<AppState>,
    Path(member_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .draft_service()
        .discard(member_id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

fn map_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::Validation(message) => ApiError::Validation(message),
        DomainError::NotFound => ApiError::NotFound,
        DomainError::DuplicateName => ApiError::DuplicateName,
        DomainError::MemberNotFound => ApiError::MemberNotFound,
        DomainError::Persistence(message) => {
            tracing::error!(error = %message, "storage failure");
            ApiError::Persistence
        }
    }
}
