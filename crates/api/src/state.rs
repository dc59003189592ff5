use std::sync::Arc;

use sanstha_domain::draft::DraftService;
use sanstha_domain::geo::GeoService;
use sanstha_domain::member::MemberService;
use sanstha_domain::ports::db::StorageAdapter;
use sanstha_domain::ports::draft::DraftRepository;
use sanstha_domain::ports::geo::GeoRepository;
use sanstha_domain::ports::member::MemberRepository;
use sanstha_domain::ports::profile::ProfileRepository;
use sanstha_domain::profile::ProfileService;
use sanstha_domain::view::ProfileViewService;
use sanstha_infra::config::AppConfig;
use sanstha_infra::db::{DbConfig, SurrealProbe};
use sanstha_infra::repositories::{
    MemoryBackend, SurrealDraftRepository, SurrealGeoRepository, SurrealMemberRepository,
    SurrealProfileRepository, connect_client,
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub storage: Option<Arc<dyn StorageAdapter>>,
    pub member_repo: Arc<dyn MemberRepository>,
    pub geo_repo: Arc<dyn GeoRepository>,
    pub profile_repo: Arc<dyn ProfileRepository>,
    pub draft_repo: Arc<dyn DraftRepository>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        if config.uses_memory_backend() {
            return Ok(Self::with_memory_backend(config, MemoryBackend::new()));
        }
        let db_config = DbConfig::from_app_config(&config);
        let client = connect_client(&db_config).await?;
        Ok(Self {
            config,
            storage: Some(Arc::new(SurrealProbe::new(db_config))),
            member_repo: Arc::new(SurrealMemberRepository::with_client(client.clone())),
            geo_repo: Arc::new(SurrealGeoRepository::with_client(client.clone())),
            profile_repo: Arc::new(SurrealProfileRepository::with_client(client.clone())),
            draft_repo: Arc::new(SurrealDraftRepository::with_client(client)),
        })
    }

    pub fn with_memory_backend(config: AppConfig, backend: MemoryBackend) -> Self {
        Self {
            config,
            storage: None,
            member_repo: backend.member_repo(),
            geo_repo: backend.geo_repo(),
            profile_repo: backend.profile_repo(),
            draft_repo: backend.draft_repo(),
        }
    }

    pub fn member_service(&self) -> MemberService {
        MemberService::new(self.member_repo.clone())
    }

    pub fn geo_service(&self) -> GeoService {
        GeoService::new(self.geo_repo.clone())
    }

    pub fn profile_service(&self) -> ProfileService {
        ProfileService::new(
            self.member_repo.clone(),
            self.geo_repo.clone(),
            self.profile_repo.clone(),
        )
    }

    pub fn view_service(&self) -> ProfileViewService {
        ProfileViewService::new(self.profile_repo.clone())
    }

    pub fn draft_service(&self) -> DraftService {
        DraftService::new(self.draft_repo.clone(), self.profile_service())
    }
}
