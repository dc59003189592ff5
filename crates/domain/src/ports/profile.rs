use crate::DomainResult;
use crate::ports::BoxFuture;
use crate::profile::ProfileWrite;
use crate::view::ProfileView;

/// Per-section profile storage.
///
/// `save_sections` is the coordinator's single write entry point: every
/// section in the write lands in one transaction or none does. The
/// list-shaped sections (phone, email, social link, key contact,
/// certification) upsert keyed on member id alone: one durable row per
/// member per section, last entry applied wins.
pub trait ProfileRepository: Send + Sync {
    fn save_sections(
        &self,
        member_id: i64,
        write: &ProfileWrite,
    ) -> BoxFuture<'_, DomainResult<()>>;

    fn fetch_view(&self, member_id: i64) -> BoxFuture<'_, DomainResult<Option<ProfileView>>>;

    fn list_views(&self) -> BoxFuture<'_, DomainResult<Vec<ProfileView>>>;
}
