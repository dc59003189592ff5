use crate::DomainResult;
use crate::draft::SubmissionDraft;
use crate::ports::BoxFuture;

pub trait DraftRepository: Send + Sync {
    fn get(&self, member_id: i64) -> BoxFuture<'_, DomainResult<Option<SubmissionDraft>>>;

    /// Upserts the member's draft; one draft per member.
    fn put(&self, draft: &SubmissionDraft) -> BoxFuture<'_, DomainResult<()>>;

    fn remove(&self, member_id: i64) -> BoxFuture<'_, DomainResult<()>>;
}
