use time::Date;

use crate::DomainResult;
use crate::member::{Member, MemberStatus};
use crate::ports::BoxFuture;

pub trait MemberRepository: Send + Sync {
    /// Persists a new member, allocating its numeric id. The id on the input
    /// record is ignored.
    fn insert(&self, member: &Member) -> BoxFuture<'_, DomainResult<Member>>;

    fn get(&self, member_id: i64) -> BoxFuture<'_, DomainResult<Option<Member>>>;

    fn exists(&self, member_id: i64) -> BoxFuture<'_, DomainResult<bool>>;

    fn set_status(
        &self,
        member_id: i64,
        status: MemberStatus,
        updated_at_ms: i64,
    ) -> BoxFuture<'_, DomainResult<Member>>;

    /// Moves active members whose expiry date lies strictly before `today`
    /// to inactive; returns the count of members changed.
    fn sweep_expired(&self, today: Date, updated_at_ms: i64) -> BoxFuture<'_, DomainResult<u64>>;
}
