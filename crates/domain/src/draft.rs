use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::DomainResult;
use crate::error::DomainError;
use crate::ports::draft::DraftRepository;
use crate::profile::{ProfileService, ProfileSubmission};
use crate::util::now_ms;

/// Client-resumable wizard state: the last completed step plus the payload
/// accumulated so far. Lives beside the committed profile, never inside it;
/// each recorded step has already been applied as an independent partial
/// save, so discarding a draft loses nothing that was submitted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SubmissionDraft {
    pub member_id: i64,
    pub step: u32,
    pub payload: Value,
    pub updated_at_ms: i64,
}

#[derive(Clone)]
pub struct DraftService {
    drafts: Arc<dyn DraftRepository>,
    profile: ProfileService,
}

impl DraftService {
    pub fn new(drafts: Arc<dyn DraftRepository>, profile: ProfileService) -> Self {
        Self { drafts, profile }
    }

    pub async fn get(&self, member_id: i64) -> DomainResult<SubmissionDraft> {
        self.drafts
            .get(member_id)
            .await?
            .ok_or(DomainError::NotFound)
    }

    /// Applies one wizard step: the step's sections are saved through the
    /// coordinator first, then folded into the draft. A failed save leaves
    /// the draft untouched, so retrying the step is safe.
    pub async fn record_step(
        &self,
        member_id: i64,
        step: u32,
        submission: ProfileSubmission,
    ) -> DomainResult<SubmissionDraft> {
        let section = serde_json::to_value(&submission)
            .map_err(|err| DomainError::Validation(format!("unserializable step: {err}")))?;

        self.profile.save(member_id, submission).await?;

        let existing = self.drafts.get(member_id).await?;
        let (mut payload, step) = match existing {
            Some(draft) => (draft.payload, draft.step.max(step)),
            None => (Value::Object(serde_json::Map::new()), step),
        };
        merge_step(&mut payload, &section);

        let draft = SubmissionDraft {
            member_id,
            step,
            payload,
            updated_at_ms: now_ms(),
        };
        self.drafts.put(&draft).await?;
        Ok(draft)
    }

    pub async fn discard(&self, member_id: i64) -> DomainResult<()> {
        self.drafts.remove(member_id).await
    }
}

/// Folds a step's sections into the accumulated payload. Keys the step left
/// empty (null or an empty list) do not clobber sections recorded by
/// earlier steps.
fn merge_step(payload: &mut Value, section: &Value) {
    let (Value::Object(target), Value::Object(incoming)) = (payload, section) else {
        return;
    };
    for (key, value) in incoming {
        let empty = value.is_null() || value.as_array().is_some_and(Vec::is_empty);
        if !empty {
            target.insert(key.clone(), value.clone());
        }
    }
}
