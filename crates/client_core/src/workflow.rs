use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};
use tracing::warn;

use shared::domain::{PostId, ProjectId};
use shared::protocol::{BlogPost, PostPayload, Project, ProjectPayload};

use crate::error::GatewayError;
use crate::{AdminEvent, AdminTab, InteractionPrompt, StatusMessage};

/// Splits comma-delimited draft text into trimmed entries. `drop_empty`
/// controls whether blank entries survive: blog tags drop them, project
/// technologies keep them (the backend tolerates both shapes).
fn split_delimited(raw: &str, drop_empty: bool) -> Vec<String> {
    let parts = raw.split(',').map(|part| part.trim().to_string());
    if drop_empty {
        parts.filter(|part| !part.is_empty()).collect()
    } else {
        parts.collect()
    }
}

fn join_delimited(values: &[String]) -> String {
    values.join(", ")
}

/// In-progress project form. List-valued fields are comma-delimited text
/// until submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub technologies: String,
    pub image_url: String,
    pub live_url: String,
    pub github_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub tags: String,
}

/// Schema hook making one entity type manageable by [`RecordWorkflow`]:
/// identity, draft mapping, payload parsing and the labels used in status
/// and confirmation texts.
pub trait AdminRecord: Clone + Send + Sync + 'static {
    type Id: Clone + PartialEq + Send + Sync + 'static;
    type Draft: Clone + Default + PartialEq + Send + Sync + 'static;
    type Payload: Clone + Send + Sync + 'static;

    /// Sentence-leading label ("Project").
    fn label() -> &'static str;
    /// Mid-sentence label ("project").
    fn label_lower() -> &'static str;

    fn id(&self) -> &Self::Id;
    /// Populates a draft from an existing record for editing.
    fn to_draft(&self) -> Self::Draft;
    /// Parses the draft's delimited text fields into a mutation payload.
    fn payload_from_draft(draft: &Self::Draft) -> Self::Payload;
}

impl AdminRecord for Project {
    type Id = ProjectId;
    type Draft = ProjectDraft;
    type Payload = ProjectPayload;

    fn label() -> &'static str {
        "Project"
    }

    fn label_lower() -> &'static str {
        "project"
    }

    fn id(&self) -> &ProjectId {
        &self.id
    }

    fn to_draft(&self) -> ProjectDraft {
        ProjectDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            technologies: join_delimited(&self.technologies),
            image_url: self.image_url.clone().unwrap_or_default(),
            live_url: self.live_url.clone().unwrap_or_default(),
            github_url: self.github_url.clone().unwrap_or_default(),
        }
    }

    fn payload_from_draft(draft: &ProjectDraft) -> ProjectPayload {
        ProjectPayload {
            title: draft.title.clone(),
            description: draft.description.clone(),
            technologies: split_delimited(&draft.technologies, false),
            image_url: draft.image_url.clone(),
            live_url: draft.live_url.clone(),
            github_url: draft.github_url.clone(),
        }
    }
}

impl AdminRecord for BlogPost {
    type Id = PostId;
    type Draft = PostDraft;
    type Payload = PostPayload;

    fn label() -> &'static str {
        "Blog post"
    }

    fn label_lower() -> &'static str {
        "blog post"
    }

    fn id(&self) -> &PostId {
        &self.id
    }

    fn to_draft(&self) -> PostDraft {
        PostDraft {
            title: self.title.clone(),
            content: self.content.clone(),
            tags: join_delimited(&self.tags),
        }
    }

    fn payload_from_draft(draft: &PostDraft) -> PostPayload {
        PostPayload {
            title: draft.title.clone(),
            content: draft.content.clone(),
            tags: split_delimited(&draft.tags, true),
        }
    }
}

/// Remote CRUD capability for one entity type.
#[async_trait]
pub trait RecordGateway<R: AdminRecord>: Send + Sync {
    async fn list(&self) -> Result<Vec<R>, GatewayError>;
    async fn get(&self, id: &R::Id) -> Result<R, GatewayError>;
    async fn create(&self, payload: R::Payload) -> Result<R, GatewayError>;
    async fn update(&self, id: &R::Id, payload: R::Payload) -> Result<R, GatewayError>;
    async fn delete(&self, id: &R::Id) -> Result<(), GatewayError>;
}

struct WorkflowState<R: AdminRecord> {
    records: Vec<R>,
    draft: R::Draft,
    edit_target: Option<R>,
    busy: bool,
    status: Option<StatusMessage>,
}

impl<R: AdminRecord> Default for WorkflowState<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            draft: R::Draft::default(),
            edit_target: None,
            busy: false,
            status: None,
        }
    }
}

/// One entity type's list/form/edit/delete sub-workflow.
///
/// The cached list is a stale-tolerant mirror of the remote store: every
/// successful mutation is followed by a full list re-fetch rather than a
/// local patch. Mutating operations are serialized through `op_gate` so a
/// second submit observes the completed outcome of the first.
pub struct RecordWorkflow<R: AdminRecord> {
    tab: AdminTab,
    gateway: Arc<dyn RecordGateway<R>>,
    prompt: Arc<dyn InteractionPrompt>,
    state: Mutex<WorkflowState<R>>,
    op_gate: Mutex<()>,
    events: broadcast::Sender<AdminEvent>,
}

impl<R: AdminRecord> RecordWorkflow<R> {
    pub fn new(
        tab: AdminTab,
        gateway: Arc<dyn RecordGateway<R>>,
        prompt: Arc<dyn InteractionPrompt>,
        events: broadcast::Sender<AdminEvent>,
    ) -> Self {
        Self {
            tab,
            gateway,
            prompt,
            state: Mutex::new(WorkflowState::default()),
            op_gate: Mutex::new(()),
            events,
        }
    }

    /// Replaces the cached list with a fresh listing. A failed fetch keeps
    /// the previous list in place.
    pub async fn refresh(&self) {
        match self.gateway.list().await {
            Ok(records) => self.state.lock().await.records = records,
            Err(err) => warn!(kind = R::label_lower(), error = %err, "list fetch failed"),
        }
    }

    /// Creates or updates from the current draft, depending on whether an
    /// edit target is set. On success the draft resets, the edit target
    /// clears and the list is re-fetched; on failure both are left intact so
    /// the user can retry.
    pub async fn submit(&self) {
        let _gate = self.op_gate.lock().await;

        let (payload, target_id) = {
            let mut state = self.state.lock().await;
            state.busy = true;
            state.status = None;
            (
                R::payload_from_draft(&state.draft),
                state.edit_target.as_ref().map(|record| record.id().clone()),
            )
        };

        let result = match &target_id {
            Some(id) => self.gateway.update(id, payload).await.map(|_| ()),
            None => self.gateway.create(payload).await.map(|_| ()),
        };

        match result {
            Ok(()) => {
                let verb = if target_id.is_some() {
                    "updated"
                } else {
                    "created"
                };
                {
                    let mut state = self.state.lock().await;
                    state.draft = R::Draft::default();
                    state.edit_target = None;
                    state.status = Some(StatusMessage::success(format!(
                        "{} {verb} successfully!",
                        R::label()
                    )));
                }
                self.refresh().await;
            }
            Err(err) => {
                warn!(kind = R::label_lower(), error = %err, "save failed");
                let text = err
                    .server_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Error saving {}", R::label_lower()));
                self.state.lock().await.status = Some(StatusMessage::error(text));
            }
        }

        self.state.lock().await.busy = false;
    }

    /// Starts editing a listed record: copies its fields into the draft,
    /// marks it as the edit target and asks the shell to bring the form into
    /// view. Unknown ids are ignored.
    pub async fn edit(&self, id: &R::Id) {
        {
            let mut state = self.state.lock().await;
            let Some(record) = state
                .records
                .iter()
                .find(|record| record.id() == id)
                .cloned()
            else {
                return;
            };
            state.draft = record.to_draft();
            state.edit_target = Some(record);
        }
        let _ = self
            .events
            .send(AdminEvent::FormFocusRequested { tab: self.tab });
    }

    /// Deletes after confirmation. A declined confirmation performs no
    /// remote call and changes nothing. Deleting the record currently being
    /// edited also clears the edit target and draft, so the form cannot keep
    /// updating a record that no longer exists.
    pub async fn delete(&self, id: &R::Id) {
        let confirmed = self
            .prompt
            .confirm(&format!(
                "Are you sure you want to delete this {}?",
                R::label_lower()
            ))
            .await;
        if !confirmed {
            return;
        }

        let _gate = self.op_gate.lock().await;
        self.state.lock().await.busy = true;

        match self.gateway.delete(id).await {
            Ok(()) => {
                {
                    let mut state = self.state.lock().await;
                    state.status = Some(StatusMessage::success(format!(
                        "{} deleted successfully!",
                        R::label()
                    )));
                    if state
                        .edit_target
                        .as_ref()
                        .is_some_and(|target| target.id() == id)
                    {
                        state.edit_target = None;
                        state.draft = R::Draft::default();
                    }
                }
                self.refresh().await;
            }
            Err(err) => {
                warn!(kind = R::label_lower(), error = %err, "delete failed");
                let text = err
                    .server_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Error deleting {}", R::label_lower()));
                self.state.lock().await.status = Some(StatusMessage::error(text));
            }
        }

        self.state.lock().await.busy = false;
    }

    /// Abandons the current draft and edit target. No remote effect, no
    /// status change.
    pub async fn cancel(&self) {
        let mut state = self.state.lock().await;
        state.draft = R::Draft::default();
        state.edit_target = None;
    }

    pub async fn records(&self) -> Vec<R> {
        self.state.lock().await.records.clone()
    }

    pub async fn draft(&self) -> R::Draft {
        self.state.lock().await.draft.clone()
    }

    /// Mirrors the controlled form inputs into the workflow.
    pub async fn set_draft(&self, draft: R::Draft) {
        self.state.lock().await.draft = draft;
    }

    pub async fn edit_target(&self) -> Option<R> {
        self.state.lock().await.edit_target.clone()
    }

    pub async fn status(&self) -> Option<StatusMessage> {
        self.state.lock().await.status.clone()
    }

    pub async fn is_busy(&self) -> bool {
        self.state.lock().await.busy
    }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
