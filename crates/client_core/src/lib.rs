use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};
use tracing::warn;

use shared::domain::PostId;
use shared::protocol::{
    BlogPost, Comment, CommentPayload, ContactMessage, ContactPayload, Project, UserSummary,
};

pub mod error;
pub mod rest;
pub mod views;
pub mod workflow;

pub use error::GatewayError;
pub use rest::RestGateway;
pub use views::{BlogIndexView, ContactDraft, ContactForm, PostView, ProjectsView};
pub use workflow::{AdminRecord, PostDraft, ProjectDraft, RecordGateway, RecordWorkflow};

/// Authentication collaborator. The core never performs a login itself; it
/// only asks who the current user is and borrows their token for admin calls.
#[async_trait]
pub trait AuthState: Send + Sync {
    async fn current_user(&self) -> Option<UserSummary>;
    async fn is_authenticated(&self) -> bool;
    async fn access_token(&self) -> Option<String>;
    async fn logout(&self) -> Result<()>;
}

/// Null-object auth: nobody is signed in.
pub struct AnonymousAuth;

#[async_trait]
impl AuthState for AnonymousAuth {
    async fn current_user(&self) -> Option<UserSummary> {
        None
    }

    async fn is_authenticated(&self) -> bool {
        false
    }

    async fn access_token(&self) -> Option<String> {
        None
    }

    async fn logout(&self) -> Result<()> {
        Ok(())
    }
}

/// Blocking confirmation and alert dialogs, injected so the workflows stay
/// testable without a real UI shell.
#[async_trait]
pub trait InteractionPrompt: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
    async fn alert(&self, message: &str);
}

/// Declines every confirmation and drops alerts. Wired when no interactive
/// shell is attached.
pub struct DenyAllPrompt;

#[async_trait]
impl InteractionPrompt for DenyAllPrompt {
    async fn confirm(&self, _message: &str) -> bool {
        false
    }

    async fn alert(&self, message: &str) {
        warn!(alert = message, "alert dropped: no interactive prompt wired");
    }
}

#[async_trait]
pub trait CommentGateway: Send + Sync {
    async fn create(
        &self,
        post_id: &PostId,
        payload: CommentPayload,
    ) -> Result<Comment, GatewayError>;
}

#[async_trait]
pub trait ContactGateway: Send + Sync {
    async fn list(&self) -> Result<Vec<ContactMessage>, GatewayError>;
    async fn send(&self, payload: ContactPayload) -> Result<ContactMessage, GatewayError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminTab {
    #[default]
    Projects,
    Blog,
    Messages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// Inline status banner near the top of the admin view. A new operation's
/// message replaces the previous one; nothing is queued.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

/// Signals for the UI shell hosting the admin view.
#[derive(Debug, Clone)]
pub enum AdminEvent {
    TabChanged { tab: AdminTab },
    /// Scroll the form into view; emitted when an entity enters editing.
    FormFocusRequested { tab: AdminTab },
}

/// Read-only inbox for contact messages. Messages are an inbound audit
/// trail; no mutation is exposed.
pub struct MessageInbox {
    gateway: Arc<dyn ContactGateway>,
    state: Mutex<InboxState>,
}

#[derive(Default)]
struct InboxState {
    messages: Vec<ContactMessage>,
    loading: bool,
}

impl MessageInbox {
    fn new(gateway: Arc<dyn ContactGateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(InboxState::default()),
        }
    }

    /// Replaces the cached messages with a fresh listing. A failed fetch
    /// keeps the previous messages.
    pub async fn refresh(&self) {
        self.state.lock().await.loading = true;
        let result = self.gateway.list().await;
        let mut state = self.state.lock().await;
        match result {
            Ok(messages) => state.messages = messages,
            Err(err) => warn!(error = %err, "contact message fetch failed"),
        }
        state.loading = false;
    }

    pub async fn messages(&self) -> Vec<ContactMessage> {
        self.state.lock().await.messages.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.loading
    }
}

/// The admin dashboard controller: two CRUD sub-workflows and the message
/// inbox behind a tab selector. Each sub-workflow owns its list, draft, edit
/// target and status independently.
pub struct AdminConsole {
    projects: RecordWorkflow<Project>,
    posts: RecordWorkflow<BlogPost>,
    inbox: MessageInbox,
    auth: Arc<dyn AuthState>,
    tab: Mutex<AdminTab>,
    events: broadcast::Sender<AdminEvent>,
}

impl AdminConsole {
    pub fn new(
        projects: Arc<dyn RecordGateway<Project>>,
        posts: Arc<dyn RecordGateway<BlogPost>>,
        contact: Arc<dyn ContactGateway>,
        auth: Arc<dyn AuthState>,
        prompt: Arc<dyn InteractionPrompt>,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            projects: RecordWorkflow::new(
                AdminTab::Projects,
                projects,
                Arc::clone(&prompt),
                events.clone(),
            ),
            posts: RecordWorkflow::new(AdminTab::Blog, posts, prompt, events.clone()),
            inbox: MessageInbox::new(contact),
            auth,
            tab: Mutex::new(AdminTab::default()),
            events,
        }
    }

    pub fn projects(&self) -> &RecordWorkflow<Project> {
        &self.projects
    }

    pub fn posts(&self) -> &RecordWorkflow<BlogPost> {
        &self.posts
    }

    pub fn inbox(&self) -> &MessageInbox {
        &self.inbox
    }

    pub async fn current_user(&self) -> Option<UserSummary> {
        self.auth.current_user().await
    }

    pub async fn active_tab(&self) -> AdminTab {
        *self.tab.lock().await
    }

    pub async fn select_tab(&self, tab: AdminTab) {
        *self.tab.lock().await = tab;
        let _ = self.events.send(AdminEvent::TabChanged { tab });
    }

    /// Initial mount: all three listings are fetched together.
    pub async fn refresh_all(&self) {
        tokio::join!(
            self.projects.refresh(),
            self.posts.refresh(),
            self.inbox.refresh(),
        );
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<AdminEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
