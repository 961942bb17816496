use std::sync::Arc;

use tokio::sync::Mutex;

use shared::domain::PostId;
use shared::protocol::{BlogPost, Comment, CommentPayload, ContactPayload, Project};

use crate::workflow::{AdminRecord, RecordGateway};
use crate::{AuthState, CommentGateway, ContactGateway, InteractionPrompt};

/// Truncated preview of post content for index cards.
pub fn excerpt(content: &str, length: usize) -> String {
    if content.chars().count() <= length {
        return content.to_string();
    }
    let cut: String = content.chars().take(length).collect();
    format!("{cut}...")
}

struct ListViewState<R> {
    items: Vec<R>,
    loading: bool,
    error: Option<String>,
}

impl<R> Default for ListViewState<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

/// Public fetch-and-render listing (projects page, blog index).
pub struct ListView<R: AdminRecord> {
    gateway: Arc<dyn RecordGateway<R>>,
    state: Mutex<ListViewState<R>>,
}

pub type ProjectsView = ListView<Project>;
pub type BlogIndexView = ListView<BlogPost>;

impl<R: AdminRecord> ListView<R> {
    pub fn new(gateway: Arc<dyn RecordGateway<R>>) -> Self {
        Self {
            gateway,
            state: Mutex::new(ListViewState::default()),
        }
    }

    pub async fn load(&self) {
        {
            let mut state = self.state.lock().await;
            state.loading = true;
            state.error = None;
        }
        let result = self.gateway.list().await;
        let mut state = self.state.lock().await;
        match result {
            Ok(items) => state.items = items,
            Err(err) => state.error = Some(err.to_string()),
        }
        state.loading = false;
    }

    pub async fn items(&self) -> Vec<R> {
        self.state.lock().await.items.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }
}

#[derive(Default)]
struct PostViewState {
    post: Option<BlogPost>,
    comments: Vec<Comment>,
    comment_body: String,
    loading: bool,
    submitting: bool,
    error: Option<String>,
}

/// Blog post detail view: the post, its comments and the comment composer.
pub struct PostView {
    post_id: PostId,
    posts: Arc<dyn RecordGateway<BlogPost>>,
    comments: Arc<dyn CommentGateway>,
    auth: Arc<dyn AuthState>,
    prompt: Arc<dyn InteractionPrompt>,
    state: Mutex<PostViewState>,
}

impl PostView {
    pub fn new(
        post_id: PostId,
        posts: Arc<dyn RecordGateway<BlogPost>>,
        comments: Arc<dyn CommentGateway>,
        auth: Arc<dyn AuthState>,
        prompt: Arc<dyn InteractionPrompt>,
    ) -> Self {
        Self {
            post_id,
            posts,
            comments,
            auth,
            prompt,
            state: Mutex::new(PostViewState {
                loading: true,
                ..PostViewState::default()
            }),
        }
    }

    /// Fetches the post and adopts its embedded comments.
    pub async fn load(&self) {
        {
            let mut state = self.state.lock().await;
            state.loading = true;
            state.error = None;
        }
        let result = self.posts.get(&self.post_id).await;
        let mut state = self.state.lock().await;
        match result {
            Ok(post) => {
                state.comments = post.comments.clone();
                state.post = Some(post);
            }
            Err(err) => state.error = Some(err.to_string()),
        }
        state.loading = false;
    }

    /// Whether the comment composer is offered at all; unauthenticated
    /// visitors get a login affordance instead.
    pub async fn can_comment(&self) -> bool {
        self.auth.is_authenticated().await
    }

    pub async fn set_comment_body(&self, body: impl Into<String>) {
        self.state.lock().await.comment_body = body.into();
    }

    /// Posts the composed comment. Blank bodies are silently ignored. The
    /// new comment is prepended to the local list rather than re-fetched;
    /// on failure the composer keeps its text so the user can retry.
    pub async fn submit_comment(&self) {
        if !self.auth.is_authenticated().await {
            return;
        }

        let body = {
            let mut state = self.state.lock().await;
            if state.submitting || state.comment_body.trim().is_empty() {
                return;
            }
            state.submitting = true;
            state.comment_body.clone()
        };

        match self.comments.create(&self.post_id, CommentPayload { body }).await {
            Ok(comment) => {
                let mut state = self.state.lock().await;
                state.comments.insert(0, comment);
                state.comment_body.clear();
                state.submitting = false;
            }
            Err(err) => {
                self.prompt
                    .alert(&format!("Failed to post comment: {err}"))
                    .await;
                self.state.lock().await.submitting = false;
            }
        }
    }

    pub async fn post(&self) -> Option<BlogPost> {
        self.state.lock().await.post.clone()
    }

    pub async fn comments(&self) -> Vec<Comment> {
        self.state.lock().await.comments.clone()
    }

    pub async fn comment_body(&self) -> String {
        self.state.lock().await.comment_body.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.loading
    }

    pub async fn is_submitting(&self) -> bool {
        self.state.lock().await.submitting
    }

    pub async fn error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Default)]
struct ContactFormState {
    draft: ContactDraft,
    submitting: bool,
    succeeded: bool,
    error: Option<String>,
}

/// Public contact form. Success resets the draft; failure keeps it and
/// records the server-supplied message when one exists.
pub struct ContactForm {
    gateway: Arc<dyn ContactGateway>,
    state: Mutex<ContactFormState>,
}

impl ContactForm {
    pub fn new(gateway: Arc<dyn ContactGateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(ContactFormState::default()),
        }
    }

    pub async fn set_draft(&self, draft: ContactDraft) {
        self.state.lock().await.draft = draft;
    }

    pub async fn submit(&self) {
        let draft = {
            let mut state = self.state.lock().await;
            if state.submitting {
                return;
            }
            state.submitting = true;
            state.succeeded = false;
            state.error = None;
            state.draft.clone()
        };

        let payload = ContactPayload {
            name: draft.name,
            email: draft.email,
            message: draft.message,
        };

        let result = self.gateway.send(payload).await;
        let mut state = self.state.lock().await;
        match result {
            Ok(_) => {
                state.succeeded = true;
                state.draft = ContactDraft::default();
            }
            Err(err) => {
                state.error = Some(
                    err.server_message()
                        .map(str::to_string)
                        .unwrap_or_else(|| err.to_string()),
                );
            }
        }
        state.submitting = false;
    }

    pub async fn draft(&self) -> ContactDraft {
        self.state.lock().await.draft.clone()
    }

    pub async fn is_submitting(&self) -> bool {
        self.state.lock().await.submitting
    }

    pub async fn succeeded(&self) -> bool {
        self.state.lock().await.succeeded
    }

    pub async fn error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }
}

#[cfg(test)]
#[path = "tests/views_tests.rs"]
mod tests;
