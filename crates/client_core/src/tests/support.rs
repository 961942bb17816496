use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use shared::domain::{CommentId, ContactMessageId, PostId, ProjectId, UserId};
use shared::protocol::{
    BlogPost, Comment, CommentPayload, ContactMessage, ContactPayload, PostPayload, Project,
    ProjectPayload, UserSummary,
};

use crate::error::GatewayError;
use crate::workflow::RecordGateway;
use crate::{AuthState, CommentGateway, ContactGateway, InteractionPrompt};

#[derive(Debug, Clone, Copy)]
pub(crate) enum FailureMode {
    Rejected(&'static str),
    Plain,
}

impl FailureMode {
    fn into_error(self) -> GatewayError {
        match self {
            FailureMode::Rejected(message) => GatewayError::rejected(message),
            FailureMode::Plain => GatewayError::Status { status: 500 },
        }
    }
}

pub(crate) fn timestamp() -> DateTime<Utc> {
    "2024-01-01T00:00:00Z".parse().expect("timestamp")
}

pub(crate) fn sample_user(name: &str) -> UserSummary {
    UserSummary {
        id: UserId::new(format!("u-{name}")),
        username: name.to_string(),
    }
}

pub(crate) fn sample_project(id: &str, title: &str) -> Project {
    Project {
        id: ProjectId::new(id),
        title: title.to_string(),
        description: "A sample project".to_string(),
        technologies: vec!["Rust".to_string(), "Axum".to_string()],
        image_url: None,
        live_url: Some("https://demo.example.com".to_string()),
        github_url: None,
        owner: Some(sample_user("admin")),
        created_at: Some(timestamp()),
    }
}

pub(crate) fn sample_post(id: &str, title: &str) -> BlogPost {
    BlogPost {
        id: PostId::new(id),
        title: title.to_string(),
        content: "Some long-form writing".to_string(),
        tags: vec!["rust".to_string()],
        created_at: timestamp(),
        author: Some(sample_user("admin")),
        comments: Vec::new(),
    }
}

pub(crate) fn sample_comment(id: &str, body: &str) -> Comment {
    Comment {
        id: CommentId::new(id),
        body: body.to_string(),
        author: Some(sample_user("reader")),
        created_at: timestamp(),
    }
}

pub(crate) fn sample_message(id: &str, name: &str) -> ContactMessage {
    ContactMessage {
        id: ContactMessageId::new(id),
        name: name.to_string(),
        email: format!("{name}@example.com"),
        subject: None,
        message: "Hello there".to_string(),
        created_at: timestamp(),
    }
}

pub(crate) struct RecordingPrompt {
    accept: bool,
    pub confirms: Mutex<Vec<String>>,
    pub alerts: Mutex<Vec<String>>,
}

impl RecordingPrompt {
    pub fn accepting() -> Self {
        Self {
            accept: true,
            confirms: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
        }
    }

    pub fn declining() -> Self {
        Self {
            accept: false,
            ..Self::accepting()
        }
    }
}

#[async_trait]
impl InteractionPrompt for RecordingPrompt {
    async fn confirm(&self, message: &str) -> bool {
        self.confirms.lock().await.push(message.to_string());
        self.accept
    }

    async fn alert(&self, message: &str) {
        self.alerts.lock().await.push(message.to_string());
    }
}

pub(crate) struct StaticAuth {
    user: UserSummary,
    token: String,
}

impl StaticAuth {
    pub fn signed_in() -> Self {
        Self {
            user: sample_user("admin"),
            token: "admin-token".to_string(),
        }
    }
}

#[async_trait]
impl AuthState for StaticAuth {
    async fn current_user(&self) -> Option<UserSummary> {
        Some(self.user.clone())
    }

    async fn is_authenticated(&self) -> bool {
        true
    }

    async fn access_token(&self) -> Option<String> {
        Some(self.token.clone())
    }

    async fn logout(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct TestProjectGateway {
    pub records: Mutex<Vec<Project>>,
    pub creates: Mutex<Vec<ProjectPayload>>,
    pub updates: Mutex<Vec<(ProjectId, ProjectPayload)>>,
    pub deletes: Mutex<Vec<ProjectId>>,
    pub list_calls: Mutex<u32>,
    pub fail: Mutex<Option<FailureMode>>,
    active_mutations: Mutex<u32>,
    pub max_active_mutations: Mutex<u32>,
    next_id: Mutex<u32>,
}

impl TestProjectGateway {
    pub fn seeded(records: Vec<Project>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub async fn fail_with(&self, mode: FailureMode) {
        *self.fail.lock().await = Some(mode);
    }

    async fn begin_mutation(&self) {
        let mut active = self.active_mutations.lock().await;
        *active += 1;
        let mut max = self.max_active_mutations.lock().await;
        if *active > *max {
            *max = *active;
        }
    }

    async fn end_mutation(&self) {
        *self.active_mutations.lock().await -= 1;
    }
}

fn project_from_payload(id: ProjectId, payload: &ProjectPayload) -> Project {
    Project {
        id,
        title: payload.title.clone(),
        description: payload.description.clone(),
        technologies: payload.technologies.clone(),
        image_url: Some(payload.image_url.clone()).filter(|value| !value.is_empty()),
        live_url: Some(payload.live_url.clone()).filter(|value| !value.is_empty()),
        github_url: Some(payload.github_url.clone()).filter(|value| !value.is_empty()),
        owner: Some(sample_user("admin")),
        created_at: Some(timestamp()),
    }
}

#[async_trait]
impl RecordGateway<Project> for TestProjectGateway {
    async fn list(&self) -> Result<Vec<Project>, GatewayError> {
        *self.list_calls.lock().await += 1;
        if let Some(mode) = *self.fail.lock().await {
            return Err(mode.into_error());
        }
        Ok(self.records.lock().await.clone())
    }

    async fn get(&self, id: &ProjectId) -> Result<Project, GatewayError> {
        if let Some(mode) = *self.fail.lock().await {
            return Err(mode.into_error());
        }
        self.records
            .lock()
            .await
            .iter()
            .find(|record| &record.id == id)
            .cloned()
            .ok_or_else(|| GatewayError::rejected("Project not found"))
    }

    async fn create(&self, payload: ProjectPayload) -> Result<Project, GatewayError> {
        self.begin_mutation().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        let result = if let Some(mode) = *self.fail.lock().await {
            Err(mode.into_error())
        } else {
            self.creates.lock().await.push(payload.clone());
            let id = {
                let mut next_id = self.next_id.lock().await;
                *next_id += 1;
                ProjectId::new(format!("p{next_id}"))
            };
            let record = project_from_payload(id, &payload);
            self.records.lock().await.push(record.clone());
            Ok(record)
        };
        self.end_mutation().await;
        result
    }

    async fn update(&self, id: &ProjectId, payload: ProjectPayload) -> Result<Project, GatewayError> {
        self.begin_mutation().await;
        let result = if let Some(mode) = *self.fail.lock().await {
            Err(mode.into_error())
        } else {
            self.updates.lock().await.push((id.clone(), payload.clone()));
            let record = project_from_payload(id.clone(), &payload);
            let mut records = self.records.lock().await;
            if let Some(slot) = records.iter_mut().find(|record| &record.id == id) {
                *slot = record.clone();
            }
            Ok(record)
        };
        self.end_mutation().await;
        result
    }

    async fn delete(&self, id: &ProjectId) -> Result<(), GatewayError> {
        self.begin_mutation().await;
        let result = if let Some(mode) = *self.fail.lock().await {
            Err(mode.into_error())
        } else {
            self.deletes.lock().await.push(id.clone());
            self.records.lock().await.retain(|record| &record.id != id);
            Ok(())
        };
        self.end_mutation().await;
        result
    }
}

#[derive(Default)]
pub(crate) struct TestPostGateway {
    pub records: Mutex<Vec<BlogPost>>,
    pub creates: Mutex<Vec<PostPayload>>,
    pub updates: Mutex<Vec<(PostId, PostPayload)>>,
    pub deletes: Mutex<Vec<PostId>>,
    pub list_calls: Mutex<u32>,
    pub fail: Mutex<Option<FailureMode>>,
    next_id: Mutex<u32>,
}

impl TestPostGateway {
    pub fn seeded(records: Vec<BlogPost>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub async fn fail_with(&self, mode: FailureMode) {
        *self.fail.lock().await = Some(mode);
    }
}

fn post_from_payload(id: PostId, payload: &PostPayload) -> BlogPost {
    BlogPost {
        id,
        title: payload.title.clone(),
        content: payload.content.clone(),
        tags: payload.tags.clone(),
        created_at: timestamp(),
        author: Some(sample_user("admin")),
        comments: Vec::new(),
    }
}

#[async_trait]
impl RecordGateway<BlogPost> for TestPostGateway {
    async fn list(&self) -> Result<Vec<BlogPost>, GatewayError> {
        *self.list_calls.lock().await += 1;
        if let Some(mode) = *self.fail.lock().await {
            return Err(mode.into_error());
        }
        Ok(self.records.lock().await.clone())
    }

    async fn get(&self, id: &PostId) -> Result<BlogPost, GatewayError> {
        if let Some(mode) = *self.fail.lock().await {
            return Err(mode.into_error());
        }
        self.records
            .lock()
            .await
            .iter()
            .find(|record| &record.id == id)
            .cloned()
            .ok_or_else(|| GatewayError::rejected("Blog post not found"))
    }

    async fn create(&self, payload: PostPayload) -> Result<BlogPost, GatewayError> {
        if let Some(mode) = *self.fail.lock().await {
            return Err(mode.into_error());
        }
        self.creates.lock().await.push(payload.clone());
        let id = {
            let mut next_id = self.next_id.lock().await;
            *next_id += 1;
            PostId::new(format!("b{next_id}"))
        };
        let record = post_from_payload(id, &payload);
        self.records.lock().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &PostId, payload: PostPayload) -> Result<BlogPost, GatewayError> {
        if let Some(mode) = *self.fail.lock().await {
            return Err(mode.into_error());
        }
        self.updates.lock().await.push((id.clone(), payload.clone()));
        let record = post_from_payload(id.clone(), &payload);
        let mut records = self.records.lock().await;
        if let Some(slot) = records.iter_mut().find(|record| &record.id == id) {
            *slot = record.clone();
        }
        Ok(record)
    }

    async fn delete(&self, id: &PostId) -> Result<(), GatewayError> {
        if let Some(mode) = *self.fail.lock().await {
            return Err(mode.into_error());
        }
        self.deletes.lock().await.push(id.clone());
        self.records.lock().await.retain(|record| &record.id != id);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct TestCommentGateway {
    pub created: Mutex<Vec<(PostId, CommentPayload)>>,
    pub fail: Mutex<Option<FailureMode>>,
    next_id: Mutex<u32>,
}

impl TestCommentGateway {
    pub async fn fail_with(&self, mode: FailureMode) {
        *self.fail.lock().await = Some(mode);
    }
}

#[async_trait]
impl CommentGateway for TestCommentGateway {
    async fn create(
        &self,
        post_id: &PostId,
        payload: CommentPayload,
    ) -> Result<Comment, GatewayError> {
        if let Some(mode) = *self.fail.lock().await {
            return Err(mode.into_error());
        }
        self.created
            .lock()
            .await
            .push((post_id.clone(), payload.clone()));
        let id = {
            let mut next_id = self.next_id.lock().await;
            *next_id += 1;
            format!("c{next_id}")
        };
        Ok(Comment {
            id: CommentId::new(id),
            body: payload.body,
            author: Some(sample_user("admin")),
            created_at: timestamp(),
        })
    }
}

#[derive(Default)]
pub(crate) struct TestContactGateway {
    pub messages: Mutex<Vec<ContactMessage>>,
    pub sent: Mutex<Vec<ContactPayload>>,
    pub fail: Mutex<Option<FailureMode>>,
    next_id: Mutex<u32>,
}

impl TestContactGateway {
    pub fn seeded(messages: Vec<ContactMessage>) -> Self {
        Self {
            messages: Mutex::new(messages),
            ..Self::default()
        }
    }

    pub async fn fail_with(&self, mode: FailureMode) {
        *self.fail.lock().await = Some(mode);
    }
}

#[async_trait]
impl ContactGateway for TestContactGateway {
    async fn list(&self) -> Result<Vec<ContactMessage>, GatewayError> {
        if let Some(mode) = *self.fail.lock().await {
            return Err(mode.into_error());
        }
        Ok(self.messages.lock().await.clone())
    }

    async fn send(&self, payload: ContactPayload) -> Result<ContactMessage, GatewayError> {
        if let Some(mode) = *self.fail.lock().await {
            return Err(mode.into_error());
        }
        self.sent.lock().await.push(payload.clone());
        let id = {
            let mut next_id = self.next_id.lock().await;
            *next_id += 1;
            format!("m{next_id}")
        };
        Ok(ContactMessage {
            id: ContactMessageId::new(id),
            name: payload.name,
            email: payload.email,
            subject: None,
            message: payload.message,
            created_at: timestamp(),
        })
    }
}
