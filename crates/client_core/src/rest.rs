use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use shared::domain::{PostId, ProjectId};
use shared::error::ApiError;
use shared::protocol::{
    BlogPost, Comment, CommentPayload, ContactMessage, ContactPayload, PostPayload, Project,
    ProjectPayload,
};

use crate::error::GatewayError;
use crate::workflow::RecordGateway;
use crate::{AuthState, CommentGateway, ContactGateway};

/// REST binding of the gateway capabilities. Attaches the current bearer
/// token, when the auth collaborator supplies one, to every request.
pub struct RestGateway {
    http: Client,
    base_url: Url,
    auth: Arc<dyn AuthState>,
}

impl RestGateway {
    pub fn new(base_url: &str, auth: Arc<dyn AuthState>) -> Result<Self> {
        let base_url = Url::parse(base_url).context("invalid API base url")?;
        Ok(Self {
            http: Client::new(),
            base_url,
            auth,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.auth.access_token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let request = self.authorize(self.http.get(self.endpoint(path))).await;
        decode(request.send().await?).await
    }
}

/// Maps a non-success response to the error taxonomy: an interpretable
/// `ApiError` body becomes a rejection carrying the server's message, any
/// other failure keeps only the status.
async fn interpret_failure(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if let Ok(body) = response.json::<ApiError>().await {
        return Err(GatewayError::Rejected {
            message: body.message,
        });
    }
    Err(GatewayError::Status {
        status: status.as_u16(),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let response = interpret_failure(response).await?;
    Ok(response.json().await?)
}

#[async_trait]
impl RecordGateway<Project> for RestGateway {
    async fn list(&self) -> Result<Vec<Project>, GatewayError> {
        self.get_json("/api/projects").await
    }

    async fn get(&self, id: &ProjectId) -> Result<Project, GatewayError> {
        self.get_json(&format!("/api/projects/{id}")).await
    }

    async fn create(&self, payload: ProjectPayload) -> Result<Project, GatewayError> {
        let request = self
            .authorize(self.http.post(self.endpoint("/api/projects")))
            .await;
        decode(request.json(&payload).send().await?).await
    }

    async fn update(&self, id: &ProjectId, payload: ProjectPayload) -> Result<Project, GatewayError> {
        let request = self
            .authorize(self.http.put(self.endpoint(&format!("/api/projects/{id}"))))
            .await;
        decode(request.json(&payload).send().await?).await
    }

    async fn delete(&self, id: &ProjectId) -> Result<(), GatewayError> {
        let request = self
            .authorize(
                self.http
                    .delete(self.endpoint(&format!("/api/projects/{id}"))),
            )
            .await;
        interpret_failure(request.send().await?).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordGateway<BlogPost> for RestGateway {
    async fn list(&self) -> Result<Vec<BlogPost>, GatewayError> {
        self.get_json("/api/blog").await
    }

    async fn get(&self, id: &PostId) -> Result<BlogPost, GatewayError> {
        self.get_json(&format!("/api/blog/{id}")).await
    }

    async fn create(&self, payload: PostPayload) -> Result<BlogPost, GatewayError> {
        let request = self
            .authorize(self.http.post(self.endpoint("/api/blog")))
            .await;
        decode(request.json(&payload).send().await?).await
    }

    async fn update(&self, id: &PostId, payload: PostPayload) -> Result<BlogPost, GatewayError> {
        let request = self
            .authorize(self.http.put(self.endpoint(&format!("/api/blog/{id}"))))
            .await;
        decode(request.json(&payload).send().await?).await
    }

    async fn delete(&self, id: &PostId) -> Result<(), GatewayError> {
        let request = self
            .authorize(self.http.delete(self.endpoint(&format!("/api/blog/{id}"))))
            .await;
        interpret_failure(request.send().await?).await?;
        Ok(())
    }
}

#[async_trait]
impl CommentGateway for RestGateway {
    async fn create(
        &self,
        post_id: &PostId,
        payload: CommentPayload,
    ) -> Result<Comment, GatewayError> {
        let request = self
            .authorize(
                self.http
                    .post(self.endpoint(&format!("/api/blog/{post_id}/comments"))),
            )
            .await;
        decode(request.json(&payload).send().await?).await
    }
}

#[async_trait]
impl ContactGateway for RestGateway {
    async fn list(&self) -> Result<Vec<ContactMessage>, GatewayError> {
        self.get_json("/api/contact").await
    }

    async fn send(&self, payload: ContactPayload) -> Result<ContactMessage, GatewayError> {
        let request = self
            .authorize(self.http.post(self.endpoint("/api/contact")))
            .await;
        decode(request.json(&payload).send().await?).await
    }
}

#[cfg(test)]
#[path = "tests/rest_tests.rs"]
mod tests;
