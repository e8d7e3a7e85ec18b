use std::env;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::debug;

use course_core::model::{
    AnswerId, AttemptId, Course, CourseId, ProgressRecord, QuestionId, QuestionReview,
    QuizAttempt, QuizId, QuizResult,
};

use crate::api::{CourseApi, ProgressUpdate, StartedAttempt};
use crate::error::ApiError;
use crate::wire::{
    CourseDoc, DetailedResultsDoc, ProgressDoc, QuestionReviewDoc, QuizResultDoc,
    StartAttemptDoc, SubmitAnswerBody, UpdateProgressBody, normalize_attempts,
    normalize_progress,
};

/// Connection settings for the remote course API.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
}

impl ApiConfig {
    /// Read configuration from `COURSE_API_BASE_URL` / `COURSE_API_TOKEN`.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("COURSE_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5000/api/v1".into());
        let auth_token = env::var("COURSE_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        Self {
            base_url,
            auth_token,
        }
    }
}

/// `CourseApi` over HTTP via reqwest.
#[derive(Clone)]
pub struct HttpCourseApi {
    client: Client,
    config: ApiConfig,
}

impl HttpCourseApi {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ApiConfig::from_env())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = self.authorized(builder).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            status if !status.is_success() => Err(ApiError::HttpStatus(status)),
            _ => Ok(response),
        }
    }

    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let response = self.send(self.client.get(self.endpoint(path))).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl CourseApi for HttpCourseApi {
    async fn fetch_course_by_slug(&self, slug: &str) -> Result<Course, ApiError> {
        debug!(slug, "fetching course");
        let response = self
            .send(self.client.get(self.endpoint(&format!("courses/{slug}"))))
            .await?;
        let doc: CourseDoc = response.json().await?;
        doc.into_domain()
    }

    async fn fetch_course_progress(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<ProgressRecord>, ApiError> {
        let value = self
            .get_json(&format!("courses/{course_id}/progress"))
            .await?;
        Ok(normalize_progress(value))
    }

    async fn fetch_quiz_attempts(&self, quiz_id: QuizId) -> Result<Vec<QuizAttempt>, ApiError> {
        let value = self.get_json(&format!("quizzes/{quiz_id}/attempts")).await?;
        Ok(normalize_attempts(value))
    }

    async fn start_quiz(&self, quiz_id: QuizId) -> Result<StartedAttempt, ApiError> {
        debug!(%quiz_id, "starting quiz attempt");
        let response = self
            .send(
                self.client
                    .post(self.endpoint(&format!("quizzes/{quiz_id}/attempts"))),
            )
            .await?;
        let doc: StartAttemptDoc = response.json().await?;
        let questions = doc
            .questions
            .into_iter()
            .map(crate::wire::QuestionDoc::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(StartedAttempt {
            attempt_id: AttemptId::new(doc.attempt_id),
            questions,
            started_at: doc.started_at,
        })
    }

    async fn submit_answer(
        &self,
        attempt_id: AttemptId,
        question_id: QuestionId,
        answer_id: AnswerId,
    ) -> Result<(), ApiError> {
        let body = SubmitAnswerBody {
            answer_id: answer_id.value(),
        };
        self.send(
            self.client
                .put(self.endpoint(&format!(
                    "attempts/{attempt_id}/answers/{question_id}"
                )))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn submit_quiz(&self, attempt_id: AttemptId) -> Result<QuizResult, ApiError> {
        debug!(%attempt_id, "submitting quiz attempt");
        let response = self
            .send(
                self.client
                    .post(self.endpoint(&format!("attempts/{attempt_id}/submit"))),
            )
            .await?;
        let doc: QuizResultDoc = response.json().await?;
        Ok(doc.into_domain())
    }

    async fn update_lesson_progress(
        &self,
        update: ProgressUpdate,
    ) -> Result<ProgressRecord, ApiError> {
        let body = UpdateProgressBody {
            lesson_id: update.lesson_id.value(),
            is_completed: update.is_completed,
            watch_time: update.watch_time_secs,
            last_position: update.last_position_secs,
        };
        let response = self
            .send(self.client.post(self.endpoint("progress")).json(&body))
            .await?;
        let doc: ProgressDoc = response.json().await?;
        Ok(doc.into_domain())
    }

    async fn fetch_detailed_results(
        &self,
        attempt_id: AttemptId,
    ) -> Result<Vec<QuestionReview>, ApiError> {
        let response = self
            .send(
                self.client
                    .get(self.endpoint(&format!("attempts/{attempt_id}/results"))),
            )
            .await?;
        let doc: DetailedResultsDoc = response.json().await?;
        Ok(doc
            .questions
            .into_iter()
            .map(QuestionReviewDoc::into_domain)
            .collect())
    }
}
