//! Canvas REST API client.

use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::api::auth::Credentials;
use crate::api::pagination::{parse_next_link, with_page_size};
use crate::api::types::*;
use crate::error::{Error, Result};

/// Default Canvas instance.
pub const DEFAULT_BASE_URL: &str = "https://canvas.nus.edu.sg";

/// Path prefix of the REST API.
const API_PREFIX: &str = "/api/v1";

/// Records requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Characters of a response body quoted in parse errors.
const EXCERPT_CHARS: usize = 500;

/// Leading part of a response body, cut on a character boundary.
fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}

/// Canvas API client with bearer authentication.
#[derive(Debug, Clone)]
pub struct CanvasApi {
    client: Client,
    base_url: String,
    credentials: Credentials,
    page_size: u32,
}

impl CanvasApi {
    /// Create a new API client for the instance at `base_url`.
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("canvas-downloader/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Override the page-size hint sent with collection requests.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Shared credential store.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Underlying HTTP client.
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    /// Build a full URL from an API endpoint. Absolute URLs pass through.
    fn resolve(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("{}{}{}", self.base_url, API_PREFIX, endpoint)
        }
    }

    /// Make an authenticated GET request.
    async fn get(&self, url: &str) -> Result<Response> {
        let bearer = self.credentials.bearer().await?;

        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(header::AUTHORIZATION, bearer)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Auth error response: {}", body);
            self.credentials.clear().await;
            return Err(Error::Authentication(
                "Canvas token is invalid or expired. Please reset it.".into(),
            ));
        }

        Ok(response)
    }

    /// Fetch every page of a collection.
    ///
    /// A non-success status or an unparseable page after the first ends
    /// pagination and returns what was collected so far. A 401 fails
    /// immediately without partial data.
    pub async fn fetch_all<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>> {
        let mut next = Some(with_page_size(&self.resolve(endpoint), self.page_size));
        let mut results = Vec::new();

        while let Some(url) = next.take() {
            let response = self.get(&url).await?;
            let status = response.status();

            if !status.is_success() {
                tracing::warn!("Stopping pagination of {} at HTTP {}", url, status);
                break;
            }

            next = response
                .headers()
                .get(header::LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(parse_next_link);

            let text = response.text().await?;
            match serde_json::from_str::<Vec<T>>(&text) {
                Ok(page) => results.extend(page),
                Err(e) if results.is_empty() => {
                    return Err(Error::Api(format!(
                        "Failed to parse page of {}: {} - Response: {}",
                        url,
                        e,
                        excerpt(&text)
                    )));
                }
                Err(e) => {
                    tracing::warn!("Stopping pagination of {}: unparseable page: {}", url, e);
                    break;
                }
            }
        }

        Ok(results)
    }

    /// Fetch a single record. Non-success statuses become
    /// [`Error::UnexpectedStatus`].
    pub async fn fetch_one<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.resolve(endpoint);
        let response = self.get(&url).await?;
        let status = response.status();

        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            Error::Api(format!(
                "Failed to parse {}: {} - Response: {}",
                url,
                e,
                excerpt(&text)
            ))
        })
    }

    /// Validate the stored token by fetching the current user.
    pub async fn validate_token(&self) -> Result<User> {
        self.fetch_one("/users/self").await
    }

    /// Get the current user's profile.
    pub async fn get_profile(&self) -> Result<Profile> {
        self.fetch_one("/users/self/profile").await
    }

    /// Get course information.
    pub async fn get_course(&self, course_id: u64) -> Result<Course> {
        self.fetch_one(&format!("/courses/{}", course_id)).await
    }

    /// Get course information including the syllabus body.
    pub async fn get_syllabus(&self, course_id: u64) -> Result<Course> {
        self.fetch_one(&format!("/courses/{}?include[]=syllabus_body", course_id))
            .await
    }

    /// Get the course front page.
    pub async fn get_front_page(&self, course_id: u64) -> Result<WikiPage> {
        self.fetch_one(&format!("/courses/{}/front_page", course_id))
            .await
    }

    /// List all course files.
    pub async fn list_files(&self, course_id: u64) -> Result<Vec<CanvasFile>> {
        self.fetch_all(&format!("/courses/{}/files", course_id))
            .await
    }

    /// Resolve a file API reference (as found on module items).
    pub async fn resolve_file(&self, api_url: &str) -> Result<CanvasFile> {
        self.fetch_one(api_url).await
    }

    /// List modules with their items.
    pub async fn list_modules(&self, course_id: u64) -> Result<Vec<CanvasModule>> {
        self.fetch_all(&format!("/courses/{}/modules?include[]=items", course_id))
            .await
    }

    /// List assignments.
    pub async fn list_assignments(&self, course_id: u64) -> Result<Vec<Assignment>> {
        self.fetch_all(&format!("/courses/{}/assignments", course_id))
            .await
    }

    /// Get a single assignment.
    pub async fn get_assignment(&self, course_id: u64, id: &ItemId) -> Result<Assignment> {
        self.fetch_one(&format!("/courses/{}/assignments/{}", course_id, id))
            .await
    }

    /// List wiki pages (without bodies).
    pub async fn list_pages(&self, course_id: u64) -> Result<Vec<WikiPage>> {
        self.fetch_all(&format!("/courses/{}/pages", course_id))
            .await
    }

    /// Get a wiki page by URL slug or id.
    pub async fn get_page(&self, course_id: u64, page: &str) -> Result<WikiPage> {
        self.fetch_one(&format!("/courses/{}/pages/{}", course_id, page))
            .await
    }

    /// List quizzes.
    pub async fn list_quizzes(&self, course_id: u64) -> Result<Vec<Quiz>> {
        self.fetch_all(&format!("/courses/{}/quizzes", course_id))
            .await
    }

    /// Get a single quiz.
    pub async fn get_quiz(&self, course_id: u64, id: &ItemId) -> Result<Quiz> {
        self.fetch_one(&format!("/courses/{}/quizzes/{}", course_id, id))
            .await
    }

    /// List discussion topics.
    pub async fn list_discussions(&self, course_id: u64) -> Result<Vec<DiscussionTopic>> {
        self.fetch_all(&format!("/courses/{}/discussion_topics", course_id))
            .await
    }

    /// List announcements.
    pub async fn list_announcements(&self, course_id: u64) -> Result<Vec<DiscussionTopic>> {
        self.fetch_all(&format!(
            "/courses/{}/discussion_topics?only_announcements=true",
            course_id
        ))
        .await
    }

    /// Get a single discussion topic or announcement.
    pub async fn get_discussion(&self, course_id: u64, id: &ItemId) -> Result<DiscussionTopic> {
        self.fetch_one(&format!("/courses/{}/discussion_topics/{}", course_id, id))
            .await
    }

    /// List the current user's submissions.
    pub async fn list_own_submissions(&self, course_id: u64) -> Result<Vec<Submission>> {
        self.fetch_all(&format!(
            "/courses/{}/students/submissions?student_ids[]=self",
            course_id
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_for(server: &MockServer) -> CanvasApi {
        CanvasApi::new(&server.uri(), Credentials::new("1234~token")).unwrap()
    }

    fn file_json(id: u64, name: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "display_name": name,
            "size": 10,
            "url": format!("https://files.example/{}", id),
        })
    }

    #[tokio::test]
    async fn test_fetch_all_follows_next_link() {
        let server = MockServer::start().await;
        let next = format!(
            "{}/api/v1/courses/1/files?page=2&per_page=100",
            server.uri()
        );

        Mock::given(method("GET"))
            .and(path("/api/v1/courses/1/files"))
            .and(query_param("per_page", "100"))
            .and(query_param_is_missing("page"))
            .and(header("authorization", "Bearer 1234~token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(vec![file_json(1, "a.pdf"), file_json(2, "b.pdf")])
                    .insert_header("link", format!("<{}>; rel=\"next\"", next).as_str()),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/courses/1/files"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![file_json(3, "c.pdf")]))
            .expect(1)
            .mount(&server)
            .await;

        let files = api_for(&server).list_files(1).await.unwrap();
        let names: Vec<_> = files.iter().map(|f| f.display_name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf", "c.pdf"]);
    }

    #[tokio::test]
    async fn test_fetch_all_keeps_partial_results_on_failure() {
        let server = MockServer::start().await;
        let next = format!("{}/api/v1/courses/1/files?page=2", server.uri());

        Mock::given(method("GET"))
            .and(path("/api/v1/courses/1/files"))
            .and(query_param_is_missing("page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(vec![file_json(1, "a.pdf")])
                    .insert_header("link", format!("<{}>; rel=\"next\"", next).as_str()),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/courses/1/files"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let files = api_for(&server).list_files(1).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].display_name, "a.pdf");
    }

    #[tokio::test]
    async fn test_unparseable_later_page_keeps_earlier_pages() {
        let server = MockServer::start().await;
        let next = format!("{}/api/v1/courses/1/files?page=2", server.uri());

        Mock::given(method("GET"))
            .and(path("/api/v1/courses/1/files"))
            .and(query_param_is_missing("page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(vec![file_json(1, "a.pdf"), file_json(2, "b.pdf")])
                    .insert_header("link", format!("<{}>; rel=\"next\"", next).as_str()),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/courses/1/files"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops"))
            .expect(1)
            .mount(&server)
            .await;

        let files = api_for(&server).list_files(1).await.unwrap();
        let names: Vec<_> = files.iter().map(|f| f.display_name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
    }

    #[tokio::test]
    async fn test_parse_error_quotes_multibyte_body() {
        let server = MockServer::start().await;
        let body = format!("{}\u{e9} and more", "x".repeat(499));

        Mock::given(method("GET"))
            .and(path("/api/v1/courses/1/quizzes"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/courses/1/quizzes/5"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let api = api_for(&server);
        let err = api.list_quizzes(1).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains(&format!("{}\u{e9}", "x".repeat(499))));
        assert!(!message.contains(" and more"));

        let err = api.get_quiz(1, &ItemId::Numeric(5)).await.unwrap_err();
        assert!(matches!(err, Error::Api(_)));
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        let text = "\u{e9}".repeat(600);
        assert_eq!(excerpt(&text).chars().count(), EXCERPT_CHARS);
        assert_eq!(excerpt("short"), "short");
    }

    #[tokio::test]
    async fn test_unauthorized_clears_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
            .mount(&server)
            .await;

        let api = api_for(&server);
        let err = api.list_assignments(1).await.unwrap_err();
        assert!(err.is_authentication());
        assert!(!api.credentials().is_set().await);

        // Without a token, nothing else reaches the server.
        let err = api.get_course(1).await.unwrap_err();
        assert!(err.is_authentication());
    }

    #[tokio::test]
    async fn test_fetch_one_non_success_is_status_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/courses/1/quizzes/5"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = api_for(&server)
            .get_quiz(1, &ItemId::Numeric(5))
            .await
            .unwrap_err();
        match err {
            Error::UnexpectedStatus { status, url } => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/api/v1/courses/1/quizzes/5"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_one_accepts_absolute_urls() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/courses/1/files/77"))
            .respond_with(ResponseTemplate::new(200).set_body_json(file_json(77, "notes.pdf")))
            .mount(&server)
            .await;

        let api_url = format!("{}/api/v1/courses/1/files/77", server.uri());
        let file = api_for(&server).resolve_file(&api_url).await.unwrap();
        assert_eq!(file.url.as_deref(), Some("https://files.example/77"));
    }
}
