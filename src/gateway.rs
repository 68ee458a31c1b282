use std::path::Path;

use reqwest::{Client, Method, RequestBuilder, Response, multipart};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::filters::{BlogFilter, EventFilter};
use crate::models::{
    AdminStats, BlogPost, BlogUpdate, CarouselItem, CarouselUpdate, Category, CategoryPayload,
    Comment, CommentRequest, Contact, ContactMessage, ContactPayload, Event, GalleryItem,
    GalleryUpdate, LoginRequest, MessageResponse, Notification, Profile, RegisterRequest, Session,
    User, UserStatus, UserStatusUpdate,
};

/// Name of the multipart field carrying the uploaded file.
pub const IMAGE_FIELD: &str = "image";

/// Upload
///
/// A file picked in a form, ready to be sent as the `image` part.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();
        Ok(Self::new(file_name, bytes))
    }
}

/// Best-effort MIME type from the file extension.
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// RequestBody
///
/// Payload of a file-bearing write. Multipart is used only when a file is
/// attached; otherwise the same fields go out as a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Multipart {
        fields: Vec<(String, String)>,
        image: Upload,
    },
}

impl RequestBody {
    pub fn from_fields(fields: Vec<(&str, String)>, image: Option<Upload>) -> Self {
        match image {
            Some(image) => RequestBody::Multipart {
                fields: fields
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
                image,
            },
            None => {
                let map: Map<String, Value> = fields
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), Value::String(v)))
                    .collect();
                RequestBody::Json(Value::Object(map))
            }
        }
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self, RequestBody::Multipart { .. })
    }

    fn attach(self, builder: RequestBuilder) -> ApiResult<RequestBuilder> {
        match self {
            RequestBody::Json(value) => Ok(builder.json(&value)),
            RequestBody::Multipart { fields, image } => {
                let mut form = multipart::Form::new();
                for (name, value) in fields {
                    form = form.text(name, value);
                }
                let part = multipart::Part::bytes(image.bytes)
                    .file_name(image.file_name)
                    .mime_str(&image.content_type)
                    .map_err(|e| ApiError::Upload(e.to_string()))?;
                Ok(builder.multipart(form.part(IMAGE_FIELD, part)))
            }
        }
    }
}

/// ApiClient
///
/// Gateway to the REST API: one method per (resource, verb). Authenticated
/// methods take the bearer token explicitly; nothing here reads the session.
/// Every call is a single round trip with no retry.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, authenticated = token.is_some(), "api request");
        let builder = self.http.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn checked(builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message);
        tracing::warn!(%status, message = message.as_deref().unwrap_or(""), "api request failed");
        Err(ApiError::Status { status, message })
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> ApiResult<T> {
        let response = Self::checked(builder).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_unit(builder: RequestBuilder) -> ApiResult<()> {
        Self::checked(builder).await?;
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> ApiResult<T> {
        Self::send(self.request(Method::GET, path, token)).await
    }

    async fn write<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> ApiResult<T> {
        Self::send(self.request(method, path, token).json(body)).await
    }

    async fn write_body<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        token: &str,
    ) -> ApiResult<T> {
        let builder = body.attach(self.request(method, path, Some(token)))?;
        Self::send(builder).await
    }

    async fn delete(&self, path: &str, token: &str) -> ApiResult<()> {
        Self::send_unit(self.request(Method::DELETE, path, Some(token))).await
    }

    // --- Auth ---

    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<Session> {
        self.write(Method::POST, "/auth/register", request, None).await
    }

    pub async fn login(&self, request: &LoginRequest) -> ApiResult<Session> {
        self.write(Method::POST, "/auth/login", request, None).await
    }

    pub async fn fetch_profile(&self, token: &str) -> ApiResult<Profile> {
        self.get("/auth/profile", Some(token)).await
    }

    pub async fn update_profile(&self, profile: &Profile, token: &str) -> ApiResult<Profile> {
        self.write(Method::PUT, "/auth/profile", profile, Some(token))
            .await
    }

    // --- Blogs ---

    pub async fn fetch_blogs(&self, filter: &BlogFilter) -> ApiResult<Vec<BlogPost>> {
        let builder = self
            .request(Method::GET, "/blogs", None)
            .query(&filter.to_query());
        Self::send(builder).await
    }

    pub async fn fetch_blog(&self, id: &str) -> ApiResult<BlogPost> {
        self.get(&format!("/blogs/{}", id), None).await
    }

    pub async fn create_blog(&self, body: RequestBody, token: &str) -> ApiResult<BlogPost> {
        self.write_body(Method::POST, "/blogs", body, token).await
    }

    pub async fn fetch_all_blogs_for_admin(&self, token: &str) -> ApiResult<Vec<BlogPost>> {
        self.get("/blogs/admin", Some(token)).await
    }

    pub async fn update_blog(
        &self,
        id: &str,
        update: &BlogUpdate,
        token: &str,
    ) -> ApiResult<BlogPost> {
        self.write(Method::PUT, &format!("/blogs/{}", id), update, Some(token))
            .await
    }

    pub async fn delete_blog(&self, id: &str, token: &str) -> ApiResult<()> {
        self.delete(&format!("/blogs/{}", id), token).await
    }

    /// Toggles the caller's like and returns the post with its new like set.
    pub async fn like_blog(&self, id: &str, token: &str) -> ApiResult<BlogPost> {
        self.write(
            Method::PUT,
            &format!("/blogs/{}/like", id),
            &Value::Object(Map::new()),
            Some(token),
        )
        .await
    }

    /// Appends a comment and returns the post's full comment list.
    pub async fn add_blog_comment(
        &self,
        id: &str,
        comment: &CommentRequest,
        token: &str,
    ) -> ApiResult<Vec<Comment>> {
        self.write(
            Method::POST,
            &format!("/blogs/{}/comments", id),
            comment,
            Some(token),
        )
        .await
    }

    pub async fn delete_blog_comment(
        &self,
        blog_id: &str,
        comment_id: &str,
        token: &str,
    ) -> ApiResult<()> {
        self.delete(&format!("/blogs/{}/comments/{}", blog_id, comment_id), token)
            .await
    }

    // --- Categories ---

    pub async fn fetch_categories(&self) -> ApiResult<Vec<Category>> {
        self.get("/categories", None).await
    }

    pub async fn create_category(
        &self,
        payload: &CategoryPayload,
        token: &str,
    ) -> ApiResult<Category> {
        self.write(Method::POST, "/categories", payload, Some(token))
            .await
    }

    pub async fn update_category(
        &self,
        id: &str,
        payload: &CategoryPayload,
        token: &str,
    ) -> ApiResult<Category> {
        self.write(
            Method::PUT,
            &format!("/categories/{}", id),
            payload,
            Some(token),
        )
        .await
    }

    pub async fn delete_category(&self, id: &str, token: &str) -> ApiResult<()> {
        self.delete(&format!("/categories/{}", id), token).await
    }

    // --- Events ---

    pub async fn fetch_events(&self, filter: &EventFilter) -> ApiResult<Vec<Event>> {
        let builder = self
            .request(Method::GET, "/events", None)
            .query(&filter.to_query());
        Self::send(builder).await
    }

    pub async fn fetch_event(&self, id: &str) -> ApiResult<Event> {
        self.get(&format!("/events/{}", id), None).await
    }

    pub async fn create_event(&self, body: RequestBody, token: &str) -> ApiResult<Event> {
        self.write_body(Method::POST, "/events", body, token).await
    }

    pub async fn update_event(
        &self,
        id: &str,
        body: RequestBody,
        token: &str,
    ) -> ApiResult<Event> {
        self.write_body(Method::PUT, &format!("/events/{}", id), body, token)
            .await
    }

    pub async fn delete_event(&self, id: &str, token: &str) -> ApiResult<()> {
        self.delete(&format!("/events/{}", id), token).await
    }

    pub async fn like_event(&self, id: &str, token: &str) -> ApiResult<Event> {
        self.write(
            Method::PUT,
            &format!("/events/{}/like", id),
            &Value::Object(Map::new()),
            Some(token),
        )
        .await
    }

    /// Appends a comment and returns only the new comment; callers re-fetch the event.
    pub async fn add_event_comment(
        &self,
        id: &str,
        comment: &CommentRequest,
        token: &str,
    ) -> ApiResult<Comment> {
        self.write(
            Method::POST,
            &format!("/events/{}/comments", id),
            comment,
            Some(token),
        )
        .await
    }

    pub async fn delete_event_comment(
        &self,
        event_id: &str,
        comment_id: &str,
        token: &str,
    ) -> ApiResult<()> {
        self.delete(
            &format!("/events/{}/comments/{}", event_id, comment_id),
            token,
        )
        .await
    }

    // --- Contacts ---

    pub async fn fetch_contacts(&self) -> ApiResult<Vec<Contact>> {
        self.get("/contacts", None).await
    }

    pub async fn send_contact_message(
        &self,
        message: &ContactMessage,
    ) -> ApiResult<MessageResponse> {
        self.write(Method::POST, "/contacts/message", message, None)
            .await
    }

    pub async fn create_contact(&self, payload: &ContactPayload, token: &str) -> ApiResult<Contact> {
        self.write(Method::POST, "/contacts", payload, Some(token))
            .await
    }

    pub async fn update_contact(
        &self,
        id: &str,
        payload: &ContactPayload,
        token: &str,
    ) -> ApiResult<Contact> {
        self.write(
            Method::PUT,
            &format!("/contacts/{}", id),
            payload,
            Some(token),
        )
        .await
    }

    pub async fn delete_contact(&self, id: &str, token: &str) -> ApiResult<()> {
        self.delete(&format!("/contacts/{}", id), token).await
    }

    // --- Gallery ---

    pub async fn fetch_gallery(&self) -> ApiResult<Vec<GalleryItem>> {
        self.get("/gallery", None).await
    }

    pub async fn create_gallery_item(
        &self,
        body: RequestBody,
        token: &str,
    ) -> ApiResult<GalleryItem> {
        self.write_body(Method::POST, "/gallery", body, token).await
    }

    pub async fn update_gallery_item(
        &self,
        id: &str,
        update: &GalleryUpdate,
        token: &str,
    ) -> ApiResult<GalleryItem> {
        self.write(Method::PUT, &format!("/gallery/{}", id), update, Some(token))
            .await
    }

    pub async fn delete_gallery_item(&self, id: &str, token: &str) -> ApiResult<()> {
        self.delete(&format!("/gallery/{}", id), token).await
    }

    // --- Carousel ---

    /// Active slides only, in display order.
    pub async fn fetch_carousel(&self) -> ApiResult<Vec<CarouselItem>> {
        self.get("/carousel", None).await
    }

    pub async fn fetch_all_carousel(&self, token: &str) -> ApiResult<Vec<CarouselItem>> {
        self.get("/carousel/admin", Some(token)).await
    }

    pub async fn create_carousel_item(
        &self,
        body: RequestBody,
        token: &str,
    ) -> ApiResult<CarouselItem> {
        self.write_body(Method::POST, "/carousel", body, token).await
    }

    pub async fn update_carousel_item(
        &self,
        id: &str,
        update: &CarouselUpdate,
        token: &str,
    ) -> ApiResult<CarouselItem> {
        self.write(
            Method::PUT,
            &format!("/carousel/{}", id),
            update,
            Some(token),
        )
        .await
    }

    pub async fn delete_carousel_item(&self, id: &str, token: &str) -> ApiResult<()> {
        self.delete(&format!("/carousel/{}", id), token).await
    }

    // --- Admin ---

    pub async fn fetch_admin_stats(&self, token: &str) -> ApiResult<AdminStats> {
        self.get("/admin/stats", Some(token)).await
    }

    pub async fn fetch_admin_users(&self, token: &str) -> ApiResult<Vec<User>> {
        self.get("/admin/users", Some(token)).await
    }

    pub async fn update_user_status(
        &self,
        id: &str,
        status: UserStatus,
        token: &str,
    ) -> ApiResult<User> {
        self.write(
            Method::PUT,
            &format!("/admin/users/{}", id),
            &UserStatusUpdate { status },
            Some(token),
        )
        .await
    }

    pub async fn delete_user(&self, id: &str, token: &str) -> ApiResult<()> {
        self.delete(&format!("/admin/users/{}", id), token).await
    }

    // --- Notifications ---

    pub async fn fetch_notifications(&self, token: &str) -> ApiResult<Vec<Notification>> {
        self.get("/notifications", Some(token)).await
    }

    pub async fn mark_notification_read(&self, id: &str, token: &str) -> ApiResult<Notification> {
        self.write(
            Method::PUT,
            &format!("/notifications/{}/read", id),
            &Value::Object(Map::new()),
            Some(token),
        )
        .await
    }

    pub async fn mark_all_notifications_read(&self, token: &str) -> ApiResult<MessageResponse> {
        self.write(
            Method::PUT,
            "/notifications/read-all",
            &Value::Object(Map::new()),
            Some(token),
        )
        .await
    }
}
