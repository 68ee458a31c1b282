use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// --- Identity ---

/// Role
///
/// The RBAC field carried by every user. Only `Admin` unlocks the back-office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// SessionUser
///
/// The identity half of a session, as returned by `/auth/login` and `/auth/register`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Session
///
/// Client-held representation of an authenticated identity and its bearer token.
/// This is the exact object persisted under the `userInfo` storage key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Suspended,
}

/// User
///
/// Account record as listed in the admin user table (GET /admin/users).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
}

/// Profile
///
/// The editable part of the current user's account (GET/PUT /auth/profile).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Profile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub course: Option<String>,
}

/// A populated reference to another record, e.g. a post's author or category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NamedRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

// --- Content ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    #[default]
    Pending,
    Approved,
}

/// Comment
///
/// Owned by its parent post or event. `user` is the author's id and is what the
/// delete-permission check compares against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    /// Display name of the author at the time of posting.
    pub name: String,
    pub user: String,
    pub created_at: DateTime<Utc>,
}

/// BlogPost
///
/// Likes and comments change only through their dedicated endpoints, never
/// through a full-document PUT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<NamedRef>,
    #[serde(default)]
    pub author: Option<NamedRef>,
    pub status: BlogStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event dates arrive either as `YYYY-MM-DD` or as a full ISO timestamp
/// (`2025-03-14T00:00:00.000Z`). Only the UTC calendar day is kept.
fn event_day<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(day) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(day);
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|at| at.with_timezone(&Utc).date_naive())
        .map_err(|e| serde::de::Error::custom(format!("invalid event date '{}': {}", raw, e)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(deserialize_with = "event_day")]
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub organiser: Option<NamedRef>,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub caption: Option<String>,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// CarouselItem
///
/// Homepage slide. `order` is the display sequence; inactive slides are only
/// visible through the admin listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CarouselItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    pub image_url: String,
    pub order: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    #[default]
    Official,
    Executive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Contact {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub contact_type: ContactType,
    pub title: String,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Notification
///
/// Per-user; the read flag is the only state a client may change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: String,
    pub message: String,
    pub link: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

// --- Dashboard ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UserStats {
    pub total: u64,
    pub active: u64,
    pub suspended: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BlogStats {
    pub total: u64,
    pub approved: u64,
    pub pending: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContactStats {
    pub total: u64,
    pub officials: u64,
    pub executives: u64,
}

/// AdminStats
///
/// Output of GET /admin/stats, rendered as the dashboard cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub users: UserStats,
    pub blogs: BlogStats,
    pub events: u64,
    pub gallery_items: u64,
    pub contacts: ContactStats,
}

// --- Request Payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CommentRequest {
    pub text: String,
}

/// BlogUpdate
///
/// Partial update for PUT /blogs/{id}. Only provided fields are serialized, so
/// the moderation call `{ "status": "approved" }` leaves the content untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BlogUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BlogStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CategoryPayload {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContactPayload {
    #[serde(rename = "type")]
    pub contact_type: ContactType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GalleryUpdate {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// CarouselUpdate
///
/// Partial update for PUT /carousel/{id}; the active toggle sends only `isActive`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CarouselUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStatusUpdate {
    pub status: UserStatus,
}

/// Generic `{ "message": "..." }` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MessageResponse {
    pub message: String,
}
