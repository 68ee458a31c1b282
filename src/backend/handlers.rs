use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::BackendState;
use super::auth::{AdminUser, AuthUser, issue_token};
use super::error::{BackendError, BackendResult};
use super::extract::{FormPayload, UploadedFile};
use super::repository::{BlogQuery, EventChanges, NewBlog, NewCarouselItem, NewUser};
use crate::models::{
    AdminStats, BlogPost, BlogStatus, BlogUpdate, CarouselItem, CarouselUpdate, Category,
    CategoryPayload, Comment, CommentRequest, Contact, ContactMessage, ContactPayload, Event,
    GalleryItem, GalleryUpdate, LoginRequest, MessageResponse, Notification, Profile,
    RegisterRequest, Role, Session, SessionUser, User, UserStatus, UserStatusUpdate,
};

type Created<T> = (StatusCode, Json<T>);

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_string(),
    })
}

fn required(value: &str, label: &str) -> BackendResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BackendError::bad_request(format!("Please provide a {}", label)));
    }
    Ok(value.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts `YYYY-MM-DD` as well as a full ISO timestamp.
fn parse_day(raw: &str) -> BackendResult<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|_| BackendError::bad_request(format!("Invalid date: {}", raw)))
}

/// Hands an uploaded image to the storage service under `{folder}/{uuid}-{name}`.
async fn store_image(
    state: &BackendState,
    folder: &str,
    image: Option<UploadedFile>,
) -> BackendResult<Option<String>> {
    let Some(image) = image else {
        return Ok(None);
    };
    let key = format!("{}/{}-{}", folder, Uuid::new_v4(), image.file_name);
    let url = state
        .storage
        .upload(&key, image.bytes, &image.content_type)
        .await?;
    tracing::info!(%key, "image stored");
    Ok(Some(url))
}

fn new_comment(user: &AuthUser, text: &str) -> BackendResult<Comment> {
    Ok(Comment {
        id: Uuid::new_v4().to_string(),
        text: required(text, "comment")?,
        name: user.name.clone(),
        user: user.id.clone(),
        created_at: Utc::now(),
    })
}

// --- Auth ---

fn session_for(state: &BackendState, user: &User) -> BackendResult<Session> {
    Ok(Session {
        token: issue_token(&user.id, &state.config.jwt_secret)?,
        user: SessionUser {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        },
    })
}

/// register_user
///
/// Creates a plain `user` account and signs it in.
pub async fn register_user(
    State(state): State<BackendState>,
    Json(payload): Json<RegisterRequest>,
) -> BackendResult<Created<Session>> {
    let name = required(&payload.name, "name")?;
    let email = required(&payload.email, "email")?;
    let password = required(&payload.password, "password")?;

    let password_hash = bcrypt::hash(&password, state.config.password_cost)?;
    let user = state
        .repo
        .create_user(NewUser {
            name,
            email,
            password_hash,
            role: Role::User,
            course: non_blank(payload.course),
        })
        .await
        .ok_or_else(|| BackendError::bad_request("User already exists"))?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(session_for(&state, &user)?)))
}

pub async fn login_user(
    State(state): State<BackendState>,
    Json(payload): Json<LoginRequest>,
) -> BackendResult<Json<Session>> {
    let invalid = || BackendError::Unauthorized("Invalid email or password".to_string());

    let stored = state
        .repo
        .find_user_by_email(&payload.email)
        .await
        .ok_or_else(invalid)?;
    if !bcrypt::verify(&payload.password, &stored.password_hash)? {
        return Err(invalid());
    }
    if stored.user.status == UserStatus::Suspended {
        return Err(BackendError::forbidden("Your account has been suspended"));
    }

    Ok(Json(session_for(&state, &stored.user)?))
}

pub async fn get_profile(user: AuthUser, State(state): State<BackendState>) -> BackendResult<Json<Profile>> {
    let user = state
        .repo
        .get_user(&user.id)
        .await
        .ok_or_else(|| BackendError::not_found("User"))?;
    Ok(Json(Profile {
        name: user.name,
        email: user.email,
        course: user.course,
    }))
}

pub async fn update_profile(
    user: AuthUser,
    State(state): State<BackendState>,
    Json(payload): Json<Profile>,
) -> BackendResult<Json<Profile>> {
    let profile = Profile {
        name: required(&payload.name, "name")?,
        email: required(&payload.email, "email")?,
        course: non_blank(payload.course),
    };
    let updated = state
        .repo
        .update_profile(&user.id, profile)
        .await
        .ok_or_else(|| BackendError::bad_request("Email is already in use"))?;
    Ok(Json(Profile {
        name: updated.name,
        email: updated.email,
        course: updated.course,
    }))
}

// --- Blogs ---

/// Query string of GET /blogs. Every field is optional.
#[derive(Debug, Deserialize)]
pub struct BlogListParams {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
    pub limit: Option<usize>,
}

/// get_blogs
///
/// Approved posts only, newest first.
pub async fn get_blogs(
    State(state): State<BackendState>,
    Query(params): Query<BlogListParams>,
) -> BackendResult<Json<Vec<BlogPost>>> {
    let date = match non_blank(params.date) {
        Some(raw) => Some(parse_day(&raw)?),
        None => None,
    };
    let query = BlogQuery {
        keyword: non_blank(params.keyword),
        category: non_blank(params.category),
        date,
        limit: params.limit,
    };
    Ok(Json(state.repo.list_blogs(&query).await))
}

pub async fn get_blog(
    State(state): State<BackendState>,
    Path(id): Path<String>,
) -> BackendResult<Json<BlogPost>> {
    state
        .repo
        .get_blog(&id)
        .await
        .map(Json)
        .ok_or_else(|| BackendError::not_found("Blog"))
}

pub async fn get_admin_blogs(
    _admin: AdminUser,
    State(state): State<BackendState>,
) -> Json<Vec<BlogPost>> {
    Json(state.repo.list_all_blogs().await)
}

/// create_blog
///
/// Posts by admins are published immediately; everyone else's wait for approval.
pub async fn create_blog(
    user: AuthUser,
    State(state): State<BackendState>,
    payload: FormPayload,
) -> BackendResult<Created<BlogPost>> {
    let title = payload.require("title")?;
    let content = payload.require("content")?;
    let category_id = payload.text("category");
    if let Some(id) = &category_id {
        if state.repo.get_category(id).await.is_none() {
            return Err(BackendError::bad_request("Invalid category"));
        }
    }

    let image_url = store_image(&state, "blogs", payload.image).await?;
    let status = if user.is_admin() {
        BlogStatus::Approved
    } else {
        BlogStatus::Pending
    };

    let post = state
        .repo
        .create_blog(NewBlog {
            title,
            content,
            category_id,
            author_id: user.id.clone(),
            status,
            image_url,
        })
        .await;
    tracing::info!(blog_id = %post.id, ?status, "blog created");
    Ok((StatusCode::CREATED, Json(post)))
}

/// update_blog
///
/// Author or admin may edit; only an admin may change the status.
pub async fn update_blog(
    user: AuthUser,
    State(state): State<BackendState>,
    Path(id): Path<String>,
    Json(update): Json<BlogUpdate>,
) -> BackendResult<Json<BlogPost>> {
    let post = state
        .repo
        .get_blog(&id)
        .await
        .ok_or_else(|| BackendError::not_found("Blog"))?;

    let author_id = post.author.map(|a| a.id).unwrap_or_default();
    if !user.can_manage(&author_id) {
        return Err(BackendError::forbidden("Not authorized to edit this blog"));
    }
    if update.status.is_some() && !user.is_admin() {
        return Err(BackendError::forbidden("Only admins can change blog status"));
    }

    state
        .repo
        .update_blog(&id, update)
        .await
        .map(Json)
        .ok_or_else(|| BackendError::not_found("Blog"))
}

pub async fn delete_blog(
    user: AuthUser,
    State(state): State<BackendState>,
    Path(id): Path<String>,
) -> BackendResult<Json<MessageResponse>> {
    let post = state
        .repo
        .get_blog(&id)
        .await
        .ok_or_else(|| BackendError::not_found("Blog"))?;
    let author_id = post.author.map(|a| a.id).unwrap_or_default();
    if !user.can_manage(&author_id) {
        return Err(BackendError::forbidden("Not authorized to delete this blog"));
    }
    state.repo.delete_blog(&id).await;
    Ok(message("Blog removed"))
}

/// like_blog
///
/// Toggles the caller's like. The author hears about new likes from others.
pub async fn like_blog(
    user: AuthUser,
    State(state): State<BackendState>,
    Path(id): Path<String>,
) -> BackendResult<Json<BlogPost>> {
    let (post, liked) = state
        .repo
        .toggle_blog_like(&id, &user.id)
        .await
        .ok_or_else(|| BackendError::not_found("Blog"))?;

    if let Some(author) = post.author.as_ref().filter(|a| liked && a.id != user.id) {
        state
            .repo
            .create_notification(
                &author.id,
                format!("{} liked your blog post \"{}\"", user.name, post.title),
                format!("/blog/{}", post.id),
            )
            .await;
    }
    Ok(Json(post))
}

/// add_blog_comment
///
/// Responds with the post's full comment list.
pub async fn add_blog_comment(
    user: AuthUser,
    State(state): State<BackendState>,
    Path(id): Path<String>,
    Json(payload): Json<CommentRequest>,
) -> BackendResult<Created<Vec<Comment>>> {
    let comment = new_comment(&user, &payload.text)?;
    let comments = state
        .repo
        .add_blog_comment(&id, comment)
        .await
        .ok_or_else(|| BackendError::not_found("Blog"))?;

    if let Some(post) = state.repo.get_blog(&id).await {
        if let Some(author) = post.author.filter(|a| a.id != user.id) {
            state
                .repo
                .create_notification(
                    &author.id,
                    format!("{} commented on your blog post \"{}\"", user.name, post.title),
                    format!("/blog/{}", post.id),
                )
                .await;
        }
    }
    Ok((StatusCode::CREATED, Json(comments)))
}

pub async fn delete_blog_comment(
    user: AuthUser,
    State(state): State<BackendState>,
    Path((id, comment_id)): Path<(String, String)>,
) -> BackendResult<Json<MessageResponse>> {
    let post = state
        .repo
        .get_blog(&id)
        .await
        .ok_or_else(|| BackendError::not_found("Blog"))?;
    let comment = post
        .comments
        .iter()
        .find(|c| c.id == comment_id)
        .ok_or_else(|| BackendError::not_found("Comment"))?;
    if !user.can_manage(&comment.user) {
        return Err(BackendError::forbidden("Not authorized to delete this comment"));
    }
    state.repo.delete_blog_comment(&id, &comment_id).await;
    Ok(message("Comment removed"))
}

// --- Categories ---

pub async fn get_categories(State(state): State<BackendState>) -> Json<Vec<Category>> {
    Json(state.repo.list_categories().await)
}

pub async fn create_category(
    _admin: AdminUser,
    State(state): State<BackendState>,
    Json(payload): Json<CategoryPayload>,
) -> BackendResult<Created<Category>> {
    let name = required(&payload.name, "name")?;
    let category = state
        .repo
        .create_category(name)
        .await
        .ok_or_else(|| BackendError::bad_request("Category already exists"))?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    _admin: AdminUser,
    State(state): State<BackendState>,
    Path(id): Path<String>,
    Json(payload): Json<CategoryPayload>,
) -> BackendResult<Json<Category>> {
    let name = required(&payload.name, "name")?;
    if state.repo.get_category(&id).await.is_none() {
        return Err(BackendError::not_found("Category"));
    }
    state
        .repo
        .update_category(&id, name)
        .await
        .map(Json)
        .ok_or_else(|| BackendError::bad_request("Category already exists"))
}

pub async fn delete_category(
    _admin: AdminUser,
    State(state): State<BackendState>,
    Path(id): Path<String>,
) -> BackendResult<Json<MessageResponse>> {
    if !state.repo.delete_category(&id).await {
        return Err(BackendError::not_found("Category"));
    }
    Ok(message("Category removed"))
}

// --- Events ---

#[derive(Debug, Deserialize)]
pub struct EventListParams {
    pub limit: Option<usize>,
}

pub async fn get_events(
    State(state): State<BackendState>,
    Query(params): Query<EventListParams>,
) -> Json<Vec<Event>> {
    Json(state.repo.list_events(params.limit).await)
}

pub async fn get_event(
    State(state): State<BackendState>,
    Path(id): Path<String>,
) -> BackendResult<Json<Event>> {
    state
        .repo
        .get_event(&id)
        .await
        .map(Json)
        .ok_or_else(|| BackendError::not_found("Event"))
}

fn event_changes(payload: &FormPayload) -> BackendResult<EventChanges> {
    let date = match payload.text("date") {
        Some(raw) => Some(parse_day(&raw)?),
        None => None,
    };
    Ok(EventChanges {
        title: payload.text("title"),
        description: payload.text("description"),
        date,
        venue: payload.text("venue"),
        registration_link: payload.text("registrationLink"),
        image_url: None,
    })
}

pub async fn create_event(
    AdminUser(admin): AdminUser,
    State(state): State<BackendState>,
    payload: FormPayload,
) -> BackendResult<Created<Event>> {
    payload.require("title")?;
    payload.require("description")?;
    payload.require("date")?;

    let mut changes = event_changes(&payload)?;
    changes.image_url = store_image(&state, "events", payload.image).await?;

    let event = state
        .repo
        .create_event(changes, &admin.id)
        .await
        .ok_or_else(|| BackendError::bad_request("Please provide a title, description and date"))?;
    tracing::info!(event_id = %event.id, "event created");
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    _admin: AdminUser,
    State(state): State<BackendState>,
    Path(id): Path<String>,
    payload: FormPayload,
) -> BackendResult<Json<Event>> {
    if state.repo.get_event(&id).await.is_none() {
        return Err(BackendError::not_found("Event"));
    }
    let mut changes = event_changes(&payload)?;
    changes.image_url = store_image(&state, "events", payload.image).await?;

    state
        .repo
        .update_event(&id, changes)
        .await
        .map(Json)
        .ok_or_else(|| BackendError::not_found("Event"))
}

pub async fn delete_event(
    _admin: AdminUser,
    State(state): State<BackendState>,
    Path(id): Path<String>,
) -> BackendResult<Json<MessageResponse>> {
    if !state.repo.delete_event(&id).await {
        return Err(BackendError::not_found("Event"));
    }
    Ok(message("Event removed"))
}

pub async fn like_event(
    user: AuthUser,
    State(state): State<BackendState>,
    Path(id): Path<String>,
) -> BackendResult<Json<Event>> {
    let (event, liked) = state
        .repo
        .toggle_event_like(&id, &user.id)
        .await
        .ok_or_else(|| BackendError::not_found("Event"))?;

    if let Some(organiser) = event.organiser.as_ref().filter(|o| liked && o.id != user.id) {
        state
            .repo
            .create_notification(
                &organiser.id,
                format!("{} liked your event \"{}\"", user.name, event.title),
                format!("/events/{}", event.id),
            )
            .await;
    }
    Ok(Json(event))
}

/// add_event_comment
///
/// Responds with the new comment only.
pub async fn add_event_comment(
    user: AuthUser,
    State(state): State<BackendState>,
    Path(id): Path<String>,
    Json(payload): Json<CommentRequest>,
) -> BackendResult<Created<Comment>> {
    let comment = new_comment(&user, &payload.text)?;
    let comment = state
        .repo
        .add_event_comment(&id, comment)
        .await
        .ok_or_else(|| BackendError::not_found("Event"))?;

    if let Some(event) = state.repo.get_event(&id).await {
        if let Some(organiser) = event.organiser.filter(|o| o.id != user.id) {
            state
                .repo
                .create_notification(
                    &organiser.id,
                    format!("{} commented on your event \"{}\"", user.name, event.title),
                    format!("/events/{}", event.id),
                )
                .await;
        }
    }
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn delete_event_comment(
    user: AuthUser,
    State(state): State<BackendState>,
    Path((id, comment_id)): Path<(String, String)>,
) -> BackendResult<Json<MessageResponse>> {
    let event = state
        .repo
        .get_event(&id)
        .await
        .ok_or_else(|| BackendError::not_found("Event"))?;
    let comment = event
        .comments
        .iter()
        .find(|c| c.id == comment_id)
        .ok_or_else(|| BackendError::not_found("Comment"))?;
    if !user.can_manage(&comment.user) {
        return Err(BackendError::forbidden("Not authorized to delete this comment"));
    }
    state.repo.delete_event_comment(&id, &comment_id).await;
    Ok(message("Comment removed"))
}

// --- Contacts ---

pub async fn get_contacts(State(state): State<BackendState>) -> Json<Vec<Contact>> {
    Json(state.repo.list_contacts().await)
}

/// send_contact_message
///
/// Accepts a visitor's message. Delivery is only logged.
pub async fn send_contact_message(
    Json(payload): Json<ContactMessage>,
) -> BackendResult<Json<MessageResponse>> {
    let name = required(&payload.name, "name")?;
    let email = required(&payload.email, "email")?;
    required(&payload.message, "message")?;
    tracing::info!(%name, %email, subject = %payload.subject, "contact message received");
    Ok(message("Message sent successfully"))
}

fn contact_payload(payload: ContactPayload) -> BackendResult<ContactPayload> {
    Ok(ContactPayload {
        contact_type: payload.contact_type,
        title: required(&payload.title, "title")?,
        name: non_blank(payload.name),
        email: required(&payload.email, "email")?,
        phone: non_blank(payload.phone),
    })
}

pub async fn create_contact(
    _admin: AdminUser,
    State(state): State<BackendState>,
    Json(payload): Json<ContactPayload>,
) -> BackendResult<Created<Contact>> {
    let contact = state.repo.create_contact(contact_payload(payload)?).await;
    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn update_contact(
    _admin: AdminUser,
    State(state): State<BackendState>,
    Path(id): Path<String>,
    Json(payload): Json<ContactPayload>,
) -> BackendResult<Json<Contact>> {
    state
        .repo
        .update_contact(&id, contact_payload(payload)?)
        .await
        .map(Json)
        .ok_or_else(|| BackendError::not_found("Contact"))
}

pub async fn delete_contact(
    _admin: AdminUser,
    State(state): State<BackendState>,
    Path(id): Path<String>,
) -> BackendResult<Json<MessageResponse>> {
    if !state.repo.delete_contact(&id).await {
        return Err(BackendError::not_found("Contact"));
    }
    Ok(message("Contact removed"))
}

// --- Gallery ---

pub async fn get_gallery(State(state): State<BackendState>) -> Json<Vec<GalleryItem>> {
    Json(state.repo.list_gallery().await)
}

pub async fn create_gallery_item(
    _admin: AdminUser,
    State(state): State<BackendState>,
    payload: FormPayload,
) -> BackendResult<Created<GalleryItem>> {
    let title = payload.require("title")?;
    let caption = payload.text("caption");
    let image_url = store_image(&state, "gallery", payload.image)
        .await?
        .ok_or_else(|| BackendError::bad_request("Please upload an image"))?;

    let item = state
        .repo
        .create_gallery_item(title, caption, image_url)
        .await;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_gallery_item(
    _admin: AdminUser,
    State(state): State<BackendState>,
    Path(id): Path<String>,
    Json(update): Json<GalleryUpdate>,
) -> BackendResult<Json<GalleryItem>> {
    let update = GalleryUpdate {
        title: required(&update.title, "title")?,
        caption: non_blank(update.caption),
    };
    state
        .repo
        .update_gallery_item(&id, update)
        .await
        .map(Json)
        .ok_or_else(|| BackendError::not_found("Gallery item"))
}

pub async fn delete_gallery_item(
    _admin: AdminUser,
    State(state): State<BackendState>,
    Path(id): Path<String>,
) -> BackendResult<Json<MessageResponse>> {
    if !state.repo.delete_gallery_item(&id).await {
        return Err(BackendError::not_found("Gallery item"));
    }
    Ok(message("Gallery item removed"))
}

// --- Carousel ---

pub async fn get_carousel(State(state): State<BackendState>) -> Json<Vec<CarouselItem>> {
    Json(state.repo.list_carousel(true).await)
}

pub async fn get_all_carousel(
    _admin: AdminUser,
    State(state): State<BackendState>,
) -> Json<Vec<CarouselItem>> {
    Json(state.repo.list_carousel(false).await)
}

pub async fn create_carousel_item(
    _admin: AdminUser,
    State(state): State<BackendState>,
    payload: FormPayload,
) -> BackendResult<Created<CarouselItem>> {
    let title = payload.require("title")?;
    let order = match payload.text("order") {
        Some(raw) => raw
            .parse()
            .map_err(|_| BackendError::bad_request("Order must be a number"))?,
        None => 0,
    };
    let is_active = payload
        .text("isActive")
        .map(|raw| raw != "false")
        .unwrap_or(true);
    let caption = payload.text("caption");
    let link = payload.text("link");
    let image_url = store_image(&state, "carousel", payload.image)
        .await?
        .ok_or_else(|| BackendError::bad_request("Please upload an image"))?;

    let item = state
        .repo
        .create_carousel_item(NewCarouselItem {
            title,
            caption,
            link,
            image_url,
            order,
            is_active,
        })
        .await;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_carousel_item(
    _admin: AdminUser,
    State(state): State<BackendState>,
    Path(id): Path<String>,
    Json(update): Json<CarouselUpdate>,
) -> BackendResult<Json<CarouselItem>> {
    state
        .repo
        .update_carousel_item(&id, update)
        .await
        .map(Json)
        .ok_or_else(|| BackendError::not_found("Carousel item"))
}

pub async fn delete_carousel_item(
    _admin: AdminUser,
    State(state): State<BackendState>,
    Path(id): Path<String>,
) -> BackendResult<Json<MessageResponse>> {
    if !state.repo.delete_carousel_item(&id).await {
        return Err(BackendError::not_found("Carousel item"));
    }
    Ok(message("Carousel item removed"))
}

// --- Admin ---

pub async fn get_admin_stats(_admin: AdminUser, State(state): State<BackendState>) -> Json<AdminStats> {
    Json(state.repo.get_stats().await)
}

pub async fn get_admin_users(_admin: AdminUser, State(state): State<BackendState>) -> Json<Vec<User>> {
    Json(state.repo.list_users().await)
}

/// update_user_status
///
/// Suspends or reactivates an account. Admin accounts cannot be changed.
pub async fn update_user_status(
    _admin: AdminUser,
    State(state): State<BackendState>,
    Path(id): Path<String>,
    Json(payload): Json<UserStatusUpdate>,
) -> BackendResult<Json<User>> {
    let target = state
        .repo
        .get_user(&id)
        .await
        .ok_or_else(|| BackendError::not_found("User"))?;
    if target.role == Role::Admin {
        return Err(BackendError::bad_request("Cannot change the status of an admin"));
    }
    state
        .repo
        .set_user_status(&id, payload.status)
        .await
        .map(Json)
        .ok_or_else(|| BackendError::not_found("User"))
}

pub async fn delete_user(
    _admin: AdminUser,
    State(state): State<BackendState>,
    Path(id): Path<String>,
) -> BackendResult<Json<MessageResponse>> {
    let target = state
        .repo
        .get_user(&id)
        .await
        .ok_or_else(|| BackendError::not_found("User"))?;
    if target.role == Role::Admin {
        return Err(BackendError::bad_request("Cannot delete an admin"));
    }
    state.repo.delete_user(&id).await;
    Ok(message("User removed"))
}

// --- Notifications ---

pub async fn get_notifications(
    user: AuthUser,
    State(state): State<BackendState>,
) -> Json<Vec<Notification>> {
    Json(state.repo.list_notifications(&user.id).await)
}

pub async fn mark_notification_read(
    user: AuthUser,
    State(state): State<BackendState>,
    Path(id): Path<String>,
) -> BackendResult<Json<Notification>> {
    state
        .repo
        .mark_notification_read(&id, &user.id)
        .await
        .map(Json)
        .ok_or_else(|| BackendError::not_found("Notification"))
}

pub async fn mark_all_notifications_read(
    user: AuthUser,
    State(state): State<BackendState>,
) -> Json<MessageResponse> {
    state.repo.mark_all_notifications_read(&user.id).await;
    message("All notifications marked as read")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_accepts_date_and_timestamp() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(parse_day("2025-03-14").unwrap(), expected);
        assert_eq!(parse_day("2025-03-14T09:30:00.000Z").unwrap(), expected);
        assert!(parse_day("14/03/2025").is_err());
    }

    #[test]
    fn blank_required_field_is_a_bad_request() {
        match required("   ", "title") {
            Err(BackendError::BadRequest(msg)) => assert_eq!(msg, "Please provide a title"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
