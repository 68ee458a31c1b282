//! Back-office pages. Every page here sits behind the admin guard, and every
//! call it makes is re-checked by the server.

use super::{Notice, perform, session_token};
use crate::Portal;
use crate::form::{FormModel, MutationForm, SubmitOutcome};
use crate::gateway::{RequestBody, Upload};
use crate::guard::Route;
use crate::invalidation::{Mutation, ViewKey};
use crate::models::{
    AdminStats, BlogPost, BlogStatus, BlogUpdate, CarouselItem, CarouselUpdate, Category,
    CategoryPayload, Contact, ContactPayload, ContactType, Event, GalleryItem, GalleryUpdate,
    Role, User, UserStatus,
};
use crate::view::{LoadState, ResourceDetail, ResourceList};

/// Records the failure in the page's notice slot and hands the message back.
fn failed(notice: &mut Option<Notice>, message: String) -> String {
    *notice = Some(Notice::Error(message.clone()));
    message
}

/// Hands a failed load back as the view's own message.
fn loaded(state: &LoadState) -> Result<(), String> {
    match state {
        LoadState::Failed(message) => Err(message.clone()),
        _ => Ok(()),
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn convert<R, T>(outcome: SubmitOutcome<R>, f: impl FnOnce(R) -> T) -> SubmitOutcome<T> {
    match outcome {
        SubmitOutcome::Submitted(r) => SubmitOutcome::Submitted(f(r)),
        SubmitOutcome::Invalid(message) => SubmitOutcome::Invalid(message),
        SubmitOutcome::Failed(message) => SubmitOutcome::Failed(message),
    }
}

// --- Dashboard ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub label: &'static str,
    pub value: u64,
    pub detail: Option<String>,
}

/// DashboardPage
///
/// Site-wide counters.
pub struct DashboardPage {
    portal: Portal,
    pub stats: ResourceDetail<AdminStats>,
    notice: Option<Notice>,
}

impl DashboardPage {
    pub fn new(portal: Portal) -> Self {
        Self {
            portal,
            stats: ResourceDetail::new("Failed to fetch dashboard stats.", "No stats available."),
            notice: None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// A missing session fails the view and sets the notice instead of fetching.
    pub async fn load(&mut self) -> Result<(), String> {
        let token = session_token(&self.portal).map_err(|m| {
            self.stats.fail();
            failed(&mut self.notice, m)
        })?;
        self.stats
            .load(self.portal.api.fetch_admin_stats(&token))
            .await;
        loaded(self.stats.state())
    }

    pub async fn refresh_stale(&mut self) {
        if self.portal.invalidations.take(ViewKey::AdminStats) {
            if let Err(message) = self.load().await {
                tracing::debug!(%message, "refresh failed");
            }
        }
    }

    pub fn cards(&self) -> Vec<StatCard> {
        let Some(stats) = self.stats.get() else {
            return Vec::new();
        };
        vec![
            StatCard {
                label: "Users",
                value: stats.users.total,
                detail: Some(format!(
                    "{} active, {} suspended",
                    stats.users.active, stats.users.suspended
                )),
            },
            StatCard {
                label: "Blog Posts",
                value: stats.blogs.total,
                detail: Some(format!(
                    "{} approved, {} pending",
                    stats.blogs.approved, stats.blogs.pending
                )),
            },
            StatCard {
                label: "Events",
                value: stats.events,
                detail: None,
            },
            StatCard {
                label: "Gallery Items",
                value: stats.gallery_items,
                detail: None,
            },
            StatCard {
                label: "Contacts",
                value: stats.contacts.total,
                detail: Some(format!(
                    "{} officials, {} executives",
                    stats.contacts.officials, stats.contacts.executives
                )),
            },
        ]
    }
}

// --- Users ---

/// One row of the user table. Admin accounts get no controls.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRow<'a> {
    pub user: &'a User,
    pub can_suspend: bool,
    pub can_activate: bool,
    pub can_delete: bool,
}

impl<'a> From<&'a User> for UserRow<'a> {
    fn from(user: &'a User) -> Self {
        let manageable = user.role != Role::Admin;
        Self {
            user,
            can_suspend: manageable && user.status == UserStatus::Active,
            can_activate: manageable && user.status == UserStatus::Suspended,
            can_delete: manageable,
        }
    }
}

pub struct UsersPage {
    portal: Portal,
    pub users: ResourceList<User>,
    notice: Option<Notice>,
}

impl UsersPage {
    pub fn new(portal: Portal) -> Self {
        Self {
            portal,
            users: ResourceList::new("Failed to fetch users.", "No users found."),
            notice: None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// A missing session fails the view and sets the notice instead of fetching.
    pub async fn load(&mut self) -> Result<(), String> {
        let token = session_token(&self.portal).map_err(|m| {
            self.users.fail();
            failed(&mut self.notice, m)
        })?;
        self.users
            .load(self.portal.api.fetch_admin_users(&token))
            .await;
        loaded(self.users.state())
    }

    pub async fn refresh_stale(&mut self) {
        if self.portal.invalidations.take(ViewKey::Users) {
            if let Err(message) = self.load().await {
                tracing::debug!(%message, "refresh failed");
            }
        }
    }

    pub fn rows(&self) -> Vec<UserRow<'_>> {
        self.users.items().iter().map(UserRow::from).collect()
    }

    pub async fn set_status(&mut self, id: &str, status: UserStatus) -> Result<(), String> {
        let token = session_token(&self.portal).map_err(|m| failed(&mut self.notice, m))?;
        perform(
            &self.portal,
            Mutation::UpdateUserStatus,
            "Failed to update user status.",
            self.portal.api.update_user_status(id, status, &token),
        )
        .await
        .map_err(|m| failed(&mut self.notice, m))?;
        self.refresh_stale().await;
        Ok(())
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), String> {
        let token = session_token(&self.portal).map_err(|m| failed(&mut self.notice, m))?;
        perform(
            &self.portal,
            Mutation::DeleteUser,
            "Failed to delete user.",
            self.portal.api.delete_user(id, &token),
        )
        .await
        .map_err(|m| failed(&mut self.notice, m))?;
        self.refresh_stale().await;
        Ok(())
    }
}

// --- Blogs ---

/// One row of the moderation table. Only pending posts offer Approve.
#[derive(Debug, Clone, PartialEq)]
pub struct BlogRow<'a> {
    pub post: &'a BlogPost,
    pub show_approve: bool,
}

/// BlogAdminPage
///
/// Every post regardless of status. Approving or deleting re-fetches the list,
/// so the row reflects the server's state rather than a local edit.
pub struct BlogAdminPage {
    portal: Portal,
    pub blogs: ResourceList<BlogPost>,
    notice: Option<Notice>,
}

impl BlogAdminPage {
    pub fn new(portal: Portal) -> Self {
        Self {
            portal,
            blogs: ResourceList::new("Failed to fetch blogs.", "No blog posts yet."),
            notice: None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// A missing session fails the view and sets the notice instead of fetching.
    pub async fn load(&mut self) -> Result<(), String> {
        let token = session_token(&self.portal).map_err(|m| {
            self.blogs.fail();
            failed(&mut self.notice, m)
        })?;
        self.blogs
            .load(self.portal.api.fetch_all_blogs_for_admin(&token))
            .await;
        loaded(self.blogs.state())
    }

    pub async fn refresh_stale(&mut self) {
        if self.portal.invalidations.take(ViewKey::AdminBlogs) {
            if let Err(message) = self.load().await {
                tracing::debug!(%message, "refresh failed");
            }
        }
    }

    pub fn rows(&self) -> Vec<BlogRow<'_>> {
        self.blogs
            .items()
            .iter()
            .map(|post| BlogRow {
                post,
                show_approve: post.status == BlogStatus::Pending,
            })
            .collect()
    }

    pub async fn approve(&mut self, id: &str) -> Result<(), String> {
        let token = session_token(&self.portal).map_err(|m| failed(&mut self.notice, m))?;
        let update = BlogUpdate {
            status: Some(BlogStatus::Approved),
            ..Default::default()
        };
        perform(
            &self.portal,
            Mutation::ApproveBlog,
            "Failed to approve blog.",
            self.portal.api.update_blog(id, &update, &token),
        )
        .await
        .map_err(|m| failed(&mut self.notice, m))?;
        tracing::info!(blog_id = %id, "blog approved");
        self.refresh_stale().await;
        Ok(())
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), String> {
        let token = session_token(&self.portal).map_err(|m| failed(&mut self.notice, m))?;
        perform(
            &self.portal,
            Mutation::DeleteBlog,
            "Failed to delete blog.",
            self.portal.api.delete_blog(id, &token),
        )
        .await
        .map_err(|m| failed(&mut self.notice, m))?;
        self.refresh_stale().await;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlogEditFields {
    pub title: String,
    pub content: String,
    /// Category id.
    pub category: String,
}

impl FormModel for BlogEditFields {
    type Payload = BlogUpdate;

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("Title", self.title.as_str()),
            ("Content", self.content.as_str()),
        ]
    }

    fn payload(&self) -> BlogUpdate {
        BlogUpdate {
            title: Some(self.title.trim().to_string()),
            content: Some(self.content.trim().to_string()),
            category: optional(&self.category),
            status: None,
        }
    }
}

/// EditBlogPage
///
/// Rewrites title, content and category. Status is left to moderation.
pub struct EditBlogPage {
    portal: Portal,
    id: String,
    pub blog: ResourceDetail<BlogPost>,
    pub categories: ResourceList<Category>,
    pub form: MutationForm<BlogEditFields>,
}

impl EditBlogPage {
    pub fn new(portal: Portal, id: impl Into<String>) -> Self {
        Self {
            portal,
            id: id.into(),
            blog: ResourceDetail::new("Failed to fetch blog post.", "Blog post not found."),
            categories: ResourceList::new("Failed to fetch categories.", "No categories yet."),
            form: MutationForm::new("Failed to update blog post."),
        }
    }

    pub async fn load(&mut self) {
        self.categories
            .load(self.portal.api.fetch_categories())
            .await;
        self.blog.load(self.portal.api.fetch_blog(&self.id)).await;
        if let Some(post) = self.blog.get() {
            self.form.fields = BlogEditFields {
                title: post.title.clone(),
                content: post.content.clone(),
                category: post
                    .category
                    .as_ref()
                    .map(|c| c.id.clone())
                    .unwrap_or_default(),
            };
        }
    }

    pub async fn save(&mut self) -> SubmitOutcome<Route> {
        let token = match session_token(&self.portal) {
            Ok(token) => token,
            Err(message) => {
                self.form.set_error(message.clone());
                return SubmitOutcome::Failed(message);
            }
        };
        let api = &self.portal.api;
        let id = &self.id;
        let outcome = self
            .form
            .submit(|update| async move { api.update_blog(id, &update, &token).await })
            .await;
        if outcome.is_submitted() {
            self.portal.invalidations.record(Mutation::UpdateBlog);
        }
        convert(outcome, |_| Route::AdminBlogs)
    }
}

// --- Events ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFields {
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub venue: String,
    pub registration_link: String,
    pub image: Option<Upload>,
}

impl EventFields {
    fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date.format("%Y-%m-%d").to_string(),
            venue: event.venue.clone().unwrap_or_default(),
            registration_link: event.registration_link.clone().unwrap_or_default(),
            image: None,
        }
    }
}

impl FormModel for EventFields {
    type Payload = RequestBody;

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("Title", self.title.as_str()),
            ("Description", self.description.as_str()),
            ("Date", self.date.as_str()),
        ]
    }

    fn payload(&self) -> RequestBody {
        let mut fields = vec![
            ("title", self.title.trim().to_string()),
            ("description", self.description.trim().to_string()),
            ("date", self.date.trim().to_string()),
        ];
        if let Some(venue) = optional(&self.venue) {
            fields.push(("venue", venue));
        }
        if let Some(link) = optional(&self.registration_link) {
            fields.push(("registrationLink", link));
        }
        RequestBody::from_fields(fields, self.image.clone())
    }
}

pub struct EventAdminPage {
    portal: Portal,
    pub events: ResourceList<Event>,
    pub form: MutationForm<EventFields>,
    notice: Option<Notice>,
}

impl EventAdminPage {
    pub fn new(portal: Portal) -> Self {
        Self {
            portal,
            events: ResourceList::new("Failed to fetch events.", "No events yet."),
            form: MutationForm::new("Failed to create event."),
            notice: None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub async fn load(&mut self) {
        self.events
            .load(self.portal.api.fetch_events(&Default::default()))
            .await;
    }

    pub async fn refresh_stale(&mut self) {
        if self.portal.invalidations.take(ViewKey::Events) {
            self.load().await;
        }
    }

    pub async fn create(&mut self) -> SubmitOutcome<Event> {
        let token = match session_token(&self.portal) {
            Ok(token) => token,
            Err(message) => {
                self.form.set_error(message.clone());
                return SubmitOutcome::Failed(message);
            }
        };
        let api = &self.portal.api;
        let outcome = self
            .form
            .submit(|body| async move { api.create_event(body, &token).await })
            .await;
        if outcome.is_submitted() {
            self.portal.invalidations.record(Mutation::CreateEvent);
            self.notice = Some(Notice::Success("Event created successfully!".to_string()));
            self.refresh_stale().await;
        }
        outcome
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), String> {
        let token = session_token(&self.portal).map_err(|m| failed(&mut self.notice, m))?;
        perform(
            &self.portal,
            Mutation::DeleteEvent,
            "Failed to delete event.",
            self.portal.api.delete_event(id, &token),
        )
        .await
        .map_err(|m| failed(&mut self.notice, m))?;
        self.refresh_stale().await;
        Ok(())
    }
}

pub struct EditEventPage {
    portal: Portal,
    id: String,
    pub event: ResourceDetail<Event>,
    pub form: MutationForm<EventFields>,
}

impl EditEventPage {
    pub fn new(portal: Portal, id: impl Into<String>) -> Self {
        Self {
            portal,
            id: id.into(),
            event: ResourceDetail::new("Failed to fetch event.", "Event not found."),
            form: MutationForm::new("Failed to update event."),
        }
    }

    pub async fn load(&mut self) {
        self.event.load(self.portal.api.fetch_event(&self.id)).await;
        if let Some(event) = self.event.get() {
            self.form.fields = EventFields::from_event(event);
        }
    }

    pub async fn save(&mut self) -> SubmitOutcome<Route> {
        let token = match session_token(&self.portal) {
            Ok(token) => token,
            Err(message) => {
                self.form.set_error(message.clone());
                return SubmitOutcome::Failed(message);
            }
        };
        let api = &self.portal.api;
        let id = &self.id;
        let outcome = self
            .form
            .submit(|body| async move { api.update_event(id, body, &token).await })
            .await;
        if outcome.is_submitted() {
            self.portal.invalidations.record(Mutation::UpdateEvent);
        }
        convert(outcome, |_| Route::AdminEvents)
    }
}

// --- Gallery ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryFields {
    pub title: String,
    pub caption: String,
    pub image: Option<Upload>,
}

impl FormModel for GalleryFields {
    type Payload = RequestBody;

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("Title", self.title.as_str())]
    }

    fn payload(&self) -> RequestBody {
        let mut fields = vec![("title", self.title.trim().to_string())];
        if let Some(caption) = optional(&self.caption) {
            fields.push(("caption", caption));
        }
        RequestBody::from_fields(fields, self.image.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryEditFields {
    pub title: String,
    pub caption: String,
}

impl FormModel for GalleryEditFields {
    type Payload = GalleryUpdate;

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("Title", self.title.as_str())]
    }

    fn payload(&self) -> GalleryUpdate {
        GalleryUpdate {
            title: self.title.trim().to_string(),
            caption: optional(&self.caption),
        }
    }
}

/// GalleryAdminPage
///
/// Uploading needs an image; it is checked before anything is sent. Editing
/// only touches title and caption.
pub struct GalleryAdminPage {
    portal: Portal,
    pub items: ResourceList<GalleryItem>,
    pub upload: MutationForm<GalleryFields>,
    pub edit: MutationForm<GalleryEditFields>,
    editing: Option<String>,
    notice: Option<Notice>,
}

impl GalleryAdminPage {
    pub fn new(portal: Portal) -> Self {
        Self {
            portal,
            items: ResourceList::new("Failed to fetch gallery.", "No gallery items yet."),
            upload: MutationForm::new("Failed to upload image."),
            edit: MutationForm::new("Failed to update gallery item."),
            editing: None,
            notice: None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub async fn load(&mut self) {
        self.items.load(self.portal.api.fetch_gallery()).await;
    }

    pub async fn refresh_stale(&mut self) {
        if self.portal.invalidations.take(ViewKey::Gallery) {
            self.load().await;
        }
    }

    pub async fn create(&mut self) -> SubmitOutcome<GalleryItem> {
        if self.upload.fields.image.is_none() {
            let message = "Please select an image to upload.".to_string();
            self.upload.set_error(message.clone());
            return SubmitOutcome::Invalid(message);
        }
        let token = match session_token(&self.portal) {
            Ok(token) => token,
            Err(message) => {
                self.upload.set_error(message.clone());
                return SubmitOutcome::Failed(message);
            }
        };
        let api = &self.portal.api;
        let outcome = self
            .upload
            .submit(|body| async move { api.create_gallery_item(body, &token).await })
            .await;
        if outcome.is_submitted() {
            self.portal.invalidations.record(Mutation::SaveGalleryItem);
            self.refresh_stale().await;
        }
        outcome
    }

    /// Opens the edit form on an item already in the list.
    pub fn start_edit(&mut self, id: &str) -> bool {
        let Some(item) = self.items.items().iter().find(|i| i.id == id) else {
            return false;
        };
        self.edit = MutationForm::with_fields(
            GalleryEditFields {
                title: item.title.clone(),
                caption: item.caption.clone().unwrap_or_default(),
            },
            "Failed to update gallery item.",
        );
        self.editing = Some(item.id.clone());
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.edit.reset();
    }

    pub async fn save_edit(&mut self) -> SubmitOutcome<GalleryItem> {
        let Some(id) = self.editing.clone() else {
            return SubmitOutcome::Invalid("Nothing is being edited.".to_string());
        };
        let token = match session_token(&self.portal) {
            Ok(token) => token,
            Err(message) => {
                self.edit.set_error(message.clone());
                return SubmitOutcome::Failed(message);
            }
        };
        let api = &self.portal.api;
        let outcome = self
            .edit
            .submit(|update| async move { api.update_gallery_item(&id, &update, &token).await })
            .await;
        if outcome.is_submitted() {
            self.editing = None;
            self.portal.invalidations.record(Mutation::SaveGalleryItem);
            self.refresh_stale().await;
        }
        outcome
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), String> {
        let token = session_token(&self.portal).map_err(|m| failed(&mut self.notice, m))?;
        perform(
            &self.portal,
            Mutation::DeleteGalleryItem,
            "Failed to delete gallery item.",
            self.portal.api.delete_gallery_item(id, &token),
        )
        .await
        .map_err(|m| failed(&mut self.notice, m))?;
        self.refresh_stale().await;
        Ok(())
    }
}

// --- Carousel ---

#[derive(Debug, Clone, PartialEq)]
pub struct CarouselFields {
    pub title: String,
    pub caption: String,
    pub link: String,
    pub order: String,
    pub is_active: bool,
    pub image: Option<Upload>,
}

impl Default for CarouselFields {
    fn default() -> Self {
        Self {
            title: String::new(),
            caption: String::new(),
            link: String::new(),
            order: "0".to_string(),
            is_active: true,
            image: None,
        }
    }
}

impl FormModel for CarouselFields {
    type Payload = RequestBody;

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("Title", self.title.as_str()), ("Order", self.order.as_str())]
    }

    fn payload(&self) -> RequestBody {
        let mut fields = vec![
            ("title", self.title.trim().to_string()),
            ("order", self.order.trim().to_string()),
            ("isActive", self.is_active.to_string()),
        ];
        if let Some(caption) = optional(&self.caption) {
            fields.push(("caption", caption));
        }
        if let Some(link) = optional(&self.link) {
            fields.push(("link", link));
        }
        RequestBody::from_fields(fields, self.image.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarouselEditFields {
    pub title: String,
    pub caption: String,
    pub link: String,
    pub order: String,
}

impl FormModel for CarouselEditFields {
    type Payload = CarouselUpdate;

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("Title", self.title.as_str())]
    }

    fn payload(&self) -> CarouselUpdate {
        CarouselUpdate {
            title: Some(self.title.trim().to_string()),
            caption: optional(&self.caption),
            link: optional(&self.link),
            order: self.order.trim().parse().ok(),
            is_active: None,
        }
    }
}

/// CarouselAdminPage
///
/// All slides including inactive ones. Toggling sends only the new active flag.
pub struct CarouselAdminPage {
    portal: Portal,
    pub slides: ResourceList<CarouselItem>,
    pub create: MutationForm<CarouselFields>,
    pub edit: MutationForm<CarouselEditFields>,
    editing: Option<String>,
    notice: Option<Notice>,
}

impl CarouselAdminPage {
    pub fn new(portal: Portal) -> Self {
        Self {
            portal,
            slides: ResourceList::new("Failed to fetch carousel items.", "No carousel items yet."),
            create: MutationForm::new("Failed to create carousel item."),
            edit: MutationForm::new("Failed to update carousel item."),
            editing: None,
            notice: None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// A missing session fails the view and sets the notice instead of fetching.
    pub async fn load(&mut self) -> Result<(), String> {
        let token = session_token(&self.portal).map_err(|m| {
            self.slides.fail();
            failed(&mut self.notice, m)
        })?;
        self.slides
            .load(self.portal.api.fetch_all_carousel(&token))
            .await;
        loaded(self.slides.state())
    }

    pub async fn refresh_stale(&mut self) {
        // The public list is only held by the home page.
        if self.portal.invalidations.take(ViewKey::AdminCarousel) {
            if let Err(message) = self.load().await {
                tracing::debug!(%message, "refresh failed");
            }
        }
    }

    pub async fn add(&mut self) -> SubmitOutcome<CarouselItem> {
        if self.create.fields.image.is_none() {
            let message = "Please select an image to upload.".to_string();
            self.create.set_error(message.clone());
            return SubmitOutcome::Invalid(message);
        }
        if self.create.fields.order.trim().parse::<i32>().is_err() {
            let message = "Order must be a number.".to_string();
            self.create.set_error(message.clone());
            return SubmitOutcome::Invalid(message);
        }
        let token = match session_token(&self.portal) {
            Ok(token) => token,
            Err(message) => {
                self.create.set_error(message.clone());
                return SubmitOutcome::Failed(message);
            }
        };
        let api = &self.portal.api;
        let outcome = self
            .create
            .submit(|body| async move { api.create_carousel_item(body, &token).await })
            .await;
        if outcome.is_submitted() {
            self.portal.invalidations.record(Mutation::SaveCarouselItem);
            self.refresh_stale().await;
        }
        outcome
    }

    pub fn start_edit(&mut self, id: &str) -> bool {
        let Some(slide) = self.slides.items().iter().find(|s| s.id == id) else {
            return false;
        };
        self.edit = MutationForm::with_fields(
            CarouselEditFields {
                title: slide.title.clone(),
                caption: slide.caption.clone().unwrap_or_default(),
                link: slide.link.clone().unwrap_or_default(),
                order: slide.order.to_string(),
            },
            "Failed to update carousel item.",
        );
        self.editing = Some(slide.id.clone());
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.edit.reset();
    }

    pub async fn save_edit(&mut self) -> SubmitOutcome<CarouselItem> {
        let Some(id) = self.editing.clone() else {
            return SubmitOutcome::Invalid("Nothing is being edited.".to_string());
        };
        let token = match session_token(&self.portal) {
            Ok(token) => token,
            Err(message) => {
                self.edit.set_error(message.clone());
                return SubmitOutcome::Failed(message);
            }
        };
        let api = &self.portal.api;
        let outcome = self
            .edit
            .submit(|update| async move { api.update_carousel_item(&id, &update, &token).await })
            .await;
        if outcome.is_submitted() {
            self.editing = None;
            self.portal.invalidations.record(Mutation::SaveCarouselItem);
            self.refresh_stale().await;
        }
        outcome
    }

    /// Flips the slide's active flag as the server currently reports it.
    pub async fn toggle_active(&mut self, id: &str) -> Result<(), String> {
        let Some(current) = self.slides.items().iter().find(|s| s.id == id) else {
            return Err(failed(
                &mut self.notice,
                "Carousel item not found.".to_string(),
            ));
        };
        let update = CarouselUpdate {
            is_active: Some(!current.is_active),
            ..Default::default()
        };
        let token = session_token(&self.portal).map_err(|m| failed(&mut self.notice, m))?;
        perform(
            &self.portal,
            Mutation::ToggleCarouselItem,
            "Failed to update carousel item.",
            self.portal.api.update_carousel_item(id, &update, &token),
        )
        .await
        .map_err(|m| failed(&mut self.notice, m))?;
        self.refresh_stale().await;
        Ok(())
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), String> {
        let token = session_token(&self.portal).map_err(|m| failed(&mut self.notice, m))?;
        perform(
            &self.portal,
            Mutation::DeleteCarouselItem,
            "Failed to delete carousel item.",
            self.portal.api.delete_carousel_item(id, &token),
        )
        .await
        .map_err(|m| failed(&mut self.notice, m))?;
        self.refresh_stale().await;
        Ok(())
    }
}

// --- Contacts ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactFields {
    pub contact_type: ContactType,
    pub title: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl FormModel for ContactFields {
    type Payload = ContactPayload;

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("Title", self.title.as_str()), ("Email", self.email.as_str())]
    }

    fn payload(&self) -> ContactPayload {
        ContactPayload {
            contact_type: self.contact_type,
            title: self.title.trim().to_string(),
            name: optional(&self.name),
            email: self.email.trim().to_string(),
            phone: optional(&self.phone),
        }
    }
}

/// ContactAdminPage
///
/// One form for both create and edit; `editing` decides which call is made.
pub struct ContactAdminPage {
    portal: Portal,
    pub contacts: ResourceList<Contact>,
    pub form: MutationForm<ContactFields>,
    editing: Option<String>,
    notice: Option<Notice>,
}

impl ContactAdminPage {
    pub fn new(portal: Portal) -> Self {
        Self {
            portal,
            contacts: ResourceList::new("Failed to fetch contacts.", "No contacts yet."),
            form: MutationForm::new("Failed to save contact."),
            editing: None,
            notice: None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub async fn load(&mut self) {
        self.contacts.load(self.portal.api.fetch_contacts()).await;
    }

    pub async fn refresh_stale(&mut self) {
        if self.portal.invalidations.take(ViewKey::Contacts) {
            self.load().await;
        }
    }

    pub fn start_edit(&mut self, id: &str) -> bool {
        let Some(contact) = self.contacts.items().iter().find(|c| c.id == id) else {
            return false;
        };
        self.form = MutationForm::with_fields(
            ContactFields {
                contact_type: contact.contact_type,
                title: contact.title.clone(),
                name: contact.name.clone().unwrap_or_default(),
                email: contact.email.clone(),
                phone: contact.phone.clone().unwrap_or_default(),
            },
            "Failed to save contact.",
        );
        self.editing = Some(contact.id.clone());
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.form.reset();
    }

    pub async fn save(&mut self) -> SubmitOutcome<Contact> {
        let token = match session_token(&self.portal) {
            Ok(token) => token,
            Err(message) => {
                self.form.set_error(message.clone());
                return SubmitOutcome::Failed(message);
            }
        };
        let api = &self.portal.api;
        let editing = self.editing.clone();
        let outcome = self
            .form
            .submit(|payload| async move {
                match editing {
                    Some(id) => api.update_contact(&id, &payload, &token).await,
                    None => api.create_contact(&payload, &token).await,
                }
            })
            .await;
        if outcome.is_submitted() {
            self.editing = None;
            self.portal.invalidations.record(Mutation::SaveContact);
            self.refresh_stale().await;
        }
        outcome
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), String> {
        let token = session_token(&self.portal).map_err(|m| failed(&mut self.notice, m))?;
        perform(
            &self.portal,
            Mutation::DeleteContact,
            "Failed to delete contact.",
            self.portal.api.delete_contact(id, &token),
        )
        .await
        .map_err(|m| failed(&mut self.notice, m))?;
        self.refresh_stale().await;
        Ok(())
    }
}

// --- Categories ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryFields {
    pub name: String,
}

impl FormModel for CategoryFields {
    type Payload = CategoryPayload;

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("Name", self.name.as_str())]
    }

    fn payload(&self) -> CategoryPayload {
        CategoryPayload {
            name: self.name.trim().to_string(),
        }
    }
}

pub struct CategoryAdminPage {
    portal: Portal,
    pub categories: ResourceList<Category>,
    pub form: MutationForm<CategoryFields>,
    editing: Option<String>,
    notice: Option<Notice>,
}

impl CategoryAdminPage {
    pub fn new(portal: Portal) -> Self {
        Self {
            portal,
            categories: ResourceList::new("Failed to fetch categories.", "No categories yet."),
            form: MutationForm::new("Failed to save category."),
            editing: None,
            notice: None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub async fn load(&mut self) {
        self.categories
            .load(self.portal.api.fetch_categories())
            .await;
    }

    pub async fn refresh_stale(&mut self) {
        if self.portal.invalidations.take(ViewKey::Categories) {
            self.load().await;
        }
    }

    pub fn start_edit(&mut self, id: &str) -> bool {
        let Some(category) = self.categories.items().iter().find(|c| c.id == id) else {
            return false;
        };
        self.form = MutationForm::with_fields(
            CategoryFields {
                name: category.name.clone(),
            },
            "Failed to save category.",
        );
        self.editing = Some(category.id.clone());
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.form.reset();
    }

    pub async fn save(&mut self) -> SubmitOutcome<Category> {
        let token = match session_token(&self.portal) {
            Ok(token) => token,
            Err(message) => {
                self.form.set_error(message.clone());
                return SubmitOutcome::Failed(message);
            }
        };
        let api = &self.portal.api;
        let editing = self.editing.clone();
        let outcome = self
            .form
            .submit(|payload| async move {
                match editing {
                    Some(id) => api.update_category(&id, &payload, &token).await,
                    None => api.create_category(&payload, &token).await,
                }
            })
            .await;
        if outcome.is_submitted() {
            self.editing = None;
            self.portal.invalidations.record(Mutation::SaveCategory);
            self.refresh_stale().await;
        }
        outcome
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), String> {
        let token = session_token(&self.portal).map_err(|m| failed(&mut self.notice, m))?;
        perform(
            &self.portal,
            Mutation::DeleteCategory,
            "Failed to delete category.",
            self.portal.api.delete_category(id, &token),
        )
        .await
        .map_err(|m| failed(&mut self.notice, m))?;
        self.refresh_stale().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, status: UserStatus) -> User {
        User {
            id: "u1".into(),
            name: "N".into(),
            email: "n@example.com".into(),
            role,
            status,
            course: None,
        }
    }

    #[test]
    fn admin_rows_have_no_controls() {
        let admin = user(Role::Admin, UserStatus::Active);
        let row = UserRow::from(&admin);
        assert!(!row.can_suspend && !row.can_activate && !row.can_delete);
    }

    #[test]
    fn suspended_member_can_be_activated() {
        let member = user(Role::User, UserStatus::Suspended);
        let row = UserRow::from(&member);
        assert!(row.can_activate);
        assert!(!row.can_suspend);
        assert!(row.can_delete);
    }

    #[test]
    fn carousel_edit_ignores_unparseable_order() {
        let fields = CarouselEditFields {
            title: "Welcome".into(),
            order: "first".into(),
            ..Default::default()
        };
        let update = fields.payload();
        assert_eq!(update.order, None);
        assert_eq!(update.is_active, None);
    }

    #[test]
    fn new_carousel_slides_default_to_active() {
        let fields = CarouselFields::default();
        assert!(fields.is_active);
        assert_eq!(fields.order, "0");
    }
}
