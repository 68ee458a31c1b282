use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    AdminStats, BlogPost, BlogStats, BlogStatus, BlogUpdate, CarouselItem, CarouselUpdate,
    Category, Comment, Contact, ContactPayload, ContactStats, ContactType, Event, GalleryItem,
    GalleryUpdate, NamedRef, Notification, Profile, Role, User, UserStats, UserStatus,
};

// --- Inputs ---

/// A user account together with its password hash. The hash never leaves the backend.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub course: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BlogQuery {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: String,
    pub content: String,
    pub category_id: Option<String>,
    pub author_id: String,
    pub status: BlogStatus,
    pub image_url: Option<String>,
}

/// Event fields as submitted by the admin form. On update, `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub venue: Option<String>,
    pub registration_link: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCarouselItem {
    pub title: String,
    pub caption: Option<String>,
    pub link: Option<String>,
    pub image_url: String,
    pub order: i32,
    pub is_active: bool,
}

/// Repository
///
/// Persistence contract of the local backend. Handlers only see this trait;
/// ownership and role checks happen in the handlers before a write is issued.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    /// `None` when the email is already registered.
    async fn create_user(&self, new: NewUser) -> Option<User>;
    async fn find_user_by_email(&self, email: &str) -> Option<StoredUser>;
    async fn get_user(&self, id: &str) -> Option<User>;
    async fn update_profile(&self, id: &str, profile: Profile) -> Option<User>;
    async fn list_users(&self) -> Vec<User>;
    async fn set_user_status(&self, id: &str, status: UserStatus) -> Option<User>;
    async fn delete_user(&self, id: &str) -> bool;

    // --- Blogs ---
    /// Approved posts only, newest first.
    async fn list_blogs(&self, query: &BlogQuery) -> Vec<BlogPost>;
    /// Every post regardless of status, newest first.
    async fn list_all_blogs(&self) -> Vec<BlogPost>;
    async fn get_blog(&self, id: &str) -> Option<BlogPost>;
    async fn create_blog(&self, new: NewBlog) -> BlogPost;
    async fn update_blog(&self, id: &str, update: BlogUpdate) -> Option<BlogPost>;
    async fn delete_blog(&self, id: &str) -> bool;
    /// Adds or removes `user_id` from the like set. The flag reports whether it is now liked.
    async fn toggle_blog_like(&self, id: &str, user_id: &str) -> Option<(BlogPost, bool)>;
    async fn add_blog_comment(&self, id: &str, comment: Comment) -> Option<Vec<Comment>>;
    async fn delete_blog_comment(&self, id: &str, comment_id: &str) -> bool;

    // --- Categories ---
    async fn list_categories(&self) -> Vec<Category>;
    async fn get_category(&self, id: &str) -> Option<Category>;
    /// `None` when the name is taken.
    async fn create_category(&self, name: String) -> Option<Category>;
    async fn update_category(&self, id: &str, name: String) -> Option<Category>;
    async fn delete_category(&self, id: &str) -> bool;

    // --- Events ---
    /// Soonest first.
    async fn list_events(&self, limit: Option<usize>) -> Vec<Event>;
    async fn get_event(&self, id: &str) -> Option<Event>;
    async fn create_event(&self, changes: EventChanges, organiser_id: &str) -> Option<Event>;
    async fn update_event(&self, id: &str, changes: EventChanges) -> Option<Event>;
    async fn delete_event(&self, id: &str) -> bool;
    async fn toggle_event_like(&self, id: &str, user_id: &str) -> Option<(Event, bool)>;
    async fn add_event_comment(&self, id: &str, comment: Comment) -> Option<Comment>;
    async fn delete_event_comment(&self, id: &str, comment_id: &str) -> bool;

    // --- Contacts ---
    async fn list_contacts(&self) -> Vec<Contact>;
    async fn create_contact(&self, payload: ContactPayload) -> Contact;
    async fn update_contact(&self, id: &str, payload: ContactPayload) -> Option<Contact>;
    async fn delete_contact(&self, id: &str) -> bool;

    // --- Gallery ---
    async fn list_gallery(&self) -> Vec<GalleryItem>;
    async fn create_gallery_item(
        &self,
        title: String,
        caption: Option<String>,
        image_url: String,
    ) -> GalleryItem;
    async fn update_gallery_item(&self, id: &str, update: GalleryUpdate) -> Option<GalleryItem>;
    async fn delete_gallery_item(&self, id: &str) -> bool;

    // --- Carousel ---
    /// Sorted by `order`; `active_only` hides disabled slides.
    async fn list_carousel(&self, active_only: bool) -> Vec<CarouselItem>;
    async fn create_carousel_item(&self, new: NewCarouselItem) -> CarouselItem;
    async fn update_carousel_item(&self, id: &str, update: CarouselUpdate)
    -> Option<CarouselItem>;
    async fn delete_carousel_item(&self, id: &str) -> bool;

    // --- Notifications ---
    async fn create_notification(&self, user_id: &str, message: String, link: String);
    /// Newest first.
    async fn list_notifications(&self, user_id: &str) -> Vec<Notification>;
    /// Only the recipient may mark a notification.
    async fn mark_notification_read(&self, id: &str, user_id: &str) -> Option<Notification>;
    async fn mark_all_notifications_read(&self, user_id: &str);

    async fn get_stats(&self) -> AdminStats;
}

/// RepositoryState
///
/// Shared handle placed in the backend state.
pub type RepositoryState = Arc<dyn Repository>;

// --- In-memory implementation ---

#[derive(Debug, Clone)]
struct BlogRecord {
    id: String,
    title: String,
    content: String,
    category_id: Option<String>,
    author_id: String,
    status: BlogStatus,
    image_url: Option<String>,
    likes: Vec<String>,
    comments: Vec<Comment>,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct EventRecord {
    id: String,
    title: String,
    description: String,
    date: NaiveDate,
    venue: Option<String>,
    registration_link: Option<String>,
    image_url: Option<String>,
    organiser_id: String,
    likes: Vec<String>,
    comments: Vec<Comment>,
    created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct NotificationRecord {
    user_id: String,
    notification: Notification,
}

#[derive(Default)]
struct Store {
    users: Vec<StoredUser>,
    blogs: Vec<BlogRecord>,
    categories: Vec<Category>,
    events: Vec<EventRecord>,
    contacts: Vec<Contact>,
    gallery: Vec<GalleryItem>,
    carousel: Vec<CarouselItem>,
    notifications: Vec<NotificationRecord>,
}

impl Store {
    fn named_user(&self, id: &str) -> Option<NamedRef> {
        self.users
            .iter()
            .find(|u| u.user.id == id)
            .map(|u| NamedRef {
                id: u.user.id.clone(),
                name: u.user.name.clone(),
            })
    }

    fn named_category(&self, id: Option<&str>) -> Option<NamedRef> {
        let id = id?;
        self.categories.iter().find(|c| c.id == id).map(|c| NamedRef {
            id: c.id.clone(),
            name: c.name.clone(),
        })
    }

    /// Joins author and category names onto a stored post.
    fn blog(&self, record: &BlogRecord) -> BlogPost {
        BlogPost {
            id: record.id.clone(),
            title: record.title.clone(),
            content: record.content.clone(),
            category: self.named_category(record.category_id.as_deref()),
            author: self.named_user(&record.author_id),
            status: record.status,
            image_url: record.image_url.clone(),
            likes: record.likes.clone(),
            comments: record.comments.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    fn event(&self, record: &EventRecord) -> Event {
        Event {
            id: record.id.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            date: record.date,
            venue: record.venue.clone(),
            registration_link: record.registration_link.clone(),
            image_url: record.image_url.clone(),
            organiser: self.named_user(&record.organiser_id),
            likes: record.likes.clone(),
            comments: record.comments.clone(),
            created_at: record.created_at,
        }
    }

    fn category_matches(&self, record: &BlogRecord, wanted: &str) -> bool {
        match self.named_category(record.category_id.as_deref()) {
            Some(category) => category.id == wanted || category.name.eq_ignore_ascii_case(wanted),
            None => false,
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn toggle(likes: &mut Vec<String>, user_id: &str) -> bool {
    match likes.iter().position(|id| id == user_id) {
        Some(index) => {
            likes.remove(index);
            false
        }
        None => {
            likes.push(user_id.to_string());
            true
        }
    }
}

/// InMemoryRepository
///
/// Process-local store. Collections keep insertion order; listings sort on read.
#[derive(Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_user(&self, new: NewUser) -> Option<User> {
        let mut store = self.store.write().await;
        let email = new.email.trim().to_lowercase();
        if store.users.iter().any(|u| u.user.email == email) {
            return None;
        }
        let user = User {
            id: new_id(),
            name: new.name,
            email,
            role: new.role,
            status: UserStatus::Active,
            course: new.course,
        };
        store.users.push(StoredUser {
            user: user.clone(),
            password_hash: new.password_hash,
        });
        Some(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Option<StoredUser> {
        let email = email.trim().to_lowercase();
        let store = self.store.read().await;
        store.users.iter().find(|u| u.user.email == email).cloned()
    }

    async fn get_user(&self, id: &str) -> Option<User> {
        let store = self.store.read().await;
        store
            .users
            .iter()
            .find(|u| u.user.id == id)
            .map(|u| u.user.clone())
    }

    async fn update_profile(&self, id: &str, profile: Profile) -> Option<User> {
        let mut store = self.store.write().await;
        let email = profile.email.trim().to_lowercase();
        if store
            .users
            .iter()
            .any(|u| u.user.id != id && u.user.email == email)
        {
            return None;
        }
        let stored = store.users.iter_mut().find(|u| u.user.id == id)?;
        stored.user.name = profile.name;
        stored.user.email = email;
        stored.user.course = profile.course;
        Some(stored.user.clone())
    }

    async fn list_users(&self) -> Vec<User> {
        let store = self.store.read().await;
        store.users.iter().map(|u| u.user.clone()).collect()
    }

    async fn set_user_status(&self, id: &str, status: UserStatus) -> Option<User> {
        let mut store = self.store.write().await;
        let stored = store.users.iter_mut().find(|u| u.user.id == id)?;
        stored.user.status = status;
        Some(stored.user.clone())
    }

    async fn delete_user(&self, id: &str) -> bool {
        let mut store = self.store.write().await;
        let before = store.users.len();
        store.users.retain(|u| u.user.id != id);
        store.notifications.retain(|n| n.user_id != id);
        store.users.len() != before
    }

    async fn list_blogs(&self, query: &BlogQuery) -> Vec<BlogPost> {
        let store = self.store.read().await;
        let keyword = query.keyword.as_deref().map(str::to_lowercase);

        let mut records: Vec<&BlogRecord> = store
            .blogs
            .iter()
            .filter(|b| b.status == BlogStatus::Approved)
            .filter(|b| match &keyword {
                Some(k) => {
                    b.title.to_lowercase().contains(k) || b.content.to_lowercase().contains(k)
                }
                None => true,
            })
            .filter(|b| match &query.category {
                Some(category) => store.category_matches(b, category),
                None => true,
            })
            .filter(|b| match query.date {
                Some(day) => b.created_at.date_naive() == day,
                None => true,
            })
            .collect();

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = query.limit {
            records.truncate(limit);
        }
        records.into_iter().map(|r| store.blog(r)).collect()
    }

    async fn list_all_blogs(&self) -> Vec<BlogPost> {
        let store = self.store.read().await;
        let mut records: Vec<&BlogRecord> = store.blogs.iter().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.into_iter().map(|r| store.blog(r)).collect()
    }

    async fn get_blog(&self, id: &str) -> Option<BlogPost> {
        let store = self.store.read().await;
        store.blogs.iter().find(|b| b.id == id).map(|r| store.blog(r))
    }

    async fn create_blog(&self, new: NewBlog) -> BlogPost {
        let mut store = self.store.write().await;
        let now = Utc::now();
        let record = BlogRecord {
            id: new_id(),
            title: new.title,
            content: new.content,
            category_id: new.category_id,
            author_id: new.author_id,
            status: new.status,
            image_url: new.image_url,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let post = store.blog(&record);
        store.blogs.push(record);
        post
    }

    async fn update_blog(&self, id: &str, update: BlogUpdate) -> Option<BlogPost> {
        let mut store = self.store.write().await;
        let record = store.blogs.iter_mut().find(|b| b.id == id)?;
        if let Some(title) = update.title {
            record.title = title;
        }
        if let Some(content) = update.content {
            record.content = content;
        }
        if let Some(category) = update.category {
            record.category_id = Some(category);
        }
        if let Some(status) = update.status {
            record.status = status;
        }
        record.updated_at = Utc::now();
        let record = record.clone();
        Some(store.blog(&record))
    }

    async fn delete_blog(&self, id: &str) -> bool {
        let mut store = self.store.write().await;
        let before = store.blogs.len();
        store.blogs.retain(|b| b.id != id);
        store.blogs.len() != before
    }

    async fn toggle_blog_like(&self, id: &str, user_id: &str) -> Option<(BlogPost, bool)> {
        let mut store = self.store.write().await;
        let record = store.blogs.iter_mut().find(|b| b.id == id)?;
        let liked = toggle(&mut record.likes, user_id);
        let record = record.clone();
        Some((store.blog(&record), liked))
    }

    async fn add_blog_comment(&self, id: &str, comment: Comment) -> Option<Vec<Comment>> {
        let mut store = self.store.write().await;
        let record = store.blogs.iter_mut().find(|b| b.id == id)?;
        record.comments.push(comment);
        Some(record.comments.clone())
    }

    async fn delete_blog_comment(&self, id: &str, comment_id: &str) -> bool {
        let mut store = self.store.write().await;
        match store.blogs.iter_mut().find(|b| b.id == id) {
            Some(record) => {
                let before = record.comments.len();
                record.comments.retain(|c| c.id != comment_id);
                record.comments.len() != before
            }
            None => false,
        }
    }

    async fn list_categories(&self) -> Vec<Category> {
        let store = self.store.read().await;
        let mut categories = store.categories.clone();
        categories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        categories
    }

    async fn get_category(&self, id: &str) -> Option<Category> {
        let store = self.store.read().await;
        store.categories.iter().find(|c| c.id == id).cloned()
    }

    async fn create_category(&self, name: String) -> Option<Category> {
        let mut store = self.store.write().await;
        if store
            .categories
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(&name))
        {
            return None;
        }
        let category = Category { id: new_id(), name };
        store.categories.push(category.clone());
        Some(category)
    }

    async fn update_category(&self, id: &str, name: String) -> Option<Category> {
        let mut store = self.store.write().await;
        if store
            .categories
            .iter()
            .any(|c| c.id != id && c.name.eq_ignore_ascii_case(&name))
        {
            return None;
        }
        let category = store.categories.iter_mut().find(|c| c.id == id)?;
        category.name = name;
        Some(category.clone())
    }

    async fn delete_category(&self, id: &str) -> bool {
        let mut store = self.store.write().await;
        let before = store.categories.len();
        store.categories.retain(|c| c.id != id);
        store.categories.len() != before
    }

    async fn list_events(&self, limit: Option<usize>) -> Vec<Event> {
        let store = self.store.read().await;
        let mut records: Vec<&EventRecord> = store.events.iter().collect();
        records.sort_by(|a, b| a.date.cmp(&b.date));
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        records.into_iter().map(|r| store.event(r)).collect()
    }

    async fn get_event(&self, id: &str) -> Option<Event> {
        let store = self.store.read().await;
        store.events.iter().find(|e| e.id == id).map(|r| store.event(r))
    }

    async fn create_event(&self, changes: EventChanges, organiser_id: &str) -> Option<Event> {
        let mut store = self.store.write().await;
        let record = EventRecord {
            id: new_id(),
            title: changes.title?,
            description: changes.description?,
            date: changes.date?,
            venue: changes.venue,
            registration_link: changes.registration_link,
            image_url: changes.image_url,
            organiser_id: organiser_id.to_string(),
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: Utc::now(),
        };
        let event = store.event(&record);
        store.events.push(record);
        Some(event)
    }

    async fn update_event(&self, id: &str, changes: EventChanges) -> Option<Event> {
        let mut store = self.store.write().await;
        let record = store.events.iter_mut().find(|e| e.id == id)?;
        if let Some(title) = changes.title {
            record.title = title;
        }
        if let Some(description) = changes.description {
            record.description = description;
        }
        if let Some(date) = changes.date {
            record.date = date;
        }
        if changes.venue.is_some() {
            record.venue = changes.venue;
        }
        if changes.registration_link.is_some() {
            record.registration_link = changes.registration_link;
        }
        if changes.image_url.is_some() {
            record.image_url = changes.image_url;
        }
        let record = record.clone();
        Some(store.event(&record))
    }

    async fn delete_event(&self, id: &str) -> bool {
        let mut store = self.store.write().await;
        let before = store.events.len();
        store.events.retain(|e| e.id != id);
        store.events.len() != before
    }

    async fn toggle_event_like(&self, id: &str, user_id: &str) -> Option<(Event, bool)> {
        let mut store = self.store.write().await;
        let record = store.events.iter_mut().find(|e| e.id == id)?;
        let liked = toggle(&mut record.likes, user_id);
        let record = record.clone();
        Some((store.event(&record), liked))
    }

    async fn add_event_comment(&self, id: &str, comment: Comment) -> Option<Comment> {
        let mut store = self.store.write().await;
        let record = store.events.iter_mut().find(|e| e.id == id)?;
        record.comments.push(comment.clone());
        Some(comment)
    }

    async fn delete_event_comment(&self, id: &str, comment_id: &str) -> bool {
        let mut store = self.store.write().await;
        match store.events.iter_mut().find(|e| e.id == id) {
            Some(record) => {
                let before = record.comments.len();
                record.comments.retain(|c| c.id != comment_id);
                record.comments.len() != before
            }
            None => false,
        }
    }

    async fn list_contacts(&self) -> Vec<Contact> {
        self.store.read().await.contacts.clone()
    }

    async fn create_contact(&self, payload: ContactPayload) -> Contact {
        let mut store = self.store.write().await;
        let contact = Contact {
            id: new_id(),
            contact_type: payload.contact_type,
            title: payload.title,
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
        };
        store.contacts.push(contact.clone());
        contact
    }

    async fn update_contact(&self, id: &str, payload: ContactPayload) -> Option<Contact> {
        let mut store = self.store.write().await;
        let contact = store.contacts.iter_mut().find(|c| c.id == id)?;
        contact.contact_type = payload.contact_type;
        contact.title = payload.title;
        contact.name = payload.name;
        contact.email = payload.email;
        contact.phone = payload.phone;
        Some(contact.clone())
    }

    async fn delete_contact(&self, id: &str) -> bool {
        let mut store = self.store.write().await;
        let before = store.contacts.len();
        store.contacts.retain(|c| c.id != id);
        store.contacts.len() != before
    }

    async fn list_gallery(&self) -> Vec<GalleryItem> {
        let store = self.store.read().await;
        let mut items = store.gallery.clone();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items
    }

    async fn create_gallery_item(
        &self,
        title: String,
        caption: Option<String>,
        image_url: String,
    ) -> GalleryItem {
        let mut store = self.store.write().await;
        let item = GalleryItem {
            id: new_id(),
            title,
            caption,
            image_url,
            created_at: Utc::now(),
        };
        store.gallery.push(item.clone());
        item
    }

    async fn update_gallery_item(&self, id: &str, update: GalleryUpdate) -> Option<GalleryItem> {
        let mut store = self.store.write().await;
        let item = store.gallery.iter_mut().find(|g| g.id == id)?;
        item.title = update.title;
        item.caption = update.caption;
        Some(item.clone())
    }

    async fn delete_gallery_item(&self, id: &str) -> bool {
        let mut store = self.store.write().await;
        let before = store.gallery.len();
        store.gallery.retain(|g| g.id != id);
        store.gallery.len() != before
    }

    async fn list_carousel(&self, active_only: bool) -> Vec<CarouselItem> {
        let store = self.store.read().await;
        let mut items: Vec<CarouselItem> = store
            .carousel
            .iter()
            .filter(|c| !active_only || c.is_active)
            .cloned()
            .collect();
        items.sort_by_key(|c| c.order);
        items
    }

    async fn create_carousel_item(&self, new: NewCarouselItem) -> CarouselItem {
        let mut store = self.store.write().await;
        let item = CarouselItem {
            id: new_id(),
            title: new.title,
            caption: new.caption,
            link: new.link,
            image_url: new.image_url,
            order: new.order,
            is_active: new.is_active,
        };
        store.carousel.push(item.clone());
        item
    }

    async fn update_carousel_item(
        &self,
        id: &str,
        update: CarouselUpdate,
    ) -> Option<CarouselItem> {
        let mut store = self.store.write().await;
        let item = store.carousel.iter_mut().find(|c| c.id == id)?;
        if let Some(title) = update.title {
            item.title = title;
        }
        if update.caption.is_some() {
            item.caption = update.caption;
        }
        if update.link.is_some() {
            item.link = update.link;
        }
        if let Some(order) = update.order {
            item.order = order;
        }
        if let Some(is_active) = update.is_active {
            item.is_active = is_active;
        }
        Some(item.clone())
    }

    async fn delete_carousel_item(&self, id: &str) -> bool {
        let mut store = self.store.write().await;
        let before = store.carousel.len();
        store.carousel.retain(|c| c.id != id);
        store.carousel.len() != before
    }

    async fn create_notification(&self, user_id: &str, message: String, link: String) {
        let mut store = self.store.write().await;
        store.notifications.push(NotificationRecord {
            user_id: user_id.to_string(),
            notification: Notification {
                id: new_id(),
                message,
                link,
                is_read: false,
                created_at: Utc::now(),
            },
        });
    }

    async fn list_notifications(&self, user_id: &str) -> Vec<Notification> {
        let store = self.store.read().await;
        let mut notifications: Vec<Notification> = store
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .map(|n| n.notification.clone())
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notifications
    }

    async fn mark_notification_read(&self, id: &str, user_id: &str) -> Option<Notification> {
        let mut store = self.store.write().await;
        let record = store
            .notifications
            .iter_mut()
            .find(|n| n.notification.id == id && n.user_id == user_id)?;
        record.notification.is_read = true;
        Some(record.notification.clone())
    }

    async fn mark_all_notifications_read(&self, user_id: &str) {
        let mut store = self.store.write().await;
        for record in store.notifications.iter_mut().filter(|n| n.user_id == user_id) {
            record.notification.is_read = true;
        }
    }

    async fn get_stats(&self) -> AdminStats {
        let store = self.store.read().await;
        let suspended = store
            .users
            .iter()
            .filter(|u| u.user.status == UserStatus::Suspended)
            .count() as u64;
        let approved = store
            .blogs
            .iter()
            .filter(|b| b.status == BlogStatus::Approved)
            .count() as u64;
        let officials = store
            .contacts
            .iter()
            .filter(|c| c.contact_type == ContactType::Official)
            .count() as u64;

        AdminStats {
            users: UserStats {
                total: store.users.len() as u64,
                active: store.users.len() as u64 - suspended,
                suspended,
            },
            blogs: BlogStats {
                total: store.blogs.len() as u64,
                approved,
                pending: store.blogs.len() as u64 - approved,
            },
            events: store.events.len() as u64,
            gallery_items: store.gallery.len() as u64,
            contacts: ContactStats {
                total: store.contacts.len() as u64,
                officials,
                executives: store.contacts.len() as u64 - officials,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Amina".into(),
            email: email.into(),
            password_hash: "hash".into(),
            role: Role::User,
            course: None,
        }
    }

    fn new_blog(author: &str, status: BlogStatus, category: Option<String>) -> NewBlog {
        NewBlog {
            title: "Rust meetup".into(),
            content: "Notes from the session".into(),
            category_id: category,
            author_id: author.into(),
            status,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = InMemoryRepository::new();
        assert!(repo.create_user(new_user("a@example.com")).await.is_some());
        assert!(repo.create_user(new_user("A@example.com ")).await.is_none());
    }

    #[tokio::test]
    async fn public_listing_hides_pending_posts() {
        let repo = InMemoryRepository::new();
        let author = repo.create_user(new_user("a@example.com")).await.unwrap();
        repo.create_blog(new_blog(&author.id, BlogStatus::Pending, None))
            .await;
        let approved = repo
            .create_blog(new_blog(&author.id, BlogStatus::Approved, None))
            .await;

        let listed = repo.list_blogs(&BlogQuery::default()).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, approved.id);
        assert_eq!(listed[0].author.as_ref().unwrap().name, "Amina");
        assert_eq!(repo.list_all_blogs().await.len(), 2);
    }

    #[tokio::test]
    async fn category_filter_matches_by_name() {
        let repo = InMemoryRepository::new();
        let news = repo.create_category("News".into()).await.unwrap();
        let author = repo.create_user(new_user("a@example.com")).await.unwrap();
        repo.create_blog(new_blog(&author.id, BlogStatus::Approved, Some(news.id)))
            .await;
        repo.create_blog(new_blog(&author.id, BlogStatus::Approved, None))
            .await;

        let query = BlogQuery {
            category: Some("news".into()),
            ..Default::default()
        };
        assert_eq!(repo.list_blogs(&query).await.len(), 1);
    }

    #[tokio::test]
    async fn like_toggles() {
        let repo = InMemoryRepository::new();
        let post = repo
            .create_blog(new_blog("u1", BlogStatus::Approved, None))
            .await;

        let (liked, now_liked) = repo.toggle_blog_like(&post.id, "u2").await.unwrap();
        assert!(now_liked);
        assert_eq!(liked.likes, vec!["u2".to_string()]);

        let (unliked, now_liked) = repo.toggle_blog_like(&post.id, "u2").await.unwrap();
        assert!(!now_liked);
        assert!(unliked.likes.is_empty());
    }

    #[tokio::test]
    async fn only_recipient_marks_notification() {
        let repo = InMemoryRepository::new();
        repo.create_notification("u1", "Someone liked your post".into(), "/blog/b1".into())
            .await;
        let id = repo.list_notifications("u1").await[0].id.clone();

        assert!(repo.mark_notification_read(&id, "u2").await.is_none());
        assert!(repo.mark_notification_read(&id, "u1").await.unwrap().is_read);
    }

    #[tokio::test]
    async fn carousel_public_listing_is_active_and_ordered() {
        let repo = InMemoryRepository::new();
        for (title, order, active) in [("b", 2, true), ("a", 1, true), ("hidden", 0, false)] {
            repo.create_carousel_item(NewCarouselItem {
                title: title.into(),
                caption: None,
                link: None,
                image_url: "http://img".into(),
                order,
                is_active: active,
            })
            .await;
        }
        let titles: Vec<String> = repo
            .list_carousel(true)
            .await
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["a", "b"]);
        assert_eq!(repo.list_carousel(false).await.len(), 3);
    }
}
