use chrono::{NaiveDate, Utc};

use super::{EXCERPT_LEN, Notice, author_label, excerpt, perform, session_token};
use crate::Portal;
use crate::error::ApiError;
use crate::filters::{BlogFilter, EventFilter};
use crate::form::{FormModel, MutationForm, SubmitOutcome};
use crate::invalidation::ViewKey;
use crate::models::{
    BlogPost, CarouselItem, Category, Contact, ContactMessage, ContactType, Event, GalleryItem,
};
use crate::social::{
    BlogEngagement, CommentAck, CommentView, EngagementApi, Engageable, EventEngagement,
    LikeButton, ShareOutcome, ShareRequest, ShareTarget, can_delete_comment, comment_views,
    like_button, share,
};
use crate::view::{ResourceDetail, ResourceList};

/// How many posts and events the home page features.
pub const HOME_BLOG_LIMIT: u32 = 10;
pub const HOME_EVENT_LIMIT: u32 = 5;

/// BlogCard
///
/// One row of a blog listing.
#[derive(Debug, Clone, PartialEq)]
pub struct BlogCard {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub category: Option<String>,
    pub published: NaiveDate,
    pub likes: usize,
    pub comments: usize,
}

impl From<&BlogPost> for BlogCard {
    fn from(post: &BlogPost) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            excerpt: excerpt(&post.content, EXCERPT_LEN),
            author: author_label(post.author.as_ref()).to_string(),
            category: post.category.as_ref().map(|c| c.name.clone()),
            published: post.created_at.date_naive(),
            likes: post.likes.len(),
            comments: post.comments.len(),
        }
    }
}

// --- Home ---

/// Everything the home page shows, fetched in one round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeContent {
    pub blogs: Vec<BlogPost>,
    pub events: Vec<Event>,
    pub categories: Vec<Category>,
    pub carousel: Vec<CarouselItem>,
}

/// HomePage
///
/// Latest posts, upcoming events, categories and the active carousel, loaded
/// in parallel. A failure of any one of them fails the page.
pub struct HomePage {
    portal: Portal,
    pub search: String,
    pub content: ResourceDetail<HomeContent>,
}

impl HomePage {
    pub fn new(portal: Portal) -> Self {
        Self {
            portal,
            search: String::new(),
            content: ResourceDetail::new("Failed to load the home page.", "Nothing to show yet."),
        }
    }

    pub async fn load(&mut self) {
        let api = &self.portal.api;
        self.content
            .load(async move {
                let latest = BlogFilter::latest(HOME_BLOG_LIMIT);
                let upcoming = EventFilter::upcoming(HOME_EVENT_LIMIT);
                let (blogs, events, categories, carousel) = tokio::try_join!(
                    api.fetch_blogs(&latest),
                    api.fetch_events(&upcoming),
                    api.fetch_categories(),
                    api.fetch_carousel(),
                )?;
                Ok::<HomeContent, ApiError>(HomeContent {
                    blogs,
                    events,
                    categories,
                    carousel,
                })
            })
            .await;
    }

    /// Filter for the blog page the search box leads to. `None` when the box is empty.
    pub fn search_filter(&self) -> Option<BlogFilter> {
        let keyword = self.search.trim();
        (!keyword.is_empty()).then(|| BlogFilter::keyword(keyword))
    }

    pub fn blog_cards(&self) -> Vec<BlogCard> {
        self.content
            .get()
            .map(|c| c.blogs.iter().map(BlogCard::from).collect())
            .unwrap_or_default()
    }
}

// --- Blog list ---

/// BlogListPage
///
/// Approved posts with keyword, category and date filters. Filters are only
/// sent when the visitor applies them.
pub struct BlogListPage {
    portal: Portal,
    pub filter: BlogFilter,
    pub blogs: ResourceList<BlogPost>,
    pub categories: ResourceList<Category>,
}

impl BlogListPage {
    pub fn new(portal: Portal) -> Self {
        Self::with_filter(portal, BlogFilter::default())
    }

    /// Opens the page with filters already set, e.g. from the home search box.
    pub fn with_filter(portal: Portal, filter: BlogFilter) -> Self {
        Self {
            portal,
            filter,
            blogs: ResourceList::new("Failed to fetch blogs.", "No blog posts found."),
            categories: ResourceList::new("Failed to fetch categories.", "No categories yet."),
        }
    }

    pub async fn load(&mut self) {
        self.categories
            .load(self.portal.api.fetch_categories())
            .await;
        self.apply_filters().await;
    }

    pub async fn apply_filters(&mut self) {
        self.blogs
            .load(self.portal.api.fetch_blogs(&self.filter))
            .await;
    }

    pub async fn reset_filters(&mut self) {
        self.filter = BlogFilter::default();
        self.apply_filters().await;
    }

    pub async fn refresh_stale(&mut self) {
        if self.portal.invalidations.take(ViewKey::Categories) {
            self.categories
                .load(self.portal.api.fetch_categories())
                .await;
        }
        if self.portal.invalidations.take(ViewKey::Blogs) {
            self.apply_filters().await;
        }
    }

    pub fn cards(&self) -> Vec<BlogCard> {
        self.blogs.items().iter().map(BlogCard::from).collect()
    }
}

// --- Detail pages ---

/// Single-field comment box.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentFields {
    pub text: String,
}

impl FormModel for CommentFields {
    type Payload = String;

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("Comment", self.text.as_str())]
    }

    fn payload(&self) -> String {
        self.text.trim().to_string()
    }
}

/// DetailPage
///
/// A blog post or event with its like button, comments and share action. The
/// local copy only ever changes by being replaced with what the server returns.
pub struct DetailPage<A: EngagementApi> {
    portal: Portal,
    engagement: A,
    id: String,
    pub entity: ResourceDetail<A::Entity>,
    pub comment: MutationForm<CommentFields>,
    notice: Option<Notice>,
}

pub type BlogDetailPage = DetailPage<BlogEngagement>;
pub type EventDetailPage = DetailPage<EventEngagement>;

impl BlogDetailPage {
    pub fn blog(portal: Portal, id: impl Into<String>) -> Self {
        DetailPage::new(portal, BlogEngagement, id)
    }
}

impl EventDetailPage {
    pub fn event(portal: Portal, id: impl Into<String>) -> Self {
        DetailPage::new(portal, EventEngagement, id)
    }
}

impl<A: EngagementApi> DetailPage<A> {
    pub fn new(portal: Portal, engagement: A, id: impl Into<String>) -> Self {
        let (load_error, not_found) = engagement.detail_messages();
        Self {
            portal,
            engagement,
            id: id.into(),
            entity: ResourceDetail::new(load_error, not_found),
            comment: MutationForm::new("Failed to add comment."),
            notice: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub async fn load(&mut self) {
        self.entity
            .load(self.engagement.fetch(&self.portal.api, &self.id))
            .await;
    }

    pub fn like_button(&self) -> Option<LikeButton> {
        let user = self.portal.session.user();
        self.entity.get().map(|e| like_button(e, user.as_ref()))
    }

    /// Comments in server order, each flagged with whether the viewer may delete it.
    pub fn comments(&self) -> Vec<CommentView<'_>> {
        let user = self.portal.session.user();
        self.entity
            .get()
            .map(|e| comment_views(e, user.as_ref()))
            .unwrap_or_default()
    }

    /// toggle_like
    ///
    /// Sends the toggle and replaces the entity with the server's copy. Nothing
    /// is counted locally.
    pub async fn toggle_like(&mut self) -> Result<(), String> {
        let token = session_token(&self.portal).inspect_err(|m| {
            self.notice = Some(Notice::Error(m.clone()));
        })?;
        let result = perform(
            &self.portal,
            self.engagement.like_mutation(),
            "Failed to update like.",
            self.engagement
                .toggle_like(&self.portal.api, &self.id, &token),
        )
        .await;

        match result {
            Ok(entity) => {
                self.entity.replace(entity);
                Ok(())
            }
            Err(message) => {
                self.notice = Some(Notice::Error(message.clone()));
                Err(message)
            }
        }
    }

    /// submit_comment
    ///
    /// Blog posts answer with the new comment list, which replaces the local
    /// one; events only acknowledge, so the event is fetched again.
    pub async fn submit_comment(&mut self) -> SubmitOutcome<()> {
        let token = match session_token(&self.portal) {
            Ok(token) => token,
            Err(message) => {
                self.comment.set_error(message.clone());
                return SubmitOutcome::Failed(message);
            }
        };

        let api = &self.portal.api;
        let engagement = &self.engagement;
        let id = &self.id;
        let outcome = self
            .comment
            .submit(|text| async move { engagement.add_comment(api, id, &text, &token).await })
            .await;

        match outcome {
            SubmitOutcome::Submitted(ack) => {
                self.portal
                    .invalidations
                    .record(self.engagement.comment_mutation());
                match ack {
                    CommentAck::Collection(comments) => {
                        if let Some(entity) = self.entity.get_mut() {
                            entity.set_comments(comments);
                        }
                    }
                    CommentAck::Refetch => self.load().await,
                }
                SubmitOutcome::Submitted(())
            }
            SubmitOutcome::Invalid(message) => SubmitOutcome::Invalid(message),
            SubmitOutcome::Failed(message) => SubmitOutcome::Failed(message),
        }
    }

    /// delete_comment
    ///
    /// Refused locally unless the viewer is the comment's author or an admin.
    /// After the server deletes it the parent is always fetched again.
    pub async fn delete_comment(&mut self, comment_id: &str) -> Result<(), String> {
        let user = self.portal.session.user();
        let allowed = self
            .entity
            .get()
            .and_then(|e| e.comments().iter().find(|c| c.id == comment_id))
            .is_some_and(|c| can_delete_comment(user.as_ref(), c));
        if !allowed {
            let message = "You can only delete your own comments.".to_string();
            self.notice = Some(Notice::Error(message.clone()));
            return Err(message);
        }

        let token = session_token(&self.portal)?;
        let result = perform(
            &self.portal,
            self.engagement.delete_comment_mutation(),
            "Failed to delete comment.",
            self.engagement
                .delete_comment(&self.portal.api, &self.id, comment_id, &token),
        )
        .await;

        match result {
            Ok(()) => {
                self.load().await;
                Ok(())
            }
            Err(message) => {
                self.notice = Some(Notice::Error(message.clone()));
                Err(message)
            }
        }
    }

    /// Shares `page_url` with the entity's title, falling back to the clipboard.
    pub fn share<T: ShareTarget + ?Sized>(&mut self, target: &T, page_url: &str) -> ShareOutcome {
        let Some(entity) = self.entity.get() else {
            return ShareOutcome::Failed("Nothing to share yet.".to_string());
        };
        let request = ShareRequest {
            title: entity.title().to_string(),
            text: self.engagement.share_text(entity.title()),
            url: page_url.to_string(),
        };
        let outcome = share(target, &request);
        if let ShareOutcome::Copied(message) = &outcome {
            self.notice = Some(Notice::Success(message.clone()));
        }
        outcome
    }

    pub async fn refresh_stale(&mut self) {
        if self.portal.invalidations.take(self.engagement.detail_view()) {
            self.load().await;
        }
    }
}

// --- Events ---

/// EventsPage
///
/// All events, soonest first, split around today's date.
pub struct EventsPage {
    portal: Portal,
    pub events: ResourceList<Event>,
}

impl EventsPage {
    pub fn new(portal: Portal) -> Self {
        Self {
            portal,
            events: ResourceList::new("Failed to fetch events.", "No events scheduled yet."),
        }
    }

    pub async fn load(&mut self) {
        self.events
            .load(self.portal.api.fetch_events(&EventFilter::default()))
            .await;
    }

    pub async fn refresh_stale(&mut self) {
        if self.portal.invalidations.take(ViewKey::Events) {
            self.load().await;
        }
    }

    pub fn upcoming(&self) -> Vec<&Event> {
        let today = Utc::now().date_naive();
        self.events.items().iter().filter(|e| e.date >= today).collect()
    }

    pub fn past(&self) -> Vec<&Event> {
        let today = Utc::now().date_naive();
        self.events.items().iter().filter(|e| e.date < today).collect()
    }
}

// --- Gallery ---

/// GalleryPage
///
/// Photo grid with a single-image lightbox.
pub struct GalleryPage {
    portal: Portal,
    pub items: ResourceList<GalleryItem>,
    selected: Option<usize>,
}

impl GalleryPage {
    pub fn new(portal: Portal) -> Self {
        Self {
            portal,
            items: ResourceList::new("Failed to fetch gallery.", "No gallery items yet."),
            selected: None,
        }
    }

    pub async fn load(&mut self) {
        self.items.load(self.portal.api.fetch_gallery()).await;
        self.selected = None;
    }

    pub async fn refresh_stale(&mut self) {
        if self.portal.invalidations.take(ViewKey::Gallery) {
            self.load().await;
        }
    }

    pub fn open(&mut self, index: usize) {
        if index < self.items.items().len() {
            self.selected = Some(index);
        }
    }

    pub fn close(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&GalleryItem> {
        self.selected.and_then(|i| self.items.items().get(i))
    }
}

// --- Contact ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactMessageFields {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl FormModel for ContactMessageFields {
    type Payload = ContactMessage;

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("Name", self.name.as_str()),
            ("Email", self.email.as_str()),
            ("Message", self.message.as_str()),
        ]
    }

    fn payload(&self) -> ContactMessage {
        ContactMessage {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }
}

/// ContactPage
///
/// The association's directory, split into officials and executives, plus a
/// message form.
pub struct ContactPage {
    portal: Portal,
    pub contacts: ResourceList<Contact>,
    pub message: MutationForm<ContactMessageFields>,
    notice: Option<Notice>,
}

impl ContactPage {
    pub fn new(portal: Portal) -> Self {
        Self {
            portal,
            contacts: ResourceList::new("Failed to fetch contacts.", "No contacts listed yet."),
            message: MutationForm::new("Failed to send message. Please try again."),
            notice: None,
        }
    }

    pub async fn load(&mut self) {
        self.contacts.load(self.portal.api.fetch_contacts()).await;
    }

    pub async fn refresh_stale(&mut self) {
        if self.portal.invalidations.take(ViewKey::Contacts) {
            self.load().await;
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    fn of_type(&self, contact_type: ContactType) -> Vec<&Contact> {
        self.contacts
            .items()
            .iter()
            .filter(|c| c.contact_type == contact_type)
            .collect()
    }

    pub fn officials(&self) -> Vec<&Contact> {
        self.of_type(ContactType::Official)
    }

    pub fn executives(&self) -> Vec<&Contact> {
        self.of_type(ContactType::Executive)
    }

    pub async fn send_message(&mut self) -> bool {
        let api = &self.portal.api;
        let outcome = self
            .message
            .submit(|message| async move { api.send_contact_message(&message).await })
            .await;
        let sent = outcome.is_submitted();
        self.notice = sent.then(|| Notice::Success("Message sent successfully!".to_string()));
        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NamedRef;

    #[test]
    fn blog_card_summarises_a_post() {
        let post = BlogPost {
            id: "b1".into(),
            title: "Hackathon".into(),
            content: "x".repeat(200),
            category: Some(NamedRef {
                id: "c1".into(),
                name: "News".into(),
            }),
            likes: vec!["u1".into()],
            ..Default::default()
        };
        let card = BlogCard::from(&post);
        assert_eq!(card.excerpt.chars().count(), EXCERPT_LEN + 3);
        assert_eq!(card.author, "Admin");
        assert_eq!(card.category.as_deref(), Some("News"));
        assert_eq!(card.likes, 1);
    }

    #[test]
    fn comment_payload_is_trimmed() {
        let fields = CommentFields {
            text: "  nice post  ".into(),
        };
        assert_eq!(fields.payload(), "nice post");
    }
}
