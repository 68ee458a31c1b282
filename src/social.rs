use async_trait::async_trait;

use crate::error::ApiResult;
use crate::gateway::ApiClient;
use crate::invalidation::{Mutation, ViewKey};
use crate::models::{BlogPost, Comment, CommentRequest, Event, Role, SessionUser};

/// Engageable
///
/// A record that carries a like set and a comment list.
pub trait Engageable {
    fn likes(&self) -> &[String];
    fn comments(&self) -> &[Comment];
    fn set_comments(&mut self, comments: Vec<Comment>);
    fn title(&self) -> &str;
}

impl Engageable for BlogPost {
    fn likes(&self) -> &[String] {
        &self.likes
    }
    fn comments(&self) -> &[Comment] {
        &self.comments
    }
    fn set_comments(&mut self, comments: Vec<Comment>) {
        self.comments = comments;
    }
    fn title(&self) -> &str {
        &self.title
    }
}

impl Engageable for Event {
    fn likes(&self) -> &[String] {
        &self.likes
    }
    fn comments(&self) -> &[Comment] {
        &self.comments
    }
    fn set_comments(&mut self, comments: Vec<Comment>) {
        self.comments = comments;
    }
    fn title(&self) -> &str {
        &self.title
    }
}

/// What the server handed back after a comment was posted.
#[derive(Debug, Clone, PartialEq)]
pub enum CommentAck {
    /// The parent's full, server-ordered comment list.
    Collection(Vec<Comment>),
    /// Only an acknowledgement; the parent must be fetched again.
    Refetch,
}

/// EngagementApi
///
/// The like/comment endpoints of one engageable resource.
#[async_trait]
pub trait EngagementApi: Send + Sync {
    type Entity: Engageable + Send;

    async fn fetch(&self, api: &ApiClient, id: &str) -> ApiResult<Self::Entity>;
    async fn toggle_like(&self, api: &ApiClient, id: &str, token: &str)
    -> ApiResult<Self::Entity>;
    async fn add_comment(
        &self,
        api: &ApiClient,
        id: &str,
        text: &str,
        token: &str,
    ) -> ApiResult<CommentAck>;
    async fn delete_comment(
        &self,
        api: &ApiClient,
        id: &str,
        comment_id: &str,
        token: &str,
    ) -> ApiResult<()>;

    /// Wording of the share sheet, e.g. "Check out this article ...".
    fn share_text(&self, title: &str) -> String;
    /// Messages of the detail view: (load failure, not found).
    fn detail_messages(&self) -> (&'static str, &'static str);
    /// The detail view whose staleness this resource's mutations record.
    fn detail_view(&self) -> ViewKey;
    fn like_mutation(&self) -> Mutation;
    fn comment_mutation(&self) -> Mutation;
    fn delete_comment_mutation(&self) -> Mutation;
}

/// Blog posts: comment POST answers with the new comment list.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlogEngagement;

#[async_trait]
impl EngagementApi for BlogEngagement {
    type Entity = BlogPost;

    async fn fetch(&self, api: &ApiClient, id: &str) -> ApiResult<BlogPost> {
        api.fetch_blog(id).await
    }

    async fn toggle_like(&self, api: &ApiClient, id: &str, token: &str) -> ApiResult<BlogPost> {
        api.like_blog(id, token).await
    }

    async fn add_comment(
        &self,
        api: &ApiClient,
        id: &str,
        text: &str,
        token: &str,
    ) -> ApiResult<CommentAck> {
        let request = CommentRequest {
            text: text.to_string(),
        };
        let comments = api.add_blog_comment(id, &request, token).await?;
        Ok(CommentAck::Collection(comments))
    }

    async fn delete_comment(
        &self,
        api: &ApiClient,
        id: &str,
        comment_id: &str,
        token: &str,
    ) -> ApiResult<()> {
        api.delete_blog_comment(id, comment_id, token).await
    }

    fn share_text(&self, title: &str) -> String {
        format!("Check out this article on the BITSA website: {}", title)
    }

    fn detail_messages(&self) -> (&'static str, &'static str) {
        ("Failed to fetch blog post.", "Blog post not found.")
    }

    fn detail_view(&self) -> ViewKey {
        ViewKey::BlogDetail
    }

    fn like_mutation(&self) -> Mutation {
        Mutation::LikeBlog
    }

    fn comment_mutation(&self) -> Mutation {
        Mutation::CommentBlog
    }

    fn delete_comment_mutation(&self) -> Mutation {
        Mutation::DeleteBlogComment
    }
}

/// Events: comment POST answers with the single new comment only.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventEngagement;

#[async_trait]
impl EngagementApi for EventEngagement {
    type Entity = Event;

    async fn fetch(&self, api: &ApiClient, id: &str) -> ApiResult<Event> {
        api.fetch_event(id).await
    }

    async fn toggle_like(&self, api: &ApiClient, id: &str, token: &str) -> ApiResult<Event> {
        api.like_event(id, token).await
    }

    async fn add_comment(
        &self,
        api: &ApiClient,
        id: &str,
        text: &str,
        token: &str,
    ) -> ApiResult<CommentAck> {
        let request = CommentRequest {
            text: text.to_string(),
        };
        api.add_event_comment(id, &request, token).await?;
        Ok(CommentAck::Refetch)
    }

    async fn delete_comment(
        &self,
        api: &ApiClient,
        id: &str,
        comment_id: &str,
        token: &str,
    ) -> ApiResult<()> {
        api.delete_event_comment(id, comment_id, token).await
    }

    fn share_text(&self, title: &str) -> String {
        format!("Check out this event on the BITSA website: {}", title)
    }

    fn detail_messages(&self) -> (&'static str, &'static str) {
        ("Failed to fetch event.", "Event not found.")
    }

    fn detail_view(&self) -> ViewKey {
        ViewKey::EventDetail
    }

    fn like_mutation(&self) -> Mutation {
        Mutation::LikeEvent
    }

    fn comment_mutation(&self) -> Mutation {
        Mutation::CommentEvent
    }

    fn delete_comment_mutation(&self) -> Mutation {
        Mutation::DeleteEventComment
    }
}

/// LikeButton
///
/// Derived entirely from the entity the server last returned; the client never
/// increments or decrements on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeButton {
    pub liked: bool,
    pub count: usize,
    pub enabled: bool,
}

impl LikeButton {
    pub fn label(&self) -> String {
        let verb = if self.liked { "Liked" } else { "Like" };
        format!("{} ({})", verb, self.count)
    }
}

pub fn like_button<E: Engageable>(entity: &E, actor: Option<&SessionUser>) -> LikeButton {
    LikeButton {
        liked: actor.is_some_and(|user| entity.likes().iter().any(|id| *id == user.id)),
        count: entity.likes().len(),
        enabled: actor.is_some(),
    }
}

/// Admins may delete any comment; everyone else only their own.
pub fn can_delete_comment(actor: Option<&SessionUser>, comment: &Comment) -> bool {
    match actor {
        Some(user) => user.role == Role::Admin || user.id == comment.user,
        None => false,
    }
}

/// One rendered comment row.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentView<'a> {
    pub comment: &'a Comment,
    pub show_delete: bool,
}

pub fn comment_views<'a, E: Engageable>(
    entity: &'a E,
    actor: Option<&SessionUser>,
) -> Vec<CommentView<'a>> {
    entity
        .comments()
        .iter()
        .map(|comment| CommentView {
            comment,
            show_delete: can_delete_comment(actor, comment),
        })
        .collect()
}

// --- Sharing ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub title: String,
    pub text: String,
    pub url: String,
}

/// ShareTarget
///
/// The host's sharing capabilities: an optional native share sheet and a clipboard.
pub trait ShareTarget {
    fn supports_native_share(&self) -> bool;
    fn native_share(&self, request: &ShareRequest) -> Result<(), String>;
    fn copy_to_clipboard(&self, text: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// The link was copied instead; carries the notice to show.
    Copied(String),
    Failed(String),
}

/// Uses the native share sheet when available, otherwise copies the URL.
pub fn share<T: ShareTarget + ?Sized>(target: &T, request: &ShareRequest) -> ShareOutcome {
    if target.supports_native_share() {
        return match target.native_share(request) {
            Ok(()) => ShareOutcome::Shared,
            Err(e) => {
                tracing::debug!("Error sharing: {}", e);
                ShareOutcome::Failed(e)
            }
        };
    }
    match target.copy_to_clipboard(&request.url) {
        Ok(()) => ShareOutcome::Copied("Link copied to clipboard!".to_string()),
        Err(e) => ShareOutcome::Failed(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn user(id: &str, role: Role) -> SessionUser {
        SessionUser {
            id: id.into(),
            name: "N".into(),
            email: "n@example.com".into(),
            role,
        }
    }

    fn comment(author: &str) -> Comment {
        Comment {
            id: format!("c-{}", author),
            text: "hi".into(),
            name: author.into(),
            user: author.into(),
            ..Default::default()
        }
    }

    #[test]
    fn like_button_reflects_server_like_set() {
        let post = BlogPost {
            likes: vec!["u1".into(), "u2".into()],
            ..Default::default()
        };
        let liked = like_button(&post, Some(&user("u1", Role::User)));
        assert!(liked.liked);
        assert_eq!(liked.count, 2);
        assert_eq!(liked.label(), "Liked (2)");

        let anonymous = like_button(&post, None);
        assert!(!anonymous.liked);
        assert!(!anonymous.enabled);
    }

    #[test]
    fn delete_control_only_for_author_or_admin() {
        let post = BlogPost {
            comments: vec![comment("u1"), comment("u2")],
            ..Default::default()
        };

        let author = user("u1", Role::User);
        let flags: Vec<bool> = comment_views(&post, Some(&author))
            .iter()
            .map(|v| v.show_delete)
            .collect();
        assert_eq!(flags, vec![true, false]);

        let admin = user("root", Role::Admin);
        assert!(comment_views(&post, Some(&admin)).iter().all(|v| v.show_delete));
        assert!(comment_views(&post, None).iter().all(|v| !v.show_delete));
    }

    struct FakeHost {
        native: bool,
        clipboard: RefCell<Option<String>>,
    }

    impl ShareTarget for FakeHost {
        fn supports_native_share(&self) -> bool {
            self.native
        }
        fn native_share(&self, _request: &ShareRequest) -> Result<(), String> {
            Ok(())
        }
        fn copy_to_clipboard(&self, text: &str) -> Result<(), String> {
            *self.clipboard.borrow_mut() = Some(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn share_falls_back_to_clipboard() {
        let request = ShareRequest {
            title: "Gala".into(),
            text: EventEngagement.share_text("Gala"),
            url: "http://localhost/events/e1".into(),
        };

        let host = FakeHost {
            native: false,
            clipboard: RefCell::new(None),
        };
        assert_eq!(
            share(&host, &request),
            ShareOutcome::Copied("Link copied to clipboard!".into())
        );
        assert_eq!(
            host.clipboard.borrow().as_deref(),
            Some("http://localhost/events/e1")
        );

        let native = FakeHost {
            native: true,
            clipboard: RefCell::new(None),
        };
        assert_eq!(share(&native, &request), ShareOutcome::Shared);
        assert!(native.clipboard.borrow().is_none());
    }
}
