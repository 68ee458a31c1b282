mod common;

use bitsa_portal::{
    form::SubmitOutcome,
    guard::{self, Access, Route},
    models::{BlogStatus, CategoryPayload},
    pages::{
        account::{CreateBlogPage, NotificationCenter},
        admin::BlogAdminPage,
        public::{BlogDetailPage, BlogListPage, HomePage},
    },
    view::{DetailRender, ListRender},
};
use common::spawn_app;

/// Publishes a post as admin (admin posts skip moderation) and returns its id.
async fn admin_post(app: &common::TestApp, title: &str) -> String {
    let mut page = CreateBlogPage::new(app.portal_as(app.admin_session().await));
    page.form.fields.title = title.into();
    page.form.fields.content = "Posted by the committee.".into();
    match page.submit().await {
        SubmitOutcome::Submitted((post, route)) => {
            assert_eq!(post.status, BlogStatus::Approved);
            assert_eq!(route, Route::Blog);
            post.id
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_admin_approves_pending_post_end_to_end() {
    let app = spawn_app().await;
    let member = app.register("Brian", "brian@bitsa.test").await;

    // A member's post waits for moderation.
    let mut create = CreateBlogPage::new(app.portal_as(member));
    create.form.fields.title = "Hackathon recap".into();
    create.form.fields.content = "Twelve teams, one night.".into();
    let post = match create.submit().await {
        SubmitOutcome::Submitted((post, _)) => post,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(post.status, BlogStatus::Pending);

    let mut public = BlogListPage::new(app.portal());
    public.load().await;
    assert_eq!(public.blogs.render(), ListRender::Empty("No blog posts found."));

    // The admin list shows Approve for the pending row.
    let mut admin = BlogAdminPage::new(app.portal_as(app.admin_session().await));
    admin.load().await.expect("admin blog list failed");
    let rows = admin.rows();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].show_approve);

    admin.approve(&post.id).await.expect("approve failed");

    // The list was re-fetched: same row, no Approve control.
    let rows = admin.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].post.status, BlogStatus::Approved);
    assert!(!rows[0].show_approve);

    public.load().await;
    let cards = public.cards();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].title, "Hackathon recap");
    assert_eq!(cards[0].author, "Brian");
}

#[tokio::test]
async fn test_member_cannot_approve() {
    let app = spawn_app().await;
    let member = app.register("Brian", "brian@bitsa.test").await;
    let portal = app.portal_as(member);

    assert_eq!(
        guard::check(&portal.session, &Route::AdminBlogs),
        Access::Redirect(Route::Home)
    );

    let mut create = CreateBlogPage::new(portal.clone());
    create.form.fields.title = "Mine".into();
    create.form.fields.content = "Text".into();
    let post = create.submit().await.into_submitted().unwrap().0;

    // The server refuses even when the guard is bypassed.
    let mut admin = BlogAdminPage::new(portal);
    let err = admin.approve(&post.id).await.unwrap_err();
    assert_eq!(err, "Only admins can change blog status");
}

#[tokio::test]
async fn test_like_toggle_follows_server_response() {
    let app = spawn_app().await;
    let id = admin_post(&app, "Welcome week").await;
    let member = app.register("Amina", "amina@bitsa.test").await;

    let mut detail = BlogDetailPage::blog(app.portal_as(member), id.clone());
    detail.load().await;
    let button = detail.like_button().unwrap();
    assert_eq!(button.label(), "Like (0)");
    assert!(button.enabled);

    detail.toggle_like().await.unwrap();
    let button = detail.like_button().unwrap();
    assert!(button.liked);
    assert_eq!(button.label(), "Liked (1)");

    detail.toggle_like().await.unwrap();
    assert_eq!(detail.like_button().unwrap().label(), "Like (0)");

    // Anonymous visitors see the count but cannot press the button.
    let mut anonymous = BlogDetailPage::blog(app.portal(), id);
    anonymous.load().await;
    let button = anonymous.like_button().unwrap();
    assert!(!button.enabled);
    assert!(anonymous.toggle_like().await.is_err());
}

#[tokio::test]
async fn test_comment_delete_visibility() {
    let app = spawn_app().await;
    let id = admin_post(&app, "Elections").await;
    let author = app.register("Amina", "amina@bitsa.test").await;
    let other = app.register("Brian", "brian@bitsa.test").await;

    let mut author_view = BlogDetailPage::blog(app.portal_as(author), id.clone());
    author_view.load().await;
    author_view.comment.fields.text = "Count me in".into();
    assert!(author_view.submit_comment().await.is_submitted());

    // The post's comment list came back with the POST response.
    let comments = author_view.comments();
    assert_eq!(comments.len(), 1);
    assert!(comments[0].show_delete);
    let comment_id = comments[0].comment.id.clone();
    assert!(author_view.comment.fields.text.is_empty());

    let mut other_view = BlogDetailPage::blog(app.portal_as(other), id.clone());
    other_view.load().await;
    assert!(!other_view.comments()[0].show_delete);
    assert_eq!(
        other_view.delete_comment(&comment_id).await.unwrap_err(),
        "You can only delete your own comments."
    );

    let mut admin_view = BlogDetailPage::blog(app.portal_as(app.admin_session().await), id);
    admin_view.load().await;
    assert!(admin_view.comments()[0].show_delete);
    admin_view.delete_comment(&comment_id).await.unwrap();
    assert!(admin_view.comments().is_empty());
}

#[tokio::test]
async fn test_empty_comment_is_not_sent() {
    let app = spawn_app().await;
    let id = admin_post(&app, "Quiet post").await;
    let member = app.register("Amina", "amina@bitsa.test").await;

    let mut detail = BlogDetailPage::blog(app.portal_as(member), id.clone());
    detail.load().await;
    detail.comment.fields.text = "   ".into();
    assert_eq!(
        detail.submit_comment().await,
        SubmitOutcome::Invalid("Comment is required.".into())
    );

    let stored = app.repo.get_blog(&id).await.unwrap();
    assert!(stored.comments.is_empty());
}

#[tokio::test]
async fn test_activity_notifies_the_author() {
    let app = spawn_app().await;
    let id = admin_post(&app, "Gala night").await;
    let member = app.register("Amina", "amina@bitsa.test").await;

    let mut detail = BlogDetailPage::blog(app.portal_as(member), id.clone());
    detail.load().await;
    detail.toggle_like().await.unwrap();

    let mut bell = NotificationCenter::new(app.portal_as(app.admin_session().await));
    bell.load().await;
    assert_eq!(bell.unread_count(), 1);

    let notification_id = bell.notifications.items()[0].id.clone();
    let next = bell.open(&notification_id).await.unwrap();
    assert_eq!(next, Some(Route::BlogDetail(id)));
    assert_eq!(bell.unread_count(), 0);
}

#[tokio::test]
async fn test_missing_post_is_an_empty_state() {
    let app = spawn_app().await;
    let mut detail = BlogDetailPage::blog(app.portal(), "does-not-exist");
    detail.load().await;
    assert_eq!(detail.entity.render(), DetailRender::NotFound("Blog post not found."));
}

#[tokio::test]
async fn test_blog_filters_by_category_name() {
    let app = spawn_app().await;
    let admin = app.admin_session().await;
    let news = app
        .portal()
        .api
        .create_category(&CategoryPayload { name: "News".into() }, &admin.token)
        .await
        .unwrap();

    let mut create = CreateBlogPage::new(app.portal_as(admin));
    create.load().await;
    assert_eq!(create.form.fields.category, news.id);
    create.form.fields.title = "Filed under news".into();
    create.form.fields.content = "Body".into();
    assert!(create.submit().await.is_submitted());
    admin_post(&app, "Uncategorised").await;

    let mut list = BlogListPage::new(app.portal());
    list.load().await;
    assert_eq!(list.cards().len(), 2);

    list.filter.category = "News".into();
    list.apply_filters().await;
    let cards = list.cards();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].category.as_deref(), Some("News"));

    list.reset_filters().await;
    assert_eq!(list.cards().len(), 2);
}

#[tokio::test]
async fn test_home_page_loads_everything_at_once() {
    let app = spawn_app().await;
    admin_post(&app, "First").await;

    let mut home = HomePage::new(app.portal());
    home.load().await;
    match home.content.render() {
        DetailRender::Ready(content) => {
            assert_eq!(content.blogs.len(), 1);
            assert!(content.events.is_empty());
            assert!(content.carousel.is_empty());
        }
        other => panic!("unexpected render: {:?}", other),
    }

    home.search = "  rust ".into();
    assert_eq!(home.search_filter().unwrap().keyword, "rust");
}
