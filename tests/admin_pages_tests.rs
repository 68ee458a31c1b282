mod common;

use bitsa_portal::{
    Upload,
    form::SubmitOutcome,
    guard::Route,
    models::{ContactType, UserStatus},
    pages::{
        admin::{
            BlogAdminPage, CarouselAdminPage, CategoryAdminPage, ContactAdminPage, DashboardPage, EditEventPage,
            EventAdminPage, GalleryAdminPage, UsersPage,
        },
        public::{ContactPage, EventDetailPage, GalleryPage},
    },
    view::{DetailRender, ListRender},
};
use common::spawn_app;

async fn create_event(app: &common::TestApp, title: &str, date: &str) -> String {
    let mut page = EventAdminPage::new(app.portal_as(app.admin_session().await));
    page.form.fields.title = title.into();
    page.form.fields.description = "All members welcome.".into();
    page.form.fields.date = date.into();
    page.form.fields.venue = "Main hall".into();
    match page.create().await {
        SubmitOutcome::Submitted(event) => event.id,
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_event_comment_refetches_the_event() {
    let app = spawn_app().await;
    let id = create_event(&app, "Career fair", "2099-05-01").await;
    let member = app.register("Amina", "amina@bitsa.test").await;

    let mut detail = EventDetailPage::event(app.portal_as(member), id);
    detail.load().await;
    assert!(detail.comments().is_empty());

    detail.comment.fields.text = "See you there".into();
    assert!(detail.submit_comment().await.is_submitted());

    let comments = detail.comments();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].comment.name, "Amina");
    assert!(comments[0].show_delete);
}

#[tokio::test]
async fn test_event_missing_fields_never_reach_the_server() {
    let app = spawn_app().await;
    let mut page = EventAdminPage::new(app.portal_as(app.admin_session().await));
    page.form.fields.title = "No date".into();
    page.form.fields.description = "Oops".into();

    assert_eq!(
        page.create().await,
        SubmitOutcome::Invalid("Date is required.".into())
    );
    // Fields survive so the admin can fix and retry.
    assert_eq!(page.form.fields.title, "No date");

    page.load().await;
    assert_eq!(page.events.render(), ListRender::Empty("No events yet."));
}

#[tokio::test]
async fn test_edit_event_round_trip() {
    let app = spawn_app().await;
    let id = create_event(&app, "Workshop", "2099-02-10").await;

    let mut edit = EditEventPage::new(app.portal_as(app.admin_session().await), id.clone());
    edit.load().await;
    assert_eq!(edit.form.fields.date, "2099-02-10");
    assert_eq!(edit.form.fields.venue, "Main hall");

    edit.form.fields.title = "Rust workshop".into();
    assert_eq!(edit.save().await, SubmitOutcome::Submitted(Route::AdminEvents));

    let mut detail = EventDetailPage::event(app.portal(), id);
    detail.load().await;
    assert_eq!(detail.entity.get().unwrap().title, "Rust workshop");
}

#[tokio::test]
async fn test_gallery_upload_requires_an_image() {
    let app = spawn_app().await;
    let mut page = GalleryAdminPage::new(app.portal_as(app.admin_session().await));
    page.upload.fields.title = "Graduation".into();

    assert_eq!(
        page.create().await,
        SubmitOutcome::Invalid("Please select an image to upload.".into())
    );

    page.upload.fields.image = Some(Upload::new("grad.jpg", vec![0xFF, 0xD8, 0xFF]));
    let item = page.create().await.into_submitted().unwrap();
    assert!(
        item.image_url
            .starts_with("http://localhost:9000/mock-bucket/gallery/")
    );
    assert!(item.image_url.ends_with("-grad.jpg"));
    assert_eq!(page.items.items().len(), 1);

    // Title and caption can be edited without a new upload.
    assert!(page.start_edit(&item.id));
    page.edit.fields.caption = "Class of 2025".into();
    let edited = page.save_edit().await.into_submitted().unwrap();
    assert_eq!(edited.caption.as_deref(), Some("Class of 2025"));
    assert_eq!(edited.image_url, item.image_url);

    let mut public = GalleryPage::new(app.portal());
    public.load().await;
    public.open(0);
    assert_eq!(public.selected().unwrap().title, "Graduation");
    public.close();
    assert!(public.selected().is_none());
}

#[tokio::test]
async fn test_carousel_toggle_hides_slide_from_home() {
    let app = spawn_app().await;
    let admin = app.portal_as(app.admin_session().await);
    let mut page = CarouselAdminPage::new(admin.clone());
    page.create.fields.title = "Welcome".into();
    page.create.fields.image = Some(Upload::new("welcome.png", vec![1, 2, 3]));
    let slide = page.add().await.into_submitted().unwrap();
    assert!(slide.is_active);

    assert_eq!(admin.api.fetch_carousel().await.unwrap().len(), 1);

    page.toggle_active(&slide.id).await.unwrap();
    assert!(!page.slides.items()[0].is_active);
    assert!(admin.api.fetch_carousel().await.unwrap().is_empty());

    page.delete(&slide.id).await.unwrap();
    assert!(page.slides.items().is_empty());
}

#[tokio::test]
async fn test_category_crud_surfaces_server_messages() {
    let app = spawn_app().await;
    let mut page = CategoryAdminPage::new(app.portal_as(app.admin_session().await));

    page.form.fields.name = "News".into();
    assert!(page.save().await.is_submitted());
    assert_eq!(page.categories.items().len(), 1);

    page.form.fields.name = "news".into();
    assert_eq!(
        page.save().await,
        SubmitOutcome::Failed("Category already exists".into())
    );
    assert_eq!(page.form.fields.name, "news");

    let id = page.categories.items()[0].id.clone();
    assert!(page.start_edit(&id));
    page.form.fields.name = "Announcements".into();
    assert!(page.save().await.is_submitted());
    assert_eq!(page.categories.items()[0].name, "Announcements");

    page.delete(&id).await.unwrap();
    assert!(page.categories.items().is_empty());
}

#[tokio::test]
async fn test_users_page_protects_admin_accounts() {
    let app = spawn_app().await;
    app.register("Amina", "amina@bitsa.test").await;

    let mut page = UsersPage::new(app.portal_as(app.admin_session().await));
    page.load().await.expect("user list failed");

    let (admin_id, member_id) = {
        let rows = page.rows();
        assert_eq!(rows.len(), 2);
        let admin = rows.iter().find(|r| r.user.email == common::ADMIN_EMAIL).unwrap();
        assert!(!admin.can_delete && !admin.can_suspend);
        let member = rows.iter().find(|r| r.user.email == "amina@bitsa.test").unwrap();
        assert!(member.can_suspend);
        (admin.user.id.clone(), member.user.id.clone())
    };

    page.set_status(&member_id, UserStatus::Suspended).await.unwrap();
    let member = page.users.items().iter().find(|u| u.id == member_id).unwrap();
    assert_eq!(member.status, UserStatus::Suspended);

    // The server refuses even if the control were shown.
    let err = page.delete(&admin_id).await.unwrap_err();
    assert_eq!(err, "Cannot delete an admin");

    // A suspended member can no longer sign in.
    let err = app
        .portal()
        .api
        .login(&bitsa_portal::models::LoginRequest {
            email: "amina@bitsa.test".into(),
            password: "member-pass".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.server_message(), Some("Your account has been suspended"));
}

#[tokio::test]
async fn test_contacts_split_and_dashboard_counts() {
    let app = spawn_app().await;
    let admin = app.portal_as(app.admin_session().await);

    let mut contacts = ContactAdminPage::new(admin.clone());
    contacts.form.fields.title = "Patron".into();
    contacts.form.fields.email = "patron@bitsa.test".into();
    assert!(contacts.save().await.is_submitted());

    contacts.form.fields.contact_type = ContactType::Executive;
    contacts.form.fields.title = "President".into();
    contacts.form.fields.name = "Jane".into();
    contacts.form.fields.email = "president@bitsa.test".into();
    assert!(contacts.save().await.is_submitted());
    assert_eq!(contacts.contacts.items().len(), 2);

    let mut public = ContactPage::new(app.portal());
    public.load().await;
    assert_eq!(public.officials().len(), 1);
    assert_eq!(public.executives().len(), 1);

    public.message.fields.name = "Visitor".into();
    public.message.fields.email = "visitor@example.com".into();
    public.message.fields.message = "How do I join?".into();
    assert!(public.send_message().await);
    assert_eq!(public.notice().unwrap().text(), "Message sent successfully!");

    let mut dashboard = DashboardPage::new(admin);
    dashboard.load().await.expect("dashboard stats failed");
    let cards = dashboard.cards();
    let contacts_card = cards.iter().find(|c| c.label == "Contacts").unwrap();
    assert_eq!(contacts_card.value, 2);
    assert_eq!(
        contacts_card.detail.as_deref(),
        Some("1 officials, 1 executives")
    );
    let users_card = cards.iter().find(|c| c.label == "Users").unwrap();
    assert_eq!(users_card.value, 1);
}

#[tokio::test]
async fn test_admin_pages_fail_visibly_after_sign_out() {
    let app = spawn_app().await;
    let portal = app.portal_as(app.admin_session().await);
    let mut dashboard = DashboardPage::new(portal.clone());
    let mut users = UsersPage::new(portal.clone());
    let mut blogs = BlogAdminPage::new(portal.clone());
    let mut carousel = CarouselAdminPage::new(portal.clone());

    // Another clone of the portal signs out after the guard let these pages in.
    portal.session.logout().unwrap();
    let expected = Err("Please log in first.".to_string());

    assert_eq!(dashboard.load().await, expected);
    assert_eq!(
        dashboard.stats.render(),
        DetailRender::Failed("Failed to fetch dashboard stats.")
    );
    assert_eq!(dashboard.notice().unwrap().text(), "Please log in first.");

    assert_eq!(users.load().await, expected);
    assert_eq!(
        users.users.render(),
        ListRender::Failed {
            message: "Failed to fetch users.",
            stale: &[],
        }
    );
    assert_eq!(users.notice().unwrap().text(), "Please log in first.");

    assert_eq!(blogs.load().await, expected);
    assert_eq!(
        blogs.blogs.render(),
        ListRender::Failed {
            message: "Failed to fetch blogs.",
            stale: &[],
        }
    );
    assert_eq!(blogs.notice().unwrap().text(), "Please log in first.");

    assert_eq!(carousel.load().await, expected);
    assert_eq!(
        carousel.slides.render(),
        ListRender::Failed {
            message: "Failed to fetch carousel items.",
            stale: &[],
        }
    );
    assert_eq!(carousel.notice().unwrap().text(), "Please log in first.");
}
