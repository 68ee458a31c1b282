use super::{Notice, perform, session_token};
use crate::Portal;
use crate::error::PersistError;
use crate::form::{FormModel, MutationForm, SubmitOutcome};
use crate::gateway::{RequestBody, Upload};
use crate::guard::Route;
use crate::invalidation::{Mutation, ViewKey};
use crate::models::{
    BlogPost, Category, LoginRequest, Notification, Profile, RegisterRequest, Session,
};
use crate::view::{ResourceDetail, ResourceList};

/// Stores a freshly issued session. Failing to persist it still fails the login.
fn start_session(portal: &Portal, session: Session) -> Result<Route, String> {
    let landing = if session.is_admin() {
        Route::AdminDashboard
    } else {
        Route::Profile
    };
    portal.session.login(session).map_err(|e: PersistError| {
        tracing::error!("Failed to persist session: {}", e);
        "Could not save your session. Please try again.".to_string()
    })?;
    Ok(landing)
}

fn finish_auth(portal: &Portal, outcome: SubmitOutcome<Session>) -> SubmitOutcome<Route> {
    match outcome {
        SubmitOutcome::Submitted(session) => match start_session(portal, session) {
            Ok(route) => SubmitOutcome::Submitted(route),
            Err(message) => SubmitOutcome::Failed(message),
        },
        SubmitOutcome::Invalid(message) => SubmitOutcome::Invalid(message),
        SubmitOutcome::Failed(message) => SubmitOutcome::Failed(message),
    }
}

// --- Login / Register ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginFields {
    pub email: String,
    pub password: String,
}

impl FormModel for LoginFields {
    type Payload = LoginRequest;

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("Email", self.email.as_str()), ("Password", self.password.as_str())]
    }

    fn payload(&self) -> LoginRequest {
        LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

/// LoginPage
///
/// On success the session is persisted and the page reports where to go:
/// admins land on the dashboard, everyone else on their profile.
pub struct LoginPage {
    portal: Portal,
    pub form: MutationForm<LoginFields>,
}

impl LoginPage {
    pub fn new(portal: Portal) -> Self {
        Self {
            portal,
            form: MutationForm::new("Login failed. Please check your credentials."),
        }
    }

    pub async fn submit(&mut self) -> SubmitOutcome<Route> {
        let api = &self.portal.api;
        let outcome = self
            .form
            .submit(|request| async move { api.login(&request).await })
            .await;
        let outcome = finish_auth(&self.portal, outcome);
        if let SubmitOutcome::Failed(message) = &outcome {
            self.form.set_error(message.clone());
        }
        outcome
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterFields {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub course: String,
}

impl FormModel for RegisterFields {
    type Payload = RegisterRequest;

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("Name", self.name.as_str()),
            ("Email", self.email.as_str()),
            ("Password", self.password.as_str()),
        ]
    }

    fn payload(&self) -> RegisterRequest {
        let course = self.course.trim();
        RegisterRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            course: (!course.is_empty()).then(|| course.to_string()),
        }
    }
}

/// RegisterPage
///
/// Same landing rules as login. A password confirmation mismatch is caught
/// before anything is sent.
pub struct RegisterPage {
    portal: Portal,
    pub form: MutationForm<RegisterFields>,
}

impl RegisterPage {
    pub fn new(portal: Portal) -> Self {
        Self {
            portal,
            form: MutationForm::new("Registration failed. Please try again."),
        }
    }

    pub async fn submit(&mut self) -> SubmitOutcome<Route> {
        if self.form.fields.password != self.form.fields.confirm_password {
            let message = "Passwords do not match.".to_string();
            self.form.set_error(message.clone());
            return SubmitOutcome::Invalid(message);
        }

        let api = &self.portal.api;
        let outcome = self
            .form
            .submit(|request| async move { api.register(&request).await })
            .await;
        let outcome = finish_auth(&self.portal, outcome);
        if let SubmitOutcome::Failed(message) = &outcome {
            self.form.set_error(message.clone());
        }
        outcome
    }
}

/// Ends the session and sends the visitor to the login page.
pub fn logout(portal: &Portal) -> Route {
    if let Err(e) = portal.session.logout() {
        tracing::warn!("Failed to clear persisted session: {}", e);
    }
    Route::Login
}

// --- Profile ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileFields {
    pub name: String,
    pub email: String,
    pub course: String,
}

impl ProfileFields {
    fn fill(&mut self, profile: &Profile) {
        self.name = profile.name.clone();
        self.email = profile.email.clone();
        self.course = profile.course.clone().unwrap_or_default();
    }
}

impl FormModel for ProfileFields {
    type Payload = Profile;

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("Name", self.name.as_str()), ("Email", self.email.as_str())]
    }

    fn payload(&self) -> Profile {
        let course = self.course.trim();
        Profile {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            course: (!course.is_empty()).then(|| course.to_string()),
        }
    }
}

/// ProfilePage
///
/// Loads the account into the form; saving writes it back and re-persists the
/// session so the new name shows everywhere.
pub struct ProfilePage {
    portal: Portal,
    pub profile: ResourceDetail<Profile>,
    pub form: MutationForm<ProfileFields>,
    notice: Option<Notice>,
}

impl ProfilePage {
    pub fn new(portal: Portal) -> Self {
        Self {
            portal,
            profile: ResourceDetail::new("Failed to fetch profile.", "Profile not found."),
            form: MutationForm::new("Failed to update profile."),
            notice: None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub async fn load(&mut self) {
        let token = match session_token(&self.portal) {
            Ok(token) => token,
            Err(message) => {
                self.profile.fail();
                self.notice = Some(Notice::Error(message));
                return;
            }
        };
        self.profile
            .load(self.portal.api.fetch_profile(&token))
            .await;
        if let Some(profile) = self.profile.get() {
            self.form.fields.fill(profile);
        }
    }

    pub async fn refresh_stale(&mut self) {
        if self.portal.invalidations.take(ViewKey::Profile) {
            self.load().await;
        }
    }

    pub async fn save(&mut self) -> bool {
        let token = match session_token(&self.portal) {
            Ok(token) => token,
            Err(message) => {
                self.form.set_error(message.clone());
                self.notice = Some(Notice::Error(message));
                return false;
            }
        };

        let api = &self.portal.api;
        let outcome = self
            .form
            .submit(|profile| async move { api.update_profile(&profile, &token).await })
            .await;

        let SubmitOutcome::Submitted(updated) = outcome else {
            self.notice = self.form.error().map(|m| Notice::Error(m.to_string()));
            return false;
        };

        self.portal.invalidations.record(Mutation::UpdateProfile);
        if let Some(mut session) = self.portal.session.current() {
            session.user.name = updated.name.clone();
            session.user.email = updated.email.clone();
            if let Err(e) = self.portal.session.login(session) {
                tracing::warn!("Failed to re-persist session: {}", e);
            }
        }
        self.form.fields.fill(&updated);
        self.profile.replace(updated);
        // The profile we just replaced is already current.
        self.portal.invalidations.take(ViewKey::Profile);
        self.notice = Some(Notice::Success("Profile updated successfully!".to_string()));
        true
    }
}

// --- Create blog ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlogFields {
    pub title: String,
    pub content: String,
    /// Category id.
    pub category: String,
    pub image: Option<Upload>,
}

impl FormModel for BlogFields {
    type Payload = RequestBody;

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("Title", self.title.as_str()),
            ("Content", self.content.as_str()),
        ]
    }

    fn payload(&self) -> RequestBody {
        let mut fields = vec![
            ("title", self.title.trim().to_string()),
            ("content", self.content.trim().to_string()),
        ];
        if !self.category.trim().is_empty() {
            fields.push(("category", self.category.trim().to_string()));
        }
        RequestBody::from_fields(fields, self.image.clone())
    }
}

/// CreateBlogPage
///
/// Any signed-in member may write a post. Admin posts are published at once;
/// others wait for approval.
pub struct CreateBlogPage {
    portal: Portal,
    pub categories: ResourceList<Category>,
    pub form: MutationForm<BlogFields>,
}

impl CreateBlogPage {
    pub fn new(portal: Portal) -> Self {
        Self {
            portal,
            categories: ResourceList::new("Failed to fetch categories.", "No categories yet."),
            form: MutationForm::new("Failed to create blog post."),
        }
    }

    /// Loads categories and preselects the first one.
    pub async fn load(&mut self) {
        self.categories
            .load(self.portal.api.fetch_categories())
            .await;
        if self.form.fields.category.is_empty() {
            if let Some(first) = self.categories.items().first() {
                self.form.fields.category = first.id.clone();
            }
        }
    }

    /// Submits the post and returns it with the route to go to next.
    pub async fn submit(&mut self) -> SubmitOutcome<(BlogPost, Route)> {
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
            .submit(|body| async move { api.create_blog(body, &token).await })
            .await;

        match outcome {
            SubmitOutcome::Submitted(post) => {
                self.portal.invalidations.record(Mutation::CreateBlog);
                tracing::info!(blog_id = %post.id, status = ?post.status, "blog post created");
                SubmitOutcome::Submitted((post, Route::Blog))
            }
            SubmitOutcome::Invalid(message) => SubmitOutcome::Invalid(message),
            SubmitOutcome::Failed(message) => SubmitOutcome::Failed(message),
        }
    }
}

// --- Notifications ---

/// NotificationCenter
///
/// The bell menu. Opening an unread notification marks it read and re-fetches
/// the list; either way the page it links to is returned.
pub struct NotificationCenter {
    portal: Portal,
    pub notifications: ResourceList<Notification>,
    notice: Option<Notice>,
}

impl NotificationCenter {
    pub fn new(portal: Portal) -> Self {
        Self {
            portal,
            notifications: ResourceList::new(
                "Failed to fetch notifications.",
                "No notifications yet.",
            ),
            notice: None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Does nothing for anonymous visitors.
    pub async fn load(&mut self) {
        let Some(token) = self.portal.token() else {
            return;
        };
        self.notifications
            .load(self.portal.api.fetch_notifications(&token))
            .await;
    }

    pub async fn refresh_stale(&mut self) {
        if self.portal.invalidations.take(ViewKey::Notifications) {
            self.load().await;
        }
    }

    pub fn unread_count(&self) -> usize {
        self.notifications
            .items()
            .iter()
            .filter(|n| !n.is_read)
            .count()
    }

    pub async fn open(&mut self, id: &str) -> Result<Option<Route>, String> {
        let target = self
            .notifications
            .items()
            .iter()
            .find(|n| n.id == id)
            .map(|n| (n.link.clone(), n.is_read));
        let link = target.as_ref().map(|(link, _)| link.clone());
        if target.is_some_and(|(_, read)| read) {
            return Ok(link.as_deref().and_then(Route::parse));
        }

        let token = session_token(&self.portal)?;
        let result = perform(
            &self.portal,
            Mutation::ReadNotification,
            "Failed to mark notification as read.",
            self.portal.api.mark_notification_read(id, &token),
        )
        .await;

        match result {
            Ok(_) => {
                self.refresh_stale().await;
                Ok(link.as_deref().and_then(Route::parse))
            }
            Err(message) => {
                self.notice = Some(Notice::Error(message.clone()));
                Err(message)
            }
        }
    }

    pub async fn mark_all_read(&mut self) -> Result<(), String> {
        let token = session_token(&self.portal)?;
        let result = perform(
            &self.portal,
            Mutation::ReadAllNotifications,
            "Failed to mark notifications as read.",
            self.portal.api.mark_all_notifications_read(&token),
        )
        .await;

        match result {
            Ok(_) => {
                self.refresh_stale().await;
                Ok(())
            }
            Err(message) => {
                self.notice = Some(Notice::Error(message.clone()));
                Err(message)
            }
        }
    }
}
