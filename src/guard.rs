use crate::session::SessionStore;

/// Route
///
/// Every page of the site. Admin pages live under `/admin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Register,
    Login,
    Blog,
    BlogDetail(String),
    CreateBlog,
    Events,
    EventDetail(String),
    Profile,
    Contact,
    Gallery,
    AdminDashboard,
    AdminUsers,
    AdminBlogs,
    AdminEditBlog(String),
    AdminEvents,
    AdminEditEvent(String),
    AdminGallery,
    AdminCarousel,
    AdminContacts,
    AdminCategories,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".into(),
            Route::Register => "/register".into(),
            Route::Login => "/login".into(),
            Route::Blog => "/blog".into(),
            Route::BlogDetail(id) => format!("/blog/{}", id),
            Route::CreateBlog => "/blog/create".into(),
            Route::Events => "/events".into(),
            Route::EventDetail(id) => format!("/events/{}", id),
            Route::Profile => "/profile".into(),
            Route::Contact => "/contact".into(),
            Route::Gallery => "/gallery".into(),
            Route::AdminDashboard => "/admin/dashboard".into(),
            Route::AdminUsers => "/admin/users".into(),
            Route::AdminBlogs => "/admin/blogs".into(),
            Route::AdminEditBlog(id) => format!("/admin/blog/{}/edit", id),
            Route::AdminEvents => "/admin/events".into(),
            Route::AdminEditEvent(id) => format!("/admin/event/{}/edit", id),
            Route::AdminGallery => "/admin/gallery".into(),
            Route::AdminCarousel => "/admin/carousel".into(),
            Route::AdminContacts => "/admin/contacts".into(),
            Route::AdminCategories => "/admin/categories".into(),
        }
    }

    /// Parses a site path, ignoring any query string. Unknown paths yield `None`.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split('?').next().unwrap_or_default();
        let segments: Vec<&str> = path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let route = match segments.as_slice() {
            [] => Route::Home,
            ["register"] => Route::Register,
            ["login"] => Route::Login,
            ["blog"] => Route::Blog,
            ["blog", "create"] => Route::CreateBlog,
            ["blog", id] => Route::BlogDetail(id.to_string()),
            ["events"] => Route::Events,
            ["events", id] => Route::EventDetail(id.to_string()),
            ["profile"] => Route::Profile,
            ["contact"] => Route::Contact,
            ["gallery"] => Route::Gallery,
            ["admin", "dashboard"] => Route::AdminDashboard,
            ["admin", "users"] => Route::AdminUsers,
            ["admin", "blogs"] => Route::AdminBlogs,
            ["admin", "blog", id, "edit"] => Route::AdminEditBlog(id.to_string()),
            ["admin", "events"] => Route::AdminEvents,
            ["admin", "event", id, "edit"] => Route::AdminEditEvent(id.to_string()),
            ["admin", "gallery"] => Route::AdminGallery,
            ["admin", "carousel"] => Route::AdminCarousel,
            ["admin", "contacts"] => Route::AdminContacts,
            ["admin", "categories"] => Route::AdminCategories,
            _ => return None,
        };
        Some(route)
    }

    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Route::AdminDashboard
                | Route::AdminUsers
                | Route::AdminBlogs
                | Route::AdminEditBlog(_)
                | Route::AdminEvents
                | Route::AdminEditEvent(_)
                | Route::AdminGallery
                | Route::AdminCarousel
                | Route::AdminContacts
                | Route::AdminCategories
        )
    }

    pub fn requires_session(&self) -> bool {
        self.requires_admin() || matches!(self, Route::Profile | Route::CreateBlog)
    }
}

/// Access
///
/// Verdict of the guard. `Redirect` carries where the visitor is sent instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted,
    Redirect(Route),
}

/// check
///
/// Anonymous visitors to protected routes go to the login page; signed-in
/// non-admins visiting admin routes go home. This is a UX gate only: the
/// server re-checks every privileged call.
pub fn check(session: &SessionStore, route: &Route) -> Access {
    if !route.requires_session() {
        return Access::Granted;
    }
    if !session.is_authenticated() {
        return Access::Redirect(Route::Login);
    }
    if route.requires_admin() && !session.is_admin() {
        return Access::Redirect(Route::Home);
    }
    Access::Granted
}

/// enter
///
/// Runs the guard and only then builds the page. When access is refused the
/// `mount` closure is never called, so no child state or fetch exists.
pub fn enter<P, F>(session: &SessionStore, route: &Route, mount: F) -> Result<P, Route>
where
    F: FnOnce() -> P,
{
    match check(session, route) {
        Access::Granted => Ok(mount()),
        Access::Redirect(target) => {
            tracing::debug!(from = %route.path(), to = %target.path(), "guard redirect");
            Err(target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, Session, SessionUser};
    use crate::persist::MemoryStore;
    use std::cell::Cell;
    use std::sync::Arc;

    fn store_with(role: Option<Role>) -> SessionStore {
        let store = SessionStore::restore(Arc::new(MemoryStore::new()));
        if let Some(role) = role {
            store
                .login(Session {
                    token: "t".into(),
                    user: SessionUser {
                        id: "u1".into(),
                        name: "N".into(),
                        email: "n@example.com".into(),
                        role,
                    },
                })
                .unwrap();
        }
        store
    }

    #[test]
    fn paths_round_trip_through_parse() {
        let routes = [
            Route::Home,
            Route::BlogDetail("abc".into()),
            Route::CreateBlog,
            Route::AdminEditBlog("abc".into()),
            Route::AdminEditEvent("e1".into()),
            Route::AdminCategories,
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
        assert_eq!(Route::parse("/blog?keyword=rust"), Some(Route::Blog));
        assert_eq!(Route::parse("/nowhere"), None);
    }

    #[test]
    fn anonymous_visitor_is_sent_to_login() {
        let session = store_with(None);
        assert_eq!(
            check(&session, &Route::AdminBlogs),
            Access::Redirect(Route::Login)
        );
        assert_eq!(check(&session, &Route::Profile), Access::Redirect(Route::Login));
        assert_eq!(check(&session, &Route::Blog), Access::Granted);
    }

    #[test]
    fn plain_user_is_sent_home_from_admin_pages() {
        let session = store_with(Some(Role::User));
        assert_eq!(
            check(&session, &Route::AdminDashboard),
            Access::Redirect(Route::Home)
        );
        assert_eq!(check(&session, &Route::CreateBlog), Access::Granted);
    }

    #[test]
    fn refused_page_is_never_mounted() {
        let session = store_with(Some(Role::User));
        let mounted = Cell::new(false);
        let result = enter(&session, &Route::AdminUsers, || mounted.set(true));
        assert_eq!(result, Err(Route::Home));
        assert!(!mounted.get());
    }

    #[test]
    fn admin_mounts_admin_pages() {
        let session = store_with(Some(Role::Admin));
        assert_eq!(enter(&session, &Route::AdminUsers, || 42), Ok(42));
    }
}
