use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// ViewKey
///
/// A local collection or record that some page holds a copy of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKey {
    Blogs,
    AdminBlogs,
    BlogDetail,
    Events,
    EventDetail,
    Categories,
    Contacts,
    Gallery,
    Carousel,
    AdminCarousel,
    Users,
    Notifications,
    AdminStats,
    Profile,
}

/// Mutation
///
/// Every write the site can issue. `invalidates` is the contract between a
/// mutation and the views whose copies it makes stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    CreateBlog,
    UpdateBlog,
    ApproveBlog,
    DeleteBlog,
    LikeBlog,
    CommentBlog,
    DeleteBlogComment,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
    LikeEvent,
    CommentEvent,
    DeleteEventComment,
    SaveCategory,
    DeleteCategory,
    SaveContact,
    DeleteContact,
    SaveGalleryItem,
    DeleteGalleryItem,
    SaveCarouselItem,
    ToggleCarouselItem,
    DeleteCarouselItem,
    UpdateUserStatus,
    DeleteUser,
    ReadNotification,
    ReadAllNotifications,
    UpdateProfile,
}

impl Mutation {
    pub fn invalidates(self) -> &'static [ViewKey] {
        use ViewKey::*;
        match self {
            Mutation::CreateBlog => &[Blogs, AdminBlogs, AdminStats],
            Mutation::UpdateBlog | Mutation::ApproveBlog => {
                &[Blogs, AdminBlogs, BlogDetail, AdminStats]
            }
            Mutation::DeleteBlog => &[Blogs, AdminBlogs, AdminStats],
            // The like response already carries the new entity.
            Mutation::LikeBlog => &[],
            Mutation::CommentBlog => &[Notifications],
            Mutation::DeleteBlogComment => &[BlogDetail],
            Mutation::CreateEvent | Mutation::DeleteEvent => &[Events, AdminStats],
            Mutation::UpdateEvent => &[Events, EventDetail],
            Mutation::LikeEvent => &[],
            Mutation::CommentEvent | Mutation::DeleteEventComment => &[EventDetail],
            Mutation::SaveCategory | Mutation::DeleteCategory => &[Categories],
            Mutation::SaveContact | Mutation::DeleteContact => &[Contacts, AdminStats],
            Mutation::SaveGalleryItem | Mutation::DeleteGalleryItem => &[Gallery, AdminStats],
            Mutation::SaveCarouselItem
            | Mutation::ToggleCarouselItem
            | Mutation::DeleteCarouselItem => &[Carousel, AdminCarousel],
            Mutation::UpdateUserStatus | Mutation::DeleteUser => &[Users, AdminStats],
            Mutation::ReadNotification | Mutation::ReadAllNotifications => &[Notifications],
            Mutation::UpdateProfile => &[Profile],
        }
    }
}

/// Invalidations
///
/// Shared set of stale views. Mutations record into it; a page takes its own
/// keys back out and re-fetches those collections.
#[derive(Debug, Clone, Default)]
pub struct Invalidations {
    stale: Arc<Mutex<HashSet<ViewKey>>>,
}

impl Invalidations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, mutation: Mutation) {
        let keys = mutation.invalidates();
        tracing::debug!(?mutation, ?keys, "views invalidated");
        let mut stale = self.stale.lock().unwrap_or_else(PoisonError::into_inner);
        stale.extend(keys.iter().copied());
    }

    pub fn is_stale(&self, key: ViewKey) -> bool {
        self.stale
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&key)
    }

    /// Clears the key and reports whether it was stale.
    pub fn take(&self, key: ViewKey) -> bool {
        self.stale
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key)
    }
}
