pub mod sqlite;

use crate::app::Result;
use crate::domain::{BookmarkRecord, User};

pub use sqlite::SqliteStore;

pub trait Store {
    // User operations
    /// Returns `None` when the email is already registered.
    fn add_user(&self, user: &User) -> Result<Option<i64>>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn find_user(&self, email: &str, password: &str) -> Result<Option<User>>;

    // Bookmark operations
    fn get_bookmark(&self, item_id: i64, owner_id: i64) -> Result<Option<BookmarkRecord>>;
    fn put_bookmark(&self, record: &BookmarkRecord) -> Result<()>;
    fn delete_bookmark(&self, item_id: i64, owner_id: i64) -> Result<bool>;
    fn bookmark_exists(&self, item_id: i64, owner_id: i64) -> Result<bool>;
    fn bookmarks_for_owner(&self, owner_id: i64) -> Result<Vec<BookmarkRecord>>;

    /// Delete the record for `record`'s key if present, otherwise insert
    /// `record`, in one transaction. Returns whether the key is now bookmarked.
    fn toggle_bookmark(&self, record: &BookmarkRecord) -> Result<bool>;
}
