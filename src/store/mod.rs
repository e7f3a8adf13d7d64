//! # Store Module
//!
//! Collaborator contracts consumed by the v1 operations, plus an in-memory
//! implementation of both.
//!
//! Every lookup returns a [`Pending`] so a store backed by a remote database
//! can complete later without blocking the request coroutine. Absence is
//! `Ok(None)`, never an error; errors are reserved for a broken backend and
//! surface to clients as `internal server error`.

use crate::model::{
    Account, Album, AlbumId, AnyEntity, Artist, ArtistId, Playlist, PlaylistId, Song, SongId,
    User, UserId,
};
use crate::pending::Pending;

mod memory;
mod seed;

pub use memory::{hash_password, verify_password, MemoryStore, StoreError, HASH_COST};
pub use seed::{Play, Seed, SeedError, SeedUser};

/// Read access to the catalog.
pub trait CatalogStore: Send + Sync {
    fn song(&self, id: SongId) -> Pending<Option<Song>>;

    fn artist(&self, id: ArtistId) -> Pending<Option<Artist>>;

    fn album(&self, id: AlbumId) -> Pending<Option<Album>>;

    fn playlist(&self, id: PlaylistId) -> Pending<Option<Playlist>>;

    fn user(&self, id: UserId) -> Pending<Option<User>>;

    /// Artists whose name contains `query`, case-insensitively.
    fn search_artists(&self, query: &str) -> Pending<Vec<Artist>>;

    fn search_songs(&self, query: &str) -> Pending<Vec<Song>>;

    fn search_albums(&self, query: &str) -> Pending<Vec<Album>>;

    /// The `offset`-th most recently added record of any kind.
    fn new_entity(&self, offset: i64) -> Pending<Option<AnyEntity>>;

    /// The `offset`-th most recent entry of `user`'s listening history.
    fn recent_entity(&self, user: &User, offset: i64) -> Pending<Option<AnyEntity>>;

    fn new_entity_count(&self) -> Pending<u64>;

    fn recent_entity_count(&self, user: &User) -> Pending<u64>;
}

/// Accounts and opaque session tokens.
pub trait SessionProvider: Send + Sync {
    fn lookup_user_by_name(&self, name: &str) -> Pending<Option<Account>>;

    /// Synchronous; `hash` is [`Account::password_hash`].
    fn check_password(&self, plain: &str, hash: &str) -> bool;

    fn issue_token(&self, user: &User) -> Pending<String>;

    fn is_valid_token(&self, token: &str) -> Pending<bool>;

    fn resolve_user(&self, token: &str) -> Pending<Option<User>>;
}
