use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tracing::{debug, info};

use super::{CatalogStore, SessionProvider};
use crate::model::{
    Account, Album, AlbumId, AnyEntity, Artist, ArtistId, EntityKey, EntityKind, Playlist,
    PlaylistId, Song, SongId, User, UserId,
};
use crate::pending::Pending;

/// bcrypt work factor for stored passwords.
pub const HASH_COST: u32 = bcrypt::DEFAULT_COST;

/// Failures while adding records to a [`MemoryStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} id {id} is already taken")]
    DuplicateId { kind: EntityKind, id: i64 },

    #[error("failed to hash password: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// bcrypt hash of `plain` at [`HASH_COST`].
///
/// # Errors
///
/// [`bcrypt::BcryptError`] if hashing fails.
pub fn hash_password(plain: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(plain, HASH_COST)
}

/// Check `plain` against a hash produced by [`hash_password`]. A malformed
/// hash never matches.
#[must_use]
pub fn verify_password(plain: &str, hash: &str) -> bool {
    bcrypt::verify(plain, hash).unwrap_or(false)
}

fn next_id<V>(map: &BTreeMap<i64, V>) -> i64 {
    map.keys().next_back().map_or(1, |last| last.saturating_add(1))
}

/// `id`, or the next free one when absent. Taken ids are never reused.
fn claim_id<V>(
    map: &BTreeMap<i64, V>,
    kind: EntityKind,
    id: Option<i64>,
) -> Result<i64, StoreError> {
    let id = id.unwrap_or_else(|| next_id(map));
    if map.contains_key(&id) {
        return Err(StoreError::DuplicateId { kind, id });
    }
    Ok(id)
}

/// Newest-first position `offset` in an oldest-first list.
fn nth_newest(list: &[EntityKey], offset: i64) -> Option<EntityKey> {
    let offset = usize::try_from(offset).ok()?;
    list.iter().rev().nth(offset).copied()
}

fn name_matches(name: &str, needle: &str) -> bool {
    name.to_lowercase().contains(needle)
}

#[derive(Debug, Default)]
struct CatalogData {
    songs: BTreeMap<SongId, Song>,
    artists: BTreeMap<ArtistId, Artist>,
    albums: BTreeMap<AlbumId, Album>,
    playlists: BTreeMap<PlaylistId, Playlist>,
    accounts: BTreeMap<UserId, Account>,
    /// Content in insertion order.
    feed: Vec<EntityKey>,
    /// Per-user plays, oldest first.
    history: HashMap<UserId, Vec<EntityKey>>,
    tokens: HashMap<String, UserId>,
}

impl CatalogData {
    fn entity(&self, key: EntityKey) -> Option<AnyEntity> {
        match key.kind {
            EntityKind::Song => self.songs.get(&key.id).cloned().map(AnyEntity::Song),
            EntityKind::Artist => self.artists.get(&key.id).cloned().map(AnyEntity::Artist),
            EntityKind::Album => self.albums.get(&key.id).cloned().map(AnyEntity::Album),
            EntityKind::Playlist => self.playlists.get(&key.id).cloned().map(AnyEntity::Playlist),
            EntityKind::User => self
                .accounts
                .get(&key.id)
                .map(|account| AnyEntity::User(account.user.clone())),
        }
    }

    fn user_for_token(&self, token: &str) -> Option<&Account> {
        self.tokens.get(token).and_then(|id| self.accounts.get(id))
    }
}

/// In-memory catalog and session provider.
///
/// Cheap to clone; clones share state. Lookups complete on a separate
/// coroutine so callers always go through the pending path.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<CatalogData>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, CatalogData> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CatalogData> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn query<T, F>(&self, f: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce(&CatalogData) -> T + Send + 'static,
    {
        let store = self.clone();
        Pending::spawn(move || Ok(f(&store.read())))
    }

    /// Add a record, assigning the next free id when it has none.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateId`] when the id is already taken.
    pub fn insert_artist(&self, mut artist: Artist) -> Result<ArtistId, StoreError> {
        let mut data = self.write();
        let id = claim_id(&data.artists, EntityKind::Artist, artist.id)?;
        artist.id = Some(id);
        data.artists.insert(id, artist);
        data.feed.push(EntityKey {
            kind: EntityKind::Artist,
            id,
        });
        Ok(id)
    }

    pub fn insert_song(&self, mut song: Song) -> Result<SongId, StoreError> {
        let mut data = self.write();
        let id = claim_id(&data.songs, EntityKind::Song, song.id)?;
        song.id = Some(id);
        data.songs.insert(id, song);
        data.feed.push(EntityKey {
            kind: EntityKind::Song,
            id,
        });
        Ok(id)
    }

    pub fn insert_album(&self, mut album: Album) -> Result<AlbumId, StoreError> {
        let mut data = self.write();
        let id = claim_id(&data.albums, EntityKind::Album, album.id)?;
        album.id = Some(id);
        data.albums.insert(id, album);
        data.feed.push(EntityKey {
            kind: EntityKind::Album,
            id,
        });
        Ok(id)
    }

    pub fn insert_playlist(&self, mut playlist: Playlist) -> Result<PlaylistId, StoreError> {
        let mut data = self.write();
        let id = claim_id(&data.playlists, EntityKind::Playlist, playlist.id)?;
        playlist.id = Some(id);
        data.playlists.insert(id, playlist);
        data.feed.push(EntityKey {
            kind: EntityKind::Playlist,
            id,
        });
        Ok(id)
    }

    /// Create an account. Users are not part of the "new" feed.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateId`] for a taken id, [`StoreError::Hash`] if the
    /// password cannot be hashed.
    pub fn add_user(
        &self,
        id: Option<UserId>,
        name: &str,
        password: &str,
    ) -> Result<UserId, StoreError> {
        let password_hash = hash_password(password)?;
        let mut data = self.write();
        let id = claim_id(&data.accounts, EntityKind::User, id)?;
        let account = Account {
            user: User {
                id: Some(id),
                name: name.to_string(),
            },
            password_hash,
        };
        data.accounts.insert(id, account);
        debug!(user_id = id, "Account created");
        Ok(id)
    }

    /// Append `key` to `user`'s listening history.
    pub fn record_play(&self, user: UserId, key: EntityKey) {
        self.write().history.entry(user).or_default().push(key);
    }

    /// Number of records of each kind, for startup logging.
    pub fn log_summary(&self) {
        let data = self.read();
        info!(
            songs = data.songs.len(),
            artists = data.artists.len(),
            albums = data.albums.len(),
            playlists = data.playlists.len(),
            users = data.accounts.len(),
            "Catalog loaded"
        );
    }
}

impl CatalogStore for MemoryStore {
    fn song(&self, id: SongId) -> Pending<Option<Song>> {
        self.query(move |data| data.songs.get(&id).cloned())
    }

    fn artist(&self, id: ArtistId) -> Pending<Option<Artist>> {
        self.query(move |data| data.artists.get(&id).cloned())
    }

    fn album(&self, id: AlbumId) -> Pending<Option<Album>> {
        self.query(move |data| data.albums.get(&id).cloned())
    }

    fn playlist(&self, id: PlaylistId) -> Pending<Option<Playlist>> {
        self.query(move |data| data.playlists.get(&id).cloned())
    }

    fn user(&self, id: UserId) -> Pending<Option<User>> {
        self.query(move |data| data.accounts.get(&id).map(|a| a.user.clone()))
    }

    fn search_artists(&self, query: &str) -> Pending<Vec<Artist>> {
        let needle = query.to_lowercase();
        self.query(move |data| {
            data.artists
                .values()
                .filter(|a| name_matches(&a.name, &needle))
                .cloned()
                .collect()
        })
    }

    fn search_songs(&self, query: &str) -> Pending<Vec<Song>> {
        let needle = query.to_lowercase();
        self.query(move |data| {
            data.songs
                .values()
                .filter(|s| name_matches(&s.name, &needle))
                .cloned()
                .collect()
        })
    }

    fn search_albums(&self, query: &str) -> Pending<Vec<Album>> {
        let needle = query.to_lowercase();
        self.query(move |data| {
            data.albums
                .values()
                .filter(|a| name_matches(&a.name, &needle))
                .cloned()
                .collect()
        })
    }

    fn new_entity(&self, offset: i64) -> Pending<Option<AnyEntity>> {
        self.query(move |data| nth_newest(&data.feed, offset).and_then(|key| data.entity(key)))
    }

    fn recent_entity(&self, user: &User, offset: i64) -> Pending<Option<AnyEntity>> {
        let user_id = user.id;
        self.query(move |data| {
            let history = user_id.and_then(|id| data.history.get(&id))?;
            nth_newest(history, offset).and_then(|key| data.entity(key))
        })
    }

    fn new_entity_count(&self) -> Pending<u64> {
        self.query(|data| data.feed.len() as u64)
    }

    fn recent_entity_count(&self, user: &User) -> Pending<u64> {
        let user_id = user.id;
        self.query(move |data| {
            user_id
                .and_then(|id| data.history.get(&id))
                .map_or(0, |history| history.len() as u64)
        })
    }
}

impl SessionProvider for MemoryStore {
    fn lookup_user_by_name(&self, name: &str) -> Pending<Option<Account>> {
        let name = name.to_string();
        self.query(move |data| {
            data.accounts
                .values()
                .find(|account| account.user.name == name)
                .cloned()
        })
    }

    fn check_password(&self, plain: &str, hash: &str) -> bool {
        verify_password(plain, hash)
    }

    fn issue_token(&self, user: &User) -> Pending<String> {
        let store = self.clone();
        let user_id = user.id;
        Pending::spawn(move || {
            let user_id = user_id
                .ok_or_else(|| anyhow::anyhow!("cannot issue a token for an unsaved user"))?;
            let token = ulid::Ulid::new().to_string();
            store.write().tokens.insert(token.clone(), user_id);
            debug!(user_id, "Session token issued");
            Ok(token)
        })
    }

    fn is_valid_token(&self, token: &str) -> Pending<bool> {
        let token = token.to_string();
        self.query(move |data| data.user_for_token(&token).is_some())
    }

    fn resolve_user(&self, token: &str) -> Pending<Option<User>> {
        let token = token.to_string();
        self.query(move |data| data.user_for_token(&token).map(|a| a.user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pending::Completion;
    use std::sync::mpsc;
    use std::time::Duration;

    fn wait<T: Send + 'static>(pending: Pending<T>) -> Completion<T> {
        may::config().set_stack_size(0x8000);
        let (tx, rx) = mpsc::channel();
        pending.subscribe(move |outcome| {
            let _sent = tx.send(outcome);
        });
        rx.recv_timeout(Duration::from_secs(5)).unwrap()
    }

    fn song(name: &str) -> Song {
        Song {
            id: None,
            name: name.to_string(),
            artist_ids: vec![],
        }
    }

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$2"));
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("hunter2", "sha256$garbage"));
        assert_ne!(hash, hash_password("hunter2").unwrap());
    }

    #[test]
    fn test_ids_are_assigned_and_kept() {
        let store = MemoryStore::new();
        assert_eq!(store.insert_song(song("a")).unwrap(), 1);
        let explicit = Song {
            id: Some(10),
            ..song("b")
        };
        assert_eq!(store.insert_song(explicit).unwrap(), 10);
        assert_eq!(store.insert_song(song("c")).unwrap(), 11);
        let fetched = wait(store.song(10)).unwrap().unwrap();
        assert_eq!(fetched.name, "b");
        assert!(wait(store.song(2)).unwrap().is_none());
    }

    #[test]
    fn test_taken_id_is_rejected() {
        let store = MemoryStore::new();
        store.insert_song(song("auto")).unwrap();
        let clash = Song {
            id: Some(1),
            ..song("explicit")
        };
        assert!(matches!(
            store.insert_song(clash),
            Err(StoreError::DuplicateId {
                kind: EntityKind::Song,
                id: 1
            })
        ));
        assert_eq!(wait(store.song(1)).unwrap().unwrap().name, "auto");
        assert_eq!(wait(store.new_entity_count()).unwrap(), 1);

        store.add_user(Some(3), "bob", "pw").unwrap();
        assert!(matches!(
            store.add_user(Some(3), "eve", "pw"),
            Err(StoreError::DuplicateId {
                kind: EntityKind::User,
                id: 3
            })
        ));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let store = MemoryStore::new();
        store.insert_song(song("Harder Better")).unwrap();
        store.insert_song(song("One More Time")).unwrap();
        let hits = wait(store.search_songs("BETTER")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, Some(1));
    }

    #[test]
    fn test_new_feed_is_newest_first() {
        let store = MemoryStore::new();
        store
            .insert_artist(Artist {
                id: None,
                name: "Daft Punk".to_string(),
            })
            .unwrap();
        store.insert_song(song("Digital Love")).unwrap();
        let newest = wait(store.new_entity(0)).unwrap().unwrap();
        assert!(matches!(newest, AnyEntity::Song(_)));
        let older = wait(store.new_entity(1)).unwrap().unwrap();
        assert!(matches!(older, AnyEntity::Artist(_)));
        assert!(wait(store.new_entity(2)).unwrap().is_none());
        assert!(wait(store.new_entity(-1)).unwrap().is_none());
        assert_eq!(wait(store.new_entity_count()).unwrap(), 2);
    }

    #[test]
    fn test_recent_history_is_per_user() {
        let store = MemoryStore::new();
        let bob = store.add_user(None, "bob", "pw").unwrap();
        let s1 = store.insert_song(song("first")).unwrap();
        let s2 = store.insert_song(song("second")).unwrap();
        store.record_play(bob, EntityKey { kind: EntityKind::Song, id: s1 });
        store.record_play(bob, EntityKey { kind: EntityKind::Song, id: s2 });

        let user = wait(store.user(bob)).unwrap().unwrap();
        match wait(store.recent_entity(&user, 0)).unwrap() {
            Some(AnyEntity::Song(s)) => assert_eq!(s.name, "second"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(wait(store.recent_entity_count(&user)).unwrap(), 2);

        let stranger = User {
            id: Some(99),
            name: "x".to_string(),
        };
        assert_eq!(wait(store.recent_entity_count(&stranger)).unwrap(), 0);
        assert!(wait(store.recent_entity(&stranger, 0)).unwrap().is_none());
    }

    #[test]
    fn test_token_lifecycle() {
        let store = MemoryStore::new();
        store.add_user(Some(7), "alice", "secret").unwrap();
        let account = wait(store.lookup_user_by_name("alice")).unwrap().unwrap();
        assert!(store.check_password("secret", &account.password_hash));

        let token = wait(store.issue_token(&account.user)).unwrap();
        assert!(wait(store.is_valid_token(&token)).unwrap());
        assert_eq!(wait(store.resolve_user(&token)).unwrap(), Some(account.user));
        assert!(!wait(store.is_valid_token("nope")).unwrap());
        assert!(wait(store.resolve_user("nope")).unwrap().is_none());
    }

    #[test]
    fn test_token_for_unsaved_user_fails() {
        let store = MemoryStore::new();
        let ghost = User {
            id: None,
            name: "ghost".to_string(),
        };
        assert!(wait(store.issue_token(&ghost)).is_err());
    }
}
