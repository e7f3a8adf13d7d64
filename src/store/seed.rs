//! TOML catalog seed.
//!
//! ```toml
//! [[artists]]
//! id = 1
//! name = "Daft Punk"
//!
//! [[songs]]
//! id = 1
//! name = "One More Time"
//! artistIds = [1]
//!
//! [[users]]
//! name = "bob"
//! password = "secret"
//!
//! [[plays]]
//! user = 1
//! kind = "song"
//! id = 1
//! ```
//!
//! Records are inserted in file order (artists, songs, albums, playlists),
//! which is also the order of the "new" feed. Passwords are hashed on load.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use super::{MemoryStore, StoreError};
use crate::model::{Album, Artist, EntityKey, EntityKind, Playlist, Song, UserId};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid seed file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate {kind} id {id} in seed")]
    DuplicateId { kind: EntityKind, id: i64 },

    #[error("play references unknown user {0}")]
    UnknownUser(UserId),

    #[error("failed to hash password: {0}")]
    Hash(#[source] bcrypt::BcryptError),
}

impl From<StoreError> for SeedError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateId { kind, id } => SeedError::DuplicateId { kind, id },
            StoreError::Hash(e) => SeedError::Hash(e),
        }
    }
}

/// Ids for a list of records in order. Records without one are numbered
/// above the largest explicit id, so a later explicit id cannot collide.
fn resolve_ids(ids: impl Iterator<Item = Option<i64>> + Clone) -> Vec<i64> {
    let mut next = ids
        .clone()
        .flatten()
        .max()
        .map_or(1, |max| max.saturating_add(1));
    ids.map(|id| {
        id.unwrap_or_else(|| {
            let assigned = next;
            next = next.saturating_add(1);
            assigned
        })
    })
    .collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedUser {
    pub id: Option<UserId>,
    pub name: String,
    /// Plain text; hashed when the seed is applied.
    pub password: String,
}

/// One entry of a user's listening history.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Play {
    pub user: UserId,
    pub kind: EntityKind,
    pub id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Seed {
    pub artists: Vec<Artist>,
    pub songs: Vec<Song>,
    pub albums: Vec<Album>,
    pub playlists: Vec<Playlist>,
    pub users: Vec<SeedUser>,
    pub plays: Vec<Play>,
}

impl Seed {
    /// # Errors
    ///
    /// [`SeedError::Io`] or [`SeedError::Parse`].
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let text = fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// # Errors
    ///
    /// [`SeedError::Parse`] for malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, SeedError> {
        Ok(toml::from_str(text)?)
    }

    fn check_unique(&self) -> Result<(), SeedError> {
        fn unique(
            kind: EntityKind,
            ids: impl Iterator<Item = Option<i64>>,
        ) -> Result<(), SeedError> {
            let mut seen = HashSet::new();
            for id in ids.flatten() {
                if !seen.insert(id) {
                    return Err(SeedError::DuplicateId { kind, id });
                }
            }
            Ok(())
        }

        unique(EntityKind::Artist, self.artists.iter().map(|a| a.id))?;
        unique(EntityKind::Song, self.songs.iter().map(|s| s.id))?;
        unique(EntityKind::Album, self.albums.iter().map(|a| a.id))?;
        unique(EntityKind::Playlist, self.playlists.iter().map(|p| p.id))?;
        unique(EntityKind::User, self.users.iter().map(|u| u.id))
    }
}

impl MemoryStore {
    /// Build a store holding everything in `seed`.
    ///
    /// # Errors
    ///
    /// [`SeedError::DuplicateId`] when two records of a kind share an id,
    /// [`SeedError::UnknownUser`] for plays of a user the seed does not define
    /// and [`SeedError::Hash`] if a password cannot be hashed.
    pub fn from_seed(seed: &Seed) -> Result<Self, SeedError> {
        seed.check_unique()?;
        let store = MemoryStore::new();

        let artist_ids = resolve_ids(seed.artists.iter().map(|a| a.id));
        for (artist, id) in seed.artists.iter().zip(artist_ids) {
            let mut artist = artist.clone();
            artist.id = Some(id);
            store.insert_artist(artist)?;
        }
        let song_ids = resolve_ids(seed.songs.iter().map(|s| s.id));
        for (song, id) in seed.songs.iter().zip(song_ids) {
            let mut song = song.clone();
            song.id = Some(id);
            store.insert_song(song)?;
        }
        let album_ids = resolve_ids(seed.albums.iter().map(|a| a.id));
        for (album, id) in seed.albums.iter().zip(album_ids) {
            let mut album = album.clone();
            album.id = Some(id);
            store.insert_album(album)?;
        }
        let playlist_ids = resolve_ids(seed.playlists.iter().map(|p| p.id));
        for (playlist, id) in seed.playlists.iter().zip(playlist_ids) {
            let mut playlist = playlist.clone();
            playlist.id = Some(id);
            store.insert_playlist(playlist)?;
        }

        let mut users = HashSet::new();
        let user_ids = resolve_ids(seed.users.iter().map(|u| u.id));
        for (user, id) in seed.users.iter().zip(user_ids) {
            users.insert(store.add_user(Some(id), &user.name, &user.password)?);
        }
        for play in &seed.plays {
            if !users.contains(&play.user) {
                return Err(SeedError::UnknownUser(play.user));
            }
            store.record_play(
                play.user,
                EntityKey {
                    kind: play.kind,
                    id: play.id,
                },
            );
        }

        info!(
            artists = seed.artists.len(),
            songs = seed.songs.len(),
            albums = seed.albums.len(),
            playlists = seed.playlists.len(),
            users = seed.users.len(),
            plays = seed.plays.len(),
            "Seed applied"
        );
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CatalogStore;
    use std::io::Write;

    const SEED: &str = r#"
        [[artists]]
        id = 1
        name = "Daft Punk"

        [[songs]]
        id = 3
        name = "One More Time"
        artistIds = [1]

        [[albums]]
        name = "Discovery"
        artistIds = [1]
        songIds = [3]

        [[users]]
        id = 5
        name = "bob"
        password = "secret"

        [[plays]]
        user = 5
        kind = "song"
        id = 3
    "#;

    #[test]
    fn test_parse_seed() {
        let seed = Seed::from_toml_str(SEED).unwrap();
        assert_eq!(seed.artists.len(), 1);
        assert_eq!(seed.songs[0].artist_ids, vec![1]);
        assert_eq!(seed.albums[0].id, None);
        assert_eq!(seed.plays[0].kind, EntityKind::Song);
        assert!(seed.playlists.is_empty());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = Seed::from_toml_str("[[tracks]]\nname = \"x\"\n").unwrap_err();
        assert!(matches!(err, SeedError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();
        let seed = Seed::load(file.path()).unwrap();
        assert_eq!(seed.users[0].name, "bob");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Seed::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, SeedError::Io { .. }));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let seed = Seed::from_toml_str(
            "[[artists]]\nid = 1\nname = \"a\"\n[[artists]]\nid = 1\nname = \"b\"\n",
        )
        .unwrap();
        let err = MemoryStore::from_seed(&seed).unwrap_err();
        assert!(matches!(
            err,
            SeedError::DuplicateId {
                kind: EntityKind::Artist,
                id: 1
            }
        ));
    }

    #[test]
    fn test_play_for_unknown_user() {
        let seed = Seed::from_toml_str("[[plays]]\nuser = 9\nkind = \"song\"\nid = 1\n").unwrap();
        assert!(matches!(
            MemoryStore::from_seed(&seed),
            Err(SeedError::UnknownUser(9))
        ));
    }

    #[test]
    fn test_from_seed_populates_store() {
        let seed = Seed::from_toml_str(SEED).unwrap();
        assert!(MemoryStore::from_seed(&seed).is_ok());
    }

    #[test]
    fn test_auto_ids_skip_later_explicit_ids() {
        let seed = Seed::from_toml_str(
            "[[songs]]\nname = \"auto\"\n[[songs]]\nid = 1\nname = \"explicit\"\n",
        )
        .unwrap();
        may::config().set_stack_size(0x8000);
        let store = MemoryStore::from_seed(&seed).unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        store
            .song(2)
            .zip(store.song(1))
            .zip(store.new_entity_count())
            .subscribe(move |outcome| {
                let _sent = tx.send(outcome);
            });
        let ((auto, explicit), count) = rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .unwrap()
            .unwrap();
        assert_eq!(auto.unwrap().name, "auto");
        assert_eq!(explicit.unwrap().name, "explicit");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_resolve_ids_numbers_above_explicit() {
        assert_eq!(resolve_ids([None, Some(1), None].into_iter()), [2, 1, 3]);
        assert_eq!(resolve_ids([None, None].into_iter()), [1, 2]);
        assert_eq!(resolve_ids([Some(4), Some(2)].into_iter()), [4, 2]);
    }
}
