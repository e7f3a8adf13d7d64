//! Catalog records.
//!
//! Records are owned by the data store. The dispatch engine only serializes
//! them through [`crate::codec`], it never checks their relations.

use serde::{Deserialize, Serialize};

pub type SongId = i64;
pub type ArtistId = i64;
pub type AlbumId = i64;
pub type UserId = i64;
pub type PlaylistId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: Option<SongId>,
    pub name: String,
    #[serde(default)]
    pub artist_ids: Vec<ArtistId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: Option<ArtistId>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: Option<AlbumId>,
    pub name: String,
    #[serde(default)]
    pub artist_ids: Vec<ArtistId>,
    #[serde(default)]
    pub song_ids: Vec<SongId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<UserId>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: Option<PlaylistId>,
    pub name: String,
    pub user_id: UserId,
    #[serde(default)]
    pub song_ids: Vec<SongId>,
}

/// A user together with the stored password hash.
///
/// Only the session provider sees this; operations serialize `user` alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub user: User,
    pub password_hash: String,
}

/// The kinds of catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Song,
    Artist,
    Album,
    User,
    Playlist,
}

impl EntityKind {
    /// Discriminator written into serialized records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EntityKind::Song => "song",
            EntityKind::Artist => "artist",
            EntityKind::Album => "album",
            EntityKind::User => "user",
            EntityKind::Playlist => "playlist",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a record of any kind, e.g. an entry in a listening history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: i64,
}

/// A record of any kind, as returned by the "new" and "recent" feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AnyEntity {
    Song(Song),
    Artist(Artist),
    Album(Album),
    User(User),
    Playlist(Playlist),
}
