//! Entity codec and error envelope.
//!
//! Every response body is a JSON object. Entities gain a `type` field naming
//! their kind; anything absent or unserializable becomes `{"error": ..}` so
//! that clients can always branch on the presence of `error`.

use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::model::{Album, AnyEntity, Artist, EntityKind, Playlist, Song, User};
use crate::pending::JsonObject;

/// Message used when an operation does not pick its own.
pub const NULL_RESULT: &str = "null result";

/// Message for computations that failed after dispatch.
pub const INTERNAL_SERVER_ERROR: &str = "internal server error";

/// A serializable catalog record with a known kind.
pub trait Entity: Serialize {
    fn kind(&self) -> EntityKind;
}

macro_rules! entity_kind {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Entity for $ty {
                fn kind(&self) -> EntityKind {
                    EntityKind::$kind
                }
            }
        )*
    };
}

entity_kind!(
    Song => Song,
    Artist => Artist,
    Album => Album,
    User => User,
    Playlist => Playlist,
);

impl Entity for AnyEntity {
    fn kind(&self) -> EntityKind {
        match self {
            AnyEntity::Song(_) => EntityKind::Song,
            AnyEntity::Artist(_) => EntityKind::Artist,
            AnyEntity::Album(_) => EntityKind::Album,
            AnyEntity::User(_) => EntityKind::User,
            AnyEntity::Playlist(_) => EntityKind::Playlist,
        }
    }
}

/// `{"error": message}`
#[must_use]
pub fn error_json(message: &str) -> JsonObject {
    let mut body = JsonObject::new();
    body.insert("error".to_string(), Value::String(message.to_string()));
    body
}

/// Encode `entity`, or the error envelope with [`NULL_RESULT`] when absent.
#[must_use]
pub fn encode<E: Entity>(entity: Option<&E>) -> JsonObject {
    encode_or(entity, NULL_RESULT)
}

/// Encode `entity`, or the error envelope with `absent` when it is `None`.
#[must_use]
pub fn encode_or<E: Entity>(entity: Option<&E>, absent: &str) -> JsonObject {
    let Some(entity) = entity else {
        return error_json(absent);
    };
    let kind = entity.kind();
    match serde_json::to_value(entity) {
        Ok(Value::Object(mut body)) => {
            body.insert("type".to_string(), Value::String(kind.as_str().to_string()));
            body
        }
        Ok(other) => {
            error!(kind = %kind, value = %other, "Entity did not serialize to an object");
            error_json(INTERNAL_SERVER_ERROR)
        }
        Err(e) => {
            error!(kind = %kind, error = %e, "Entity serialization failed");
            error_json(INTERNAL_SERVER_ERROR)
        }
    }
}

/// `true` when `body` is an error envelope.
#[must_use]
pub fn is_error(body: &JsonObject) -> bool {
    body.contains_key("error")
}
