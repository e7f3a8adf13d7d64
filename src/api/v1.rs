//! Version 1 of the catalog API, served under `/api/v1`.
//!
//! | operation | path | parameters |
//! |---|---|---|
//! | song, artist, album, playlist, user | `/<kind>/:id` | `id` |
//! | search | `/search/:q` | `q` |
//! | login | `/login` | `username?`, `password?` |
//! | validate | `/validate` | `token?` |
//! | stats | `/stats` | `token?` |
//! | new, recent | `/<feed>/:offset` | `offset?`, `token?` |
//!
//! Binding is positional and left-padded, so a feed call without a token
//! binds its one path value to `token` and leaves `offset` empty. The feed
//! handlers read an empty offset as "no token" and answer `invalid token`.

use std::sync::Arc;

use serde_json::Value;

use super::AppContext;
use crate::codec::{encode, encode_or, error_json};
use crate::model::User;
use crate::operation::{Operation, ParamSpec};
use crate::pending::{JsonObject, Pending, Reply};
use crate::registry::Registry;
use crate::store::SessionProvider;

const INVALID_TOKEN: &str = "invalid token";
const MISSING_CREDENTIALS: &str = "missing username or password";
const UNKNOWN_USER: &str = "couldn't find user";
const WRONG_PASSWORD: &str = "wrong password";
const NO_NEW_ENTITY: &str = "no new entity found";
const NO_RECENT_ENTITY: &str = "no recent entity found";

/// The v1 operation set mounted under `/api/v{version}`.
#[must_use]
pub fn registry_at(ctx: &AppContext, version: u32) -> Registry {
    Registry::new(version)
        .operation(song(ctx))
        .operation(artist(ctx))
        .operation(album(ctx))
        .operation(playlist(ctx))
        .operation(user(ctx))
        .operation(search(ctx))
        .operation(login(ctx))
        .operation(validate(ctx))
        .operation(stats(ctx))
        .operation(new(ctx))
        .operation(recent(ctx))
}

fn object<const N: usize>(fields: [(&str, Value); N]) -> JsonObject {
    fields
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn ids(items: impl Iterator<Item = Option<i64>>) -> Value {
    Value::Array(items.map(Value::from).collect())
}

/// Resolve `token` to a user and continue with `then`; an absent token and
/// an unknown one both answer `invalid token`.
fn with_user(
    sessions: &Arc<dyn SessionProvider>,
    token: Option<&str>,
    then: impl FnOnce(User) -> Pending<JsonObject> + Send + 'static,
) -> Reply {
    let Some(token) = token else {
        return error_json(INVALID_TOKEN).into();
    };
    sessions
        .resolve_user(token)
        .and_then(|user| match user {
            Some(user) => then(user),
            None => Pending::ready(error_json(INVALID_TOKEN)),
        })
        .into()
}

fn song(ctx: &AppContext) -> Operation {
    let catalog = Arc::clone(&ctx.catalog);
    Operation::get("song", "/song/:id")
        .integer("id")
        .handler(move |args| {
            let id = args.int(0)?;
            Ok(catalog.song(id).map(|s| encode(s.as_ref())).into())
        })
}

fn artist(ctx: &AppContext) -> Operation {
    let catalog = Arc::clone(&ctx.catalog);
    Operation::get("artist", "/artist/:id")
        .integer("id")
        .handler(move |args| {
            let id = args.int(0)?;
            Ok(catalog.artist(id).map(|a| encode(a.as_ref())).into())
        })
}

fn album(ctx: &AppContext) -> Operation {
    let catalog = Arc::clone(&ctx.catalog);
    Operation::get("album", "/album/:id")
        .integer("id")
        .handler(move |args| {
            let id = args.int(0)?;
            Ok(catalog.album(id).map(|a| encode(a.as_ref())).into())
        })
}

fn playlist(ctx: &AppContext) -> Operation {
    let catalog = Arc::clone(&ctx.catalog);
    Operation::get("playlist", "/playlist/:id")
        .integer("id")
        .handler(move |args| {
            let id = args.int(0)?;
            Ok(catalog.playlist(id).map(|p| encode(p.as_ref())).into())
        })
}

fn user(ctx: &AppContext) -> Operation {
    let catalog = Arc::clone(&ctx.catalog);
    Operation::get("user", "/user/:id")
        .integer("id")
        .handler(move |args| {
            let id = args.int(0)?;
            Ok(catalog
                .user(id)
                .map(|u| encode_or(u.as_ref(), INVALID_TOKEN))
                .into())
        })
}

fn search(ctx: &AppContext) -> Operation {
    let catalog = Arc::clone(&ctx.catalog);
    Operation::get("search", "/search/:q")
        .string("q")
        .handler(move |args| {
            let q = args.str(0)?;
            let found = catalog
                .search_artists(q)
                .zip(catalog.search_songs(q))
                .zip(catalog.search_albums(q))
                .map(|((artists, songs), albums)| {
                    object([
                        ("artistIds", ids(artists.iter().map(|a| a.id))),
                        ("songIds", ids(songs.iter().map(|s| s.id))),
                        ("albumIds", ids(albums.iter().map(|a| a.id))),
                    ])
                });
            Ok(found.into())
        })
}

fn login(ctx: &AppContext) -> Operation {
    let sessions = Arc::clone(&ctx.sessions);
    Operation::get("login", "/login")
        .optional_string("username")
        .optional_string("password")
        .handler(move |args| {
            let username = args.opt_str(0)?.filter(|s| !s.trim().is_empty());
            let password = args.opt_str(1)?.filter(|s| !s.trim().is_empty());
            let (Some(username), Some(password)) = (username, password) else {
                return Ok(error_json(MISSING_CREDENTIALS).into());
            };

            let provider = Arc::clone(&sessions);
            let password = password.to_string();
            let reply = sessions
                .lookup_user_by_name(username)
                .and_then(move |account| {
                    let Some(account) = account else {
                        return Pending::ready(error_json(UNKNOWN_USER));
                    };
                    if !provider.check_password(&password, &account.password_hash) {
                        return Pending::ready(error_json(WRONG_PASSWORD));
                    }
                    provider
                        .issue_token(&account.user)
                        .map(|token| object([("token", Value::String(token))]))
                });
            Ok(reply.into())
        })
}

fn validate(ctx: &AppContext) -> Operation {
    let sessions = Arc::clone(&ctx.sessions);
    Operation::get("validate", "/validate")
        .optional_string("token")
        .handler(move |args| {
            let Some(token) = args.opt_str(0)? else {
                return Ok(object([("valid", Value::Bool(false))]).into());
            };
            Ok(sessions
                .is_valid_token(token)
                .map(|valid| object([("valid", Value::Bool(valid))]))
                .into())
        })
}

fn stats(ctx: &AppContext) -> Operation {
    let AppContext { catalog, sessions } = ctx.clone();
    Operation::get("stats", "/stats")
        .optional_string("token")
        .handler(move |args| {
            let catalog = Arc::clone(&catalog);
            Ok(with_user(&sessions, args.opt_str(0)?, move |user| {
                catalog
                    .recent_entity_count(&user)
                    .zip(catalog.new_entity_count())
                    .map(|(recent, new)| {
                        object([
                            ("recentCount", Value::from(recent)),
                            ("newCount", Value::from(new)),
                        ])
                    })
            }))
        })
}

fn new(ctx: &AppContext) -> Operation {
    let AppContext { catalog, sessions } = ctx.clone();
    Operation::get("new", "/new/:offset")
        .param(ParamSpec::integer("offset").nullable())
        .optional_string("token")
        .handler(move |args| {
            let Some(offset) = args.opt_int(0)? else {
                return Ok(error_json(INVALID_TOKEN).into());
            };
            let catalog = Arc::clone(&catalog);
            Ok(with_user(&sessions, args.opt_str(1)?, move |_user| {
                catalog
                    .new_entity(offset)
                    .map(|e| encode_or(e.as_ref(), NO_NEW_ENTITY))
            }))
        })
}

fn recent(ctx: &AppContext) -> Operation {
    let AppContext { catalog, sessions } = ctx.clone();
    Operation::get("recent", "/recent/:offset")
        .param(ParamSpec::integer("offset").nullable())
        .optional_string("token")
        .handler(move |args| {
            let Some(offset) = args.opt_int(0)? else {
                return Ok(error_json(INVALID_TOKEN).into());
            };
            let catalog = Arc::clone(&catalog);
            Ok(with_user(&sessions, args.opt_str(1)?, move |user| {
                catalog
                    .recent_entity(&user, offset)
                    .map(|e| encode_or(e.as_ref(), NO_RECENT_ENTITY))
            }))
        })
}
