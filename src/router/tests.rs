use std::sync::Arc;

use http::Method;

use super::Router;
use crate::codec::error_json;
use crate::error::ConfigError;
use crate::operation::Operation;

fn op(name: &str, path: &str) -> Arc<Operation> {
    Arc::new(Operation::get(name, path).handler(|_| Ok(error_json("unused").into())))
}

#[test]
fn test_duplicate_route_is_config_error() {
    let mut router = Router::new();
    router.insert(Method::GET, "/api/v1/song/:id", op("song", "/song/:id")).unwrap();
    let err = router
        .insert(Method::GET, "/api/v1/song/:id", op("track", "/song/:id"))
        .unwrap_err();
    assert_eq!(
        err,
        ConfigError::DuplicateRoute {
            method: Method::GET,
            path: "/api/v1/song/:id".to_string(),
            existing: "song".to_string(),
            duplicate: "track".to_string(),
        }
    );
    assert_eq!(router.len(), 1);
}

#[test]
fn test_same_path_different_verb_is_allowed() {
    let mut router = Router::new();
    router.insert(Method::GET, "/api/v1/song/:id", op("song", "/song/:id")).unwrap();
    assert!(router
        .insert(Method::POST, "/api/v1/song/:id", op("save", "/song/:id"))
        .is_ok());
    assert_eq!(router.routes().len(), 2);
}

#[test]
fn test_invalid_templates_are_rejected() {
    let mut router = Router::new();
    for bad in ["song/:id", "/song/:", "/song/a:b", "/song?x=1", "/api/v1/ü:id"] {
        let err = router.insert(Method::GET, bad, op("bad", bad)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPathTemplate { .. }), "{bad}");
    }
    assert!(router.is_empty());
}

#[test]
fn test_non_ascii_static_segment_is_accepted() {
    let mut router = Router::new();
    router
        .insert(Method::GET, "/api/v1/ünits/:id", op("units", "/ünits/:id"))
        .unwrap();
    assert_eq!(router.len(), 1);
}

#[test]
fn test_versions_share_one_table() {
    let mut router = Router::new();
    router.insert(Method::GET, "/api/v1/song/:id", op("song", "/song/:id")).unwrap();
    router.insert(Method::GET, "/api/v2/song/:id", op("song2", "/song/:id")).unwrap();
    let v1 = router.route(&Method::GET, "/api/v1/song/1").unwrap();
    let v2 = router.route(&Method::GET, "/api/v2/song/1").unwrap();
    assert_eq!(v1.operation().name, "song");
    assert_eq!(v2.operation().name, "song2");
    assert!(router.route(&Method::GET, "/api/v3/song/1").is_none());
}
