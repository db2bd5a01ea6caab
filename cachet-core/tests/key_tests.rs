// Key Builder Tests

use cachet_core::{CacheError, KeyBuilder, Scalar};
use serde_json::json;

#[test]
fn test_same_inputs_same_key() {
    let args = [Scalar::from(42), Scalar::from("large"), Scalar::from(true)];

    let first = KeyBuilder::new().build("photoDetail", &args).unwrap();
    let second = KeyBuilder::new().build("photoDetail", &args).unwrap();

    assert_eq!(first, second);
    // Stable across processes: no hashing or per-run state in the key
    assert_eq!(first.as_str(), "photoDetail:42:large:true");
}

#[test]
fn test_argument_order_matters() {
    let builder = KeyBuilder::new();
    let a = builder
        .build("searchPhotos", &[Scalar::from("sea"), Scalar::from(2)])
        .unwrap();
    let b = builder
        .build("searchPhotos", &[Scalar::from(2), Scalar::from("sea")])
        .unwrap();

    assert_ne!(a, b);
}

#[test]
fn test_no_arguments() {
    let key = KeyBuilder::new().build("photoList", &[]).unwrap();
    assert_eq!(key.as_str(), "photoList");
}

#[test]
fn test_json_arguments() {
    let key = KeyBuilder::new()
        .build_json("photoDetail", &[json!(42), json!(null), json!(1.5)])
        .unwrap();
    assert_eq!(key.as_str(), "photoDetail:42:null:1.5");
}

#[test]
fn test_structured_argument_rejected() {
    let err = KeyBuilder::new()
        .build_json("photoDetail", &[json!({"id": 42})])
        .unwrap_err();
    assert!(matches!(err, CacheError::InvalidArgument(_)));
}

#[test]
fn test_reserved_characters_escaped() {
    let key = KeyBuilder::new()
        .build("searchPhotos", &[Scalar::from("a:b*")])
        .unwrap();
    assert_eq!(key.as_str(), "searchPhotos:a%3Ab%2A");
}
