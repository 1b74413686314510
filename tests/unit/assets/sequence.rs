use super::*;

#[test]
fn default_uri_matches_asset_layout() {
    let seq = SequenceSpec::default();
    assert_eq!(seq.uri(FrameIndex(1)), "/sequence/ezgif-frame-001.jpg");
    assert_eq!(seq.uri(FrameIndex(42)), "/sequence/ezgif-frame-042.jpg");
    assert_eq!(seq.uri(FrameIndex(162)), "/sequence/ezgif-frame-162.jpg");
}

#[test]
fn base_path_is_joined_once() {
    let seq = SequenceSpec {
        base_path: "https://cdn.example.com/hero/".to_owned(),
        ext: "webp".to_owned(),
        ..SequenceSpec::default()
    };
    assert_eq!(
        seq.uri(FrameIndex(7)),
        "https://cdn.example.com/hero/sequence/ezgif-frame-007.webp"
    );

    let rel = SequenceSpec {
        base_path: String::new(),
        ..SequenceSpec::default()
    };
    assert_eq!(rel.uri(FrameIndex(3)), "/sequence/ezgif-frame-003.jpg");
}

#[test]
fn indices_cover_one_to_n() {
    let seq = SequenceSpec {
        frame_count: 4,
        ..SequenceSpec::default()
    };
    let v: Vec<u32> = seq.indices().map(|i| i.0).collect();
    assert_eq!(v, vec![1, 2, 3, 4]);
}

#[test]
fn validation_rejects_bad_specs() {
    assert!(SequenceSpec::default().validate().is_ok());
    let zero = SequenceSpec {
        frame_count: 0,
        ..SequenceSpec::default()
    };
    assert!(zero.validate().is_err());
    let narrow = SequenceSpec {
        frame_count: 1000,
        ..SequenceSpec::default()
    };
    assert!(narrow.validate().is_err());
    let nested = SequenceSpec {
        dir: "a/b".to_owned(),
        ..SequenceSpec::default()
    };
    assert!(nested.validate().is_err());
    let no_ext = SequenceSpec {
        ext: String::new(),
        ..SequenceSpec::default()
    };
    assert!(no_ext.validate().is_err());
}
