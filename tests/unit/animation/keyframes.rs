use super::*;

fn beat_a_opacity() -> Keyframes<f64> {
    Keyframes::linear([0.0, 0.1, 0.15, 0.25], [1.0, 1.0, 0.0, 0.0])
}

#[test]
fn breakpoints_return_configured_values() {
    let kf = beat_a_opacity();
    assert_eq!(kf.sample(0.0), Some(1.0));
    assert_eq!(kf.sample(0.1), Some(1.0));
    assert_eq!(kf.sample(0.15), Some(0.0));
    assert_eq!(kf.sample(0.25), Some(0.0));
}

#[test]
fn interpolates_between_and_clamps_outside() {
    let kf = beat_a_opacity();
    let mid = kf.sample(0.125).unwrap();
    assert!((mid - 0.5).abs() < 1e-9);
    assert_eq!(kf.sample(-1.0), Some(1.0));
    assert_eq!(kf.sample(2.0), Some(0.0));
    assert_eq!(kf.sample(f64::NAN), Some(1.0));
}

#[test]
fn repeated_breakpoint_is_a_plateau() {
    let kf = Keyframes::<f64>::linear([0.25, 0.35, 0.35, 0.45], [0.0, 1.0, 1.0, 0.0]);
    assert_eq!(kf.sample(0.35), Some(1.0));
    assert!((kf.sample(0.30).unwrap() - 0.5).abs() < 1e-9);
    assert!((kf.sample(0.40).unwrap() - 0.5).abs() < 1e-9);

    let tail = Keyframes::linear([0.75, 0.85, 1.0, 1.0], [0.0, 1.0, 1.0, 1.0]);
    assert_eq!(tail.sample(1.0), Some(1.0));
}

#[test]
fn eased_segment_differs_from_linear() {
    let kf = Keyframes::<f64>::linear([0.0, 1.0], [0.0, 10.0]).with_eases([Ease::InQuad]);
    assert!((kf.sample(0.5).unwrap() - 2.5).abs() < 1e-9);
}

#[test]
fn each_segment_uses_its_own_ease() {
    let kf = Keyframes::<f64>::linear([0.0, 1.0, 2.0], [0.0, 10.0, 20.0])
        .with_eases([Ease::InQuad, Ease::Linear]);
    assert!(kf.validate().is_ok());
    assert!((kf.sample(0.5).unwrap() - 2.5).abs() < 1e-9);
    assert!((kf.sample(1.5).unwrap() - 15.0).abs() < 1e-9);
}

#[test]
fn eases_must_match_segment_count() {
    let kf = Keyframes::linear([0.0, 1.0, 2.0], [0.0, 10.0, 20.0]).with_eases([Ease::OutQuad]);
    assert!(kf.validate().is_err());
}

#[test]
fn eases_deserialize_per_segment() {
    let kf: Keyframes<f64> = serde_json::from_str(
        r#"{"at":[0.0,0.5,1.0],"values":[0.0,1.0,0.0],"eases":["out-quad","linear"]}"#,
    )
    .unwrap();
    assert_eq!(kf.eases, vec![Ease::OutQuad, Ease::Linear]);

    let plain: Keyframes<f64> = serde_json::from_str(r#"{"at":[0.0,1.0],"values":[0.0,1.0]}"#).unwrap();
    assert!(plain.eases.is_empty());
    assert!(!serde_json::to_string(&plain).unwrap().contains("eases"));
}

#[test]
fn validate_rejects_bad_shapes() {
    assert!(Keyframes::<f64>::linear(Vec::<f64>::new(), Vec::<f64>::new()).validate().is_err());
    assert!(Keyframes::linear([0.0, 1.0], [1.0]).validate().is_err());
    assert!(Keyframes::linear([0.5, 0.2], [1.0, 0.0]).validate().is_err());
    assert!(Keyframes::linear([0.0, f64::INFINITY], [1.0, 0.0]).validate().is_err());
    assert!(beat_a_opacity().validate().is_ok());
    assert_eq!(Keyframes::<f64>::linear(Vec::<f64>::new(), Vec::<f64>::new()).sample(0.3), None);
}

#[test]
fn vec2_values_interpolate_componentwise() {
    let kf = Keyframes::linear([0.0, 1.0], [Vec2::new(0.0, 20.0), Vec2::new(10.0, -20.0)]);
    let v = kf.sample(0.5).unwrap();
    assert!((v.x - 5.0).abs() < 1e-9);
    assert!(v.y.abs() < 1e-9);
}
