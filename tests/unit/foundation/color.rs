use super::*;

#[test]
fn endpoints_are_fixed() {
    assert_eq!(linear_to_srgb(0.0), 0.0);
    assert_eq!(srgb_to_linear(0.0), 0.0);
    assert!((linear_to_srgb(1.0) - 1.0).abs() < 1e-6);
    assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
}

#[test]
fn negative_inputs_clamp_to_zero() {
    assert_eq!(linear_to_srgb(-0.5), 0.0);
    assert_eq!(srgb_to_linear(-0.5), 0.0);
}

#[test]
fn roundtrip_is_close_across_unit_range() {
    for i in 0..=100 {
        let c = i as f32 / 100.0;
        let back = srgb_to_linear(linear_to_srgb(c));
        assert!((back - c).abs() < 1e-5, "c={c} back={back}");
    }
}

#[test]
fn mid_grey_matches_reference_value() {
    // 18% grey encodes to roughly 0.461 in sRGB.
    assert!((linear_to_srgb(0.18) - 0.4613).abs() < 1e-3);
}
