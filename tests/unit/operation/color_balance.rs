use super::*;
use crate::operation::constant::ConstantOperation;

fn graded_graph(
    params: &LiftGammaGain,
    factor: f32,
    color: [f32; 4],
) -> (OperationGraph, OperationId) {
    let mut graph = OperationGraph::new();
    let fac = graph.add(ConstantOperation::value(factor));
    let col = graph.add(ConstantOperation::color(color));
    let cb = graph.add(ColorBalanceLggOperation::from_params(params).unwrap());
    graph.connect(fac, cb, 0).unwrap();
    graph.connect(col, cb, 1).unwrap();
    graph.init_execution().unwrap();
    (graph, cb)
}

#[test]
fn neutral_coefficients_are_identity() {
    for i in 0..=20 {
        let v = i as f32 / 20.0;
        let out = colorbalance_lgg(v, 1.0, 1.0, 1.0);
        assert!((out - v).abs() < 1e-5, "v={v} out={out}");
    }
}

#[test]
fn output_is_finite_across_parameter_grid() {
    let lifts = [-8.0f32, -1.0, -0.25, 0.0, 0.5, MAX_LIFT];
    let gammas = [MIN_GAMMA, 0.25, 0.5, 1.0, 2.0, 4.0, 100.0];
    let gains = [0.0f32, 0.5, 1.0, 2.0, 4.0, MAX_GAIN];
    for &lift in &lifts {
        for &gamma in &gammas {
            for &gain in &gains {
                let params = LiftGammaGain {
                    lift: [lift; 3],
                    gamma: [gamma; 3],
                    gain: [gain; 3],
                };
                assert!(params.validate().is_ok(), "{params:?}");
                let k = params.coefficients();
                for i in 0..=16 {
                    let v = i as f32 / 16.0;
                    let out = colorbalance_lgg(v, k.lift[0], k.gamma_inv[0], k.gain[0]);
                    assert!(
                        out.is_finite(),
                        "lift={lift} gamma={gamma} gain={gain} v={v} -> {out}"
                    );
                }
            }
        }
    }
}

#[test]
fn negative_display_value_is_clamped_before_power() {
    // lift 3 pushes dark inputs below zero in display space.
    let out = colorbalance_lgg(0.0, 3.0, 0.5, 1.0);
    assert_eq!(out, 0.0);
}

#[test]
fn lift_raises_shadows_and_gain_scales_highlights() {
    let lifted = LiftGammaGain {
        lift: [0.2; 3],
        ..LiftGammaGain::default()
    }
    .coefficients();
    assert!(colorbalance_lgg(0.0, lifted.lift[0], 1.0, 1.0) > 0.0);

    let gained = LiftGammaGain {
        gain: [0.5; 3],
        ..LiftGammaGain::default()
    }
    .coefficients();
    assert!(colorbalance_lgg(1.0, gained.lift[0], 1.0, gained.gain[0]) < 1.0);
}

#[test]
fn coefficients_convert_user_parameters() {
    let k = LiftGammaGain {
        lift: [0.25, 0.0, -0.5],
        gamma: [2.0, 1.0, 0.5],
        gain: [1.0, 1.5, 2.0],
    }
    .coefficients();
    assert_eq!(k.lift, [0.75, 1.0, 1.5]);
    assert_eq!(k.gamma_inv, [0.5, 1.0, 2.0]);
    assert_eq!(k.gain, [1.0, 1.5, 2.0]);
    assert_eq!(LiftGammaGain::default().coefficients(), LggCoefficients::default());
}

#[test]
fn validate_rejects_bad_parameters() {
    let bad_gamma = LiftGammaGain {
        gamma: [1.0, 0.0, 1.0],
        ..LiftGammaGain::default()
    };
    assert!(bad_gamma.validate().is_err());
    assert!(ColorBalanceLggOperation::from_params(&bad_gamma).is_err());

    let tiny_gamma = LiftGammaGain {
        gamma: [0.001; 3],
        gain: [2.0; 3],
        ..LiftGammaGain::default()
    };
    assert!(tiny_gamma.validate().is_err());
    let k = tiny_gamma.coefficients();
    assert!(!colorbalance_lgg(1.0, k.lift[0], k.gamma_inv[0], k.gain[0]).is_finite());

    for bad in [
        LiftGammaGain {
            gain: [MAX_GAIN + 1.0; 3],
            ..LiftGammaGain::default()
        },
        LiftGammaGain {
            gain: [-0.5; 3],
            ..LiftGammaGain::default()
        },
        LiftGammaGain {
            lift: [1.5, 0.0, 0.0],
            ..LiftGammaGain::default()
        },
    ] {
        assert!(bad.validate().is_err(), "{bad:?}");
    }

    let nan = LiftGammaGain {
        gain: [f32::NAN, 1.0, 1.0],
        ..LiftGammaGain::default()
    };
    assert!(nan.validate().is_err());
    assert!(LiftGammaGain::default().validate().is_ok());
}

#[test]
fn socket_layout_and_resolution_source() {
    let op = ColorBalanceLggOperation::new(LggCoefficients::default());
    let inputs = op.base().inputs();
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0].data_type(), DataType::Value);
    assert_eq!(inputs[1].data_type(), DataType::Color);
    assert_eq!(op.base().output_data_type(), DataType::Color);
    assert_eq!(op.base().resolution_input_socket_index(), 1);
}

#[test]
fn identity_parameters_with_full_factor_reproduce_input() {
    let color = [0.18, 0.5, 0.9, 0.7];
    let (graph, cb) = graded_graph(&LiftGammaGain::default(), 1.0, color);
    let mut out = [0.0; 4];
    graph.read_sampled(cb, &mut out, 0.0, 0.0, PixelSampler::Nearest);
    for c in 0..4 {
        assert!((out[c] - color[c]).abs() < 1e-5, "channel {c}: {out:?}");
    }
}

#[test]
fn zero_factor_reproduces_input_exactly() {
    let params = LiftGammaGain {
        lift: [0.4, -0.3, 0.1],
        gamma: [0.6, 1.7, 2.2],
        gain: [1.8, 0.4, 1.1],
    };
    let color = [0.05, 0.33, 0.97, 0.25];
    let (graph, cb) = graded_graph(&params, 0.0, color);
    let mut out = [0.0; 4];
    graph.read_sampled(cb, &mut out, 4.0, 2.0, PixelSampler::Bilinear);
    assert_eq!(out, color);
}

#[test]
fn factor_above_one_is_clamped() {
    let params = LiftGammaGain {
        lift: [0.1; 3],
        gamma: [0.8; 3],
        gain: [1.2; 3],
    };
    let op = ColorBalanceLggOperation::from_params(&params).unwrap();
    let color = [0.2, 0.4, 0.6, 1.0];
    assert_eq!(op.balance_pixel(1.0, color), op.balance_pixel(7.5, color));

    let k = params.coefficients();
    let full = op.balance_pixel(3.0, color);
    for c in 0..3 {
        assert_eq!(full[c], colorbalance_lgg(color[c], k.lift[c], k.gamma_inv[c], k.gain[c]));
    }
}

#[test]
fn negative_factor_extrapolates() {
    let params = LiftGammaGain {
        gain: [2.0; 3],
        ..LiftGammaGain::default()
    };
    let op = ColorBalanceLggOperation::from_params(&params).unwrap();
    let color = [0.3, 0.3, 0.3, 1.0];
    let out = op.balance_pixel(-0.5, color);
    assert!(out[0] < color[0]);
}

#[test]
fn alpha_passes_through_unchanged() {
    let params = LiftGammaGain {
        lift: [0.5; 3],
        gamma: [3.0; 3],
        gain: [0.1; 3],
    };
    let op = ColorBalanceLggOperation::from_params(&params).unwrap();
    for alpha in [0.0f32, 0.123, 1.0, 4.5, -2.0] {
        for fac in [-1.0f32, 0.0, 0.5, 1.0, 9.0] {
            assert_eq!(op.balance_pixel(fac, [0.4, 0.5, 0.6, alpha])[3], alpha);
        }
    }
}

#[test]
fn row_path_matches_sampled_path() {
    let params = LiftGammaGain {
        lift: [0.15, -0.2, 0.05],
        gamma: [0.7, 1.3, 1.0],
        gain: [1.1, 0.9, 1.4],
    };
    let color = [0.21, 0.64, 0.08, 0.5];
    let (graph, cb) = graded_graph(&params, 0.6, color);

    let mut sampled = [0.0; 4];
    graph.read_sampled(cb, &mut sampled, 0.0, 0.0, PixelSampler::Nearest);

    let factor = [0.6f32; 3];
    let colors = color.repeat(3);
    let mut row = [0.0f32; 12];
    let mut p = PixelCursor::new(&mut row, 4, 0, 0)
        .with_input(&factor, 1)
        .with_input(&colors, 4);
    graph
        .operation(cb)
        .unwrap()
        .as_row_operation()
        .unwrap()
        .update_memory_buffer_row(&mut p);
    drop(p);
    for px in row.chunks_exact(4) {
        assert_eq!(px, &sampled[..]);
    }
}

#[test]
#[should_panic(expected = "outside init_execution")]
fn read_before_init_panics() {
    let mut graph = OperationGraph::new();
    let fac = graph.add(ConstantOperation::value(1.0));
    let col = graph.add(ConstantOperation::color([0.0; 4]));
    let cb = graph.add(ColorBalanceLggOperation::new(LggCoefficients::default()));
    graph.connect(fac, cb, 0).unwrap();
    graph.connect(col, cb, 1).unwrap();

    let mut out = [0.0; 4];
    graph
        .operation(cb)
        .unwrap()
        .execute_pixel_sampled(&graph, &mut out, 0.0, 0.0, PixelSampler::Nearest);
}

#[test]
fn deinit_clears_readers() {
    let mut op = ColorBalanceLggOperation::new(LggCoefficients::default());
    op.deinit_execution();
    assert!(op.input_value.is_none() && op.input_color.is_none());
}
