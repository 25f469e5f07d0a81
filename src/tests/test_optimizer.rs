use ndarray::{array, Array1, Array2};

use crate::optimizer::{Adam, Optimizer, OptimizerWrapper, SGD};

fn assert_close(actual: &[f32], expected: &[f32], tolerance: f32) {
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < tolerance, "{} != {}", a, e);
    }
}

#[test]
fn test_sgd_update() {
    let mut sgd = SGD::new(0.01);
    let mut weights = Array2::<f32>::ones((2, 2));
    let gradients = Array2::<f32>::from_elem((2, 2), 0.1);

    sgd.update_weights(0, &mut weights, &gradients);
    assert_close(weights.as_slice().unwrap(), &[0.999; 4], 1e-6);

    let mut biases = array![0.0f32, 1.0];
    sgd.update_biases(0, &mut biases, &array![1.0f32, -1.0]);
    assert_close(biases.as_slice().unwrap(), &[-0.01, 1.01], 1e-6);
}

#[test]
fn test_adam_first_step_moves_by_learning_rate() {
    let mut adam = Adam::with_learning_rate(0.01);
    let mut weights = Array2::<f32>::ones((2, 2));
    let gradients = array![[0.1f32, -0.1], [2.0, -3.0]];

    adam.begin_step();
    adam.update_weights(0, &mut weights, &gradients);

    // The first bias-corrected step has magnitude ~lr in the direction of -sign(g).
    assert_close(weights.as_slice().unwrap(), &[0.99, 1.01, 0.99, 1.01], 1e-4);
}

#[test]
fn test_adam_step_size_bias_correction() {
    let mut adam = Adam::new(0.002, 0.9, 0.999, 1e-7);
    assert_eq!(adam.step_size(), 0.002);

    adam.begin_step();
    let expected = 0.002 * (1.0f32 - 0.999).sqrt() / (1.0 - 0.9);
    assert!((adam.step_size() - expected).abs() < 1e-7);

    adam.begin_step();
    assert_eq!(adam.t, 2);
}

#[test]
fn test_adam_keeps_state_per_layer() {
    let mut adam = Adam::with_learning_rate(0.01);
    let mut first = Array2::<f32>::zeros((5, 3));
    let mut second = Array2::<f32>::zeros((3, 2));
    let mut first_bias = Array1::<f32>::zeros(3);
    let mut second_bias = Array1::<f32>::zeros(2);

    for _ in 0..3 {
        adam.begin_step();
        adam.update_weights(1, &mut second, &Array2::from_elem((3, 2), 1.0));
        adam.update_biases(1, &mut second_bias, &Array1::from_elem(2, 1.0));
        adam.update_weights(0, &mut first, &Array2::from_elem((5, 3), -1.0));
        adam.update_biases(0, &mut first_bias, &Array1::from_elem(3, -1.0));
    }

    assert!(second.iter().all(|&w| w < 0.0));
    assert!(first.iter().all(|&w| w > 0.0));
    assert!(second_bias.iter().all(|&b| b < 0.0));
    assert!(first_bias.iter().all(|&b| b > 0.0));
}

#[test]
fn test_wrapper_dispatch() {
    let mut wrapper = OptimizerWrapper::SGD(SGD::new(0.5));
    assert_eq!(wrapper.learning_rate(), 0.5);

    let mut biases = array![1.0f32];
    wrapper.begin_step();
    wrapper.update_biases(0, &mut biases, &array![1.0f32]);
    assert_eq!(biases[0], 0.5);

    let wrapper = OptimizerWrapper::Adam(Adam::with_learning_rate(0.002));
    assert_eq!(wrapper.learning_rate(), 0.002);
}
