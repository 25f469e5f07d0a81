#[cfg(test)]
mod property_tests {
    use flappy_dqn::activations::Activation;
    use flappy_dqn::agent::QNetwork;
    use flappy_dqn::replay_buffer::{ReplayBuffer, Transition};
    use flappy_dqn::{Action, FunctionApproximator, Observation, QValues};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn finite_observation() -> impl Strategy<Value = [f32; 5]> {
        prop::array::uniform5(-500.0f32..500.0)
    }

    fn transition(reward: f32) -> Transition {
        let observation = Observation::new([reward; 5]);
        Transition::new(observation, Action::Flap, reward, observation, false)
    }

    proptest! {
        #[test]
        fn test_observation_accepts_only_five_values(values in prop::collection::vec(-1e3f32..1e3, 0..10)) {
            let result = Observation::from_slice(&values);
            prop_assert_eq!(result.is_ok(), values.len() == 5);
            if let Err(err) = result {
                prop_assert!(err.is_shape());
            }
        }

        #[test]
        fn test_buffer_never_exceeds_capacity(capacity in 1usize..50, inserts in 0usize..200) {
            let mut buffer = ReplayBuffer::new(capacity);
            for i in 0..inserts {
                buffer.add(transition(i as f32));
            }

            prop_assert_eq!(buffer.len(), inserts.min(capacity));
            if inserts > 0 {
                let newest = buffer.iter().last().unwrap();
                prop_assert_eq!(newest.reward, (inserts - 1) as f32);
                let oldest = buffer.iter().next().unwrap();
                prop_assert_eq!(oldest.reward, inserts.saturating_sub(capacity) as f32);
            }
        }

        #[test]
        fn test_argmax_picks_a_maximum(a in -100.0f32..100.0, b in -100.0f32..100.0) {
            let values = QValues::new([a, b]);
            let best = values.argmax();
            prop_assert_eq!(values.get(best), values.max());
            if a == b {
                prop_assert_eq!(best, Action::Idle);
            }
        }

        #[test]
        fn test_sigmoid_stays_in_unit_interval(x in -1e6f32..1e6) {
            let y = Activation::Sigmoid.value(x);
            prop_assert!((0.0..=1.0).contains(&y));
        }

        #[test]
        fn test_prediction_is_finite_and_pure(values in finite_observation(), seed in 0u64..1000) {
            let network = QNetwork::create(&mut StdRng::seed_from_u64(seed)).unwrap();
            let observation = Observation::new(values);

            let first = network.predict(&observation).unwrap();
            let second = network.predict(&observation).unwrap();
            prop_assert!(first.values().iter().all(|v| v.is_finite()));
            prop_assert_eq!(first, second);
        }
    }
}
