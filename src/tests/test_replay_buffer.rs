use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::FlappyError;
use crate::replay_buffer::{ReplayBuffer, Transition};
use crate::types::{Action, Observation};

fn transition(reward: f32) -> Transition {
    Transition::new(
        Observation::new([reward; 5]),
        Action::Idle,
        reward,
        Observation::new([0.0; 5]),
        false,
    )
}

#[test]
fn test_add_and_len() {
    let mut buffer = ReplayBuffer::new(4);
    assert!(buffer.is_empty());

    for i in 0..3 {
        assert!(buffer.add(transition(i as f32)).is_none());
    }
    assert_eq!(buffer.len(), 3);
    assert!(!buffer.is_full());
}

#[test]
fn test_eviction_returns_oldest() {
    let mut buffer = ReplayBuffer::new(3);
    for i in 0..3 {
        buffer.add(transition(i as f32));
    }
    assert!(buffer.is_full());

    let evicted = buffer.add(transition(3.0)).unwrap();
    assert_eq!(evicted.reward, 0.0);
    assert_eq!(buffer.len(), 3);

    let rewards: Vec<f32> = buffer.iter().map(|t| t.reward).collect();
    assert_eq!(rewards, vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_zero_capacity_keeps_nothing() {
    let mut buffer = ReplayBuffer::new(0);
    let rejected = buffer.add(transition(1.0));
    assert_eq!(rejected.map(|t| t.reward), Some(1.0));
    assert!(buffer.is_empty());
}

#[test]
fn test_sample_is_distinct() {
    let mut buffer = ReplayBuffer::new(64);
    for i in 0..64 {
        buffer.add(transition(i as f32));
    }

    let mut rng = StdRng::seed_from_u64(42);
    let mut rewards: Vec<f32> = buffer.sample(64, &mut rng).unwrap().iter().map(|t| t.reward).collect();
    rewards.sort_by(|a, b| a.total_cmp(b));
    rewards.dedup();
    assert_eq!(rewards.len(), 64);

    assert_eq!(buffer.sample(10, &mut rng).unwrap().len(), 10);
}

#[test]
fn test_sample_more_than_stored_fails() {
    let mut buffer = ReplayBuffer::new(8);
    buffer.add(transition(0.0));

    let mut rng = StdRng::seed_from_u64(0);
    match buffer.sample(2, &mut rng) {
        Err(FlappyError::EmptyBatch { requested, available }) => {
            assert_eq!(requested, 2);
            assert_eq!(available, 1);
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_sampling_is_reproducible() {
    let mut buffer = ReplayBuffer::new(32);
    for i in 0..32 {
        buffer.add(transition(i as f32));
    }

    let first: Vec<f32> = buffer
        .sample(8, &mut StdRng::seed_from_u64(5))
        .unwrap()
        .iter()
        .map(|t| t.reward)
        .collect();
    let second: Vec<f32> = buffer
        .sample(8, &mut StdRng::seed_from_u64(5))
        .unwrap()
        .iter()
        .map(|t| t.reward)
        .collect();
    assert_eq!(first, second);
}

#[test]
fn test_clear() {
    let mut buffer = ReplayBuffer::new(4);
    buffer.add(transition(1.0));
    buffer.clear();
    assert!(buffer.is_empty());
    assert_eq!(buffer.capacity(), 4);
}
