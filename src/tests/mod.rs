pub mod test_optimizer;
pub mod test_replay_buffer;
pub mod test_session;
