// Repository trait for host entity states
use crate::domain::entity::HostStates;
use async_trait::async_trait;

#[async_trait]
pub trait StateRepository: Send + Sync {
    /// Snapshot of every entity the host knows about
    async fn list_states(&self) -> anyhow::Result<HostStates>;
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use crate::domain::entity::EntityState;
    use std::sync::Mutex;

    /// In-memory store whose contents tests can swap between polls.
    #[derive(Default)]
    pub struct MemoryStateRepository {
        states: Mutex<Vec<EntityState>>,
        pub fail: std::sync::atomic::AtomicBool,
    }

    impl MemoryStateRepository {
        pub fn new(states: Vec<EntityState>) -> Self {
            Self {
                states: Mutex::new(states),
                ..Default::default()
            }
        }

        pub fn replace(&self, states: Vec<EntityState>) {
            *self.states.lock().unwrap() = states;
        }
    }

    #[async_trait]
    impl StateRepository for MemoryStateRepository {
        async fn list_states(&self) -> anyhow::Result<HostStates> {
            if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
                anyhow::bail!("host unreachable");
            }
            Ok(HostStates::new(self.states.lock().unwrap().clone()))
        }
    }
}
