use serde::{Deserialize, Serialize};

/// A current/max pair, used for health, mana, and stamina (§3 Player Character: "resource
/// triple (health, mana, stamina each with a current/max)").
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ResourcePool {
    pub current: i32,
    pub max: i32,
}

impl ResourcePool {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0
    }

    pub fn apply_delta(&mut self, delta: i32) {
        self.current = (self.current + delta).clamp(0, self.max);
    }
}

/// The three pools every player character carries.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ResourceTriple {
    pub health: ResourcePool,
    pub mana: ResourcePool,
    pub stamina: ResourcePool,
}

impl ResourceTriple {
    pub fn new(max_health: i32, max_mana: i32, max_stamina: i32) -> Self {
        Self {
            health: ResourcePool::new(max_health),
            mana: ResourcePool::new(max_mana),
            stamina: ResourcePool::new(max_stamina),
        }
    }
}
