//! Name → actuator map used for command routing.
//!
//! Built once by the [`ActuatorFactory`](super::factory::ActuatorFactory)
//! and frozen: there is no public way to add or remove entries afterwards,
//! so the touch thread can read it without synchronisation.  Iteration is
//! in name order, which gives the run loop a stable polling order.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::ports::Actuator;

#[derive(Default)]
pub struct ActuatorRegistry {
    actuators: BTreeMap<String, Arc<dyn Actuator>>,
}

impl ActuatorRegistry {
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Actuator>> {
        self.actuators.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actuators.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actuators.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Actuator>)> {
        self.actuators.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.actuators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actuators.is_empty()
    }
}

/// Later entries with the same name replace earlier ones.
impl FromIterator<(String, Arc<dyn Actuator>)> for ActuatorRegistry {
    fn from_iter<I: IntoIterator<Item = (String, Arc<dyn Actuator>)>>(iter: I) -> Self {
        let mut actuators = BTreeMap::new();
        for (name, actuator) in iter {
            actuators.insert(name, actuator);
        }
        Self { actuators }
    }
}

impl core::fmt::Debug for ActuatorRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
