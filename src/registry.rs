//! Named factories for objects a user can place by hand.

use crate::components::SimObject;
use crate::error::{Result, SimError};
use crate::geometry::Position;
use crate::habitat::Habitat;
use crate::random::RandomSource;
use crate::render::Icon;
use tracing::info;

/// Builds an object at the requested position.
pub type Factory = Box<dyn Fn(Position, &Habitat, &mut dyn RandomSource) -> Result<SimObject>>;

pub struct Registration {
    pub name: String,
    pub icon: Icon,
    factory: Factory,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("icon", &self.icon)
            .finish_non_exhaustive()
    }
}

/// Factories in registration order. Registering a name twice keeps the
/// original slot and the newer factory.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    entries: Vec<Registration>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, icon: Icon, factory: F)
    where
        F: Fn(Position, &Habitat, &mut dyn RandomSource) -> Result<SimObject> + 'static,
    {
        let name = name.into();
        let registration = Registration {
            name: name.clone(),
            icon,
            factory: Box::new(factory),
        };
        match self.entries.iter_mut().find(|r| r.name == name) {
            Some(existing) => {
                info!(%name, "factory replaced");
                *existing = registration;
            }
            None => {
                info!(%name, "factory registered");
                self.entries.push(registration);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Registration> {
        self.entries.iter().find(|r| r.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run the factory registered under `name`.
    pub fn create(
        &self,
        name: &str,
        pos: Position,
        habitat: &Habitat,
        rng: &mut dyn RandomSource,
    ) -> Result<SimObject> {
        let registration = self
            .get(name)
            .ok_or_else(|| SimError::UnknownFactory(name.to_string()))?;
        (registration.factory)(pos, habitat, rng)
    }
}
