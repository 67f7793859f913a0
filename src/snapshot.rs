//! Snapshot types.
//!
//! The `Snapshot` struct provides a serializable view of the habitat that can
//! be sent to a front-end for visualization.

use crate::habitat::Habitat;
use serde::{Deserialize, Serialize};

/// Snapshot of a single object's state for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub id: u64,
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub health: f64,
    pub health_max: f64,
    pub width: f64,
    pub height: f64,
    pub speed: f64,
}

/// Complete habitat state snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current simulation tick.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub time: f64,
    pub width: f64,
    pub height: f64,
    /// Live objects in sweep order.
    pub objects: Vec<ObjectSnapshot>,
}

impl Snapshot {
    /// Create a snapshot of every live object.
    pub fn from_habitat(habitat: &Habitat, tick: u64, time: f64) -> Self {
        let objects = habitat
            .entities()
            .into_iter()
            .filter_map(|e| habitat.view(e))
            .map(|view| ObjectSnapshot {
                id: view.id.0,
                kind: view.kind.name().to_string(),
                x: view.position.x,
                y: view.position.y,
                angle: view.direction.to_angle(),
                health: view.health.current,
                health_max: view.health.max,
                width: view.body.width(),
                height: view.body.height(),
                speed: view.speed,
            })
            .collect();

        Self {
            tick,
            time,
            width: habitat.width(),
            height: habitat.height(),
            objects,
        }
    }

    /// Count objects of the named kind.
    pub fn count_of(&self, kind: &str) -> usize {
        self.objects.iter().filter(|o| o.kind == kind).count()
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
