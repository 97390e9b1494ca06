//! Persistence contract: progress and tower layout encoded as a single line.
//!
//! The text form is `crystal:v1:<payload>` where the payload is JSON encoded
//! with unpadded standard base64.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use crystal_defence_core::{Element, EvolutionForm, UpgradeLevels};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "crystal";
const SNAPSHOT_VERSION: &str = "v1";
const FIELD_DELIMITER: char = ':';

/// Presentation camera persisted alongside the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    /// Horizontal pan offset.
    pub x: f32,
    /// Vertical pan offset.
    pub y: f32,
    /// Zoom factor.
    pub zoom: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// Tower description captured within a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedTower {
    /// Element of the tower.
    pub element: Element,
    /// Position in world units.
    pub position: Vec2,
    /// Purchased upgrade levels.
    pub upgrades: UpgradeLevels,
    /// Kills credited to the tower.
    pub kills: u32,
    /// Evolved form, if any.
    pub evolution: Option<EvolutionForm>,
}

/// Everything needed to rebuild a simulation between waves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    /// Most recently started wave.
    pub wave: u32,
    /// Remaining lives.
    pub lives: u32,
    /// Money held by the player.
    pub money: u32,
    /// Accumulated score.
    pub score: u32,
    /// Seed the path is regenerated from.
    pub path_seed: u64,
    /// Placed towers in identifier order.
    pub towers: Vec<SavedTower>,
    /// Presentation camera.
    #[serde(default)]
    pub camera: CameraState,
}

impl SimulationSnapshot {
    /// Encodes the snapshot into a single-line string.
    pub fn encode(&self) -> Result<String, SnapshotError> {
        let json = serde_json::to_vec(self).map_err(SnapshotError::Serialize)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{SNAPSHOT_DOMAIN}{FIELD_DELIMITER}{SNAPSHOT_VERSION}{FIELD_DELIMITER}{encoded}"
        ))
    }

    /// Decodes a snapshot from its single-line representation.
    pub fn decode(value: &str) -> Result<Self, SnapshotError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SnapshotError::EmptyPayload);
        }

        let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
        let domain = parts.next().unwrap_or_default();
        if domain != SNAPSHOT_DOMAIN {
            return Err(SnapshotError::InvalidPrefix(domain.to_owned()));
        }
        let version = parts.next().ok_or(SnapshotError::MissingVersion)?;
        if version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(version.to_owned()));
        }
        let payload = parts.next().ok_or(SnapshotError::MissingPayload)?;

        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(SnapshotError::InvalidEncoding)?;
        serde_json::from_slice(&bytes).map_err(SnapshotError::InvalidPayload)
    }

    /// Checks the snapshot against a field of the provided size.
    pub fn validate(&self, width: f32, height: f32) -> Result<(), SnapshotError> {
        for (index, tower) in self.towers.iter().enumerate() {
            let position = tower.position;
            if !position.is_finite()
                || position.x < 0.0
                || position.y < 0.0
                || position.x > width
                || position.y > height
            {
                return Err(SnapshotError::TowerOutOfBounds { index });
            }
            if !tower.upgrades.is_valid() {
                return Err(SnapshotError::InvalidUpgrades { index });
            }
            if let Some(form) = tower.evolution {
                if form.element() != tower.element {
                    return Err(SnapshotError::EvolutionMismatch {
                        index,
                        element: tower.element,
                        form,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Failures raised while encoding, decoding, or validating snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot could not be serialised.
    #[error("could not serialise snapshot")]
    Serialize(#[source] serde_json::Error),
    /// The provided string was empty or contained only whitespace.
    #[error("snapshot string was empty")]
    EmptyPayload,
    /// The string did not start with the snapshot prefix.
    #[error("snapshot prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The string had no version segment.
    #[error("snapshot string is missing the version")]
    MissingVersion,
    /// The version segment named an unknown format.
    #[error("snapshot version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The string had no payload segment.
    #[error("snapshot string is missing the payload")]
    MissingPayload,
    /// The payload was not valid base64.
    #[error("could not decode snapshot payload")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload was not a valid snapshot document.
    #[error("could not parse snapshot payload")]
    InvalidPayload(#[source] serde_json::Error),
    /// A tower lies outside the field.
    #[error("tower {index} lies outside the field")]
    TowerOutOfBounds {
        /// Position of the tower in the snapshot list.
        index: usize,
    },
    /// A tower carries upgrade levels beyond the maximum.
    #[error("tower {index} has invalid upgrade levels")]
    InvalidUpgrades {
        /// Position of the tower in the snapshot list.
        index: usize,
    },
    /// A tower's evolution belongs to a different element.
    #[error("tower {index} is {element:?} but evolved into {form:?}")]
    EvolutionMismatch {
        /// Position of the tower in the snapshot list.
        index: usize,
        /// Element of the tower.
        element: Element,
        /// Recorded evolution.
        form: EvolutionForm,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> SimulationSnapshot {
        SimulationSnapshot {
            wave: 3,
            lives: 8,
            money: 245,
            score: 120,
            path_seed: 17,
            towers: vec![SavedTower {
                element: Element::Water,
                position: Vec2::new(120.0, 80.0),
                upgrades: UpgradeLevels {
                    damage: 1,
                    range: 2,
                    speed: 0,
                    special: 0,
                },
                kills: 4,
                evolution: None,
            }],
            camera: CameraState::default(),
        }
    }

    #[test]
    fn encoded_snapshots_carry_the_prefix_and_decode() {
        let encoded = snapshot().encode().expect("snapshot encodes");
        assert!(encoded.starts_with("crystal:v1:"));
        assert!(!encoded.ends_with('='));
        assert_eq!(SimulationSnapshot::decode(&encoded).expect("decodes"), snapshot());
    }

    #[test]
    fn malformed_strings_report_the_failing_segment() {
        assert!(matches!(
            SimulationSnapshot::decode("  "),
            Err(SnapshotError::EmptyPayload)
        ));
        assert!(matches!(
            SimulationSnapshot::decode("tower:v1:abc"),
            Err(SnapshotError::InvalidPrefix(prefix)) if prefix == "tower"
        ));
        assert!(matches!(
            SimulationSnapshot::decode("crystal:v2:abc"),
            Err(SnapshotError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            SimulationSnapshot::decode("crystal:v1"),
            Err(SnapshotError::MissingPayload)
        ));
        assert!(matches!(
            SimulationSnapshot::decode("crystal:v1:!!!"),
            Err(SnapshotError::InvalidEncoding(_))
        ));
        let not_json = STANDARD_NO_PAD.encode("{\"wave\":");
        assert!(matches!(
            SimulationSnapshot::decode(&format!("crystal:v1:{not_json}")),
            Err(SnapshotError::InvalidPayload(_))
        ));
    }

    #[test]
    fn validation_rejects_inconsistent_towers() {
        let mut outside = snapshot();
        outside.towers[0].position = Vec2::new(900.0, 10.0);
        assert!(matches!(
            outside.validate(800.0, 600.0),
            Err(SnapshotError::TowerOutOfBounds { index: 0 })
        ));

        let mut overbought = snapshot();
        overbought.towers[0].upgrades.speed = 4;
        assert!(matches!(
            overbought.validate(800.0, 600.0),
            Err(SnapshotError::InvalidUpgrades { index: 0 })
        ));

        let mut mismatched = snapshot();
        mismatched.towers[0].evolution = Some(EvolutionForm::options(Element::Fire)[0]);
        assert!(matches!(
            mismatched.validate(800.0, 600.0),
            Err(SnapshotError::EvolutionMismatch { index: 0, .. })
        ));

        assert!(snapshot().validate(800.0, 600.0).is_ok());
    }
}
