//! Field-wide modifiers: elemental synergies and weather.

use serde::{Deserialize, Serialize};

use crate::element::Element;

/// Maximum distance between two towers for their synergy to activate.
pub const SYNERGY_PAIR_RADIUS: f32 = 200.0;

/// Seconds between weather changes.
pub const WEATHER_PERIOD: f32 = 60.0;

/// Named field produced by a pair of towers with complementary elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SynergyKind {
    /// Fire and Air: periodic lightning strikes.
    LightningStorm,
    /// Water and Earth: heavy slow zone.
    MudTrap,
    /// Light and Darkness: damage amplification zone.
    TwilightField,
    /// Fire and Water: steam that lets enemies evade hits.
    SteamCloud,
    /// Life and Earth: slowly restores lives.
    NaturesBlessing,
}

impl SynergyKind {
    /// Synergy registered for an unordered pair of elements.
    #[must_use]
    pub const fn for_pair(first: Element, second: Element) -> Option<SynergyKind> {
        use Element::{Air, Darkness, Earth, Fire, Life, Light, Water};
        match (first, second) {
            (Fire, Air) | (Air, Fire) => Some(Self::LightningStorm),
            (Water, Earth) | (Earth, Water) => Some(Self::MudTrap),
            (Light, Darkness) | (Darkness, Light) => Some(Self::TwilightField),
            (Fire, Water) | (Water, Fire) => Some(Self::SteamCloud),
            (Life, Earth) | (Earth, Life) => Some(Self::NaturesBlessing),
            _ => None,
        }
    }

    /// Radius of the field around the midpoint of the pair.
    #[must_use]
    pub const fn radius(self) -> f32 {
        match self {
            Self::LightningStorm => 180.0,
            Self::MudTrap => 150.0,
            Self::TwilightField => 160.0,
            Self::SteamCloud => 170.0,
            Self::NaturesBlessing => 200.0,
        }
    }

    /// Display name of the field.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LightningStorm => "Lightning Storm",
            Self::MudTrap => "Mud Trap",
            Self::TwilightField => "Twilight Field",
            Self::SteamCloud => "Steam Cloud",
            Self::NaturesBlessing => "Nature's Blessing",
        }
    }
}

/// Global weather affecting elemental tower damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weather {
    /// No modifiers.
    Clear,
    /// Favours water over fire.
    Rain,
    /// Favours fire and light over darkness.
    Sunny,
    /// Favours air over earth.
    Windy,
    /// Favours darkness over light.
    Night,
    /// Favours air and water over fire.
    Storm,
}

impl Weather {
    /// Every weather kind in declaration order.
    pub const ALL: [Weather; 6] = [
        Self::Clear,
        Self::Rain,
        Self::Sunny,
        Self::Windy,
        Self::Night,
        Self::Storm,
    ];

    /// Damage multiplier for towers of the provided element.
    #[must_use]
    pub const fn damage_multiplier(self, element: Element) -> f32 {
        match (self, element) {
            (Self::Rain, Element::Water) => 1.25,
            (Self::Rain, Element::Fire) => 0.75,
            (Self::Sunny, Element::Fire) => 1.2,
            (Self::Sunny, Element::Light) => 1.25,
            (Self::Sunny, Element::Darkness) => 0.8,
            (Self::Windy, Element::Air) => 1.3,
            (Self::Windy, Element::Earth) => 0.9,
            (Self::Night, Element::Darkness) => 1.3,
            (Self::Night, Element::Light) => 0.8,
            (Self::Storm, Element::Air) => 1.2,
            (Self::Storm, Element::Water) => 1.15,
            (Self::Storm, Element::Fire) => 0.8,
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synergy_pairs_are_unordered() {
        assert_eq!(
            SynergyKind::for_pair(Element::Air, Element::Fire),
            SynergyKind::for_pair(Element::Fire, Element::Air)
        );
        assert_eq!(SynergyKind::for_pair(Element::Fire, Element::Fire), None);
    }

    #[test]
    fn clear_weather_is_neutral() {
        for element in Element::ALL {
            assert!((Weather::Clear.damage_multiplier(element) - 1.0).abs() < f32::EPSILON);
        }
    }
}
