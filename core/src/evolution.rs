//! Permanent tier-two tower forms.

use serde::{Deserialize, Serialize};

use crate::element::Element;

/// Kills a tower must score before it may evolve.
pub const EVOLUTION_KILL_THRESHOLD: u32 = 20;

/// Tower level required before it may evolve.
pub const EVOLUTION_LEVEL_THRESHOLD: u32 = 2;

/// Evolved form selected for a tower. Three forms exist per element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EvolutionForm {
    /// Fire: periodic eruption around the tower.
    Volcano,
    /// Fire: splash damage on impact.
    Meteor,
    /// Fire: several simultaneous burning shots.
    Phoenix,
    /// Water: chance to freeze on impact.
    Glacier,
    /// Water: pushes enemies near the impact backwards.
    Tsunami,
    /// Water: permanent pulling field around the tower.
    Whirlpool,
    /// Air: spinning field around the impact.
    Tornado,
    /// Air: guaranteed long chains.
    Lightning,
    /// Air: fires faster while locked onto a target.
    Cyclone,
    /// Earth: knocks the target back.
    Mountain,
    /// Earth: shards burst toward nearby enemies.
    Crystal,
    /// Earth: a golem periodically strikes the lead enemy.
    Golem,
    /// Darkness: black hole at the impact point.
    Void,
    /// Darkness: curses the target.
    Shadow,
    /// Darkness: executes badly wounded enemies.
    Reaper,
    /// Light: heavy bonus against revealed targets.
    Solar,
    /// Light: periodic damaging pulse.
    Radiance,
    /// Light: random elemental effects.
    Prismatic,
    /// Life: poisons the target and its neighbours.
    Nature,
    /// Life: wards against escapes and restores lives.
    Angel,
    /// Life: withers the target's maximum health.
    Druid,
}

impl EvolutionForm {
    /// The three forms available to an element, indexed by option.
    #[must_use]
    pub const fn options(element: Element) -> [EvolutionForm; 3] {
        match element {
            Element::Fire => [Self::Volcano, Self::Meteor, Self::Phoenix],
            Element::Water => [Self::Glacier, Self::Tsunami, Self::Whirlpool],
            Element::Air => [Self::Tornado, Self::Lightning, Self::Cyclone],
            Element::Earth => [Self::Mountain, Self::Crystal, Self::Golem],
            Element::Darkness => [Self::Void, Self::Shadow, Self::Reaper],
            Element::Light => [Self::Solar, Self::Radiance, Self::Prismatic],
            Element::Life => [Self::Nature, Self::Angel, Self::Druid],
        }
    }

    /// Looks up the form at `index` for the element.
    #[must_use]
    pub fn option(element: Element, index: usize) -> Option<EvolutionForm> {
        Self::options(element).get(index).copied()
    }

    /// Element the form evolves from.
    #[must_use]
    pub const fn element(self) -> Element {
        match self {
            Self::Volcano | Self::Meteor | Self::Phoenix => Element::Fire,
            Self::Glacier | Self::Tsunami | Self::Whirlpool => Element::Water,
            Self::Tornado | Self::Lightning | Self::Cyclone => Element::Air,
            Self::Mountain | Self::Crystal | Self::Golem => Element::Earth,
            Self::Void | Self::Shadow | Self::Reaper => Element::Darkness,
            Self::Solar | Self::Radiance | Self::Prismatic => Element::Light,
            Self::Nature | Self::Angel | Self::Druid => Element::Life,
        }
    }

    /// Display name of the form.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Volcano => "Volcano",
            Self::Meteor => "Meteor",
            Self::Phoenix => "Phoenix",
            Self::Glacier => "Glacier",
            Self::Tsunami => "Tsunami",
            Self::Whirlpool => "Whirlpool",
            Self::Tornado => "Tornado",
            Self::Lightning => "Lightning",
            Self::Cyclone => "Cyclone",
            Self::Mountain => "Mountain",
            Self::Crystal => "Crystal",
            Self::Golem => "Golem",
            Self::Void => "Void",
            Self::Shadow => "Shadow",
            Self::Reaper => "Reaper",
            Self::Solar => "Solar",
            Self::Radiance => "Radiance",
            Self::Prismatic => "Prismatic",
            Self::Nature => "Nature",
            Self::Angel => "Angel",
            Self::Druid => "Druid",
        }
    }

    /// Stat multipliers that replace the pre-evolution identity multipliers.
    #[must_use]
    pub const fn multipliers(self) -> EvolutionMultipliers {
        let (damage, cooldown, range) = match self {
            Self::Volcano => (1.3, 1.1, 1.0),
            Self::Meteor => (1.5, 1.3, 1.1),
            Self::Phoenix => (1.2, 0.9, 1.0),
            Self::Glacier => (1.1, 1.0, 1.1),
            Self::Tsunami => (1.3, 1.1, 1.0),
            Self::Whirlpool => (1.0, 0.9, 1.2),
            Self::Tornado => (1.2, 0.9, 1.0),
            Self::Lightning => (1.4, 1.0, 1.1),
            Self::Cyclone => (1.1, 0.8, 1.1),
            Self::Mountain => (1.5, 1.2, 1.0),
            Self::Crystal => (1.2, 1.0, 1.1),
            Self::Golem => (1.3, 1.1, 1.0),
            Self::Void => (1.3, 1.1, 1.0),
            Self::Shadow => (1.2, 1.0, 1.1),
            Self::Reaper => (1.5, 1.2, 1.0),
            Self::Solar => (1.4, 1.0, 1.0),
            Self::Radiance => (1.1, 0.9, 1.2),
            Self::Prismatic => (1.2, 0.9, 1.1),
            Self::Nature => (1.1, 1.0, 1.1),
            Self::Angel => (1.0, 1.0, 1.2),
            Self::Druid => (1.2, 1.0, 1.0),
        };
        EvolutionMultipliers {
            damage,
            cooldown,
            range,
        }
    }

    /// Ability granted by the form.
    #[must_use]
    pub const fn ability(self) -> EvolvedAbility {
        match self {
            Self::Volcano => EvolvedAbility::Eruption {
                radius: 120.0,
                damage: 30.0,
                interval: 5.0,
            },
            Self::Meteor => EvolvedAbility::Impact {
                radius: 80.0,
                damage: 15.0,
            },
            Self::Phoenix => EvolvedAbility::Multishot {
                shots: 3,
                burn_damage_per_second: 8.0,
                burn_duration: 3.0,
            },
            Self::Glacier => EvolvedAbility::Freeze {
                chance: 0.25,
                duration: 2.0,
            },
            Self::Tsunami => EvolvedAbility::Push {
                distance: 100.0,
                radius: 60.0,
            },
            Self::Whirlpool => EvolvedAbility::Whirlpool {
                radius: 150.0,
                strength: 50.0,
            },
            Self::Tornado => EvolvedAbility::Spin {
                duration: 2.0,
                radius: 100.0,
            },
            Self::Lightning => EvolvedAbility::SuperChain {
                targets: 5,
                falloff: 0.8,
            },
            Self::Cyclone => EvolvedAbility::Accelerate {
                max: 0.3,
                rate: 0.05,
            },
            Self::Mountain => EvolvedAbility::Knockback { distance: 80.0 },
            Self::Crystal => EvolvedAbility::Shatter {
                shards: 4,
                damage: 10.0,
                range: 100.0,
            },
            Self::Golem => EvolvedAbility::Summon {
                interval: 8.0,
                damage: 40.0,
                stun: 1.5,
            },
            Self::Void => EvolvedAbility::BlackHole {
                radius: 80.0,
                damage_per_second: 5.0,
                duration: 4.0,
            },
            Self::Shadow => EvolvedAbility::Curse {
                multiplier: 1.5,
                duration: 5.0,
            },
            Self::Reaper => EvolvedAbility::Execute { threshold: 0.2 },
            Self::Solar => EvolvedAbility::Sunfire { factor: 2.0 },
            Self::Radiance => EvolvedAbility::Pulse {
                damage: 15.0,
                interval: 2.0,
            },
            Self::Prismatic => EvolvedAbility::Prismatic { chance: 0.2 },
            Self::Nature => EvolvedAbility::Plant {
                targets: 3,
                damage_per_second: 8.0,
                duration: 10.0,
            },
            Self::Angel => EvolvedAbility::Sanctuary {
                ward: 10,
                ward_interval: 15.0,
                heal_interval: 5.0,
            },
            Self::Druid => EvolvedAbility::Transform {
                chance: 0.2,
                health_factor: 0.5,
            },
        }
    }
}

/// Damage, cooldown, and range multipliers of an evolved form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvolutionMultipliers {
    /// Damage multiplier.
    pub damage: f32,
    /// Cooldown multiplier.
    pub cooldown: f32,
    /// Range multiplier.
    pub range: f32,
}

impl EvolutionMultipliers {
    /// Multipliers of a tower that has not evolved.
    pub const IDENTITY: Self = Self {
        damage: 1.0,
        cooldown: 1.0,
        range: 1.0,
    };
}

/// Ability granted by an evolved form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EvolvedAbility {
    /// Periodic damage around the tower.
    Eruption {
        /// Radius of the eruption.
        radius: f32,
        /// Damage dealt to each enemy inside.
        damage: f32,
        /// Seconds between eruptions.
        interval: f32,
    },
    /// Splash damage around each impact.
    Impact {
        /// Splash radius.
        radius: f32,
        /// Damage dealt to other enemies inside.
        damage: f32,
    },
    /// Several projectiles per volley, each applying a burn.
    Multishot {
        /// Number of distinct targets per volley.
        shots: u32,
        /// Burn damage per second.
        burn_damage_per_second: f32,
        /// Burn duration in seconds.
        burn_duration: f32,
    },
    /// Chance to freeze the target.
    Freeze {
        /// Probability of freezing.
        chance: f32,
        /// Freeze duration in seconds.
        duration: f32,
    },
    /// Knocks back every enemy near the impact.
    Push {
        /// Knockback distance.
        distance: f32,
        /// Radius around the impact.
        radius: f32,
    },
    /// Permanent vortex centred on the tower.
    Whirlpool {
        /// Radius of the field.
        radius: f32,
        /// Pull strength.
        strength: f32,
    },
    /// Spinning field around the impact.
    Spin {
        /// Seconds the spin lasts.
        duration: f32,
        /// Radius around the impact.
        radius: f32,
    },
    /// Guaranteed chain on every impact.
    SuperChain {
        /// Maximum chain targets.
        targets: u32,
        /// Damage factor per hop.
        falloff: f32,
    },
    /// Cooldown shrinks while the tower keeps firing at one target.
    Accelerate {
        /// Largest fraction of cooldown that may be shaved off.
        max: f32,
        /// Fraction gained per consecutive shot.
        rate: f32,
    },
    /// Knocks the target back.
    Knockback {
        /// Knockback distance.
        distance: f32,
    },
    /// Shards split off toward nearby enemies.
    Shatter {
        /// Number of shards.
        shards: u32,
        /// Damage per shard.
        damage: f32,
        /// Search radius for shard targets.
        range: f32,
    },
    /// Periodic strike on the lead enemy in range.
    Summon {
        /// Seconds between strikes.
        interval: f32,
        /// Damage per strike.
        damage: f32,
        /// Stun applied by the strike in seconds.
        stun: f32,
    },
    /// Damaging pull field at the impact point.
    BlackHole {
        /// Radius of the field.
        radius: f32,
        /// Damage per second inside.
        damage_per_second: f32,
        /// Seconds the field lasts.
        duration: f32,
    },
    /// Curses the target.
    Curse {
        /// Damage-taken multiplier.
        multiplier: f32,
        /// Curse duration in seconds.
        duration: f32,
    },
    /// Kills targets left below a health fraction.
    Execute {
        /// Health fraction below which the target dies.
        threshold: f32,
    },
    /// Bonus damage against revealed targets.
    Sunfire {
        /// Damage factor against revealed targets.
        factor: f32,
    },
    /// Periodic damaging pulse that also reveals.
    Pulse {
        /// Damage dealt to each enemy in range.
        damage: f32,
        /// Seconds between pulses.
        interval: f32,
    },
    /// Random elemental effect on impact.
    Prismatic {
        /// Probability of a bonus effect.
        chance: f32,
    },
    /// Poisons the target and its neighbours.
    Plant {
        /// Enemies poisoned per impact, including the target.
        targets: u32,
        /// Poison damage per second.
        damage_per_second: f32,
        /// Poison duration in seconds.
        duration: f32,
    },
    /// Wards against escapes and restores lives.
    Sanctuary {
        /// Ward charges granted per refresh.
        ward: u32,
        /// Seconds between ward refreshes.
        ward_interval: f32,
        /// Seconds between single-life restorations.
        heal_interval: f32,
    },
    /// Chance to shrink the target's maximum health.
    Transform {
        /// Probability of transforming.
        chance: f32,
        /// Factor applied to maximum health.
        health_factor: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_form_belongs_to_the_element_that_lists_it() {
        for element in Element::ALL {
            for form in EvolutionForm::options(element) {
                assert_eq!(form.element(), element);
            }
        }
    }

    #[test]
    fn out_of_range_option_is_rejected() {
        assert_eq!(EvolutionForm::option(Element::Fire, 3), None);
        assert_eq!(
            EvolutionForm::option(Element::Darkness, 2),
            Some(EvolutionForm::Reaper)
        );
    }
}
