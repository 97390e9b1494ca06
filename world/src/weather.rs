//! Rotating weather that scales elemental tower damage.

use crystal_defence_core::{Weather, WEATHER_PERIOD};
use rand::Rng;

#[derive(Clone, Debug)]
pub(crate) struct WeatherState {
    current: Weather,
    elapsed: f32,
    enabled: bool,
}

impl WeatherState {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            current: Weather::Clear,
            elapsed: 0.0,
            enabled,
        }
    }

    pub(crate) fn current(&self) -> Weather {
        self.current
    }

    /// Advances the weather clock, returning the new weather when it changes.
    pub(crate) fn advance<R: Rng>(&mut self, dt: f32, rng: &mut R) -> Option<Weather> {
        if !self.enabled {
            return None;
        }
        self.elapsed += dt;
        if self.elapsed < WEATHER_PERIOD {
            return None;
        }
        self.elapsed -= WEATHER_PERIOD;

        let next = Weather::ALL[rng.gen_range(0..Weather::ALL.len())];
        if next == self.current {
            return None;
        }
        self.current = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn disabled_weather_stays_clear() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut weather = WeatherState::new(false);
        for _ in 0..10 {
            assert_eq!(weather.advance(WEATHER_PERIOD, &mut rng), None);
        }
        assert_eq!(weather.current(), Weather::Clear);
    }

    #[test]
    fn weather_only_changes_on_period_boundaries() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut weather = WeatherState::new(true);
        assert_eq!(weather.advance(WEATHER_PERIOD - 1.0, &mut rng), None);

        let mut changed = false;
        for _ in 0..20 {
            if let Some(next) = weather.advance(WEATHER_PERIOD, &mut rng) {
                assert_eq!(next, weather.current());
                changed = true;
            }
        }
        assert!(changed);
    }
}
