//! Choice of which participant shoots first.

use serde::{Deserialize, Serialize};

/// One of the two participants of a battle, by position.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The participant given first when the battle was created (the challenger).
    First,
    /// The participant given second when the battle was created (the challenged).
    Second,
}

impl Side {
    /// Get the other side.
    pub fn opposite(self) -> Self {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    /// Index of this side in a two element array.
    pub(crate) fn index(self) -> usize {
        match self {
            Side::First => 0,
            Side::Second => 1,
        }
    }
}

/// Source of the initial shooter for new battles. Production code picks uniformly at
/// random; tests can fix the choice.
pub trait FirstShooter: Send + Sync {
    /// Pick which side opens the battle.
    fn pick(&self) -> Side;
}

impl<F: Fn() -> Side + Send + Sync> FirstShooter for F {
    fn pick(&self) -> Side {
        self()
    }
}

/// Always picks the same side.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Fixed(pub Side);

impl FirstShooter for Fixed {
    fn pick(&self) -> Side {
        self.0
    }
}

#[cfg(feature = "rng_gen")]
mod rng_gen {
    use rand::{
        distributions::{Distribution, Standard},
        Rng,
    };

    use super::{FirstShooter, Side};

    impl Distribution<Side> for Standard {
        fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Side {
            if rng.gen() {
                Side::First
            } else {
                Side::Second
            }
        }
    }

    /// Picks either side with equal probability using the thread-local rng.
    #[derive(Debug, Copy, Clone, Default)]
    pub struct RandomFirstShooter;

    impl FirstShooter for RandomFirstShooter {
        fn pick(&self) -> Side {
            rand::thread_rng().gen()
        }
    }

    #[cfg(test)]
    mod tests {
        use rand::{rngs::StdRng, SeedableRng};

        use super::*;

        #[test]
        fn both_sides_come_up() {
            let mut rng = StdRng::seed_from_u64(7);
            let picks: Vec<Side> = (0..64).map(|_| rng.gen()).collect();
            assert!(picks.contains(&Side::First));
            assert!(picks.contains(&Side::Second));
        }
    }
}

#[cfg(feature = "rng_gen")]
pub use self::rng_gen::RandomFirstShooter;

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[test]
    fn fixed_and_closures() {
        assert_eq!(Fixed(Side::Second).pick(), Side::Second);

        let flip = AtomicBool::new(false);
        let alternating = move || {
            if flip.fetch_xor(true, Ordering::SeqCst) {
                Side::Second
            } else {
                Side::First
            }
        };
        assert_eq!(alternating.pick(), Side::First);
        assert_eq!(alternating.pick(), Side::Second);
        assert_eq!(Side::First.opposite(), Side::Second);
    }
}
