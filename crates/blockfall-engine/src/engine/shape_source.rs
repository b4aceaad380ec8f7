use std::{fmt, str::FromStr};

use arrayvec::ArrayVec;
use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ShapeKind;

/// Supplies the kind of each newly spawned piece.
///
/// The session asks for one shape per spawn. Implementations must be
/// deterministic for a given seed so that games can be reproduced.
pub trait ShapeSource: fmt::Debug {
    fn next_shape(&mut self) -> ShapeKind;
}

/// How new shapes are chosen.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::FromStr,
)]
#[serde(rename_all = "kebab-case")]
pub enum Randomizer {
    /// Each shape independently and uniformly at random.
    #[default]
    Uniform,
    /// Shuffled bags of all seven shapes.
    Bag,
}

impl Randomizer {
    #[must_use]
    pub fn shape_source(self, seed: ShapeSeed) -> Box<dyn ShapeSource> {
        match self {
            Randomizer::Uniform => Box::new(UniformShapes::with_seed(seed)),
            Randomizer::Bag => Box::new(BagShapes::with_seed(seed)),
        }
    }
}

/// Seed for deterministic shape generation.
///
/// A 128-bit seed for the PCG generator. The same seed always yields the same
/// sequence of shapes, which makes games reproducible in tests and replays.
///
/// Serialized (and parsed) as 32 hexadecimal digits.
///
/// # Example
///
/// ```
/// use blockfall_engine::{ShapeSeed, ShapeSource as _, UniformShapes};
/// use rand::Rng as _;
///
/// let seed: ShapeSeed = rand::rng().random();
/// let mut a = UniformShapes::with_seed(seed);
/// let mut b = UniformShapes::with_seed(seed);
/// assert_eq!(a.next_shape(), b.next_shape());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeSeed([u8; 16]);

/// Error returned when parsing a [`ShapeSeed`] from text.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed {input:?}: expected 32 hexadecimal digits")]
pub struct ParseSeedError {
    input: String,
}

impl ShapeSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for ShapeSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for ShapeSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ParseSeedError {
            input: s.to_owned(),
        };
        if s.len() != 32 {
            return Err(error());
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| error())?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for ShapeSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ShapeSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `ShapeSeed` values with `rng.random()`.
impl Distribution<ShapeSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ShapeSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        ShapeSeed(seed)
    }
}

/// Picks every shape uniformly at random, independently of earlier picks.
///
/// Long droughts and floods of a single shape are possible; use [`BagShapes`]
/// for a fairer sequence.
#[derive(Debug, Clone)]
pub struct UniformShapes {
    rng: Pcg32,
}

impl UniformShapes {
    #[must_use]
    pub fn with_seed(seed: ShapeSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
        }
    }
}

impl ShapeSource for UniformShapes {
    fn next_shape(&mut self) -> ShapeKind {
        self.rng.random()
    }
}

/// 7-bag randomizer.
///
/// Deals all seven shapes in a shuffled order before shuffling a new bag, so
/// every shape appears exactly once in each group of seven.
#[derive(Debug, Clone)]
pub struct BagShapes {
    rng: Pcg32,
    bag: ArrayVec<ShapeKind, { ShapeKind::LEN }>,
}

impl BagShapes {
    #[must_use]
    pub fn with_seed(seed: ShapeSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            bag: ArrayVec::new(),
        }
    }

    fn fill_bag(&mut self) {
        let mut new_bag = ShapeKind::ALL;
        new_bag.shuffle(&mut self.rng);
        // dealt from the back
        self.bag.extend(new_bag);
    }
}

impl ShapeSource for BagShapes {
    fn next_shape(&mut self) -> ShapeKind {
        if self.bag.is_empty() {
            self.fill_bag();
        }
        self.bag.pop().expect("bag was just refilled")
    }
}

/// Deals a fixed sequence of shapes, cycling when it runs out.
///
/// Useful for scripted scenarios and replays.
#[derive(Debug, Clone)]
pub struct CycleShapes {
    shapes: Vec<ShapeKind>,
    next: usize,
}

impl CycleShapes {
    /// # Panics
    ///
    /// Panics if `shapes` is empty.
    #[must_use]
    pub fn new(shapes: impl IntoIterator<Item = ShapeKind>) -> Self {
        let shapes: Vec<_> = shapes.into_iter().collect();
        assert!(!shapes.is_empty(), "shape cycle must not be empty");
        Self { shapes, next: 0 }
    }
}

impl ShapeSource for CycleShapes {
    fn next_shape(&mut self) -> ShapeKind {
        let shape = self.shapes[self.next];
        self.next = (self.next + 1) % self.shapes.len();
        shape
    }
}
