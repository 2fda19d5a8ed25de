#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Colour vending for robots and status indicators.
//!
//! [`ColorAllocator`] hands out perceptually distinct robot colours by
//! consuming colour families round-robin and, within a family, preferring the
//! least used shade. Ties are broken with the allocator's RNG so seeded
//! allocators replay identically.

use labpyrinthe_core::HexColor;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const GREENS: [u32; 9] = [
    0x3cb44b, 0x2e8b57, 0x6b8e23, 0x00a86b, 0x50c878, 0x228b22, 0x98fb98, 0xaaffc3, 0xbcf60c,
];
const PINKS: [u32; 8] = [
    0xf032e6, 0xff69b4, 0xfabebe, 0xe6beff, 0xc71585, 0xff1493, 0xdb7093, 0xffb6c1,
];
const BLUES: [u32; 9] = [
    0x4363d8, 0x0082c8, 0x46f0f0, 0x000080, 0x1e90ff, 0x4682b4, 0x87ceeb, 0x911eb4, 0x008080,
];
const YELLOWS: [u32; 8] = [
    0xffe119, 0xffd700, 0xfffac8, 0xf58231, 0xffa500, 0xdaa520, 0xf0e68c, 0x808000,
];
const REDS: [u32; 10] = [
    0xe6194b, 0x800000, 0xaa6e28, 0xb22222, 0xdc143c, 0xff6347, 0xcd5c5c, 0x8b0000, 0xffd8b1,
    0xa52a2a,
];

/// Group of related shades sharing a usage counter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorFamily {
    name: &'static str,
    use_count: u32,
    shades: Vec<(HexColor, u32)>,
}

impl ColorFamily {
    /// Creates a family from packed `0xRRGGBB` shades.
    #[must_use]
    pub fn new(name: &'static str, shades: &[u32]) -> Self {
        Self {
            name,
            use_count: 0,
            shades: shades
                .iter()
                .map(|&value| (HexColor::from_rgb_u32(value), 0))
                .collect(),
        }
    }

    /// Human readable family name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of colours handed out from this family.
    #[must_use]
    pub fn use_count(&self) -> u32 {
        self.use_count
    }

    /// Shades of the family with their individual hit counts.
    #[must_use]
    pub fn shades(&self) -> &[(HexColor, u32)] {
        &self.shades
    }
}

/// Default families: green, pink, blue, yellow and red.
#[must_use]
pub fn default_families() -> Vec<ColorFamily> {
    vec![
        ColorFamily::new("green", &GREENS),
        ColorFamily::new("pink", &PINKS),
        ColorFamily::new("blue", &BLUES),
        ColorFamily::new("yellow", &YELLOWS),
        ColorFamily::new("red", &REDS),
    ]
}

/// Round-robin robot colour allocator.
///
/// Not synchronised: share it across threads behind a `Mutex`.
#[derive(Debug)]
pub struct ColorAllocator<R = ChaCha8Rng> {
    families: Vec<ColorFamily>,
    rng: R,
}

impl ColorAllocator<ChaCha8Rng> {
    /// Creates an allocator over the default families with a seeded RNG.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::new(default_families(), ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> ColorAllocator<R> {
    /// Creates an allocator over the provided families.
    ///
    /// Families without shades are dropped.
    #[must_use]
    pub fn new(families: Vec<ColorFamily>, rng: R) -> Self {
        let families = families
            .into_iter()
            .filter(|family| !family.shades.is_empty())
            .collect();
        Self { families, rng }
    }

    /// Families with their current counters.
    #[must_use]
    pub fn families(&self) -> &[ColorFamily] {
        &self.families
    }

    /// Vends the next colour, or `None` when the allocator has no family.
    pub fn next_color(&mut self) -> Option<HexColor> {
        let min_family = self.families.iter().map(|family| family.use_count).min()?;
        let candidates: Vec<usize> = (0..self.families.len())
            .filter(|&index| self.families[index].use_count == min_family)
            .collect();
        let family_index = *candidates.choose(&mut self.rng)?;
        let family = &mut self.families[family_index];

        let min_hits = family.shades.iter().map(|(_, hits)| *hits).min()?;
        let shades: Vec<usize> = (0..family.shades.len())
            .filter(|&index| family.shades[index].1 == min_hits)
            .collect();
        let shade_index = *shades.choose(&mut self.rng)?;

        family.use_count += 1;
        let shade = &mut family.shades[shade_index];
        shade.1 += 1;
        tracing::trace!(family = family.name, color = %shade.0, "allocated robot colour");
        Some(shade.0)
    }

    /// Uniformly random colour, independent of the families.
    pub fn random_color(&mut self) -> HexColor {
        random_hex(&mut self.rng)
    }
}

/// Draws a uniformly random 24-bit colour.
pub fn random_hex<R: Rng>(rng: &mut R) -> HexColor {
    HexColor::from_rgb_u32(rng.gen_range(0..=0x00ff_ffff))
}

/// Health of the network link, shown as a coloured arrow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NetStatus {
    /// Link established and responsive.
    Connected,
    /// Request sent, waiting for an answer.
    Pending,
    /// Answers arrive late.
    Slow,
    /// Last request failed; retrying.
    Failed,
    /// No link.
    Disconnected,
}

/// Colour of the network arrow for a status. Total: never fails.
#[must_use]
pub const fn status_color(status: NetStatus) -> HexColor {
    match status {
        NetStatus::Connected => HexColor::from_rgb_u32(0x3cb44b),
        NetStatus::Pending => HexColor::from_rgb_u32(0xffe119),
        NetStatus::Slow => HexColor::from_rgb_u32(0xf58231),
        NetStatus::Failed => HexColor::from_rgb_u32(0xe6194b),
        NetStatus::Disconnected => HexColor::from_rgb_u32(0x808080),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_allocator_vends_nothing() {
        let mut allocator = ColorAllocator::new(Vec::new(), ChaCha8Rng::seed_from_u64(1));
        assert_eq!(allocator.next_color(), None);
    }

    #[test]
    fn families_without_shades_are_ignored() {
        let families = vec![ColorFamily::new("void", &[]), ColorFamily::new("one", &[0x102030])];
        let mut allocator = ColorAllocator::new(families, ChaCha8Rng::seed_from_u64(1));
        assert_eq!(allocator.families().len(), 1);
        assert_eq!(
            allocator.next_color(),
            Some(HexColor::from_rgb_u32(0x102030))
        );
    }

    #[test]
    fn default_families_hold_eight_to_ten_shades() {
        for family in default_families() {
            let count = family.shades().len();
            assert!((8..=10).contains(&count), "{} has {count}", family.name());
        }
    }
}
