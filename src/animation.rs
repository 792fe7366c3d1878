//! Entry/exit transition names handed to the renderer on every refresh.

use rand::Rng;
use rand::seq::SliceRandom;

pub const ENTRY_ANIMATIONS: &[&str] = &[
    "bounce", "flash", "pulse", "rubberBand", "shakeX", "shakeY", "headShake", "swing", "tada",
    "wobble", "jello", "heartBeat", "backInDown", "backInLeft", "backInRight", "backInUp",
    "bounceIn", "bounceInDown", "bounceInLeft", "bounceInRight", "bounceInUp", "fadeIn",
    "fadeInDown", "fadeInDownBig", "fadeInLeft", "fadeInLeftBig", "fadeInRight",
    "fadeInRightBig", "fadeInUp", "fadeInUpBig", "fadeInTopLeft", "fadeInTopRight",
    "fadeInBottomLeft", "fadeInBottomRight", "flip", "flipInX", "flipInY", "lightSpeedInRight",
    "lightSpeedInLeft", "rotateIn", "rotateInDownLeft", "rotateInDownRight", "rotateInUpLeft",
    "rotateInUpRight", "jackInTheBox", "rollIn", "zoomIn", "zoomInDown", "zoomInLeft",
    "zoomInRight", "zoomInUp", "slideInDown", "slideInLeft", "slideInRight", "slideInUp",
];

pub const EXIT_ANIMATIONS: &[&str] = &[
    "backOutDown", "backOutLeft", "backOutRight", "backOutUp", "bounceOut", "bounceOutDown",
    "bounceOutLeft", "bounceOutRight", "bounceOutUp", "fadeOut", "fadeOutDown", "fadeOutDownBig",
    "fadeOutLeft", "fadeOutLeftBig", "fadeOutRight", "fadeOutRightBig", "fadeOutUp",
    "fadeOutUpBig", "fadeOutTopLeft", "fadeOutTopRight", "fadeOutBottomRight",
    "fadeOutBottomLeft", "flipOutX", "flipOutY", "lightSpeedOutRight", "lightSpeedOutLeft",
    "rotateOut", "rotateOutDownLeft", "rotateOutDownRight", "rotateOutUpLeft", "rotateOutUpRight",
    "hinge", "rollOut", "zoomOut", "zoomOutDown", "zoomOutLeft", "zoomOutRight", "zoomOutUp",
    "slideOutDown", "slideOutLeft", "slideOutRight", "slideOutUp",
];

/// Endless cursor over a fixed list of names.
#[derive(Debug, Clone)]
struct Cycle {
    names: Vec<&'static str>,
    cursor: usize,
}

impl Cycle {
    fn new(names: &[&'static str]) -> Self {
        Self {
            names: names.to_vec(),
            cursor: 0,
        }
    }

    fn next(&mut self) -> &'static str {
        let name = self.names[self.cursor];
        self.cursor = (self.cursor + 1) % self.names.len();
        name
    }
}

/// Two independent cycles, one for entry and one for exit transitions.
#[derive(Debug, Clone)]
pub struct AnimationCycler {
    entry: Cycle,
    exit: Cycle,
}

impl AnimationCycler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entry: Cycle::new(ENTRY_ANIMATIONS),
            exit: Cycle::new(EXIT_ANIMATIONS),
        }
    }

    /// Start from a shuffled order. Call once, at widget start.
    #[must_use]
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cycler = Self::new();
        cycler.entry.names.shuffle(rng);
        cycler.exit.names.shuffle(rng);
        cycler
    }

    pub fn next_entry(&mut self) -> &'static str {
        self.entry.next()
    }

    pub fn next_exit(&mut self) -> &'static str {
        self.exit.next()
    }

    /// Next `(entry, exit)` pair; both cursors advance.
    pub fn next_pair(&mut self) -> (&'static str, &'static str) {
        (self.next_entry(), self.next_exit())
    }
}

impl Default for AnimationCycler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn lists_have_expected_sizes() {
        assert_eq!(ENTRY_ANIMATIONS.len(), 55);
        assert_eq!(EXIT_ANIMATIONS.len(), 42);
    }

    #[test]
    fn entry_cycle_never_yields_past_the_end() {
        let mut cycler = AnimationCycler::new();
        let len = ENTRY_ANIMATIONS.len();
        for i in 0..(len * 2 + 3) {
            assert_eq!(cycler.next_entry(), ENTRY_ANIMATIONS[i % len]);
        }
    }

    #[test]
    fn cursors_are_independent() {
        let mut cycler = AnimationCycler::new();
        for _ in 0..5 {
            cycler.next_entry();
        }
        assert_eq!(cycler.next_exit(), EXIT_ANIMATIONS[0]);
        assert_eq!(cycler.next_entry(), ENTRY_ANIMATIONS[5]);
    }

    #[test]
    fn shuffled_lists_keep_every_name() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut cycler = AnimationCycler::shuffled(&mut rng);
        let entries: HashSet<&str> = (0..ENTRY_ANIMATIONS.len())
            .map(|_| cycler.next_entry())
            .collect();
        let exits: HashSet<&str> = (0..EXIT_ANIMATIONS.len())
            .map(|_| cycler.next_exit())
            .collect();
        assert_eq!(entries, ENTRY_ANIMATIONS.iter().copied().collect());
        assert_eq!(exits, EXIT_ANIMATIONS.iter().copied().collect());
    }
}
