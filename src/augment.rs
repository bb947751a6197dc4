//! Augmentation rounds.
//!
//! Each round applies the whole filter bank to the untouched source image and
//! shuffles the presentation order of the resulting variants. Labels always
//! stay paired with the image their filter produced, so the shuffle does not
//! change which entries end up in the archive.

use crate::filters::FilterBank;
use crate::models::Batch;
use image::RgbImage;
use rand::Rng;
use rand::seq::SliceRandom;

/// Lazy iterator over the batches of one source image
pub struct Rounds<'a, R: Rng> {
    bank: &'a FilterBank,
    source: &'a RgbImage,
    rounds: u32,
    next_round: u32,
    rng: R,
}

impl<'a, R: Rng> Rounds<'a, R> {
    pub fn new(bank: &'a FilterBank, source: &'a RgbImage, rounds: u32, rng: R) -> Self {
        Self {
            bank,
            source,
            rounds,
            next_round: 0,
            rng,
        }
    }
}

impl<R: Rng> Iterator for Rounds<'_, R> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.next_round >= self.rounds {
            return None;
        }
        let round = self.next_round;
        self.next_round += 1;

        let mut variants = self.bank.apply(self.source);
        variants.shuffle(&mut self.rng);
        Some(Batch { round, variants })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.rounds - self.next_round) as usize;
        (left, Some(left))
    }
}

impl<R: Rng> ExactSizeIterator for Rounds<'_, R> {}

/// Produce `rounds` batches for `source`
///
/// `rounds == 0` yields nothing.
pub fn generate_rounds<'a, R: Rng>(
    bank: &'a FilterBank,
    source: &'a RgbImage,
    rounds: u32,
    rng: R,
) -> Rounds<'a, R> {
    Rounds::new(bank, source, rounds, rng)
}
