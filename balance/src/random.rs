use rand::Rng;

/// Uniform integer source used for every draw.
pub trait RandomSource {
    /// A value in `[0, bound)`. `bound` is never 0.
    fn next_below(&self, bound: u64) -> u64;
}

/// Draws from the calling thread's generator, so concurrent callers never
/// share state.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_below(&self, bound: u64) -> u64 {
        rand::thread_rng().gen_range(0..bound)
    }
}

#[test]
fn thread_random_stays_in_bound() {
    let random = ThreadRandom;
    for bound in 1..64 {
        assert!(random.next_below(bound) < bound);
    }
}
