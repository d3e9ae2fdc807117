use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

/// Generate a deterministic v4-format UUID from a seeded RNG.
pub fn generate_uuid(rng: &mut impl Rng) -> Uuid {
    let bytes: [u8; 16] = rng.gen();
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

/// Identity of one simulation run. Created once by the driver and passed to
/// whatever needs to tag its output; dropped with the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionContext {
    pub run_id: Uuid,
    pub seed: u64,
    segments: u32,
}

impl SessionContext {
    pub fn new(seed: u64, rng: &mut impl Rng) -> Self {
        Self {
            run_id: generate_uuid(rng),
            seed,
            segments: 0,
        }
    }

    /// Numbers the next segment, starting at 1.
    pub fn next_segment(&mut self) -> u32 {
        self.segments += 1;
        self.segments
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_same_seed_same_run_id() {
        let ctx1 = SessionContext::new(42, &mut ChaCha8Rng::seed_from_u64(42));
        let ctx2 = SessionContext::new(42, &mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(ctx1.run_id, ctx2.run_id);
        assert_eq!(ctx1.run_id.get_version(), Some(uuid::Version::Random));
    }

    #[test]
    fn test_different_seeds_differ() {
        let id1 = generate_uuid(&mut ChaCha8Rng::seed_from_u64(42));
        let id2 = generate_uuid(&mut ChaCha8Rng::seed_from_u64(99));
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_segments_numbered_from_one() {
        let mut ctx = SessionContext::new(1, &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(ctx.next_segment(), 1);
        assert_eq!(ctx.next_segment(), 2);
        assert_eq!(ctx.segments(), 2);
    }
}
