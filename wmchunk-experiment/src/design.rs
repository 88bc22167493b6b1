//! Generation of target files: randomised encoding/retrieval pairs covering
//! every chunk size and recall direction.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;
use wmchunk_core::{DEFAULT_MASK, RecallDir, TrialSpec};

#[derive(Debug, Clone, PartialEq)]
pub struct TargetDesign {
    pub run_number: u32,
    pub repetitions: usize,
    pub seq_length: usize,
    pub chunk_sizes: Vec<usize>,
    pub recall_dirs: Vec<RecallDir>,
    /// Inclusive range the random digits are drawn from.
    pub digits: (u8, u8),
    pub item_dur: f64,
    /// Symbol retrieval rows are masked with; must match the mask the plan
    /// is loaded with for retrieval rows to pair with their encoding row.
    pub mask: char,
    pub seed: Option<u64>,
}

impl Default for TargetDesign {
    fn default() -> Self {
        Self {
            run_number: 1,
            repetitions: 5,
            seq_length: 6,
            chunk_sizes: vec![2, 3],
            recall_dirs: vec![RecallDir::Backward, RecallDir::Forward],
            digits: (1, 4),
            item_dur: 2.0,
            mask: DEFAULT_MASK,
            seed: None,
        }
    }
}

impl TargetDesign {
    pub fn for_run(run_number: u32) -> Self {
        Self {
            run_number,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_mask(mut self, mask: char) -> Self {
        self.mask = mask;
        self
    }

    /// Number of rows `generate` produces.
    pub fn row_count(&self) -> usize {
        2 * self.repetitions * self.chunk_sizes.len() * self.recall_dirs.len()
    }

    pub fn generate(&self) -> Vec<TrialSpec> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut trial_types: Vec<(usize, RecallDir)> = Vec::new();
        for _ in 0..self.repetitions {
            for &chunk in &self.chunk_sizes {
                for &dir in &self.recall_dirs {
                    trial_types.push((chunk, dir));
                }
            }
        }
        trial_types.shuffle(&mut rng);

        let masked = vec![self.mask.to_string(); self.seq_length].join(" ");
        let mut rows = Vec::with_capacity(self.row_count());
        for (chunk, dir) in trial_types {
            let seq = self.random_sequence(&mut rng);
            let mut encoding = TrialSpec::encoding(self.run_number, &seq, chunk, dir);
            encoding.item_dur = self.item_dur;
            encoding.trial_dur = Some(chunk as f64 * self.item_dur);
            debug!(chunk, ?dir, %seq, "generated trial pair");

            let retrieval = TrialSpec::retrieval_for(&encoding, &masked);
            rows.push(encoding);
            rows.push(retrieval);
        }
        rows
    }

    fn random_sequence<R: Rng>(&self, rng: &mut R) -> String {
        let (low, high) = self.digits;
        (0..self.seq_length)
            .map(|_| rng.random_range(low..=high).to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trial::TrialPlan;
    use wmchunk_core::PhaseType;

    #[test]
    fn default_design_produces_a_valid_plan() {
        let design = TargetDesign::for_run(2).with_seed(7);
        let rows = design.generate();
        assert_eq!(rows.len(), 40);
        assert_eq!(rows.len(), design.row_count());

        let plan = TrialPlan::new(rows.clone(), DEFAULT_MASK).unwrap();
        assert_eq!(plan.len(), 40);
        assert!(rows.iter().all(|r| r.run_number == 2));
    }

    #[test]
    fn rows_alternate_encoding_and_masked_retrieval() {
        let rows = TargetDesign::default().with_seed(1).generate();
        for pair in rows.chunks(2) {
            let (enc, ret) = (&pair[0], &pair[1]);
            assert_eq!(enc.phase_type, PhaseType::Encoding);
            assert_eq!(ret.phase_type, PhaseType::Retrieval);
            assert_eq!(ret.seq_str, "# # # # # #");
            assert_eq!(enc.chunk_size, ret.chunk_size);
            assert_eq!(enc.recall_dir, ret.recall_dir);
            assert_eq!(enc.trial_dur, Some(enc.chunk_size as f64 * 2.0));
            assert_eq!(ret.trial_dur, None);
            assert!(!enc.display_feedback && ret.display_feedback);
            assert!(
                enc.symbols()
                    .iter()
                    .all(|s| matches!(*s, "1" | "2" | "3" | "4"))
            );
        }
    }

    #[test]
    fn every_trial_type_appears_once_per_repetition() {
        let rows = TargetDesign::default().with_seed(3).generate();
        for chunk in [2, 3] {
            for dir in [RecallDir::Backward, RecallDir::Forward] {
                let n = rows
                    .iter()
                    .filter(|r| {
                        r.phase_type == PhaseType::Encoding
                            && r.chunk_size == chunk
                            && r.recall_dir == dir
                    })
                    .count();
                assert_eq!(n, 5);
            }
        }
    }

    #[test]
    fn custom_mask_pairs_under_the_same_mask() {
        let rows = TargetDesign::default().with_seed(5).with_mask('*').generate();
        assert_eq!(rows[1].seq_str, "* * * * * *");

        let plan = TrialPlan::new(rows.clone(), '*').unwrap();
        for pair in plan.trials().chunks(2) {
            assert_eq!(pair[1].expected, pair[0].expected);
        }

        // read under another mask the rows no longer count as masked
        let plan = TrialPlan::new(rows, DEFAULT_MASK).unwrap();
        assert_eq!(plan.trials()[1].expected, vec!["*"; 6]);
    }

    #[test]
    fn same_seed_same_design() {
        let a = TargetDesign::default().with_seed(42).generate();
        let b = TargetDesign::default().with_seed(42).generate();
        assert_eq!(a, b);
    }
}
