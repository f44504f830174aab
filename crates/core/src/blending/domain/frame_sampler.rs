/// Selects every `stride`-th source frame, starting at index 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSampler {
    stride: usize,
}

impl FrameSampler {
    /// `stride` must be at least 1; callers validate it.
    pub fn new(stride: usize) -> Self {
        debug_assert!(stride >= 1, "stride must be at least 1");
        Self {
            stride: stride.max(1),
        }
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn is_sampled(&self, source_index: usize) -> bool {
        source_index % self.stride == 0
    }

    /// Number of frames sampled from a source of `input_frames` frames.
    pub fn expected_output_count(&self, input_frames: usize) -> usize {
        input_frames.div_ceil(self.stride)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_samples_every_stride_th_frame() {
        let sampler = FrameSampler::new(5);
        let sampled: Vec<usize> = (0..12).filter(|&i| sampler.is_sampled(i)).collect();
        assert_eq!(sampled, vec![0, 5, 10]);
    }

    #[test]
    fn test_stride_one_samples_everything() {
        let sampler = FrameSampler::new(1);
        assert!((0..20).all(|i| sampler.is_sampled(i)));
    }

    #[rstest]
    #[case::empty(0, 5, 0)]
    #[case::exact_multiple(10, 5, 2)]
    #[case::remainder(11, 5, 3)]
    #[case::stride_larger_than_input(3, 100, 1)]
    #[case::stride_one(7, 1, 7)]
    fn test_expected_output_count(
        #[case] input: usize,
        #[case] stride: usize,
        #[case] expected: usize,
    ) {
        assert_eq!(FrameSampler::new(stride).expected_output_count(input), expected);
    }

    #[test]
    fn test_expected_count_matches_predicate() {
        for stride in 1..8 {
            let sampler = FrameSampler::new(stride);
            for input in 0..40 {
                let counted = (0..input).filter(|&i| sampler.is_sampled(i)).count();
                assert_eq!(counted, sampler.expected_output_count(input));
            }
        }
    }
}
