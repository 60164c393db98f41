/// Which frames of a recording are extracted.
///
/// Every `stride`-th frame is selected starting at frame 0, and at most `cap`
/// selected frames are kept. The k-th selected frame is written at output
/// offset k, so output indices stay contiguous whatever the stride.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSampling {
    stride: usize,
    cap: Option<usize>,
}

impl FrameSampling {
    pub fn new(stride: usize, cap: Option<usize>) -> Result<Self, &'static str> {
        if stride < 1 {
            return Err("stride must be >= 1");
        }
        Ok(Self { stride, cap })
    }

    /// Every frame, no cap.
    pub fn all() -> Self {
        Self {
            stride: 1,
            cap: None,
        }
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn cap(&self) -> Option<usize> {
        self.cap
    }

    /// Number of frames selected from a recording of `frame_count` frames.
    pub fn selected_count(&self, frame_count: usize) -> usize {
        let strided = frame_count.div_ceil(self.stride);
        match self.cap {
            Some(cap) => strided.min(cap),
            None => strided,
        }
    }

    /// `(offset, source_index)` pairs for the selected frames, in order.
    pub fn select(&self, frame_count: usize) -> impl Iterator<Item = (usize, usize)> {
        let stride = self.stride;
        (0..self.selected_count(frame_count)).map(move |offset| (offset, offset * stride))
    }
}

impl Default for FrameSampling {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_zero_stride_rejected() {
        assert!(FrameSampling::new(0, None).is_err());
    }

    #[rstest]
    #[case::all(1, None, 7, 7)]
    #[case::capped(1, Some(3), 7, 3)]
    #[case::cap_above_count(1, Some(10), 7, 7)]
    #[case::stride_exact(5, None, 10, 2)]
    #[case::stride_remainder(5, None, 11, 3)]
    #[case::stride_and_cap(5, Some(2), 100, 2)]
    #[case::empty(3, None, 0, 0)]
    fn test_selected_count(
        #[case] stride: usize,
        #[case] cap: Option<usize>,
        #[case] frames: usize,
        #[case] expected: usize,
    ) {
        let sampling = FrameSampling::new(stride, cap).unwrap();
        assert_eq!(sampling.selected_count(frames), expected);
        assert_eq!(sampling.select(frames).count(), expected);
    }

    #[test]
    fn test_select_offsets_are_contiguous() {
        let sampling = FrameSampling::new(5, None).unwrap();
        let selected: Vec<_> = sampling.select(12).collect();
        assert_eq!(selected, vec![(0, 0), (1, 5), (2, 10)]);
    }
}
