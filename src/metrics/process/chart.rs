use super::CircularBuffer;

pub const SYSTEM_CHART_CAPACITY: usize = 40;
pub const PROCESS_CHART_CAPACITY: usize = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeriesPoint {
    pub timestamp_label: String,
    pub value: f32,
}

#[derive(Debug, Clone)]
struct ChartFrame<const N: usize> {
    label: String,
    values: [f32; N],
}

/// `N` parallel series sharing one time axis.
///
/// All series live in a single ring of frames, so they are always the same
/// length and index-aligned by time.
#[derive(Debug, Clone)]
pub struct ChartBuffer<const N: usize> {
    frames: CircularBuffer<ChartFrame<N>>,
}

impl<const N: usize> ChartBuffer<N> {
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: CircularBuffer::new(capacity),
        }
    }

    pub fn push(&mut self, timestamp_label: impl Into<String>, values: [f32; N]) {
        self.frames.push(ChartFrame {
            label: timestamp_label.into(),
            values,
        });
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.frames.capacity()
    }

    /// Points of one series, oldest first.
    pub fn series(&self, index: usize) -> Vec<ChartSeriesPoint> {
        if index >= N {
            return Vec::new();
        }
        self.frames
            .iter()
            .map(|frame| ChartSeriesPoint {
                timestamp_label: frame.label.clone(),
                value: frame.values[index],
            })
            .collect()
    }

    pub fn snapshot(&self) -> [Vec<ChartSeriesPoint>; N] {
        std::array::from_fn(|i| self.series(i))
    }

    pub fn latest(&self) -> Option<[f32; N]> {
        self.frames.last().map(|frame| frame.values)
    }
}
