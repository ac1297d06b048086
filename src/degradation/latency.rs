//! Sensing latency simulated with fixed-length FIFO buffers
//! Location: src/degradation/latency.rs

use crate::config::constants::degradation;
use crate::signal::Sample;
use std::collections::{HashMap, VecDeque};

/// Number of buffered samples for a latency at the given stream rate.
///
/// Truncates toward zero, never less than one sample.
pub fn buffer_len_for(latency_seconds: f64, sample_rate_hz: f64) -> usize {
    let len = (latency_seconds * sample_rate_hz).floor();
    if len.is_nan() || len < degradation::MIN_LATENCY_BUFFER_LEN as f64 {
        degradation::MIN_LATENCY_BUFFER_LEN
    } else {
        len as usize
    }
}

/// Bounded FIFO whose length is fixed at creation.
///
/// Every push returns the oldest element still held, so once the buffer is
/// full the output lags the input by `capacity - 1` pushes. Before that the
/// first pushed sample is returned.
#[derive(Debug, Clone)]
pub struct LatencyBuffer {
    queue: VecDeque<Sample>,
    capacity: usize,
}

impl LatencyBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            capacity: capacity.max(degradation::MIN_LATENCY_BUFFER_LEN),
        }
    }

    /// Append `sample`, evicting the oldest entry when full, and return the front
    pub fn push(&mut self, sample: Sample) -> Sample {
        if self.is_full() {
            self.queue.pop_front();
        }
        self.queue.push_back(sample);

        *self.queue.front().unwrap_or(&sample)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.queue.len() == self.capacity
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Latency buffers keyed by the exact latency value that created them.
///
/// A buffer is created on first use of a latency and keeps its length for the
/// lifetime of the bank, even if the sample rate used to size it is later
/// changed.
#[derive(Debug, Clone)]
pub struct LatencyBank {
    buffers: HashMap<u64, LatencyBuffer>,
    sample_rate_hz: f64,
}

impl LatencyBank {
    pub fn new(sample_rate_hz: f64) -> Self {
        Self {
            buffers: HashMap::new(),
            sample_rate_hz,
        }
    }

    /// Delay `sample` through the buffer for `latency_seconds`.
    ///
    /// Non-positive latency is the identity and touches no buffer.
    pub fn delay(&mut self, sample: Sample, latency_seconds: f64) -> Sample {
        if latency_seconds <= 0.0 {
            return sample;
        }

        let sample_rate_hz = self.sample_rate_hz;
        self.buffers
            .entry(latency_seconds.to_bits())
            .or_insert_with(|| {
                let len = buffer_len_for(latency_seconds, sample_rate_hz);
                tracing::debug!(latency_seconds, len, "Created latency buffer");
                LatencyBuffer::new(len)
            })
            .push(sample)
    }

    pub fn buffer(&self, latency_seconds: f64) -> Option<&LatencyBuffer> {
        self.buffers.get(&latency_seconds.to_bits())
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }

    /// Change the rate used to size buffers created from now on
    pub fn set_sample_rate_hz(&mut self, sample_rate_hz: f64) {
        self.sample_rate_hz = sample_rate_hz;
    }

    /// Drop every buffer
    pub fn reset(&mut self) {
        self.buffers.clear();
    }
}

impl Default for LatencyBank {
    fn default() -> Self {
        Self::new(degradation::DEFAULT_SAMPLE_RATE_HZ)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(i: usize) -> Sample {
        Sample::new(i as f64, 0.0, 0.0)
    }

    #[test]
    fn test_buffer_len_for() {
        assert_eq!(buffer_len_for(0.05, 20.0), 1);
        assert_eq!(buffer_len_for(0.6, 20.0), 12);
        assert_eq!(buffer_len_for(1.0, 20.0), 20);
        assert_eq!(buffer_len_for(0.01, 20.0), 1);
        assert_eq!(buffer_len_for(0.6, 10.0), 6);
        assert_eq!(buffer_len_for(f64::NAN, 20.0), 1);
    }

    #[test]
    fn test_buffer_fifo_delay() {
        let mut buffer = LatencyBuffer::new(3);
        let outputs: Vec<f64> = (0..6).map(|i| buffer.push(sample(i)).hr).collect();

        // Front stays on the first sample until the buffer fills
        assert_eq!(outputs, vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0]);
        assert!(buffer.is_full());
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_capacity_one_is_identity() {
        let mut buffer = LatencyBuffer::new(0);
        assert_eq!(buffer.capacity(), 1);
        for i in 0..5 {
            assert_eq!(buffer.push(sample(i)), sample(i));
        }
    }

    #[test]
    fn test_bank_non_positive_latency_passthrough() {
        let mut bank = LatencyBank::default();
        assert_eq!(bank.delay(sample(4), 0.0), sample(4));
        assert_eq!(bank.delay(sample(5), -1.0), sample(5));
        assert_eq!(bank.buffer_count(), 0);
    }

    #[test]
    fn test_bank_keeps_one_buffer_per_latency() {
        let mut bank = LatencyBank::default();
        bank.delay(sample(0), 0.6);
        bank.delay(sample(1), 1.0);
        bank.delay(sample(2), 0.6);

        assert_eq!(bank.buffer_count(), 2);
        assert_eq!(bank.buffer(0.6).map(LatencyBuffer::len), Some(2));
        assert_eq!(bank.buffer(1.0).map(LatencyBuffer::capacity), Some(20));
    }

    #[test]
    fn test_buffer_length_fixed_after_creation() {
        let mut bank = LatencyBank::new(20.0);
        bank.delay(sample(0), 0.5);
        bank.set_sample_rate_hz(100.0);
        bank.delay(sample(1), 0.5);

        assert_eq!(bank.buffer(0.5).map(LatencyBuffer::capacity), Some(10));
    }

    #[test]
    fn test_bank_reset() {
        let mut bank = LatencyBank::default();
        bank.delay(sample(0), 1.0);
        bank.reset();
        assert_eq!(bank.buffer_count(), 0);
    }
}
