// Fixed-length series buffers backing the chart panel.
// Invariants: capacity never changes; a push on a full buffer evicts the oldest point.

#[derive(Debug)]
pub struct RingBuffer<T> {
    buf: Vec<T>,
    cap: usize,
    head: usize,
}

impl<T: Clone> RingBuffer<T> {
    /// Full from the start, like a chart axis padded with a resting value.
    pub fn filled(cap: usize, value: T) -> Self {
        Self {
            buf: vec![value; cap.max(1)],
            cap: cap.max(1),
            head: 0,
        }
    }

    pub fn push(&mut self, item: T) {
        self.buf[self.head] = item;
        self.head = (self.head + 1) % self.cap;
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn latest(&self) -> &T {
        &self.buf[(self.head + self.cap - 1) % self.cap]
    }

    pub fn fill(&mut self, value: T) {
        for slot in self.buf.iter_mut() {
            *slot = value.clone();
        }
        self.head = 0;
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buf[self.head..].iter().chain(self.buf[..self.head].iter())
    }

    pub fn to_vec_ordered(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_shifts_out_the_oldest_point() {
        let mut series = RingBuffer::filled(3, 0);
        assert_eq!(series.to_vec_ordered(), vec![0, 0, 0]);

        for value in 1..=4 {
            series.push(value);
        }
        assert_eq!(series.to_vec_ordered(), vec![2, 3, 4]);
        assert_eq!(*series.latest(), 4);
        assert_eq!(series.capacity(), 3);
    }

    #[test]
    fn fill_resets_every_point() {
        let mut series = RingBuffer::filled(2, 0.0);
        series.push(5.0);
        series.fill(1.0);
        assert_eq!(series.to_vec_ordered(), vec![1.0, 1.0]);
        series.push(2.0);
        assert_eq!(series.to_vec_ordered(), vec![1.0, 2.0]);
    }
}
