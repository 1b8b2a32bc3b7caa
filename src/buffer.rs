/// Two owned slots with a selector naming which one is read this generation.
///
/// `current()` is the read side, `next()` the write side. `swap()` flips the
/// selector without moving either slot.
#[derive(Clone, Debug)]
pub struct BufferPair<T> {
    slots: [T; 2],
    front: usize,
}

impl<T> BufferPair<T> {
    pub fn new(current: T, next: T) -> Self {
        Self {
            slots: [current, next],
            front: 0,
        }
    }

    /// Builds a pair whose read side starts at slot `front` (0 or 1).
    pub fn with_front(first: T, second: T, front: usize) -> Self {
        assert!(front < 2, "front slot must be 0 or 1");
        Self {
            slots: [first, second],
            front,
        }
    }

    pub fn front_index(&self) -> usize {
        self.front
    }

    pub fn current(&self) -> &T {
        &self.slots[self.front]
    }

    pub fn current_mut(&mut self) -> &mut T {
        &mut self.slots[self.front]
    }

    pub fn next(&self) -> &T {
        &self.slots[1 - self.front]
    }

    pub fn next_mut(&mut self) -> &mut T {
        &mut self.slots[1 - self.front]
    }

    /// Read side and write side borrowed at once.
    pub fn split_mut(&mut self) -> (&T, &mut T) {
        let [first, second] = &mut self.slots;
        if self.front == 0 {
            (first, second)
        } else {
            (second, first)
        }
    }

    pub fn swap(&mut self) {
        self.front = 1 - self.front;
    }
}

impl<T: Clone> BufferPair<T> {
    pub fn from_value(value: T) -> Self {
        Self::new(value.clone(), value)
    }
}
