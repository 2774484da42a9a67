//! Shift/xor generator that drives the packer's traversal choices.
//!
//! The sequence must stay bit-exact: a layout is reproduced from its seed alone.

const FEEDBACK: u32 = 0x8888_8EEF;

/// Advances `state` once and returns `(value, new_state)`; both are the same word.
pub fn next(state: u32) -> (u32, u32) {
    let mut s = (state << 1).wrapping_add(1);
    if (s as i32) < 0 {
        s ^= FEEDBACK;
    }
    (s, s)
}

/// Explicit generator state, one per packing trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftXorRng {
    state: u32,
}

impl ShiftXorRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        let (value, state) = next(self.state);
        self.state = state;
        value
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

impl Iterator for ShiftXorRng {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        Some(self.next_u32())
    }
}
