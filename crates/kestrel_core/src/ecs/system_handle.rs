use std::fmt;

/// Position of a system in its `SystemRegistry` schedule.
///
/// Handles order the same way the systems run: a smaller handle runs first
/// in every phase.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SystemHandle(u32);

impl SystemHandle {
    pub(crate) fn from_position(position: usize) -> Self {
        let position = u32::try_from(position).expect("more systems than u32::MAX");
        Self(position)
    }

    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }

    /// Slot of the system in the schedule's run list.
    #[inline]
    pub(crate) fn position(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SystemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system#{}", self.0)
    }
}
