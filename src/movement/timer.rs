/// One-shot deadline checked against the simulation clock.
///
/// Scheduling again overwrites the pending deadline, which is how a pending
/// timer is cancelled and restarted. A timer fires at most once per schedule
/// and only while armed.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ScheduledTimer {
    deadline: f64,
    armed: bool,
}

impl ScheduledTimer {
    pub fn schedule(&mut self, now: f64, seconds: f32) {
        self.deadline = now + seconds as f64;
        self.armed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// True exactly once, on the first poll at or after the deadline.
    pub fn fired(&mut self, now: f64) -> bool {
        if self.armed && now >= self.deadline {
            self.armed = false;
            true
        } else {
            false
        }
    }
}
