use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};

pub const DEFAULT_FPS: f32 = 24.0;

/// Blocking frame pacer. [`FrameClock::tick`] sleeps until one frame
/// duration has passed since the previous tick.
#[derive(Debug)]
pub struct FrameClock {
    fps: f32,
    last_tick: Instant,
    frame_intervals: VecDeque<Duration>,
    max_intervals: usize,
}

impl FrameClock {
    pub fn new(fps: f32) -> Self {
        Self::with_start(fps, Instant::now())
    }

    pub fn with_start(fps: f32, now: Instant) -> Self {
        Self {
            fps: fps.max(1.0),
            last_tick: now,
            frame_intervals: VecDeque::new(),
            max_intervals: 90,
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn set_fps(&mut self, fps: f32) {
        self.fps = fps.max(1.0);
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.fps)
    }

    pub fn next_deadline(&self) -> Instant {
        self.last_tick + self.frame_duration()
    }

    /// Time left before the next frame boundary, zero when lagging.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next_deadline().saturating_duration_since(now)
    }

    pub fn average_fps(&self) -> f32 {
        if self.frame_intervals.is_empty() {
            return 0.0;
        }

        let sum: Duration = self.frame_intervals.iter().copied().sum();
        let avg = sum / self.frame_intervals.len() as u32;

        if avg.is_zero() {
            return 0.0;
        }

        1.0 / avg.as_secs_f32()
    }

    pub fn tick(&mut self) -> Duration {
        let wait = self.remaining(Instant::now());
        if !wait.is_zero() {
            thread::sleep(wait);
        }
        self.mark(Instant::now())
    }

    /// Closes the current frame at `now` and returns its length.
    pub fn mark(&mut self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        self.record_interval(elapsed);
        elapsed
    }

    pub fn reset_timing(&mut self, now: Instant) {
        self.last_tick = now;
        self.frame_intervals.clear();
    }

    fn record_interval(&mut self, interval: Duration) {
        self.frame_intervals.push_back(interval);
        if self.frame_intervals.len() > self.max_intervals {
            self.frame_intervals.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_shrinks_within_a_frame() {
        let start = Instant::now();
        let clock = FrameClock::with_start(60.0, start);

        let half = start + clock.frame_duration() / 2;
        assert_eq!(clock.remaining(half), clock.frame_duration() / 2);
        assert_eq!(clock.remaining(start + clock.frame_duration()), Duration::ZERO);
    }

    #[test]
    fn lagging_frames_do_not_wait() {
        let start = Instant::now();
        let clock = FrameClock::with_start(30.0, start);
        let late = start + clock.frame_duration() * 3;
        assert_eq!(clock.remaining(late), Duration::ZERO);
    }

    #[test]
    fn average_fps_follows_marked_intervals() {
        let start = Instant::now();
        let mut clock = FrameClock::with_start(50.0, start);
        assert_eq!(clock.average_fps(), 0.0);

        let mut now = start;
        for _ in 0..10 {
            now += Duration::from_millis(20);
            clock.mark(now);
        }

        assert!((clock.average_fps() - 50.0).abs() < 0.01);
    }

    #[test]
    fn interval_history_is_bounded() {
        let start = Instant::now();
        let mut clock = FrameClock::with_start(60.0, start);
        let mut now = start;
        for _ in 0..200 {
            now += Duration::from_millis(10);
            clock.mark(now);
        }
        assert_eq!(clock.frame_intervals.len(), 90);
    }

    #[test]
    fn fps_is_clamped_to_one() {
        let mut clock = FrameClock::new(0.0);
        assert_eq!(clock.fps(), 1.0);

        clock.set_fps(30.0);
        assert_eq!(clock.fps(), 30.0);
        clock.set_fps(-5.0);
        assert_eq!(clock.fps(), 1.0);
    }

    #[test]
    fn tick_waits_for_the_frame_boundary() {
        let mut clock = FrameClock::new(200.0);
        let before = Instant::now();
        clock.tick();
        clock.tick();
        assert!(before.elapsed() >= clock.frame_duration());
    }
}
