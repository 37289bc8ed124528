//! Touch-cycle classification: taps, right taps, double-tap drags and
//! two-finger scrolls.
//!
//! A touch-cycle runs from the first finger landing on an empty screen to
//! that same finger lifting. The first finger is the primary; it alone
//! decides clicks and drags. Any other finger is secondary: a short tap with
//! it is a right click, and its arrival cancels a drag.

use crate::config::Config;
use crate::motion::{self, MotionProcessor};
use crate::multitouch::TouchEvent;
use crate::pointer::{Button, PointerCommand, Report};
use crate::tracker::ContactTracker;
use std::time::Instant;

#[derive(Clone, Debug, PartialEq)]
pub struct GestureSession {
    pub primary_id: Option<i32>,
    pub cycle_active: bool,
    pub cycle_start: Instant,
    /// Set once a batch moved past the move threshold; a cycle with this set
    /// never ends in a click.
    pub moved_far: bool,
    pub dragging: bool,
    pub last_click: Option<Instant>,
    pub click_run: u32,
}

impl GestureSession {
    fn new(now: Instant) -> Self {
        Self {
            primary_id: None,
            cycle_active: false,
            cycle_start: now,
            moved_far: false,
            dragging: false,
            last_click: None,
            click_run: 0,
        }
    }

    fn within_double_click(&self, config: &Config, now: Instant) -> bool {
        self.last_click
            .is_some_and(|at| now.saturating_duration_since(at) < config.double_click_timeout)
    }

    fn record_click(&mut self, config: &Config, now: Instant) {
        if self.within_double_click(config, now) {
            self.click_run += 1;
        } else {
            self.click_run = 1;
        }
        self.last_click = Some(now);
    }
}

/// Everything the translator remembers between events.
#[derive(Debug)]
pub struct GestureEngine {
    config: Config,
    tracker: ContactTracker,
    session: GestureSession,
    motion: MotionProcessor,
}

impl GestureEngine {
    pub fn new(config: Config, slot_count: usize, now: Instant) -> Self {
        Self {
            config,
            tracker: ContactTracker::new(slot_count),
            session: GestureSession::new(now),
            motion: MotionProcessor::new(now),
        }
    }

    pub fn session(&self) -> &GestureSession {
        &self.session
    }

    #[cfg(test)]
    pub fn tracker(&self) -> &ContactTracker {
        &self.tracker
    }

    #[cfg(test)]
    pub fn motion(&self) -> &MotionProcessor {
        &self.motion
    }

    /// Feed one low-level event; returns the reports to send, in order.
    pub fn handle(&mut self, event: TouchEvent, now: Instant) -> Vec<Report> {
        let mut out = Vec::new();
        match event {
            TouchEvent::SlotSelect(slot) => self.tracker.set_active_slot(slot),
            TouchEvent::ContactBegin(id) => self.contact_down(id, now, &mut out),
            TouchEvent::ContactEnd => self.contact_up(now, &mut out),
            TouchEvent::Position(axis, value) => {
                if let Some(slot) = self.tracker.active_slot() {
                    self.tracker.update_position(slot, axis, value);
                }
            }
            TouchEvent::BatchEnd => self.batch_end(now, &mut out),
        }
        out
    }

    fn contact_down(&mut self, id: i32, now: Instant, out: &mut Vec<Report>) {
        let Some(slot) = self.tracker.active_slot() else {
            log::debug!("tracking id {} on an invalid slot, dropped", id);
            return;
        };

        let evicted = self.tracker.begin_contact(slot, id, now);
        if evicted.is_some() && evicted == self.session.primary_id {
            log::debug!("primary contact lost to slot reuse, closing touch cycle");
            self.close_cycle(out);
        }

        if !self.session.cycle_active {
            self.open_cycle(slot, id, now, out);
        } else if self.session.primary_id != Some(id) {
            log::info!(
                "second down: slot {} id {} ({} placed)",
                slot,
                id,
                self.tracker.active_contacts().len()
            );
            if self.session.dragging {
                out.push(Report::single(PointerCommand::release(Button::Left)));
                self.session.dragging = false;
                log::info!("drag cancelled by second finger");
            }
        }
    }

    fn open_cycle(&mut self, slot: usize, id: i32, now: Instant, out: &mut Vec<Report>) {
        let session = &mut self.session;
        session.primary_id = Some(id);
        session.cycle_active = true;
        session.cycle_start = now;
        session.moved_far = false;
        log::info!("down: slot {} id {} (primary)", slot, id);

        if session.within_double_click(&self.config, now) && session.click_run == 1 {
            session.dragging = true;
            out.push(Report::single(PointerCommand::press(Button::Left)));
            log::info!("double tap, drag started");
        }
    }

    /// Tear down the cycle without classifying it as a tap.
    fn close_cycle(&mut self, out: &mut Vec<Report>) {
        if self.session.dragging {
            out.push(Report::single(PointerCommand::release(Button::Left)));
            self.session.dragging = false;
            log::info!("drag stopped");
        }
        self.session.cycle_active = false;
        self.session.primary_id = None;
    }

    fn contact_up(&mut self, now: Instant, out: &mut Vec<Report>) {
        let Some(slot) = self.tracker.active_slot() else {
            return;
        };
        let Some(released) = self.tracker.end_contact(slot, now) else {
            log::debug!("release on empty slot {}, ignored", slot);
            return;
        };
        log::info!(
            "up: slot {} id {} after {:.2}s",
            slot,
            released.id,
            released.duration.as_secs_f64()
        );

        let is_primary = self.session.primary_id == Some(released.id);
        if !is_primary && released.duration < self.config.right_click_tap {
            out.extend(Report::click(Button::Right));
            log::info!("right click");
        }

        if is_primary && self.session.cycle_active {
            let total = now.saturating_duration_since(self.session.cycle_start);
            if !self.session.dragging && !self.session.moved_far && total < self.config.click_time
            {
                out.extend(Report::click(Button::Left));
                self.session.record_click(&self.config, now);
                log::info!("left click (run of {})", self.session.click_run);
            }
            self.close_cycle(out);
        }
    }

    fn batch_end(&mut self, now: Instant, out: &mut Vec<Report>) {
        let delta = self.tracker.collect_deltas();
        let elapsed = self.motion.elapsed(now);
        let Some(avg) = motion::average(&delta) else {
            return;
        };

        if motion::exceeds_threshold(&self.config, avg) {
            self.session.moved_far = true;
            if delta.active >= 2 {
                if let Some(tick) = motion::scroll_tick(&self.config, avg) {
                    out.push(Report::single(PointerCommand::Wheel(tick)));
                    log::debug!("scroll {:+}", tick);
                }
            } else {
                let (dx, dy) = self.motion.pointer_motion(&self.config, avg, elapsed);
                out.push(Report::single(PointerCommand::Motion { dx, dy }));
            }
        }
        self.motion.mark_processed(now);
    }
}
