//! Active touch contacts, one per multitouch slot.
//!
//! Slots are the kernel's channels for position updates; tracking ids are
//! the stable identity of a finger. The table is sized from the device's
//! slot range, so a slot index can never grow it.

use crate::multitouch::Axis;
use std::time::{Duration, Instant};

pub const MAX_TOUCH_POINTS: usize = 10;

#[derive(Clone, Debug)]
pub struct Contact {
    pub id: i32,
    pub slot: usize,
    pub x: Option<i32>,
    pub y: Option<i32>,
    /// Position seen at the previous batch end.
    pub last: Option<(i32, i32)>,
    pub press_time: Instant,
}

impl Contact {
    pub fn position(&self) -> Option<(i32, i32)> {
        self.x.zip(self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Released {
    pub id: i32,
    pub duration: Duration,
}

/// Summed per-contact movement since the previous batch end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchDelta {
    pub sum_dx: i64,
    pub sum_dy: i64,
    /// Contacts that had a previous position to diff against.
    pub contributors: usize,
    /// Contacts with both coordinates known.
    pub active: usize,
}

#[derive(Debug)]
pub struct ContactTracker {
    slots: Vec<Option<Contact>>,
    active_slot: Option<usize>,
}

impl ContactTracker {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count.max(1)],
            active_slot: Some(0),
        }
    }

    pub fn active_slot(&self) -> Option<usize> {
        self.active_slot
    }

    pub fn set_active_slot(&mut self, slot: i32) {
        self.active_slot = usize::try_from(slot)
            .ok()
            .filter(|&s| s < self.slots.len());
        if self.active_slot.is_none() {
            log::debug!("slot {} outside 0..{}, ignoring its events", slot, self.slots.len());
        }
    }

    /// Start a contact on `slot`, returning the id it evicted, if any.
    pub fn begin_contact(&mut self, slot: usize, id: i32, now: Instant) -> Option<i32> {
        let entry = self.slots.get_mut(slot)?;

        let (evicted, last) = match entry.take() {
            Some(old) if old.id == id => (None, old.last),
            Some(old) => {
                log::debug!(
                    "slot {} reused by id {}, dropping stale id {}",
                    old.slot,
                    id,
                    old.id
                );
                (Some(old.id), None)
            }
            None => (None, None),
        };

        *entry = Some(Contact {
            id,
            slot,
            x: None,
            y: None,
            last,
            press_time: now,
        });
        evicted
    }

    pub fn end_contact(&mut self, slot: usize, now: Instant) -> Option<Released> {
        let contact = self.slots.get_mut(slot)?.take()?;
        Some(Released {
            id: contact.id,
            duration: now.saturating_duration_since(contact.press_time),
        })
    }

    pub fn update_position(&mut self, slot: usize, axis: Axis, value: i32) {
        let Some(contact) = self.slots.get_mut(slot).and_then(Option::as_mut) else {
            return;
        };
        match axis {
            Axis::X => contact.x = Some(value),
            Axis::Y => contact.y = Some(value),
        }
    }

    #[cfg(test)]
    pub fn contact(&self, id: i32) -> Option<&Contact> {
        self.contacts().find(|c| c.id == id)
    }

    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.slots.iter().flatten()
    }

    /// Ids of contacts that have reported both coordinates.
    pub fn active_contacts(&self) -> Vec<i32> {
        self.contacts()
            .filter(|c| c.position().is_some())
            .map(|c| c.id)
            .collect()
    }

    /// Diff every active contact against its last position, then make the
    /// current position the new baseline.
    pub fn collect_deltas(&mut self) -> BatchDelta {
        let mut delta = BatchDelta::default();
        for contact in self.slots.iter_mut().flatten() {
            let Some((x, y)) = contact.position() else {
                continue;
            };
            delta.active += 1;
            if let Some((lx, ly)) = contact.last {
                delta.sum_dx += i64::from(x) - i64::from(lx);
                delta.sum_dy += i64::from(y) - i64::from(ly);
                delta.contributors += 1;
            }
            contact.last = Some((x, y));
        }
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(tracker: &mut ContactTracker, slot: usize, id: i32, x: i32, y: i32, now: Instant) {
        tracker.begin_contact(slot, id, now);
        tracker.update_position(slot, Axis::X, x);
        tracker.update_position(slot, Axis::Y, y);
    }

    #[test]
    fn contact_needs_both_coordinates_to_be_active() {
        let now = Instant::now();
        let mut tracker = ContactTracker::new(4);
        tracker.begin_contact(0, 7, now);
        assert!(tracker.active_contacts().is_empty());

        tracker.update_position(0, Axis::X, 100);
        assert!(tracker.active_contacts().is_empty());

        tracker.update_position(0, Axis::Y, 200);
        assert_eq!(tracker.active_contacts(), vec![7]);
    }

    #[test]
    fn end_reports_duration_and_forgets_contact() {
        let now = Instant::now();
        let mut tracker = ContactTracker::new(4);
        placed(&mut tracker, 1, 3, 10, 10, now);
        tracker.collect_deltas();

        let released = tracker.end_contact(1, now + Duration::from_millis(120));
        assert_eq!(
            released,
            Some(Released {
                id: 3,
                duration: Duration::from_millis(120)
            })
        );
        assert!(tracker.contact(3).is_none());

        // late position for the released slot is dropped
        tracker.update_position(1, Axis::X, 50);
        assert!(tracker.contacts().next().is_none());
        assert_eq!(tracker.end_contact(1, now), None);
    }

    #[test]
    fn slot_reuse_evicts_old_id() {
        let now = Instant::now();
        let mut tracker = ContactTracker::new(4);
        placed(&mut tracker, 0, 1, 10, 10, now);
        tracker.collect_deltas();

        assert_eq!(tracker.begin_contact(0, 2, now), Some(1));
        assert!(tracker.contact(1).is_none());
        let fresh = tracker.contact(2).expect("new contact");
        assert_eq!(fresh.position(), None);
        assert_eq!(fresh.last, None);
    }

    #[test]
    fn same_id_rebegin_keeps_baseline() {
        let now = Instant::now();
        let mut tracker = ContactTracker::new(4);
        placed(&mut tracker, 0, 1, 10, 10, now);
        tracker.collect_deltas();

        assert_eq!(tracker.begin_contact(0, 1, now), None);
        assert_eq!(tracker.contact(1).and_then(|c| c.last), Some((10, 10)));
    }

    #[test]
    fn out_of_range_slot_drops_events() {
        let now = Instant::now();
        let mut tracker = ContactTracker::new(2);
        tracker.set_active_slot(5);
        assert_eq!(tracker.active_slot(), None);
        tracker.set_active_slot(-1);
        assert_eq!(tracker.active_slot(), None);
        assert_eq!(tracker.begin_contact(9, 1, now), None);
        assert!(tracker.contacts().next().is_none());

        tracker.set_active_slot(1);
        assert_eq!(tracker.active_slot(), Some(1));
    }

    #[test]
    fn new_contacts_contribute_no_delta() {
        let now = Instant::now();
        let mut tracker = ContactTracker::new(4);
        placed(&mut tracker, 0, 1, 10, 10, now);

        let first = tracker.collect_deltas();
        assert_eq!(first.active, 1);
        assert_eq!(first.contributors, 0);

        tracker.update_position(0, Axis::X, 16);
        placed(&mut tracker, 1, 2, 50, 50, now);
        let second = tracker.collect_deltas();
        assert_eq!(
            second,
            BatchDelta {
                sum_dx: 6,
                sum_dy: 0,
                contributors: 1,
                active: 2
            }
        );
    }
}
