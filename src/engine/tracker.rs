//! Scroll threshold tracker: decides when a menu item's section has been
//! reached.
//!
//! Each item has a resting position (its section's top at a known scroll
//! state).  Whenever the scroll offset comes within `threshold` px of it,
//! the side it approached from is compared with the side of the last
//! trigger.  A trigger fires on a direction change, but only once the item
//! has left its zone since the previous one (or if it never fired).
//! Jitter inside a zone therefore never re-fires.

use std::collections::HashMap;
use std::fmt;

/// Which side of the resting position the scroll offset is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Offset above the resting position (scrolling towards it from the top).
    Plus,
    /// Offset at or below the resting position.
    Minus,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Plus => "+",
            Direction::Minus => "-",
        })
    }
}

/// Scroll history of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerState {
    pub last_direction: Option<Direction>,
    pub has_exited_zone: bool,
    pub is_animating: bool,
}

impl Default for TriggerState {
    fn default() -> Self {
        Self {
            last_direction: None,
            has_exited_zone: true,
            is_animating: false,
        }
    }
}

/// Emitted when an item crosses its threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub item_id: String,
    pub direction: Direction,
    pub resting: f64,
    pub offset: f64,
}

/// Watches the scroll offset against every item's resting position.
#[derive(Debug, Clone)]
pub struct ThresholdTracker {
    threshold: f64,
    /// Registration order is evaluation order.
    resting: Vec<(String, f64)>,
    states: HashMap<String, TriggerState>,
}

impl ThresholdTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.max(0.0),
            resting: Vec::new(),
            states: HashMap::new(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Replace the resting positions.  All scroll history is forgotten.
    pub fn set_resting_positions<I, S>(&mut self, positions: I)
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        self.resting = positions
            .into_iter()
            .map(|(id, top)| (id.into(), top))
            .collect();
        self.states = self
            .resting
            .iter()
            .map(|(id, _)| (id.clone(), TriggerState::default()))
            .collect();
        tracing::debug!(items = self.resting.len(), "resting positions set");
    }

    pub fn resting_position(&self, item_id: &str) -> Option<f64> {
        self.resting
            .iter()
            .find(|(id, _)| id == item_id)
            .map(|&(_, top)| top)
    }

    pub fn state(&self, item_id: &str) -> Option<&TriggerState> {
        self.states.get(item_id)
    }

    /// Record whether the item is currently being animated.
    pub fn set_animating(&mut self, item_id: &str, animating: bool) {
        if let Some(state) = self.states.get_mut(item_id) {
            state.is_animating = animating;
        }
    }

    /// Feed the latest scroll offset; returns the items that fired, in
    /// registration order.
    pub fn on_scroll_offset_change(&mut self, offset: f64) -> Vec<Trigger> {
        let mut fired = Vec::new();
        for (id, resting) in &self.resting {
            let state = self.states.entry(id.clone()).or_default();

            if (resting - offset).abs() < self.threshold {
                let current = if *resting > offset {
                    Direction::Plus
                } else {
                    Direction::Minus
                };
                let rearmed = state.has_exited_zone || state.last_direction.is_none();
                if state.last_direction != Some(current) && rearmed {
                    state.last_direction = Some(current);
                    state.has_exited_zone = false;
                    tracing::info!(
                        item = %id,
                        direction = %current,
                        resting,
                        offset,
                        "threshold crossed"
                    );
                    fired.push(Trigger {
                        item_id: id.clone(),
                        direction: current,
                        resting: *resting,
                        offset,
                    });
                }
            } else {
                state.has_exited_zone = true;
            }
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tracker() -> ThresholdTracker {
        let mut t = ThresholdTracker::new(10.0);
        t.set_resting_positions([
            ("home", 0.0),
            ("about", 800.0),
            ("services", 1600.0),
            ("contact", 2400.0),
        ]);
        t
    }

    fn feed(t: &mut ThresholdTracker, offsets: &[f64]) -> Vec<Trigger> {
        offsets
            .iter()
            .flat_map(|&o| t.on_scroll_offset_change(o))
            .collect()
    }

    fn ids(triggers: &[Trigger]) -> Vec<&str> {
        triggers.iter().map(|t| t.item_id.as_str()).collect()
    }

    #[test]
    fn fresh_items_start_armed() {
        let t = tracker();
        assert_eq!(t.state("about"), Some(&TriggerState::default()));
        assert!(t.state("about").unwrap().has_exited_zone);
        assert_eq!(t.resting_position("services"), Some(1600.0));
    }

    #[test]
    fn crossing_about_fires_exactly_once() {
        let mut t = tracker();
        let fired = feed(&mut t, &[0.0, 795.0, 805.0]);
        assert_eq!(ids(&fired), vec!["home", "about"]);
    }

    #[test]
    fn jumping_past_resting_position_fires_minus() {
        let mut t = tracker();
        let fired = feed(&mut t, &[400.0, 805.0]);
        assert_eq!(ids(&fired), vec!["about"]);
        assert_eq!(fired[0].direction, Direction::Minus);
        assert_eq!(fired[0].direction.to_string(), "-");
    }

    #[test]
    fn oscillation_inside_zone_is_suppressed() {
        let mut t = tracker();
        let fired = feed(&mut t, &[795.0, 805.0, 795.0, 805.0, 799.0, 801.0]);
        assert_eq!(ids(&fired), vec!["about"]);
    }

    #[test]
    fn same_direction_reentry_is_suppressed() {
        let mut t = tracker();
        let fired = feed(&mut t, &[795.0, 700.0, 795.0, 700.0, 796.0]);
        assert_eq!(ids(&fired), vec!["about"]);
    }

    #[test]
    fn reversal_after_exit_fires_again() {
        let mut t = tracker();
        // Down through the zone, out the other side, then back up through it.
        let fired = feed(&mut t, &[795.0, 805.0, 900.0, 805.0, 795.0]);
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0].direction, Direction::Plus);
        assert_eq!(fired[1].direction, Direction::Minus);
        assert_eq!(fired[1].offset, 805.0);
    }

    #[test]
    fn exit_marks_zone_left() {
        let mut t = tracker();
        t.on_scroll_offset_change(800.0);
        assert!(!t.state("about").unwrap().has_exited_zone);
        t.on_scroll_offset_change(1000.0);
        assert!(t.state("about").unwrap().has_exited_zone);
        assert_eq!(t.state("about").unwrap().last_direction, Some(Direction::Minus));
    }

    #[test]
    fn resetting_positions_forgets_history() {
        let mut t = tracker();
        feed(&mut t, &[795.0]);
        t.set_animating("about", true);
        t.set_resting_positions([("about", 800.0)]);
        assert_eq!(t.state("about"), Some(&TriggerState::default()));
        assert!(t.state("home").is_none());
        assert_eq!(ids(&feed(&mut t, &[795.0])), vec!["about"]);
    }

    #[test]
    fn configurable_threshold() {
        let mut t = ThresholdTracker::new(50.0);
        t.set_resting_positions([("about", 800.0)]);
        assert_eq!(ids(&feed(&mut t, &[760.0])), vec!["about"]);

        let mut narrow = ThresholdTracker::new(10.0);
        narrow.set_resting_positions([("about", 800.0)]);
        assert!(feed(&mut narrow, &[760.0]).is_empty());
    }

    proptest! {
        /// Without leaving the zone, an item fires at most once.
        #[test]
        fn at_most_one_trigger_per_zone_visit(jitter in prop::collection::vec(-9.5f64..9.5, 1..64)) {
            let mut t = tracker();
            let offsets: Vec<f64> = jitter.iter().map(|j| 800.0 + j).collect();
            let fired = feed(&mut t, &offsets);
            prop_assert_eq!(fired.len(), 1);
        }

        /// Consecutive triggers of one item always alternate direction, and
        /// each is separated by an exit from the zone.
        #[test]
        fn triggers_alternate_and_need_an_exit(path in prop::collection::vec(700.0f64..900.0, 1..200)) {
            let mut t = ThresholdTracker::new(10.0);
            t.set_resting_positions([("about", 800.0)]);
            let mut last: Option<Direction> = None;
            let mut exited_since_last = true;
            for offset in path {
                let inside = (800.0 - offset).abs() < 10.0;
                let fired = t.on_scroll_offset_change(offset);
                prop_assert!(fired.len() <= 1);
                if let Some(trigger) = fired.first() {
                    prop_assert!(inside);
                    prop_assert_ne!(Some(trigger.direction), last);
                    prop_assert!(exited_since_last || last.is_none());
                    last = Some(trigger.direction);
                    exited_since_last = false;
                }
                if !inside {
                    exited_since_last = true;
                }
            }
        }
    }
}
