//! Global timeline and time-indexed sets

use super::VisibilityMap;

/// Step forward, wrapping to 0 past `last`
pub fn wrap_next(current: u32, last: u32) -> u32 {
    if current >= last { 0 } else { current + 1 }
}

/// Step back, wrapping to `last` below 0
pub fn wrap_prev(current: u32, last: u32) -> u32 {
    if current == 0 || current > last { last } else { current - 1 }
}

/// The single counter that drives every time and dynamic set
///
/// Invariant: `current_time <= end_time`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalTimeline {
    /// Current tick
    pub current_time: u32,
    /// Last tick; the timeline has `end_time + 1` ticks
    pub end_time: u32,
}

impl GlobalTimeline {
    /// Advance one tick, wrapping
    pub fn next(&mut self) {
        self.current_time = wrap_next(self.current_time, self.end_time);
    }

    /// Go back one tick, wrapping
    pub fn prev(&mut self) {
        self.current_time = wrap_prev(self.current_time, self.end_time);
    }

    /// Go to tick 0
    pub fn first(&mut self) {
        self.current_time = 0;
    }

    /// Go to `t`, clamped to `[0, end_time]`
    pub fn set(&mut self, t: u32) {
        self.current_time = t.min(self.end_time);
    }

    /// Raise `end_time` to at least `end`
    pub fn extend_to(&mut self, end: u32) {
        self.end_time = self.end_time.max(end);
    }
}

/// A group of models active over `[start_time, end_time)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeGroup {
    /// First tick the group is active
    pub start_time: u32,
    /// First tick the group is no longer active
    pub end_time: u32,
    /// Models this group shows or hides
    pub models: VisibilityMap,
}

impl TimeGroup {
    /// Create an empty group over `[start_time, end_time)`
    pub fn new(start_time: u32, end_time: u32) -> Self {
        Self {
            start_time,
            end_time,
            models: VisibilityMap::new(),
        }
    }

    /// Add a model the group shows
    pub fn show(mut self, model: impl Into<String>) -> Self {
        self.models.insert(model.into(), true);
        self
    }

    /// Whether the group is active at tick `t`
    pub fn contains(&self, t: u32) -> bool {
        self.start_time <= t && t < self.end_time
    }
}

/// Groups of static models switched by the timeline
///
/// Invariant: `current_time <= end_time`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSet {
    /// Set name
    pub name: String,
    /// Menu the set appears under
    pub menu_name: String,
    /// Hidden sets contribute nothing to visibility
    pub visible: bool,
    /// Local tick
    pub current_time: u32,
    /// Last local tick
    pub end_time: u32,
    /// Groups in declaration order; later groups win on conflicts
    pub groups: Vec<TimeGroup>,
}

impl TimeSet {
    /// Create an empty, visible time set
    pub fn new(name: impl Into<String>, menu_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            menu_name: menu_name.into(),
            visible: true,
            current_time: 0,
            end_time: 0,
            groups: Vec::new(),
        }
    }

    /// Append a group, extending `end_time` to its last active tick
    pub fn push_group(&mut self, group: TimeGroup) {
        self.end_time = self.end_time.max(group.end_time.saturating_sub(1));
        self.groups.push(group);
    }

    /// Append a group (builder form)
    pub fn with_group(mut self, group: TimeGroup) -> Self {
        self.push_group(group);
        self
    }

    /// Advance one tick, wrapping at this set's own end
    pub fn step_forward(&mut self) {
        self.current_time = wrap_next(self.current_time, self.end_time);
    }

    /// Go back one tick, wrapping at this set's own end
    pub fn step_back(&mut self) {
        self.current_time = wrap_prev(self.current_time, self.end_time);
    }

    /// Follow global tick `t`, wrapping onto this set's own length
    pub fn follow(&mut self, t: u32) {
        self.current_time = t % (self.end_time + 1);
    }

    /// Groups active at the current tick, in declaration order
    pub fn active_groups(&self) -> impl Iterator<Item = &TimeGroup> {
        let t = self.current_time;
        self.groups.iter().filter(move |g| g.contains(t))
    }
}
