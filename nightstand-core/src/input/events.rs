//! Classified control events

/// Physical control identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlId {
    /// Primary selector
    Select,
    /// Optional alternate selector
    Alt,
    /// Up button or clockwise rotary step
    Up,
    /// Down button or counter-clockwise rotary step
    Down,
}

impl ControlId {
    /// All controls in polling order
    pub const ALL: [ControlId; 4] = [
        ControlId::Select,
        ControlId::Alt,
        ControlId::Up,
        ControlId::Down,
    ];

    /// Direction for Up/Down, 0 otherwise
    pub fn direction(self) -> i8 {
        match self {
            ControlId::Up => 1,
            ControlId::Down => -1,
            _ => 0,
        }
    }
}

/// Graduated hold duration class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HoldLevel {
    /// Released before the short threshold
    #[default]
    Tap,
    Short,
    Long,
    VeryLong,
    SuperLong,
}

impl HoldLevel {
    /// The next level up, if any
    pub fn next(self) -> Option<Self> {
        match self {
            HoldLevel::Tap => Some(HoldLevel::Short),
            HoldLevel::Short => Some(HoldLevel::Long),
            HoldLevel::Long => Some(HoldLevel::VeryLong),
            HoldLevel::VeryLong => Some(HoldLevel::SuperLong),
            HoldLevel::SuperLong => None,
        }
    }
}

/// What happened to a control this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// Control went down
    Press,
    /// Held past a threshold (reported once per level per hold)
    Hold(HoldLevel),
    /// Control came up, carrying the last level reached
    Release(HoldLevel),
}

/// Step multiplier for value edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Velocity {
    /// ×1
    #[default]
    Low,
    /// ×10
    High,
}

impl Velocity {
    pub fn multiplier(self) -> i32 {
        match self {
            Velocity::Low => 1,
            Velocity::High => 10,
        }
    }
}

/// One classified input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlEvent {
    pub control: ControlId,
    pub kind: Transition,
    pub velocity: Velocity,
}

impl ControlEvent {
    pub fn new(control: ControlId, kind: Transition) -> Self {
        Self {
            control,
            kind,
            velocity: Velocity::Low,
        }
    }

    /// Released before reaching the short threshold
    pub fn is_tap(&self) -> bool {
        self.kind == Transition::Release(HoldLevel::Tap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_levels_ordered() {
        assert!(HoldLevel::Tap < HoldLevel::Short);
        assert!(HoldLevel::VeryLong < HoldLevel::SuperLong);
        assert_eq!(HoldLevel::SuperLong.next(), None);
    }

    #[test]
    fn test_direction() {
        assert_eq!(ControlId::Up.direction(), 1);
        assert_eq!(ControlId::Down.direction(), -1);
        assert_eq!(ControlId::Select.direction(), 0);
    }
}
