//! Functions and pages
//!
//! A [`Mode`] is one displayable page. Pages belong to a [`Function`];
//! only the date function has more than one page. Which pages exist
//! depends on the configured [`Features`].

use crate::config::Features;

/// Top-level clock function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Function {
    Time,
    Date,
    Alarm,
    Timer,
    Temperature,
    TubeTest,
}

impl Function {
    pub const ALL: [Function; 6] = [
        Function::Time,
        Function::Date,
        Function::Alarm,
        Function::Timer,
        Function::Temperature,
        Function::TubeTest,
    ];

    pub fn is_available(self, features: &Features) -> bool {
        match self {
            Function::Time => true,
            Function::Date => features.date_fn,
            Function::Alarm => features.alarm,
            Function::Timer => features.timer,
            Function::Temperature => features.temperature,
            Function::TubeTest => features.tube_test,
        }
    }

    /// Menu number shown on the display (1-based)
    pub fn number(self) -> u8 {
        Function::ALL.iter().position(|f| *f == self).unwrap_or(0) as u8 + 1
    }

    /// First page of this function
    pub fn first_page(self) -> Mode {
        match self {
            Function::Time => Mode::Time,
            Function::Date => Mode::Date(DatePage::Date),
            Function::Alarm => Mode::Alarm,
            Function::Timer => Mode::Timer,
            Function::Temperature => Mode::Temperature,
            Function::TubeTest => Mode::TubeTest,
        }
    }

    /// Next available function in `dir`, wrapping
    pub fn scroll(self, dir: i8, features: &Features) -> Function {
        step_in(&Function::ALL, self, dir, |f| f.is_available(features))
    }
}

/// Pages of the date function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DatePage {
    Date,
    /// Days until (or since) a chosen anniversary
    Counter,
    Sunrise,
    Sunset,
}

/// Which timeout sends a temporary page back to the time page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PageTimeout {
    /// `fn_temp_timeout_s`
    Function,
    /// `fn_page_timeout_s`
    SubPage,
}

/// One displayable page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    #[default]
    Time,
    Date(DatePage),
    Alarm,
    Timer,
    Temperature,
    TubeTest,
}

impl Mode {
    /// Every page in scroll order
    pub const ALL: [Mode; 9] = [
        Mode::Time,
        Mode::Date(DatePage::Date),
        Mode::Date(DatePage::Counter),
        Mode::Date(DatePage::Sunrise),
        Mode::Date(DatePage::Sunset),
        Mode::Alarm,
        Mode::Timer,
        Mode::Temperature,
        Mode::TubeTest,
    ];

    pub fn function(self) -> Function {
        match self {
            Mode::Time => Function::Time,
            Mode::Date(_) => Function::Date,
            Mode::Alarm => Function::Alarm,
            Mode::Timer => Function::Timer,
            Mode::Temperature => Function::Temperature,
            Mode::TubeTest => Function::TubeTest,
        }
    }

    pub fn is_available(self, features: &Features) -> bool {
        if !self.function().is_available(features) {
            return false;
        }
        match self {
            Mode::Date(DatePage::Counter) => features.counter,
            Mode::Date(DatePage::Sunrise | DatePage::Sunset) => features.sun,
            _ => true,
        }
    }

    /// Next available page in `dir`, wrapping through all functions
    pub fn scroll(self, dir: i8, features: &Features) -> Mode {
        step_in(&Mode::ALL, self, dir, |m| m.is_available(features))
    }

    /// Timeout class of a page that returns to the time page on its own
    pub fn temporary(self) -> Option<PageTimeout> {
        match self {
            Mode::Date(DatePage::Date) => Some(PageTimeout::Function),
            Mode::Date(_) => Some(PageTimeout::SubPage),
            _ => None,
        }
    }
}

fn step_in<T: Copy + PartialEq>(all: &[T], current: T, dir: i8, available: impl Fn(T) -> bool) -> T {
    let len = all.len();
    let start = all.iter().position(|x| *x == current).unwrap_or(0);
    let step = if dir < 0 { len - 1 } else { 1 };
    (1..=len)
        .map(|i| all[(start + i * step) % len])
        .find(|x| available(*x))
        .unwrap_or(current)
}
