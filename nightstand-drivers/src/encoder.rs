//! Rotary encoder handler
//!
//! Decodes quadrature encoder signals into detent counts for
//! [`ControlSamples::rotary`](nightstand_core::input::ControlSamples).
//! Uses a state machine for reliable decoding with noise rejection.

use embedded_hal::digital::InputPin;

/// Rotation direction of one completed detent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

/// Decoder state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    CwStep1,
    CwStep2,
    CcwStep1,
    CcwStep2,
}

/// Pin-independent quadrature decoder
#[derive(Debug, Clone)]
pub struct QuadratureDecoder {
    state: State,
    last_a: bool,
    last_b: bool,
}

impl QuadratureDecoder {
    /// Create a decoder from the current pin levels
    pub fn new(a: bool, b: bool) -> Self {
        Self {
            state: State::Idle,
            last_a: a,
            last_b: b,
        }
    }

    /// Feed one sample of both channels
    ///
    /// Returns a rotation when a detent completes.
    pub fn update(&mut self, a: bool, b: bool) -> Option<Rotation> {
        if a == self.last_a && b == self.last_b {
            return None;
        }
        self.last_a = a;
        self.last_b = b;
        self.decode(a, b)
    }

    /// Quadrature state machine
    ///
    /// CW:  A leads B. Idle (1,1) -> CwStep1 (0,1) -> CwStep2 (0,0) -> step
    /// CCW: B leads A. Idle (1,1) -> CcwStep1 (1,0) -> CcwStep2 (0,0) -> step
    fn decode(&mut self, a: bool, b: bool) -> Option<Rotation> {
        match self.state {
            State::Idle => {
                if !a && b {
                    self.state = State::CwStep1;
                } else if a && !b {
                    self.state = State::CcwStep1;
                }
                None
            }
            State::CwStep1 | State::CcwStep1 => {
                if !a && !b {
                    self.state = if self.state == State::CwStep1 {
                        State::CwStep2
                    } else {
                        State::CcwStep2
                    };
                } else if a && b {
                    // Bounce back to rest
                    self.state = State::Idle;
                }
                None
            }
            State::CwStep2 if a || b => {
                self.state = State::Idle;
                Some(Rotation::Clockwise)
            }
            State::CcwStep2 if a || b => {
                self.state = State::Idle;
                Some(Rotation::CounterClockwise)
            }
            State::CwStep2 | State::CcwStep2 => None,
        }
    }
}

/// Quadrature encoder on two GPIO pins
///
/// Call [`poll`](Self::poll) often (every 1-5 ms) and
/// [`take_detents`](Self::take_detents) once per clock tick.
pub struct RotaryEncoder<A, B> {
    a: A,
    b: B,
    decoder: QuadratureDecoder,
    detents: i8,
}

impl<A: InputPin, B: InputPin> RotaryEncoder<A, B> {
    pub fn new(mut a: A, mut b: B) -> Self {
        let level_a = a.is_high().unwrap_or(true);
        let level_b = b.is_high().unwrap_or(true);
        Self {
            a,
            b,
            decoder: QuadratureDecoder::new(level_a, level_b),
            detents: 0,
        }
    }

    /// Sample the pins, returning a completed detent if any
    ///
    /// A failed pin read skips this sample.
    pub fn poll(&mut self) -> Option<Rotation> {
        let (Ok(a), Ok(b)) = (self.a.is_high(), self.b.is_high()) else {
            return None;
        };
        let rotation = self.decoder.update(a, b)?;
        self.detents = match rotation {
            Rotation::Clockwise => self.detents.saturating_add(1),
            Rotation::CounterClockwise => self.detents.saturating_sub(1),
        };
        Some(rotation)
    }

    /// Detents collected since the last call (positive = clockwise)
    pub fn take_detents(&mut self) -> i8 {
        core::mem::take(&mut self.detents)
    }
}
