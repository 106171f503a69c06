//! Controller input events.
//!
//! Ephemeral values: dispatched and discarded within the same frame. The
//! app layer maps desktop key edges onto the same flow events, so nothing
//! downstream needs to know which device produced an input.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn index(self) -> usize {
        match self {
            Hand::Left => 0,
            Hand::Right => 1,
        }
    }

    pub fn other(self) -> Hand {
        match self {
            Hand::Left => Hand::Right,
            Hand::Right => Hand::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Trigger,
    Grip,
    Menu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub hand: Hand,
    pub button: Button,
    pub edge: Edge,
}

/// One joystick sample for one hand. Raw, deadzone handling is the
/// consumer's business.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSample {
    pub hand: Hand,
    pub x: f32,
    pub y: f32,
}
