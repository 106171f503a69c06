//! Controller button bindings.
//!
//! An explicit `(hand, button, edge) -> Action` table instead of per-hand
//! callback closures; the dispatched action carries its hand, so there is
//! no free variable for a handler to capture wrongly. Unregistered
//! combinations are no-ops.

use std::collections::HashMap;

use simlife_core::{Button, ButtonEvent, Edge, Hand};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Open or close the pause panel.
    TogglePause,
    /// Grab/interact with whatever the hand overlaps.
    Interact(Hand),
    /// Spawn the transient hand-aura effect.
    SpawnHandAura(Hand),
    /// Re-seat the head transform to the configured user height.
    Recenter,
}

#[derive(Debug, Default)]
pub struct Bindings {
    map: HashMap<(Hand, Button, Edge), Action>,
}

impl Bindings {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Default layout. The menu button on the dominant hand pauses and on
    /// the off hand recenters; grips interact; triggers spawn the hand
    /// aura when effects are enabled.
    pub fn standard(dominant: Hand, effects_enabled: bool) -> Self {
        let mut bindings = Self::empty();
        bindings.bind(dominant, Button::Menu, Edge::Pressed, Action::TogglePause);
        bindings.bind(dominant.other(), Button::Menu, Edge::Pressed, Action::Recenter);
        for hand in [Hand::Left, Hand::Right] {
            bindings.bind(hand, Button::Grip, Edge::Pressed, Action::Interact(hand));
            if effects_enabled {
                bindings.bind(
                    hand,
                    Button::Trigger,
                    Edge::Pressed,
                    Action::SpawnHandAura(hand),
                );
            }
        }
        bindings
    }

    pub fn bind(&mut self, hand: Hand, button: Button, edge: Edge, action: Action) {
        self.map.insert((hand, button, edge), action);
    }

    /// Routes one button edge. `None` means no binding: the event is
    /// discarded without effect.
    pub fn dispatch(&self, event: ButtonEvent) -> Option<Action> {
        self.map.get(&(event.hand, event.button, event.edge)).copied()
    }
}
