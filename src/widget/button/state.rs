//! ELI5:
//! ┌──────────────── State Transition Flow ──────────────────────────┐
//! │  From State  →  Event                       →  To State         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  On          →  Click (no sibling active)   →  Active           │
//! │  On          →  Click (sibling active)      →  (waiting)        │
//! │  Recharging  →  Click                       →  (waiting)        │
//! │  -------        ------                                          │
//! │  any         →  ActiveComplete              →  Recharging       │
//! │  any         →  Recharged                   →  On               │
//! └─────────────────────────────────────────────────────────────────┘
//! Off, Disabled, MouseDown and Active ignore clicks.
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(from = "String")]
pub enum ButtonState {
    /// ready to be clicked
    On,
    /// shows an empty slot
    #[default]
    Off,
    /// shown, but cannot be clicked
    Disabled,
    /// being pressed
    MouseDown,
    /// clicked, active countdown running
    Active,
    /// on a recharge timer
    Recharging,
}

impl ButtonState {
    pub const ALL: [ButtonState; 6] = [
        ButtonState::On,
        ButtonState::Off,
        ButtonState::Disabled,
        ButtonState::MouseDown,
        ButtonState::Active,
        ButtonState::Recharging,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ButtonState::On => "on",
            ButtonState::Off => "off",
            ButtonState::Disabled => "disabled",
            ButtonState::MouseDown => "mousedown",
            ButtonState::Active => "active",
            ButtonState::Recharging => "recharging",
        }
    }

    /// Unknown names fall back to `Off`.
    pub fn parse(name: &str) -> ButtonState {
        Self::ALL
            .into_iter()
            .find(|state| state.name() == name)
            .unwrap_or_else(|| {
                log::debug!("unknown button state '{}', using 'off'", name);
                ButtonState::Off
            })
    }

    /// States that run a scrim countdown.
    pub fn is_timed(self) -> bool {
        matches!(self, ButtonState::Active | ButtonState::Recharging)
    }

    pub fn transition(self, event: Event) -> Transition {
        use ButtonState::*;
        match (self, event) {
            (On, Event::Click { sibling_active: false }) => Transition::To(Active),
            (On, Event::Click { sibling_active: true }) => Transition::Wait,
            (Recharging, Event::Click { .. }) => Transition::Wait,
            (_, Event::ActiveComplete) => Transition::To(Recharging),
            (_, Event::Recharged) => Transition::To(On),
            // Off, Disabled, MouseDown, Active: clicks do nothing
            _ => Transition::Stay,
        }
    }
}

impl From<&str> for ButtonState {
    fn from(name: &str) -> Self {
        ButtonState::parse(name)
    }
}

impl From<String> for ButtonState {
    fn from(name: String) -> Self {
        ButtonState::parse(&name)
    }
}

impl fmt::Display for ButtonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub enum Event {
    Click { sibling_active: bool },
    ActiveComplete,
    Recharged,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transition {
    To(ButtonState),
    /// ask the bar to queue this button
    Wait,
    Stay,
}
