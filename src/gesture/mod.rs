//! Pointer gesture recognition
//!
//! Turns raw button and motion events into gestures. Each button runs its
//! own state machine:
//!
//! ```text
//! Idle --press--> Pressed --move > drag threshold--> Dragging --release--> Idle (DragEnd)
//!                    |                                   |
//!                    +--release--> Idle (Click)          +--move > rectangle threshold
//!                                                            (rectangle button only)
//!                                                            --> Rectangle --release--> Idle
//!                                                                                (RectangleSelect)
//! ```
//!
//! The recognizer never touches a document; the editor decides what a gesture
//! means for the active tool.

use serde::{Deserialize, Serialize};

use crate::selection::Rect;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub const ALL: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

    fn index(self) -> usize {
        match self {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    Press { button: MouseButton, at: Point },
    /// Released without moving past the drag threshold
    Click { button: MouseButton, at: Point },
    DragStart { button: MouseButton, start: Point, at: Point },
    Drag { button: MouseButton, start: Point, at: Point },
    DragEnd { button: MouseButton, start: Point, at: Point },
    RectangleStart { start: Point },
    RectangleUpdate { rect: Rect },
    RectangleSelect { rect: Rect },
    /// An in-progress gesture was abandoned
    Cancelled { button: MouseButton },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Pressed,
    Dragging,
    Rectangle,
}

#[derive(Clone, Copy, Debug, Default)]
struct ButtonState {
    phase: Phase,
    start: Point,
    last: Point,
    pressed_at_ms: u64,
}

/// Thresholds in pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureConfig {
    pub drag_threshold: f64,
    pub rectangle_threshold: f64,
    /// Button that may enter rectangle selection; `None` disables it
    pub rectangle_button: Option<MouseButton>,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 3.0,
            rectangle_threshold: 10.0,
            rectangle_button: Some(MouseButton::Left),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GestureRecognizer {
    config: GestureConfig,
    buttons: [ButtonState; 3],
    shift: bool,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self { config, buttons: [ButtonState::default(); 3], shift: false }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Change which button may start a rectangle. Takes effect on the next press.
    pub fn set_rectangle_button(&mut self, button: Option<MouseButton>) {
        self.config.rectangle_button = button;
    }

    pub fn set_shift(&mut self, shift: bool) {
        self.shift = shift;
    }

    pub fn shift(&self) -> bool {
        self.shift
    }

    pub fn phase(&self, button: MouseButton) -> Phase {
        self.buttons[button.index()].phase
    }

    pub fn pressed_at(&self, button: MouseButton) -> Option<u64> {
        let state = &self.buttons[button.index()];
        (state.phase != Phase::Idle).then_some(state.pressed_at_ms)
    }

    pub fn is_idle(&self) -> bool {
        self.buttons.iter().all(|b| b.phase == Phase::Idle)
    }

    pub fn press(&mut self, button: MouseButton, x: f64, y: f64, timestamp_ms: u64) -> Vec<Gesture> {
        let at = Point::new(x, y);
        let state = &mut self.buttons[button.index()];
        if state.phase != Phase::Idle {
            log::debug!("{:?} pressed again without a release, restarting", button);
        }
        *state = ButtonState { phase: Phase::Pressed, start: at, last: at, pressed_at_ms: timestamp_ms };
        log::debug!("{:?} pressed at ({}, {}), shift={}", button, x, y, self.shift);
        vec![Gesture::Press { button, at }]
    }

    /// Pointer motion, applied to every held button
    pub fn motion(&mut self, x: f64, y: f64) -> Vec<Gesture> {
        let at = Point::new(x, y);
        let mut gestures = Vec::new();
        for button in MouseButton::ALL {
            self.advance(button, at, &mut gestures);
        }
        gestures
    }

    pub fn release(&mut self, button: MouseButton, x: f64, y: f64) -> Vec<Gesture> {
        let at = Point::new(x, y);
        let mut gestures = Vec::new();
        if self.buttons[button.index()].phase == Phase::Idle {
            return gestures;
        }

        // The release position counts as a final move
        self.advance(button, at, &mut gestures);

        let state = std::mem::take(&mut self.buttons[button.index()]);
        let finished = match state.phase {
            Phase::Idle => return gestures,
            Phase::Pressed => Gesture::Click { button, at },
            Phase::Dragging => Gesture::DragEnd { button, start: state.start, at },
            Phase::Rectangle => Gesture::RectangleSelect {
                rect: Rect::from_corners(state.start.x, state.start.y, at.x, at.y),
            },
        };
        log::debug!("{:?} released: {:?}", button, finished);
        gestures.push(finished);
        gestures
    }

    /// Abandon every in-progress gesture
    pub fn cancel(&mut self) -> Vec<Gesture> {
        let mut gestures = Vec::new();
        for button in MouseButton::ALL {
            let state = &mut self.buttons[button.index()];
            if state.phase != Phase::Idle {
                *state = ButtonState::default();
                gestures.push(Gesture::Cancelled { button });
            }
        }
        gestures
    }

    fn advance(&mut self, button: MouseButton, at: Point, out: &mut Vec<Gesture>) {
        let config = self.config;
        let state = &mut self.buttons[button.index()];
        if state.phase == Phase::Idle || state.last == at {
            return;
        }
        state.last = at;
        let start = state.start;
        let distance = start.distance(at);
        let rectangle_allowed = config.rectangle_button == Some(button);

        if state.phase == Phase::Pressed && distance > config.drag_threshold {
            state.phase = Phase::Dragging;
            out.push(Gesture::DragStart { button, start, at });
            log::debug!("{:?} drag started", button);
        } else if state.phase == Phase::Dragging && !(rectangle_allowed && distance > config.rectangle_threshold) {
            out.push(Gesture::Drag { button, start, at });
        }

        if state.phase == Phase::Dragging && rectangle_allowed && distance > config.rectangle_threshold {
            state.phase = Phase::Rectangle;
            out.push(Gesture::RectangleStart { start });
            log::debug!("{:?} entered rectangle selection", button);
        }

        if state.phase == Phase::Rectangle {
            out.push(Gesture::RectangleUpdate { rect: Rect::from_corners(start.x, start.y, at.x, at.y) });
        }
    }
}
