//! Motion and I/O collaborator driven by the motion primitives.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use crate::interp::Value;

/// The device (physical or simulated) that the motion primitives drive.
///
/// Headings follow the Logo convention: 0 is north and angles grow
/// clockwise.
pub trait Turtle {
    /// Moves along the current heading; negative distances move backwards.
    fn move_by(&mut self, distance: f64);
    /// Turns clockwise by `degrees`; negative turns anticlockwise.
    fn turn(&mut self, degrees: f64);
    fn set_position(&mut self, x: f64, y: f64);
    fn set_heading(&mut self, angle: f64);
    fn home(&mut self);
    /// Draws an arc of `angle` degrees around the turtle without moving it.
    fn arc(&mut self, angle: f64, radius: f64);
    /// Heading from the turtle to the point `(x, y)`.
    fn towards(&self, x: f64, y: f64) -> f64;
    fn x(&self) -> f64;
    fn y(&self) -> f64;
    fn heading(&self) -> f64;
    fn set_pen_down(&mut self, down: bool);
    fn is_pen_down(&self) -> bool;
    fn is_button_pressed(&self) -> bool;
    fn clear_screen(&mut self);
    fn wait(&mut self, seconds: f64);
    fn tone(&mut self, frequency: f64, seconds: f64);
    fn set_color(&mut self, color: &Value);
    /// True when assignments to `name` must be mirrored with `set_var`.
    fn is_io_var(&self, name: &str) -> bool;
    fn set_var(&mut self, name: &str, value: &Value);
}

/// Variable names mirrored into the simulated board.
pub const IO_VARIABLES: &[&str] = &["leftLED", "rightLED", "emitter", "rgbLED"];

/// A straight pen-down line drawn by the turtle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: (f64, f64),
    pub to: (f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency: f64,
    pub seconds: f64,
}

#[derive(Debug, Clone)]
struct TurtleState {
    x: f64,
    y: f64,
    heading: f64,
    pen_down: bool,
    button: bool,
    realtime: bool,
    elapsed: f64,
    color: Option<Value>,
    segments: Vec<Segment>,
    tones: Vec<Tone>,
    io: BTreeMap<&'static str, Value>,
}

/// In-memory turtle. Clones share state, so a host can keep a handle for
/// inspection after giving one to an interpreter.
#[derive(Debug, Clone)]
pub struct SimulatedTurtle {
    state: Rc<RefCell<TurtleState>>,
}

fn normalize(angle: f64) -> f64 {
    let angle = angle.rem_euclid(360.0);
    if angle == 360.0 {
        0.0
    } else {
        angle
    }
}

fn canonical_io_name(name: &str) -> Option<&'static str> {
    IO_VARIABLES
        .iter()
        .copied()
        .find(|io| io.eq_ignore_ascii_case(name))
}

impl SimulatedTurtle {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(TurtleState {
                x: 0.0,
                y: 0.0,
                heading: 0.0,
                pen_down: true,
                button: false,
                realtime: false,
                elapsed: 0.0,
                color: None,
                segments: Vec::new(),
                tones: Vec::new(),
                io: BTreeMap::new(),
            })),
        }
    }

    /// State reported by `buttonp`.
    pub fn with_button(self, pressed: bool) -> Self {
        self.state.borrow_mut().button = pressed;
        self
    }

    /// Makes `wait` and `tone` actually sleep.
    pub fn realtime(self, enabled: bool) -> Self {
        self.state.borrow_mut().realtime = enabled;
        self
    }

    pub fn segments(&self) -> Vec<Segment> {
        self.state.borrow().segments.clone()
    }

    pub fn tones(&self) -> Vec<Tone> {
        self.state.borrow().tones.clone()
    }

    /// Seconds spent in `wait` and `tone`.
    pub fn elapsed(&self) -> f64 {
        self.state.borrow().elapsed
    }

    pub fn color(&self) -> Option<Value> {
        self.state.borrow().color.clone()
    }

    /// Last value mirrored into the I/O variable `name`.
    pub fn io_var(&self, name: &str) -> Option<Value> {
        let key = canonical_io_name(name)?;
        self.state.borrow().io.get(key).cloned()
    }

    fn line_to(&self, x: f64, y: f64) {
        let mut state = self.state.borrow_mut();
        if state.pen_down {
            let from = (state.x, state.y);
            state.segments.push(Segment { from, to: (x, y) });
        }
        state.x = x;
        state.y = y;
    }

    fn pause(&self, seconds: f64) {
        let realtime = {
            let mut state = self.state.borrow_mut();
            state.elapsed += seconds.max(0.0);
            state.realtime
        };
        if !realtime || seconds <= 0.0 {
            return;
        }
        match Duration::try_from_secs_f64(seconds) {
            Ok(duration) => std::thread::sleep(duration),
            Err(_) => tracing::warn!(seconds, "pause too long to sleep, skipped"),
        }
    }
}

impl Default for SimulatedTurtle {
    fn default() -> Self {
        Self::new()
    }
}

impl Turtle for SimulatedTurtle {
    fn move_by(&mut self, distance: f64) {
        let (x, y) = {
            let state = self.state.borrow();
            let radians = state.heading.to_radians();
            (
                state.x + distance * radians.sin(),
                state.y + distance * radians.cos(),
            )
        };
        tracing::debug!(distance, x, y, "turtle move");
        self.line_to(x, y);
    }

    fn turn(&mut self, degrees: f64) {
        let mut state = self.state.borrow_mut();
        state.heading = normalize(state.heading + degrees);
        tracing::debug!(degrees, heading = state.heading, "turtle turn");
    }

    fn set_position(&mut self, x: f64, y: f64) {
        tracing::debug!(x, y, "turtle set position");
        self.line_to(x, y);
    }

    fn set_heading(&mut self, angle: f64) {
        let mut state = self.state.borrow_mut();
        state.heading = normalize(angle);
        tracing::debug!(heading = state.heading, "turtle set heading");
    }

    fn home(&mut self) {
        tracing::debug!("turtle home");
        self.line_to(0.0, 0.0);
        self.state.borrow_mut().heading = 0.0;
    }

    fn arc(&mut self, angle: f64, radius: f64) {
        tracing::debug!(angle, radius, "turtle arc");
        let mut state = self.state.borrow_mut();
        if !state.pen_down || angle == 0.0 {
            return;
        }

        let (cx, cy, start) = (state.x, state.y, state.heading);
        let point = |degrees: f64| {
            let radians = (start + degrees).to_radians();
            (cx + radius * radians.sin(), cy + radius * radians.cos())
        };

        // Sweeps past a full turn retrace the same circle.
        let sweep = angle.clamp(-360.0, 360.0);
        let steps = (sweep.abs() / 10.0).ceil().max(1.0) as usize;
        let step = sweep / steps as f64;
        let mut from = point(0.0);
        for i in 1..=steps {
            let to = point(step * i as f64);
            state.segments.push(Segment { from, to });
            from = to;
        }
    }

    fn towards(&self, x: f64, y: f64) -> f64 {
        let state = self.state.borrow();
        normalize((x - state.x).atan2(y - state.y).to_degrees())
    }

    fn x(&self) -> f64 {
        self.state.borrow().x
    }

    fn y(&self) -> f64 {
        self.state.borrow().y
    }

    fn heading(&self) -> f64 {
        self.state.borrow().heading
    }

    fn set_pen_down(&mut self, down: bool) {
        tracing::debug!(down, "turtle pen");
        self.state.borrow_mut().pen_down = down;
    }

    fn is_pen_down(&self) -> bool {
        self.state.borrow().pen_down
    }

    fn is_button_pressed(&self) -> bool {
        self.state.borrow().button
    }

    fn clear_screen(&mut self) {
        tracing::debug!("turtle clear screen");
        let mut state = self.state.borrow_mut();
        state.segments.clear();
        state.x = 0.0;
        state.y = 0.0;
        state.heading = 0.0;
    }

    fn wait(&mut self, seconds: f64) {
        tracing::debug!(seconds, "turtle wait");
        self.pause(seconds);
    }

    fn tone(&mut self, frequency: f64, seconds: f64) {
        tracing::debug!(frequency, seconds, "turtle tone");
        self.state
            .borrow_mut()
            .tones
            .push(Tone { frequency, seconds });
        self.pause(seconds);
    }

    fn set_color(&mut self, color: &Value) {
        tracing::debug!(%color, "turtle color");
        self.state.borrow_mut().color = Some(color.clone());
    }

    fn is_io_var(&self, name: &str) -> bool {
        canonical_io_name(name).is_some()
    }

    fn set_var(&mut self, name: &str, value: &Value) {
        if let Some(key) = canonical_io_name(name) {
            tracing::debug!(variable = key, %value, "turtle io write");
            self.state.borrow_mut().io.insert(key, value.clone());
        }
    }
}
