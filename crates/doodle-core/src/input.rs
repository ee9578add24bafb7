//! Unified pointer input for mouse, touch and pen.
//!
//! Platform events come in as [`PointerEvent`]s carrying client (viewport)
//! coordinates. The [`InputUnifier`] turns them into surface-local samples and
//! stroke boundaries, tracking a single contact at a time.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// One contact point of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Touch {
    /// Platform touch identifier, stable for the life of the contact.
    pub id: u64,
    /// Position in client coordinates.
    pub client: Point,
    /// Contact force in `[0, 1]`, where the device reports one.
    #[serde(default)]
    pub force: Option<f64>,
}

/// Platform pointer event, in client coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    MouseDown { client: Point, button: MouseButton },
    MouseMove { client: Point },
    MouseUp { client: Point, button: MouseButton },
    MouseLeave,
    /// Contacts that began with this event.
    TouchStart { changed: Vec<Touch> },
    /// Contacts that moved with this event.
    TouchMove { changed: Vec<Touch> },
    /// Contacts that lifted with this event.
    TouchEnd { changed: Vec<Touch> },
    /// Contacts the platform took away (e.g. a gesture was recognised).
    TouchCancel { changed: Vec<Touch> },
    PenDown { client: Point, pressure: f64 },
    PenMove { client: Point, pressure: f64 },
    PenUp { client: Point },
    Wheel { client: Point, delta: Vec2 },
}

impl PointerEvent {
    /// Short event name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PointerEvent::MouseDown { .. } => "mouse_down",
            PointerEvent::MouseMove { .. } => "mouse_move",
            PointerEvent::MouseUp { .. } => "mouse_up",
            PointerEvent::MouseLeave => "mouse_leave",
            PointerEvent::TouchStart { .. } => "touch_start",
            PointerEvent::TouchMove { .. } => "touch_move",
            PointerEvent::TouchEnd { .. } => "touch_end",
            PointerEvent::TouchCancel { .. } => "touch_cancel",
            PointerEvent::PenDown { .. } => "pen_down",
            PointerEvent::PenMove { .. } => "pen_move",
            PointerEvent::PenUp { .. } => "pen_up",
            PointerEvent::Wheel { .. } => "wheel",
        }
    }
}

/// A canonical input sample in logical surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub position: Point,
    #[serde(default)]
    pub pressure: Option<f64>,
}

impl Sample {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            pressure: None,
        }
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = Some(pressure);
        self
    }
}

/// Stroke boundary events fed to the brush engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeEvent {
    Start(Sample),
    Move(Sample),
    End,
}

/// Input that could not be turned into a sample.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("Unsupported input event: {0}")]
    Unsupported(&'static str),
    #[error("Malformed sample at ({x}, {y})")]
    MalformedSample { x: f64, y: f64 },
}

/// The contact currently driving a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Contact {
    Mouse,
    Pen,
    Touch(u64),
}

/// Normalizes pointer events into stroke events for one surface.
#[derive(Debug, Clone)]
pub struct InputUnifier {
    /// Surface bounding rectangle in client coordinates.
    bounds: Rect,
    /// Contact that started the active stroke, if any.
    contact: Option<Contact>,
}

impl InputUnifier {
    /// Create an unifier for a surface laid out at `bounds` (client coordinates).
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            contact: None,
        }
    }

    /// Update the surface bounding rectangle after a layout change.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Whether a contact is currently down.
    pub fn is_tracking(&self) -> bool {
        self.contact.is_some()
    }

    /// Forget the active contact without emitting an end event.
    pub fn reset(&mut self) {
        self.contact = None;
    }

    /// Process one platform event.
    ///
    /// Produces at most one stroke event. Events that belong to a contact other
    /// than the tracked one yield `Ok(None)`.
    pub fn handle(&mut self, event: &PointerEvent) -> Result<Option<StrokeEvent>, InputError> {
        match event {
            PointerEvent::MouseDown { client, button } => {
                if *button != MouseButton::Left {
                    return Err(InputError::Unsupported("non-primary mouse button"));
                }
                self.begin(Contact::Mouse, *client, None)
            }
            PointerEvent::MouseMove { client } => self.extend(Contact::Mouse, *client, None),
            PointerEvent::MouseUp { button, .. } => {
                if *button != MouseButton::Left {
                    return Ok(None);
                }
                Ok(self.finish(Contact::Mouse))
            }
            PointerEvent::MouseLeave => Ok(self.finish(Contact::Mouse)),
            PointerEvent::TouchStart { changed } => {
                if self.contact.is_some() {
                    return Ok(None);
                }
                match changed.first() {
                    Some(touch) => self.begin(Contact::Touch(touch.id), touch.client, touch.force),
                    None => Ok(None),
                }
            }
            PointerEvent::TouchMove { changed } => match self.tracked_touch(changed) {
                Some(touch) => self.extend(Contact::Touch(touch.id), touch.client, touch.force),
                None => Ok(None),
            },
            PointerEvent::TouchEnd { changed } | PointerEvent::TouchCancel { changed } => {
                match self.tracked_touch(changed) {
                    Some(touch) => Ok(self.finish(Contact::Touch(touch.id))),
                    None => Ok(None),
                }
            }
            PointerEvent::PenDown { client, pressure } => {
                self.begin(Contact::Pen, *client, Some(*pressure))
            }
            PointerEvent::PenMove { client, pressure } => {
                self.extend(Contact::Pen, *client, Some(*pressure))
            }
            PointerEvent::PenUp { .. } => Ok(self.finish(Contact::Pen)),
            PointerEvent::Wheel { .. } => Err(InputError::Unsupported("wheel")),
        }
    }

    fn begin(
        &mut self,
        contact: Contact,
        client: Point,
        pressure: Option<f64>,
    ) -> Result<Option<StrokeEvent>, InputError> {
        if self.contact.is_some() {
            return Ok(None);
        }
        let sample = self.sample(client, pressure)?;
        self.contact = Some(contact);
        Ok(Some(StrokeEvent::Start(sample)))
    }

    fn extend(
        &mut self,
        contact: Contact,
        client: Point,
        pressure: Option<f64>,
    ) -> Result<Option<StrokeEvent>, InputError> {
        if self.contact != Some(contact) {
            return Ok(None);
        }
        Ok(Some(StrokeEvent::Move(self.sample(client, pressure)?)))
    }

    fn finish(&mut self, contact: Contact) -> Option<StrokeEvent> {
        if self.contact != Some(contact) {
            return None;
        }
        self.contact = None;
        Some(StrokeEvent::End)
    }

    fn tracked_touch<'a>(&self, changed: &'a [Touch]) -> Option<&'a Touch> {
        let Some(Contact::Touch(id)) = self.contact else {
            return None;
        };
        changed.iter().find(|t| t.id == id)
    }

    /// Convert client coordinates to a surface-local sample.
    fn sample(&self, client: Point, pressure: Option<f64>) -> Result<Sample, InputError> {
        if !client.x.is_finite() || !client.y.is_finite() {
            return Err(InputError::MalformedSample {
                x: client.x,
                y: client.y,
            });
        }
        Ok(Sample {
            position: Point::new(client.x - self.bounds.x0, client.y - self.bounds.y0),
            pressure: pressure
                .filter(|p| p.is_finite())
                .map(|p| p.clamp(0.0, 1.0)),
        })
    }
}
