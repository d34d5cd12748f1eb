//! Pointer and resize input, and the listeners that receive it.
//!
//! Window events are translated into [`InputEvent`]s. They only reach the
//! puzzle if a listener of the matching [`InputKind`] is registered in
//! [`InputBindings`]. Tearing the bindings down consumes them, so every
//! listener is released exactly once.

use cgmath::Point2;
use winit::event::{ElementState, WindowEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputKind {
    PointerDown,
    PointerMove,
    PointerUp,
    Resize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown,
    /// Position in logical pixels relative to the surface's top-left corner.
    PointerMove(Point2<f64>),
    PointerUp,
    Resize { width: u32, height: u32 },
}

impl InputEvent {
    pub fn kind(&self) -> InputKind {
        match self {
            InputEvent::PointerDown => InputKind::PointerDown,
            InputEvent::PointerMove(_) => InputKind::PointerMove,
            InputEvent::PointerUp => InputKind::PointerUp,
            InputEvent::Resize { .. } => InputKind::Resize,
        }
    }

    /// Any mouse button starts or ends a drag.
    pub fn from_window_event(event: &WindowEvent, scale_factor: f64) -> Option<Self> {
        match event {
            WindowEvent::MouseInput { state, .. } => Some(match state {
                ElementState::Pressed => InputEvent::PointerDown,
                ElementState::Released => InputEvent::PointerUp,
            }),
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f64>(scale_factor);
                Some(InputEvent::PointerMove(Point2::new(logical.x, logical.y)))
            }
            WindowEvent::Resized(size) => Some(InputEvent::Resize {
                width: size.width,
                height: size.height,
            }),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

#[derive(Debug, Default)]
pub struct InputBindings {
    listeners: Vec<(ListenerHandle, InputKind)>,
    next: u64,
}

impl InputBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer down/move/up plus resize: everything the puzzle reacts to.
    pub fn puzzle_defaults() -> Self {
        let mut bindings = Self::new();
        for kind in [
            InputKind::PointerDown,
            InputKind::PointerMove,
            InputKind::PointerUp,
            InputKind::Resize,
        ] {
            bindings.register(kind);
        }
        bindings
    }

    pub fn register(&mut self, kind: InputKind) -> ListenerHandle {
        let handle = ListenerHandle(self.next);
        self.next += 1;
        self.listeners.push((handle, kind));
        log::debug!("registered {:?} listener {:?}", kind, handle);
        handle
    }

    pub fn deregister(&mut self, handle: ListenerHandle) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(registered, _)| *registered != handle);
        before != self.listeners.len()
    }

    pub fn accepts(&self, kind: InputKind) -> bool {
        self.listeners.iter().any(|(_, registered)| *registered == kind)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Releases every listener and returns how many there were.
    pub fn teardown(mut self) -> usize {
        let released = self.listeners.len();
        for (handle, kind) in self.listeners.drain(..) {
            log::debug!("released {:?} listener {:?}", kind, handle);
        }
        released
    }
}
