//! Translation of winit window events into engine events
//!
//! The window collaborator receives low-level platform callbacks from winit and
//! turns the ones the engine cares about into an [`Event`] before handing them
//! to its event sink. Everything else (focus, IME, touch...) is ignored.

use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

use crate::core::event::{
    Event, KeyAction, KeyCode, KeyPressEvent, MouseButton, MouseButtonEvent, MouseMoveEvent,
    WindowCloseEvent, WindowResizeEvent,
};

/// Translate a winit window event, returning `None` for events the engine does not model
pub fn translate_window_event(event: &WindowEvent) -> Option<Event> {
    match event {
        WindowEvent::Resized(size) => Some(resize_event(*size)),
        WindowEvent::CloseRequested => Some(WindowCloseEvent::new().into()),
        WindowEvent::CursorMoved { position, .. } => Some(cursor_event(*position)),
        WindowEvent::KeyboardInput { event, .. } => {
            Some(key_event(event.physical_key, event.state, event.repeat))
        }
        WindowEvent::MouseInput { state, button, .. } => Some(mouse_button_event(*button, *state)),
        _ => None,
    }
}

/// Resize payloads are u16; larger platform sizes saturate
pub fn resize_event(size: PhysicalSize<u32>) -> Event {
    let width = u16::try_from(size.width).unwrap_or(u16::MAX);
    let height = u16::try_from(size.height).unwrap_or(u16::MAX);
    WindowResizeEvent::new(width, height).into()
}

pub fn cursor_event(position: PhysicalPosition<f64>) -> Event {
    MouseMoveEvent::new(position.x, position.y).into()
}

pub fn key_event(key: PhysicalKey, state: ElementState, repeat: bool) -> Event {
    let action = match (state, repeat) {
        (ElementState::Pressed, false) => KeyAction::Press,
        (ElementState::Pressed, true) => KeyAction::Repeat,
        (ElementState::Released, _) => KeyAction::Release,
    };
    KeyPressEvent::new(map_key(key), action).into()
}

pub fn mouse_button_event(button: WinitMouseButton, state: ElementState) -> Event {
    let button = map_mouse_button(button);
    match state {
        ElementState::Pressed => MouseButtonEvent::pressed(button).into(),
        ElementState::Released => MouseButtonEvent::released(button).into(),
    }
}

fn map_key(key: PhysicalKey) -> KeyCode {
    let PhysicalKey::Code(code) = key else {
        return KeyCode::Unknown;
    };

    match code {
        WinitKeyCode::KeyW => KeyCode::W,
        WinitKeyCode::KeyA => KeyCode::A,
        WinitKeyCode::KeyS => KeyCode::S,
        WinitKeyCode::KeyD => KeyCode::D,
        WinitKeyCode::Space => KeyCode::Space,
        WinitKeyCode::Escape => KeyCode::Escape,
        WinitKeyCode::Enter | WinitKeyCode::NumpadEnter => KeyCode::Enter,
        WinitKeyCode::F1 => KeyCode::F1,
        WinitKeyCode::F2 => KeyCode::F2,
        WinitKeyCode::F3 => KeyCode::F3,
        WinitKeyCode::F4 => KeyCode::F4,
        WinitKeyCode::F5 => KeyCode::F5,
        WinitKeyCode::F6 => KeyCode::F6,
        WinitKeyCode::F7 => KeyCode::F7,
        WinitKeyCode::F8 => KeyCode::F8,
        WinitKeyCode::F9 => KeyCode::F9,
        WinitKeyCode::F10 => KeyCode::F10,
        WinitKeyCode::F11 => KeyCode::F11,
        WinitKeyCode::F12 => KeyCode::F12,
        _ => KeyCode::Unknown,
    }
}

fn map_mouse_button(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Other(3),
        WinitMouseButton::Forward => MouseButton::Other(4),
        WinitMouseButton::Other(n) => MouseButton::Other(n),
    }
}
