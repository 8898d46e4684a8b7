//! 事件系统模块
//!
//! 提供窗口与应用逻辑之间的事件分发机制。
//!
//! # 设计说明
//!
//! - **和类型而非继承**：`Event` 是一个枚举，每个变体内联携带自己的负载。
//!   事件类别由变体本身决定，`event_type()` 不可能与负载不一致。
//! - **分发表**：`EventDispatcher` 持有一个长度为 `EventType::COUNT` 的定长数组，
//!   每个类别至多一个监听器。重复注册会覆盖旧的监听器，而不是形成链。
//! - **类型化注册**：`add_listener::<T>` 中的 `T` 通过 `TypedEvent::TYPE`
//!   声明自己的类别，监听器直接拿到 `&T`，由模式匹配完成"向下转换"。
//!
//! # 使用示例
//!
//! ```
//! use engine_core::core::event::*;
//!
//! let mut dispatcher = EventDispatcher::new();
//!
//! dispatcher.add_listener(|e: &WindowResizeEvent| {
//!     println!("窗口调整为: {}x{}", e.width, e.height);
//! });
//!
//! dispatcher.dispatch(&Event::from(WindowResizeEvent::new(1920, 1080)));
//!
//! // 未注册监听器的类别：静默忽略
//! dispatcher.dispatch(&Event::from(WindowCloseEvent::new()));
//! ```

use std::fmt;

use tracing::{debug, trace};

/// 事件类别
///
/// 纯粹作为分发表的下标使用，判别值从 0 开始连续编号。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(usize)]
pub enum EventType {
    /// 窗口调整大小
    WindowResize = 0,

    /// 窗口关闭请求
    WindowClose,

    /// 键盘按键
    KeyPress,

    /// 鼠标移动
    MouseMove,

    /// 鼠标按键
    MouseButton,
}

impl EventType {
    /// 事件类别的数量，也是分发表的长度
    pub const COUNT: usize = 5;

    /// 按下标顺序列出的全部事件类别
    pub const ALL: [EventType; EventType::COUNT] = [
        EventType::WindowResize,
        EventType::WindowClose,
        EventType::KeyPress,
        EventType::MouseMove,
        EventType::MouseButton,
    ];

    /// 在分发表中的下标
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 获取事件类型的名称，用于日志记录和调试
    pub fn name(&self) -> &'static str {
        match self {
            EventType::WindowResize => "WindowResize",
            EventType::WindowClose => "WindowClose",
            EventType::KeyPress => "KeyPress",
            EventType::MouseMove => "MouseMove",
            EventType::MouseButton => "MouseButton",
        }
    }
}

// 新增类别时忘记更新 COUNT 或 ALL 会在编译期失败
const _: () = {
    let mut i = 0;
    while i < EventType::COUNT {
        assert!(EventType::ALL[i].index() == i);
        i += 1;
    }
    assert!(EventType::MouseButton.index() + 1 == EventType::COUNT);
};

/// 鼠标按钮
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,

    /// 其他按钮（如侧键），参数为平台给出的按钮编号
    Other(u16),
}

/// 键盘按键（简化版本）
///
/// 仅列出常用按键，其余按键统一为 `Unknown`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    W,
    A,
    S,
    D,
    Space,
    Escape,
    Enter,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Unknown,
}

/// 按键动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Press,
    Release,

    /// 按住不放时系统产生的重复按下
    Repeat,
}

/// 窗口调整大小事件
///
/// 宽高为窗口客户区域的像素尺寸。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowResizeEvent {
    pub width: u16,
    pub height: u16,
}

impl WindowResizeEvent {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// 窗口关闭请求事件（无负载）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowCloseEvent;

impl WindowCloseEvent {
    pub fn new() -> Self {
        Self
    }
}

/// 鼠标移动事件
///
/// 坐标为相对窗口客户区左上角的光标位置。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseMoveEvent {
    pub x: f64,
    pub y: f64,
}

impl MouseMoveEvent {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 键盘按键事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPressEvent {
    pub key: KeyCode,
    pub action: KeyAction,
}

impl KeyPressEvent {
    pub fn new(key: KeyCode, action: KeyAction) -> Self {
        Self { key, action }
    }

    pub fn is_pressed(&self) -> bool {
        matches!(self.action, KeyAction::Press | KeyAction::Repeat)
    }
}

/// 鼠标按键事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseButtonEvent {
    pub button: MouseButton,
    pub pressed: bool,
}

impl MouseButtonEvent {
    pub fn pressed(button: MouseButton) -> Self {
        Self { button, pressed: true }
    }

    pub fn released(button: MouseButton) -> Self {
        Self { button, pressed: false }
    }
}

/// 事件
///
/// 一次发生的瞬时值对象，只在一次 `dispatch` 调用期间存在。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    WindowResize(WindowResizeEvent),
    WindowClose(WindowCloseEvent),
    KeyPress(KeyPressEvent),
    MouseMove(MouseMoveEvent),
    MouseButton(MouseButtonEvent),
}

impl Event {
    /// 事件所属的类别
    pub fn event_type(&self) -> EventType {
        match self {
            Event::WindowResize(_) => EventType::WindowResize,
            Event::WindowClose(_) => EventType::WindowClose,
            Event::KeyPress(_) => EventType::KeyPress,
            Event::MouseMove(_) => EventType::MouseMove,
            Event::MouseButton(_) => EventType::MouseButton,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::WindowResize(e) => write!(f, "WindowResize: {}x{}", e.width, e.height),
            Event::WindowClose(_) => write!(f, "WindowClose"),
            Event::KeyPress(e) => write!(f, "KeyPress: {:?} ({:?})", e.key, e.action),
            Event::MouseMove(e) => write!(f, "MouseMove: ({:.1}, {:.1})", e.x, e.y),
            Event::MouseButton(e) => {
                let state = if e.pressed { "pressed" } else { "released" };
                write!(f, "MouseButton: {:?} {}", e.button, state)
            }
        }
    }
}

/// 具体事件负载类型
///
/// 每个负载类型声明自己的类别常量，并能从 `Event` 中取出自身。
/// 分发器依赖 `from_event` 与 `TYPE` 的一致性：
/// 对 `TYPE` 类别的事件，`from_event` 必须返回 `Some`。
pub trait TypedEvent: Sized + 'static {
    const TYPE: EventType;

    fn from_event(event: &Event) -> Option<&Self>;
}

macro_rules! typed_event {
    ($payload:ty, $variant:ident) => {
        impl TypedEvent for $payload {
            const TYPE: EventType = EventType::$variant;

            fn from_event(event: &Event) -> Option<&Self> {
                match event {
                    Event::$variant(e) => Some(e),
                    _ => None,
                }
            }
        }

        impl From<$payload> for Event {
            fn from(e: $payload) -> Self {
                Event::$variant(e)
            }
        }
    };
}

typed_event!(WindowResizeEvent, WindowResize);
typed_event!(WindowCloseEvent, WindowClose);
typed_event!(KeyPressEvent, KeyPress);
typed_event!(MouseMoveEvent, MouseMove);
typed_event!(MouseButtonEvent, MouseButton);

/// 事件回调，窗口通过它把事件交给所有者
pub type EventCallback = Box<dyn FnMut(&Event)>;

type Listener = Box<dyn FnMut(&Event)>;

/// 事件分发器
///
/// 每个事件类别对应分发表中的一个槽位，槽位中至多一个监听器：
///
/// - 再次为同一类别注册会**替换**旧监听器，不会同时调用两者；
/// - 对没有监听器的类别调用 `dispatch` 是无操作，不是错误；
/// - 监听器在 `dispatch` 调用内同步执行。
///
/// `dispatch` 需要 `&mut self`，因此监听器无法在同一调用栈上
/// 对同一个分发器再次分发。
pub struct EventDispatcher {
    listeners: [Option<Listener>; EventType::COUNT],
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            listeners: std::array::from_fn(|_| None),
        }
    }

    /// 为 `T` 所声明的类别注册监听器
    ///
    /// # 示例
    ///
    /// ```
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    /// use engine_core::core::event::*;
    ///
    /// let closed = Rc::new(Cell::new(false));
    /// let flag = closed.clone();
    ///
    /// let mut dispatcher = EventDispatcher::new();
    /// dispatcher.add_listener(move |_: &WindowCloseEvent| flag.set(true));
    ///
    /// dispatcher.dispatch(&Event::from(WindowCloseEvent::new()));
    /// assert!(closed.get());
    /// ```
    pub fn add_listener<T, F>(&mut self, mut callback: F)
    where
        T: TypedEvent,
        F: FnMut(&T) + 'static,
    {
        let slot = &mut self.listeners[T::TYPE.index()];
        if slot.is_some() {
            debug!(event_type = T::TYPE.name(), "Replacing existing event listener");
        }

        *slot = Some(Box::new(move |event: &Event| {
            if let Some(e) = T::from_event(event) {
                callback(e);
            }
        }));
    }

    /// 移除某个类别的监听器，返回此前是否存在
    pub fn remove_listener(&mut self, event_type: EventType) -> bool {
        self.listeners[event_type.index()].take().is_some()
    }

    /// 某个类别当前是否有监听器
    pub fn has_listener(&self, event_type: EventType) -> bool {
        self.listeners[event_type.index()].is_some()
    }

    /// 分发表的长度，恒等于 `EventType::COUNT`
    pub fn capacity(&self) -> usize {
        self.listeners.len()
    }

    /// 分发事件
    ///
    /// 查找事件类别对应的监听器并同步调用；没有监听器时什么也不做。
    pub fn dispatch(&mut self, event: &Event) {
        match self.listeners[event.event_type().index()].as_mut() {
            Some(listener) => listener(event),
            None => trace!(event = %event, "No listener registered"),
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered: Vec<&'static str> = EventType::ALL
            .iter()
            .filter(|t| self.has_listener(**t))
            .map(|t| t.name())
            .collect();
        f.debug_struct("EventDispatcher")
            .field("registered", &registered)
            .finish()
    }
}
