//! WebSocket bridge. The page JS owns the socket to the game server
//! (`wss://codepath-mmorg.onrender.com`) and forwards its lifecycle into the
//! wasm module: `on_ws_open` / `on_ws_close` on the matching socket events,
//! and `on_ws_message` with each text frame copied into a buffer from
//! `alloc_buffer`. Outbound traffic goes through the `js_send_ws` import.
//! The JS side also suppresses default browser handling for the four arrow
//! keys and the plant key before events reach the canvas.

use std::cell::RefCell;

use crate::protocol::ClientMessage;

/// Transport event as observed by the game loop. The page JS owns the actual
/// WebSocket and feeds these in through the exported callbacks below; the
/// single-threaded event model serializes them with the render loop.
#[derive(Debug)]
pub enum NetEvent {
    Opened,
    Message(String),
    Closed,
}

thread_local! {
    static EVENTS: RefCell<Vec<NetEvent>> = RefCell::new(Vec::new());
}

pub struct NetworkState {
    pub connected: bool,
}

impl NetworkState {
    pub fn new() -> Self {
        NetworkState { connected: false }
    }

    /// Drain everything the bridge queued since the last frame, in arrival
    /// order.
    pub fn poll_events(&self) -> Vec<NetEvent> {
        EVENTS.with(|q| std::mem::take(&mut *q.borrow_mut()))
    }

    /// Serialize and send one command. Dropped silently while the channel is
    /// down; there is no reconnect or retry.
    pub fn send(&self, msg: &ClientMessage) {
        if !self.connected {
            return;
        }
        match serde_json::to_string(msg) {
            Ok(text) => self.send_text(&text),
            Err(err) => macroquad::logging::error!("failed to encode command: {}", err),
        }
    }

    fn send_text(&self, msg: &str) {
        #[cfg(target_arch = "wasm32")]
        {
            let bytes = msg.as_bytes();
            unsafe {
                js_send_ws(bytes.as_ptr(), bytes.len() as u32);
            }
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = msg;
        }
    }
}

#[cfg(target_arch = "wasm32")]
extern "C" {
    fn js_send_ws(ptr: *const u8, len: u32);
}

#[no_mangle]
pub extern "C" fn alloc_buffer(len: u32) -> *mut u8 {
    let mut buf = Vec::with_capacity(len as usize);
    let ptr = buf.as_mut_ptr();
    std::mem::forget(buf);
    ptr
}

#[no_mangle]
pub extern "C" fn on_ws_open() {
    EVENTS.with(|q| q.borrow_mut().push(NetEvent::Opened));
}

#[no_mangle]
pub extern "C" fn on_ws_message(ptr: *const u8, len: u32) {
    let slice = unsafe { std::slice::from_raw_parts(ptr, len as usize) };
    if let Ok(s) = std::str::from_utf8(slice) {
        EVENTS.with(|q| q.borrow_mut().push(NetEvent::Message(s.to_string())));
    }
}

#[no_mangle]
pub extern "C" fn on_ws_close() {
    EVENTS.with(|q| q.borrow_mut().push(NetEvent::Closed));
}
