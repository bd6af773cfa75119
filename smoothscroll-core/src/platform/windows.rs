//! Win32 backend: a `WH_MOUSE_LL` low-level mouse hook pumped on a
//! dedicated thread, foreground-process lookup via
//! `GetForegroundWindow`/`OpenProcess`/`QueryFullProcessImageNameW`, and
//! synthetic-event injection via `SendInput`. Structured the same way as
//! the teacher crate's own `windows/eventloop.rs`: a message-only loop
//! around `GetMessageW`, a thread-confined callback reached through a
//! `thread_local!` rather than a user-data pointer (`SetWindowsHookExW`'s
//! callback type has no room for one).

use std::cell::RefCell;
use std::mem::MaybeUninit;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr::null_mut;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use log::{error, trace, warn};
use winapi::shared::minwindef::{DWORD, LPARAM, LRESULT, WPARAM};
use winapi::shared::windef::HHOOK;
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::handleapi::CloseHandle;
use winapi::um::libloaderapi::GetModuleHandleW;
use winapi::um::processthreadsapi::{GetCurrentThreadId, OpenProcess, QueryFullProcessImageNameW};
use winapi::um::winnt::PROCESS_QUERY_LIMITED_INFORMATION;
use winapi::um::winuser::{
    CallNextHookEx, DispatchMessageW, GetAsyncKeyState, GetForegroundWindow, GetMessageW,
    GetWindowThreadProcessId, PostThreadMessageW, SendInput, SetWindowsHookExW, TranslateMessage,
    UnhookWindowsHookEx, INPUT_u, GET_WHEEL_DELTA_WPARAM, INPUT, INPUT_MOUSE, MOUSEEVENTF_HWHEEL,
    MOUSEEVENTF_WHEEL, MOUSEINPUT, MSLLHOOKSTRUCT, VK_CONTROL, VK_SHIFT, WH_MOUSE_LL, WM_MOUSEHWHEEL,
    WM_MOUSEWHEEL, WM_QUIT,
};

use super::{Platform, StopHandle};
use crate::axis::{Axis, Emitter};
use crate::clock::{Clock, SystemClock};
use crate::error::EngineError;
use crate::hook::{Decision, Dispatcher, WheelEvent, SELF_INJECTION_MARKER};
use crate::process::ProcessLookup;

pub struct WindowsPlatform;

impl Platform for WindowsPlatform {
    fn process_lookup(&self) -> Box<dyn ProcessLookup> {
        Box::new(Win32ProcessLookup)
    }

    fn emitter(&self) -> Arc<dyn Emitter> {
        Arc::new(Win32Emitter)
    }

    fn run_hook_worker(
        &self,
        dispatcher: Dispatcher,
        ready: Sender<Result<Box<dyn StopHandle>, EngineError>>,
    ) {
        DISPATCHER.with(|cell| *cell.borrow_mut() = Some(dispatcher));

        let hinstance = unsafe { GetModuleHandleW(null_mut()) };
        let hhook = unsafe { SetWindowsHookExW(WH_MOUSE_LL, Some(hook_proc), hinstance, 0) };

        if hhook.is_null() {
            let code = unsafe { GetLastError() };
            error!("SetWindowsHookExW failed: 0x{code:08x}");
            DISPATCHER.with(|cell| *cell.borrow_mut() = None);
            let _ = ready.send(Err(EngineError::HookInstallFailed(code)));
            return;
        }

        let thread_id = unsafe { GetCurrentThreadId() };
        if ready
            .send(Ok(Box::new(WindowsStopHandle { thread_id })))
            .is_err()
        {
            // The façade gave up on us already; unhook and bail.
            unsafe { UnhookWindowsHookEx(hhook) };
            DISPATCHER.with(|cell| *cell.borrow_mut() = None);
            return;
        }

        pump_messages();

        unsafe { UnhookWindowsHookEx(hhook) };
        DISPATCHER.with(|cell| *cell.borrow_mut() = None);
    }
}

fn pump_messages() {
    loop {
        let mut msg = MaybeUninit::uninit();
        match unsafe { GetMessageW(msg.as_mut_ptr(), null_mut(), 0, 0) } {
            0 => return,  // WM_QUIT
            -1 => {
                error!("GetMessageW failed, tearing down the hook worker");
                return;
            }
            _ => unsafe {
                TranslateMessage(msg.as_ptr());
                DispatchMessageW(msg.as_ptr());
            },
        }
    }
}

struct WindowsStopHandle {
    thread_id: DWORD,
}

impl StopHandle for WindowsStopHandle {
    fn request_stop(&self) {
        unsafe {
            PostThreadMessageW(self.thread_id, WM_QUIT, 0, 0);
        }
    }
}

thread_local! {
    /// The hook worker's `Dispatcher`. `SetWindowsHookExW`'s callback has
    /// no slot for user data, and the callback only ever runs on the
    /// thread that installed the hook, so a thread-confined cell is the
    /// simplest correct way to reach it.
    static DISPATCHER: RefCell<Option<Dispatcher>> = const { RefCell::new(None) };
}

extern "system" fn hook_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code < 0 {
        return unsafe { CallNextHookEx(null_mut(), code, wparam, lparam) };
    }

    let msg = wparam as DWORD;
    if msg != WM_MOUSEWHEEL && msg != WM_MOUSEHWHEEL {
        return unsafe { CallNextHookEx(null_mut(), code, wparam, lparam) };
    }

    let data = unsafe { &*(lparam as *const MSLLHOOKSTRUCT) };
    let raw_delta = GET_WHEEL_DELTA_WPARAM(data.mouseData as usize) as i16;
    let ctrl_held = unsafe { GetAsyncKeyState(VK_CONTROL) } as u16 & 0x8000 != 0;
    let shift_held = unsafe { GetAsyncKeyState(VK_SHIFT) } as u16 & 0x8000 != 0;

    let event = WheelEvent {
        raw_delta,
        is_vertical: msg == WM_MOUSEWHEEL,
        ctrl_held,
        shift_held,
        extra_info: data.dwExtraInfo,
    };

    let decision = DISPATCHER.with(|cell| {
        let mut guard = cell.borrow_mut();
        let Some(dispatcher) = guard.as_mut() else {
            return Decision::Pass;
        };

        let now_ms = SystemClock.now_ms();

        // Spec §7: "any exception during per-event processing must be
        // caught and converted to PASS; the hook must never raise out to
        // the OS." `catch_unwind` is the mechanism for that boundary.
        catch_unwind(AssertUnwindSafe(|| dispatcher.handle_event(event, now_ms))).unwrap_or_else(
            |_| {
                warn!("panic in wheel event handler, passing the event through");
                Decision::Pass
            },
        )
    });

    match decision {
        Decision::Pass => unsafe { CallNextHookEx(null_mut(), code, wparam, lparam) },
        Decision::Drop => {
            trace!("dropped wheel event, delta={raw_delta}");
            1
        }
    }
}

struct Win32ProcessLookup;

impl ProcessLookup for Win32ProcessLookup {
    fn foreground_pid(&self) -> Option<u32> {
        let hwnd = unsafe { GetForegroundWindow() };
        if hwnd.is_null() {
            return None;
        }
        let mut pid: DWORD = 0;
        let result = unsafe { GetWindowThreadProcessId(hwnd, &mut pid) };
        if result == 0 || pid == 0 {
            None
        } else {
            Some(pid)
        }
    }

    fn image_path(&self, pid: u32) -> Option<String> {
        let handle =
            unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid) };
        if handle.is_null() {
            return None;
        }

        let mut buf = [0u16; 1024];
        let mut size = buf.len() as DWORD;
        let ok = unsafe {
            QueryFullProcessImageNameW(handle, 0, buf.as_mut_ptr(), &mut size)
        };
        unsafe { CloseHandle(handle) };

        if ok == 0 {
            return None;
        }

        Some(String::from_utf16_lossy(&buf[..size as usize]))
    }
}

struct Win32Emitter;

impl Emitter for Win32Emitter {
    fn emit(&self, axis: Axis, delta: i32) {
        let flags = match axis {
            Axis::Vertical => MOUSEEVENTF_WHEEL,
            Axis::Horizontal => MOUSEEVENTF_HWHEEL,
        };

        let mut mouse_input: MOUSEINPUT = unsafe { std::mem::zeroed() };
        mouse_input.dwFlags = flags;
        mouse_input.mouseData = delta as i32 as u32;
        mouse_input.dwExtraInfo = SELF_INJECTION_MARKER;

        let mut input_union: INPUT_u = unsafe { std::mem::zeroed() };
        unsafe {
            *input_union.mi_mut() = mouse_input;
        }

        let mut input = INPUT {
            type_: INPUT_MOUSE,
            u: input_union,
        };

        let sent = unsafe { SendInput(1, &mut input, std::mem::size_of::<INPUT>() as i32) };
        if sent != 1 {
            warn!("SendInput failed to deliver a synthetic wheel event");
        }
    }
}
