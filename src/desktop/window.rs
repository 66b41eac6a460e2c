//! Foreground window query and activation

use super::{ActivationError, WindowManager};
use crate::vision::SampleError;

/// Foreground windows of the running desktop session
#[derive(Debug, Default)]
pub struct DesktopWindows;

impl DesktopWindows {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(windows)]
impl WindowManager for DesktopWindows {
    fn active_window_title(&mut self) -> Result<String, SampleError> {
        use windows::Win32::UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowTextW};

        unsafe {
            let hwnd = GetForegroundWindow();
            if hwnd.0.is_null() {
                return Ok(String::new());
            }
            let mut title_buf = [0u16; 512];
            let len = GetWindowTextW(hwnd, &mut title_buf);
            let len = usize::try_from(len).unwrap_or(0);
            Ok(String::from_utf16_lossy(&title_buf[..len]))
        }
    }

    fn bring_to_foreground(&mut self, title: &str) -> Result<(), ActivationError> {
        use windows::core::PCWSTR;
        use windows::Win32::UI::WindowsAndMessaging::{
            FindWindowW, SetForegroundWindow, ShowWindow, SW_SHOWNORMAL,
        };

        let wide: Vec<u16> = title.encode_utf16().chain(std::iter::once(0)).collect();
        unsafe {
            let hwnd = FindWindowW(PCWSTR::null(), PCWSTR(wide.as_ptr()))
                .map_err(|_| ActivationError::NotFound(title.to_string()))?;
            if hwnd.0.is_null() {
                return Err(ActivationError::NotFound(title.to_string()));
            }
            let raised = SetForegroundWindow(hwnd).as_bool();
            let _ = ShowWindow(hwnd, SW_SHOWNORMAL);
            if raised {
                Ok(())
            } else {
                Err(ActivationError::Refused(title.to_string()))
            }
        }
    }
}

#[cfg(not(windows))]
impl WindowManager for DesktopWindows {
    fn active_window_title(&mut self) -> Result<String, SampleError> {
        let windows =
            xcap::Window::all().map_err(|e| SampleError::WindowQuery(e.to_string()))?;
        for window in windows {
            if window.is_focused().unwrap_or(false) {
                return window
                    .title()
                    .map_err(|e| SampleError::WindowQuery(e.to_string()));
            }
        }
        Ok(String::new())
    }

    fn bring_to_foreground(&mut self, _title: &str) -> Result<(), ActivationError> {
        Err(ActivationError::Unsupported)
    }
}
