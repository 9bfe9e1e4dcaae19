use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use tracing::debug;
use volspace_core::{DiskSpaceError, DiskSpaceInfo};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{
    ERROR_BAD_NETPATH, ERROR_BAD_NET_NAME, ERROR_FILE_NOT_FOUND, ERROR_INVALID_DRIVE,
    ERROR_INVALID_NAME, ERROR_PATH_NOT_FOUND,
};
use windows::Win32::Storage::FileSystem::GetDiskFreeSpaceExW;

pub(crate) fn ensure_supported() -> Result<(), DiskSpaceError> {
    Ok(())
}

pub(crate) fn volume_space(path: &Path) -> Result<DiskSpaceInfo, DiskSpaceError> {
    let wide = wide(path)?;
    let mut free_to_caller = 0u64;
    let mut total = 0u64;
    let mut total_free = 0u64;
    let result = unsafe {
        GetDiskFreeSpaceExW(
            PCWSTR(wide.as_ptr()),
            Some(&mut free_to_caller as *mut u64),
            Some(&mut total as *mut u64),
            Some(&mut total_free as *mut u64),
        )
    };
    if let Err(err) = result {
        return Err(classify_win32(path, win32_code(&err)));
    }

    debug!(
        path = %path.display(),
        free_bytes = free_to_caller,
        total_bytes = total,
        volume_free_bytes = total_free,
        "GetDiskFreeSpaceExW"
    );
    // Quota-aware figure, not the volume-wide total_free.
    Ok(DiskSpaceInfo::new(free_to_caller, total))
}

fn wide(path: &Path) -> Result<Vec<u16>, DiskSpaceError> {
    let os = path.as_os_str();
    if os.is_empty() {
        return Err(DiskSpaceError::invalid_path(path, "empty path"));
    }
    let mut wide: Vec<u16> = os.encode_wide().collect();
    if wide.contains(&0) {
        return Err(DiskSpaceError::invalid_path(path, "path contains a NUL character"));
    }
    wide.push(0);
    Ok(wide)
}

/// Recovers the Win32 error code wrapped in an `HRESULT_FROM_WIN32` value.
fn win32_code(err: &windows::core::Error) -> i32 {
    let hresult = err.code().0 as u32;
    if hresult & 0xFFFF_0000 == 0x8007_0000 {
        (hresult & 0xFFFF) as i32
    } else {
        hresult as i32
    }
}

fn classify_win32(path: &Path, code: i32) -> DiskSpaceError {
    let reason = match code as u32 {
        c if c == ERROR_FILE_NOT_FOUND.0 => "file not found",
        c if c == ERROR_PATH_NOT_FOUND.0 => "path not found",
        c if c == ERROR_INVALID_NAME.0 => "invalid name",
        c if c == ERROR_INVALID_DRIVE.0 => "invalid drive",
        c if c == ERROR_BAD_NETPATH.0 || c == ERROR_BAD_NET_NAME.0 => "network path not found",
        _ => {
            return DiskSpaceError::PlatformCallFailure {
                call: "GetDiskFreeSpaceExW",
                path: path.to_path_buf(),
                code,
            }
        }
    };
    DiskSpaceError::invalid_path(path, reason)
}
