use std::ffi::CString;
use std::io;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use tracing::debug;
use volspace_core::{DiskSpaceError, DiskSpaceInfo};

use crate::space_from_blocks;

pub(crate) fn ensure_supported() -> Result<(), DiskSpaceError> {
    Ok(())
}

pub(crate) fn statvfs_space(path: &Path) -> Result<DiskSpaceInfo, DiskSpaceError> {
    let c_path = c_path(path)?;
    let mut stat = MaybeUninit::<libc::statvfs>::uninit();

    let ret = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
    if ret != 0 {
        let errno = io::Error::last_os_error().raw_os_error().unwrap_or(0);
        return Err(classify_errno(path, errno));
    }
    let stat = unsafe { stat.assume_init() };

    // f_blocks and f_bavail are in units of f_frsize; some filesystems leave it 0.
    let block_size = match stat.f_frsize as u64 {
        0 => stat.f_bsize as u64,
        frsize => frsize,
    };
    let space = space_from_blocks(stat.f_bavail as u64, stat.f_blocks as u64, block_size);
    debug!(
        path = %path.display(),
        free_bytes = space.free_bytes,
        total_bytes = space.total_bytes,
        block_size,
        "statvfs"
    );
    Ok(space)
}

fn c_path(path: &Path) -> Result<CString, DiskSpaceError> {
    let bytes = path.as_os_str().as_bytes();
    if bytes.is_empty() {
        return Err(DiskSpaceError::invalid_path(path, "empty path"));
    }
    CString::new(bytes).map_err(|_| DiskSpaceError::invalid_path(path, "path contains a NUL byte"))
}

fn classify_errno(path: &Path, errno: i32) -> DiskSpaceError {
    let reason = match errno {
        libc::ENOENT => "no such file or directory",
        libc::ENOTDIR => "a path component is not a directory",
        libc::ENAMETOOLONG => "path name too long",
        libc::ELOOP => "too many symbolic links",
        _ => {
            return DiskSpaceError::PlatformCallFailure {
                call: "statvfs",
                path: path.to_path_buf(),
                code: errno,
            }
        }
    };
    DiskSpaceError::invalid_path(path, reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_is_invalid() {
        let err = statvfs_space(Path::new("")).unwrap_err();
        assert!(err.is_invalid_path());
    }

    #[test]
    fn interior_nul_is_invalid() {
        let err = statvfs_space(Path::new("/tmp/a\0b")).unwrap_err();
        assert!(err.is_invalid_path());
    }

    #[test]
    fn missing_path_errnos_are_invalid_path() {
        for errno in [libc::ENOENT, libc::ENOTDIR, libc::ENAMETOOLONG, libc::ELOOP] {
            assert!(classify_errno(Path::new("/x"), errno).is_invalid_path());
        }
    }

    #[test]
    fn other_errnos_keep_the_code() {
        let err = classify_errno(Path::new("/mnt/nfs"), libc::EIO);
        assert_eq!(err.os_code(), Some(libc::EIO));
        assert!(matches!(
            err,
            DiskSpaceError::PlatformCallFailure { call: "statvfs", .. }
        ));

        let err = classify_errno(Path::new("/root/secret"), libc::EACCES);
        assert_eq!(err.os_code(), Some(libc::EACCES));
    }

    #[test]
    fn root_reports_sane_numbers() {
        let space = statvfs_space(Path::new("/")).unwrap();
        assert!(space.total_bytes > 0);
        assert!(space.free_bytes <= space.total_bytes);
    }
}
