//! OS-level backing for the ring: a named shared-memory object mapped
//! read-write into the process.
//!
//! Both backings expose the same surface: `create` brings the named object
//! into existence (or re-opens and re-sizes it) and maps it, `open`
//! attaches to an existing object, and dropping the handle unmaps the
//! region and releases the OS handle. The handle exclusively owns its
//! mapping; transfer is a move. Neither backing removes the name itself:
//! on POSIX the object persists until something unlinks it, on Windows it
//! lives as long as any process holds a handle.

#[cfg(unix)]
mod posix {
    use crate::errors::RingError;
    use memmap2::{MmapMut, MmapOptions};
    use nix::libc;
    use std::ffi::CString;
    use std::fs::File;
    use std::io;
    use std::os::fd::FromRawFd;

    /// A mapped POSIX shared-memory object (`shm_open` + `mmap`).
    #[derive(Debug)]
    pub struct SharedRegion {
        // Keeps the descriptor open for the lifetime of the mapping.
        _file: File,
        mmap: MmapMut,
    }

    fn shm_name(name: &str) -> Result<CString, RingError> {
        CString::new(name).map_err(|_| {
            RingError::InvalidArgument(format!("shared memory name {:?} contains NUL", name))
        })
    }

    impl SharedRegion {
        /// Create (or re-open and re-size) the named object and map `total`
        /// bytes of it read-write.
        ///
        /// The object is created with owner-only permissions (0600). If the
        /// descriptor is obtained but sizing or mapping fails, the
        /// descriptor is closed before the error is returned.
        pub fn create(name: &str, total: usize) -> Result<Self, RingError> {
            let c_name = shm_name(name)?;

            let fd = unsafe {
                libc::shm_open(c_name.as_ptr(), libc::O_CREAT | libc::O_RDWR, 0o600)
            };
            if fd < 0 {
                return Err(RingError::ResourceCreateFailed(io::Error::last_os_error()));
            }
            // From here on the File owns the descriptor; every early return
            // below closes it.
            let file = unsafe { File::from_raw_fd(fd) };

            file.set_len(total as u64)
                .map_err(|source| RingError::SizingFailed { total, source })?;

            let mmap = unsafe { MmapOptions::new().len(total).map_mut(&file) }
                .map_err(RingError::MapFailed)?;

            tracing::debug!(name, total, "created shared memory region");

            Ok(Self { _file: file, mmap })
        }

        /// Attach to an existing named object and map `total` bytes of it
        /// read-write.
        pub fn open(name: &str, total: usize) -> Result<Self, RingError> {
            let c_name = shm_name(name)?;

            let fd = unsafe { libc::shm_open(c_name.as_ptr(), libc::O_RDWR, 0o600) };
            if fd < 0 {
                return Err(RingError::ResourceOpenFailed(io::Error::last_os_error()));
            }
            let file = unsafe { File::from_raw_fd(fd) };

            // Mapping past the end of the object would fault on first
            // access, so check the recorded size up front.
            let len = file
                .metadata()
                .map_err(RingError::ResourceOpenFailed)?
                .len();
            if len < total as u64 {
                return Err(RingError::ResourceOpenFailed(io::Error::other(format!(
                    "object is {} bytes, expected at least {}",
                    len, total
                ))));
            }

            let mmap = unsafe { MmapOptions::new().len(total).map_mut(&file) }
                .map_err(RingError::MapFailed)?;

            tracing::debug!(name, total, "opened shared memory region");

            Ok(Self { _file: file, mmap })
        }

        pub fn len(&self) -> usize {
            self.mmap.len()
        }

        pub fn as_ptr(&self) -> *const u8 {
            self.mmap.as_ptr()
        }

        pub fn as_mut_ptr(&mut self) -> *mut u8 {
            self.mmap.as_mut_ptr()
        }
    }
}

#[cfg(windows)]
mod win {
    use crate::errors::RingError;
    use std::ffi::OsStr;
    use std::io;
    use std::os::windows::ffi::OsStrExt;
    use std::ptr;
    use windows_sys::Win32::Foundation::{CloseHandle, HANDLE, INVALID_HANDLE_VALUE};
    use windows_sys::Win32::System::Memory::{
        CreateFileMappingW, MapViewOfFile, OpenFileMappingW, UnmapViewOfFile,
        FILE_MAP_ALL_ACCESS, MEMORY_MAPPED_VIEW_ADDRESS, PAGE_READWRITE,
    };

    /// A mapped named file mapping backed by the system paging file.
    #[derive(Debug)]
    pub struct SharedRegion {
        mapping: HANDLE,
        view: *mut u8,
        len: usize,
    }

    // The handle and view are exclusively owned; nothing in this struct is
    // tied to the creating thread.
    unsafe impl Send for SharedRegion {}
    unsafe impl Sync for SharedRegion {}

    fn wide_name(name: &str) -> Vec<u16> {
        OsStr::new(name).encode_wide().chain(Some(0)).collect()
    }

    impl SharedRegion {
        /// Create (or open, if the name already exists) a paging-file-backed
        /// mapping of `total` bytes and map a full-access view of it.
        pub fn create(name: &str, total: usize) -> Result<Self, RingError> {
            let wide = wide_name(name);

            let mapping = unsafe {
                CreateFileMappingW(
                    INVALID_HANDLE_VALUE,
                    ptr::null(),
                    PAGE_READWRITE,
                    (total as u64 >> 32) as u32,
                    total as u32,
                    wide.as_ptr(),
                )
            };
            if mapping.is_null() {
                return Err(RingError::ResourceCreateFailed(io::Error::last_os_error()));
            }

            Self::map_view(mapping, total).inspect(|_| {
                tracing::debug!(name, total, "created shared memory region");
            })
        }

        /// Attach to an existing named mapping and map a full-access view.
        pub fn open(name: &str, total: usize) -> Result<Self, RingError> {
            let wide = wide_name(name);

            let mapping = unsafe { OpenFileMappingW(FILE_MAP_ALL_ACCESS, 0, wide.as_ptr()) };
            if mapping.is_null() {
                return Err(RingError::ResourceOpenFailed(io::Error::last_os_error()));
            }

            Self::map_view(mapping, total).inspect(|_| {
                tracing::debug!(name, total, "opened shared memory region");
            })
        }

        fn map_view(mapping: HANDLE, total: usize) -> Result<Self, RingError> {
            let view = unsafe { MapViewOfFile(mapping, FILE_MAP_ALL_ACCESS, 0, 0, total) };
            if view.Value.is_null() {
                let err = io::Error::last_os_error();
                unsafe { CloseHandle(mapping) };
                return Err(RingError::MapFailed(err));
            }

            Ok(Self {
                mapping,
                view: view.Value.cast(),
                len: total,
            })
        }

        pub fn len(&self) -> usize {
            self.len
        }

        pub fn as_ptr(&self) -> *const u8 {
            self.view
        }

        pub fn as_mut_ptr(&mut self) -> *mut u8 {
            self.view
        }
    }

    impl Drop for SharedRegion {
        fn drop(&mut self) {
            unsafe {
                UnmapViewOfFile(MEMORY_MAPPED_VIEW_ADDRESS {
                    Value: self.view.cast(),
                });
                CloseHandle(self.mapping);
            }
        }
    }
}

#[cfg(unix)]
pub use posix::SharedRegion;
#[cfg(windows)]
pub use win::SharedRegion;
