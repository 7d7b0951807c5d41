//! Fault region: the trap generator's memory
//!
//! A private anonymous mapping sized exactly `pages * page_size`, never
//! pre-touched, so the first write to each page is guaranteed to take
//! exactly one page-fault trap. Oversizing wastes memory; undersizing
//! would fault more than once per page and break the one-fault-per-
//! iteration invariant.

use trapbench_core::error::{AllocationError, BenchResult};
use trapbench_core::protocol::StackSlotLayout;
use trapbench_core::traits::TrapSite;

/// Value stored by the triggering write. Arbitrary; only the fault
/// matters.
const TOUCH_PATTERN: u64 = 100;

/// Platform page size.
pub fn page_size() -> BenchResult<usize> {
    let n = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if n < 1 {
        return Err(AllocationError::PageSizeUnavailable.into());
    }
    Ok(n as usize)
}

/// One freshly mapped, zero-fill-on-demand page per planned iteration.
#[derive(Debug)]
pub struct FaultRegion {
    base: *mut u8,
    len: usize,
    page_size: usize,
    pages: usize,
    next: usize,
}

impl FaultRegion {
    /// Map a region of `pages` unfaulted pages.
    pub fn map(pages: usize) -> BenchResult<Self> {
        let page_size = page_size()?;
        let len = pages
            .checked_mul(page_size)
            .ok_or(AllocationError::RegionTooLarge { pages })?;

        let base = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if base == libc::MAP_FAILED {
            let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
            return Err(AllocationError::MapFailed { bytes: len, errno }.into());
        }

        Ok(Self {
            base: base as *mut u8,
            len,
            page_size,
            pages,
            next: 0,
        })
    }

    #[inline]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    #[inline]
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Pages touched (and therefore faulted) so far.
    #[inline]
    pub fn touched(&self) -> usize {
        self.next
    }

    /// Address range of the mapping.
    #[inline]
    pub fn range(&self) -> (usize, usize) {
        (self.base as usize, self.base as usize + self.len)
    }
}

impl TrapSite for FaultRegion {
    /// One volatile store to the next untouched page. The page is fresh,
    /// so the store synchronously enters the trap handler before it
    /// retires from the program's perspective.
    ///
    /// The region holds one page per planned iteration; triggering past
    /// that is a caller bug and becomes a no-op rather than a write
    /// beyond the mapping.
    #[inline(always)]
    fn trigger(&mut self, _slots: &StackSlotLayout) {
        if self.next >= self.pages {
            return;
        }
        unsafe {
            let page = self.base.add(self.next * self.page_size) as *mut u64;
            page.write_volatile(TOUCH_PATTERN);
        }
        self.next += 1;
    }
}

impl Drop for FaultRegion {
    fn drop(&mut self) {
        if !self.base.is_null() && self.len > 0 {
            unsafe {
                libc::munmap(self.base as *mut libc::c_void, self.len);
            }
        }
    }
}
