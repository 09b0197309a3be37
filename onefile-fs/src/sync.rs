//! 可被打断的互斥锁
//!
//! 等锁的调用者可能收到宿主的打断请求，此时放弃等待并返回 [`Error::Interrupted`]，
//! 不产生任何副作用。锁空闲时直接取得，不理会尚未处理的打断。

use core::sync::atomic::{AtomicBool, Ordering};

use spin::{Mutex, MutexGuard};

use crate::{Error, Result};

/// 调用者上下文中的打断来源
pub trait Interrupt {
    fn is_pending(&self) -> bool;
}

/// 永远不会被打断
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverInterrupted;

impl Interrupt for NeverInterrupted {
    #[inline]
    fn is_pending(&self) -> bool {
        false
    }
}

impl Interrupt for AtomicBool {
    #[inline]
    fn is_pending(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

#[derive(Debug, Default)]
pub struct InterruptibleMutex<T> {
    inner: Mutex<T>,
}

impl<T> InterruptibleMutex<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// 锁被占用时自旋等待，每轮检查一次打断
    pub fn lock_interruptible(&self, intr: &dyn Interrupt) -> Result<MutexGuard<'_, T>> {
        loop {
            if let Some(guard) = self.inner.try_lock() {
                return Ok(guard);
            }
            if intr.is_pending() {
                return Err(Error::Interrupted);
            }
            core::hint::spin_loop();
        }
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }
}
