//! # 块缓存层
//!
//! 块设备读写速度一般慢于内存读写速度，因此我们在内存中开辟缓冲区，
//! 把即将操作的块复制到内存中，提高对块设备的操作效率。
//! 同时，块缓存层也会尝试返回已缓存的块。
//!
//! 每个挂载实例持有自己的 [`BlockCacheManager`]，不同设备之间互不干扰。
//! 修改过的块被标记为脏块，在同步、被踢出或析构时写回设备。

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::mem;

use block_dev::BlockDevice;
use spin::Mutex;

use crate::{DataBlock, BLOCK_SIZE};

/// 按8字节对齐的整块缓冲区，磁盘结构可以直接映射在上面
#[repr(C, align(8))]
pub struct Block(DataBlock);

impl Block {
    #[inline]
    pub fn zeroed() -> Box<Self> {
        Box::new(Self([0; BLOCK_SIZE]))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }

    /// `T`必须是任意位模式都合法的`repr(C)`磁盘结构
    pub fn get<T: Sized>(&self, offset: usize) -> &T {
        Self::check::<T>(offset, 1);
        unsafe { &*self.0.as_ptr().add(offset).cast() }
    }

    pub fn get_mut<T: Sized>(&mut self, offset: usize) -> &mut T {
        Self::check::<T>(offset, 1);
        unsafe { &mut *self.0.as_mut_ptr().add(offset).cast() }
    }

    /// 从块首起的`count`个`T`
    pub fn slice<T: Sized>(&self, count: usize) -> &[T] {
        Self::check::<T>(0, count);
        unsafe { core::slice::from_raw_parts(self.0.as_ptr().cast(), count) }
    }

    pub fn slice_mut<T: Sized>(&mut self, count: usize) -> &mut [T] {
        Self::check::<T>(0, count);
        unsafe { core::slice::from_raw_parts_mut(self.0.as_mut_ptr().cast(), count) }
    }

    #[inline]
    fn check<T>(offset: usize, count: usize) {
        assert!(offset + mem::size_of::<T>() * count <= BLOCK_SIZE);
        assert_eq!(0, offset % mem::align_of::<T>());
    }
}

/// 内存中的块缓存
pub struct BlockCache {
    /// 缓存的数据
    data: Box<Block>,
    /// 对应的块ID
    block_id: usize,
    /// 底层块设备的引用
    block_device: Arc<dyn BlockDevice>,
    /// 是否为脏块
    modified: bool,
}

impl BlockCache {
    pub fn load(block_id: usize, block_device: Arc<dyn BlockDevice>) -> Result<Self, block_dev::Error> {
        let mut data = Block::zeroed();
        block_device.read_block(block_id, data.as_bytes_mut())?;

        Ok(Self {
            data,
            block_id,
            block_device,
            modified: false,
        })
    }

    pub fn sync(&mut self) -> Result<(), block_dev::Error> {
        if self.modified {
            self.block_device
                .write_block(self.block_id, self.data.as_bytes())?;
            self.modified = false;
        }
        Ok(())
    }

    #[inline]
    pub fn map<T: Sized, V>(&self, offset: usize, f: impl FnOnce(&T) -> V) -> V {
        f(self.data.get(offset))
    }

    /// 同时把块标记为脏块
    #[inline]
    pub fn map_mut<T: Sized, V>(&mut self, offset: usize, f: impl FnOnce(&mut T) -> V) -> V {
        self.modified = true;
        f(self.data.get_mut(offset))
    }

    #[inline]
    pub fn map_slice<T: Sized, V>(&self, count: usize, f: impl FnOnce(&[T]) -> V) -> V {
        f(self.data.slice(count))
    }

    #[inline]
    pub fn map_mut_slice<T: Sized, V>(&mut self, count: usize, f: impl FnOnce(&mut [T]) -> V) -> V {
        self.modified = true;
        f(self.data.slice_mut(count))
    }
}

impl Drop for BlockCache {
    fn drop(&mut self) {
        if let Err(err) = self.sync() {
            log::error!("block {} lost its dirty data: {err}", self.block_id);
        }
    }
}

/// 块缓存管理，缓存、调度块缓存
pub struct BlockCacheManager {
    block_device: Arc<dyn BlockDevice>,
    queue: Mutex<Vec<(usize, Arc<Mutex<BlockCache>>)>>,
}

impl BlockCacheManager {
    /// 块缓存个数的上限
    const CAPACITY: usize = 16;

    pub fn new(block_device: Arc<dyn BlockDevice>) -> Self {
        Self {
            block_device,
            queue: Mutex::new(Vec::with_capacity(Self::CAPACITY)),
        }
    }

    // 块缓存调度策略：踢走闲置块
    pub fn get(&self, block_id: usize) -> Result<Arc<Mutex<BlockCache>>, block_dev::Error> {
        let mut queue = self.queue.lock();

        // 尝试从缓冲区中读取块
        if let Some(cache) = queue
            .iter()
            .find_map(|(id, cache)| (block_id == *id).then_some(cache))
        {
            return Ok(Arc::clone(cache));
        };

        // 触及上限，写回一个块；全都在用就暂时超额
        if queue.len() >= Self::CAPACITY {
            // 没有其它引用的才能写回
            if let Some(index) = queue
                .iter()
                .position(|(_, cache)| Arc::strong_count(cache) == 1)
            {
                queue[index].1.lock().sync()?;
                queue.remove(index);
            } else {
                log::warn!("all {} cached blocks are in use", queue.len());
            }
        }

        // 缓存新块
        let block_cache = Arc::new(Mutex::new(BlockCache::load(
            block_id,
            self.block_device.clone(),
        )?));
        queue.push((block_id, block_cache.clone()));

        Ok(block_cache)
    }

    /// 写回全部脏块，再让设备落盘
    pub fn sync_all(&self) -> Result<(), block_dev::Error> {
        self.queue
            .lock()
            .iter()
            .try_for_each(|(_, cache)| cache.lock().sync())?;
        self.block_device.flush()
    }
}
