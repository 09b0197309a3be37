use core::fmt;

use crate::{BLOCK_SIZE, MAGIC, VERSION};
use crate::{Error, Result};

const FIELDS_SIZE: usize = 5 * 8;

/// 超级块：
/// - 提供文件系统合法性校验；
/// - 记录索引节点表里有效索引节点的个数
///
/// 由格式化工具写入一次，挂载时读出一次，此后不再改写。
#[repr(C)]
pub struct SuperBlock {
    pub version: u64,
    /// 魔数：用于校验文件系统合法性
    magic: u64,
    block_size: u64,
    pub inodes_count: u64,
    /// 从未被使用
    pub free_blocks: u64,
    /// 填满一整块
    _padding: [u8; BLOCK_SIZE - FIELDS_SIZE],
}

impl SuperBlock {
    #[inline]
    pub fn new(inodes_count: u64) -> Self {
        Self {
            version: VERSION,
            magic: MAGIC,
            block_size: BLOCK_SIZE as u64,
            inodes_count,
            free_blocks: u64::MAX,
            _padding: [0; BLOCK_SIZE - FIELDS_SIZE],
        }
    }

    /// 先查魔数再查块大小
    pub fn validate(&self) -> Result<()> {
        if self.magic != MAGIC {
            return Err(Error::BadMagic(self.magic));
        }
        if self.block_size != BLOCK_SIZE as u64 {
            return Err(Error::BadBlockSize(self.block_size));
        }
        Ok(())
    }
}

impl fmt::Debug for SuperBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuperBlock")
            .field("version", &self.version)
            .field("magic", &format_args!("{:#x}", self.magic))
            .field("block_size", &self.block_size)
            .field("inodes_count", &self.inodes_count)
            .field("free_blocks", &self.free_blocks)
            .finish_non_exhaustive()
    }
}
