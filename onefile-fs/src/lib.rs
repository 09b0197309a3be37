#![no_std]

extern crate alloc;

/* onefilefs 的整体架构，自上而下 */

// 索引节点层：目录查找、目录遍历、文件读写
mod inode;

// 文件系统层：挂载校验、索引节点解析、两把写锁
mod ofs;

// 格式化：一次性写出初始布局
pub mod format;

// 磁盘数据结构层：超级块、索引节点表、目录记录
pub mod layout;

// 块缓存层：内存上的磁盘块数据缓存
mod block_cache;

// 可被打断的锁
pub mod sync;

mod error;

pub use self::{
    error::{Error, NameBuf, Result},
    format::Layout,
    inode::{Directory, File, Inode},
    ofs::OneFileSystem,
};
pub use block_dev::BlockDevice;

pub const MAGIC: u64 = 0x4242_4242;
pub const VERSION: u64 = 1;
pub const BLOCK_SIZE: usize = 4096;
/// 目录记录中文件名字段的长度，文件名最长为该值减一
pub const FILENAME_MAXLEN: usize = 255;

/* 块号按位置固定分配 */
pub const SUPER_BLOCK_ID: usize = 0;
pub const INODE_TABLE_BLOCK_ID: usize = 1;
pub const ROOT_DATA_BLOCK_ID: usize = 2;
pub const FIRST_FILE_DATA_BLOCK_ID: usize = 3;

pub const ROOT_INODE_NO: u64 = 1;

/// 索引节点表一块能放下的索引节点数
pub const INODES_PER_BLOCK: usize = BLOCK_SIZE / layout::DiskInode::SIZE;
/// 目录数据块一块能放下的目录记录数
pub const RECORDS_PER_BLOCK: usize = BLOCK_SIZE / layout::DirRecord::SIZE;

type DataBlock = [u8; BLOCK_SIZE];
