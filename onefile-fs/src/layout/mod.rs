//! # 磁盘数据结构层
//!
//! onefilefs 的磁盘布局，块大小固定为 [`BLOCK_SIZE`](crate::BLOCK_SIZE)：
//! 超级块(#0) | 索引节点表(#1) | 根目录数据(#2) | 文件数据(#3..)
//!
//! 每种结构的大小都是固定的，读出第N块总能得到一个完整的结构或定长记录数组。
//! 填充字节只用于对齐，读者一律忽略。

mod super_block;
pub use super_block::SuperBlock;

mod inode;
pub use inode::{DiskInode, FileType, InodeBody, PERM_MASK, S_IFDIR, S_IFMT, S_IFREG};

/// 目录项，目录数据块由它们紧密排列而成
mod dir_record;
pub use dir_record::DirRecord;
