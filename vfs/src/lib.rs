//! 宿主一侧的对象模型
//!
//! 文件系统只通过这里的类型与宿主交换目录项和元信息，
//! 不关心宿主的线程模型和缓存方式。

#![no_std]

extern crate alloc;

mod dirent;
mod stat;

pub use self::{
    dirent::{DirContext, DirEntry, DirEntryType, Listing},
    stat::Stat,
};
