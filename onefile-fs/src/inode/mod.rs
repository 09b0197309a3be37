//! # 索引节点层
//!
//! 面向宿主的句柄。句柄只记住索引节点号和数据块号等不变量，
//! 文件大小这类会变的信息每次操作时从索引节点表重新读出。

mod directory;
mod file;

pub use self::{directory::Directory, file::File};

use alloc::sync::Arc;

use vfs::{DirEntryType, Stat};

use crate::layout::{DiskInode, FileType};
use crate::{Error, OneFileSystem, Result};

/// 查找得到的子项，操作集合完全由类型位决定
#[derive(Clone)]
pub enum Inode {
    Directory(Directory),
    File(File),
}

impl Inode {
    /// `parent`是目录项所在目录的索引节点号
    pub(crate) fn from_disk(fs: Arc<OneFileSystem>, disk: &DiskInode, parent: u64) -> Result<Self> {
        match disk.kind() {
            Some(FileType::Directory) => Directory::new(fs, disk, parent).map(Self::Directory),
            Some(FileType::Regular) => Ok(Self::File(File::new(fs, disk))),
            None => {
                log::error!(
                    "inode {} is neither a directory nor a file: mode {:#o}",
                    disk.inode_no,
                    disk.mode
                );
                Err(Error::UnknownKind {
                    inode: disk.inode_no,
                    mode: disk.mode,
                })
            }
        }
    }

    pub fn inode_no(&self) -> u64 {
        match self {
            Self::Directory(dir) => dir.inode_no(),
            Self::File(file) => file.inode_no(),
        }
    }

    pub fn kind(&self) -> DirEntryType {
        match self {
            Self::Directory(_) => DirEntryType::Directory,
            Self::File(_) => DirEntryType::Regular,
        }
    }

    pub fn stat(&self) -> Result<Stat> {
        match self {
            Self::Directory(dir) => Ok(dir.stat()),
            Self::File(file) => file.stat(),
        }
    }

    pub fn into_dir(self) -> Result<Directory> {
        match self {
            Self::Directory(dir) => Ok(dir),
            Self::File(file) => Err(Error::NotADirectory(file.inode_no())),
        }
    }

    pub fn into_file(self) -> Result<File> {
        match self {
            Self::File(file) => Ok(file),
            Self::Directory(dir) => Err(Error::IsADirectory(dir.inode_no())),
        }
    }
}

/// 目录项类型由类型位决定
#[inline]
pub(crate) fn entry_type(kind: Option<FileType>) -> DirEntryType {
    match kind {
        Some(FileType::Directory) => DirEntryType::Directory,
        Some(FileType::Regular) => DirEntryType::Regular,
        None => DirEntryType::Unknown,
    }
}
