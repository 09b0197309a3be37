//! 索引节点
//!
//! 每个对象只占一个数据块，因此索引节点只记一个块号；
//! 最后一个字段对文件是字节数，对目录是子项数，二者共用存储，
//! 读取时一律经由 [`InodeBody`] 按类型位解释。

use enumflags2::{bitflags, BitFlags};

/// 类型位掩码
pub const S_IFMT: u32 = 0o170000;
pub const S_IFDIR: u32 = 0o040000;
pub const S_IFREG: u32 = 0o100000;
/// 权限位掩码
pub const PERM_MASK: u32 = 0o7777;

#[bitflags]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Directory = 0o040000,
    Regular = 0o100000,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct DiskInode {
    /// 类型位 + 权限位
    pub mode: u32,
    _pad: u32,
    /// 在索引节点表内唯一，目录记录用它引用本节点
    pub inode_no: u64,
    pub data_block_number: u64,
    size_or_children: u64,
}

/// 按类型解释共用字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeBody {
    File { size: u64 },
    Directory { children: u64 },
}

impl DiskInode {
    pub const SIZE: usize = 32;

    pub fn new_dir(inode_no: u64, perm: u32, data_block_number: u64, children: u64) -> Self {
        Self {
            mode: S_IFDIR | (perm & PERM_MASK),
            _pad: 0,
            inode_no,
            data_block_number,
            size_or_children: children,
        }
    }

    pub fn new_file(inode_no: u64, perm: u32, data_block_number: u64, size: u64) -> Self {
        Self {
            mode: S_IFREG | (perm & PERM_MASK),
            _pad: 0,
            inode_no,
            data_block_number,
            size_or_children: size,
        }
    }

    /// 类型位必须恰好是目录或普通文件之一
    pub fn kind(&self) -> Option<FileType> {
        BitFlags::<FileType>::from_bits(self.mode & S_IFMT)
            .ok()
            .and_then(|kind| kind.exactly_one())
    }

    #[inline]
    pub fn perm(&self) -> u32 {
        self.mode & PERM_MASK
    }

    pub fn body(&self) -> Option<InodeBody> {
        self.kind().map(|kind| match kind {
            FileType::Directory => InodeBody::Directory {
                children: self.size_or_children,
            },
            FileType::Regular => InodeBody::File {
                size: self.size_or_children,
            },
        })
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind() == Some(FileType::Directory)
    }

    /// 只对普通文件生效，返回是否修改
    pub fn set_file_size(&mut self, size: u64) -> bool {
        if self.kind() != Some(FileType::Regular) {
            return false;
        }
        self.size_or_children = size;
        true
    }

    /// 在索引节点表中线性查找，返回第一个`inode_no`相同的节点的拷贝。
    ///
    /// 复杂度为 O(n)；表中若有重复的`inode_no`，按扫描顺序取第一个。
    pub fn find(table: &[DiskInode], inode_no: u64) -> Option<DiskInode> {
        table.iter().find(|inode| inode.inode_no == inode_no).copied()
    }

    pub fn find_mut(table: &mut [DiskInode], inode_no: u64) -> Option<&mut DiskInode> {
        table.iter_mut().find(|inode| inode.inode_no == inode_no)
    }
}
