//! # 格式化
//!
//! 一次性写出初始布局：超级块、索引节点表、根目录数据块，以及每个文件一个数据块。
//! 所有校验都在写第一块之前完成；写到一半失败时设备处于不确定状态，
//! 只能离线重新格式化，绝不能对已挂载的设备执行。
//!
//! 同样的输入总是产生逐字节相同的输出。

use alloc::vec::Vec;

use block_dev::BlockDevice;

use crate::block_cache::Block;
use crate::error::NameBuf;
use crate::layout::{DirRecord, DiskInode, SuperBlock};
use crate::{Error, Result};
use crate::{BLOCK_SIZE, INODES_PER_BLOCK, RECORDS_PER_BLOCK, ROOT_INODE_NO};
use crate::{FIRST_FILE_DATA_BLOCK_ID, INODE_TABLE_BLOCK_ID, ROOT_DATA_BLOCK_ID, SUPER_BLOCK_ID};

/// 根目录的默认权限
pub const DEFAULT_DIR_PERM: u32 = 0o755;
/// 文件的默认权限
pub const DEFAULT_FILE_PERM: u32 = 0o644;

/// 根目录下的一个文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    pub name: Vec<u8>,
    pub perm: u32,
    pub content: Vec<u8>,
}

/// 要写到设备上的初始布局：根目录在前，文件依次在后
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root_perm: u32,
    files: Vec<FileSpec>,
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

impl Layout {
    /// 只有空的根目录
    pub fn new() -> Self {
        Self {
            root_perm: DEFAULT_DIR_PERM,
            files: Vec::new(),
        }
    }

    pub fn root_perm(mut self, perm: u32) -> Self {
        self.root_perm = perm;
        self
    }

    pub fn file(self, name: impl Into<Vec<u8>>, content: impl Into<Vec<u8>>) -> Self {
        self.file_with_perm(name, DEFAULT_FILE_PERM, content)
    }

    pub fn file_with_perm(
        mut self,
        name: impl Into<Vec<u8>>,
        perm: u32,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        self.files.push(FileSpec {
            name: name.into(),
            perm,
            content: content.into(),
        });
        self
    }

    #[inline]
    pub fn files(&self) -> &[FileSpec] {
        &self.files
    }

    /// 索引节点个数：根目录加上所有文件
    #[inline]
    pub fn inodes_count(&self) -> usize {
        1 + self.files.len()
    }

    /// 布局占用的块数
    #[inline]
    pub fn required_blocks(&self) -> usize {
        FIRST_FILE_DATA_BLOCK_ID + self.files.len()
    }

    pub fn validate(&self) -> Result<()> {
        if self.files.len() > RECORDS_PER_BLOCK || self.inodes_count() > INODES_PER_BLOCK {
            return Err(Error::TooManyEntries(self.files.len()));
        }

        for (i, file) in self.files.iter().enumerate() {
            if !DirRecord::is_valid_name(&file.name) {
                return Err(Error::InvalidName(NameBuf::new(&file.name)));
            }
            if self.files[..i].iter().any(|prev| prev.name == file.name) {
                return Err(Error::DuplicateName(NameBuf::new(&file.name)));
            }
            if file.content.len() > BLOCK_SIZE {
                return Err(Error::CapacityExceeded {
                    offset: 0,
                    len: file.content.len(),
                });
            }
        }

        Ok(())
    }

    /// 校验后把布局写到设备上，覆盖目标块的全部内容
    pub fn write_to(&self, block_device: &dyn BlockDevice) -> Result<()> {
        self.validate()?;

        let required = self.required_blocks();
        let available = block_device.block_count(BLOCK_SIZE);
        if available < required {
            return Err(Error::DeviceTooSmall {
                required,
                available,
            });
        }

        let mut block = Block::zeroed();
        *block.get_mut::<SuperBlock>(0) = SuperBlock::new(self.inodes_count() as u64);
        write_block(block_device, SUPER_BLOCK_ID, &block)?;
        log::info!("super block written");

        let mut block = Block::zeroed();
        block.slice_mut::<DiskInode>(self.inodes_count()).copy_from_slice(&self.inodes());
        write_block(block_device, INODE_TABLE_BLOCK_ID, &block)?;
        log::info!("inode table of {} inodes written", self.inodes_count());

        let mut block = Block::zeroed();
        for (record, (i, file)) in block
            .slice_mut::<DirRecord>(self.files.len())
            .iter_mut()
            .zip(self.files.iter().enumerate())
        {
            *record = DirRecord::new(&file.name, Self::file_inode_no(i));
        }
        write_block(block_device, ROOT_DATA_BLOCK_ID, &block)?;
        log::info!("root directory with {} records written", self.files.len());

        for (i, file) in self.files.iter().enumerate() {
            let mut block = Block::zeroed();
            block.as_bytes_mut()[..file.content.len()].copy_from_slice(&file.content);
            write_block(block_device, FIRST_FILE_DATA_BLOCK_ID + i, &block)?;
            log::info!(
                "file \"{}\" of {} bytes written",
                file.name.escape_ascii(),
                file.content.len()
            );
        }

        block_device.flush()?;
        Ok(())
    }
}

impl Layout {
    /// 文件的索引节点号紧随根目录
    #[inline]
    fn file_inode_no(index: usize) -> u64 {
        ROOT_INODE_NO + 1 + index as u64
    }

    fn inodes(&self) -> Vec<DiskInode> {
        let root = DiskInode::new_dir(
            ROOT_INODE_NO,
            self.root_perm,
            ROOT_DATA_BLOCK_ID as u64,
            self.files.len() as u64,
        );
        let files = self.files.iter().enumerate().map(|(i, file)| {
            DiskInode::new_file(
                Self::file_inode_no(i),
                file.perm,
                (FIRST_FILE_DATA_BLOCK_ID + i) as u64,
                file.content.len() as u64,
            )
        });

        core::iter::once(root).chain(files).collect()
    }
}

/// 按布局格式化设备
#[inline]
pub fn format(block_device: &dyn BlockDevice, layout: &Layout) -> Result<()> {
    layout.write_to(block_device)
}

fn write_block(block_device: &dyn BlockDevice, block_id: usize, block: &Block) -> Result<()> {
    block_device
        .write_block(block_id, block.as_bytes())
        .inspect_err(|err| log::error!("failed to write block {block_id}: {err}"))
        .map_err(Error::from)
}
