use alloc::string::String;
use alloc::vec::Vec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Inode number
    pub inode: u64,
    pub ty: DirEntryType,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DirEntryType {
    Directory,
    #[default]
    Regular,
    /// 类型位既不是目录也不是普通文件
    Unknown,
}

/// 宿主的目录读取上下文
///
/// 宿主记录读到的位置，文件系统从该位置起逐项汇报，
/// 每成功汇报一项就推进一次位置。
pub trait DirContext {
    fn pos(&self) -> u64;

    fn set_pos(&mut self, pos: u64);

    /// 汇报一个目录项。返回`false`表示宿主不再接收，本轮读取应停止。
    fn emit(&mut self, name: &[u8], inode: u64, ty: DirEntryType) -> bool;
}

/// 把汇报的目录项收集起来，最多收集`limit`项
#[derive(Debug)]
pub struct Listing {
    pos: u64,
    limit: usize,
    entries: Vec<DirEntry>,
}

impl Listing {
    pub fn new(pos: u64, limit: usize) -> Self {
        Self {
            pos,
            limit,
            entries: Vec::with_capacity(limit.min(32)),
        }
    }

    #[inline]
    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }

    #[inline]
    pub fn into_entries(self) -> Vec<DirEntry> {
        self.entries
    }
}

impl DirContext for Listing {
    #[inline]
    fn pos(&self) -> u64 {
        self.pos
    }

    #[inline]
    fn set_pos(&mut self, pos: u64) {
        self.pos = pos;
    }

    fn emit(&mut self, name: &[u8], inode: u64, ty: DirEntryType) -> bool {
        if self.entries.len() == self.limit {
            return false;
        }

        self.entries.push(DirEntry {
            inode,
            ty,
            name: String::from_utf8_lossy(name).into_owned(),
        });
        true
    }
}
