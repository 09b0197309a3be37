use core::fmt;

use crate::FILENAME_MAXLEN;

/// 目录记录：文件名到索引节点号的映射
///
/// 文件名是定长、以0填充的字节数组，保证记录步长恒定，可以线性扫描。
#[derive(Clone, Copy)]
#[repr(C)]
pub struct DirRecord {
    // 最后一字节留给 \0
    filename: [u8; FILENAME_MAXLEN],
    _pad: u8,
    inode_no: u64,
}

impl DirRecord {
    /// 记录大小恒为264字节
    pub const SIZE: usize = 264;

    /// 文件名最长字节数
    pub const NAME_MAX_LEN: usize = FILENAME_MAXLEN - 1;

    /// `name`由调用者保证不超过 [`Self::NAME_MAX_LEN`] 且不含 `\0`
    pub fn new(name: &[u8], inode_no: u64) -> Self {
        debug_assert!(Self::is_valid_name(name));
        let mut filename = [0; FILENAME_MAXLEN];
        filename[..name.len()].copy_from_slice(name);

        Self {
            filename,
            _pad: 0,
            inode_no,
        }
    }

    /// 可以存进记录的文件名：非空，不含`\0`和`/`，不是`.`或`..`
    pub fn is_valid_name(name: &[u8]) -> bool {
        !name.is_empty()
            && name.len() <= Self::NAME_MAX_LEN
            && !name.iter().any(|&c| c == 0 || c == b'/')
            && name != b"."
            && name != b".."
    }

    /// 第一个`\0`之前的字节
    pub fn name(&self) -> &[u8] {
        let len = self
            .filename
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(FILENAME_MAXLEN);
        &self.filename[..len]
    }

    #[inline]
    pub fn inode_no(&self) -> u64 {
        self.inode_no
    }
}

impl fmt::Debug for DirRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirRecord")
            .field("name", &format_args!("{}", self.name().escape_ascii()))
            .field("inode_no", &self.inode_no)
            .finish()
    }
}
