mod common;

use onefile_fs::{Error, Inode, OneFileSystem, BLOCK_SIZE, MAGIC, ROOT_INODE_NO, VERSION};
use vfs::DirEntryType;

use self::common::{mount, note_layout, RamDisk};

#[test]
fn zeroed_device_is_not_onefilefs() {
    let disk = RamDisk::new(4);
    let err = OneFileSystem::mount(disk).err().unwrap();
    assert_eq!(Error::BadMagic(0), err);
    assert!(err.is_format_mismatch());
}

#[test]
fn bad_magic_is_checked_first() {
    let disk = RamDisk::formatted(&note_layout());
    disk.patch(8, &0xdead_beef_u64.to_le_bytes());
    disk.patch(16, &512_u64.to_le_bytes());
    assert_eq!(
        Some(Error::BadMagic(0xdead_beef)),
        OneFileSystem::mount(disk).err()
    );
}

#[test]
fn bad_block_size() {
    let disk = RamDisk::formatted(&note_layout());
    disk.patch(16, &512_u64.to_le_bytes());
    let err = OneFileSystem::mount(disk).err().unwrap();
    assert_eq!(Error::BadBlockSize(512), err);
    assert!(err.is_format_mismatch());
}

#[test]
fn empty_device_faults() {
    let disk = RamDisk::new(0);
    assert!(matches!(
        OneFileSystem::mount(disk).err(),
        Some(Error::TransferFault(block_dev::Error::OutOfRange { block_id: 0 }))
    ));
}

#[test]
fn too_many_inodes() {
    let disk = RamDisk::formatted(&note_layout());
    disk.patch(24, &129_u64.to_le_bytes());
    assert!(matches!(
        OneFileSystem::mount(disk).err(),
        Some(Error::Corrupted(_))
    ));
}

#[test]
fn root_must_be_a_directory() {
    let disk = RamDisk::formatted(&note_layout());
    disk.patch(BLOCK_SIZE, &0o100644_u32.to_le_bytes());
    assert_eq!(
        Some(Error::NotADirectory(ROOT_INODE_NO)),
        OneFileSystem::mount(disk).err()
    );
}

#[test]
fn root_must_exist() {
    let disk = RamDisk::formatted(&note_layout());
    disk.patch(BLOCK_SIZE + 8, &9_u64.to_le_bytes());
    assert_eq!(
        Some(Error::InodeNotFound(ROOT_INODE_NO)),
        OneFileSystem::mount(disk).err()
    );
}

#[test]
fn root_properties() {
    let (_disk, fs) = mount(&note_layout());
    assert_eq!(VERSION, fs.version());
    assert_eq!(2, fs.inodes_count());

    let root = fs.root().unwrap();
    assert_eq!(ROOT_INODE_NO, root.inode_no());
    assert_eq!(2, root.data_block());
    assert_eq!(1, root.children_count());

    let stat = root.stat();
    assert_eq!(DirEntryType::Directory, stat.mode);
    assert_eq!(0o755, stat.perm);
    assert_eq!(BLOCK_SIZE as u64, stat.block_size);
    assert_eq!(1, stat.size);
}

#[test]
fn unmount_leaves_device_mountable() {
    let (disk, fs) = mount(&note_layout());
    let before = disk.bytes();
    fs.unmount();
    assert_eq!(before, disk.bytes());
    assert_eq!(&MAGIC.to_le_bytes()[..], &disk.block(0)[8..16]);

    let fs = OneFileSystem::mount(disk).unwrap();
    let Some(Inode::File(file)) = fs.root().unwrap().lookup(b"note.txt").unwrap() else {
        panic!("note.txt lost");
    };
    assert_eq!(2, file.size().unwrap());
}

#[test]
fn mounts_are_independent() {
    let (_a, fs_a) = mount(&note_layout());
    let (_b, fs_b) = mount(&note_layout().file("extra", "x"));

    assert_eq!(1, fs_a.root().unwrap().children_count());
    assert_eq!(2, fs_b.root().unwrap().children_count());
}
