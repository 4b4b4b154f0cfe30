pub mod access;

pub use access::{
    DirectAccess, MemoryAccess, ReadMemoryFn, WrappedAccess, WriteMemoryFn, read_direct,
    write_direct,
};
