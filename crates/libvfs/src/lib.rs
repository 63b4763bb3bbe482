#![cfg_attr(not(test), no_std)]

pub mod fcntl;
pub mod limits;
pub mod syscall;
