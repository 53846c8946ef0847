pub mod fragment;
pub mod kbuild;

pub type KsliceResult<T> = anyhow::Result<T>;
