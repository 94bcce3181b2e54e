pub(crate) mod cms;
pub(crate) mod memory;
