pub(crate) mod base;
pub(crate) mod buffer_op;
pub(crate) mod color_balance;
pub(crate) mod constant;
pub(crate) mod cursor;
