pub mod assembler;
pub mod page_object;
