pub mod discovery;
pub mod excel_read;
pub mod excel_write;
