pub mod file_service;
pub mod staging;
pub mod storage;
