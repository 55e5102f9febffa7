mod common;
mod file_store_tests;
