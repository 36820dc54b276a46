mod client_tests;
mod file_store_tests;
mod store_tests;
