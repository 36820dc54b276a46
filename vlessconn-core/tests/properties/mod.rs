mod store_tests;
mod uri_roundtrip_tests;
