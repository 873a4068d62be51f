// Not every utils is used in every test, so we allow dead code
#![allow(unused_imports, dead_code)]

mod mock_service;
pub use mock_service::*;
