//! Integration tests for conduit-lib, run as one `library` test binary.

mod save_tests;
