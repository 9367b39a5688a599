//! Cross-module scene tests

mod frame_protocol;
