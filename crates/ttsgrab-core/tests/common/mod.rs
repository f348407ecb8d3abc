#![allow(dead_code)]

pub mod audio_server;
