use std::env;
use std::fs;
use std::path::PathBuf;

use stubgen_compiler::{compile_artifact_to_rust, compile_idl, Options};

fn main() {
    println!("cargo:rerun-if-changed=bench.idl");

    let word_size = env::var("CARGO_CFG_TARGET_POINTER_WIDTH")
        .ok()
        .and_then(|bits| bits.parse::<usize>().ok())
        .map_or(8, |bits| bits / 8);

    let text = fs::read_to_string("bench.idl").expect("failed to read bench.idl");
    let (_interface, artifact) = compile_idl(&text, &Options { word_size })
        .unwrap_or_else(|err| panic!("bench.idl: {}", err));

    let out = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set")).join("bench.rs");
    fs::write(&out, compile_artifact_to_rust(&artifact)).expect("failed to write stubs");
}
