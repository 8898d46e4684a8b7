/// Build script for engine_core
///
/// GLSL sources are embedded with `include_str!` and compiled at runtime by
/// the OpenGL driver, so the only job here is to rebuild when they change.
fn main() {
    println!("cargo:rerun-if-changed=src/renderer/shaders/vertex.glsl");
    println!("cargo:rerun-if-changed=src/renderer/shaders/fragment.glsl");
}
